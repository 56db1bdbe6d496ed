use super::*;
use hound::{WavSpec, WavWriter};

fn wav_bytes(spec: WavSpec, samples: &[i16]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

fn spec(channels: u16, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

#[test]
fn test_mono_16k_passthrough() {
    let samples: Vec<i16> = (0..160).map(|i| (i * 100) as i16).collect();
    let bytes = wav_bytes(spec(1, 16_000), &samples);

    let decoded = samples_16k_mono(&bytes).unwrap();
    assert_eq!(decoded.len(), 160);
    assert!((decoded[1] - 100.0 / 32768.0).abs() < 1e-6);
}

#[test]
fn test_stereo_downmix_averages_channels() {
    // L = 8192, R = -8192 on every frame averages to silence.
    let samples: Vec<i16> = std::iter::repeat([8192i16, -8192i16])
        .take(100)
        .flatten()
        .collect();
    let bytes = wav_bytes(spec(2, 16_000), &samples);

    let decoded = samples_16k_mono(&bytes).unwrap();
    assert_eq!(decoded.len(), 100);
    assert!(decoded.iter().all(|s| s.abs() < 1e-6));
}

#[test]
fn test_float_format_accepted() {
    let mut cursor = Cursor::new(Vec::new());
    {
        let float_spec = WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::new(&mut cursor, float_spec).unwrap();
        for i in 0..64 {
            writer.write_sample(i as f32 / 64.0).unwrap();
        }
        writer.finalize().unwrap();
    }

    let decoded = samples_16k_mono(&cursor.into_inner()).unwrap();
    assert_eq!(decoded.len(), 64);
    assert!((decoded[32] - 0.5).abs() < 1e-6);
}

#[test]
fn test_resamples_8k_to_16k() {
    // 8192 input samples at 8 kHz resample to exactly twice as many frames.
    let samples: Vec<i16> = (0..8192).map(|i| ((i % 64) * 256) as i16).collect();
    let bytes = wav_bytes(spec(1, 8_000), &samples);

    let decoded = samples_16k_mono(&bytes).unwrap();
    assert_eq!(decoded.len(), 16_384);
}

#[test]
fn test_invalid_bytes_rejected() {
    let result = samples_16k_mono(b"definitely not a wav file");
    assert!(result.is_err());
}

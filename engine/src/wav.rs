//! WAV decoding to the 16 kHz mono f32 samples the decoder expects.

use std::io::Cursor;

use anyhow::{Context, Result};
use audioadapter_buffers::direct::SequentialSliceOfVecs;
use hound::{SampleFormat, WavReader};
use rubato::audioadapter::Adapter;
use rubato::{Fft, FixedSync, Resampler};

/// Sample rate Whisper expects.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Decode WAV bytes into mono f32 samples at [`TARGET_SAMPLE_RATE`].
///
/// Multi-channel input is downmixed by averaging; other sample rates are
/// resampled.
pub fn samples_16k_mono(audio: &[u8]) -> Result<Vec<f32>> {
    let mut reader = WavReader::new(Cursor::new(audio)).context("Failed to parse WAV data")?;
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .context("Failed to read WAV samples")?,
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|s| s as f32 / 32768.0))
            .collect::<Result<_, _>>()
            .context("Failed to read WAV samples")?,
        (format, bits) => anyhow::bail!("Unsupported WAV format: {:?} {}bit", format, bits),
    };

    let mono = to_mono(&samples, spec.channels);
    if spec.sample_rate == TARGET_SAMPLE_RATE {
        return Ok(mono);
    }
    resample(&mono, spec.sample_rate, TARGET_SAMPLE_RATE)
}

/// Convert multi-channel interleaved samples to mono by averaging all channels.
fn to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels == 1 {
        return samples.to_vec();
    }

    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample mono audio between sample rates.
fn resample(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    const CHUNK_SIZE: usize = 1024;

    let mut resampler = Fft::new(
        input_rate as usize,
        output_rate as usize,
        CHUNK_SIZE,
        1, // sub_chunks
        1, // channels
        FixedSync::Input,
    )
    .context("Failed to create resampler")?;

    // Zero-pad the tail so the final partial chunk is processed too.
    let padded: Vec<f32>;
    let input = if input.len() % CHUNK_SIZE == 0 {
        input
    } else {
        let mut p = input.to_vec();
        p.resize(input.len().div_ceil(CHUNK_SIZE) * CHUNK_SIZE, 0.0);
        padded = p;
        &padded
    };

    let mut output = Vec::new();
    for chunk in input.chunks_exact(CHUNK_SIZE) {
        let input_vecs = vec![chunk.to_vec()];
        let input_adapter =
            SequentialSliceOfVecs::new(&input_vecs, 1, chunk.len()).expect("valid input");
        let resampled = resampler
            .process(&input_adapter, 0, None)
            .context("Resampling failed")?;

        for frame_idx in 0..resampled.frames() {
            output.push(resampled.read_sample(0, frame_idx).unwrap_or(0.0));
        }
    }

    Ok(output)
}

#[cfg(test)]
#[path = "wav_test.rs"]
mod tests;

use super::*;
use tempfile::TempDir;

#[test]
fn test_default_config_values() {
    let config = Config::default();

    assert_eq!(config.model.model, ModelId::Base);
    assert_eq!(config.model.language, "auto");
    assert_eq!(config.storage.models_dir, None);
    assert_eq!(config.logging.level, LogLevel::Info);
}

#[test]
fn test_load_valid_config_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
[model]
model = "small-en"
language = "en"

[storage]
models_dir = "/var/cache/sotto"

[logging]
level = "debug"
"#;

    std::fs::write(&config_path, toml_content).unwrap();

    let config = Config::load_from(&config_path).unwrap();

    assert_eq!(config.model.model, ModelId::SmallEn);
    assert_eq!(config.model.language, "en");
    assert_eq!(
        config.storage.models_dir,
        Some(PathBuf::from("/var/cache/sotto"))
    );
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.models_dir().unwrap(), Path::new("/var/cache/sotto"));
}

#[test]
fn test_missing_config_file_returns_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent.toml");

    let config = Config::load_from(&config_path).unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn test_invalid_toml_returns_error() {
    let invalid_toml = "this is not valid { toml [";

    let result = Config::parse(invalid_toml);

    assert!(result.is_err());
    let err = result.unwrap_err();
    assert!(err.to_string().contains("TOML"));
}

#[test]
fn test_invalid_model_name_returns_error() {
    let toml_content = r#"
[model]
model = "not-a-real-model"
"#;

    let result = Config::parse(toml_content);
    assert!(result.is_err());
}

#[test]
fn test_save_and_reload_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config = Config {
        model: ModelConfig {
            model: ModelId::LargeV3Turbo,
            language: "de".to_string(),
        },
        ..Config::default()
    };

    config.save_to(&config_path).unwrap();
    let reloaded = Config::load_from(&config_path).unwrap();

    assert_eq!(reloaded, config);
}

#[test]
fn test_log_level_directives_cover_all_crates() {
    let directives = LogLevel::Debug.as_directives();
    for crate_name in ["sotto", "sotto_core", "sotto_engine", "sotto_cli"] {
        assert!(directives.contains(&format!("{crate_name}=debug")));
    }
}

#[test]
fn test_language_auto_means_none() {
    let config = Config::default();
    assert_eq!(config.language(), None);

    let config = Config {
        model: ModelConfig {
            model: ModelId::Base,
            language: "en".to_string(),
        },
        ..Config::default()
    };
    assert_eq!(config.language(), Some("en".to_string()));
}

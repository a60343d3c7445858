use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use halcyon::config::Config;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert!(config.parallel);
    assert_eq!(config.concurrency, 10);
    assert_eq!(config.min_size, None);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
extensions = [".mp3", ".flac"]
max_size = 52428800
permanent_delete = true
backup_dir = "/mnt/archive"
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.extensions, vec![".mp3", ".flac"]);
    assert_eq!(config.max_size, Some(52_428_800));
    assert!(config.permanent_delete);
    assert_eq!(config.backup_dir, Some(PathBuf::from("/mnt/archive")));
    // Untouched keys keep their defaults.
    assert!(config.parallel);
}

#[test]
fn test_config_invalid_toml_fallback() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "parallel = [").unwrap();

    assert!(Config::from_file(&config_path).is_err());
    assert_eq!(Config::load(Some(&config_path)), Config::default());
}

#[test]
fn test_config_save_toml_round_trip() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    let config = Config {
        parallel: false,
        concurrency: 2,
        ..Config::default()
    };

    config.save(&config_path).unwrap();

    let saved = fs::read_to_string(&config_path).unwrap();
    assert!(saved.contains("parallel = false"));
    assert!(saved.contains("concurrency = 2"));
    assert_eq!(Config::from_file(&config_path).unwrap(), config);
}

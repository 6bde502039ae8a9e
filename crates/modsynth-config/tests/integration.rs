//! Configuration file round trips on disk.

use modsynth_config::{ConfigError, PacingConfig, SynthConfig};
use tempfile::tempdir;

#[test]
fn save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let config = SynthConfig {
        sample_rate: 48000,
        period_size: 256,
        device: Some("pulse".to_string()),
        pacing: PacingConfig {
            ahead_tolerance_ms: 10,
            behind_limit_ms: 100,
        },
    };

    config.save(&path).unwrap();
    assert!(path.exists());
    assert_eq!(SynthConfig::load(&path).unwrap(), config);
}

#[test]
fn explicit_missing_path_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = SynthConfig::load_or_default(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn hand_written_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "sample_rate = 22050\ndevice = \"USB\"\n\n[pacing]\nahead_tolerance_ms = 5\n",
    )
    .unwrap();

    let config = SynthConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.sample_rate, 22050);
    assert_eq!(config.period_size, 512);
    assert_eq!(config.device.as_deref(), Some("USB"));
    assert_eq!(config.pacing.ahead_tolerance_ms, 5);
    assert_eq!(config.pacing.behind_limit_ms, 250);
}

#[test]
fn invalid_file_reports_validation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[pacing]\nahead_tolerance_ms = 400\n").unwrap();
    let err = SynthConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("ahead_tolerance_ms"), "got: {err}");
}

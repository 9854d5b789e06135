use std::fs;

use sm83emu::config::{self, DEFAULT_MAX_CYCLES, RunnerConfig};
use tempfile::tempdir;

#[test]
fn missing_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let cfg = config::load_from_file(&dir.path().join("absent.toml"));
    assert_eq!(cfg, RunnerConfig::default());
    assert_eq!(cfg.max_cycles, DEFAULT_MAX_CYCLES);
    assert!(cfg.stop_on_result);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("runner.toml");
    fs::write(&path, "max_cycles = 5000\n").unwrap();

    let cfg = config::load_from_file(&path);
    assert_eq!(cfg.max_cycles, 5000);
    assert_eq!(cfg.boot_rom, None);
    assert!(cfg.stop_on_result);
}

#[test]
fn invalid_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("runner.toml");
    fs::write(&path, "max_cycles = \"lots\"\n").unwrap();

    assert_eq!(config::load_from_file(&path), RunnerConfig::default());
}

#[test]
fn saved_config_loads_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("runner.toml");
    let cfg = RunnerConfig {
        max_cycles: 42,
        boot_rom: Some("dmg_boot.bin".into()),
        stop_on_result: false,
    };

    config::save_to_file(&path, &cfg).unwrap();
    assert_eq!(config::load_from_file(&path), cfg);
}

use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Machine cycles the runner allows before giving up. Enough for the full
/// `cpu_instrs` ROM.
pub const DEFAULT_MAX_CYCLES: u64 = 120_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub max_cycles: u64,
    pub boot_rom: Option<PathBuf>,
    /// Stop as soon as the ROM reports a verdict.
    pub stop_on_result: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            boot_rom: None,
            stop_on_result: true,
        }
    }
}

pub fn load_from_file(path: &Path) -> RunnerConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to read config {}: {e}; using defaults", path.display());
            return RunnerConfig::default();
        }
    };

    match toml::from_str::<RunnerConfig>(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(
                "Failed to parse config {}: {e}; using defaults",
                path.display()
            );
            RunnerConfig::default()
        }
    }
}

pub fn save_to_file(path: &Path, cfg: &RunnerConfig) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let text = toml::to_string_pretty(cfg).unwrap_or_else(|_| String::new());
    std::fs::write(path, text)
}

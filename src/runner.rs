//! Headless test-ROM runner.
//!
//! Blargg ROMs print "Passed"/"Failed" over serial. Mooneye ROMs either send
//! the Fibonacci bytes 3, 5, 8, 13, 21, 34 (or six $42 bytes on failure) over
//! serial, or execute `LD B,B` with those values in B, C, D, E, H and L.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use sm83_core::cartridge::{Cartridge, CartridgeError};
use sm83_core::gameboy::{GameBoy, GameBoyConfig, GameBoyError};

use crate::config::RunnerConfig;

const FIB_SEQ: [u8; 6] = [3, 5, 8, 13, 21, 34];
const FAIL_SEQ: [u8; 6] = [0x42; 6];
const LD_B_B: u8 = 0x40;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to read boot ROM {path}: {source}")]
    BootRom {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Cartridge(#[from] CartridgeError),
    #[error(transparent)]
    Emulator(#[from] GameBoyError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
    /// The cycle budget ran out before the ROM reported anything.
    Timeout,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Timeout => "timed out",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Debug)]
pub struct Report {
    pub outcome: Outcome,
    pub cycles: u64,
    pub serial: Vec<u8>,
}

impl Report {
    /// Serial output with non-printable bytes escaped.
    pub fn serial_text(&self) -> String {
        let mut out = String::with_capacity(self.serial.len());
        for &b in &self.serial {
            if b.is_ascii_graphic() || b == b' ' || b == b'\n' {
                out.push(b as char);
            } else {
                out.push_str(&format!("\\x{b:02X}"));
            }
        }
        out
    }
}

/// Verdict carried by serial output so far, if any.
pub fn serial_verdict(serial: &[u8]) -> Option<Outcome> {
    let contains = |needle: &[u8]| serial.windows(needle.len()).any(|w| w == needle);
    if contains(b"Passed") || serial.ends_with(&FIB_SEQ) {
        Some(Outcome::Passed)
    } else if contains(b"Failed") || serial.ends_with(&FAIL_SEQ) {
        Some(Outcome::Failed)
    } else {
        None
    }
}

/// Verdict signalled through the `LD B,B` quit protocol, checked before the
/// instruction at PC runs.
pub fn register_verdict(gb: &mut GameBoy) -> Result<Option<Outcome>, GameBoyError> {
    if gb.peek(gb.cpu().pc())? != LD_B_B {
        return Ok(None);
    }
    let r = gb.cpu().registers();
    let regs = [r.b, r.c, r.d, r.e, r.h, r.l];
    Ok(if regs == FIB_SEQ {
        Some(Outcome::Passed)
    } else if regs == FAIL_SEQ {
        Some(Outcome::Failed)
    } else {
        None
    })
}

/// Load `rom_path` (and the configured boot ROM, if any) into a new machine.
pub fn build_machine(rom_path: &Path, config: &RunnerConfig) -> Result<GameBoy, RunError> {
    let cart = Cartridge::from_file(rom_path)?;
    let boot_rom = match &config.boot_rom {
        Some(path) => Some(std::fs::read(path).map_err(|source| RunError::BootRom {
            path: path.clone(),
            source,
        })?),
        None => None,
    };
    let gb_config = GameBoyConfig {
        skip_boot: boot_rom.is_none(),
        boot_rom,
    };
    Ok(GameBoy::new(cart, gb_config)?)
}

pub fn run(gb: &mut GameBoy, config: &RunnerConfig) -> Result<Report, RunError> {
    let start = gb.cycles();
    let mut outcome = None;
    while gb.cycles() - start < config.max_cycles {
        if let Some(verdict) = register_verdict(gb)? {
            outcome.get_or_insert(verdict);
        }
        gb.step()?;
        if outcome.is_none() {
            outcome = serial_verdict(gb.serial_output());
        }
        if outcome.is_some() && config.stop_on_result {
            break;
        }
    }
    let outcome = outcome.unwrap_or(Outcome::Timeout);
    let cycles = gb.cycles() - start;
    info!("{outcome} after {cycles} machine cycles");
    debug!("{}", gb.cpu().debug_state());
    Ok(Report {
        outcome,
        cycles,
        serial: gb.take_serial_output(),
    })
}

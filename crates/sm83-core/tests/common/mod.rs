use once_cell::sync::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};

use sm83_core::gameboy::GameBoy;

/// Where hand-assembled test programs are placed in ROM.
#[allow(dead_code)]
pub const PROGRAM_START: u16 = 0x0150;

static INIT: OnceCell<()> = OnceCell::new();

fn ensure_test_roms() {
    INIT.get_or_init(|| {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_roms");
        fs::create_dir_all(&dir).expect("failed to create test_roms directory");
        ensure_c_sp_test_rom_bundle(&dir);
    });
}

fn ensure_c_sp_test_rom_bundle(dir: &Path) {
    // ROM binaries are not checked in; download a known bundle on demand.
    let has_core_tree = dir.join("blargg").exists() && dir.join("mooneye-test-suite").exists();
    if has_core_tree {
        return;
    }

    let url = "https://github.com/c-sp/game-boy-test-roms/releases/download/v7.0/game-boy-test-roms-v7.0.zip";
    let resp = reqwest::blocking::get(url).expect("failed to download test roms");
    let status = resp.status();
    if !status.is_success() {
        panic!("failed to download test roms: {status}");
    }
    let bytes = resp.bytes().expect("failed to read rom bytes");
    let reader = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(reader).expect("failed to open zip archive");
    archive.extract(dir).expect("failed to extract test roms");
}

#[allow(dead_code)]
pub fn roms_dir() -> PathBuf {
    ensure_test_roms();
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test_roms")
}

#[allow(dead_code)]
pub fn rom_path<P: AsRef<Path>>(relative: P) -> PathBuf {
    roms_dir().join(relative)
}

#[allow(dead_code)]
pub fn serial_contains_result(serial: &[u8], checked_up_to: &mut usize) -> bool {
    const PASSED: &[u8] = b"Passed";
    const FAILED: &[u8] = b"Failed";

    let max_marker_len = PASSED.len().max(FAILED.len());
    let lookbehind = max_marker_len.saturating_sub(1);
    let start = checked_up_to.saturating_sub(lookbehind).min(serial.len());
    let window = &serial[start..];

    let found = window.windows(PASSED.len()).any(|chunk| chunk == PASSED)
        || window.windows(FAILED.len()).any(|chunk| chunk == FAILED);

    *checked_up_to = serial.len();
    found
}

/// 32 KiB ROM-only image with `program` at [`PROGRAM_START`] and a
/// `JP PROGRAM_START` at the entry point.
#[allow(dead_code)]
pub fn program_rom(program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0; 0x8000];
    let [lo, hi] = PROGRAM_START.to_le_bytes();
    rom[0x0100..0x0104].copy_from_slice(&[0x00, 0xC3, lo, hi]);
    let start = PROGRAM_START as usize;
    rom[start..start + program.len()].copy_from_slice(program);
    rom
}

/// Post-boot machine that has already jumped to `program`.
#[allow(dead_code)]
pub fn machine(program: &[u8]) -> GameBoy {
    machine_from_rom(program_rom(program))
}

/// Post-boot machine for an image built with [`program_rom`], stepped past
/// the entry point.
#[allow(dead_code)]
pub fn machine_from_rom(rom: Vec<u8>) -> GameBoy {
    let mut gb = GameBoy::from_rom(rom).expect("failed to build machine");
    // NOP; JP nn
    gb.step().unwrap();
    gb.step().unwrap();
    assert_eq!(gb.cpu().pc(), PROGRAM_START);
    gb
}

/// Step until PC equals `target`, failing after `max_steps` instructions.
#[allow(dead_code)]
pub fn run_to(gb: &mut GameBoy, target: u16, max_steps: usize) {
    for _ in 0..max_steps {
        if gb.cpu().pc() == target {
            return;
        }
        gb.step().unwrap();
    }
    panic!(
        "PC never reached {target:04X}: {}",
        gb.cpu().debug_state()
    );
}

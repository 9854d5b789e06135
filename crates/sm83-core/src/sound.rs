//! Sound register file at $FF10-$FF3F. Registers are stored and read back
//! through the hardware read masks; no audio is generated, so the channel
//! status bits in NR52 always read 0.

use crate::bus::{AddressRange, Device};

pub const SOUND_START: u16 = 0xFF10;
pub const SOUND_END: u16 = 0xFF3F;
pub const NR52_ADDR: u16 = 0xFF26;
const WAVE_RAM: AddressRange = 0xFF30..=0xFF3F;
const NR52_POWER: u8 = 0x80;

// Register values the DMG boot ROM leaves behind, $FF10-$FF3F.
const POST_BOOT_REGS: [u8; 0x30] = [
    0x80, 0xBF, 0xF3, 0xFF, 0xBF, 0xFF, 0x3F, 0x00, 0xFF, 0xBF, 0x7F, 0xFF, 0x9F, 0xFF, 0xBF, 0xFF,
    0xFF, 0x00, 0x00, 0xBF, 0x77, 0xF3, 0x80, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Bits that always read back as 1.
fn read_mask(addr: u16) -> u8 {
    match addr {
        0xFF10 => 0x80,
        0xFF11 | 0xFF16 => 0x3F,
        0xFF12 | 0xFF17 | 0xFF21 | 0xFF22 | 0xFF24 | 0xFF25 => 0x00,
        0xFF13 | 0xFF18 | 0xFF1B | 0xFF1D | 0xFF20 => 0xFF,
        0xFF14 | 0xFF19 | 0xFF1E | 0xFF23 => 0xBF,
        0xFF1A => 0x7F,
        0xFF1C => 0x9F,
        NR52_ADDR => 0x70,
        0xFF30..=0xFF3F => 0x00,
        _ => 0xFF,
    }
}

#[derive(Clone, Debug)]
pub struct Sound {
    regs: [u8; 0x30],
}

impl Default for Sound {
    fn default() -> Self {
        Self { regs: [0; 0x30] }
    }
}

impl Sound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn powered(&self) -> bool {
        self.regs[(NR52_ADDR - SOUND_START) as usize] & NR52_POWER != 0
    }

    fn index(addr: u16) -> usize {
        (addr - SOUND_START) as usize
    }
}

impl Device for Sound {
    fn name(&self) -> &'static str {
        "sound"
    }

    fn mapping(&self) -> Vec<AddressRange> {
        vec![SOUND_START..=SOUND_END]
    }

    fn read(&mut self, addr: u16) -> u8 {
        self.regs[Self::index(addr)] | read_mask(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        if addr == NR52_ADDR {
            if value & NR52_POWER == 0 {
                // Powering off clears every register except wave RAM.
                self.regs[..Self::index(NR52_ADDR)].fill(0);
            }
            self.regs[Self::index(NR52_ADDR)] = value & NR52_POWER;
            return;
        }
        if !self.powered() && !WAVE_RAM.contains(&addr) {
            return;
        }
        self.regs[Self::index(addr)] = value;
    }

    fn apply_post_boot(&mut self) {
        self.regs = POST_BOOT_REGS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_apply_masks() {
        let mut sound = Sound::new();
        sound.write(NR52_ADDR, 0x80);
        sound.write(0xFF11, 0x00);
        assert_eq!(sound.read(0xFF11), 0x3F);
        sound.write(0xFF13, 0x12);
        assert_eq!(sound.read(0xFF13), 0xFF, "frequency low is write-only");
        assert_eq!(sound.read(0xFF15), 0xFF, "unused");
        sound.write(0xFF24, 0x77);
        assert_eq!(sound.read(0xFF24), 0x77);
        assert_eq!(sound.read(NR52_ADDR), 0xF0);
    }

    #[test]
    fn power_off_clears_and_locks_registers() {
        let mut sound = Sound::new();
        sound.apply_post_boot();
        assert!(sound.powered());
        sound.write(0xFF30, 0xAB);
        sound.write(NR52_ADDR, 0x00);
        assert!(!sound.powered());
        assert_eq!(sound.read(0xFF24), 0x00);
        assert_eq!(sound.read(NR52_ADDR), 0x70);

        sound.write(0xFF24, 0x55);
        assert_eq!(sound.read(0xFF24), 0x00);
        // Wave RAM survives and stays writable.
        assert_eq!(sound.read(0xFF30), 0xAB);
        sound.write(0xFF31, 0xCD);
        assert_eq!(sound.read(0xFF31), 0xCD);
    }

    #[test]
    fn post_boot_values() {
        let mut sound = Sound::new();
        sound.apply_post_boot();
        assert_eq!(sound.read(0xFF10), 0x80);
        assert_eq!(sound.read(0xFF11), 0xBF);
        assert_eq!(sound.read(0xFF25), 0xF3);
    }
}

//! Plain storage devices: work RAM, high RAM and the unused I/O holes.

use crate::bus::{AddressRange, Device};

pub const WRAM_START: u16 = 0xC000;
pub const WRAM_END: u16 = 0xDFFF;
/// Echo RAM mirrors $C000-$DDFF.
pub const ECHO_RANGE: AddressRange = 0xE000..=0xFDFF;
pub const HRAM_START: u16 = 0xFF80;
pub const HRAM_END: u16 = 0xFFFE;

/// Fixed-size RAM mapped at a single contiguous range.
#[derive(Clone, Debug)]
pub struct Ram {
    name: &'static str,
    start: u16,
    data: Vec<u8>,
}

impl Ram {
    pub fn new(name: &'static str, range: AddressRange) -> Self {
        let len = (*range.end() - *range.start()) as usize + 1;
        Self {
            name,
            start: *range.start(),
            data: vec![0; len],
        }
    }

    /// 8 KiB of work RAM at $C000.
    pub fn work() -> Self {
        Self::new("wram", WRAM_START..=WRAM_END)
    }

    /// 127 bytes of high RAM at $FF80.
    pub fn high() -> Self {
        Self::new("hram", HRAM_START..=HRAM_END)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Device for Ram {
    fn name(&self) -> &'static str {
        self.name
    }

    fn mapping(&self) -> Vec<AddressRange> {
        vec![self.start..=self.start + (self.data.len() - 1) as u16]
    }

    fn read(&mut self, addr: u16) -> u8 {
        self.data[(addr - self.start) as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.data[(addr - self.start) as usize] = value;
    }
}

/// I/O addresses with no hardware behind them on the DMG, plus the unusable
/// area above OAM. Reads return $FF and writes are dropped.
#[derive(Clone, Debug)]
pub struct OpenBus {
    ranges: Vec<AddressRange>,
}

impl OpenBus {
    pub fn new(ranges: Vec<AddressRange>) -> Self {
        Self { ranges }
    }

    /// Unused DMG I/O registers.
    pub fn dmg_io() -> Self {
        Self::new(vec![
            0xFF03..=0xFF03,
            0xFF08..=0xFF0E,
            0xFF4C..=0xFF4F,
            0xFF51..=0xFF7F,
        ])
    }
}

impl Device for OpenBus {
    fn name(&self) -> &'static str {
        "open bus"
    }

    fn mapping(&self) -> Vec<AddressRange> {
        self.ranges.clone()
    }

    fn read(&mut self, _addr: u16) -> u8 {
        0xFF
    }

    fn write(&mut self, _addr: u16, _value: u8) {}
}

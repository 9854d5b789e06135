//! Interrupt Enable / Interrupt Flag registers.
//!
//! Both registers are owned by the CPU. Peripherals raise requests through
//! [`Interrupts::request`] from their `tick` hooks; the CPU reads the pending
//! set at the end of every instruction.

pub const IF_ADDR: u16 = 0xFF0F;
pub const IE_ADDR: u16 = 0xFFFF;

/// Only the low five bits of IF/IE name interrupt sources.
pub const SOURCE_MASK: u8 = 0x1F;

// IF bits 5-7 are not backed by storage and always read back as 1.
const IF_UNUSED_BITS: u8 = 0xE0;

/// Interrupt sources in priority order (lowest bit wins).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    VBlank = 0,
    Lcd = 1,
    Timer = 2,
    Serial = 3,
    Joypad = 4,
}

impl Interrupt {
    pub const ALL: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::Lcd,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    #[inline]
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Handler address (`0x40 + 8 * index`).
    #[inline]
    pub const fn vector(self) -> u16 {
        0x40 + 8 * self as u16
    }

    /// Highest-priority source in `pending`, if any.
    pub fn highest_priority(pending: u8) -> Option<Interrupt> {
        let pending = pending & SOURCE_MASK;
        if pending == 0 {
            return None;
        }
        Some(Self::ALL[pending.trailing_zeros() as usize])
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Interrupts {
    /// IE, all eight bits are stored.
    enable: u8,
    /// IF, only the low five bits are stored.
    flag: u8,
}

impl Interrupts {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn request(&mut self, interrupt: Interrupt) {
        self.flag |= interrupt.bit();
    }

    #[inline]
    pub fn acknowledge(&mut self, interrupt: Interrupt) {
        self.flag &= !interrupt.bit();
    }

    /// Sources that are both requested and enabled.
    #[inline]
    pub fn pending(&self) -> u8 {
        self.enable & self.flag & SOURCE_MASK
    }

    #[inline]
    pub fn flag(&self) -> u8 {
        self.flag
    }

    /// Bus-visible IF value.
    #[inline]
    pub fn read_flag(&self) -> u8 {
        self.flag | IF_UNUSED_BITS
    }

    #[inline]
    pub fn write_flag(&mut self, value: u8) {
        self.flag = value & SOURCE_MASK;
    }

    #[inline]
    pub fn read_enable(&self) -> u8 {
        self.enable
    }

    #[inline]
    pub fn write_enable(&mut self, value: u8) {
        self.enable = value;
    }
}

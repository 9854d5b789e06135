//! OAM DMA engine (gbdev.io/pandocs/OAM_DMA_Transfer.html).
//!
//! The DMA register at $FF46 is served by the CPU. Writing it arms a transfer
//! that starts a few machine cycles later and then copies one byte per machine
//! cycle from `value << 8` into OAM. The engine is stepped once per machine
//! cycle, after the peripherals have been clocked.

use log::debug;

use crate::bus::{Bus, BusError};

pub const DMA_ADDR: u16 = 0xFF46;

pub const OAM_START: u16 = 0xFE00;
pub const OAM_LEN: u16 = 0xA0;

// The write cycle is the first step; the transfer is active from the fourth
// machine cycle after it.
const START_DELAY: u8 = 5;

// Sources at $E000 and above alias 8 KiB lower.
const ECHO_BASE: u16 = 0xE000;
const ECHO_OFFSET: u16 = 0x2000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Transfer {
    source: u16,
    index: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OamDma {
    register: u8,
    /// Steps left until an armed transfer starts. Zero when nothing is armed.
    arm_delay: u8,
    transfer: Option<Transfer>,
}

impl OamDma {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value last written to $FF46.
    #[inline]
    pub fn read(&self) -> u8 {
        self.register
    }

    /// Arm a transfer from `value << 8`. A rewrite while a transfer is running
    /// restarts the arm delay; the running transfer keeps copying until the
    /// new one takes over.
    pub fn write(&mut self, value: u8) {
        if self.arm_delay > 0 || self.transfer.is_some() {
            debug!("OAM DMA restarted from ${:02X}00", value);
        }
        self.register = value;
        self.arm_delay = START_DELAY;
    }

    #[inline]
    pub fn in_progress(&self) -> bool {
        self.transfer.is_some()
    }

    /// Advance by one machine cycle, copying at most one byte.
    pub fn step(&mut self, bus: &mut Bus) -> Result<(), BusError> {
        if self.arm_delay > 0 {
            self.arm_delay -= 1;
            if self.arm_delay == 0 {
                let source = (self.register as u16) << 8;
                debug!("OAM DMA started from ${source:04X}");
                self.transfer = Some(Transfer { source, index: 0 });
                return Ok(());
            }
        }

        let Some(transfer) = self.transfer.as_mut() else {
            return Ok(());
        };
        let mut src = transfer.source.wrapping_add(transfer.index);
        if src >= ECHO_BASE {
            src -= ECHO_OFFSET;
        }
        let value = bus.read(src)?;
        bus.write(OAM_START + transfer.index, value)?;
        transfer.index += 1;
        if transfer.index == OAM_LEN {
            self.transfer = None;
        }
        Ok(())
    }

    /// Whether a CPU access to `addr` is cut off while a transfer runs. ROM,
    /// work RAM and $FF00-$FFFF stay reachable. VRAM, cartridge RAM and OAM
    /// read $FF and drop writes.
    pub fn blocks(&self, addr: u16) -> bool {
        self.in_progress() && matches!(addr, 0x8000..=0xBFFF | 0xFE00..=0xFEFF)
    }
}

//! DIV/TIMA/TMA/TAC (gbdev.io/pandocs/Timer_and_Divider_Registers.html).
//!
//! TIMA is clocked by the falling edge of one bit of the 16-bit system
//! counter, ANDed with the TAC enable bit. Writes to DIV and TAC can create
//! such an edge on their own.

use crate::bus::{AddressRange, Device};
use crate::interrupts::{Interrupt, Interrupts};

pub const DIV_ADDR: u16 = 0xFF04;
pub const TIMA_ADDR: u16 = 0xFF05;
pub const TMA_ADDR: u16 = 0xFF06;
pub const TAC_ADDR: u16 = 0xFF07;

const DOTS_PER_M_CYCLE: u16 = 4;
const TAC_ENABLE: u8 = 0x04;
const TAC_UNUSED_BITS: u8 = 0xF8;
// Dots between TIMA overflow and the TMA reload.
const RELOAD_DELAY: u8 = 3;
// Internal counter value the DMG boot ROM leaves behind.
const POST_BOOT_COUNTER: u16 = 0xABCC;

#[derive(Clone, Debug, Default)]
pub struct Timer {
    /// System counter, DIV is the upper byte.
    counter: u16,
    tima: u8,
    tma: u8,
    tac: u8,
    last_signal: bool,
    /// TMA value before a write in the current machine cycle.
    tma_latch: Option<u8>,
    pending_reload: Option<u8>,
    reload_delay: u8,
    /// Set for the machine cycle in which TIMA is reloaded.
    reloading: bool,
    /// Timer interrupt raised outside `tick` (by a register write).
    irq_latched: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn div(&self) -> u8 {
        (self.counter >> 8) as u8
    }

    pub fn counter(&self) -> u16 {
        self.counter
    }

    pub fn tima(&self) -> u8 {
        self.tima
    }

    fn signal(counter: u16, tac: u8) -> bool {
        if tac & TAC_ENABLE == 0 {
            return false;
        }
        let bit = match tac & 0x03 {
            0x00 => 9,
            0x01 => 3,
            0x02 => 5,
            _ => 7,
        };
        counter & (1 << bit) != 0
    }

    /// Apply a reload whose delay has elapsed. Returns whether the Timer
    /// interrupt fires.
    fn advance_reload(&mut self) -> bool {
        self.reloading = false;
        let Some(value) = self.pending_reload else {
            return false;
        };
        if self.reload_delay > 0 {
            self.reload_delay -= 1;
            return false;
        }
        self.tima = value;
        self.pending_reload = None;
        self.reloading = true;
        true
    }

    fn increment(&mut self, tma_old: Option<u8>) {
        if self.tima == 0xFF {
            self.tima = 0;
            self.pending_reload = Some(tma_old.unwrap_or(self.tma));
            self.reload_delay = RELOAD_DELAY;
        } else {
            self.tima += 1;
        }
    }

    /// Move the counter to `counter`, clocking TIMA on a falling edge.
    fn set_counter(&mut self, counter: u16, tma_old: Option<u8>) {
        let prev = self.last_signal;
        self.counter = counter;
        let new = Self::signal(self.counter, self.tac);
        if prev && !new {
            self.increment(tma_old);
        }
        self.last_signal = new;
    }

    fn step_dot(&mut self) -> bool {
        let fired = self.advance_reload();
        let tma_old = self.tma_latch.take();
        self.set_counter(self.counter.wrapping_add(1), tma_old);
        fired
    }
}

impl Device for Timer {
    fn name(&self) -> &'static str {
        "timer"
    }

    fn mapping(&self) -> Vec<AddressRange> {
        vec![DIV_ADDR..=TAC_ADDR]
    }

    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            DIV_ADDR => self.div(),
            TIMA_ADDR => self.tima,
            TMA_ADDR => self.tma,
            TAC_ADDR => self.tac | TAC_UNUSED_BITS,
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            DIV_ADDR => {
                if self.advance_reload() {
                    self.irq_latched = true;
                }
                let tma_old = self.tma_latch.take();
                self.set_counter(0, tma_old);
            }
            TIMA_ADDR => {
                // Ignored in the cycle TIMA is reloaded.
                if self.reloading || (self.pending_reload.is_some() && self.reload_delay == 0) {
                    return;
                }
                self.tima = value;
                // A write while the reload is pending cancels it.
                self.pending_reload = None;
                self.reload_delay = 0;
            }
            TMA_ADDR => {
                self.tma_latch = Some(self.tma);
                self.tma = value;
                if self.pending_reload.is_some() {
                    self.pending_reload = Some(value);
                }
                if self.reloading {
                    self.tima = value;
                }
            }
            TAC_ADDR => {
                self.tac = value & 0x07;
                let tma_old = self.tma_latch.take();
                self.set_counter(self.counter, tma_old);
            }
            _ => {}
        }
    }

    fn tick(&mut self, interrupts: &mut Interrupts) {
        let mut fired = std::mem::take(&mut self.irq_latched);
        for _ in 0..DOTS_PER_M_CYCLE {
            fired |= self.step_dot();
        }
        if fired {
            interrupts.request(Interrupt::Timer);
        }
    }

    fn apply_post_boot(&mut self) {
        *self = Self {
            counter: POST_BOOT_COUNTER,
            ..Self::default()
        };
    }
}

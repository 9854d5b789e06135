//! P1 joypad register (gbdev.io/pandocs/Joypad_Input.html).

use log::debug;

use crate::bus::{AddressRange, Device};
use crate::interrupts::{Interrupt, Interrupts};

pub const P1_ADDR: u16 = 0xFF00;

const SELECT_DPAD: u8 = 0x10;
const SELECT_BUTTONS: u8 = 0x20;
const SELECT_MASK: u8 = SELECT_DPAD | SELECT_BUTTONS;
const UNUSED_BITS: u8 = 0xC0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    /// Select line the button sits on and its bit in the low nibble.
    const fn line(self) -> (u8, u8) {
        match self {
            Button::Right => (SELECT_DPAD, 0x01),
            Button::Left => (SELECT_DPAD, 0x02),
            Button::Up => (SELECT_DPAD, 0x04),
            Button::Down => (SELECT_DPAD, 0x08),
            Button::A => (SELECT_BUTTONS, 0x01),
            Button::B => (SELECT_BUTTONS, 0x02),
            Button::Select => (SELECT_BUTTONS, 0x04),
            Button::Start => (SELECT_BUTTONS, 0x08),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Joypad {
    /// P1 bits 4-5, a 0 selects the group.
    select: u8,
    /// Pressed d-pad directions, 1 = pressed.
    dpad: u8,
    /// Pressed action buttons, 1 = pressed.
    buttons: u8,
    irq_latched: bool,
}

impl Default for Joypad {
    fn default() -> Self {
        Self {
            select: SELECT_MASK,
            dpad: 0,
            buttons: 0,
            irq_latched: false,
        }
    }
}

impl Joypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Low nibble as the CPU sees it: 0 means pressed on a selected line.
    fn lines(&self) -> u8 {
        let mut low = 0x0F;
        if self.select & SELECT_DPAD == 0 {
            low &= !self.dpad;
        }
        if self.select & SELECT_BUTTONS == 0 {
            low &= !self.buttons;
        }
        low & 0x0F
    }

    /// Apply `change` and latch an interrupt if any line fell from high to low.
    fn update(&mut self, change: impl FnOnce(&mut Self)) {
        let before = self.lines();
        change(self);
        let after = self.lines();
        if before & !after != 0 {
            self.irq_latched = true;
        }
    }

    pub fn press(&mut self, button: Button) {
        debug!("press {button:?}");
        let (group, bit) = button.line();
        self.update(|pad| match group {
            SELECT_DPAD => pad.dpad |= bit,
            _ => pad.buttons |= bit,
        });
    }

    pub fn release(&mut self, button: Button) {
        let (group, bit) = button.line();
        self.update(|pad| match group {
            SELECT_DPAD => pad.dpad &= !bit,
            _ => pad.buttons &= !bit,
        });
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        let (group, bit) = button.line();
        let held = if group == SELECT_DPAD {
            self.dpad
        } else {
            self.buttons
        };
        held & bit != 0
    }
}

impl Device for Joypad {
    fn name(&self) -> &'static str {
        "joypad"
    }

    fn mapping(&self) -> Vec<AddressRange> {
        vec![P1_ADDR..=P1_ADDR]
    }

    fn read(&mut self, _addr: u16) -> u8 {
        UNUSED_BITS | self.select | self.lines()
    }

    fn write(&mut self, _addr: u16, value: u8) {
        self.update(|pad| pad.select = value & SELECT_MASK);
    }

    fn tick(&mut self, interrupts: &mut Interrupts) {
        if std::mem::take(&mut self.irq_latched) {
            interrupts.request(Interrupt::Joypad);
        }
    }

    fn apply_post_boot(&mut self) {
        self.select = SELECT_MASK;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_selected_reads_high() {
        let mut pad = Joypad::new();
        pad.press(Button::A);
        assert_eq!(pad.read(P1_ADDR), 0xFF);
    }

    #[test]
    fn selected_group_shows_pressed_buttons() {
        let mut pad = Joypad::new();
        pad.press(Button::Start);
        pad.press(Button::Left);
        pad.write(P1_ADDR, 0x10); // buttons
        assert_eq!(pad.read(P1_ADDR), 0xD7);
        pad.write(P1_ADDR, 0x20); // d-pad
        assert_eq!(pad.read(P1_ADDR), 0xED);
        pad.release(Button::Left);
        assert_eq!(pad.read(P1_ADDR), 0xEF);
        assert!(pad.is_pressed(Button::Start));
        assert!(!pad.is_pressed(Button::Left));
    }

    #[test]
    fn press_on_selected_line_requests_interrupt() {
        let mut pad = Joypad::new();
        let mut irq = Interrupts::new();
        pad.press(Button::B);
        pad.tick(&mut irq);
        assert_eq!(irq.flag(), 0, "group not selected");

        pad.release(Button::B);
        pad.write(P1_ADDR, 0x10);
        pad.press(Button::B);
        pad.tick(&mut irq);
        assert_eq!(irq.flag(), Interrupt::Joypad.bit());

        irq.write_flag(0);
        pad.release(Button::B);
        pad.tick(&mut irq);
        assert_eq!(irq.flag(), 0, "release is a rising edge");
    }

    #[test]
    fn selecting_a_held_group_is_a_falling_edge() {
        let mut pad = Joypad::new();
        let mut irq = Interrupts::new();
        pad.press(Button::Down);
        pad.write(P1_ADDR, 0x20);
        pad.tick(&mut irq);
        assert_eq!(irq.flag(), Interrupt::Joypad.bit());
    }
}

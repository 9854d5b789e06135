//! Facade that attaches every DMG device to a [`Bus`] and drives the CPU.

use log::debug;
use thiserror::Error;

use crate::bus::{Bus, BusError, Handle};
use crate::cartridge::{Cartridge, CartridgeError};
use crate::cpu::{Cpu, CpuError, MachineCycle};
use crate::disasm::{Disassembler, Line};
use crate::interrupts::Interrupts;
use crate::joypad::{Button, Joypad};
use crate::memory::{ECHO_RANGE, OpenBus, Ram, WRAM_START};
use crate::ppu::Ppu;
use crate::serial::Serial;
use crate::sound::Sound;
use crate::timer::Timer;

/// Machine cycles in one LCD frame.
pub const CYCLES_PER_FRAME: u64 = 17_556;

// Longest SM83 instruction.
const MAX_INSTRUCTION_LEN: usize = 3;

#[derive(Debug, Error)]
pub enum GameBoyError {
    #[error(transparent)]
    Bus(#[from] BusError),
    #[error(transparent)]
    Cpu(#[from] CpuError),
    #[error(transparent)]
    Cartridge(#[from] CartridgeError),
}

#[derive(Clone, Debug, Default)]
pub struct GameBoyConfig {
    /// 256-byte DMG boot ROM. Ignored when `skip_boot` is set.
    pub boot_rom: Option<Vec<u8>>,
    /// Start at $0100 with the registers the boot ROM leaves behind.
    pub skip_boot: bool,
}

/// Advances every clocked device once per machine cycle.
#[derive(Clone, Copy, Debug)]
pub struct PeripheralClock {
    timer: Handle<Timer>,
    ppu: Handle<Ppu>,
    serial: Handle<Serial>,
    joypad: Handle<Joypad>,
}

impl MachineCycle for PeripheralClock {
    fn machine_cycle(&mut self, bus: &mut Bus, interrupts: &mut Interrupts) {
        bus.tick(self.timer, interrupts);
        bus.tick(self.ppu, interrupts);
        bus.tick(self.serial, interrupts);
        bus.tick(self.joypad, interrupts);
    }
}

pub struct GameBoy {
    cpu: Cpu<PeripheralClock>,
    bus: Bus,
    cartridge: Handle<Cartridge>,
}

impl GameBoy {
    pub fn new(cartridge: Cartridge, config: GameBoyConfig) -> Result<Self, GameBoyError> {
        let booting = !config.skip_boot && config.boot_rom.is_some();
        let cartridge = match config.boot_rom {
            Some(image) if booting => cartridge.with_boot_rom(image)?,
            _ => cartridge,
        };

        let mut bus = Bus::new();
        Cpu::<PeripheralClock>::claim_registers(&mut bus)?;
        let cartridge = bus.attach(cartridge)?;
        let ppu = bus.attach(Ppu::new())?;
        bus.attach(Ram::work())?;
        bus.mirror(ECHO_RANGE, WRAM_START)?;
        let joypad = bus.attach(Joypad::new())?;
        let serial = bus.attach(Serial::new())?;
        let timer = bus.attach(Timer::new())?;
        bus.attach(Sound::new())?;
        bus.attach(Ram::high())?;
        bus.attach(OpenBus::dmg_io())?;

        let clock = PeripheralClock {
            timer,
            ppu,
            serial,
            joypad,
        };
        let cpu = if booting {
            Cpu::power_on(clock)
        } else {
            bus.set_post_boot_state();
            Cpu::new(clock)
        };
        debug!(
            "devices: {}",
            bus.device_names().collect::<Vec<_>>().join(", ")
        );
        Ok(Self {
            cpu,
            bus,
            cartridge,
        })
    }

    /// Load `rom` and start from the post-boot state.
    pub fn from_rom(rom: Vec<u8>) -> Result<Self, GameBoyError> {
        let config = GameBoyConfig {
            skip_boot: true,
            ..GameBoyConfig::default()
        };
        Self::new(Cartridge::load(rom)?, config)
    }

    pub fn cpu(&self) -> &Cpu<PeripheralClock> {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu<PeripheralClock> {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.bus.get(self.cartridge)
    }

    pub fn ppu(&self) -> Option<&Ppu> {
        self.bus.get(self.cpu.clock().ppu)
    }

    pub fn timer(&self) -> Option<&Timer> {
        self.bus.get(self.cpu.clock().timer)
    }

    /// Machine cycles elapsed since power on.
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles()
    }

    /// Run one instruction (or interrupt dispatch, or idle HALT/STOP cycle).
    pub fn step(&mut self) -> Result<(), GameBoyError> {
        self.cpu.tick(&mut self.bus)?;
        Ok(())
    }

    /// Run whole instructions until at least `cycles` more machine cycles
    /// have elapsed.
    pub fn run_cycles(&mut self, cycles: u64) -> Result<(), GameBoyError> {
        let target = self.cpu.cycles() + cycles;
        while self.cpu.cycles() < target {
            self.step()?;
        }
        Ok(())
    }

    /// Run until the PPU enters VBlank, or one frame's worth of cycles when
    /// the LCD is off.
    pub fn run_frame(&mut self) -> Result<(), GameBoyError> {
        let ppu = self.cpu.clock().ppu;
        let limit = self.cpu.cycles() + CYCLES_PER_FRAME;
        if let Some(ppu) = self.bus.get_mut(ppu) {
            ppu.clear_frame_flag();
        }
        while self.cpu.cycles() < limit {
            self.step()?;
            if self.bus.get(ppu).is_some_and(Ppu::frame_ready) {
                break;
            }
        }
        Ok(())
    }

    pub fn press(&mut self, button: Button) {
        if let Some(pad) = self.bus.get_mut(self.cpu.clock().joypad) {
            pad.press(button);
        }
    }

    pub fn release(&mut self, button: Button) {
        if let Some(pad) = self.bus.get_mut(self.cpu.clock().joypad) {
            pad.release(button);
        }
    }

    /// Bytes the program has sent over the serial port so far.
    pub fn serial_output(&self) -> &[u8] {
        self.bus
            .get(self.cpu.clock().serial)
            .map_or(&[][..], Serial::output)
    }

    pub fn take_serial_output(&mut self) -> Vec<u8> {
        self.bus
            .get_mut(self.cpu.clock().serial)
            .map(Serial::take_output)
            .unwrap_or_default()
    }

    /// Read memory as the CPU would, without advancing time.
    pub fn peek(&mut self, addr: u16) -> Result<u8, GameBoyError> {
        Ok(self.cpu.read_memory(&mut self.bus, addr)?)
    }

    /// Disassemble up to `count` instructions starting at PC.
    pub fn disassemble_at_pc(&mut self, count: usize) -> Result<Vec<Line>, GameBoyError> {
        let pc = self.cpu.pc();
        let len = (count * MAX_INSTRUCTION_LEN).min(0x10000 - pc as usize);
        let mut bytes = Vec::with_capacity(len);
        for offset in 0..len {
            bytes.push(self.peek(pc.wrapping_add(offset as u16))?);
        }
        Ok(Disassembler::with_base(&bytes, pc)
            .lines()
            .take(count)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::RunState;
    use crate::interrupts::Interrupt;

    fn rom(program: &[u8]) -> Vec<u8> {
        let mut rom = vec![0; 0x8000];
        rom[0x0100..0x0100 + program.len()].copy_from_slice(program);
        rom
    }

    #[test]
    fn whole_address_space_is_owned() {
        let gb = GameBoy::from_rom(rom(&[])).unwrap();
        assert!(gb.bus().unmapped().is_empty());
        assert_eq!(gb.bus().owner_of(0xE123), Some("wram"));
        assert_eq!(gb.bus().owner_of(0xFF0F), Some("cpu"));
        assert_eq!(gb.bus().owner_of(0xFF04), Some("timer"));
    }

    #[test]
    fn post_boot_state() {
        let mut gb = GameBoy::from_rom(rom(&[])).unwrap();
        assert_eq!(gb.cpu().pc(), 0x0100);
        assert_eq!(gb.peek(0xFF40).unwrap(), 0x91);
        assert_eq!(gb.peek(0xFF04).unwrap(), 0xAB);
        assert_eq!(gb.peek(0xFF0F).unwrap(), 0xE1);
    }

    #[test]
    fn serial_output_is_captured() {
        // LD A,'O'; LDH (SB),A; LD A,$81; LDH (SC),A; JR -2
        let program = [0x3E, b'O', 0xE0, 0x01, 0x3E, 0x81, 0xE0, 0x02, 0x18, 0xFE];
        let mut gb = GameBoy::from_rom(rom(&program)).unwrap();
        gb.run_cycles(2000).unwrap();
        assert_eq!(gb.serial_output(), b"O");
        assert_ne!(gb.cpu().interrupts().flag() & Interrupt::Serial.bit(), 0);
        assert_eq!(gb.take_serial_output(), b"O".to_vec());
        assert!(gb.serial_output().is_empty());
    }

    #[test]
    fn joypad_press_ends_stop() {
        // LD A,$10; LDH (P1),A; STOP; NOP
        let program = [0x3E, 0x10, 0xE0, 0x00, 0x10, 0x00, 0x00];
        let mut gb = GameBoy::from_rom(rom(&program)).unwrap();
        for _ in 0..3 {
            gb.step().unwrap();
        }
        assert_eq!(gb.cpu().state(), RunState::Stopped);
        assert_eq!(gb.peek(0xFF04).unwrap(), 0, "STOP resets DIV");
        gb.run_cycles(100).unwrap();
        assert_eq!(gb.cpu().state(), RunState::Stopped);

        gb.press(Button::A);
        gb.run_cycles(3).unwrap();
        assert_eq!(gb.cpu().state(), RunState::Normal);
    }

    #[test]
    fn run_frame_stops_at_vblank() {
        let mut gb = GameBoy::from_rom(rom(&[0x18, 0xFE])).unwrap();
        gb.run_frame().unwrap();
        assert!(gb.ppu().unwrap().frame_ready());
        assert_eq!(gb.peek(0xFF44).unwrap(), 144);
    }

    #[test]
    fn boot_rom_runs_from_zero() {
        let mut boot = vec![0x00; 0x100];
        // LD A,1; LDH ($50),A at the end of the boot ROM.
        boot[0xFC..].copy_from_slice(&[0x3E, 0x01, 0xE0, 0x50]);
        let config = GameBoyConfig {
            boot_rom: Some(boot),
            skip_boot: false,
        };
        let cart = Cartridge::load(rom(&[0x00])).unwrap();
        let mut gb = GameBoy::new(cart, config).unwrap();
        assert_eq!(gb.cpu().pc(), 0x0000);
        assert!(gb.cartridge().unwrap().boot_rom_mapped());
        while gb.cpu().pc() < 0x0100 {
            gb.step().unwrap();
        }
        assert!(!gb.cartridge().unwrap().boot_rom_mapped());
    }

    #[test]
    fn disassembles_from_pc() {
        let mut gb = GameBoy::from_rom(rom(&[0x00, 0xC3, 0x50, 0x01])).unwrap();
        let lines = gb.disassemble_at_pc(2).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].to_string(), "0100: 00        NOP");
        assert_eq!(lines[1].text, "JP $0150");
    }
}

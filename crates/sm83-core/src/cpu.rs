//! SM83 execution engine.
//!
//! Instructions run to completion inside [`Cpu::tick`]. Each handler issues
//! its bus accesses in hardware order and every access, as well as every
//! internal delay, is one machine cycle: the clock callback runs once and the
//! OAM DMA engine advances once.

use log::debug;
#[cfg(feature = "cpu-trace")]
use log::trace;
use thiserror::Error;

use crate::alu::{self, Shift};
use crate::bus::{Bus, BusError};
use crate::dma::{DMA_ADDR, OamDma};
use crate::interrupts::{IE_ADDR, IF_ADDR, Interrupt, Interrupts};
use crate::opcodes::{CB_OPCODES, Handler, OPCODES};
use crate::registers::{
    Condition, FLAG_C, FLAG_H, FLAG_N, FLAG_Z, Reg8, Reg16, Registers, StackPair,
};
use crate::timer::DIV_ADDR;

/// Addresses the CPU serves itself instead of routing them to a device.
pub const CPU_REGISTERS: [u16; 3] = [IF_ADDR, DMA_ADDR, IE_ADDR];

const HIGH_PAGE: u16 = 0xFF00;

// EI takes effect after the instruction that follows it.
const EI_DELAY: u8 = 2;

/// Work done for every elapsed machine cycle.
pub trait MachineCycle {
    fn machine_cycle(&mut self, bus: &mut Bus, interrupts: &mut Interrupts);
}

impl<F> MachineCycle for F
where
    F: FnMut(&mut Bus, &mut Interrupts),
{
    fn machine_cycle(&mut self, bus: &mut Bus, interrupts: &mut Interrupts) {
        self(bus, interrupts)
    }
}

/// Clock that advances nothing. Useful for exercising the CPU on its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopClock;

impl MachineCycle for NoopClock {
    fn machine_cycle(&mut self, _bus: &mut Bus, _interrupts: &mut Interrupts) {}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Normal,
    Halted,
    /// The next opcode fetch does not advance PC.
    HaltBug,
    Stopped,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CpuError {
    #[error(transparent)]
    Bus(#[from] BusError),
    #[error("illegal opcode ${opcode:02X} at ${pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },
}

/// Snapshot of everything the CPU owns apart from the DMA engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuView {
    pub registers: Registers,
    pub ime: bool,
    pub request_ime: u8,
    pub interrupt_enable: u8,
    pub interrupt_flag: u8,
    pub state: RunState,
}

pub struct Cpu<C: MachineCycle = NoopClock> {
    regs: Registers,
    ime: bool,
    /// Machine-cycle countdown until IME is set after `EI`.
    request_ime: u8,
    state: RunState,
    interrupts: Interrupts,
    dma: OamDma,
    /// Elapsed machine cycles.
    cycles: u64,
    clock: C,
}

impl<C: MachineCycle> Cpu<C> {
    /// CPU in the state the boot ROM hands over at $0100.
    pub fn new(clock: C) -> Self {
        let mut cpu = Self::power_on(clock);
        cpu.set_post_boot_registers();
        cpu
    }

    /// CPU with zeroed registers starting at $0000, for running a boot ROM.
    pub fn power_on(clock: C) -> Self {
        Self {
            regs: Registers::default(),
            ime: false,
            request_ime: 0,
            state: RunState::Normal,
            interrupts: Interrupts::new(),
            dma: OamDma::new(),
            cycles: 0,
            clock,
        }
    }

    /// Reserve the CPU-owned addresses on `bus` so no device can claim them.
    pub fn claim_registers(bus: &mut Bus) -> Result<(), BusError> {
        bus.reserve_for_cpu(&CPU_REGISTERS)
    }

    pub fn set_post_boot_registers(&mut self) {
        self.regs = Registers::post_boot();
        self.ime = false;
        self.request_ime = 0;
        self.state = RunState::Normal;
        self.interrupts.write_enable(0x00);
        self.interrupts.write_flag(Interrupt::VBlank.bit());
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    pub fn ime(&self) -> bool {
        self.ime
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn interrupts(&self) -> &Interrupts {
        &self.interrupts
    }

    /// IE/IF access for actors outside the machine-cycle callback.
    pub fn interrupts_mut(&mut self) -> &mut Interrupts {
        &mut self.interrupts
    }

    pub fn dma(&self) -> &OamDma {
        &self.dma
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn view(&self) -> CpuView {
        CpuView {
            registers: self.regs,
            ime: self.ime,
            request_ime: self.request_ime,
            interrupt_enable: self.interrupts.read_enable(),
            interrupt_flag: self.interrupts.flag(),
            state: self.state,
        }
    }

    pub fn apply_view(&mut self, view: &CpuView) {
        self.regs = view.registers;
        self.ime = view.ime;
        self.request_ime = view.request_ime;
        self.interrupts.write_enable(view.interrupt_enable);
        self.interrupts.write_flag(view.interrupt_flag);
        self.state = view.state;
    }

    /// Formatted CPU state string for debugging.
    pub fn debug_state(&self) -> String {
        format!(
            "AF:{:04X} BC:{:04X} DE:{:04X} HL:{:04X} PC:{:04X} SP:{:04X} IME:{} CY:{}",
            self.regs.af(),
            self.regs.bc(),
            self.regs.de(),
            self.regs.hl(),
            self.regs.pc,
            self.regs.sp,
            self.ime as u8,
            self.cycles
        )
    }

    /// Read `addr` the way the CPU sees it, without spending a cycle.
    pub fn read_memory(&mut self, bus: &mut Bus, addr: u16) -> Result<u8, BusError> {
        match addr {
            IF_ADDR => Ok(self.interrupts.read_flag()),
            IE_ADDR => Ok(self.interrupts.read_enable()),
            DMA_ADDR => Ok(self.dma.read()),
            _ if self.dma.blocks(addr) => Ok(0xFF),
            _ => bus.read(addr),
        }
    }

    /// Write `addr` the way the CPU does, without spending a cycle.
    pub fn write_memory(&mut self, bus: &mut Bus, addr: u16, value: u8) -> Result<(), BusError> {
        match addr {
            IF_ADDR => self.interrupts.write_flag(value),
            IE_ADDR => self.interrupts.write_enable(value),
            DMA_ADDR => self.dma.write(value),
            _ if self.dma.blocks(addr) => {}
            _ => bus.write(addr, value)?,
        }
        Ok(())
    }

    /// Run one instruction, one interrupt dispatch, or one machine cycle of
    /// HALT/STOP.
    pub fn tick(&mut self, bus: &mut Bus) -> Result<(), CpuError> {
        if self.request_ime > 0 {
            self.request_ime -= 1;
            if self.request_ime == 0 {
                self.ime = true;
            }
        }

        match self.state {
            RunState::Normal | RunState::HaltBug => {
                if self.ime && self.interrupts.pending() != 0 {
                    return self.dispatch_interrupt(bus);
                }
                self.step_instruction(bus)?;
            }
            RunState::Halted => {
                if self.interrupts.pending() != 0 {
                    self.state = RunState::Normal;
                    if self.ime {
                        return self.dispatch_interrupt(bus);
                    }
                    self.step_instruction(bus)?;
                } else {
                    self.cycle(bus)?;
                }
            }
            RunState::Stopped => {
                if self.interrupts.flag() & Interrupt::Joypad.bit() != 0 {
                    debug!("leaving STOP at ${:04X}", self.regs.pc);
                    self.state = RunState::Normal;
                }
                self.cycle(bus)?;
            }
        }

        self.service_interrupts(bus)
    }

    fn service_interrupts(&mut self, bus: &mut Bus) -> Result<(), CpuError> {
        // STOP only ends through the joypad line.
        if self.state == RunState::Stopped || !self.ime || self.interrupts.pending() == 0 {
            return Ok(());
        }
        self.dispatch_interrupt(bus)
    }

    fn dispatch_interrupt(&mut self, bus: &mut Bus) -> Result<(), CpuError> {
        self.ime = false;
        self.state = RunState::Normal;
        self.cycle(bus)?;
        self.cycle(bus)?;

        let [hi, lo] = self.regs.pc.to_be_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write8(bus, self.regs.sp, hi)?;

        // The high-byte push may have landed on IE and changed what is pending.
        let Some(interrupt) = Interrupt::highest_priority(self.interrupts.pending()) else {
            self.regs.sp = self.regs.sp.wrapping_sub(1);
            self.write8(bus, self.regs.sp, lo)?;
            self.cycle(bus)?;
            debug!("interrupt dispatch cancelled by IE write");
            self.regs.pc = 0x0000;
            return Ok(());
        };
        self.interrupts.acknowledge(interrupt);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write8(bus, self.regs.sp, lo)?;
        self.cycle(bus)?;
        self.regs.pc = interrupt.vector();
        Ok(())
    }

    #[inline]
    fn cycle(&mut self, bus: &mut Bus) -> Result<(), CpuError> {
        self.cycles += 1;
        self.clock.machine_cycle(bus, &mut self.interrupts);
        self.dma.step(bus)?;
        Ok(())
    }

    #[inline]
    fn read8(&mut self, bus: &mut Bus, addr: u16) -> Result<u8, CpuError> {
        let value = self.read_memory(bus, addr)?;
        self.cycle(bus)?;
        Ok(value)
    }

    #[inline]
    fn write8(&mut self, bus: &mut Bus, addr: u16, value: u8) -> Result<(), CpuError> {
        self.write_memory(bus, addr, value)?;
        self.cycle(bus)
    }

    #[inline]
    fn fetch8(&mut self, bus: &mut Bus) -> Result<u8, CpuError> {
        let pc = self.regs.pc;
        self.regs.pc = pc.wrapping_add(1);
        self.read8(bus, pc)
    }

    #[inline]
    fn fetch16(&mut self, bus: &mut Bus) -> Result<u16, CpuError> {
        let lo = self.fetch8(bus)?;
        let hi = self.fetch8(bus)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    fn fetch_opcode(&mut self, bus: &mut Bus) -> Result<u8, CpuError> {
        let pc = self.regs.pc;
        if self.state == RunState::HaltBug {
            self.state = RunState::Normal;
        } else {
            self.regs.pc = pc.wrapping_add(1);
        }
        self.read8(bus, pc)
    }

    fn push16(&mut self, bus: &mut Bus, value: u16) -> Result<(), CpuError> {
        let [hi, lo] = value.to_be_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write8(bus, self.regs.sp, hi)?;
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write8(bus, self.regs.sp, lo)
    }

    fn pop16(&mut self, bus: &mut Bus) -> Result<u16, CpuError> {
        let lo = self.read8(bus, self.regs.sp)?;
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = self.read8(bus, self.regs.sp)?;
        self.regs.sp = self.regs.sp.wrapping_add(1);
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Register operand from a 3-bit field, or the byte at HL for index 6.
    fn read_operand(&mut self, bus: &mut Bus, index: u8) -> Result<u8, CpuError> {
        match Reg8::from_index(index) {
            Some(reg) => Ok(self.regs.get8(reg)),
            None => self.read8(bus, self.regs.hl()),
        }
    }

    fn write_operand(&mut self, bus: &mut Bus, index: u8, value: u8) -> Result<(), CpuError> {
        match Reg8::from_index(index) {
            Some(reg) => {
                self.regs.set8(reg, value);
                Ok(())
            }
            None => self.write8(bus, self.regs.hl(), value),
        }
    }

    fn alu_op(&mut self, op: u8, value: u8) {
        let a = self.regs.a;
        let carry = self.regs.flag(FLAG_C);
        let (result, f) = match op & 0x07 {
            0 => alu::add8(a, value, false),
            1 => alu::add8(a, value, carry),
            2 => alu::sub8(a, value, false),
            3 => alu::sub8(a, value, carry),
            4 => alu::and8(a, value),
            5 => alu::xor8(a, value),
            6 => alu::or8(a, value),
            _ => {
                let (_, f) = alu::sub8(a, value, false);
                (a, f)
            }
        };
        self.regs.a = result;
        self.regs.f = f;
    }

    fn halt(&mut self) {
        if self.ime || self.interrupts.pending() == 0 {
            self.state = RunState::Halted;
        } else if self.request_ime > 0 {
            // EI immediately before HALT: the interrupt is serviced first and
            // HALT runs again when the handler returns.
            self.regs.pc = self.regs.pc.wrapping_sub(1);
        } else {
            debug!("HALT bug at ${:04X}", self.regs.pc.wrapping_sub(1));
            self.state = RunState::HaltBug;
        }
    }

    fn stop(&mut self, bus: &mut Bus) -> Result<(), CpuError> {
        self.fetch8(bus)?;
        if bus.owner_of(DIV_ADDR).is_some() {
            bus.write(DIV_ADDR, 0)?;
        }
        debug!("entering STOP at ${:04X}", self.regs.pc.wrapping_sub(2));
        self.state = RunState::Stopped;
        Ok(())
    }

    fn step_instruction(&mut self, bus: &mut Bus) -> Result<(), CpuError> {
        let pc = self.regs.pc;
        let opcode = self.fetch_opcode(bus)?;
        let info = &OPCODES[opcode as usize];

        #[cfg(feature = "cpu-trace")]
        trace!("{pc:04X}: {opcode:02X} {:<16} {}", info.mnemonic, self.debug_state());

        let y = (opcode >> 3) & 0x07;
        let z = opcode & 0x07;
        let p = (opcode >> 4) & 0x03;

        match info.handler {
            Handler::Nop => {}
            Handler::Stop => self.stop(bus)?,
            Handler::Halt => self.halt(),
            Handler::Di => {
                self.ime = false;
                self.request_ime = 0;
            }
            Handler::Ei => {
                if !self.ime && self.request_ime == 0 {
                    self.request_ime = EI_DELAY;
                }
            }
            Handler::Illegal => return Err(CpuError::IllegalOpcode { opcode, pc }),
            Handler::Prefix => {
                let cb = self.fetch8(bus)?;
                self.execute_cb(bus, cb)?;
            }
            Handler::LdR8R8 => {
                let value = self.read_operand(bus, z)?;
                self.write_operand(bus, y, value)?;
            }
            Handler::LdR8N8 => {
                let value = self.fetch8(bus)?;
                self.write_operand(bus, y, value)?;
            }
            Handler::LdR16N16 => {
                let value = self.fetch16(bus)?;
                self.regs.set16(Reg16::from_index(p), value);
            }
            Handler::LdIndA => {
                let addr = if p == 0 { self.regs.bc() } else { self.regs.de() };
                self.write8(bus, addr, self.regs.a)?;
            }
            Handler::LdAInd => {
                let addr = if p == 0 { self.regs.bc() } else { self.regs.de() };
                self.regs.a = self.read8(bus, addr)?;
            }
            Handler::LdHliA => {
                let hl = self.regs.hl();
                self.write8(bus, hl, self.regs.a)?;
                self.regs.set_hl(hl.wrapping_add(1));
            }
            Handler::LdHldA => {
                let hl = self.regs.hl();
                self.write8(bus, hl, self.regs.a)?;
                self.regs.set_hl(hl.wrapping_sub(1));
            }
            Handler::LdAHli => {
                let hl = self.regs.hl();
                self.regs.a = self.read8(bus, hl)?;
                self.regs.set_hl(hl.wrapping_add(1));
            }
            Handler::LdAHld => {
                let hl = self.regs.hl();
                self.regs.a = self.read8(bus, hl)?;
                self.regs.set_hl(hl.wrapping_sub(1));
            }
            Handler::LdA16A => {
                let addr = self.fetch16(bus)?;
                self.write8(bus, addr, self.regs.a)?;
            }
            Handler::LdAA16 => {
                let addr = self.fetch16(bus)?;
                self.regs.a = self.read8(bus, addr)?;
            }
            Handler::LdhA8A => {
                let offset = self.fetch8(bus)?;
                self.write8(bus, HIGH_PAGE | offset as u16, self.regs.a)?;
            }
            Handler::LdhAA8 => {
                let offset = self.fetch8(bus)?;
                self.regs.a = self.read8(bus, HIGH_PAGE | offset as u16)?;
            }
            Handler::LdhCA => {
                self.write8(bus, HIGH_PAGE | self.regs.c as u16, self.regs.a)?;
            }
            Handler::LdhAC => {
                self.regs.a = self.read8(bus, HIGH_PAGE | self.regs.c as u16)?;
            }
            Handler::LdA16Sp => {
                let addr = self.fetch16(bus)?;
                let [hi, lo] = self.regs.sp.to_be_bytes();
                self.write8(bus, addr, lo)?;
                self.write8(bus, addr.wrapping_add(1), hi)?;
            }
            Handler::LdSpHl => {
                self.regs.sp = self.regs.hl();
                self.cycle(bus)?;
            }
            Handler::LdHlSpE8 => {
                let offset = self.fetch8(bus)? as i8;
                let (result, f) = alu::add_sp_e8(self.regs.sp, offset);
                self.regs.set_hl(result);
                self.regs.f = f;
                self.cycle(bus)?;
            }
            Handler::IncR8 => {
                let value = self.read_operand(bus, y)?;
                let (result, f) = alu::inc8(value, self.regs.f);
                self.regs.f = f;
                self.write_operand(bus, y, result)?;
            }
            Handler::DecR8 => {
                let value = self.read_operand(bus, y)?;
                let (result, f) = alu::dec8(value, self.regs.f);
                self.regs.f = f;
                self.write_operand(bus, y, result)?;
            }
            Handler::IncR16 => {
                let reg = Reg16::from_index(p);
                self.regs.set16(reg, self.regs.get16(reg).wrapping_add(1));
                self.cycle(bus)?;
            }
            Handler::DecR16 => {
                let reg = Reg16::from_index(p);
                self.regs.set16(reg, self.regs.get16(reg).wrapping_sub(1));
                self.cycle(bus)?;
            }
            Handler::AddHlR16 => {
                let rr = self.regs.get16(Reg16::from_index(p));
                let (result, f) = alu::add16(self.regs.hl(), rr, self.regs.f);
                self.regs.set_hl(result);
                self.regs.f = f;
                self.cycle(bus)?;
            }
            Handler::AddSpE8 => {
                let offset = self.fetch8(bus)? as i8;
                let (result, f) = alu::add_sp_e8(self.regs.sp, offset);
                self.regs.sp = result;
                self.regs.f = f;
                self.cycle(bus)?;
                self.cycle(bus)?;
            }
            Handler::AluR8 => {
                let value = self.read_operand(bus, z)?;
                self.alu_op(y, value);
            }
            Handler::AluN8 => {
                let value = self.fetch8(bus)?;
                self.alu_op(y, value);
            }
            Handler::RotateA => {
                let (result, f) =
                    alu::shift_accumulator(Shift::from_index(y), self.regs.a, self.regs.f);
                self.regs.a = result;
                self.regs.f = f;
            }
            Handler::Daa => {
                let (result, f) = alu::daa(self.regs.a, self.regs.f);
                self.regs.a = result;
                self.regs.f = f;
            }
            Handler::Cpl => {
                self.regs.a = !self.regs.a;
                self.regs.f |= FLAG_N | FLAG_H;
            }
            Handler::Scf => {
                self.regs.f = (self.regs.f & FLAG_Z) | FLAG_C;
            }
            Handler::Ccf => {
                self.regs.f = (self.regs.f & (FLAG_Z | FLAG_C)) ^ FLAG_C;
            }
            Handler::Jr => {
                let offset = self.fetch8(bus)? as i8;
                self.regs.pc = self.regs.pc.wrapping_add(offset as u16);
                self.cycle(bus)?;
            }
            Handler::JrCond => {
                let offset = self.fetch8(bus)? as i8;
                if self.regs.condition(Condition::from_index(y)) {
                    self.regs.pc = self.regs.pc.wrapping_add(offset as u16);
                    self.cycle(bus)?;
                }
            }
            Handler::Jp => {
                self.regs.pc = self.fetch16(bus)?;
                self.cycle(bus)?;
            }
            Handler::JpCond => {
                let addr = self.fetch16(bus)?;
                if self.regs.condition(Condition::from_index(y)) {
                    self.regs.pc = addr;
                    self.cycle(bus)?;
                }
            }
            Handler::JpHl => {
                self.regs.pc = self.regs.hl();
            }
            Handler::Call => {
                let addr = self.fetch16(bus)?;
                self.cycle(bus)?;
                self.push16(bus, self.regs.pc)?;
                self.regs.pc = addr;
            }
            Handler::CallCond => {
                let addr = self.fetch16(bus)?;
                if self.regs.condition(Condition::from_index(y)) {
                    self.cycle(bus)?;
                    self.push16(bus, self.regs.pc)?;
                    self.regs.pc = addr;
                }
            }
            Handler::Ret => {
                self.regs.pc = self.pop16(bus)?;
                self.cycle(bus)?;
            }
            Handler::RetCond => {
                self.cycle(bus)?;
                if self.regs.condition(Condition::from_index(y)) {
                    self.regs.pc = self.pop16(bus)?;
                    self.cycle(bus)?;
                }
            }
            Handler::Reti => {
                self.regs.pc = self.pop16(bus)?;
                self.cycle(bus)?;
                self.ime = true;
                self.request_ime = 0;
            }
            Handler::Rst => {
                self.cycle(bus)?;
                self.push16(bus, self.regs.pc)?;
                self.regs.pc = y as u16 * 8;
            }
            Handler::Push => {
                self.cycle(bus)?;
                let value = self.regs.get_stack_pair(StackPair::from_index(p));
                self.push16(bus, value)?;
            }
            Handler::Pop => {
                let value = self.pop16(bus)?;
                self.regs.set_stack_pair(StackPair::from_index(p), value);
            }
            Handler::Shift | Handler::Bit | Handler::Res | Handler::Set => {
                unreachable!("CB handler in the base opcode table")
            }
        }
        Ok(())
    }

    fn execute_cb(&mut self, bus: &mut Bus, opcode: u8) -> Result<(), CpuError> {
        let y = (opcode >> 3) & 0x07;
        let z = opcode & 0x07;
        match CB_OPCODES[opcode as usize].handler {
            Handler::Shift => {
                let value = self.read_operand(bus, z)?;
                let (result, f) = alu::shift(Shift::from_index(y), value, self.regs.f);
                self.regs.f = f;
                self.write_operand(bus, z, result)?;
            }
            Handler::Bit => {
                let value = self.read_operand(bus, z)?;
                self.regs.f = alu::bit(y, value, self.regs.f);
            }
            Handler::Res => {
                let value = self.read_operand(bus, z)?;
                self.write_operand(bus, z, value & !(1 << y))?;
            }
            Handler::Set => {
                let value = self.read_operand(bus, z)?;
                self.write_operand(bus, z, value | (1 << y))?;
            }
            other => unreachable!("{other:?} in the CB opcode table"),
        }
        Ok(())
    }
}

//! Cycle-accurate SM83 (DMG Game Boy) emulation core.
//!
//! The CPU talks to everything else through the [`bus`] address router. Each
//! instruction is executed to completion inside [`cpu::Cpu::tick`], spending
//! one machine cycle per memory access or internal delay and advancing the
//! attached devices through a [`cpu::MachineCycle`] clock in lockstep.

/// Address router and the device contract.
pub mod bus;

/// IE/IF registers and interrupt priority.
pub mod interrupts;

/// Register file, flag bits and register pair encodings.
pub mod registers;

/// Flag-producing arithmetic shared by the 8-bit and CB-prefixed opcodes.
pub mod alu;

/// Opcode metadata tables for the base and CB-prefixed instruction sets.
pub mod opcodes;

/// SM83 execution engine.
pub mod cpu;

/// OAM DMA transfer engine.
pub mod dma;

/// Table-driven disassembler.
pub mod disasm;

/// Divider/timer unit.
pub mod timer;

/// LCD timing, VRAM and OAM.
pub mod ppu;

/// Work RAM, high RAM and unused I/O.
pub mod memory;

/// Joypad input register and edge-triggered interrupt behavior.
pub mod joypad;

/// Serial unit and link cable plumbing.
pub mod serial;

/// Sound register file.
pub mod sound;

/// Cartridge header, ROM-only and MBC1 mappers, boot ROM overlay.
pub mod cartridge;

/// High-level facade that wires the CPU and devices into a single machine.
pub mod gameboy;

pub use bus::{Bus, BusError, Device, Handle};
pub use cpu::{Cpu, CpuError, CpuView, MachineCycle, RunState};
pub use gameboy::{GameBoy, GameBoyConfig, GameBoyError};

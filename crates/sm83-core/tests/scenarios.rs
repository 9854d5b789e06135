mod common;

use common::{PROGRAM_START, machine, machine_from_rom, program_rom, run_to};
use sm83_core::cpu::RunState;
use sm83_core::interrupts::Interrupt;
use sm83_core::joypad::Button;

#[test]
fn timer_interrupt_wakes_halt_and_returns() {
    let program = [
        0x3E, 0x04, // LD A,$04
        0xE0, 0xFF, // LDH (IE),A
        0x3E, 0xF0, // LD A,$F0
        0xE0, 0x05, // LDH (TIMA),A
        0x3E, 0x05, // LD A,$05
        0xE0, 0x07, // LDH (TAC),A
        0xAF, // XOR A
        0xE0, 0x0F, // LDH (IF),A
        0xFB, // EI
        0x76, // HALT
        0x00, // NOP
        0x18, 0xFE, // JR -2
    ];
    let mut rom = program_rom(&program);
    rom[0x50..0x53].copy_from_slice(&[0x06, 0x42, 0xD9]); // LD B,$42; RETI
    let mut gb = machine_from_rom(rom);

    run_to(&mut gb, 0x0160, 20);
    gb.step().unwrap();
    assert_eq!(gb.cpu().state(), RunState::Halted);

    run_to(&mut gb, 0x0050, 200);
    assert!(!gb.cpu().ime());
    assert_eq!(gb.cpu().interrupts().flag() & Interrupt::Timer.bit(), 0);

    run_to(&mut gb, 0x0161, 10);
    assert!(gb.cpu().ime());
    assert_eq!(gb.cpu().registers().b, 0x42);
    assert_eq!(gb.cpu().registers().sp, 0xFFFE);
}

#[test]
fn joypad_interrupt_from_button_press() {
    let program = [
        0x3E, 0x10, // LD A,$10 (select buttons)
        0xE0, 0x00, // LDH (P1),A
        0xE0, 0xFF, // LDH (IE),A
        0xFB, // EI
        0x76, // HALT
        0x18, 0xFE, // JR -2
    ];
    let mut rom = program_rom(&program);
    rom[0x60..0x63].copy_from_slice(&[0x0E, 0x99, 0xD9]); // LD C,$99; RETI
    let mut gb = machine_from_rom(rom);

    gb.run_cycles(500).unwrap();
    assert_eq!(gb.cpu().state(), RunState::Halted);

    gb.press(Button::Start);
    run_to(&mut gb, 0x0060, 10);
    run_to(&mut gb, PROGRAM_START + 8, 10);
    assert_eq!(gb.cpu().registers().c, 0x99);
    assert_eq!(gb.peek(0xFF00).unwrap(), 0xD7);
}

#[test]
fn serial_text_reaches_the_host() {
    let program = [
        0x21, 0x70, 0x01, // LD HL,$0170
        0x2A, // LD A,(HL+)
        0xB7, // OR A
        0x28, 0x0E, // JR Z,$0165
        0xE0, 0x01, // LDH (SB),A
        0x3E, 0x81, // LD A,$81
        0xE0, 0x02, // LDH (SC),A
        0xF0, 0x02, // LDH A,(SC)
        0xCB, 0x7F, // BIT 7,A
        0x20, 0xFA, // JR NZ,$015D
        0x18, 0xEE, // JR $0153
        0x18, 0xFE, // JR $0165
    ];
    let mut rom = program_rom(&program);
    rom[0x0170..0x0177].copy_from_slice(b"Passed\0");
    let mut gb = machine_from_rom(rom);

    let mut checked_up_to = 0;
    while gb.cycles() < 100_000 {
        gb.step().unwrap();
        if common::serial_contains_result(gb.serial_output(), &mut checked_up_to) {
            break;
        }
    }
    assert_eq!(gb.serial_output(), b"Passed");
    run_to(&mut gb, 0x0165, 50);
}

#[test]
fn echo_ram_aliases_work_ram() {
    let mut gb = machine(&[
        0x3E, 0x5A, // LD A,$5A
        0xEA, 0x23, 0xE1, // LD ($E123),A
        0xAF, // XOR A
        0xFA, 0x23, 0xC1, // LD A,($C123)
    ]);
    for _ in 0..4 {
        gb.step().unwrap();
    }
    assert_eq!(gb.cpu().registers().a, 0x5A);
}

#[test]
fn oam_dma_copies_work_ram() {
    let mut gb = machine(&[
        0x3E, 0x11, // LD A,$11
        0xEA, 0x00, 0xC0, // LD ($C000),A
        0x3E, 0x22, // LD A,$22
        0xEA, 0x9F, 0xC0, // LD ($C09F),A
        0x3E, 0xC0, // LD A,$C0
        0xE0, 0x46, // LDH (DMA),A
        0x18, 0xFE, // JR -2
    ]);
    for _ in 0..6 {
        gb.step().unwrap();
    }
    // Armed, but the copy starts a few cycles after the write.
    assert!(!gb.cpu().dma().in_progress());
    gb.run_cycles(10).unwrap();
    assert!(gb.cpu().dma().in_progress());
    gb.run_cycles(200).unwrap();
    assert!(!gb.cpu().dma().in_progress());
    let oam = gb.ppu().unwrap().oam();
    assert_eq!(oam[0x00], 0x11);
    assert_eq!(oam[0x9F], 0x22);
    assert_eq!(gb.peek(0xFF46).unwrap(), 0xC0);
}

#[test]
fn disassembly_follows_the_program() {
    let mut gb = machine(&[
        0x21, 0x00, 0xC0, // LD HL,$C000
        0x36, 0x00, // LD (HL),$00
        0x20, 0xF9, // JR NZ,$0150
        0xCB, 0x11, // RL C
    ]);
    let text: Vec<String> = gb
        .disassemble_at_pc(4)
        .unwrap()
        .into_iter()
        .map(|line| line.text)
        .collect();
    assert_eq!(text, ["LD HL,$C000", "LD (HL),$00", "JR NZ,$0150", "RL C"]);
}

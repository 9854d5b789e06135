//! Arithmetic and logic primitives shared by the instruction handlers.
//!
//! Every function is pure: it takes operands plus the incoming F register and
//! returns the result together with the new F. Flag behaviour follows
//! gbdev.io/pandocs/CPU_Instruction_Set.html.

use crate::registers::{FLAG_C, FLAG_H, FLAG_N, FLAG_Z};

#[inline]
fn z(result: u8) -> u8 {
    if result == 0 { FLAG_Z } else { 0 }
}

#[inline]
fn flag_if(cond: bool, flag: u8) -> u8 {
    if cond { flag } else { 0 }
}

/// `ADD`/`ADC`: half carry out of bit 3, carry out of bit 7.
pub fn add8(a: u8, b: u8, carry_in: bool) -> (u8, u8) {
    let c = carry_in as u16;
    let wide = a as u16 + b as u16 + c;
    let result = wide as u8;
    let half = (a & 0x0F) as u16 + (b & 0x0F) as u16 + c > 0x0F;
    let f = z(result) | flag_if(half, FLAG_H) | flag_if(wide > 0xFF, FLAG_C);
    (result, f)
}

/// `SUB`/`SBC`/`CP`: half carry on borrow into bit 4, carry on borrow out of
/// bit 7.
pub fn sub8(a: u8, b: u8, borrow_in: bool) -> (u8, u8) {
    let c = borrow_in as u16;
    let result = a.wrapping_sub(b).wrapping_sub(c as u8);
    let half = ((a & 0x0F) as u16) < (b & 0x0F) as u16 + c;
    let borrow = (a as u16) < b as u16 + c;
    let f = z(result) | FLAG_N | flag_if(half, FLAG_H) | flag_if(borrow, FLAG_C);
    (result, f)
}

pub fn and8(a: u8, b: u8) -> (u8, u8) {
    let result = a & b;
    (result, z(result) | FLAG_H)
}

pub fn xor8(a: u8, b: u8) -> (u8, u8) {
    let result = a ^ b;
    (result, z(result))
}

pub fn or8(a: u8, b: u8) -> (u8, u8) {
    let result = a | b;
    (result, z(result))
}

/// `INC r`: carry is preserved.
pub fn inc8(v: u8, f: u8) -> (u8, u8) {
    let result = v.wrapping_add(1);
    let f = (f & FLAG_C) | z(result) | flag_if(v & 0x0F == 0x0F, FLAG_H);
    (result, f)
}

/// `DEC r`: carry is preserved.
pub fn dec8(v: u8, f: u8) -> (u8, u8) {
    let result = v.wrapping_sub(1);
    let f = (f & FLAG_C) | FLAG_N | z(result) | flag_if(v & 0x0F == 0, FLAG_H);
    (result, f)
}

/// `ADD HL,rr`: half carry out of bit 11, carry out of bit 15, Zero kept.
pub fn add16(hl: u16, rr: u16, f: u8) -> (u16, u8) {
    let result = hl.wrapping_add(rr);
    let half = (hl & 0x0FFF) + (rr & 0x0FFF) > 0x0FFF;
    let carry = hl as u32 + rr as u32 > 0xFFFF;
    let f = (f & FLAG_Z) | flag_if(half, FLAG_H) | flag_if(carry, FLAG_C);
    (result, f)
}

/// `ADD SP,e8` and `LD HL,SP+e8`. Flags come from the unsigned add of the
/// low byte; Zero and Subtract are always cleared.
pub fn add_sp_e8(sp: u16, e8: i8) -> (u16, u8) {
    let offset = e8 as u8;
    let result = sp.wrapping_add(e8 as i16 as u16);
    let half = (sp & 0x000F) + (offset as u16 & 0x0F) > 0x0F;
    let carry = (sp & 0x00FF) + offset as u16 > 0xFF;
    (result, flag_if(half, FLAG_H) | flag_if(carry, FLAG_C))
}

/// Decimal adjust of A after a BCD add or subtract.
pub fn daa(a: u8, f: u8) -> (u8, u8) {
    let subtract = f & FLAG_N != 0;
    let mut correction = 0u8;
    let mut carry = false;
    if f & FLAG_H != 0 || (!subtract && a & 0x0F > 0x09) {
        correction |= 0x06;
    }
    if f & FLAG_C != 0 || (!subtract && a > 0x99) {
        correction |= 0x60;
        carry = true;
    }
    let result = if subtract {
        a.wrapping_sub(correction)
    } else {
        a.wrapping_add(correction)
    };
    let f = z(result) | (f & FLAG_N) | flag_if(carry, FLAG_C);
    (result, f)
}

/// Rotate and shift group of the CB table, in opcode order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shift {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl Shift {
    pub const fn from_index(index: u8) -> Shift {
        match index & 0x07 {
            0 => Shift::Rlc,
            1 => Shift::Rrc,
            2 => Shift::Rl,
            3 => Shift::Rr,
            4 => Shift::Sla,
            5 => Shift::Sra,
            6 => Shift::Swap,
            _ => Shift::Srl,
        }
    }
}

/// CB-prefixed rotate/shift on `v`. Zero reflects the result; Subtract and
/// HalfCarry are cleared; Carry takes the bit shifted out.
pub fn shift(op: Shift, v: u8, f: u8) -> (u8, u8) {
    let carry_in = f & FLAG_C != 0;
    let (result, carry_out) = match op {
        Shift::Rlc => (v.rotate_left(1), v & 0x80 != 0),
        Shift::Rrc => (v.rotate_right(1), v & 0x01 != 0),
        Shift::Rl => ((v << 1) | carry_in as u8, v & 0x80 != 0),
        Shift::Rr => ((v >> 1) | ((carry_in as u8) << 7), v & 0x01 != 0),
        Shift::Sla => (v << 1, v & 0x80 != 0),
        Shift::Sra => ((v >> 1) | (v & 0x80), v & 0x01 != 0),
        Shift::Swap => (v.rotate_left(4), false),
        Shift::Srl => (v >> 1, v & 0x01 != 0),
    };
    (result, z(result) | flag_if(carry_out, FLAG_C))
}

/// `RLCA`/`RRCA`/`RLA`/`RRA`: same rotate as the CB form but Zero is always
/// cleared.
pub fn shift_accumulator(op: Shift, a: u8, f: u8) -> (u8, u8) {
    let (result, f) = shift(op, a, f);
    (result, f & !FLAG_Z)
}

/// `BIT n,r`: Zero set when the bit is clear, Subtract cleared, HalfCarry set,
/// Carry kept.
pub fn bit(n: u8, v: u8, f: u8) -> u8 {
    (f & FLAG_C) | FLAG_H | flag_if(v & (1 << n) == 0, FLAG_Z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add8_flag_laws_hold_for_all_operands() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let (r, f) = add8(a, b, false);
                assert_eq!(r, a.wrapping_add(b));
                assert_eq!(f & FLAG_C != 0, a as u16 + b as u16 > 255, "C {a:02X}+{b:02X}");
                assert_eq!(f & FLAG_H != 0, (a & 0xF) + (b & 0xF) > 0xF, "H {a:02X}+{b:02X}");
                assert_eq!(f & FLAG_Z != 0, r == 0);
                assert_eq!(f & FLAG_N, 0);
                assert_eq!(f & 0x0F, 0);
            }
        }
    }

    #[test]
    fn sub8_flag_laws_hold_for_all_operands() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let (r, f) = sub8(a, b, false);
                assert_eq!(r, a.wrapping_sub(b));
                assert_eq!(f & FLAG_C != 0, a < b);
                assert_eq!(f & FLAG_H != 0, (a & 0xF) < (b & 0xF));
                assert_eq!(f & FLAG_Z != 0, r == 0);
                assert_ne!(f & FLAG_N, 0);
            }
        }
    }

    #[test]
    fn carry_inputs_participate() {
        assert_eq!(add8(0x0F, 0x00, true), (0x10, FLAG_H));
        assert_eq!(add8(0xFF, 0x00, true), (0x00, FLAG_Z | FLAG_H | FLAG_C));
        assert_eq!(sub8(0x10, 0x00, true), (0x0F, FLAG_N | FLAG_H));
        assert_eq!(sub8(0x00, 0xFF, true), (0x00, FLAG_Z | FLAG_N | FLAG_H | FLAG_C));
    }

    #[test]
    fn or_sets_zero_only_for_zero_result() {
        assert_eq!(or8(0, 0), (0, FLAG_Z));
        assert_eq!(or8(0, 1), (1, 0));
        assert_eq!(or8(0x80, 0x01), (0x81, 0));
    }

    #[test]
    fn logic_flags() {
        assert_eq!(and8(0xF0, 0x0F), (0, FLAG_Z | FLAG_H));
        assert_eq!(xor8(0x5A, 0x5A), (0, FLAG_Z));
    }

    #[test]
    fn inc_dec_keep_carry() {
        assert_eq!(inc8(0xFF, FLAG_C), (0x00, FLAG_Z | FLAG_H | FLAG_C));
        assert_eq!(inc8(0x0E, 0), (0x0F, 0));
        assert_eq!(dec8(0x01, 0), (0x00, FLAG_Z | FLAG_N));
        assert_eq!(dec8(0x10, FLAG_C), (0x0F, FLAG_N | FLAG_H | FLAG_C));
    }

    #[test]
    fn add16_uses_bits_11_and_15() {
        assert_eq!(add16(0x0FFF, 0x0001, FLAG_Z), (0x1000, FLAG_Z | FLAG_H));
        assert_eq!(add16(0xFFFF, 0x0001, 0), (0x0000, FLAG_H | FLAG_C));
        assert_eq!(add16(0x8000, 0x8000, FLAG_N), (0x0000, FLAG_C));
    }

    #[test]
    fn add_sp_e8_flags_come_from_low_byte() {
        assert_eq!(add_sp_e8(0xFFF8, 0x08), (0x0000, FLAG_H | FLAG_C));
        assert_eq!(add_sp_e8(0x0000, -1), (0xFFFF, 0));
        assert_eq!(add_sp_e8(0x00FF, -1), (0x00FE, FLAG_H | FLAG_C));
        assert_eq!(add_sp_e8(0x1000, 0), (0x1000, 0));
    }

    fn to_bcd(n: u32) -> u8 {
        (((n / 10) % 10) << 4 | (n % 10)) as u8
    }

    #[test]
    fn daa_example() {
        let (sum, f) = add8(0x45, 0x38, false);
        assert_eq!(sum, 0x7D);
        assert_eq!(daa(sum, f).0, 0x83);
    }

    #[test]
    fn daa_corrects_every_bcd_add_and_sub() {
        for x in 0..100u32 {
            for y in 0..100u32 {
                let (sum, f) = add8(to_bcd(x), to_bcd(y), false);
                let (adj, f) = daa(sum, f);
                assert_eq!(adj, to_bcd(x + y), "{x}+{y}");
                assert_eq!(f & FLAG_C != 0, x + y >= 100);
                assert_eq!(f & FLAG_Z != 0, adj == 0);
                assert_eq!(f & FLAG_H, 0);

                let (diff, f) = sub8(to_bcd(x), to_bcd(y), false);
                let (adj, f) = daa(diff, f);
                assert_eq!(adj, to_bcd((x + 100 - y) % 100), "{x}-{y}");
                assert_eq!(f & FLAG_C != 0, x < y);
                assert_ne!(f & FLAG_N, 0);
            }
        }
    }

    #[test]
    fn rotates_through_carry() {
        assert_eq!(shift(Shift::Rl, 0x80, 0), (0x00, FLAG_Z | FLAG_C));
        assert_eq!(shift(Shift::Rl, 0x01, FLAG_C), (0x03, 0));
        assert_eq!(shift(Shift::Rr, 0x01, 0), (0x00, FLAG_Z | FLAG_C));
        assert_eq!(shift(Shift::Rr, 0x00, FLAG_C), (0x80, 0));
        assert_eq!(shift(Shift::Rlc, 0x81, 0), (0x03, FLAG_C));
        assert_eq!(shift(Shift::Rrc, 0x01, 0), (0x80, FLAG_C));
    }

    #[test]
    fn shifts_and_swap() {
        assert_eq!(shift(Shift::Sla, 0xC0, 0), (0x80, FLAG_C));
        assert_eq!(shift(Shift::Sra, 0x81, 0), (0xC0, FLAG_C));
        assert_eq!(shift(Shift::Srl, 0x81, 0), (0x40, FLAG_C));
        assert_eq!(shift(Shift::Swap, 0xF1, FLAG_C), (0x1F, 0));
        assert_eq!(shift(Shift::Swap, 0x00, 0), (0x00, FLAG_Z));
    }

    #[test]
    fn accumulator_rotates_clear_zero() {
        assert_eq!(shift_accumulator(Shift::Rl, 0x80, 0), (0x00, FLAG_C));
        assert_eq!(shift_accumulator(Shift::Rrc, 0x00, FLAG_Z), (0x00, 0));
    }

    #[test]
    fn bit_test_flags() {
        assert_eq!(bit(7, 0x7F, FLAG_C), FLAG_Z | FLAG_H | FLAG_C);
        assert_eq!(bit(0, 0x01, FLAG_N), FLAG_H);
    }
}

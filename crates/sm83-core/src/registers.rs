// CPU flag bits as documented in gbdev.io/pandocs/The_CPU_Flags.html
pub const FLAG_Z: u8 = 0x80; // Zero
pub const FLAG_N: u8 = 0x40; // Subtract
pub const FLAG_H: u8 = 0x20; // Half Carry
pub const FLAG_C: u8 = 0x10; // Carry

/// Bits of F that hold flags. The low nibble is carried through 16-bit AF
/// transfers but never set by an instruction.
pub const FLAG_MASK: u8 = 0xF0;

// Post-boot DMG register state from gbdev.io/pandocs/Power_Up_State.html
const BOOT_A: u8 = 0x01;
const BOOT_F: u8 = 0xB0;
const BOOT_BC: u16 = 0x0013;
const BOOT_DE: u16 = 0x00D8;
const BOOT_HL: u16 = 0x014D;
const BOOT_SP: u16 = 0xFFFE;
const BOOT_PC: u16 = 0x0100;

/// 8-bit register named by a 3-bit opcode field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg8 {
    B,
    C,
    D,
    E,
    H,
    L,
    A,
}

impl Reg8 {
    /// Decode the 3-bit register field. Index 0b110 does not name a
    /// register: it denotes the `(HL)` memory operand and yields `None`.
    pub const fn from_index(index: u8) -> Option<Reg8> {
        match index & 0x07 {
            0 => Some(Reg8::B),
            1 => Some(Reg8::C),
            2 => Some(Reg8::D),
            3 => Some(Reg8::E),
            4 => Some(Reg8::H),
            5 => Some(Reg8::L),
            6 => None,
            _ => Some(Reg8::A),
        }
    }
}

/// 16-bit pair named by bits 4-5 of the `LD rr,n16`/`INC rr`/`ADD HL,rr` group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg16 {
    BC,
    DE,
    HL,
    SP,
}

impl Reg16 {
    pub const fn from_index(index: u8) -> Reg16 {
        match index & 0x03 {
            0 => Reg16::BC,
            1 => Reg16::DE,
            2 => Reg16::HL,
            _ => Reg16::SP,
        }
    }
}

/// 16-bit pair named by bits 4-5 of `PUSH`/`POP`, where index 3 is AF.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackPair {
    BC,
    DE,
    HL,
    AF,
}

impl StackPair {
    pub const fn from_index(index: u8) -> StackPair {
        match index & 0x03 {
            0 => StackPair::BC,
            1 => StackPair::DE,
            2 => StackPair::HL,
            _ => StackPair::AF,
        }
    }
}

/// Branch condition named by bits 3-4 of conditional JP/JR/CALL/RET.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    NotZero,
    Zero,
    NotCarry,
    Carry,
}

impl Condition {
    pub const fn from_index(index: u8) -> Condition {
        match index & 0x03 {
            0 => Condition::NotZero,
            1 => Condition::Zero,
            2 => Condition::NotCarry,
            _ => Condition::Carry,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    /// Register file as the DMG boot ROM leaves it when jumping to $0100.
    pub fn post_boot() -> Self {
        let mut regs = Self {
            a: BOOT_A,
            f: BOOT_F,
            sp: BOOT_SP,
            pc: BOOT_PC,
            ..Self::default()
        };
        regs.set_bc(BOOT_BC);
        regs.set_de(BOOT_DE);
        regs.set_hl(BOOT_HL);
        regs
    }

    #[inline]
    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f])
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        [self.a, self.f] = value.to_be_bytes();
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        [self.b, self.c] = value.to_be_bytes();
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        [self.d, self.e] = value.to_be_bytes();
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        [self.h, self.l] = value.to_be_bytes();
    }

    pub fn get8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::B => self.b,
            Reg8::C => self.c,
            Reg8::D => self.d,
            Reg8::E => self.e,
            Reg8::H => self.h,
            Reg8::L => self.l,
            Reg8::A => self.a,
        }
    }

    pub fn set8(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::B => self.b = value,
            Reg8::C => self.c = value,
            Reg8::D => self.d = value,
            Reg8::E => self.e = value,
            Reg8::H => self.h = value,
            Reg8::L => self.l = value,
            Reg8::A => self.a = value,
        }
    }

    pub fn get16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::BC => self.bc(),
            Reg16::DE => self.de(),
            Reg16::HL => self.hl(),
            Reg16::SP => self.sp,
        }
    }

    pub fn set16(&mut self, reg: Reg16, value: u16) {
        match reg {
            Reg16::BC => self.set_bc(value),
            Reg16::DE => self.set_de(value),
            Reg16::HL => self.set_hl(value),
            Reg16::SP => self.sp = value,
        }
    }

    pub fn get_stack_pair(&self, pair: StackPair) -> u16 {
        match pair {
            StackPair::BC => self.bc(),
            StackPair::DE => self.de(),
            StackPair::HL => self.hl(),
            StackPair::AF => u16::from_be_bytes([self.a, self.f & FLAG_MASK]),
        }
    }

    /// `POP AF` always clears the low nibble of F.
    pub fn set_stack_pair(&mut self, pair: StackPair, value: u16) {
        match pair {
            StackPair::BC => self.set_bc(value),
            StackPair::DE => self.set_de(value),
            StackPair::HL => self.set_hl(value),
            StackPair::AF => self.set_af(value & 0xFFF0),
        }
    }

    #[inline]
    pub fn flag(&self, flag: u8) -> bool {
        self.f & flag != 0
    }

    pub fn condition(&self, cond: Condition) -> bool {
        match cond {
            Condition::NotZero => !self.flag(FLAG_Z),
            Condition::Zero => self.flag(FLAG_Z),
            Condition::NotCarry => !self.flag(FLAG_C),
            Condition::Carry => self.flag(FLAG_C),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_boot_values() {
        let regs = Registers::post_boot();
        assert_eq!(regs.af(), 0x01B0);
        assert_eq!(regs.bc(), 0x0013);
        assert_eq!(regs.de(), 0x00D8);
        assert_eq!(regs.hl(), 0x014D);
        assert_eq!(regs.sp, 0xFFFE);
        assert_eq!(regs.pc, 0x0100);
    }

    #[test]
    fn pairs_round_trip_every_value() {
        let mut regs = Registers::default();
        for v in 0..=u16::MAX {
            regs.set_bc(v);
            assert_eq!(regs.bc(), v);
            regs.set_de(v);
            assert_eq!(regs.de(), v);
            regs.set_hl(v);
            assert_eq!(regs.hl(), v);
            regs.set_af(v);
            assert_eq!(regs.af(), v);
            assert_eq!((regs.b, regs.c), ((v >> 8) as u8, v as u8));
        }
    }

    #[test]
    fn pop_af_masks_low_nibble() {
        let mut regs = Registers::default();
        regs.set_stack_pair(StackPair::AF, 0x12FF);
        assert_eq!(regs.a, 0x12);
        assert_eq!(regs.f, 0xF0);
        regs.f = 0xBF;
        assert_eq!(regs.get_stack_pair(StackPair::AF), 0x12B0);
    }

    #[test]
    fn register_field_six_is_not_a_register() {
        assert_eq!(Reg8::from_index(0), Some(Reg8::B));
        assert_eq!(Reg8::from_index(5), Some(Reg8::L));
        assert_eq!(Reg8::from_index(6), None);
        assert_eq!(Reg8::from_index(7), Some(Reg8::A));
    }
}

//! Opcode metadata for the base and `CB`-prefixed instruction sets.
//!
//! Each entry carries the mnemonic template used by the disassembler, the
//! handler tag the CPU dispatches on, and the kind of operand that follows the
//! opcode byte. Templates name their operand with one of the tokens `n8`,
//! `n16`, `a8`, `a16`, `e8` (relative jump) or `s8` (signed SP offset).

/// Shared instruction handlers. Several opcodes map to the same handler and
/// recover their register/condition operands from the opcode bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handler {
    Nop,
    Stop,
    Halt,
    Di,
    Ei,
    Illegal,
    Prefix,
    LdR8R8,
    LdR8N8,
    LdR16N16,
    LdIndA,
    LdAInd,
    LdHliA,
    LdHldA,
    LdAHli,
    LdAHld,
    LdA16A,
    LdAA16,
    LdhA8A,
    LdhAA8,
    LdhCA,
    LdhAC,
    LdA16Sp,
    LdSpHl,
    LdHlSpE8,
    IncR8,
    DecR8,
    IncR16,
    DecR16,
    AddHlR16,
    AddSpE8,
    AluR8,
    AluN8,
    RotateA,
    Daa,
    Cpl,
    Scf,
    Ccf,
    Jr,
    JrCond,
    Jp,
    JpCond,
    JpHl,
    Call,
    CallCond,
    Ret,
    RetCond,
    Reti,
    Rst,
    Push,
    Pop,
    // CB-prefixed
    Shift,
    Bit,
    Res,
    Set,
}

/// Operand bytes that follow the opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    None,
    /// Immediate byte.
    N8,
    /// Immediate little-endian word.
    N16,
    /// Low byte of a `$FF00` page address.
    A8,
    /// Absolute little-endian address.
    A16,
    /// Signed displacement relative to the next instruction.
    Rel8,
    /// Signed offset added to SP.
    Signed8,
}

impl Operand {
    pub const fn len(self) -> u16 {
        match self {
            Operand::None => 0,
            Operand::N8 | Operand::A8 | Operand::Rel8 | Operand::Signed8 => 1,
            Operand::N16 | Operand::A16 => 2,
        }
    }

    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Copy, Debug)]
pub struct OpcodeInfo {
    pub mnemonic: &'static str,
    pub handler: Handler,
    pub operand: Operand,
}

impl OpcodeInfo {
    /// Encoded length including the opcode byte (and the `CB` prefix for
    /// extended opcodes).
    pub const fn len(&self, prefixed: bool) -> u16 {
        1 + prefixed as u16 + self.operand.len()
    }
}

const fn op(mnemonic: &'static str, handler: Handler, operand: Operand) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        handler,
        operand,
    }
}

pub static OPCODES: [OpcodeInfo; 256] = [
    op("NOP", Handler::Nop, Operand::None), // $00
    op("LD BC,n16", Handler::LdR16N16, Operand::N16), // $01
    op("LD (BC),A", Handler::LdIndA, Operand::None), // $02
    op("INC BC", Handler::IncR16, Operand::None), // $03
    op("INC B", Handler::IncR8, Operand::None), // $04
    op("DEC B", Handler::DecR8, Operand::None), // $05
    op("LD B,n8", Handler::LdR8N8, Operand::N8), // $06
    op("RLCA", Handler::RotateA, Operand::None), // $07
    op("LD (a16),SP", Handler::LdA16Sp, Operand::A16), // $08
    op("ADD HL,BC", Handler::AddHlR16, Operand::None), // $09
    op("LD A,(BC)", Handler::LdAInd, Operand::None), // $0A
    op("DEC BC", Handler::DecR16, Operand::None), // $0B
    op("INC C", Handler::IncR8, Operand::None), // $0C
    op("DEC C", Handler::DecR8, Operand::None), // $0D
    op("LD C,n8", Handler::LdR8N8, Operand::N8), // $0E
    op("RRCA", Handler::RotateA, Operand::None), // $0F
    op("STOP", Handler::Stop, Operand::N8), // $10
    op("LD DE,n16", Handler::LdR16N16, Operand::N16), // $11
    op("LD (DE),A", Handler::LdIndA, Operand::None), // $12
    op("INC DE", Handler::IncR16, Operand::None), // $13
    op("INC D", Handler::IncR8, Operand::None), // $14
    op("DEC D", Handler::DecR8, Operand::None), // $15
    op("LD D,n8", Handler::LdR8N8, Operand::N8), // $16
    op("RLA", Handler::RotateA, Operand::None), // $17
    op("JR e8", Handler::Jr, Operand::Rel8), // $18
    op("ADD HL,DE", Handler::AddHlR16, Operand::None), // $19
    op("LD A,(DE)", Handler::LdAInd, Operand::None), // $1A
    op("DEC DE", Handler::DecR16, Operand::None), // $1B
    op("INC E", Handler::IncR8, Operand::None), // $1C
    op("DEC E", Handler::DecR8, Operand::None), // $1D
    op("LD E,n8", Handler::LdR8N8, Operand::N8), // $1E
    op("RRA", Handler::RotateA, Operand::None), // $1F
    op("JR NZ,e8", Handler::JrCond, Operand::Rel8), // $20
    op("LD HL,n16", Handler::LdR16N16, Operand::N16), // $21
    op("LD (HL+),A", Handler::LdHliA, Operand::None), // $22
    op("INC HL", Handler::IncR16, Operand::None), // $23
    op("INC H", Handler::IncR8, Operand::None), // $24
    op("DEC H", Handler::DecR8, Operand::None), // $25
    op("LD H,n8", Handler::LdR8N8, Operand::N8), // $26
    op("DAA", Handler::Daa, Operand::None), // $27
    op("JR Z,e8", Handler::JrCond, Operand::Rel8), // $28
    op("ADD HL,HL", Handler::AddHlR16, Operand::None), // $29
    op("LD A,(HL+)", Handler::LdAHli, Operand::None), // $2A
    op("DEC HL", Handler::DecR16, Operand::None), // $2B
    op("INC L", Handler::IncR8, Operand::None), // $2C
    op("DEC L", Handler::DecR8, Operand::None), // $2D
    op("LD L,n8", Handler::LdR8N8, Operand::N8), // $2E
    op("CPL", Handler::Cpl, Operand::None), // $2F
    op("JR NC,e8", Handler::JrCond, Operand::Rel8), // $30
    op("LD SP,n16", Handler::LdR16N16, Operand::N16), // $31
    op("LD (HL-),A", Handler::LdHldA, Operand::None), // $32
    op("INC SP", Handler::IncR16, Operand::None), // $33
    op("INC (HL)", Handler::IncR8, Operand::None), // $34
    op("DEC (HL)", Handler::DecR8, Operand::None), // $35
    op("LD (HL),n8", Handler::LdR8N8, Operand::N8), // $36
    op("SCF", Handler::Scf, Operand::None), // $37
    op("JR C,e8", Handler::JrCond, Operand::Rel8), // $38
    op("ADD HL,SP", Handler::AddHlR16, Operand::None), // $39
    op("LD A,(HL-)", Handler::LdAHld, Operand::None), // $3A
    op("DEC SP", Handler::DecR16, Operand::None), // $3B
    op("INC A", Handler::IncR8, Operand::None), // $3C
    op("DEC A", Handler::DecR8, Operand::None), // $3D
    op("LD A,n8", Handler::LdR8N8, Operand::N8), // $3E
    op("CCF", Handler::Ccf, Operand::None), // $3F
    op("LD B,B", Handler::LdR8R8, Operand::None), // $40
    op("LD B,C", Handler::LdR8R8, Operand::None), // $41
    op("LD B,D", Handler::LdR8R8, Operand::None), // $42
    op("LD B,E", Handler::LdR8R8, Operand::None), // $43
    op("LD B,H", Handler::LdR8R8, Operand::None), // $44
    op("LD B,L", Handler::LdR8R8, Operand::None), // $45
    op("LD B,(HL)", Handler::LdR8R8, Operand::None), // $46
    op("LD B,A", Handler::LdR8R8, Operand::None), // $47
    op("LD C,B", Handler::LdR8R8, Operand::None), // $48
    op("LD C,C", Handler::LdR8R8, Operand::None), // $49
    op("LD C,D", Handler::LdR8R8, Operand::None), // $4A
    op("LD C,E", Handler::LdR8R8, Operand::None), // $4B
    op("LD C,H", Handler::LdR8R8, Operand::None), // $4C
    op("LD C,L", Handler::LdR8R8, Operand::None), // $4D
    op("LD C,(HL)", Handler::LdR8R8, Operand::None), // $4E
    op("LD C,A", Handler::LdR8R8, Operand::None), // $4F
    op("LD D,B", Handler::LdR8R8, Operand::None), // $50
    op("LD D,C", Handler::LdR8R8, Operand::None), // $51
    op("LD D,D", Handler::LdR8R8, Operand::None), // $52
    op("LD D,E", Handler::LdR8R8, Operand::None), // $53
    op("LD D,H", Handler::LdR8R8, Operand::None), // $54
    op("LD D,L", Handler::LdR8R8, Operand::None), // $55
    op("LD D,(HL)", Handler::LdR8R8, Operand::None), // $56
    op("LD D,A", Handler::LdR8R8, Operand::None), // $57
    op("LD E,B", Handler::LdR8R8, Operand::None), // $58
    op("LD E,C", Handler::LdR8R8, Operand::None), // $59
    op("LD E,D", Handler::LdR8R8, Operand::None), // $5A
    op("LD E,E", Handler::LdR8R8, Operand::None), // $5B
    op("LD E,H", Handler::LdR8R8, Operand::None), // $5C
    op("LD E,L", Handler::LdR8R8, Operand::None), // $5D
    op("LD E,(HL)", Handler::LdR8R8, Operand::None), // $5E
    op("LD E,A", Handler::LdR8R8, Operand::None), // $5F
    op("LD H,B", Handler::LdR8R8, Operand::None), // $60
    op("LD H,C", Handler::LdR8R8, Operand::None), // $61
    op("LD H,D", Handler::LdR8R8, Operand::None), // $62
    op("LD H,E", Handler::LdR8R8, Operand::None), // $63
    op("LD H,H", Handler::LdR8R8, Operand::None), // $64
    op("LD H,L", Handler::LdR8R8, Operand::None), // $65
    op("LD H,(HL)", Handler::LdR8R8, Operand::None), // $66
    op("LD H,A", Handler::LdR8R8, Operand::None), // $67
    op("LD L,B", Handler::LdR8R8, Operand::None), // $68
    op("LD L,C", Handler::LdR8R8, Operand::None), // $69
    op("LD L,D", Handler::LdR8R8, Operand::None), // $6A
    op("LD L,E", Handler::LdR8R8, Operand::None), // $6B
    op("LD L,H", Handler::LdR8R8, Operand::None), // $6C
    op("LD L,L", Handler::LdR8R8, Operand::None), // $6D
    op("LD L,(HL)", Handler::LdR8R8, Operand::None), // $6E
    op("LD L,A", Handler::LdR8R8, Operand::None), // $6F
    op("LD (HL),B", Handler::LdR8R8, Operand::None), // $70
    op("LD (HL),C", Handler::LdR8R8, Operand::None), // $71
    op("LD (HL),D", Handler::LdR8R8, Operand::None), // $72
    op("LD (HL),E", Handler::LdR8R8, Operand::None), // $73
    op("LD (HL),H", Handler::LdR8R8, Operand::None), // $74
    op("LD (HL),L", Handler::LdR8R8, Operand::None), // $75
    op("HALT", Handler::Halt, Operand::None), // $76
    op("LD (HL),A", Handler::LdR8R8, Operand::None), // $77
    op("LD A,B", Handler::LdR8R8, Operand::None), // $78
    op("LD A,C", Handler::LdR8R8, Operand::None), // $79
    op("LD A,D", Handler::LdR8R8, Operand::None), // $7A
    op("LD A,E", Handler::LdR8R8, Operand::None), // $7B
    op("LD A,H", Handler::LdR8R8, Operand::None), // $7C
    op("LD A,L", Handler::LdR8R8, Operand::None), // $7D
    op("LD A,(HL)", Handler::LdR8R8, Operand::None), // $7E
    op("LD A,A", Handler::LdR8R8, Operand::None), // $7F
    op("ADD B", Handler::AluR8, Operand::None), // $80
    op("ADD C", Handler::AluR8, Operand::None), // $81
    op("ADD D", Handler::AluR8, Operand::None), // $82
    op("ADD E", Handler::AluR8, Operand::None), // $83
    op("ADD H", Handler::AluR8, Operand::None), // $84
    op("ADD L", Handler::AluR8, Operand::None), // $85
    op("ADD (HL)", Handler::AluR8, Operand::None), // $86
    op("ADD A", Handler::AluR8, Operand::None), // $87
    op("ADC B", Handler::AluR8, Operand::None), // $88
    op("ADC C", Handler::AluR8, Operand::None), // $89
    op("ADC D", Handler::AluR8, Operand::None), // $8A
    op("ADC E", Handler::AluR8, Operand::None), // $8B
    op("ADC H", Handler::AluR8, Operand::None), // $8C
    op("ADC L", Handler::AluR8, Operand::None), // $8D
    op("ADC (HL)", Handler::AluR8, Operand::None), // $8E
    op("ADC A", Handler::AluR8, Operand::None), // $8F
    op("SUB B", Handler::AluR8, Operand::None), // $90
    op("SUB C", Handler::AluR8, Operand::None), // $91
    op("SUB D", Handler::AluR8, Operand::None), // $92
    op("SUB E", Handler::AluR8, Operand::None), // $93
    op("SUB H", Handler::AluR8, Operand::None), // $94
    op("SUB L", Handler::AluR8, Operand::None), // $95
    op("SUB (HL)", Handler::AluR8, Operand::None), // $96
    op("SUB A", Handler::AluR8, Operand::None), // $97
    op("SBC B", Handler::AluR8, Operand::None), // $98
    op("SBC C", Handler::AluR8, Operand::None), // $99
    op("SBC D", Handler::AluR8, Operand::None), // $9A
    op("SBC E", Handler::AluR8, Operand::None), // $9B
    op("SBC H", Handler::AluR8, Operand::None), // $9C
    op("SBC L", Handler::AluR8, Operand::None), // $9D
    op("SBC (HL)", Handler::AluR8, Operand::None), // $9E
    op("SBC A", Handler::AluR8, Operand::None), // $9F
    op("AND B", Handler::AluR8, Operand::None), // $A0
    op("AND C", Handler::AluR8, Operand::None), // $A1
    op("AND D", Handler::AluR8, Operand::None), // $A2
    op("AND E", Handler::AluR8, Operand::None), // $A3
    op("AND H", Handler::AluR8, Operand::None), // $A4
    op("AND L", Handler::AluR8, Operand::None), // $A5
    op("AND (HL)", Handler::AluR8, Operand::None), // $A6
    op("AND A", Handler::AluR8, Operand::None), // $A7
    op("XOR B", Handler::AluR8, Operand::None), // $A8
    op("XOR C", Handler::AluR8, Operand::None), // $A9
    op("XOR D", Handler::AluR8, Operand::None), // $AA
    op("XOR E", Handler::AluR8, Operand::None), // $AB
    op("XOR H", Handler::AluR8, Operand::None), // $AC
    op("XOR L", Handler::AluR8, Operand::None), // $AD
    op("XOR (HL)", Handler::AluR8, Operand::None), // $AE
    op("XOR A", Handler::AluR8, Operand::None), // $AF
    op("OR B", Handler::AluR8, Operand::None), // $B0
    op("OR C", Handler::AluR8, Operand::None), // $B1
    op("OR D", Handler::AluR8, Operand::None), // $B2
    op("OR E", Handler::AluR8, Operand::None), // $B3
    op("OR H", Handler::AluR8, Operand::None), // $B4
    op("OR L", Handler::AluR8, Operand::None), // $B5
    op("OR (HL)", Handler::AluR8, Operand::None), // $B6
    op("OR A", Handler::AluR8, Operand::None), // $B7
    op("CP B", Handler::AluR8, Operand::None), // $B8
    op("CP C", Handler::AluR8, Operand::None), // $B9
    op("CP D", Handler::AluR8, Operand::None), // $BA
    op("CP E", Handler::AluR8, Operand::None), // $BB
    op("CP H", Handler::AluR8, Operand::None), // $BC
    op("CP L", Handler::AluR8, Operand::None), // $BD
    op("CP (HL)", Handler::AluR8, Operand::None), // $BE
    op("CP A", Handler::AluR8, Operand::None), // $BF
    op("RET NZ", Handler::RetCond, Operand::None), // $C0
    op("POP BC", Handler::Pop, Operand::None), // $C1
    op("JP NZ,a16", Handler::JpCond, Operand::A16), // $C2
    op("JP a16", Handler::Jp, Operand::A16), // $C3
    op("CALL NZ,a16", Handler::CallCond, Operand::A16), // $C4
    op("PUSH BC", Handler::Push, Operand::None), // $C5
    op("ADD n8", Handler::AluN8, Operand::N8), // $C6
    op("RST $00", Handler::Rst, Operand::None), // $C7
    op("RET Z", Handler::RetCond, Operand::None), // $C8
    op("RET", Handler::Ret, Operand::None), // $C9
    op("JP Z,a16", Handler::JpCond, Operand::A16), // $CA
    op("PREFIX CB", Handler::Prefix, Operand::None), // $CB
    op("CALL Z,a16", Handler::CallCond, Operand::A16), // $CC
    op("CALL a16", Handler::Call, Operand::A16), // $CD
    op("ADC n8", Handler::AluN8, Operand::N8), // $CE
    op("RST $08", Handler::Rst, Operand::None), // $CF
    op("RET NC", Handler::RetCond, Operand::None), // $D0
    op("POP DE", Handler::Pop, Operand::None), // $D1
    op("JP NC,a16", Handler::JpCond, Operand::A16), // $D2
    op("ILLEGAL", Handler::Illegal, Operand::None), // $D3
    op("CALL NC,a16", Handler::CallCond, Operand::A16), // $D4
    op("PUSH DE", Handler::Push, Operand::None), // $D5
    op("SUB n8", Handler::AluN8, Operand::N8), // $D6
    op("RST $10", Handler::Rst, Operand::None), // $D7
    op("RET C", Handler::RetCond, Operand::None), // $D8
    op("RETI", Handler::Reti, Operand::None), // $D9
    op("JP C,a16", Handler::JpCond, Operand::A16), // $DA
    op("ILLEGAL", Handler::Illegal, Operand::None), // $DB
    op("CALL C,a16", Handler::CallCond, Operand::A16), // $DC
    op("ILLEGAL", Handler::Illegal, Operand::None), // $DD
    op("SBC n8", Handler::AluN8, Operand::N8), // $DE
    op("RST $18", Handler::Rst, Operand::None), // $DF
    op("LDH (a8),A", Handler::LdhA8A, Operand::A8), // $E0
    op("POP HL", Handler::Pop, Operand::None), // $E1
    op("LDH (C),A", Handler::LdhCA, Operand::None), // $E2
    op("ILLEGAL", Handler::Illegal, Operand::None), // $E3
    op("ILLEGAL", Handler::Illegal, Operand::None), // $E4
    op("PUSH HL", Handler::Push, Operand::None), // $E5
    op("AND n8", Handler::AluN8, Operand::N8), // $E6
    op("RST $20", Handler::Rst, Operand::None), // $E7
    op("ADD SP,s8", Handler::AddSpE8, Operand::Signed8), // $E8
    op("JP (HL)", Handler::JpHl, Operand::None), // $E9
    op("LD (a16),A", Handler::LdA16A, Operand::A16), // $EA
    op("ILLEGAL", Handler::Illegal, Operand::None), // $EB
    op("ILLEGAL", Handler::Illegal, Operand::None), // $EC
    op("ILLEGAL", Handler::Illegal, Operand::None), // $ED
    op("XOR n8", Handler::AluN8, Operand::N8), // $EE
    op("RST $28", Handler::Rst, Operand::None), // $EF
    op("LDH A,(a8)", Handler::LdhAA8, Operand::A8), // $F0
    op("POP AF", Handler::Pop, Operand::None), // $F1
    op("LDH A,(C)", Handler::LdhAC, Operand::None), // $F2
    op("DI", Handler::Di, Operand::None), // $F3
    op("ILLEGAL", Handler::Illegal, Operand::None), // $F4
    op("PUSH AF", Handler::Push, Operand::None), // $F5
    op("OR n8", Handler::AluN8, Operand::N8), // $F6
    op("RST $30", Handler::Rst, Operand::None), // $F7
    op("LD HL,SP+s8", Handler::LdHlSpE8, Operand::Signed8), // $F8
    op("LD SP,HL", Handler::LdSpHl, Operand::None), // $F9
    op("LD A,(a16)", Handler::LdAA16, Operand::A16), // $FA
    op("EI", Handler::Ei, Operand::None), // $FB
    op("ILLEGAL", Handler::Illegal, Operand::None), // $FC
    op("ILLEGAL", Handler::Illegal, Operand::None), // $FD
    op("CP n8", Handler::AluN8, Operand::N8), // $FE
    op("RST $38", Handler::Rst, Operand::None), // $FF
];

pub static CB_OPCODES: [OpcodeInfo; 256] = [
    op("RLC B", Handler::Shift, Operand::None), // $00
    op("RLC C", Handler::Shift, Operand::None), // $01
    op("RLC D", Handler::Shift, Operand::None), // $02
    op("RLC E", Handler::Shift, Operand::None), // $03
    op("RLC H", Handler::Shift, Operand::None), // $04
    op("RLC L", Handler::Shift, Operand::None), // $05
    op("RLC (HL)", Handler::Shift, Operand::None), // $06
    op("RLC A", Handler::Shift, Operand::None), // $07
    op("RRC B", Handler::Shift, Operand::None), // $08
    op("RRC C", Handler::Shift, Operand::None), // $09
    op("RRC D", Handler::Shift, Operand::None), // $0A
    op("RRC E", Handler::Shift, Operand::None), // $0B
    op("RRC H", Handler::Shift, Operand::None), // $0C
    op("RRC L", Handler::Shift, Operand::None), // $0D
    op("RRC (HL)", Handler::Shift, Operand::None), // $0E
    op("RRC A", Handler::Shift, Operand::None), // $0F
    op("RL B", Handler::Shift, Operand::None), // $10
    op("RL C", Handler::Shift, Operand::None), // $11
    op("RL D", Handler::Shift, Operand::None), // $12
    op("RL E", Handler::Shift, Operand::None), // $13
    op("RL H", Handler::Shift, Operand::None), // $14
    op("RL L", Handler::Shift, Operand::None), // $15
    op("RL (HL)", Handler::Shift, Operand::None), // $16
    op("RL A", Handler::Shift, Operand::None), // $17
    op("RR B", Handler::Shift, Operand::None), // $18
    op("RR C", Handler::Shift, Operand::None), // $19
    op("RR D", Handler::Shift, Operand::None), // $1A
    op("RR E", Handler::Shift, Operand::None), // $1B
    op("RR H", Handler::Shift, Operand::None), // $1C
    op("RR L", Handler::Shift, Operand::None), // $1D
    op("RR (HL)", Handler::Shift, Operand::None), // $1E
    op("RR A", Handler::Shift, Operand::None), // $1F
    op("SLA B", Handler::Shift, Operand::None), // $20
    op("SLA C", Handler::Shift, Operand::None), // $21
    op("SLA D", Handler::Shift, Operand::None), // $22
    op("SLA E", Handler::Shift, Operand::None), // $23
    op("SLA H", Handler::Shift, Operand::None), // $24
    op("SLA L", Handler::Shift, Operand::None), // $25
    op("SLA (HL)", Handler::Shift, Operand::None), // $26
    op("SLA A", Handler::Shift, Operand::None), // $27
    op("SRA B", Handler::Shift, Operand::None), // $28
    op("SRA C", Handler::Shift, Operand::None), // $29
    op("SRA D", Handler::Shift, Operand::None), // $2A
    op("SRA E", Handler::Shift, Operand::None), // $2B
    op("SRA H", Handler::Shift, Operand::None), // $2C
    op("SRA L", Handler::Shift, Operand::None), // $2D
    op("SRA (HL)", Handler::Shift, Operand::None), // $2E
    op("SRA A", Handler::Shift, Operand::None), // $2F
    op("SWAP B", Handler::Shift, Operand::None), // $30
    op("SWAP C", Handler::Shift, Operand::None), // $31
    op("SWAP D", Handler::Shift, Operand::None), // $32
    op("SWAP E", Handler::Shift, Operand::None), // $33
    op("SWAP H", Handler::Shift, Operand::None), // $34
    op("SWAP L", Handler::Shift, Operand::None), // $35
    op("SWAP (HL)", Handler::Shift, Operand::None), // $36
    op("SWAP A", Handler::Shift, Operand::None), // $37
    op("SRL B", Handler::Shift, Operand::None), // $38
    op("SRL C", Handler::Shift, Operand::None), // $39
    op("SRL D", Handler::Shift, Operand::None), // $3A
    op("SRL E", Handler::Shift, Operand::None), // $3B
    op("SRL H", Handler::Shift, Operand::None), // $3C
    op("SRL L", Handler::Shift, Operand::None), // $3D
    op("SRL (HL)", Handler::Shift, Operand::None), // $3E
    op("SRL A", Handler::Shift, Operand::None), // $3F
    op("BIT 0,B", Handler::Bit, Operand::None), // $40
    op("BIT 0,C", Handler::Bit, Operand::None), // $41
    op("BIT 0,D", Handler::Bit, Operand::None), // $42
    op("BIT 0,E", Handler::Bit, Operand::None), // $43
    op("BIT 0,H", Handler::Bit, Operand::None), // $44
    op("BIT 0,L", Handler::Bit, Operand::None), // $45
    op("BIT 0,(HL)", Handler::Bit, Operand::None), // $46
    op("BIT 0,A", Handler::Bit, Operand::None), // $47
    op("BIT 1,B", Handler::Bit, Operand::None), // $48
    op("BIT 1,C", Handler::Bit, Operand::None), // $49
    op("BIT 1,D", Handler::Bit, Operand::None), // $4A
    op("BIT 1,E", Handler::Bit, Operand::None), // $4B
    op("BIT 1,H", Handler::Bit, Operand::None), // $4C
    op("BIT 1,L", Handler::Bit, Operand::None), // $4D
    op("BIT 1,(HL)", Handler::Bit, Operand::None), // $4E
    op("BIT 1,A", Handler::Bit, Operand::None), // $4F
    op("BIT 2,B", Handler::Bit, Operand::None), // $50
    op("BIT 2,C", Handler::Bit, Operand::None), // $51
    op("BIT 2,D", Handler::Bit, Operand::None), // $52
    op("BIT 2,E", Handler::Bit, Operand::None), // $53
    op("BIT 2,H", Handler::Bit, Operand::None), // $54
    op("BIT 2,L", Handler::Bit, Operand::None), // $55
    op("BIT 2,(HL)", Handler::Bit, Operand::None), // $56
    op("BIT 2,A", Handler::Bit, Operand::None), // $57
    op("BIT 3,B", Handler::Bit, Operand::None), // $58
    op("BIT 3,C", Handler::Bit, Operand::None), // $59
    op("BIT 3,D", Handler::Bit, Operand::None), // $5A
    op("BIT 3,E", Handler::Bit, Operand::None), // $5B
    op("BIT 3,H", Handler::Bit, Operand::None), // $5C
    op("BIT 3,L", Handler::Bit, Operand::None), // $5D
    op("BIT 3,(HL)", Handler::Bit, Operand::None), // $5E
    op("BIT 3,A", Handler::Bit, Operand::None), // $5F
    op("BIT 4,B", Handler::Bit, Operand::None), // $60
    op("BIT 4,C", Handler::Bit, Operand::None), // $61
    op("BIT 4,D", Handler::Bit, Operand::None), // $62
    op("BIT 4,E", Handler::Bit, Operand::None), // $63
    op("BIT 4,H", Handler::Bit, Operand::None), // $64
    op("BIT 4,L", Handler::Bit, Operand::None), // $65
    op("BIT 4,(HL)", Handler::Bit, Operand::None), // $66
    op("BIT 4,A", Handler::Bit, Operand::None), // $67
    op("BIT 5,B", Handler::Bit, Operand::None), // $68
    op("BIT 5,C", Handler::Bit, Operand::None), // $69
    op("BIT 5,D", Handler::Bit, Operand::None), // $6A
    op("BIT 5,E", Handler::Bit, Operand::None), // $6B
    op("BIT 5,H", Handler::Bit, Operand::None), // $6C
    op("BIT 5,L", Handler::Bit, Operand::None), // $6D
    op("BIT 5,(HL)", Handler::Bit, Operand::None), // $6E
    op("BIT 5,A", Handler::Bit, Operand::None), // $6F
    op("BIT 6,B", Handler::Bit, Operand::None), // $70
    op("BIT 6,C", Handler::Bit, Operand::None), // $71
    op("BIT 6,D", Handler::Bit, Operand::None), // $72
    op("BIT 6,E", Handler::Bit, Operand::None), // $73
    op("BIT 6,H", Handler::Bit, Operand::None), // $74
    op("BIT 6,L", Handler::Bit, Operand::None), // $75
    op("BIT 6,(HL)", Handler::Bit, Operand::None), // $76
    op("BIT 6,A", Handler::Bit, Operand::None), // $77
    op("BIT 7,B", Handler::Bit, Operand::None), // $78
    op("BIT 7,C", Handler::Bit, Operand::None), // $79
    op("BIT 7,D", Handler::Bit, Operand::None), // $7A
    op("BIT 7,E", Handler::Bit, Operand::None), // $7B
    op("BIT 7,H", Handler::Bit, Operand::None), // $7C
    op("BIT 7,L", Handler::Bit, Operand::None), // $7D
    op("BIT 7,(HL)", Handler::Bit, Operand::None), // $7E
    op("BIT 7,A", Handler::Bit, Operand::None), // $7F
    op("RES 0,B", Handler::Res, Operand::None), // $80
    op("RES 0,C", Handler::Res, Operand::None), // $81
    op("RES 0,D", Handler::Res, Operand::None), // $82
    op("RES 0,E", Handler::Res, Operand::None), // $83
    op("RES 0,H", Handler::Res, Operand::None), // $84
    op("RES 0,L", Handler::Res, Operand::None), // $85
    op("RES 0,(HL)", Handler::Res, Operand::None), // $86
    op("RES 0,A", Handler::Res, Operand::None), // $87
    op("RES 1,B", Handler::Res, Operand::None), // $88
    op("RES 1,C", Handler::Res, Operand::None), // $89
    op("RES 1,D", Handler::Res, Operand::None), // $8A
    op("RES 1,E", Handler::Res, Operand::None), // $8B
    op("RES 1,H", Handler::Res, Operand::None), // $8C
    op("RES 1,L", Handler::Res, Operand::None), // $8D
    op("RES 1,(HL)", Handler::Res, Operand::None), // $8E
    op("RES 1,A", Handler::Res, Operand::None), // $8F
    op("RES 2,B", Handler::Res, Operand::None), // $90
    op("RES 2,C", Handler::Res, Operand::None), // $91
    op("RES 2,D", Handler::Res, Operand::None), // $92
    op("RES 2,E", Handler::Res, Operand::None), // $93
    op("RES 2,H", Handler::Res, Operand::None), // $94
    op("RES 2,L", Handler::Res, Operand::None), // $95
    op("RES 2,(HL)", Handler::Res, Operand::None), // $96
    op("RES 2,A", Handler::Res, Operand::None), // $97
    op("RES 3,B", Handler::Res, Operand::None), // $98
    op("RES 3,C", Handler::Res, Operand::None), // $99
    op("RES 3,D", Handler::Res, Operand::None), // $9A
    op("RES 3,E", Handler::Res, Operand::None), // $9B
    op("RES 3,H", Handler::Res, Operand::None), // $9C
    op("RES 3,L", Handler::Res, Operand::None), // $9D
    op("RES 3,(HL)", Handler::Res, Operand::None), // $9E
    op("RES 3,A", Handler::Res, Operand::None), // $9F
    op("RES 4,B", Handler::Res, Operand::None), // $A0
    op("RES 4,C", Handler::Res, Operand::None), // $A1
    op("RES 4,D", Handler::Res, Operand::None), // $A2
    op("RES 4,E", Handler::Res, Operand::None), // $A3
    op("RES 4,H", Handler::Res, Operand::None), // $A4
    op("RES 4,L", Handler::Res, Operand::None), // $A5
    op("RES 4,(HL)", Handler::Res, Operand::None), // $A6
    op("RES 4,A", Handler::Res, Operand::None), // $A7
    op("RES 5,B", Handler::Res, Operand::None), // $A8
    op("RES 5,C", Handler::Res, Operand::None), // $A9
    op("RES 5,D", Handler::Res, Operand::None), // $AA
    op("RES 5,E", Handler::Res, Operand::None), // $AB
    op("RES 5,H", Handler::Res, Operand::None), // $AC
    op("RES 5,L", Handler::Res, Operand::None), // $AD
    op("RES 5,(HL)", Handler::Res, Operand::None), // $AE
    op("RES 5,A", Handler::Res, Operand::None), // $AF
    op("RES 6,B", Handler::Res, Operand::None), // $B0
    op("RES 6,C", Handler::Res, Operand::None), // $B1
    op("RES 6,D", Handler::Res, Operand::None), // $B2
    op("RES 6,E", Handler::Res, Operand::None), // $B3
    op("RES 6,H", Handler::Res, Operand::None), // $B4
    op("RES 6,L", Handler::Res, Operand::None), // $B5
    op("RES 6,(HL)", Handler::Res, Operand::None), // $B6
    op("RES 6,A", Handler::Res, Operand::None), // $B7
    op("RES 7,B", Handler::Res, Operand::None), // $B8
    op("RES 7,C", Handler::Res, Operand::None), // $B9
    op("RES 7,D", Handler::Res, Operand::None), // $BA
    op("RES 7,E", Handler::Res, Operand::None), // $BB
    op("RES 7,H", Handler::Res, Operand::None), // $BC
    op("RES 7,L", Handler::Res, Operand::None), // $BD
    op("RES 7,(HL)", Handler::Res, Operand::None), // $BE
    op("RES 7,A", Handler::Res, Operand::None), // $BF
    op("SET 0,B", Handler::Set, Operand::None), // $C0
    op("SET 0,C", Handler::Set, Operand::None), // $C1
    op("SET 0,D", Handler::Set, Operand::None), // $C2
    op("SET 0,E", Handler::Set, Operand::None), // $C3
    op("SET 0,H", Handler::Set, Operand::None), // $C4
    op("SET 0,L", Handler::Set, Operand::None), // $C5
    op("SET 0,(HL)", Handler::Set, Operand::None), // $C6
    op("SET 0,A", Handler::Set, Operand::None), // $C7
    op("SET 1,B", Handler::Set, Operand::None), // $C8
    op("SET 1,C", Handler::Set, Operand::None), // $C9
    op("SET 1,D", Handler::Set, Operand::None), // $CA
    op("SET 1,E", Handler::Set, Operand::None), // $CB
    op("SET 1,H", Handler::Set, Operand::None), // $CC
    op("SET 1,L", Handler::Set, Operand::None), // $CD
    op("SET 1,(HL)", Handler::Set, Operand::None), // $CE
    op("SET 1,A", Handler::Set, Operand::None), // $CF
    op("SET 2,B", Handler::Set, Operand::None), // $D0
    op("SET 2,C", Handler::Set, Operand::None), // $D1
    op("SET 2,D", Handler::Set, Operand::None), // $D2
    op("SET 2,E", Handler::Set, Operand::None), // $D3
    op("SET 2,H", Handler::Set, Operand::None), // $D4
    op("SET 2,L", Handler::Set, Operand::None), // $D5
    op("SET 2,(HL)", Handler::Set, Operand::None), // $D6
    op("SET 2,A", Handler::Set, Operand::None), // $D7
    op("SET 3,B", Handler::Set, Operand::None), // $D8
    op("SET 3,C", Handler::Set, Operand::None), // $D9
    op("SET 3,D", Handler::Set, Operand::None), // $DA
    op("SET 3,E", Handler::Set, Operand::None), // $DB
    op("SET 3,H", Handler::Set, Operand::None), // $DC
    op("SET 3,L", Handler::Set, Operand::None), // $DD
    op("SET 3,(HL)", Handler::Set, Operand::None), // $DE
    op("SET 3,A", Handler::Set, Operand::None), // $DF
    op("SET 4,B", Handler::Set, Operand::None), // $E0
    op("SET 4,C", Handler::Set, Operand::None), // $E1
    op("SET 4,D", Handler::Set, Operand::None), // $E2
    op("SET 4,E", Handler::Set, Operand::None), // $E3
    op("SET 4,H", Handler::Set, Operand::None), // $E4
    op("SET 4,L", Handler::Set, Operand::None), // $E5
    op("SET 4,(HL)", Handler::Set, Operand::None), // $E6
    op("SET 4,A", Handler::Set, Operand::None), // $E7
    op("SET 5,B", Handler::Set, Operand::None), // $E8
    op("SET 5,C", Handler::Set, Operand::None), // $E9
    op("SET 5,D", Handler::Set, Operand::None), // $EA
    op("SET 5,E", Handler::Set, Operand::None), // $EB
    op("SET 5,H", Handler::Set, Operand::None), // $EC
    op("SET 5,L", Handler::Set, Operand::None), // $ED
    op("SET 5,(HL)", Handler::Set, Operand::None), // $EE
    op("SET 5,A", Handler::Set, Operand::None), // $EF
    op("SET 6,B", Handler::Set, Operand::None), // $F0
    op("SET 6,C", Handler::Set, Operand::None), // $F1
    op("SET 6,D", Handler::Set, Operand::None), // $F2
    op("SET 6,E", Handler::Set, Operand::None), // $F3
    op("SET 6,H", Handler::Set, Operand::None), // $F4
    op("SET 6,L", Handler::Set, Operand::None), // $F5
    op("SET 6,(HL)", Handler::Set, Operand::None), // $F6
    op("SET 6,A", Handler::Set, Operand::None), // $F7
    op("SET 7,B", Handler::Set, Operand::None), // $F8
    op("SET 7,C", Handler::Set, Operand::None), // $F9
    op("SET 7,D", Handler::Set, Operand::None), // $FA
    op("SET 7,E", Handler::Set, Operand::None), // $FB
    op("SET 7,H", Handler::Set, Operand::None), // $FC
    op("SET 7,L", Handler::Set, Operand::None), // $FD
    op("SET 7,(HL)", Handler::Set, Operand::None), // $FE
    op("SET 7,A", Handler::Set, Operand::None), // $FF
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eleven_illegal_base_opcodes() {
        let illegal: Vec<usize> = OPCODES
            .iter()
            .enumerate()
            .filter(|(_, info)| info.handler == Handler::Illegal)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(
            illegal,
            vec![0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD]
        );
    }

    #[test]
    fn every_cb_opcode_is_defined() {
        for (i, info) in CB_OPCODES.iter().enumerate() {
            let expected = match i >> 6 {
                0 => Handler::Shift,
                1 => Handler::Bit,
                2 => Handler::Res,
                _ => Handler::Set,
            };
            assert_eq!(info.handler, expected, "CB {i:02X}");
            assert_eq!(info.len(true), 2);
        }
    }

    #[test]
    fn templates_name_their_operand() {
        for (i, info) in OPCODES.iter().enumerate() {
            let token = match info.operand {
                Operand::None => continue,
                Operand::N8 if info.handler == Handler::Stop => continue,
                Operand::N8 => "n8",
                Operand::N16 => "n16",
                Operand::A8 => "a8",
                Operand::A16 => "a16",
                Operand::Rel8 => "e8",
                Operand::Signed8 => "s8",
            };
            assert!(info.mnemonic.contains(token), "${i:02X} {}", info.mnemonic);
        }
    }

    #[test]
    fn lengths() {
        assert_eq!(OPCODES[0x00].len(false), 1);
        assert_eq!(OPCODES[0x10].len(false), 2);
        assert_eq!(OPCODES[0x18].len(false), 2);
        assert_eq!(OPCODES[0xC3].len(false), 3);
        assert_eq!(OPCODES[0xE0].len(false), 2);
    }
}

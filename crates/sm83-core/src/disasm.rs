//! Table-driven SM83 disassembler.

use std::fmt;

use crate::opcodes::{CB_OPCODES, Handler, OPCODES, OpcodeInfo, Operand};

const PREFIX_CB: u8 = 0xCB;

/// One decoded instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub address: u16,
    /// Encoded bytes as space-separated hex.
    pub bytes: String,
    pub text: String,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}: {:<9} {}", self.address, self.bytes, self.text)
    }
}

/// Decode the instruction at the start of `mem`, located at `addr`.
/// Returns the text and the encoded length, or `None` if `mem` ends before
/// the instruction does.
pub fn decode(mem: &[u8], addr: u16) -> Option<(String, u16)> {
    let op = *mem.first()?;
    let (info, prefixed) = if op == PREFIX_CB {
        (&CB_OPCODES[*mem.get(1)? as usize], true)
    } else {
        (&OPCODES[op as usize], false)
    };
    let len = info.len(prefixed);
    if mem.len() < len as usize {
        return None;
    }
    if info.handler == Handler::Illegal {
        return Some((format!("DB ${op:02X}"), len));
    }
    let operand = &mem[1 + prefixed as usize..len as usize];
    Some((format_operand(info, operand, addr.wrapping_add(len)), len))
}

fn format_operand(info: &OpcodeInfo, operand: &[u8], next: u16) -> String {
    let (token, value) = match info.operand {
        Operand::None => return info.mnemonic.to_string(),
        // STOP's padding byte is not shown.
        Operand::N8 if info.handler == Handler::Stop => return info.mnemonic.to_string(),
        Operand::N8 => ("n8", format!("${:02X}", operand[0])),
        Operand::A8 => ("a8", format!("$FF{:02X}", operand[0])),
        Operand::N16 | Operand::A16 => {
            let token = if info.operand == Operand::N16 { "n16" } else { "a16" };
            let word = u16::from_le_bytes([operand[0], operand[1]]);
            (token, format!("${word:04X}"))
        }
        Operand::Rel8 => {
            let target = next.wrapping_add(operand[0] as i8 as u16);
            ("e8", format!("${target:04X}"))
        }
        Operand::Signed8 => {
            let offset = operand[0] as i8;
            if offset < 0 {
                // SP+s8 reads as SP-n for negative offsets.
                let text = format!("-{}", offset.unsigned_abs());
                return info.mnemonic.replacen("+s8", &text, 1).replacen("s8", &text, 1);
            }
            ("s8", offset.to_string())
        }
    };
    info.mnemonic.replacen(token, &value, 1)
}

pub fn format_bytes(mem: &[u8]) -> String {
    let mut s = String::with_capacity(mem.len() * 3);
    for (i, b) in mem.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        s.push_str(&format!("{b:02X}"));
    }
    s
}

/// Disassembly of a byte buffer. Iterating yields [`Line`]s lazily and can be
/// repeated; decoding stops at the first instruction that runs past the end
/// of the buffer.
#[derive(Clone, Copy, Debug)]
pub struct Disassembler<'a> {
    data: &'a [u8],
    base: u16,
}

impl<'a> Disassembler<'a> {
    /// Disassemble `data` as if it were loaded at $0000.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base(data, 0)
    }

    pub fn with_base(data: &'a [u8], base: u16) -> Self {
        Self { data, base }
    }

    pub fn lines(&self) -> Lines<'a> {
        Lines {
            data: self.data,
            base: self.base,
            offset: 0,
        }
    }
}

impl<'a> IntoIterator for &Disassembler<'a> {
    type Item = Line;
    type IntoIter = Lines<'a>;

    fn into_iter(self) -> Lines<'a> {
        self.lines()
    }
}

#[derive(Clone, Debug)]
pub struct Lines<'a> {
    data: &'a [u8],
    base: u16,
    offset: usize,
}

impl Iterator for Lines<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        let rest = self.data.get(self.offset..)?;
        let address = self.base.wrapping_add(self.offset as u16);
        let (text, len) = decode(rest, address)?;
        let bytes = format_bytes(&rest[..len as usize]);
        self.offset += len as usize;
        Some(Line {
            address,
            bytes,
            text,
        })
    }
}

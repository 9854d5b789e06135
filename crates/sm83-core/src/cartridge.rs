use std::{fs, io, path::Path};

use log::{info, warn};
use thiserror::Error;

use crate::bus::{AddressRange, Device};

pub const ROM_END: u16 = 0x7FFF;
pub const EXTERNAL_RAM_START: u16 = 0xA000;
pub const EXTERNAL_RAM_END: u16 = 0xBFFF;
/// Writing a non-zero value here unmaps the boot ROM.
pub const BOOT_OFF_ADDR: u16 = 0xFF50;
pub const BOOT_ROM_LEN: usize = 0x100;

const ROM_BANK_LEN: usize = 0x4000;
const RAM_BANK_LEN: usize = 0x2000;
const HEADER_END: usize = 0x150;

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("unsupported cartridge type ${0:02X}")]
    UnsupportedMapper(u8),
    #[error("boot ROM must be {BOOT_ROM_LEN} bytes, got {0}")]
    BootRomSize(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbcType {
    NoMbc,
    Mbc1,
}

#[derive(Debug)]
enum MbcState {
    NoMbc,
    Mbc1 {
        rom_bank: u8,
        ram_bank: u8,
        mode: u8,
        ram_enable: bool,
        multicart: bool,
    },
}

#[derive(Debug)]
pub struct Cartridge {
    rom: Vec<u8>,
    ram: Vec<u8>,
    mbc: MbcType,
    title: String,
    mbc_state: MbcState,
    boot_rom: Option<Vec<u8>>,
}

impl Cartridge {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| CartridgeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let cart = Self::load(data)?;
        info!("Loaded ROM: {} (MBC: {:?})", cart.title, cart.mbc);
        Ok(cart)
    }

    /// Build a cartridge from a raw ROM image. Images shorter than a header
    /// are treated as ROM-only with 8 KiB of RAM, which is what hand-written
    /// test programs need.
    pub fn load(data: Vec<u8>) -> Result<Self, CartridgeError> {
        let header = Header::parse(&data);
        let mbc = header.mbc_type()?;
        let mbc_state = match mbc {
            MbcType::NoMbc => MbcState::NoMbc,
            MbcType::Mbc1 => MbcState::Mbc1 {
                rom_bank: 1,
                ram_bank: 0,
                mode: 0,
                ram_enable: false,
                multicart: detect_mbc1_multicart(&data),
            },
        };
        Ok(Self {
            ram: vec![0; header.ram_size()],
            title: header.title(),
            mbc,
            mbc_state,
            rom: data,
            boot_rom: None,
        })
    }

    /// Overlay `image` on $0000-$00FF until the program writes to $FF50.
    pub fn with_boot_rom(mut self, image: Vec<u8>) -> Result<Self, CartridgeError> {
        if image.len() != BOOT_ROM_LEN {
            return Err(CartridgeError::BootRomSize(image.len()));
        }
        self.boot_rom = Some(image);
        Ok(self)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn mbc(&self) -> MbcType {
        self.mbc
    }

    pub fn boot_rom_mapped(&self) -> bool {
        self.boot_rom.is_some()
    }

    /// Entry point byte range, for disassembly.
    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    fn rom_bank_count(&self) -> usize {
        (self.rom.len() / ROM_BANK_LEN).max(1)
    }

    fn read_rom(&self, addr: u16) -> u8 {
        let bank = match self.mbc_state {
            MbcState::NoMbc => return self.rom.get(addr as usize).copied().unwrap_or(0xFF),
            MbcState::Mbc1 {
                rom_bank,
                ram_bank,
                mode,
                multicart,
                ..
            } => {
                let shift = if multicart { 4 } else { 5 };
                let high = ((ram_bank as usize) & 0x03) << shift;
                if addr < 0x4000 {
                    if mode == 0 { 0 } else { high }
                } else {
                    let low = if multicart {
                        rom_bank as usize & 0x0F
                    } else {
                        rom_bank as usize & 0x1F
                    };
                    high | low
                }
            }
        };
        let bank = bank % self.rom_bank_count();
        let offset = bank * ROM_BANK_LEN + (addr as usize & (ROM_BANK_LEN - 1));
        self.rom.get(offset).copied().unwrap_or(0xFF)
    }

    fn ram_index(&self, addr: u16) -> Option<usize> {
        let offset = (addr - EXTERNAL_RAM_START) as usize;
        let index = match self.mbc_state {
            MbcState::NoMbc => offset,
            MbcState::Mbc1 {
                ram_enable: false, ..
            } => return None,
            MbcState::Mbc1 { ram_bank, mode, .. } => {
                let banks = self.ram.len().div_ceil(RAM_BANK_LEN).max(1);
                if mode == 0 {
                    offset
                } else {
                    (ram_bank as usize % banks) * RAM_BANK_LEN + offset
                }
            }
        };
        (index < self.ram.len()).then_some(index)
    }

    fn write_register(&mut self, addr: u16, val: u8) {
        match &mut self.mbc_state {
            MbcState::NoMbc => warn!("write {val:02X} to ROM at {addr:04X} ignored, no mapper"),
            MbcState::Mbc1 {
                rom_bank,
                ram_bank,
                mode,
                ram_enable,
                ..
            } => match addr {
                0x0000..=0x1FFF => *ram_enable = val & 0x0F == 0x0A,
                0x2000..=0x3FFF => {
                    // Bank 0 cannot be selected in the switchable area.
                    *rom_bank = (val & 0x1F).max(1);
                }
                0x4000..=0x5FFF => *ram_bank = val & 0x03,
                _ => *mode = val & 0x01,
            },
        }
    }
}

impl Device for Cartridge {
    fn name(&self) -> &'static str {
        "cartridge"
    }

    fn mapping(&self) -> Vec<AddressRange> {
        vec![
            0x0000..=ROM_END,
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END,
            BOOT_OFF_ADDR..=BOOT_OFF_ADDR,
        ]
    }

    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x00FF if self.boot_rom.is_some() => self
                .boot_rom
                .as_ref()
                .map_or(0xFF, |boot| boot[addr as usize]),
            0x0000..=ROM_END => self.read_rom(addr),
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END => {
                self.ram_index(addr).map_or(0xFF, |i| self.ram[i])
            }
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=ROM_END => self.write_register(addr, value),
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END => {
                if let Some(i) = self.ram_index(addr) {
                    self.ram[i] = value;
                }
            }
            BOOT_OFF_ADDR => {
                if value != 0 && self.boot_rom.take().is_some() {
                    info!("boot ROM unmapped");
                }
            }
            _ => {}
        }
    }

    fn apply_post_boot(&mut self) {
        self.boot_rom = None;
    }
}

fn detect_mbc1_multicart(rom: &[u8]) -> bool {
    // Multicarts use the 8 Mbit wiring and repeat the header logo at the
    // start of several 256 KiB games.
    if rom.len() / ROM_BANK_LEN != 64 {
        return false;
    }
    let logo0 = match rom.get(0x0104..0x0134) {
        Some(s) if !s.iter().all(|&b| b == 0) => s,
        _ => return false,
    };
    (1..=2).all(|game| {
        let start = game * 0x10 * ROM_BANK_LEN + 0x0104;
        rom.get(start..start + 0x30) == Some(logo0)
    })
}

struct Header<'a> {
    data: &'a [u8],
}

impl<'a> Header<'a> {
    fn parse(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn complete(&self) -> bool {
        self.data.len() >= HEADER_END
    }

    fn title(&self) -> String {
        let Some(mut slice) = self.data.get(0x0134..0x0143) else {
            return String::new();
        };
        if let Some(pos) = slice.iter().position(|&b| b == 0) {
            slice = &slice[..pos];
        }
        String::from_utf8_lossy(slice).trim().to_string()
    }

    fn cart_type(&self) -> u8 {
        if !self.complete() {
            return 0x00;
        }
        self.data[0x0147]
    }

    fn mbc_type(&self) -> Result<MbcType, CartridgeError> {
        match self.cart_type() {
            0x00 | 0x08 | 0x09 => Ok(MbcType::NoMbc),
            0x01..=0x03 => Ok(MbcType::Mbc1),
            other => Err(CartridgeError::UnsupportedMapper(other)),
        }
    }

    fn ram_size(&self) -> usize {
        if !self.complete() {
            return RAM_BANK_LEN;
        }
        match self.data[0x0149] {
            0x00 => 0,
            0x01 => 0x800,
            0x02 => 0x2000,
            0x03 => 0x8000,
            0x04 => 0x20000,
            0x05 => 0x10000,
            _ => RAM_BANK_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom_with_header(cart_type: u8, ram_code: u8, banks: usize) -> Vec<u8> {
        let mut rom = vec![0; banks * ROM_BANK_LEN];
        rom[0x0134..0x0138].copy_from_slice(b"TEST");
        rom[0x0147] = cart_type;
        rom[0x0149] = ram_code;
        for bank in 0..banks {
            rom[bank * ROM_BANK_LEN + 0x100] = bank as u8;
        }
        rom
    }

    #[test]
    fn header_fields() {
        let cart = Cartridge::load(rom_with_header(0x01, 0x02, 4)).unwrap();
        assert_eq!(cart.title(), "TEST");
        assert_eq!(cart.mbc(), MbcType::Mbc1);
        assert!(matches!(
            Cartridge::load(rom_with_header(0x1B, 0x00, 4)),
            Err(CartridgeError::UnsupportedMapper(0x1B))
        ));
    }

    #[test]
    fn rom_only_ignores_writes() {
        let mut cart = Cartridge::load(rom_with_header(0x00, 0x00, 2)).unwrap();
        cart.write(0x2000, 0x05);
        assert_eq!(cart.read(0x4100), 1);
        assert_eq!(cart.read(0xA000), 0xFF, "no RAM fitted");
    }

    #[test]
    fn mbc1_rom_banking() {
        let mut cart = Cartridge::load(rom_with_header(0x01, 0x00, 64)).unwrap();
        assert_eq!(cart.read(0x4100), 1);
        cart.write(0x2000, 0x00);
        assert_eq!(cart.read(0x4100), 1, "bank 0 maps to 1");
        cart.write(0x2000, 0x07);
        assert_eq!(cart.read(0x4100), 7);
        cart.write(0x4000, 0x01);
        assert_eq!(cart.read(0x4100), 0x27);
        assert_eq!(cart.read(0x0100), 0, "mode 0 keeps bank 0 low");
        cart.write(0x6000, 0x01);
        assert_eq!(cart.read(0x0100), 0x20);
    }

    #[test]
    fn mbc1_ram_requires_enable() {
        let mut cart = Cartridge::load(rom_with_header(0x03, 0x03, 4)).unwrap();
        cart.write(0xA000, 0x42);
        assert_eq!(cart.read(0xA000), 0xFF);
        cart.write(0x0000, 0x0A);
        cart.write(0xA000, 0x42);
        assert_eq!(cart.read(0xA000), 0x42);
        cart.write(0x6000, 0x01);
        cart.write(0x4000, 0x02);
        assert_eq!(cart.read(0xA000), 0x00);
        cart.write(0x4000, 0x00);
        assert_eq!(cart.read(0xA000), 0x42);
        cart.write(0x0000, 0x00);
        assert_eq!(cart.read(0xA000), 0xFF);
    }

    #[test]
    fn boot_rom_overlay_until_ff50() {
        let rom = rom_with_header(0x00, 0x00, 2);
        let mut cart = Cartridge::load(rom)
            .unwrap()
            .with_boot_rom(vec![0x31; BOOT_ROM_LEN])
            .unwrap();
        assert_eq!(cart.read(0x0000), 0x31);
        assert_eq!(cart.read(0x0100), 0x00);
        cart.write(BOOT_OFF_ADDR, 0x01);
        assert!(!cart.boot_rom_mapped());
        assert_eq!(cart.read(0x0000), 0x00);
        assert!(matches!(
            Cartridge::load(vec![]).unwrap().with_boot_rom(vec![0; 10]),
            Err(CartridgeError::BootRomSize(10))
        ));
    }

    #[test]
    fn short_images_get_scratch_ram() {
        let mut cart = Cartridge::load(vec![0x00, 0x18, 0xFE]).unwrap();
        assert_eq!(cart.read(0x0001), 0x18);
        assert_eq!(cart.read(0x0200), 0xFF);
        cart.write(0xBFFF, 0x11);
        assert_eq!(cart.read(0xBFFF), 0x11);
    }
}

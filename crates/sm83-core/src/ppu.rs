//! LCD controller timing and register surface (gbdev.io/pandocs/Rendering.html).
//!
//! Pixels are not produced: the PPU sequences modes per dot, owns VRAM and
//! OAM, and raises the VBlank and STAT interrupts at the right times.

use crate::bus::{AddressRange, Device};
use crate::interrupts::{Interrupt, Interrupts};

pub const VRAM_START: u16 = 0x8000;
pub const VRAM_END: u16 = 0x9FFF;
pub const OAM_START: u16 = 0xFE00;
pub const OAM_END: u16 = 0xFE9F;
const UNUSABLE: AddressRange = 0xFEA0..=0xFEFF;

pub const LCDC_ADDR: u16 = 0xFF40;
pub const STAT_ADDR: u16 = 0xFF41;
pub const SCY_ADDR: u16 = 0xFF42;
pub const SCX_ADDR: u16 = 0xFF43;
pub const LY_ADDR: u16 = 0xFF44;
pub const LYC_ADDR: u16 = 0xFF45;
pub const BGP_ADDR: u16 = 0xFF47;
pub const OBP0_ADDR: u16 = 0xFF48;
pub const OBP1_ADDR: u16 = 0xFF49;
pub const WY_ADDR: u16 = 0xFF4A;
pub const WX_ADDR: u16 = 0xFF4B;

const DOTS_PER_M_CYCLE: u32 = 4;
const DOTS_PER_LINE: u16 = 456;
const OAM_SCAN_DOTS: u16 = 80;
const TRANSFER_DOTS: u16 = 172;
const SCREEN_HEIGHT: u8 = 144;
const LINES_PER_FRAME: u8 = 154;
/// On the last line LY already reads 0 after this many dots.
const LAST_LINE_LY_RESET_DOT: u16 = 4;

const LCDC_ENABLE: u8 = 0x80;
const STAT_WRITABLE: u8 = 0x78;
const STAT_HBLANK_IRQ: u8 = 0x08;
const STAT_VBLANK_IRQ: u8 = 0x10;
const STAT_OAM_IRQ: u8 = 0x20;
const STAT_LYC_IRQ: u8 = 0x40;
const STAT_LYC_EQUAL: u8 = 0x04;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Transfer = 3,
}

#[derive(Clone, Debug)]
pub struct Ppu {
    vram: Vec<u8>,
    oam: Vec<u8>,

    lcdc: u8,
    stat: u8,
    scy: u8,
    scx: u8,
    lyc: u8,
    bgp: u8,
    obp0: u8,
    obp1: u8,
    wy: u8,
    wx: u8,

    line: u8,
    dot: u16,
    mode: Mode,
    stat_irq_line: bool,
    frame_ready: bool,
    frames: u64,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            vram: vec![0; (VRAM_END - VRAM_START + 1) as usize],
            oam: vec![0; (OAM_END - OAM_START + 1) as usize],
            lcdc: 0,
            stat: 0,
            scy: 0,
            scx: 0,
            lyc: 0,
            bgp: 0,
            obp0: 0,
            obp1: 0,
            wy: 0,
            wx: 0,
            line: 0,
            dot: 0,
            mode: Mode::HBlank,
            stat_irq_line: false,
            frame_ready: false,
            frames: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn lcd_enabled(&self) -> bool {
        self.lcdc & LCDC_ENABLE != 0
    }

    pub fn vram(&self) -> &[u8] {
        &self.vram
    }

    pub fn oam(&self) -> &[u8] {
        &self.oam
    }

    /// Set when VBlank starts; cleared by [`Ppu::clear_frame_flag`] or at
    /// the start of the next frame.
    pub fn frame_ready(&self) -> bool {
        self.frame_ready
    }

    pub fn clear_frame_flag(&mut self) {
        self.frame_ready = false;
    }

    /// Frames completed since power on.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// LY as the CPU sees it.
    pub fn ly(&self) -> u8 {
        if self.line == LINES_PER_FRAME - 1 && self.dot >= LAST_LINE_LY_RESET_DOT {
            0
        } else {
            self.line
        }
    }

    fn mode_at(line: u8, dot: u16) -> Mode {
        if line >= SCREEN_HEIGHT {
            Mode::VBlank
        } else if dot < OAM_SCAN_DOTS {
            Mode::OamScan
        } else if dot < OAM_SCAN_DOTS + TRANSFER_DOTS {
            Mode::Transfer
        } else {
            Mode::HBlank
        }
    }

    fn lyc_equal(&self) -> bool {
        self.lcd_enabled() && self.ly() == self.lyc
    }

    fn read_stat(&self) -> u8 {
        let mode = if self.lcd_enabled() { self.mode as u8 } else { 0 };
        let lyc = if self.lyc_equal() { STAT_LYC_EQUAL } else { 0 };
        0x80 | (self.stat & STAT_WRITABLE) | lyc | mode
    }

    fn write_lcdc(&mut self, value: u8) {
        let was_on = self.lcd_enabled();
        self.lcdc = value;
        match (was_on, self.lcd_enabled()) {
            (true, false) => {
                self.line = 0;
                self.dot = 0;
                self.mode = Mode::HBlank;
                self.stat_irq_line = false;
            }
            (false, true) => {
                self.line = 0;
                self.dot = 0;
                self.mode = Mode::OamScan;
            }
            _ => {}
        }
    }

    /// Advance one dot. Returns the interrupts raised.
    fn step_dot(&mut self) -> (bool, bool) {
        if !self.lcd_enabled() {
            return (false, false);
        }
        self.dot += 1;
        if self.dot == DOTS_PER_LINE {
            self.dot = 0;
            self.line += 1;
            if self.line == LINES_PER_FRAME {
                self.line = 0;
                self.frame_ready = false;
                self.frames = self.frames.wrapping_add(1);
            }
        }

        let mode = Self::mode_at(self.line, self.dot);
        let mut vblank = false;
        // DMG quirk: the OAM STAT source also fires when VBlank begins.
        let mut oam_glitch = false;
        if mode != self.mode {
            if mode == Mode::VBlank {
                vblank = true;
                self.frame_ready = true;
                oam_glitch = self.stat & STAT_OAM_IRQ != 0;
            }
            self.mode = mode;
        }
        (vblank, self.update_stat_line(oam_glitch))
    }

    /// Recompute the STAT interrupt line; true on a rising edge.
    fn update_stat_line(&mut self, oam_glitch: bool) -> bool {
        let coincidence = self.lyc_equal() && self.stat & STAT_LYC_IRQ != 0;
        let mode_signal = match self.mode {
            Mode::HBlank => self.stat & STAT_HBLANK_IRQ != 0,
            Mode::VBlank => self.stat & STAT_VBLANK_IRQ != 0,
            Mode::OamScan => self.stat & STAT_OAM_IRQ != 0,
            Mode::Transfer => false,
        };
        let current = coincidence || mode_signal || oam_glitch;
        let rising = current && !self.stat_irq_line;
        self.stat_irq_line = current;
        rising
    }
}

impl Device for Ppu {
    fn name(&self) -> &'static str {
        "ppu"
    }

    fn mapping(&self) -> Vec<AddressRange> {
        vec![
            VRAM_START..=VRAM_END,
            OAM_START..=OAM_END,
            UNUSABLE,
            LCDC_ADDR..=LYC_ADDR,
            BGP_ADDR..=WX_ADDR,
        ]
    }

    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            VRAM_START..=VRAM_END => self.vram[(addr - VRAM_START) as usize],
            OAM_START..=OAM_END => self.oam[(addr - OAM_START) as usize],
            LCDC_ADDR => self.lcdc,
            STAT_ADDR => self.read_stat(),
            SCY_ADDR => self.scy,
            SCX_ADDR => self.scx,
            LY_ADDR => self.ly(),
            LYC_ADDR => self.lyc,
            BGP_ADDR => self.bgp,
            OBP0_ADDR => self.obp0,
            OBP1_ADDR => self.obp1,
            WY_ADDR => self.wy,
            WX_ADDR => self.wx,
            // $FEA0-$FEFF
            _ => 0x00,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            VRAM_START..=VRAM_END => self.vram[(addr - VRAM_START) as usize] = value,
            OAM_START..=OAM_END => self.oam[(addr - OAM_START) as usize] = value,
            LCDC_ADDR => self.write_lcdc(value),
            STAT_ADDR => self.stat = value & STAT_WRITABLE,
            SCY_ADDR => self.scy = value,
            SCX_ADDR => self.scx = value,
            LYC_ADDR => self.lyc = value,
            BGP_ADDR => self.bgp = value,
            OBP0_ADDR => self.obp0 = value,
            OBP1_ADDR => self.obp1 = value,
            WY_ADDR => self.wy = value,
            WX_ADDR => self.wx = value,
            _ => {}
        }
    }

    fn tick(&mut self, interrupts: &mut Interrupts) {
        for _ in 0..DOTS_PER_M_CYCLE {
            let (vblank, stat) = self.step_dot();
            if vblank {
                interrupts.request(Interrupt::VBlank);
            }
            if stat {
                interrupts.request(Interrupt::Lcd);
            }
        }
    }

    fn apply_post_boot(&mut self) {
        self.lcdc = 0x91;
        self.stat = 0;
        self.bgp = 0xFC;
        // The boot ROM hands over near the end of the last VBlank line.
        self.line = LINES_PER_FRAME - 1;
        self.dot = DOTS_PER_LINE - DOTS_PER_M_CYCLE as u16;
        self.mode = Mode::VBlank;
        self.stat_irq_line = false;
    }
}

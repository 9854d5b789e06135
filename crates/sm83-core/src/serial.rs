//! SB/SC serial port. Test ROMs print through it, so every completed
//! transfer appends the outgoing byte to an output buffer.

use log::trace;

use crate::bus::{AddressRange, Device};
use crate::interrupts::{Interrupt, Interrupts};

pub const SB_ADDR: u16 = 0xFF01;
pub const SC_ADDR: u16 = 0xFF02;

const SC_START: u8 = 0x80;
const SC_INTERNAL_CLOCK: u8 = 0x01;
const SC_UNUSED_BITS: u8 = 0x7E;
/// 8192 Hz bit clock: one bit every 128 machine cycles.
const M_CYCLES_PER_BIT: u16 = 128;

pub trait LinkPort: Send {
    /// Exchange a byte with the partner. Returns the byte received.
    fn transfer(&mut self, byte: u8) -> u8;
}

/// Port used when no cable is attached. Incoming bits read as 1 unless
/// `loopback` echoes the sent byte.
#[derive(Default)]
pub struct NullLinkPort {
    loopback: bool,
}

impl NullLinkPort {
    pub fn new(loopback: bool) -> Self {
        Self { loopback }
    }
}

impl LinkPort for NullLinkPort {
    fn transfer(&mut self, byte: u8) -> u8 {
        if self.loopback { byte } else { 0xFF }
    }
}

struct Transfer {
    remaining_bits: u8,
    outgoing: u8,
    incoming: u8,
    internal_clock: bool,
    /// Machine cycles until the next bit is shifted.
    countdown: u16,
}

impl Transfer {
    fn new(outgoing: u8, incoming: u8, internal_clock: bool) -> Self {
        Self {
            remaining_bits: 8,
            outgoing,
            incoming,
            internal_clock,
            countdown: M_CYCLES_PER_BIT,
        }
    }

    /// Shift one incoming bit into `sb`. Returns true after the eighth.
    fn shift(&mut self, sb: &mut u8) -> bool {
        let bit = self.incoming & 0x80 != 0;
        self.incoming <<= 1;
        *sb = (*sb << 1) | bit as u8;
        self.remaining_bits -= 1;
        self.remaining_bits == 0
    }
}

pub struct Serial {
    sb: u8,
    sc: u8,
    output: Vec<u8>,
    port: Box<dyn LinkPort>,
    transfer: Option<Transfer>,
    irq_latched: bool,
}

impl Default for Serial {
    fn default() -> Self {
        Self::new()
    }
}

impl Serial {
    pub fn new() -> Self {
        Self {
            sb: 0,
            sc: 0,
            output: Vec::new(),
            port: Box::new(NullLinkPort::default()),
            transfer: None,
            irq_latched: false,
        }
    }

    pub fn connect(&mut self, port: Box<dyn LinkPort>) {
        self.port = port;
    }

    /// Bytes sent so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    pub fn in_progress(&self) -> bool {
        self.transfer.is_some()
    }

    /// Clock `count` bits supplied by the link partner. Only meaningful
    /// while an external-clock transfer is running.
    pub fn external_clock_pulse(&mut self, count: u8) {
        let Some(transfer) = self.transfer.as_mut() else {
            return;
        };
        if transfer.internal_clock {
            return;
        }
        for _ in 0..count {
            if transfer.shift(&mut self.sb) {
                self.complete();
                self.irq_latched = true;
                return;
            }
        }
    }

    fn start(&mut self) {
        let incoming = self.port.transfer(self.sb);
        trace!("serial start SB={:02X} SC={:02X}", self.sb, self.sc);
        self.transfer = Some(Transfer::new(
            self.sb,
            incoming,
            self.sc & SC_INTERNAL_CLOCK != 0,
        ));
    }

    fn complete(&mut self) {
        if let Some(transfer) = self.transfer.take() {
            self.output.push(transfer.outgoing);
            self.sc &= !SC_START;
        }
    }
}

impl Device for Serial {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn mapping(&self) -> Vec<AddressRange> {
        vec![SB_ADDR..=SC_ADDR]
    }

    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            SB_ADDR => self.sb,
            _ => self.sc | SC_UNUSED_BITS,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            SB_ADDR => self.sb = value,
            _ => {
                self.sc = value & (SC_START | SC_INTERNAL_CLOCK);
                if value & SC_START == 0 {
                    // Clearing the start bit cancels a running transfer.
                    self.transfer = None;
                } else {
                    self.start();
                }
            }
        }
    }

    fn tick(&mut self, interrupts: &mut Interrupts) {
        let mut fired = std::mem::take(&mut self.irq_latched);
        if let Some(transfer) = self.transfer.as_mut().filter(|t| t.internal_clock) {
            transfer.countdown -= 1;
            if transfer.countdown == 0 {
                transfer.countdown = M_CYCLES_PER_BIT;
                if transfer.shift(&mut self.sb) {
                    self.complete();
                    fired = true;
                }
            }
        }
        if fired {
            interrupts.request(Interrupt::Serial);
        }
    }

    fn apply_post_boot(&mut self) {
        self.sb = 0;
        self.sc = 0;
        self.transfer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPort {
        reply: u8,
        sent: Vec<u8>,
    }

    impl LinkPort for FixedPort {
        fn transfer(&mut self, byte: u8) -> u8 {
            self.sent.push(byte);
            self.reply
        }
    }

    fn run(serial: &mut Serial, irq: &mut Interrupts, m_cycles: u32) {
        for _ in 0..m_cycles {
            serial.tick(irq);
        }
    }

    #[test]
    fn internal_clock_transfer_takes_1024_cycles() {
        let mut serial = Serial::new();
        let mut irq = Interrupts::new();
        serial.connect(Box::new(FixedPort {
            reply: 0x34,
            sent: Vec::new(),
        }));
        serial.write(SB_ADDR, b'P');
        serial.write(SC_ADDR, 0x81);
        assert_eq!(serial.read(SC_ADDR), 0xFF);

        run(&mut serial, &mut irq, 1023);
        assert!(serial.in_progress());
        assert_eq!(irq.flag(), 0);

        run(&mut serial, &mut irq, 1);
        assert!(!serial.in_progress());
        assert_eq!(irq.flag(), Interrupt::Serial.bit());
        assert_eq!(serial.read(SB_ADDR), 0x34);
        assert_eq!(serial.read(SC_ADDR), 0x7F);
        assert_eq!(serial.output(), b"P");
    }

    #[test]
    fn no_partner_shifts_in_ones() {
        let mut serial = Serial::new();
        let mut irq = Interrupts::new();
        serial.write(SB_ADDR, 0x12);
        serial.write(SC_ADDR, 0x81);
        run(&mut serial, &mut irq, 1024);
        assert_eq!(serial.read(SB_ADDR), 0xFF);
        assert_eq!(serial.take_output(), vec![0x12]);
        assert!(serial.output().is_empty());
    }

    #[test]
    fn external_clock_waits_for_pulses() {
        let mut serial = Serial::new();
        let mut irq = Interrupts::new();
        serial.connect(Box::new(NullLinkPort::new(true)));
        serial.write(SB_ADDR, 0xA5);
        serial.write(SC_ADDR, 0x80);

        run(&mut serial, &mut irq, 5000);
        assert!(serial.in_progress());

        serial.external_clock_pulse(7);
        serial.tick(&mut irq);
        assert_eq!(irq.flag(), 0);
        serial.external_clock_pulse(1);
        serial.tick(&mut irq);
        assert_eq!(irq.flag(), Interrupt::Serial.bit());
        assert_eq!(serial.read(SB_ADDR), 0xA5);
    }

    #[test]
    fn clearing_start_bit_cancels() {
        let mut serial = Serial::new();
        let mut irq = Interrupts::new();
        serial.write(SB_ADDR, 0x12);
        serial.write(SC_ADDR, 0x81);
        run(&mut serial, &mut irq, 200);
        serial.write(SC_ADDR, 0x01);
        run(&mut serial, &mut irq, 2000);
        assert_eq!(irq.flag(), 0);
        assert!(serial.output().is_empty());
    }
}

//! Address router.
//!
//! Every one of the 65536 addresses resolves to exactly one owner: an attached
//! [`Device`], a mirror of an address that is itself owned by a device, or the
//! CPU's own register file (IF, IE and the DMA register). Ownership is fixed at
//! attach time and overlapping claims are rejected before anything is
//! recorded.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::ops::RangeInclusive;

use log::debug;
use thiserror::Error;

use crate::interrupts::Interrupts;

pub type AddressRange = RangeInclusive<u16>;

const ADDRESS_SPACE: usize = 0x10000;

/// Contract implemented by everything that can be attached to the [`Bus`].
pub trait Device: Any {
    /// Short name used in logs and ownership errors.
    fn name(&self) -> &'static str;

    /// Addresses the device answers for. Queried once, at attach time.
    fn mapping(&self) -> Vec<AddressRange>;

    fn read(&mut self, addr: u16) -> u8;

    fn write(&mut self, addr: u16, value: u8);

    /// Advance the device by one machine cycle (four dots).
    fn tick(&mut self, _interrupts: &mut Interrupts) {}

    /// Load the register values the DMG boot ROM leaves behind.
    fn apply_post_boot(&mut self) {}
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("no device mapped at ${addr:04X}")]
    Unmapped { addr: u16 },
    #[error("{device} claims ${addr:04X}, which is already owned by {owner}")]
    Overlap {
        addr: u16,
        owner: &'static str,
        device: &'static str,
    },
    #[error("${addr:04X} is a CPU register and is not routed through the bus")]
    CpuOwned { addr: u16 },
}

/// Typed reference to a device attached to a [`Bus`].
pub struct Handle<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.index).finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Unmapped,
    Device(u16),
    /// Alias of the given address, which is owned by a device.
    Mirror(u16),
    Cpu,
}

const CPU_OWNER: &str = "cpu";
const MIRROR_OWNER: &str = "mirror";

pub struct Bus {
    devices: Vec<Box<dyn Device>>,
    slots: Box<[Slot]>,
}

impl Bus {
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            slots: vec![Slot::Unmapped; ADDRESS_SPACE].into_boxed_slice(),
        }
    }

    /// Attach `device` and record it as the owner of every address it maps.
    pub fn attach<T: Device>(&mut self, device: T) -> Result<Handle<T>, BusError> {
        let name = device.name();
        let ranges = device.mapping();
        self.ensure_free(name, &ranges)?;

        let index = self.devices.len();
        for range in &ranges {
            for addr in range.clone() {
                self.slots[addr as usize] = Slot::Device(index as u16);
            }
        }
        debug!("attached {name} ({} ranges) as device #{index}", ranges.len());
        self.devices.push(Box::new(device));
        Ok(Handle {
            index,
            _marker: PhantomData,
        })
    }

    /// Mark addresses as served by the CPU itself. The router refuses to
    /// dispatch them, and no device may claim them afterwards.
    pub fn reserve_for_cpu(&mut self, addrs: &[u16]) -> Result<(), BusError> {
        let ranges: Vec<AddressRange> = addrs.iter().map(|&a| a..=a).collect();
        self.ensure_free(CPU_OWNER, &ranges)?;
        for &addr in addrs {
            self.slots[addr as usize] = Slot::Cpu;
        }
        Ok(())
    }

    /// Alias `range` onto the addresses starting at `target`. Every target
    /// address must already be owned by a device.
    pub fn mirror(&mut self, range: AddressRange, target: u16) -> Result<(), BusError> {
        self.ensure_free(MIRROR_OWNER, std::slice::from_ref(&range))?;
        let start = *range.start();
        for addr in range.clone() {
            let aliased = target.wrapping_add(addr - start);
            if !matches!(self.slots[aliased as usize], Slot::Device(_)) {
                return Err(BusError::Unmapped { addr: aliased });
            }
        }
        for addr in range {
            self.slots[addr as usize] = Slot::Mirror(target.wrapping_add(addr - start));
        }
        Ok(())
    }

    fn ensure_free(&self, device: &'static str, ranges: &[AddressRange]) -> Result<(), BusError> {
        let mut claimed = vec![false; ADDRESS_SPACE];
        for range in ranges {
            for addr in range.clone() {
                let slot = self.slots[addr as usize];
                if slot != Slot::Unmapped {
                    return Err(BusError::Overlap {
                        addr,
                        owner: self.slot_name(slot),
                        device,
                    });
                }
                if std::mem::replace(&mut claimed[addr as usize], true) {
                    return Err(BusError::Overlap {
                        addr,
                        owner: device,
                        device,
                    });
                }
            }
        }
        Ok(())
    }

    fn slot_name(&self, slot: Slot) -> &'static str {
        match slot {
            Slot::Unmapped => "nothing",
            Slot::Device(index) => self.devices[index as usize].name(),
            Slot::Mirror(_) => MIRROR_OWNER,
            Slot::Cpu => CPU_OWNER,
        }
    }

    /// Resolve mirrors down to the owning device and the address it sees.
    fn resolve(&self, addr: u16) -> Result<(usize, u16), BusError> {
        match self.slots[addr as usize] {
            Slot::Device(index) => Ok((index as usize, addr)),
            Slot::Mirror(target) => match self.slots[target as usize] {
                Slot::Device(index) => Ok((index as usize, target)),
                _ => Err(BusError::Unmapped { addr }),
            },
            Slot::Cpu => Err(BusError::CpuOwned { addr }),
            Slot::Unmapped => Err(BusError::Unmapped { addr }),
        }
    }

    pub fn read(&mut self, addr: u16) -> Result<u8, BusError> {
        let (index, addr) = self.resolve(addr)?;
        Ok(self.devices[index].read(addr))
    }

    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        let (index, addr) = self.resolve(addr)?;
        self.devices[index].write(addr, value);
        Ok(())
    }

    /// Advance one attached device by one machine cycle.
    pub fn tick<T: Device>(&mut self, handle: Handle<T>, interrupts: &mut Interrupts) {
        self.devices[handle.index].tick(interrupts);
    }

    pub fn get<T: Device>(&self, handle: Handle<T>) -> Option<&T> {
        let device: &dyn Device = &**self.devices.get(handle.index)?;
        let device: &dyn Any = device;
        device.downcast_ref::<T>()
    }

    pub fn get_mut<T: Device>(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let device: &mut dyn Device = &mut **self.devices.get_mut(handle.index)?;
        let device: &mut dyn Any = device;
        device.downcast_mut::<T>()
    }

    /// Name of the owner of `addr`, following mirrors to the device.
    pub fn owner_of(&self, addr: u16) -> Option<&'static str> {
        match self.slots[addr as usize] {
            Slot::Unmapped => None,
            Slot::Mirror(target) => Some(self.slot_name(self.slots[target as usize])),
            slot => Some(self.slot_name(slot)),
        }
    }

    /// Contiguous address ranges nobody owns.
    pub fn unmapped(&self) -> Vec<AddressRange> {
        let mut holes = Vec::new();
        let mut start: Option<u16> = None;
        for addr in 0..=u16::MAX {
            let free = self.slots[addr as usize] == Slot::Unmapped;
            match (free, start) {
                (true, None) => start = Some(addr),
                (false, Some(s)) => {
                    holes.push(s..=addr - 1);
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            holes.push(s..=u16::MAX);
        }
        holes
    }

    pub fn device_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.devices.iter().map(|d| d.name())
    }

    /// Put every attached device into its post-boot-ROM state.
    pub fn set_post_boot_state(&mut self) {
        for device in &mut self.devices {
            device.apply_post_boot();
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

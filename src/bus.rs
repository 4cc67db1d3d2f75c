//! 64K Memory Bus with Device Dispatch and Write Protection
//!
//! The MC6800 sees a flat 64K byte-addressable space. The bus backs the
//! whole space with RAM and lets memory-mapped peripherals claim addresses:
//! the first registered device whose `matches` returns true services the
//! access. Device writes always win over write protection, since a device
//! owns its address range; everything else falls through to the backing
//! array, where writes into a protected range fail with
//! [`BusError::Protected`].
//!
//! Reads carry a `peek` flag. Peek reads are used by the disassembler and
//! memory-dump commands and must not disturb device state (a UART, for
//! instance, must not drain its receive register on a peek).

use log::warn;
use thiserror::Error;

/// Size of the address space in bytes.
pub const MEMORY_SIZE: usize = 0x10000;

/// Errors raised by bus accesses.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Write to a protected range with no claiming device.
    #[error("write to protected area: 0x{addr:04X}")]
    Protected {
        /// The faulting address
        addr: u16,
    },
}

/// A memory-mapped peripheral.
///
/// Devices are registered with the bus at setup time and consulted in
/// registration order on every access. `read` with `peek == true` must not
/// mutate externally observable device state.
pub trait Device: Send {
    /// Does this device claim `addr`?
    fn matches(&self, addr: u16) -> bool;

    /// Reads a byte from the device.
    fn read(&mut self, addr: u16, peek: bool) -> u8;

    /// Writes a byte to the device.
    fn write(&mut self, addr: u16, value: u8);
}

/// The system memory bus.
pub struct MemoryBus {
    ram: Box<[u8; MEMORY_SIZE]>,
    devices: Vec<Box<dyn Device>>,
    protected: Vec<(u16, u16)>,
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus {
    /// Creates a bus with zeroed RAM, no devices and no protected ranges.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: vec![0u8; MEMORY_SIZE]
                .into_boxed_slice()
                .try_into()
                .unwrap_or_else(|_| unreachable!()),
            devices: Vec::new(),
            protected: Vec::new(),
        }
    }

    /// Registers a device. Devices are consulted in registration order;
    /// the first match wins.
    pub fn attach(&mut self, device: Box<dyn Device>) {
        self.devices.push(device);
    }

    /// Marks the inclusive range `[start, end]` as write-protected.
    /// Ranges are cumulative; there is no way to remove one.
    pub fn protect(&mut self, start: u16, end: u16) {
        self.protected.push((start, end));
    }

    fn is_protected(&self, addr: u16) -> bool {
        self.protected
            .iter()
            .any(|&(start, end)| addr >= start && addr <= end)
    }

    /// Reads a byte. A matching device services the read (with `peek`
    /// forwarded), otherwise the backing RAM does.
    pub fn read(&mut self, addr: u16, peek: bool) -> u8 {
        for device in &mut self.devices {
            if device.matches(addr) {
                return device.read(addr, peek);
            }
        }
        self.ram[addr as usize]
    }

    /// Writes a byte. A matching device services the write regardless of
    /// protection; otherwise a protected address faults and RAM is left
    /// untouched.
    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        for device in &mut self.devices {
            if device.matches(addr) {
                device.write(addr, value);
                return Ok(());
            }
        }
        if self.is_protected(addr) {
            warn!("rejected write of {value:02X} to protected 0x{addr:04X}");
            return Err(BusError::Protected { addr });
        }
        self.ram[addr as usize] = value;
        Ok(())
    }

    /// Reads a big-endian 16-bit word from `addr` and `addr + 1`
    /// (wrapping at the top of the address space).
    pub fn read_word(&mut self, addr: u16, peek: bool) -> u16 {
        let hi = self.read(addr, peek);
        let lo = self.read(addr.wrapping_add(1), peek);
        u16::from(hi) << 8 | u16::from(lo)
    }

    /// Injects raw bytes into RAM starting at `addr`, wrapping at the top
    /// of the address space. Bypasses devices and protection; this is the
    /// loader's injection point, not a CPU-visible store.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let mut a = addr;
        for &byte in bytes {
            self.ram[a as usize] = byte;
            a = a.wrapping_add(1);
        }
    }

    /// The raw backing RAM, for full-image saves and memory dumps.
    #[must_use]
    pub fn ram(&self) -> &[u8] {
        &self.ram[..]
    }
}

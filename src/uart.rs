//! MC6850 ACIA Serial Device
//!
//! Minimal asynchronous communications interface adapter, mapped at two
//! consecutive addresses:
//!
//! | Offset | Read | Write |
//! |--------|------|-------|
//! | +0 | status register | control register |
//! | +1 | receive data (clears RDRF) | transmit data (clears TDRE) |
//!
//! The host side drives [`Acia::receive`] to hand a byte to the CPU and
//! polls [`Acia::transmit`] to drain bytes the CPU sent. Peek reads return
//! the data register without clearing RDRF so the debugger can inspect the
//! device without losing input.

use crate::bus::Device;

/// Status register bits.
pub mod status {
    /// Receive data register full
    pub const RDRF: u8 = 0x01;
    /// Transmit data register empty
    pub const TDRE: u8 = 0x02;
}

/// An ACIA mapped at `base` (status/control) and `base + 1` (data).
pub struct Acia {
    base: u16,
    cr: u8,
    sr: u8,
    rdr: u8,
    tdr: u8,
}

impl Acia {
    /// Creates an ACIA at `base` with the transmit register empty.
    #[must_use]
    pub const fn new(base: u16) -> Self {
        Self {
            base,
            cr: 0,
            sr: status::TDRE,
            rdr: 0,
            tdr: 0,
        }
    }

    /// The last value the CPU wrote to the control register.
    #[must_use]
    pub const fn control(&self) -> u8 {
        self.cr
    }

    /// Host side: delivers a byte to the receive register and flags it
    /// full. Overwrites any byte the CPU has not read yet.
    pub const fn receive(&mut self, data: u8) {
        self.rdr = data;
        self.sr |= status::RDRF;
    }

    /// Host side: takes the pending transmit byte, if the CPU has written
    /// one since the last call.
    pub const fn transmit(&mut self) -> Option<u8> {
        if self.sr & status::TDRE != 0 {
            return None;
        }
        self.sr |= status::TDRE;
        Some(self.tdr)
    }
}

impl Device for Acia {
    fn matches(&self, addr: u16) -> bool {
        addr == self.base || addr == self.base.wrapping_add(1)
    }

    fn read(&mut self, addr: u16, peek: bool) -> u8 {
        if addr == self.base {
            self.sr
        } else {
            if !peek {
                self.sr &= !status::RDRF;
            }
            self.rdr
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        if addr == self.base {
            self.cr = value;
        } else {
            self.sr &= !status::TDRE;
            self.tdr = value;
        }
    }
}

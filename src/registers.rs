//! MC6800 Register File and Status Register
//!
//! The MC6800 programmer's model:
//! - Accumulators A and B (8-bit)
//! - Index register IX (16-bit)
//! - Stack pointer SP (16-bit)
//! - Program counter PC (16-bit)
//! - Status register SR (8-bit)
//!
//! Status register layout (bits 6-7 read as 1 on real silicon):
//!
//! | Bit | Flag | Meaning |
//! |-----|------|---------|
//! | 5   | H    | Half-carry (bit 3 into bit 4) |
//! | 4   | I    | Interrupt mask |
//! | 3   | N    | Negative (bit 7 of result) |
//! | 2   | Z    | Zero |
//! | 1   | V    | Two's-complement overflow |
//! | 0   | C    | Carry |
//!
//! Flag-update helpers take the raw arithmetic result as `i32`, before any
//! 8-bit masking, so carry and overflow can be derived from the unmasked
//! magnitude.

use serde::Serialize;
use std::fmt;

/// Status register bit masks.
pub mod sr {
    /// Carry flag (bit 0)
    pub const C: u8 = 0x01;
    /// Overflow flag (bit 1)
    pub const V: u8 = 0x02;
    /// Zero flag (bit 2)
    pub const Z: u8 = 0x04;
    /// Negative flag (bit 3)
    pub const N: u8 = 0x08;
    /// Interrupt mask (bit 4)
    pub const I: u8 = 0x10;
    /// Half-carry flag (bit 5)
    pub const H: u8 = 0x20;
    /// Bits 6-7, hardwired to 1
    pub const FIXED: u8 = 0xC0;
}

/// A user-visible register, used by instruction descriptors to name their
/// implicit operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    A,
    B,
    Ix,
    Sp,
    Pc,
    Sr,
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A => "A",
            Self::B => "B",
            Self::Ix => "IX",
            Self::Sp => "SP",
            Self::Pc => "PC",
            Self::Sr => "SR",
        };
        f.write_str(name)
    }
}

impl Register {
    /// True for the 16-bit registers (IX, SP, PC).
    #[must_use]
    pub const fn is_wide(self) -> bool {
        matches!(self, Self::Ix | Self::Sp | Self::Pc)
    }
}

/// The MC6800 register file.
///
/// All fields are public; instruction executors mutate them directly. The
/// `get`/`set` accessors apply the per-register width masks and keep the SR
/// invariant (`sr & 0xC0 == 0xC0`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterFile {
    /// Accumulator A
    pub a: u8,
    /// Accumulator B
    pub b: u8,
    /// Index register
    pub ix: u16,
    /// Stack pointer
    pub sp: u16,
    /// Program counter
    pub pc: u16,
    /// Status register
    pub sr: u8,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Creates a register file in the power-on state: PC at 0xFFFF (a real
    /// part latches the reset vector instead, see `Cpu::reset`), everything
    /// else zero, SR fixed bits set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: 0,
            b: 0,
            ix: 0,
            sp: 0,
            pc: 0xFFFF,
            sr: sr::FIXED,
        }
    }

    /// Reads a register, widened to 16 bits.
    #[must_use]
    #[inline]
    pub const fn get(&self, reg: Register) -> u16 {
        match reg {
            Register::A => self.a as u16,
            Register::B => self.b as u16,
            Register::Ix => self.ix,
            Register::Sp => self.sp,
            Register::Pc => self.pc,
            Register::Sr => self.sr as u16,
        }
    }

    /// Writes a register, masking to its width. SR writes force bits 6-7
    /// to 1.
    #[inline]
    pub const fn set(&mut self, reg: Register, value: u16) {
        match reg {
            Register::A => self.a = value as u8,
            Register::B => self.b = value as u8,
            Register::Ix => self.ix = value,
            Register::Sp => self.sp = value,
            Register::Pc => self.pc = value,
            Register::Sr => self.sr = value as u8 | sr::FIXED,
        }
    }

    /// Writes the status register, forcing the fixed bits.
    #[inline]
    pub const fn set_sr(&mut self, value: u8) {
        self.sr = value | sr::FIXED;
    }

    #[must_use]
    #[inline]
    pub const fn c(&self) -> bool {
        self.sr & sr::C != 0
    }

    #[must_use]
    #[inline]
    pub const fn v(&self) -> bool {
        self.sr & sr::V != 0
    }

    #[must_use]
    #[inline]
    pub const fn z(&self) -> bool {
        self.sr & sr::Z != 0
    }

    #[must_use]
    #[inline]
    pub const fn n(&self) -> bool {
        self.sr & sr::N != 0
    }

    #[must_use]
    #[inline]
    pub const fn i(&self) -> bool {
        self.sr & sr::I != 0
    }

    #[must_use]
    #[inline]
    pub const fn h(&self) -> bool {
        self.sr & sr::H != 0
    }

    #[inline]
    pub const fn set_c(&mut self, value: bool) {
        if value {
            self.sr |= sr::C;
        } else {
            self.sr &= !sr::C;
        }
    }

    #[inline]
    pub const fn set_v(&mut self, value: bool) {
        if value {
            self.sr |= sr::V;
        } else {
            self.sr &= !sr::V;
        }
    }

    #[inline]
    pub const fn set_z(&mut self, value: bool) {
        if value {
            self.sr |= sr::Z;
        } else {
            self.sr &= !sr::Z;
        }
    }

    #[inline]
    pub const fn set_n(&mut self, value: bool) {
        if value {
            self.sr |= sr::N;
        } else {
            self.sr &= !sr::N;
        }
    }

    #[inline]
    pub const fn set_i(&mut self, value: bool) {
        if value {
            self.sr |= sr::I;
        } else {
            self.sr &= !sr::I;
        }
    }

    #[inline]
    pub const fn set_h(&mut self, value: bool) {
        if value {
            self.sr |= sr::H;
        } else {
            self.sr &= !sr::H;
        }
    }

    /// C from an unmasked arithmetic result: set iff the result left the
    /// 0..=255 range.
    #[inline]
    pub const fn update_c(&mut self, out: i32) {
        self.set_c(out < 0 || out > 255);
    }

    /// V from operand/result signs (bit 7): set iff both inputs share a
    /// sign and the output sign differs. The same rule is applied to
    /// subtract-style results on purpose; see the compare/subtract tests.
    #[inline]
    pub const fn update_v(&mut self, in1: i32, in2: i32, out: i32) {
        let s1 = in1 & 0x80 != 0;
        let s2 = in2 & 0x80 != 0;
        let so = out & 0x80 != 0;
        self.set_v(s1 == s2 && so != s1);
    }

    /// H from the half-carry expression: bit 3 of
    /// `(in1 & in2) | ((in1 | in2) & !out)`.
    #[inline]
    pub const fn update_h(&mut self, in1: i32, in2: i32, out: i32) {
        self.set_h(((in1 & in2) | ((in1 | in2) & !out)) & 0x08 != 0);
    }

    /// N and Z from the 8-bit masked result.
    #[inline]
    pub const fn update_nz(&mut self, out: i32) {
        self.set_z(out & 0xFF == 0);
        self.set_n(out & 0x80 != 0);
    }

    /// N, Z, V and C for arithmetic results.
    #[inline]
    pub const fn update_nzvc(&mut self, in1: i32, in2: i32, out: i32) {
        self.update_c(out);
        self.update_v(in1, in2, out);
        self.update_nz(out);
    }

    /// N, Z, V, C and H for the add/subtract family.
    #[inline]
    pub const fn update_hnzvc(&mut self, in1: i32, in2: i32, out: i32) {
        self.update_nzvc(in1, in2, out);
        self.update_h(in1, in2, out);
    }

    /// V for shifts and rotates: the freshly computed C xor N.
    #[inline]
    pub const fn update_shift_v(&mut self) {
        self.set_v(self.c() ^ self.n());
    }

    /// The fixed-format register dump consumed by front-end tooling.
    /// The layout is load-bearing; do not touch the formatting.
    #[must_use]
    pub fn dump(&self) -> String {
        format!(
            "|PC:{:04X}|A:{:02X}|B:{:02X}|IX:{:04X}|SP:{:04X}||H{}I{}N{}Z{}V{}C{}|",
            self.pc,
            self.a,
            self.b,
            self.ix,
            self.sp,
            (self.sr >> 5) & 1,
            (self.sr >> 4) & 1,
            (self.sr >> 3) & 1,
            (self.sr >> 2) & 1,
            (self.sr >> 1) & 1,
            self.sr & 1,
        )
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

//! Addressing Modes and Operand Resolution
//!
//! Every MC6800 instruction locates its operand through one of seven
//! addressing modes. Execution and disassembly share the resolution rules
//! in this module so the two can never disagree about where an operand
//! lives.
//!
//! | Mode | Operand bytes | Effective value/address |
//! |------|---------------|-------------------------|
//! | INH  | 0 | none |
//! | ACC  | 0 | the named accumulator |
//! | IMM  | 1 or 2 | literal following the opcode |
//! | DIR  | 1 | byte at the zero-page address that follows |
//! | IDX  | 1 | byte at `IX + unsigned offset` |
//! | EXT  | 2 | byte at the big-endian absolute address |
//! | REL  | 1 | branch target `PC + 2 + signed offset` |

use crate::bus::MemoryBus;
use crate::registers::RegisterFile;

/// How an instruction locates its operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressingMode {
    /// No operand (register-to-register, implicit)
    Inherent,
    /// Operates on the named accumulator directly
    Accumulator,
    /// Literal operand following the opcode
    Immediate,
    /// Single-byte (zero-page) address
    Direct,
    /// IX plus unsigned 8-bit offset
    Indexed,
    /// Absolute big-endian 16-bit address
    Extended,
    /// PC-relative signed 8-bit displacement
    Relative,
}

/// Effective address of a memory operand for DIR/IDX/EXT modes, fetched
/// from the operand bytes after the opcode at PC.
///
/// # Panics
/// Debug builds panic if called for a mode with no memory operand; the
/// instruction table never does.
pub fn operand_addr(mode: AddressingMode, regs: &RegisterFile, bus: &mut MemoryBus) -> u16 {
    match mode {
        AddressingMode::Direct => u16::from(bus.read(regs.pc.wrapping_add(1), false)),
        AddressingMode::Indexed => {
            let offset = bus.read(regs.pc.wrapping_add(1), false);
            regs.ix.wrapping_add(u16::from(offset))
        }
        AddressingMode::Extended => bus.read_word(regs.pc.wrapping_add(1), false),
        _ => {
            debug_assert!(false, "no memory operand for {mode:?}");
            0
        }
    }
}

/// Resolves the 8-bit operand value for IMM/DIR/IDX/EXT modes.
pub fn operand_byte(mode: AddressingMode, regs: &RegisterFile, bus: &mut MemoryBus) -> u8 {
    match mode {
        AddressingMode::Immediate => bus.read(regs.pc.wrapping_add(1), false),
        _ => {
            let addr = operand_addr(mode, regs, bus);
            bus.read(addr, false)
        }
    }
}

/// Resolves the 16-bit (big-endian) operand value for IMM/DIR/IDX/EXT
/// modes, used by the 16-bit load/compare instructions.
pub fn operand_word(mode: AddressingMode, regs: &RegisterFile, bus: &mut MemoryBus) -> u16 {
    match mode {
        AddressingMode::Immediate => bus.read_word(regs.pc.wrapping_add(1), false),
        _ => {
            let addr = operand_addr(mode, regs, bus);
            bus.read_word(addr, false)
        }
    }
}

/// Branch target for a relative instruction at `pc` with displacement
/// byte `offset`: `pc + 2 + signed(offset)`.
#[must_use]
pub fn branch_target(pc: u16, offset: u8) -> u16 {
    pc.wrapping_add(2).wrapping_add(offset as i8 as u16)
}

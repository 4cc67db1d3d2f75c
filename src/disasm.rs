//! MC6800 Disassembler
//!
//! Renders the instruction at an address as the debugger's front-end
//! tooling expects it: mnemonic, accumulator tag, operand bytes, and for
//! memory operands the resolved effective address plus the value currently
//! there. Indexed operands resolve against the live IX, so the same
//! instruction can render differently as the registers change.
//!
//! Every memory access here is a peek: disassembling must never disturb
//! device state.

use crate::addressing::{branch_target, AddressingMode};
use crate::bus::MemoryBus;
use crate::opcodes::{self, Op};
use crate::registers::{Register, RegisterFile};

/// Text for a byte that is not a valid opcode.
pub const UNKNOWN: &str = "unknown";

fn is_wide(op: &Op) -> bool {
    op.reg.is_some_and(Register::is_wide)
}

/// Disassembles the instruction at `addr`.
pub fn disassemble(regs: &RegisterFile, bus: &mut MemoryBus, addr: u16) -> String {
    let code = bus.read(addr, true);
    let Some(op) = opcodes::lookup(code) else {
        return UNKNOWN.to_string();
    };
    let mn = op.mnemonic;
    let op1 = bus.read(addr.wrapping_add(1), true);
    match op.mode {
        AddressingMode::Inherent | AddressingMode::Accumulator => match op.reg {
            Some(reg) => format!("{mn} {reg}"),
            None => mn.to_string(),
        },
        AddressingMode::Immediate => {
            if is_wide(op) {
                let op2 = bus.read(addr.wrapping_add(2), true);
                format!("{mn} {op1:02X}{op2:02X}")
            } else {
                match op.reg {
                    Some(reg) => format!("{mn} {reg},#${op1:02X}"),
                    None => format!("{mn},{op1:02X}"),
                }
            }
        }
        AddressingMode::Direct => {
            if is_wide(op) {
                let word = bus.read_word(u16::from(op1), true);
                format!("{mn} [{op1:02X}] ({word:04X})")
            } else {
                let byte = bus.read(u16::from(op1), true);
                match op.reg {
                    Some(reg) => format!("{mn} {reg},[{op1:02X}] ({byte:02X})"),
                    None => format!("{mn} [{op1:02X}] ({byte:02X})"),
                }
            }
        }
        AddressingMode::Indexed => {
            let ea = regs.ix.wrapping_add(u16::from(op1));
            if mn == "JMP" || mn == "JSR" {
                return format!("{mn} IX+{op1:02X} ({ea:04X})");
            }
            if is_wide(op) {
                let word = bus.read_word(ea, true);
                format!("{mn} [IX+{op1:02X}] [{ea:04X}] ({word:04X})")
            } else {
                let byte = bus.read(ea, true);
                match op.reg {
                    Some(reg) => format!("{mn} {reg},[IX+{op1:02X}] [{ea:04X}] ({byte:02X})"),
                    None => format!("{mn} [IX+{op1:02X}] [{ea:04X}] ({byte:02X})"),
                }
            }
        }
        AddressingMode::Extended => {
            let ea = bus.read_word(addr.wrapping_add(1), true);
            if mn == "JMP" || mn == "JSR" {
                return format!("{mn} {ea:04X}");
            }
            if is_wide(op) {
                let word = bus.read_word(ea, true);
                format!("{mn} [{ea:04X}] ({word:04X})")
            } else {
                let byte = bus.read(ea, true);
                match op.reg {
                    Some(reg) => format!("{mn} {reg},[{ea:04X}] ({byte:02X})"),
                    None => format!("{mn} [{ea:04X}] ({byte:02X})"),
                }
            }
        }
        AddressingMode::Relative => {
            let target = branch_target(addr, op1);
            format!("{mn} {op1:02X} ({target:04X})")
        }
    }
}

/// The raw instruction bytes at `addr` as space-separated hex, e.g.
/// `"86 00"`. An unknown opcode renders as its single byte.
pub fn opcode_bytes(bus: &mut MemoryBus, addr: u16) -> String {
    let code = bus.read(addr, true);
    let length = opcodes::lookup(code).map_or(1, |op| op.length);
    let mut out = format!("{code:02X}");
    for i in 1..u16::from(length) {
        let byte = bus.read(addr.wrapping_add(i), true);
        out.push_str(&format!(" {byte:02X}"));
    }
    out
}

/// Total length in bytes of the instruction at `addr` (1 for an unknown
/// opcode, so listings always make progress).
pub fn instruction_length(bus: &mut MemoryBus, addr: u16) -> u16 {
    let code = bus.read(addr, true);
    opcodes::lookup(code).map_or(1, |op| u16::from(op.length))
}

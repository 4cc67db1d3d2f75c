//! MC6800 Instruction Table
//!
//! One [`Op`] descriptor per implemented opcode byte: mnemonic, total
//! instruction length, addressing mode, the implicitly named register (if
//! any) and the executor function. The 256-slot dispatch table is built
//! once on first use and panics at construction if two descriptors claim
//! the same byte, so a table typo cannot silently shadow an instruction.

use lazy_static::lazy_static;

use crate::addressing::AddressingMode;
use crate::bus::{BusError, MemoryBus};
use crate::cpu::Step;
use crate::instructions as exec;
use crate::registers::{Register, RegisterFile};

/// Executor signature: performs the instruction, updates flags, advances
/// PC, and reports how the core should proceed.
pub type ExecFn = fn(&Op, &mut RegisterFile, &mut MemoryBus) -> Result<Step, BusError>;

/// A single instruction descriptor.
pub struct Op {
    /// Opcode byte
    pub code: u8,
    /// Total length in bytes, opcode included (1..=3)
    pub length: u8,
    /// Mnemonic as rendered by the disassembler
    pub mnemonic: &'static str,
    /// Addressing mode
    pub mode: AddressingMode,
    /// Implicitly named register, where the mnemonic has one (`LDAA` is
    /// `LDA` with `A` here). Also drives the disassembler's operand width.
    pub reg: Option<Register>,
    /// Executor
    pub exec: ExecFn,
}

const fn op(
    code: u8,
    length: u8,
    mnemonic: &'static str,
    mode: AddressingMode,
    reg: Option<Register>,
    exec: ExecFn,
) -> Op {
    Op {
        code,
        length,
        mnemonic,
        mode,
        reg,
        exec,
    }
}

const INH: AddressingMode = AddressingMode::Inherent;
const ACC: AddressingMode = AddressingMode::Accumulator;
const IMM: AddressingMode = AddressingMode::Immediate;
const DIR: AddressingMode = AddressingMode::Direct;
const IDX: AddressingMode = AddressingMode::Indexed;
const EXT: AddressingMode = AddressingMode::Extended;
const REL: AddressingMode = AddressingMode::Relative;

const A: Option<Register> = Some(Register::A);
const B: Option<Register> = Some(Register::B);
const IX: Option<Register> = Some(Register::Ix);
const SP: Option<Register> = Some(Register::Sp);
const PC: Option<Register> = Some(Register::Pc);
const NONE: Option<Register> = None;

/// Every implemented opcode. Order within the list is immaterial; the
/// dispatch table is keyed by `code`.
static OPS: &[Op] = &[
    op(0x1B, 1, "ABA", INH, NONE, exec::aba),
    op(0x89, 2, "ADC", IMM, A, exec::adc),
    op(0x99, 2, "ADC", DIR, A, exec::adc),
    op(0xA9, 2, "ADC", IDX, A, exec::adc),
    op(0xB9, 3, "ADC", EXT, A, exec::adc),
    op(0xC9, 2, "ADC", IMM, B, exec::adc),
    op(0xD9, 2, "ADC", DIR, B, exec::adc),
    op(0xE9, 2, "ADC", IDX, B, exec::adc),
    op(0xF9, 3, "ADC", EXT, B, exec::adc),
    op(0x8B, 2, "ADD", IMM, A, exec::add),
    op(0x9B, 2, "ADD", DIR, A, exec::add),
    op(0xAB, 2, "ADD", IDX, A, exec::add),
    op(0xBB, 3, "ADD", EXT, A, exec::add),
    op(0xCB, 2, "ADD", IMM, B, exec::add),
    op(0xDB, 2, "ADD", DIR, B, exec::add),
    op(0xEB, 2, "ADD", IDX, B, exec::add),
    op(0xFB, 3, "ADD", EXT, B, exec::add),
    op(0x84, 2, "AND", IMM, A, exec::and),
    op(0x94, 2, "AND", DIR, A, exec::and),
    op(0xA4, 2, "AND", IDX, A, exec::and),
    op(0xB4, 3, "AND", EXT, A, exec::and),
    op(0xC4, 2, "AND", IMM, B, exec::and),
    op(0xD4, 2, "AND", DIR, B, exec::and),
    op(0xE4, 2, "AND", IDX, B, exec::and),
    op(0xF4, 3, "AND", EXT, B, exec::and),
    op(0x48, 1, "ASL", ACC, A, exec::asl),
    op(0x58, 1, "ASL", ACC, B, exec::asl),
    op(0x68, 2, "ASL", IDX, NONE, exec::asl),
    op(0x78, 3, "ASL", EXT, NONE, exec::asl),
    op(0x47, 1, "ASR", ACC, A, exec::asr),
    op(0x57, 1, "ASR", ACC, B, exec::asr),
    op(0x67, 2, "ASR", IDX, NONE, exec::asr),
    op(0x77, 3, "ASR", EXT, NONE, exec::asr),
    op(0x20, 2, "BRA", REL, NONE, exec::bra),
    op(0x22, 2, "BHI", REL, NONE, exec::bhi),
    op(0x23, 2, "BLS", REL, NONE, exec::bls),
    op(0x24, 2, "BCC", REL, NONE, exec::bcc),
    op(0x25, 2, "BCS", REL, NONE, exec::bcs),
    op(0x26, 2, "BNE", REL, NONE, exec::bne),
    op(0x27, 2, "BEQ", REL, NONE, exec::beq),
    op(0x28, 2, "BVC", REL, NONE, exec::bvc),
    op(0x29, 2, "BVS", REL, NONE, exec::bvs),
    op(0x2A, 2, "BPL", REL, NONE, exec::bpl),
    op(0x2B, 2, "BMI", REL, NONE, exec::bmi),
    op(0x2C, 2, "BGE", REL, NONE, exec::bge),
    op(0x2D, 2, "BLT", REL, NONE, exec::blt),
    op(0x2E, 2, "BGT", REL, NONE, exec::bgt),
    op(0x2F, 2, "BLE", REL, NONE, exec::ble),
    op(0x8D, 2, "BSR", REL, NONE, exec::bsr),
    op(0x85, 2, "BIT", IMM, A, exec::bit),
    op(0x95, 2, "BIT", DIR, A, exec::bit),
    op(0xA5, 2, "BIT", IDX, A, exec::bit),
    op(0xB5, 3, "BIT", EXT, A, exec::bit),
    op(0xC5, 2, "BIT", IMM, B, exec::bit),
    op(0xD5, 2, "BIT", DIR, B, exec::bit),
    op(0xE5, 2, "BIT", IDX, B, exec::bit),
    op(0xF5, 3, "BIT", EXT, B, exec::bit),
    op(0x11, 1, "CBA", INH, NONE, exec::cba),
    op(0x0C, 1, "CLC", INH, NONE, exec::clc),
    op(0x0E, 1, "CLI", INH, NONE, exec::cli),
    op(0x0A, 1, "CLV", INH, NONE, exec::clv),
    op(0x4F, 1, "CLR", ACC, A, exec::clr),
    op(0x5F, 1, "CLR", ACC, B, exec::clr),
    op(0x6F, 2, "CLR", IDX, NONE, exec::clr),
    op(0x7F, 3, "CLR", EXT, NONE, exec::clr),
    op(0x81, 2, "CMP", IMM, A, exec::cmp),
    op(0x91, 2, "CMP", DIR, A, exec::cmp),
    op(0xA1, 2, "CMP", IDX, A, exec::cmp),
    op(0xB1, 3, "CMP", EXT, A, exec::cmp),
    op(0xC1, 2, "CMP", IMM, B, exec::cmp),
    op(0xD1, 2, "CMP", DIR, B, exec::cmp),
    op(0xE1, 2, "CMP", IDX, B, exec::cmp),
    op(0xF1, 3, "CMP", EXT, B, exec::cmp),
    op(0x43, 1, "COM", ACC, A, exec::com),
    op(0x53, 1, "COM", ACC, B, exec::com),
    op(0x63, 2, "COM", IDX, NONE, exec::com),
    op(0x73, 3, "COM", EXT, NONE, exec::com),
    op(0x8C, 3, "CPX", IMM, IX, exec::cpx),
    op(0x9C, 2, "CPX", DIR, IX, exec::cpx),
    op(0xAC, 2, "CPX", IDX, IX, exec::cpx),
    op(0xBC, 3, "CPX", EXT, IX, exec::cpx),
    op(0x19, 1, "DAA", INH, A, exec::daa),
    op(0x4A, 1, "DEC", ACC, A, exec::dec),
    op(0x5A, 1, "DEC", ACC, B, exec::dec),
    op(0x6A, 2, "DEC", IDX, NONE, exec::dec),
    op(0x7A, 3, "DEC", EXT, NONE, exec::dec),
    op(0x34, 1, "DES", INH, NONE, exec::des),
    op(0x09, 1, "DEX", INH, NONE, exec::dex),
    op(0x88, 2, "EOR", IMM, A, exec::eor),
    op(0x98, 2, "EOR", DIR, A, exec::eor),
    op(0xA8, 2, "EOR", IDX, A, exec::eor),
    op(0xB8, 3, "EOR", EXT, A, exec::eor),
    op(0xC8, 2, "EOR", IMM, B, exec::eor),
    op(0xD8, 2, "EOR", DIR, B, exec::eor),
    op(0xE8, 2, "EOR", IDX, B, exec::eor),
    op(0xF8, 3, "EOR", EXT, B, exec::eor),
    op(0x4C, 1, "INC", ACC, A, exec::inc),
    op(0x5C, 1, "INC", ACC, B, exec::inc),
    op(0x6C, 2, "INC", IDX, NONE, exec::inc),
    op(0x7C, 3, "INC", EXT, NONE, exec::inc),
    op(0x31, 1, "INS", INH, NONE, exec::ins),
    op(0x08, 1, "INX", INH, NONE, exec::inx),
    op(0x6E, 2, "JMP", IDX, NONE, exec::jmp),
    op(0x7E, 3, "JMP", EXT, PC, exec::jmp),
    op(0xAD, 2, "JSR", IDX, NONE, exec::jsr),
    op(0xBD, 3, "JSR", EXT, NONE, exec::jsr),
    op(0x86, 2, "LDA", IMM, A, exec::lda),
    op(0x96, 2, "LDA", DIR, A, exec::lda),
    op(0xA6, 2, "LDA", IDX, A, exec::lda),
    op(0xB6, 3, "LDA", EXT, A, exec::lda),
    op(0xC6, 2, "LDA", IMM, B, exec::lda),
    op(0xD6, 2, "LDA", DIR, B, exec::lda),
    op(0xE6, 2, "LDA", IDX, B, exec::lda),
    op(0xF6, 3, "LDA", EXT, B, exec::lda),
    op(0x8E, 3, "LDS", IMM, SP, exec::ld16),
    op(0x9E, 2, "LDS", DIR, SP, exec::ld16),
    op(0xAE, 2, "LDS", IDX, SP, exec::ld16),
    op(0xBE, 3, "LDS", EXT, SP, exec::ld16),
    op(0xCE, 3, "LDX", IMM, IX, exec::ld16),
    op(0xDE, 2, "LDX", DIR, IX, exec::ld16),
    op(0xEE, 2, "LDX", IDX, IX, exec::ld16),
    op(0xFE, 3, "LDX", EXT, IX, exec::ld16),
    op(0x44, 1, "LSR", ACC, A, exec::lsr),
    op(0x54, 1, "LSR", ACC, B, exec::lsr),
    op(0x64, 2, "LSR", IDX, NONE, exec::lsr),
    op(0x74, 3, "LSR", EXT, NONE, exec::lsr),
    op(0x40, 1, "NEG", ACC, A, exec::neg),
    op(0x50, 1, "NEG", ACC, B, exec::neg),
    op(0x60, 2, "NEG", IDX, NONE, exec::neg),
    op(0x70, 3, "NEG", EXT, NONE, exec::neg),
    op(0x01, 1, "NOP", INH, NONE, exec::nop),
    op(0x8A, 2, "ORA", IMM, A, exec::ora),
    op(0x9A, 2, "ORA", DIR, A, exec::ora),
    op(0xAA, 2, "ORA", IDX, A, exec::ora),
    op(0xBA, 3, "ORA", EXT, A, exec::ora),
    op(0xCA, 2, "ORA", IMM, B, exec::ora),
    op(0xDA, 2, "ORA", DIR, B, exec::ora),
    op(0xEA, 2, "ORA", IDX, B, exec::ora),
    op(0xFA, 3, "ORA", EXT, B, exec::ora),
    op(0x36, 1, "PSH", ACC, A, exec::psh),
    op(0x37, 1, "PSH", ACC, B, exec::psh),
    op(0x32, 1, "PUL", ACC, A, exec::pul),
    op(0x33, 1, "PUL", ACC, B, exec::pul),
    op(0x49, 1, "ROL", ACC, A, exec::rol),
    op(0x59, 1, "ROL", ACC, B, exec::rol),
    op(0x69, 2, "ROL", IDX, NONE, exec::rol),
    op(0x79, 3, "ROL", EXT, NONE, exec::rol),
    op(0x46, 1, "ROR", ACC, A, exec::ror),
    op(0x56, 1, "ROR", ACC, B, exec::ror),
    op(0x66, 2, "ROR", IDX, NONE, exec::ror),
    op(0x76, 3, "ROR", EXT, NONE, exec::ror),
    op(0x3B, 1, "RTI", INH, NONE, exec::rti),
    op(0x39, 1, "RTS", INH, NONE, exec::rts),
    op(0x10, 1, "SBA", INH, NONE, exec::sba),
    op(0x82, 2, "SBC", IMM, A, exec::sbc),
    op(0x92, 2, "SBC", DIR, A, exec::sbc),
    op(0xA2, 2, "SBC", IDX, A, exec::sbc),
    op(0xB2, 3, "SBC", EXT, A, exec::sbc),
    op(0xC2, 2, "SBC", IMM, B, exec::sbc),
    op(0xD2, 2, "SBC", DIR, B, exec::sbc),
    op(0xE2, 2, "SBC", IDX, B, exec::sbc),
    op(0xF2, 3, "SBC", EXT, B, exec::sbc),
    op(0x0D, 1, "SEC", INH, NONE, exec::sec),
    op(0x0F, 1, "SEI", INH, NONE, exec::sei),
    op(0x0B, 1, "SEV", INH, NONE, exec::sev),
    op(0x97, 2, "STA", DIR, A, exec::sta),
    op(0xA7, 2, "STA", IDX, A, exec::sta),
    op(0xB7, 3, "STA", EXT, A, exec::sta),
    op(0xD7, 2, "STA", DIR, B, exec::sta),
    op(0xE7, 2, "STA", IDX, B, exec::sta),
    op(0xF7, 3, "STA", EXT, B, exec::sta),
    op(0x9F, 2, "STS", DIR, SP, exec::st16),
    op(0xAF, 2, "STS", IDX, SP, exec::st16),
    op(0xBF, 3, "STS", EXT, SP, exec::st16),
    op(0xDF, 2, "STX", DIR, IX, exec::st16),
    op(0xEF, 2, "STX", IDX, IX, exec::st16),
    op(0xFF, 3, "STX", EXT, IX, exec::st16),
    op(0x80, 2, "SUB", IMM, A, exec::sub),
    op(0x90, 2, "SUB", DIR, A, exec::sub),
    op(0xA0, 2, "SUB", IDX, A, exec::sub),
    op(0xB0, 3, "SUB", EXT, A, exec::sub),
    op(0xC0, 2, "SUB", IMM, B, exec::sub),
    op(0xD0, 2, "SUB", DIR, B, exec::sub),
    op(0xE0, 2, "SUB", IDX, B, exec::sub),
    op(0xF0, 3, "SUB", EXT, B, exec::sub),
    op(0x3F, 1, "SWI", INH, NONE, exec::swi),
    op(0x16, 1, "TAB", INH, NONE, exec::tab),
    op(0x06, 1, "TAP", INH, NONE, exec::tap),
    op(0x17, 1, "TBA", INH, NONE, exec::tba),
    op(0x07, 1, "TPA", INH, NONE, exec::tpa),
    op(0x4D, 1, "TST", ACC, A, exec::tst),
    op(0x5D, 1, "TST", ACC, B, exec::tst),
    op(0x6D, 2, "TST", IDX, NONE, exec::tst),
    op(0x7D, 3, "TST", EXT, NONE, exec::tst),
    op(0x30, 1, "TSX", INH, NONE, exec::tsx),
    op(0x35, 1, "TXS", INH, NONE, exec::txs),
    op(0x3E, 1, "WAI", INH, NONE, exec::wai),
];

lazy_static! {
    static ref TABLE: [Option<&'static Op>; 256] = build_table();
}

fn build_table() -> [Option<&'static Op>; 256] {
    let mut table: [Option<&'static Op>; 256] = [None; 256];
    for op in OPS {
        let slot = &mut table[op.code as usize];
        assert!(
            slot.is_none(),
            "opcode 0x{:02X} registered twice ({})",
            op.code,
            op.mnemonic
        );
        *slot = Some(op);
    }
    table
}

/// Looks up the descriptor for an opcode byte. `None` means the byte is
/// not a valid MC6800 opcode.
#[must_use]
pub fn lookup(code: u8) -> Option<&'static Op> {
    TABLE[code as usize]
}

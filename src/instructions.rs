//! MC6800 Instruction Execution
//!
//! One executor function per instruction family. Each executor resolves its
//! operand through [`crate::addressing`], performs the operation, updates
//! the status flags, and advances PC itself — straight-line instructions by
//! the descriptor length, control-flow instructions to their computed
//! target. Memory writes go through the bus and propagate protection
//! faults.
//!
//! Flag behavior follows the MC6800 family with two deliberate legacy
//! quirks kept for compatibility with existing ROM tooling:
//!
//! - the overflow rule for subtract-style operations (`SUB`, `SBC`, `CMP`,
//!   `SBA`, `CBA`, `CPX`) is the same same-signs-in/different-sign-out rule
//!   used for additions;
//! - `BIT` writes its AND result back into the accumulator.

use crate::addressing::{branch_target, operand_addr, operand_byte, operand_word, AddressingMode};
use crate::bus::{BusError, MemoryBus};
use crate::cpu::{Step, SWI_VECTOR};
use crate::opcodes::Op;
use crate::registers::{Register, RegisterFile};

#[inline]
fn advance(op: &Op, regs: &mut RegisterFile) {
    regs.pc = regs.pc.wrapping_add(u16::from(op.length));
}

/// The accumulator an instruction targets. Descriptors for accumulator
/// instructions always carry one; A is a safe fallback.
#[inline]
fn acc(op: &Op) -> Register {
    match op.reg {
        Some(reg) => reg,
        None => Register::A,
    }
}

/// Reads the read-modify-write target: the named accumulator, or the byte
/// at the resolved effective address.
fn read_target(op: &Op, regs: &RegisterFile, bus: &mut MemoryBus) -> (Option<u16>, u8) {
    match op.mode {
        AddressingMode::Accumulator => (None, regs.get(acc(op)) as u8),
        _ => {
            let addr = operand_addr(op.mode, regs, bus);
            (Some(addr), bus.read(addr, false))
        }
    }
}

/// Writes a read-modify-write result back where it came from.
fn write_target(
    op: &Op,
    regs: &mut RegisterFile,
    bus: &mut MemoryBus,
    addr: Option<u16>,
    value: u8,
) -> Result<(), BusError> {
    match addr {
        None => {
            regs.set(acc(op), u16::from(value));
            Ok(())
        }
        Some(a) => bus.write(a, value),
    }
}

/// Takes or skips a relative branch.
fn branch(regs: &mut RegisterFile, bus: &mut MemoryBus, taken: bool) -> Result<Step, BusError> {
    if taken {
        let offset = bus.read(regs.pc.wrapping_add(1), false);
        regs.pc = branch_target(regs.pc, offset);
    } else {
        regs.pc = regs.pc.wrapping_add(2);
    }
    Ok(Step::Continue)
}

/// Pushes one byte at SP and decrements SP.
fn push(regs: &mut RegisterFile, bus: &mut MemoryBus, value: u8) -> Result<(), BusError> {
    bus.write(regs.sp, value)?;
    regs.sp = regs.sp.wrapping_sub(1);
    Ok(())
}

/// Pushes the 7-byte interrupt frame (PC lo, PC hi, IX lo, IX hi, A, B,
/// SR) used by SWI and WAI, with `ret` as the saved program counter.
fn push_frame(regs: &mut RegisterFile, bus: &mut MemoryBus, ret: u16) -> Result<(), BusError> {
    push(regs, bus, ret as u8)?;
    push(regs, bus, (ret >> 8) as u8)?;
    push(regs, bus, regs.ix as u8)?;
    push(regs, bus, (regs.ix >> 8) as u8)?;
    push(regs, bus, regs.a)?;
    push(regs, bus, regs.b)?;
    push(regs, bus, regs.sr)?;
    Ok(())
}

// --- Arithmetic ---

pub fn add(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = i32::from(operand_byte(op.mode, regs, bus));
    let r = i32::from(regs.get(acc(op)));
    let ret = r + val;
    regs.update_hnzvc(r, val, ret);
    regs.set(acc(op), ret as u16 & 0xFF);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn adc(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = i32::from(operand_byte(op.mode, regs, bus));
    let carry = i32::from(regs.c());
    let r = i32::from(regs.get(acc(op)));
    let ret = r + val + carry;
    regs.update_hnzvc(r, val, ret);
    regs.set(acc(op), ret as u16 & 0xFF);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn sub(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = i32::from(operand_byte(op.mode, regs, bus));
    let r = i32::from(regs.get(acc(op)));
    let ret = r - val;
    regs.update_hnzvc(r, val, ret);
    regs.set(acc(op), ret as u16 & 0xFF);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn sbc(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = i32::from(operand_byte(op.mode, regs, bus));
    let carry = i32::from(regs.c());
    let r = i32::from(regs.get(acc(op)));
    let ret = r - val - carry;
    regs.update_hnzvc(r, val, ret);
    regs.set(acc(op), ret as u16 & 0xFF);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn cmp(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = i32::from(operand_byte(op.mode, regs, bus));
    let r = i32::from(regs.get(acc(op)));
    let ret = r - val;
    regs.update_hnzvc(r, val, ret);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn aba(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    let ret = i32::from(regs.a) + i32::from(regs.b);
    regs.update_hnzvc(i32::from(regs.a), i32::from(regs.b), ret);
    regs.a = ret as u8;
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn sba(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    let ret = i32::from(regs.a) - i32::from(regs.b);
    regs.update_hnzvc(i32::from(regs.a), i32::from(regs.b), ret);
    regs.a = ret as u8;
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn cba(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    let ret = i32::from(regs.a) - i32::from(regs.b);
    regs.update_hnzvc(i32::from(regs.a), i32::from(regs.b), ret);
    advance(op, regs);
    Ok(Step::Continue)
}

// --- Logical ---

pub fn and(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = operand_byte(op.mode, regs, bus);
    let ret = (regs.get(acc(op)) as u8) & val;
    regs.update_nz(i32::from(ret));
    regs.set_v(false);
    regs.set(acc(op), u16::from(ret));
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn ora(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = operand_byte(op.mode, regs, bus);
    let ret = (regs.get(acc(op)) as u8) | val;
    regs.update_nz(i32::from(ret));
    regs.set_v(false);
    regs.set(acc(op), u16::from(ret));
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn eor(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = operand_byte(op.mode, regs, bus);
    let ret = (regs.get(acc(op)) as u8) ^ val;
    regs.update_nz(i32::from(ret));
    regs.set_v(false);
    regs.set(acc(op), u16::from(ret));
    advance(op, regs);
    Ok(Step::Continue)
}

/// Documented as a pure test, but this implementation family has always
/// written the AND result back into the accumulator. Existing ROMs depend
/// on it; keep the store.
pub fn bit(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = operand_byte(op.mode, regs, bus);
    let ret = (regs.get(acc(op)) as u8) & val;
    regs.update_nz(i32::from(ret));
    regs.set_v(false);
    regs.set(acc(op), u16::from(ret));
    advance(op, regs);
    Ok(Step::Continue)
}

// --- Loads, stores, 16-bit operations ---

pub fn lda(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = operand_byte(op.mode, regs, bus);
    regs.update_nz(i32::from(val));
    regs.set_v(false);
    regs.set(acc(op), u16::from(val));
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn sta(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = regs.get(acc(op)) as u8;
    let addr = operand_addr(op.mode, regs, bus);
    bus.write(addr, val)?;
    regs.update_nz(i32::from(val));
    regs.set_v(false);
    advance(op, regs);
    Ok(Step::Continue)
}

/// LDX / LDS. N is taken from bit 7 of the 16-bit value (not bit 15);
/// legacy behavior this CPU model has always had.
pub fn ld16(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = operand_word(op.mode, regs, bus);
    regs.set_z(val == 0);
    regs.set_n(val & 0x0080 != 0);
    regs.set_v(false);
    regs.set(acc(op), val);
    advance(op, regs);
    Ok(Step::Continue)
}

/// STX / STS, big-endian store. Same bit-7 N rule as the loads.
pub fn st16(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = regs.get(acc(op));
    let addr = operand_addr(op.mode, regs, bus);
    bus.write(addr, (val >> 8) as u8)?;
    bus.write(addr.wrapping_add(1), val as u8)?;
    regs.set_z(val == 0);
    regs.set_n(val & 0x0080 != 0);
    regs.set_v(false);
    advance(op, regs);
    Ok(Step::Continue)
}

/// CPX: 16-bit compare against IX. N comes from bit 7 of the high result
/// byte; V applies the generic bit-7 sign rule to the 16-bit operands.
/// C is untouched.
pub fn cpx(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = i32::from(operand_word(op.mode, regs, bus));
    let r = i32::from(regs.ix);
    let ret = r - val;
    regs.set_n((ret >> 8) & 0x80 != 0);
    regs.set_z(ret & 0xFFFF == 0);
    regs.update_v(r, val, ret);
    advance(op, regs);
    Ok(Step::Continue)
}

// --- Read-modify-write ---

pub fn asl(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let (addr, val) = read_target(op, regs, bus);
    let ret = i32::from(val) << 1;
    regs.update_nz(ret);
    regs.update_c(ret);
    regs.update_shift_v();
    write_target(op, regs, bus, addr, ret as u8)?;
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn asr(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let (addr, val) = read_target(op, regs, bus);
    let v = i32::from(val);
    // bit 0 leaves through carry, bit 7 is replicated
    let ret = 256 * (v & 1) + (v & 0x80) + (v >> 1);
    regs.update_nz(ret);
    regs.update_c(ret);
    regs.update_shift_v();
    write_target(op, regs, bus, addr, ret as u8)?;
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn lsr(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let (addr, val) = read_target(op, regs, bus);
    let ret = val >> 1;
    regs.set_n(false);
    regs.set_z(ret == 0);
    regs.set_c(val & 0x01 != 0);
    regs.update_shift_v();
    write_target(op, regs, bus, addr, ret)?;
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn rol(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let (addr, val) = read_target(op, regs, bus);
    let carry = i32::from(regs.c());
    let ret = (i32::from(val) << 1) | carry;
    regs.update_nz(ret);
    regs.set_c(val & 0x80 != 0);
    regs.update_shift_v();
    write_target(op, regs, bus, addr, ret as u8)?;
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn ror(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let (addr, val) = read_target(op, regs, bus);
    let carry = u8::from(regs.c());
    let ret = (val >> 1) | (carry << 7);
    regs.update_nz(i32::from(ret));
    regs.set_c(val & 0x01 != 0);
    regs.update_shift_v();
    write_target(op, regs, bus, addr, ret)?;
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn com(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let (addr, val) = read_target(op, regs, bus);
    let ret = 0xFF - val;
    regs.update_nz(i32::from(ret));
    regs.set_v(false);
    regs.set_c(true);
    write_target(op, regs, bus, addr, ret)?;
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn neg(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let (addr, val) = read_target(op, regs, bus);
    let ret = -i32::from(val);
    regs.update_nz(ret);
    regs.set_c(val != 0);
    regs.set_v(val == 0x80);
    write_target(op, regs, bus, addr, ret as u8)?;
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn inc(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let (addr, val) = read_target(op, regs, bus);
    let ret = i32::from(val) + 1;
    regs.update_nz(ret);
    regs.set_v(val == 0x7F);
    write_target(op, regs, bus, addr, ret as u8)?;
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn dec(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let (addr, val) = read_target(op, regs, bus);
    let ret = i32::from(val) - 1;
    regs.update_nz(ret);
    regs.set_v(val == 0x80);
    write_target(op, regs, bus, addr, ret as u8)?;
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn clr(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let (addr, _) = read_target(op, regs, bus);
    write_target(op, regs, bus, addr, 0)?;
    regs.set_n(false);
    regs.set_v(false);
    regs.set_c(false);
    regs.set_z(true);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn tst(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let (_, val) = read_target(op, regs, bus);
    regs.update_nz(i32::from(val));
    regs.set_v(false);
    regs.set_c(false);
    advance(op, regs);
    Ok(Step::Continue)
}

// --- Branches ---

pub fn bra(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    branch(regs, bus, true)
}

pub fn bcc(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let taken = !regs.c();
    branch(regs, bus, taken)
}

pub fn bcs(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let taken = regs.c();
    branch(regs, bus, taken)
}

pub fn beq(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let taken = regs.z();
    branch(regs, bus, taken)
}

pub fn bne(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let taken = !regs.z();
    branch(regs, bus, taken)
}

pub fn bmi(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let taken = regs.n();
    branch(regs, bus, taken)
}

pub fn bpl(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let taken = !regs.n();
    branch(regs, bus, taken)
}

pub fn bvc(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let taken = !regs.v();
    branch(regs, bus, taken)
}

pub fn bvs(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let taken = regs.v();
    branch(regs, bus, taken)
}

pub fn bhi(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let taken = !regs.c() && !regs.z();
    branch(regs, bus, taken)
}

pub fn bls(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let taken = regs.c() || regs.z();
    branch(regs, bus, taken)
}

pub fn bge(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let taken = regs.n() == regs.v();
    branch(regs, bus, taken)
}

pub fn blt(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let taken = regs.n() != regs.v();
    branch(regs, bus, taken)
}

pub fn bgt(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let taken = !regs.z() && regs.n() == regs.v();
    branch(regs, bus, taken)
}

pub fn ble(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let taken = regs.z() || regs.n() != regs.v();
    branch(regs, bus, taken)
}

pub fn bsr(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let pc = regs.pc;
    let offset = bus.read(pc.wrapping_add(1), false);
    let ret = pc.wrapping_add(2);
    push(regs, bus, ret as u8)?;
    push(regs, bus, (ret >> 8) as u8)?;
    regs.pc = branch_target(pc, offset);
    Ok(Step::Continue)
}

// --- Jumps, subroutines, interrupts ---

pub fn jmp(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.pc = operand_addr(op.mode, regs, bus);
    Ok(Step::Continue)
}

pub fn jsr(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let target = operand_addr(op.mode, regs, bus);
    let ret = regs.pc.wrapping_add(u16::from(op.length));
    push(regs, bus, ret as u8)?;
    push(regs, bus, (ret >> 8) as u8)?;
    regs.pc = target;
    Ok(Step::Continue)
}

pub fn rts(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.pc = bus.read_word(regs.sp.wrapping_add(1), false);
    regs.sp = regs.sp.wrapping_add(2);
    Ok(Step::Continue)
}

pub fn swi(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let pc = regs.pc;
    push_frame(regs, bus, pc)?;
    regs.pc = bus.read_word(SWI_VECTOR, false);
    regs.set_i(true);
    Ok(Step::Continue)
}

pub fn rti(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let sp = regs.sp;
    let sr = bus.read(sp.wrapping_add(1), false);
    regs.set_sr(sr);
    regs.b = bus.read(sp.wrapping_add(2), false);
    regs.a = bus.read(sp.wrapping_add(3), false);
    regs.ix = bus.read_word(sp.wrapping_add(4), false);
    regs.pc = bus.read_word(sp.wrapping_add(6), false);
    regs.sp = sp.wrapping_add(7);
    Ok(Step::Continue)
}

/// WAI stage 0: stack the machine context with the resume address (the
/// instruction after WAI) and park. PC stays on the WAI opcode so the
/// controller can verify what the CPU is waiting on; stage 1 lives in
/// `Cpu::service_interrupt`.
pub fn wai(_op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let ret = regs.pc.wrapping_add(1);
    push_frame(regs, bus, ret)?;
    Ok(Step::AwaitInterrupt)
}

// --- Inherent register operations ---

pub fn nop(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn clc(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.set_c(false);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn cli(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.set_i(false);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn clv(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.set_v(false);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn sec(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.set_c(true);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn sei(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.set_i(true);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn sev(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.set_v(true);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn tab(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.b = regs.a;
    regs.set_v(false);
    regs.update_nz(i32::from(regs.a));
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn tba(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.a = regs.b;
    regs.set_v(false);
    regs.update_nz(i32::from(regs.a));
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn tap(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.set_sr(regs.a);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn tpa(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.a = regs.sr;
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn psh(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    let val = regs.get(acc(op)) as u8;
    push(regs, bus, val)?;
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn pul(op: &Op, regs: &mut RegisterFile, bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.sp = regs.sp.wrapping_add(1);
    let val = bus.read(regs.sp, false);
    regs.set(acc(op), u16::from(val));
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn tsx(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.ix = regs.sp.wrapping_add(1);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn txs(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.sp = regs.ix.wrapping_sub(1);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn des(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.sp = regs.sp.wrapping_sub(1);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn ins(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.sp = regs.sp.wrapping_add(1);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn dex(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.ix = regs.ix.wrapping_sub(1);
    regs.set_z(regs.ix == 0);
    advance(op, regs);
    Ok(Step::Continue)
}

pub fn inx(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    regs.ix = regs.ix.wrapping_add(1);
    regs.set_z(regs.ix == 0);
    advance(op, regs);
    Ok(Step::Continue)
}

/// DAA: BCD correction after an 8-bit add, keyed on (C, H, upper nibble,
/// lower nibble). Combinations outside the documented table apply no
/// correction and leave C alone.
pub fn daa(op: &Op, regs: &mut RegisterFile, _bus: &mut MemoryBus) -> Result<Step, BusError> {
    let upper = regs.a >> 4;
    let lower = regs.a & 0x0F;
    let correction: Option<(u8, bool)> = match (regs.c(), regs.h()) {
        (false, false) => {
            if upper < 10 && lower < 10 {
                Some((0x00, false))
            } else if upper < 9 && lower > 9 {
                Some((0x06, false))
            } else if upper > 9 && lower < 10 {
                Some((0x60, true))
            } else if upper > 8 && lower > 9 {
                Some((0x66, true))
            } else {
                None
            }
        }
        (false, true) => {
            if upper < 10 && lower < 4 {
                Some((0x06, false))
            } else if upper > 9 && lower < 4 {
                Some((0x66, true))
            } else {
                None
            }
        }
        (true, false) => {
            if upper < 3 && lower < 10 {
                Some((0x60, true))
            } else if upper < 3 && lower > 9 {
                Some((0x66, true))
            } else {
                None
            }
        }
        (true, true) => {
            if upper < 4 && lower < 4 {
                Some((0x66, true))
            } else {
                None
            }
        }
    };
    let ret = match correction {
        Some((add, carry)) => {
            regs.set_c(carry);
            i32::from(regs.a) + i32::from(add)
        }
        None => i32::from(regs.a),
    };
    regs.update_nz(ret);
    regs.a = ret as u8;
    advance(op, regs);
    Ok(Step::Continue)
}

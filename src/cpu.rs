//! MC6800 Core: Fetch, Decode, Execute
//!
//! [`Cpu`] ties the register file to the memory bus and executes one
//! instruction per [`Cpu::step`]. The core has no notion of run state or
//! timing; the controller layers those on top.

use log::warn;

use crate::bus::{BusError, MemoryBus};
use crate::opcodes;
use crate::registers::RegisterFile;

/// Reset vector (big-endian PC at power-on / reset).
pub const RESET_VECTOR: u16 = 0xFFFE;
/// Software interrupt vector (SWI).
pub const SWI_VECTOR: u16 = 0xFFFA;
/// Hardware interrupt vector (IRQ, serviced out of WAI).
pub const IRQ_VECTOR: u16 = 0xFFF8;

/// Outcome of executing one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Instruction retired normally.
    Continue,
    /// Unimplemented opcode; the core made no state change.
    Halt,
    /// WAI stacked the machine context and is parked waiting for an
    /// interrupt. PC still points at the WAI opcode.
    AwaitInterrupt,
}

/// The emulated processor.
pub struct Cpu {
    pub regs: RegisterFile,
    pub bus: MemoryBus,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Creates a core with power-on registers and an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: RegisterFile::new(),
            bus: MemoryBus::new(),
        }
    }

    /// Hardware reset: registers to power-on state, then PC latched from
    /// the reset vector, whatever it holds. On a bare machine that means
    /// 0x0000, where the zero byte reads as an unimplemented opcode and
    /// execution soft-halts immediately.
    pub fn reset(&mut self) {
        self.regs = RegisterFile::new();
        self.regs.pc = self.bus.read_word(RESET_VECTOR, true);
    }

    /// Executes the instruction at PC.
    ///
    /// An opcode byte with no table entry reports [`Step::Halt`] without
    /// touching any state; a store into protected memory surfaces the bus
    /// fault, leaving PC on the faulting instruction.
    pub fn step(&mut self) -> Result<Step, BusError> {
        let code = self.bus.read(self.regs.pc, false);
        match opcodes::lookup(code) {
            Some(op) => (op.exec)(op, &mut self.regs, &mut self.bus),
            None => {
                warn!(
                    "unimplemented opcode 0x{code:02X} at 0x{:04X}",
                    self.regs.pc
                );
                Ok(Step::Halt)
            }
        }
    }

    /// Services a pending hardware interrupt for a core parked on WAI:
    /// vectors PC through the IRQ vector and masks further interrupts.
    /// The machine context was already stacked by the WAI instruction.
    pub fn service_interrupt(&mut self) {
        self.regs.pc = self.bus.read_word(IRQ_VECTOR, false);
        self.regs.set_i(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A core with `program` in RAM at 0x0100 and PC pointing at it.
    fn cpu_with(program: &[u8]) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.bus.load(0x0100, program);
        cpu.regs.pc = 0x0100;
        cpu.regs.sp = 0x01FF;
        cpu
    }

    fn step_ok(cpu: &mut Cpu) -> Step {
        cpu.step().unwrap()
    }

    #[test]
    fn test_reset_latches_vector() {
        let mut cpu = Cpu::new();
        cpu.bus.load(0xFFFE, &[0xC0, 0x00]);
        cpu.regs.a = 0x55;
        cpu.regs.set_c(true);
        cpu.reset();
        assert_eq!(cpu.regs.pc, 0xC000);
        assert_eq!(cpu.regs.a, 0);
        assert_eq!(cpu.regs.sr, 0xC0);
    }

    #[test]
    fn test_reset_latches_zero_vector() {
        // a genuinely programmed 0x0000 vector is honored
        let mut cpu = Cpu::new();
        cpu.reset();
        assert_eq!(cpu.regs.pc, 0x0000);
        assert_eq!(cpu.step().unwrap(), Step::Halt);
    }

    #[test]
    fn test_unknown_opcode_halts_without_state_change() {
        let mut cpu = cpu_with(&[0x00]);
        assert_eq!(step_ok(&mut cpu), Step::Halt);
        assert_eq!(cpu.regs.pc, 0x0100);
    }

    #[test]
    fn test_lda_immediate() {
        let mut cpu = cpu_with(&[0x86, 0x42]);
        assert_eq!(step_ok(&mut cpu), Step::Continue);
        assert_eq!(cpu.regs.a, 0x42);
        assert_eq!(cpu.regs.pc, 0x0102);
        assert!(!cpu.regs.n() && !cpu.regs.z() && !cpu.regs.v());
    }

    #[test]
    fn test_lda_sets_n_and_z() {
        let mut cpu = cpu_with(&[0x86, 0x80, 0xC6, 0x00]);
        step_ok(&mut cpu);
        assert!(cpu.regs.n());
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.b, 0);
        assert!(cpu.regs.z());
        assert!(!cpu.regs.n());
    }

    #[test]
    fn test_add_signed_overflow_boundary() {
        // A = 0x7F; ADDA #1 -> 0x80, N=1 V=1 C=0 H=1
        let mut cpu = cpu_with(&[0x8B, 0x01]);
        cpu.regs.a = 0x7F;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0x80);
        assert!(cpu.regs.n());
        assert!(cpu.regs.v());
        assert!(!cpu.regs.c());
        assert!(cpu.regs.h());
        assert!(!cpu.regs.z());
    }

    #[test]
    fn test_add_carry_boundary() {
        // A = 0xFF; ADDA #1 -> 0x00, Z=1 C=1 V=0 N=0
        let mut cpu = cpu_with(&[0x8B, 0x01]);
        cpu.regs.a = 0xFF;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0x00);
        assert!(cpu.regs.z());
        assert!(cpu.regs.c());
        assert!(!cpu.regs.v());
        assert!(!cpu.regs.n());
    }

    #[test]
    fn test_adc_folds_carry_in() {
        let mut cpu = cpu_with(&[0x89, 0x10]);
        cpu.regs.a = 0x01;
        cpu.regs.set_c(true);
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0x12);
        assert!(!cpu.regs.c());
    }

    #[test]
    fn test_sub_borrow_sets_carry() {
        // 0x00 - 0x01 = 0xFF with borrow
        let mut cpu = cpu_with(&[0x80, 0x01]);
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0xFF);
        assert!(cpu.regs.c());
        assert!(cpu.regs.n());
        assert!(!cpu.regs.z());
    }

    #[test]
    fn test_subtract_shares_add_overflow_rule() {
        // 0x80 - 0x01: same-sign inputs (0x80, 0x01 have different
        // bit 7) -> V clear under the shared sign rule.
        let mut cpu = cpu_with(&[0x80, 0x01]);
        cpu.regs.a = 0x80;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0x7F);
        assert!(!cpu.regs.v());
        // 0x80 - 0x80 = 0: same signs in, positive out -> V set, the
        // documented legacy quirk.
        let mut cpu = cpu_with(&[0x80, 0x80]);
        cpu.regs.a = 0x80;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0x00);
        assert!(cpu.regs.v());
        assert!(cpu.regs.z());
    }

    #[test]
    fn test_cmp_updates_flags_without_store() {
        let mut cpu = cpu_with(&[0x81, 0x42]);
        cpu.regs.a = 0x42;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0x42);
        assert!(cpu.regs.z());
    }

    #[test]
    fn test_aba_sba_cba() {
        let mut cpu = cpu_with(&[0x1B, 0x10, 0x11]);
        cpu.regs.a = 0x20;
        cpu.regs.b = 0x22;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0x42);
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0x20);
        step_ok(&mut cpu); // CBA: 0x20 - 0x22
        assert_eq!(cpu.regs.a, 0x20);
        assert!(cpu.regs.c());
        assert!(cpu.regs.n());
    }

    #[test]
    fn test_logical_ops_clear_v() {
        let mut cpu = cpu_with(&[0x84, 0x0F, 0x8A, 0xF0, 0x88, 0xFF]);
        cpu.regs.a = 0x3C;
        cpu.regs.set_v(true);
        step_ok(&mut cpu); // ANDA #$0F
        assert_eq!(cpu.regs.a, 0x0C);
        assert!(!cpu.regs.v());
        step_ok(&mut cpu); // ORAA #$F0
        assert_eq!(cpu.regs.a, 0xFC);
        assert!(cpu.regs.n());
        step_ok(&mut cpu); // EORA #$FF
        assert_eq!(cpu.regs.a, 0x03);
    }

    #[test]
    fn test_bit_stores_result() {
        // Legacy behavior: BIT writes the AND result back.
        let mut cpu = cpu_with(&[0x85, 0x0F]);
        cpu.regs.a = 0xFF;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0x0F);
        assert!(!cpu.regs.n());
    }

    #[test]
    fn test_sta_direct_and_extended() {
        let mut cpu = cpu_with(&[0x97, 0x20, 0xB7, 0x12, 0x34]);
        cpu.regs.a = 0x99;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.pc, 0x0102);
        assert_eq!(cpu.bus.read(0x0020, true), 0x99);
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.pc, 0x0105);
        assert_eq!(cpu.bus.read(0x1234, true), 0x99);
        assert!(cpu.regs.n());
    }

    #[test]
    fn test_sta_protected_faults_in_place() {
        let mut cpu = cpu_with(&[0xB7, 0xE0, 0x00]);
        cpu.bus.protect(0xE000, 0xFFFF);
        cpu.regs.a = 0x01;
        let err = cpu.step().unwrap_err();
        assert_eq!(err, BusError::Protected { addr: 0xE000 });
        assert_eq!(cpu.regs.pc, 0x0100);
    }

    #[test]
    fn test_ldx_lds_16bit() {
        let mut cpu = cpu_with(&[0xCE, 0x12, 0x80, 0x8E, 0x00, 0x00]);
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.ix, 0x1280);
        // N comes from bit 7 of the 16-bit value
        assert!(cpu.regs.n());
        assert!(!cpu.regs.z());
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.sp, 0x0000);
        assert!(cpu.regs.z());
        assert!(!cpu.regs.n());
    }

    #[test]
    fn test_stx_big_endian() {
        let mut cpu = cpu_with(&[0xFF, 0x20, 0x00]);
        cpu.regs.ix = 0xBEEF;
        step_ok(&mut cpu);
        assert_eq!(cpu.bus.read(0x2000, true), 0xBE);
        assert_eq!(cpu.bus.read(0x2001, true), 0xEF);
    }

    #[test]
    fn test_cpx_leaves_carry_alone() {
        let mut cpu = cpu_with(&[0x8C, 0x10, 0x00]);
        cpu.regs.ix = 0x1000;
        cpu.regs.set_c(true);
        step_ok(&mut cpu);
        assert!(cpu.regs.z());
        assert!(!cpu.regs.n());
        assert!(cpu.regs.c());
        assert_eq!(cpu.regs.pc, 0x0103);
    }

    #[test]
    fn test_indexed_addressing() {
        let mut cpu = cpu_with(&[0xA6, 0x05]);
        cpu.regs.ix = 0x0200;
        cpu.bus.load(0x0205, &[0x77]);
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0x77);
    }

    #[test]
    fn test_asl_sets_carry_and_shift_v() {
        let mut cpu = cpu_with(&[0x48]);
        cpu.regs.a = 0x81;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0x02);
        assert!(cpu.regs.c());
        assert!(!cpu.regs.n());
        // V = C ^ N
        assert!(cpu.regs.v());
    }

    #[test]
    fn test_asr_replicates_sign() {
        let mut cpu = cpu_with(&[0x47]);
        cpu.regs.a = 0x81;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0xC0);
        assert!(cpu.regs.c());
        assert!(cpu.regs.n());
        assert!(!cpu.regs.v());
    }

    #[test]
    fn test_lsr_clears_n() {
        let mut cpu = cpu_with(&[0x44]);
        cpu.regs.a = 0x01;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0x00);
        assert!(!cpu.regs.n());
        assert!(cpu.regs.z());
        assert!(cpu.regs.c());
        assert!(cpu.regs.v());
    }

    #[test]
    fn test_rol_ror_through_carry() {
        let mut cpu = cpu_with(&[0x49, 0x46]);
        cpu.regs.a = 0x80;
        cpu.regs.set_c(true);
        step_ok(&mut cpu); // ROLA: 0x80 << 1 | 1 = 0x01, C=1
        assert_eq!(cpu.regs.a, 0x01);
        assert!(cpu.regs.c());
        step_ok(&mut cpu); // RORA: 0x01 >> 1 | C<<7 = 0x80, C=1
        assert_eq!(cpu.regs.a, 0x80);
        assert!(cpu.regs.c());
    }

    #[test]
    fn test_com_neg() {
        let mut cpu = cpu_with(&[0x43, 0x40]);
        cpu.regs.a = 0x0F;
        step_ok(&mut cpu); // COMA
        assert_eq!(cpu.regs.a, 0xF0);
        assert!(cpu.regs.c());
        assert!(!cpu.regs.v());
        step_ok(&mut cpu); // NEGA
        assert_eq!(cpu.regs.a, 0x10);
        assert!(cpu.regs.c());
    }

    #[test]
    fn test_neg_edge_cases() {
        let mut cpu = cpu_with(&[0x40]);
        cpu.regs.a = 0x00;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0x00);
        assert!(!cpu.regs.c());
        assert!(cpu.regs.z());

        let mut cpu = cpu_with(&[0x40]);
        cpu.regs.a = 0x80;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.a, 0x80);
        assert!(cpu.regs.v());
        assert!(cpu.regs.c());
    }

    #[test]
    fn test_inc_dec_v_boundary() {
        let mut cpu = cpu_with(&[0x4C, 0x4A, 0x4A]);
        cpu.regs.a = 0x7F;
        step_ok(&mut cpu); // INCA: 0x7F -> 0x80, V set
        assert_eq!(cpu.regs.a, 0x80);
        assert!(cpu.regs.v());
        step_ok(&mut cpu); // DECA: 0x80 -> 0x7F, V set
        assert_eq!(cpu.regs.a, 0x7F);
        assert!(cpu.regs.v());
        step_ok(&mut cpu); // DECA: 0x7F -> 0x7E, V clear
        assert!(!cpu.regs.v());
    }

    #[test]
    fn test_clr_memory_and_flags() {
        let mut cpu = cpu_with(&[0x7F, 0x02, 0x00]);
        cpu.bus.load(0x0200, &[0xAA]);
        cpu.regs.set_c(true);
        cpu.regs.set_n(true);
        step_ok(&mut cpu);
        assert_eq!(cpu.bus.read(0x0200, true), 0x00);
        assert!(cpu.regs.z());
        assert!(!cpu.regs.n() && !cpu.regs.v() && !cpu.regs.c());
    }

    #[test]
    fn test_tst_clears_v_and_c() {
        let mut cpu = cpu_with(&[0x4D]);
        cpu.regs.a = 0x80;
        cpu.regs.set_c(true);
        cpu.regs.set_v(true);
        step_ok(&mut cpu);
        assert!(cpu.regs.n());
        assert!(!cpu.regs.c());
        assert!(!cpu.regs.v());
        assert_eq!(cpu.regs.a, 0x80);
    }

    /// Exercises every branch opcode against all 16 combinations of
    /// N, Z, V and C.
    #[test]
    fn test_branch_predicates_exhaustive() {
        type Predicate = fn(bool, bool, bool, bool) -> bool;
        let cases: &[(u8, &str, Predicate)] = &[
            (0x20, "BRA", |_n, _z, _v, _c| true),
            (0x22, "BHI", |_n, z, _v, c| !c && !z),
            (0x23, "BLS", |_n, z, _v, c| c || z),
            (0x24, "BCC", |_n, _z, _v, c| !c),
            (0x25, "BCS", |_n, _z, _v, c| c),
            (0x26, "BNE", |_n, z, _v, _c| !z),
            (0x27, "BEQ", |_n, z, _v, _c| z),
            (0x28, "BVC", |_n, _z, v, _c| !v),
            (0x29, "BVS", |_n, _z, v, _c| v),
            (0x2A, "BPL", |n, _z, _v, _c| !n),
            (0x2B, "BMI", |n, _z, _v, _c| n),
            (0x2C, "BGE", |n, _z, v, _c| n == v),
            (0x2D, "BLT", |n, _z, v, _c| n != v),
            (0x2E, "BGT", |n, z, v, _c| !z && n == v),
            (0x2F, "BLE", |n, z, v, _c| z || n != v),
        ];
        for &(code, name, predicate) in cases {
            for bits in 0u8..16 {
                let n = bits & 0x8 != 0;
                let z = bits & 0x4 != 0;
                let v = bits & 0x2 != 0;
                let c = bits & 0x1 != 0;
                let mut cpu = cpu_with(&[code, 0x10]);
                cpu.regs.set_n(n);
                cpu.regs.set_z(z);
                cpu.regs.set_v(v);
                cpu.regs.set_c(c);
                step_ok(&mut cpu);
                let expect = if predicate(n, z, v, c) { 0x0112 } else { 0x0102 };
                assert_eq!(
                    cpu.regs.pc, expect,
                    "{name} with N={n} Z={z} V={v} C={c}"
                );
            }
        }
    }

    #[test]
    fn test_branch_backward() {
        let mut cpu = cpu_with(&[0x20, 0xFE]); // BRA -2: tight self-loop
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.pc, 0x0100);
    }

    #[test]
    fn test_bsr_pushes_return_address() {
        let mut cpu = cpu_with(&[0x8D, 0x10]);
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.pc, 0x0112);
        assert_eq!(cpu.regs.sp, 0x01FD);
        assert_eq!(cpu.bus.read(0x01FF, true), 0x02); // return low
        assert_eq!(cpu.bus.read(0x01FE, true), 0x01); // return high
    }

    #[test]
    fn test_jsr_rts_round_trip() {
        let mut cpu = cpu_with(&[0xBD, 0x02, 0x00]);
        cpu.bus.load(0x0200, &[0x39]); // RTS
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.pc, 0x0200);
        assert_eq!(cpu.regs.sp, 0x01FD);
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.pc, 0x0103);
        assert_eq!(cpu.regs.sp, 0x01FF);
    }

    #[test]
    fn test_jmp_indexed_and_extended() {
        let mut cpu = cpu_with(&[0x6E, 0x08]);
        cpu.regs.ix = 0x0300;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.pc, 0x0308);

        let mut cpu = cpu_with(&[0x7E, 0xC0, 0x00]);
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.pc, 0xC000);
    }

    #[test]
    fn test_swi_stacks_frame_and_vectors() {
        let mut cpu = cpu_with(&[0x3F]);
        cpu.bus.load(0xFFFA, &[0xD0, 0x00]);
        cpu.regs.a = 0xAA;
        cpu.regs.b = 0xBB;
        cpu.regs.ix = 0x1234;
        step_ok(&mut cpu);
        assert_eq!(cpu.regs.pc, 0xD000);
        assert!(cpu.regs.i());
        assert_eq!(cpu.regs.sp, 0x01F8);
        // frame: PC lo, PC hi, IX lo, IX hi, A, B, SR (descending)
        assert_eq!(cpu.bus.read(0x01FF, true), 0x00);
        assert_eq!(cpu.bus.read(0x01FE, true), 0x01);
        assert_eq!(cpu.bus.read(0x01FD, true), 0x34);
        assert_eq!(cpu.bus.read(0x01FC, true), 0x12);
        assert_eq!(cpu.bus.read(0x01FB, true), 0xAA);
        assert_eq!(cpu.bus.read(0x01FA, true), 0xBB);
        assert_eq!(cpu.bus.read(0x01F9, true) & 0xC0, 0xC0);
    }

    #[test]
    fn test_rti_restores_frame() {
        let mut cpu = cpu_with(&[0x3F]);
        cpu.bus.load(0xFFFA, &[0xD0, 0x00]);
        cpu.bus.load(0xD000, &[0x3B]); // RTI
        cpu.regs.a = 0xAA;
        cpu.regs.b = 0xBB;
        cpu.regs.ix = 0x1234;
        cpu.regs.set_c(true);
        step_ok(&mut cpu); // SWI
        cpu.regs.a = 0;
        cpu.regs.b = 0;
        cpu.regs.ix = 0;
        step_ok(&mut cpu); // RTI
        assert_eq!(cpu.regs.pc, 0x0100); // SWI pushes its own address
        assert_eq!(cpu.regs.a, 0xAA);
        assert_eq!(cpu.regs.b, 0xBB);
        assert_eq!(cpu.regs.ix, 0x1234);
        assert_eq!(cpu.regs.sp, 0x01FF);
        assert!(cpu.regs.c());
    }

    #[test]
    fn test_wai_parks_then_service_interrupt_vectors() {
        let mut cpu = cpu_with(&[0x3E]);
        cpu.bus.load(0xFFF8, &[0xE0, 0x00]);
        assert_eq!(step_ok(&mut cpu), Step::AwaitInterrupt);
        // PC stays on the WAI opcode; resume address is stacked
        assert_eq!(cpu.regs.pc, 0x0100);
        assert_eq!(cpu.regs.sp, 0x01F8);
        assert_eq!(cpu.bus.read(0x01FF, true), 0x01); // resume low: 0x0101
        assert_eq!(cpu.bus.read(0x01FE, true), 0x01);
        cpu.service_interrupt();
        assert_eq!(cpu.regs.pc, 0xE000);
        assert!(cpu.regs.i());
    }

    #[test]
    fn test_psh_pul() {
        let mut cpu = cpu_with(&[0x36, 0x37, 0x33, 0x32]);
        cpu.regs.a = 0x11;
        cpu.regs.b = 0x22;
        step_ok(&mut cpu); // PSHA
        step_ok(&mut cpu); // PSHB
        assert_eq!(cpu.regs.sp, 0x01FD);
        cpu.regs.a = 0;
        cpu.regs.b = 0;
        step_ok(&mut cpu); // PULB -> last pushed (0x22)
        step_ok(&mut cpu); // PULA -> 0x11
        assert_eq!(cpu.regs.b, 0x22);
        assert_eq!(cpu.regs.a, 0x11);
        assert_eq!(cpu.regs.sp, 0x01FF);
    }

    #[test]
    fn test_stack_pointer_transfers() {
        let mut cpu = cpu_with(&[0x30, 0x35, 0x34, 0x31]);
        step_ok(&mut cpu); // TSX: IX = SP + 1
        assert_eq!(cpu.regs.ix, 0x0200);
        step_ok(&mut cpu); // TXS: SP = IX - 1
        assert_eq!(cpu.regs.sp, 0x01FF);
        step_ok(&mut cpu); // DES
        assert_eq!(cpu.regs.sp, 0x01FE);
        step_ok(&mut cpu); // INS
        assert_eq!(cpu.regs.sp, 0x01FF);
    }

    #[test]
    fn test_inx_dex_z_only() {
        let mut cpu = cpu_with(&[0x09, 0x08, 0x08]);
        cpu.regs.ix = 0x0001;
        cpu.regs.set_n(true);
        step_ok(&mut cpu); // DEX -> 0
        assert!(cpu.regs.z());
        assert!(cpu.regs.n()); // untouched
        step_ok(&mut cpu); // INX -> 1
        assert!(!cpu.regs.z());
        step_ok(&mut cpu); // INX -> 2
        assert_eq!(cpu.regs.ix, 2);
    }

    #[test]
    fn test_accumulator_transfers() {
        let mut cpu = cpu_with(&[0x16, 0x17, 0x06, 0x07]);
        cpu.regs.a = 0x80;
        step_ok(&mut cpu); // TAB
        assert_eq!(cpu.regs.b, 0x80);
        assert!(cpu.regs.n());
        cpu.regs.b = 0x00;
        step_ok(&mut cpu); // TBA
        assert_eq!(cpu.regs.a, 0x00);
        assert!(cpu.regs.z());
        cpu.regs.a = 0x15;
        step_ok(&mut cpu); // TAP: SR = A | fixed bits
        assert_eq!(cpu.regs.sr, 0xD5);
        step_ok(&mut cpu); // TPA
        assert_eq!(cpu.regs.a, 0xD5);
    }

    #[test]
    fn test_flag_set_clear_instructions() {
        let mut cpu = cpu_with(&[0x0D, 0x0F, 0x0B, 0x0C, 0x0E, 0x0A]);
        step_ok(&mut cpu);
        step_ok(&mut cpu);
        step_ok(&mut cpu);
        assert!(cpu.regs.c() && cpu.regs.i() && cpu.regs.v());
        step_ok(&mut cpu);
        step_ok(&mut cpu);
        step_ok(&mut cpu);
        assert!(!cpu.regs.c() && !cpu.regs.i() && !cpu.regs.v());
    }

    #[test]
    fn test_daa_correction_rows() {
        // (A before, C, H, A after, C after)
        let rows: &[(u8, bool, bool, u8, bool)] = &[
            (0x25, false, false, 0x25, false), // already BCD
            (0x2B, false, false, 0x31, false), // low nibble > 9
            (0xB3, false, false, 0x13, true),  // high nibble > 9
            (0x9A, false, false, 0x00, true),  // both out of range
            (0x42, false, true, 0x48, false),  // half-carry
            (0xA2, false, true, 0x08, true),
            (0x15, true, false, 0x75, true), // carry in
            (0x1C, true, false, 0x82, true),
            (0x22, true, true, 0x88, true),
        ];
        for &(a, c, h, expect, c_after) in rows {
            let mut cpu = cpu_with(&[0x19]);
            cpu.regs.a = a;
            cpu.regs.set_c(c);
            cpu.regs.set_h(h);
            step_ok(&mut cpu);
            assert_eq!(cpu.regs.a, expect, "DAA of {a:02X} (C={c} H={h})");
            assert_eq!(cpu.regs.c(), c_after, "DAA carry of {a:02X}");
        }
    }

    #[test]
    fn test_pc_advances_by_length_for_straight_line_ops() {
        let flow = [
            "BRA", "BHI", "BLS", "BCC", "BCS", "BNE", "BEQ", "BVC", "BVS", "BPL", "BMI", "BGE",
            "BLT", "BGT", "BLE", "BSR", "JMP", "JSR", "RTS", "RTI", "SWI", "WAI",
        ];
        for code in 0u16..=255 {
            let Some(op) = opcodes::lookup(code as u8) else {
                continue;
            };
            if flow.contains(&op.mnemonic) {
                continue;
            }
            let mut cpu = cpu_with(&[code as u8, 0x02, 0x00]);
            cpu.step().unwrap();
            assert_eq!(
                cpu.regs.pc,
                0x0100 + u16::from(op.length),
                "{} (0x{code:02X})",
                op.mnemonic
            );
        }
    }

    #[test]
    fn test_sr_fixed_bits_hold_across_execution() {
        let mut cpu = cpu_with(&[0x86, 0x00, 0x06, 0x4F, 0x8B, 0xFF, 0x19]);
        for _ in 0..5 {
            step_ok(&mut cpu);
            assert_eq!(cpu.regs.sr & 0xC0, 0xC0);
        }
    }
}

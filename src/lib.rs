//! MC6800 CPU Emulator
//!
//! An instruction-level emulator for the Motorola MC6800 8-bit processor:
//! the full documented instruction set over a 64K memory bus with
//! memory-mapped device dispatch and write protection, a disassembler, a
//! threaded run controller with breakpoint and WAI interrupt support, and
//! a line-oriented debugger control surface for front-end tooling.
//!
//! ```
//! use m6800::{Controller, Cpu, Debugger};
//!
//! let mut cpu = Cpu::new();
//! cpu.bus.load(0x0100, &[0x86, 0x2A]); // LDAA #$2A
//! cpu.regs.pc = 0x0100;
//!
//! let mut dbg = Debugger::new(Controller::new(cpu));
//! dbg.execute("step");
//! assert!(dbg.execute("list_regs").contains("A:2A"));
//! ```

pub mod addressing;
pub mod bus;
pub mod controller;
pub mod cpu;
pub mod debugger;
pub mod disasm;
pub mod instructions;
pub mod loader;
pub mod opcodes;
pub mod registers;
pub mod uart;

pub use bus::{BusError, Device, MemoryBus, MEMORY_SIZE};
pub use controller::{Controller, RunState};
pub use cpu::{Cpu, Step};
pub use debugger::Debugger;
pub use registers::{Register, RegisterFile};
pub use uart::Acia;

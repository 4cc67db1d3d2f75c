//! Run Control
//!
//! [`Controller`] owns the core behind an `Arc<Mutex<_>>` and drives it
//! either one instruction at a time or from a background thread. The
//! mutex is held for exactly one instruction per acquisition, so observers
//! (the debugger's register dumps and memory reads) never see a torn
//! mid-instruction state.
//!
//! State machine:
//!
//! - `Stopped` -> `Running` via `run`
//! - `Running` -> `Stopped` via `stop`, a breakpoint hit, or an
//!   unimplemented opcode
//! - `Running` -> `AwaitingInterrupt` when the core retires WAI
//! - `AwaitingInterrupt` -> `Stopped` via `inject_interrupt` (PC vectors
//!   to the handler; execution waits for the next `run`/`step`)
//! - `Running` -> `Faulted` on a bus fault; `reset` recovers from any state
//!
//! The run thread checks the breakpoint against PC *before* fetching, so
//! the instruction at a breakpoint is never executed.

use std::fs::File;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{info, warn};

use crate::bus::BusError;
use crate::cpu::{Cpu, Step};
use crate::disasm;

/// What the controller is doing with the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Not executing; stepping and memory edits are safe.
    Stopped,
    /// The background thread is executing instructions.
    Running,
    /// Parked on WAI; `inject_interrupt` vectors to the handler.
    AwaitingInterrupt,
    /// A bus fault ended execution; `reset` recovers.
    Faulted,
}

struct Shared {
    running: AtomicBool,
    /// Breakpoint address, or -1 when disabled.
    breakpoint: AtomicI32,
    /// Pause between instructions, in microseconds.
    delay_us: AtomicU64,
    state: Mutex<RunState>,
    /// Instruction trace sink; one line per executed instruction.
    trace: Mutex<Option<File>>,
}

/// Appends the pre-execution trace line (registers, raw bytes,
/// disassembly of the instruction about to run) if tracing is on.
fn trace(shared: &Shared, cpu: &mut Cpu) {
    let mut guard = lock(&shared.trace);
    if let Some(file) = guard.as_mut() {
        let pc = cpu.regs.pc;
        let bytes = disasm::opcode_bytes(&mut cpu.bus, pc);
        let text = disasm::disassemble(&cpu.regs, &mut cpu.bus, pc);
        if writeln!(file, "{}| |{bytes:<8}| {text}", cpu.regs.dump()).is_err() {
            warn!("trace write failed");
        }
    }
}

/// Run-control wrapper around a [`Cpu`].
pub struct Controller {
    cpu: Arc<Mutex<Cpu>>,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

/// Locks a mutex, recovering the guard if a panicking thread poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Controller {
    /// Wraps a core. The controller starts out `Stopped`.
    #[must_use]
    pub fn new(cpu: Cpu) -> Self {
        Self {
            cpu: Arc::new(Mutex::new(cpu)),
            shared: Arc::new(Shared {
                running: AtomicBool::new(false),
                breakpoint: AtomicI32::new(-1),
                delay_us: AtomicU64::new(0),
                state: Mutex::new(RunState::Stopped),
                trace: Mutex::new(None),
            }),
            handle: None,
        }
    }

    /// Runs a closure against the locked core. Callers get a consistent
    /// between-instructions view even while the run thread is active.
    pub fn with_cpu<R>(&self, f: impl FnOnce(&mut Cpu) -> R) -> R {
        f(&mut lock(&self.cpu))
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        *lock(&self.shared.state)
    }

    /// Sets or clears the (single) breakpoint.
    pub fn set_breakpoint(&self, addr: Option<u16>) {
        let value = addr.map_or(-1, i32::from);
        self.shared.breakpoint.store(value, Ordering::SeqCst);
    }

    #[must_use]
    pub fn breakpoint(&self) -> Option<u16> {
        let value = self.shared.breakpoint.load(Ordering::SeqCst);
        u16::try_from(value).ok()
    }

    /// Sets the pause inserted after every instruction the run thread
    /// executes.
    pub fn set_delay(&self, delay: Duration) {
        let us = u64::try_from(delay.as_micros()).unwrap_or(u64::MAX);
        self.shared.delay_us.store(us, Ordering::SeqCst);
    }

    /// Installs (or removes) the instruction trace sink.
    pub fn set_trace(&self, file: Option<File>) {
        *lock(&self.shared.trace) = file;
    }

    /// Executes one instruction, tracking the state machine.
    pub fn step(&mut self) -> Result<Step, BusError> {
        let outcome = {
            let mut cpu = lock(&self.cpu);
            trace(&self.shared, &mut cpu);
            cpu.step()
        };
        match outcome {
            Ok(Step::Continue) => {}
            Ok(Step::Halt) => *lock(&self.shared.state) = RunState::Stopped,
            Ok(Step::AwaitInterrupt) => *lock(&self.shared.state) = RunState::AwaitingInterrupt,
            Err(_) => *lock(&self.shared.state) = RunState::Faulted,
        }
        outcome
    }

    /// Starts background execution, optionally from `addr`. A no-op while
    /// already running.
    pub fn run(&mut self, addr: Option<u16>) {
        if self.state() == RunState::Running {
            return;
        }
        self.join_thread();
        if let Some(addr) = addr {
            lock(&self.cpu).regs.pc = addr;
        }
        self.spawn();
    }

    /// Stops background execution and waits for the run thread to park.
    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.join_thread();
        let mut state = lock(&self.shared.state);
        if *state == RunState::Running {
            *state = RunState::Stopped;
        }
    }

    /// Delivers a hardware interrupt to a core parked on WAI: PC vectors
    /// to the handler and the controller returns to `Stopped`, leaving
    /// the user to `run` or `step` into it. Returns false (and does
    /// nothing) in any other state.
    pub fn inject_interrupt(&mut self) -> bool {
        if self.state() != RunState::AwaitingInterrupt {
            return false;
        }
        self.join_thread();
        lock(&self.cpu).service_interrupt();
        *lock(&self.shared.state) = RunState::Stopped;
        true
    }

    /// Stops execution and resets the core. Recovers from any state,
    /// `Faulted` included.
    pub fn reset(&mut self) {
        self.stop();
        lock(&self.cpu).reset();
        *lock(&self.shared.state) = RunState::Stopped;
    }

    fn spawn(&mut self) {
        self.shared.running.store(true, Ordering::SeqCst);
        *lock(&self.shared.state) = RunState::Running;
        let cpu = Arc::clone(&self.cpu);
        let shared = Arc::clone(&self.shared);
        self.handle = Some(thread::spawn(move || run_loop(&cpu, &shared)));
    }

    fn join_thread(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("run thread panicked");
            }
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.join_thread();
    }
}

fn run_loop(cpu: &Mutex<Cpu>, shared: &Shared) {
    while shared.running.load(Ordering::SeqCst) {
        let outcome = {
            let mut cpu = lock(cpu);
            let bp = shared.breakpoint.load(Ordering::SeqCst);
            if bp >= 0 && i32::from(cpu.regs.pc) == bp {
                info!("breakpoint hit at 0x{:04X}", cpu.regs.pc);
                shared.running.store(false, Ordering::SeqCst);
                *lock(&shared.state) = RunState::Stopped;
                return;
            }
            trace(shared, &mut cpu);
            cpu.step()
        };
        match outcome {
            Ok(Step::Continue) => {}
            Ok(Step::Halt) => {
                shared.running.store(false, Ordering::SeqCst);
                *lock(&shared.state) = RunState::Stopped;
                return;
            }
            Ok(Step::AwaitInterrupt) => {
                shared.running.store(false, Ordering::SeqCst);
                *lock(&shared.state) = RunState::AwaitingInterrupt;
                return;
            }
            Err(err) => {
                warn!("execution fault: {err}");
                shared.running.store(false, Ordering::SeqCst);
                *lock(&shared.state) = RunState::Faulted;
                return;
            }
        }
        let us = shared.delay_us.load(Ordering::SeqCst);
        if us > 0 {
            thread::sleep(Duration::from_micros(us));
        }
    }
    *lock(&shared.state) = RunState::Stopped;
}

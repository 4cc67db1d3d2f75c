//! Debugger Control Surface
//!
//! A line-oriented command interpreter over the [`Controller`]. Commands
//! are a verb plus comma-separated arguments; every command returns a
//! reply string and malformed input never panics. Protocol framing
//! (sockets, consoles) is up to the embedder.
//!
//! Number parsing is per-command, matching the conventions the existing
//! front-end tooling sends:
//!
//! - `run`/`jump` take `0x`-prefixed hex, otherwise decimal
//! - `break`/`get_opcodes`/`list_cmd` take hex, with a `d` prefix for
//!   decimal
//! - `set`/`get`/`save`/`load`/`list_mem`/`get_mem` take decimal

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::time::Duration;

use log::debug;

use crate::controller::{Controller, RunState};
use crate::disasm;
use crate::loader;

/// Reply for input the interpreter cannot parse.
pub const INVALID: &str = "Invalid Command!";

/// The command interpreter.
pub struct Debugger {
    ctl: Controller,
    trace_path: PathBuf,
}

/// Hex by default, `d` prefix for decimal.
fn parse_hex_default(s: &str) -> Option<u16> {
    match s.strip_prefix('d') {
        Some(dec) => dec.parse().ok(),
        None => u16::from_str_radix(s, 16).ok(),
    }
}

/// Decimal by default, `0x` prefix for hex.
fn parse_dec_default(s: &str) -> Option<u16> {
    match s.strip_prefix("0x") {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

impl Debugger {
    /// Wraps a controller. Trace output goes to `trace.log` in the
    /// working directory until [`Debugger::set_trace_path`] changes it.
    #[must_use]
    pub fn new(ctl: Controller) -> Self {
        Self {
            ctl,
            trace_path: PathBuf::from("trace.log"),
        }
    }

    /// Where `log,on` appends the instruction trace.
    pub fn set_trace_path(&mut self, path: impl Into<PathBuf>) {
        self.trace_path = path.into();
    }

    /// The wrapped controller, for embedders that also drive it directly.
    pub fn controller(&mut self) -> &mut Controller {
        &mut self.ctl
    }

    /// Executes one command line and returns the reply.
    pub fn execute(&mut self, input: &str) -> String {
        let mut parts = input.trim().split(',').map(str::trim);
        let verb = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        debug!("command: {verb} {args:?}");
        match (verb, args.as_slice()) {
            ("reset", []) => {
                self.ctl.reset();
                "ok".to_string()
            }
            ("step", []) => self.step(),
            ("run", []) => {
                self.ctl.run(None);
                "ok".to_string()
            }
            ("run", [addr]) => match parse_dec_default(addr) {
                Some(addr) => {
                    self.ctl.run(Some(addr));
                    "ok".to_string()
                }
                None => INVALID.to_string(),
            },
            ("stop", []) => {
                self.ctl.stop();
                "ok".to_string()
            }
            ("break", [addr]) => match parse_hex_default(addr) {
                Some(addr) => {
                    self.ctl.set_breakpoint(Some(addr));
                    "ok".to_string()
                }
                None => INVALID.to_string(),
            },
            ("jump", [addr]) => match parse_dec_default(addr) {
                Some(addr) => {
                    self.ctl.with_cpu(|cpu| cpu.regs.pc = addr);
                    "ok".to_string()
                }
                None => INVALID.to_string(),
            },
            ("set", [addr, val]) => self.poke(addr, val),
            ("get", [addr]) => match parse_dec_default(addr) {
                Some(addr) => {
                    let val = self.ctl.with_cpu(|cpu| cpu.bus.read(addr, true));
                    format!("{addr} : {val}")
                }
                None => INVALID.to_string(),
            },
            ("save", [file]) => self.save(file, 0x0000, 0xFFFF),
            ("save", [file, start, end]) => {
                match (parse_dec_default(start), parse_dec_default(end)) {
                    (Some(start), Some(end)) if start <= end => self.save(file, start, end),
                    _ => INVALID.to_string(),
                }
            }
            ("load", [file]) => self.load(file, 0),
            ("load", [file, start]) => match parse_dec_default(start) {
                Some(start) => self.load(file, start),
                None => INVALID.to_string(),
            },
            ("delay", [seconds]) => match seconds.parse::<f64>() {
                Ok(secs) if secs >= 0.0 && secs.is_finite() => {
                    self.ctl.set_delay(Duration::from_secs_f64(secs));
                    "ok".to_string()
                }
                _ => INVALID.to_string(),
            },
            ("int", []) => {
                if self.ctl.inject_interrupt() {
                    "ok".to_string()
                } else {
                    "CPU not on WAI opcode".to_string()
                }
            }
            ("log", [toggle]) => self.toggle_trace(toggle),
            ("list_regs", []) => self.ctl.with_cpu(|cpu| cpu.regs.dump()),
            ("get_opcodes", rest) => match self.instruction_addr(rest) {
                Some(addr) => self
                    .ctl
                    .with_cpu(|cpu| disasm::opcode_bytes(&mut cpu.bus, addr)),
                None => INVALID.to_string(),
            },
            ("list_cmd", rest) => match self.instruction_addr(rest) {
                Some(addr) => self
                    .ctl
                    .with_cpu(|cpu| disasm::disassemble(&cpu.regs, &mut cpu.bus, addr)),
                None => INVALID.to_string(),
            },
            ("list_mem", [start, len]) => {
                match (parse_dec_default(start), parse_dec_default(len)) {
                    (Some(start), Some(len)) => self.list_mem(start, len),
                    _ => INVALID.to_string(),
                }
            }
            ("get_mem", [start, len]) => {
                match (parse_dec_default(start), parse_dec_default(len)) {
                    (Some(start), Some(len)) => self.get_mem(start, len),
                    _ => INVALID.to_string(),
                }
            }
            _ => INVALID.to_string(),
        }
    }

    fn step(&mut self) -> String {
        if self.ctl.state() == RunState::Running {
            return "CPU is running".to_string();
        }
        match self.ctl.step() {
            Ok(_) => self
                .ctl
                .with_cpu(|cpu| disasm::disassemble(&cpu.regs, &mut cpu.bus, cpu.regs.pc)),
            Err(err) => err.to_string(),
        }
    }

    fn poke(&mut self, addr: &str, val: &str) -> String {
        let (Some(addr), Ok(val)) = (parse_dec_default(addr), val.parse::<u8>()) else {
            return INVALID.to_string();
        };
        match self.ctl.with_cpu(|cpu| cpu.bus.write(addr, val)) {
            Ok(()) => format!("{addr} : {val}"),
            Err(err) => err.to_string(),
        }
    }

    fn save(&mut self, file: &str, start: u16, end: u16) -> String {
        let path = PathBuf::from(file);
        match self
            .ctl
            .with_cpu(|cpu| loader::save_raw(&cpu.bus, &path, start, end))
        {
            Ok(()) => "saved".to_string(),
            Err(err) => err.to_string(),
        }
    }

    fn load(&mut self, file: &str, start: u16) -> String {
        let path = PathBuf::from(file);
        match self
            .ctl
            .with_cpu(|cpu| loader::load_file(&mut cpu.bus, &path, start))
        {
            Ok(()) => "loaded".to_string(),
            Err(err) => err.to_string(),
        }
    }

    fn toggle_trace(&mut self, toggle: &str) -> String {
        match toggle {
            "on" | "1" => match OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.trace_path)
            {
                Ok(file) => {
                    self.ctl.set_trace(Some(file));
                    "ok".to_string()
                }
                Err(err) => err.to_string(),
            },
            "off" | "0" => {
                self.ctl.set_trace(None);
                "ok".to_string()
            }
            _ => INVALID.to_string(),
        }
    }

    /// Optional instruction address argument: `d`-prefixed decimal or
    /// hex, defaulting to the live PC.
    fn instruction_addr(&mut self, args: &[&str]) -> Option<u16> {
        match args {
            [] => Some(self.ctl.with_cpu(|cpu| cpu.regs.pc)),
            [addr] => parse_hex_default(addr),
            _ => None,
        }
    }

    fn list_mem(&mut self, start: u16, len: u16) -> String {
        self.ctl.with_cpu(|cpu| {
            let mut rows = Vec::new();
            for row in 0..len / 8 {
                let base = start.wrapping_add(row * 8);
                let bytes: Vec<String> = (0..8)
                    .map(|i| format!("{:02X}", cpu.bus.read(base.wrapping_add(i), true)))
                    .collect();
                rows.push(format!("{base:04X}: {}", bytes.join(" ")));
            }
            rows.join("/r/n")
        })
    }

    fn get_mem(&mut self, start: u16, len: u16) -> String {
        self.ctl.with_cpu(|cpu| {
            let bytes: Vec<String> = (0..len)
                .map(|i| format!("{:02X}", cpu.bus.read(start.wrapping_add(i), true)))
                .collect();
            bytes.join(" ")
        })
    }
}

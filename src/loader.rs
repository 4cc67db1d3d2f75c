//! Program Image Loading and Saving
//!
//! Three image formats, chosen by file extension:
//!
//! - `.mem` — raw binary, loaded at a caller-supplied start address
//! - `.hex` — Intel HEX; only type-00 (data) records are applied
//! - anything else — Motorola S-records; only `S1` records are applied
//!
//! Record addresses come from the file for the hex formats; blank lines
//! and `//` comments are skipped in both. Loads write straight into RAM,
//! bypassing devices and write protection, the same injection path the
//! debugger's `set` command uses. Checksums are not verified.

use std::fs;
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::bus::MemoryBus;

/// Errors raised while loading or saving an image.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// A record that could not be parsed.
    #[error("bad record on line {line}: {reason}")]
    BadRecord { line: usize, reason: &'static str },
}

/// Loads an image file into RAM. `start` positions raw `.mem` images and
/// is ignored for the self-addressing hex formats.
pub fn load_file(bus: &mut MemoryBus, path: &Path, start: u16) -> Result<(), LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "mem" => {
            let bytes = fs::read(path)?;
            bus.load(start, &bytes);
            info!("loaded {} raw bytes at 0x{start:04X}", bytes.len());
        }
        "hex" => apply_ihex(bus, &fs::read_to_string(path)?)?,
        _ => apply_s19(bus, &fs::read_to_string(path)?)?,
    }
    Ok(())
}

/// Saves the inclusive RAM range `[start, end]` as a raw binary image.
pub fn save_raw(bus: &MemoryBus, path: &Path, start: u16, end: u16) -> Result<(), LoadError> {
    let ram = bus.ram();
    fs::write(path, &ram[usize::from(start)..=usize::from(end)])?;
    info!("saved 0x{start:04X}..=0x{end:04X} to {}", path.display());
    Ok(())
}

/// Applies the type-00 records of an Intel HEX image.
pub fn apply_ihex(bus: &mut MemoryBus, text: &str) -> Result<(), LoadError> {
    for (line, number) in records(text) {
        let line = line
            .strip_prefix(':')
            .ok_or(LoadError::BadRecord {
                line: number,
                reason: "missing ':' start code",
            })?;
        if line.len() < 10 {
            return Err(LoadError::BadRecord {
                line: number,
                reason: "record too short",
            });
        }
        let count = hex_field(line, 0, 2, number)?;
        let addr = hex_field(line, 2, 6, number)? as u16;
        let kind = hex_field(line, 6, 8, number)?;
        if kind != 0x00 {
            continue;
        }
        let data = data_bytes(line, 8, count as usize, number)?;
        bus.load(addr, &data);
    }
    Ok(())
}

/// Applies the `S1` records of a Motorola S-record image.
pub fn apply_s19(bus: &mut MemoryBus, text: &str) -> Result<(), LoadError> {
    for (line, number) in records(text) {
        if !line.starts_with('S') {
            return Err(LoadError::BadRecord {
                line: number,
                reason: "missing 'S' start code",
            });
        }
        if !line.starts_with("S1") {
            // header, count and termination records carry no image data
            continue;
        }
        if line.len() < 8 {
            return Err(LoadError::BadRecord {
                line: number,
                reason: "record too short",
            });
        }
        let count = hex_field(line, 2, 4, number)?;
        let addr = hex_field(line, 4, 8, number)? as u16;
        // count covers address (2) and checksum (1)
        let len = (count as usize).saturating_sub(3);
        let data = data_bytes(line, 8, len, number)?;
        bus.load(addr, &data);
    }
    Ok(())
}

/// Non-empty, non-comment lines paired with their 1-based line numbers.
fn records(text: &str) -> impl Iterator<Item = (&str, usize)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (l.trim(), i + 1))
        .filter(|(l, _)| !l.is_empty() && !l.starts_with("//"))
}

fn hex_field(line: &str, from: usize, to: usize, number: usize) -> Result<u32, LoadError> {
    let field = line.get(from..to).ok_or(LoadError::BadRecord {
        line: number,
        reason: "record too short",
    })?;
    u32::from_str_radix(field, 16).map_err(|_| LoadError::BadRecord {
        line: number,
        reason: "invalid hex digit",
    })
}

fn data_bytes(
    line: &str,
    from: usize,
    count: usize,
    number: usize,
) -> Result<Vec<u8>, LoadError> {
    let mut data = Vec::with_capacity(count);
    for i in 0..count {
        let at = from + 2 * i;
        data.push(hex_field(line, at, at + 2, number)? as u8);
    }
    Ok(data)
}

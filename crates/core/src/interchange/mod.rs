//! Stage-crossing file formats.
//!
//! - Address files (seed list, block list): one decimal integer per line,
//!   blank lines ignored.
//! - Name map: `<primary> <secondary> <symbol name>` per line, space separated.
//! - Code image: raw section bytes, no header.
//!
//! Writers emit one entry per line with a trailing newline; readers reject any
//! line they cannot parse with [`PipelineError::MalformedIntermediateFile`].

mod layout;

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub use layout::{RecoveryLayout, WorkspaceLayout};

use crate::error::PipelineError;
use crate::model::{AddressDescriptor, NameMap};

/// Make `path` absolute relative to the current working directory.
///
/// Paths handed to external tools must be absolute: tools run with the run's
/// workspace as their working directory.
pub fn absolute_path(path: &Path) -> Result<PathBuf, PipelineError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd =
        env::current_dir().map_err(|e| PipelineError::io("Failed to get current directory", e))?;
    Ok(cwd.join(path))
}

/// Render addresses in the address-file format.
pub fn render_addresses(addresses: impl IntoIterator<Item = u64>) -> String {
    let mut out = String::new();
    for addr in addresses {
        let _ = writeln!(out, "{addr}");
    }
    out
}

/// Parse an address file body. `path` is only used for error reporting.
pub fn parse_addresses(body: &str, path: &Path) -> Result<Vec<u64>, PipelineError> {
    let mut out = Vec::new();
    for (idx, line) in body.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let addr = trimmed.parse::<u64>().map_err(|_| PipelineError::MalformedIntermediateFile {
            path: path.to_path_buf(),
            line: idx + 1,
            content: line.to_string(),
        })?;
        out.push(addr);
    }
    Ok(out)
}

pub fn write_addresses(
    path: &Path,
    addresses: impl IntoIterator<Item = u64>,
) -> Result<(), PipelineError> {
    fs::write(path, render_addresses(addresses))
        .map_err(|e| PipelineError::io(format!("Failed to write {}", path.display()), e))?;
    log::debug!("wrote address file {}", path.display());
    Ok(())
}

pub fn read_addresses(path: &Path) -> Result<Vec<u64>, PipelineError> {
    let body = fs::read_to_string(path)
        .map_err(|e| PipelineError::io(format!("Failed to read {}", path.display()), e))?;
    parse_addresses(&body, path)
}

/// Render a name map, one entry per line in ascending descriptor order.
pub fn render_name_map(map: &NameMap) -> String {
    let mut out = String::new();
    for (desc, name) in map.iter() {
        let _ = writeln!(out, "{} {} {}", desc.primary, desc.secondary, name);
    }
    out
}

/// Parse name-map lines. Everything after the second space is the symbol name.
pub fn parse_name_map(
    body: &str,
    path: &Path,
) -> Result<Vec<(AddressDescriptor, String)>, PipelineError> {
    let mut out = Vec::new();
    for (idx, line) in body.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let malformed = || PipelineError::MalformedIntermediateFile {
            path: path.to_path_buf(),
            line: idx + 1,
            content: line.to_string(),
        };
        let mut parts = line.splitn(3, ' ');
        let primary = parts.next().and_then(|p| p.parse::<u64>().ok()).ok_or_else(malformed)?;
        let secondary = parts.next().and_then(|p| p.parse::<u64>().ok()).ok_or_else(malformed)?;
        let name = parts.next().filter(|n| !n.is_empty()).ok_or_else(malformed)?;
        out.push((AddressDescriptor::new(primary, secondary), name.to_string()));
    }
    Ok(out)
}

pub fn write_name_map(path: &Path, map: &NameMap) -> Result<(), PipelineError> {
    fs::write(path, render_name_map(map))
        .map_err(|e| PipelineError::io(format!("Failed to write {}", path.display()), e))?;
    log::debug!("wrote {} name-map entries to {}", map.len(), path.display());
    Ok(())
}

pub fn read_name_map(path: &Path) -> Result<Vec<(AddressDescriptor, String)>, PipelineError> {
    let body = fs::read_to_string(path)
        .map_err(|e| PipelineError::io(format!("Failed to read {}", path.display()), e))?;
    parse_name_map(&body, path)
}

pub fn write_code(path: &Path, code: &[u8]) -> Result<(), PipelineError> {
    fs::write(path, code)
        .map_err(|e| PipelineError::io(format!("Failed to write {}", path.display()), e))?;
    log::debug!("wrote {} code bytes to {}", code.len(), path.display());
    Ok(())
}

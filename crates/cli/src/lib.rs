use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use uwin_lift_core::interchange;

pub mod commands;

/// Read caller-supplied seed addresses (one decimal per line, blank lines ignored).
pub fn read_extra_seeds(path: &Path) -> Result<Vec<u64>> {
    interchange::read_addresses(path)
        .with_context(|| format!("Failed to load extra seed addresses from {}", path.display()))
}

/// The output object's directory must already exist; it is not created.
pub fn check_output_path(output: &Path) -> Result<PathBuf> {
    let output = interchange::absolute_path(output)?;
    match output.parent() {
        Some(dir) if dir.is_dir() => Ok(output),
        Some(dir) => Err(anyhow!("Output directory {} does not exist", dir.display())),
        None => Err(anyhow!("Invalid output path {}", output.display())),
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use goblin::pe::PE;

use crate::error::PipelineError;
use crate::interchange;
use crate::model::{AddressDescriptor, DebugSymbolTable};

/// Recovers a debug symbol table for a parsed image.
///
/// Implementations for proprietary debug formats live outside this crate and
/// plug in here.
pub trait DebugInfoSource {
    fn symbols(&self, pe: &PE<'_>, image_path: &Path) -> Result<DebugSymbolTable, PipelineError>;
    fn name(&self) -> &'static str;
}

/// Symbols from the PE export directory, located at `(image_base + rva, 0)`.
/// Forwarded exports are skipped.
pub struct ExportSymbols;

impl DebugInfoSource for ExportSymbols {
    fn symbols(&self, pe: &PE<'_>, _image_path: &Path) -> Result<DebugSymbolTable, PipelineError> {
        let image_base = pe.image_base as u64;
        let mut table = DebugSymbolTable::new();
        for export in &pe.exports {
            let Some(name) = export.name.filter(|n| !n.is_empty()) else { continue };
            // Forwarders point at a string in another DLL, not at code in this image.
            if export.rva == 0 || export.reexport.is_some() {
                continue;
            }
            let address = image_base.saturating_add(export.rva as u64);
            table.insert(name, AddressDescriptor::new(address, 0));
        }
        Ok(table)
    }

    fn name(&self) -> &'static str {
        "exports"
    }
}

/// Symbols listed in a sidecar file using the name-map line format.
pub struct SymbolMapFile {
    pub path: PathBuf,
}

impl SymbolMapFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DebugInfoSource for SymbolMapFile {
    fn symbols(&self, _pe: &PE<'_>, _image_path: &Path) -> Result<DebugSymbolTable, PipelineError> {
        let body = fs::read_to_string(&self.path).map_err(|e| {
            PipelineError::io(format!("Failed to read symbol map {}", self.path.display()), e)
        })?;
        let mut table = DebugSymbolTable::new();
        for (desc, name) in interchange::parse_name_map(&body, &self.path)? {
            if let Some(previous) = table.insert(name.clone(), desc) {
                log::warn!("symbol '{name}' listed twice; {previous} replaced by {desc}");
            }
        }
        Ok(table)
    }

    fn name(&self) -> &'static str {
        "symbol-map"
    }
}

/// Merge several sources. On duplicate names the earlier source wins.
#[derive(Default)]
pub struct ChainedSources {
    sources: Vec<Box<dyn DebugInfoSource>>,
}

impl ChainedSources {
    pub fn new() -> Self {
        Self { sources: Vec::new() }
    }

    pub fn push<S: DebugInfoSource + 'static>(&mut self, source: S) -> &mut Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Registered source names in lookup order.
    pub fn names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }
}

impl DebugInfoSource for ChainedSources {
    fn symbols(&self, pe: &PE<'_>, image_path: &Path) -> Result<DebugSymbolTable, PipelineError> {
        let mut merged = DebugSymbolTable::new();
        for source in &self.sources {
            let table = source.symbols(pe, image_path)?;
            log::debug!("{} debug symbols from {}", table.len(), source.name());
            for (name, desc) in table.iter() {
                if !merged.contains(name) {
                    merged.insert(name, desc);
                }
            }
        }
        Ok(merged)
    }

    fn name(&self) -> &'static str {
        "chained"
    }
}

//! Image extraction: isolate the code section of a PE executable and recover its debug symbols.

mod symbols;

use std::fs;
use std::path::Path;

use goblin::pe::section_table::{SectionTable, IMAGE_SCN_MEM_EXECUTE};
use goblin::pe::PE;

pub use symbols::{ChainedSources, DebugInfoSource, ExportSymbols, SymbolMapFile};

use crate::error::PipelineError;
use crate::model::{DebugSymbolTable, ExecutableImage};

/// Canonical name of the code section.
pub const CODE_SECTION_NAME: &str = ".text";

/// Whether a section qualifies as the code section.
///
/// A section matches when it is named `.text` OR carries the executable
/// characteristic. Either discriminator alone is enough, so an image with a
/// `.text` section plus a separate executable section has two matches and is
/// rejected rather than guessed at.
pub fn is_code_section(section: &SectionTable) -> bool {
    let named_text = section.name().map(|n| n == CODE_SECTION_NAME).unwrap_or(false);
    named_text || section.characteristics & IMAGE_SCN_MEM_EXECUTE != 0
}

/// Pick the single code section out of a parsed image.
pub fn resolve_code_section<'a>(pe: &'a PE<'_>) -> Result<&'a SectionTable, PipelineError> {
    let matches: Vec<&SectionTable> = pe.sections.iter().filter(|s| is_code_section(s)).collect();
    match matches.as_slice() {
        [only] => Ok(*only),
        _ => Err(PipelineError::SectionResolution { matches: matches.len() }),
    }
}

/// Load address and raw bytes of the code section from already-read image bytes.
pub fn extract_code(pe: &PE<'_>, bytes: &[u8]) -> Result<ExecutableImage, PipelineError> {
    let section = resolve_code_section(pe)?;
    let load_address = (pe.image_base as u64).saturating_add(section.virtual_address as u64);

    let start = section.pointer_to_raw_data as usize;
    let end = start.saturating_add(section.size_of_raw_data as usize);
    let code = bytes.get(start..end).ok_or_else(|| {
        PipelineError::Image(format!(
            "code section raw data 0x{start:X}..0x{end:X} lies outside the {}-byte file",
            bytes.len()
        ))
    })?;

    Ok(ExecutableImage::new(load_address, code.to_vec()))
}

/// Read `image_path`, extract its code section and ask `debug` for its symbol table.
pub fn extract(
    image_path: &Path,
    debug: &dyn DebugInfoSource,
) -> Result<(ExecutableImage, DebugSymbolTable), PipelineError> {
    let bytes = fs::read(image_path).map_err(|e| {
        PipelineError::io(format!("Failed to read executable {}", image_path.display()), e)
    })?;
    let pe = PE::parse(&bytes).map_err(|e| PipelineError::Image(e.to_string()))?;

    let image = extract_code(&pe, &bytes)?;
    let symbols = debug.symbols(&pe, image_path)?;
    log::info!(
        "code section at 0x{:X} ({} bytes), {} debug symbols from {}",
        image.load_address,
        image.code.len(),
        symbols.len(),
        debug.name()
    );
    Ok((image, symbols))
}

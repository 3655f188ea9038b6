use std::path::Path;

use crate::error::PipelineError;
use crate::interchange::{self, RecoveryLayout};
use crate::model::{BlockAddressList, ExecutableImage, SeedAddressSet};
use crate::services::engines::{DisassemblyEngine, RecoverRequest};

/// Run control-flow recovery and normalize the engine's block list.
///
/// Seeds are written to a scratch directory created under `scratch_parent`
/// and removed when this returns. The engine's emission order is not trusted:
/// the result is sorted ascending with duplicates removed.
pub fn recover_blocks(
    engine: &dyn DisassemblyEngine,
    image_path: &Path,
    image: &ExecutableImage,
    seeds: &SeedAddressSet,
    scratch_parent: &Path,
) -> Result<BlockAddressList, PipelineError> {
    let scratch = tempfile::Builder::new()
        .prefix("recover-")
        .tempdir_in(scratch_parent)
        .map_err(|e| PipelineError::io("Failed to create recovery directory", e))?;
    let layout = RecoveryLayout::new(scratch.path());

    interchange::write_addresses(&layout.seeds_path, seeds.iter())?;

    let request = RecoverRequest {
        image_path: image_path.to_path_buf(),
        load_address: image.load_address,
        seeds_path: layout.seeds_path.clone(),
        result_path: layout.result_path.clone(),
        work_dir: layout.root.clone(),
    };
    engine.recover(&request)?;

    let raw = interchange::read_addresses(&layout.result_path)?;
    let emitted = raw.len();
    let blocks = BlockAddressList::from_unordered(raw);

    let outside = blocks
        .iter()
        .filter(|a| *a < image.load_address || *a >= image.end_address())
        .count();
    if outside > 0 {
        log::debug!("{outside} block addresses lie outside the code section");
    }
    log::info!(
        "{} recovered {} basic blocks ({} lines emitted) from {} seeds",
        engine.name(),
        blocks.len(),
        emitted,
        seeds.len()
    );
    Ok(blocks)
}

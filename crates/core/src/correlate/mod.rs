//! Address correlation: seed addresses and the name map, derived from debug symbols.
//!
//! Everything here is pure; no I/O happens in this module.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::model::{DebugSymbolTable, NameMap, SeedAddressSet};

/// What to do when two debug symbols share one address descriptor.
///
/// "First" and "last" refer to ascending symbol-name order, which is the
/// iteration order of [`DebugSymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Fail with [`PipelineError::NameCollision`].
    Reject,
    #[default]
    KeepFirst,
    KeepLast,
}

/// Seed set and name map for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    pub seeds: SeedAddressSet,
    pub name_map: NameMap,
}

/// Union of every symbol's primary component and the caller-supplied seeds.
pub fn seed_addresses(
    symbols: &DebugSymbolTable,
    extra: impl IntoIterator<Item = u64>,
) -> SeedAddressSet {
    let mut seeds: SeedAddressSet = symbols.iter().map(|(_, desc)| desc.primary).collect();
    seeds.extend(extra);
    seeds
}

/// Invert the symbol table, resolving shared descriptors with `policy`.
pub fn name_map(
    symbols: &DebugSymbolTable,
    policy: CollisionPolicy,
) -> Result<NameMap, PipelineError> {
    let mut map = NameMap::new();
    for (name, desc) in symbols.iter() {
        match map.get(&desc) {
            None => {
                map.insert(desc, name);
            }
            Some(existing) => match policy {
                CollisionPolicy::Reject => {
                    return Err(PipelineError::NameCollision {
                        descriptor: desc,
                        kept: existing.to_string(),
                        rejected: name.to_string(),
                    });
                }
                CollisionPolicy::KeepFirst => {
                    log::debug!("dropping '{name}': {desc} already named '{existing}'");
                }
                CollisionPolicy::KeepLast => {
                    log::debug!("renaming {desc} from '{existing}' to '{name}'");
                    map.insert(desc, name);
                }
            },
        }
    }
    Ok(map)
}

/// Build both halves of the correlation in one pass over the inputs.
pub fn correlate(
    symbols: &DebugSymbolTable,
    extra_seeds: &[u64],
    policy: CollisionPolicy,
) -> Result<Correlation, PipelineError> {
    Ok(Correlation {
        seeds: seed_addresses(symbols, extra_seeds.iter().copied()),
        name_map: name_map(symbols, policy)?,
    })
}

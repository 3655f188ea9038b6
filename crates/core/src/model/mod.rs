//! Core data model shared by every pipeline stage.
//!
//! Addresses are absolute virtual addresses (image base already applied).
//! Ordered collections are used throughout so that interchange files come out
//! byte-identical for identical inputs.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Code section of an executable together with the address it is loaded at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableImage {
    /// Image base plus the section's virtual address.
    pub load_address: u64,
    /// Raw section bytes, exactly `SizeOfRawData` long.
    pub code: Vec<u8>,
}

impl ExecutableImage {
    pub fn new(load_address: u64, code: Vec<u8>) -> Self {
        Self { load_address, code }
    }

    /// One past the last address covered by the code bytes.
    pub fn end_address(&self) -> u64 {
        self.load_address.saturating_add(self.code.len() as u64)
    }
}

/// Two-component locator for a symbol (historically segment and offset).
///
/// The primary component is the one used as a seed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AddressDescriptor {
    pub primary: u64,
    pub secondary: u64,
}

impl AddressDescriptor {
    pub fn new(primary: u64, secondary: u64) -> Self {
        Self { primary, secondary }
    }
}

impl fmt::Display for AddressDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(0x{:X}, {})", self.primary, self.secondary)
    }
}

/// Symbol name -> address descriptor, as recovered from debug information.
///
/// Names are unique; iteration is in ascending name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugSymbolTable {
    symbols: BTreeMap<String, AddressDescriptor>,
}

impl DebugSymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol, returning the descriptor it previously mapped to.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        descriptor: AddressDescriptor,
    ) -> Option<AddressDescriptor> {
        self.symbols.insert(name.into(), descriptor)
    }

    pub fn get(&self, name: &str) -> Option<AddressDescriptor> {
        self.symbols.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AddressDescriptor)> {
        self.symbols.iter().map(|(name, desc)| (name.as_str(), *desc))
    }
}

impl<S: Into<String>> FromIterator<(S, AddressDescriptor)> for DebugSymbolTable {
    fn from_iter<T: IntoIterator<Item = (S, AddressDescriptor)>>(iter: T) -> Self {
        let mut table = DebugSymbolTable::new();
        for (name, desc) in iter {
            table.insert(name, desc);
        }
        table
    }
}

/// Addresses handed to control-flow recovery as known entry points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedAddressSet {
    addresses: BTreeSet<u64>,
}

impl SeedAddressSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the address was already present.
    pub fn insert(&mut self, address: u64) -> bool {
        self.addresses.insert(address)
    }

    pub fn extend(&mut self, addresses: impl IntoIterator<Item = u64>) {
        self.addresses.extend(addresses);
    }

    pub fn contains(&self, address: u64) -> bool {
        self.addresses.contains(&address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Ascending iteration.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.addresses.iter().copied()
    }
}

impl FromIterator<u64> for SeedAddressSet {
    fn from_iter<T: IntoIterator<Item = u64>>(iter: T) -> Self {
        Self { addresses: iter.into_iter().collect() }
    }
}

/// Address descriptor -> symbol name, the inverse of a [`DebugSymbolTable`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMap {
    entries: BTreeMap<AddressDescriptor, String>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, descriptor: AddressDescriptor, name: impl Into<String>) -> Option<String> {
        self.entries.insert(descriptor, name.into())
    }

    pub fn get(&self, descriptor: &AddressDescriptor) -> Option<&str> {
        self.entries.get(descriptor).map(String::as_str)
    }

    pub fn contains(&self, descriptor: &AddressDescriptor) -> bool {
        self.entries.contains_key(descriptor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iteration in ascending descriptor order.
    pub fn iter(&self) -> impl Iterator<Item = (AddressDescriptor, &str)> {
        self.entries.iter().map(|(desc, name)| (*desc, name.as_str()))
    }
}

/// Basic-block start addresses, strictly ascending with no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAddressList {
    addresses: Vec<u64>,
}

impl BlockAddressList {
    /// Normalize addresses in whatever order an engine emitted them.
    pub fn from_unordered(addresses: impl IntoIterator<Item = u64>) -> Self {
        let mut addresses: Vec<u64> = addresses.into_iter().collect();
        addresses.sort_unstable();
        addresses.dedup();
        Self { addresses }
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.addresses.iter().copied()
    }
}

use std::path::{Path, PathBuf};

/// File names of the interchange artifacts inside one run's workspace.
///
/// Like the rest of the layout types, this does *not* touch the filesystem.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    /// Root of the run's temporary workspace.
    pub root: PathBuf,
    /// Raw code-section bytes handed to the lifter.
    pub code_path: PathBuf,
    /// Recovered basic-block addresses handed to the lifter.
    pub blocks_path: PathBuf,
    /// Address descriptor -> name entries handed to the lifter.
    pub name_map_path: PathBuf,
    /// IR module written by the lifter and consumed by the compiler.
    pub ir_path: PathBuf,
    /// Scratch directory for control-flow recovery (seed file, engine project).
    pub recovery_dir: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            code_path: root.join("code.bin"),
            blocks_path: root.join("bbs.txt"),
            name_map_path: root.join("nm.txt"),
            ir_path: root.join("ir_out.ll"),
            recovery_dir: root.join("recovery"),
            root,
        }
    }
}

/// Paths used by a single control-flow recovery invocation.
#[derive(Debug, Clone)]
pub struct RecoveryLayout {
    pub root: PathBuf,
    /// Seed addresses written for the engine.
    pub seeds_path: PathBuf,
    /// Block addresses written by the engine.
    pub result_path: PathBuf,
}

impl RecoveryLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self { seeds_path: root.join("extra_code.txt"), result_path: root.join("bbs.txt"), root }
    }
}

//! Tool and resource locations.
//!
//! Each location is resolved from, in order: an explicit JSON config file,
//! an environment variable, and a default relative to the installation
//! package directory. The Ghidra root has no default.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

pub const ENV_GHIDRA: &str = "GHIDRA";
pub const ENV_GHIDRA_SCRIPTS: &str = "UWIN_GHIDRA_SCRIPTS";
pub const ENV_LIFT: &str = "UWIN_LIFT_PATH";
pub const ENV_CLANG: &str = "UWIN_CLANG_PATH";
pub const ENV_SEMANTICS: &str = "UWIN_SEMANTICS_DIR";
pub const ENV_INTRINSICS: &str = "UWIN_INTRINSICS_PATH";
pub const ENV_PKG_DIR: &str = "UWIN_PKG_DIR";

/// Name of the post-analysis script expected in the Ghidra script directory.
pub const BLOCK_SCRIPT_NAME: &str = "GetBBS.java";

/// Optional overrides as read from a JSON config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ghidra_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ghidra_script_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lift_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clang_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantics_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intrinsics_path: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let body = fs::read_to_string(path).map_err(|e| {
            PipelineError::Configuration(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&body).map_err(|e| {
            PipelineError::Configuration(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }
}

/// Fully resolved tool and resource locations for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Ghidra installation root (contains `support/analyzeHeadless`).
    pub ghidra_dir: PathBuf,
    /// Directory holding the block-export post-script.
    pub ghidra_script_dir: PathBuf,
    /// The uwin-lift binary translator.
    pub lift_path: PathBuf,
    /// The native compiler used to recompile lifted IR.
    pub clang_path: PathBuf,
    /// Instruction semantics search path for the translator.
    pub semantics_dir: PathBuf,
    /// Intrinsics bitcode linked into every lifted module.
    pub intrinsics_path: PathBuf,
}

impl ToolConfig {
    /// Resolve locations from `file`, then the process environment, then `pkg_dir` defaults.
    pub fn resolve(file: Option<ConfigFile>, pkg_dir: Option<&Path>) -> Result<Self, PipelineError> {
        Self::resolve_with(file, pkg_dir, |key| env::var_os(key).map(PathBuf::from))
    }

    /// Same as [`ToolConfig::resolve`] with an injectable environment lookup.
    pub fn resolve_with(
        file: Option<ConfigFile>,
        pkg_dir: Option<&Path>,
        lookup: impl Fn(&str) -> Option<PathBuf>,
    ) -> Result<Self, PipelineError> {
        let file = file.unwrap_or_default();
        let pkg_dir = pkg_dir.map(Path::to_path_buf).or_else(|| lookup(ENV_PKG_DIR));

        let pick = |from_file: Option<PathBuf>, key: &str, default: &[&str]| {
            from_file.or_else(|| lookup(key)).or_else(|| {
                pkg_dir.as_ref().map(|dir| default.iter().fold(dir.clone(), |p, c| p.join(c)))
            })
        };
        let missing = |what: &str, key: &str| {
            PipelineError::Configuration(format!(
                "{what} location is not configured; set {key} or add it to the config file"
            ))
        };

        let ghidra_dir = file
            .ghidra_dir
            .or_else(|| lookup(ENV_GHIDRA))
            .ok_or_else(|| missing("Ghidra", ENV_GHIDRA))?;

        Ok(Self {
            ghidra_dir,
            ghidra_script_dir: pick(
                file.ghidra_script_dir,
                ENV_GHIDRA_SCRIPTS,
                &["share", "uwin", "ghidra_scripts"],
            )
            .ok_or_else(|| missing("Ghidra script directory", ENV_GHIDRA_SCRIPTS))?,
            lift_path: pick(file.lift_path, ENV_LIFT, &["bin", "uwin-lift"])
                .ok_or_else(|| missing("uwin-lift", ENV_LIFT))?,
            clang_path: pick(file.clang_path, ENV_CLANG, &["bin", "remill-clang"])
                .ok_or_else(|| missing("Compiler", ENV_CLANG))?,
            semantics_dir: pick(file.semantics_dir, ENV_SEMANTICS, &["share", "remill", "semantics"])
                .ok_or_else(|| missing("Semantics directory", ENV_SEMANTICS))?,
            intrinsics_path: pick(
                file.intrinsics_path,
                ENV_INTRINSICS,
                &["share", "uwin", "intrinsics.bc"],
            )
            .ok_or_else(|| missing("Intrinsics bitcode", ENV_INTRINSICS))?,
        })
    }

    /// Path of Ghidra's headless analyzer under the configured root.
    pub fn analyze_headless(&self) -> PathBuf {
        let name = if cfg!(windows) { "analyzeHeadless.bat" } else { "analyzeHeadless" };
        self.ghidra_dir.join("support").join(name)
    }

    pub fn block_script(&self) -> PathBuf {
        self.ghidra_script_dir.join(BLOCK_SCRIPT_NAME)
    }

    /// Check every configured location exists. Runs before any stage.
    pub fn validate(&self) -> Result<(), PipelineError> {
        require_file(&self.analyze_headless(), "analyzeHeadless")?;
        require_file(&self.block_script(), BLOCK_SCRIPT_NAME)?;
        require_file(&self.lift_path, "uwin-lift")?;
        require_file(&self.clang_path, "compiler")?;
        if !self.semantics_dir.is_dir() {
            return Err(PipelineError::Configuration(format!(
                "semantics directory not found at {}",
                self.semantics_dir.display()
            )));
        }
        require_file(&self.intrinsics_path, "intrinsics bitcode")
    }
}

fn require_file(path: &Path, name: &str) -> Result<(), PipelineError> {
    if !path.is_file() {
        return Err(PipelineError::Configuration(format!("{} not found at {}", name, path.display())));
    }
    Ok(())
}

/// Installation package directory inferred from the running executable (`<pkg>/bin/<exe>`).
pub fn package_dir_from_exe() -> Option<PathBuf> {
    env::current_exe().ok()?.parent()?.parent().map(Path::to_path_buf)
}

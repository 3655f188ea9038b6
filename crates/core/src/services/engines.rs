use std::path::PathBuf;
use std::process::Command;

use crate::error::PipelineError;

/// Inputs for one control-flow recovery run.
#[derive(Debug, Clone)]
pub struct RecoverRequest {
    /// Original executable, imported by the engine with its own loader.
    pub image_path: PathBuf,
    /// Absolute address of the first code byte.
    pub load_address: u64,
    /// Seed addresses in the address-file format.
    pub seeds_path: PathBuf,
    /// Where the engine must write block addresses (address-file format).
    pub result_path: PathBuf,
    /// Scratch directory owned by this invocation.
    pub work_dir: PathBuf,
}

/// Inputs for one lifting run.
#[derive(Debug, Clone)]
pub struct LiftRequest {
    pub code_path: PathBuf,
    pub load_address: u64,
    pub blocks_path: PathBuf,
    pub name_map_path: PathBuf,
    /// Where the IR module must be written.
    pub ir_path: PathBuf,
}

/// Inputs for one recompilation run.
#[derive(Debug, Clone)]
pub struct RecompileRequest {
    pub ir_path: PathBuf,
    /// Final relocatable object; absolute.
    pub object_path: PathBuf,
}

/// Disassembly engine: discovers basic blocks, writing them to `result_path`.
pub trait DisassemblyEngine {
    fn recover(&self, request: &RecoverRequest) -> Result<(), PipelineError>;
    fn name(&self) -> &'static str;
}

/// Binary translator: turns code bytes plus block hints into an IR module.
pub trait Lifter {
    fn lift(&self, request: &LiftRequest) -> Result<PathBuf, PipelineError>;
    fn name(&self) -> &'static str;
}

/// Native compiler: turns an IR module into a relocatable object.
pub trait Recompiler {
    fn recompile(&self, request: &RecompileRequest) -> Result<PathBuf, PipelineError>;
    fn name(&self) -> &'static str;
}

/// Run `command` to completion and return its combined output.
///
/// Blocks until the process exits; there is no timeout. The combined log is
/// stdout followed by stderr. Spawn failures and nonzero exits become
/// [`PipelineError::ExternalTool`] carrying whatever was captured.
pub fn run_captured(tool: &str, mut command: Command) -> Result<String, PipelineError> {
    log::debug!("running {tool}: {command:?}");
    let output = command.output().map_err(|e| PipelineError::ExternalTool {
        tool: tool.to_string(),
        status: "failed to spawn".to_string(),
        log: e.to_string(),
    })?;

    let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
    log.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        log::error!("{tool} exited with {}", output.status);
        return Err(PipelineError::ExternalTool {
            tool: tool.to_string(),
            status: output.status.to_string(),
            log,
        });
    }
    Ok(log)
}

/// Fail with the tool's log when it exited zero but did not produce `path`.
pub(crate) fn require_artifact(tool: &str, path: PathBuf, log: String) -> Result<PathBuf, PipelineError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(PipelineError::ExternalTool {
            tool: tool.to_string(),
            status: format!("exited successfully but produced no {}", path.display()),
            log,
        })
    }
}

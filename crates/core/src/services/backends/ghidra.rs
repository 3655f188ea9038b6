use std::path::PathBuf;
use std::process::Command;

use crate::config::{ToolConfig, BLOCK_SCRIPT_NAME};
use crate::error::PipelineError;
use crate::services::engines::{require_artifact, run_captured, DisassemblyEngine, RecoverRequest};

/// Ghidra headless analyzer running the block-export post-script.
///
/// The project is created inside the request's work directory and deleted by
/// Ghidra after the script runs.
pub struct GhidraHeadless {
    pub headless: PathBuf,
    pub script_dir: PathBuf,
}

impl GhidraHeadless {
    pub fn from_config(config: &ToolConfig) -> Self {
        Self { headless: config.analyze_headless(), script_dir: config.ghidra_script_dir.clone() }
    }

    pub fn command(&self, request: &RecoverRequest) -> Command {
        let mut cmd = Command::new(&self.headless);
        cmd.current_dir(&request.work_dir)
            .arg(&request.work_dir)
            .arg("uwin_project")
            .arg("-import")
            .arg(&request.image_path)
            .arg("-deleteProject")
            .arg("-postScript")
            .arg(BLOCK_SCRIPT_NAME)
            .arg(&request.result_path)
            .arg(&request.seeds_path)
            .arg("-scriptPath")
            .arg(&self.script_dir);
        cmd
    }
}

impl DisassemblyEngine for GhidraHeadless {
    fn recover(&self, request: &RecoverRequest) -> Result<(), PipelineError> {
        let log = run_captured(self.name(), self.command(request))?;
        require_artifact(self.name(), request.result_path.clone(), log).map(|_| ())
    }

    fn name(&self) -> &'static str {
        "ghidra"
    }
}

use std::path::PathBuf;
use std::process::Command;

use crate::config::ToolConfig;
use crate::error::PipelineError;
use crate::services::engines::{require_artifact, run_captured, LiftRequest, Lifter};

/// The uwin-lift binary translator.
pub struct UwinLift {
    pub lift_path: PathBuf,
    pub semantics_dir: PathBuf,
    pub intrinsics_path: PathBuf,
}

impl UwinLift {
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            lift_path: config.lift_path.clone(),
            semantics_dir: config.semantics_dir.clone(),
            intrinsics_path: config.intrinsics_path.clone(),
        }
    }

    pub fn command(&self, request: &LiftRequest) -> Command {
        let mut cmd = Command::new(&self.lift_path);
        cmd.arg("--code_filename")
            .arg(&request.code_path)
            .arg("--code_address")
            .arg(request.load_address.to_string())
            .arg("--basic_blocks_filename")
            .arg(&request.blocks_path)
            .arg("--name_map_filename")
            .arg(&request.name_map_path)
            .arg("--ir_out")
            .arg(&request.ir_path)
            .arg("--semantics_search_paths")
            .arg(&self.semantics_dir)
            .arg("--intrinsics_filename")
            .arg(&self.intrinsics_path);
        cmd
    }
}

impl Lifter for UwinLift {
    fn lift(&self, request: &LiftRequest) -> Result<PathBuf, PipelineError> {
        let log = run_captured(self.name(), self.command(request))?;
        require_artifact(self.name(), request.ir_path.clone(), log)
    }

    fn name(&self) -> &'static str {
        "uwin-lift"
    }
}

use std::path::PathBuf;
use std::process::Command;

use crate::config::ToolConfig;
use crate::error::PipelineError;
use crate::services::engines::{require_artifact, run_captured, RecompileRequest, Recompiler};

/// Optimization level used for every recompilation.
pub const OPT_LEVEL: &str = "-O3";

/// Clang build bundled with remill, emitting position-independent objects.
pub struct UwinClang {
    pub clang_path: PathBuf,
}

impl UwinClang {
    pub fn from_config(config: &ToolConfig) -> Self {
        Self { clang_path: config.clang_path.clone() }
    }

    pub fn command(&self, request: &RecompileRequest) -> Command {
        let mut cmd = Command::new(&self.clang_path);
        cmd.arg(&request.ir_path)
            .arg("-c")
            .arg(OPT_LEVEL)
            .arg("-fPIC")
            .arg("-o")
            .arg(&request.object_path);
        cmd
    }
}

impl Recompiler for UwinClang {
    fn recompile(&self, request: &RecompileRequest) -> Result<PathBuf, PipelineError> {
        let log = run_captured(self.name(), self.command(request))?;
        require_artifact(self.name(), request.object_path.clone(), log)
    }

    fn name(&self) -> &'static str {
        "uwin-clang"
    }
}

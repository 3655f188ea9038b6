use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::correlate::{self, CollisionPolicy, Correlation};
use crate::error::{PipelineError, StageFailure};
use crate::image::{self, DebugInfoSource};
use crate::interchange::{self, WorkspaceLayout};
use crate::model::{BlockAddressList, ExecutableImage};
use crate::services::engines::{
    DisassemblyEngine, LiftRequest, Lifter, RecompileRequest, Recompiler,
};
use crate::services::progress::ProgressReporter;
use crate::services::recover::recover_blocks;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extract,
    RecoverCfg,
    Serialize,
    Lift,
    Recompile,
}

impl Stage {
    pub const ALL: [Stage; 5] =
        [Stage::Extract, Stage::RecoverCfg, Stage::Serialize, Stage::Lift, Stage::Recompile];

    /// Progress text shown while the stage runs.
    pub fn description(&self) -> &'static str {
        match self {
            Stage::Extract => "extracting code and debug info",
            Stage::RecoverCfg => "recovering control flow",
            Stage::Serialize => "writing interchange files",
            Stage::Lift => "lifting",
            Stage::Recompile => "recompiling",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::RecoverCfg => "recover_cfg",
            Stage::Serialize => "serialize",
            Stage::Lift => "lift",
            Stage::Recompile => "recompile",
        };
        f.write_str(name)
    }
}

/// Position of a run in `INIT -> EXTRACT -> ... -> RECOMPILE -> DONE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Init,
    Running(Stage),
    Done,
    Failed(Stage),
}

/// What to recompile and where to put it.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub image_path: PathBuf,
    pub output_path: PathBuf,
    /// Caller-supplied seeds, merged with the debug-derived ones.
    pub extra_seeds: Vec<u64>,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub state: PipelineState,
    pub load_address: u64,
    pub code_size: usize,
    pub seed_count: usize,
    pub block_count: usize,
    pub name_map_entries: usize,
    pub object_path: PathBuf,
    pub stages_completed: Vec<Stage>,
}

/// Sequential driver for one image: extract, recover, serialize, lift, recompile.
///
/// Each run owns a fresh temporary workspace that is removed on every exit
/// path. The first failing stage aborts the run; nothing is retried.
pub struct Pipeline<'a> {
    pub debug: &'a dyn DebugInfoSource,
    pub engine: &'a dyn DisassemblyEngine,
    pub lifter: &'a dyn Lifter,
    pub recompiler: &'a dyn Recompiler,
    pub progress: &'a dyn ProgressReporter,
    pub collision_policy: CollisionPolicy,
}

impl<'a> Pipeline<'a> {
    pub fn run(&self, request: &PipelineRequest) -> Result<PipelineReport, StageFailure> {
        self.progress.state_changed(PipelineState::Init);
        let fail_early = |error: PipelineError| {
            self.progress.state_changed(PipelineState::Failed(Stage::Extract));
            StageFailure { stage: Stage::Extract, error }
        };
        // Tools run with the workspace as cwd, so caller paths must not stay relative.
        let image_path = interchange::absolute_path(&request.image_path).map_err(fail_early)?;
        let object_path = interchange::absolute_path(&request.output_path).map_err(fail_early)?;

        let workspace = tempfile::Builder::new()
            .prefix("uwin-lift-")
            .tempdir()
            .map_err(|e| fail_early(PipelineError::io("Failed to create temporary workspace", e)))?;
        let layout = WorkspaceLayout::new(workspace.path());
        log::debug!("workspace at {}", layout.root.display());

        let mut stages_completed = Vec::with_capacity(Stage::ALL.len());

        let (image, correlation) = self.stage(Stage::Extract, &mut stages_completed, || {
            let (image, symbols) = image::extract(&image_path, self.debug)?;
            let correlation =
                correlate::correlate(&symbols, &request.extra_seeds, self.collision_policy)?;
            Ok((image, correlation))
        })?;

        let blocks = self.stage(Stage::RecoverCfg, &mut stages_completed, || {
            std::fs::create_dir_all(&layout.recovery_dir).map_err(|e| {
                PipelineError::io(
                    format!("Failed to create {}", layout.recovery_dir.display()),
                    e,
                )
            })?;
            recover_blocks(
                self.engine,
                &image_path,
                &image,
                &correlation.seeds,
                &layout.recovery_dir,
            )
        })?;

        self.stage(Stage::Serialize, &mut stages_completed, || {
            serialize(&layout, &image, &blocks, &correlation)
        })?;

        let ir_path = self.stage(Stage::Lift, &mut stages_completed, || {
            self.lifter.lift(&LiftRequest {
                code_path: layout.code_path.clone(),
                load_address: image.load_address,
                blocks_path: layout.blocks_path.clone(),
                name_map_path: layout.name_map_path.clone(),
                ir_path: layout.ir_path.clone(),
            })
        })?;

        let object_path = self.stage(Stage::Recompile, &mut stages_completed, || {
            self.recompiler.recompile(&RecompileRequest { ir_path, object_path })
        })?;

        self.progress.state_changed(PipelineState::Done);
        Ok(PipelineReport {
            state: PipelineState::Done,
            load_address: image.load_address,
            code_size: image.code.len(),
            seed_count: correlation.seeds.len(),
            block_count: blocks.len(),
            name_map_entries: correlation.name_map.len(),
            object_path,
            stages_completed,
        })
    }

    fn stage<T>(
        &self,
        stage: Stage,
        completed: &mut Vec<Stage>,
        body: impl FnOnce() -> Result<T, PipelineError>,
    ) -> Result<T, StageFailure> {
        self.progress.state_changed(PipelineState::Running(stage));
        self.progress.stage_started(stage);
        let started = Instant::now();
        match body() {
            Ok(value) => {
                self.progress.stage_finished(stage, started.elapsed());
                completed.push(stage);
                Ok(value)
            }
            Err(error) => {
                self.progress.stage_failed(stage, &error);
                if let Some((tool, log)) = error.tool_log() {
                    self.progress.tool_output(tool, log);
                }
                log::error!("{stage} failed: {error}");
                self.progress.state_changed(PipelineState::Failed(stage));
                Err(StageFailure { stage, error })
            }
        }
    }
}

/// Write code bytes, block list and name map into the workspace.
pub fn serialize(
    layout: &WorkspaceLayout,
    image: &ExecutableImage,
    blocks: &BlockAddressList,
    correlation: &Correlation,
) -> Result<(), PipelineError> {
    interchange::write_code(&layout.code_path, &image.code)?;
    interchange::write_addresses(&layout.blocks_path, blocks.iter())?;
    interchange::write_name_map(&layout.name_map_path, &correlation.name_map)
}

use std::time::Duration;

use crate::error::PipelineError;
use crate::services::pipeline::{PipelineState, Stage};

/// Receives per-stage progress from the pipeline.
///
/// `tool_output` carries a failing tool's captured log and must not be
/// swallowed: quiet reporters suppress progress lines only.
pub trait ProgressReporter {
    /// Every transition of the run's state machine, from `Init` to `Done` or `Failed`.
    fn state_changed(&self, state: PipelineState) {
        log::debug!("state -> {state:?}");
    }
    fn stage_started(&self, stage: Stage);
    fn stage_finished(&self, stage: Stage, elapsed: Duration);
    fn stage_failed(&self, stage: Stage, error: &PipelineError);
    fn tool_output(&self, tool: &str, log: &str) {
        eprintln!("{tool} output:\n{log}");
    }
}

/// Progress lines on stderr.
pub struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn stage_started(&self, stage: Stage) {
        eprintln!("{}...", stage.description());
    }

    fn stage_finished(&self, stage: Stage, elapsed: Duration) {
        eprintln!("✓ {} ({:.1}s)", stage.description(), elapsed.as_secs_f64());
    }

    fn stage_failed(&self, stage: Stage, error: &PipelineError) {
        eprintln!("✗ {}: {}", stage.description(), error);
    }
}

/// No progress output; tool logs are still printed.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage_started(&self, _stage: Stage) {}
    fn stage_finished(&self, _stage: Stage, _elapsed: Duration) {}
    fn stage_failed(&self, _stage: Stage, _error: &PipelineError) {}
}

//! Engine seams, their subprocess backends, and the pipeline that sequences them.

pub mod backends;
pub mod engines;
pub mod pipeline;
pub mod progress;
pub mod recover;

pub use engines::{DisassemblyEngine, LiftRequest, Lifter, RecompileRequest, RecoverRequest, Recompiler};
pub use pipeline::{Pipeline, PipelineReport, PipelineRequest, PipelineState, Stage};
pub use progress::{ConsoleProgress, ProgressReporter, SilentProgress};

//! uwin-lift-core
//!
//! Core library for turning a native PE executable into a recompiled,
//! relocatable object that can be linked into the uwin compatibility layer.
//!
//! The heavy lifting (control-flow recovery, lifting, code generation) is done
//! by external engines. This crate owns everything around them: the data model
//! correlating addresses, names and code bytes, the interchange files passed
//! between stages, and the sequential pipeline that drives the engines.
//!
//! Keeping the orchestration here means it can be exercised with fake engines
//! and reused from multiple frontends.

pub mod config;
pub mod correlate;
pub mod error;
pub mod image;
pub mod interchange;
pub mod model;
pub mod services;

pub use error::{PipelineError, StageFailure};

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

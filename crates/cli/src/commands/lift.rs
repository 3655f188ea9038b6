use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use uwin_lift_core::config::{package_dir_from_exe, ConfigFile, ToolConfig};
use uwin_lift_core::correlate::CollisionPolicy;
use uwin_lift_core::image::{ChainedSources, ExportSymbols, SymbolMapFile};
use uwin_lift_core::services::backends::{GhidraHeadless, UwinClang, UwinLift};
use uwin_lift_core::services::{
    ConsoleProgress, Pipeline, PipelineReport, PipelineRequest, ProgressReporter, SilentProgress,
};

use crate::{check_output_path, read_extra_seeds};

/// Everything the `uwin-lift-hlp` command line can ask for.
#[derive(Debug, Clone)]
pub struct LiftOptions {
    pub image_path: PathBuf,
    pub output_path: PathBuf,
    pub extra_seeds_file: Option<PathBuf>,
    pub symbol_map: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub collision_policy: CollisionPolicy,
    pub silent: bool,
    pub json: bool,
}

/// Resolve tool locations from the config file, environment and install directory.
pub fn load_tool_config(config_file: Option<&PathBuf>) -> Result<ToolConfig> {
    let file = config_file.map(|p| ConfigFile::load(p)).transpose()?;
    let config = ToolConfig::resolve(file, package_dir_from_exe().as_deref())?;
    config.validate()?;
    log::debug!("tool configuration: {config:?}");
    Ok(config)
}

/// Convert an executable into a relocatable object at `opts.output_path`.
pub fn lift_command(opts: &LiftOptions) -> Result<PipelineReport> {
    if !opts.image_path.is_file() {
        return Err(anyhow!("Executable not found at {}", opts.image_path.display()));
    }
    let config = load_tool_config(opts.config_file.as_ref())?;
    let output_path = check_output_path(&opts.output_path)?;
    let extra_seeds = match &opts.extra_seeds_file {
        Some(path) => read_extra_seeds(path)?,
        None => Vec::new(),
    };

    let mut debug = ChainedSources::new();
    if let Some(map) = &opts.symbol_map {
        debug.push(SymbolMapFile::new(map));
    }
    debug.push(ExportSymbols);

    let engine = GhidraHeadless::from_config(&config);
    let lifter = UwinLift::from_config(&config);
    let recompiler = UwinClang::from_config(&config);
    let progress: &dyn ProgressReporter = if opts.silent { &SilentProgress } else { &ConsoleProgress };

    let pipeline = Pipeline {
        debug: &debug,
        engine: &engine,
        lifter: &lifter,
        recompiler: &recompiler,
        progress,
        collision_policy: opts.collision_policy,
    };
    let report = pipeline
        .run(&PipelineRequest {
            image_path: opts.image_path.clone(),
            output_path,
            extra_seeds,
        })
        .with_context(|| format!("Failed to lift {}", opts.image_path.display()))?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !opts.silent {
        println!(
            "✓ {} -> {} ({} blocks, {} names)",
            opts.image_path.display(),
            report.object_path.display(),
            report.block_count,
            report.name_map_entries
        );
    }
    Ok(report)
}

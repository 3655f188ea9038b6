use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use uwin_lift_core::correlate::CollisionPolicy;
use uwin_lift_hlp::commands::{lift_command, LiftOptions};

/// Convert an exe file into a lifted object file ready to link with uwin.
///
/// This CLI is a thin wrapper around `uwin-lift-core`; all substantive logic
/// lives in the library.
#[derive(Parser, Debug)]
#[command(name = "uwin-lift-hlp", version, about, long_about = None)]
struct Cli {
    /// Executable to recompile.
    image_path: PathBuf,

    /// Where to write the relocatable object.
    output_path: PathBuf,

    /// Additional code addresses to seed control-flow recovery (one decimal per line).
    #[arg(long)]
    extra_seed_addresses_file: Option<PathBuf>,

    /// Symbol file in name-map format (`<addr> <aux> <name>` per line).
    #[arg(long)]
    symbol_map: Option<PathBuf>,

    /// JSON file overriding tool locations.
    #[arg(long)]
    config: Option<PathBuf>,

    /// How to name an address claimed by several symbols.
    #[arg(long, value_enum, default_value_t = PolicyArg::KeepFirst)]
    collision_policy: PolicyArg,

    /// Suppress progress output. Failing tool logs are still printed.
    #[arg(long, default_value_t = false)]
    silent: bool,

    /// Enable debug logging.
    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    /// Print the run report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Reject,
    KeepFirst,
    KeepLast,
}

impl From<PolicyArg> for CollisionPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Reject => CollisionPolicy::Reject,
            PolicyArg::KeepFirst => CollisionPolicy::KeepFirst,
            PolicyArg::KeepLast => CollisionPolicy::KeepLast,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // warn+ by default, --verbose for debug; RUST_LOG overrides.
    let level = if cli.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_module("uwin_lift_core", level)
        .filter_module("uwin_lift_hlp", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_target(false)
        .init();

    lift_command(&LiftOptions {
        image_path: cli.image_path,
        output_path: cli.output_path,
        extra_seeds_file: cli.extra_seed_addresses_file,
        symbol_map: cli.symbol_map,
        config_file: cli.config,
        collision_policy: cli.collision_policy.into(),
        silent: cli.silent,
        json: cli.json,
    })?;
    Ok(())
}

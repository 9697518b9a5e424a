//! muck - build-script runtime helpers
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use muck::cli::{Cli, Commands};
use muck::config::{Config, ConfigManager};
use muck::error::{MuckError, MuckResult};
use muck::Context;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, config: Option<&Config>) {
    // 0 = warn, 1 = info, 2+ = debug
    let filter = match verbose {
        0 => EnvFilter::new("muck=warn"),
        1 => EnvFilter::new("muck=info"),
        _ => EnvFilter::new("muck=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    if config.is_some_and(|c| c.general.json_logs()) {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run() -> MuckResult<()> {
    let cli = Cli::parse();

    let root = match cli.project {
        Some(ref path) => path.clone(),
        None => std::env::current_dir().map_err(|e| MuckError::io("getting current directory", e))?,
    };

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::for_project(&root),
    };
    let config = config_manager.load();
    init_logging(cli.verbose, config.as_ref().ok());
    let config = config?;
    debug!("Project root: {}", root.display());

    let ctx = Context::from_config(root, &config)?;

    match cli.command {
        Commands::Vars(args) => muck::cli::commands::vars(args),
        Commands::ProductPath(args) => muck::cli::commands::product_path(args),
        Commands::Resolve(args) => muck::cli::commands::resolve(args, ctx.project()),
        Commands::Load(args) => muck::cli::commands::load(args, &ctx),
        Commands::Fetch(args) => muck::cli::commands::fetch(args, &ctx),
        Commands::CachePath(args) => muck::cli::commands::cache_path(args),
    }
}

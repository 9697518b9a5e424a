//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// muck - build-script runtime helpers
///
/// Resolves target paths, parses dependencies with the registered
/// loaders, and fetches remote resources into the project cache.
#[derive(Parser, Debug)]
#[command(name = "muck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    pub project: Option<PathBuf>,

    /// Configuration file path (defaults to .muck.toml in the project root)
    #[arg(long, global = true, env = "MUCK_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the wildcard values a script's output path binds
    Vars(VarsArgs),

    /// Print the product path for a target
    ProductPath(TargetArgs),

    /// Print the file a target resolves to (source or product)
    Resolve(TargetArgs),

    /// Load a target with its registered loader and print the result
    Load(LoadArgs),

    /// Fetch a URL into the project cache and print the cache path
    Fetch(FetchArgs),

    /// Print the cache path a URL would be stored at
    CachePath(UrlArgs),
}

/// Arguments for the vars command
#[derive(Parser, Debug)]
pub struct VarsArgs {
    /// Build script path
    pub script: String,

    /// Output path the script was invoked to produce
    pub output: String,

    /// Print only the first value
    #[arg(long)]
    pub first: bool,
}

/// A single target path
#[derive(Parser, Debug)]
pub struct TargetArgs {
    /// Target path, relative to the project root
    pub target: String,
}

/// Arguments for the load command
#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Target path, relative to the project root
    pub target: String,

    /// Loader extension to use instead of the target's own (e.g. .json)
    #[arg(short, long)]
    pub ext: Option<String>,

    /// Loader option as key=value; value is parsed as JSON, else taken as a string
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// URL to fetch
    pub url: String,

    /// Status code that counts as success
    #[arg(long)]
    pub status: Option<u16>,

    /// Request header as NAME:VALUE (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Pause after downloading, in seconds
    #[arg(long)]
    pub delay: Option<f64>,

    /// Width of the random range around --delay, in seconds
    #[arg(long)]
    pub jitter: Option<f64>,
}

/// A single URL
#[derive(Parser, Debug)]
pub struct UrlArgs {
    /// URL to encode
    pub url: String,
}

//! Path commands - product, resolved and cache paths

use crate::cli::args::{TargetArgs, UrlArgs};
use crate::error::MuckResult;
use crate::fetch::cache_path_for;
use crate::project::{product_path_for, Project};

/// Execute the product-path command
pub fn product_path(args: TargetArgs) -> MuckResult<()> {
    println!("{}", product_path_for(&args.target)?);
    Ok(())
}

/// Execute the resolve command
pub fn resolve(args: TargetArgs, project: &Project) -> MuckResult<()> {
    println!("{}", project.resolve_actual(&args.target)?);
    Ok(())
}

/// Execute the cache-path command
pub fn cache_path(args: UrlArgs) -> MuckResult<()> {
    println!("{}", cache_path_for(&args.url)?);
    Ok(())
}

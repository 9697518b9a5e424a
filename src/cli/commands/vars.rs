//! Vars command - print the wildcard values bound by an output path

use crate::cli::args::VarsArgs;
use crate::error::MuckResult;
use crate::wildcard::TargetArgs;

/// Execute the vars command
pub fn execute(args: VarsArgs) -> MuckResult<()> {
    let target = TargetArgs::new(args.script, args.output);
    if args.first {
        println!("{}", target.target_var()?);
        return Ok(());
    }
    for var in target.target_vars()? {
        println!("{}", var);
    }
    Ok(())
}

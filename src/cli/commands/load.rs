//! Load command - parse a target and print the result

use crate::cli::args::LoadArgs;
use crate::context::Context;
use crate::error::{MuckError, MuckResult};
use crate::fetch::HttpClient;
use crate::loader::{Kwargs, Loaded};
use serde_json::Value;
use std::io::Write;

/// Split a `key=value` option; the value is JSON if it parses as JSON
fn parse_option(raw: &str) -> MuckResult<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| MuckError::invalid(format!("option must be KEY=VALUE: {:?}", raw)))?;
    if key.is_empty() {
        return Err(MuckError::invalid(format!("option has an empty key: {:?}", raw)));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn parse_options(raw: &[String]) -> MuckResult<Kwargs> {
    raw.iter().map(|r| parse_option(r)).collect()
}

/// Execute the load command
pub fn execute<C: HttpClient>(args: LoadArgs, ctx: &Context<C>) -> MuckResult<()> {
    let kwargs = parse_options(&args.options)?;
    let loaded = ctx.load(&args.target, args.ext.as_deref(), kwargs)?;

    match loaded {
        Loaded::Stream(dep) if dep.is_binary() => write_stdout(&dep.read_bytes()?),
        Loaded::Stream(dep) => write_stdout(dep.read_text()?.as_bytes()),
        Loaded::Bytes(bytes) => write_stdout(&bytes),
        other => {
            let value = other.into_json()?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
    }
}

fn write_stdout(bytes: &[u8]) -> MuckResult<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(bytes)
        .and_then(|()| stdout.flush())
        .map_err(|e| MuckError::io("writing to stdout", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn option_values_are_json_or_strings() {
        assert_eq!(parse_option("strict=true").unwrap(), ("strict".to_string(), json!(true)));
        assert_eq!(parse_option("delimiter=;").unwrap(), ("delimiter".to_string(), json!(";")));
        assert_eq!(parse_option("encoding=null").unwrap(), ("encoding".to_string(), Value::Null));
        assert_eq!(parse_option("quotechar=\"'\"").unwrap(), ("quotechar".to_string(), json!("'")));
        assert_eq!(parse_option("newline=").unwrap(), ("newline".to_string(), json!("")));
    }

    #[test]
    fn malformed_options_rejected() {
        assert!(parse_option("strict").is_err());
        assert!(parse_option("=1").is_err());
    }

    #[test]
    fn later_option_wins() {
        let args = ["strict=false".to_string(), "strict=true".to_string()];
        let kwargs = parse_options(&args).unwrap();
        assert_eq!(kwargs.get("strict"), Some(&json!(true)));
    }
}

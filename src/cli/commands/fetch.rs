//! Fetch command - download a URL into the project cache

use crate::cli::args::FetchArgs;
use crate::context::Context;
use crate::error::{MuckError, MuckResult};
use crate::fetch::{FetchOptions, HttpClient};
use std::time::Duration;

fn parse_header(raw: &str) -> MuckResult<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| MuckError::invalid(format!("header must be NAME:VALUE: {:?}", raw)))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(MuckError::invalid(format!("header has an empty name: {:?}", raw)));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Layer the command-line flags over the configured fetch defaults
fn fetch_options(args: &FetchArgs, defaults: &FetchOptions) -> MuckResult<FetchOptions> {
    let mut options = defaults.clone();
    if let Some(status) = args.status {
        options.expected_status = status;
    }
    for raw in &args.headers {
        options.headers.push(parse_header(raw)?);
    }
    if let Some(timeout) = args.timeout {
        options.timeout = Duration::try_from_secs_f64(timeout)
            .map_err(|e| MuckError::invalid(format!("invalid timeout {}: {}", timeout, e)))?;
    }
    if let Some(delay) = args.delay {
        options.delay = delay;
    }
    if let Some(jitter) = args.jitter {
        options.delay_jitter = jitter;
    }
    Ok(options)
}

/// Execute the fetch command
pub fn execute<C: HttpClient>(args: FetchArgs, ctx: &Context<C>) -> MuckResult<()> {
    let options = fetch_options(&args, ctx.fetch_defaults())?;
    let path = ctx.fetch_with(&args.url, &options)?;
    println!("{}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> FetchArgs {
        FetchArgs {
            url: "https://example.com/a.json".to_string(),
            status: None,
            headers: vec![],
            timeout: None,
            delay: None,
            jitter: None,
        }
    }

    #[test]
    fn flags_override_defaults() {
        let defaults = FetchOptions::default().with_header("User-Agent", "muck");
        let mut args = args();
        args.status = Some(203);
        args.headers = vec!["Accept: text/csv".to_string()];
        args.timeout = Some(0.5);

        let options = fetch_options(&args, &defaults).unwrap();
        assert_eq!(options.expected_status, 203);
        assert_eq!(options.timeout, Duration::from_millis(500));
        assert_eq!(
            options.headers,
            vec![
                ("User-Agent".to_string(), "muck".to_string()),
                ("Accept".to_string(), "text/csv".to_string()),
            ]
        );
    }

    #[test]
    fn bad_flags_rejected() {
        let mut bad_header = args();
        bad_header.headers = vec!["no-colon".to_string()];
        assert!(fetch_options(&bad_header, &FetchOptions::default()).is_err());

        let mut bad_timeout = args();
        bad_timeout.timeout = Some(-1.0);
        assert!(fetch_options(&bad_timeout, &FetchOptions::default()).is_err());
    }
}

//! Fetching remote resources into the project cache
//!
//! A URL is downloaded at most once per project: the body is written to a
//! deterministic path under the fetch directory and every later fetch of
//! the same URL returns that path without touching the network.

pub mod cache;
pub mod client;
pub mod status;

pub use cache::{cache_path_for, path_for_url};
pub use client::{HttpClient, HttpResponse, TransportError, UreqClient};

use crate::error::{MuckError, MuckResult};
use crate::project::Project;
use rand::Rng;
use std::fs;
use std::time::Duration;
use tracing::{debug, info};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

/// Options for a single fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    /// Status code that counts as success
    pub expected_status: u16,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
    /// Seconds to pause after a download
    pub delay: f64,
    /// Width in seconds of the random range centred on `delay`
    pub delay_jitter: f64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            expected_status: 200,
            headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            delay: 0.0,
            delay_jitter: 0.0,
        }
    }
}

impl FetchOptions {
    /// Reject delay settings that cannot be slept
    pub fn validate(&self) -> MuckResult<()> {
        delay_bounds(self.delay, self.delay_jitter).map(|_| ())
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Bounds of the courtesy delay range, ordered, in seconds
fn delay_bounds(delay: f64, jitter: f64) -> MuckResult<(f64, f64)> {
    let lo = delay - jitter * 0.5;
    let hi = delay + jitter * 0.5;
    if !lo.is_finite() || !hi.is_finite() {
        return Err(MuckError::invalid(format!(
            "fetch delay {} with jitter {} is not a finite range",
            delay, jitter
        )));
    }
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if hi > 0.0 {
        Duration::try_from_secs_f64(hi)
            .map_err(|e| MuckError::invalid(format!("fetch delay of {} seconds: {}", hi, e)))?;
    }
    Ok((lo, hi))
}

/// Pause to take after a download: drawn uniformly from
/// `[delay - jitter/2, delay + jitter/2]`, never negative.
pub fn courtesy_delay<R: Rng + ?Sized>(
    delay: f64,
    jitter: f64,
    rng: &mut R,
) -> MuckResult<Duration> {
    let (lo, hi) = delay_bounds(delay, jitter)?;
    let secs = if lo < hi { rng.random_range(lo..=hi) } else { lo };
    if secs <= 0.0 {
        return Ok(Duration::ZERO);
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| MuckError::invalid(format!("fetch delay of {} seconds: {}", secs, e)))
}

/// Downloads URLs into a project's fetch cache
#[derive(Debug, Clone)]
pub struct Fetcher<C: HttpClient = UreqClient> {
    project: Project,
    client: C,
}

impl Fetcher<UreqClient> {
    pub fn new(project: Project) -> Self {
        Self::with_client(project, UreqClient::new())
    }
}

impl<C: HttpClient> Fetcher<C> {
    pub fn with_client(project: Project, client: C) -> Self {
        Self { project, client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Fetch `url` unless it is already cached, returning the
    /// project-relative cache path.
    pub fn fetch(&self, url: &str, options: &FetchOptions) -> MuckResult<String> {
        options.validate()?;
        let path = cache_path_for(url)?;
        if self.project.disk_path(&path).is_file() {
            debug!("fetch: {} already cached at {}", url, path);
            return Ok(path);
        }

        info!("fetch: {}", url);
        let response = self
            .client
            .get(url, &options.headers, options.timeout)
            .map_err(|e| MuckError::transport(&e.kind, e.source))?;

        if response.status != options.expected_status {
            return Err(MuckError::bad_status(
                response.status,
                status::bad_status_message(response.status),
            ));
        }

        let disk_path = self.project.disk_path(&path);
        if let Some(parent) = disk_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MuckError::io(format!("creating cache directory {}", parent.display()), e)
            })?;
        }
        fs::write(&disk_path, &response.body)
            .map_err(|e| MuckError::io(format!("writing {}", path), e))?;
        debug!("fetch: wrote {} bytes to {}", response.body.len(), path);

        let pause = courtesy_delay(options.delay, options.delay_jitter, &mut rand::rng())?;
        if !pause.is_zero() {
            debug!("fetch: sleeping {:?}", pause);
            std::thread::sleep(pause);
        }
        Ok(path)
    }
}

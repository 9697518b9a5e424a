//! HTTP client abstraction
//!
//! The fetch layer talks to the network through [`HttpClient`] so tests
//! can substitute a counting double for the real `ureq` client.

use crate::error::TransportSource;
use std::fmt;
use std::time::Duration;

/// A completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// A transport-level failure: nothing usable came back
#[derive(Debug)]
pub struct TransportError {
    /// Name of the failure kind, e.g. `Timeout` or `HostNotFound`
    pub kind: String,
    pub source: TransportSource,
}

impl TransportError {
    pub fn new(kind: impl Into<String>, source: impl Into<TransportSource>) -> Self {
        Self {
            kind: kind.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.source)
    }
}

/// Blocking HTTP GET
pub trait HttpClient {
    /// Perform one GET. Any status code is a successful exchange; only
    /// transport failures are errors.
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        (**self).get(url, headers, timeout)
    }
}

/// [`HttpClient`] backed by `ureq`
#[derive(Debug, Clone, Default)]
pub struct UreqClient;

impl UreqClient {
    pub fn new() -> Self {
        Self
    }

    fn agent(timeout: Duration) -> ureq::Agent {
        ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into()
    }
}

/// Name of a `ureq` error kind, as shown in flattened fetch failures
fn error_kind(e: &ureq::Error) -> &'static str {
    match e {
        ureq::Error::Timeout(_) => "Timeout",
        ureq::Error::HostNotFound => "HostNotFound",
        ureq::Error::ConnectionFailed => "ConnectionFailed",
        ureq::Error::Io(_) => "Io",
        ureq::Error::BadUri(_) => "BadUri",
        ureq::Error::TooManyRedirects => "TooManyRedirects",
        ureq::Error::StatusCode(_) => "StatusCode",
        _ => "HttpError",
    }
}

impl HttpClient for UreqClient {
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = Self::agent(timeout).get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let mut response = request
            .call()
            .map_err(|e| TransportError::new(error_kind(&e), e))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| TransportError::new(error_kind(&e), e))?;

        Ok(HttpResponse { status, body })
    }
}

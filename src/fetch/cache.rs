//! URL → cache path encoding
//!
//! Every fetched URL is stored at a path under the fetch directory derived
//! from the URL alone: `scheme/authority/segment/.../segment`, with the
//! query folded into the last component. Each component is escaped so
//! that distinct URLs map to distinct paths and no component can be `.`,
//! `..`, empty, or contain a separator.
//!
//! Path segments that become directories carry a trailing
//! [`DIR_MARKER`]. Escaping only ever emits `%` followed by two hex
//! digits, or a lone `%` for an empty segment, so a file name ends in the
//! marker only when it is exactly `%`, which is too short to be a
//! directory. `/a` and `/a/b` can both be cached.

use crate::error::{MuckError, MuckResult};
use crate::layout::{path_join, FETCH_DIR};
use sha2::{Digest, Sha256};
use url::Url;

/// Longest component most filesystems accept
const NAME_MAX: usize = 255;

/// Hex chars of the digest kept when a component is shortened
const DIGEST_LEN: usize = 16;

/// Suffix of path segments that are directories in the cache
pub const DIR_MARKER: char = '%';

/// Escape one path component.
///
/// Unreserved URL characters pass through; `%`, `/`, `\`, `?`, `#`,
/// control and non-ASCII bytes become `%XX`.
fn encode_component(raw: &str, max_len: usize) -> String {
    if raw.is_empty() {
        return "%".to_string();
    }
    let mut out = String::with_capacity(raw.len());
    for &b in raw.as_bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'.'
            | b'_'
            | b'~'
            | b'!'
            | b'$'
            | b'&'
            | b'\''
            | b'('
            | b')'
            | b'*'
            | b'+'
            | b','
            | b';'
            | b'='
            | b':'
            | b'@' => out.push(char::from(b)),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    match out.as_str() {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => shorten(out, max_len),
    }
}

/// Keep components within `max_len`, replacing the tail with a digest
fn shorten(component: String, max_len: usize) -> String {
    if component.len() <= max_len {
        return component;
    }
    let digest = hex::encode(Sha256::digest(component.as_bytes()));
    let keep = max_len - DIGEST_LEN - 1;
    // only ASCII remains after escaping, so any index is a char boundary
    format!("{}-{}", &component[..keep], &digest[..DIGEST_LEN])
}

/// Encode a URL as a relative path
pub fn path_for_url(url: &str) -> MuckResult<String> {
    let parsed = Url::parse(url)
        .map_err(|e| MuckError::invalid(format!("cannot parse URL {:?}: {}", url, e)))?;

    let mut components = vec![encode_component(parsed.scheme(), NAME_MAX)];

    let mut authority = String::new();
    if !parsed.username().is_empty() {
        authority.push_str(parsed.username());
        if let Some(password) = parsed.password() {
            authority.push(':');
            authority.push_str(password);
        }
        authority.push('@');
    }
    if let Some(host) = parsed.host_str() {
        authority.push_str(host);
    }
    if let Some(port) = parsed.port() {
        authority.push_str(&format!(":{}", port));
    }
    components.push(encode_component(&authority, NAME_MAX));

    let mut segments: Vec<String> = match parsed.path_segments() {
        Some(segments) => segments.map(str::to_string).collect(),
        // cannot-be-a-base URLs such as `data:` carry an opaque path
        None => vec![parsed.path().to_string()],
    };
    if segments.is_empty() {
        segments.push(String::new());
    }
    if let Some(query) = parsed.query() {
        if let Some(last) = segments.last_mut() {
            last.push('?');
            last.push_str(query);
        }
    }
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        if i == last {
            components.push(encode_component(segment, NAME_MAX));
        } else {
            let mut dir = encode_component(segment, NAME_MAX - 1);
            dir.push(DIR_MARKER);
            components.push(dir);
        }
    }

    Ok(components.join("/"))
}

/// Project-relative cache path for a URL
pub fn cache_path_for(url: &str) -> MuckResult<String> {
    Ok(path_join(FETCH_DIR, &path_for_url(url)?))
}

//! Project layout conventions
//!
//! Directory names, reserved names and special extensions that build
//! scripts and external tooling must agree on.

/// Directory at the project root holding build products
pub const BUILD_DIR: &str = "_build";

/// Build metadata file written by the build engine
pub const INFO_NAME: &str = "_muck_info.json";

/// Directory at the project root holding the fetch cache
pub const FETCH_DIR: &str = "_fetch";

/// Project-local configuration file
pub const CONFIG_NAME: &str = ".muck.toml";

/// Names that must not be used as ordinary targets
pub const RESERVED_NAMES: &[&str] = &["clean", "clean-all", "muck", "patch", BUILD_DIR, INFO_NAME];

/// Extensions reserved for the build engine's temporary files
pub const RESERVED_EXTS: &[&str] = &[".tmp"];

/// Extensions produced by test harnesses, never treated as products
pub const IGNORED_EXTS: &[&str] = &[".err", ".iot", ".out"];

pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

pub fn is_reserved_ext(ext: &str) -> bool {
    RESERVED_EXTS.contains(&ext)
}

pub fn is_ignored_ext(ext: &str) -> bool {
    IGNORED_EXTS.contains(&ext)
}

/// Join two slash-separated path strings.
///
/// An empty `base` yields `rel`; an absolute `rel` replaces `base`.
pub fn path_join(base: &str, rel: &str) -> String {
    if base.is_empty() || rel.starts_with('/') {
        rel.to_string()
    } else if base.ends_with('/') {
        format!("{}{}", base, rel)
    } else {
        format!("{}/{}", base, rel)
    }
}

/// Split the extension off the final path component.
///
/// A leading dot does not start an extension (`.hidden` has none), and
/// the dot is part of the returned extension.
fn split_ext(path: &str) -> (&str, &str) {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let name = &path[name_start..];
    let stem_len = name.trim_start_matches('.').len();
    let leading_dots = name.len() - stem_len;
    match name[leading_dots..].rfind('.') {
        Some(i) => path.split_at(name_start + leading_dots + i),
        None => (path, ""),
    }
}

/// Extension of the final path component, including the dot, or `""`
pub fn path_ext(path: &str) -> &str {
    split_ext(path).1
}

/// The path with the extension of its final component removed
pub fn path_stem(path: &str) -> &str {
    split_ext(path).0
}

//! Open options and keyword partitioning
//!
//! A `load` call takes one flat mapping of keyword arguments. Keys from the
//! fixed open-option set configure how the dependency is opened; every
//! other key belongs to the format's parser and is passed through verbatim.

use crate::error::{MuckError, MuckResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Flat keyword arguments as passed to `load`
pub type Kwargs = BTreeMap<String, Value>;

/// The closed set of keys routed to the open step
pub const OPEN_OPTION_KEYS: [&str; 5] = ["binary", "buffering", "encoding", "errors", "newline"];

pub fn is_open_option(key: &str) -> bool {
    OPEN_OPTION_KEYS.contains(&key)
}

/// Read buffering policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Buffering {
    /// Platform default buffer size (`-1`)
    #[default]
    Default,
    /// No buffering (`0`, binary mode only)
    Unbuffered,
    /// Line buffering (`1`); reads behave like the default
    Line,
    /// Explicit buffer size in bytes
    Size(usize),
}

impl Buffering {
    fn from_value(value: &Value) -> MuckResult<Self> {
        match value.as_i64() {
            Some(-1) => Ok(Self::Default),
            Some(0) => Ok(Self::Unbuffered),
            Some(1) => Ok(Self::Line),
            Some(n) if n > 1 => Ok(Self::Size(n as usize)),
            _ => Err(MuckError::invalid(format!(
                "buffering must be -1, 0, 1 or a buffer size; got {}",
                value
            ))),
        }
    }
}

/// Text encodings a dependency can be decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    /// UTF-8 with an optional leading byte order mark stripped
    Utf8Sig,
    Ascii,
    Latin1,
}

impl Encoding {
    /// Look up an encoding by name, ignoring case and `-`/`_` differences
    pub fn from_name(name: &str) -> MuckResult<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "utf8" | "u8" => Ok(Self::Utf8),
            "utf8sig" => Ok(Self::Utf8Sig),
            "ascii" | "usascii" => Ok(Self::Ascii),
            "latin1" | "latin" | "iso88591" | "l1" => Ok(Self::Latin1),
            _ => Err(MuckError::invalid(format!("unknown encoding: {:?}", name))),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Utf8 => "utf-8",
            Self::Utf8Sig => "utf-8-sig",
            Self::Ascii => "ascii",
            Self::Latin1 => "latin-1",
        };
        write!(f, "{}", name)
    }
}

/// What to do with bytes that cannot be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeErrors {
    #[default]
    Strict,
    /// Substitute U+FFFD
    Replace,
    /// Drop the offending bytes
    Ignore,
}

impl DecodeErrors {
    pub fn from_name(name: &str) -> MuckResult<Self> {
        match name {
            "strict" => Ok(Self::Strict),
            "replace" => Ok(Self::Replace),
            "ignore" => Ok(Self::Ignore),
            other => Err(MuckError::invalid(format!(
                "unknown error handler: {:?}; expected strict, replace or ignore",
                other
            ))),
        }
    }
}

/// Newline handling for text reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Newline {
    /// `None`: `\r\n` and `\r` are translated to `\n`
    #[default]
    Universal,
    /// `""`: line endings are recognized but left untranslated
    Untranslated,
    Lf,
    Cr,
    CrLf,
}

impl Newline {
    fn from_value(value: &Value) -> MuckResult<Self> {
        match value {
            Value::Null => Ok(Self::Universal),
            Value::String(s) => match s.as_str() {
                "" => Ok(Self::Untranslated),
                "\n" => Ok(Self::Lf),
                "\r" => Ok(Self::Cr),
                "\r\n" => Ok(Self::CrLf),
                other => Err(MuckError::invalid(format!("illegal newline value: {:?}", other))),
            },
            other => Err(MuckError::invalid(format!(
                "newline must be null or a string; got {}",
                other
            ))),
        }
    }
}

/// Fully resolved options for opening a dependency
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpenOptions {
    pub binary: bool,
    pub buffering: Buffering,
    pub encoding: Option<Encoding>,
    pub errors: Option<DecodeErrors>,
    pub newline: Newline,
}

fn optional_str<'a>(key: &str, value: &'a Value) -> MuckResult<Option<&'a str>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.as_str())),
        other => Err(MuckError::invalid(format!(
            "{} must be null or a string; got {}",
            key, other
        ))),
    }
}

impl OpenOptions {
    pub fn text() -> Self {
        Self::default()
    }

    pub fn binary() -> Self {
        Self {
            binary: true,
            ..Self::default()
        }
    }

    /// Apply one open option by name
    pub fn set(&mut self, key: &str, value: &Value) -> MuckResult<()> {
        match key {
            "binary" => {
                self.binary = value.as_bool().ok_or_else(|| {
                    MuckError::invalid(format!("binary must be a boolean; got {}", value))
                })?;
            }
            "buffering" => self.buffering = Buffering::from_value(value)?,
            "encoding" => {
                self.encoding = optional_str(key, value)?.map(Encoding::from_name).transpose()?;
            }
            "errors" => {
                self.errors = optional_str(key, value)?
                    .map(DecodeErrors::from_name)
                    .transpose()?;
            }
            "newline" => self.newline = Newline::from_value(value)?,
            other => {
                return Err(MuckError::invalid(format!(
                    "unknown open option: {:?}; expected one of {:?}",
                    other, OPEN_OPTION_KEYS
                )))
            }
        }
        Ok(())
    }

    /// Check combinations that are meaningless for the chosen mode
    pub fn validate(&self) -> MuckResult<()> {
        if self.binary {
            if self.encoding.is_some() {
                return Err(MuckError::invalid("binary mode doesn't take an encoding"));
            }
            if self.errors.is_some() {
                return Err(MuckError::invalid("binary mode doesn't take an errors argument"));
            }
            if self.newline != Newline::Universal {
                return Err(MuckError::invalid("binary mode doesn't take a newline argument"));
            }
        } else if self.buffering == Buffering::Unbuffered {
            return Err(MuckError::invalid("can't have unbuffered text I/O"));
        }
        Ok(())
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding.unwrap_or_default()
    }

    pub fn errors(&self) -> DecodeErrors {
        self.errors.unwrap_or_default()
    }
}

/// A partial set of open options: registered defaults or per-call overrides.
///
/// Only keys from [`OPEN_OPTION_KEYS`] with well-typed values can be stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenOptionSet {
    values: BTreeMap<String, Value>,
}

impl OpenOptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a flat mapping, rejecting keys outside the open-option set
    pub fn from_kwargs(kwargs: Kwargs) -> MuckResult<Self> {
        let mut set = Self::new();
        for (key, value) in kwargs {
            set.insert(key, value)?;
        }
        Ok(set)
    }

    /// Build from pairs known to be valid open options
    pub(crate) fn trusted<const N: usize>(pairs: [(&str, Value); N]) -> Self {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> MuckResult<()> {
        let key = key.into();
        OpenOptions::default().set(&key, &value)?;
        self.values.insert(key, value);
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: Value) -> MuckResult<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Layer `overrides` on top of `self`; the override wins per key
    pub fn merged(&self, overrides: &OpenOptionSet) -> OpenOptionSet {
        let mut values = self.values.clone();
        values.extend(overrides.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        OpenOptionSet { values }
    }

    /// Resolve into concrete options, validating mode combinations
    pub fn resolve(&self) -> MuckResult<OpenOptions> {
        let mut options = OpenOptions::default();
        for (key, value) in &self.values {
            options.set(key, value)?;
        }
        options.validate()?;
        Ok(options)
    }
}

/// Format-specific options handed to a parser
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserOptions {
    values: BTreeMap<String, Value>,
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Value)> for ParserOptions {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Keyword arguments of one `load` call, split by destination
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOptions {
    pub open: OpenOptionSet,
    pub parser: ParserOptions,
}

impl LoadOptions {
    /// Split a flat mapping by key: open-option keys go to `open`, the rest
    /// to `parser` untouched. Open-option values are type-checked here.
    pub fn partition(kwargs: Kwargs) -> MuckResult<Self> {
        let mut options = Self::default();
        for (key, value) in kwargs {
            if is_open_option(&key) {
                options.open.insert(key, value)?;
            } else {
                options.parser.insert(key, value);
            }
        }
        Ok(options)
    }
}

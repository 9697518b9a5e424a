//! Wildcard target patterns
//!
//! A build script named `_build/data/%.json.py`-style declares which
//! outputs it can produce by using `%` as a wildcard in its path. A run
//! of `k` consecutive `%` characters captures at least `k` characters, so
//! `%%` demands a value of two or more characters (zero-padded numbers,
//! typically).
//!
//! # Examples
//!
//! ```
//! use muck::wildcard::WildcardPattern;
//!
//! let pattern = WildcardPattern::compile("a/%%-b").unwrap();
//! assert_eq!(pattern.captures("a/007-b"), Some(vec!["007".to_string()]));
//! assert_eq!(pattern.captures("a/7-b"), None);
//! ```

use crate::error::{MuckError, MuckResult};
use crate::layout::{path_join, path_stem, BUILD_DIR};
use regex::Regex;
use tracing::debug;

/// The reserved wildcard character.
///
/// Chosen because shells treat it as a plain character.
pub const WILDCARD: char = '%';

/// A compiled wildcard template, anchored to match whole candidates
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    template: String,
    regex: Regex,
}

/// One piece of a template: literal text or a run of wildcards
#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Literal(&'a str),
    Wildcard(usize),
}

/// Split a template on maximal runs of the wildcard character
fn chunks(template: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut rest = template;
    while !rest.is_empty() {
        let run = rest.len() - rest.trim_start_matches(WILDCARD).len();
        if run > 0 {
            // `%` is one byte, so the byte run is also the char count
            out.push(Chunk::Wildcard(run));
            rest = &rest[run..];
        } else {
            let end = rest.find(WILDCARD).unwrap_or(rest.len());
            out.push(Chunk::Literal(&rest[..end]));
            rest = &rest[end..];
        }
    }
    out
}

impl WildcardPattern {
    /// Compile a template into an anchored pattern.
    ///
    /// Literal text is escaped; each wildcard run of length `k` becomes a
    /// capture group requiring at least `k` characters.
    pub fn compile(template: &str) -> MuckResult<Self> {
        let mut pattern = String::from(r"\A");
        for chunk in chunks(template) {
            match chunk {
                Chunk::Literal(text) => pattern.push_str(&regex::escape(text)),
                Chunk::Wildcard(k) => pattern.push_str(&format!("(.{{{},}})", k)),
            }
        }
        pattern.push_str(r"\z");

        let regex = Regex::new(&pattern).map_err(|e| {
            MuckError::invalid(format!("cannot compile wildcard template {:?}: {}", template, e))
        })?;

        Ok(Self {
            template: template.to_string(),
            regex,
        })
    }

    /// The template this pattern was compiled from
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The compiled regular expression
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Number of wildcard runs in the template
    pub fn group_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Match a whole candidate, returning the captured values in template order
    pub fn captures(&self, candidate: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(candidate)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

/// Template a script declares: the build dir joined with the script path
/// minus its extension.
pub fn template_for_script(script_path: &str) -> String {
    path_join(BUILD_DIR, path_stem(script_path))
}

/// Extract the wildcard values an output path binds in a script's template.
///
/// The output path is expected to have been derived from the script's
/// template by the build engine, so a mismatch is a contract violation.
pub fn target_vars(script_path: &str, output_path: &str) -> MuckResult<Vec<String>> {
    let template = template_for_script(script_path);
    let pattern = WildcardPattern::compile(&template)?;
    let vars = pattern.captures(output_path).ok_or_else(|| {
        MuckError::invalid(format!(
            "output path {:?} does not match script template {:?}",
            output_path, template
        ))
    })?;
    debug!("Target vars for {}: {:?}", output_path, vars);
    Ok(vars)
}

/// The two invocation arguments every build script receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetArgs {
    script_path: String,
    output_path: String,
}

impl TargetArgs {
    pub fn new(script_path: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            script_path: script_path.into(),
            output_path: output_path.into(),
        }
    }

    /// Read the arguments of the running process (excluding the program name)
    pub fn from_env() -> MuckResult<Self> {
        Self::from_args(std::env::args().skip(1))
    }

    /// Build from exactly two positional arguments
    pub fn from_args<I, S>(args: I) -> MuckResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        match <[String; 2]>::try_from(args) {
            Ok([script_path, output_path]) => Ok(Self {
                script_path,
                output_path,
            }),
            Err(args) => Err(MuckError::invalid(format!(
                "expected 2 arguments (script path, output path), got {}",
                args.len()
            ))),
        }
    }

    pub fn script_path(&self) -> &str {
        &self.script_path
    }

    /// Path of the product the script is producing
    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    pub fn target_vars(&self) -> MuckResult<Vec<String>> {
        target_vars(&self.script_path, &self.output_path)
    }

    /// The first target variable
    pub fn target_var(&self) -> MuckResult<String> {
        self.target_vars()?.into_iter().next().ok_or_else(|| {
            MuckError::invalid(format!(
                "script {:?} declares no wildcard variables",
                self.script_path
            ))
        })
    }
}

//! Loader registry
//!
//! Maps file extensions to a parse function plus the default options used
//! to open dependencies of that type. A registry starts out seeded with
//! the built-in loaders; user code adds its own before loading.

use crate::error::{MuckError, MuckResult};
use crate::layout::path_ext;
use crate::loader::builtin::{self, is_builtin_ext};
use crate::loader::options::{Kwargs, LoadOptions, OpenOptionSet, ParserOptions};
use crate::loader::stream::Dependency;
use crate::project::Project;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A parse function: turns an opened dependency into a value
pub type LoaderFn = Arc<dyn Fn(Dependency, &ParserOptions) -> MuckResult<Loaded> + Send + Sync>;

/// A parsed dependency
#[derive(Debug)]
pub enum Loaded {
    /// The open handle itself
    Stream(Dependency),
    /// A single JSON document
    Json(Value),
    /// A sequence of JSON documents
    Documents(Vec<Value>),
    /// Tabular rows
    Rows(Vec<Vec<String>>),
    Text(String),
    Bytes(Vec<u8>),
}

impl Loaded {
    /// Short name of the variant, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Stream(_) => "stream",
            Self::Json(_) => "json",
            Self::Documents(_) => "documents",
            Self::Rows(_) => "rows",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
        }
    }

    /// Convert into a JSON value; streams are read to the end as text
    pub fn into_json(self) -> MuckResult<Value> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Documents(docs) => Ok(Value::Array(docs)),
            Self::Rows(rows) => Ok(serde_json::to_value(rows)?),
            Self::Text(text) => Ok(Value::String(text)),
            Self::Stream(dep) => Ok(Value::String(dep.read_text()?)),
            Self::Bytes(_) => Err(MuckError::invalid("binary content has no JSON form")),
        }
    }

    pub fn into_stream(self) -> Option<Dependency> {
        match self {
            Self::Stream(dep) => Some(dep),
            _ => None,
        }
    }
}

/// A registered loader
#[derive(Clone)]
pub struct LoaderEntry {
    func: LoaderFn,
    open_defaults: OpenOptionSet,
}

impl LoaderEntry {
    pub fn open_defaults(&self) -> &OpenOptionSet {
        &self.open_defaults
    }

    pub fn call(&self, dep: Dependency, options: &ParserOptions) -> MuckResult<Loaded> {
        (self.func)(dep, options)
    }
}

impl fmt::Debug for LoaderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderEntry")
            .field("open_defaults", &self.open_defaults)
            .finish_non_exhaustive()
    }
}

/// Extension → loader table
#[derive(Debug, Clone)]
pub struct LoaderRegistry {
    entries: HashMap<String, LoaderEntry>,
}

impl LoaderRegistry {
    /// A registry with no loaders at all
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// A registry seeded with the built-in loaders
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for (ext, func, defaults) in builtin::builtin_loaders() {
            registry.insert(ext, Arc::new(func), defaults);
        }
        registry
    }

    /// Register a loader for `ext`.
    ///
    /// Built-in extensions may be overridden; any other extension can be
    /// registered only once.
    pub fn add_loader<F>(
        &mut self,
        ext: &str,
        func: F,
        open_defaults: OpenOptionSet,
    ) -> MuckResult<()>
    where
        F: Fn(Dependency, &ParserOptions) -> MuckResult<Loaded> + Send + Sync + 'static,
    {
        if !ext.starts_with('.') {
            return Err(MuckError::invalid(format!(
                "file extension does not start with '.': {:?}",
                ext
            )));
        }
        if !is_builtin_ext(ext) && self.entries.contains_key(ext) {
            return Err(MuckError::DuplicateRegistration {
                ext: ext.to_string(),
            });
        }
        self.insert(ext, Arc::new(func), open_defaults);
        debug!("Registered loader for {}", ext);
        Ok(())
    }

    /// [`add_loader`](Self::add_loader) with open defaults given as a flat
    /// mapping; keys outside the open-option set are rejected.
    pub fn add_loader_kwargs<F>(
        &mut self,
        ext: &str,
        func: F,
        open_defaults: Kwargs,
    ) -> MuckResult<()>
    where
        F: Fn(Dependency, &ParserOptions) -> MuckResult<Loaded> + Send + Sync + 'static,
    {
        let defaults = OpenOptionSet::from_kwargs(open_defaults)?;
        self.add_loader(ext, func, defaults)
    }

    fn insert(&mut self, ext: &str, func: LoaderFn, open_defaults: OpenOptionSet) {
        self.entries.insert(
            ext.to_string(),
            LoaderEntry {
                func,
                open_defaults,
            },
        );
    }

    pub fn get(&self, ext: &str) -> Option<&LoaderEntry> {
        self.entries.get(ext)
    }

    pub fn contains(&self, ext: &str) -> bool {
        self.entries.contains_key(ext)
    }

    /// Registered extensions, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }

    /// Load a target, splitting `kwargs` between the open step and the parser.
    ///
    /// The extension is `ext` when given, otherwise the target's own.
    pub fn load(
        &self,
        project: &Project,
        target: &str,
        ext: Option<&str>,
        kwargs: Kwargs,
    ) -> MuckResult<Loaded> {
        self.load_with(project, target, ext, LoadOptions::partition(kwargs)?)
    }

    /// Load a target with already partitioned options
    pub fn load_with(
        &self,
        project: &Project,
        target: &str,
        ext: Option<&str>,
        options: LoadOptions,
    ) -> MuckResult<Loaded> {
        let ext = ext.unwrap_or_else(|| path_ext(target));
        let entry = self.get(ext).ok_or_else(|| MuckError::NoLoaderFound {
            path: target.to_string(),
            ext: ext.to_string(),
        })?;

        let open = entry.open_defaults.merged(&options.open).resolve()?;
        debug!("Loading {} with {} loader", target, ext);
        let dep = project.open_dep(target, &open)?;
        entry.call(dep, &options.parser)
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

//! Build-script context
//!
//! Bundles the pieces a build script needs: the project root for path
//! resolution, the loader registry, and a fetcher with its defaults.

use crate::config::{Config, ConfigManager};
use crate::error::MuckResult;
use crate::fetch::{FetchOptions, Fetcher, HttpClient, UreqClient};
use crate::loader::{Dependency, Kwargs, Loaded, LoaderRegistry, OpenOptions};
use crate::project::Project;
use crate::wildcard;
use std::path::PathBuf;
use tracing::debug;

/// Everything a build script uses to read its dependencies
#[derive(Debug)]
pub struct Context<C: HttpClient = UreqClient> {
    project: Project,
    loaders: LoaderRegistry,
    fetcher: Fetcher<C>,
    fetch_defaults: FetchOptions,
}

impl Context<UreqClient> {
    /// A context rooted at `root` with built-in loaders and default fetch options
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_client(root, UreqClient::new())
    }

    /// A context whose fetch defaults come from configuration
    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> MuckResult<Self> {
        let mut ctx = Self::new(root);
        ctx.fetch_defaults = config.fetch.to_options()?;
        Ok(ctx)
    }

    /// A context rooted at the current directory, reading `.muck.toml` there
    pub fn current() -> MuckResult<Self> {
        let project = Project::current()?;
        let config = ConfigManager::for_project(project.root()).load()?;
        Self::from_config(project.root().to_path_buf(), &config)
    }
}

impl<C: HttpClient> Context<C> {
    pub fn with_client(root: impl Into<PathBuf>, client: C) -> Self {
        let project = Project::new(root);
        debug!("Context rooted at {}", project.root().display());
        Self {
            fetcher: Fetcher::with_client(project.clone(), client),
            project,
            loaders: LoaderRegistry::with_defaults(),
            fetch_defaults: FetchOptions::default(),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn loaders(&self) -> &LoaderRegistry {
        &self.loaders
    }

    /// Mutable registry, for registering custom loaders
    pub fn loaders_mut(&mut self) -> &mut LoaderRegistry {
        &mut self.loaders
    }

    pub fn fetcher(&self) -> &Fetcher<C> {
        &self.fetcher
    }

    pub fn fetch_defaults(&self) -> &FetchOptions {
        &self.fetch_defaults
    }

    pub fn set_fetch_defaults(&mut self, options: FetchOptions) {
        self.fetch_defaults = options;
    }

    /// Wildcard values a script's output path binds
    pub fn target_vars(&self, script_path: &str, output_path: &str) -> MuckResult<Vec<String>> {
        wildcard::target_vars(script_path, output_path)
    }

    /// Open a target for reading
    pub fn open_dep(&self, target: &str, options: &OpenOptions) -> MuckResult<Dependency> {
        self.project.open_dep(target, options)
    }

    /// Load a target with the registered loader for its extension
    pub fn load(&self, target: &str, ext: Option<&str>, kwargs: Kwargs) -> MuckResult<Loaded> {
        self.loaders.load(&self.project, target, ext, kwargs)
    }

    /// Fetch a URL into the cache with explicit options
    pub fn fetch_with(&self, url: &str, options: &FetchOptions) -> MuckResult<String> {
        self.fetcher.fetch(url, options)
    }

    /// Fetch a URL into the cache with the context's defaults
    pub fn fetch(&self, url: &str) -> MuckResult<String> {
        self.fetcher.fetch(url, &self.fetch_defaults)
    }

    /// Fetch a URL, then load the cached file.
    ///
    /// The loader is chosen by `ext` when given, otherwise by the
    /// extension of the cache path.
    pub fn load_url(
        &self,
        url: &str,
        ext: Option<&str>,
        fetch: &FetchOptions,
        kwargs: Kwargs,
    ) -> MuckResult<Loaded> {
        let path = self.fetcher.fetch(url, fetch)?;
        self.load(&path, ext, kwargs)
    }
}

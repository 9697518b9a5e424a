//! muck - build-script runtime helpers
//!
//! Wildcard target patterns, source/product path resolution, an
//! extension-keyed loader registry, and a cache for remote fetches.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod loader;
pub mod project;
pub mod wildcard;

pub use context::Context;
pub use error::{FetchFailureKind, MuckError, MuckResult};
pub use fetch::{FetchOptions, Fetcher};
pub use loader::{Dependency, Kwargs, Loaded, LoaderRegistry, OpenOptionSet};
pub use project::{is_product_path, product_path_for, Project};
pub use wildcard::{target_vars, TargetArgs, WildcardPattern};

//! Target path resolution
//!
//! A target path names a build output independent of where it lives. The
//! authoritative file is the checked-in source when one exists at that
//! path, otherwise the product under the build directory.

use crate::error::{MuckError, MuckResult};
use crate::layout::{path_join, BUILD_DIR};
use crate::loader::{Dependency, OpenOptions};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// True iff `path` is the build directory or lies inside it
pub fn is_product_path(path: &str) -> bool {
    path == BUILD_DIR
        || path
            .strip_prefix(BUILD_DIR)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// The product path for a target: the target under the build directory.
///
/// Fails if the target is already a product path.
pub fn product_path_for(target_path: &str) -> MuckResult<String> {
    if is_product_path(target_path) {
        return Err(MuckError::invalid(format!(
            "provided target path is prefixed with build dir: {}",
            target_path
        )));
    }
    Ok(path_join(BUILD_DIR, target_path))
}

/// A project root against which relative target paths are resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The project rooted at the current working directory
    pub fn current() -> MuckResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| MuckError::io("getting current directory", e))?;
        Ok(Self::new(cwd))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of a project-relative path
    pub fn disk_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.disk_path(path).exists()
    }

    /// The target itself if it exists as a source file, otherwise its
    /// product path (which may not exist yet).
    pub fn resolve_actual(&self, target_path: &str) -> MuckResult<String> {
        if self.exists(target_path) {
            debug!("Resolved {} to source file", target_path);
            return Ok(target_path.to_string());
        }
        let product = product_path_for(target_path)?;
        debug!("Resolved {} to product {}", target_path, product);
        Ok(product)
    }

    /// Open a dependency for reading with the given options
    pub fn open_dep(&self, target_path: &str, options: &OpenOptions) -> MuckResult<Dependency> {
        options.validate()?;
        let path = self.resolve_actual(target_path)?;
        let file = match File::open(self.disk_path(&path)) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Cannot open dependency: {}", path);
                if path != target_path {
                    warn!("Nor does a file exist at source path: {}", target_path);
                }
                return Err(MuckError::DependencyNotFound {
                    path,
                    target: target_path.to_string(),
                });
            }
            Err(e) => return Err(MuckError::io(format!("opening dependency {}", path), e)),
        };
        Ok(Dependency::from_file(
            file,
            path,
            target_path.to_string(),
            options.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn product_path_detection() {
        assert!(is_product_path("_build"));
        assert!(is_product_path("_build/x"));
        assert!(!is_product_path("_builder/x"));
        assert!(!is_product_path("x/_build/y"));
        assert!(!is_product_path(""));
    }

    #[test]
    fn product_path_prefixes_build_dir() {
        assert_eq!(product_path_for("x/y.txt").unwrap(), "_build/x/y.txt");
    }

    #[test]
    fn product_path_rejects_double_prefix() {
        let product = product_path_for("x/y.txt").unwrap();
        let err = product_path_for(&product).unwrap_err();
        assert!(matches!(err, MuckError::InvalidArgument(_)));
        assert!(product_path_for("_build").is_err());
    }

    #[test]
    fn resolve_prefers_existing_source() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("data")).unwrap();
        fs::write(temp.path().join("data/in.csv"), "a,b").unwrap();
        let project = Project::new(temp.path());

        assert_eq!(project.resolve_actual("data/in.csv").unwrap(), "data/in.csv");
        assert_eq!(
            project.resolve_actual("data/out.csv").unwrap(),
            "_build/data/out.csv"
        );
    }

    #[test]
    fn resolve_product_path_that_is_missing_fails() {
        let temp = TempDir::new().unwrap();
        let project = Project::new(temp.path());
        assert!(project.resolve_actual("_build/missing").is_err());
    }

    #[test]
    fn open_missing_reports_both_paths() {
        let temp = TempDir::new().unwrap();
        let project = Project::new(temp.path());
        let err = project.open_dep("gone.txt", &OpenOptions::text()).unwrap_err();
        match err {
            MuckError::DependencyNotFound { path, target } => {
                assert_eq!(path, "_build/gone.txt");
                assert_eq!(target, "gone.txt");
            }
            other => panic!("expected DependencyNotFound, got {:?}", other),
        }
    }

    #[test]
    fn open_product() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("_build")).unwrap();
        fs::write(temp.path().join("_build/made.txt"), "built").unwrap();
        let project = Project::new(temp.path());

        let dep = project.open_dep("made.txt", &OpenOptions::text()).unwrap();
        assert_eq!(dep.path(), "_build/made.txt");
        assert_eq!(dep.target(), "made.txt");
        assert_eq!(dep.read_text().unwrap(), "built");
    }
}

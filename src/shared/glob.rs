//! Glob pattern utilities
//!
//! Check tables describe their inputs as glob patterns; this module narrows a
//! list of staged paths down to the ones a check cares about.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

/// Create a GlobSet from a list of patterns for efficient batch matching
pub fn build_globset(patterns: &[&str]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}

/// Keep the paths matching `set`, preserving order
pub fn filter_matching(paths: &[PathBuf], set: &GlobSet) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|path| set.is_match(path.as_path()))
        .cloned()
        .collect()
}

/// Express `path` relative to `root` when it lies inside it
pub fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

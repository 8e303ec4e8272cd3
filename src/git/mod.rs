//! Git integration layer for hookstack
//!
//! This module provides a high-level interface for Git operations using git2.
//! It handles repository detection, the staging area, and installed hooks.

use anyhow::{Context, Result};
use git2::{Repository, Status, StatusOptions};
use std::path::{Path, PathBuf};

/// Git operations handler
pub struct GitOperations {
    repo: Repository,
}

impl GitOperations {
    /// Discover and open the Git repository enclosing `path`
    pub fn discover_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path).context("No Git repository found")?;

        Ok(Self { repo })
    }

    /// Get working directory path
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Get the `.git` directory path
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Get staged files that still exist in the working tree, relative to the workdir
    pub fn get_staged_files(&self) -> Result<Vec<PathBuf>> {
        let mut staged_files = Vec::new();
        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .context("Failed to get repository status")?;

        for entry in statuses.iter() {
            if entry.status().intersects(
                Status::INDEX_NEW
                    | Status::INDEX_MODIFIED
                    | Status::INDEX_RENAMED
                    | Status::INDEX_TYPECHANGE,
            ) {
                if let Some(path) = entry.path() {
                    staged_files.push(PathBuf::from(path));
                }
            }
        }

        staged_files.sort();
        Ok(staged_files)
    }

    /// Add working-tree content of `paths` (relative to the workdir) to the index
    pub fn stage_paths(&self, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let mut index = self.repo.index().context("Failed to open the git index")?;
        for path in paths {
            index
                .add_path(path)
                .with_context(|| format!("Failed to stage {}", path.display()))?;
        }
        index.write().context("Failed to write the git index")?;

        tracing::debug!("Re-staged {} file(s)", paths.len());
        Ok(())
    }

    /// Read an installed hook script, if present
    pub fn hook_content(&self, hook_name: &str) -> Option<String> {
        std::fs::read_to_string(self.repo.path().join("hooks").join(hook_name)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, GitOperations) {
        let temp_dir = TempDir::new().unwrap();
        Repository::init(temp_dir.path()).unwrap();
        let git = GitOperations::discover_from(temp_dir.path()).unwrap();
        (temp_dir, git)
    }

    #[test]
    fn test_discover_outside_repository_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(GitOperations::discover_from(temp_dir.path()).is_err());
    }

    #[test]
    fn test_stage_and_list_files() {
        let (temp_dir, git) = init_repo();
        fs::write(temp_dir.path().join("app.py"), "print('hi')\n").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "untracked\n").unwrap();

        assert!(git.get_staged_files().unwrap().is_empty());

        git.stage_paths(&[PathBuf::from("app.py")]).unwrap();
        assert_eq!(git.get_staged_files().unwrap(), vec![PathBuf::from("app.py")]);
    }

    #[test]
    fn test_hook_detection() {
        let (_temp_dir, git) = init_repo();
        assert!(git.hook_content("pre-commit").is_none());

        let hooks_dir = git.git_dir().join("hooks");
        fs::create_dir_all(&hooks_dir).unwrap();
        fs::write(hooks_dir.join("pre-commit"), "#!/bin/sh\n# File generated by pre-commit\n")
            .unwrap();

        assert!(git.hook_content("pre-commit").unwrap().contains("pre-commit"));
    }
}

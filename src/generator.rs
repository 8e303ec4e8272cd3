//! `.pre-commit-config.yaml` generation
//!
//! The document is a single repository entry pinned to a fixed revision, with
//! one hook per selected stack in selection order. Any file already at the
//! target path is copied aside first and never deleted.

use crate::error::{HookstackError, Result};
use crate::stacks::{self, StackDefinition};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Repository the hook manager clones the hook definitions from
pub const HOOK_REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");

/// Revision the generated configuration pins
pub const HOOK_REVISION: &str = "v1.0.0";

const HEADER: &str = "# Generated by hookstack setup; re-run it to change the selected stacks\n";

/// Timestamp format of backup file suffixes
const BACKUP_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// Hook manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfigDocument {
    pub repos: Vec<RepoEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    pub repo: String,
    pub rev: String,
    #[serde(default)]
    pub hooks: Vec<HookEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookEntry {
    pub id: String,
}

impl HookConfigDocument {
    /// Document for the given stacks, in order
    pub fn from_stacks(selected: &[&'static StackDefinition]) -> Self {
        Self {
            repos: vec![RepoEntry {
                repo: HOOK_REPOSITORY.to_string(),
                rev: HOOK_REVISION.to_string(),
                hooks: selected
                    .iter()
                    .map(|stack| HookEntry {
                        id: stack.hook_identifier.to_string(),
                    })
                    .collect(),
            }],
        }
    }

    /// Parse a document previously written to disk
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yml::from_str(content)?)
    }

    /// Serialized form, header included
    pub fn render(&self) -> Result<String> {
        let body = serde_yml::to_string(self)?;
        Ok(format!("{HEADER}{body}"))
    }

    /// Hook ids of the hookstack repository entry, in document order
    pub fn hook_identifiers(&self) -> Vec<&str> {
        self.repos
            .iter()
            .filter(|repo| repo.repo == HOOK_REPOSITORY)
            .flat_map(|repo| repo.hooks.iter().map(|hook| hook.id.as_str()))
            .collect()
    }

    /// Resolve every hookstack hook id, or describe why the document is unusable
    pub fn validate(
        &self,
        table: &'static [StackDefinition],
    ) -> std::result::Result<Vec<&'static StackDefinition>, String> {
        let ids = self.hook_identifiers();
        if ids.is_empty() {
            return Err(format!("no hooks from {HOOK_REPOSITORY}"));
        }

        ids.iter()
            .map(|id| {
                table
                    .iter()
                    .find(|stack| stack.hook_identifier == *id)
                    .ok_or_else(|| format!("unknown hook id '{id}'"))
            })
            .collect()
    }
}

/// Result of a successful [`generate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub document: HookConfigDocument,
    /// Where the previous file was copied, if there was one
    pub backup: Option<PathBuf>,
}

/// Render the document for `selected` and write it to `output_path`
pub fn generate(selected: &[&'static StackDefinition], output_path: &Path) -> Result<Generated> {
    generate_at(selected, output_path, Local::now())
}

fn generate_at(
    selected: &[&'static StackDefinition],
    output_path: &Path,
    now: DateTime<Local>,
) -> Result<Generated> {
    if selected.is_empty() {
        return Err(HookstackError::EmptySelection);
    }

    let document = HookConfigDocument::from_stacks(selected);
    let content = document.render()?;

    let backup = if output_path.exists() {
        Some(backup_existing(output_path, now)?)
    } else {
        None
    };

    fs::write(output_path, content).map_err(|source| HookstackError::WriteFailure {
        path: output_path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        "Wrote {} with {} hook(s)",
        output_path.display(),
        selected.len()
    );

    Ok(Generated { document, backup })
}

/// Copy `path` to a fresh `<path>.backup.<timestamp>[.N]`
fn backup_existing(path: &Path, now: DateTime<Local>) -> Result<PathBuf> {
    let mut base = OsString::from(path.as_os_str());
    base.push(".backup.");
    base.push(now.format(BACKUP_TIMESTAMP).to_string());

    let mut backup = PathBuf::from(&base);
    let mut suffix = 0u32;
    while backup.exists() {
        suffix += 1;
        let mut candidate = base.clone();
        candidate.push(format!(".{suffix}"));
        backup = PathBuf::from(candidate);
    }

    fs::copy(path, &backup).map_err(|source| HookstackError::BackupFailed {
        path: path.to_path_buf(),
        backup: backup.clone(),
        source,
    })?;
    tracing::info!("Backed up {} to {}", path.display(), backup.display());
    Ok(backup)
}

/// Parse `content` and validate it against the built-in table
pub fn load_existing(content: &str) -> std::result::Result<Vec<&'static StackDefinition>, String> {
    HookConfigDocument::parse(content)
        .map_err(|e| e.to_string())?
        .validate(stacks::STACKS)
}

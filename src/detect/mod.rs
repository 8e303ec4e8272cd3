//! Project and environment detection
//!
//! Answers three questions before anything runs: which host tools exist, where
//! the repository root is, and which stacks the working tree looks like.

pub mod package_manager;

use crate::error::{HookstackError, Result};
use crate::git::GitOperations;
use crate::stacks::{STACKS, StackDefinition};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Whether a missing tool halts the run or only degrades one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Mandatory,
    Optional,
}

/// Result of a tool capability query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Present,
    AbsentOptional,
    AbsentMandatory,
}

impl Capability {
    pub fn is_present(self) -> bool {
        self == Capability::Present
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Capability::Present => "present",
            Capability::AbsentOptional => "missing (optional)",
            Capability::AbsentMandatory => "missing (required)",
        };
        f.write_str(label)
    }
}

/// Finds executables
pub trait ToolLocator {
    fn locate(&self, tool: &str) -> bool;
}

/// Looks tools up on `PATH`
#[derive(Debug, Default, Clone, Copy)]
pub struct PathLocator;

impl ToolLocator for PathLocator {
    fn locate(&self, tool: &str) -> bool {
        which::which(tool).is_ok()
    }
}

/// Cached capability queries
///
/// Each tool is probed at most once per process. Names containing a path
/// separator (`./gradlew`, `node_modules/.bin/eslint`) are checked as files
/// relative to the project root instead of on `PATH`.
pub struct ToolProbe {
    locator: Box<dyn ToolLocator>,
    root: Option<PathBuf>,
    cache: HashMap<String, bool>,
}

impl fmt::Debug for ToolProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolProbe")
            .field("root", &self.root)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Default for ToolProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolProbe {
    pub fn new() -> Self {
        Self::with_locator(PathLocator)
    }

    pub fn with_locator(locator: impl ToolLocator + 'static) -> Self {
        Self {
            locator: Box::new(locator),
            root: None,
            cache: HashMap::new(),
        }
    }

    /// Resolve path-like tool names against `root`
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        self.root = Some(root.into());
        self.cache.retain(|tool, _| !tool.contains('/'));
    }

    /// Query a tool, classifying absence by `requirement`
    pub fn check_required_tool(&mut self, name: &str, requirement: Requirement) -> Capability {
        if self.is_present(name) {
            Capability::Present
        } else {
            match requirement {
                Requirement::Mandatory => Capability::AbsentMandatory,
                Requirement::Optional => Capability::AbsentOptional,
            }
        }
    }

    /// Like [`check_required_tool`](Self::check_required_tool) with a mandatory
    /// requirement, turning absence into [`HookstackError::FatalEnvironment`]
    pub fn require(&mut self, name: &str, remedy: &str) -> Result<()> {
        match self.check_required_tool(name, Requirement::Mandatory) {
            Capability::Present => Ok(()),
            _ => Err(HookstackError::FatalEnvironment {
                tool: name.to_string(),
                remedy: remedy.to_string(),
            }),
        }
    }

    /// First present tool out of `candidates`
    pub fn first_present<'a>(&mut self, candidates: &[&'a str]) -> Option<&'a str> {
        candidates.iter().copied().find(|tool| self.is_present(tool))
    }

    fn is_present(&mut self, name: &str) -> bool {
        if let Some(present) = self.cache.get(name) {
            return *present;
        }

        let present = if name.contains('/') {
            let path = Path::new(name);
            match &self.root {
                Some(root) if path.is_relative() => root.join(path).is_file(),
                _ => path.is_file(),
            }
        } else {
            self.locator.locate(name)
        };

        tracing::debug!("Probed {name}: {}", if present { "found" } else { "not found" });
        self.cache.insert(name.to_string(), present);
        present
    }
}

/// Locate the root of the enclosing git working tree
pub fn detect_project_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| HookstackError::io(".", e))?;
    detect_project_root_from(&cwd)
}

/// Locate the working-tree root starting at `start`
pub fn detect_project_root_from(start: &Path) -> Result<PathBuf> {
    let git = GitOperations::discover_from(start)
        .map_err(|_| HookstackError::NotARepository(start.to_path_buf()))?;
    git.workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| HookstackError::NotARepository(start.to_path_buf()))
}

/// What is currently at the configuration path
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExistingConfig {
    pub present: bool,
    pub content: Option<String>,
}

/// Read the configuration document at `path`, if any
pub fn detect_existing_config(path: &Path) -> Result<ExistingConfig> {
    if !path.is_file() {
        return Ok(ExistingConfig::default());
    }
    let content = std::fs::read_to_string(path).map_err(|e| HookstackError::io(path, e))?;
    Ok(ExistingConfig {
        present: true,
        content: Some(content),
    })
}

/// Files that identify a project type
enum Marker {
    /// Relative path that must exist
    Path(&'static str),
    /// Any top-level entry with this extension
    Extension(&'static str),
    /// Every listed path must exist
    All(&'static [&'static str]),
}

impl Marker {
    fn matches(&self, root: &Path) -> bool {
        match self {
            Marker::Path(rel) => root.join(rel).exists(),
            Marker::Extension(ext) => has_entry_with_extension(root, ext),
            Marker::All(rels) => rels.iter().all(|rel| root.join(rel).exists()),
        }
    }
}

fn markers_for(stack: &StackDefinition) -> &'static [Marker] {
    match stack.key {
        "android" => &[
            Marker::Path("app/src/main/AndroidManifest.xml"),
            Marker::Path("src/main/AndroidManifest.xml"),
        ],
        "dotnet" => &[
            Marker::Extension("sln"),
            Marker::Extension("csproj"),
            Marker::Extension("fsproj"),
        ],
        "flutter" => &[Marker::Path("pubspec.yaml")],
        "ios" => &[
            Marker::Extension("xcodeproj"),
            Marker::Extension("xcworkspace"),
            Marker::Path("Podfile"),
            Marker::Path("Package.swift"),
        ],
        "js" => &[Marker::Path("package.json")],
        "php" => &[Marker::Path("composer.json")],
        "python" => &[
            Marker::Path("pyproject.toml"),
            Marker::Path("setup.py"),
            Marker::Path("requirements.txt"),
            Marker::Path("Pipfile"),
        ],
        "ror" => &[Marker::All(&["Gemfile", "config/application.rb"])],
        _ => &[],
    }
}

fn has_entry_with_extension(dir: &Path, extension: &str) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries.filter_map(|entry| entry.ok()).any(|entry| {
        entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
    })
}

/// Stacks whose marker files are present under `root`, in table order
pub fn detect_project_types(root: &Path) -> Vec<&'static StackDefinition> {
    STACKS
        .iter()
        .filter(|stack| markers_for(stack).iter().any(|marker| marker.matches(root)))
        .collect()
}

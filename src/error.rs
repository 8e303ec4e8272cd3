//! Error types for hookstack
//!
//! Every variant is terminal for the current invocation. The CLI layer wraps
//! these in `anyhow` and returns them from `main`, which prints the message on
//! stderr and exits with status 1.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hookstack library operations
pub type Result<T> = std::result::Result<T, HookstackError>;

/// Main error type for hookstack
#[derive(Error, Debug)]
pub enum HookstackError {
    /// A mandatory host tool is not on `PATH`
    #[error("Required tool '{tool}' was not found on PATH. {remedy}")]
    FatalEnvironment { tool: String, remedy: String },

    /// The working directory is not inside a git working tree
    #[error("Not a git repository: {0}. Run 'git init' first or change into a repository")]
    NotARepository(PathBuf),

    /// The user refused to install a dependency the workflow cannot run without
    #[error("Installation of {0} declined; setup cannot continue without it")]
    UserDeclinedInstall(String),

    /// Installing the hook manager failed
    #[error("Failed to install {tool}: {output}")]
    HookManagerInstallFailed { tool: String, output: String },

    /// The hook manager's install step exited non-zero
    #[error("Hook installation failed:\n{0}")]
    HookInstallFailed(String),

    /// The generator was called without any stacks
    #[error("No stacks selected")]
    EmptySelection,

    /// Parsing the menu input produced zero valid stacks
    #[error("No valid selection in '{0}'. Enter one or more stack numbers separated by commas")]
    NoValidSelection(String),

    /// Copying the previous configuration aside failed
    #[error("Failed to back up {path} to {backup}: {source}")]
    BackupFailed {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the configuration document failed
    #[error("Failed to write {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A blocking quality gate failed
    #[error("Check '{check}' failed. {hint}")]
    BlockingCheckFailure { check: String, hint: String },

    /// No stack is registered under the given key
    #[error("Unknown stack '{0}'. Run 'hookstack stacks' to list the supported stacks")]
    UnknownStack(String),

    /// I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    /// Git error
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Interactive prompt error
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// Invalid glob pattern in a check table
    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] globset::Error),
}

impl HookstackError {
    /// Build an [`HookstackError::Io`] for the given path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<figment::Error> for HookstackError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

//! # hookstack
//!
//! Multi-stack pre-commit hooks. `hookstack setup` writes a
//! `.pre-commit-config.yaml` for the stacks a repository uses and installs the
//! git hook; at commit time `pre-commit` calls `hookstack run <stack>`, which
//! runs that stack's formatters, linters and tests in order.
//!
//! ```bash
//! hookstack setup          # interactive
//! hookstack run python     # what the hook manager runs
//! ```

pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod generator;
pub mod git;
pub mod hooks;
pub mod selection;
pub mod setup;
pub mod shared;
pub mod stacks;

pub use cli::Output;
pub use error::{HookstackError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Commit-time hook execution
//!
//! `hookstack run <stack>` is what `pre-commit` dispatches to. It resolves the
//! stack's check sequence, runs each external tool through a [`ToolRunner`]
//! and folds the results into a [`RunReport`].

mod aggregator;
mod runner;

pub use aggregator::{ReportAggregator, Stager};
pub use runner::{Invocation, ProcessRunner, ToolExit, ToolRunner};

use serde::Serialize;
use std::fmt;

/// How much a failing check matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    /// Failure halts the sequence and fails the commit
    Blocking,
    /// Tool rewrites files in place; changes are re-staged
    AutoFixed,
    /// Failure is reported, commit proceeds
    Warning,
    /// Purely advisory output
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Blocking => "blocking",
            Severity::AutoFixed => "auto-fix",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(label)
    }
}

/// Result of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub name: String,
    pub severity: Severity,
    pub passed: bool,
    /// Set when the check did not run (missing optional tool, no matching files, skip list)
    pub skipped: bool,
    pub message: String,
}

impl CheckOutcome {
    pub fn passed(name: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            severity,
            passed: true,
            skipped: false,
            message: message.into(),
        }
    }

    pub fn failed(name: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            severity,
            passed: false,
            skipped: false,
            message: message.into(),
        }
    }

    pub fn skipped(name: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            severity,
            passed: true,
            skipped: true,
            message: message.into(),
        }
    }
}

/// Ordered outcomes for one stack invocation
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub stack: String,
    pub outcomes: Vec<CheckOutcome>,
    /// Name of the blocking check that stopped the sequence, if any
    pub halted_at: Option<String>,
    /// Files re-staged after auto-fixes
    pub restaged: Vec<String>,
}

impl RunReport {
    pub fn new(stack: &str) -> Self {
        Self {
            stack: stack.to_string(),
            ..Self::default()
        }
    }

    /// True when every blocking outcome passed
    pub fn overall_passed(&self) -> bool {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.severity == Severity::Blocking)
            .all(|outcome| outcome.passed)
    }

    /// Outcomes that failed without blocking the commit
    pub fn advisories(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|outcome| {
            !outcome.passed && matches!(outcome.severity, Severity::Warning | Severity::Info)
        })
    }
}

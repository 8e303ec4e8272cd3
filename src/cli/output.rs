//! Terminal output for hookstack
//!
//! Consistent styled messages in the manner of lint-staged and other modern
//! commit tooling: one symbol per message kind, dim secondary text.

use crate::hooks::{CheckOutcome, RunReport, Severity};
use console::style;

/// Output handler for consistent CLI formatting
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    /// Create a new output handler
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✔").green(), message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        // Errors are always shown, even in quiet mode
        eprintln!("{} {}", style("✖").red(), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    /// Print a verbose message (only if verbose mode is enabled)
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("{} {}", style("ℹ").dim(), style(message).dim());
        }
    }

    /// Print a header/title
    pub fn header(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    /// Print a step in a process
    pub fn step(&self, step: &str) {
        if !self.quiet {
            println!("{} {}", style("❯").cyan(), step);
        }
    }

    /// Print a table row
    pub fn table_row(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {:<20} {}", style(key).dim(), value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if !self.quiet {
            println!("  • {item}");
        }
    }

    /// Print an indented message
    pub fn indent(&self, message: &str) {
        if !self.quiet {
            println!("    {message}");
        }
    }

    /// Print a section separator
    pub fn separator(&self) {
        if !self.quiet {
            println!("{}", style("─".repeat(50)).dim());
        }
    }

    /// Print blank line
    pub fn blank_line(&self) {
        if !self.quiet {
            println!();
        }
    }

    /// Print a table summarizing every check of a run
    pub fn run_summary(&self, report: &RunReport) {
        if self.quiet {
            return;
        }

        self.blank_line();
        self.separator();
        for outcome in &report.outcomes {
            let (icon, status) = Self::status_of(outcome);
            println!(
                "{} {:<24} {:<9} {}",
                icon,
                outcome.name,
                style(outcome.severity.to_string()).dim(),
                status
            );
        }
        if let Some(check) = &report.halted_at {
            println!("{} stopped after {}", style("✖").red().bold(), style(check).bold());
        }
        if !report.restaged.is_empty() {
            println!(
                "{} re-staged {} file(s)",
                style("ℹ").blue(),
                report.restaged.len()
            );
        }
        self.separator();
    }

    fn status_of(outcome: &CheckOutcome) -> (console::StyledObject<&'static str>, String) {
        if outcome.skipped {
            (style("-").dim(), style(&outcome.message).dim().to_string())
        } else if outcome.passed {
            (style("✔").green(), outcome.message.clone())
        } else if outcome.severity == Severity::Blocking {
            (style("✖").red(), style(&outcome.message).red().to_string())
        } else {
            (style("⚠").yellow(), style(&outcome.message).yellow().to_string())
        }
    }
}

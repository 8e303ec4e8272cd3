//! External process invocation

use std::path::{Path, PathBuf};
use std::process::Command;

/// A fully resolved command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = String>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Build from an argv vector; the first element is the program
    pub fn from_argv(mut argv: Vec<String>) -> Option<Self> {
        if argv.is_empty() {
            return None;
        }
        let program = argv.remove(0);
        Some(Self {
            program,
            args: argv,
        })
    }

    /// Shell-like rendering for diagnostics
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Captured result of an external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExit {
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Combined output, stderr last
    pub fn combined_output(&self) -> String {
        let mut text = self.stdout.trim_end().to_string();
        let stderr = self.stderr.trim_end();
        if !stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stderr);
        }
        text
    }
}

/// Seam between the aggregator and the operating system
pub trait ToolRunner {
    fn run(&self, invocation: &Invocation, cwd: &Path) -> std::io::Result<ToolExit>;
}

/// Runs tools as child processes, waiting for each to exit
#[derive(Debug, Default, Clone)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation, cwd: &Path) -> std::io::Result<ToolExit> {
        let program = resolve_program(&invocation.program, cwd);
        tracing::debug!("Running {} in {}", invocation.display(), cwd.display());

        let output = Command::new(program)
            .args(&invocation.args)
            .current_dir(cwd)
            .output()?;

        Ok(ToolExit {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Programs given with a path separator (`./gradlew`, `vendor/bin/phpstan`)
/// are resolved against the project root rather than `PATH`
fn resolve_program(program: &str, cwd: &Path) -> PathBuf {
    if program.contains('/') && !Path::new(program).is_absolute() {
        cwd.join(program)
    } else {
        PathBuf::from(program)
    }
}

//! The external hook manager (`pre-commit`)

use crate::error::{HookstackError, Result};
use crate::git::GitOperations;
use crate::hooks::{Invocation, ProcessRunner, ToolExit, ToolRunner};
use std::fmt;
use std::path::Path;

/// How the hook manager gets installed on this host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStrategy {
    Homebrew,
    /// `pip3`/`pip` user install
    Pip(&'static str),
}

impl InstallStrategy {
    /// Command line installing `package`
    pub fn argv(&self, package: &str) -> Vec<String> {
        let argv: Vec<&str> = match self {
            InstallStrategy::Homebrew => vec!["brew", "install", package],
            InstallStrategy::Pip(pip) => vec![*pip, "install", "--user", package],
        };
        argv.into_iter().map(String::from).collect()
    }
}

impl fmt::Display for InstallStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallStrategy::Homebrew => f.write_str("Homebrew"),
            InstallStrategy::Pip(pip) => write!(f, "{pip} --user"),
        }
    }
}

/// Operations setup needs from the hook manager
pub trait HookManager {
    /// Executable name, also the package name installers know it by
    fn name(&self) -> &str;

    fn install(&self, strategy: InstallStrategy, root: &Path) -> Result<()>;

    /// Install the git hook script into the repository
    fn install_hook(&self, root: &Path) -> Result<()>;

    /// Run every configured hook against all files
    fn run_all(&self, root: &Path) -> Result<ToolExit>;

    /// Whether the repository's git hook was written by this hook manager
    fn hook_installed(&self, root: &Path) -> bool;
}

/// The `pre-commit` command line
pub struct PreCommitCli<R: ToolRunner = ProcessRunner> {
    program: String,
    runner: R,
}

impl PreCommitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_runner(program, ProcessRunner)
    }
}

impl<R: ToolRunner> PreCommitCli<R> {
    pub fn with_runner(program: impl Into<String>, runner: R) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    fn run(&self, args: &[&str], root: &Path) -> std::io::Result<ToolExit> {
        let invocation = Invocation::new(&self.program, args.iter().map(|a| a.to_string()));
        tracing::debug!("Running {}", invocation.display());
        self.runner.run(&invocation, root)
    }
}

impl<R: ToolRunner> HookManager for PreCommitCli<R> {
    fn name(&self) -> &str {
        &self.program
    }

    fn install(&self, strategy: InstallStrategy, root: &Path) -> Result<()> {
        let failed = |output: String| HookstackError::HookManagerInstallFailed {
            tool: self.program.clone(),
            output,
        };

        let invocation =
            Invocation::from_argv(strategy.argv(&self.program)).ok_or_else(|| failed(String::new()))?;
        tracing::info!("Installing {} with {strategy}", self.program);

        let exit = self
            .runner
            .run(&invocation, root)
            .map_err(|e| failed(format!("{}: {e}", invocation.display())))?;
        if !exit.success() {
            return Err(failed(exit.combined_output()));
        }
        Ok(())
    }

    fn install_hook(&self, root: &Path) -> Result<()> {
        let exit = self
            .run(&["install"], root)
            .map_err(|e| HookstackError::HookInstallFailed(format!("{} install: {e}", self.program)))?;
        if !exit.success() {
            return Err(HookstackError::HookInstallFailed(exit.combined_output()));
        }
        Ok(())
    }

    fn run_all(&self, root: &Path) -> Result<ToolExit> {
        self.run(&["run", "--all-files"], root)
            .map_err(|e| HookstackError::io(root, e))
    }

    fn hook_installed(&self, root: &Path) -> bool {
        GitOperations::discover_from(root)
            .ok()
            .and_then(|git| git.hook_content("pre-commit"))
            .is_some_and(|script| script.contains(&self.program))
    }
}

use crate::cli::Output;
use crate::config::Settings;
use crate::detect::{self, ToolProbe};
use crate::error::HookstackError;
use crate::git::GitOperations;
use crate::hooks::{ProcessRunner, ReportAggregator};
use crate::shared::glob::relative_to;
use crate::stacks::{self, checks};
use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct RunArgs {
    /// Stack key (android, dotnet, flutter, ios, js, php, python, ror)
    pub stack: String,

    /// Files to check; defaults to the staged files
    pub files: Vec<PathBuf>,
}

pub async fn execute(args: RunArgs, config: Option<&Path>, output: &Output) -> Result<()> {
    let stack = stacks::by_key(&args.stack)?;
    let root = detect::detect_project_root()?;
    let git = GitOperations::discover_from(&root)?;
    let settings = Settings::load(Some(&root), config)?;

    let files = if args.files.is_empty() {
        git.get_staged_files()?
    } else {
        let cwd = std::env::current_dir().context("Cannot read the current directory")?;
        args.files
            .iter()
            .map(|file| relative_to(&cwd.join(file), &root))
            .collect()
    };
    tracing::info!("Running {} checks on {} file(s)", stack.key, files.len());

    output.header(&format!("{} checks", stack.display_name));
    let mut probe = ToolProbe::new();
    let report = ReportAggregator::new(stack, &root, files, ProcessRunner, &mut probe, &git, output)
        .with_skip(settings.run.skip)
        .with_show_output(settings.run.show_output)
        .run()?;

    output.run_summary(&report);

    if report.overall_passed() {
        let advisories = report.advisories().count();
        if advisories > 0 {
            output.warning(&format!("{advisories} advisory check(s) reported problems"));
        }
        output.success(&format!("{} checks passed", stack.display_name));
        return Ok(());
    }

    let check = report
        .halted_at
        .clone()
        .unwrap_or_else(|| stack.display_name.to_string());
    let hint = checks::for_stack(stack)
        .checks
        .iter()
        .find(|definition| definition.name == check)
        .map(|definition| definition.hint.to_string())
        .unwrap_or_default();
    Err(HookstackError::BlockingCheckFailure { check, hint }.into())
}

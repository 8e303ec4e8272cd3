use crate::cli::Output;
use crate::cli::prompt::DialoguerPrompter;
use crate::config::Settings;
use crate::detect::{self, ToolProbe};
use crate::setup::hook_manager::PreCommitCli;
use crate::setup::{Completion, Orchestrator, SetupContext};
use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;

#[derive(Args, Default)]
pub struct SetupArgs {}

pub async fn execute(_args: SetupArgs, config: Option<&Path>, output: &Output) -> Result<()> {
    let cwd = std::env::current_dir().context("Cannot read the current directory")?;

    // Settings may live in the repository; outside one the orchestrator reports the error
    let root = detect::detect_project_root_from(&cwd).ok();
    let settings = Settings::load(root.as_deref(), config)?;

    output.header("hookstack setup");
    let hook_manager = PreCommitCli::new(settings.setup.hook_manager.clone());
    let mut orchestrator = Orchestrator::new(
        DialoguerPrompter::new(),
        hook_manager,
        &settings.setup,
        output,
    );

    let ctx = orchestrator.run(SetupContext::new(cwd, ToolProbe::new()))?;
    tracing::info!("Setup finished: {:?}", ctx.completion);
    if ctx.completion == Some(Completion::ReusedConfig) {
        output.info("Hook reinstalled for the existing configuration");
    }
    Ok(())
}

use crate::cli::Output;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod detect;
pub mod run;
pub mod setup;
pub mod stacks;
pub mod version;

#[derive(Parser)]
#[command(
    name = "hookstack",
    version = env!("CARGO_PKG_VERSION"),
    about = "Multi-stack pre-commit hooks for Android, .NET, Flutter, iOS, JS/TS, PHP, Python and Rails",
    long_about = "hookstack writes a pre-commit configuration for the stacks a repository uses \
                  and runs each stack's formatters, linters and tests at commit time."
)]
pub struct Cli {
    /// Run as if started in <DIR> instead of current working directory
    #[arg(short = 'C', long = "directory", global = true)]
    pub directory: Option<PathBuf>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactively configure hooks for this repository (the default)
    Setup(setup::SetupArgs),
    /// Run one stack's checks; invoked by pre-commit at commit time
    Run(run::RunArgs),
    /// List the supported stacks and what they need installed
    Stacks(stacks::StacksArgs),
    /// Show which stacks and package managers this repository looks like
    Detect(detect::DetectArgs),
    /// Show version information
    Version(version::VersionArgs),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        // Change directory if specified
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)
                .with_context(|| format!("Cannot change into {}", dir.display()))?;
        }

        // Set up logging based on verbosity
        setup_logging(self.verbose, self.quiet);

        let output = Output::new(self.verbose > 0, self.quiet);
        let config = self.config.as_deref();

        match self.command {
            Some(Commands::Setup(args)) => setup::execute(args, config, &output).await,
            Some(Commands::Run(args)) => run::execute(args, config, &output).await,
            Some(Commands::Stacks(args)) => stacks::execute(args, &output).await,
            Some(Commands::Detect(args)) => detect::execute(args, &output).await,
            Some(Commands::Version(args)) => version::execute(args, &output).await,
            None => setup::execute(setup::SetupArgs::default(), config, &output).await,
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info,globset=warn"),
            2 => tracing_subscriber::EnvFilter::new("debug,globset=warn"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

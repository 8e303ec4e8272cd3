use anyhow::Result;
use clap::Parser;
use hookstack::cli::commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run().await
}

use crate::cli::Output;
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct VersionArgs {
    /// Show detailed version information
    #[arg(long)]
    pub detailed: bool,
}

pub async fn execute(args: VersionArgs, output: &Output) -> Result<()> {
    println!("hookstack {}", env!("CARGO_PKG_VERSION"));

    if args.detailed {
        output.table_row("Hook revision:", crate::generator::HOOK_REVISION);
        output.table_row("Repository:", env!("CARGO_PKG_REPOSITORY"));
        output.table_row("License:", env!("CARGO_PKG_LICENSE"));
        output.table_row("Description:", env!("CARGO_PKG_DESCRIPTION"));
        output.table_row("Stacks:", &crate::stacks::STACKS.len().to_string());
        output.table_row("Platform:", &os_info::get().to_string());
        output.table_row("Target:", std::env::consts::ARCH);
        output.table_row(
            "Profile:",
            if cfg!(debug_assertions) { "debug" } else { "release" },
        );
    }
    Ok(())
}

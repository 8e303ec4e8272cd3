use crate::cli::Output;
use crate::stacks::{STACKS, checks};
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct StacksArgs {
    /// Also list each stack's checks in run order
    #[arg(long)]
    pub checks: bool,
}

pub async fn execute(args: StacksArgs, output: &Output) -> Result<()> {
    output.header("Supported stacks");

    for stack in STACKS {
        println!(
            "  {:>2}) {:<15} {:<8} {}",
            stack.id, stack.display_name, stack.key, stack.hook_identifier
        );
        for requirement in stack.requirements {
            output.indent(&format!("needs {requirement}"));
        }

        if args.checks {
            for check in checks::for_stack(stack).checks {
                let condition = check
                    .when
                    .map(|marker| format!(" (when {marker} exists)"))
                    .unwrap_or_default();
                output.indent(&format!("{} [{}]{condition}", check.name, check.severity));
            }
        }
    }

    output.blank_line();
    output.info("Run 'hookstack setup' to enable stacks in this repository");
    Ok(())
}

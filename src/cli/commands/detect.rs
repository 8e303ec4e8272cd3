use crate::cli::Output;
use crate::detect::package_manager::PackageManagerDetector;
use crate::detect::{self, Requirement, ToolProbe};
use crate::stacks::checks;
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct DetectArgs {}

pub async fn execute(_args: DetectArgs, output: &Output) -> Result<()> {
    let root = detect::detect_project_root()?;
    output.header(&format!("Project at {}", root.display()));

    let detected = detect::detect_project_types(&root);
    if detected.is_empty() {
        output.warning("No known stack detected");
        output.info("Run 'hookstack stacks' to see the marker files each stack needs");
        return Ok(());
    }

    let mut probe = ToolProbe::new().with_root(&root);
    let detector = PackageManagerDetector::new();
    for stack in &detected {
        let stack_checks = checks::for_stack(stack);
        output.step(&format!("{} ({})", stack.display_name, stack.id));

        if let Some(pm) = stack_checks
            .ecosystem
            .and_then(|ecosystem| detector.detect(ecosystem, &root))
        {
            output.table_row("Package manager:", pm.display_name());
        }
        if let Some(runtime) = stack_checks.runtime {
            let capability = probe.check_required_tool(runtime, Requirement::Mandatory);
            output.table_row(&format!("{runtime}:"), &capability.to_string());
        }
    }

    let ids: Vec<String> = detected.iter().map(|s| s.id.to_string()).collect();
    output.blank_line();
    output.info(&format!("Suggested selection: {}", ids.join(",")));
    Ok(())
}

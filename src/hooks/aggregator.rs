//! Runs one stack's check sequence and folds the results into a report

use super::{CheckOutcome, Invocation, RunReport, Severity, ToolExit, ToolRunner};
use crate::cli::Output;
use crate::detect::package_manager::{PackageManager, PackageManagerDetector, ResolvedCommand};
use crate::detect::{Capability, Requirement, ToolProbe};
use crate::error::HookstackError;
use crate::git::GitOperations;
use crate::shared::glob::{build_globset, filter_matching};
use crate::stacks::StackDefinition;
use crate::stacks::checks::{self, CheckDefinition, Launcher, StackChecks, Targets};
use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Writes fixed files back into the commit
pub trait Stager {
    fn stage(&self, paths: &[PathBuf]) -> Result<()>;
}

impl Stager for GitOperations {
    fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        self.stage_paths(paths)
    }
}

/// Exit codes a fixer may return without it being a tool error. Many fixers
/// use 1 for "changed files" or "offenses remain".
const FIXER_TOLERATED_CODES: &[i32] = &[0, 1];

/// Drives the checks of one stack in order
pub struct ReportAggregator<'a, R: ToolRunner> {
    stack: &'static StackDefinition,
    checks: &'static StackChecks,
    root: PathBuf,
    files: Vec<PathBuf>,
    runner: R,
    probe: &'a mut ToolProbe,
    stager: &'a dyn Stager,
    output: &'a Output,
    package_manager: Option<PackageManager>,
    skip: Vec<String>,
    show_output: bool,
    /// Presence answers from inside package-manager environments
    in_environment: HashMap<String, bool>,
}

impl<'a, R: ToolRunner> ReportAggregator<'a, R> {
    /// `files` are the candidate paths (staged or passed by the hook manager),
    /// relative to `root`
    pub fn new(
        stack: &'static StackDefinition,
        root: impl Into<PathBuf>,
        files: Vec<PathBuf>,
        runner: R,
        probe: &'a mut ToolProbe,
        stager: &'a dyn Stager,
        output: &'a Output,
    ) -> Self {
        let root = root.into();
        let checks = checks::for_stack(stack);
        let package_manager = checks
            .ecosystem
            .and_then(|ecosystem| PackageManagerDetector::new().detect(ecosystem, &root));
        probe.set_root(&root);

        Self {
            stack,
            checks,
            root,
            files,
            runner,
            probe,
            stager,
            output,
            package_manager,
            skip: Vec::new(),
            show_output: false,
            in_environment: HashMap::new(),
        }
    }

    /// Check names to report as skipped without running them
    pub fn with_skip(mut self, skip: Vec<String>) -> Self {
        self.skip = skip;
        self
    }

    /// Echo tool output for passing checks too
    pub fn with_show_output(mut self, show_output: bool) -> Self {
        self.show_output = show_output;
        self
    }

    /// Run every check in order, halting at the first blocking failure
    pub fn run(mut self) -> Result<RunReport> {
        let mut report = RunReport::new(self.stack.key);

        if let Some(runtime) = self.checks.runtime {
            self.probe.require(
                runtime,
                &format!("Install {runtime} to use the {} hooks", self.stack.display_name),
            )?;
        }

        if let Some(pm) = self.package_manager {
            tracing::debug!("Using {} for {}", pm.display_name(), self.stack.display_name);
        }

        for check in self.checks.checks {
            self.output.step(&format!("{} ({})", check.name, check.severity));
            let outcome = self.run_check(check, &mut report)?;
            let halt = !outcome.passed && outcome.severity == Severity::Blocking;
            report.outcomes.push(outcome);

            if halt {
                report.halted_at = Some(check.name.to_string());
                tracing::info!("Halting {} checks after '{}'", self.stack.key, check.name);
                break;
            }
        }

        Ok(report)
    }

    fn run_check(&mut self, check: &CheckDefinition, report: &mut RunReport) -> Result<CheckOutcome> {
        if self.skip.iter().any(|name| name.eq_ignore_ascii_case(check.name)) {
            self.output.info("Skipped by configuration");
            return Ok(CheckOutcome::skipped(check.name, check.severity, "skipped by configuration"));
        }

        if let Some(marker) = check.when {
            if !self.root.join(marker).exists() {
                let message = format!("not applicable (no {marker})");
                self.output.verbose(&message);
                return Ok(CheckOutcome::skipped(check.name, check.severity, message));
            }
        }

        let targets = match check.targets.patterns() {
            Some(patterns) => {
                let set = build_globset(patterns).map_err(HookstackError::from)?;
                let matching = filter_matching(&self.files, &set);
                if matching.is_empty() {
                    self.output.verbose("No matching files");
                    return Ok(CheckOutcome::skipped(check.name, check.severity, "no matching files"));
                }
                matching
            }
            None => Vec::new(),
        };

        let resolved = self.resolve(check);
        let mut capability = self.probe.check_required_tool(&resolved.probe, check.requirement);
        let mut missing = resolved.probe.clone();
        if capability.is_present() {
            if let Some(presence) = &resolved.presence {
                if !self.installed_in_environment(presence) {
                    missing = match self.package_manager {
                        Some(pm) => format!("{} in the {} environment", check.program, pm.display_name()),
                        None => check.program.to_string(),
                    };
                    capability = match check.requirement {
                        Requirement::Mandatory => Capability::AbsentMandatory,
                        Requirement::Optional => Capability::AbsentOptional,
                    };
                }
            }
        }

        match capability {
            Capability::Present => {}
            Capability::AbsentOptional => {
                let message = format!("{missing} not found, check skipped");
                self.output.warning(&message);
                return Ok(CheckOutcome::skipped(check.name, check.severity, message));
            }
            Capability::AbsentMandatory => {
                return Err(HookstackError::FatalEnvironment {
                    tool: missing,
                    remedy: format!("It is required by the '{}' check", check.name),
                }
                .into());
            }
        }
        let launcher = resolved.argv;

        let snapshot = if check.severity == Severity::AutoFixed {
            let watched = if targets.is_empty() { self.files.clone() } else { targets.clone() };
            Some(Snapshot::take(&self.root, &watched))
        } else {
            None
        };

        let invocations = self.invocations(check, &launcher, &targets);
        let mut failures = Vec::new();
        for invocation in &invocations {
            match self.runner.run(invocation, &self.root) {
                Ok(exit) => {
                    if !Self::exit_ok(check.severity, &exit) {
                        failures.push(Failure::Exit(invocation.display(), exit));
                    } else if self.show_output {
                        self.print_tool_output(&exit.combined_output());
                    }
                }
                Err(e) => failures.push(Failure::Spawn(invocation.display(), e.to_string())),
            }
        }

        if let Some(snapshot) = snapshot {
            return self.finish_fix(check, snapshot, failures, report);
        }

        if failures.is_empty() {
            self.output.success(&format!("{} passed", check.name));
            return Ok(CheckOutcome::passed(check.name, check.severity, "passed"));
        }

        let summary = self.report_failures(check, &failures);
        match check.severity {
            Severity::Blocking => {
                self.output.error(&format!("{} failed", check.name));
                self.output.indent(check.hint);
            }
            _ => self.output.warning(&format!("{} reported problems (not blocking)", check.name)),
        }
        Ok(CheckOutcome::failed(check.name, check.severity, summary))
    }

    fn finish_fix(
        &mut self,
        check: &CheckDefinition,
        snapshot: Snapshot,
        failures: Vec<Failure>,
        report: &mut RunReport,
    ) -> Result<CheckOutcome> {
        if !failures.is_empty() {
            // The fixer itself broke; nothing it touched can be trusted
            let summary = self.report_failures(check, &failures);
            self.output.error(&format!("{} could not run", check.name));
            self.output.indent(check.hint);
            return Ok(CheckOutcome::failed(check.name, Severity::Blocking, summary));
        }

        let changed = snapshot.changed(&self.root);
        if changed.is_empty() {
            self.output.success(&format!("{}: nothing to fix", check.name));
            return Ok(CheckOutcome::passed(check.name, check.severity, "no changes"));
        }

        self.stager.stage(&changed)?;
        for path in &changed {
            self.output.indent(&format!("fixed and re-staged {}", path.display()));
            let path = path.display().to_string();
            if !report.restaged.contains(&path) {
                report.restaged.push(path);
            }
        }
        self.output
            .success(&format!("{} fixed {} file(s)", check.name, changed.len()));
        Ok(CheckOutcome::passed(
            check.name,
            check.severity,
            format!("fixed and re-staged {} file(s)", changed.len()),
        ))
    }

    fn exit_ok(severity: Severity, exit: &ToolExit) -> bool {
        match severity {
            Severity::AutoFixed => exit
                .code
                .is_some_and(|code| FIXER_TOLERATED_CODES.contains(&code)),
            _ => exit.success(),
        }
    }

    /// Launcher argv and how to probe for availability
    fn resolve(&self, check: &CheckDefinition) -> ResolvedCommand {
        let direct = |program: &str| ResolvedCommand {
            argv: vec![program.to_string()],
            probe: program.to_string(),
            presence: None,
        };
        match (check.launcher, self.package_manager) {
            (Launcher::ProjectExec, Some(pm)) => pm.exec_command(check.program, &self.root),
            (Launcher::PackageManager, Some(pm)) => direct(pm.command()),
            _ => direct(check.program),
        }
    }

    /// Run a presence command once, remembering the answer
    fn installed_in_environment(&mut self, presence: &[String]) -> bool {
        let key = presence.join(" ");
        if let Some(installed) = self.in_environment.get(&key) {
            return *installed;
        }

        let installed = match Invocation::from_argv(presence.to_vec()) {
            Some(invocation) => self
                .runner
                .run(&invocation, &self.root)
                .is_ok_and(|exit| exit.success()),
            None => false,
        };
        tracing::debug!(
            "Probed {} in environment: {}",
            presence.last().map(String::as_str).unwrap_or_default(),
            if installed { "found" } else { "not found" }
        );
        self.in_environment.insert(key, installed);
        installed
    }

    fn invocations(
        &self,
        check: &CheckDefinition,
        launcher: &[String],
        targets: &[PathBuf],
    ) -> Vec<Invocation> {
        let base: Vec<String> = launcher
            .iter()
            .cloned()
            .chain(check.args.iter().map(|arg| arg.to_string()))
            .collect();
        let path_arg = |path: &PathBuf| path.to_string_lossy().into_owned();

        let argvs: Vec<Vec<String>> = match check.targets {
            Targets::Project => vec![base],
            Targets::Files(_) => {
                vec![base.into_iter().chain(targets.iter().map(path_arg)).collect()]
            }
            Targets::EachFile(_) => targets
                .iter()
                .map(|path| {
                    let mut argv = base.clone();
                    argv.push(path_arg(path));
                    argv
                })
                .collect(),
        };

        argvs.into_iter().filter_map(Invocation::from_argv).collect()
    }

    fn report_failures(&self, check: &CheckDefinition, failures: &[Failure]) -> String {
        let mut lines = Vec::new();
        for failure in failures {
            match failure {
                Failure::Exit(command, exit) => {
                    let code = exit
                        .code
                        .map_or_else(|| "signal".to_string(), |code| code.to_string());
                    tracing::debug!("{} exited with {code}: {command}", check.name);
                    self.print_tool_output(&exit.combined_output());
                    lines.push(format!("{command} exited with {code}"));
                }
                Failure::Spawn(command, error) => {
                    self.output.indent(&format!("could not start {command}: {error}"));
                    lines.push(format!("{command} could not start: {error}"));
                }
            }
        }
        lines.join("; ")
    }

    fn print_tool_output(&self, text: &str) {
        for line in text.lines() {
            self.output.indent(line);
        }
    }
}

enum Failure {
    Exit(String, ToolExit),
    Spawn(String, String),
}

/// File contents captured before a fixer runs
struct Snapshot {
    contents: HashMap<PathBuf, Option<Vec<u8>>>,
}

impl Snapshot {
    fn take(root: &Path, paths: &[PathBuf]) -> Self {
        let contents = paths
            .iter()
            .map(|path| (path.clone(), std::fs::read(root.join(path)).ok()))
            .collect();
        Self { contents }
    }

    /// Paths whose content differs now, in sorted order
    fn changed(&self, root: &Path) -> Vec<PathBuf> {
        let mut changed: Vec<PathBuf> = self
            .contents
            .iter()
            .filter(|(path, before)| {
                let after = std::fs::read(root.join(path)).ok();
                after.is_some() && &after != *before
            })
            .map(|(path, _)| path.clone())
            .collect();
        changed.sort();
        changed
    }
}

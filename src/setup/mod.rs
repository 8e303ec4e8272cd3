//! Interactive setup
//!
//! Setup is a linear state machine. Every state is a gate: it either moves to
//! the next state or halts the whole run with a [`HookstackError`]. All
//! progress lives in a [`SetupContext`] that each transition receives.
//!
//! ```text
//! Start → DetectOs → VerifyGitRepo → VerifyScriptRuntime
//!   → VerifyOrInstallHookManager → CheckExistingConfig
//!   → SelectStacks → GenerateConfig → InstallHook
//!   → OptionalFullRun → PrintRequirements → Done
//! ```

pub mod hook_manager;

use crate::cli::Output;
use crate::cli::prompt::Prompter;
use crate::config::SetupSettings;
use crate::detect::{self, ExistingConfig, Requirement, ToolProbe};
use crate::error::{HookstackError, Result};
use crate::generator::{self, Generated};
use crate::selection::{self, Selection};
use crate::stacks::{self, StackDefinition};
use hook_manager::{HookManager, InstallStrategy};
use std::path::{Path, PathBuf};

pub const PROMPT_INSTALL: &str = "Install hook manager now? (y/n)";
pub const PROMPT_RECONFIGURE: &str = "Reconfigure? (y/n)";
pub const PROMPT_CHOICES: &str = "Enter your choice(s):";
pub const PROMPT_FULL_RUN: &str = "Run checks on all existing files now? (y/n)";

/// Setup states, in the order they are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupState {
    Start,
    DetectOs,
    VerifyGitRepo,
    VerifyScriptRuntime,
    VerifyOrInstallHookManager,
    CheckExistingConfig,
    SelectStacks,
    GenerateConfig,
    InstallHook,
    OptionalFullRun,
    PrintRequirements,
    Done,
}

/// How a successful setup ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A new configuration was written and the hook installed
    Configured,
    /// The existing configuration was kept and the hook (re)installed
    ReusedConfig,
    /// Configuration and hook were already in place; nothing was touched
    Unchanged,
}

/// Everything a setup run has learned so far
#[derive(Debug)]
pub struct SetupContext {
    /// Directory setup was started from
    pub start: PathBuf,
    pub os: Option<os_info::Type>,
    pub install_strategy: Option<InstallStrategy>,
    pub root: Option<PathBuf>,
    pub probe: ToolProbe,
    pub config_path: Option<PathBuf>,
    pub existing: ExistingConfig,
    pub selection: Option<Selection>,
    pub generated: Option<Generated>,
    pub completion: Option<Completion>,
    /// States visited, in order
    pub trail: Vec<SetupState>,
}

impl SetupContext {
    pub fn new(start: impl Into<PathBuf>, probe: ToolProbe) -> Self {
        Self {
            start: start.into(),
            os: None,
            install_strategy: None,
            root: None,
            probe,
            config_path: None,
            existing: ExistingConfig::default(),
            selection: None,
            generated: None,
            completion: None,
            trail: Vec::new(),
        }
    }

    fn root(&self) -> Result<&Path> {
        self.root
            .as_deref()
            .ok_or_else(|| HookstackError::NotARepository(self.start.clone()))
    }

    fn config_path(&self) -> Result<&Path> {
        self.config_path
            .as_deref()
            .ok_or_else(|| HookstackError::NotARepository(self.start.clone()))
    }

    fn selected(&self) -> &[&'static StackDefinition] {
        match &self.selection {
            Some(selection) => selection.stacks(),
            None => &[],
        }
    }
}

/// Drives [`SetupState`] transitions
pub struct Orchestrator<'a, P: Prompter, H: HookManager> {
    prompter: P,
    hook_manager: H,
    settings: &'a SetupSettings,
    output: &'a Output,
}

impl<'a, P: Prompter, H: HookManager> Orchestrator<'a, P, H> {
    pub fn new(prompter: P, hook_manager: H, settings: &'a SetupSettings, output: &'a Output) -> Self {
        Self {
            prompter,
            hook_manager,
            settings,
            output,
        }
    }

    /// Run from `Start` to `Done`, or to the first failing gate
    pub fn run(&mut self, mut ctx: SetupContext) -> Result<SetupContext> {
        let mut state = SetupState::Start;
        loop {
            ctx.trail.push(state);
            tracing::debug!("Setup state: {state:?}");
            state = match state {
                SetupState::Start => SetupState::DetectOs,
                SetupState::DetectOs => self.detect_os(&mut ctx),
                SetupState::VerifyGitRepo => self.verify_git_repo(&mut ctx)?,
                SetupState::VerifyScriptRuntime => self.verify_script_runtime(&mut ctx)?,
                SetupState::VerifyOrInstallHookManager => self.verify_hook_manager(&mut ctx)?,
                SetupState::CheckExistingConfig => self.check_existing_config(&mut ctx)?,
                SetupState::SelectStacks => self.select_stacks(&mut ctx)?,
                SetupState::GenerateConfig => self.generate_config(&mut ctx)?,
                SetupState::InstallHook => self.install_hook(&mut ctx)?,
                SetupState::OptionalFullRun => self.optional_full_run(&mut ctx)?,
                SetupState::PrintRequirements => self.print_requirements(&ctx),
                SetupState::Done => return Ok(ctx),
            };
        }
    }

    fn detect_os(&mut self, ctx: &mut SetupContext) -> SetupState {
        let info = os_info::get();
        self.output.step(&format!("Detected {info}"));
        ctx.os = Some(info.os_type());
        SetupState::VerifyGitRepo
    }

    fn verify_git_repo(&mut self, ctx: &mut SetupContext) -> Result<SetupState> {
        ctx.probe
            .require("git", "Install git from https://git-scm.com/downloads")?;
        let root = detect::detect_project_root_from(&ctx.start)?;
        self.output.success(&format!("Git repository at {}", root.display()));

        ctx.probe.set_root(&root);
        ctx.config_path = Some(self.settings.config_path(&root));
        ctx.root = Some(root);
        Ok(SetupState::VerifyScriptRuntime)
    }

    fn verify_script_runtime(&mut self, ctx: &mut SetupContext) -> Result<SetupState> {
        match ctx.probe.first_present(&["python3", "python"]) {
            Some(python) => {
                self.output.success(&format!("Python runtime: {python}"));
                Ok(SetupState::VerifyOrInstallHookManager)
            }
            None => Err(HookstackError::FatalEnvironment {
                tool: "python3".to_string(),
                remedy: format!(
                    "{} runs on Python; install Python 3 from https://www.python.org/downloads",
                    self.hook_manager.name()
                ),
            }),
        }
    }

    fn verify_hook_manager(&mut self, ctx: &mut SetupContext) -> Result<SetupState> {
        let name = self.hook_manager.name().to_string();
        if ctx.probe.check_required_tool(&name, Requirement::Optional).is_present() {
            self.output.success(&format!("{name} is installed"));
            return Ok(SetupState::CheckExistingConfig);
        }

        self.output.warning(&format!("{name} was not found on PATH"));
        if !self.prompter.confirm(PROMPT_INSTALL)? {
            return Err(HookstackError::UserDeclinedInstall(name));
        }

        let strategy = Self::install_strategy(ctx).ok_or_else(|| {
            HookstackError::HookManagerInstallFailed {
                tool: name.clone(),
                output: "no installer available (looked for brew, pip3 and pip)".to_string(),
            }
        })?;
        ctx.install_strategy = Some(strategy);

        self.output.step(&format!("Installing {name} with {strategy}"));
        self.hook_manager.install(strategy, ctx.root()?)?;
        self.output.success(&format!("{name} installed"));
        Ok(SetupState::CheckExistingConfig)
    }

    /// Homebrew on macOS when present, otherwise a pip user install
    fn install_strategy(ctx: &mut SetupContext) -> Option<InstallStrategy> {
        if ctx.os == Some(os_info::Type::Macos)
            && ctx.probe.check_required_tool("brew", Requirement::Optional).is_present()
        {
            return Some(InstallStrategy::Homebrew);
        }
        ctx.probe
            .first_present(&["pip3", "pip"])
            .map(InstallStrategy::Pip)
    }

    fn check_existing_config(&mut self, ctx: &mut SetupContext) -> Result<SetupState> {
        let path = ctx.config_path()?.to_path_buf();
        ctx.existing = detect::detect_existing_config(&path)?;

        let Some(content) = ctx.existing.content.as_deref() else {
            return Ok(SetupState::SelectStacks);
        };

        let configured = match generator::load_existing(content) {
            Ok(configured) => configured,
            Err(reason) => {
                self.output.warning(&format!(
                    "{} is not a valid hookstack configuration ({reason}); it will be backed up and replaced",
                    path.display()
                ));
                return Ok(SetupState::SelectStacks);
            }
        };

        let names: Vec<&str> = configured.iter().map(|s| s.display_name).collect();
        self.output.info(&format!(
            "{} already configures: {}",
            path.display(),
            names.join(", ")
        ));

        if self.prompter.confirm(PROMPT_RECONFIGURE)? {
            return Ok(SetupState::SelectStacks);
        }

        ctx.selection = Some(Selection::new(configured)?);
        if self.hook_manager.hook_installed(ctx.root()?) {
            ctx.completion = Some(Completion::Unchanged);
            self.output.success("Setup complete, no changes");
            Ok(SetupState::Done)
        } else {
            ctx.completion = Some(Completion::ReusedConfig);
            self.output.info("Keeping the existing configuration");
            Ok(SetupState::InstallHook)
        }
    }

    fn select_stacks(&mut self, ctx: &mut SetupContext) -> Result<SetupState> {
        self.output.header("Available stacks");
        for stack in stacks::STACKS {
            self.output.list_item(&format!("{}) {}", stack.id, stack.display_name));
        }

        let detected = detect::detect_project_types(ctx.root()?);
        if !detected.is_empty() {
            let hint: Vec<String> = detected.iter().map(|s| s.id.to_string()).collect();
            let names: Vec<&str> = detected.iter().map(|s| s.display_name).collect();
            self.output.info(&format!(
                "Detected {} (suggested: {})",
                names.join(", "),
                hint.join(",")
            ));
        }

        let raw = self.prompter.input(PROMPT_CHOICES)?;
        let parsed = selection::parse(&raw, stacks::STACKS)?;
        for warning in &parsed.warnings {
            self.output.warning(warning);
        }

        ctx.selection = Some(parsed.selection);
        Ok(SetupState::GenerateConfig)
    }

    fn generate_config(&mut self, ctx: &mut SetupContext) -> Result<SetupState> {
        let path = ctx.config_path()?.to_path_buf();
        let generated = generator::generate(ctx.selected(), &path)?;

        if let Some(backup) = &generated.backup {
            self.output.info(&format!("Previous configuration saved to {}", backup.display()));
        }
        self.output.success(&format!("Wrote {}", path.display()));

        ctx.generated = Some(generated);
        ctx.completion = Some(Completion::Configured);
        Ok(SetupState::InstallHook)
    }

    fn install_hook(&mut self, ctx: &mut SetupContext) -> Result<SetupState> {
        self.output.step(&format!("Running {} install", self.hook_manager.name()));
        self.hook_manager.install_hook(ctx.root()?)?;
        self.output.success("Git hook installed");
        Ok(SetupState::OptionalFullRun)
    }

    fn optional_full_run(&mut self, ctx: &mut SetupContext) -> Result<SetupState> {
        if !self.prompter.confirm(PROMPT_FULL_RUN)? {
            return Ok(SetupState::PrintRequirements);
        }

        match self.hook_manager.run_all(ctx.root()?) {
            Ok(exit) => {
                for line in exit.combined_output().lines() {
                    self.output.indent(line);
                }
                if exit.success() {
                    self.output.success("All checks passed on existing files");
                } else {
                    self.output
                        .warning("Some checks failed on existing files; they will run again on commit");
                }
            }
            Err(e) => self.output.warning(&format!("Could not run the checks: {e}")),
        }
        Ok(SetupState::PrintRequirements)
    }

    fn print_requirements(&mut self, ctx: &SetupContext) -> SetupState {
        self.output.header("Requirements");
        for stack in ctx.selected() {
            self.output.step(stack.display_name);
            for requirement in stack.requirements {
                self.output.list_item(requirement);
            }
        }

        self.output.blank_line();
        self.output.success(&format!(
            "Setup complete: {} stack(s) will run on every commit",
            ctx.selected().len()
        ));
        SetupState::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::ToolLocator;
    use crate::hooks::ToolExit;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct KnownTools(&'static [&'static str]);

    impl ToolLocator for KnownTools {
        fn locate(&self, tool: &str) -> bool {
            self.0.contains(&tool)
        }
    }

    const ALL_TOOLS: &[&str] = &["git", "python3", "pre-commit"];

    #[derive(Default)]
    struct ScriptedPrompter {
        confirms: VecDeque<bool>,
        inputs: VecDeque<String>,
        asked: Rc<RefCell<Vec<String>>>,
    }

    impl ScriptedPrompter {
        fn new(confirms: &[bool], inputs: &[&str]) -> Self {
            Self {
                confirms: confirms.iter().copied().collect(),
                inputs: inputs.iter().map(|s| s.to_string()).collect(),
                asked: Rc::default(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn confirm(&mut self, prompt: &str) -> Result<bool> {
            self.asked.borrow_mut().push(prompt.to_string());
            Ok(self.confirms.pop_front().expect("unexpected confirm prompt"))
        }

        fn input(&mut self, prompt: &str) -> Result<String> {
            self.asked.borrow_mut().push(prompt.to_string());
            Ok(self.inputs.pop_front().expect("unexpected input prompt"))
        }
    }

    #[derive(Default)]
    struct FakeHookManager {
        hook_installed: bool,
        install_hook_fails: bool,
        full_run_passes: bool,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl HookManager for FakeHookManager {
        fn name(&self) -> &str {
            "pre-commit"
        }

        fn install(&self, strategy: InstallStrategy, _root: &Path) -> Result<()> {
            self.calls.borrow_mut().push(format!("install {strategy}"));
            Ok(())
        }

        fn install_hook(&self, _root: &Path) -> Result<()> {
            self.calls.borrow_mut().push("install-hook".to_string());
            if self.install_hook_fails {
                return Err(HookstackError::HookInstallFailed("core.hooksPath is set".into()));
            }
            Ok(())
        }

        fn run_all(&self, _root: &Path) -> Result<ToolExit> {
            self.calls.borrow_mut().push("run-all".to_string());
            Ok(ToolExit {
                code: Some(if self.full_run_passes { 0 } else { 1 }),
                stdout: String::new(),
                stderr: String::new(),
            })
        }

        fn hook_installed(&self, _root: &Path) -> bool {
            self.hook_installed
        }
    }

    fn repo() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        git2::Repository::init(temp_dir.path()).unwrap();
        temp_dir
    }

    fn run_setup(
        dir: &Path,
        tools: &'static [&'static str],
        prompter: ScriptedPrompter,
        hook_manager: FakeHookManager,
    ) -> Result<SetupContext> {
        let settings = SetupSettings::default();
        let output = Output::new(false, true);
        let ctx = SetupContext::new(dir, ToolProbe::with_locator(KnownTools(tools)));
        Orchestrator::new(prompter, hook_manager, &settings, &output).run(ctx)
    }

    fn config_file(dir: &Path) -> PathBuf {
        dir.join(".pre-commit-config.yaml")
    }

    fn backups(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".backup."))
            .count()
    }

    #[test]
    fn test_fresh_setup_writes_config_and_installs_hook() {
        let dir = repo();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        let prompter = ScriptedPrompter::new(&[false], &["5, 7"]);
        let asked = prompter.asked.clone();
        let hook_manager = FakeHookManager::default();
        let calls = hook_manager.calls.clone();

        let ctx = run_setup(dir.path(), ALL_TOOLS, prompter, hook_manager).unwrap();

        assert_eq!(ctx.completion, Some(Completion::Configured));
        assert_eq!(*asked.borrow(), vec![PROMPT_CHOICES, PROMPT_FULL_RUN]);
        assert_eq!(*calls.borrow(), vec!["install-hook"]);
        assert_eq!(ctx.trail.first(), Some(&SetupState::Start));
        assert_eq!(ctx.trail.last(), Some(&SetupState::Done));

        let written = fs::read_to_string(config_file(dir.path())).unwrap();
        assert!(written.contains("custom-js-script"));
        assert!(written.contains("custom-python-script"));
    }

    #[test]
    fn test_declined_install_halts() {
        let dir = repo();
        let prompter = ScriptedPrompter::new(&[false], &[]);

        let err = run_setup(dir.path(), &["git", "python3"], prompter, FakeHookManager::default())
            .unwrap_err();
        assert!(matches!(err, HookstackError::UserDeclinedInstall(ref tool) if tool == "pre-commit"));
        assert!(!config_file(dir.path()).exists());
    }

    #[test]
    fn test_accepted_install_uses_pip() {
        let dir = repo();
        let prompter = ScriptedPrompter::new(&[true, false], &["3"]);
        let hook_manager = FakeHookManager::default();
        let calls = hook_manager.calls.clone();

        let ctx = run_setup(dir.path(), &["git", "python3", "pip3"], prompter, hook_manager).unwrap();

        assert_eq!(ctx.install_strategy, Some(InstallStrategy::Pip("pip3")));
        assert_eq!(calls.borrow()[0], "install pip3 --user");
    }

    #[test]
    fn test_install_without_installer_fails() {
        let dir = repo();
        let prompter = ScriptedPrompter::new(&[true], &[]);

        let err = run_setup(dir.path(), &["git", "python3"], prompter, FakeHookManager::default())
            .unwrap_err();
        assert!(matches!(err, HookstackError::HookManagerInstallFailed { .. }));
    }

    #[test]
    fn test_unchanged_when_config_and_hook_exist() {
        let dir = repo();
        let path = config_file(dir.path());
        generator::generate(&[&stacks::STACKS[6]], &path).unwrap();
        let before = fs::read(&path).unwrap();

        let prompter = ScriptedPrompter::new(&[false], &[]);
        let asked = prompter.asked.clone();
        let hook_manager = FakeHookManager {
            hook_installed: true,
            ..FakeHookManager::default()
        };
        let calls = hook_manager.calls.clone();

        let ctx = run_setup(dir.path(), ALL_TOOLS, prompter, hook_manager).unwrap();

        assert_eq!(ctx.completion, Some(Completion::Unchanged));
        assert_eq!(*asked.borrow(), vec![PROMPT_RECONFIGURE]);
        assert!(calls.borrow().is_empty());
        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(backups(dir.path()), 0);
        assert!(!ctx.trail.contains(&SetupState::PrintRequirements));
    }

    #[test]
    fn test_reused_config_installs_missing_hook() {
        let dir = repo();
        let path = config_file(dir.path());
        generator::generate(&[&stacks::STACKS[4]], &path).unwrap();

        let prompter = ScriptedPrompter::new(&[false, false], &[]);
        let hook_manager = FakeHookManager::default();
        let calls = hook_manager.calls.clone();

        let ctx = run_setup(dir.path(), ALL_TOOLS, prompter, hook_manager).unwrap();

        assert_eq!(ctx.completion, Some(Completion::ReusedConfig));
        assert_eq!(*calls.borrow(), vec!["install-hook"]);
        assert_eq!(ctx.selected()[0].key, "js");
        assert!(!ctx.trail.contains(&SetupState::GenerateConfig));
        assert_eq!(backups(dir.path()), 0);
    }

    #[test]
    fn test_reconfigure_backs_up_previous_config() {
        let dir = repo();
        let path = config_file(dir.path());
        generator::generate(&[&stacks::STACKS[4]], &path).unwrap();

        let prompter = ScriptedPrompter::new(&[true, false], &["8"]);
        let ctx = run_setup(dir.path(), ALL_TOOLS, prompter, FakeHookManager::default()).unwrap();

        assert_eq!(ctx.completion, Some(Completion::Configured));
        assert_eq!(backups(dir.path()), 1);
        assert!(fs::read_to_string(&path).unwrap().contains("custom-ror-script"));
    }

    #[test]
    fn test_invalid_config_forces_reconfiguration() {
        let dir = repo();
        let path = config_file(dir.path());
        fs::write(&path, "repos:\n- repo: local\n  rev: ''\n  hooks:\n  - id: my-lint\n").unwrap();

        let prompter = ScriptedPrompter::new(&[false], &["7"]);
        let asked = prompter.asked.clone();
        let ctx = run_setup(dir.path(), ALL_TOOLS, prompter, FakeHookManager::default()).unwrap();

        assert!(!asked.borrow().contains(&PROMPT_RECONFIGURE.to_string()));
        assert_eq!(ctx.completion, Some(Completion::Configured));
        assert_eq!(backups(dir.path()), 1);
    }

    #[test]
    fn test_no_valid_choice_halts_before_writing() {
        let dir = repo();
        let prompter = ScriptedPrompter::new(&[], &["99,abc"]);

        let err = run_setup(dir.path(), ALL_TOOLS, prompter, FakeHookManager::default()).unwrap_err();
        assert!(matches!(err, HookstackError::NoValidSelection(_)));
        assert!(!config_file(dir.path()).exists());
    }

    #[test]
    fn test_failed_full_run_is_not_fatal() {
        let dir = repo();
        let prompter = ScriptedPrompter::new(&[true], &["2"]);
        let hook_manager = FakeHookManager {
            full_run_passes: false,
            ..FakeHookManager::default()
        };
        let calls = hook_manager.calls.clone();

        let ctx = run_setup(dir.path(), ALL_TOOLS, prompter, hook_manager).unwrap();

        assert_eq!(*calls.borrow(), vec!["install-hook", "run-all"]);
        assert_eq!(ctx.trail.last(), Some(&SetupState::Done));
    }

    #[test]
    fn test_hook_install_failure_is_fatal() {
        let dir = repo();
        let prompter = ScriptedPrompter::new(&[], &["1"]);
        let hook_manager = FakeHookManager {
            install_hook_fails: true,
            ..FakeHookManager::default()
        };

        let err = run_setup(dir.path(), ALL_TOOLS, prompter, hook_manager).unwrap_err();
        assert!(matches!(err, HookstackError::HookInstallFailed(_)));
    }

    #[test]
    fn test_outside_repository() {
        let dir = TempDir::new().unwrap();
        let prompter = ScriptedPrompter::new(&[], &[]);

        let err = run_setup(dir.path(), ALL_TOOLS, prompter, FakeHookManager::default()).unwrap_err();
        assert!(matches!(err, HookstackError::NotARepository(_)));
    }

    #[test]
    fn test_missing_git_or_python_is_fatal() {
        let dir = repo();
        let err = run_setup(
            dir.path(),
            &["python3", "pre-commit"],
            ScriptedPrompter::default(),
            FakeHookManager::default(),
        )
        .unwrap_err();
        assert!(matches!(err, HookstackError::FatalEnvironment { ref tool, .. } if tool == "git"));

        let err = run_setup(
            dir.path(),
            &["git", "pre-commit"],
            ScriptedPrompter::default(),
            FakeHookManager::default(),
        )
        .unwrap_err();
        assert!(matches!(err, HookstackError::FatalEnvironment { ref tool, .. } if tool == "python3"));
    }

    #[test]
    fn test_config_path_requires_a_verified_repository() {
        let dir = TempDir::new().unwrap();
        let ctx = SetupContext::new(dir.path(), ToolProbe::with_locator(KnownTools(ALL_TOOLS)));

        assert!(matches!(ctx.config_path(), Err(HookstackError::NotARepository(_))));
        assert!(format!("{ctx:?}").contains("ToolProbe"));
    }
}

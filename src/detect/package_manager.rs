//! Package manager detection
//!
//! Stack checks launch project-local tools through whichever package manager
//! the project uses, so `eslint` becomes `pnpm exec eslint` in a pnpm workspace
//! and `black` becomes `poetry run black` in a Poetry project.

use std::path::Path;

/// Package-manager family a stack belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ecosystem {
    Node,
    Python,
    Php,
    Ruby,
}

/// Package managers whose launchers hookstack knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    Pnpm,
    Npm,
    Yarn,
    Bun,
    Poetry,
    Pipenv,
    Pip,
    Composer,
    Bundle,
}

/// A program resolved through a package manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// Program followed by any launcher arguments
    pub argv: Vec<String>,
    /// What to probe to decide whether the tool is available
    pub probe: String,
    /// Command line that exits 0 only when the tool is installed inside the
    /// managed environment. Needed when `probe` is the launcher itself.
    pub presence: Option<Vec<String>>,
}

/// Exits 1 unless `argv[1]` is on the environment's `PATH`
const PYTHON_WHICH: &str = "import shutil, sys; sys.exit(shutil.which(sys.argv[1]) is None)";

/// Exits 1 unless `ARGV[0]` is an executable on the bundle's `PATH`
const RUBY_WHICH: &str = "exit(ENV.fetch('PATH', '').split(File::PATH_SEPARATOR)\
.any? { |dir| File.executable?(File.join(dir, ARGV[0])) })";

impl PackageManager {
    /// Executable name
    pub fn command(&self) -> &'static str {
        match self {
            PackageManager::Pnpm => "pnpm",
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
            PackageManager::Poetry => "poetry",
            PackageManager::Pipenv => "pipenv",
            PackageManager::Pip => "pip",
            PackageManager::Composer => "composer",
            PackageManager::Bundle => "bundle",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PackageManager::Pnpm => "pnpm",
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "Yarn",
            PackageManager::Bun => "Bun",
            PackageManager::Poetry => "Poetry",
            PackageManager::Pipenv => "Pipenv",
            PackageManager::Pip => "pip",
            PackageManager::Composer => "Composer",
            PackageManager::Bundle => "Bundler",
        }
    }

    /// Lockfile that identifies the manager, if it has one
    pub fn lockfile(&self) -> Option<&'static str> {
        match self {
            PackageManager::Pnpm => Some("pnpm-lock.yaml"),
            PackageManager::Npm => Some("package-lock.json"),
            PackageManager::Yarn => Some("yarn.lock"),
            PackageManager::Bun => Some("bun.lockb"),
            PackageManager::Poetry => Some("poetry.lock"),
            PackageManager::Pipenv => Some("Pipfile.lock"),
            PackageManager::Pip => None,
            PackageManager::Composer => Some("composer.lock"),
            PackageManager::Bundle => Some("Gemfile.lock"),
        }
    }

    /// Resolve a project-local tool into the command line that runs it
    pub fn exec_command(&self, program: &str, root: &Path) -> ResolvedCommand {
        let local_bin = format!("node_modules/.bin/{program}");
        let (argv, probe, presence): (Vec<&str>, String, Option<Vec<&str>>) = match self {
            PackageManager::Npm => (vec!["npx", "--no-install", program], local_bin, None),
            PackageManager::Pnpm => (vec!["pnpm", "exec", program], local_bin, None),
            PackageManager::Yarn => (vec!["yarn", program], local_bin, None),
            PackageManager::Bun => (vec!["bunx", program], local_bin, None),
            PackageManager::Poetry => (
                vec!["poetry", "run", program],
                "poetry".to_string(),
                Some(vec!["poetry", "run", "python", "-c", PYTHON_WHICH, program]),
            ),
            PackageManager::Pipenv => (
                vec!["pipenv", "run", program],
                "pipenv".to_string(),
                Some(vec!["pipenv", "run", "python", "-c", PYTHON_WHICH, program]),
            ),
            PackageManager::Pip => (vec![program], program.to_string(), None),
            PackageManager::Composer => {
                let vendor_bin = format!("vendor/bin/{program}");
                if root.join(&vendor_bin).is_file() {
                    return ResolvedCommand {
                        argv: vec![vendor_bin.clone()],
                        probe: vendor_bin,
                        presence: None,
                    };
                }
                (vec![program], program.to_string(), None)
            }
            PackageManager::Bundle => (
                vec!["bundle", "exec", program],
                "bundle".to_string(),
                Some(vec!["bundle", "exec", "ruby", "-e", RUBY_WHICH, program]),
            ),
        };

        let owned = |argv: Vec<&str>| argv.into_iter().map(String::from).collect::<Vec<_>>();
        ResolvedCommand {
            argv: owned(argv),
            probe,
            presence: presence.map(owned),
        }
    }
}

/// Package manager detector
#[derive(Debug, Default, Clone, Copy)]
pub struct PackageManagerDetector;

impl PackageManagerDetector {
    /// Create a new package manager detector
    pub fn new() -> Self {
        Self
    }

    /// Detect the package manager for `ecosystem` in the given directory
    pub fn detect<P: AsRef<Path>>(&self, ecosystem: Ecosystem, path: P) -> Option<PackageManager> {
        let path = path.as_ref();
        match ecosystem {
            Ecosystem::Node => Some(self.detect_js_package_manager(path)),
            Ecosystem::Python => Some(self.detect_python_package_manager(path)),
            Ecosystem::Php => Some(PackageManager::Composer),
            Ecosystem::Ruby => path.join("Gemfile").exists().then_some(PackageManager::Bundle),
        }
    }

    /// Detect JavaScript/TypeScript package manager, falling back to npm
    fn detect_js_package_manager(&self, path: &Path) -> PackageManager {
        // Lockfiles are the strongest indicator
        for pm in [
            PackageManager::Pnpm,
            PackageManager::Bun,
            PackageManager::Yarn,
            PackageManager::Npm,
        ] {
            if let Some(lockfile) = pm.lockfile() {
                if path.join(lockfile).exists() {
                    return pm;
                }
            }
        }

        // Then the package.json packageManager field
        if let Some(pm) = Self::package_manager_field(path) {
            return pm;
        }

        PackageManager::Npm
    }

    fn package_manager_field(path: &Path) -> Option<PackageManager> {
        let content = std::fs::read_to_string(path.join("package.json")).ok()?;
        let package_json: serde_json::Value = serde_json::from_str(&content).ok()?;
        let pm_str = package_json.get("packageManager")?.as_str()?;

        if pm_str.starts_with("pnpm") {
            Some(PackageManager::Pnpm)
        } else if pm_str.starts_with("yarn") {
            Some(PackageManager::Yarn)
        } else if pm_str.starts_with("bun") {
            Some(PackageManager::Bun)
        } else if pm_str.starts_with("npm") {
            Some(PackageManager::Npm)
        } else {
            None
        }
    }

    /// Detect Python package manager, falling back to tools on PATH
    fn detect_python_package_manager(&self, path: &Path) -> PackageManager {
        if path.join("poetry.lock").exists() {
            return PackageManager::Poetry;
        }

        if let Ok(pyproject) = std::fs::read_to_string(path.join("pyproject.toml")) {
            if pyproject.contains("[tool.poetry]") {
                return PackageManager::Poetry;
            }
        }

        if path.join("Pipfile").exists() {
            return PackageManager::Pipenv;
        }

        PackageManager::Pip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_package_manager_lockfile() {
        assert_eq!(PackageManager::Pnpm.lockfile(), Some("pnpm-lock.yaml"));
        assert_eq!(PackageManager::Npm.lockfile(), Some("package-lock.json"));
        assert_eq!(PackageManager::Yarn.lockfile(), Some("yarn.lock"));
        assert_eq!(PackageManager::Pip.lockfile(), None);
    }

    #[test]
    fn test_detect_node_project_with_pnpm_lock() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        fs::write(temp_dir.path().join("package.json"), r#"{"name": "test"}"#)
            .expect("Failed to write package.json");
        fs::write(temp_dir.path().join("pnpm-lock.yaml"), "lockfileVersion: 5.4")
            .expect("Failed to write pnpm-lock.yaml");

        let detector = PackageManagerDetector::new();
        assert_eq!(
            detector.detect(Ecosystem::Node, temp_dir.path()),
            Some(PackageManager::Pnpm)
        );
    }

    #[test]
    fn test_detect_node_project_from_package_manager_field() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(
            temp_dir.path().join("package.json"),
            r#"{"name": "test", "packageManager": "yarn@4.1.0"}"#,
        )
        .expect("Failed to write package.json");

        let detector = PackageManagerDetector::new();
        assert_eq!(
            detector.detect(Ecosystem::Node, temp_dir.path()),
            Some(PackageManager::Yarn)
        );
    }

    #[test]
    fn test_detect_node_project_defaults_to_npm() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("package.json"), "{}").expect("Failed to write package.json");

        assert_eq!(
            PackageManagerDetector::new().detect(Ecosystem::Node, temp_dir.path()),
            Some(PackageManager::Npm)
        );
    }

    #[test]
    fn test_detect_python_project_with_poetry() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        fs::write(temp_dir.path().join("pyproject.toml"), "[tool.poetry]\nname = \"test\"")
            .expect("Failed to write pyproject.toml");

        let detector = PackageManagerDetector::new();
        assert_eq!(
            detector.detect(Ecosystem::Python, temp_dir.path()),
            Some(PackageManager::Poetry)
        );
    }

    #[test]
    fn test_detect_python_project_with_pipenv_and_plain_pip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let detector = PackageManagerDetector::new();

        assert_eq!(
            detector.detect(Ecosystem::Python, temp_dir.path()),
            Some(PackageManager::Pip)
        );

        fs::write(temp_dir.path().join("Pipfile"), "[packages]").expect("Failed to write Pipfile");
        assert_eq!(
            detector.detect(Ecosystem::Python, temp_dir.path()),
            Some(PackageManager::Pipenv)
        );
    }

    #[test]
    fn test_ruby_requires_gemfile() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let detector = PackageManagerDetector::new();

        assert_eq!(detector.detect(Ecosystem::Ruby, temp_dir.path()), None);
        fs::write(temp_dir.path().join("Gemfile"), "").expect("Failed to write Gemfile");
        assert_eq!(
            detector.detect(Ecosystem::Ruby, temp_dir.path()),
            Some(PackageManager::Bundle)
        );
    }

    #[test]
    fn test_exec_command() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();

        let npm = PackageManager::Npm.exec_command("eslint", root);
        assert_eq!(npm.argv, vec!["npx", "--no-install", "eslint"]);
        assert_eq!(npm.probe, "node_modules/.bin/eslint");

        let poetry = PackageManager::Poetry.exec_command("black", root);
        assert_eq!(poetry.argv, vec!["poetry", "run", "black"]);
        assert_eq!(poetry.probe, "poetry");
        let presence = poetry.presence.unwrap();
        assert_eq!(&presence[..4], ["poetry", "run", "python", "-c"]);
        assert_eq!(presence.last().map(String::as_str), Some("black"));
        assert!(npm.presence.is_none());

        let bundle = PackageManager::Bundle.exec_command("brakeman", root);
        assert_eq!(bundle.argv, vec!["bundle", "exec", "brakeman"]);
        let presence = bundle.presence.unwrap();
        assert_eq!(&presence[..4], ["bundle", "exec", "ruby", "-e"]);
        assert_eq!(presence.last().map(String::as_str), Some("brakeman"));

        let composer = PackageManager::Composer.exec_command("phpstan", root);
        assert_eq!(composer.argv, vec!["phpstan"]);

        fs::create_dir_all(root.join("vendor/bin")).unwrap();
        fs::write(root.join("vendor/bin/phpstan"), "").unwrap();
        let composer = PackageManager::Composer.exec_command("phpstan", root);
        assert_eq!(composer.argv, vec!["vendor/bin/phpstan"]);
        assert_eq!(composer.probe, "vendor/bin/phpstan");
        assert!(composer.presence.is_none());
    }
}

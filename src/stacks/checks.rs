//! Per-stack check sequences
//!
//! Every stack runs its checks strictly in the order listed here. The tools are
//! external collaborators: hookstack only knows how to launch them, which files
//! to hand them, and how much a failure matters.

use super::StackDefinition;
use crate::detect::Requirement;
use crate::detect::package_manager::Ecosystem;
use crate::hooks::Severity;

/// How a check's program is launched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launcher {
    /// Run `program` as-is from `PATH` (or relative to the project root when it
    /// contains a path separator)
    Direct,
    /// Run `program` through the project's package manager (`npx`, `poetry run`,
    /// `bundle exec`, `vendor/bin`, ...)
    ProjectExec,
    /// Replace `program` with the detected package manager binary itself
    /// (`npm test` becomes `pnpm test` in a pnpm project)
    PackageManager,
}

/// Which files a check receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Targets {
    /// Whole-project check; no file arguments
    Project,
    /// One invocation with every matching file appended
    Files(&'static [&'static str]),
    /// One invocation per matching file
    EachFile(&'static [&'static str]),
}

impl Targets {
    /// Glob patterns the check is interested in, if it is file-scoped
    pub fn patterns(&self) -> Option<&'static [&'static str]> {
        match self {
            Targets::Project => None,
            Targets::Files(patterns) | Targets::EachFile(patterns) => Some(patterns),
        }
    }
}

/// One external check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDefinition {
    pub name: &'static str,
    pub program: &'static str,
    pub args: &'static [&'static str],
    pub launcher: Launcher,
    pub severity: Severity,
    pub requirement: Requirement,
    pub targets: Targets,
    /// Marker file (relative to the project root) that must exist for the check to apply
    pub when: Option<&'static str>,
    /// Remediation printed when the check fails
    pub hint: &'static str,
}

/// Everything needed to run one stack's hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackChecks {
    /// Primary runtime; absence is a fatal environment error
    pub runtime: Option<&'static str>,
    /// Package-manager family used to resolve [`Launcher::ProjectExec`]
    pub ecosystem: Option<Ecosystem>,
    pub checks: &'static [CheckDefinition],
}

const DOTNET_SOURCES: &[&str] = &["**/*.cs", "**/*.fs", "**/*.vb"];
const DART_SOURCES: &[&str] = &["**/*.dart"];
const SWIFT_SOURCES: &[&str] = &["**/*.swift"];
const JS_SOURCES: &[&str] = &["**/*.js", "**/*.jsx", "**/*.ts", "**/*.tsx", "**/*.mjs", "**/*.cjs"];
const PRETTIER_SOURCES: &[&str] = &[
    "**/*.js", "**/*.jsx", "**/*.ts", "**/*.tsx", "**/*.mjs", "**/*.cjs", "**/*.json", "**/*.css",
    "**/*.scss", "**/*.md",
];
const PHP_SOURCES: &[&str] = &["**/*.php"];
const PYTHON_SOURCES: &[&str] = &["**/*.py", "**/*.pyi"];
const RUBY_SOURCES: &[&str] = &["**/*.rb", "**/*.rake", "**/*.gemspec", "**/Gemfile"];

const ANDROID: StackChecks = StackChecks {
    runtime: Some("java"),
    ecosystem: None,
    checks: &[
        CheckDefinition {
            name: "ktlint format",
            program: "./gradlew",
            args: &["--quiet", "ktlintFormat"],
            launcher: Launcher::Direct,
            severity: Severity::AutoFixed,
            requirement: Requirement::Optional,
            targets: Targets::Project,
            when: None,
            hint: "Run ./gradlew ktlintFormat and review the changes",
        },
        CheckDefinition {
            name: "Android lint",
            program: "./gradlew",
            args: &["--quiet", "lint"],
            launcher: Launcher::Direct,
            severity: Severity::Blocking,
            requirement: Requirement::Optional,
            targets: Targets::Project,
            when: None,
            hint: "Open build/reports/lint-results.html for the full report",
        },
        CheckDefinition {
            name: "detekt",
            program: "./gradlew",
            args: &["--quiet", "detekt"],
            launcher: Launcher::Direct,
            severity: Severity::Warning,
            requirement: Requirement::Optional,
            targets: Targets::Project,
            when: None,
            hint: "Run ./gradlew detekt to see the static analysis findings",
        },
        CheckDefinition {
            name: "Unit tests",
            program: "./gradlew",
            args: &["--quiet", "test"],
            launcher: Launcher::Direct,
            severity: Severity::Blocking,
            requirement: Requirement::Optional,
            targets: Targets::Project,
            when: None,
            hint: "Fix the failing tests before committing",
        },
    ],
};

const DOTNET: StackChecks = StackChecks {
    runtime: Some("dotnet"),
    ecosystem: None,
    checks: &[
        CheckDefinition {
            name: "dotnet format",
            program: "dotnet",
            args: &["format", "--include"],
            launcher: Launcher::Direct,
            severity: Severity::AutoFixed,
            requirement: Requirement::Mandatory,
            targets: Targets::Files(DOTNET_SOURCES),
            when: None,
            hint: "Run dotnet format and review the changes",
        },
        CheckDefinition {
            name: "Build",
            program: "dotnet",
            args: &["build", "--nologo"],
            launcher: Launcher::Direct,
            severity: Severity::Blocking,
            requirement: Requirement::Mandatory,
            targets: Targets::Project,
            when: None,
            hint: "Fix the compiler errors reported by dotnet build",
        },
        CheckDefinition {
            name: "Tests",
            program: "dotnet",
            args: &["test", "--nologo", "--no-build"],
            launcher: Launcher::Direct,
            severity: Severity::Blocking,
            requirement: Requirement::Mandatory,
            targets: Targets::Project,
            when: None,
            hint: "Fix the failing tests reported by dotnet test",
        },
    ],
};

const FLUTTER: StackChecks = StackChecks {
    runtime: Some("flutter"),
    ecosystem: None,
    checks: &[
        CheckDefinition {
            name: "dart format",
            program: "dart",
            args: &["format"],
            launcher: Launcher::Direct,
            severity: Severity::AutoFixed,
            requirement: Requirement::Mandatory,
            targets: Targets::Files(DART_SOURCES),
            when: None,
            hint: "Run dart format on the staged files",
        },
        CheckDefinition {
            name: "flutter analyze",
            program: "flutter",
            args: &["analyze", "--no-pub"],
            launcher: Launcher::Direct,
            severity: Severity::Blocking,
            requirement: Requirement::Mandatory,
            targets: Targets::Project,
            when: None,
            hint: "Resolve the analyzer issues before committing",
        },
        CheckDefinition {
            name: "flutter test",
            program: "flutter",
            args: &["test", "--no-pub"],
            launcher: Launcher::Direct,
            severity: Severity::Warning,
            requirement: Requirement::Mandatory,
            targets: Targets::Project,
            when: Some("test"),
            hint: "Some widget or unit tests are failing",
        },
    ],
};

const IOS: StackChecks = StackChecks {
    runtime: None,
    ecosystem: None,
    checks: &[
        CheckDefinition {
            name: "SwiftFormat",
            program: "swiftformat",
            args: &["--quiet"],
            launcher: Launcher::Direct,
            severity: Severity::AutoFixed,
            requirement: Requirement::Optional,
            targets: Targets::Files(SWIFT_SOURCES),
            when: None,
            hint: "Run swiftformat on the staged files",
        },
        CheckDefinition {
            name: "SwiftLint",
            program: "swiftlint",
            args: &["lint", "--strict", "--quiet"],
            launcher: Launcher::Direct,
            severity: Severity::Blocking,
            requirement: Requirement::Optional,
            targets: Targets::Files(SWIFT_SOURCES),
            when: None,
            hint: "Fix the SwiftLint violations (swiftlint --fix handles many of them)",
        },
        CheckDefinition {
            name: "CocoaPods outdated",
            program: "pod",
            args: &["outdated", "--no-repo-update"],
            launcher: Launcher::Direct,
            severity: Severity::Info,
            requirement: Requirement::Optional,
            targets: Targets::Project,
            when: Some("Podfile"),
            hint: "Run pod update to pick up newer pods",
        },
    ],
};

const JS: StackChecks = StackChecks {
    runtime: Some("node"),
    ecosystem: Some(Ecosystem::Node),
    checks: &[
        CheckDefinition {
            name: "Prettier",
            program: "prettier",
            args: &["--write", "--ignore-unknown"],
            launcher: Launcher::ProjectExec,
            severity: Severity::AutoFixed,
            requirement: Requirement::Optional,
            targets: Targets::Files(PRETTIER_SOURCES),
            when: None,
            hint: "Run prettier --write on the staged files",
        },
        CheckDefinition {
            name: "ESLint",
            program: "eslint",
            args: &["--max-warnings=0"],
            launcher: Launcher::ProjectExec,
            severity: Severity::Blocking,
            requirement: Requirement::Optional,
            targets: Targets::Files(JS_SOURCES),
            when: None,
            hint: "Fix the lint errors (eslint --fix handles many of them)",
        },
        CheckDefinition {
            name: "TypeScript",
            program: "tsc",
            args: &["--noEmit"],
            launcher: Launcher::ProjectExec,
            severity: Severity::Blocking,
            requirement: Requirement::Optional,
            targets: Targets::Project,
            when: Some("tsconfig.json"),
            hint: "Fix the type errors reported by tsc",
        },
        CheckDefinition {
            name: "Dependency audit",
            program: "npm",
            args: &["audit", "--audit-level=high"],
            launcher: Launcher::Direct,
            severity: Severity::Info,
            requirement: Requirement::Optional,
            targets: Targets::Project,
            when: Some("package-lock.json"),
            hint: "Run npm audit fix to upgrade vulnerable packages",
        },
        CheckDefinition {
            name: "Unit tests",
            program: "npm",
            args: &["test", "--silent"],
            launcher: Launcher::PackageManager,
            severity: Severity::Warning,
            requirement: Requirement::Optional,
            targets: Targets::Project,
            when: Some("package.json"),
            hint: "Some tests are failing",
        },
    ],
};

const PHP: StackChecks = StackChecks {
    runtime: Some("php"),
    ecosystem: Some(Ecosystem::Php),
    checks: &[
        CheckDefinition {
            name: "PHP syntax",
            program: "php",
            args: &["-l"],
            launcher: Launcher::Direct,
            severity: Severity::Blocking,
            requirement: Requirement::Mandatory,
            targets: Targets::EachFile(PHP_SOURCES),
            when: None,
            hint: "Fix the syntax errors reported by php -l",
        },
        CheckDefinition {
            name: "PHP CS Fixer",
            program: "php-cs-fixer",
            args: &["fix", "--quiet"],
            launcher: Launcher::ProjectExec,
            severity: Severity::AutoFixed,
            requirement: Requirement::Optional,
            targets: Targets::Files(PHP_SOURCES),
            when: None,
            hint: "Run vendor/bin/php-cs-fixer fix on the staged files",
        },
        CheckDefinition {
            name: "PHPStan",
            program: "phpstan",
            args: &["analyse", "--no-progress", "--error-format=table"],
            launcher: Launcher::ProjectExec,
            severity: Severity::Blocking,
            requirement: Requirement::Optional,
            targets: Targets::Files(PHP_SOURCES),
            when: None,
            hint: "Fix the static analysis errors reported by PHPStan",
        },
        CheckDefinition {
            name: "PHPUnit",
            program: "phpunit",
            args: &[],
            launcher: Launcher::ProjectExec,
            severity: Severity::Warning,
            requirement: Requirement::Optional,
            targets: Targets::Project,
            when: Some("phpunit.xml"),
            hint: "Some PHPUnit tests are failing",
        },
    ],
};

const PYTHON: StackChecks = StackChecks {
    runtime: Some("python3"),
    ecosystem: Some(Ecosystem::Python),
    checks: &[
        CheckDefinition {
            name: "Black",
            program: "black",
            args: &["--quiet"],
            launcher: Launcher::ProjectExec,
            severity: Severity::AutoFixed,
            requirement: Requirement::Optional,
            targets: Targets::Files(PYTHON_SOURCES),
            when: None,
            hint: "Run black on the staged files",
        },
        CheckDefinition {
            name: "isort",
            program: "isort",
            args: &["--quiet", "--profile", "black"],
            launcher: Launcher::ProjectExec,
            severity: Severity::AutoFixed,
            requirement: Requirement::Optional,
            targets: Targets::Files(PYTHON_SOURCES),
            when: None,
            hint: "Run isort on the staged files",
        },
        CheckDefinition {
            name: "Flake8",
            program: "flake8",
            args: &[],
            launcher: Launcher::ProjectExec,
            severity: Severity::Blocking,
            requirement: Requirement::Optional,
            targets: Targets::Files(PYTHON_SOURCES),
            when: None,
            hint: "Fix the style errors reported by flake8",
        },
        CheckDefinition {
            name: "mypy",
            program: "mypy",
            args: &["--ignore-missing-imports"],
            launcher: Launcher::ProjectExec,
            severity: Severity::Warning,
            requirement: Requirement::Optional,
            targets: Targets::Files(PYTHON_SOURCES),
            when: None,
            hint: "Review the type errors reported by mypy",
        },
        CheckDefinition {
            name: "pytest",
            program: "pytest",
            args: &["-q"],
            launcher: Launcher::ProjectExec,
            severity: Severity::Warning,
            requirement: Requirement::Optional,
            targets: Targets::Project,
            when: Some("tests"),
            hint: "Some tests are failing",
        },
    ],
};

const ROR: StackChecks = StackChecks {
    runtime: Some("ruby"),
    ecosystem: Some(Ecosystem::Ruby),
    checks: &[
        CheckDefinition {
            name: "RuboCop autocorrect",
            program: "rubocop",
            args: &["-a", "--format", "quiet"],
            launcher: Launcher::ProjectExec,
            severity: Severity::AutoFixed,
            requirement: Requirement::Mandatory,
            targets: Targets::Files(RUBY_SOURCES),
            when: None,
            hint: "Run rubocop -a on the staged files",
        },
        CheckDefinition {
            name: "RuboCop",
            program: "rubocop",
            args: &["--format", "simple"],
            launcher: Launcher::ProjectExec,
            severity: Severity::Blocking,
            requirement: Requirement::Mandatory,
            targets: Targets::Files(RUBY_SOURCES),
            when: None,
            hint: "Fix the offenses RuboCop could not correct automatically",
        },
        CheckDefinition {
            name: "Brakeman",
            program: "brakeman",
            args: &["--quiet", "--no-pager", "--no-exit-on-warn"],
            launcher: Launcher::ProjectExec,
            severity: Severity::Warning,
            requirement: Requirement::Optional,
            targets: Targets::Project,
            when: Some("config/application.rb"),
            hint: "Review the security warnings reported by Brakeman",
        },
        CheckDefinition {
            name: "bundler-audit",
            program: "bundler-audit",
            args: &["check", "--update"],
            launcher: Launcher::ProjectExec,
            severity: Severity::Info,
            requirement: Requirement::Optional,
            targets: Targets::Project,
            when: Some("Gemfile.lock"),
            hint: "Upgrade the gems flagged by bundler-audit",
        },
        CheckDefinition {
            name: "RSpec",
            program: "rspec",
            args: &["--format", "progress"],
            launcher: Launcher::ProjectExec,
            severity: Severity::Warning,
            requirement: Requirement::Optional,
            targets: Targets::Project,
            when: Some("spec"),
            hint: "Some specs are failing",
        },
    ],
};

/// Check sequence for a stack
pub fn for_stack(stack: &StackDefinition) -> &'static StackChecks {
    match stack.key {
        "android" => &ANDROID,
        "dotnet" => &DOTNET,
        "flutter" => &FLUTTER,
        "ios" => &IOS,
        "js" => &JS,
        "php" => &PHP,
        "python" => &PYTHON,
        _ => &ROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stacks::STACKS;

    #[test]
    fn test_every_stack_has_a_blocking_gate() {
        for stack in STACKS {
            let checks = for_stack(stack);
            assert!(
                checks.checks.iter().any(|c| c.severity == Severity::Blocking),
                "{} has no blocking check",
                stack.key
            );
        }
    }

    #[test]
    fn test_fixers_run_before_linters() {
        // A stack's formatter must run first so the linter sees the fixed files
        for stack in STACKS {
            let checks = for_stack(stack).checks;
            if let Some(fixer) = checks.iter().position(|c| c.severity == Severity::AutoFixed) {
                let first_gate = checks
                    .iter()
                    .position(|c| c.severity == Severity::Blocking)
                    .unwrap();
                assert!(
                    fixer < first_gate || stack.key == "php",
                    "{}: fixer after first blocking gate",
                    stack.key
                );
            }
        }
    }

    #[test]
    fn test_project_exec_requires_ecosystem() {
        for stack in STACKS {
            let checks = for_stack(stack);
            let uses_exec = checks
                .checks
                .iter()
                .any(|c| matches!(c.launcher, Launcher::ProjectExec | Launcher::PackageManager));
            assert!(!uses_exec || checks.ecosystem.is_some(), "{}", stack.key);
        }
    }

    #[test]
    fn test_lookup_by_stack() {
        let js = crate::stacks::by_key("js").unwrap();
        assert_eq!(for_stack(js).runtime, Some("node"));
        assert_eq!(for_stack(js).checks[0].name, "Prettier");
    }
}

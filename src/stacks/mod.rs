//! Supported technology stacks
//!
//! The table is fixed at compile time. Menu ids, keys and hook identifiers
//! are part of the on-disk contract with `.pre-commit-config.yaml` and
//! `.pre-commit-hooks.yaml`, so entries are only ever appended.

pub mod checks;

use crate::error::{HookstackError, Result};
use serde::Serialize;
use std::fmt;

/// One supported stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackDefinition {
    /// Menu number shown during setup
    pub id: u8,
    /// Short key used by `hookstack run <key>`
    pub key: &'static str,
    pub display_name: &'static str,
    /// Hook id written to the pre-commit configuration
    pub hook_identifier: &'static str,
    /// Tools the developer needs installed, in the order they are used
    pub requirements: &'static [&'static str],
}

impl fmt::Display for StackDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name)
    }
}

/// Built-in stack table, ordered by id
pub const STACKS: &[StackDefinition] = &[
    StackDefinition {
        id: 1,
        key: "android",
        display_name: "Android",
        hook_identifier: "custom-android-script",
        requirements: &[
            "JDK 17+",
            "Android SDK",
            "Gradle wrapper (./gradlew) with the ktlint and detekt plugins",
        ],
    },
    StackDefinition {
        id: 2,
        key: "dotnet",
        display_name: ".NET",
        hook_identifier: "custom-dotnet-script",
        requirements: &["dotnet SDK 6+ (includes dotnet format)"],
    },
    StackDefinition {
        id: 3,
        key: "flutter",
        display_name: "Flutter",
        hook_identifier: "custom-flutter-script",
        requirements: &["Flutter SDK (provides flutter and dart)"],
    },
    StackDefinition {
        id: 4,
        key: "ios",
        display_name: "iOS",
        hook_identifier: "custom-ios-script",
        requirements: &[
            "Xcode command line tools",
            "SwiftFormat (brew install swiftformat)",
            "SwiftLint (brew install swiftlint)",
            "CocoaPods (optional, for Podfile projects)",
        ],
    },
    StackDefinition {
        id: 5,
        key: "js",
        display_name: "JS/TS",
        hook_identifier: "custom-js-script",
        requirements: &[
            "Node.js with npm, pnpm, yarn or bun",
            "prettier (dev dependency)",
            "eslint (dev dependency)",
            "typescript (dev dependency, for tsconfig.json projects)",
        ],
    },
    StackDefinition {
        id: 6,
        key: "php",
        display_name: "PHP",
        hook_identifier: "custom-php-script",
        requirements: &[
            "PHP 8+",
            "Composer",
            "friendsofphp/php-cs-fixer",
            "phpstan/phpstan",
            "phpunit/phpunit",
        ],
    },
    StackDefinition {
        id: 7,
        key: "python",
        display_name: "Python",
        hook_identifier: "custom-python-script",
        requirements: &[
            "Python 3.8+",
            "black",
            "isort",
            "flake8",
            "mypy",
            "pytest",
        ],
    },
    StackDefinition {
        id: 8,
        key: "ror",
        display_name: "Ruby on Rails",
        hook_identifier: "custom-ror-script",
        requirements: &[
            "Ruby with Bundler",
            "rubocop (and rubocop-rails)",
            "brakeman",
            "bundler-audit",
            "rspec-rails",
        ],
    },
];

/// Look up a stack by its key
pub fn by_key(key: &str) -> Result<&'static StackDefinition> {
    let wanted = key.trim().to_ascii_lowercase();
    STACKS
        .iter()
        .find(|stack| stack.key == wanted)
        .ok_or_else(|| HookstackError::UnknownStack(key.to_string()))
}

//! Parsing of the comma-separated stack menu answer

use crate::error::{HookstackError, Result};
use crate::stacks::StackDefinition;

/// Ordered, de-duplicated stacks chosen by the user. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    stacks: Vec<&'static StackDefinition>,
}

impl Selection {
    /// Build from already-validated stacks, dropping repeats
    pub fn new(stacks: impl IntoIterator<Item = &'static StackDefinition>) -> Result<Self> {
        let mut unique: Vec<&'static StackDefinition> = Vec::new();
        for stack in stacks {
            if !unique.iter().any(|s| s.id == stack.id) {
                unique.push(stack);
            }
        }
        if unique.is_empty() {
            return Err(HookstackError::EmptySelection);
        }
        Ok(Self { stacks: unique })
    }

    pub fn stacks(&self) -> &[&'static StackDefinition] {
        &self.stacks
    }

    pub fn hook_identifiers(&self) -> Vec<&'static str> {
        self.stacks.iter().map(|s| s.hook_identifier).collect()
    }
}

/// A parsed selection plus the tokens that were rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelection {
    pub selection: Selection,
    pub warnings: Vec<String>,
}

/// Parse `raw` (e.g. `"5, 7"`) against `table`
///
/// Unknown, non-numeric and repeated tokens produce a warning and are dropped.
/// Empty tokens are ignored. Fails with [`HookstackError::NoValidSelection`] when no
/// token names a stack.
pub fn parse(raw: &str, table: &'static [StackDefinition]) -> Result<ParsedSelection> {
    let mut chosen: Vec<&'static StackDefinition> = Vec::new();
    let mut warnings = Vec::new();

    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let stack = token
            .parse::<u8>()
            .ok()
            .and_then(|id| table.iter().find(|s| s.id == id));

        let warning = match stack {
            Some(stack) if chosen.iter().any(|s| s.id == stack.id) => {
                format!("Ignoring repeated choice '{token}'")
            }
            Some(stack) => {
                chosen.push(stack);
                continue;
            }
            None => format!("Ignoring invalid choice '{token}'"),
        };
        tracing::warn!("{warning}");
        warnings.push(warning);
    }

    if chosen.is_empty() {
        return Err(HookstackError::NoValidSelection(raw.trim().to_string()));
    }

    Ok(ParsedSelection {
        selection: Selection { stacks: chosen },
        warnings,
    })
}

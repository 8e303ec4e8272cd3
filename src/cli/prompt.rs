//! Interactive prompts

use crate::error::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

/// Questions the setup flow asks the user
pub trait Prompter {
    /// Yes/no question
    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Free-text answer; may be empty
    fn input(&mut self, prompt: &str) -> Result<String>;
}

/// Terminal prompts rendered by dialoguer
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .show_default(false)
            .interact()?;
        Ok(answer)
    }

    fn input(&mut self, prompt: &str) -> Result<String> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }
}

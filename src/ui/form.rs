//! Interactive widgets for the session shell
//!
//! Everything renders on stderr so stdout stays reserved for pasted commands.

use anyhow::Result;
use console::Term;
use dialoguer::{Confirm, FuzzySelect, Input};

use super::theme::ForgeTheme;

/// Result from a form interaction
#[derive(Debug, PartialEq, Eq)]
pub enum FormResult<T> {
    Value(T),
    /// Esc, Ctrl-C or end of input
    Cancelled,
}

pub struct ForgeForm {
    theme: ForgeTheme,
    term: Term,
}

impl Default for ForgeForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ForgeForm {
    pub fn new() -> Self {
        Self {
            theme: ForgeTheme::new(),
            term: Term::stderr(),
        }
    }

    /// Read the request line, pre-filled with `initial` so a recalled entry
    /// can be edited before it is submitted
    pub fn request(&self, initial: &str) -> Result<FormResult<String>> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt("forge")
            .allow_empty(true);

        if !initial.is_empty() {
            input = input.with_initial_text(initial);
        }

        match input.interact_text_on(&self.term) {
            Ok(text) => Ok(FormResult::Value(text)),
            Err(_) => Ok(FormResult::Cancelled),
        }
    }

    /// Pick one entry from `items`. Typing narrows the list.
    pub fn pick(&self, title: &str, items: &[String]) -> Result<FormResult<usize>> {
        if items.is_empty() {
            return Ok(FormResult::Cancelled);
        }

        let selection = FuzzySelect::with_theme(&self.theme)
            .with_prompt(title)
            .items(items)
            .default(0)
            .interact_on_opt(&self.term);

        Ok(cancel_on_error(selection))
    }

    pub fn confirm(&self, question: &str, default: bool) -> Result<FormResult<bool>> {
        let result = Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(default)
            .interact_on_opt(&self.term);

        Ok(cancel_on_error(result))
    }
}

/// Esc gives `None`; Ctrl-C surfaces as an I/O error. Both just cancel.
fn cancel_on_error<T>(result: dialoguer::Result<Option<T>>) -> FormResult<T> {
    match result {
        Ok(Some(value)) => FormResult::Value(value),
        Ok(None) => FormResult::Cancelled,
        Err(e) => {
            tracing::debug!(error = %e, "Prompt interrupted");
            FormResult::Cancelled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_from_nothing_is_cancelled() {
        let form = ForgeForm::new();
        assert_eq!(form.pick("History", &[]).unwrap(), FormResult::Cancelled);
    }

    #[test]
    fn test_interrupted_prompt_is_cancelled() {
        let interrupted = std::io::Error::new(std::io::ErrorKind::Interrupted, "read interrupted");
        let result: dialoguer::Result<Option<usize>> = Err(dialoguer::Error::IO(interrupted));
        assert_eq!(cancel_on_error(result), FormResult::Cancelled);

        assert_eq!(cancel_on_error(Ok(Some(2))), FormResult::Value(2));
        assert_eq!(cancel_on_error::<bool>(Ok(None)), FormResult::Cancelled);
    }
}

//! Ambient context captured at request time
//!
//! The probe gathers whatever it can about the user's surroundings; the
//! relevance filter decides which of those signals reach the model.

pub mod probe;
pub mod relevance;

pub use probe::{ContextProbe, Environment, SystemEnvironment};
pub use relevance::RelevanceFilter;

/// Signals exactly as the probe found them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawContext {
    pub selected_text: Option<String>,
    pub foreground_app: Option<String>,
    pub working_directory: Option<String>,
}

/// The subset of [`RawContext`] that passed the relevance rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredContext {
    pub selected_text: Option<String>,
    pub foreground_app: Option<String>,
    pub working_directory: Option<String>,
}

impl FilteredContext {
    pub fn is_empty(&self) -> bool {
        self.selected_text.is_none()
            && self.foreground_app.is_none()
            && self.working_directory.is_none()
    }
}

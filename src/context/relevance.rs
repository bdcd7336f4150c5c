//! Relevance rules for ambient context

use super::{FilteredContext, RawContext};
use crate::config::ContextConfig;

/// Decides which captured signals are forwarded to the generation backend.
///
/// Each field is judged on its own, so dropping one never changes the
/// verdict on another.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    developer_apps: Vec<String>,
    selection_limit: usize,
}

impl RelevanceFilter {
    pub fn new(developer_apps: Vec<String>, selection_limit: usize) -> Self {
        Self {
            developer_apps,
            selection_limit,
        }
    }

    pub fn from_config(config: &ContextConfig) -> Self {
        Self::new(config.developer_apps.clone(), config.selection_limit)
    }

    pub fn filter(&self, raw: RawContext) -> FilteredContext {
        FilteredContext {
            foreground_app: raw
                .foreground_app
                .filter(|app| self.developer_apps.iter().any(|known| known == app)),
            working_directory: raw.working_directory,
            selected_text: raw
                .selected_text
                .filter(|text| text.chars().count() < self.selection_limit),
        }
    }
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::from_config(&ContextConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(app: Option<&str>, dir: Option<&str>, selection: Option<String>) -> RawContext {
        RawContext {
            selected_text: selection,
            foreground_app: app.map(String::from),
            working_directory: dir.map(String::from),
        }
    }

    #[test]
    fn test_keeps_developer_app() {
        let filtered = RelevanceFilter::default().filter(raw(Some("iTerm2"), None, None));
        assert_eq!(filtered.foreground_app.as_deref(), Some("iTerm2"));
    }

    #[test]
    fn test_drops_unrelated_app() {
        let filtered = RelevanceFilter::default().filter(raw(Some("Safari"), None, None));
        assert!(filtered.foreground_app.is_none());
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_app_match_is_exact() {
        let filtered = RelevanceFilter::default().filter(raw(Some("terminal"), None, None));
        assert!(filtered.foreground_app.is_none());
    }

    #[test]
    fn test_working_directory_always_kept() {
        let filtered = RelevanceFilter::default().filter(raw(Some("Slack"), Some("~/src"), None));
        assert_eq!(filtered.working_directory.as_deref(), Some("~/src"));
    }

    #[test]
    fn test_selection_threshold() {
        let filter = RelevanceFilter::default();

        let short = filter.filter(raw(None, None, Some("x".repeat(1999))));
        assert!(short.selected_text.is_some());

        let at_limit = filter.filter(raw(None, None, Some("x".repeat(2000))));
        assert!(at_limit.selected_text.is_none());
    }

    #[test]
    fn test_threshold_counts_characters_not_bytes() {
        let filter = RelevanceFilter::new(Vec::new(), 10);
        let filtered = filter.filter(raw(None, None, Some("é".repeat(9))));
        assert!(filtered.selected_text.is_some());
    }

    #[test]
    fn test_fields_are_judged_independently() {
        let filter = RelevanceFilter::default();

        let long = filter.filter(raw(Some("Terminal"), Some("~/project"), Some("x".repeat(5000))));
        assert!(long.selected_text.is_none());
        assert_eq!(long.foreground_app.as_deref(), Some("Terminal"));
        assert_eq!(long.working_directory.as_deref(), Some("~/project"));

        let noisy = filter.filter(raw(Some("Messages"), None, Some("ls output".to_string())));
        assert!(noisy.foreground_app.is_none());
        assert_eq!(noisy.selected_text.as_deref(), Some("ls output"));
    }
}

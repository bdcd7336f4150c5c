//! History command - inspect and prune remembered requests

use anyhow::{Context, Result};

use crate::config::Config;
use crate::ui::output;

pub fn list(config: &Config, query: Option<&str>) -> Result<()> {
    let history = super::open_history(config);
    let entries = history.filter(query.unwrap_or(""));

    // Entries go to stdout so they can be piped; the empty notice does not.
    if entries.is_empty() {
        output::print_muted("No history yet");
    }
    for entry in &entries {
        println!("{}", entry);
    }
    Ok(())
}

pub fn clear(config: &Config) -> Result<()> {
    super::open_history(config)
        .clear()
        .context("Failed to clear history")?;
    output::print_success("History cleared");
    Ok(())
}

pub fn remove(config: &Config, entry: &str) -> Result<()> {
    let history = super::open_history(config);
    let before = history.list().len();
    let after = history
        .remove(entry)
        .context("Failed to update history")?
        .len();

    if after < before {
        output::print_success("Removed from history");
    } else {
        output::print_notice(&format!("'{}' is not in history", entry));
    }
    Ok(())
}

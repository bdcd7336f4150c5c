//! Generate command - one request, one command
//!
//! Text piped on stdin stands in for the selection, so
//! `cat error.log | cmdforge generate "fix permissions for this"` works.

use anyhow::{Context, Result};
use std::io::{IsTerminal, Read};

use crate::config::Config;
use crate::context::SystemEnvironment;
use crate::core::{DeliveryMode, SessionError};
use crate::ui::output;

pub async fn run(config: Config, request: &[String], copy: bool, no_context: bool) -> Result<()> {
    let request = request.join(" ");
    let mode = if copy { DeliveryMode::Copy } else { DeliveryMode::Paste };

    let environment = match piped_stdin()? {
        Some(text) => SystemEnvironment::with_selection(text),
        None => SystemEnvironment::new(),
    };

    let mut session = super::build_session(&config, Box::new(environment), !no_context)?;
    session.set_search_text(request);

    let spinner = output::generation_spinner(session.provider());
    let result = session.submit(mode).await;
    spinner.finish_and_clear();

    match result {
        Ok(outcome) => {
            if mode == DeliveryMode::Copy {
                output::print_command(&outcome.command);
            }
            output::print_success(outcome.acknowledgment);
            if let Some(e) = outcome.history_error {
                output::print_notice(&format!("History not saved: {}", e));
            }
            Ok(())
        }
        Err(SessionError::Delivery { command, source }) => {
            output::print_command(&command);
            Err(anyhow::Error::new(source).context("Generated a command but could not deliver it"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Whatever was piped in, if stdin is not a terminal
fn piped_stdin() -> Result<Option<String>> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .context("Failed to read piped input")?;

    Ok(if text.trim().is_empty() { None } else { Some(text) })
}

//! Interactive session
//!
//! A request line, seeded with the recalled entry whenever the session's
//! epoch moves, plus a handful of slash commands for history and delivery.

use anyhow::Result;
use tracing::debug;

use crate::config::Config;
use crate::context::SystemEnvironment;
use crate::core::{DeliveryMode, Session, SessionError};
use crate::ui::theme::ansi;
use crate::ui::{output, ForgeForm, FormResult};

/// What the loop does after handling a line
enum Flow {
    Continue,
    Exit,
}

pub async fn run(config: Config) -> Result<()> {
    let mut session = super::build_session(&config, Box::new(SystemEnvironment::new()), true)?;
    let form = ForgeForm::new();

    output::print_banner(session.provider(), session.model());

    let mut seen_epoch = session.epoch();

    loop {
        let state = session.state();
        debug!(
            phase = ?session.phase(),
            busy = state.is_busy,
            epoch = state.epoch,
            entries = state.history.len(),
            "Awaiting input"
        );

        let initial = if state.epoch != seen_epoch {
            seen_epoch = state.epoch;
            state.search_text
        } else {
            String::new()
        };

        let line = match form.request(&initial)? {
            FormResult::Value(line) => line,
            FormResult::Cancelled => break,
        };

        let flow = if line.trim().is_empty() {
            recall_from_history(&mut session, &form, "")?;
            Flow::Continue
        } else if let Some(command) = line.trim().strip_prefix('/') {
            handle_command(&mut session, &form, command).await?
        } else {
            session.set_search_text(line);
            generate(&mut session, DeliveryMode::Paste).await;
            Flow::Continue
        };

        if let Flow::Exit = flow {
            break;
        }
    }

    eprintln!();
    Ok(())
}

async fn handle_command(session: &mut Session, form: &ForgeForm, input: &str) -> Result<Flow> {
    let (name, arg) = match input.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (input, ""),
    };

    match name.to_lowercase().as_str() {
        "exit" | "quit" | "q" => return Ok(Flow::Exit),
        "help" | "h" | "?" => print_help(),
        "copy" | "c" => {
            // No argument: copy a fresh generation of the last request
            if !arg.is_empty() {
                session.set_search_text(arg);
            }
            generate(session, DeliveryMode::Copy).await;
        }
        "history" => recall_from_history(session, form, arg)?,
        "remove" => {
            let entries = session.state().history;
            if let FormResult::Value(idx) = form.pick("Remove from history", &entries)? {
                match session.remove_history(&entries[idx]) {
                    Ok(()) => output::print_success("Removed from history"),
                    Err(e) => output::print_error(&e.to_string()),
                }
            }
        }
        "clear" => {
            if session.state().history.is_empty() {
                output::print_muted("History is already empty");
            } else if let FormResult::Value(true) = form.confirm("Clear all history?", false)? {
                match session.clear_history() {
                    Ok(()) => output::print_success("History cleared"),
                    Err(e) => output::print_error(&e.to_string()),
                }
            }
        }
        "context" => {
            let prompt = session.preview().await;
            for line in prompt.user.lines() {
                output::print_muted(line);
            }
        }
        _ => {
            output::print_error(&format!("Unknown command: /{}", name));
            output::print_muted("Type /help for available commands");
        }
    }

    Ok(Flow::Continue)
}

/// Let the user pick a past request to edit. Nothing is generated.
fn recall_from_history(session: &mut Session, form: &ForgeForm, query: &str) -> Result<()> {
    let previous = session.search_text().to_string();
    session.set_search_text(query);
    let entries = session.visible_history();

    let picked = if entries.is_empty() {
        if query.is_empty() {
            output::print_muted("No history yet");
        } else {
            output::print_muted(&format!("No history matches '{}'", query));
        }
        None
    } else {
        match form.pick("History", &entries)? {
            FormResult::Value(idx) => Some(idx),
            FormResult::Cancelled => None,
        }
    };

    match picked {
        Some(idx) => session.recall(&entries[idx]),
        // Keep the last request for a bare /copy
        None => session.set_search_text(previous),
    }
    Ok(())
}

/// Submit the current request, racing it against Ctrl-C
async fn generate(session: &mut Session, mode: DeliveryMode) {
    let spinner = output::generation_spinner(session.provider());

    let result = tokio::select! {
        result = session.submit(mode) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    spinner.finish_and_clear();

    match result {
        None => output::print_notice("Cancelled"),
        Some(Ok(outcome)) => {
            if mode == DeliveryMode::Copy {
                output::print_command(&outcome.command);
            }
            output::print_success(&format!("{} ({})", outcome.acknowledgment, outcome.provider));
            if let Some(e) = outcome.history_error {
                output::print_error(&format!("History not saved: {}", e));
            }
        }
        Some(Err(SessionError::Validation)) => output::print_notice(&SessionError::Validation.to_string()),
        Some(Err(SessionError::Delivery { command, source })) => {
            output::print_command(&command);
            output::print_error(&format!("Could not deliver the command: {}", source));
        }
        Some(Err(e)) => output::print_error(&e.to_string()),
    }
}

fn print_help() {
    let commands = [
        ("<request>", "Generate a command and paste it"),
        ("/copy [request]", "Generate and copy to the clipboard (default: last request)"),
        ("/history [query]", "Pick a past request to edit (or press Enter on an empty line)"),
        ("/remove", "Delete one history entry"),
        ("/clear", "Delete all history"),
        ("/context", "Show what would be sent with the current request"),
        ("/exit", "Leave the session"),
    ];

    eprintln!();
    eprintln!("{}{}  Available Commands:{}", ansi::PRIMARY, ansi::BOLD, ansi::RESET);
    for (command, description) in commands {
        eprintln!(
            "{}  {:<18}{}{}{}",
            ansi::FG,
            command,
            ansi::MUTED,
            description,
            ansi::RESET
        );
    }
    eprintln!();
}

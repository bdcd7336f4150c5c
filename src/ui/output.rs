//! Status lines and the generation spinner

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use super::theme::ansi;

mod symbols {
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const NOTICE: &str = "•";
    pub const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
}

pub fn print_error(message: &str) {
    eprintln!(
        "{}  {} {}{}",
        ansi::ERROR,
        symbols::ERROR,
        message,
        ansi::RESET
    );
}

pub fn print_success(message: &str) {
    eprintln!(
        "{}  {} {}{}",
        ansi::SUCCESS,
        symbols::SUCCESS,
        message,
        ansi::RESET
    );
}

/// Inline notice that is neither success nor failure
pub fn print_notice(message: &str) {
    eprintln!(
        "{}  {} {}{}",
        ansi::WARNING,
        symbols::NOTICE,
        message,
        ansi::RESET
    );
}

pub fn print_muted(message: &str) {
    eprintln!("{}  {}{}", ansi::MUTED, message, ansi::RESET);
}

/// Echo a generated command to the user, separately from where it is delivered
pub fn print_command(command: &str) {
    for line in command.lines() {
        eprintln!("{}  │ {}{}{}", ansi::MUTED, ansi::BOLD, line, ansi::RESET);
    }
}

/// Spinner drawn on stderr while a request is in flight
pub fn generation_spinner(provider: &str) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());

    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.yellow} {msg:.dim}") {
        pb.set_style(style.tick_strings(&symbols::SPINNER));
    }

    pb.set_message(format!("Asking {}...", provider));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn print_banner(provider: &str, model: &str) {
    eprintln!();
    eprintln!(
        "{}{}  cmdforge v{}{}  {}{} · {}{}",
        ansi::PRIMARY,
        ansi::BOLD,
        env!("CARGO_PKG_VERSION"),
        ansi::RESET,
        ansi::MUTED,
        provider,
        model,
        ansi::RESET
    );
    eprintln!(
        "{}  Describe a command. Empty line opens history, /help lists commands.{}",
        ansi::DIM,
        ansi::RESET
    );
    eprintln!();
}

//! Theme for interactive prompts and status output

use console::{Color, Style};
use dialoguer::theme::Theme;
use std::fmt;

/// ANSI sequences for plain `eprintln!` output
pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const PRIMARY: &str = "\x1b[38;2;100;181;246m"; // #64B5F6
    pub const SUCCESS: &str = "\x1b[38;2;165;214;167m"; // #A5D6A7
    pub const WARNING: &str = "\x1b[38;2;255;202;40m"; // #FFCA28
    pub const ERROR: &str = "\x1b[38;2;239;154;154m"; // #EF9A9A
    pub const MUTED: &str = "\x1b[38;2;84;110;122m"; // #546E7A
    pub const FG: &str = "\x1b[38;2;212;212;215m"; // #D4D4D7
}

/// dialoguer theme matching the status colours
pub struct ForgeTheme {
    pub prompt_style: Style,
    pub active_style: Style,
    pub inactive_style: Style,
    pub hint_style: Style,
    pub success_style: Style,
    pub error_style: Style,
    pub active_prefix: String,
    pub inactive_prefix: String,
    pub prompt_prefix: String,
    pub success_prefix: String,
}

impl Default for ForgeTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ForgeTheme {
    pub fn new() -> Self {
        // Color256 approximations of the ansi palette
        Self {
            prompt_style: Style::new().fg(Color::Color256(117)).bold(),
            active_style: Style::new().fg(Color::Color256(220)).bold(),
            inactive_style: Style::new().fg(Color::Color256(252)),
            hint_style: Style::new().fg(Color::Color256(242)),
            success_style: Style::new().fg(Color::Color256(114)),
            error_style: Style::new().fg(Color::Color256(210)),
            active_prefix: "❯ ".to_string(),
            inactive_prefix: "  ".to_string(),
            prompt_prefix: "$ ".to_string(),
            success_prefix: "✓ ".to_string(),
        }
    }
}

impl Theme for ForgeTheme {
    fn format_prompt(&self, f: &mut dyn fmt::Write, prompt: &str) -> fmt::Result {
        write!(
            f,
            "{}{} {}",
            self.prompt_style.apply_to(&self.prompt_prefix),
            self.prompt_style.apply_to(prompt),
            self.hint_style.apply_to("(↑↓ navigate, type to filter, enter select, esc cancel)")
        )
    }

    fn format_error(&self, f: &mut dyn fmt::Write, err: &str) -> fmt::Result {
        write!(f, "{}", self.error_style.apply_to(err))
    }

    fn format_confirm_prompt(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        default: Option<bool>,
    ) -> fmt::Result {
        write!(f, "{}{}", self.prompt_prefix, self.prompt_style.apply_to(prompt))?;
        match default {
            Some(true) => write!(f, " {}", self.hint_style.apply_to("[Y/n]")),
            Some(false) => write!(f, " {}", self.hint_style.apply_to("[y/N]")),
            None => write!(f, " {}", self.hint_style.apply_to("[y/n]")),
        }
    }

    fn format_confirm_prompt_selection(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        selection: Option<bool>,
    ) -> fmt::Result {
        write!(f, "{}{}", self.prompt_prefix, self.prompt_style.apply_to(prompt))?;
        match selection {
            Some(true) => write!(f, " {}", self.success_style.apply_to("Yes")),
            Some(false) => write!(f, " {}", self.error_style.apply_to("No")),
            None => Ok(()),
        }
    }

    fn format_input_prompt(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        default: Option<&str>,
    ) -> fmt::Result {
        write!(f, "{}{}", self.prompt_style.apply_to(&self.prompt_prefix), self.prompt_style.apply_to(prompt))?;
        if let Some(default) = default {
            write!(f, " {}", self.hint_style.apply_to(format!("[{}]", default)))?;
        }
        write!(f, " ")
    }

    fn format_input_prompt_selection(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        sel: &str,
    ) -> fmt::Result {
        write!(
            f,
            "{}{} {}",
            self.hint_style.apply_to(&self.prompt_prefix),
            self.hint_style.apply_to(prompt),
            self.inactive_style.apply_to(sel)
        )
    }

    fn format_select_prompt(&self, f: &mut dyn fmt::Write, prompt: &str) -> fmt::Result {
        self.format_prompt(f, prompt)
    }

    fn format_select_prompt_selection(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        sel: &str,
    ) -> fmt::Result {
        write!(
            f,
            "{}{}: {}",
            self.success_style.apply_to(&self.success_prefix),
            self.prompt_style.apply_to(prompt),
            self.success_style.apply_to(sel)
        )
    }

    fn format_select_prompt_item(
        &self,
        f: &mut dyn fmt::Write,
        text: &str,
        active: bool,
    ) -> fmt::Result {
        if active {
            write!(
                f,
                "{}{}",
                self.active_style.apply_to(&self.active_prefix),
                self.active_style.apply_to(text)
            )
        } else {
            write!(f, "{}{}", self.inactive_prefix, self.inactive_style.apply_to(text))
        }
    }
}

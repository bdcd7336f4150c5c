//! Handing the generated command to the user

use std::io::Write;
use thiserror::Error;

/// How a successful command reaches the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Write the command where the shell can pick it up (stdout)
    Paste,
    /// Put the command on the system clipboard
    Copy,
}

impl DeliveryMode {
    pub fn acknowledgment(&self) -> &'static str {
        match self {
            DeliveryMode::Paste => "Pasted command",
            DeliveryMode::Copy => "Copied command to clipboard",
        }
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("could not write command: {0}")]
    Output(#[from] std::io::Error),
}

pub trait Delivery: Send + Sync {
    fn deliver(&self, command: &str, mode: DeliveryMode) -> Result<(), DeliveryError>;
}

/// Stdout for paste, system clipboard for copy
#[derive(Debug, Default)]
pub struct TerminalDelivery;

impl Delivery for TerminalDelivery {
    fn deliver(&self, command: &str, mode: DeliveryMode) -> Result<(), DeliveryError> {
        match mode {
            DeliveryMode::Paste => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", command)?;
                stdout.flush()?;
            }
            DeliveryMode::Copy => {
                let mut clipboard = arboard::Clipboard::new()
                    .map_err(|e| DeliveryError::Clipboard(e.to_string()))?;
                clipboard
                    .set_text(command.to_string())
                    .map_err(|e| DeliveryError::Clipboard(e.to_string()))?;
            }
        }
        Ok(())
    }
}

/// Remembers what it was asked to deliver, for tests
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingDelivery {
    pub delivered: std::sync::Arc<std::sync::Mutex<Vec<(String, DeliveryMode)>>>,
    pub fail: bool,
}

#[cfg(test)]
impl Delivery for RecordingDelivery {
    fn deliver(&self, command: &str, mode: DeliveryMode) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Clipboard("no display".to_string()));
        }
        self.delivered
            .lock()
            .unwrap()
            .push((command.to_string(), mode));
        Ok(())
    }
}

//! Interaction controller
//!
//! Drives one request at a time through probe → filter → prompt → backend,
//! then records history and delivers the command. `recall` seeds the
//! editable request from history without generating anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::delivery::{Delivery, DeliveryError, DeliveryMode};
use super::history::{filter_entries, HistoryStore};
use super::store::StoreError;
use crate::ai::{prompt, GenerationBackend, GenerationError, ModelParameters, Prompt};
use crate::context::{ContextProbe, RelevanceFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Generating,
}

/// What the UI shell renders from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub search_text: String,
    pub is_busy: bool,
    pub history: Vec<String>,
    /// Bumped on every recall so the shell re-seeds its input
    pub epoch: u64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Type a request first")]
    Validation,

    #[error("A command is already being generated")]
    Busy,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Generated `{command}` but could not deliver it: {source}")]
    Delivery {
        command: String,
        #[source]
        source: DeliveryError,
    },

    #[error("Could not update history: {0}")]
    History(#[from] StoreError),
}

/// A delivered command
#[derive(Debug)]
pub struct Outcome {
    pub command: String,
    pub provider: String,
    pub acknowledgment: &'static str,
    /// Set when the command was delivered but history could not be saved
    pub history_error: Option<StoreError>,
}

/// Clears the busy flag however the submission ends, including when its
/// future is dropped mid-flight.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard(flag.clone()))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Session {
    probe: ContextProbe,
    filter: RelevanceFilter,
    backend: Box<dyn GenerationBackend>,
    params: ModelParameters,
    history: Arc<HistoryStore>,
    delivery: Box<dyn Delivery>,
    search_text: String,
    cached_history: Vec<String>,
    epoch: u64,
    busy: Arc<AtomicBool>,
}

impl Session {
    pub fn new(
        probe: ContextProbe,
        filter: RelevanceFilter,
        backend: Box<dyn GenerationBackend>,
        params: ModelParameters,
        history: Arc<HistoryStore>,
        delivery: Box<dyn Delivery>,
    ) -> Self {
        let cached_history = history.list();
        Self {
            probe,
            filter,
            backend,
            params,
            history,
            delivery,
            search_text: String::new(),
            cached_history,
            epoch: 0,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn provider(&self) -> &str {
        self.backend.name()
    }

    pub fn model(&self) -> &str {
        &self.params.model
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> Phase {
        if self.is_busy() {
            Phase::Generating
        } else {
            Phase::Idle
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn state(&self) -> InteractionState {
        InteractionState {
            search_text: self.search_text.clone(),
            is_busy: self.is_busy(),
            history: self.cached_history.clone(),
            epoch: self.epoch,
        }
    }

    /// The user edited the request
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// History section for the current search text
    pub fn visible_history(&self) -> Vec<String> {
        if self.is_busy() {
            return self.cached_history.clone();
        }
        filter_entries(&self.cached_history, &self.search_text)
    }

    /// Load a past request for editing. Never generates.
    pub fn recall(&mut self, entry: &str) {
        self.search_text = entry.to_string();
        self.epoch += 1;
        debug!(epoch = self.epoch, "Recalled history entry");
    }

    /// Render the prompt the current request would be sent with
    pub async fn preview(&self) -> Prompt {
        let context = self.filter.filter(self.probe.acquire().await);
        prompt::assemble(self.search_text.trim(), &context)
    }

    /// Generate a command for the current search text and deliver it
    pub async fn submit(&mut self, mode: DeliveryMode) -> Result<Outcome, SessionError> {
        let request = self.search_text.clone();
        if request.trim().is_empty() {
            return Err(SessionError::Validation);
        }
        let _busy = BusyGuard::acquire(&self.busy).ok_or(SessionError::Busy)?;

        let context = self.filter.filter(self.probe.acquire().await);
        let prompt = prompt::assemble(request.trim(), &context);
        debug!(
            provider = self.backend.name(),
            prompt_chars = prompt.user.len(),
            "Submitting request"
        );

        let generated = self
            .backend
            .generate(&prompt, &self.params)
            .await
            .map_err(|e| {
                debug!(kind = ?e.kind(), error = %e, "Generation failed");
                e
            })?;

        let history_error = match self.history.record(&request) {
            Ok(entries) => {
                self.cached_history = entries;
                None
            }
            Err(e) => {
                warn!(error = %e, "Command generated but history was not saved");
                Some(e)
            }
        };

        self.delivery
            .deliver(&generated.command, mode)
            .map_err(|source| SessionError::Delivery {
                command: generated.command.clone(),
                source,
            })?;

        Ok(Outcome {
            command: generated.command,
            provider: generated.provider,
            acknowledgment: mode.acknowledgment(),
            history_error,
        })
    }

    pub fn clear_history(&mut self) -> Result<(), SessionError> {
        self.cached_history = self.history.clear()?;
        Ok(())
    }

    pub fn remove_history(&mut self, entry: &str) -> Result<(), SessionError> {
        self.cached_history = self.history.remove(entry)?;
        Ok(())
    }
}

//! CLI command implementations

pub mod generate;
pub mod history;
pub mod info;
pub mod interactive;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::ai::router;
use crate::config::Config;
use crate::context::{ContextProbe, Environment, RelevanceFilter};
use crate::core::store::{KeyValueStore, MemoryStore};
use crate::core::{FileStore, HistoryStore, Session, TerminalDelivery};

/// History backed by the data directory, or by memory when there is none
pub fn open_history(config: &Config) -> Arc<HistoryStore> {
    let store: Arc<dyn KeyValueStore> = match config.data_dir() {
        Ok(dir) => {
            let store = FileStore::new(dir);
            debug!(dir = %store.dir().display(), "History location");
            Arc::new(store)
        }
        Err(e) => {
            warn!(error = %e, "No data directory, history will not persist");
            Arc::new(MemoryStore::new())
        }
    };
    Arc::new(HistoryStore::new(store))
}

/// Assemble a session from configuration
pub fn build_session(
    config: &Config,
    environment: Box<dyn Environment>,
    with_context: bool,
) -> Result<Session> {
    let (backend, params) =
        router::select_backend(config).context("Failed to set up the generation backend")?;

    let mut probe = ContextProbe::from_config(&config.context, environment);
    if !with_context {
        probe = probe.disabled();
    }

    Ok(Session::new(
        probe,
        RelevanceFilter::from_config(&config.context),
        backend,
        params,
        open_history(config),
        Box::new(TerminalDelivery),
    ))
}

//! Session core: history persistence, delivery and the interaction controller

pub mod delivery;
pub mod history;
pub mod session;
pub mod store;

pub use delivery::{DeliveryMode, TerminalDelivery};
pub use history::HistoryStore;
pub use session::{Session, SessionError};
pub use store::FileStore;

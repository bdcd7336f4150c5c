//! Terminal UI: themed prompts and status output

pub mod form;
pub mod output;
pub mod theme;

pub use form::{ForgeForm, FormResult};

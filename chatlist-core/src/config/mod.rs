//! Configuration management.

mod settings;

pub use settings::{Settings, DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT_SECS};

//! Model configuration types and registry.

mod config;
mod registry;
mod types;

pub use config::ModelConfig;
pub use registry::ModelRegistry;
pub use types::{ModelConfigError, Provider};

pub mod config;
pub mod error;
pub mod selection;
pub mod templates;

pub use config::{CollatePaths, Config, DiagnosticsConfig};
pub use error::ConfigError;

use thiserror::Error;

/// Error type for selectees-config operations
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Template error: {0}")]
  Template(String),

  #[error("Selection error: {0}")]
  Selection(String),
}

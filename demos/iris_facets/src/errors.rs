// demos/iris_facets/src/errors.rs

use kiln::KilnError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Pipeline Error: {source}")]
  Pipeline {
    #[from] // Allows conversion from kiln::KilnError
    source: KilnError,
  },

  #[error("Output Error: {0}")]
  Output(String),
}

impl From<serde_json::Error> for AppError {
  fn from(err: serde_json::Error) -> Self {
    AppError::Output(err.to_string())
  }
}

impl From<std::io::Error> for AppError {
  fn from(err: std::io::Error) -> Self {
    AppError::Output(err.to_string())
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

// demos/iris_facets/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use kiln::SplitConfig;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub split: SplitConfig,
  pub output_dir: PathBuf,
  pub log_format: LogFormat,
  /// Optional CSV source used instead of the bundled Iris data, with its label column.
  pub dataset_csv: Option<(PathBuf, String)>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable lookup, e.g. a map in tests.
  pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let defaults = SplitConfig::default();

    let test_size = match get("IRIS_TEST_SIZE") {
      Some(raw) => raw
        .parse::<f64>()
        .map_err(|e| AppError::Config(format!("Invalid IRIS_TEST_SIZE '{}': {}", raw, e)))?,
      None => defaults.test_size,
    };
    if !(test_size > 0.0 && test_size < 1.0) {
      return Err(AppError::Config(format!(
        "IRIS_TEST_SIZE must be between 0 and 1, got {}",
        test_size
      )));
    }

    let seed = match get("IRIS_SPLIT_SEED") {
      Some(raw) => raw
        .parse::<u64>()
        .map_err(|e| AppError::Config(format!("Invalid IRIS_SPLIT_SEED '{}': {}", raw, e)))?,
      None => defaults.seed,
    };

    let output_dir = get("FACETS_OUTPUT_DIR")
      .map(PathBuf::from)
      .unwrap_or_else(|| PathBuf::from("target/facets"));

    let log_format = match get("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase).as_deref() {
      None | Some("pretty") => LogFormat::Pretty,
      Some("json") => LogFormat::Json,
      Some(other) => return Err(AppError::Config(format!("Invalid LOG_FORMAT '{}': expected pretty or json", other))),
    };

    let dataset_csv = match (get("DATASET_CSV"), get("DATASET_LABEL_COLUMN")) {
      (None, _) => None,
      (Some(path), Some(label)) => Some((PathBuf::from(path), label)),
      (Some(_), None) => {
        return Err(AppError::Config(
          "DATASET_CSV is set but DATASET_LABEL_COLUMN is missing".to_string(),
        ))
      }
    };

    Ok(Self {
      split: SplitConfig::new(test_size, seed),
      output_dir,
      log_format,
      dataset_csv,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name: &str| map.get(name).cloned()
  }

  #[test]
  fn defaults_match_the_conventional_split() {
    let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg.split.test_size, 0.2);
    assert_eq!(cfg.split.seed, 42);
    assert_eq!(cfg.log_format, LogFormat::Pretty);
    assert!(cfg.dataset_csv.is_none());
  }

  #[test]
  fn rejects_out_of_range_test_size() {
    let err = AppConfig::from_lookup(lookup(&[("IRIS_TEST_SIZE", "1.5")])).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
  }

  #[test]
  fn csv_source_requires_label_column() {
    let err = AppConfig::from_lookup(lookup(&[("DATASET_CSV", "data.csv")])).unwrap_err();
    assert!(err.to_string().contains("DATASET_LABEL_COLUMN"));

    let cfg = AppConfig::from_lookup(lookup(&[("DATASET_CSV", "data.csv"), ("DATASET_LABEL_COLUMN", "y")])).unwrap();
    assert_eq!(cfg.dataset_csv, Some((PathBuf::from("data.csv"), "y".to_string())));
  }
}

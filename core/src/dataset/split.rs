// kiln/src/dataset/split.rs

//! Seeded, reproducible train/test partitioning of a feature table and its labels.

use crate::dataset::table::{Series, TabularDataset};
use crate::error::{KilnError, KilnResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{event, Level};

/// How to split: the fraction of rows held out for testing and the shuffle seed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
  pub test_size: f64,
  pub seed: u64,
  pub shuffle: bool,
}

impl Default for SplitConfig {
  fn default() -> Self {
    Self {
      test_size: 0.2,
      seed: 42,
      shuffle: true,
    }
  }
}

impl SplitConfig {
  pub fn new(test_size: f64, seed: u64) -> Self {
    Self {
      test_size,
      seed,
      shuffle: true,
    }
  }

  /// `(n_train, n_test)` for `rows` rows; the test side is rounded up.
  pub fn sizes(&self, rows: usize) -> KilnResult<(usize, usize)> {
    if !(self.test_size > 0.0 && self.test_size < 1.0) {
      return Err(KilnError::InvalidSplit(format!(
        "test_size must be in (0, 1), got {}",
        self.test_size
      )));
    }
    let n_test = (rows as f64 * self.test_size).ceil() as usize;
    let n_train = rows.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
      return Err(KilnError::InvalidSplit(format!(
        "test_size {} on {} rows leaves an empty partition (train={}, test={})",
        self.test_size, rows, n_train, n_test
      )));
    }
    Ok((n_train, n_test))
  }
}

/// Disjoint training and test partitions of a feature table and its labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainTestSplit {
  pub x_train: TabularDataset,
  pub x_test: TabularDataset,
  pub y_train: Series,
  pub y_test: Series,
}

/// Partitions `features` and `labels` row-wise.
///
/// A permutation of the row positions is drawn from a `StdRng` seeded with `config.seed`;
/// the first `n_test` positions become the test set and the rest the training set. Without
/// shuffling the last `n_test` rows are the test set. Equal configs give equal partitions.
pub fn train_test_split(features: &TabularDataset, labels: &Series, config: &SplitConfig) -> KilnResult<TrainTestSplit> {
  let rows = features.num_rows();
  if labels.len() != rows {
    return Err(KilnError::InvalidSplit(format!(
      "features have {} rows but labels have {}",
      rows,
      labels.len()
    )));
  }
  let (n_train, n_test) = config.sizes(rows)?;

  let mut positions: Vec<usize> = (0..rows).collect();
  let (test_positions, train_positions) = if config.shuffle {
    let mut rng = StdRng::seed_from_u64(config.seed);
    positions.shuffle(&mut rng);
    let (test, train) = positions.split_at(n_test);
    (test.to_vec(), train.to_vec())
  } else {
    let (train, test) = positions.split_at(n_train);
    (test.to_vec(), train.to_vec())
  };

  event!(Level::DEBUG, rows, n_train, n_test, seed = config.seed, shuffle = config.shuffle, "Dataset split.");

  Ok(TrainTestSplit {
    x_train: features.take(&train_positions)?,
    x_test: features.take(&test_positions)?,
    y_train: labels.take(&train_positions)?,
    y_test: labels.take(&test_positions)?,
  })
}

// kiln/src/facets/statistics.rs

//! Per-column summary statistics in the spirit of the Facets Overview: counts, missing
//! rates, moments and quantiles for numeric columns, frequencies for categorical ones.

use crate::dataset::table::{Column, ColumnData, TabularDataset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStatistics {
  /// Non-missing values.
  pub count: usize,
  pub missing: usize,
  pub missing_rate: f64,
  pub mean: Option<f64>,
  /// Population variance.
  pub variance: Option<f64>,
  /// Population standard deviation.
  pub std_dev: Option<f64>,
  pub min: Option<f64>,
  pub median: Option<f64>,
  pub max: Option<f64>,
  pub zeros: usize,
}

impl NumericStatistics {
  pub fn compute(values: &[Option<f64>]) -> Self {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    let count = present.len();
    let missing = values.len() - count;
    let zeros = present.iter().filter(|v| **v == 0.0).count();

    if count == 0 {
      return Self {
        count,
        missing,
        missing_rate: missing_rate(missing, values.len()),
        mean: None,
        variance: None,
        std_dev: None,
        min: None,
        median: None,
        max: None,
        zeros,
      };
    }

    present.sort_by(|a, b| a.total_cmp(b));
    let n = count as f64;
    let mean = present.iter().sum::<f64>() / n;
    let variance = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let median = if count % 2 == 1 {
      present[count / 2]
    } else {
      (present[count / 2 - 1] + present[count / 2]) / 2.0
    };

    Self {
      count,
      missing,
      missing_rate: missing_rate(missing, values.len()),
      mean: Some(mean),
      variance: Some(variance),
      std_dev: Some(variance.sqrt()),
      min: present.first().copied(),
      median: Some(median),
      max: present.last().copied(),
      zeros,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalStatistics {
  pub count: usize,
  pub missing: usize,
  pub missing_rate: f64,
  pub unique: usize,
  /// Most frequent value; ties go to the lexicographically smallest.
  pub top: Option<String>,
  pub top_frequency: usize,
  pub frequencies: BTreeMap<String, usize>,
  pub avg_length: Option<f64>,
}

impl CategoricalStatistics {
  pub fn compute(values: &[Option<String>]) -> Self {
    let mut frequencies: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_length = 0usize;
    for value in values.iter().flatten() {
      *frequencies.entry(value.clone()).or_default() += 1;
      total_length += value.chars().count();
    }
    let count: usize = frequencies.values().sum();
    let missing = values.len() - count;

    // BTreeMap iterates in key order, so the first maximum wins ties.
    let (top, top_frequency) = frequencies
      .iter()
      .fold((None, 0), |(best, best_freq), (value, freq)| {
        if *freq > best_freq {
          (Some(value.clone()), *freq)
        } else {
          (best, best_freq)
        }
      });

    Self {
      count,
      missing,
      missing_rate: missing_rate(missing, values.len()),
      unique: frequencies.len(),
      top,
      top_frequency,
      avg_length: (count > 0).then(|| total_length as f64 / count as f64),
      frequencies,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
  Numeric(NumericStatistics),
  Categorical(CategoricalStatistics),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStatistics {
  pub name: String,
  pub stats: FeatureKind,
}

impl FeatureStatistics {
  pub fn compute(column: &Column) -> Self {
    let stats = match &column.data {
      ColumnData::Numeric(values) => FeatureKind::Numeric(NumericStatistics::compute(values)),
      ColumnData::Categorical(values) => FeatureKind::Categorical(CategoricalStatistics::compute(values)),
    };
    Self {
      name: column.name.clone(),
      stats,
    }
  }

  pub fn count(&self) -> usize {
    match &self.stats {
      FeatureKind::Numeric(s) => s.count,
      FeatureKind::Categorical(s) => s.count,
    }
  }

  pub fn missing_rate(&self) -> f64 {
    match &self.stats {
      FeatureKind::Numeric(s) => s.missing_rate,
      FeatureKind::Categorical(s) => s.missing_rate,
    }
  }

  pub fn as_numeric(&self) -> Option<&NumericStatistics> {
    match &self.stats {
      FeatureKind::Numeric(s) => Some(s),
      FeatureKind::Categorical(_) => None,
    }
  }

  pub fn as_categorical(&self) -> Option<&CategoricalStatistics> {
    match &self.stats {
      FeatureKind::Categorical(s) => Some(s),
      FeatureKind::Numeric(_) => None,
    }
  }
}

/// Statistics for every column of one dataset, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistics {
  pub name: String,
  pub num_rows: usize,
  pub features: Vec<FeatureStatistics>,
}

impl DatasetStatistics {
  pub fn compute(name: impl Into<String>, dataset: &TabularDataset) -> Self {
    Self {
      name: name.into(),
      num_rows: dataset.num_rows(),
      features: dataset.columns().iter().map(FeatureStatistics::compute).collect(),
    }
  }

  pub fn feature(&self, name: &str) -> Option<&FeatureStatistics> {
    self.features.iter().find(|f| f.name == name)
  }
}

fn missing_rate(missing: usize, total: usize) -> f64 {
  if total == 0 {
    0.0
  } else {
    missing as f64 / total as f64
  }
}

// kiln/src/dataset/table.rs

//! Column-oriented tabular data: `TabularDataset` for feature tables, `Series` for labels.

use crate::error::{KilnError, KilnResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
  Numeric,
  Categorical,
}

/// Cell values of one column; `None` marks a missing value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ColumnData {
  Numeric(Vec<Option<f64>>),
  Categorical(Vec<Option<String>>),
}

impl ColumnData {
  pub fn len(&self) -> usize {
    match self {
      ColumnData::Numeric(values) => values.len(),
      ColumnData::Categorical(values) => values.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn column_type(&self) -> ColumnType {
    match self {
      ColumnData::Numeric(_) => ColumnType::Numeric,
      ColumnData::Categorical(_) => ColumnType::Categorical,
    }
  }

  pub fn missing(&self) -> usize {
    match self {
      ColumnData::Numeric(values) => values.iter().filter(|v| v.is_none()).count(),
      ColumnData::Categorical(values) => values.iter().filter(|v| v.is_none()).count(),
    }
  }

  fn take(&self, positions: &[usize]) -> ColumnData {
    match self {
      ColumnData::Numeric(values) => ColumnData::Numeric(positions.iter().map(|p| values[*p]).collect()),
      ColumnData::Categorical(values) => {
        ColumnData::Categorical(positions.iter().map(|p| values[*p].clone()).collect())
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
  pub name: String,
  pub data: ColumnData,
}

impl Column {
  pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
    Self {
      name: name.into(),
      data: ColumnData::Numeric(values),
    }
  }

  pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
    Self {
      name: name.into(),
      data: ColumnData::Categorical(values),
    }
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn column_type(&self) -> ColumnType {
    self.data.column_type()
  }
}

/// An immutable table of equally long, uniquely named columns.
///
/// `index` holds the row ids of the source the rows came from, so subsets produced by
/// `take` (e.g. train/test partitions) can be traced back to the original rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct TabularDataset {
  index: Vec<usize>,
  columns: Vec<Column>,
}

impl TabularDataset {
  /// Builds a dataset with the default index `0..rows`.
  pub fn new(columns: Vec<Column>) -> KilnResult<Self> {
    let rows = columns.first().map_or(0, Column::len);
    Self::with_index((0..rows).collect(), columns)
  }

  pub fn with_index(index: Vec<usize>, columns: Vec<Column>) -> KilnResult<Self> {
    let mut seen = HashSet::new();
    for column in &columns {
      if !seen.insert(column.name.as_str()) {
        return Err(KilnError::InvalidDataset(format!("duplicate column '{}'", column.name)));
      }
      if column.len() != index.len() {
        return Err(KilnError::InvalidDataset(format!(
          "column '{}' has {} rows, expected {}",
          column.name,
          column.len(),
          index.len()
        )));
      }
    }
    Ok(Self { index, columns })
  }

  pub fn num_rows(&self) -> usize {
    self.index.len()
  }

  pub fn num_columns(&self) -> usize {
    self.columns.len()
  }

  pub fn index(&self) -> &[usize] {
    &self.index
  }

  pub fn columns(&self) -> &[Column] {
    &self.columns
  }

  pub fn column(&self, name: &str) -> Option<&Column> {
    self.columns.iter().find(|c| c.name == name)
  }

  pub fn column_names(&self) -> Vec<&str> {
    self.columns.iter().map(|c| c.name.as_str()).collect()
  }

  pub fn schema(&self) -> Vec<(&str, ColumnType)> {
    self.columns.iter().map(|c| (c.name.as_str(), c.column_type())).collect()
  }

  /// A new dataset holding the rows at `positions` (0-based positions, not index ids), in that order.
  pub fn take(&self, positions: &[usize]) -> KilnResult<Self> {
    check_positions(positions, self.num_rows())?;
    Ok(Self {
      index: positions.iter().map(|p| self.index[*p]).collect(),
      columns: self
        .columns
        .iter()
        .map(|c| Column {
          name: c.name.clone(),
          data: c.data.take(positions),
        })
        .collect(),
    })
  }

  /// Splits off column `name` as a `Series`, returning the remaining table alongside it.
  pub fn split_column(&self, name: &str) -> KilnResult<(Self, Series)> {
    let label = self
      .column(name)
      .cloned()
      .ok_or_else(|| KilnError::InvalidDataset(format!("no column named '{}'", name)))?;
    let features = self.columns.iter().filter(|c| c.name != name).cloned().collect();
    Ok((
      Self {
        index: self.index.clone(),
        columns: features,
      },
      Series {
        index: self.index.clone(),
        column: label,
      },
    ))
  }
}

/// A single labelled column with its row index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct Series {
  index: Vec<usize>,
  column: Column,
}

impl Series {
  pub fn new(column: Column) -> Self {
    Self {
      index: (0..column.len()).collect(),
      column,
    }
  }

  pub fn name(&self) -> &str {
    &self.column.name
  }

  pub fn len(&self) -> usize {
    self.index.len()
  }

  pub fn is_empty(&self) -> bool {
    self.index.is_empty()
  }

  pub fn index(&self) -> &[usize] {
    &self.index
  }

  pub fn column(&self) -> &Column {
    &self.column
  }

  pub fn take(&self, positions: &[usize]) -> KilnResult<Self> {
    check_positions(positions, self.len())?;
    Ok(Self {
      index: positions.iter().map(|p| self.index[*p]).collect(),
      column: Column {
        name: self.column.name.clone(),
        data: self.column.data.take(positions),
      },
    })
  }

  /// The series as a one-column table, e.g. to compute statistics on labels.
  pub fn to_dataset(&self) -> TabularDataset {
    TabularDataset {
      index: self.index.clone(),
      columns: vec![self.column.clone()],
    }
  }
}

// Deserialized data goes through the same checks as the constructors.
#[derive(Deserialize)]
struct RawDataset {
  index: Vec<usize>,
  columns: Vec<Column>,
}

impl TryFrom<RawDataset> for TabularDataset {
  type Error = KilnError;

  fn try_from(raw: RawDataset) -> KilnResult<Self> {
    Self::with_index(raw.index, raw.columns)
  }
}

#[derive(Deserialize)]
struct RawSeries {
  index: Vec<usize>,
  column: Column,
}

impl TryFrom<RawSeries> for Series {
  type Error = KilnError;

  fn try_from(raw: RawSeries) -> KilnResult<Self> {
    if raw.column.len() != raw.index.len() {
      return Err(KilnError::InvalidDataset(format!(
        "series '{}' has {} values, expected {}",
        raw.column.name,
        raw.column.len(),
        raw.index.len()
      )));
    }
    Ok(Self {
      index: raw.index,
      column: raw.column,
    })
  }
}

fn check_positions(positions: &[usize], rows: usize) -> KilnResult<()> {
  match positions.iter().find(|p| **p >= rows) {
    Some(p) => Err(KilnError::InvalidDataset(format!("row position {} out of range ({} rows)", p, rows))),
    None => Ok(()),
  }
}

// kiln/src/dataset/csv.rs

//! Minimal CSV reader for headered, comma-separated numeric/categorical tables.
//!
//! Column types are inferred: a column is numeric when every non-empty cell parses as
//! `f64`, categorical otherwise. Empty cells (and `NA`/`NaN`) are missing values.
//! Quoted fields are not supported.

use crate::dataset::table::{Column, Series, TabularDataset};
use crate::error::{KilnError, KilnResult};

const MISSING_MARKERS: &[&str] = &["", "NA", "NaN", "nan", "null"];

/// Parses `content` into a table with every column.
pub fn parse_csv(content: &str, delimiter: char) -> KilnResult<TabularDataset> {
  let mut lines = content.lines().filter(|line| !line.trim().is_empty());
  let header: Vec<String> = lines
    .next()
    .ok_or_else(|| KilnError::InvalidDataset("CSV content is empty".to_string()))?
    .split(delimiter)
    .map(|h| h.trim().to_string())
    .collect();

  let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); header.len()];
  for (line_no, line) in lines.enumerate() {
    let fields: Vec<&str> = line.split(delimiter).collect();
    if fields.len() != header.len() {
      return Err(KilnError::InvalidDataset(format!(
        "CSV row {} has {} fields, header has {}",
        line_no + 2,
        fields.len(),
        header.len()
      )));
    }
    for (col, field) in fields.into_iter().enumerate() {
      let field = field.trim();
      cells[col].push(if MISSING_MARKERS.contains(&field) {
        None
      } else {
        Some(field.to_string())
      });
    }
  }

  let columns = header
    .into_iter()
    .zip(cells)
    .map(|(name, values)| infer_column(name, values))
    .collect();
  TabularDataset::new(columns)
}

/// Parses `content` and splits off `label_column` as the label series.
pub fn parse_labeled_csv(content: &str, delimiter: char, label_column: &str) -> KilnResult<(TabularDataset, Series)> {
  parse_csv(content, delimiter)?.split_column(label_column)
}

fn infer_column(name: String, values: Vec<Option<String>>) -> Column {
  let numeric: Option<Vec<Option<f64>>> = values
    .iter()
    .map(|cell| match cell {
      None => Some(None),
      Some(text) => text.parse::<f64>().ok().map(Some),
    })
    .collect();
  match numeric {
    Some(parsed) => Column::numeric(name, parsed),
    None => Column::categorical(name, values),
  }
}

// kiln/src/facets/comparison.rs

//! `FacetsComparison` puts the statistics of two datasets side by side and renders them
//! as a self-contained HTML page or a plain-text table.

use crate::dataset::table::TabularDataset;
use crate::error::{KilnError, KilnResult};
use crate::facets::statistics::{DatasetStatistics, FeatureKind, FeatureStatistics};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{event, Level};

pub const HTML_FILENAME: &str = "facets_overview.html";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetsComparison {
  pub left: DatasetStatistics,
  pub right: DatasetStatistics,
}

impl FacetsComparison {
  pub fn new(left: DatasetStatistics, right: DatasetStatistics) -> Self {
    Self { left, right }
  }

  pub fn from_datasets(
    left_name: impl Into<String>,
    left: &TabularDataset,
    right_name: impl Into<String>,
    right: &TabularDataset,
  ) -> Self {
    Self::new(
      DatasetStatistics::compute(left_name, left),
      DatasetStatistics::compute(right_name, right),
    )
  }

  /// Feature names across both sides: the left's in order, then any only on the right.
  pub fn feature_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.left.features.iter().map(|f| f.name.as_str()).collect();
    for feature in &self.right.features {
      if !names.contains(&feature.name.as_str()) {
        names.push(feature.name.as_str());
      }
    }
    names
  }

  fn sides(&self) -> [&DatasetStatistics; 2] {
    [&self.left, &self.right]
  }

  pub fn render_text(&self) -> String {
    let mut out = String::new();
    let _ = writeln!(
      out,
      "Facets overview: {} ({} rows) vs {} ({} rows)",
      self.left.name, self.left.num_rows, self.right.name, self.right.num_rows
    );
    let _ = writeln!(
      out,
      "{:<24} {:<10} {:>6} {:>8} {:>9} {:>9} {:>8} {:>8} {:>8}",
      "feature", "dataset", "count", "missing", "mean", "std_dev", "min", "median", "max"
    );
    for name in self.feature_names() {
      for side in self.sides() {
        let Some(feature) = side.feature(name) else {
          let _ = writeln!(out, "{:<24} {:<10} {:>6}", name, side.name, "-");
          continue;
        };
        match &feature.stats {
          FeatureKind::Numeric(s) => {
            let _ = writeln!(
              out,
              "{:<24} {:<10} {:>6} {:>7.1}% {:>9} {:>9} {:>8} {:>8} {:>8}",
              name,
              side.name,
              s.count,
              s.missing_rate * 100.0,
              fmt_opt(s.mean),
              fmt_opt(s.std_dev),
              fmt_opt(s.min),
              fmt_opt(s.median),
              fmt_opt(s.max)
            );
          }
          FeatureKind::Categorical(s) => {
            let _ = writeln!(
              out,
              "{:<24} {:<10} {:>6} {:>7.1}%  unique={} top={} ({})",
              name,
              side.name,
              s.count,
              s.missing_rate * 100.0,
              s.unique,
              s.top.as_deref().unwrap_or("-"),
              s.top_frequency
            );
          }
        }
      }
    }
    out
  }

  pub fn render_html(&self) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(
      html,
      "<title>Facets overview: {} vs {}</title>",
      escape_html(&self.left.name),
      escape_html(&self.right.name)
    );
    html.push_str(
      "<style>body{font-family:sans-serif}table{border-collapse:collapse;margin-bottom:2em}\
       th,td{border:1px solid #ccc;padding:4px 8px;text-align:right}th:first-child,td:first-child{text-align:left}\
       .missing{color:#c00}</style>\n</head>\n<body>\n",
    );
    let _ = writeln!(
      html,
      "<h1>Facets overview</h1>\n<p>{} ({} rows) compared with {} ({} rows)</p>",
      escape_html(&self.left.name),
      self.left.num_rows,
      escape_html(&self.right.name),
      self.right.num_rows
    );

    let names = self.feature_names();
    let numeric: Vec<&str> = names.iter().copied().filter(|n| self.is_kind(n, true)).collect();
    let categorical: Vec<&str> = names.iter().copied().filter(|n| self.is_kind(n, false)).collect();

    if !numeric.is_empty() {
      html.push_str("<h2>Numeric features</h2>\n<table>\n<tr><th>feature</th><th>dataset</th><th>count</th><th>missing</th><th>mean</th><th>std dev</th><th>zeros</th><th>min</th><th>median</th><th>max</th></tr>\n");
      for name in numeric {
        for side in self.sides() {
          if let Some(s) = side.feature(name).and_then(FeatureStatistics::as_numeric) {
            let _ = writeln!(
              html,
              "<tr><td>{}</td><td>{}</td><td>{}</td><td{}>{:.1}%</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
              escape_html(name),
              escape_html(&side.name),
              s.count,
              missing_class(s.missing),
              s.missing_rate * 100.0,
              fmt_opt(s.mean),
              fmt_opt(s.std_dev),
              s.zeros,
              fmt_opt(s.min),
              fmt_opt(s.median),
              fmt_opt(s.max)
            );
          }
        }
      }
      html.push_str("</table>\n");
    }

    if !categorical.is_empty() {
      html.push_str("<h2>Categorical features</h2>\n<table>\n<tr><th>feature</th><th>dataset</th><th>count</th><th>missing</th><th>unique</th><th>top</th><th>freq top</th><th>avg str len</th></tr>\n");
      for name in categorical {
        for side in self.sides() {
          if let Some(s) = side.feature(name).and_then(FeatureStatistics::as_categorical) {
            let _ = writeln!(
              html,
              "<tr><td>{}</td><td>{}</td><td>{}</td><td{}>{:.1}%</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
              escape_html(name),
              escape_html(&side.name),
              s.count,
              missing_class(s.missing),
              s.missing_rate * 100.0,
              s.unique,
              escape_html(s.top.as_deref().unwrap_or("-")),
              s.top_frequency,
              fmt_opt(s.avg_length)
            );
          }
        }
      }
      html.push_str("</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
  }

  /// Writes the HTML rendering to `dir/facets_overview.html`, creating `dir` if needed.
  pub fn save_html(&self, dir: &Path) -> KilnResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| KilnError::Io {
      path: dir.display().to_string(),
      source,
    })?;
    let path = dir.join(HTML_FILENAME);
    std::fs::write(&path, self.render_html()).map_err(|source| KilnError::Io {
      path: path.display().to_string(),
      source,
    })?;
    event!(Level::INFO, path = %path.display(), "Facets overview saved.");
    Ok(path)
  }

  pub fn to_json(&self) -> KilnResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  fn is_kind(&self, name: &str, numeric: bool) -> bool {
    self
      .sides()
      .iter()
      .find_map(|side| side.feature(name))
      .is_some_and(|f| matches!(f.stats, FeatureKind::Numeric(_)) == numeric)
  }
}

fn fmt_opt(value: Option<f64>) -> String {
  value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}

fn missing_class(missing: usize) -> &'static str {
  if missing > 0 {
    " class=\"missing\""
  } else {
    ""
  }
}

fn escape_html(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&#39;"),
      _ => escaped.push(c),
    }
  }
  escaped
}

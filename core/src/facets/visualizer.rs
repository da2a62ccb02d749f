// kiln/src/facets/visualizer.rs

//! Turning a finished step's output into something a person can look at.

use crate::error::{KilnError, KilnResult};
use crate::facets::comparison::FacetsComparison;
use crate::facets::step::STATISTICS;
use crate::pipeline::run::StepRun;
use std::path::Path;
use tracing::{event, Level};

/// Renders the result of a finished step.
pub trait Visualizer {
  fn visualize(&self, step: &StepRun) -> KilnResult<Visualization>;
}

/// A rendered step result, available as HTML and as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visualization {
  title: String,
  html: String,
  text: String,
}

impl Visualization {
  pub fn new(title: impl Into<String>, html: String, text: String) -> Self {
    Self {
      title: title.into(),
      html,
      text,
    }
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn html(&self) -> &str {
    &self.html
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  /// Writes the HTML rendering to `path`.
  pub fn save(&self, path: &Path) -> KilnResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent).map_err(|source| KilnError::Io {
        path: parent.display().to_string(),
        source,
      })?;
    }
    std::fs::write(path, &self.html).map_err(|source| KilnError::Io {
      path: path.display().to_string(),
      source,
    })?;
    event!(Level::DEBUG, path = %path.display(), title = %self.title, "Visualization saved.");
    Ok(())
  }
}

/// Renders the `FacetsComparison` produced by a `FacetsVisualizationStep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacetsVisualizer;

impl Visualizer for FacetsVisualizer {
  fn visualize(&self, step: &StepRun) -> KilnResult<Visualization> {
    let comparison = step.read::<FacetsComparison>(STATISTICS)?;
    Ok(Visualization::new(
      format!("{}: {} vs {}", step.name(), comparison.left.name, comparison.right.name),
      comparison.render_html(),
      comparison.render_text(),
    ))
  }
}

// kiln/src/dataset/iris.rs

//! The Iris flower dataset: 150 rows, four numeric measurements in centimetres and a
//! categorical species label (50 rows each of setosa, versicolor, virginica).

use crate::dataset::csv::parse_labeled_csv;
use crate::dataset::table::{Series, TabularDataset};
use crate::error::KilnResult;

const IRIS_CSV: &str = include_str!("../../data/iris.csv");

pub const IRIS_FEATURES: [&str; 4] = [
  "sepal length (cm)",
  "sepal width (cm)",
  "petal length (cm)",
  "petal width (cm)",
];

pub const IRIS_LABEL: &str = "species";

/// Feature table and species labels of the bundled Iris data.
pub fn load_iris() -> KilnResult<(TabularDataset, Series)> {
  parse_labeled_csv(IRIS_CSV, ',', IRIS_LABEL)
}

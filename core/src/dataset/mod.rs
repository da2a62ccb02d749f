// kiln/src/dataset/mod.rs

//! Tabular data, train/test splitting, and the providers that feed pipelines.

pub mod csv;
pub mod iris;
pub mod provider;
pub mod split;
pub mod table;

pub use provider::{CsvProvider, DatasetImportStep, DatasetProvider, IrisProvider};
pub use split::{train_test_split, SplitConfig, TrainTestSplit};
pub use table::{Column, ColumnData, ColumnType, Series, TabularDataset};

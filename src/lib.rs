//! Core of the campaign dashboard: dataset loading, filtering and the
//! aggregate views rendered by the desktop app.

pub mod config;
pub mod data;
pub mod error;

pub use data::aggregate::{apply, global_kpis, AggregateResult, GlobalKpis, HeadlineMetrics};
pub use data::cache::DatasetCache;
pub use data::filter::{filter, FilterChoices, FilterSelection, FilteredView};
pub use data::loader::{load_file, load_file_with, load_reader};
pub use data::model::{CategoricalField, Dataset, Outcome, Record};
pub use error::{LoadError, SchemaError};

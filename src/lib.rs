//! CRE Dashboard – commercial real-estate time series, filtered for charting.
//!
//! The library holds everything that does not touch the UI: loading a
//! spreadsheet into a [`data::model::TimeSeriesTable`], the
//! [`data::filter::filter`] pipeline, display scaling, configuration and the
//! VAR / VECM parameter value. The `cre-dashboard` binary renders it with egui.

pub mod config;
pub mod data;
pub mod error;
pub mod forecast;

pub use data::filter::{filter, filter_with, FilterRequest, PipelineOptions};
pub use data::loader::load_file;
pub use data::model::{Series, TimeSeriesTable};
pub use data::registry::VariableRegistry;
pub use error::{DataLoadError, LoadError, ParseError, ValidationError};

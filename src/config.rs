use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::data::filter::{DateBounds, DifferencingMode, PipelineOptions};
use crate::data::loader::DEFAULT_INDEX_COLUMN;
use crate::data::model::TimeSeriesTable;
use crate::data::registry::VariableRegistry;
use crate::data::scaling::DisplayScale;

// ---------------------------------------------------------------------------
// Command line / environment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Parser)]
#[command(name = "cre-dashboard")]
#[command(about = "Commercial real-estate indicator dashboard", long_about = None)]
pub struct Args {
    /// Spreadsheet with one row per period (.xlsx, .ods, .csv, .json, .parquet)
    #[arg(env = "CRE_DATA", default_value = "data/sample_data.csv")]
    pub data: PathBuf,

    /// Column holding the period labels
    #[arg(long, env = "CRE_INDEX_COLUMN", default_value = DEFAULT_INDEX_COLUMN)]
    pub index_column: String,

    /// JSON file mapping variable keys to labels (default: one entry per column)
    #[arg(long, env = "CRE_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Divide a column before charting, as COLUMN=DIVISOR (repeatable)
    #[arg(long = "scale", value_name = "COLUMN=DIVISOR")]
    pub scales: Vec<DisplayScale>,

    /// Chart raw values, without the default Employment scaling
    #[arg(long)]
    pub no_scale: bool,

    /// Keep periods dated exactly January 1st of the start year
    #[arg(long)]
    pub inclusive_start: bool,

    /// Difference against the value `order` periods back instead of repeating
    /// the first difference
    #[arg(long)]
    pub lagged_diff: bool,
}

/// Settings fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub index_column: String,
    pub registry_path: Option<PathBuf>,
    pub scales: Vec<DisplayScale>,
    pub pipeline: PipelineOptions,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/sample_data.csv"),
            index_column: DEFAULT_INDEX_COLUMN.to_string(),
            registry_path: None,
            scales: vec![DisplayScale::employment()],
            pipeline: PipelineOptions::default(),
        }
    }
}

impl From<Args> for DashboardConfig {
    fn from(args: Args) -> Self {
        let scales = if args.no_scale {
            Vec::new()
        } else if args.scales.is_empty() {
            vec![DisplayScale::employment()]
        } else {
            args.scales
        };

        Self {
            data_path: args.data,
            index_column: args.index_column,
            registry_path: args.registry,
            scales,
            pipeline: PipelineOptions {
                bounds: if args.inclusive_start {
                    DateBounds::InclusiveStart
                } else {
                    DateBounds::Exclusive
                },
                differencing: if args.lagged_diff {
                    DifferencingMode::Lagged
                } else {
                    DifferencingMode::Repeated
                },
            },
        }
    }
}

impl DashboardConfig {
    /// Read `.env` (if any), then the command line.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Args::parse().into()
    }

    /// The configured registry, or one entry per column of `table`.
    pub fn load_registry(&self, table: &TimeSeriesTable) -> Result<VariableRegistry> {
        let registry = match &self.registry_path {
            Some(path) => VariableRegistry::from_json_file(path)?,
            None => VariableRegistry::from_table(table),
        };

        let missing = registry.missing_from(table);
        if !missing.is_empty() {
            log::warn!("registry variables without a data column: {missing:?}");
        }
        Ok(registry)
    }
}

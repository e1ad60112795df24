use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Datelike;

use cre_dashboard::config::DashboardConfig;
use cre_dashboard::data::filter::{filter_with, DifferencingOrder, FilterRequest};
use cre_dashboard::data::scaling::rescale;
use cre_dashboard::forecast::{self, ForecastConfig, ForecastStatus, SignificanceLevel};
use cre_dashboard::{TimeSeriesTable, ValidationError, VariableRegistry};

use crate::color::SeriesColors;

/// Year slider limits when the data does not reach further.
pub const YEAR_SLIDER_MIN: i32 = 1987;
pub const YEAR_SLIDER_MAX: i32 = 2021;
pub const DEFAULT_YEAR_RANGE: (i32, i32) = (1990, 2018);

// ---------------------------------------------------------------------------
// Derived view
// ---------------------------------------------------------------------------

/// What the charts currently show.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Ready {
        /// Pipeline output in data units.
        derived: TimeSeriesTable,
        /// `derived` with display scaling applied.
        display: TimeSeriesTable,
    },
    /// The controls do not form a valid request.
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    TimeSeries,
    FullHistory,
    Table,
    Aggregate,
    Pie,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::TimeSeries,
        Tab::FullHistory,
        Tab::Table,
        Tab::Aggregate,
        Tab::Pie,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::TimeSeries => "Time Series",
            Tab::FullHistory => "Full History",
            Tab::Table => "Table",
            Tab::Aggregate => "Aggregate",
            Tab::Pie => "Pie",
        }
    }
}

/// Raw widget values of the VAR / VECM controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastForm {
    pub num_obs_to_test: u32,
    pub num_obs_to_predict: u32,
    pub significance: SignificanceLevel,
    pub ignore_covid: bool,
}

impl Default for ForecastForm {
    fn default() -> Self {
        let c = ForecastConfig::default();
        Self {
            num_obs_to_test: c.num_obs_to_test(),
            num_obs_to_predict: c.num_obs_to_predict(),
            significance: c.significance_level(),
            ignore_covid: c.ignore_covid(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded table, shared read-only.
    pub table: Arc<TimeSeriesTable>,
    pub registry: VariableRegistry,
    pub colors: SeriesColors,

    // ---- controls ----
    pub year_range: (i32, i32),
    pub selected: BTreeSet<String>,
    pub order: DifferencingOrder,
    pub forecast_form: ForecastForm,

    // ---- outputs ----
    pub view: ViewState,
    pub submissions: u32,
    pub forecast: Option<Result<ForecastStatus, ValidationError>>,
    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig, table: TimeSeriesTable, registry: VariableRegistry) -> Self {
        let mut state = Self {
            config,
            table: Arc::new(table),
            selected: registry.keys().map(String::from).collect(),
            colors: SeriesColors::new(&registry),
            registry,
            year_range: DEFAULT_YEAR_RANGE,
            order: DifferencingOrder::default(),
            forecast_form: ForecastForm::default(),
            view: ViewState::Unavailable(String::new()),
            submissions: 0,
            forecast: None,
            tab: Tab::default(),
            status_message: None,
        };
        state.refilter();
        state
    }

    /// Ingest a newly loaded table; every registry variable starts selected.
    pub fn set_dataset(&mut self, table: TimeSeriesTable, registry: VariableRegistry) {
        self.selected = registry.keys().map(String::from).collect();
        self.colors = SeriesColors::new(&registry);
        self.registry = registry;
        self.table = Arc::new(table);
        self.status_message = None;
        self.refilter();
    }

    /// Slider limits: the default window, widened to cover the data.
    pub fn year_bounds(&self) -> (i32, i32) {
        match self.table.span() {
            Some((first, last)) => (
                first.year().min(YEAR_SLIDER_MIN),
                (last.year() + 1).max(YEAR_SLIDER_MAX),
            ),
            None => (YEAR_SLIDER_MIN, YEAR_SLIDER_MAX),
        }
    }

    /// Build the request from the controls.
    pub fn request(&self) -> Result<FilterRequest, ValidationError> {
        FilterRequest::new(self.selected.iter().cloned(), self.year_range, self.order.as_u8())
    }

    /// Recompute the derived view after a control change.
    pub fn refilter(&mut self) {
        self.view = match self.request() {
            Ok(request) => {
                let derived = filter_with(&self.table, &request, &self.config.pipeline);
                let display = rescale(&derived, &self.config.scales);
                ViewState::Ready { derived, display }
            }
            Err(e) => {
                log::warn!("unable to render: {e}");
                ViewState::Unavailable(format!("Unable to render: {e}"))
            }
        };
    }

    pub fn set_year_range(&mut self, start: i32, end: i32) {
        self.year_range = (start, end);
        self.refilter();
    }

    pub fn set_order(&mut self, order: DifferencingOrder) {
        self.order = order;
        self.refilter();
    }

    /// Toggle a single variable in the selection.
    pub fn toggle_variable(&mut self, key: &str) {
        if !self.selected.remove(key) {
            self.selected.insert(key.to_string());
        }
        self.refilter();
    }

    pub fn select_all(&mut self) {
        self.selected = self.registry.keys().map(String::from).collect();
        self.refilter();
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
        self.refilter();
    }

    /// "Run VAR & VECM": validate the form and echo it back.
    pub fn submit_forecast(&mut self) {
        self.submissions += 1;
        let f = self.forecast_form;
        self.forecast = Some(
            ForecastConfig::new(
                f.num_obs_to_test,
                f.num_obs_to_predict,
                f.significance,
                f.ignore_covid,
            )
            .map(|config| forecast::submit(config, self.submissions)),
        );
    }

    /// Rows in the current view, if it rendered.
    pub fn visible_rows(&self) -> Option<usize> {
        match &self.view {
            ViewState::Ready { derived, .. } => Some(derived.len()),
            ViewState::Unavailable(_) => None,
        }
    }
}

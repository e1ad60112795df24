//! VAR / VECM run parameters.
//!
//! The dashboard collects these and echoes them back on "Run VAR & VECM".
//! No model consumes them yet; [`ForecastStatus`] says so explicitly.

use std::fmt;

use serde::Serialize;

use crate::error::ValidationError;

pub const MAX_OBS_TO_TEST: u32 = 10;
pub const MAX_OBS_TO_PREDICT: u32 = 16;

/// Significance level used by the cointegration and stationarity tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SignificanceLevel {
    #[default]
    #[serde(rename = "0.01")]
    OnePercent,
    #[serde(rename = "0.05")]
    FivePercent,
    #[serde(rename = "0.1")]
    TenPercent,
}

impl SignificanceLevel {
    pub const ALL: [SignificanceLevel; 3] = [Self::OnePercent, Self::FivePercent, Self::TenPercent];

    pub fn value(self) -> f64 {
        match self {
            Self::OnePercent => 0.01,
            Self::FivePercent => 0.05,
            Self::TenPercent => 0.1,
        }
    }
}

impl TryFrom<f64> for SignificanceLevel {
    type Error = ValidationError;

    fn try_from(level: f64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| (s.value() - level).abs() < 1e-9)
            .ok_or(ValidationError::UnsupportedSignificance(level))
    }
}

impl fmt::Display for SignificanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Parameters of one VAR / VECM run. Built per submit, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastConfig {
    num_obs_to_test: u32,
    num_obs_to_predict: u32,
    significance_level: SignificanceLevel,
    ignore_covid: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            num_obs_to_test: 5,
            num_obs_to_predict: 4,
            significance_level: SignificanceLevel::default(),
            ignore_covid: true,
        }
    }
}

impl ForecastConfig {
    pub fn new(
        num_obs_to_test: u32,
        num_obs_to_predict: u32,
        significance_level: SignificanceLevel,
        ignore_covid: bool,
    ) -> Result<Self, ValidationError> {
        check_range("num_obs_to_test", num_obs_to_test, MAX_OBS_TO_TEST)?;
        check_range("num_obs_to_predict", num_obs_to_predict, MAX_OBS_TO_PREDICT)?;
        Ok(Self {
            num_obs_to_test,
            num_obs_to_predict,
            significance_level,
            ignore_covid,
        })
    }

    pub fn num_obs_to_test(&self) -> u32 {
        self.num_obs_to_test
    }

    pub fn num_obs_to_predict(&self) -> u32 {
        self.num_obs_to_predict
    }

    pub fn significance_level(&self) -> SignificanceLevel {
        self.significance_level
    }

    pub fn ignore_covid(&self) -> bool {
        self.ignore_covid
    }

    /// Pretty JSON shown under the run button.
    pub fn to_echo(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{self:?} ({e})"))
    }
}

fn check_range(field: &'static str, value: u32, max: u32) -> Result<(), ValidationError> {
    if value > max {
        return Err(ValidationError::OutOfRange { field, value, max });
    }
    Ok(())
}

/// State of a panel whose computation does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelStatus {
    NotYetAvailable,
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelStatus::NotYetAvailable => f.write_str("Not yet available"),
        }
    }
}

/// Result of submitting a [`ForecastConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastStatus {
    pub config: ForecastConfig,
    pub submissions: u32,
    pub model: PanelStatus,
}

/// Accept a submitted configuration. Logs it and reports that no model ran.
pub fn submit(config: ForecastConfig, submissions: u32) -> ForecastStatus {
    log::info!("VAR/VECM run #{submissions} requested: {config:?}");
    ForecastStatus {
        config,
        submissions,
        model: PanelStatus::NotYetAvailable,
    }
}

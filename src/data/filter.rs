use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

use super::model::{Series, TimeSeriesTable};
use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// FilterRequest – what the controls ask for
// ---------------------------------------------------------------------------

/// Differencing applied before anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DifferencingOrder {
    Levels,
    #[default]
    First,
    Second,
}

impl DifferencingOrder {
    pub const ALL: [DifferencingOrder; 3] = [Self::Levels, Self::First, Self::Second];

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Levels => 0,
            Self::First => 1,
            Self::Second => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Levels => "Levels",
            Self::First => "1st Diff",
            Self::Second => "2nd Diff",
        }
    }
}

impl TryFrom<u8> for DifferencingOrder {
    type Error = ValidationError;

    fn try_from(order: u8) -> Result<Self, Self::Error> {
        match order {
            0 => Ok(Self::Levels),
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            other => Err(ValidationError::UnsupportedDifferencingOrder(other)),
        }
    }
}

impl fmt::Display for DifferencingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pair of years with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::EmptyYearRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    /// January 1st of the start year.
    pub fn start_date(&self) -> NaiveDate {
        jan_first(self.start)
    }

    /// January 1st of the end year.
    pub fn end_date(&self) -> NaiveDate {
        jan_first(self.end)
    }
}

fn jan_first(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(if year < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// One request from the controls. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    selected: BTreeSet<String>,
    years: YearRange,
    order: DifferencingOrder,
}

impl FilterRequest {
    /// Validate and build a request.
    ///
    /// Variable keys are not checked against the table: unknown keys are
    /// simply never matched by [`filter`].
    pub fn new<S: Into<String>>(
        selected: impl IntoIterator<Item = S>,
        year_range: (i32, i32),
        differencing_order: u8,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            selected: selected.into_iter().map(Into::into).collect(),
            years: YearRange::new(year_range.0, year_range.1)?,
            order: DifferencingOrder::try_from(differencing_order)?,
        })
    }

    pub fn selected_variables(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn year_range(&self) -> YearRange {
        self.years
    }

    pub fn differencing_order(&self) -> DifferencingOrder {
        self.order
    }
}

// ---------------------------------------------------------------------------
// Pipeline options
// ---------------------------------------------------------------------------

/// Which rows at the year boundaries survive the date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateBounds {
    /// `start_date < period < end_date`. Drops a period dated exactly
    /// January 1st of the start year.
    #[default]
    Exclusive,
    /// `start_date <= period < end_date`.
    InclusiveStart,
}

impl DateBounds {
    pub fn contains(self, years: YearRange, period: NaiveDate) -> bool {
        let lower_ok = match self {
            Self::Exclusive => period > years.start_date(),
            Self::InclusiveStart => period >= years.start_date(),
        };
        lower_ok && period < years.end_date()
    }
}

/// How a differencing order of `d` is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifferencingMode {
    /// The first difference applied `d` times.
    #[default]
    Repeated,
    /// A single difference against the value `d` periods back.
    Lagged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineOptions {
    pub bounds: DateBounds,
    pub differencing: DifferencingMode,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Derive the display table for `request` with default options.
pub fn filter(table: &TimeSeriesTable, request: &FilterRequest) -> TimeSeriesTable {
    filter_with(table, request, &PipelineOptions::default())
}

/// Derive the display table: difference, select columns, then restrict dates.
///
/// Differencing runs over the whole table before rows are dropped, so the
/// first period inside the range is differenced against its real
/// predecessor whenever one exists. An empty result is not an error.
pub fn filter_with(
    table: &TimeSeriesTable,
    request: &FilterRequest,
    options: &PipelineOptions,
) -> TimeSeriesTable {
    let differenced = difference(table, request.differencing_order(), options.differencing);
    let selected = select_columns(&differenced, request.selected_variables());
    let result = restrict_years(&selected, request.year_range(), options.bounds);

    log::debug!(
        "filter: {} vars, {}..{}, {} → {} rows x {} cols",
        request.selected_variables().len(),
        request.year_range().start(),
        request.year_range().end(),
        request.differencing_order(),
        result.len(),
        result.width()
    );
    result
}

/// Difference every column of the table. `Levels` returns a copy.
///
/// `DifferencingMode::Repeated` applies the first difference `order` times.
/// `DifferencingMode::Lagged` subtracts the value `order` periods back, which
/// is what the dashboard's `--lagged-diff` switch selects for compatibility
/// with earlier exports. Either way the first `order` rows become missing.
pub fn difference(
    table: &TimeSeriesTable,
    order: DifferencingOrder,
    mode: DifferencingMode,
) -> TimeSeriesTable {
    let d = order.as_u8() as usize;
    if d == 0 {
        return table.clone();
    }

    let columns = table
        .columns()
        .iter()
        .map(|col| {
            let values = match mode {
                DifferencingMode::Repeated => {
                    (0..d).fold(col.values.clone(), |acc, _| lagged_difference(&acc, 1))
                }
                DifferencingMode::Lagged => lagged_difference(&col.values, d),
            };
            Series::new(col.name.clone(), values)
        })
        .collect();

    TimeSeriesTable::from_sorted(table.periods().to_vec(), columns)
}

/// `x[t] - x[t - lag]`; missing where either operand is missing.
fn lagged_difference(values: &[Option<f64>], lag: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|t| {
            let prev = values.get(t.checked_sub(lag)?).copied().flatten()?;
            Some(values[t]? - prev)
        })
        .collect()
}

/// Keep the columns named in `keys`, in table order. Unknown keys are ignored.
pub fn select_columns(table: &TimeSeriesTable, keys: &BTreeSet<String>) -> TimeSeriesTable {
    let columns = table
        .columns()
        .iter()
        .filter(|c| keys.contains(&c.name))
        .cloned()
        .collect();
    TimeSeriesTable::from_sorted(table.periods().to_vec(), columns)
}

/// Keep the rows whose period lies inside `years` under `bounds`.
pub fn restrict_years(table: &TimeSeriesTable, years: YearRange, bounds: DateBounds) -> TimeSeriesTable {
    let keep: Vec<usize> = table
        .periods()
        .iter()
        .enumerate()
        .filter(|(_, p)| bounds.contains(years, **p))
        .map(|(i, _)| i)
        .collect();

    let periods = keep.iter().map(|&i| table.periods()[i]).collect();
    let columns = table
        .columns()
        .iter()
        .map(|col| Series::new(col.name.clone(), keep.iter().map(|&i| col.values[i]).collect()))
        .collect();
    TimeSeriesTable::from_sorted(periods, columns)
}

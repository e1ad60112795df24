use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::error::DataLoadError;

// ---------------------------------------------------------------------------
// Series – one named column of the table
// ---------------------------------------------------------------------------

/// A single variable: one value (or `None` for missing) per period.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Number of leading periods without a value.
    pub fn leading_missing(&self) -> usize {
        self.values.iter().take_while(|v| v.is_none()).count()
    }

    /// Number of periods that carry a value.
    pub fn usable_len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

// ---------------------------------------------------------------------------
// TimeSeriesTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Periods (strictly ascending, unique) mapped to a fixed set of columns.
///
/// The table has no mutable accessors. Every transformation returns a new
/// table, so a loaded table can be shared behind an `Arc` for the lifetime of
/// the process.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    periods: Vec<NaiveDate>,
    columns: Vec<Series>,
}

impl TimeSeriesTable {
    /// Build a table, sorting rows by period.
    ///
    /// Fails when a column length differs from the number of periods, when
    /// a period occurs twice, or when a column name is repeated.
    pub fn new(periods: Vec<NaiveDate>, columns: Vec<Series>) -> Result<Self, DataLoadError> {
        let mut seen = BTreeSet::new();
        for col in &columns {
            if col.values.len() != periods.len() {
                return Err(DataLoadError::LengthMismatch {
                    column: col.name.clone(),
                    expected: periods.len(),
                    found: col.values.len(),
                });
            }
            if !seen.insert(col.name.as_str()) {
                return Err(DataLoadError::DuplicateColumn(col.name.clone()));
            }
        }

        let mut order: Vec<usize> = (0..periods.len()).collect();
        order.sort_by_key(|&i| periods[i]);

        if let Some(w) = order.windows(2).find(|w| periods[w[0]] == periods[w[1]]) {
            return Err(DataLoadError::DuplicatePeriod(periods[w[0]]));
        }

        let already_sorted = order.iter().enumerate().all(|(pos, &i)| pos == i);
        if already_sorted {
            return Ok(Self { periods, columns });
        }

        log::debug!("re-sorting {} periods into ascending order", periods.len());
        let sorted_periods = order.iter().map(|&i| periods[i]).collect();
        let sorted_columns = columns
            .into_iter()
            .map(|col| Series {
                values: order.iter().map(|&i| col.values[i]).collect(),
                name: col.name,
            })
            .collect();

        Ok(Self {
            periods: sorted_periods,
            columns: sorted_columns,
        })
    }

    /// Assemble a table from parts that already satisfy the invariants.
    ///
    /// Only used by transformations that keep the period axis of a valid
    /// table (or a subsequence of it).
    pub(crate) fn from_sorted(periods: Vec<NaiveDate>, columns: Vec<Series>) -> Self {
        debug_assert!(periods.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(columns.iter().all(|c| c.values.len() == periods.len()));
        Self { periods, columns }
    }

    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Series> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Number of periods (rows).
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Value at (`row`, `column`); `None` for missing or out of range.
    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        self.column(column)?.values.get(row).copied().flatten()
    }

    /// First and last period, if any.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.periods.first()?, *self.periods.last()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_sorts_rows() {
        let table = TimeSeriesTable::new(
            vec![date(2001, 1, 1), date(2000, 1, 1), date(2002, 1, 1)],
            vec![Series::new("GDP", vec![Some(2.0), Some(1.0), None])],
        )
        .unwrap();

        assert_eq!(
            table.periods(),
            &[date(2000, 1, 1), date(2001, 1, 1), date(2002, 1, 1)]
        );
        assert_eq!(table.column("GDP").unwrap().values, vec![Some(1.0), Some(2.0), None]);
    }

    #[test]
    fn test_duplicate_period_rejected() {
        let err = TimeSeriesTable::new(
            vec![date(2000, 1, 1), date(2000, 1, 1)],
            vec![Series::new("GDP", vec![Some(1.0), Some(2.0)])],
        )
        .unwrap_err();
        assert!(matches!(err, DataLoadError::DuplicatePeriod(d) if d == date(2000, 1, 1)));
    }

    #[test]
    fn test_ragged_column_rejected() {
        let err = TimeSeriesTable::new(
            vec![date(2000, 1, 1)],
            vec![Series::new("GDP", vec![Some(1.0), Some(2.0)])],
        )
        .unwrap_err();
        assert!(matches!(err, DataLoadError::LengthMismatch { expected: 1, found: 2, .. }));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = TimeSeriesTable::new(
            vec![date(2000, 1, 1)],
            vec![
                Series::new("GDP", vec![Some(1.0)]),
                Series::new("GDP", vec![Some(2.0)]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, DataLoadError::DuplicateColumn(name) if name == "GDP"));
    }

    #[test]
    fn test_series_counts() {
        let s = Series::new("x", vec![None, None, Some(1.0), None, Some(2.0)]);
        assert_eq!(s.leading_missing(), 2);
        assert_eq!(s.usable_len(), 2);
    }
}

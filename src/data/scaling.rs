use std::fmt;
use std::str::FromStr;

use super::model::{Series, TimeSeriesTable};

// ---------------------------------------------------------------------------
// Display-only unit rescaling
// ---------------------------------------------------------------------------

/// Divide one column by a constant before charting.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayScale {
    pub column: String,
    pub divisor: f64,
}

impl DisplayScale {
    pub fn new(column: impl Into<String>, divisor: f64) -> Self {
        Self {
            column: column.into(),
            divisor,
        }
    }

    /// Employment is charted in units of 10,000 so it shares an axis with
    /// the rate variables.
    pub fn employment() -> Self {
        Self::new("Employment", 10_000.0)
    }
}

impl fmt::Display for DisplayScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.column, self.divisor)
    }
}

/// Parses `COLUMN=DIVISOR`, e.g. `Employment=10000`.
impl FromStr for DisplayScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, divisor) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected COLUMN=DIVISOR, got '{s}'"))?;
        let column = column.trim();
        if column.is_empty() {
            return Err(format!("missing column name in '{s}'"));
        }
        let divisor: f64 = divisor
            .trim()
            .parse()
            .map_err(|_| format!("'{divisor}' is not a number"))?;
        if divisor == 0.0 || !divisor.is_finite() {
            return Err(format!("divisor must be a non-zero finite number, got {divisor}"));
        }
        Ok(Self::new(column, divisor))
    }
}

/// Return a copy of `table` with every scaled column divided by its divisor.
///
/// Columns named by a scale but absent from the table are skipped, so the
/// same scales can be applied to any selection of variables. The input table
/// is never modified.
pub fn rescale(table: &TimeSeriesTable, scales: &[DisplayScale]) -> TimeSeriesTable {
    let columns = table
        .columns()
        .iter()
        .map(|col| match scales.iter().find(|s| s.column == col.name) {
            Some(scale) => Series::new(
                col.name.clone(),
                col.values.iter().map(|v| v.map(|x| x / scale.divisor)).collect(),
            ),
            None => col.clone(),
        })
        .collect();
    TimeSeriesTable::from_sorted(table.periods().to_vec(), columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table() -> TimeSeriesTable {
        TimeSeriesTable::new(
            vec![NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(), NaiveDate::from_ymd_opt(2000, 4, 1).unwrap()],
            vec![
                Series::new("Employment", vec![Some(250_000.0), None]),
                Series::new("GDP", vec![Some(2.5), Some(3.0)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rescale_leaves_source_untouched() {
        let source = table();
        let scaled = rescale(&source, &[DisplayScale::employment()]);

        assert_eq!(scaled.column("Employment").unwrap().values, vec![Some(25.0), None]);
        assert_eq!(scaled.column("GDP").unwrap().values, vec![Some(2.5), Some(3.0)]);
        assert_eq!(source.column("Employment").unwrap().values, vec![Some(250_000.0), None]);
    }

    #[test]
    fn test_rescale_ignores_absent_columns() {
        let source = table();
        let scaled = rescale(&source, &[DisplayScale::new("Vacancy", 100.0)]);
        assert_eq!(scaled, source);
    }

    #[test]
    fn test_parse_scale() {
        let s: DisplayScale = "Employment=10000".parse().unwrap();
        assert_eq!(s, DisplayScale::employment());
        assert!("Employment".parse::<DisplayScale>().is_err());
        assert!("Employment=0".parse::<DisplayScale>().is_err());
        assert!("=5".parse::<DisplayScale>().is_err());
    }
}

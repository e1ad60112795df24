use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use cre_dashboard::data::filter::{
    difference, select_columns, DateBounds, DifferencingMode, DifferencingOrder, PipelineOptions,
};
use cre_dashboard::data::scaling::{rescale, DisplayScale};
use cre_dashboard::{filter, filter_with, load_file, FilterRequest, TimeSeriesTable};
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn employment(i: usize) -> f64 {
    1_000.0 + (i * i) as f64
}

/// `Quarter,Employment,GDP` for 1988Q1..=2020Q4.
fn write_quarterly_csv(dir: &Path) -> PathBuf {
    let path = dir.join("cre.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "Quarter,Employment,GDP").unwrap();
    let mut i = 0;
    for year in 1988..=2020 {
        for q in 1..=4 {
            writeln!(f, "{year}Q{q},{},{}", employment(i), i as f64 * 0.5).unwrap();
            i += 1;
        }
    }
    path
}

fn load_quarterly() -> TimeSeriesTable {
    let dir = tempdir().unwrap();
    let path = write_quarterly_csv(dir.path());
    load_file(&path, "Quarter").unwrap()
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_end_to_end_first_difference() {
    let table = load_quarterly();
    assert_eq!(table.len(), 132);

    let request = FilterRequest::new(["Employment"], (1990, 2018), 1).unwrap();
    let out = filter(&table, &request);

    assert_eq!(out.column_names(), vec!["Employment"]);
    assert_eq!(out.periods().first(), Some(&date(1990, 4, 1)));
    assert_eq!(out.periods().last(), Some(&date(2017, 10, 1)));
    assert_eq!(out.len(), 111);
    assert!(out
        .periods()
        .iter()
        .all(|p| *p > date(1990, 1, 1) && *p < date(2018, 1, 1)));

    // Each value is the change from the previous quarter of the full table.
    for (row, period) in out.periods().iter().enumerate() {
        let src = table.periods().iter().position(|p| p == period).unwrap();
        let expected = employment(src) - employment(src - 1);
        assert_eq!(out.value(row, "Employment"), Some(expected), "{period}");
    }
}

#[test]
fn test_filter_is_deterministic() {
    let table = load_quarterly();
    let request = FilterRequest::new(["Employment", "GDP"], (1995, 2005), 2).unwrap();
    assert_eq!(filter(&table, &request), filter(&table, &request));
}

#[test]
fn test_column_selection_is_idempotent() {
    let table = load_quarterly();
    let wanted: BTreeSet<String> = keys(&["GDP"]).into_iter().collect();
    let once = select_columns(&table, &wanted);
    let twice = select_columns(&once, &wanted);
    assert_eq!(once, twice);
}

#[test]
fn test_levels_is_identity_on_values() {
    let table = load_quarterly();
    let request = FilterRequest::new(["Employment", "GDP"], (1900, 2100), 0).unwrap();
    assert_eq!(filter(&table, &request), table);
}

#[test]
fn test_order_d_drops_d_leading_rows() {
    let table = load_quarterly();
    let levels = filter(&table, &FilterRequest::new(["GDP"], (1987, 2022), 0).unwrap());
    let base = levels.column("GDP").unwrap();
    assert_eq!(base.leading_missing(), 0);

    for d in 1..=2u8 {
        let out = filter(&table, &FilterRequest::new(["GDP"], (1987, 2022), d).unwrap());
        let series = out.column("GDP").unwrap();
        assert_eq!(out.len(), levels.len());
        assert_eq!(series.leading_missing(), d as usize);
        assert_eq!(base.usable_len() - series.usable_len(), d as usize);
    }
}

#[test]
fn test_year_bounds_are_exclusive() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dates.csv");
    std::fs::write(
        &path,
        "Quarter,GDP\n1990-01-01,1.0\n1995-06-30,2.0\n2018-01-01,3.0\n",
    )
    .unwrap();
    let table = load_file(&path, "Quarter").unwrap();

    let request = FilterRequest::new(["GDP"], (1990, 2018), 0).unwrap();
    let out = filter(&table, &request);
    assert_eq!(out.periods(), &[date(1995, 6, 30)]);

    let inclusive = PipelineOptions {
        bounds: DateBounds::InclusiveStart,
        ..PipelineOptions::default()
    };
    let out = filter_with(&table, &request, &inclusive);
    assert_eq!(out.periods(), &[date(1990, 1, 1), date(1995, 6, 30)]);
}

#[test]
fn test_empty_selection_keeps_rows() {
    let table = load_quarterly();
    let empty = BTreeSet::new();
    let selected = select_columns(&table, &empty);
    assert_eq!(selected.width(), 0);
    assert_eq!(selected.len(), table.len());

    let none: [&str; 0] = [];
    let out = filter(&table, &FilterRequest::new(none, (1990, 2018), 1).unwrap());
    assert_eq!(out.width(), 0);
    assert_eq!(out.len(), 111);
}

#[test]
fn test_unknown_keys_are_ignored() {
    let table = load_quarterly();
    let request = FilterRequest::new(["GDP", "Vacancy", ""], (1990, 2018), 0).unwrap();
    let out = filter(&table, &request);
    assert_eq!(out.column_names(), vec!["GDP"]);
}

#[test]
fn test_empty_range_is_not_an_error() {
    let table = load_quarterly();
    let out = filter(&table, &FilterRequest::new(["GDP"], (1950, 1960), 1).unwrap());
    assert!(out.is_empty());
    assert_eq!(out.column_names(), vec!["GDP"]);
}

#[test]
fn test_lagged_mode_matches_periods_back() {
    let table = load_quarterly();
    let lagged = difference(&table, DifferencingOrder::Second, DifferencingMode::Lagged);
    assert_eq!(lagged.value(5, "Employment"), Some(employment(5) - employment(3)));
}

#[test]
fn test_rescale_after_filter_leaves_shared_table() {
    let table = load_quarterly();
    let request = FilterRequest::new(["Employment"], (1987, 2022), 0).unwrap();
    let derived = filter(&table, &request);
    let display = rescale(&derived, &[DisplayScale::employment()]);

    assert_eq!(display.value(0, "Employment"), Some(0.1));
    assert_eq!(derived.value(0, "Employment"), Some(1_000.0));
    assert_eq!(table.value(0, "Employment"), Some(1_000.0));
}

use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use cre_dashboard::{
    filter, load_file, DataLoadError, FilterRequest, LoadError, VariableRegistry,
};
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_csv_unsorted_input_is_sorted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("unsorted.csv");
    std::fs::write(
        &path,
        "Quarter,Employment,GDP\n1990Q3,30,3\n1990Q1,10,1\n1990Q2,20,\n",
    )
    .unwrap();

    let table = load_file(&path, "Quarter").unwrap();
    assert_eq!(table.periods(), &[date(1990, 1, 1), date(1990, 4, 1), date(1990, 7, 1)]);
    assert_eq!(
        table.column("Employment").unwrap().values,
        vec![Some(10.0), Some(20.0), Some(30.0)]
    );
    assert_eq!(table.column("GDP").unwrap().values, vec![Some(1.0), None, Some(3.0)]);
}

#[test]
fn test_index_column_position_does_not_matter() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("late_index.csv");
    std::fs::write(&path, "GDP,Quarter\n1.5,2001Q1\n").unwrap();

    let table = load_file(&path, "Quarter").unwrap();
    assert_eq!(table.column_names(), vec!["GDP"]);
    assert_eq!(table.value(0, "GDP"), Some(1.5));
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let err = load_file(&dir.path().join("nope.xlsx"), "Quarter").unwrap_err();
    assert!(matches!(err, LoadError::DataLoad(DataLoadError::NotFound(_))));
}

#[test]
fn test_unsupported_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.txt");
    std::fs::write(&path, "Quarter,GDP\n").unwrap();
    let err = load_file(&path, "Quarter").unwrap_err();
    assert!(matches!(
        err,
        LoadError::DataLoad(DataLoadError::UnsupportedFormat(ref ext)) if ext == "txt"
    ));
}

#[test]
fn test_workbook_with_date_cells_is_sorted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dated.xlsx");

    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Quarter").unwrap();
    sheet.write_string(0, 1, "Employment").unwrap();
    let rows = [
        ((1990, 1, 1), 10.0),
        ((1989, 10, 1), 5.0),
        ((1990, 4, 1), 30.0),
        ((1990, 7, 1), 40.0),
    ];
    for (i, ((y, m, d), employment)) in rows.into_iter().enumerate() {
        let row = i as u32 + 1;
        let when = ExcelDateTime::from_ymd(y, m, d).unwrap();
        sheet.write_datetime_with_format(row, 0, &when, &date_format).unwrap();
        sheet.write_number(row, 1, employment).unwrap();
    }
    workbook.save(&path).unwrap();

    let table = load_file(&path, "Quarter").unwrap();
    assert_eq!(
        table.periods(),
        &[date(1989, 10, 1), date(1990, 1, 1), date(1990, 4, 1), date(1990, 7, 1)]
    );
    assert_eq!(
        table.column("Employment").unwrap().values,
        vec![Some(5.0), Some(10.0), Some(30.0), Some(40.0)]
    );

    let out = filter(&table, &FilterRequest::new(["Employment"], (1990, 1991), 1).unwrap());
    assert_eq!(out.periods(), &[date(1990, 4, 1), date(1990, 7, 1)]);
    assert_eq!(out.column("Employment").unwrap().values, vec![Some(20.0), Some(10.0)]);
}

#[test]
fn test_workbook_with_quarter_labels() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("labels.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in ["GDP", "Quarter", "Vacancy"].into_iter().enumerate() {
        sheet.write_string(0, col as u16, name).unwrap();
    }
    sheet.write_number(1, 0, 2.5).unwrap();
    sheet.write_string(1, 1, "1990Q2").unwrap();
    sheet.write_string(1, 2, "NA").unwrap();
    sheet.write_number(2, 0, 1.5).unwrap();
    sheet.write_string(2, 1, "1990Q1").unwrap();
    sheet.write_number(2, 2, 7.25).unwrap();
    workbook.save(&path).unwrap();

    let table = load_file(&path, "Quarter").unwrap();
    assert_eq!(table.column_names(), vec!["GDP", "Vacancy"]);
    assert_eq!(table.periods(), &[date(1990, 1, 1), date(1990, 4, 1)]);
    assert_eq!(table.column("GDP").unwrap().values, vec![Some(1.5), Some(2.5)]);
    assert_eq!(table.column("Vacancy").unwrap().values, vec![Some(7.25), None]);
}

#[test]
fn test_corrupt_workbook_is_unreadable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, "this is not a zip archive").unwrap();
    let err = load_file(&path, "Quarter").unwrap_err();
    assert!(matches!(err, LoadError::DataLoad(DataLoadError::Unreadable { .. })));
}

#[test]
fn test_missing_index_column() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no_index.csv");
    std::fs::write(&path, "Date,GDP\n1990Q1,1\n").unwrap();
    let err = load_file(&path, "Quarter").unwrap_err();
    assert!(matches!(
        err,
        LoadError::DataLoad(DataLoadError::MissingIndexColumn(_))
    ));
}

#[test]
fn test_no_data_columns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index_only.csv");
    std::fs::write(&path, "Quarter\n1990Q1\n").unwrap();
    let err = load_file(&path, "Quarter").unwrap_err();
    assert!(matches!(err, LoadError::DataLoad(DataLoadError::NoDataColumns)));
}

#[test]
fn test_bad_period_label() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad_label.csv");
    std::fs::write(&path, "Quarter,GDP\n1990Q1,1\nsometime,2\n").unwrap();
    match load_file(&path, "Quarter").unwrap_err() {
        LoadError::Parse(e) => {
            assert_eq!(e.row, 2);
            assert_eq!(e.label, "sometime");
        }
        other => panic!("expected a parse error, got {other}"),
    }
}

#[test]
fn test_duplicate_period() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dup.csv");
    std::fs::write(&path, "Quarter,GDP\n1990Q1,1\n1990-01-01,2\n").unwrap();
    let err = load_file(&path, "Quarter").unwrap_err();
    assert!(matches!(err, LoadError::DataLoad(DataLoadError::DuplicatePeriod(_))));
}

#[test]
fn test_json_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.json");
    std::fs::write(
        &path,
        r#"[
            {"Quarter": "1990Q2", "Employment": 20, "GDP": null},
            {"Quarter": "1990Q1", "Employment": 10, "GDP": 1.5}
        ]"#,
    )
    .unwrap();

    let table = load_file(&path, "Quarter").unwrap();
    assert_eq!(table.periods(), &[date(1990, 1, 1), date(1990, 4, 1)]);
    assert_eq!(table.column("GDP").unwrap().values, vec![Some(1.5), None]);
    assert_eq!(table.value(1, "Employment"), Some(20.0));
}

#[test]
fn test_parquet_with_date_index() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("series.parquet");

    let epoch = date(1970, 1, 1);
    let days: Vec<i32> = [date(1990, 7, 1), date(1990, 1, 1), date(1990, 4, 1)]
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("Quarter", DataType::Date32, false),
        Field::new("Employment", DataType::Int64, true),
        Field::new("GDP", DataType::Float64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Date32Array::from(days)),
        Arc::new(Int64Array::from(vec![Some(30), Some(10), None])),
        Arc::new(Float64Array::from(vec![3.0, 1.0, 2.0])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let table = load_file(&path, "Quarter").unwrap();
    assert_eq!(table.periods(), &[date(1990, 1, 1), date(1990, 4, 1), date(1990, 7, 1)]);
    assert_eq!(
        table.column("Employment").unwrap().values,
        vec![Some(10.0), None, Some(30.0)]
    );
    assert_eq!(
        table.column("GDP").unwrap().values,
        vec![Some(1.0), Some(2.0), Some(3.0)]
    );
}

#[test]
fn test_registry_from_loaded_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cols.csv");
    std::fs::write(&path, "Quarter,Employment,GDP\n1990Q1,1,2\n").unwrap();
    let table = load_file(&path, "Quarter").unwrap();

    let registry = VariableRegistry::from_table(&table);
    let keys: Vec<&str> = registry.keys().collect();
    assert_eq!(keys, vec!["Employment", "GDP"]);

    let configured = VariableRegistry::new([("Employment", "CRE Employment"), ("Vacancy", "Vacancy")]);
    assert_eq!(configured.missing_from(&table), vec!["Vacancy"]);
}

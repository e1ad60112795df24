use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// Period label parsing
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a textual period label into the date it stands for.
///
/// Accepted forms:
/// * quarters: `1988Q1`, `1988-Q1`, `1988 Q1`, `1988q1`, `Q1 1988`, `Q1-1988`
///   → first day of the quarter
/// * dates: `1988-03-31`, `1988/03/31`, `03/31/1988`, `31.03.1988`
/// * date-times: `1988-03-31 00:00:00`, `1988-03-31T00:00:00` (time dropped)
/// * months: `1988-03` → first day of the month
/// * years: `1988` → January 1st
pub fn parse_period_label(label: &str) -> Option<NaiveDate> {
    let s = label.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(d) = parse_quarter(s) {
        return Some(d);
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Some(d) = parse_month(s) {
        return Some(d);
    }
    parse_year(s)
}

/// A numeric cell in the index column is read as a calendar year.
pub fn period_from_number(n: f64) -> Option<NaiveDate> {
    if n.fract() != 0.0 || !(1000.0..=9999.0).contains(&n) {
        return None;
    }
    NaiveDate::from_ymd_opt(n as i32, 1, 1)
}

/// First day of the given quarter (1..=4).
pub fn quarter_start(year: i32, quarter: u32) -> Option<NaiveDate> {
    if !(1..=4).contains(&quarter) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)
}

/// Quarter number (1..=4) a date falls in.
pub fn quarter_of(date: NaiveDate) -> u32 {
    use chrono::Datelike;
    (date.month() - 1) / 3 + 1
}

fn parse_quarter(s: &str) -> Option<NaiveDate> {
    let upper = s.to_ascii_uppercase();
    let (year_part, quarter_part) = if let Some(rest) = upper.strip_prefix('Q') {
        // Q1 1988 / Q1-1988
        let q = rest.get(..1)?;
        (rest.get(1..)?.trim_start_matches(&[' ', '-'][..]), q)
    } else {
        // 1988Q1 / 1988-Q1 / 1988 Q1
        let idx = upper.find('Q')?;
        (upper[..idx].trim_end_matches(&[' ', '-'][..]), upper.get(idx + 1..)?)
    };

    if year_part.len() != 4 || quarter_part.len() != 1 {
        return None;
    }
    let year: i32 = year_part.parse().ok()?;
    let quarter: u32 = quarter_part.parse().ok()?;
    quarter_start(year, quarter)
}

fn parse_month(s: &str) -> Option<NaiveDate> {
    let (y, m) = s.split_once(|c| c == '-' || c == '/')?;
    if y.len() != 4 || m.is_empty() || m.len() > 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1)
}

fn parse_year(s: &str) -> Option<NaiveDate> {
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1)
}

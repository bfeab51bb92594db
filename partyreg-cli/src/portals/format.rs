//! Cell formatting shared by the resource tables.

use chrono::DateTime;
use chrono::Local;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::Utc;
use tablekit::CellValue;

/// `(NNN) NNN-NNNN` for ten digits; anything else is returned as given.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 {
        return raw.to_string();
    }
    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

/// `MM/DD/YYYY`.
pub fn us_date(day: NaiveDate) -> String {
    day.format("%m/%d/%Y").to_string()
}

pub fn local_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

pub fn local_time(at: DateTime<Utc>) -> NaiveTime {
    at.with_timezone(&Local).time()
}

/// `until MM/DD/YYYY` while the hold is in force.
pub fn hold_text(hold: Option<DateTime<Utc>>) -> String {
    match hold {
        Some(until) => format!("until {}", us_date(local_date(until))),
        None => "no active hold".to_string(),
    }
}

/// 12-hour clock, e.g. `9:30 PM`.
pub fn clock(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Converts serialized row data into a searchable cell.
///
/// Object keys are dropped; only values are searched.
pub fn json_cell(value: &serde_json::Value) -> CellValue {
    use serde_json::Value;

    match value {
        Value::Null => CellValue::Null,
        Value::Bool(b) => CellValue::Bool(*b),
        Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Null),
        Value::String(s) => CellValue::Text(s.clone()),
        Value::Array(items) => CellValue::List(items.iter().map(json_cell).collect()),
        Value::Object(map) => CellValue::map(map.iter().map(|(k, v)| (k.clone(), json_cell(v)))),
    }
}

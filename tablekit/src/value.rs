//! Cell values and the flattened search text built from them.

use std::cmp::Ordering;

use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;

/// A value extracted from a row by a column accessor.
///
/// The table never looks at a row directly. Everything it filters, sorts and
/// searches on goes through one of these.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Missing value. Skipped by search, sorted last.
    #[default]
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    /// Wall-clock date and time, already converted to the viewer's zone.
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    List(Vec<CellValue>),
    /// Nested record. Only the values take part in search, never the keys.
    Map(Vec<(String, CellValue)>),
}

impl CellValue {
    /// Creates a map value from `(key, value)` pairs.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, CellValue)>) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns `true` for [`CellValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Human readable form used for default cell rendering.
    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => b.to_string(),
            Self::Date(d) => d.format("%m/%d/%Y").to_string(),
            Self::DateTime(dt) => dt.format("%m/%d/%Y %H:%M").to_string(),
            Self::Time(t) => t.format("%H:%M").to_string(),
            Self::List(items) => items
                .iter()
                .filter(|v| !v.is_null())
                .map(CellValue::display)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Map(entries) => entries
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(_, v)| v.display())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Calendar day of a date or date-time value.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// Time of day of a time or date-time value.
    pub fn time_of_day(&self) -> Option<NaiveTime> {
        match self {
            Self::Time(t) => Some(*t),
            Self::DateTime(dt) => Some(dt.time()),
            _ => None,
        }
    }

    /// Text used by exact-match filters (select options).
    pub(crate) fn match_key(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            other => other.display(),
        }
    }

    /// Default ordering used when a column has no comparator of its own.
    ///
    /// Nulls always sort after everything else. Text compares
    /// case-insensitively. Mismatched variants fall back to their display
    /// text.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Null, _) => Ordering::Greater,
            (_, Self::Null) => Ordering::Less,
            (Self::Text(a), Self::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            (Self::Date(a), Self::DateTime(b)) => a.cmp(&b.date()),
            (Self::DateTime(a), Self::Date(b)) => a.date().cmp(b),
            (a, b) => a.display().to_lowercase().cmp(&b.display().to_lowercase()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for CellValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<NaiveTime> for CellValue {
    fn from(value: NaiveTime) -> Self {
        Self::Time(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

impl<T: Into<CellValue>> From<Vec<T>> for CellValue {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

/// Flattens a value into lowercase, space-separated search text.
///
/// Lists and maps are walked depth-first. Dates and date-times are written
/// in ISO-8601 form, so `2025-03-14` finds a party on that day. Nulls are
/// skipped.
pub fn to_searchable_text(value: &CellValue) -> String {
    let mut parts = Vec::new();
    collect_search_parts(value, &mut parts);
    parts.join(" ").to_lowercase()
}

fn collect_search_parts(value: &CellValue, parts: &mut Vec<String>) {
    match value {
        CellValue::Null => {}
        CellValue::List(items) => {
            for item in items {
                collect_search_parts(item, parts);
            }
        }
        CellValue::Map(entries) => {
            for (_, item) in entries {
                collect_search_parts(item, parts);
            }
        }
        CellValue::Date(d) => parts.push(d.format("%Y-%m-%d").to_string()),
        CellValue::DateTime(dt) => parts.push(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        CellValue::Time(t) => parts.push(t.format("%H:%M").to_string()),
        CellValue::Text(s) => {
            if !s.is_empty() {
                parts.push(s.clone());
            }
        }
        other => parts.push(other.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_nested_values() {
        let value = CellValue::map([
            ("name", CellValue::from("Jane DOE")),
            ("count", CellValue::from(3i64)),
            ("missing", CellValue::Null),
            (
                "contacts",
                CellValue::from(vec![
                    CellValue::map([("email", CellValue::from("A@Example.com"))]),
                    CellValue::from(true),
                ]),
            ),
        ]);

        assert_eq!(to_searchable_text(&value), "jane doe 3 a@example.com true");
    }

    #[test]
    fn test_dates_are_iso() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let dt = date.and_hms_opt(21, 5, 0).unwrap();
        assert_eq!(to_searchable_text(&date.into()), "2025-03-14");
        assert_eq!(to_searchable_text(&dt.into()), "2025-03-14t21:05:00");
    }

    #[test]
    fn test_nulls_sort_last() {
        let a = CellValue::from("apple");
        assert_eq!(CellValue::Null.compare(&a), Ordering::Greater);
        assert_eq!(a.compare(&CellValue::Null), Ordering::Less);
    }

    #[test]
    fn test_text_compare_ignores_case() {
        let a = CellValue::from("alpha");
        let b = CellValue::from("Beta");
        assert_eq!(a.compare(&b), Ordering::Less);
    }

    #[test]
    fn test_integral_numbers_display_without_fraction() {
        assert_eq!(CellValue::from(4i64).display(), "4");
        assert_eq!(CellValue::from(2.5).display(), "2.5");
    }
}

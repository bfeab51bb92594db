//! Column filter values, their default predicates, and the filter editor.

use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::Timelike;

use crate::column::FilterType;
use crate::column::SelectOption;
use crate::value::CellValue;
use crate::value::to_searchable_text;

/// The committed filter for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Case-insensitive substring.
    Text(String),
    /// Calendar-day range. A single-day filter is stored with `to == Some(from)`.
    DateRange {
        from: NaiveDate,
        to: Option<NaiveDate>,
    },
    /// Exact hour and minute.
    Time(NaiveTime),
    /// Exact match against one enumerated option value.
    Select(String),
}

impl FilterValue {
    /// A filter for a single calendar day.
    pub fn date(day: NaiveDate) -> Self {
        Self::DateRange {
            from: day,
            to: Some(day),
        }
    }

    /// A date range. Bounds given out of order are swapped.
    pub fn date_range(from: NaiveDate, to: Option<NaiveDate>) -> Self {
        match to {
            Some(to) if to < from => Self::DateRange {
                from: to,
                to: Some(from),
            },
            _ => Self::DateRange { from, to },
        }
    }

    /// Parses an `HH:mm` time filter.
    pub fn parse_time(input: &str) -> Option<Self> {
        NaiveTime::parse_from_str(input.trim(), "%H:%M")
            .ok()
            .map(Self::Time)
    }

    /// Returns `true` if the filter would let every row through.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) | Self::Select(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// Returns `true` if `day` falls in the range.
///
/// With no upper bound only `from`'s day matches. With both bounds the
/// range is inclusive on both ends.
pub fn date_in_range(day: NaiveDate, from: NaiveDate, to: Option<NaiveDate>) -> bool {
    match to {
        None => day == from,
        Some(to) => from <= day && day <= to,
    }
}

/// The predicate used when a column does not supply its own.
pub fn default_matches(value: &CellValue, filter: &FilterValue) -> bool {
    if filter.is_empty() {
        return true;
    }
    match filter {
        FilterValue::Text(query) => {
            to_searchable_text(value).contains(&query.to_lowercase())
        }
        FilterValue::DateRange { from, to } => value
            .calendar_date()
            .is_some_and(|day| date_in_range(day, *from, *to)),
        FilterValue::Time(time) => value
            .time_of_day()
            .is_some_and(|t| t.hour() == time.hour() && t.minute() == time.minute()),
        FilterValue::Select(option) => value.match_key() == *option,
    }
}

/// Uncommitted editor contents.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterDraft {
    Text(String),
    Date(Option<NaiveDate>),
    DateRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    /// Raw `HH:mm` input.
    Time(String),
    Select(Option<String>),
}

/// Editor for one column's filter.
///
/// The editor only holds a draft. Nothing reaches the table until the draft
/// is applied, except text drafts, which the table applies on every edit.
#[derive(Debug, Clone)]
pub struct FilterInput {
    column_id: String,
    filter_type: FilterType,
    options: Vec<SelectOption>,
    draft: FilterDraft,
}

impl FilterInput {
    /// Opens an editor seeded from the column's current filter, if any.
    pub fn open(
        column_id: impl Into<String>,
        filter_type: FilterType,
        options: Vec<SelectOption>,
        current: Option<&FilterValue>,
    ) -> Self {
        let draft = match (filter_type, current) {
            (FilterType::Text, Some(FilterValue::Text(s))) => FilterDraft::Text(s.clone()),
            (FilterType::Text, _) => FilterDraft::Text(String::new()),
            (FilterType::Date, Some(FilterValue::DateRange { from, .. })) => {
                FilterDraft::Date(Some(*from))
            }
            (FilterType::Date, _) => FilterDraft::Date(None),
            (FilterType::DateRange, Some(FilterValue::DateRange { from, to })) => {
                FilterDraft::DateRange {
                    from: Some(*from),
                    to: *to,
                }
            }
            (FilterType::DateRange, _) => FilterDraft::DateRange { from: None, to: None },
            (FilterType::Time, Some(FilterValue::Time(t))) => {
                FilterDraft::Time(t.format("%H:%M").to_string())
            }
            (FilterType::Time, _) => FilterDraft::Time(String::new()),
            (FilterType::Select, Some(FilterValue::Select(s))) => {
                FilterDraft::Select(Some(s.clone()))
            }
            (FilterType::Select, _) => FilterDraft::Select(None),
        };

        Self {
            column_id: column_id.into(),
            filter_type,
            options,
            draft,
        }
    }

    /// The column this editor belongs to.
    pub fn column_id(&self) -> &str {
        &self.column_id
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Options offered by a select editor.
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn draft(&self) -> &FilterDraft {
        &self.draft
    }

    /// Replaces the text draft. Ignored by non-text editors.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if let FilterDraft::Text(current) = &mut self.draft {
            *current = text.into();
        }
    }

    /// Picks a day. Fills the start bound of a range first, then the end.
    pub fn pick_date(&mut self, day: NaiveDate) {
        match &mut self.draft {
            FilterDraft::Date(current) => *current = Some(day),
            FilterDraft::DateRange { from, to } => match (*from, *to) {
                (None, _) | (Some(_), Some(_)) => {
                    *from = Some(day);
                    *to = None;
                }
                (Some(_), None) => *to = Some(day),
            },
            _ => {}
        }
    }

    /// Replaces the raw time draft.
    pub fn set_time(&mut self, input: impl Into<String>) {
        if let FilterDraft::Time(current) = &mut self.draft {
            *current = input.into();
        }
    }

    /// Chooses a select option by value.
    pub fn choose(&mut self, value: impl Into<String>) {
        if let FilterDraft::Select(current) = &mut self.draft {
            *current = Some(value.into());
        }
    }

    /// The filter the draft would commit.
    ///
    /// `None` when the draft is empty or invalid, which leaves the column
    /// unfiltered.
    pub fn value(&self) -> Option<FilterValue> {
        match &self.draft {
            FilterDraft::Text(s) => {
                let value = FilterValue::Text(s.clone());
                (!value.is_empty()).then_some(value)
            }
            FilterDraft::Date(day) => day.map(FilterValue::date),
            FilterDraft::DateRange { from, to } => {
                from.map(|from| FilterValue::date_range(from, *to))
            }
            FilterDraft::Time(input) => FilterValue::parse_time(input),
            FilterDraft::Select(choice) => choice
                .as_ref()
                .filter(|c| self.options.iter().any(|o| &o.value == *c))
                .map(|c| FilterValue::Select(c.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    #[test]
    fn test_single_bound_matches_exact_day() {
        let filter = FilterValue::date_range(day(10), None);
        let at = |d: u32| CellValue::from(day(d).and_hms_opt(22, 0, 0).unwrap());
        assert!(default_matches(&at(10), &filter));
        assert!(!default_matches(&at(11), &filter));
        assert!(!default_matches(&at(9), &filter));
    }

    #[test]
    fn test_range_is_inclusive() {
        let filter = FilterValue::date_range(day(10), Some(day(12)));
        for (d, expected) in [(9, false), (10, true), (11, true), (12, true), (13, false)] {
            assert_eq!(default_matches(&CellValue::from(day(d)), &filter), expected, "day {d}");
        }
    }

    #[test]
    fn test_reversed_bounds_are_swapped() {
        assert_eq!(
            FilterValue::date_range(day(12), Some(day(10))),
            FilterValue::date_range(day(10), Some(day(12)))
        );
    }

    #[test]
    fn test_time_matches_hour_and_minute() {
        let value = CellValue::from(day(1).and_hms_opt(14, 30, 45).unwrap());
        assert!(default_matches(&value, &FilterValue::parse_time("14:30").unwrap()));
        assert!(!default_matches(&value, &FilterValue::parse_time("14:31").unwrap()));
    }

    #[test]
    fn test_invalid_time_leaves_filter_unset() {
        let mut input = FilterInput::open("time", FilterType::Time, Vec::new(), None);
        input.set_time("25:99");
        assert_eq!(input.value(), None);
        input.set_time("09:05");
        assert!(input.value().is_some());
    }

    #[test]
    fn test_select_requires_known_option() {
        let options = vec![SelectOption::new("call", "Call"), SelectOption::new("text", "Text")];
        let mut input = FilterInput::open("pref", FilterType::Select, options, None);
        input.choose("email");
        assert_eq!(input.value(), None);
        input.choose("text");
        assert_eq!(input.value(), Some(FilterValue::Select("text".into())));
        assert!(default_matches(&"text".into(), &FilterValue::Select("text".into())));
        assert!(!default_matches(&"call".into(), &FilterValue::Select("text".into())));
    }

    #[test]
    fn test_range_picks_fill_start_then_end() {
        let mut input = FilterInput::open("date", FilterType::DateRange, Vec::new(), None);
        input.pick_date(day(3));
        assert_eq!(input.value(), Some(FilterValue::date_range(day(3), None)));
        input.pick_date(day(7));
        assert_eq!(input.value(), Some(FilterValue::date_range(day(3), Some(day(7)))));
        input.pick_date(day(20));
        assert_eq!(input.value(), Some(FilterValue::date_range(day(20), None)));
    }

    #[test]
    fn test_single_date_editor_stores_pair() {
        let mut input = FilterInput::open("date", FilterType::Date, Vec::new(), None);
        input.pick_date(day(5));
        assert_eq!(
            input.value(),
            Some(FilterValue::DateRange {
                from: day(5),
                to: Some(day(5))
            })
        );
    }

    #[test]
    fn test_empty_text_passes_everything() {
        assert!(default_matches(&CellValue::Null, &FilterValue::Text(String::new())));
        assert!(default_matches(&"Main St".into(), &FilterValue::Text("main".into())));
    }

    #[test]
    fn test_text_whitespace_is_part_of_the_query() {
        assert!(!FilterValue::Text("  ".into()).is_empty());
        assert!(default_matches(&"Main St".into(), &FilterValue::Text("main ".into())));
        assert!(!default_matches(&"Main".into(), &FilterValue::Text("main ".into())));
        assert!(!default_matches(&"call".into(), &FilterValue::Text("   ".into())));
    }
}

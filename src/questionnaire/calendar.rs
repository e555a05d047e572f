//! Date-range picking for the "when" question.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::model::DateRange;

/// How a day is highlighted on the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayMarking {
    pub starting_day: bool,
    pub ending_day: bool,
    pub in_range: bool,
}

impl DateRange {
    /// Apply a tap on `day`, returning the new range.
    ///
    /// With no start, or with a finished range, the tap starts a new range.
    /// Otherwise a day on or after the start closes the range and an earlier
    /// day starts over from that day.
    pub fn tap(&self, day: NaiveDate) -> DateRange {
        match (self.start, self.end) {
            (Some(start), None) if day >= start => DateRange {
                start: Some(start),
                end: Some(day),
            },
            _ => DateRange {
                start: Some(day),
                end: None,
            },
        }
    }

    /// Highlight map for the calendar, recomputed from the endpoints.
    pub fn marked_dates(&self) -> BTreeMap<NaiveDate, DayMarking> {
        let mut marked = BTreeMap::new();
        let Some(start) = self.start else {
            return marked;
        };
        marked.insert(
            start,
            DayMarking {
                starting_day: true,
                ..Default::default()
            },
        );

        let Some(end) = self.end else {
            return marked;
        };
        marked.entry(end).or_default().ending_day = true;

        let mut day = start.checked_add_days(Days::new(1));
        while let Some(current) = day {
            if current >= end {
                break;
            }
            marked.insert(
                current,
                DayMarking {
                    in_range: true,
                    ..Default::default()
                },
            );
            day = current.checked_add_days(Days::new(1));
        }
        marked
    }

    /// Caption under the calendar.
    pub fn caption(&self) -> String {
        match (self.start, self.end) {
            (None, _) => "Select start date".to_string(),
            (Some(_), None) => "Select end date".to_string(),
            (Some(start), Some(end)) => {
                format!("{} - {}", format_us_date(start), format_us_date(end))
            }
        }
    }
}

/// `M/D/YYYY`, as used in summaries and captions.
pub fn format_us_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn first_tap_starts_range() {
        let range = DateRange::default().tap(date("2024-06-01"));
        assert_eq!(range.start, Some(date("2024-06-01")));
        assert_eq!(range.end, None);
    }

    #[test]
    fn later_tap_completes_range() {
        let range = DateRange::default()
            .tap(date("2024-06-01"))
            .tap(date("2024-06-03"));
        assert_eq!(range.start, Some(date("2024-06-01")));
        assert_eq!(range.end, Some(date("2024-06-03")));
    }

    #[test]
    fn same_day_tap_completes_one_day_range() {
        let range = DateRange::default()
            .tap(date("2024-06-01"))
            .tap(date("2024-06-01"));
        assert!(range.is_complete());
    }

    #[test]
    fn earlier_tap_restarts_range() {
        let range = DateRange::default()
            .tap(date("2024-06-10"))
            .tap(date("2024-06-03"));
        assert_eq!(range.start, Some(date("2024-06-03")));
        assert_eq!(range.end, None);
    }

    #[test]
    fn tap_after_complete_range_restarts() {
        let range = DateRange::default()
            .tap(date("2024-06-01"))
            .tap(date("2024-06-03"))
            .tap(date("2024-07-04"));
        assert_eq!(range.start, Some(date("2024-07-04")));
        assert_eq!(range.end, None);
    }

    #[test]
    fn marked_dates_fill_between_endpoints() {
        let range = DateRange {
            start: Some(date("2024-06-28")),
            end: Some(date("2024-07-02")),
        };
        let marked = range.marked_dates();
        assert_eq!(marked.len(), 5);
        assert!(marked[&date("2024-06-28")].starting_day);
        assert!(marked[&date("2024-07-02")].ending_day);
        for d in ["2024-06-29", "2024-06-30", "2024-07-01"] {
            let m = marked[&date(d)];
            assert!(m.in_range && !m.starting_day && !m.ending_day, "{d}");
        }
    }

    #[test]
    fn marked_dates_for_partial_and_empty_ranges() {
        assert!(DateRange::default().marked_dates().is_empty());
        let partial = DateRange::default().tap(date("2024-06-01"));
        let marked = partial.marked_dates();
        assert_eq!(marked.len(), 1);
        assert!(marked[&date("2024-06-01")].starting_day);
    }

    #[test]
    fn one_day_range_is_both_endpoints() {
        let range = DateRange {
            start: Some(date("2024-06-01")),
            end: Some(date("2024-06-01")),
        };
        let marked = range.marked_dates();
        assert_eq!(marked.len(), 1);
        let m = marked[&date("2024-06-01")];
        assert!(m.starting_day && m.ending_day && !m.in_range);
    }

    #[test]
    fn captions() {
        let empty = DateRange::default();
        assert_eq!(empty.caption(), "Select start date");
        let partial = empty.tap(date("2024-06-01"));
        assert_eq!(partial.caption(), "Select end date");
        let full = partial.tap(date("2024-06-03"));
        assert_eq!(full.caption(), "6/1/2024 - 6/3/2024");
    }
}

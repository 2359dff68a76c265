use std::sync::OnceLock;

use log::debug;
use regex::Regex;
use serde_json::Value;

use crate::timing::{
    schedule::Schedule,
    time_of_day::{TimeOfDay, TimeRange},
    week_day::WeekDay,
};

use super::text::sanitize_text_field;

fn holiday_regex() -> &'static Regex {
    static HOLIDAY_REGEX: OnceLock<Regex> = OnceLock::new();
    HOLIDAY_REGEX.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap())
}

/// Lists and index-keyed maps both count as sequences, anything else is empty.
fn entries(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => map.values().collect(),
        _ => Vec::new(),
    }
}

fn non_empty_field<'a>(entry: &'a Value, field: &str) -> Option<&'a str> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn sanitize_range(entry: &Value) -> Option<TimeRange> {
    let start = non_empty_field(entry, "start")?;
    let end = non_empty_field(entry, "end")?;
    let start = TimeOfDay::normalize(start).ok()?;
    let end = TimeOfDay::normalize(end).ok()?;
    Some(TimeRange::new(start, end))
}

/// Builds a valid schedule out of untrusted nested input.
///
/// Never fails. Ranges without both a `start` and an `end`, or whose times do not
/// normalize, are dropped. Holidays that are not `YYYY-MM-DD` after text
/// sanitization are dropped and duplicates collapse onto their first occurrence.
/// Ranges are kept in input order without sorting or merging.
pub fn sanitize_schedule(raw: &Value) -> Schedule {
    let mut schedule = Schedule::new();

    for day in WeekDay::ALL {
        for entry in entries(raw.get(day.key())) {
            match sanitize_range(entry) {
                Some(range) => schedule.add_range(day, range),
                None => debug!("Dropping invalid range for {}: {}", day, entry),
            }
        }
    }

    for entry in entries(raw.get("holidays")) {
        let Some(holiday) = entry.as_str() else {
            debug!("Dropping non-text holiday: {}", entry);
            continue;
        };
        let holiday = sanitize_text_field(holiday);
        if holiday_regex().is_match(&holiday) {
            schedule.add_holiday(holiday);
        } else {
            debug!("Dropping malformed holiday: {:?}", holiday);
        }
    }

    schedule
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn range(start: &str, end: &str) -> TimeRange {
        TimeRange::new(
            TimeOfDay::normalize(start).unwrap(),
            TimeOfDay::normalize(end).unwrap(),
        )
    }

    #[test]
    fn drops_incomplete_ranges() {
        let schedule = sanitize_schedule(&json!({
            "monday": [
                {"start": "09:00", "end": "17:00"},
                {"start": "", "end": "18:00"},
                {"start": "10:00"},
                {"start": 9, "end": "18:00"},
                "09:00-17:00",
            ]
        }));
        assert_eq!(schedule.ranges(WeekDay::Monday), [range("09:00", "17:00")]);
    }

    #[test]
    fn drops_ranges_that_do_not_normalize() {
        let schedule = sanitize_schedule(&json!({
            "tuesday": [
                {"start": "noon", "end": "17:00"},
                {"start": "9:00", "end": "25:90"},
                {"start": "12:3:4", "end": "13:00"},
            ]
        }));
        assert_eq!(schedule.ranges(WeekDay::Tuesday), [range("09:00", "23:59")]);
    }

    #[test]
    fn keeps_order_and_overlaps() {
        let schedule = sanitize_schedule(&json!({
            "friday": [
                {"start": "18:00", "end": "23:00"},
                {"start": "11:00", "end": "14:00"},
                {"start": "18:00", "end": "23:00"},
            ]
        }));
        assert_eq!(
            schedule.ranges(WeekDay::Friday),
            [range("18:00", "23:00"), range("11:00", "14:00"), range("18:00", "23:00")]
        );
    }

    #[test]
    fn non_sequence_days_are_empty() {
        let schedule = sanitize_schedule(&json!({
            "monday": "09:00-17:00",
            "tuesday": null,
            "wednesday": 5,
        }));
        for day in WeekDay::ALL {
            assert!(schedule.ranges(day).is_empty());
        }
        assert_eq!(sanitize_schedule(&json!("garbage")), Schedule::new());
        assert_eq!(sanitize_schedule(&json!([1, 2, 3])), Schedule::new());
    }

    #[test]
    fn index_keyed_maps_are_sequences() {
        let schedule = sanitize_schedule(&json!({
            "saturday": {
                "0": {"start": "10:00", "end": "12:00"},
                "1": {"start": "14:00", "end": "16:00"},
            },
            "holidays": {"0": "2024-12-25", "1": "2025-01-01"},
        }));
        assert_eq!(
            schedule.ranges(WeekDay::Saturday),
            [range("10:00", "12:00"), range("14:00", "16:00")]
        );
        assert_eq!(schedule.holidays(), ["2024-12-25", "2025-01-01"]);
    }

    #[test]
    fn holidays_are_filtered_and_deduplicated() {
        let schedule = sanitize_schedule(&json!({
            "holidays": ["2024-12-25", "2024-12-25", "bad-date"]
        }));
        assert_eq!(schedule.holidays(), ["2024-12-25"]);
    }

    #[test]
    fn holidays_are_text_sanitized_first() {
        let schedule = sanitize_schedule(&json!({
            "holidays": [" 2025-01-01 ", "<i>2024-12-26</i>", "2024-12-26", 20241225, "24-12-25", "2024-1-01"]
        }));
        assert_eq!(schedule.holidays(), ["2025-01-01", "2024-12-26"]);
    }

    #[test]
    fn holiday_shape_is_not_calendar_checked() {
        let schedule = sanitize_schedule(&json!({"holidays": ["2024-13-45"]}));
        assert_eq!(schedule.holidays(), ["2024-13-45"]);
    }

    #[test]
    fn non_sequence_holidays_are_empty() {
        let schedule = sanitize_schedule(&json!({"holidays": "2024-12-25"}));
        assert!(schedule.holidays().is_empty());
    }

    #[test]
    fn sanitizing_twice_changes_nothing() {
        let once = sanitize_schedule(&json!({
            "monday": [{"start": "9:5", "end": "25:90"}, {"start": "22:00", "end": "02:00"}],
            "sunday": [{"start": " 10:00", "end": "14:00 "}, {"start": "", "end": "1:00"}],
            "holidays": ["2024-12-25", "x", "2024-12-25", "2025-01-01"],
        }));
        let twice = sanitize_schedule(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
        assert_eq!(once.ranges(WeekDay::Monday).len(), 2);
        assert_eq!(once.holidays(), ["2024-12-25", "2025-01-01"]);
    }
}

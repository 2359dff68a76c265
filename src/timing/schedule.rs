use serde::{Deserialize, Serialize};

use super::{clock::LocalInstant, time_of_day::TimeRange, week_day::WeekDay};

pub const HOLIDAY_FORMAT: &str = "%Y-%m-%d";

/// The weekly opening hours plus the dates the restaurant is closed.
///
/// Serializes to exactly eight keys: one per weekday holding a list of
/// `{start, end}` ranges, and `holidays` holding `YYYY-MM-DD` strings.
/// Missing keys deserialize as empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    monday: Vec<TimeRange>,
    #[serde(default)]
    tuesday: Vec<TimeRange>,
    #[serde(default)]
    wednesday: Vec<TimeRange>,
    #[serde(default)]
    thursday: Vec<TimeRange>,
    #[serde(default)]
    friday: Vec<TimeRange>,
    #[serde(default)]
    saturday: Vec<TimeRange>,
    #[serde(default)]
    sunday: Vec<TimeRange>,
    #[serde(default)]
    holidays: Vec<String>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ranges(&self, day: WeekDay) -> &[TimeRange] {
        match day {
            WeekDay::Monday => &self.monday,
            WeekDay::Tuesday => &self.tuesday,
            WeekDay::Wednesday => &self.wednesday,
            WeekDay::Thursday => &self.thursday,
            WeekDay::Friday => &self.friday,
            WeekDay::Saturday => &self.saturday,
            WeekDay::Sunday => &self.sunday,
        }
    }

    fn ranges_mut(&mut self, day: WeekDay) -> &mut Vec<TimeRange> {
        match day {
            WeekDay::Monday => &mut self.monday,
            WeekDay::Tuesday => &mut self.tuesday,
            WeekDay::Wednesday => &mut self.wednesday,
            WeekDay::Thursday => &mut self.thursday,
            WeekDay::Friday => &mut self.friday,
            WeekDay::Saturday => &mut self.saturday,
            WeekDay::Sunday => &mut self.sunday,
        }
    }

    /// Appends a range to a day. Ranges keep insertion order and may overlap.
    pub fn add_range(&mut self, day: WeekDay, range: TimeRange) {
        self.ranges_mut(day).push(range);
    }

    pub fn holidays(&self) -> &[String] {
        &self.holidays
    }

    /// Adds a holiday unless it is already listed. Returns whether it was added.
    pub fn add_holiday(&mut self, date: String) -> bool {
        if self.holidays.contains(&date) {
            return false;
        }
        self.holidays.push(date);
        true
    }

    pub fn is_holiday(&self, now: &LocalInstant) -> bool {
        let date = now.date().format(HOLIDAY_FORMAT).to_string();
        self.holidays.contains(&date)
    }

    /// Whether the restaurant is open at `now`.
    ///
    /// Checked in order, the first hit wins:
    /// 1. a holiday on `now`'s date closes the whole day, including hours carried
    ///    over from an overnight range of the day before
    /// 2. any range of the current weekday covering `now`
    /// 3. any overnight range of the previous weekday still running after midnight
    ///
    /// Only the current date is checked against the holidays. An overnight range
    /// that starts on a holiday's weekday still carries over into the next day.
    pub fn is_open(&self, now: &LocalInstant) -> bool {
        if self.is_holiday(now) {
            return false;
        }

        let minutes = now.minutes();
        if self
            .ranges(now.weekday())
            .iter()
            .any(|range| range.contains_same_day(minutes))
        {
            return true;
        }

        self.ranges(now.weekday().previous())
            .iter()
            .any(|range| range.contains_carry_over(minutes))
    }
}

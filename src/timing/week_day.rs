use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Canonical weekday keys used by the stored schedule.
///
/// The names are always lowercase English, independent of any display locale.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl WeekDay {
    pub const ALL: [WeekDay; 7] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
        WeekDay::Saturday,
        WeekDay::Sunday,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            WeekDay::Monday => "monday",
            WeekDay::Tuesday => "tuesday",
            WeekDay::Wednesday => "wednesday",
            WeekDay::Thursday => "thursday",
            WeekDay::Friday => "friday",
            WeekDay::Saturday => "saturday",
            WeekDay::Sunday => "sunday",
        }
    }

    /// The day before, wrapping Monday back to Sunday.
    pub fn previous(&self) -> Self {
        match self {
            WeekDay::Monday => WeekDay::Sunday,
            WeekDay::Tuesday => WeekDay::Monday,
            WeekDay::Wednesday => WeekDay::Tuesday,
            WeekDay::Thursday => WeekDay::Wednesday,
            WeekDay::Friday => WeekDay::Thursday,
            WeekDay::Saturday => WeekDay::Friday,
            WeekDay::Sunday => WeekDay::Saturday,
        }
    }
}

impl From<chrono::Weekday> for WeekDay {
    fn from(weekday: chrono::Weekday) -> Self {
        // number_from_monday is 1..=7
        Self::ALL[weekday.number_from_monday() as usize - 1]
    }
}

impl Display for WeekDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

use std::{fmt::Display, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sanitizer::text::sanitize_text_field;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeFormatError {
    #[error("'{0}' is not a valid HH:MM time")]
    InvalidFormat(String),
}

fn time_regex() -> &'static Regex {
    static TIME_REGEX: OnceLock<Regex> = OnceLock::new();
    // ASCII digits only, `\d` would also accept other scripts
    TIME_REGEX.get_or_init(|| Regex::new(r"^([0-9]{1,2}):([0-9]{1,2})$").unwrap())
}

/// Minutes since local midnight, always below `24 * 60`.
///
/// Serialized as a zero-padded `HH:MM` string. Deserializing goes through
/// [`TimeOfDay::normalize`], so stored values get the same leniency as admin input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    /// Clamps out of range components instead of rejecting them.
    pub fn from_hm(hour: u16, minute: u16) -> Self {
        Self {
            minutes: hour.min(23) * 60 + minute.min(59),
        }
    }

    /// Parses a raw admin supplied time.
    ///
    /// The input is passed through the text sanitizer first. Anything shaped like
    /// `H:MM` / `HH:MM` is accepted and each component clamped, so `"25:90"` becomes
    /// `23:59`. Any other shape is an `InvalidFormat` error.
    pub fn normalize(raw: &str) -> Result<Self, TimeFormatError> {
        let value = sanitize_text_field(raw);
        let Some(captures) = time_regex().captures(&value) else {
            return Err(TimeFormatError::InvalidFormat(value));
        };
        // At most two ASCII digits each, these cannot overflow
        let hour: u16 = captures[1].parse().unwrap_or(0);
        let minute: u16 = captures[2].parse().unwrap_or(0);
        Ok(Self::from_hm(hour, minute))
    }

    pub fn minutes(&self) -> u16 {
        self.minutes
    }

    pub fn hour(&self) -> u16 {
        self.minutes / 60
    }

    pub fn minute(&self) -> u16 {
        self.minutes % 60
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

/// One opening window of a day.
///
/// When `end < start` the window runs past midnight into the following day.
/// `start == end` is a single minute, not a full day.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeRange {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    pub fn is_overnight(&self) -> bool {
        self.end < self.start
    }

    /// Whether `minutes` falls into the part of the range that lies on its own day.
    ///
    /// Bounds are inclusive. Overnight ranges are open from `start` until midnight,
    /// the part after midnight is [`TimeRange::contains_carry_over`].
    pub fn contains_same_day(&self, minutes: u16) -> bool {
        if self.is_overnight() {
            return minutes >= self.start.minutes();
        }
        self.start.minutes() <= minutes && minutes <= self.end.minutes()
    }

    /// Whether `minutes` on the following day is still covered by this range.
    pub fn contains_carry_over(&self, minutes: u16) -> bool {
        self.is_overnight() && minutes <= self.end.minutes()
    }
}

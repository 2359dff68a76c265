use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use chrono_tz::Tz;

use super::week_day::WeekDay;

/// The local-time facts the availability check needs about "now".
///
/// Time zone resolution happens before one of these is built, the schedule
/// only ever sees business-local values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LocalInstant {
    date: NaiveDate,
    weekday: WeekDay,
    minutes: u16,
}

impl LocalInstant {
    pub fn from_naive(local: NaiveDateTime) -> Self {
        Self {
            date: local.date(),
            weekday: local.weekday().into(),
            minutes: (local.hour() * 60 + local.minute()) as u16,
        }
    }

    pub fn from_zoned<T: TimeZone>(timestamp: DateTime<T>) -> Self {
        Self::from_naive(timestamp.naive_local())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weekday(&self) -> WeekDay {
        self.weekday
    }

    pub fn minutes(&self) -> u16 {
        self.minutes
    }
}

/// Source of the current business-local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> LocalInstant;
}

/// Wall clock converted into the business time zone.
pub struct SystemClock {
    timezone: Tz,
}

impl SystemClock {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> LocalInstant {
        let local_datetime = Local::now();
        let business_datetime: DateTime<Tz> = local_datetime.with_timezone(&self.timezone);
        LocalInstant::from_zoned(business_datetime)
    }
}

/// Always reports the same instant.
#[cfg(test)]
pub struct FixedClock(pub LocalInstant);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> LocalInstant {
        self.0
    }
}

#[cfg(test)]
impl FixedClock {
    /// `at("2024-12-23 09:00")`
    pub fn at(local: &str) -> Self {
        let local = NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M").unwrap();
        Self(LocalInstant::from_naive(local))
    }
}

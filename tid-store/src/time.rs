//! Time-of-day conversion between the stored zone (UTC) and the viewer's zone.
//!
//! Schedule times are bare wall-clock values with no date attached, so each
//! conversion anchors them to a calendar date first. With [`Anchor::Today`]
//! the result is exact only while no DST transition separates today from the
//! day the schedule actually fires; stats carry their own date and use the
//! `*_on` variants instead.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use thiserror::Error;

/// Storage and display format for times of day
pub const TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid time of day '{0}', expected HH:MM or HH:MM:SS")]
    Parse(String),

    #[error("{time} does not exist on {date} in the local zone")]
    Nonexistent { time: NaiveTime, date: NaiveDate },
}

/// Calendar date a bare time of day is attached to before conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// Today's date in the zone the value is being converted from.
    #[default]
    Today,
    Fixed(NaiveDate),
}

/// Parse `HH:MM:SS` or `HH:MM`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, TimeError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| TimeError::Parse(value.to_string()))
}

pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Converts times of day between UTC and `Tz` (the process's local zone
/// unless a zone is given explicitly).
#[derive(Debug, Clone)]
pub struct TimeConverter<Tz: TimeZone = Local> {
    zone: Tz,
    anchor: Anchor,
}

impl TimeConverter<Local> {
    pub fn local() -> Self {
        Self::new(Local)
    }
}

impl Default for TimeConverter<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl<Tz: TimeZone> TimeConverter<Tz> {
    pub fn new(zone: Tz) -> Self {
        Self {
            zone,
            anchor: Anchor::Today,
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn zone(&self) -> &Tz {
        &self.zone
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    fn anchor_date_local(&self) -> NaiveDate {
        match self.anchor {
            Anchor::Fixed(date) => date,
            Anchor::Today => Utc::now().with_timezone(&self.zone).date_naive(),
        }
    }

    fn anchor_date_utc(&self) -> NaiveDate {
        match self.anchor {
            Anchor::Fixed(date) => date,
            Anchor::Today => Utc::now().date_naive(),
        }
    }

    /// Local `HH:MM[:SS]` to UTC `HH:MM:SS`.
    pub fn to_utc(&self, time: &str) -> Result<String, TimeError> {
        let parsed = parse_time_of_day(time)?;
        let utc = self.local_to_utc_on(parsed, self.anchor_date_local())?;
        Ok(format_time_of_day(utc))
    }

    /// UTC `HH:MM[:SS]` to local `HH:MM:SS`.
    pub fn to_local(&self, time: &str) -> Result<String, TimeError> {
        let parsed = parse_time_of_day(time)?;
        Ok(format_time_of_day(self.utc_to_local_on(parsed, self.anchor_date_utc())))
    }

    /// Nullable form of [`Self::to_utc`]; `None` stays `None`.
    pub fn local_to_utc(&self, time: Option<&str>) -> Result<Option<String>, TimeError> {
        time.map(|t| self.to_utc(t)).transpose()
    }

    /// Nullable form of [`Self::to_local`]; `None` stays `None`.
    pub fn utc_to_local(&self, time: Option<&str>) -> Result<Option<String>, TimeError> {
        time.map(|t| self.to_local(t)).transpose()
    }

    /// Ambiguous local times (DST fold) resolve to the earlier instant.
    pub fn local_to_utc_on(&self, time: NaiveTime, date: NaiveDate) -> Result<NaiveTime, TimeError> {
        let local = self
            .zone
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .ok_or(TimeError::Nonexistent { time, date })?;
        Ok(local.with_timezone(&Utc).time())
    }

    pub fn utc_to_local_on(&self, time: NaiveTime, date: NaiveDate) -> NaiveTime {
        self.utc_datetime_to_local(date.and_time(time)).time()
    }

    /// Full UTC timestamp to local; the local date may differ from the UTC one.
    pub fn utc_datetime_to_local(&self, utc: NaiveDateTime) -> NaiveDateTime {
        Utc.from_utc_datetime(&utc)
            .with_timezone(&self.zone)
            .naive_local()
    }

    pub fn times_local_to_utc<S: AsRef<str>>(&self, times: &[S]) -> Result<Vec<String>, TimeError> {
        times
            .iter()
            .map(|t| self.to_utc(t.as_ref()))
            .collect()
    }

    pub fn times_utc_to_local<S: AsRef<str>>(&self, times: &[S]) -> Result<Vec<String>, TimeError> {
        times
            .iter()
            .map(|t| self.to_local(t.as_ref()))
            .collect()
    }
}

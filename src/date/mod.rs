//! # Date Module
//!
//! Whole-day arithmetic on zoned timestamps and the list of known time zones.
use crate::error::ErrorKind;
use chrono::DateTime;
use chrono::MappedLocalTime;
use chrono::NaiveDateTime;
use chrono::TimeDelta;
use chrono::TimeZone;
use std::fmt::Debug;
use thiserror::Error;

pub mod zones;

pub use zones::time_zone_list;
pub use zones::OffsetBase;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DateError {
    /// The shifted local date-time does not exist in the zone
    #[error("Local time {local} is skipped in time zone {zone}")]
    SkippedTimeError { local: NaiveDateTime, zone: String },

    /// The shifted local date-time exists twice in the zone
    #[error("Local time {local} is ambiguous in time zone {zone}")]
    AmbiguousTimeError { local: NaiveDateTime, zone: String },

    #[error("Adding {days} days to {local} is out of range")]
    OutOfRangeError { local: NaiveDateTime, days: i64 },
}

impl DateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DateError::SkippedTimeError { .. } => ErrorKind::SkippedTime,
            DateError::AmbiguousTimeError { .. } => ErrorKind::AmbiguousTime,
            DateError::OutOfRangeError { .. } => ErrorKind::Argument,
        }
    }
}

/// Adds whole calendar days to a zoned timestamp.
///
/// The local date moves by `days` while the local time of day stays the same.
/// The result is resolved in the zone of `timestamp` without any adjustment,
/// so a local time inside a daylight-saving gap or overlap is an error. The
/// elapsed time is therefore not always `days * 24` hours.
///
/// # Arguments
/// * `timestamp` - Starting point; its zone is kept
/// * `days` - Number of days to add, may be negative
///
/// # Errors
/// [`DateError::SkippedTimeError`] or [`DateError::AmbiguousTimeError`] when the
/// new local time cannot be resolved to exactly one instant, and
/// [`DateError::OutOfRangeError`] when the date leaves the supported range.
pub fn add_days<Tz>(timestamp: &DateTime<Tz>, days: i64) -> Result<DateTime<Tz>, DateError>
where
    Tz: TimeZone + Debug,
{
    let local = timestamp.naive_local();
    let shifted = TimeDelta::try_days(days)
        .and_then(|delta| local.date().checked_add_signed(delta))
        .ok_or(DateError::OutOfRangeError { local, days })?
        .and_time(local.time());

    let zone = timestamp.timezone();
    match zone.from_local_datetime(&shifted) {
        MappedLocalTime::Single(result) => Ok(result),
        MappedLocalTime::Ambiguous(earliest, latest) => {
            log::debug!("{shifted} is ambiguous in {zone:?}: {earliest:?} or {latest:?}");
            Err(DateError::AmbiguousTimeError {
                local: shifted,
                zone: format!("{zone:?}"),
            })
        }
        MappedLocalTime::None => Err(DateError::SkippedTimeError {
            local: shifted,
            zone: format!("{zone:?}"),
        }),
    }
}

//! Display labels for every zone of the tz database.
use chrono::MappedLocalTime;
use chrono::NaiveDateTime;
use chrono::Offset;
use chrono::TimeDelta;
use chrono::TimeZone;
use chrono_tz::Tz;
use chrono_tz::TzOffset;
use chrono_tz::TZ_VARIANTS;
use std::cmp::Reverse;
use std::fmt;

/// Prefix written in front of the offset of a zone label
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OffsetBase {
    GMT,
    #[default]
    UTC,
}

impl fmt::Display for OffsetBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffsetBase::GMT => write!(f, "GMT"),
            OffsetBase::UTC => write!(f, "UTC"),
        }
    }
}

/// Lists every known zone as `"(UTC+03:00) Europe/Moscow"`, highest offset first.
///
/// Offsets are taken at the local date-time `now`. A zone where `now` falls
/// into an overlap uses the offset in force before the transition, and one
/// where `now` falls into a gap uses the offset in force after it. Zones with
/// equal offsets keep the order of the tz database.
pub fn time_zone_list(base: OffsetBase, now: NaiveDateTime) -> Vec<String> {
    let mut zones: Vec<(i32, &Tz)> = TZ_VARIANTS
        .iter()
        .map(|zone| (offset_seconds(zone, &now), zone))
        .collect();
    zones.sort_by_key(|(offset, _)| Reverse(*offset));
    zones
        .into_iter()
        .map(|(offset, zone)| format!("({base}{}) {}", format_offset(offset), zone.name()))
        .collect()
}

fn offset_seconds(zone: &Tz, now: &NaiveDateTime) -> i32 {
    let offset = match zone.offset_from_local_datetime(now) {
        MappedLocalTime::Single(offset) => offset,
        MappedLocalTime::Ambiguous(earliest, _) => earliest,
        MappedLocalTime::None => offset_after_gap(zone, now),
    };
    offset.fix().local_minus_utc()
}

/// Offset in force once the gap containing `now` is over.
///
/// `now` read with the offset of the day before is an instant past the
/// transition.
fn offset_after_gap(zone: &Tz, now: &NaiveDateTime) -> TzOffset {
    let before = now
        .checked_sub_signed(TimeDelta::days(1))
        .and_then(|day_before| zone.offset_from_local_datetime(&day_before).earliest())
        .map(|offset| offset.fix().local_minus_utc())
        .unwrap_or(0);
    let instant = now
        .checked_sub_signed(TimeDelta::seconds(before.into()))
        .unwrap_or(*now);
    zone.offset_from_utc_datetime(&instant)
}

/// `Z` for zero, otherwise `+HH:MM` with seconds only when present
fn format_offset(seconds: i32) -> String {
    if seconds == 0 {
        return "Z".to_string();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let total = seconds.unsigned_abs();
    let (hours, minutes, seconds) = (total / 3600, total / 60 % 60, total % 60);
    if seconds == 0 {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
    }
}

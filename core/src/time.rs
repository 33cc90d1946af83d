//! Local-day boundaries and date-filter normalization.
//!
//! The remote API filters on UTC instants, while "today" is the operator's
//! local calendar day. A local day maps to a half-open UTC range that is
//! generally not aligned to UTC midnight.

use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    SecondsFormat, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::TimeError;

const MIN_OFFSET_HOURS: i32 = -12;
const MAX_OFFSET_HOURS: i32 = 14;

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// The zone whose calendar defines "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalZone {
    /// Whatever the host clock reports.
    #[default]
    Host,
    Fixed(FixedOffset),
    Named(Tz),
}

impl LocalZone {
    pub fn from_offset_hours(hours: i32) -> Result<Self, TimeError> {
        if !(MIN_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(&hours) {
            return Err(TimeError::OffsetOutOfRange(hours));
        }
        FixedOffset::east_opt(hours * 3600)
            .map(LocalZone::Fixed)
            .ok_or(TimeError::OffsetOutOfRange(hours))
    }

    pub fn from_name(name: &str) -> Result<Self, TimeError> {
        name.trim()
            .parse::<Tz>()
            .map(LocalZone::Named)
            .map_err(|_| TimeError::UnknownZone(name.to_string()))
    }

    /// An offset override wins over a zone name; neither means the host clock.
    pub fn from_settings(offset_hours: Option<i32>, name: Option<&str>) -> Result<Self, TimeError> {
        match (offset_hours, name) {
            (Some(hours), _) => Self::from_offset_hours(hours),
            (None, Some(name)) if !name.trim().is_empty() => Self::from_name(name),
            _ => Ok(LocalZone::Host),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            LocalZone::Host => "host".to_string(),
            LocalZone::Fixed(offset) => format!("UTC{offset}"),
            LocalZone::Named(tz) => tz.name().to_string(),
        }
    }

    /// UTC range covering the local calendar day that contains `now`.
    pub fn day_range(&self, now: DateTime<Utc>) -> DayRange {
        match self {
            LocalZone::Host => day_range_in(&Local, now),
            LocalZone::Fixed(offset) => day_range_in(offset, now),
            LocalZone::Named(tz) => day_range_in(tz, now),
        }
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            LocalZone::Host => now.with_timezone(&Local).date_naive(),
            LocalZone::Fixed(offset) => now.with_timezone(offset).date_naive(),
            LocalZone::Named(tz) => now.with_timezone(tz).date_naive(),
        }
    }

    /// Local midnight of today, rendered without an offset (`YYYY-MM-DDT00:00:00`).
    pub fn local_midnight(&self, now: DateTime<Utc>) -> String {
        self.today(now)
            .and_time(NaiveTime::MIN)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string()
    }

    /// Interprets a wall-clock time in this zone.
    pub fn to_utc(&self, local: NaiveDateTime) -> Result<DateTime<Utc>, TimeError> {
        let converted = match self {
            LocalZone::Host => localize(&Local, local),
            LocalZone::Fixed(offset) => localize(offset, local),
            LocalZone::Named(tz) => localize(tz, local),
        };
        converted.ok_or_else(|| TimeError::NonexistentLocalTime(local.to_string()))
    }

    /// Converts a caller-supplied date filter to a UTC instant string.
    ///
    /// Values carrying an offset or `Z` are converted as-is. Values without
    /// one are read as local time; a bare date means local midnight.
    pub fn normalize_filter(&self, raw: &str) -> Result<String, TimeError> {
        let trimmed = raw.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(format_utc(instant.with_timezone(&Utc)));
        }
        let naive =
            parse_naive(trimmed).ok_or_else(|| TimeError::UnrecognizedDate(raw.to_string()))?;
        self.to_utc(naive).map(format_utc)
    }
}

/// Half-open UTC range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayRange {
    pub fn start_param(&self) -> String {
        format_utc(self.start)
    }

    pub fn end_param(&self) -> String {
        format_utc(self.end)
    }
}

/// RFC 3339 with whole seconds and a `Z` suffix.
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn day_range_in<Z: TimeZone>(zone: &Z, now: DateTime<Utc>) -> DayRange {
    let now_local = now.with_timezone(zone);
    let midnight = now_local.date_naive().and_time(NaiveTime::MIN);
    let start = localize(zone, midnight).unwrap_or_else(|| {
        // Midnight skipped by a DST jump; use the offset in force now.
        let offset = now_local.offset().fix();
        midnight.and_utc() - Duration::seconds(i64::from(offset.local_minus_utc()))
    });
    DayRange {
        start,
        end: start + Duration::hours(24),
    }
}

fn localize<Z: TimeZone>(zone: &Z, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    zone.from_local_datetime(&local)
        .earliest()
        .map(|instant| instant.with_timezone(&Utc))
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

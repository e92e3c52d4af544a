//! Open/closed resolution from several sources of differing reliability.

use crate::models::{OpeningHours, PlaceDetails, PlaceResult};
use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use thiserror::Error;

const MINUTES_PER_DAY: i64 = 24 * 60;
const MINUTES_PER_WEEK: i64 = 7 * MINUTES_PER_DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStatus {
    Open,
    Closed,
    Unknown,
}

impl OpenStatus {
    pub fn label(self) -> &'static str {
        match self {
            OpenStatus::Open => "Open now",
            OpenStatus::Closed => "Closed",
            OpenStatus::Unknown => "Hours unknown",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum StatusError {
    #[error("opening hours carry no periods")]
    NoPeriods,
    #[error("no UTC offset to localise the current time")]
    NoUtcOffset,
    #[error("malformed period time '{0}'")]
    BadTime(String),
}

/// One source of open/closed information. `Ok(None)` means "no opinion".
pub trait StatusProvider {
    fn is_open(&self, now: DateTime<Utc>) -> Result<Option<bool>, StatusError>;
}

/// Computes the status from weekly periods at the given instant.
pub struct LiveHours<'a> {
    pub hours: Option<&'a OpeningHours>,
    pub utc_offset: Option<i32>,
}

/// The deprecated `open_now` flag, frozen at the time of the request.
pub struct LegacyFlag<'a>(pub Option<&'a OpeningHours>);

impl StatusProvider for LiveHours<'_> {
    fn is_open(&self, now: DateTime<Utc>) -> Result<Option<bool>, StatusError> {
        let Some(hours) = self.hours else {
            return Ok(None);
        };
        let periods = hours.periods.as_ref().ok_or(StatusError::NoPeriods)?;
        let offset = self.utc_offset.ok_or(StatusError::NoUtcOffset)?;
        if periods.is_empty() {
            return Ok(None);
        }

        // Open around the clock: a single Sunday 00:00 opening with no close.
        if let [only] = periods.as_slice() {
            if only.close.is_none() && only.open.day == 0 && only.open.time == "0000" {
                return Ok(Some(true));
            }
        }

        let local = now + Duration::minutes(offset as i64);
        let now_min = local.weekday().num_days_from_sunday() as i64 * MINUTES_PER_DAY
            + local.hour() as i64 * 60
            + local.minute() as i64;

        for period in periods {
            let Some(close) = &period.close else {
                continue;
            };
            let open = week_minute(period.open.day, &period.open.time)?;
            let mut close = week_minute(close.day, &close.time)?;
            if close <= open {
                close += MINUTES_PER_WEEK;
            }
            if (open..close).contains(&now_min) || (open..close).contains(&(now_min + MINUTES_PER_WEEK)) {
                return Ok(Some(true));
            }
        }
        Ok(Some(false))
    }
}

impl StatusProvider for LegacyFlag<'_> {
    fn is_open(&self, _now: DateTime<Utc>) -> Result<Option<bool>, StatusError> {
        Ok(self.0.and_then(|h| h.open_now))
    }
}

fn week_minute(day: u8, time: &str) -> Result<i64, StatusError> {
    let bad = || StatusError::BadTime(time.to_string());
    if time.len() != 4 || !time.is_ascii() || day > 6 {
        return Err(bad());
    }
    let hour: i64 = time[..2].parse().map_err(|_| bad())?;
    let minute: i64 = time[2..].parse().map_err(|_| bad())?;
    if hour > 24 || minute > 59 {
        return Err(bad());
    }
    Ok(day as i64 * MINUTES_PER_DAY + hour * 60 + minute)
}

/// Walks the providers in priority order and stops at the first one that
/// answers without error.
pub fn resolve(providers: &[&dyn StatusProvider], now: DateTime<Utc>) -> OpenStatus {
    for provider in providers {
        match provider.is_open(now) {
            Ok(Some(true)) => return OpenStatus::Open,
            Ok(Some(false)) => return OpenStatus::Closed,
            Ok(None) | Err(_) => continue,
        }
    }
    OpenStatus::Unknown
}

/// Detail hours first, then the search result's hours, then its legacy flag.
pub fn resolve_place(place: &PlaceResult, details: Option<&PlaceDetails>, now: DateTime<Utc>) -> OpenStatus {
    let detailed = LiveHours {
        hours: details.and_then(|d| d.opening_hours.as_ref()),
        utc_offset: details.and_then(|d| d.utc_offset),
    };
    let searched = LiveHours {
        hours: place.opening_hours.as_ref(),
        utc_offset: None,
    };
    let legacy = LegacyFlag(place.opening_hours.as_ref());

    resolve(&[&detailed, &searched, &legacy], now)
}

//! Order constraints: lead time, booking horizon and blackout dates.

use core::fmt;
use core::str::FromStr;

use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Minimum lead time used when the backend cannot be reached.
pub const FALLBACK_MIN_LEAD_MINUTES: u32 = 720;

/// Booking horizon used when the backend cannot be reached.
pub const FALLBACK_MAX_DAYS: u32 = 60;

/// Ordering rules published by the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConstraints {
    /// Minimum time between ordering and pickup.
    #[serde(
        default = "default_min_lead_minutes",
        deserialize_with = "non_negative"
    )]
    pub min_lead_minutes: u32,
    /// Latest pickup day, counted from today.
    #[serde(default = "default_max_days", deserialize_with = "non_negative")]
    pub max_days: u32,
    /// Date ranges with no pickups.
    #[serde(default)]
    pub blackout_dates: Vec<BlackoutRange>,
}

const fn default_min_lead_minutes() -> u32 {
    FALLBACK_MIN_LEAD_MINUTES
}

const fn default_max_days() -> u32 {
    FALLBACK_MAX_DAYS
}

/// Accept any JSON integer, clamping negatives to zero.
fn non_negative<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = i64::deserialize(deserializer)?;
    Ok(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}

impl OrderConstraints {
    /// The permissive defaults used when constraints cannot be fetched.
    #[must_use]
    pub const fn fallback() -> Self {
        Self {
            min_lead_minutes: FALLBACK_MIN_LEAD_MINUTES,
            max_days: FALLBACK_MAX_DAYS,
            blackout_dates: Vec::new(),
        }
    }

    /// Minimum lead time as a duration.
    #[must_use]
    pub fn lead_time(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.min_lead_minutes))
    }

    /// Whether `date` falls inside any blackout range.
    #[must_use]
    pub fn is_blackout(&self, date: NaiveDate) -> bool {
        self.blackout_dates.iter().any(|range| range.contains(date))
    }
}

impl Default for OrderConstraints {
    fn default() -> Self {
        Self::fallback()
    }
}

// =============================================================================
// Blackout ranges
// =============================================================================

/// One end of a blackout range: `YYYY-MM-DD`, or `MM-DD` for annual ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlackoutDate {
    pub year: Option<i32>,
    pub month: u32,
    pub day: u32,
}

impl BlackoutDate {
    /// The full date when a year is present and the date exists.
    #[must_use]
    pub fn to_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month, self.day)
    }

    const fn month_day(self) -> (u32, u32) {
        (self.month, self.day)
    }
}

impl fmt::Display for BlackoutDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{year:04}-{:02}-{:02}", self.month, self.day),
            None => write!(f, "{:02}-{:02}", self.month, self.day),
        }
    }
}

/// Error parsing a [`BlackoutDate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid blackout date '{0}', expected YYYY-MM-DD or MM-DD")]
pub struct BlackoutDateError(String);

impl FromStr for BlackoutDate {
    type Err = BlackoutDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BlackoutDateError(s.to_owned());
        let parts = s
            .trim()
            .split('-')
            .map(str::parse::<i64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;

        let (year, month, day) = match parts.as_slice() {
            [year, month, day] => (Some(i32::try_from(*year).map_err(|_| invalid())?), *month, *day),
            [month, day] => (None, *month, *day),
            _ => return Err(invalid()),
        };

        let month = u32::try_from(month).map_err(|_| invalid())?;
        let day = u32::try_from(day).map_err(|_| invalid())?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(invalid());
        }

        let date = Self { year, month, day };
        if year.is_some() && date.to_date().is_none() {
            return Err(invalid());
        }
        Ok(date)
    }
}

impl Serialize for BlackoutDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlackoutDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An inclusive date range with no pickups, optionally repeating every year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlackoutRange {
    #[serde(alias = "fromDate")]
    pub from: BlackoutDate,
    #[serde(alias = "toDate")]
    pub to: BlackoutDate,
    #[serde(default)]
    pub repeated_annually: bool,
}

impl BlackoutRange {
    /// Whether `date` falls inside the range.
    ///
    /// Annual ranges (and ranges written without years) are re-anchored to
    /// the year of `date`; when `from` is later in the year than `to` the
    /// range wraps over new year.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        let anchored =
            self.repeated_annually || self.from.year.is_none() || self.to.year.is_none();

        if anchored {
            let day = (date.month(), date.day());
            let (from, to) = (self.from.month_day(), self.to.month_day());
            return if from <= to {
                from <= day && day <= to
            } else {
                day >= from || day <= to
            };
        }

        match (self.from.to_date(), self.to.to_date()) {
            (Some(from), Some(to)) => from <= date && date <= to,
            _ => false,
        }
    }
}

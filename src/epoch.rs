//! Fixed point calendar [Epoch]: integer Modified Julian Day
//! and a sub-day remainder counted in a chosen [Resolution].
use std::{
    fmt::Debug,
    hash::Hash,
    marker::PhantomData,
    ops::{Add, AddAssign, Sub},
};

use hifitime::Duration;

use crate::error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// MJD of 1901-01-01, origin of the 4-year cycle decomposition.
const MJD_1901: i64 = 15_385;

/// Days in a 4-year cycle (valid between 1901 and 2099).
const DAYS_PER_CYCLE: i64 = 1461;

/// Cumulated day count at the start of each month,
/// first row for regular years, second row for leap years.
const CUMULATED_DAYS: [[i64; 13]; 2] = [
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365],
    [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335, 366],
];

const MONTH_LENGTHS: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Sub-day [Resolution] of an [Epoch].
pub trait Resolution:
    Copy + Clone + Debug + Default + PartialEq + Eq + PartialOrd + Ord + Hash
{
    /// Number of units in one second.
    const PER_SECOND: i64;

    /// Number of units in one day.
    const PER_DAY: i64 = Self::PER_SECOND * SECONDS_PER_DAY;

    /// Number of decimal digits used to format sub-second units.
    const DIGITS: usize;
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Seconds;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Milliseconds;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Microseconds;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Nanoseconds;

impl Resolution for Seconds {
    const PER_SECOND: i64 = 1;
    const DIGITS: usize = 0;
}

impl Resolution for Milliseconds {
    const PER_SECOND: i64 = 1_000;
    const DIGITS: usize = 3;
}

impl Resolution for Microseconds {
    const PER_SECOND: i64 = 1_000_000;
    const DIGITS: usize = 6;
}

impl Resolution for Nanoseconds {
    const PER_SECOND: i64 = 1_000_000_000;
    const DIGITS: usize = 9;
}

/// Returns true if `year` is a leap year in the Gregorian calendar.
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns the number of days of given month (1..=12), or None
/// if the month does not exist.
pub fn month_length(year: i32, month: u8) -> Option<u8> {
    if !(1..=12).contains(&month) {
        return None;
    }

    let mut days = MONTH_LENGTHS[month as usize - 1];

    if month == 2 && is_leap_year(year) {
        days += 1;
    }

    Some(days)
}

/// Converts a calendar date to its Modified Julian Day number.
/// Fails when the month does not exist or the day exceeds the month length.
pub fn day_count(year: i32, month: u8, day: u8) -> Result<i64, Error> {
    let length = month_length(year, month)
        .ok_or_else(|| Error::InvalidCalendarField(format!("month {}", month)))?;

    if day == 0 || day > length {
        return Err(Error::InvalidCalendarField(format!(
            "day {} of {:04}-{:02}",
            day, year, month
        )));
    }

    let (y, m, d) = (year as i64, month as i64, day as i64);

    // truncating division
    let my = (m - 14) / 12;
    let ypmy = y + my;

    Ok((1461 * (ypmy + 4800)) / 4 + (367 * (m - 2 - 12 * my)) / 12
        - (3 * ((ypmy + 4900) / 100)) / 4
        + d
        - 2_432_076)
}

/// Converts a Modified Julian Day number back to (year, month, day).
/// Valid between 1901-01-01 and 2099-12-31.
pub fn calendar_date(mjd: i64) -> (i32, u8, u8) {
    let days = mjd - MJD_1901;
    let cycles = days / DAYS_PER_CYCLE;
    let days_left = days - DAYS_PER_CYCLE * cycles;

    let delta = days_left / 365 - days_left / 1460;
    let year = 1901 + 4 * cycles + delta;
    let yday = days_left - 365 * delta + 1;

    let leap = (year % 4 == 0) as usize;
    let guess = (yday as f64 * 0.032) as usize;
    let more = (yday - CUMULATED_DAYS[leap][guess + 1] > 0) as usize;

    let month = guess + more + 1;
    let mday = yday - CUMULATED_DAYS[leap][guess + more];

    (year as i32, month as u8, mday as u8)
}

/// [Epoch] represents an instant as a Modified Julian Day and a remainder,
/// counted in [Resolution] units, that is always within `[0, one day)`.
/// Two [Epoch]s are equal when they fall within the same [Resolution] tick.
///
/// ```
/// use gridex::prelude::*;
///
/// let mut t0: Epoch<Milliseconds> = Epoch::from_calendar(2022, 1, 2, 23, 30, 0.0)
///     .unwrap();
///
/// t0 += Duration::from_hours(1.0);
///
/// assert_eq!(t0.to_calendar(), (2022, 1, 3, 0, 30, 0.0));
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Epoch<U: Resolution = Milliseconds> {
    mjd: i64,
    units: i64,
    #[cfg_attr(feature = "serde", serde(skip))]
    resolution: PhantomData<U>,
}

impl<U: Resolution> Default for Epoch<U> {
    /// 2000-01-01T00:00:00
    fn default() -> Self {
        Self::from_mjd(51_544, 0)
    }
}

impl<U: Resolution> Epoch<U> {
    /// Builds a new [Epoch] from Modified Julian Day and sub-day units.
    /// `units` is normalized: any overflow is carried over to the day count.
    pub fn from_mjd(mjd: i64, units: i64) -> Self {
        let mut s = Self {
            mjd,
            units,
            resolution: PhantomData,
        };
        s.normalize();
        s
    }

    /// Builds a new [Epoch] from calendar fields. `seconds` may be fractional and is
    /// rounded to the nearest [Resolution] unit. Hour, minute and second overflows
    /// are carried over to the next day(s).
    pub fn from_calendar(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        seconds: f64,
    ) -> Result<Self, Error> {
        if !seconds.is_finite() {
            return Err(Error::InvalidCalendarField(format!("seconds {}", seconds)));
        }

        let mjd = day_count(year, month, day)?;

        let whole = (hour as i64 * 3600 + minute as i64 * 60) * U::PER_SECOND;
        let fraction = (seconds * U::PER_SECOND as f64).round() as i64;

        Ok(Self::from_mjd(mjd, whole + fraction))
    }

    /// Modified Julian Day.
    pub fn mjd(&self) -> i64 {
        self.mjd
    }

    /// Elapsed [Resolution] units within the day.
    pub fn units(&self) -> i64 {
        self.units
    }

    /// Elapsed fraction of the day, in `[0, 1)`.
    pub fn day_fraction(&self) -> f64 {
        self.units as f64 / U::PER_DAY as f64
    }

    /// Decomposes this [Epoch] into (year, month, day, hour, minute, seconds).
    pub fn to_calendar(&self) -> (i32, u8, u8, u8, u8, f64) {
        let (year, month, day) = calendar_date(self.mjd);
        let (hour, minute, second, sub) = self.time_of_day();
        let seconds = second as f64 + sub as f64 / U::PER_SECOND as f64;
        (year, month, day, hour, minute, seconds)
    }

    /// Day of year, starting at 1 on January 1st.
    pub fn day_of_year(&self) -> u16 {
        let (year, _, _) = calendar_date(self.mjd);
        // a year always starts on a valid date
        let jan1 = day_count(year, 1, 1).unwrap_or(self.mjd);
        (self.mjd - jan1 + 1) as u16
    }

    /// Carries remainder overflow (or underflow) to the day count,
    /// so that `0 <= units < one day`. Normalizing twice is a no-op.
    pub fn normalize(&mut self) {
        self.mjd += self.units.div_euclid(U::PER_DAY);
        self.units = self.units.rem_euclid(U::PER_DAY);
    }

    /// Adds (possibly negative) [Resolution] units to this [Epoch].
    pub fn add_units(&mut self, units: i64) {
        self.units += units;
        self.normalize();
    }

    /// Number of whole [Resolution] units in this [Duration], rounded towards minus infinity.
    pub fn duration_units(duration: Duration) -> i64 {
        let nanos = duration.total_nanoseconds() * U::PER_SECOND as i128;
        nanos.div_euclid(1_000_000_000) as i64
    }

    /// Adds a [Duration] to this [Epoch], truncated to the [Resolution].
    pub fn add_duration(&mut self, duration: Duration) {
        self.add_units(Self::duration_units(duration));
    }

    /// Returns the number of [Resolution] units elapsed since `rhs`.
    /// Negative when `rhs` is later than `self`.
    pub fn units_since(&self, rhs: &Self) -> i64 {
        (self.mjd - rhs.mjd) * U::PER_DAY + (self.units - rhs.units)
    }

    /// Converts this [Epoch] into a [hifitime::Epoch] expressed in UTC.
    pub fn to_hifitime_utc(&self) -> hifitime::Epoch {
        let (year, month, day) = calendar_date(self.mjd);
        let (hour, minute, second, sub) = self.time_of_day();
        let nanos = (sub as i128 * 1_000_000_000 / U::PER_SECOND as i128) as u32;
        hifitime::Epoch::from_gregorian_utc(year, month, day, hour, minute, second, nanos)
    }

    /// Builds an [Epoch] from a [hifitime::Epoch], expressed in UTC.
    /// Sub-resolution digits are truncated.
    pub fn from_hifitime_utc(epoch: hifitime::Epoch) -> Result<Self, Error> {
        let (year, month, day, hour, minute, second, nanos) = epoch.to_gregorian_utc();
        let mjd = day_count(year, month, day)?;

        let seconds = hour as i64 * 3600 + minute as i64 * 60 + second as i64;
        let sub = nanos as i64 * U::PER_SECOND / 1_000_000_000;

        Ok(Self::from_mjd(mjd, seconds * U::PER_SECOND + sub))
    }

    /// (hour, minute, second, sub-second units)
    fn time_of_day(&self) -> (u8, u8, u8, i64) {
        let seconds = self.units / U::PER_SECOND;
        let sub = self.units % U::PER_SECOND;
        (
            (seconds / 3600) as u8,
            ((seconds % 3600) / 60) as u8,
            (seconds % 60) as u8,
            sub,
        )
    }
}

impl<U: Resolution> AddAssign<Duration> for Epoch<U> {
    fn add_assign(&mut self, rhs: Duration) {
        self.add_duration(rhs);
    }
}

impl<U: Resolution> Add<Duration> for Epoch<U> {
    type Output = Self;
    fn add(mut self, rhs: Duration) -> Self {
        self.add_duration(rhs);
        self
    }
}

impl<U: Resolution> Sub for Epoch<U> {
    type Output = Duration;
    fn sub(self, rhs: Self) -> Duration {
        let units = self.units_since(&rhs) as i128;
        Duration::from_total_nanoseconds(units * 1_000_000_000 / U::PER_SECOND as i128)
    }
}

impl<U: Resolution> From<Epoch<U>> for hifitime::Epoch {
    fn from(epoch: Epoch<U>) -> Self {
        epoch.to_hifitime_utc()
    }
}

impl<U: Resolution> std::fmt::Display for Epoch<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (year, month, day) = calendar_date(self.mjd);
        let (hour, minute, second, sub) = self.time_of_day();

        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            year, month, day, hour, minute, second
        )?;

        if U::DIGITS > 0 {
            write!(f, ".{:0width$}", sub, width = U::DIGITS)?;
        }

        Ok(())
    }
}

impl<U: Resolution> Debug for Epoch<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} (MJD {} + {})", self, self.mjd, self.units)
    }
}

//! Applying a [`Duration`] to a point in time.
//!
//! Shifting runs in two phases:
//!
//! 1. **Calendar**: on the local wall clock, `year * 12 + month` selects the
//!    target month, then the original day of month plus `week * 7 + day` days
//!    is counted from its first day. A day past the end of a shorter month
//!    rolls forward, so Jan 31 + `P1M` is Mar 2 (or Mar 3 in a common year).
//!    The wall-clock result is resolved back into the original timezone, so
//!    `P1D` across a DST change keeps the same local time rather than adding
//!    24 hours.
//! 2. **Fixed**: `hour * 3600 + minute * 60 + second` seconds are added as an
//!    exact span.
//!
//! A phase whose component is all zero is skipped.

use chrono::offset::LocalResult;
use chrono::{DateTime, Datelike, Days, NaiveDate, Offset, TimeDelta, TimeZone};

use crate::duration::Duration;

/// Shift `input` by `duration`.
///
/// # Panics
///
/// Panics if the result falls outside the range chrono can represent, like
/// `DateTime + TimeDelta` does. Use [`checked_shift`] to handle that case.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use datespan::{parse_duration, shift};
///
/// let base = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
/// let d = parse_duration("P6Y1M7W2DT3H4M5S").unwrap();
/// assert_eq!(shift(&d, base), Utc.with_ymd_and_hms(2026, 3, 24, 3, 4, 5).unwrap());
/// ```
pub fn shift<Tz: TimeZone>(duration: &Duration, input: DateTime<Tz>) -> DateTime<Tz> {
    checked_shift(duration, input).expect("duration shift overflowed the supported date range")
}

/// Shift `input` by `duration`, returning `None` on overflow.
pub fn checked_shift<Tz: TimeZone>(duration: &Duration, input: DateTime<Tz>) -> Option<DateTime<Tz>> {
    let mut output = input;

    if !duration.is_date_zero() {
        output = add_calendar(output, duration)?;
    }

    if !duration.is_time_zero() {
        let seconds = i64::try_from(duration.time_seconds()).ok()?;
        output = output.checked_add_signed(TimeDelta::try_seconds(seconds)?)?;
    }

    Some(output)
}

/// Calendar phase: pick the target month, then count days from its first day.
fn add_calendar<Tz: TimeZone>(input: DateTime<Tz>, duration: &Duration) -> Option<DateTime<Tz>> {
    let zone = input.timezone();
    let offset = input.offset().fix();
    let local = input.naive_local();
    let date = local.date();

    let months = i64::from(date.year()) * 12
        + i64::from(date.month0())
        + i64::from(duration.year) * 12
        + i64::from(duration.month);
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month0 = u32::try_from(months.rem_euclid(12)).ok()?;

    let wall = NaiveDate::from_ymd_opt(year, month0 + 1, 1)?
        .checked_add_days(Days::new(u64::from(date.day0()) + duration.total_days()))?
        .and_time(local.time());

    match zone.from_local_datetime(&wall) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        // Wall clock landed in a DST gap: read it with the pre-shift offset.
        LocalResult::None => Some(zone.from_utc_datetime(&wall.checked_sub_offset(offset)?)),
    }
}

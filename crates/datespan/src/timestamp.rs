//! Timestamps with a selectable wire encoding.
//!
//! A [`Timestamp`] pairs an instant with a [`DisplayMode`] that decides how
//! it is encoded: RFC 3339 text at second, millisecond or nanosecond
//! precision, integer Unix seconds or milliseconds, or a custom strftime
//! pattern.
//!
//! Decoding does not depend on the mode that produced the payload. A numeric
//! payload is read as (possibly fractional) seconds since the Unix epoch;
//! anything else must be RFC 3339 text. Decoded timestamps are in UTC and
//! always use [`DisplayMode::SecondsIso8601`], so only the instant survives
//! a round trip.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, trace};

use crate::duration::Duration;
use crate::error::{DatespanError, Result};
use crate::shift::checked_shift;
use crate::timezone::TimezoneCache;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

// ── DisplayMode ─────────────────────────────────────────────────────────────

/// How a [`Timestamp`] is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    /// `2020-01-01T08:00:00+08:00`
    #[default]
    SecondsIso8601,
    /// `2020-01-01T08:00:00.12+08:00` (up to 3 fractional digits)
    MillisecondsIso8601,
    /// `2020-01-01T08:00:00.123456789+08:00` (up to 9 fractional digits)
    Iso8601,
    /// `1577836800`
    UnixTimestamp,
    /// `1577836800123`
    MillisecondsTimestamp,
    /// Formatted with the timestamp's strftime pattern.
    Custom,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 6] = [
        DisplayMode::SecondsIso8601,
        DisplayMode::MillisecondsIso8601,
        DisplayMode::Iso8601,
        DisplayMode::UnixTimestamp,
        DisplayMode::MillisecondsTimestamp,
        DisplayMode::Custom,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            DisplayMode::SecondsIso8601 => "seconds-iso8601",
            DisplayMode::MillisecondsIso8601 => "milliseconds-iso8601",
            DisplayMode::Iso8601 => "iso8601",
            DisplayMode::UnixTimestamp => "unix-timestamp",
            DisplayMode::MillisecondsTimestamp => "milliseconds-timestamp",
            DisplayMode::Custom => "custom",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DisplayMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = DisplayMode::ALL.iter().map(|m| m.name()).collect();
                format!("unknown display mode '{s}', expected one of: {}", names.join(", "))
            })
    }
}

// ── Encoded ─────────────────────────────────────────────────────────────────

/// An encoded timestamp: a number for the Unix modes, text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Encoded {
    Integer(i64),
    Text(String),
}

impl fmt::Display for Encoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoded::Integer(value) => write!(f, "{value}"),
            Encoded::Text(text) => f.write_str(text),
        }
    }
}

// ── Timestamp ───────────────────────────────────────────────────────────────

/// An instant plus its presentation settings.
///
/// The instant keeps the UTC offset it was created with. When it was placed
/// in a named zone ([`Timestamp::zoned`], [`Timestamp::with_timezone`],
/// [`Timestamp::parse_in_timezone`]) that zone is remembered too, so calendar
/// shifts follow its DST rules.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use datespan::{DisplayMode, Timestamp};
///
/// let ts = Timestamp::new(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
/// assert_eq!(ts.to_string(), "2020-01-01T00:00:00Z");
///
/// let unix = ts.with_display(DisplayMode::UnixTimestamp);
/// assert_eq!(unix.to_string(), "1577836800");
///
/// let back: Timestamp = "1577836800".parse().unwrap();
/// assert_eq!(back.instant(), unix.instant());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    instant: DateTime<FixedOffset>,
    zone: Option<Tz>,
    display: DisplayMode,
    format: String,
}

impl Timestamp {
    /// Wrap an instant, keeping its UTC offset.
    pub fn new<Z: TimeZone>(instant: DateTime<Z>) -> Self {
        Self {
            instant: instant.fixed_offset(),
            zone: None,
            display: DisplayMode::default(),
            format: String::new(),
        }
    }

    /// Wrap an instant in a named zone.
    pub fn zoned(instant: DateTime<Tz>) -> Self {
        Self {
            zone: Some(instant.timezone()),
            ..Self::new(instant)
        }
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Parse RFC 3339 text, or text matching a strftime `format`.
    ///
    /// A `format` without an offset specifier is read as UTC wall-clock time;
    /// a date-only `format` yields midnight.
    ///
    /// # Errors
    ///
    /// Returns [`DatespanError::InvalidDatetime`] if `value` does not match.
    pub fn parse(value: &str, format: Option<&str>) -> Result<Self> {
        let instant = match format {
            None => parse_rfc3339(value)?,
            Some(pattern) => match DateTime::parse_from_str(value, pattern) {
                Ok(instant) => instant,
                Err(_) => parse_wall_clock(value, pattern)?.and_utc().fixed_offset(),
            },
        };
        Ok(Self::new(instant))
    }

    /// Parse text in a named zone. An empty `timezone` means UTC.
    ///
    /// Text carrying its own offset keeps that instant and is re-expressed in
    /// the zone; wall-clock text is interpreted in the zone (the earlier
    /// reading wins for ambiguous times).
    ///
    /// # Errors
    ///
    /// Returns [`DatespanError::InvalidTimezone`] for an unknown zone, or
    /// [`DatespanError::InvalidDatetime`] if `value` does not match or names a
    /// local time skipped by a DST transition.
    pub fn parse_in_timezone(
        value: &str,
        timezone: &str,
        format: Option<&str>,
        cache: &TimezoneCache,
    ) -> Result<Self> {
        let zone = if timezone.is_empty() {
            Tz::UTC
        } else {
            cache.resolve(timezone)?
        };

        let with_offset = match format {
            None => Some(parse_rfc3339(value)?),
            Some(pattern) => DateTime::parse_from_str(value, pattern).ok(),
        };
        if let Some(instant) = with_offset {
            return Ok(Self::zoned(instant.with_timezone(&zone)));
        }

        // `format` is Some here: RFC 3339 always carries an offset.
        let pattern = format.unwrap_or_default();
        let wall = parse_wall_clock(value, pattern)?;
        let instant = zone.from_local_datetime(&wall).earliest().ok_or_else(|| {
            DatespanError::InvalidDatetime(format!("'{value}' does not exist in {timezone}"))
        })?;
        Ok(Self::zoned(instant))
    }

    /// Set the display mode. The instant is unchanged.
    #[must_use]
    pub fn with_display(mut self, display: DisplayMode) -> Self {
        self.display = display;
        self
    }

    /// Use a strftime pattern for encoding; switches to [`DisplayMode::Custom`].
    ///
    /// # Errors
    ///
    /// Returns [`DatespanError::InvalidFormat`] if the pattern contains an
    /// unknown or incomplete specifier, or one that parses but cannot be
    /// rendered (such as `%#z`).
    pub fn with_format(mut self, format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        if !is_renderable(&format) {
            debug!(format = %format, "rejected strftime pattern");
            return Err(DatespanError::InvalidFormat(format!("'{format}'")));
        }
        self.display = DisplayMode::Custom;
        self.format = format;
        Ok(self)
    }

    /// Re-express the instant in a named zone.
    ///
    /// # Errors
    ///
    /// Returns [`DatespanError::InvalidTimezone`] if the name is unknown.
    pub fn with_timezone(self, timezone: &str, cache: &TimezoneCache) -> Result<Self> {
        let zone = cache.resolve(timezone)?;
        Ok(Self {
            instant: self.instant.with_timezone(&zone).fixed_offset(),
            zone: Some(zone),
            ..self
        })
    }

    /// Shift by `duration`, keeping the display settings.
    ///
    /// # Panics
    ///
    /// Panics if the result is out of range; see [`crate::shift::shift`].
    #[must_use]
    pub fn shifted(&self, duration: &Duration) -> Self {
        self.checked_shifted(duration)
            .expect("duration shift overflowed the supported date range")
    }

    /// Shift by `duration`, returning `None` if the result is out of range.
    pub fn checked_shifted(&self, duration: &Duration) -> Option<Self> {
        let instant = match self.zone {
            Some(zone) => {
                checked_shift(duration, self.instant.with_timezone(&zone))?.fixed_offset()
            }
            None => checked_shift(duration, self.instant)?,
        };
        Some(Self {
            instant,
            ..self.clone()
        })
    }

    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    pub fn to_utc(&self) -> DateTime<Utc> {
        self.instant.to_utc()
    }

    pub fn zone(&self) -> Option<Tz> {
        self.zone
    }

    pub fn display(&self) -> DisplayMode {
        self.display
    }

    /// The strftime pattern; only used under [`DisplayMode::Custom`].
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Encode according to the display mode.
    pub fn encode(&self) -> Encoded {
        match self.display {
            DisplayMode::SecondsIso8601 => Encoded::Text(rfc3339(&self.instant, 0)),
            DisplayMode::MillisecondsIso8601 => Encoded::Text(rfc3339(&self.instant, 3)),
            DisplayMode::Iso8601 => Encoded::Text(rfc3339(&self.instant, 9)),
            DisplayMode::UnixTimestamp => Encoded::Integer(self.instant.timestamp()),
            DisplayMode::MillisecondsTimestamp => {
                Encoded::Integer(self.instant.timestamp_millis())
            }
            DisplayMode::Custom => Encoded::Text(self.instant.format(&self.format).to_string()),
        }
    }

    /// Build from fractional seconds since the Unix epoch.
    ///
    /// The whole part is seconds; the fractional part, floored to
    /// nanoseconds, is the sub-second component.
    ///
    /// # Errors
    ///
    /// Returns [`DatespanError::OutOfRange`] for non-finite values or values
    /// beyond chrono's supported range.
    pub fn from_epoch_seconds(value: f64) -> Result<Self> {
        let out_of_range = || DatespanError::OutOfRange(format!("{value} seconds since epoch"));
        if !value.is_finite() {
            return Err(out_of_range());
        }
        let seconds = value.floor();
        if seconds < i64::MIN as f64 || seconds >= i64::MAX as f64 {
            return Err(out_of_range());
        }
        let nanos = (((value - seconds) * NANOS_PER_SECOND).floor() as u32).min(999_999_999);
        let instant = DateTime::from_timestamp(seconds as i64, nanos).ok_or_else(out_of_range)?;
        Ok(Self::new(instant))
    }

    fn from_epoch_whole_seconds(value: i64) -> Result<Self> {
        DateTime::from_timestamp(value, 0)
            .map(Self::new)
            .ok_or_else(|| DatespanError::OutOfRange(format!("{value} seconds since epoch")))
    }
}

impl Default for Timestamp {
    /// The Unix epoch.
    fn default() -> Self {
        Self::new(DateTime::<Utc>::default())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::new(instant)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        Self::new(instant)
    }
}

impl From<DateTime<Tz>> for Timestamp {
    fn from(instant: DateTime<Tz>) -> Self {
        Self::zoned(instant)
    }
}

/// The textual encoding; Unix modes print as decimal integers.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.encode(), f)
    }
}

impl FromStr for Timestamp {
    type Err = DatespanError;

    fn from_str(s: &str) -> Result<Self> {
        decode_timestamp(s)
    }
}

// ── free functions ──────────────────────────────────────────────────────────

/// Encode `timestamp` according to its display mode.
pub fn encode_timestamp(timestamp: &Timestamp) -> Encoded {
    timestamp.encode()
}

/// Decode a timestamp from text, trying a number first, then RFC 3339.
///
/// # Errors
///
/// Returns [`DatespanError::UnrecognizedTimestamp`] if the payload is neither,
/// or [`DatespanError::OutOfRange`] for a number chrono cannot represent.
///
/// # Examples
///
/// ```
/// use datespan::decode_timestamp;
///
/// let a = decode_timestamp("1577836800.5").unwrap();
/// let b = decode_timestamp("2020-01-01T00:00:00.5Z").unwrap();
/// assert_eq!(a.instant(), b.instant());
/// ```
pub fn decode_timestamp(payload: &str) -> Result<Timestamp> {
    if let Ok(seconds) = payload.parse::<i64>() {
        trace!(payload, "decoding timestamp as integer epoch seconds");
        return Timestamp::from_epoch_whole_seconds(seconds);
    }
    if let Some(seconds) = payload.parse::<f64>().ok().filter(|v| v.is_finite()) {
        trace!(payload, "decoding timestamp as fractional epoch seconds");
        return Timestamp::from_epoch_seconds(seconds);
    }

    match DateTime::parse_from_rfc3339(payload) {
        Ok(instant) => {
            trace!(payload, "decoding timestamp as RFC 3339");
            Ok(Timestamp::new(instant.to_utc()))
        }
        Err(err) => {
            debug!(payload, error = %err, "unrecognized timestamp");
            Err(DatespanError::UnrecognizedTimestamp(payload.to_string()))
        }
    }
}

/// Decode a timestamp from raw bytes. See [`decode_timestamp`].
///
/// # Errors
///
/// Non-UTF-8 input fails with [`DatespanError::UnrecognizedTimestamp`].
pub fn decode_bytes(payload: &[u8]) -> Result<Timestamp> {
    match std::str::from_utf8(payload) {
        Ok(text) => decode_timestamp(text),
        Err(_) => Err(DatespanError::UnrecognizedTimestamp(
            String::from_utf8_lossy(payload).into_owned(),
        )),
    }
}

// ── serde ───────────────────────────────────────────────────────────────────

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.encode().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = Timestamp;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("seconds since the Unix epoch or an RFC 3339 timestamp")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Timestamp, E> {
                Timestamp::from_epoch_whole_seconds(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Timestamp, E> {
                let v = i64::try_from(v)
                    .map_err(|_| E::custom(format!("{v} seconds since epoch is out of range")))?;
                self.visit_i64(v)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Timestamp, E> {
                Timestamp::from_epoch_seconds(v).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Timestamp, E> {
                decode_timestamp(v).map_err(E::custom)
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<Timestamp, E> {
                decode_bytes(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

// ── internal helpers ────────────────────────────────────────────────────────

/// Whether `format` parses as strftime and renders without error.
fn is_renderable(format: &str) -> bool {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return false;
    }
    let sample = DateTime::<Utc>::default().fixed_offset();
    let mut rendered = String::new();
    write!(rendered, "{}", sample.format_with_items(items.iter())).is_ok()
}

fn parse_rfc3339(value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| DatespanError::InvalidDatetime(format!("'{value}': {e}")))
}

/// Parse offset-less text as a wall-clock datetime, or a date at midnight.
fn parse_wall_clock(value: &str, pattern: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, pattern)
        .or_else(|_| {
            NaiveDate::parse_from_str(value, pattern).map(|date| date.and_time(Default::default()))
        })
        .map_err(|e| {
            DatespanError::InvalidDatetime(format!("'{value}' with format '{pattern}': {e}"))
        })
}

/// RFC 3339 with up to `digits` fractional digits, trailing zeros trimmed,
/// and `Z` for a zero offset.
fn rfc3339(instant: &DateTime<FixedOffset>, digits: u32) -> String {
    let mut out = instant.format("%Y-%m-%dT%H:%M:%S").to_string();

    if digits > 0 {
        // Leap seconds carry nanos >= 1e9.
        let nanos = instant.timestamp_subsec_nanos() % 1_000_000_000;
        let scaled = nanos / 10u32.pow(9 - digits);
        if scaled != 0 {
            let fraction = format!("{scaled:0width$}", width = digits as usize);
            out.push('.');
            out.push_str(fraction.trim_end_matches('0'));
        }
    }

    if instant.offset().local_minus_utc() == 0 {
        out.push('Z');
    } else {
        out.push_str(&instant.format("%:z").to_string());
    }
    out
}

//! # datespan
//!
//! Calendar durations and timestamps with selectable wire encodings.
//!
//! Parses ISO 8601 durations like `P6Y1M7W2DT3H4M5S`, applies them to
//! points in time with calendar semantics for the date part and exact
//! seconds for the time part, and moves timestamps across serialization
//! boundaries as RFC 3339 text or Unix epoch numbers.
//!
//! ## Modules
//!
//! - [`duration`]: ISO 8601 duration string → [`Duration`] and back
//! - [`shift`]: Apply a [`Duration`] to a `chrono::DateTime`
//! - [`timestamp`]: [`Timestamp`] with [`DisplayMode`]-driven encoding and auto-detecting decoding
//! - [`timezone`]: Shared IANA timezone cache
//! - [`error`]: Error types

pub mod duration;
pub mod error;
pub mod shift;
pub mod timestamp;
pub mod timezone;

pub use duration::{parse_duration, Duration};
pub use error::{DatespanError, Result};
pub use shift::{checked_shift, shift};
pub use timestamp::{
    decode_bytes, decode_timestamp, encode_timestamp, DisplayMode, Encoded, Timestamp,
};
pub use timezone::TimezoneCache;

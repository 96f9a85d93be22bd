use chrono::{DateTime, TimeZone, Utc};
use datespan::{decode_timestamp, parse_duration, shift, DisplayMode, Duration, Timestamp};
use proptest::prelude::*;

const MAX_FIELD: u32 = i32::MAX as u32;

fn any_duration() -> impl Strategy<Value = Duration> {
    (
        0..=MAX_FIELD,
        0..=MAX_FIELD,
        0..=MAX_FIELD,
        0..=MAX_FIELD,
        0..=MAX_FIELD,
        0..=MAX_FIELD,
        0..=MAX_FIELD,
    )
        .prop_map(|(year, month, week, day, hour, minute, second)| Duration {
            year,
            month,
            week,
            day,
            hour,
            minute,
            second,
        })
}

/// Durations small enough to stay inside chrono's range from any 20th/21st century base.
fn small_duration() -> impl Strategy<Value = Duration> {
    (0..50u32, 0..600u32, 0..520u32, 0..3650u32, 0..1000u32, 0..10_000u32, 0..100_000u32)
        .prop_map(|(year, month, week, day, hour, minute, second)| Duration {
            year,
            month,
            week,
            day,
            hour,
            minute,
            second,
        })
}

fn any_base() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_102_444_800).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

proptest! {
    #[test]
    fn prop_render_then_parse_is_identity(d in any_duration()) {
        let token = d.to_string();
        prop_assert_eq!(parse_duration(&token).unwrap(), d);
    }

    #[test]
    fn prop_parse_never_panics(s in "\\PC*") {
        let _ = parse_duration(&s);
    }

    #[test]
    fn prop_parse_grammar_strings(
        y in proptest::option::of(0u32..10_000),
        m in proptest::option::of(0u32..10_000),
        w in proptest::option::of(0u32..10_000),
        d in proptest::option::of(0u32..10_000),
        h in proptest::option::of(0u32..10_000),
        mi in proptest::option::of(0u32..10_000),
        s in proptest::option::of(0u32..10_000),
    ) {
        let mut token = String::from("P");
        for (value, designator) in [(y, 'Y'), (m, 'M'), (w, 'W'), (d, 'D')] {
            if let Some(v) = value {
                token.push_str(&format!("{v}{designator}"));
            }
        }
        if h.is_some() || mi.is_some() || s.is_some() {
            token.push('T');
            for (value, designator) in [(h, 'H'), (mi, 'M'), (s, 'S')] {
                if let Some(v) = value {
                    token.push_str(&format!("{v}{designator}"));
                }
            }
        }

        let parsed = parse_duration(&token).unwrap();
        prop_assert_eq!(parsed.year, y.unwrap_or(0));
        prop_assert_eq!(parsed.month, m.unwrap_or(0));
        prop_assert_eq!(parsed.week, w.unwrap_or(0));
        prop_assert_eq!(parsed.day, d.unwrap_or(0));
        prop_assert_eq!(parsed.hour, h.unwrap_or(0));
        prop_assert_eq!(parsed.minute, mi.unwrap_or(0));
        prop_assert_eq!(parsed.second, s.unwrap_or(0));
    }

    #[test]
    fn prop_zero_shift_is_identity(base in any_base()) {
        prop_assert_eq!(shift(&Duration::ZERO, base), base);
    }

    #[test]
    fn prop_shift_never_moves_backwards(d in small_duration(), base in any_base()) {
        prop_assert!(shift(&d, base) >= base);
    }

    #[test]
    fn prop_time_component_is_exact(
        hour in 0u32..10_000,
        minute in 0u32..10_000,
        second in 0u32..100_000,
        base in any_base(),
    ) {
        let d = Duration { hour, minute, second, ..Duration::ZERO };
        let shifted = shift(&d, base);
        prop_assert_eq!((shifted - base).num_seconds(), d.time_seconds() as i64);
    }

    #[test]
    fn prop_days_are_exact_in_utc(week in 0u32..1000, day in 0u32..10_000, base in any_base()) {
        let d = Duration { week, day, ..Duration::ZERO };
        let shifted = shift(&d, base);
        prop_assert_eq!((shifted - base).num_days(), d.total_days() as i64);
    }

    #[test]
    fn prop_seconds_iso8601_round_trip(base in any_base()) {
        let ts = Timestamp::new(base).with_display(DisplayMode::SecondsIso8601);
        let decoded = decode_timestamp(&ts.to_string()).unwrap();
        prop_assert_eq!(decoded.to_utc(), base);
    }

    #[test]
    fn prop_unix_timestamp_round_trip(secs in -62_135_596_800i64..253_402_300_799) {
        let base = Utc.timestamp_opt(secs, 0).unwrap();
        let ts = Timestamp::new(base).with_display(DisplayMode::UnixTimestamp);
        let decoded = decode_timestamp(&ts.to_string()).unwrap();
        prop_assert_eq!(decoded.to_utc().timestamp(), secs);
        prop_assert_eq!(decoded.display(), DisplayMode::SecondsIso8601);
    }

    #[test]
    fn prop_iso8601_round_trip_keeps_nanos(base in any_base(), nanos in 0u32..1_000_000_000) {
        let instant = Utc.timestamp_opt(base.timestamp(), nanos).unwrap();
        let ts = Timestamp::new(instant).with_display(DisplayMode::Iso8601);
        let decoded = decode_timestamp(&ts.to_string()).unwrap();
        prop_assert_eq!(decoded.to_utc(), instant);
    }
}

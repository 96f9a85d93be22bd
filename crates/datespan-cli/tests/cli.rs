use assert_cmd::Command;
use predicates::prelude::*;

fn datespan() -> Command {
    Command::cargo_bin("datespan").unwrap()
}

// ── parse ───────────────────────────────────────────────────────────────────

#[test]
fn test_parse_prints_fields() {
    let output = datespan()
        .args(["parse", "P6Y1M7W2DT3H4M5S"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let fields: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(fields["year"], 6);
    assert_eq!(fields["month"], 1);
    assert_eq!(fields["week"], 7);
    assert_eq!(fields["day"], 2);
    assert_eq!(fields["hour"], 3);
    assert_eq!(fields["minute"], 4);
    assert_eq!(fields["second"], 5);
    assert_eq!(fields["canonical"], "P6Y1M7W2DT3H4M5S");
}

#[test]
fn test_parse_malformed_fails() {
    datespan()
        .args(["parse", "PT1S1H"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed duration string"));
}

// ── shift ───────────────────────────────────────────────────────────────────

#[test]
fn test_shift_from_base() {
    datespan()
        .args(["shift", "P6Y1M7W2DT3H4M5S", "--from", "2020-01-01T00:00:00Z"])
        .assert()
        .success()
        .stdout("2026-03-24T03:04:05Z\n");
}

#[test]
fn test_shift_unix_display() {
    datespan()
        .args([
            "shift",
            "P1D",
            "--from",
            "2020-01-01T00:00:00Z",
            "--display",
            "unix-timestamp",
        ])
        .assert()
        .success()
        .stdout("1577923200\n");
}

#[test]
fn test_shift_in_timezone_keeps_wall_clock() {
    datespan()
        .args([
            "shift",
            "P1D",
            "--from",
            "2026-03-08T03:00:00Z",
            "--timezone",
            "America/New_York",
        ])
        .assert()
        .success()
        .stdout("2026-03-08T22:00:00-04:00\n");
}

#[test]
fn test_shift_custom_format() {
    datespan()
        .args([
            "shift",
            "PT90M",
            "--from",
            "2020-01-01T00:00:00Z",
            "--format",
            "%Y/%m/%d %H:%M",
        ])
        .assert()
        .success()
        .stdout("2020/01/01 01:30\n");
}

#[test]
fn test_shift_unrenderable_format_fails() {
    datespan()
        .args([
            "shift",
            "PT1H",
            "--from",
            "2020-01-01T00:00:00Z",
            "--format",
            "%#z",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
}

#[test]
fn test_shift_without_base_uses_now() {
    datespan().args(["shift", "P1D"]).assert().success();
}

#[test]
fn test_shift_bad_base_fails() {
    datespan()
        .args(["shift", "P1D", "--from", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot parse base timestamp"));
}

// ── decode ──────────────────────────────────────────────────────────────────

#[test]
fn test_decode_epoch_seconds() {
    datespan()
        .args(["decode", "1577836800"])
        .assert()
        .success()
        .stdout("2020-01-01T00:00:00Z\n");
}

#[test]
fn test_decode_to_milliseconds() {
    datespan()
        .args([
            "decode",
            "2020-01-01T08:00:00.5+08:00",
            "--display",
            "milliseconds-timestamp",
        ])
        .assert()
        .success()
        .stdout("1577836800500\n");
}

#[test]
fn test_decode_unrecognized_fails() {
    datespan()
        .args(["decode", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a recognized timestamp"));
}

#[test]
fn test_unknown_display_mode_fails() {
    datespan()
        .args(["decode", "0", "--display", "rfc2822"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown display mode"));
}

#[test]
fn test_invalid_timezone_fails() {
    datespan()
        .args(["decode", "0", "--timezone", "Mars/Base"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone"));
}

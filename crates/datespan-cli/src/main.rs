//! Command-line front end for datespan.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use datespan::{decode_timestamp, parse_duration, DisplayMode, Timestamp, TimezoneCache};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datespan")]
#[command(version, about = "Parse ISO 8601 durations, shift timestamps, and re-encode them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a duration and print its fields as JSON
    Parse {
        /// Duration such as P1Y2M3DT4H5M6S
        duration: String,
    },

    /// Shift a timestamp by a duration
    Shift {
        /// Duration such as P1M or PT90M
        duration: String,

        /// RFC 3339 base timestamp (default: now)
        #[arg(long)]
        from: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Decode epoch seconds or RFC 3339 text and re-encode it
    Decode {
        /// Payload such as 1577836800 or 2020-01-01T00:00:00Z
        payload: String,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Encoding of the printed timestamp
    #[arg(long, default_value_t = DisplayMode::SecondsIso8601)]
    display: DisplayMode,

    /// strftime pattern for the output (implies --display custom)
    #[arg(long)]
    format: Option<String>,

    /// IANA timezone to express the timestamp in
    #[arg(long)]
    timezone: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cache = TimezoneCache::new();

    match cli.command {
        Command::Parse { duration } => {
            let parsed = parse_duration(&duration)
                .with_context(|| format!("cannot parse duration '{duration}'"))?;
            let fields = json!({
                "year": parsed.year,
                "month": parsed.month,
                "week": parsed.week,
                "day": parsed.day,
                "hour": parsed.hour,
                "minute": parsed.minute,
                "second": parsed.second,
                "canonical": parsed.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
        Command::Shift {
            duration,
            from,
            output,
        } => {
            let parsed = parse_duration(&duration)
                .with_context(|| format!("cannot parse duration '{duration}'"))?;
            let base = match from {
                Some(text) => Timestamp::parse(&text, None)
                    .with_context(|| format!("cannot parse base timestamp '{text}'"))?,
                None => Timestamp::now(),
            };
            // Calendar shifts follow the output zone's DST rules.
            let base = in_zone(base, &output, &cache)?;
            let shifted = base.checked_shifted(&parsed).with_context(|| {
                format!("shifting {base} by {parsed} leaves the supported range")
            })?;
            debug!(%base, %shifted, "shifted timestamp");
            println!("{}", render(shifted, &output, &cache)?);
        }
        Command::Decode { payload, output } => {
            let decoded = decode_timestamp(&payload)?;
            println!("{}", render(decoded, &output, &cache)?);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn in_zone(ts: Timestamp, output: &OutputArgs, cache: &TimezoneCache) -> Result<Timestamp> {
    match &output.timezone {
        Some(name) => Ok(ts.with_timezone(name, cache)?),
        None => Ok(ts),
    }
}

fn render(ts: Timestamp, output: &OutputArgs, cache: &TimezoneCache) -> Result<String> {
    let ts = in_zone(ts, output, cache)?.with_display(output.display);
    let ts = match &output.format {
        Some(pattern) => ts.with_format(pattern.as_str())?,
        None => ts,
    };
    Ok(ts.to_string())
}

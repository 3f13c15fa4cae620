//! Compact duration strings (`"20m"`, `"30d"`, `"1.5h"`, `"3600"`)
//!
//! Supported units: `ms`, `s`, `m`, `h`, `d`, `w`, `y` (365.25 days), plus
//! their long forms (`minutes`, `days`, ...). A bare number is seconds.

use crate::core::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serializer};
use std::sync::OnceLock;
use std::time::Duration;

const SECOND_MS: f64 = 1_000.0;
const MINUTE_MS: f64 = SECOND_MS * 60.0;
const HOUR_MS: f64 = MINUTE_MS * 60.0;
const DAY_MS: f64 = HOUR_MS * 24.0;
const WEEK_MS: f64 = DAY_MS * 7.0;
const YEAR_MS: f64 = DAY_MS * 365.25;

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?|\.\d+)\s*([a-z]*)\s*$").expect("duration regex is valid")
    })
}

/// Parse a compact duration string
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidValue {
        field: "duration".to_string(),
        value: input.to_string(),
        message: message.to_string(),
    };

    let captures = duration_regex()
        .captures(input)
        .ok_or_else(|| invalid("expected a number followed by an optional unit"))?;

    let amount: f64 = captures[1]
        .parse()
        .map_err(|_| invalid("amount is not a number"))?;

    let unit = captures[2].to_ascii_lowercase();
    let factor = match unit.as_str() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => SECOND_MS,
        "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "m" | "min" | "mins" | "minute" | "minutes" => MINUTE_MS,
        "h" | "hr" | "hrs" | "hour" | "hours" => HOUR_MS,
        "d" | "day" | "days" => DAY_MS,
        "w" | "week" | "weeks" => WEEK_MS,
        "y" | "yr" | "yrs" | "year" | "years" => YEAR_MS,
        _ => return Err(invalid("unknown unit")),
    };

    Ok(Duration::from_millis((amount * factor).round() as u64))
}

/// Format a duration in the largest unit that divides it exactly
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    let units: [(u128, &str); 5] = [
        (WEEK_MS as u128, "w"),
        (DAY_MS as u128, "d"),
        (HOUR_MS as u128, "h"),
        (MINUTE_MS as u128, "m"),
        (SECOND_MS as u128, "s"),
    ];

    if ms == 0 {
        return "0s".to_string();
    }
    for (size, suffix) in units {
        if ms % size == 0 {
            return format!("{}{}", ms / size, suffix);
        }
    }
    format!("{}ms", ms)
}

/// Serde adapter for `Duration` fields written as compact strings
///
/// Integers are accepted as seconds.
pub mod serde_duration {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Seconds(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
            Raw::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
        }
    }
}

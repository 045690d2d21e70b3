//! Human-readable durations for config values like `timeout = "10s"`.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{de, Deserialize, Deserializer};

/// Parse a duration string like "750ms", "10s", "2m" or "1h".
///
/// The input is case-insensitive and whitespace is trimmed.
///
/// ```
/// use walletfolio::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
/// assert_eq!(parse_duration("750ms").unwrap(), Duration::from_millis(750));
/// ```
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .context("Duration must end with ms, s, m, or h")?;
    let (num, unit) = s.split_at(split);
    let num: u64 = num.parse().context("Invalid number in duration")?;

    let millis = match unit.trim() {
        "ms" => Some(num),
        "s" => num.checked_mul(1_000),
        "m" => num.checked_mul(60_000),
        "h" => num.checked_mul(3_600_000),
        other => bail!("Unknown duration unit: {other}"),
    };

    millis
        .map(Duration::from_millis)
        .context("Duration is too large")
}

/// Serde deserializer for duration strings.
///
/// Use with `#[serde(deserialize_with = "deserialize_duration")]`.
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(de::Error::custom)
}

//! Human-readable duration strings (`"7d"`, `"3600s"`, `"2 hours"`).
//!
//! Used by configuration for every `*_EXPIRES_IN` / delay key and by the token
//! service to compute expiry claims.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(\d+)\s*([a-z]+)$").expect("duration pattern is a valid regex")
});

const SECOND: u64 = 1_000;
const MINUTE: u64 = SECOND * 60;
const HOUR: u64 = MINUTE * 60;
const DAY: u64 = HOUR * 24;
const WEEK: u64 = DAY * 7;
// 365.25 days
const YEAR: u64 = DAY * 365 + HOUR * 6;

/// Why a duration string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("duration is empty")]
    Empty,
    #[error("invalid time format '{0}' (e.g. \"30d\", \"1h\", \"3600s\")")]
    Malformed(String),
    #[error("unknown time unit '{unit}' in '{input}'")]
    UnknownUnit { input: String, unit: String },
    #[error("duration '{0}' is too large")]
    Overflow(String),
}

/// Parses `<integer><unit>` into milliseconds.
///
/// Units are case-insensitive and accept short and long forms
/// (`ms`, `s`, `sec`, `m`, `min`, `h`, `hr`, `d`, `day`, `w`, `week`, `y`, `yr`,
/// plus their plurals). A bare number without a unit is rejected.
///
/// # Errors
///
/// Returns [`DurationError`] for empty input, a missing or unknown unit, a
/// non-integer amount, or a value that does not fit in `u64` milliseconds.
pub fn parse_duration_ms(input: &str) -> Result<u64, DurationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DurationError::Empty);
    }

    let caps = DURATION_REGEX
        .captures(trimmed)
        .ok_or_else(|| DurationError::Malformed(input.to_string()))?;

    let amount: u64 = caps[1]
        .parse()
        .map_err(|_| DurationError::Overflow(input.to_string()))?;
    let unit = caps[2].to_ascii_lowercase();

    let factor = unit_factor(&unit).ok_or_else(|| DurationError::UnknownUnit {
        input: input.to_string(),
        unit: unit.clone(),
    })?;

    amount
        .checked_mul(factor)
        .ok_or_else(|| DurationError::Overflow(input.to_string()))
}

fn unit_factor(unit: &str) -> Option<u64> {
    let factor = match unit {
        "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1,
        "s" | "sec" | "secs" | "second" | "seconds" => SECOND,
        "m" | "min" | "mins" | "minute" | "minutes" => MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => HOUR,
        "d" | "day" | "days" => DAY,
        "w" | "week" | "weeks" => WEEK,
        "y" | "yr" | "yrs" | "year" | "years" => YEAR,
        _ => return None,
    };
    Some(factor)
}

/// Renders milliseconds using the largest unit that divides it exactly.
///
/// `604_800_000` becomes `"1w"`, `90_000` becomes `"90s"`.
pub fn format_duration_ms(ms: u64) -> String {
    if ms == 0 {
        return "0ms".to_string();
    }

    for (factor, suffix) in [
        (WEEK, "w"),
        (DAY, "d"),
        (HOUR, "h"),
        (MINUTE, "m"),
        (SECOND, "s"),
    ] {
        if ms % factor == 0 {
            return format!("{}{}", ms / factor, suffix);
        }
    }

    format!("{ms}ms")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_short_units() {
        assert_eq!(parse_duration_ms("250ms").unwrap(), 250);
        assert_eq!(parse_duration_ms("3600s").unwrap(), 3_600_000);
        assert_eq!(parse_duration_ms("15m").unwrap(), 900_000);
        assert_eq!(parse_duration_ms("24h").unwrap(), 86_400_000);
        assert_eq!(parse_duration_ms("7d").unwrap(), 604_800_000);
        assert_eq!(parse_duration_ms("30d").unwrap(), 2_592_000_000);
        assert_eq!(parse_duration_ms("2w").unwrap(), 1_209_600_000);
        assert_eq!(parse_duration_ms("1y").unwrap(), 31_557_600_000);
    }

    #[test]
    fn test_parses_long_units_case_insensitive() {
        assert_eq!(parse_duration_ms("2 Hours").unwrap(), 7_200_000);
        assert_eq!(parse_duration_ms("1 DAY").unwrap(), 86_400_000);
        assert_eq!(parse_duration_ms("10 minutes").unwrap(), 600_000);
        assert_eq!(parse_duration_ms("5Sec").unwrap(), 5_000);
        assert_eq!(parse_duration_ms(" 3 weeks ").unwrap(), 1_814_400_000);
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert_eq!(parse_duration_ms(""), Err(DurationError::Empty));
        assert_eq!(parse_duration_ms("   "), Err(DurationError::Empty));
        assert!(matches!(
            parse_duration_ms("xyz"),
            Err(DurationError::Malformed(_))
        ));
        assert!(matches!(
            parse_duration_ms("10"),
            Err(DurationError::Malformed(_))
        ));
        assert!(matches!(
            parse_duration_ms("-5s"),
            Err(DurationError::Malformed(_))
        ));
        assert!(matches!(
            parse_duration_ms("1.5h"),
            Err(DurationError::Malformed(_))
        ));
        assert!(matches!(
            parse_duration_ms("10xz"),
            Err(DurationError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(matches!(
            parse_duration_ms("99999999999999999999999ms"),
            Err(DurationError::Overflow(_))
        ));
        assert!(matches!(
            parse_duration_ms("18446744073709551615y"),
            Err(DurationError::Overflow(_))
        ));
    }

    #[test]
    fn test_monotonic_per_unit() {
        for unit in ["ms", "s", "m", "h", "d", "w", "y"] {
            let mut previous = None;
            for n in [0u64, 1, 2, 10, 365, 1000] {
                let value = parse_duration_ms(&format!("{n}{unit}")).unwrap();
                if let Some(prev) = previous {
                    assert!(value > prev, "{n}{unit} should exceed previous value");
                }
                previous = Some(value);
            }
        }
    }

    #[test]
    fn test_format_picks_largest_exact_unit() {
        assert_eq!(format_duration_ms(0), "0ms");
        assert_eq!(format_duration_ms(1_500), "1500ms");
        assert_eq!(format_duration_ms(90_000), "90s");
        assert_eq!(format_duration_ms(3_600_000), "1h");
        assert_eq!(format_duration_ms(2_592_000_000), "30d");
        assert_eq!(format_duration_ms(604_800_000), "1w");
    }

    #[test]
    fn test_format_then_parse_is_stable() {
        for ms in [1u64, 1_000, 61_000, 3_600_000, 86_400_000] {
            assert_eq!(parse_duration_ms(&format_duration_ms(ms)).unwrap(), ms);
        }
    }
}

//! Duration parsing for config values.

use std::time::Duration;

use crate::error::{ChanwatchError, Result};

/// Parse a human-style duration string like `"90s"`, `"5m"`, or `"1h30m"`.
///
/// Accepts one or more `<number><unit>` segments with units `ms`, `s`, `m`,
/// `h`, and `d`. A bare number is treated as seconds.
///
/// # Errors
///
/// Returns a config error for empty input, unknown units, or a zero total.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ChanwatchError::Config(
            "duration must not be empty".to_string(),
        ));
    }

    if let Ok(secs) = s.parse::<u64>() {
        return non_zero(Duration::from_secs(secs), input);
    }

    let mut total = Duration::ZERO;
    let mut digits = String::new();
    let mut unit = String::new();

    let mut flush = |digits: &mut String, unit: &mut String| -> Result<Duration> {
        let value: u64 = digits.parse().map_err(|_| {
            ChanwatchError::Config(format!("invalid duration '{input}'"))
        })?;
        let d = match unit.as_str() {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value * 60),
            "h" => Duration::from_secs(value * 3600),
            "d" => Duration::from_secs(value * 86400),
            other => {
                return Err(ChanwatchError::Config(format!(
                    "unknown duration unit '{other}' in '{input}'"
                )));
            }
        };
        digits.clear();
        unit.clear();
        Ok(d)
    };

    for c in s.chars() {
        if c.is_ascii_digit() {
            if !unit.is_empty() {
                total += flush(&mut digits, &mut unit)?;
            }
            digits.push(c);
        } else if c.is_ascii_alphabetic() {
            if digits.is_empty() {
                return Err(ChanwatchError::Config(format!(
                    "invalid duration '{input}'"
                )));
            }
            unit.push(c);
        } else {
            return Err(ChanwatchError::Config(format!(
                "invalid duration '{input}'"
            )));
        }
    }

    if unit.is_empty() {
        return Err(ChanwatchError::Config(format!(
            "duration '{input}' is missing a unit"
        )));
    }
    total += flush(&mut digits, &mut unit)?;

    non_zero(total, input)
}

fn non_zero(d: Duration, input: &str) -> Result<Duration> {
    if d.is_zero() {
        Err(ChanwatchError::Config(format!(
            "duration '{input}' must be greater than zero"
        )))
    } else {
        Ok(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_units() {
        assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn parses_compound() {
        assert_eq!(
            parse_duration("1h30m").unwrap(),
            Duration::from_secs(5400)
        );
        assert_eq!(
            parse_duration("1m30s").unwrap(),
            Duration::from_secs(90)
        );
    }

    #[test]
    fn bare_number_is_seconds() {
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
    }

    #[test]
    fn rejects_malformed() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("-5s").is_err());
    }
}

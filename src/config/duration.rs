//! Duration and size strings used throughout the configuration document.
//!
//! Durations are written either as a bare integer (nanoseconds, or seconds for
//! the `_secs` variant) or as a sequence of `<decimal><unit>` pairs, e.g.
//! `"1h30m"`, `"1.5s"`, `"250ms"`. [`format_duration`] produces text that
//! [`parse_duration`] accepts back.

use std::time::Duration;

use crate::config::error::ConfigError;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parse a duration where a bare integer means nanoseconds.
pub fn parse_duration(raw: &str) -> Result<Duration, ConfigError> {
    parse_with_bare_unit(raw, 1)
}

/// Parse a duration where a bare integer means seconds.
pub fn parse_duration_secs(raw: &str) -> Result<Duration, ConfigError> {
    parse_with_bare_unit(raw, NANOS_PER_SEC)
}

fn parse_with_bare_unit(raw: &str, bare_unit: u128) -> Result<Duration, ConfigError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(Duration::ZERO);
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        let n: u128 = s
            .parse()
            .map_err(|_| ConfigError::InvalidDuration(raw.to_string()))?;
        let nanos = n
            .checked_mul(bare_unit)
            .ok_or_else(|| ConfigError::InvalidDuration(raw.to_string()))?;
        return nanos_to_duration(nanos, raw);
    }

    let invalid = || ConfigError::InvalidDuration(raw.to_string());
    let mut total: u128 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let int_part = &rest[..int_len];
        rest = &rest[int_len..];

        let mut frac_part = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            frac_part = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let unit_len = rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() || *c == '.')
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let unit = unit_nanos(&rest[..unit_len]).ok_or_else(invalid)?;
        rest = &rest[unit_len..];

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        // 18 digits keep the fraction inside u128 after scaling by the largest unit.
        let frac_digits = &frac_part[..frac_part.len().min(18)];
        let frac: u128 = if frac_digits.is_empty() {
            0
        } else {
            let scale = 10u128.pow(frac_digits.len() as u32);
            frac_digits.parse::<u128>().map_err(|_| invalid())? * unit / scale
        };

        total = whole
            .checked_mul(unit)
            .and_then(|v| v.checked_add(frac))
            .and_then(|v| v.checked_add(total))
            .ok_or_else(invalid)?;
    }
    nanos_to_duration(total, raw)
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

fn nanos_to_duration(nanos: u128, raw: &str) -> Result<Duration, ConfigError> {
    let secs = u64::try_from(nanos / NANOS_PER_SEC)
        .map_err(|_| ConfigError::InvalidDuration(raw.to_string()))?;
    Ok(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
}

/// Render a duration in its canonical text form (`0s`, `150ms`, `1.5s`, `1h0m0s`).
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{nanos}ns");
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", with_fraction(nanos, NANOS_PER_MICRO, 3));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", with_fraction(nanos, NANOS_PER_MILLI, 6));
    }

    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs_nanos = u128::from(total_secs % 60) * NANOS_PER_SEC + u128::from(d.subsec_nanos());
    let secs = with_fraction(secs_nanos, NANOS_PER_SEC, 9);
    if hours > 0 {
        format!("{hours}h{minutes}m{secs}s")
    } else if minutes > 0 {
        format!("{minutes}m{secs}s")
    } else {
        format!("{secs}s")
    }
}

fn with_fraction(value: u128, unit: u128, width: usize) -> String {
    let whole = value / unit;
    let rem = value % unit;
    if rem == 0 {
        return whole.to_string();
    }
    let frac = format!("{rem:0width$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Parse a size such as `"1024"`, `"10KB"` or `"1GB"`. `"-1"` means no limit.
pub fn parse_binary_size(raw: &str) -> Result<i64, ConfigError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(0);
    }
    if s == "-1" {
        return Ok(-1);
    }
    let invalid = || ConfigError::InvalidNumber(raw.to_string());
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(invalid());
    }
    let value: i64 = s[..digits].parse().map_err(|_| invalid())?;
    let multiplier: i64 = match s[digits..].trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" => 1 << 10,
        "M" | "MB" => 1 << 20,
        "G" | "GB" => 1 << 30,
        "T" | "TB" => 1 << 40,
        _ => return Err(invalid()),
    };
    value.checked_mul(multiplier).ok_or_else(invalid)
}

/// Parse an integer that may arrive as a JSON string.
pub fn parse_int(raw: &str) -> Result<i64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_duration("").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("10").unwrap(), Duration::from_nanos(10));
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("3us").unwrap(), Duration::from_micros(3));
        assert_eq!(parse_duration("3µs").unwrap(), Duration::from_micros(3));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration(".5m").unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_secs_variant() {
        assert_eq!(parse_duration_secs("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration_secs("30ms").unwrap(), Duration::from_millis(30));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["5x", "s", "1..5s", "-1s", "1h 30m", "ten seconds"] {
            assert!(
                matches!(parse_duration(bad), Err(ConfigError::InvalidDuration(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_oversized_bare_integer() {
        let huge = "999999999999999999999999999999999";
        assert!(matches!(
            parse_duration_secs(huge),
            Err(ConfigError::InvalidDuration(_))
        ));
        assert!(matches!(parse_duration(huge), Err(ConfigError::InvalidDuration(_))));
        let beyond_u128 = "9".repeat(60);
        assert!(matches!(
            parse_duration(&beyond_u128),
            Err(ConfigError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_format_canonical() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_nanos(15)), "15ns");
        assert_eq!(format_duration(Duration::from_micros(1500)), "1.5ms");
        assert_eq!(format_duration(Duration::from_millis(150)), "150ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h0m0s");
    }

    #[test]
    fn test_format_parses_back() {
        for d in [
            Duration::from_nanos(7),
            Duration::from_micros(42),
            Duration::from_millis(999),
            Duration::new(5, 123_456_789),
            Duration::from_secs(86_400 + 61),
        ] {
            assert_eq!(parse_duration(&format_duration(d)).unwrap(), d);
        }
    }

    #[test]
    fn test_binary_size() {
        assert_eq!(parse_binary_size("1024").unwrap(), 1024);
        assert_eq!(parse_binary_size("10KB").unwrap(), 10 * 1024);
        assert_eq!(parse_binary_size("1GB").unwrap(), 1 << 30);
        assert_eq!(parse_binary_size("-1").unwrap(), -1);
        assert!(matches!(
            parse_binary_size("1XB"),
            Err(ConfigError::InvalidNumber(_))
        ));
        assert!(matches!(parse_binary_size("GB"), Err(ConfigError::InvalidNumber(_))));
    }
}

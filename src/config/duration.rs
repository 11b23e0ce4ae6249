//! Human-readable durations for timeout settings ("500ms", "5s", "1m").

use std::time::Duration;

/// Parse a duration such as `"500ms"`, `"5s"` or `"1m"`.
///
/// A bare number is read as seconds. Returns `None` for anything else,
/// including negative values and unknown suffixes.
///
/// ```
/// use remote_starter::config::parse_duration_string;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration_string("5s"), Some(Duration::from_secs(5)));
/// assert_eq!(parse_duration_string("250ms"), Some(Duration::from_millis(250)));
/// assert_eq!(parse_duration_string("2m"), Some(Duration::from_secs(120)));
/// ```
pub fn parse_duration_string(s: &str) -> Option<Duration> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    let amount: u64 = digits.parse().ok()?;

    match unit.trim() {
        "ms" => Some(Duration::from_millis(amount)),
        "" | "s" => Some(Duration::from_secs(amount)),
        "m" => amount.checked_mul(60).map(Duration::from_secs),
        _ => None,
    }
}

/// Render a duration back in the shortest unit that represents it exactly.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis % 60_000 == 0 && millis > 0 {
        format!("{}m", millis / 60_000)
    } else if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units() {
        assert_eq!(parse_duration_string("10s"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration_string("3m"), Some(Duration::from_secs(180)));
        assert_eq!(parse_duration_string("750ms"), Some(Duration::from_millis(750)));
        assert_eq!(parse_duration_string("15"), Some(Duration::from_secs(15)));
        assert_eq!(parse_duration_string(" 5 s "), Some(Duration::from_secs(5)));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "s", "abc", "5x", "-5s", "1.5s", "5h"] {
            assert_eq!(parse_duration_string(bad), None, "{bad:?} should not parse");
        }
    }

    #[test]
    fn formats_shortest_unit() {
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_secs(120)), "2m");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1500ms");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }
}

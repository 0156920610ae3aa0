//! Parsing utilities for human-readable configuration values

use std::time::Duration;

/// Parse a token time-to-live (e.g., "3600", "90s", "30m", "1h", "7d")
///
/// Returns `None` for empty input, unknown units, overflow, or a zero TTL.
/// Token expiry is computed in whole seconds, so sub-second units are rejected.
///
/// # Supported formats
/// - `"7d"` - days
/// - `"1h"` - hours
/// - `"30m"` - minutes
/// - `"90s"` or `"90"` - seconds
pub fn parse_ttl(s: &str) -> Option<Duration> {
    let s = s.trim().to_lowercase();
    if s.is_empty() || s.ends_with("ms") {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('d') {
        (n, 24 * 60 * 60)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 60 * 60)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        (s.as_str(), 1)
    };

    let secs = num_str.trim().parse::<u64>().ok()?.checked_mul(multiplier)?;
    if secs == 0 {
        return None;
    }
    Some(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ttl_units() {
        assert_eq!(parse_ttl("3600"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_ttl("90s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_ttl("30m"), Some(Duration::from_secs(1800)));
        assert_eq!(parse_ttl("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_ttl("7d"), Some(Duration::from_secs(7 * 86400)));
        assert_eq!(parse_ttl("  2H  "), Some(Duration::from_secs(7200)));
    }

    #[test]
    fn test_parse_ttl_rejects_garbage() {
        assert_eq!(parse_ttl(""), None);
        assert_eq!(parse_ttl("abc"), None);
        assert_eq!(parse_ttl("10ms"), None);
        assert_eq!(parse_ttl("-5"), None);
        assert_eq!(parse_ttl("0"), None);
        assert_eq!(parse_ttl("0h"), None);
    }

    #[test]
    fn test_parse_ttl_overflow() {
        assert_eq!(parse_ttl(&format!("{}d", u64::MAX)), None);
    }
}

//! Typed parsing of token-lifetime specs.
//!
//! Lifetimes are configured as `"<n><unit>"` strings where the unit is `d`
//! (days), `h` (hours), or `m` (minutes), e.g. `"30d"` or `"15m"`. Parsing
//! is strict and happens once at construction; anything malformed falls
//! back to the caller's default rather than being half-guessed at use time.

use chrono::Duration;

/// Parse a lifetime spec of the form `<n><unit>` (`d`/`h`/`m`, case
/// insensitive). Returns `None` for anything that does not match exactly.
pub fn parse_ttl(spec: &str) -> Option<Duration> {
    let spec = spec.trim();
    if spec.len() < 2 || !spec.is_ascii() {
        return None;
    }

    let (digits, unit) = spec.split_at(spec.len() - 1);
    let n: i64 = digits.parse().ok().filter(|n| *n > 0)?;

    match unit {
        "d" | "D" => Some(Duration::days(n)),
        "h" | "H" => Some(Duration::hours(n)),
        "m" | "M" => Some(Duration::minutes(n)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_days_hours_minutes() {
        assert_eq!(parse_ttl("30d"), Some(Duration::days(30)));
        assert_eq!(parse_ttl("12h"), Some(Duration::hours(12)));
        assert_eq!(parse_ttl("15m"), Some(Duration::minutes(15)));
    }

    #[test]
    fn unit_is_case_insensitive() {
        assert_eq!(parse_ttl("7D"), Some(Duration::days(7)));
        assert_eq!(parse_ttl("1H"), Some(Duration::hours(1)));
    }

    #[test]
    fn rejects_malformed_specs() {
        assert_eq!(parse_ttl(""), None);
        assert_eq!(parse_ttl("d"), None);
        assert_eq!(parse_ttl("30"), None);
        assert_eq!(parse_ttl("30s"), None);
        assert_eq!(parse_ttl("-5d"), None);
        assert_eq!(parse_ttl("0m"), None);
        assert_eq!(parse_ttl("30 d"), None);
        assert_eq!(parse_ttl("abc"), None);
        assert_eq!(parse_ttl("30日"), None);
    }
}

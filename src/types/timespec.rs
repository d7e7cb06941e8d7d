use std::fmt::Display;

use crate::result::{Error, Result};

/// Parse a free-form time spec into a number of seconds.
///
/// The alternate separators `.` and space are first normalized to `:`,
/// then the string is split:
/// - 1 segment: plain seconds (`"45"` is 45)
/// - 2 segments: `minutes:seconds` (`"3:33"` is 213)
/// - 3 segments: `hours:minutes:seconds` (`"1:02:03"` is 3723)
///
/// Components are not bounds-checked: `"3:99"` is accepted and worth 279
/// seconds, as users paste such values straight out of video descriptions.
pub fn parse_time_spec(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    let malformed = || Error::MalformedTimeSpec(raw.to_owned());

    if raw.is_empty() {
        return Err(malformed());
    }

    let normalized = raw.replace(['.', ' '], ":");

    let mut segments = Vec::with_capacity(3);
    for segment in normalized.split(':') {
        segments.push(segment.parse::<u64>().map_err(|_| malformed())?);
    }

    // Checked arithmetic: a component large enough to overflow the total
    // is as malformed as a non-numeric one
    match segments[..] {
        [s] => Some(s),
        [m, s] => m.checked_mul(60).and_then(|m| m.checked_add(s)),
        [h, m, s] => h
            .checked_mul(3600)
            .and_then(|h| m.checked_mul(60)?.checked_add(h))
            .and_then(|hm| hm.checked_add(s)),
        _ => None,
    }
    .ok_or_else(malformed)
}

/// A half-open `[start, end)` sub-range of a video, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_seconds: u64,
    pub end_seconds: u64,
}

impl TimeRange {
    /// Parse the two time specs and check that they form a forward range.
    ///
    /// Both specs are parsed before the order check, so a caller always
    /// learns about a malformed string first.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start_seconds = parse_time_spec(start)?;
        let end_seconds = parse_time_spec(end)?;

        if end_seconds <= start_seconds {
            return Err(Error::InvertedRange {
                start: start_seconds,
                end: end_seconds,
            });
        }

        Ok(Self {
            start_seconds,
            end_seconds,
        })
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s..{}s", self.start_seconds, self.end_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_seconds() {
        assert_eq!(parse_time_spec("45").unwrap(), 45);
        assert_eq!(parse_time_spec("0").unwrap(), 0);
        assert_eq!(parse_time_spec(" 45 ").unwrap(), 45);
    }

    #[test]
    fn parse_minutes_seconds() {
        assert_eq!(parse_time_spec("3:33").unwrap(), 213);
        assert_eq!(parse_time_spec("00:07").unwrap(), 7);
    }

    #[test]
    fn parse_hours_minutes_seconds() {
        assert_eq!(parse_time_spec("1:02:03").unwrap(), 3723);
        assert_eq!(parse_time_spec("00:03:33").unwrap(), 213);
    }

    #[test]
    fn out_of_range_components_are_computed_literally() {
        assert_eq!(parse_time_spec("3:99").unwrap(), 279);
        assert_eq!(parse_time_spec("0:0:75").unwrap(), 75);
    }

    #[test]
    fn overflowing_components_are_rejected() {
        for spec in [
            "9999999999999999:0:0",
            "18446744073709551615:59",
            "1:18446744073709551615:0",
            "18446744073709551615:1",
        ] {
            assert!(
                matches!(parse_time_spec(spec), Err(Error::MalformedTimeSpec(_))),
                "'{spec}' should be rejected"
            );
        }
    }

    #[test]
    fn alternate_separators_are_equivalent() {
        assert_eq!(parse_time_spec("3.33").unwrap(), 213);
        assert_eq!(parse_time_spec("3 33").unwrap(), 213);
        assert_eq!(parse_time_spec("1.02.03").unwrap(), 3723);
        assert_eq!(parse_time_spec("1 02 03").unwrap(), 3723);
    }

    #[test]
    fn malformed_specs_are_rejected() {
        for spec in ["", "  ", "abc", "1:2:3:4", "3:x3", "1,5", "-10", "4:"] {
            assert!(
                matches!(parse_time_spec(spec), Err(Error::MalformedTimeSpec(_))),
                "'{spec}' should be rejected"
            );
        }
    }

    #[test]
    fn range_parses_both_ends() {
        let range = TimeRange::parse("3:33", "5:45").unwrap();
        assert_eq!(range.start_seconds, 213);
        assert_eq!(range.end_seconds, 345);
    }

    #[test]
    fn range_rejects_inverted_and_empty_ranges() {
        assert!(matches!(
            TimeRange::parse("10", "5"),
            Err(Error::InvertedRange { start: 10, end: 5 })
        ));
        assert!(matches!(
            TimeRange::parse("2:00", "120"),
            Err(Error::InvertedRange {
                start: 120,
                end: 120
            })
        ));
    }

    #[test]
    fn range_reports_malformed_specs_before_order() {
        assert!(matches!(
            TimeRange::parse("oops", "5"),
            Err(Error::MalformedTimeSpec(_))
        ));
        assert!(matches!(
            TimeRange::parse("10", "oops"),
            Err(Error::MalformedTimeSpec(_))
        ));
    }
}

#![forbid(unsafe_code)]

//! Millisecond timestamps. Rows store `i64` unix milliseconds; the wire
//! carries fixed-width RFC 3339 UTC strings (`YYYY-MM-DDTHH:MM:SS.mmmZ`), so
//! rendered timestamps sort the same as the numbers behind them.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Which end of a calendar day a date-only bound resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayEdge {
    Start,
    End,
}

pub fn now_ms() -> i64 {
    datetime_to_ms(OffsetDateTime::now_utc())
}

pub fn ts_ms_to_rfc3339(ts_ms: i64) -> String {
    let wire = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );
    let dt = OffsetDateTime::from_unix_timestamp_nanos(i128::from(ts_ms) * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);
    dt.format(wire)
        .unwrap_or_else(|_| "1970-01-01T00:00:00.000Z".to_string())
}

/// Lenient ISO-8601 parse used by query filters. Accepts RFC 3339, a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC, `T` or space separated), or a bare
/// date. Anything else yields `None`.
pub fn parse_timestamp_ms(value: &str, edge: DayEdge) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(datetime_to_ms(dt));
    }

    let naive = value.replacen(' ', "T", 1);
    let with_fraction = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    let whole_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let minutes = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    for format in [with_fraction, whole_seconds, minutes] {
        if let Ok(dt) = PrimitiveDateTime::parse(&naive, format) {
            return Some(datetime_to_ms(dt.assume_utc()));
        }
    }

    let date = Date::parse(value, format_description!("[year]-[month]-[day]")).ok()?;
    let dt = match edge {
        DayEdge::Start => date.midnight(),
        DayEdge::End => date.with_hms_milli(23, 59, 59, 999).ok()?,
    };
    Some(datetime_to_ms(dt.assume_utc()))
}

fn datetime_to_ms(dt: OffsetDateTime) -> i64 {
    let ms = dt.unix_timestamp_nanos() / 1_000_000i128;
    if ms <= i64::MIN as i128 {
        i64::MIN
    } else if ms >= i64::MAX as i128 {
        i64::MAX
    } else {
        ms as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const JAN_2_2025_MS: i64 = 1_735_776_000_000;

    #[test]
    fn rfc3339_round_trips_at_millisecond_precision() {
        let rendered = ts_ms_to_rfc3339(JAN_2_2025_MS + 250);
        assert!(rendered.starts_with("2025-01-02T00:00:00."));
        assert!(rendered.ends_with('Z'));
        assert_eq!(
            parse_timestamp_ms(&rendered, DayEdge::Start),
            Some(JAN_2_2025_MS + 250)
        );
    }

    #[rstest]
    #[case(0, "2025-01-02T00:00:00.000Z")]
    #[case(430, "2025-01-02T00:00:00.430Z")]
    #[case(431, "2025-01-02T00:00:00.431Z")]
    #[case(59_007, "2025-01-02T00:00:59.007Z")]
    fn rendering_is_fixed_width(#[case] offset_ms: i64, #[case] expected: &str) {
        assert_eq!(ts_ms_to_rfc3339(JAN_2_2025_MS + offset_ms), expected);
    }

    #[test]
    fn rendered_order_matches_numeric_order() {
        let mut previous = ts_ms_to_rfc3339(JAN_2_2025_MS);
        for offset_ms in 1..2_000 {
            let next = ts_ms_to_rfc3339(JAN_2_2025_MS + offset_ms);
            assert!(previous < next, "{previous} !< {next}");
            previous = next;
        }
    }

    #[rstest]
    #[case("2025-01-02T00:00:00Z", JAN_2_2025_MS)]
    #[case("2025-01-02T02:00:00+02:00", JAN_2_2025_MS)]
    #[case("2025-01-02T00:00:00", JAN_2_2025_MS)]
    #[case("2025-01-02 00:00:00", JAN_2_2025_MS)]
    #[case("2025-01-02T00:00", JAN_2_2025_MS)]
    #[case("2025-01-02T00:00:00.5", JAN_2_2025_MS + 500)]
    #[case("2025-01-02", JAN_2_2025_MS)]
    fn accepts_iso8601_variants(#[case] input: &str, #[case] expected: i64) {
        assert_eq!(parse_timestamp_ms(input, DayEdge::Start), Some(expected));
    }

    #[test]
    fn date_only_end_edge_covers_the_whole_day() {
        assert_eq!(
            parse_timestamp_ms("2025-01-02", DayEdge::End),
            Some(JAN_2_2025_MS + 86_400_000 - 1)
        );
    }

    #[rstest]
    #[case("")]
    #[case("yesterday")]
    #[case("2025-13-01")]
    #[case("1735776000000")]
    fn malformed_values_are_none(#[case] input: &str) {
        assert_eq!(parse_timestamp_ms(input, DayEdge::Start), None);
    }
}

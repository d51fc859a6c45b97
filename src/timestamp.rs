//! Parsing of the timestamps emitted by the backend.
//!
//! The backend emits either a standard date-time string or a locale formatted
//! string of the shape "YYYY-MM-DD h:mm AM". Both shapes are handled here so
//! that sorting and filtering never have to deal with a parse failure.

use time::{
    Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

/// The value substituted for a timestamp that cannot be parsed.
pub const TIMESTAMP_SENTINEL: OffsetDateTime = OffsetDateTime::UNIX_EPOCH;

const LOCAL_DATE_TIME_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
];

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse a backend timestamp, falling back to [TIMESTAMP_SENTINEL].
///
/// Strings ending in an "AM" or "PM" token are decomposed by hand as
/// "YYYY-MM-DD h:mm[:ss] AM|PM" in `local_offset`. Anything else is tried as
/// RFC 3339, then as an offset-less date-time in `local_offset`, then as a
/// bare date at UTC midnight.
pub fn parse_timestamp(raw: &str, local_offset: UtcOffset) -> OffsetDateTime {
    let raw = raw.trim();

    let parsed = match twelve_hour_period(raw) {
        Some(_) => parse_twelve_hour(raw, local_offset),
        None => parse_standard(raw, local_offset),
    };

    parsed.unwrap_or_else(|| {
        tracing::debug!("could not parse timestamp {raw:?}, using the epoch instead");
        TIMESTAMP_SENTINEL
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    Am,
    Pm,
}

fn twelve_hour_period(raw: &str) -> Option<Period> {
    match raw.rsplit(char::is_whitespace).next()? {
        "AM" => Some(Period::Am),
        "PM" => Some(Period::Pm),
        _ => None,
    }
}

fn parse_twelve_hour(raw: &str, local_offset: UtcOffset) -> Option<OffsetDateTime> {
    let mut parts = raw.split_whitespace();
    let date_part = parts.next()?;
    let time_part = parts.next()?;
    let period = twelve_hour_period(parts.next()?)?;

    if parts.next().is_some() {
        return None;
    }

    let mut date_fields = date_part.split('-');
    let year: i32 = date_fields.next()?.parse().ok()?;
    let month: u8 = date_fields.next()?.parse().ok()?;
    let day: u8 = date_fields.next()?.parse().ok()?;

    if date_fields.next().is_some() {
        return None;
    }

    // Seconds, if present, are ignored.
    let mut time_fields = time_part.split(':');
    let hour: u8 = time_fields.next()?.parse().ok()?;
    let minute: u8 = time_fields.next()?.parse().ok()?;

    let hour = match (period, hour) {
        (Period::Am, 12) => 0,
        (Period::Pm, hour) if hour != 12 => hour.checked_add(12)?,
        (_, hour) => hour,
    };

    let date = Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()?;
    let time = Time::from_hms(hour, minute, 0).ok()?;

    Some(PrimitiveDateTime::new(date, time).assume_offset(local_offset))
}

fn parse_standard(raw: &str, local_offset: UtcOffset) -> Option<OffsetDateTime> {
    if let Ok(date_time) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(date_time);
    }

    if let Some(date_time) = LOCAL_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(raw, format).ok())
    {
        return Some(date_time.assume_offset(local_offset));
    }

    Date::parse(raw, DATE_FORMAT)
        .ok()
        .map(|date| date.midnight().assume_utc())
}

#[cfg(test)]
mod parse_timestamp_tests {
    use time::{UtcOffset, macros::datetime, macros::offset};

    use super::{TIMESTAMP_SENTINEL, parse_timestamp};

    const IST: UtcOffset = offset!(+05:30);

    #[test]
    fn parses_twelve_hour_afternoon() {
        let got = parse_timestamp("2024-03-15 2:05 PM", IST);

        assert_eq!(got, datetime!(2024-03-15 14:05 +05:30));
    }

    #[test]
    fn twelve_am_is_midnight() {
        let got = parse_timestamp("2024-03-15 12:30 AM", IST);

        assert_eq!(got, datetime!(2024-03-15 00:30 +05:30));
    }

    #[test]
    fn twelve_pm_is_noon() {
        let got = parse_timestamp("2024-03-15 12:00 PM", IST);

        assert_eq!(got, datetime!(2024-03-15 12:00 +05:30));
    }

    #[test]
    fn morning_hours_are_unchanged() {
        let got = parse_timestamp("2024-03-15 9:41 AM", IST);

        assert_eq!(got, datetime!(2024-03-15 09:41 +05:30));
    }

    #[test]
    fn ignores_seconds_in_twelve_hour_format() {
        let got = parse_timestamp("2024-03-15 9:41:59 AM", IST);

        assert_eq!(got, datetime!(2024-03-15 09:41 +05:30));
    }

    #[test]
    fn parses_rfc3339() {
        let got = parse_timestamp("2024-03-15T08:00:00Z", IST);

        assert_eq!(got, datetime!(2024-03-15 08:00 UTC));
    }

    #[test]
    fn parses_offsetless_date_time_as_local() {
        let got = parse_timestamp("2024-03-15T08:00:00.123", IST);

        assert_eq!(got, datetime!(2024-03-15 08:00:00.123 +05:30));
    }

    #[test]
    fn parses_bare_date_as_utc_midnight() {
        let got = parse_timestamp("2024-03-15", IST);

        assert_eq!(got, datetime!(2024-03-15 00:00 UTC));
    }

    #[test]
    fn malformed_input_falls_back_to_epoch() {
        for raw in [
            "not-a-date",
            "",
            "2024-13-01 1:00 PM",
            "2024-02-30 1:00 AM",
            "2024-03-15 13:00 PM",
            "2024-03-15 PM",
            "yesterday 1:00 AM",
        ] {
            assert_eq!(parse_timestamp(raw, IST), TIMESTAMP_SENTINEL, "{raw:?}");
        }
    }
}

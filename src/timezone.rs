//! Conversions between the server's configured timezone and UTC offsets.

use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset, macros::time};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// The last representable millisecond of a day.
const END_OF_DAY: Time = time!(23:59:59.999);

/// Get the current UTC offset of the timezone with the canonical name
/// `canonical_timezone`, e.g. "Asia/Kolkata".
///
/// Returns `None` if the timezone name is not recognised.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Like [get_local_offset], but an unknown timezone is an
/// [Error::InvalidTimezoneError].
pub fn local_offset(canonical_timezone: &str) -> Result<UtcOffset, Error> {
    get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))
}

/// Midnight at the start of `date` in `offset`.
pub fn start_of_day(date: Date, offset: UtcOffset) -> OffsetDateTime {
    date.midnight().assume_offset(offset)
}

/// 23:59:59.999 at the end of `date` in `offset`.
pub fn end_of_day(date: Date, offset: UtcOffset) -> OffsetDateTime {
    PrimitiveDateTime::new(date, END_OF_DAY).assume_offset(offset)
}

#[cfg(test)]
mod timezone_tests {
    use time::macros::{date, datetime, offset};

    use crate::Error;

    use super::{end_of_day, get_local_offset, local_offset, start_of_day};

    #[test]
    fn resolves_fixed_offset_timezone() {
        assert_eq!(get_local_offset("Asia/Kolkata"), Some(offset!(+05:30)));
    }

    #[test]
    fn unknown_timezone_is_none() {
        assert_eq!(get_local_offset("Not/AZone"), None);
        assert_eq!(
            local_offset("Not/AZone"),
            Err(Error::InvalidTimezoneError("Not/AZone".to_owned()))
        );
    }

    #[test]
    fn day_bounds_are_in_local_time() {
        let day = date!(2024 - 03 - 15);

        assert_eq!(
            start_of_day(day, offset!(+05:30)),
            datetime!(2024-03-15 00:00 +05:30)
        );
        assert_eq!(
            end_of_day(day, offset!(+05:30)),
            datetime!(2024-03-15 23:59:59.999 +05:30)
        );
    }
}

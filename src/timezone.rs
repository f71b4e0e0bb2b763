//! Local timezone helpers.
//!
//! Aggregation windows are anchored to the local calendar date, so "today"
//! must be computed in the configured timezone rather than UTC.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Look up the current UTC offset for a canonical timezone name, e.g.
/// "Pacific/Auckland". Returns `None` if the name is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current calendar date in the given canonical timezone.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a known
/// timezone name.
pub fn today_in(canonical_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}

#[cfg(test)]
mod timezone_tests {
    use super::{get_local_offset, today_in};
    use crate::Error;

    #[test]
    fn get_local_offset_returns_none_for_unknown_name() {
        assert!(get_local_offset("Not/AZone").is_none());
    }

    #[test]
    fn get_local_offset_resolves_utc() {
        let offset = get_local_offset("Etc/UTC").unwrap();

        assert!(offset.is_utc());
    }

    #[test]
    fn today_in_fails_on_unknown_name() {
        let result = today_in("Not/AZone");

        assert_eq!(result, Err(Error::InvalidTimezone("Not/AZone".to_owned())));
    }
}

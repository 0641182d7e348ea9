use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use std::{fmt::Display, time::SystemTime};

/// A value that represents a point in time.
///
/// Anything implementing this trait is stored as an ISO-8601 string. Implement it for
/// your own time types to have them encoded the same way as the `chrono` ones.
pub trait Timestamp {
    fn to_iso8601(&self) -> String;
}

impl<Tz> Timestamp for DateTime<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    fn to_iso8601(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Naive date times carry no offset and are taken to be UTC.
impl Timestamp for NaiveDateTime {
    fn to_iso8601(&self) -> String {
        Utc.from_utc_datetime(self).to_iso8601()
    }
}

impl Timestamp for NaiveDate {
    fn to_iso8601(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }
}

impl Timestamp for SystemTime {
    fn to_iso8601(&self) -> String {
        DateTime::<Utc>::from(*self).to_iso8601()
    }
}

impl<T: Timestamp + ?Sized> Timestamp for &T {
    fn to_iso8601(&self) -> String {
        (**self).to_iso8601()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use std::time::Duration;

    #[test]
    fn utc_uses_z_suffix() {
        let time = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        assert_eq!(time.to_iso8601(), "2024-02-29T23:59:59Z");
    }

    #[test]
    fn offsets_are_kept() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let time = offset.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(time.to_iso8601(), "2024-05-01T12:30:00+02:00");
    }

    #[test]
    fn sub_second_precision_is_dropped() {
        let time = Utc.timestamp_opt(1_700_000_000, 987_000_000).unwrap();
        assert_eq!(time.to_iso8601(), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn naive_and_system_times() {
        let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(date.to_iso8601(), "1999-12-31");

        let naive = date.and_hms_opt(8, 0, 0).unwrap();
        assert_eq!(naive.to_iso8601(), "1999-12-31T08:00:00Z");

        let system = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400);
        assert_eq!(system.to_iso8601(), "1970-01-02T00:00:00Z");
    }
}

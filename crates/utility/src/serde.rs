pub mod date_time {
    use core::fmt;

    use chrono::{DateTime, NaiveDateTime, SubsecRound as _, Utc};
    use serde::{
        de::{self, Visitor},
        Deserializer,
    };

    /// Sub-second digits kept on timestamps. The document store keeps
    /// milliseconds, so anything finer would not survive a round trip.
    pub const SUBSEC_DIGITS: u16 = 3;

    /// The current instant, truncated to stored precision.
    pub fn now_utc() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(SUBSEC_DIGITS)
    }

    /// Unix times beyond this many seconds are read as milliseconds.
    pub const MAX_UNIX_SECONDS: i64 = 20_000_000_000;

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    /// Parses either an RFC 3339 timestamp (any offset, normalised to UTC)
    /// or a naive `YYYY-MM-DD[T ]HH:MM:SS[.f]` timestamp taken as UTC.
    pub fn parse_utc(s: &str) -> Option<DateTime<Utc>> {
        let parsed = DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NAIVE_FORMATS.iter().find_map(|format| {
                    NaiveDateTime::parse_from_str(s, format)
                        .map(|naive| naive.and_utc())
                        .ok()
                })
            })?;
        Some(parsed.trunc_subsecs(SUBSEC_DIGITS))
    }

    /// Whole unix time, in seconds or (past [`MAX_UNIX_SECONDS`]) milliseconds.
    pub fn from_unix(value: i64) -> Option<DateTime<Utc>> {
        if value.unsigned_abs() > MAX_UNIX_SECONDS as u64 {
            DateTime::from_timestamp_millis(value)
        } else {
            DateTime::from_timestamp(value, 0)
        }
    }

    /// Fractional unix time, scaled like [`from_unix`].
    pub fn from_unix_f64(value: f64) -> Option<DateTime<Utc>> {
        if !value.is_finite() {
            return None;
        }
        let seconds = if value.abs() > MAX_UNIX_SECONDS as f64 {
            value / 1000.0
        } else {
            value
        };
        let whole = seconds.floor();
        let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
        DateTime::from_timestamp(whole as i64, nanos)
            .map(|parsed| parsed.trunc_subsecs(SUBSEC_DIGITS))
    }

    struct UtcVisitor;

    impl<'de> Visitor<'de> for UtcVisitor {
        type Value = DateTime<Utc>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an ISO 8601 date time or unix time, e.g. 2023-01-01T12:00:00Z")
        }

        fn visit_i64<E>(self, value: i64) -> Result<DateTime<Utc>, E>
        where
            E: de::Error,
        {
            from_unix(value)
                .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Signed(value), &self))
        }

        fn visit_u64<E>(self, value: u64) -> Result<DateTime<Utc>, E>
        where
            E: de::Error,
        {
            i64::try_from(value)
                .ok()
                .and_then(from_unix)
                .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Unsigned(value), &self))
        }

        fn visit_f64<E>(self, value: f64) -> Result<DateTime<Utc>, E>
        where
            E: de::Error,
        {
            from_unix_f64(value)
                .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Float(value), &self))
        }

        fn visit_str<E>(self, value: &str) -> Result<DateTime<Utc>, E>
        where
            E: de::Error,
        {
            parse_utc(value)
                .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Str(value), &self))
        }
    }

    struct UtcOptionVisitor;

    impl<'de> Visitor<'de> for UtcOptionVisitor {
        type Value = Option<DateTime<Utc>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an ISO 8601 date time, unix time or null")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserialize_utc(deserializer).map(Some)
        }
    }

    pub fn deserialize_utc<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(UtcVisitor)
    }

    pub fn deserialize_utc_option<'de, D>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(UtcOptionVisitor)
    }

    #[cfg(test)]
    mod tests {
        use chrono::{TimeZone as _, Timelike as _};
        use serde::Deserialize;

        use super::*;

        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(deserialize_with = "deserialize_utc")]
            at: DateTime<Utc>,
        }

        #[derive(Deserialize)]
        struct OptionWrapper {
            #[serde(deserialize_with = "deserialize_utc_option", default)]
            at: Option<DateTime<Utc>>,
        }

        #[test]
        fn naive_timestamps_are_utc() {
            let parsed = parse_utc("2023-01-01T12:00:00").unwrap();
            assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap());
        }

        #[test]
        fn offsets_are_normalised() {
            let parsed = parse_utc("2023-01-01T14:00:00+02:00").unwrap();
            assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap());
        }

        #[test]
        fn sub_millisecond_digits_are_dropped() {
            let parsed = parse_utc("2023-01-01T12:00:00.123456789Z").unwrap();
            assert_eq!(parsed.nanosecond(), 123_000_000);
        }

        #[test]
        fn garbage_is_rejected() {
            assert!(parse_utc("yesterday").is_none());
            assert!(serde_json::from_str::<Wrapper>(r#"{"at": "yesterday"}"#).is_err());
            assert!(serde_json::from_str::<Wrapper>(r#"{"at": true}"#).is_err());
            assert!(serde_json::from_str::<Wrapper>(r#"{"at": [2023, 1, 1]}"#).is_err());
        }

        #[test]
        fn space_separated_timestamps_are_accepted() {
            let wrapper: Wrapper =
                serde_json::from_str(r#"{"at": "2023-01-01 12:00:00.5"}"#).unwrap();
            assert_eq!(
                wrapper.at,
                Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap()
                    + chrono::Duration::milliseconds(500)
            );
        }

        #[test]
        fn unix_times_are_accepted() {
            let noon = Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap();

            let seconds: Wrapper = serde_json::from_str(r#"{"at": 1672574400}"#).unwrap();
            assert_eq!(seconds.at, noon);

            let millis: Wrapper = serde_json::from_str(r#"{"at": 1672574400250}"#).unwrap();
            assert_eq!(millis.at, noon + chrono::Duration::milliseconds(250));

            let fractional: Wrapper =
                serde_json::from_str(r#"{"at": 1672574400.1239}"#).unwrap();
            assert_eq!(fractional.at, noon + chrono::Duration::milliseconds(123));

            let before_epoch: Wrapper = serde_json::from_str(r#"{"at": -60}"#).unwrap();
            assert_eq!(
                before_epoch.at,
                Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 0).unwrap()
            );
        }

        #[test]
        fn option_accepts_missing_null_and_value() {
            let missing: OptionWrapper = serde_json::from_str("{}").unwrap();
            assert_eq!(missing.at, None);

            let null: OptionWrapper = serde_json::from_str(r#"{"at": null}"#).unwrap();
            assert_eq!(null.at, None);

            let value: OptionWrapper =
                serde_json::from_str(r#"{"at": "2023-01-01T12:00:00Z"}"#).unwrap();
            assert_eq!(
                value.at,
                Some(Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap())
            );
        }

        #[test]
        fn now_is_truncated() {
            assert_eq!(now_utc().nanosecond() % 1_000_000, 0);
        }
    }
}

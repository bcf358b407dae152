use time::{Date, OffsetDateTime};

use crate::errors::BackendError;

/// The exchange format for calendar dates, e.g. `1990-01-31`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a calendar date submitted as a `YYYY-MM-DD` string.
pub fn parse_date(value: &str) -> Result<Date, BackendError> {
    Date::parse(value, DATE_FORMAT).map_err(|source| BackendError::MalformedDate {
        value: value.to_owned(),
        source,
    })
}

/// Formats a date in the exchange format.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
}

/// Returns the current date in UTC. Credential windows are day-granular,
/// so this is the only clock the backend consults.
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// (De)serializes a [`Date`] as a `YYYY-MM-DD` string.
pub mod iso_date {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let value: String = Deserialize::deserialize(deserializer)?;

        Date::parse(&value, DATE_FORMAT).map_err(de::Error::custom)
    }
}

/// (De)serializes an [`Option<Date>`] as a nullable `YYYY-MM-DD` string.
pub mod iso_date_option {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(
        date: &Option<Date>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_some(&date.format(DATE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Date>, D::Error> {
        let value: Option<String> = Deserialize::deserialize(deserializer)?;

        value
            .map(|value| Date::parse(&value, DATE_FORMAT).map_err(de::Error::custom))
            .transpose()
    }
}

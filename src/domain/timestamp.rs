//! Serde helpers for backend timestamps.
//!
//! The backend emits ISO-8601 strings that may or may not carry a UTC
//! offset. Both forms are accepted and kept as the wall-clock time in the
//! offset the backend used.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn parse(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(aware) = DateTime::parse_from_rfc3339(value) {
        return Some(aware.naive_local());
    }
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`")))
}

/// Same as the parent module for optional timestamps.
pub mod option {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_naive_and_offset_timestamps() {
        let naive = parse("2025-03-01T10:15:00.123456").expect("naive timestamp");
        let aware = parse("2025-03-01T10:15:00.123456+05:30").expect("aware timestamp");
        assert_eq!(naive, aware);
        assert!(parse("2025-03-01 10:15:00").is_some());
        assert!(parse("yesterday").is_none());
    }
}

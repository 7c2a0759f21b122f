//! Records exchanged with the admin API, plus the serde helpers they share.

pub mod api_keys;
pub mod instances;
pub mod monitoring;
pub mod projects;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Wire format for timestamps sent to the backend.
pub const WIRE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Treat an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a backend timestamp.
///
/// The backend is not consistent: depending on the route and serializer configuration a
/// timestamp arrives as `2024-01-15 10:00:00`, `2024-01-15T10:00:00.123` or a full RFC 3339
/// string. Offsets are converted to local time, matching how the console displays them.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
    ] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Local).naive_local());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Lenient `Option<NaiveDateTime>` (de)serialization.
///
/// Accepts any format understood by [`parse_timestamp`], as well as the `[y, m, d, h, mi, s]`
/// array form some Java serializers emit. Anything unparseable becomes `None` rather than
/// failing the whole payload.
pub mod lenient_datetime {
    use super::{WIRE_DATETIME_FORMAT, parse_timestamp};
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(raw)) => parse_timestamp(&raw),
            Some(Value::Array(parts)) => from_parts(&parts),
            _ => None,
        })
    }

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(WIRE_DATETIME_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    fn from_parts(parts: &[Value]) -> Option<NaiveDateTime> {
        let part = |i: usize| parts.get(i).and_then(Value::as_u64).unwrap_or(0) as u32;
        let year = parts.first()?.as_i64()? as i32;
        NaiveDate::from_ymd_opt(year, part(1), part(2))?.and_hms_opt(part(3), part(4), part(5))
    }
}

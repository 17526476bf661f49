// Local wall-clock timestamps.
//
// Visit logs store times as the deployment's local time without an offset,
// rendered as `YYYY-MM-DD HH:MM:SS`. Everything that converts between
// instants, client strings and stored values goes through here.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, Timelike, Utc};

pub const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const LOCAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// How far a device clock may drift from the server before its time is ignored.
const MAX_DEVICE_CLOCK_SKEW_HOURS: i64 = 24;

const NAIVE_ISO_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

pub fn format_local(timestamp: &NaiveDateTime) -> String {
    timestamp.format(LOCAL_TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored or admin-supplied local timestamp. Accepts a `T`
/// separator and fractional seconds, which are dropped.
pub fn parse_local(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NAIVE_ISO_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(truncate_to_seconds)
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), LOCAL_DATE_FORMAT).ok()
}

pub fn to_local(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDateTime {
    truncate_to_seconds(instant.with_timezone(&offset).naive_local())
}

/// Picks the client's device time when it parses and lies within
/// [`MAX_DEVICE_CLOCK_SKEW_HOURS`] of the receive time, the server's receive
/// time otherwise. RFC 3339 values are converted into `offset`; values without
/// an offset are taken as already local.
pub fn resolve_device_time(
    device_time: Option<&str>,
    received_at: DateTime<Utc>,
    offset: FixedOffset,
) -> NaiveDateTime {
    let server_time = to_local(received_at, offset);
    let Some(raw) = device_time.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return server_time;
    };

    let parsed = match DateTime::parse_from_rfc3339(raw) {
        Ok(instant) => Some(to_local(instant.with_timezone(&Utc), offset)),
        Err(_) => parse_local(raw),
    };

    match parsed {
        Some(device) if within_clock_skew(device, server_time) => device,
        Some(_) => {
            tracing::debug!(device_time = raw, "device time too far from server time, using server time");
            server_time
        }
        None => {
            tracing::debug!(device_time = raw, "unparsable device time, using server time");
            server_time
        }
    }
}

fn within_clock_skew(device: NaiveDateTime, server: NaiveDateTime) -> bool {
    device.signed_duration_since(server).abs() <= TimeDelta::hours(MAX_DEVICE_CLOCK_SKEW_HOURS)
}

/// Parses `+08:00`, `-0530`, `+8`, `Z` or `UTC`.
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((hours, minutes)) => (hours, minutes),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn truncate_to_seconds(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp.with_nanosecond(0).unwrap_or(timestamp)
}

/// Serde adapter for `NaiveDateTime` in the local timestamp format.
pub mod local_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_local(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_local(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

pub mod local_timestamp_option {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&super::format_local(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse_local(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}"))),
            None => Ok(None),
        }
    }
}

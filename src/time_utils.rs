// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting, clocks and wire timestamps.

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Mutex;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Source of "now" for refresh decisions and listing windows.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Directus hands timestamps back either as epoch milliseconds (what we write)
/// or as RFC3339 strings (timestamp-typed fields).
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Millis(i64),
    Text(String),
}

impl WireTimestamp {
    fn into_datetime<E: serde::de::Error>(self) -> Result<DateTime<Utc>, E> {
        match self {
            WireTimestamp::Millis(ms) => DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| E::custom(format!("timestamp out of range: {ms}"))),
            WireTimestamp::Text(s) => {
                if let Ok(ms) = s.parse::<i64>() {
                    return DateTime::from_timestamp_millis(ms)
                        .ok_or_else(|| E::custom(format!("timestamp out of range: {ms}")));
                }
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .or_else(|_| {
                        // Directus `timestamp` fields without an offset are UTC.
                        chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
                            .map(|naive| naive.and_utc())
                    })
                    .map_err(|e| E::custom(format!("invalid timestamp {s:?}: {e}")))
            }
        }
    }
}

/// Serde adapter: `DateTime<Utc>` written as epoch milliseconds.
pub mod millis {
    use super::WireTimestamp;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(value.timestamp_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        WireTimestamp::deserialize(d)?.into_datetime()
    }
}

/// Serde adapter: nullable `DateTime<Utc>` written as epoch milliseconds.
pub mod millis_option {
    use super::WireTimestamp;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => s.serialize_some(&dt.timestamp_millis()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<WireTimestamp>::deserialize(d)?
            .map(WireTimestamp::into_datetime)
            .transpose()
    }
}

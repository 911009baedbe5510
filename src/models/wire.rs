//! Deserializers for loosely typed JSON coming from Directus and the TikTok API.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum IdOrNumber {
    Text(String),
    Number(serde_json::Number),
}

/// Item ids: Directus returns integer primary keys as numbers, uuids as strings.
pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match IdOrNumber::deserialize(d)? {
        IdOrNumber::Text(s) => s,
        IdOrNumber::Number(n) => n.to_string(),
    })
}

/// Treat an explicit `null` like a missing field.
pub fn null_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Counter that may arrive as a number, a numeric string, or not at all.
/// Anything unparseable counts as zero.
pub fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(count_from_value).unwrap_or(0))
}

/// Like [`lenient_count`], but keeps "absent" distinct from zero.
pub fn lenient_count_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(count_from_value))
}

/// Unix seconds as a number or numeric string.
pub fn epoch_seconds<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid epoch seconds {n}"))),
        serde_json::Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid epoch seconds {s:?}"))),
        other => Err(serde::de::Error::custom(format!(
            "invalid epoch seconds {other}"
        ))),
    }
}

pub(crate) fn count_from_value(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        serde_json::Value::String(s) => leading_digits(s.trim()),
        _ => None,
    }
}

/// `"123abc"` parses as 123, the way a lenient integer parse reads it.
fn leading_digits(s: &str) -> Option<u64> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

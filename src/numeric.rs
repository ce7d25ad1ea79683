//! Normalization of numeric fields received from the backend.
//!
//! Counts and ages may arrive as a plain JSON number, as a numeric string,
//! or boxed in an extended-JSON wrapper such as `{"$numberInt": "12"}`.
//! Every shape is mapped to a plain integer here; anything unrecognized
//! becomes `0`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

const WRAPPER_KEYS: [&str; 4] = ["$numberInt", "$numberLong", "$numberDouble", "$numberDecimal"];

/// Map any supported numeric shape to an integer
pub fn normalize(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(truncate))
            .unwrap_or(0),
        Value::String(s) => parse_str(s),
        Value::Object(map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .map(normalize)
            .unwrap_or(0),
        _ => 0,
    }
}

/// Like [`normalize`] but clamped at zero, for counts
pub fn normalize_count(value: &Value) -> u64 {
    normalize(value).max(0) as u64
}

fn parse_str(s: &str) -> i64 {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().map(truncate))
        .unwrap_or(0)
}

fn truncate(f: f64) -> i64 {
    if f.is_finite() {
        f.trunc() as i64
    } else {
        0
    }
}

/// `deserialize_with` adapter for integer fields
pub fn deserialize_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(normalize).unwrap_or(0))
}

/// `deserialize_with` adapter for count fields
pub fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(normalize_count).unwrap_or(0))
}

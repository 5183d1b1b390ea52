use chrono::{DateTime, NaiveDateTime, Utc};
use log::*;
use recon_common::MicroUnits;
use serde_json::Value;

/// The gate is not consistent about whether identifiers are numbers or strings.
pub fn json_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn json_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn json_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
}

/// Amounts arrive as JSON numbers or decimal strings. Missing or unparseable amounts are zero.
pub fn json_amount(value: &Value) -> MicroUnits {
    let amount = match value {
        Value::Null => return MicroUnits::default(),
        Value::Number(n) => n.as_f64().and_then(|f| MicroUnits::try_from(f).ok()),
        Value::String(s) => s.parse::<MicroUnits>().ok(),
        _ => None,
    };
    amount.unwrap_or_else(|| {
        warn!("Ignoring invalid amount {value}");
        MicroUnits::default()
    })
}

/// Timestamps are RFC 3339 strings. Timestamps without an offset are taken to be UTC.
pub fn json_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok().map(|t| t.and_utc()))
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|t| t.and_utc()))
}

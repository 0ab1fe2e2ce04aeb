//! Parser for the reply to the redis `INFO` command
//!
//! The reply is a text block of `key:value` lines grouped under `# Section`
//! headers:
//!
//! ```text
//! # Server
//! redis_version:7.2.4
//! uptime_in_seconds:3600
//!
//! # Keyspace
//! db0:keys=12,expires=0,avg_ttl=0
//! ```
//!
//! Values are typed on a best-effort basis: integers, then floats (only when
//! the value contains a `.`), then strings. A value holding both `,` and `=`
//! becomes a nested object typed the same way. Lines without a `:` are kept
//! verbatim under `__raw__`.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

/// Opaque metrics snapshot as reported by the remote server
pub type Metrics = BTreeMap<String, Value>;

const RAW_KEY: &str = "__raw__";

pub fn parse_info(reply: &str) -> Metrics {
    let mut metrics = Metrics::new();
    let mut raw = Vec::new();

    for line in reply.lines().map(str::trim_end) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.split_once(':') {
            Some((key, value)) => {
                metrics.insert(key.to_string(), parse_value(value));
            }
            None => raw.push(Value::String(line.to_string())),
        }
    }

    if !raw.is_empty() {
        metrics.insert(RAW_KEY.to_string(), Value::Array(raw));
    }
    metrics
}

fn parse_value(value: &str) -> Value {
    if value.contains(',') && value.contains('=') {
        let nested: Map<String, Value> = value
            .split(',')
            .filter_map(|item| item.rsplit_once('='))
            .map(|(key, value)| (key.to_string(), parse_value(value)))
            .collect();
        return Value::Object(nested);
    }

    parse_scalar(value)
}

fn parse_scalar(value: &str) -> Value {
    if value.contains('.') {
        if let Some(number) = value.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    } else if let Ok(int) = value.parse::<i64>() {
        return Value::Number(int.into());
    }
    Value::String(value.to_string())
}

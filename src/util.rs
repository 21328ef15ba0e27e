use regex::Regex;
use serde_json::{Map, Value};

lazy_static::lazy_static! {
    /// Case-insensitive match for the conventional portal label prefix.
    pub static ref PORTAL_LABEL_RE: Regex = Regex::new(r"(?i)^portal:").unwrap();
}

/// JSON objects are the only shape we trust field access on.
pub(crate) fn as_object(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object()
}

pub(crate) fn obj_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

pub(crate) fn obj_non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj_str(map, key).filter(|s| !s.trim().is_empty())
}

pub(crate) fn obj_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    obj_str(map, key).map(str::to_string)
}

pub(crate) fn obj_bool(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

pub(crate) fn obj_f64(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

pub(crate) fn obj_array<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Vec<Value>> {
    map.get(key).and_then(Value::as_array)
}

/// Collect the trimmed, non-empty string entries of an array value.
pub(crate) fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// All-or-nothing string list: `Some` only when every entry is a string.
pub(crate) fn strict_string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(item.as_str()?.to_string());
    }
    Some(out)
}

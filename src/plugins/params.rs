//! Typed accessors for plugin parameter maps.

use anyhow::{Result, anyhow};
use serde_json::Value;

use crate::core::models::Parameters;

/// A string parameter; absent and `null` both read as `None`.
pub fn str_param<'a>(parameters: &'a Parameters, key: &str) -> Result<Option<&'a str>> {
    match parameters.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(anyhow!("parameter '{key}' must be a string, got {other}")),
    }
}

pub fn bool_param(parameters: &Parameters, key: &str, default: bool) -> Result<bool> {
    match parameters.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(anyhow!("parameter '{key}' must be a boolean, got {other}")),
    }
}

pub fn int_param(parameters: &Parameters, key: &str, default: i64) -> Result<i64> {
    match parameters.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_i64()
            .ok_or_else(|| anyhow!("parameter '{key}' must be an integer, got {value}")),
    }
}

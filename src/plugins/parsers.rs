//! Configuration parsers for JSON, YAML and TOML.
//!
//! Each one accepts a document whose root is a map and rejects anything else.
//! 每个解析器都接受根为映射的文档，并拒绝其他任何形式。

use anyhow::{Result, bail};
use serde_json::Value;

use crate::core::models::Parameters;

fn into_document(value: Value, format: &str) -> Result<Parameters> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Parameters::new()),
        other => bail!(
            "{format} document root must be a map, found {}",
            kind_of(&other)
        ),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a map",
    }
}

pub fn parse_json(raw: &str) -> Result<Parameters> {
    let value: Value = serde_json::from_str(raw)?;
    match value {
        Value::Null => bail!("JSON document root must be a map, found null"),
        value => into_document(value, "JSON"),
    }
}

/// True when a YAML text holds no node at all, only blanks, comments or
/// document markers.
fn is_blank_yaml(raw: &str) -> bool {
    raw.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

pub fn parse_yaml(raw: &str) -> Result<Parameters> {
    if is_blank_yaml(raw) {
        return Ok(Parameters::new());
    }
    let value: Value = serde_yaml::from_str(raw)?;
    into_document(value, "YAML")
}

pub fn parse_toml(raw: &str) -> Result<Parameters> {
    let table: toml::Table = toml::from_str(raw)?;
    into_document(toml_to_json(toml::Value::Table(table))?, "TOML")
}

/// Datetimes become their RFC 3339 text, as YAML and JSON suites spell them.
fn toml_to_json(value: toml::Value) -> Result<Value> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => match serde_json::Number::from_f64(f) {
            Some(number) => Value::Number(number),
            None => bail!("TOML float {f} has no JSON representation"),
        },
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(datetime) => Value::String(datetime.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(toml_to_json)
                .collect::<Result<_>>()?,
        ),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| Ok((key, toml_to_json(value)?)))
                .collect::<Result<_>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_decode_to_the_same_document() {
        let expected = json!({"parameters": {"timeout": 5}, "tests": [{"name": "a"}]});

        let from_json = parse_json(r#"{"parameters": {"timeout": 5}, "tests": [{"name": "a"}]}"#).unwrap();
        let from_yaml = parse_yaml("parameters:\n  timeout: 5\ntests:\n  - name: a\n").unwrap();
        let from_toml = parse_toml("[parameters]\ntimeout = 5\n\n[[tests]]\nname = \"a\"\n").unwrap();

        assert_eq!(Value::Object(from_json), expected);
        assert_eq!(Value::Object(from_yaml), expected);
        assert_eq!(Value::Object(from_toml), expected);
    }

    #[test]
    fn toml_datetimes_decode_as_strings() {
        let from_toml = parse_toml("started = 2024-05-01T10:30:00Z\nday = 2024-05-01\n").unwrap();
        let from_yaml = parse_yaml("started: \"2024-05-01T10:30:00Z\"\nday: \"2024-05-01\"\n").unwrap();

        assert_eq!(
            Value::Object(from_toml.clone()),
            json!({"started": "2024-05-01T10:30:00Z", "day": "2024-05-01"})
        );
        assert_eq!(from_toml, from_yaml);
    }

    #[test]
    fn non_map_roots_are_rejected() {
        assert!(parse_json("[1, 2]").is_err());
        assert!(parse_json("null").is_err());
        assert!(parse_yaml("- a\n- b\n").is_err());
        assert!(parse_yaml("just text").is_err());
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(parse_json("{not json").is_err());
        assert!(parse_yaml("key: [unclosed").is_err());
        assert!(parse_toml("key = ").is_err());
    }

    #[test]
    fn blank_yaml_is_an_empty_document() {
        assert!(parse_yaml("").unwrap().is_empty());
        assert!(parse_yaml("# only a comment\n").unwrap().is_empty());
    }
}

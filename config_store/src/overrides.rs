use std::str::FromStr;

use serde_json::Value;

use crate::error::ConfigError;

/// A single `key=value` assignment given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    path: Vec<String>,
    value: Value,
}

impl Override {
    /// The dot separated key, split into segments.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn key(&self) -> String {
        self.path.join(".")
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Parses every argument as an override.
    ///
    /// # Errors
    /// `InvalidOverride` for the first argument that is not `key=value`.
    pub fn parse_all<I, S>(args: I) -> Result<Vec<Self>, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        args.into_iter().map(|arg| arg.as_ref().parse()).collect()
    }
}

impl FromStr for Override {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidOverride(raw.to_string());

        let (key, value) = raw.split_once('=').ok_or_else(invalid)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(invalid());
        }

        let path: Vec<String> = key.split('.').map(str::to_string).collect();
        if path.iter().any(String::is_empty) {
            return Err(invalid());
        }

        Ok(Self {
            path,
            value: parse_value(value.trim()),
        })
    }
}

/// Reads an override value as the most specific scalar it can be.
fn parse_value(raw: &str) -> Value {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return Value::String(raw[1..raw.len() - 1].to_string());
        }
    }

    match raw.to_ascii_lowercase().as_str() {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(n) = raw.parse::<i64>() {
        return n.into();
    }

    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() => f.into(),
        _ => Value::String(raw.to_string()),
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell. Tables carry no column types, so every value is text until
/// a comparison decides whether it reads as a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl Value {
    /// True for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text content, or `None` for NULL.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Null => None,
        }
    }

    /// Numeric reading of the cell, if it is a decimal number.
    pub fn as_number(&self) -> Option<f64> {
        self.as_text().and_then(parse_decimal)
    }
}

/// Parses `[+-]digits[.digits][(e|E)[+-]digits]`. Rejects the `inf`/`nan`
/// spellings `f64::from_str` would otherwise accept.
pub fn parse_decimal(s: &str) -> Option<f64> {
    let body = s.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(s);
    if !body.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Table and column names: ASCII alphanumerics and underscores.
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

//! Cell values and records
//!
//! Global invariants enforced:
//! - Coercion never fails: bad numerics read as 0, missing text reads as ""
//! - Field order is the order the payload delivered

/// Spellings the backend uses for an unbounded ratio
const SENTINEL_SPELLINGS: &[&str] = &["inf", "infinity", "∞"];

/// A single cell value as delivered by a backend analysis
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    /// Sentinel token (e.g. an unbounded ratio), original spelling kept
    Token(String),
    Absent,
}

impl Value {
    /// Classify a raw string from a payload
    pub fn from_text(s: &str) -> Value {
        if is_sentinel(s) {
            Value::Token(s.to_string())
        } else {
            Value::Text(s.to_string())
        }
    }

    /// Convert a decoded JSON value into a cell value
    pub fn from_json(v: &serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Absent,
            serde_json::Value::Bool(b) => Value::Text(b.to_string()),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) if f.is_finite() => Value::Number(f),
                _ => Value::Text(n.to_string()),
            },
            serde_json::Value::String(s) => Value::from_text(s),
            other => Value::Text(other.to_string()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn is_token(&self) -> bool {
        matches!(self, Value::Token(_))
    }

    /// Read the value as a finite number, if it has one
    ///
    /// Text is trimmed before parsing. Non-finite parse results ("NaN",
    /// "inf" spelled as plain text) do not count as numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    /// Numeric reading with the fail-soft default of 0
    pub fn number_or_zero(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// Text reading; absent is empty
    pub fn as_text(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Text(s) | Value::Token(s) => s.clone(),
            Value::Absent => String::new(),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::from_text(s)
    }
}

/// Whether a string spells the sentinel token
pub fn is_sentinel(s: &str) -> bool {
    let lower = s.trim().to_lowercase();
    SENTINEL_SPELLINGS.contains(&lower.as_str())
}

/// Render a number without a trailing ".0" for integral values
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Normalizes -0
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

/// One row of analysis output with a stable identity
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Stable identity; never rewritten by sorting
    pub id: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Record {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field insertion
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value.into());
        self
    }

    /// Build a record from a JSON object, keeping the object's key order
    pub fn from_json_object(
        id: impl Into<String>,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Record {
            id: id.into(),
            fields: object
                .iter()
                .map(|(k, v)| (k.clone(), Value::from_json(v)))
                .collect(),
        }
    }

    /// Insert or replace a field. Replacement keeps the original position.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Field value with missing fields read as `Absent`
    pub fn value(&self, key: &str) -> &Value {
        static ABSENT: Value = Value::Absent;
        self.get(key).unwrap_or(&ABSENT)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

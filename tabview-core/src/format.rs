//! Display transforms
//!
//! Transforms only change rendered text. Sorting always reads the
//! underlying value.

use crate::value::{format_number, Value};
use serde::{Deserialize, Serialize};

/// Per-field formatting applied when a cell is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayTransform {
    /// Value as delivered
    #[default]
    Raw,
    /// Seconds shown as whole minutes
    Minutes,
    /// Fixed-point with the given number of decimals
    Fixed { decimals: u8 },
}

impl DisplayTransform {
    pub fn render(&self, value: &Value) -> String {
        match self {
            DisplayTransform::Raw => value.as_text(),
            DisplayTransform::Minutes => match value {
                Value::Token(t) => t.clone(),
                other => seconds_to_minutes(other.number_or_zero()),
            },
            DisplayTransform::Fixed { decimals } => match value {
                Value::Token(t) => t.clone(),
                Value::Absent => String::new(),
                other => match other.as_number() {
                    Some(n) => format!("{:.*}", *decimals as usize, n),
                    None => other.as_text(),
                },
            },
        }
    }
}

/// `round(seconds / 60)` with halves rounded up
pub fn seconds_to_minutes(seconds: f64) -> String {
    let minutes = (seconds / 60.0 + 0.5).floor();
    format_number(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_zero_and_absent() {
        assert_eq!(DisplayTransform::Minutes.render(&Value::Number(0.0)), "0");
        assert_eq!(DisplayTransform::Minutes.render(&Value::Absent), "0");
    }

    #[test]
    fn test_minutes_rounds() {
        assert_eq!(DisplayTransform::Minutes.render(&Value::Number(125.0)), "2");
        assert_eq!(DisplayTransform::Minutes.render(&Value::Number(150.0)), "3");
        assert_eq!(DisplayTransform::Minutes.render(&Value::Number(29.0)), "0");
        assert_eq!(DisplayTransform::Minutes.render(&Value::Text("3600".into())), "60");
    }

    #[test]
    fn test_minutes_unparseable_is_zero() {
        assert_eq!(DisplayTransform::Minutes.render(&Value::Text("soon".into())), "0");
    }

    #[test]
    fn test_fixed() {
        let t = DisplayTransform::Fixed { decimals: 2 };
        assert_eq!(t.render(&Value::Number(2.0)), "2.00");
        assert_eq!(t.render(&Value::Number(1.0 / 3.0)), "0.33");
        assert_eq!(t.render(&Value::Token("Inf".into())), "Inf");
        assert_eq!(t.render(&Value::Absent), "");
        assert_eq!(t.render(&Value::Text("n/a".into())), "n/a");
    }

    #[test]
    fn test_raw_passthrough() {
        assert_eq!(DisplayTransform::Raw.render(&Value::Number(12.5)), "12.5");
        assert_eq!(DisplayTransform::Raw.render(&Value::Text("x".into())), "x");
    }

    #[test]
    fn test_serde_shapes() {
        let t: DisplayTransform = serde_json::from_str(r#"{"fixed": {"decimals": 1}}"#).unwrap();
        assert_eq!(t, DisplayTransform::Fixed { decimals: 1 });
        let t: DisplayTransform = serde_json::from_str(r#""minutes""#).unwrap();
        assert_eq!(t, DisplayTransform::Minutes);
    }
}

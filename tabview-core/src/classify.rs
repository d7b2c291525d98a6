//! Row classification engine
//!
//! Pure, stateless tagging from a single record.
//! No cross-row state. Same record always yields the same tag.
//!
//! Rules are evaluated in order and the first matching predicate wins.
//! Later rules are never consulted once one has matched.

use crate::compare::sentinel_number;
use crate::value::{Record, Value};
use serde::{Deserialize, Serialize};

/// Threshold comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdOp {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

impl ThresholdOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdOp::Gt => ">",
            ThresholdOp::Ge => ">=",
            ThresholdOp::Lt => "<",
            ThresholdOp::Le => "<=",
            ThresholdOp::Eq => "==",
            ThresholdOp::Ne => "!=",
        }
    }

    fn holds(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            ThresholdOp::Gt => lhs > rhs,
            ThresholdOp::Ge => lhs >= rhs,
            ThresholdOp::Lt => lhs < rhs,
            ThresholdOp::Le => lhs <= rhs,
            ThresholdOp::Eq => lhs == rhs,
            ThresholdOp::Ne => lhs != rhs,
        }
    }
}

/// Boolean condition over a record's fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Predicate {
    Any { any: Vec<Predicate> },
    All { all: Vec<Predicate> },
    Not { not: Box<Predicate> },
    Threshold {
        field: String,
        op: ThresholdOp,
        value: f64,
    },
}

impl Predicate {
    pub fn threshold(field: impl Into<String>, op: ThresholdOp, value: f64) -> Self {
        Predicate::Threshold {
            field: field.into(),
            op,
            value,
        }
    }

    pub fn any(preds: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Any {
            any: preds.into_iter().collect(),
        }
    }

    pub fn all(preds: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::All {
            all: preds.into_iter().collect(),
        }
    }

    pub fn negate(pred: Predicate) -> Self {
        Predicate::Not {
            not: Box::new(pred),
        }
    }

    /// Evaluate against a record
    ///
    /// A null field reads as 0. A threshold on a missing key or on
    /// non-numeric text never holds.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::Any { any } => any.iter().any(|p| p.matches(record)),
            Predicate::All { all } => all.iter().all(|p| p.matches(record)),
            Predicate::Not { not } => !not.matches(record),
            Predicate::Threshold { field, op, value } => {
                match record.get(field).and_then(threshold_operand) {
                    Some(lhs) => op.holds(lhs, *value),
                    None => false,
                }
            }
        }
    }

    /// Field names this predicate reads
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Any { any: preds } | Predicate::All { all: preds } => {
                for p in preds {
                    p.collect_fields(out);
                }
            }
            Predicate::Not { not } => not.collect_fields(out),
            Predicate::Threshold { field, .. } => out.push(field),
        }
    }
}

fn threshold_operand(v: &Value) -> Option<f64> {
    match v {
        Value::Token(_) => Some(sentinel_number(v)),
        Value::Absent => Some(0.0),
        Value::Text(t) if t.trim().is_empty() => Some(0.0),
        other => other.as_number(),
    }
}

/// One `(predicate, tag)` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassificationRule {
    pub tag: String,
    pub when: Predicate,
}

impl ClassificationRule {
    pub fn new(tag: impl Into<String>, when: Predicate) -> Self {
        ClassificationRule {
            tag: tag.into(),
            when,
        }
    }
}

/// Ordered rule list; first match wins, no match leaves the row untagged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowClassifier {
    rules: Vec<ClassificationRule>,
}

impl RowClassifier {
    pub fn rule(mut self, tag: impl Into<String>, when: Predicate) -> Self {
        self.rules.push(ClassificationRule::new(tag, when));
        self
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn classify(&self, record: &Record) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.when.matches(record))
            .map(|r| r.tag.as_str())
    }
}

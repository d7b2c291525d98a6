//! Field comparison policy and the row comparator
//!
//! Global invariants enforced:
//! - Comparison is a total order for every kind (no NaN reaches a compare)
//! - Sentinel tokens sort above every finite value under `NumericSentinel`
//! - Ties are left to the caller's stable sort

use crate::value::{Record, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Reading of a sentinel token; every other operand is finite
pub const SENTINEL_MAGNITUDE: f64 = f64::INFINITY;

/// How a field's values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareKind {
    /// Case-insensitive text; absent reads as ""
    Text,
    /// Real numbers; absent or unparseable reads as 0
    #[default]
    Numeric,
    /// Numeric, with sentinel tokens reading as the maximum
    NumericSentinel,
}

impl CompareKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareKind::Text => "text",
            CompareKind::Numeric => "numeric",
            CompareKind::NumericSentinel => "numeric_sentinel",
        }
    }

    /// Natural (ascending) ordering of two values under this kind
    pub fn compare_values(&self, a: &Value, b: &Value) -> Ordering {
        match self {
            CompareKind::Text => a.as_text().to_lowercase().cmp(&b.as_text().to_lowercase()),
            CompareKind::Numeric => cmp_f64(a.number_or_zero(), b.number_or_zero()),
            CompareKind::NumericSentinel => cmp_f64(sentinel_number(a), sentinel_number(b)),
        }
    }
}

/// Sort direction for the active column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Apply the direction to a natural ordering
    pub fn apply(self, natural: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => natural,
            SortDirection::Descending => natural.reverse(),
        }
    }

    /// Header indicator glyph
    pub fn glyph(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Active sort key and direction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn unsorted() -> Self {
        SortState::default()
    }

    pub fn by(key: impl Into<String>, direction: SortDirection) -> Self {
        SortState {
            key: Some(key.into()),
            direction,
        }
    }

    /// Header-click transition: same key flips, new key starts ascending
    pub fn toggled(&self, field: &str) -> SortState {
        if self.key.as_deref() == Some(field) {
            SortState {
                key: self.key.clone(),
                direction: self.direction.flip(),
            }
        } else {
            SortState::by(field, SortDirection::Ascending)
        }
    }
}

/// Per-field comparison kinds, with a fallback for unlisted fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldComparatorPolicy {
    #[serde(default)]
    pub fields: BTreeMap<String, CompareKind>,
    #[serde(default)]
    pub default_kind: CompareKind,
}

impl FieldComparatorPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, kind: CompareKind) -> Self {
        self.fields.insert(field.into(), kind);
        self
    }

    pub fn kind_for(&self, field: &str) -> CompareKind {
        self.fields.get(field).copied().unwrap_or(self.default_kind)
    }

    /// Compare two records on `field` under `direction`
    pub fn compare(
        &self,
        a: &Record,
        b: &Record,
        field: &str,
        direction: SortDirection,
    ) -> Ordering {
        let natural = self
            .kind_for(field)
            .compare_values(a.value(field), b.value(field));
        direction.apply(natural)
    }
}

/// Numeric reading that maps sentinel tokens to the maximum
pub fn sentinel_number(v: &Value) -> f64 {
    if v.is_token() {
        SENTINEL_MAGNITUDE
    } else {
        v.number_or_zero()
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    // Inputs are finite or the sentinel, never NaN
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

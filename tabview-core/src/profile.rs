//! Dataset profiles
//!
//! A profile is the static configuration for one dataset shape: which
//! columns exist, how each compares and renders, which derived ratio
//! columns to compute, how rows are tagged, and the default sort.

use crate::classify::{Predicate, RowClassifier, ThresholdOp};
use crate::compare::{CompareKind, FieldComparatorPolicy, SortDirection, SortState};
use crate::format::DisplayTransform;
use crate::value::{Record, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Token written into a derived ratio with a zero denominator
pub const UNBOUNDED_TOKEN: &str = "Inf";

/// Where the records sit inside a backend payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Array of objects under `key` (or the root array when `key` is None)
    List {
        #[serde(default)]
        key: Option<String>,
    },
    /// Object of objects under `key`; map keys become record ids
    Keyed { key: String },
}

impl Default for RecordSource {
    fn default() -> Self {
        RecordSource::List { key: None }
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub key: String,
    pub header: String,
    pub display: DisplayTransform,
    pub sortable: bool,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        ColumnSpec {
            key: key.into(),
            header: header.into(),
            display: DisplayTransform::Raw,
            sortable: true,
        }
    }

    pub fn display(mut self, display: DisplayTransform) -> Self {
        self.display = display;
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}

/// Ratio column computed from two source fields at load time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DerivedField {
    pub key: String,
    pub numerator: String,
    pub denominator: String,
}

impl DerivedField {
    pub fn ratio(
        key: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
    ) -> Self {
        DerivedField {
            key: key.into(),
            numerator: numerator.into(),
            denominator: denominator.into(),
        }
    }

    /// Compute the ratio for one record
    ///
    /// A zero denominator yields the unbounded token when the numerator is
    /// positive, and 0 otherwise.
    pub fn compute(&self, record: &Record) -> Value {
        let num = record.value(&self.numerator).number_or_zero();
        let den = record.value(&self.denominator).number_or_zero();
        if den == 0.0 {
            if num > 0.0 {
                Value::Token(UNBOUNDED_TOKEN.to_string())
            } else {
                Value::Number(0.0)
            }
        } else {
            Value::Number(num / den)
        }
    }
}

/// Static configuration for one dataset shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub name: String,
    pub title: String,
    pub source: RecordSource,
    /// Explicit columns; empty means infer from the first record
    pub columns: Vec<ColumnSpec>,
    pub comparators: FieldComparatorPolicy,
    /// Display transforms for inferred columns, keyed by field suffix
    pub suffix_display: BTreeMap<String, DisplayTransform>,
    pub derived: Vec<DerivedField>,
    pub rules: RowClassifier,
    pub default_sort: SortState,
}

impl DatasetProfile {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        DatasetProfile {
            name: name.into(),
            title: title.into(),
            source: RecordSource::default(),
            columns: Vec::new(),
            comparators: FieldComparatorPolicy::default(),
            suffix_display: BTreeMap::new(),
            derived: Vec::new(),
            rules: RowClassifier::default(),
            default_sort: SortState::unsorted(),
        }
    }

    pub fn source(mut self, source: RecordSource) -> Self {
        self.source = source;
        self
    }

    /// Add a column together with its comparison kind
    pub fn column(mut self, column: ColumnSpec, kind: CompareKind) -> Self {
        self.comparators.fields.insert(column.key.clone(), kind);
        self.columns.push(column);
        self
    }

    pub fn comparator(mut self, field: impl Into<String>, kind: CompareKind) -> Self {
        self.comparators.fields.insert(field.into(), kind);
        self
    }

    pub fn suffix_display(mut self, suffix: impl Into<String>, display: DisplayTransform) -> Self {
        self.suffix_display.insert(suffix.into(), display);
        self
    }

    pub fn derived(mut self, derived: DerivedField) -> Self {
        self.derived.push(derived);
        self
    }

    pub fn rules(mut self, rules: RowClassifier) -> Self {
        self.rules = rules;
        self
    }

    pub fn default_sort(mut self, key: impl Into<String>, direction: SortDirection) -> Self {
        self.default_sort = SortState::by(key, direction);
        self
    }

    pub fn infers_columns(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns for a batch: the declared list, or the first record's fields
    pub fn columns_for(&self, records: &[Record]) -> Vec<ColumnSpec> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        let Some(first) = records.first() else {
            return Vec::new();
        };
        first
            .keys()
            .map(|key| ColumnSpec::new(key, key).display(self.inferred_display(key)))
            .collect()
    }

    fn inferred_display(&self, key: &str) -> DisplayTransform {
        self.suffix_display
            .iter()
            .find(|(suffix, _)| key.ends_with(suffix.as_str()))
            .map(|(_, d)| *d)
            .unwrap_or_default()
    }

    /// Attach derived fields to a record
    pub fn enrich(&self, record: &mut Record) {
        for derived in &self.derived {
            let value = derived.compute(record);
            record.set(derived.key.clone(), value);
        }
    }
}

/// Names of the built-in profiles
pub const BUILTIN_PROFILES: &[&str] = &["inactivity", "calls", "productivity"];

/// Look up a built-in profile by name
pub fn builtin(name: &str) -> Option<DatasetProfile> {
    match name {
        "inactivity" => Some(inactivity_profile()),
        "calls" => Some(calls_profile()),
        "productivity" => Some(productivity_profile()),
        _ => None,
    }
}

/// All built-in profiles, in declaration order
pub fn builtins() -> Vec<DatasetProfile> {
    vec![
        inactivity_profile(),
        calls_profile(),
        productivity_profile(),
    ]
}

/// Account inactivity report (workspace accounts, storage usage)
pub fn inactivity_profile() -> DatasetProfile {
    use ThresholdOp::{Gt, Lt};

    DatasetProfile::new("inactivity", "Google Suites Report")
        .source(RecordSource::List {
            key: Some("results".to_string()),
        })
        .column(ColumnSpec::new("email", "Email"), CompareKind::Text)
        .column(ColumnSpec::new("last_login", "Last Login"), CompareKind::Text)
        .column(
            ColumnSpec::new("inactive_days", "Inactive Days"),
            CompareKind::Numeric,
        )
        .column(
            ColumnSpec::new("storage_gb", "Storage (GB)"),
            CompareKind::Numeric,
        )
        .rules(
            RowClassifier::default()
                .rule(
                    "high-usage",
                    Predicate::any([
                        Predicate::threshold("storage_gb", Gt, 10.0),
                        Predicate::threshold("inactive_days", Gt, 100.0),
                    ]),
                )
                .rule("moderate-usage", Predicate::threshold("storage_gb", Gt, 5.0))
                .rule("low-usage", Predicate::threshold("storage_gb", Lt, 2.0)),
        )
        .default_sort("inactive_days", SortDirection::Descending)
}

/// Call analysis report (per-user call volume from a phone-system export)
pub fn calls_profile() -> DatasetProfile {
    let ratio = DisplayTransform::Fixed { decimals: 2 };

    DatasetProfile::new("calls", "Top Users Based on Total Duration")
        .source(RecordSource::List {
            key: Some("users".to_string()),
        })
        .column(ColumnSpec::new("Name", "Name"), CompareKind::Text)
        .column(
            ColumnSpec::new("Total Hours", "Total Hours"),
            CompareKind::Numeric,
        )
        .column(
            ColumnSpec::new("Missed Calls", "Missed Calls"),
            CompareKind::Numeric,
        )
        .column(
            ColumnSpec::new("Voicemails", "Voicemails"),
            CompareKind::Numeric,
        )
        .column(
            ColumnSpec::new("Call Ratio (Inbound/Outbound)", "Call Ratio (In/Out)").display(ratio),
            CompareKind::NumericSentinel,
        )
        .column(
            ColumnSpec::new(
                "Duration Ratio (Inbound/Outbound)",
                "Duration Ratio (In/Out)",
            )
            .display(ratio),
            CompareKind::NumericSentinel,
        )
        .default_sort("Total Hours", SortDirection::Descending)
}

/// Issue-tracker productivity report; columns follow the payload
pub fn productivity_profile() -> DatasetProfile {
    DatasetProfile::new("productivity", "JIRA Productivity Analyzer")
        .source(RecordSource::Keyed {
            key: "user_stats".to_string(),
        })
        .comparator("assignee", CompareKind::Text)
        .suffix_display("_seconds", DisplayTransform::Minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_with_zero_denominator() {
        let d = DerivedField::ratio("ratio", "in", "out");
        let ann = Record::new("ann").with("in", 3.0).with("out", 0.0);
        assert_eq!(d.compute(&ann), Value::Token("Inf".into()));
        let idle = Record::new("idle").with("in", 0.0).with("out", 0.0);
        assert_eq!(d.compute(&idle), Value::Number(0.0));
        let bob = Record::new("bob").with("in", 10.0).with("out", 5.0);
        assert_eq!(d.compute(&bob), Value::Number(2.0));
    }

    #[test]
    fn test_enrich_appends_derived() {
        let profile = DatasetProfile::new("t", "T").derived(DerivedField::ratio("r", "a", "b"));
        let mut rec = Record::new("x").with("a", 4.0).with("b", 2.0);
        profile.enrich(&mut rec);
        assert_eq!(rec.value("r"), &Value::Number(2.0));
        assert_eq!(rec.keys().last(), Some("r"));
    }

    #[test]
    fn test_inferred_columns_follow_first_record() {
        let profile = productivity_profile();
        let records = vec![Record::new("alice")
            .with("assignee", "alice")
            .with("resolved", 3.0)
            .with("avg_resolution_seconds", 600.0)];
        let cols = profile.columns_for(&records);
        let keys: Vec<&str> = cols.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["assignee", "resolved", "avg_resolution_seconds"]);
        assert_eq!(cols[2].display, DisplayTransform::Minutes);
        assert_eq!(cols[0].display, DisplayTransform::Raw);
        assert!(profile.columns_for(&[]).is_empty());
    }

    #[test]
    fn test_builtins_lookup() {
        for name in BUILTIN_PROFILES {
            assert_eq!(builtin(name).map(|p| p.name), Some(name.to_string()));
        }
        assert!(builtin("nope").is_none());
        assert_eq!(builtins().len(), BUILTIN_PROFILES.len());
    }

    #[test]
    fn test_calls_ratio_columns_are_sentinel_aware() {
        let profile = calls_profile();
        assert_eq!(
            profile.comparators.kind_for("Call Ratio (Inbound/Outbound)"),
            CompareKind::NumericSentinel
        );
        assert_eq!(profile.comparators.kind_for("Name"), CompareKind::Text);
    }
}

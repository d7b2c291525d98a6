//! Backend payload decoding
//!
//! Turns an analysis response into a record batch, or an error that is
//! reported before the engine ever sees the batch. The engine is never
//! handed a partial or error-shaped payload.

use crate::profile::RecordSource;
use crate::value::Record;
use anyhow::{Context, Result};
use serde_json::Value as Json;
use std::path::Path;

/// A decoded batch plus whatever summary block accompanied it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub records: Vec<Record>,
    pub summary: Option<Json>,
}

/// Decode a payload according to the profile's record source
pub fn decode_payload(payload: &Json, source: &RecordSource) -> Result<Batch> {
    if let Some(message) = payload.get("error").and_then(Json::as_str) {
        anyhow::bail!("analysis failed: {}", message);
    }

    let records = match source {
        RecordSource::List { key } => {
            let list = match key {
                Some(key) => payload
                    .get(key)
                    .with_context(|| format!("no results returned (missing \"{}\")", key))?,
                None => payload,
            };
            decode_list(list)?
        }
        RecordSource::Keyed { key } => {
            let map = payload
                .get(key)
                .with_context(|| format!("no results returned (missing \"{}\")", key))?;
            decode_keyed(map)?
        }
    };

    warn_on_ragged(&records);
    let summary = payload.get("summary").filter(|s| !s.is_null()).cloned();

    Ok(Batch { records, summary })
}

/// Parse and decode payload text
pub fn decode_str(text: &str, source: &RecordSource) -> Result<Batch> {
    let payload: Json = serde_json::from_str(text).context("payload is not valid JSON")?;
    decode_payload(&payload, source)
}

/// Read and decode a payload file
pub fn load_payload_file(path: &Path, source: &RecordSource) -> Result<Batch> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload: {}", path.display()))?;
    decode_str(&content, source).with_context(|| format!("failed to decode payload: {}", path.display()))
}

/// Batches are expected to share one field set; columns follow the first record
fn warn_on_ragged(records: &[Record]) {
    let Some(first) = records.first() else {
        return;
    };
    for record in &records[1..] {
        if record.len() != first.len() || first.keys().any(|k| !record.contains(k)) {
            tracing::warn!(
                id = %record.id,
                first = %first.id,
                "record fields differ from the first record"
            );
        }
    }
}

fn decode_list(list: &Json) -> Result<Vec<Record>> {
    let items = list
        .as_array()
        .context("expected an array of records")?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let object = item
                .as_object()
                .with_context(|| format!("record {} is not an object", idx))?;
            Ok(Record::from_json_object(idx.to_string(), object))
        })
        .collect()
}

fn decode_keyed(map: &Json) -> Result<Vec<Record>> {
    let entries = map
        .as_object()
        .context("expected an object of records keyed by id")?;

    entries
        .iter()
        .map(|(id, item)| {
            let object = item
                .as_object()
                .with_context(|| format!("record \"{}\" is not an object", id))?;
            Ok(Record::from_json_object(id.clone(), object))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use serde_json::json;

    fn list(key: &str) -> RecordSource {
        RecordSource::List {
            key: Some(key.to_string()),
        }
    }

    #[test]
    fn test_decode_list_under_key() {
        let payload = json!({"results": [
            {"email": "a@x.io", "inactive_days": 120, "storage_gb": 1.5},
            {"email": "b@x.io", "inactive_days": 3, "storage_gb": null}
        ]});
        let batch = decode_payload(&payload, &list("results")).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].id, "0");
        assert_eq!(batch.records[1].id, "1");
        assert!(batch.records[1].value("storage_gb").is_absent());
        assert!(batch.summary.is_none());
    }

    #[test]
    fn test_decode_root_array() {
        let payload = json!([{"a": 1}]);
        let batch = decode_payload(&payload, &RecordSource::List { key: None }).unwrap();
        assert_eq!(batch.records.len(), 1);
    }

    #[test]
    fn test_decode_keyed_keeps_ids_and_summary() {
        let payload = json!({
            "summary": {"total_issues": 12},
            "user_stats": {
                "u-42": {"assignee": "Zoe", "resolved": 5},
                "u-07": {"assignee": "Max", "resolved": 7}
            }
        });
        let source = RecordSource::Keyed {
            key: "user_stats".to_string(),
        };
        let batch = decode_payload(&payload, &source).unwrap();
        let ids: Vec<&str> = batch.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["u-42", "u-07"]);
        assert_eq!(batch.summary, Some(json!({"total_issues": 12})));
    }

    #[test]
    fn test_empty_list_is_valid() {
        let batch = decode_payload(&json!({"users": []}), &list("users")).unwrap();
        assert!(batch.records.is_empty());
    }

    #[test]
    fn test_error_payload_is_reported() {
        let err = decode_payload(&json!({"error": "bad token"}), &list("users")).unwrap_err();
        assert!(err.to_string().contains("bad token"));
    }

    #[test]
    fn test_missing_key_is_reported() {
        let err = decode_payload(&json!({"other": []}), &list("users")).unwrap_err();
        assert!(err.to_string().contains("no results returned"));
    }

    #[test]
    fn test_non_object_record_is_rejected() {
        assert!(decode_payload(&json!({"users": [1, 2]}), &list("users")).is_err());
        assert!(decode_payload(&json!({"users": {"a": 1}}), &list("users")).is_err());
    }

    #[test]
    fn test_sentinel_strings_become_tokens() {
        let payload = json!({"users": [{"Call Ratio (Inbound/Outbound)": "inf"}]});
        let batch = decode_payload(&payload, &list("users")).unwrap();
        assert_eq!(
            batch.records[0].value("Call Ratio (Inbound/Outbound)"),
            &Value::Token("inf".into())
        );
    }

    #[test]
    fn test_invalid_json_text() {
        assert!(decode_str("{not json", &list("users")).is_err());
    }
}

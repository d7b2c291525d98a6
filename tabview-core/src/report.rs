//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Output order is exactly the view order
//! - Byte-for-byte identical output for identical (batch, profile, sort)

use crate::compare::SortState;
use crate::engine::TabularView;
use serde::Serialize;

/// Widest a text column may grow before values are truncated
const MAX_TEXT_WIDTH: usize = 32;

/// One rendered row in JSON output
#[derive(Debug, Clone, Serialize)]
pub struct RowReport {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Display text per column, in column order
    pub cells: serde_json::Map<String, serde_json::Value>,
}

/// Complete JSON report for a view
#[derive(Debug, Clone, Serialize)]
pub struct ViewReport {
    pub profile: String,
    pub title: String,
    pub sort: SortState,
    pub rows: Vec<RowReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<serde_json::Value>,
}

impl ViewReport {
    pub fn from_view(view: &TabularView, summary: Option<&serde_json::Value>) -> Self {
        let columns = view.columns();
        let rows = view
            .rows()
            .map(|row| RowReport {
                id: row.record.id.clone(),
                tag: row.tag.map(str::to_string),
                cells: columns
                    .iter()
                    .map(|c| (c.key.clone(), serde_json::Value::String(row.cell(c))))
                    .collect(),
            })
            .collect();

        ViewReport {
            profile: view.profile().name.clone(),
            title: view.profile().title.clone(),
            sort: view.sort_state().clone(),
            rows,
            summary: summary.cloned(),
        }
    }
}

/// Render a view as a fixed-width text table
pub fn render_text(view: &TabularView) -> String {
    let mut output = String::new();
    let headers = view.headers();

    if view.is_empty() {
        output.push_str("No data.\n");
        return output;
    }

    let rendered: Vec<(Vec<String>, &str)> = view
        .rows()
        .map(|row| {
            let cells = view.columns().iter().map(|c| row.cell(c)).collect();
            (cells, row.tag.unwrap_or("-"))
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let widest = rendered
                .iter()
                .map(|(cells, _)| cells[i].chars().count())
                .max()
                .unwrap_or(0);
            widest.max(h.label().chars().count()).min(MAX_TEXT_WIDTH)
        })
        .collect();

    // Header
    for (header, width) in headers.iter().zip(&widths) {
        output.push_str(&pad(&header.label(), *width));
        output.push(' ');
    }
    output.push_str("TAG\n");

    // Rows
    for (cells, tag) in &rendered {
        for (cell, width) in cells.iter().zip(&widths) {
            output.push_str(&pad(cell, *width));
            output.push(' ');
        }
        output.push_str(tag);
        output.push('\n');
    }

    output
}

/// Render a view as pretty JSON
pub fn render_json(view: &TabularView, summary: Option<&serde_json::Value>) -> String {
    let report = ViewReport::from_view(view, summary);
    serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
}

/// Truncate or pad string to fixed width (counted in chars)
fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len > width {
        if width <= 3 {
            return s.chars().take(width).collect();
        }
        let kept: String = s.chars().take(width - 3).collect();
        format!("{}...", kept)
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::inactivity_profile;
    use crate::value::Record;

    fn view() -> TabularView {
        let records = vec![
            Record::new("0")
                .with("email", "ann@example.com")
                .with("last_login", "2024-01-02")
                .with("inactive_days", 12.0)
                .with("storage_gb", 1.0),
            Record::new("1")
                .with("email", "bob@example.com")
                .with("last_login", "2023-06-30")
                .with("inactive_days", 200.0)
                .with("storage_gb", 3.5),
        ];
        TabularView::with_records(inactivity_profile(), records)
    }

    #[test]
    fn test_text_has_header_marker_and_tags() {
        let text = render_text(&view());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Inactive Days ▼"));
        assert!(lines[0].ends_with("TAG"));
        assert!(lines[1].starts_with("bob@example.com"));
        assert!(lines[1].ends_with("high-usage"));
        assert!(lines[2].ends_with("low-usage"));
    }

    #[test]
    fn test_text_empty_view() {
        let empty = TabularView::with_records(inactivity_profile(), Vec::new());
        assert_eq!(render_text(&empty), "No data.\n");
    }

    #[test]
    fn test_json_report_shape() {
        let summary = serde_json::json!({"total": 2});
        let json = render_json(&view(), Some(&summary));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["profile"], "inactivity");
        assert_eq!(parsed["sort"]["key"], "inactive_days");
        assert_eq!(parsed["sort"]["direction"], "descending");
        assert_eq!(parsed["rows"][0]["id"], "1");
        assert_eq!(parsed["rows"][0]["tag"], "high-usage");
        assert_eq!(parsed["rows"][0]["cells"]["storage_gb"], "3.5");
        assert_eq!(parsed["summary"]["total"], 2);
    }

    #[test]
    fn test_json_omits_missing_tag_and_summary() {
        let records = vec![Record::new("0").with("storage_gb", 3.0)];
        let view = TabularView::with_records(inactivity_profile(), records);
        let parsed: serde_json::Value = serde_json::from_str(&render_json(&view, None)).unwrap();
        assert!(parsed["rows"][0].get("tag").is_none());
        assert!(parsed.get("summary").is_none());
    }

    #[test]
    fn test_pad_truncates_long_values() {
        assert_eq!(pad("abcdefgh", 6), "abc...");
        assert_eq!(pad("ab", 4), "ab  ");
    }

    #[test]
    fn test_pad_never_exceeds_narrow_width() {
        assert_eq!(pad("abcdef", 3), "abc");
        assert_eq!(pad("abcdef", 2), "ab");
        assert_eq!(pad("abcdef", 0), "");
        assert_eq!(pad("abcd", 4), "abcd");
    }
}

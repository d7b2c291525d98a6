//! HTML report generation
//!
//! Generates a self-contained static HTML page with embedded CSS.
//! Visual state is derived purely from flags: header classes come from
//! (sortable, active, direction) and hover is left to CSS, so nothing here
//! tracks presentation state.

use crate::engine::{HeaderCell, TabularView};

/// Render a view as a standalone HTML page
pub fn render_html(view: &TabularView, summary: Option<&serde_json::Value>) -> String {
    let profile = view.profile();
    let summary_section = summary.map(render_summary).unwrap_or_default();
    let body = if view.is_empty() {
        r#"<p class="empty">No data.</p>"#.to_string()
    } else {
        render_table(view)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        {summary}
        {body}
        {footer}
    </div>
</body>
</html>"#,
        title = html_escape(&profile.title),
        css = inline_css(),
        summary = summary_section,
        body = body,
        footer = render_footer(view),
    )
}

/// CSS classes for a header cell, derived only from its state flags
pub fn header_classes(header: &HeaderCell) -> String {
    let mut classes = Vec::new();
    if header.sortable {
        classes.push("sortable");
    }
    if header.active {
        classes.push("active");
    }
    if let Some(dir) = header.direction {
        classes.push(dir.as_str());
    }
    classes.join(" ")
}

/// CSS class for a row tag; anything outside [a-z0-9-] becomes '-'
pub fn tag_class(tag: &str) -> String {
    tag.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn render_table(view: &TabularView) -> String {
    let header_cells: String = view
        .headers()
        .iter()
        .map(|h| {
            format!(
                r#"<th class="{classes}" data-column="{key}">{label}</th>"#,
                classes = header_classes(h),
                key = html_escape(&h.key),
                label = html_escape(&h.label()),
            )
        })
        .collect();

    let rows: String = view
        .rows()
        .map(|row| {
            let cells: String = view
                .columns()
                .iter()
                .map(|c| format!("<td>{}</td>", html_escape(&row.cell(c))))
                .collect();
            let class = row
                .tag
                .map(|t| format!(r#" class="{}""#, tag_class(t)))
                .unwrap_or_default();
            format!(
                r#"<tr data-id="{id}"{class}>{cells}</tr>"#,
                id = html_escape(&row.record.id),
                class = class,
                cells = cells,
            )
        })
        .collect::<Vec<_>>()
        .join("\n                ");

    format!(
        r#"<div class="table-wrapper">
        <table>
            <thead>
                <tr>{header_cells}</tr>
            </thead>
            <tbody>
                {rows}
            </tbody>
        </table>
    </div>"#,
        header_cells = header_cells,
        rows = rows,
    )
}

fn render_summary(summary: &serde_json::Value) -> String {
    let pretty = serde_json::to_string_pretty(summary).unwrap_or_default();
    format!(
        r#"<section class="summary">
        <h2>Overall Summary</h2>
        <pre>{}</pre>
    </section>"#,
        html_escape(&pretty)
    )
}

fn render_footer(view: &TabularView) -> String {
    let sort = match &view.sort_state().key {
        Some(key) => format!("sorted by {} ({})", key, view.sort_state().direction.as_str()),
        None => "arrival order".to_string(),
    };
    format!(
        r#"<footer>
    <p>{} rows, {}. Generated by tabview</p>
</footer>"#,
        view.len(),
        html_escape(&sort)
    )
}

/// Inline CSS for the report
fn inline_css() -> &'static str {
    r#"
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; background: #f5f6f8; color: #1f2328; }
.container { max-width: 1100px; margin: 0 auto; padding: 24px; }
h1 { font-size: 1.6rem; margin-bottom: 16px; }
.summary pre { background: #eef0f3; padding: 12px; border-radius: 4px; font-size: 0.85rem; }
.table-wrapper { overflow-x: auto; background: #fff; border-radius: 6px; box-shadow: 0 1px 3px rgba(0,0,0,0.08); }
table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
th, td { padding: 8px 12px; border-bottom: 1px solid #e3e5e8; text-align: left; white-space: nowrap; }
th { background: #e9ebee; font-weight: 600; }
th.sortable { cursor: pointer; user-select: none; }
th.sortable:hover { background: #dde1e6; }
th.active { background: #d3dae3; }
tr.high-usage { background: #fde2e1; }
tr.moderate-usage { background: #fff4d6; }
tr.low-usage { background: #e3f4e6; }
.empty { color: #6a737d; font-style: italic; }
footer { margin-top: 16px; color: #6a737d; font-size: 0.8rem; }
"#
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::SortDirection;
    use crate::profile::inactivity_profile;
    use crate::value::Record;

    fn header(sortable: bool, active: bool, direction: Option<SortDirection>) -> HeaderCell {
        HeaderCell {
            key: "k".into(),
            header: "K".into(),
            sortable,
            active,
            direction,
        }
    }

    #[test]
    fn test_header_classes_from_flags() {
        assert_eq!(header_classes(&header(false, false, None)), "");
        assert_eq!(header_classes(&header(true, false, None)), "sortable");
        assert_eq!(
            header_classes(&header(true, true, Some(SortDirection::Descending))),
            "sortable active desc"
        );
    }

    #[test]
    fn test_tag_class_sanitizes() {
        assert_eq!(tag_class("high-usage"), "high-usage");
        assert_eq!(tag_class("Needs Review!"), "needs-review-");
    }

    #[test]
    fn test_render_escapes_values() {
        let records = vec![Record::new("0")
            .with("email", "<script>@x.io")
            .with("storage_gb", 12.0)];
        let view = TabularView::with_records(inactivity_profile(), records);
        let html = render_html(&view, None);
        assert!(html.contains("&lt;script&gt;@x.io"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"<tr data-id="0" class="high-usage">"#));
        assert!(html.contains(r#"class="sortable active desc" data-column="inactive_days""#));
    }

    #[test]
    fn test_render_empty_and_summary() {
        let view = TabularView::with_records(inactivity_profile(), Vec::new());
        let summary = serde_json::json!({"total": 0});
        let html = render_html(&view, Some(&summary));
        assert!(html.contains("No data."));
        assert!(html.contains("Overall Summary"));
        assert!(html.contains("0 rows"));
    }
}

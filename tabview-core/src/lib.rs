//! tabview core library - sort and classify tabular analysis results

#![deny(warnings)]

// Global invariants enforced in this crate:
// - The displayed order is a pure function of (batch, profile, sort state)
// - Sorting is stable; ties keep arrival order in both directions
// - Every comparison is a total order; no NaN reaches a comparator
// - Classification is first-match and never depends on display order
// - Display transforms never feed back into comparison
// - No global mutable state, clocks or randomness
// - Identical input yields byte-for-byte identical output

pub mod classify;
pub mod compare;
pub mod config;
pub mod engine;
pub mod format;
pub mod html;
pub mod input;
pub mod profile;
pub mod report;
pub mod value;

pub use classify::{Predicate, RowClassifier, ThresholdOp};
pub use compare::{CompareKind, FieldComparatorPolicy, SortDirection, SortState};
pub use config::ResolvedConfig;
pub use engine::{HeaderCell, TabularView, ViewRow};
pub use format::DisplayTransform;
pub use html::render_html;
pub use input::Batch;
pub use profile::{ColumnSpec, DatasetProfile, DerivedField, RecordSource};
pub use report::{render_json, render_text, ViewReport};
pub use value::{Record, Value};

use anyhow::{Context, Result};

/// Load a payload file under a profile and apply header clicks in order
///
/// Returns the view together with the payload's summary block, if any.
pub fn open_view(
    path: &std::path::Path,
    profile: &DatasetProfile,
    clicks: &[String],
) -> Result<(TabularView, Option<serde_json::Value>)> {
    let batch = input::load_payload_file(path, &profile.source)?;
    let mut view = TabularView::with_records(profile.clone(), batch.records);
    for field in clicks {
        view.toggle_sort(field)
            .with_context(|| format!("cannot sort by \"{}\"", field))?;
    }
    Ok((view, batch.summary))
}

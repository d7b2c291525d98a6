//! Tabular view engine
//!
//! Owns the current batch, the active sort state and the profile it was
//! loaded with, and exposes the materialized view: rows in display order
//! with their classification tags.
//!
//! Global invariants enforced:
//! - The view is a pure function of (batch, profile, sort state)
//! - Ties keep arrival order in both directions
//! - Tags are recomputed on every reorder, never carried over
//! - A failed toggle leaves the view untouched

use crate::compare::{SortDirection, SortState};
use crate::profile::{ColumnSpec, DatasetProfile};
use crate::value::Record;
use anyhow::Result;
use serde::Serialize;

/// One entry of the materialized view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRow<'a> {
    /// Position in the current display order
    pub position: usize,
    /// Position in the batch as it arrived
    pub arrival: usize,
    pub record: &'a Record,
    pub tag: Option<&'a str>,
}

impl ViewRow<'_> {
    /// Rendered text for a column, with the column's display transform applied
    pub fn cell(&self, column: &ColumnSpec) -> String {
        column.display.render(self.record.value(&column.key))
    }
}

/// Header affordance for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub key: String,
    pub header: String,
    pub sortable: bool,
    pub active: bool,
    pub direction: Option<SortDirection>,
}

impl HeaderCell {
    /// Header text with the direction glyph on the active column
    pub fn label(&self) -> String {
        match self.direction {
            Some(dir) => format!("{} {}", self.header, dir.glyph()),
            None => self.header.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TabularView {
    profile: DatasetProfile,
    columns: Vec<ColumnSpec>,
    records: Vec<Record>,
    /// Arrival indices in display order
    order: Vec<usize>,
    /// Tag per arrival index
    tags: Vec<Option<String>>,
    sort: SortState,
}

impl TabularView {
    /// Empty view bound to a profile
    pub fn new(profile: DatasetProfile) -> Self {
        let sort = profile.default_sort.clone();
        let columns = profile.columns_for(&[]);
        TabularView {
            profile,
            columns,
            records: Vec::new(),
            order: Vec::new(),
            tags: Vec::new(),
            sort,
        }
    }

    /// Build a view and load a batch in one step
    pub fn with_records(profile: DatasetProfile, records: Vec<Record>) -> Self {
        let mut view = TabularView::new(profile.clone());
        view.load(records, profile);
        view
    }

    /// Replace the batch and profile, reset the sort to the profile default
    pub fn load(&mut self, records: Vec<Record>, profile: DatasetProfile) {
        self.profile = profile;
        self.reload(records);
    }

    /// Replace the batch, keeping the current profile
    pub fn reload(&mut self, mut records: Vec<Record>) {
        for record in &mut records {
            self.profile.enrich(record);
        }
        self.columns = self.profile.columns_for(&records);
        self.records = records;
        self.sort = self.profile.default_sort.clone();
        tracing::debug!(
            profile = %self.profile.name,
            rows = self.records.len(),
            sort_key = ?self.sort.key,
            "loaded batch"
        );
        self.materialize();
    }

    /// Header click: same column flips direction, a new column sorts ascending
    pub fn toggle_sort(&mut self, field: &str) -> Result<SortState> {
        let Some(column) = self.columns.iter().find(|c| c.key == field) else {
            tracing::error!(
                profile = %self.profile.name,
                field,
                "sort toggled on a column the profile does not declare"
            );
            anyhow::bail!(
                "unknown sort column '{}' for profile '{}'",
                field,
                self.profile.name
            );
        };
        if !column.sortable {
            tracing::error!(
                profile = %self.profile.name,
                field,
                "sort toggled on a non-sortable column"
            );
            anyhow::bail!(
                "column '{}' is not sortable in profile '{}'",
                field,
                self.profile.name
            );
        }

        self.sort = self.sort.toggled(field);
        tracing::debug!(
            field,
            direction = self.sort.direction.as_str(),
            "sort toggled"
        );
        self.materialize();
        Ok(self.sort.clone())
    }

    /// Classify every record, then order the batch by the current sort state
    fn materialize(&mut self) {
        self.tags = self
            .records
            .iter()
            .map(|r| self.profile.rules.classify(r).map(str::to_string))
            .collect();

        let mut order: Vec<usize> = (0..self.records.len()).collect();
        if let Some(key) = self.sort.key.as_deref() {
            let policy = &self.profile.comparators;
            let direction = self.sort.direction;
            let records = &self.records;
            // sort_by is stable; arrival order settles ties
            order.sort_by(|&a, &b| policy.compare(&records[a], &records[b], key, direction));
        }
        self.order = order;
    }

    pub fn profile(&self) -> &DatasetProfile {
        &self.profile
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn is_active_column(&self, field: &str) -> bool {
        self.sort.key.as_deref() == Some(field)
    }

    /// Direction of `field` if it is the active sort column
    pub fn direction_for(&self, field: &str) -> Option<SortDirection> {
        if self.is_active_column(field) {
            Some(self.sort.direction)
        } else {
            None
        }
    }

    pub fn headers(&self) -> Vec<HeaderCell> {
        self.columns
            .iter()
            .map(|c| HeaderCell {
                key: c.key.clone(),
                header: c.header.clone(),
                sortable: c.sortable,
                active: self.is_active_column(&c.key),
                direction: self.direction_for(&c.key),
            })
            .collect()
    }

    /// Rows in display order
    pub fn rows(&self) -> impl Iterator<Item = ViewRow<'_>> + '_ {
        self.order
            .iter()
            .enumerate()
            .map(move |(position, &arrival)| ViewRow {
                position,
                arrival,
                record: &self.records[arrival],
                tag: self.tags[arrival].as_deref(),
            })
    }

    /// Record ids in display order
    pub fn ids(&self) -> Vec<&str> {
        self.rows().map(|r| r.record.id.as_str()).collect()
    }

    /// Held batch in arrival order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

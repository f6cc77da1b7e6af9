//! Render-ready merge of active jobs and stored history.

use std::collections::HashSet;

use serde::Serialize;

use super::filter::HistoryFilter;
use super::record::{HistoryRecord, HistoryScope, HistoryStatus};
use super::sort::{HistorySort, SortField};
use crate::jobs::{Job, JobStatus};

/// What the user can do with a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Rename,
    View,
    Delete,
    Download,
    Cancel,
    Dismiss,
}

/// One line of the history table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum HistoryRow {
    /// A job the registry is still tracking.
    Active(Job),
    Record(HistoryRecord),
}

impl HistoryRow {
    pub fn id(&self) -> &str {
        match self {
            HistoryRow::Active(job) => &job.id,
            HistoryRow::Record(record) => &record.task_id,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            HistoryRow::Active(job) => &job.filename,
            HistoryRow::Record(record) => &record.filename,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, HistoryRow::Active(_))
    }

    pub fn actions(&self) -> Vec<RowAction> {
        match self {
            HistoryRow::Active(job) => match job.status {
                JobStatus::Queued | JobStatus::Processing => vec![RowAction::Cancel],
                JobStatus::Completed => vec![RowAction::View, RowAction::Download],
                JobStatus::Failed | JobStatus::TimedOut => vec![RowAction::Dismiss],
            },
            HistoryRow::Record(record) => match record.status {
                HistoryStatus::Completed => vec![
                    RowAction::Rename,
                    RowAction::View,
                    RowAction::Delete,
                    RowAction::Download,
                ],
                HistoryStatus::Failed => vec![RowAction::Delete],
                HistoryStatus::InProgress => vec![],
            },
        }
    }
}

/// Merges active jobs with history records.
///
/// Active jobs come first in the order given and are never filtered. History
/// records are filtered, sorted, and skipped when an active job has the same id.
pub fn render(
    active: &[Job],
    records: &[HistoryRecord],
    filter: &HistoryFilter,
    sort: &HistorySort,
    scope: HistoryScope,
) -> Vec<HistoryRow> {
    let mut seen: HashSet<&str> = active.iter().map(|job| job.id.as_str()).collect();

    let mut visible: Vec<HistoryRecord> = records
        .iter()
        .filter(|record| seen.insert(record.task_id.as_str()))
        .filter(|record| filter.matches(record, scope))
        .cloned()
        .collect();
    sort.apply(&mut visible);

    active
        .iter()
        .cloned()
        .map(HistoryRow::Active)
        .chain(visible.into_iter().map(HistoryRow::Record))
        .collect()
}

/// Filter, sort and scope state of the history table.
#[derive(Debug, Clone, Default)]
pub struct HistoryView {
    privileged: bool,
    scope: HistoryScope,
    filter: HistoryFilter,
    sort: HistorySort,
}

impl HistoryView {
    pub fn new(privileged: bool) -> Self {
        Self {
            privileged,
            ..Default::default()
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// Which records to request from the backend.
    pub fn scope(&self) -> HistoryScope {
        self.scope
    }

    /// Switches scope. Returns whether a refetch is needed.
    ///
    /// Non-privileged users are pinned to their own records.
    pub fn set_scope(&mut self, scope: HistoryScope) -> bool {
        if scope == HistoryScope::All && !self.privileged {
            log::debug!("Ignoring all-users scope for non-privileged view");
            return false;
        }
        let changed = self.scope != scope;
        self.scope = scope;
        if scope == HistoryScope::Own {
            self.filter.owner = None;
        }
        changed
    }

    pub fn owner_filter_available(&self) -> bool {
        self.scope == HistoryScope::All
    }

    pub fn filter(&self) -> &HistoryFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: HistoryFilter) {
        self.filter = filter;
    }

    pub fn clear_filters(&mut self) {
        self.filter = HistoryFilter::default();
    }

    pub fn sort(&self) -> HistorySort {
        self.sort
    }

    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort.toggle(field);
    }

    pub fn render(&self, active: &[Job], records: &[HistoryRecord]) -> Vec<HistoryRow> {
        render(active, records, &self.filter, &self.sort, self.scope)
    }
}

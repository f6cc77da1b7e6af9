use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::record::HistoryRecord;

/// Column the history table is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Filename,
    Owner,
    AnalysisStatus,
    Duration,
    CreatedAt,
    CompletedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Active sort column and direction. Defaults to newest completion first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for HistorySort {
    fn default() -> Self {
        Self {
            field: SortField::CompletedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl HistorySort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Header click: same field flips direction, a new field starts descending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Desc;
        }
    }

    /// Ascending comparison on the active field. Missing values sort first.
    fn compare_asc(&self, a: &HistoryRecord, b: &HistoryRecord) -> Ordering {
        match self.field {
            SortField::Filename => compare_text(&a.filename, &b.filename),
            SortField::Owner => a
                .owner
                .as_deref()
                .map(str::to_lowercase)
                .cmp(&b.owner.as_deref().map(str::to_lowercase)),
            SortField::AnalysisStatus => compare_text(&a.analysis_status, &b.analysis_status),
            SortField::Duration => match (a.duration, b.duration) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                (x, y) => x.is_some().cmp(&y.is_some()),
            },
            SortField::CreatedAt => a.created_time().cmp(&b.created_time()),
            SortField::CompletedAt => a.completed_time().cmp(&b.completed_time()),
        }
    }

    pub fn compare(&self, a: &HistoryRecord, b: &HistoryRecord) -> Ordering {
        let ordering = self.compare_asc(a, b);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    /// Stable sort; equal records keep their input order.
    pub fn apply(&self, records: &mut [HistoryRecord]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

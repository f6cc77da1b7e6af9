//! History table: stored records merged with the jobs still being tracked.

pub mod filter;
pub mod record;
pub mod sort;
pub mod view;

pub use filter::{HistoryFilter, FAILED_STATUS_FILTER};
pub use record::{
    parse_timestamp, HistoryRecord, HistoryScope, HistoryStatus, ANALYSIS_STATUSES,
    PENDING_ANALYSIS,
};
pub use sort::{HistorySort, SortDirection, SortField};
pub use view::{render, HistoryRow, HistoryView, RowAction};

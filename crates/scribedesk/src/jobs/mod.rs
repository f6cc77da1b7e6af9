//! Job lifecycle: upload, status polling and the registry of tracked jobs.

pub mod model;
pub mod poller;
pub mod registry;
pub mod upload;

pub use model::{Job, JobCounts, JobStatus};
pub use poller::PollTracker;
pub use registry::JobRegistry;
pub use upload::{AcceptedUpload, UploadProgress, UploadTask};

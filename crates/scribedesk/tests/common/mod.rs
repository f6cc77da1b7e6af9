//! Shared test utilities for scribedesk integration tests.
//!
//! This module provides:
//! - `MockApi`, a scripted `TranscriptionApi` backend
//! - Builders for registries, uploads and history records

pub mod builders;
pub mod mock_api;

pub use builders::*;
pub use mock_api::{MockApi, PollStep};

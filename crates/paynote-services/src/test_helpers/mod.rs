//! Test utilities for the ingestion pipeline
//!
//! Provides in-memory [`DocumentStore`](paynote_storage::DocumentStore),
//! [`Spreadsheet`](paynote_storage::Spreadsheet) and
//! [`ChatPlatform`](paynote_slack::ChatPlatform) implementations.

pub mod mocks;

pub use mocks::*;

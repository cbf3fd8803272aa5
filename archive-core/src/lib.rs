//! Core types for the accounting archive engine: record shapes, the versioned
//! wire codec, configuration, and the error type shared across the pipeline.
//!
//! This crate has no I/O of its own — the storage-facing crate binds these
//! types to an actual SQL connection and filesystem.

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod executor;
pub mod horizon;
pub mod record;
pub mod script;
pub mod writer;

pub use config::{ArchiveCondition, Granularity, JobCond, PurgeSetting};
pub use error::{ArchiveError, ArchiveResult};
pub use record::{
    EventRecord, JobRecord, RecordBatch, RecordKind, ReservationRecord, StepRecord, SuspendRecord,
};

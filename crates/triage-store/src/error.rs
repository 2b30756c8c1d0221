//! Error types for triage-store

use thiserror::Error;

/// Errors that can occur while reading or writing relationship data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record had an empty disease or symptom name
    #[error("invalid relationship record: {reason}")]
    InvalidRecord { reason: String },

    /// The in-memory graph lock was poisoned by a panicking writer
    #[error("relationship store lock poisoned")]
    LockPoisoned,

    /// Backend query failed
    #[error("relationship query failed: {0}")]
    Query(String),
}

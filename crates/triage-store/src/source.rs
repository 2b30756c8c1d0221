//! Read interface over the disease/symptom relationship graph.
//!
//! The trait is async and backend-agnostic: a graph database client and the
//! in-memory [`MemoryRelationshipStore`](crate::MemoryRelationshipStore) both
//! satisfy it. Callers fetch records here and hand them to the ranker as
//! plain data.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::RelationshipRecord;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Source of disease/symptom severity relationships.
///
/// Guarantees:
/// - `relationships_for_symptoms` only returns records whose symptom is in the
///   requested set (exact name match).
/// - Records are returned in a stable order for the same store contents.
#[async_trait]
pub trait RelationshipSource: Send + Sync {
    /// All relationship records whose symptom is one of `symptoms`.
    async fn relationships_for_symptoms(
        &self,
        symptoms: &[String],
    ) -> StoreResult<Vec<RelationshipRecord>>;

    /// Every symptom name present in the graph.
    async fn known_symptoms(&self) -> StoreResult<BTreeSet<String>>;

    /// Every disease name present in the graph.
    async fn diseases(&self) -> StoreResult<BTreeSet<String>>;
}

//! In-memory relationship graph.
//!
//! Edges are kept in insertion order. Writing an edge that already exists
//! (same disease and symptom) updates its severity in place, mirroring a
//! graph `MERGE ... SET r.severity`.

use std::collections::BTreeSet;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::error::StoreError;
use crate::knowledge::{standard_knowledge, KnowledgeEntry};
use crate::record::{RelationshipRecord, Severity};
use crate::source::{RelationshipSource, StoreResult};

/// In-memory relationship store backed by a `Vec<RelationshipRecord>`.
#[derive(Debug, Default)]
pub struct MemoryRelationshipStore {
    edges: RwLock<Vec<RelationshipRecord>>,
}

impl MemoryRelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store populated with [`standard_knowledge`].
    pub fn standard() -> Self {
        // The built-in table has no empty names.
        Self::from_entries(&standard_knowledge()).unwrap_or_default()
    }

    /// Populate a new store from knowledge entries.
    pub fn from_entries(entries: &[KnowledgeEntry]) -> StoreResult<Self> {
        let store = Self::new();
        for entry in entries {
            for record in entry.records() {
                store.merge_relationship(record)?;
            }
        }
        Ok(store)
    }

    /// Insert an edge, or update the severity of an existing one.
    pub fn merge_relationship(&self, record: RelationshipRecord) -> StoreResult<()> {
        if record.disease.trim().is_empty() {
            return Err(StoreError::InvalidRecord {
                reason: "disease name must not be empty".to_string(),
            });
        }
        if record.symptom.trim().is_empty() {
            return Err(StoreError::InvalidRecord {
                reason: "symptom name must not be empty".to_string(),
            });
        }

        let mut edges = self.edges.write().map_err(|_| StoreError::LockPoisoned)?;
        match edges
            .iter_mut()
            .find(|e| e.disease == record.disease && e.symptom == record.symptom)
        {
            Some(existing) => {
                debug!(
                    disease = %record.disease,
                    symptom = %record.symptom,
                    severity = %record.severity,
                    "updating relationship severity"
                );
                existing.severity = record.severity;
            }
            None => edges.push(record),
        }
        Ok(())
    }

    /// Convenience wrapper over [`merge_relationship`](Self::merge_relationship).
    pub fn merge(
        &self,
        disease: &str,
        symptom: &str,
        severity: Severity,
    ) -> StoreResult<()> {
        self.merge_relationship(RelationshipRecord::new(disease, symptom, severity))
    }

    /// Number of stored edges. A poisoned lock still reports its contents.
    pub fn len(&self) -> usize {
        match self.edges.read() {
            Ok(edges) => edges.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RelationshipSource for MemoryRelationshipStore {
    async fn relationships_for_symptoms(
        &self,
        symptoms: &[String],
    ) -> StoreResult<Vec<RelationshipRecord>> {
        let wanted: BTreeSet<&str> = symptoms.iter().map(String::as_str).collect();
        let edges = self.edges.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(edges
            .iter()
            .filter(|e| wanted.contains(e.symptom.as_str()))
            .cloned()
            .collect())
    }

    async fn known_symptoms(&self) -> StoreResult<BTreeSet<String>> {
        let edges = self.edges.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(edges.iter().map(|e| e.symptom.clone()).collect())
    }

    async fn diseases(&self) -> StoreResult<BTreeSet<String>> {
        let edges = self.edges.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(edges.iter().map(|e| e.disease.clone()).collect())
    }
}

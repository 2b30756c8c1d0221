//! Triage-Store: Relationship Store Interface for Symptom Triage
//!
//! This crate is the boundary to the disease/symptom knowledge graph. The
//! diagnosis core never owns a database connection; it receives already
//! materialized [`RelationshipRecord`]s through a [`RelationshipSource`].
//!
//! ## Layer 0 - Data
//!
//! Focus: the shape of `(disease)-[HAS_SYMPTOM {severity}]->(symptom)` edges
//! and the read queries the ranker needs.
//!
//! ## Key Components
//!
//! - `RelationshipSource`: async read interface over the relationship graph
//! - `MemoryRelationshipStore`: in-memory graph with MERGE upsert semantics
//! - `standard_knowledge`: the built-in 15-disease knowledge base

mod error;
pub mod knowledge;
pub mod memory;
mod record;
pub mod source;

pub use error::StoreError;
pub use knowledge::{standard_knowledge, KnowledgeEntry, SymptomEntry};
pub use memory::MemoryRelationshipStore;
pub use record::{RelationshipRecord, Severity};
pub use source::{RelationshipSource, StoreResult};

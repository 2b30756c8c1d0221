//! Triage Core Library
//!
//! Two-layer Bayesian network over symptoms and demographics, exact inference
//! by enumeration, and a ranker that fuses posteriors with severity scores
//! from the relationship store.

pub mod config;
pub mod cpt;
pub mod error;
pub mod inference;
pub mod metrics;
pub mod network;
pub mod obs;
pub mod ranker;
pub mod service;
pub mod telemetry;
pub mod variable;
pub mod vocabulary;

pub use config::{EvidenceSpec, NetworkConfig};
pub use cpt::{
    build_network, Cpt, CptGenerator, CptStrategy, CptTable, FactoredTable, StateCombinations,
};
pub use error::{ConfigurationError, Result, TriageError, ValidationError};
pub use inference::{distribution, query, query_all, EvidenceAssignment};
pub use network::{Network, NetworkFingerprint, NetworkSummary, VariableSummary};
pub use ranker::{rank, Demographics, DiagnosisResult};
pub use service::{DiagnosisReport, DiagnosisRequest, DiagnosisService};
pub use variable::{AgeGroup, Location, Variable, VariableKind};
pub use vocabulary::{ResolvedSymptoms, SymptomVocabulary};

pub use metrics::METRICS;
pub use telemetry::init_tracing;

pub use triage_store::{
    MemoryRelationshipStore, RelationshipRecord, RelationshipSource, Severity, StoreError,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

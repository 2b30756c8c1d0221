//! Error taxonomy for network construction and diagnosis queries.

use triage_store::StoreError;

/// Build-time errors. Any of these aborts network construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("network has no {layer} variables")]
    EmptyLayer { layer: &'static str },

    #[error("variable {variable} is declared more than once")]
    DuplicateVariable { variable: String },

    #[error("variable {variable} has no states")]
    EmptyStates { variable: String },

    #[error("variable {variable} declares state {state} more than once")]
    DuplicateState { variable: String, state: String },

    #[error("variable {variable} cannot be placed in the {layer} layer")]
    LayerMismatch {
        variable: String,
        layer: &'static str,
    },

    #[error("symptom {variable} has no positive state '{positive}'")]
    MissingPositiveState { variable: String, positive: String },

    #[error("disease {variable} must have states [no, yes], got [{}]", .states.join(", "))]
    DiseaseStates {
        variable: String,
        states: Vec<String>,
    },

    #[error("missing weight for {variable}={state}")]
    MissingWeight { variable: String, state: String },

    #[error("weight given for undefined state {variable}={state}")]
    UndefinedState { variable: String, state: String },

    #[error("weight for {variable}={state} must be finite and positive, got {value}")]
    InvalidWeight {
        variable: String,
        state: String,
        value: f64,
    },

    #[error("{context} must lie in {range}, got {value}")]
    InvalidProbability {
        context: String,
        range: &'static str,
        value: f64,
    },

    #[error("base rate given for undeclared disease {disease}")]
    UnknownDisease { disease: String },

    #[error("CPT row {row} of {variable} sums to {sum}, expected 1")]
    RowSum {
        variable: String,
        row: usize,
        sum: f64,
    },

    #[error("CPT row {row} of {variable} has {actual} entries, expected {expected}")]
    RowWidth {
        variable: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("CPT for {variable} has {actual} rows, expected {expected}")]
    RowCount {
        variable: String,
        expected: usize,
        actual: usize,
    },

    #[error("CPT for {variable} does not match its parents: {reason}")]
    ParentMismatch { variable: String, reason: String },

    #[error("no CPT for variable {variable}")]
    MissingCpt { variable: String },

    #[error("CPT given for undeclared variable {variable}")]
    OrphanCpt { variable: String },

    #[error("more than one CPT for variable {variable}")]
    DuplicateCpt { variable: String },

    #[error("failed to read network config {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid network config: {0}")]
    Parse(String),

    #[error("failed to serialize network: {0}")]
    Serialization(String),
}

/// Per-query errors. A failed query never modifies the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown evidence variable: {variable}")]
    UnknownVariable { variable: String },

    #[error("{variable} is a disease and cannot be used as evidence")]
    NotEvidence { variable: String },

    #[error("illegal state '{state}' for {variable} (expected one of: {})", .allowed.join(", "))]
    IllegalState {
        variable: String,
        state: String,
        allowed: Vec<String>,
    },
}

/// Top-level error for diagnosis operations.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for triage operations.
pub type Result<T> = std::result::Result<T, TriageError>;

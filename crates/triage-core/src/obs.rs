//! Structured lifecycle events for network construction and diagnosis.
//!
//! Every event carries an `event` field so log pipelines can filter on it
//! without parsing the message.

use tracing::{info, warn};

/// Span covering one diagnosis, tagged with its report id.
///
/// Attach it with `tracing::Instrument` so the future stays `Send`.
pub fn diagnosis_span(report_id: &str) -> tracing::Span {
    tracing::info_span!("triage.diagnosis", report_id = %report_id)
}

/// Emit event: network built and validated.
pub fn emit_network_built(fingerprint: &str, evidence: usize, diseases: usize, storage: &str) {
    info!(
        event = "network.built",
        fingerprint = %fingerprint,
        evidence = evidence,
        diseases = diseases,
        storage = %storage,
    );
}

/// Emit event: diagnosis started.
pub fn emit_diagnosis_started(report_id: &str, symptoms: usize, ignored: usize) {
    info!(
        event = "diagnosis.started",
        report_id = %report_id,
        symptoms = symptoms,
        ignored = ignored,
    );
}

/// Emit event: diagnosis finished with the number of ranked diseases.
pub fn emit_diagnosis_finished(report_id: &str, results: usize, top: Option<&str>) {
    info!(
        event = "diagnosis.finished",
        report_id = %report_id,
        results = results,
        top = top.unwrap_or("-"),
    );
}

/// Emit event: a queried disease is not part of the network (warning level).
pub fn emit_lookup_miss(disease: &str) {
    warn!(event = "inference.lookup_miss", disease = %disease);
}

/// Emit event: user input that matches no known symptom (warning level).
pub fn emit_symptom_ignored(input: &str) {
    warn!(event = "symptom.ignored", input = %input);
}

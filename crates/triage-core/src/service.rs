//! Request/response surface tying vocabulary, store, and ranker together.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, Instrument};
use triage_store::{MemoryRelationshipStore, RelationshipSource};
use uuid::Uuid;

use crate::config::NetworkConfig;
use crate::cpt::build_network;
use crate::error::Result;
use crate::inference::{self, EvidenceAssignment};
use crate::metrics::METRICS;
use crate::network::Network;
use crate::obs;
use crate::ranker::{self, Demographics, DiagnosisResult};
use crate::vocabulary::SymptomVocabulary;

/// Raw symptom input plus demographics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisRequest {
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub demographics: Demographics,
}

impl DiagnosisRequest {
    pub fn new<I, S>(symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symptoms: symptoms.into_iter().map(Into::into).collect(),
            demographics: Demographics::default(),
        }
    }

    pub fn with_demographics(mut self, demographics: Demographics) -> Self {
        self.demographics = demographics;
        self
    }
}

/// Ranked differential diagnosis for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub report_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Fingerprint of the network that produced the posteriors.
    pub fingerprint: String,
    /// Recognized canonical symptoms.
    pub symptoms: Vec<String>,
    pub ignored_symptoms: Vec<String>,
    pub demographics: Demographics,
    pub results: Vec<DiagnosisResult>,
    /// Observed symptoms linked to each ranked disease, in store order.
    pub matched_symptoms: BTreeMap<String, Vec<String>>,
}

impl DiagnosisReport {
    /// The `n` best-ranked results.
    pub fn top(&self, n: usize) -> &[DiagnosisResult] {
        &self.results[..n.min(self.results.len())]
    }

    pub fn matched_symptoms(&self, disease: &str) -> &[String] {
        self.matched_symptoms
            .get(disease)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Shared, read-only diagnosis engine.
///
/// Cheap to share behind an `Arc`; every call works on its own request data.
pub struct DiagnosisService {
    network: Arc<Network>,
    source: Arc<dyn RelationshipSource>,
    vocabulary: SymptomVocabulary,
}

impl DiagnosisService {
    /// Load the symptom vocabulary from `source` and the network.
    pub async fn initialize(
        network: Arc<Network>,
        source: Arc<dyn RelationshipSource>,
    ) -> Result<Self> {
        let mut known = source.known_symptoms().await?;
        known.extend(network.symptom_names().map(str::to_string));
        let vocabulary = SymptomVocabulary::new(&known);
        debug!(symptoms = vocabulary.len(), "symptom vocabulary loaded");
        Ok(Self {
            network,
            source,
            vocabulary,
        })
    }

    /// Service over the built-in network and knowledge base.
    pub async fn standard() -> Result<Self> {
        let source = Arc::new(MemoryRelationshipStore::standard());
        Self::from_config(&NetworkConfig::standard(), source).await
    }

    /// Build the network from `config` and initialize against `source`.
    pub async fn from_config(
        config: &NetworkConfig,
        source: Arc<dyn RelationshipSource>,
    ) -> Result<Self> {
        let network = Arc::new(build_network(config)?);
        Self::initialize(network, source).await
    }

    pub fn network(&self) -> &Arc<Network> {
        &self.network
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary {
        &self.vocabulary
    }

    /// Rank diseases for one request.
    pub async fn diagnose(&self, request: DiagnosisRequest) -> Result<DiagnosisReport> {
        let report_id = Uuid::new_v4();
        let span = obs::diagnosis_span(&report_id.to_string());
        self.diagnose_inner(report_id, request).instrument(span).await
    }

    async fn diagnose_inner(
        &self,
        report_id: Uuid,
        request: DiagnosisRequest,
    ) -> Result<DiagnosisReport> {
        let id = report_id.to_string();
        let resolved = self.vocabulary.resolve(&request.symptoms);
        obs::emit_diagnosis_started(&id, resolved.recognized.len(), resolved.ignored.len());

        let records = if resolved.recognized.is_empty() {
            Vec::new()
        } else {
            self.source
                .relationships_for_symptoms(&resolved.recognized)
                .await?
        };

        let results = ranker::rank(
            &resolved.recognized,
            &request.demographics,
            &records,
            &self.network,
        )?;

        let mut matched_symptoms: BTreeMap<String, Vec<String>> = results
            .iter()
            .map(|r| (r.disease.clone(), Vec::new()))
            .collect();
        for record in &records {
            if let Some(symptoms) = matched_symptoms.get_mut(&record.disease) {
                if !symptoms.contains(&record.symptom) {
                    symptoms.push(record.symptom.clone());
                }
            }
        }

        METRICS.inc_diagnoses_completed();
        obs::emit_diagnosis_finished(
            &id,
            results.len(),
            results.first().map(|r| r.disease.as_str()),
        );

        Ok(DiagnosisReport {
            report_id,
            created_at: Utc::now(),
            fingerprint: self.network.fingerprint().to_string(),
            symptoms: resolved.recognized,
            ignored_symptoms: resolved.ignored,
            demographics: request.demographics,
            results,
            matched_symptoms,
        })
    }

    /// Diagnose several requests concurrently, preserving input order.
    pub async fn diagnose_many(
        &self,
        requests: Vec<DiagnosisRequest>,
    ) -> Vec<Result<DiagnosisReport>> {
        futures::future::join_all(requests.into_iter().map(|r| self.diagnose(r))).await
    }

    /// Raw posteriors for `targets`, or for every disease when empty.
    pub fn posteriors(
        &self,
        targets: &[String],
        evidence: &EvidenceAssignment,
    ) -> Result<BTreeMap<String, f64>> {
        let posteriors = if targets.is_empty() {
            inference::query_all(&self.network, evidence)?
        } else {
            inference::query(&self.network, targets.iter().map(String::as_str), evidence)?
        };
        Ok(posteriors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_report_top_truncates() {
        let service = DiagnosisService::standard().await.unwrap();
        let report = service
            .diagnose(DiagnosisRequest::new(["Fever", "Cough"]))
            .await
            .unwrap();
        assert_eq!(report.top(5).len(), 5);
        assert_eq!(report.top(100).len(), report.results.len());
    }

    #[tokio::test]
    async fn test_report_records_matched_symptoms() {
        let service = DiagnosisService::standard().await.unwrap();
        let report = service
            .diagnose(DiagnosisRequest::new(["Fever", "Cough"]))
            .await
            .unwrap();
        assert_eq!(report.matched_symptoms("Pneumonia"), ["Fever", "Cough"]);
        assert!(report.matched_symptoms("Sinusitis").is_empty());
    }

    #[tokio::test]
    async fn test_ignored_symptoms_are_reported() {
        let service = DiagnosisService::standard().await.unwrap();
        let report = service
            .diagnose(DiagnosisRequest::new(["high fever", "Zxyzzy"]))
            .await
            .unwrap();
        assert_eq!(report.symptoms, vec!["Fever"]);
        assert_eq!(report.ignored_symptoms, vec!["Zxyzzy"]);
        assert!(!report.is_empty());
    }
}

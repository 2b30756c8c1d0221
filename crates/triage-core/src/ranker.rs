//! Differential diagnosis ranking.
//!
//! Fuses two independent signals per disease: the severity score from the
//! relationship store and the posterior from the inference engine.
//! `combined_score = severity_score × posterior`.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use triage_store::RelationshipRecord;

use crate::error::ValidationError;
use crate::inference::{self, EvidenceAssignment};
use crate::network::Network;
use crate::variable::{AgeGroup, Location, AGE_GROUP, LOCATION, YES};

/// Patient demographics. Unspecified fields default to adult / urban.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(default)]
    pub age_group: AgeGroup,
    #[serde(default)]
    pub location: Location,
}

impl Demographics {
    pub fn new(age_group: AgeGroup, location: Location) -> Self {
        Self {
            age_group,
            location,
        }
    }

    pub fn from_options(age_group: Option<AgeGroup>, location: Option<Location>) -> Self {
        Self {
            age_group: age_group.unwrap_or_default(),
            location: location.unwrap_or_default(),
        }
    }
}

/// One ranked disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub disease: String,
    pub severity_score: u32,
    pub posterior: f64,
    pub combined_score: f64,
}

/// Severity score per disease, in order of first appearance in `relationships`.
///
/// Only records whose symptom was observed count. Diseases without a
/// matching record are absent rather than scored 0.
pub fn severity_scores(
    symptoms: &BTreeSet<&str>,
    relationships: &[RelationshipRecord],
) -> Vec<(String, u32)> {
    let mut scores: Vec<(String, u32)> = Vec::new();
    for record in relationships
        .iter()
        .filter(|r| symptoms.contains(r.symptom.as_str()))
    {
        match scores.iter_mut().find(|(d, _)| *d == record.disease) {
            Some((_, score)) => *score += record.weight(),
            None => scores.push((record.disease.clone(), record.weight())),
        }
    }
    scores
}

/// Evidence for a diagnosis query.
///
/// Observed symptoms that the network models are set to `yes`; unobserved
/// ones stay unassigned so inference marginalizes them. Symptoms the network
/// does not model are left out. Demographics are always assigned.
pub fn evidence_for(
    network: &Network,
    symptoms: &BTreeSet<&str>,
    demographics: &Demographics,
) -> EvidenceAssignment {
    let mut evidence = EvidenceAssignment::new();
    for symptom in symptoms.iter().filter(|s| network.is_symptom(s)) {
        evidence.insert(*symptom, YES);
    }
    if network.evidence_index(AGE_GROUP).is_some() {
        evidence.insert(AGE_GROUP, demographics.age_group.as_str());
    }
    if network.evidence_index(LOCATION).is_some() {
        evidence.insert(LOCATION, demographics.location.as_str());
    }
    evidence
}

/// Rank candidate diseases for the observed symptoms.
///
/// Only diseases with at least one matching relationship are scored. The
/// result is sorted by combined score, then posterior, both descending, then
/// by disease name. An empty symptom set yields an empty result.
pub fn rank(
    symptoms: &[String],
    demographics: &Demographics,
    relationships: &[RelationshipRecord],
    network: &Network,
) -> Result<Vec<DiagnosisResult>, ValidationError> {
    let observed: BTreeSet<&str> = symptoms.iter().map(String::as_str).collect();
    if observed.is_empty() {
        warn!("diagnosis requested without symptoms");
        return Ok(Vec::new());
    }

    let scores: Vec<(String, u32)> = severity_scores(&observed, relationships)
        .into_iter()
        .filter(|(_, score)| *score > 0)
        .collect();
    if scores.is_empty() {
        debug!(symptoms = observed.len(), "no relationship matched the observed symptoms");
        return Ok(Vec::new());
    }

    let evidence = evidence_for(network, &observed, demographics);
    let posteriors = inference::query(
        network,
        scores.iter().map(|(disease, _)| disease.as_str()),
        &evidence,
    )?;

    let mut results: Vec<DiagnosisResult> = scores
        .into_iter()
        .map(|(disease, severity_score)| {
            let posterior = posteriors.get(&disease).copied().unwrap_or(0.0);
            DiagnosisResult {
                combined_score: f64::from(severity_score) * posterior,
                disease,
                severity_score,
                posterior,
            }
        })
        .collect();
    results.sort_by(compare_results);
    Ok(results)
}

fn compare_results(a: &DiagnosisResult, b: &DiagnosisResult) -> Ordering {
    b.combined_score
        .total_cmp(&a.combined_score)
        .then_with(|| b.posterior.total_cmp(&a.posterior))
        .then_with(|| a.disease.cmp(&b.disease))
}

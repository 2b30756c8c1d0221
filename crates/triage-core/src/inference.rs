//! Exact inference by enumeration over the evidence space.
//!
//! Disease variables depend only on the evidence layer and the evidence
//! variables are independent roots, so for a partial assignment `e`:
//!
//! ```text
//! P(D = yes | e) = Σ_c w(c) · P(D = yes | c) / Σ_c w(c)
//! ```
//!
//! where `c` ranges over full parent combinations consistent with `e` and
//! `w(c)` is the product of the priors of the unobserved variables in `c`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cpt::{Cpt, StateCombinations};
use crate::error::ValidationError;
use crate::metrics::METRICS;
use crate::network::Network;
use crate::obs;
use crate::variable::YES;

/// Partial assignment of evidence variables to state names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceAssignment {
    values: BTreeMap<String, String>,
}

impl EvidenceAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, variable: impl Into<String>, state: impl Into<String>) -> Self {
        self.insert(variable, state);
        self
    }

    /// Assign `variable`, returning the previous state if any.
    pub fn insert(
        &mut self,
        variable: impl Into<String>,
        state: impl Into<String>,
    ) -> Option<String> {
        self.values.insert(variable.into(), state.into())
    }

    pub fn get(&self, variable: &str) -> Option<&str> {
        self.values.get(variable).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Map the assignment onto the network's parent order.
    ///
    /// Entry `i` is the observed state index of evidence variable `i`, or
    /// `None` when it is unobserved.
    pub fn resolve(&self, network: &Network) -> Result<Vec<Option<usize>>, ValidationError> {
        let mut observed = vec![None; network.evidence_variables().len()];
        for (name, state) in &self.values {
            let index = match network.evidence_index(name) {
                Some(index) => index,
                None if network.is_disease(name) => {
                    return Err(ValidationError::NotEvidence {
                        variable: name.clone(),
                    })
                }
                None => {
                    return Err(ValidationError::UnknownVariable {
                        variable: name.clone(),
                    })
                }
            };
            let variable = &network.evidence_variables()[index];
            let state_index =
                variable
                    .state_index(state)
                    .ok_or_else(|| ValidationError::IllegalState {
                        variable: name.clone(),
                        state: state.clone(),
                        allowed: variable.states().to_vec(),
                    })?;
            observed[index] = Some(state_index);
        }
        Ok(observed)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EvidenceAssignment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parent combinations consistent with the observed evidence, with weights.
struct WeightedCombinations {
    combinations: Vec<(Vec<usize>, f64)>,
    total: f64,
}

impl WeightedCombinations {
    fn enumerate(network: &Network, observed: &[Option<usize>]) -> Self {
        let cards: Vec<usize> = network
            .evidence_variables()
            .iter()
            .map(|v| v.cardinality())
            .collect();
        let priors: Vec<Option<&Cpt>> = network
            .evidence_variables()
            .iter()
            .map(|v| network.cpt(v.name()))
            .collect();

        let mut combinations = Vec::new();
        let mut total = 0.0;
        'combos: for states in StateCombinations::new(&cards) {
            let mut weight = 1.0;
            for (i, state) in states.iter().enumerate() {
                match observed[i] {
                    Some(fixed) if fixed != *state => continue 'combos,
                    Some(_) => {}
                    None => {
                        if let Some(prior) = priors[i] {
                            weight *= prior.probability(&[], *state);
                        }
                    }
                }
            }
            total += weight;
            combinations.push((states, weight));
        }
        Self {
            combinations,
            total,
        }
    }

    fn expectation(&self, cpt: &Cpt, state: usize) -> f64 {
        if self.total <= 0.0 {
            return 0.0;
        }
        let mass: f64 = self
            .combinations
            .iter()
            .map(|(states, weight)| weight * cpt.probability(states, state))
            .sum();
        mass / self.total
    }
}

/// `P(disease = yes | evidence)` for each target.
///
/// A target that is not a disease of the network yields probability 0
/// without failing the other targets. Invalid evidence fails the whole query.
pub fn query<'a>(
    network: &Network,
    targets: impl IntoIterator<Item = &'a str>,
    evidence: &EvidenceAssignment,
) -> Result<BTreeMap<String, f64>, ValidationError> {
    let observed = evidence.resolve(network)?;
    METRICS.inc_inference_queries();
    let weighted = WeightedCombinations::enumerate(network, &observed);

    let mut posteriors = BTreeMap::new();
    for target in targets {
        let probability = match (network.disease_variable(target), network.cpt(target)) {
            (Some(variable), Some(cpt)) => {
                let positive = variable.state_index(YES).unwrap_or(1);
                weighted.expectation(cpt, positive)
            }
            _ => {
                obs::emit_lookup_miss(target);
                METRICS.inc_lookup_misses();
                0.0
            }
        };
        posteriors.insert(target.to_string(), probability);
    }
    Ok(posteriors)
}

/// Posterior for every disease in the network.
pub fn query_all(
    network: &Network,
    evidence: &EvidenceAssignment,
) -> Result<BTreeMap<String, f64>, ValidationError> {
    query(
        network,
        network.disease_variables().iter().map(|v| v.name()),
        evidence,
    )
}

/// Full posterior distribution of any variable, in state order.
///
/// Evidence variables are independent roots: an observed one is a point mass
/// and an unobserved one keeps its prior regardless of other evidence.
pub fn distribution(
    network: &Network,
    variable: &str,
    evidence: &EvidenceAssignment,
) -> Result<Vec<f64>, ValidationError> {
    let observed = evidence.resolve(network)?;

    if let Some(index) = network.evidence_index(variable) {
        let cardinality = network.evidence_variables()[index].cardinality();
        if let Some(state) = observed[index] {
            let mut point = vec![0.0; cardinality];
            point[state] = 1.0;
            return Ok(point);
        }
        return Ok(network
            .cpt(variable)
            .map(|cpt| cpt.row(&[]))
            .unwrap_or_else(|| vec![1.0 / cardinality as f64; cardinality]));
    }

    match (network.disease_variable(variable), network.cpt(variable)) {
        (Some(disease), Some(cpt)) => {
            METRICS.inc_inference_queries();
            let weighted = WeightedCombinations::enumerate(network, &observed);
            Ok((0..disease.cardinality())
                .map(|state| weighted.expectation(cpt, state))
                .collect())
        }
        _ => Err(ValidationError::UnknownVariable {
            variable: variable.to_string(),
        }),
    }
}

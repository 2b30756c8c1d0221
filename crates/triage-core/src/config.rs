//! Hand-authored network parameters.
//!
//! [`NetworkConfig::standard`] holds the built-in priors, base rates and
//! weight factors. A JSON document with the same shape can replace them; it
//! is checked by [`NetworkConfig::validate`] before any CPT is generated.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cpt::CptStrategy;
use crate::error::ConfigurationError;
use crate::variable::{
    Variable, VariableKind, AGE_GROUP, COUGH, DISEASES, FATIGUE, FEVER, HEADACHE,
    LOCATION, NO, YES,
};

/// Tolerance for distributions that must sum to one.
pub const SUM_TOLERANCE: f64 = 1e-6;

/// Parameters of one evidence variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSpec {
    pub name: String,
    pub kind: VariableKind,
    pub states: Vec<String>,
    /// Unconditional distribution, one entry per state.
    pub prior: Vec<f64>,
    /// Multiplicative factor per state. Symptoms need the positive state;
    /// demographics need every state. Unlisted symptom states weigh 1.
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

impl EvidenceSpec {
    pub fn symptom(name: &str, prior_yes: f64, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            kind: VariableKind::Symptom,
            states: vec![NO.to_string(), YES.to_string()],
            prior: vec![1.0 - prior_yes, prior_yes],
            weights: BTreeMap::from([(YES.to_string(), weight)]),
        }
    }

    pub fn demographic(name: &str, states: &[(&str, f64, f64)]) -> Self {
        Self {
            name: name.to_string(),
            kind: VariableKind::Demographic,
            states: states.iter().map(|(s, _, _)| s.to_string()).collect(),
            prior: states.iter().map(|(_, p, _)| *p).collect(),
            weights: states
                .iter()
                .map(|(s, _, w)| (s.to_string(), *w))
                .collect(),
        }
    }

    pub fn variable(&self) -> Variable {
        Variable::new(&self.name, self.kind, self.states.iter().cloned())
    }

    /// Weight factor of every state, in state order.
    pub fn factors(&self) -> Vec<f64> {
        self.states
            .iter()
            .map(|s| self.weights.get(s).copied().unwrap_or(1.0))
            .collect()
    }

    fn required_weights(&self) -> Vec<&str> {
        match self.kind {
            VariableKind::Symptom => vec![YES],
            _ => self.states.iter().map(String::as_str).collect(),
        }
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.kind == VariableKind::Disease {
            return Err(ConfigurationError::LayerMismatch {
                variable: self.name.clone(),
                layer: "evidence",
            });
        }
        if self.states.is_empty() {
            return Err(ConfigurationError::EmptyStates {
                variable: self.name.clone(),
            });
        }
        let mut seen = BTreeSet::new();
        for state in &self.states {
            if !seen.insert(state.as_str()) {
                return Err(ConfigurationError::DuplicateState {
                    variable: self.name.clone(),
                    state: state.clone(),
                });
            }
        }
        if self.kind == VariableKind::Symptom && !seen.contains(YES) {
            return Err(ConfigurationError::MissingPositiveState {
                variable: self.name.clone(),
                positive: YES.to_string(),
            });
        }

        if self.prior.len() != self.states.len() {
            return Err(ConfigurationError::RowWidth {
                variable: self.name.clone(),
                row: 0,
                expected: self.states.len(),
                actual: self.prior.len(),
            });
        }
        check_distribution(&self.name, 0, &self.prior)?;

        for (state, value) in &self.weights {
            if !seen.contains(state.as_str()) {
                return Err(ConfigurationError::UndefinedState {
                    variable: self.name.clone(),
                    state: state.clone(),
                });
            }
            if !value.is_finite() || *value <= 0.0 {
                return Err(ConfigurationError::InvalidWeight {
                    variable: self.name.clone(),
                    state: state.clone(),
                    value: *value,
                });
            }
        }
        for state in self.required_weights() {
            if !self.weights.contains_key(state) {
                return Err(ConfigurationError::MissingWeight {
                    variable: self.name.clone(),
                    state: state.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Full parameter set of the diagnosis network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Evidence variables in parent order.
    pub evidence: Vec<EvidenceSpec>,
    pub diseases: Vec<String>,
    #[serde(default)]
    pub base_rates: BTreeMap<String, f64>,
    #[serde(default = "default_base_rate")]
    pub default_base_rate: f64,
    #[serde(default = "default_probability_cap")]
    pub probability_cap: f64,
    #[serde(default)]
    pub strategy: CptStrategy,
}

fn default_base_rate() -> f64 {
    0.05
}

fn default_probability_cap() -> f64 {
    0.95
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl NetworkConfig {
    /// The built-in parameter set.
    pub fn standard() -> Self {
        let symptom_weights = [(FEVER, 1.5), (COUGH, 1.3), (FATIGUE, 1.2), (HEADACHE, 1.1)];

        let mut evidence: Vec<EvidenceSpec> = symptom_weights
            .iter()
            .map(|(name, weight)| EvidenceSpec::symptom(name, 0.2, *weight))
            .collect();
        evidence.push(EvidenceSpec::demographic(
            AGE_GROUP,
            &[("child", 0.2, 1.2), ("adult", 0.5, 1.0), ("elderly", 0.3, 1.5)],
        ));
        evidence.push(EvidenceSpec::demographic(
            LOCATION,
            &[("urban", 0.4, 1.3), ("rural", 0.3, 1.0), ("tropical", 0.3, 1.4)],
        ));

        let base_rates = [
            ("Flu", 0.1),
            ("COVID-19", 0.05),
            ("Common Cold", 0.15),
            ("Malaria", 0.07),
            ("Tuberculosis", 0.08),
            ("Dengue", 0.06),
            ("Pneumonia", 0.07),
            ("Typhoid", 0.06),
            ("Asthma", 0.05),
            ("Bronchitis", 0.06),
            ("Measles", 0.05),
            ("Sinusitis", 0.04),
            ("Meningitis", 0.02),
            ("Chickenpox", 0.07),
            ("Allergy", 0.07),
        ]
        .into_iter()
        .map(|(d, p)| (d.to_string(), p))
        .collect();

        Self {
            evidence,
            diseases: DISEASES.iter().map(|d| d.to_string()).collect(),
            base_rates,
            default_base_rate: default_base_rate(),
            probability_cap: default_probability_cap(),
            strategy: CptStrategy::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    pub fn with_strategy(mut self, strategy: CptStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Base rate of `disease`, falling back to `default_base_rate`.
    pub fn base_rate(&self, disease: &str) -> f64 {
        self.base_rates
            .get(disease)
            .copied()
            .unwrap_or(self.default_base_rate)
    }

    pub fn evidence_spec(&self, name: &str) -> Option<&EvidenceSpec> {
        self.evidence.iter().find(|e| e.name == name)
    }

    /// Mutable access for adjusting a single parameter before building.
    pub fn evidence_spec_mut(&mut self, name: &str) -> Option<&mut EvidenceSpec> {
        self.evidence.iter_mut().find(|e| e.name == name)
    }

    pub fn evidence_variables(&self) -> Vec<Variable> {
        self.evidence.iter().map(EvidenceSpec::variable).collect()
    }

    pub fn disease_variables(&self) -> Vec<Variable> {
        self.diseases.iter().map(Variable::disease).collect()
    }

    /// Run every build-time check without generating any table.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.evidence.is_empty() {
            return Err(ConfigurationError::EmptyLayer { layer: "evidence" });
        }
        if self.diseases.is_empty() {
            return Err(ConfigurationError::EmptyLayer { layer: "disease" });
        }

        let mut names = BTreeSet::new();
        for name in self
            .evidence
            .iter()
            .map(|e| e.name.as_str())
            .chain(self.diseases.iter().map(String::as_str))
        {
            if !names.insert(name) {
                return Err(ConfigurationError::DuplicateVariable {
                    variable: name.to_string(),
                });
            }
        }

        for spec in &self.evidence {
            spec.validate()?;
        }

        if !(self.probability_cap > 0.0 && self.probability_cap < 1.0) {
            return Err(ConfigurationError::InvalidProbability {
                context: "probability cap".to_string(),
                range: "(0, 1)",
                value: self.probability_cap,
            });
        }
        check_rate("default base rate", self.default_base_rate)?;
        for (disease, rate) in &self.base_rates {
            if !self.diseases.contains(disease) {
                return Err(ConfigurationError::UnknownDisease {
                    disease: disease.clone(),
                });
            }
            check_rate(&format!("base rate of {disease}"), *rate)?;
        }
        Ok(())
    }
}

fn check_rate(context: &str, value: f64) -> Result<(), ConfigurationError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidProbability {
            context: context.to_string(),
            range: "(0, 1]",
            value,
        })
    }
}

/// Check that `row` is a probability distribution.
pub(crate) fn check_distribution(
    variable: &str,
    row: usize,
    values: &[f64],
) -> Result<(), ConfigurationError> {
    if let Some(bad) = values
        .iter()
        .find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0)
    {
        return Err(ConfigurationError::InvalidProbability {
            context: format!("CPT row {row} of {variable}"),
            range: "[0, 1]",
            value: *bad,
        });
    }
    let sum: f64 = values.iter().sum();
    if (sum - 1.0).abs() > SUM_TOLERANCE {
        return Err(ConfigurationError::RowSum {
            variable: variable.to_string(),
            row,
            sum,
        });
    }
    Ok(())
}

//! Discrete variables of the diagnosis network and the built-in catalog.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Negative state of binary variables.
pub const NO: &str = "no";
/// Positive state of binary variables.
pub const YES: &str = "yes";

pub const FEVER: &str = "Fever";
pub const COUGH: &str = "Cough";
pub const FATIGUE: &str = "Fatigue";
pub const HEADACHE: &str = "Headache";

/// Symptoms modelled as evidence variables, in parent order.
pub const CORE_SYMPTOMS: [&str; 4] = [FEVER, COUGH, FATIGUE, HEADACHE];

pub const AGE_GROUP: &str = "AgeGroup";
pub const LOCATION: &str = "Location";

/// The disease catalog.
pub const DISEASES: [&str; 15] = [
    "Flu",
    "COVID-19",
    "Common Cold",
    "Malaria",
    "Tuberculosis",
    "Dengue",
    "Pneumonia",
    "Typhoid",
    "Asthma",
    "Bronchitis",
    "Measles",
    "Sinusitis",
    "Meningitis",
    "Chickenpox",
    "Allergy",
];

/// Role of a variable in the two-layer network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// Binary evidence variable whose positive state is [`YES`].
    Symptom,
    /// Multi-valued evidence variable; every state carries a weight.
    Demographic,
    /// Binary target variable.
    Disease,
}

impl VariableKind {
    pub fn is_evidence(self) -> bool {
        !matches!(self, VariableKind::Disease)
    }
}

/// A named discrete variable with a fixed, ordered state set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    kind: VariableKind,
    states: Vec<String>,
}

impl Variable {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        kind: VariableKind,
        states: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            states: states.into_iter().map(Into::into).collect(),
        }
    }

    /// A binary `no/yes` symptom.
    pub fn symptom(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Symptom, [NO, YES])
    }

    /// A binary `no/yes` disease.
    pub fn disease(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Disease, [NO, YES])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn cardinality(&self) -> usize {
        self.states.len()
    }

    /// Position of `state` in the ordered state set.
    pub fn state_index(&self, state: &str) -> Option<usize> {
        self.states.iter().position(|s| s == state)
    }
}

/// Age bracket of the patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Child,
    #[default]
    Adult,
    Elderly,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 3] = [AgeGroup::Child, AgeGroup::Adult, AgeGroup::Elderly];

    pub fn as_str(self) -> &'static str {
        match self {
            AgeGroup::Child => "child",
            AgeGroup::Adult => "adult",
            AgeGroup::Elderly => "elderly",
        }
    }
}

impl FromStr for AgeGroup {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AgeGroup::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown age group: {s} (expected child, adult or elderly)"))
    }
}

impl std::fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Living environment of the patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    #[default]
    Urban,
    Rural,
    Tropical,
}

impl Location {
    pub const ALL: [Location; 3] = [Location::Urban, Location::Rural, Location::Tropical];

    pub fn as_str(self) -> &'static str {
        match self {
            Location::Urban => "urban",
            Location::Rural => "rural",
            Location::Tropical => "tropical",
        }
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Location::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown location: {s} (expected urban, rural or tropical)"))
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

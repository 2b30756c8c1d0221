//! Built-in disease/symptom/severity knowledge base.

use serde::{Deserialize, Serialize};

use crate::record::{RelationshipRecord, Severity};

/// A symptom of a disease together with its severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomEntry {
    pub name: String,
    #[serde(default)]
    pub severity: Severity,
}

/// One disease and its symptoms, the unit the store is populated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub disease: String,
    pub symptoms: Vec<SymptomEntry>,
}

impl KnowledgeEntry {
    pub fn new(disease: impl Into<String>) -> Self {
        Self {
            disease: disease.into(),
            symptoms: Vec::new(),
        }
    }

    pub fn with_symptom(mut self, name: impl Into<String>, severity: Severity) -> Self {
        self.symptoms.push(SymptomEntry {
            name: name.into(),
            severity,
        });
        self
    }

    /// Flatten into relationship records, one per symptom.
    pub fn records(&self) -> impl Iterator<Item = RelationshipRecord> + '_ {
        self.symptoms
            .iter()
            .map(|s| RelationshipRecord::new(&self.disease, &s.name, s.severity))
    }
}

/// The standard knowledge base covering the 15 catalog diseases.
pub fn standard_knowledge() -> Vec<KnowledgeEntry> {
    use Severity::{High, Low, Medium};

    let table: &[(&str, &[(&str, Severity)])] = &[
        (
            "Flu",
            &[("Fever", Medium), ("Cough", Low), ("Fatigue", High), ("Headache", Low)],
        ),
        (
            "COVID-19",
            &[
                ("Fever", Medium),
                ("Cough", Low),
                ("Fatigue", Medium),
                ("Loss of Smell", Medium),
                ("Shortness of Breath", High),
            ],
        ),
        (
            "Common Cold",
            &[("Cough", Medium), ("Sneezing", Low), ("Runny Nose", High)],
        ),
        (
            "Malaria",
            &[("Fever", Medium), ("Chills", Low), ("Sweating", Medium), ("Headache", Medium)],
        ),
        (
            "Tuberculosis",
            &[("Cough", Low), ("Fever", Low), ("Weight Loss", High), ("Night Sweats", High)],
        ),
        (
            "Dengue",
            &[("Fever", High), ("Joint Pain", Medium), ("Headache", High), ("Rash", High)],
        ),
        (
            "Pneumonia",
            &[
                ("Fever", High),
                ("Cough", High),
                ("Chest Pain", Low),
                ("Shortness of Breath", Low),
            ],
        ),
        (
            "Typhoid",
            &[
                ("Fever", Medium),
                ("Abdominal Pain", Low),
                ("Weakness", Low),
                ("Headache", High),
            ],
        ),
        (
            "Asthma",
            &[("Cough", Medium), ("Shortness of Breath", Low), ("Wheezing", Medium)],
        ),
        (
            "Bronchitis",
            &[("Cough", High), ("Fatigue", High), ("Chest Discomfort", Low)],
        ),
        (
            "Measles",
            &[("Fever", Medium), ("Rash", Low), ("Cough", Low), ("Runny Nose", Low)],
        ),
        (
            "Sinusitis",
            &[("Headache", High), ("Runny Nose", Low), ("Facial Pain", High)],
        ),
        (
            "Meningitis",
            &[("Fever", High), ("Headache", High), ("Neck Stiffness", High)],
        ),
        (
            "Chickenpox",
            &[("Fever", Low), ("Rash", Medium), ("Fatigue", Medium)],
        ),
        (
            "Allergy",
            &[("Sneezing", Low), ("Runny Nose", High), ("Cough", High)],
        ),
    ];

    table
        .iter()
        .map(|(disease, symptoms)| {
            symptoms
                .iter()
                .fold(KnowledgeEntry::new(*disease), |entry, (name, severity)| {
                    entry.with_symptom(*name, *severity)
                })
        })
        .collect()
}

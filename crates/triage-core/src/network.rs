//! The validated two-layer diagnosis network.
//!
//! Structure is fixed: every evidence variable is a parent of every disease
//! variable and diseases have no children. [`Network::build`] checks that the
//! supplied tables match this structure; afterwards the network is immutable
//! and can be shared across threads behind an `Arc`.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::check_distribution;
use crate::cpt::{Cpt, CptTable};
use crate::error::ConfigurationError;
use crate::variable::{Variable, VariableKind, NO, YES};

/// SHA-256 of the serialized network structure and tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NetworkFingerprint(String);

impl NetworkFingerprint {
    fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        NetworkFingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl std::fmt::Display for NetworkFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable Bayesian network: evidence layer → disease layer.
#[derive(Debug, Clone)]
pub struct Network {
    evidence: Vec<Variable>,
    diseases: Vec<Variable>,
    cpts: BTreeMap<String, Cpt>,
    fingerprint: NetworkFingerprint,
}

impl Network {
    /// Assemble and validate a network.
    ///
    /// Fails when a variable is declared twice or sits in the wrong layer, a
    /// variable has no table or more than one, a table belongs to no declared
    /// variable, a disease table's parents differ from the evidence layer, a
    /// table has the wrong number or width of rows, or a row does not sum
    /// to one.
    pub fn build(
        evidence: Vec<Variable>,
        diseases: Vec<Variable>,
        cpts: Vec<Cpt>,
    ) -> Result<Self, ConfigurationError> {
        if evidence.is_empty() {
            return Err(ConfigurationError::EmptyLayer { layer: "evidence" });
        }
        if diseases.is_empty() {
            return Err(ConfigurationError::EmptyLayer { layer: "disease" });
        }

        let mut names = BTreeSet::new();
        for (variable, layer_ok, layer) in evidence
            .iter()
            .map(|v| (v, v.kind().is_evidence(), "evidence"))
            .chain(
                diseases
                    .iter()
                    .map(|v| (v, v.kind() == VariableKind::Disease, "disease")),
            )
        {
            if !layer_ok {
                return Err(ConfigurationError::LayerMismatch {
                    variable: variable.name().to_string(),
                    layer,
                });
            }
            if variable.cardinality() == 0 {
                return Err(ConfigurationError::EmptyStates {
                    variable: variable.name().to_string(),
                });
            }
            if !names.insert(variable.name().to_string()) {
                return Err(ConfigurationError::DuplicateVariable {
                    variable: variable.name().to_string(),
                });
            }
        }

        let mut by_name = BTreeMap::new();
        for cpt in cpts {
            if !names.contains(cpt.variable()) {
                return Err(ConfigurationError::OrphanCpt {
                    variable: cpt.variable().to_string(),
                });
            }
            let name = cpt.variable().to_string();
            if by_name.insert(name.clone(), cpt).is_some() {
                return Err(ConfigurationError::DuplicateCpt { variable: name });
            }
        }

        for variable in &evidence {
            let cpt = by_name
                .get(variable.name())
                .ok_or_else(|| ConfigurationError::MissingCpt {
                    variable: variable.name().to_string(),
                })?;
            validate_root(variable, cpt)?;
        }

        let parent_names: Vec<String> = evidence.iter().map(|v| v.name().to_string()).collect();
        let parent_cards: Vec<usize> = evidence.iter().map(Variable::cardinality).collect();
        for variable in &diseases {
            let cpt = by_name
                .get(variable.name())
                .ok_or_else(|| ConfigurationError::MissingCpt {
                    variable: variable.name().to_string(),
                })?;
            validate_conditional(variable, cpt, &parent_names, &parent_cards)?;
        }

        let bytes = serde_json::to_vec(&(&evidence, &diseases, &by_name))
            .map_err(|e| ConfigurationError::Serialization(e.to_string()))?;
        let fingerprint = NetworkFingerprint::of(&bytes);

        Ok(Self {
            evidence,
            diseases,
            cpts: by_name,
            fingerprint,
        })
    }

    /// Evidence variables in parent order.
    pub fn evidence_variables(&self) -> &[Variable] {
        &self.evidence
    }

    pub fn disease_variables(&self) -> &[Variable] {
        &self.diseases
    }

    /// Position of an evidence variable in parent order.
    pub fn evidence_index(&self, name: &str) -> Option<usize> {
        self.evidence.iter().position(|v| v.name() == name)
    }

    pub fn evidence_variable(&self, name: &str) -> Option<&Variable> {
        self.evidence.iter().find(|v| v.name() == name)
    }

    pub fn disease_variable(&self, name: &str) -> Option<&Variable> {
        self.diseases.iter().find(|v| v.name() == name)
    }

    pub fn is_disease(&self, name: &str) -> bool {
        self.disease_variable(name).is_some()
    }

    /// Names of the symptom evidence variables.
    pub fn symptom_names(&self) -> impl Iterator<Item = &str> {
        self.evidence
            .iter()
            .filter(|v| v.kind() == VariableKind::Symptom)
            .map(Variable::name)
    }

    pub fn is_symptom(&self, name: &str) -> bool {
        self.symptom_names().any(|s| s == name)
    }

    pub fn cpt(&self, variable: &str) -> Option<&Cpt> {
        self.cpts.get(variable)
    }

    /// Size of the joint evidence space.
    pub fn combination_count(&self) -> usize {
        self.evidence.iter().map(Variable::cardinality).product()
    }

    pub fn fingerprint(&self) -> &NetworkFingerprint {
        &self.fingerprint
    }

    pub fn summary(&self) -> NetworkSummary {
        let mut storage: Vec<&'static str> = self
            .diseases
            .iter()
            .filter_map(|d| self.cpts.get(d.name()))
            .map(|cpt| match cpt.table() {
                CptTable::Factored(_) => "factored",
                _ => "materialized",
            })
            .collect();
        storage.dedup();
        let storage = match storage.as_slice() {
            [single] => single.to_string(),
            _ => "mixed".to_string(),
        };

        NetworkSummary {
            evidence: self
                .evidence
                .iter()
                .map(|v| VariableSummary {
                    name: v.name().to_string(),
                    kind: v.kind(),
                    states: v.states().to_vec(),
                })
                .collect(),
            diseases: self.diseases.iter().map(|v| v.name().to_string()).collect(),
            combinations: self.combination_count(),
            storage,
            fingerprint: self.fingerprint.to_string(),
        }
    }
}

fn validate_root(variable: &Variable, cpt: &Cpt) -> Result<(), ConfigurationError> {
    let distribution = match cpt.table() {
        CptTable::Prior { distribution } if cpt.is_root() => distribution,
        _ => {
            return Err(ConfigurationError::ParentMismatch {
                variable: variable.name().to_string(),
                reason: "evidence variables must have an unconditional table".to_string(),
            })
        }
    };
    if distribution.len() != variable.cardinality() {
        return Err(ConfigurationError::RowWidth {
            variable: variable.name().to_string(),
            row: 0,
            expected: variable.cardinality(),
            actual: distribution.len(),
        });
    }
    check_distribution(variable.name(), 0, distribution)
}

fn validate_conditional(
    variable: &Variable,
    cpt: &Cpt,
    parent_names: &[String],
    parent_cards: &[usize],
) -> Result<(), ConfigurationError> {
    let name = variable.name().to_string();
    // Row layout and the factored form both take state 1 as positive.
    if variable.states() != [NO, YES] {
        return Err(ConfigurationError::DiseaseStates {
            variable: name,
            states: variable.states().to_vec(),
        });
    }
    if cpt.parents() != parent_names {
        return Err(ConfigurationError::ParentMismatch {
            variable: name,
            reason: format!(
                "expected parents [{}], got [{}]",
                parent_names.join(", "),
                cpt.parents().join(", ")
            ),
        });
    }
    if cpt.parent_cardinalities() != parent_cards {
        return Err(ConfigurationError::ParentMismatch {
            variable: name,
            reason: format!(
                "expected parent cardinalities {:?}, got {:?}",
                parent_cards,
                cpt.parent_cardinalities()
            ),
        });
    }

    let expected_rows: usize = parent_cards.iter().product();
    match cpt.table() {
        CptTable::Prior { .. } => Err(ConfigurationError::ParentMismatch {
            variable: name,
            reason: "disease variables need a conditional table".to_string(),
        }),
        CptTable::Dense { rows } => {
            if rows.len() != expected_rows {
                return Err(ConfigurationError::RowCount {
                    variable: name,
                    expected: expected_rows,
                    actual: rows.len(),
                });
            }
            for (i, row) in rows.iter().enumerate() {
                if row.len() != variable.cardinality() {
                    return Err(ConfigurationError::RowWidth {
                        variable: name,
                        row: i,
                        expected: variable.cardinality(),
                        actual: row.len(),
                    });
                }
                check_distribution(variable.name(), i, row)?;
            }
            Ok(())
        }
        CptTable::Factored(table) => {
            if variable.cardinality() != 2 {
                return Err(ConfigurationError::RowWidth {
                    variable: name,
                    row: 0,
                    expected: 2,
                    actual: variable.cardinality(),
                });
            }
            let widths: Vec<usize> = table.log_factors.iter().map(Vec::len).collect();
            if widths != parent_cards {
                return Err(ConfigurationError::RowCount {
                    variable: name,
                    expected: expected_rows,
                    actual: cpt.row_count(),
                });
            }
            // Bounds instead of a row scan: p lies in (0, cap] when the base
            // rate is in (0, 1] and every factor is finite.
            if !(table.log_base.is_finite() && table.log_base <= 0.0) {
                return Err(ConfigurationError::InvalidProbability {
                    context: format!("base rate of {}", variable.name()),
                    range: "(0, 1]",
                    value: table.log_base.exp(),
                });
            }
            if let Some(bad) = table.log_factors.iter().flatten().find(|f| !f.is_finite()) {
                return Err(ConfigurationError::InvalidWeight {
                    variable: variable.name().to_string(),
                    state: "factored".to_string(),
                    value: bad.exp(),
                });
            }
            if !(table.cap > 0.0 && table.cap < 1.0) {
                return Err(ConfigurationError::InvalidProbability {
                    context: format!("probability cap of {}", variable.name()),
                    range: "(0, 1)",
                    value: table.cap,
                });
            }
            Ok(())
        }
    }
}

/// Serializable description of a network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSummary {
    pub evidence: Vec<VariableSummary>,
    pub diseases: Vec<String>,
    pub combinations: usize,
    pub storage: String,
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSummary {
    pub name: String,
    pub kind: VariableKind,
    pub states: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpt::FactoredTable;

    fn tiny_evidence() -> Vec<Variable> {
        vec![Variable::symptom("Fever")]
    }

    fn tiny_cpts(rows: Vec<Vec<f64>>) -> Vec<Cpt> {
        vec![
            Cpt::prior("Fever", vec![0.8, 0.2]),
            Cpt::dense("Flu", vec!["Fever".into()], vec![2], rows),
        ]
    }

    #[test]
    fn test_build_tiny_network() {
        let network = Network::build(
            tiny_evidence(),
            vec![Variable::disease("Flu")],
            tiny_cpts(vec![vec![0.9, 0.1], vec![0.85, 0.15]]),
        )
        .unwrap();
        assert_eq!(network.combination_count(), 2);
        assert!(network.is_disease("Flu"));
        assert!(network.is_symptom("Fever"));
        assert_eq!(network.fingerprint().as_str().len(), 64);
        assert_eq!(network.summary().storage, "materialized");
    }

    #[test]
    fn test_disease_states_must_be_no_yes() {
        let err = Network::build(
            tiny_evidence(),
            vec![Variable::new("Flu", VariableKind::Disease, ["yes", "no"])],
            tiny_cpts(vec![vec![0.9, 0.1], vec![0.85, 0.15]]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DiseaseStates {
                variable: "Flu".to_string(),
                states: vec!["yes".to_string(), "no".to_string()],
            }
        );

        let err = Network::build(
            tiny_evidence(),
            vec![Variable::new(
                "Flu",
                VariableKind::Disease,
                ["absent", "mild", "severe"],
            )],
            tiny_cpts(vec![vec![0.9, 0.1], vec![0.85, 0.15]]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::DiseaseStates { .. }));
    }

    #[test]
    fn test_row_count_mismatch_rejected() {
        let err = Network::build(
            tiny_evidence(),
            vec![Variable::disease("Flu")],
            tiny_cpts(vec![vec![0.9, 0.1]]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::RowCount {
                variable: "Flu".to_string(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_row_sum_rejected() {
        let err = Network::build(
            tiny_evidence(),
            vec![Variable::disease("Flu")],
            tiny_cpts(vec![vec![0.9, 0.1], vec![0.9, 0.2]]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::RowSum { row: 1, .. }));
    }

    #[test]
    fn test_orphan_and_missing_cpts_rejected() {
        let mut cpts = tiny_cpts(vec![vec![0.9, 0.1], vec![0.85, 0.15]]);
        cpts.push(Cpt::prior("Cough", vec![0.8, 0.2]));
        let err = Network::build(tiny_evidence(), vec![Variable::disease("Flu")], cpts)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::OrphanCpt { .. }));

        let err = Network::build(
            tiny_evidence(),
            vec![Variable::disease("Flu")],
            vec![Cpt::prior("Fever", vec![0.8, 0.2])],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingCpt { .. }));
    }

    #[test]
    fn test_duplicate_cpt_rejected() {
        let mut cpts = tiny_cpts(vec![vec![0.9, 0.1], vec![0.85, 0.15]]);
        cpts.push(Cpt::prior("Fever", vec![0.5, 0.5]));
        let err = Network::build(tiny_evidence(), vec![Variable::disease("Flu")], cpts)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateCpt { .. }));
    }

    #[test]
    fn test_disease_in_evidence_layer_rejected() {
        let err = Network::build(
            vec![Variable::disease("Flu")],
            vec![Variable::disease("Cold")],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::LayerMismatch { .. }));
    }

    #[test]
    fn test_disease_parent_edge_rejected() {
        // A disease listing another disease as parent would break the layering.
        let cpts = vec![
            Cpt::prior("Fever", vec![0.8, 0.2]),
            Cpt::dense(
                "Flu",
                vec!["Cold".into()],
                vec![2],
                vec![vec![0.9, 0.1], vec![0.8, 0.2]],
            ),
            Cpt::dense(
                "Cold",
                vec!["Fever".into()],
                vec![2],
                vec![vec![0.9, 0.1], vec![0.8, 0.2]],
            ),
        ];
        let err = Network::build(
            tiny_evidence(),
            vec![Variable::disease("Flu"), Variable::disease("Cold")],
            cpts,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::ParentMismatch { .. }));
    }

    #[test]
    fn test_factored_shape_checked() {
        let table = FactoredTable {
            log_base: 0.1f64.ln(),
            log_factors: vec![vec![0.0, 0.0, 0.0]],
            cap: 0.95,
        };
        let cpts = vec![
            Cpt::prior("Fever", vec![0.8, 0.2]),
            Cpt::factored("Flu", vec!["Fever".into()], vec![2], table),
        ];
        let err = Network::build(tiny_evidence(), vec![Variable::disease("Flu")], cpts)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::RowCount { .. }));
    }

    #[test]
    fn test_fingerprint_tracks_table_contents() {
        let a = Network::build(
            tiny_evidence(),
            vec![Variable::disease("Flu")],
            tiny_cpts(vec![vec![0.9, 0.1], vec![0.85, 0.15]]),
        )
        .unwrap();
        let b = Network::build(
            tiny_evidence(),
            vec![Variable::disease("Flu")],
            tiny_cpts(vec![vec![0.9, 0.1], vec![0.8, 0.2]]),
        )
        .unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}

//! Conditional probability tables and the weight-driven CPT generator.
//!
//! Every disease row is derived from the same multiplicative model:
//!
//! ```text
//! p = min(cap, base_rate(disease) * Π factor(parent_i = state_i))
//! row = [1 - p, p]
//! ```
//!
//! Rows are laid out row-major over the parents with the last parent varying
//! fastest. Two storage strategies produce the same probabilities:
//! [`CptStrategy::Materialized`] enumerates and stores every row up front,
//! [`CptStrategy::Factored`] keeps the per-parent log factors and evaluates a
//! row on demand as `exp(ln base + Σ ln factor)`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{check_distribution, NetworkConfig};
use crate::error::ConfigurationError;
use crate::network::Network;

/// How disease tables are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CptStrategy {
    /// Every parent combination is enumerated and stored.
    #[default]
    Materialized,
    /// Rows are computed lazily from log-linear factors.
    Factored,
}

impl CptStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            CptStrategy::Materialized => "materialized",
            CptStrategy::Factored => "factored",
        }
    }
}

impl std::str::FromStr for CptStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "materialized" => Ok(CptStrategy::Materialized),
            "factored" => Ok(CptStrategy::Factored),
            other => Err(format!(
                "unknown CPT strategy: {other} (expected materialized or factored)"
            )),
        }
    }
}

/// Log-linear parameters of a binary disease table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoredTable {
    pub log_base: f64,
    /// `log_factors[i][s]` is the log weight of parent `i` in state `s`.
    pub log_factors: Vec<Vec<f64>>,
    pub cap: f64,
}

impl FactoredTable {
    /// Positive-state probability for a full parent assignment.
    pub fn positive(&self, states: &[usize]) -> f64 {
        let log_p: f64 = self.log_base
            + states
                .iter()
                .zip(&self.log_factors)
                .map(|(state, factors)| factors[*state])
                .sum::<f64>();
        log_p.exp().min(self.cap)
    }
}

/// Storage of a single table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CptTable {
    /// Unconditional distribution of a root variable.
    Prior { distribution: Vec<f64> },
    /// One stored row per parent combination.
    Dense { rows: Vec<Vec<f64>> },
    /// Rows evaluated on demand (binary variables only).
    Factored(FactoredTable),
}

/// Conditional probability table of one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cpt {
    variable: String,
    parents: Vec<String>,
    parent_cardinalities: Vec<usize>,
    table: CptTable,
}

impl Cpt {
    pub fn prior(variable: impl Into<String>, distribution: Vec<f64>) -> Self {
        Self {
            variable: variable.into(),
            parents: Vec::new(),
            parent_cardinalities: Vec::new(),
            table: CptTable::Prior { distribution },
        }
    }

    pub fn dense(
        variable: impl Into<String>,
        parents: Vec<String>,
        parent_cardinalities: Vec<usize>,
        rows: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            variable: variable.into(),
            parents,
            parent_cardinalities,
            table: CptTable::Dense { rows },
        }
    }

    pub fn factored(
        variable: impl Into<String>,
        parents: Vec<String>,
        parent_cardinalities: Vec<usize>,
        table: FactoredTable,
    ) -> Self {
        Self {
            variable: variable.into(),
            parents,
            parent_cardinalities,
            table: CptTable::Factored(table),
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn parent_cardinalities(&self) -> &[usize] {
        &self.parent_cardinalities
    }

    pub fn table(&self) -> &CptTable {
        &self.table
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Number of parent combinations this table covers.
    pub fn row_count(&self) -> usize {
        match &self.table {
            CptTable::Prior { .. } => 1,
            CptTable::Dense { rows } => rows.len(),
            CptTable::Factored(f) => f.log_factors.iter().map(Vec::len).product(),
        }
    }

    /// Row index of a full parent assignment.
    pub fn row_index(&self, states: &[usize]) -> usize {
        states
            .iter()
            .zip(&self.parent_cardinalities)
            .fold(0, |index, (state, card)| index * card + state)
    }

    /// `P(variable = state | parents = states)`.
    pub fn probability(&self, states: &[usize], state: usize) -> f64 {
        match &self.table {
            CptTable::Prior { distribution } => distribution[state],
            CptTable::Dense { rows } => rows[self.row_index(states)][state],
            CptTable::Factored(f) => {
                let p = f.positive(states);
                if state == 1 {
                    p
                } else {
                    1.0 - p
                }
            }
        }
    }

    /// The distribution for a full parent assignment.
    pub fn row(&self, states: &[usize]) -> Vec<f64> {
        match &self.table {
            CptTable::Prior { distribution } => distribution.clone(),
            CptTable::Dense { rows } => rows[self.row_index(states)].clone(),
            CptTable::Factored(f) => {
                let p = f.positive(states);
                vec![1.0 - p, p]
            }
        }
    }

    /// Every row in row-major order. Factored rows are computed as they are
    /// yielded.
    pub fn rows(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        StateCombinations::new(&self.parent_cardinalities).map(move |states| self.row(&states))
    }
}

/// Row-major enumeration of every assignment to a list of variables, last
/// variable varying fastest.
#[derive(Debug, Clone)]
pub struct StateCombinations {
    cardinalities: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl StateCombinations {
    pub fn new(cardinalities: &[usize]) -> Self {
        let next = if cardinalities.iter().any(|c| *c == 0) {
            None
        } else {
            Some(vec![0; cardinalities.len()])
        };
        Self {
            cardinalities: cardinalities.to_vec(),
            next,
        }
    }
}

impl Iterator for StateCombinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let mut successor = current.clone();
        for i in (0..successor.len()).rev() {
            successor[i] += 1;
            if successor[i] < self.cardinalities[i] {
                self.next = Some(successor);
                return Some(current);
            }
            successor[i] = 0;
        }
        // Wrapped around every position: `current` was the last assignment.
        Some(current)
    }
}

/// Derives every CPT of the network from a validated [`NetworkConfig`].
#[derive(Debug)]
pub struct CptGenerator<'a> {
    config: &'a NetworkConfig,
    parents: Vec<String>,
    cardinalities: Vec<usize>,
    factors: Vec<Vec<f64>>,
}

impl<'a> CptGenerator<'a> {
    /// Validate `config` and prepare the shared parent layout.
    pub fn new(config: &'a NetworkConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            config,
            parents: config.evidence.iter().map(|e| e.name.clone()).collect(),
            cardinalities: config.evidence.iter().map(|e| e.states.len()).collect(),
            factors: config.evidence.iter().map(|e| e.factors()).collect(),
        })
    }

    /// Unconditional tables of the evidence variables.
    pub fn root_cpts(&self) -> Result<Vec<Cpt>, ConfigurationError> {
        self.config
            .evidence
            .iter()
            .map(|spec| {
                check_distribution(&spec.name, 0, &spec.prior)?;
                Ok(Cpt::prior(&spec.name, spec.prior.clone()))
            })
            .collect()
    }

    /// Table of one disease using the configured strategy.
    pub fn disease_cpt(&self, disease: &str) -> Result<Cpt, ConfigurationError> {
        match self.config.strategy {
            CptStrategy::Materialized => self.materialize(disease),
            CptStrategy::Factored => Ok(self.factor(disease)),
        }
    }

    /// Every table: roots first, then diseases in catalog order.
    pub fn generate(&self) -> Result<Vec<Cpt>, ConfigurationError> {
        let mut cpts = self.root_cpts()?;
        for disease in &self.config.diseases {
            cpts.push(self.disease_cpt(disease)?);
        }
        Ok(cpts)
    }

    fn materialize(&self, disease: &str) -> Result<Cpt, ConfigurationError> {
        let base = self.config.base_rate(disease);
        let cap = self.config.probability_cap;

        let mut rows = Vec::with_capacity(self.cardinalities.iter().product());
        for (row, states) in StateCombinations::new(&self.cardinalities).enumerate() {
            let p = states
                .iter()
                .zip(&self.factors)
                .fold(base, |p, (state, factors)| p * factors[*state])
                .min(cap);
            let values = vec![1.0 - p, p];
            check_distribution(disease, row, &values)?;
            rows.push(values);
        }
        debug!(disease = %disease, rows = rows.len(), "materialized disease CPT");

        Ok(Cpt::dense(
            disease,
            self.parents.clone(),
            self.cardinalities.clone(),
            rows,
        ))
    }

    fn factor(&self, disease: &str) -> Cpt {
        let table = FactoredTable {
            log_base: self.config.base_rate(disease).ln(),
            log_factors: self
                .factors
                .iter()
                .map(|f| f.iter().map(|w| w.ln()).collect())
                .collect(),
            cap: self.config.probability_cap,
        };
        Cpt::factored(
            disease,
            self.parents.clone(),
            self.cardinalities.clone(),
            table,
        )
    }
}

/// Generate every CPT from `config` and assemble the validated network.
pub fn build_network(config: &NetworkConfig) -> Result<Network, ConfigurationError> {
    let generator = CptGenerator::new(config)?;
    let cpts = generator.generate()?;
    let network = Network::build(
        config.evidence_variables(),
        config.disease_variables(),
        cpts,
    )?;
    crate::obs::emit_network_built(
        network.fingerprint().short(),
        network.evidence_variables().len(),
        network.disease_variables().len(),
        config.strategy.as_str(),
    );
    crate::metrics::METRICS.inc_networks_built();
    Ok(network)
}

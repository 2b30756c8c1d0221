//! Normalization of free-text symptom input.
//!
//! Input is trimmed, common lay phrasings are mapped onto canonical symptom
//! names, and the result is matched against the known symptom set ignoring
//! case. Anything left over is reported back as ignored.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::obs;

/// Built-in lay phrasings and the symptom each one stands for.
pub const DEFAULT_ALIASES: [(&str, &str); 8] = [
    ("high fever", "Fever"),
    ("stiff neck", "Neck Stiffness"),
    ("runny nose", "Runny Nose"),
    ("shortness of breath", "Difficulty Breathing"),
    ("sore throat", "Throat Pain"),
    ("body ache", "Muscle Pain"),
    ("stomach pain", "Abdominal Pain"),
    ("throwing up", "Vomiting"),
];

/// Outcome of resolving raw symptom strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSymptoms {
    /// Canonical names, first occurrence order, no duplicates.
    pub recognized: Vec<String>,
    /// Trimmed inputs that matched nothing.
    pub ignored: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SymptomVocabulary {
    /// Lowercased name -> canonical name.
    canonical: BTreeMap<String, String>,
    /// Lowercased alias -> canonical name.
    aliases: BTreeMap<String, String>,
}

impl SymptomVocabulary {
    /// Vocabulary over `known` plus the default aliases and their targets.
    pub fn new<I, S>(known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Self::default();
        for name in known {
            vocabulary.add_symptom(name.as_ref());
        }
        for (alias, target) in DEFAULT_ALIASES {
            vocabulary = vocabulary.with_alias(alias, target);
        }
        vocabulary
    }

    /// Register `alias` for `target`, making `target` a known symptom.
    pub fn with_alias(mut self, alias: &str, target: &str) -> Self {
        let target = self.add_symptom(target);
        let alias = alias.trim().to_lowercase();
        if !alias.is_empty() {
            self.aliases.insert(alias, target);
        }
        self
    }

    fn add_symptom(&mut self, name: &str) -> String {
        let name = name.trim();
        self.canonical
            .entry(name.to_lowercase())
            .or_insert_with(|| name.to_string())
            .clone()
    }

    /// Canonical name for one raw input, if known.
    ///
    /// A known symptom name wins over an alias spelled the same way.
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        let key = raw.trim().to_lowercase();
        self.canonical
            .get(&key)
            .or_else(|| self.aliases.get(&key))
            .map(String::as_str)
    }

    /// Resolve raw inputs. Blank entries are dropped silently.
    pub fn resolve<I, S>(&self, inputs: I) -> ResolvedSymptoms
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolved = ResolvedSymptoms::default();
        let mut seen = BTreeSet::new();
        for input in inputs {
            let raw = input.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            match self.lookup(raw) {
                Some(name) => {
                    if seen.insert(name.to_string()) {
                        resolved.recognized.push(name.to_string());
                    }
                }
                None => {
                    obs::emit_symptom_ignored(raw);
                    if !resolved.ignored.iter().any(|i| i == raw) {
                        resolved.ignored.push(raw.to_string());
                    }
                }
            }
        }
        resolved
    }

    /// Split a comma-separated list into trimmed, non-empty entries.
    pub fn parse_list(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    /// Known canonical names, sorted case-insensitively.
    pub fn known(&self) -> impl Iterator<Item = &str> {
        self.canonical.values().map(String::as_str)
    }
}

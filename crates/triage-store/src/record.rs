//! Relationship record schema: `(disease)-[HAS_SYMPTOM {severity}]->(symptom)`.

use serde::{Deserialize, Serialize};

/// Severity of a symptom for a given disease.
///
/// Labels other than `low`, `medium` and `high` (including a missing label)
/// weigh the same as `low`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

impl Severity {
    /// Numeric weight used by the severity scorer.
    pub fn weight(self) -> u32 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }

    /// Parse a stored severity label, case-insensitively.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
            Some("medium") => Severity::Medium,
            Some("high") => Severity::High,
            _ => Severity::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl From<Option<String>> for Severity {
    fn from(label: Option<String>) -> Self {
        Severity::from_label(label.as_deref())
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single disease/symptom edge as returned by the relationship store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub disease: String,
    pub symptom: String,
    #[serde(default)]
    pub severity: Severity,
}

impl RelationshipRecord {
    pub fn new(disease: impl Into<String>, symptom: impl Into<String>, severity: Severity) -> Self {
        Self {
            disease: disease.into(),
            symptom: symptom.into(),
            severity,
        }
    }

    /// Severity weight of this edge (1..=3).
    pub fn weight(&self) -> u32 {
        self.severity.weight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_weights() {
        assert_eq!(Severity::Low.weight(), 1);
        assert_eq!(Severity::Medium.weight(), 2);
        assert_eq!(Severity::High.weight(), 3);
    }

    #[test]
    fn test_unknown_or_missing_label_weighs_one() {
        assert_eq!(Severity::from_label(None).weight(), 1);
        assert_eq!(Severity::from_label(Some("moderate")).weight(), 1);
        assert_eq!(Severity::from_label(Some("")).weight(), 1);
        assert_eq!(Severity::from_label(Some(" HIGH ")), Severity::High);
    }

    #[test]
    fn test_record_deserializes_without_severity() {
        let record: RelationshipRecord =
            serde_json::from_str(r#"{"disease":"Flu","symptom":"Fever"}"#).unwrap();
        assert_eq!(record.severity, Severity::Low);

        let record: RelationshipRecord =
            serde_json::from_str(r#"{"disease":"Flu","symptom":"Fever","severity":null}"#)
                .unwrap();
        assert_eq!(record.weight(), 1);

        let record: RelationshipRecord =
            serde_json::from_str(r#"{"disease":"Flu","symptom":"Fever","severity":"moderate"}"#)
                .unwrap();
        assert_eq!(record.weight(), 1);

        let record: RelationshipRecord =
            serde_json::from_str(r#"{"disease":"Flu","symptom":"Fever","severity":"Medium"}"#)
                .unwrap();
        assert_eq!(record.weight(), 2);
    }

    #[test]
    fn test_record_serializes_lowercase_severity() {
        let record = RelationshipRecord::new("Dengue", "Rash", Severity::High);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["severity"], "high");
    }
}

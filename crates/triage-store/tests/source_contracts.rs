//! Contract tests for `RelationshipSource`.
//!
//! These tests verify the read behaviour the diagnosis ranker depends on,
//! using the in-memory store. Any conforming backend must pass these.

use triage_store::{
    standard_knowledge, KnowledgeEntry, MemoryRelationshipStore, RelationshipSource, Severity,
};

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn only_requested_symptoms_are_returned() {
    let store = MemoryRelationshipStore::standard();
    let records = store
        .relationships_for_symptoms(&names(&["Rash"]))
        .await
        .unwrap();

    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r.symptom == "Rash"));

    let diseases: Vec<&str> = records.iter().map(|r| r.disease.as_str()).collect();
    assert_eq!(diseases, vec!["Dengue", "Measles", "Chickenpox"]);
}

#[tokio::test]
async fn unknown_symptom_matches_nothing() {
    let store = MemoryRelationshipStore::standard();
    let records = store
        .relationships_for_symptoms(&names(&["Zxyzzy"]))
        .await
        .unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn empty_request_matches_nothing() {
    let store = MemoryRelationshipStore::standard();
    let records = store.relationships_for_symptoms(&[]).await.unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn symptom_match_is_exact() {
    let store = MemoryRelationshipStore::standard();
    let records = store
        .relationships_for_symptoms(&names(&["fever"]))
        .await
        .unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn results_are_stable_across_calls() {
    let store = MemoryRelationshipStore::standard();
    let query = names(&["Fever", "Cough"]);
    let first = store.relationships_for_symptoms(&query).await.unwrap();
    let second = store.relationships_for_symptoms(&query).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn merged_severity_is_visible_to_readers() {
    let store = MemoryRelationshipStore::new();
    store.merge("Flu", "Fever", Severity::Low).unwrap();
    store.merge("Flu", "Fever", Severity::High).unwrap();

    let records = store
        .relationships_for_symptoms(&names(&["Fever"]))
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].severity, Severity::High);
}

#[tokio::test]
async fn known_symptoms_and_diseases_reflect_contents() {
    let store = MemoryRelationshipStore::from_entries(&standard_knowledge()).unwrap();

    let diseases = store.diseases().await.unwrap();
    assert_eq!(diseases.len(), 15);
    assert!(diseases.contains("COVID-19"));

    let symptoms = store.known_symptoms().await.unwrap();
    assert!(symptoms.contains("Neck Stiffness"));
    assert!(symptoms.contains("Loss of Smell"));
    assert!(!symptoms.contains("Vomiting"));
}

#[tokio::test]
async fn custom_entries_populate_store() {
    let entries = vec![KnowledgeEntry::new("Migraine")
        .with_symptom("Headache", Severity::High)
        .with_symptom("Nausea", Severity::Low)];
    let store = MemoryRelationshipStore::from_entries(&entries).unwrap();

    let records = store
        .relationships_for_symptoms(&names(&["Headache", "Nausea"]))
        .await
        .unwrap();
    let total: u32 = records.iter().map(|r| r.weight()).sum();
    assert_eq!(total, 4);
}

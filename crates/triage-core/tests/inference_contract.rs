//! Contract tests for exact inference over the standard network.

use triage_core::{
    build_network, distribution, query, query_all, CptStrategy, EvidenceAssignment, Network,
    NetworkConfig, ValidationError, METRICS,
};

const EPS: f64 = 1e-9;

fn standard() -> Network {
    build_network(&NetworkConfig::standard()).unwrap()
}

fn full_evidence() -> EvidenceAssignment {
    EvidenceAssignment::new()
        .with("Fever", "yes")
        .with("Cough", "yes")
        .with("Fatigue", "no")
        .with("Headache", "no")
        .with("AgeGroup", "child")
        .with("Location", "tropical")
}

#[test]
fn full_evidence_reads_the_table_row() {
    let network = standard();
    let posteriors = query(&network, ["Flu"], &full_evidence()).unwrap();
    assert!((posteriors["Flu"] - 0.3276).abs() < EPS);
}

#[test]
fn partial_evidence_marginalizes_unobserved_symptoms() {
    let network = standard();
    let evidence: EvidenceAssignment = [
        ("Fever", "yes"),
        ("Cough", "yes"),
        ("AgeGroup", "child"),
        ("Location", "tropical"),
    ]
    .into_iter()
    .collect();

    // Fatigue and Headache contribute their expected factors 1.04 and 1.02.
    let p = query(&network, ["Flu"], &evidence).unwrap()["Flu"];
    assert!((p - 0.3276 * 1.04 * 1.02).abs() < EPS);
}

#[test]
fn no_evidence_gives_prior_predictive() {
    let network = standard();
    let p = query(&network, ["Meningitis"], &EvidenceAssignment::new()).unwrap()["Meningitis"];
    let expected = 0.02 * 1.1 * 1.06 * 1.04 * 1.02 * (0.2 * 1.2 + 0.5 + 0.3 * 1.5)
        * (0.4 * 1.3 + 0.3 + 0.3 * 1.4);
    assert!((p - expected).abs() < EPS);
}

#[test]
fn disease_distributions_are_normalized() {
    let network = standard();
    let evidence = EvidenceAssignment::new().with("Headache", "yes");
    for disease in network.disease_variables() {
        let dist = distribution(&network, disease.name(), &evidence).unwrap();
        assert_eq!(dist.len(), 2);
        assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn evidence_roots_keep_their_priors() {
    let network = standard();
    let evidence = EvidenceAssignment::new()
        .with("Fever", "yes")
        .with("Location", "rural");

    let age = distribution(&network, "AgeGroup", &evidence).unwrap();
    assert_eq!(age, vec![0.2, 0.5, 0.3]);

    let cough = distribution(&network, "Cough", &EvidenceAssignment::new()).unwrap();
    assert!((cough[1] - 0.2).abs() < EPS);

    let location = distribution(&network, "Location", &evidence).unwrap();
    assert_eq!(location, vec![0.0, 1.0, 0.0]);
}

#[test]
fn positive_evidence_raises_every_posterior() {
    let network = standard();
    let baseline = query_all(&network, &EvidenceAssignment::new()).unwrap();
    let with_fever =
        query_all(&network, &EvidenceAssignment::new().with("Fever", "yes")).unwrap();
    assert_eq!(baseline.len(), 15);
    for (disease, p) in &baseline {
        assert!(with_fever[disease] > *p, "{disease}");
    }
}

#[test]
fn illegal_state_is_rejected() {
    let network = standard();
    let err = query(
        &network,
        ["Flu"],
        &EvidenceAssignment::new().with("AgeGroup", "teen"),
    )
    .unwrap_err();
    match err {
        ValidationError::IllegalState {
            variable,
            state,
            allowed,
        } => {
            assert_eq!(variable, "AgeGroup");
            assert_eq!(state, "teen");
            assert_eq!(allowed, ["child", "adult", "elderly"]);
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = query(
        &network,
        ["Flu"],
        &EvidenceAssignment::new().with("Fever", "maybe"),
    )
    .unwrap_err();
    assert!(matches!(err, ValidationError::IllegalState { .. }));
}

#[test]
fn unknown_evidence_variable_is_rejected() {
    let network = standard();
    let err = query(
        &network,
        ["Flu"],
        &EvidenceAssignment::new().with("Nausea", "yes"),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ValidationError::UnknownVariable {
            variable: "Nausea".to_string()
        }
    );

    let err = distribution(&network, "Nausea", &EvidenceAssignment::new()).unwrap_err();
    assert!(matches!(err, ValidationError::UnknownVariable { .. }));
}

#[test]
fn failed_query_leaves_network_untouched() {
    let network = standard();
    let before = network.fingerprint().clone();
    let _ = query(
        &network,
        ["Flu"],
        &EvidenceAssignment::new().with("Fever", "maybe"),
    );
    assert_eq!(network.fingerprint(), &before);
    assert!(query(&network, ["Flu"], &full_evidence()).is_ok());
}

#[test]
fn unknown_target_yields_zero_without_failing_others() {
    let network = standard();
    let misses_before = METRICS.lookup_misses();
    let posteriors = query(&network, ["Flu", "Zxyzzy"], &full_evidence()).unwrap();
    assert_eq!(posteriors["Zxyzzy"], 0.0);
    assert!((posteriors["Flu"] - 0.3276).abs() < EPS);
    assert!(METRICS.lookup_misses() > misses_before);
}

#[test]
fn strategies_give_identical_posteriors() {
    let materialized = standard();
    let factored =
        build_network(&NetworkConfig::standard().with_strategy(CptStrategy::Factored)).unwrap();
    let evidence = EvidenceAssignment::new()
        .with("Cough", "yes")
        .with("AgeGroup", "elderly");

    let a = query_all(&materialized, &evidence).unwrap();
    let b = query_all(&factored, &evidence).unwrap();
    for (disease, p) in &a {
        assert!((p - b[disease]).abs() < 1e-12, "{disease}");
    }
}

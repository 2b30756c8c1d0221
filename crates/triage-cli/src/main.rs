//! Symptom Triage CLI
//!
//! The `triage` command ranks likely diseases for a set of symptoms.
//!
//! ## Commands
//!
//! - `diagnose`: Ranked differential diagnosis for a symptom list
//! - `query`: Raw disease posteriors for arbitrary evidence
//! - `network`: Describe the loaded network
//! - `symptoms`: List recognized symptom names

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn, Level};

use triage_core::{
    AgeGroup, CptStrategy, Demographics, DiagnosisReport, DiagnosisRequest, DiagnosisService,
    EvidenceAssignment, Location, NetworkConfig, SymptomVocabulary, METRICS,
};
use triage_store::MemoryRelationshipStore;

#[derive(Parser)]
#[command(name = "triage")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bayesian symptom triage and differential diagnosis", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Network parameter file (JSON); built-in parameters when omitted
    #[arg(long, global = true, env = "TRIAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the CPT storage strategy (materialized or factored)
    #[arg(long, global = true)]
    strategy: Option<CptStrategy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank likely diseases for a set of symptoms
    Diagnose {
        /// Comma-separated symptoms, e.g. "Fever, Cough"
        #[arg(short, long)]
        symptoms: String,

        /// Age group: child, adult or elderly
        #[arg(long)]
        age: Option<AgeGroup>,

        /// Location: urban, rural or tropical
        #[arg(long)]
        location: Option<Location>,

        /// Number of diseases to show
        #[arg(short, long, default_value = "5")]
        top: usize,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Posterior probabilities for explicit evidence
    Query {
        /// Evidence as Variable=state (repeatable)
        #[arg(short, long = "evidence", value_parser = parse_evidence)]
        evidence: Vec<(String, String)>,

        /// Disease to report (repeatable; all diseases when omitted)
        #[arg(short, long = "disease")]
        diseases: Vec<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Describe the loaded network
    Network {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List recognized symptom names
    Symptoms,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    triage_core::init_tracing(cli.json_logs, level);

    let config = load_config(cli.config.as_deref(), cli.strategy)?;
    let service = build_service(&config).await?;

    let result = match cli.command {
        Commands::Diagnose {
            symptoms,
            age,
            location,
            top,
            json,
        } => {
            let demographics = Demographics::from_options(age, location);
            cmd_diagnose(&service, &symptoms, demographics, top, json).await
        }
        Commands::Query {
            evidence,
            diseases,
            json,
        } => cmd_query(&service, evidence, &diseases, json),
        Commands::Network { json } => cmd_network(&service, json),
        Commands::Symptoms => cmd_symptoms(&service),
    };

    METRICS.flush();
    result
}

/// Built-in parameters, or the file at `path`, with an optional strategy override.
fn load_config(path: Option<&Path>, strategy: Option<CptStrategy>) -> Result<NetworkConfig> {
    let config = match path {
        Some(path) => NetworkConfig::from_path(path)
            .with_context(|| format!("Failed to load network config from {}", path.display()))?,
        None => NetworkConfig::standard(),
    };
    Ok(match strategy {
        Some(strategy) => config.with_strategy(strategy),
        None => config,
    })
}

async fn build_service(config: &NetworkConfig) -> Result<DiagnosisService> {
    let store = Arc::new(MemoryRelationshipStore::standard());
    debug!(edges = store.len(), "relationship store loaded");
    DiagnosisService::from_config(config, store)
        .await
        .context("Failed to build diagnosis network")
}

/// Rank diseases for a comma-separated symptom list
async fn cmd_diagnose(
    service: &DiagnosisService,
    symptoms: &str,
    demographics: Demographics,
    top: usize,
    json: bool,
) -> Result<()> {
    let symptoms = SymptomVocabulary::parse_list(symptoms);
    if symptoms.is_empty() {
        warn!("diagnose called with an empty symptom list");
        print!("{}", NO_VALID_SYMPTOMS);
        return Ok(());
    }

    let report = service
        .diagnose(DiagnosisRequest::new(symptoms).with_demographics(demographics))
        .await
        .context("Diagnosis failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report, top));
    }
    Ok(())
}

const NO_VALID_SYMPTOMS: &str =
    "No valid symptoms provided; pass e.g. --symptoms \"Fever, Cough\"\n";

fn render_report(report: &DiagnosisReport, top: usize) -> String {
    let mut out = String::new();
    if !report.ignored_symptoms.is_empty() {
        out.push_str(&format!(
            "Ignored unrecognized symptoms: {}\n",
            report.ignored_symptoms.join(", ")
        ));
    }
    if report.symptoms.is_empty() {
        out.push_str(NO_VALID_SYMPTOMS);
        return out;
    }
    if report.is_empty() {
        out.push_str("No matching diseases found for the given symptoms.\n");
        return out;
    }

    out.push_str(&format!(
        "Symptoms: {}  (age: {}, location: {})\n\n",
        report.symptoms.join(", "),
        report.demographics.age_group,
        report.demographics.location,
    ));
    for (rank, result) in report.top(top).iter().enumerate() {
        let key: Vec<&str> = report
            .matched_symptoms(&result.disease)
            .iter()
            .take(3)
            .map(String::as_str)
            .collect();
        out.push_str(&format!(
            "{:>2}. {:<14} {:>6.2}%  {}  key symptoms: {}\n",
            rank + 1,
            result.disease,
            result.posterior * 100.0,
            severity_stars(result.severity_score),
            key.join(", "),
        ));
    }
    out
}

/// Severity score as a five-slot star bar.
fn severity_stars(score: u32) -> String {
    let filled = score.min(5) as usize;
    format!("{}{}", "*".repeat(filled), ".".repeat(5 - filled))
}

#[derive(Serialize)]
struct QueryOutput {
    evidence: BTreeMap<String, String>,
    posteriors: BTreeMap<String, f64>,
}

/// Print raw posteriors for explicit evidence
fn cmd_query(
    service: &DiagnosisService,
    evidence: Vec<(String, String)>,
    diseases: &[String],
    json: bool,
) -> Result<()> {
    let assignment: EvidenceAssignment = evidence.iter().cloned().collect();
    let posteriors = service
        .posteriors(diseases, &assignment)
        .context("Query failed")?;

    if json {
        let output = QueryOutput {
            evidence: evidence.into_iter().collect(),
            posteriors,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let mut ranked: Vec<(&String, &f64)> = posteriors.iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (disease, p) in ranked {
        println!("{:<14} {:.4}", disease, p);
    }
    Ok(())
}

/// Describe the loaded network
fn cmd_network(service: &DiagnosisService, json: bool) -> Result<()> {
    let summary = service.network().summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Fingerprint:  {}", summary.fingerprint);
    println!("Storage:      {}", summary.storage);
    println!("Combinations: {}", summary.combinations);
    println!("\nEvidence:");
    for variable in &summary.evidence {
        println!(
            "  {:<10} {} states [{}]",
            variable.name,
            variable.states.len(),
            variable.states.join(", ")
        );
    }
    println!("\nDiseases ({}):", summary.diseases.len());
    println!("  {}", summary.diseases.join(", "));
    Ok(())
}

/// List recognized symptom names
fn cmd_symptoms(service: &DiagnosisService) -> Result<()> {
    for symptom in service.vocabulary().known() {
        println!("{}", symptom);
    }
    Ok(())
}

/// Parse `Variable=state` evidence.
fn parse_evidence(s: &str) -> std::result::Result<(String, String), String> {
    let (variable, state) = s
        .split_once('=')
        .ok_or_else(|| format!("expected Variable=state, got '{s}'"))?;
    let (variable, state) = (variable.trim(), state.trim());
    if variable.is_empty() || state.is_empty() {
        return Err(format!("expected Variable=state, got '{s}'"));
    }
    Ok((variable.to_string(), state.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_evidence() {
        assert_eq!(
            parse_evidence("Fever=yes").unwrap(),
            ("Fever".to_string(), "yes".to_string())
        );
        assert_eq!(
            parse_evidence(" AgeGroup = child ").unwrap(),
            ("AgeGroup".to_string(), "child".to_string())
        );
        assert!(parse_evidence("Fever").is_err());
        assert!(parse_evidence("=yes").is_err());
        assert!(parse_evidence("Fever=").is_err());
    }

    #[test]
    fn test_severity_stars() {
        assert_eq!(severity_stars(0), ".....");
        assert_eq!(severity_stars(3), "***..");
        assert_eq!(severity_stars(9), "*****");
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from([
            "triage",
            "diagnose",
            "--symptoms",
            "Fever, Cough",
            "--age",
            "child",
            "--strategy",
            "factored",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.strategy, Some(CptStrategy::Factored));
        match cli.command {
            Commands::Diagnose { age, top, .. } => {
                assert_eq!(age, Some(AgeGroup::Child));
                assert_eq!(top, 5);
            }
            _ => panic!("expected diagnose"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_location() {
        assert!(Cli::try_parse_from([
            "triage",
            "diagnose",
            "--symptoms",
            "Fever",
            "--location",
            "arctic",
        ])
        .is_err());
    }

    #[test]
    fn test_load_config_applies_strategy_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&NetworkConfig::standard()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = load_config(Some(file.path()), Some(CptStrategy::Factored)).unwrap();
        assert_eq!(config.strategy, CptStrategy::Factored);

        let err = load_config(Some(Path::new("/nonexistent/triage.json")), None).unwrap_err();
        assert!(err.to_string().contains("Failed to load network config"));
    }

    #[tokio::test]
    async fn test_render_report_shows_top_results() {
        let service = build_service(&NetworkConfig::standard()).await.unwrap();
        let report = service
            .diagnose(DiagnosisRequest::new(["Fever", "Cough", "Zxyzzy"]))
            .await
            .unwrap();

        let text = render_report(&report, 3);
        assert!(text.contains("Ignored unrecognized symptoms: Zxyzzy"));
        assert!(text.contains(" 1. Pneumonia"));
        assert!(text.contains("key symptoms: Fever, Cough"));
        assert!(!text.contains(" 4. "));
    }

    #[tokio::test]
    async fn test_render_report_without_matches() {
        let service = build_service(&NetworkConfig::standard()).await.unwrap();

        let report = service
            .diagnose(DiagnosisRequest::new(["Zxyzzy"]))
            .await
            .unwrap();
        let text = render_report(&report, 5);
        assert!(text.contains("Ignored unrecognized symptoms: Zxyzzy"));
        assert!(text.contains("No valid symptoms provided"));
        assert!(!text.contains("No matching diseases found"));

        let report = service
            .diagnose(DiagnosisRequest::new(["Sneezing"]))
            .await
            .unwrap();
        assert!(!report.symptoms.is_empty());
        let text = render_report(&report, 5);
        assert!(!text.contains("No valid symptoms provided"));
    }

    #[tokio::test]
    async fn test_cmd_diagnose_blank_symptoms_is_not_an_error() {
        let service = build_service(&NetworkConfig::standard()).await.unwrap();
        let result = cmd_diagnose(&service, " , ", Demographics::default(), 5, false).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_cmd_query_rejects_illegal_state() {
        let service = build_service(&NetworkConfig::standard()).await.unwrap();
        let evidence = vec![("Fever".to_string(), "maybe".to_string())];
        let err = cmd_query(&service, evidence, &[], false).unwrap_err();
        assert!(err.to_string().contains("Query failed"));
    }
}

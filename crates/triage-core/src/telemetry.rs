//! Tracing initialisation for triage binaries.
//!
//! Call [`init_tracing`] once at program start. Later calls are ignored since
//! the global subscriber can only be set once per process.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "TRIAGE_LOG";

const TRIAGE_TARGETS: [&str; 3] = ["triage_core", "triage_store", "triage_cli"];

/// Filter used when neither [`LOG_ENV`] nor `RUST_LOG` is set: the triage
/// crates log at `level`, everything else at `warn`.
pub fn default_directive(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    let mut directive = String::from("warn");
    for target in TRIAGE_TARGETS {
        directive.push_str(&format!(",{target}={level}"));
    }
    directive
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)))
}

/// Initialise the global tracing subscriber.
///
/// * `json`: emit newline-delimited JSON instead of human-readable lines.
/// * `level`: verbosity of the triage crates when no filter variable is set.
///
/// Logs go to stderr so diagnosis output on stdout stays machine-readable.
pub fn init_tracing(json: bool, level: Level) {
    let registry = tracing_subscriber::registry().with(env_filter(level));
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    if json {
        registry.with(layer.json()).try_init().ok();
    } else {
        registry.with(layer).try_init().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_scopes_triage_crates() {
        assert_eq!(
            default_directive(Level::DEBUG),
            "warn,triage_core=debug,triage_store=debug,triage_cli=debug"
        );
        let directive = default_directive(Level::WARN);
        assert!(directive.contains("triage_store=warn"));
        assert!(directive.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn test_repeated_init_is_ignored() {
        init_tracing(false, Level::WARN);
        init_tracing(true, Level::DEBUG);
        tracing::debug!("after init");
    }
}

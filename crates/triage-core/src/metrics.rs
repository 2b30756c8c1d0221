//! Process-wide atomic counters for triage activity.
//!
//! Counters are bumped at the call site. [`Metrics::flush`] reports all of
//! them as one `info!` event, typically at the end of a CLI command.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    networks_built: AtomicU64,
    inference_queries: AtomicU64,
    lookup_misses: AtomicU64,
    diagnoses_completed: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            networks_built: AtomicU64::new(0),
            inference_queries: AtomicU64::new(0),
            lookup_misses: AtomicU64::new(0),
            diagnoses_completed: AtomicU64::new(0),
        }
    }

    pub fn inc_networks_built(&self) {
        self.networks_built.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "networks_built", "counter incremented");
    }

    /// One per evidence enumeration, regardless of how many targets it served.
    pub fn inc_inference_queries(&self) {
        self.inference_queries.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "inference_queries", "counter incremented");
    }

    pub fn inc_lookup_misses(&self) {
        self.lookup_misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "lookup_misses", "counter incremented");
    }

    pub fn inc_diagnoses_completed(&self) {
        self.diagnoses_completed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "diagnoses_completed", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            networks_built = self.networks_built(),
            inference_queries = self.inference_queries(),
            lookup_misses = self.lookup_misses(),
            diagnoses_completed = self.diagnoses_completed(),
        );
    }

    pub fn networks_built(&self) -> u64 {
        self.networks_built.load(Ordering::Relaxed)
    }

    pub fn inference_queries(&self) -> u64 {
        self.inference_queries.load(Ordering::Relaxed)
    }

    pub fn lookup_misses(&self) -> u64 {
        self.lookup_misses.load(Ordering::Relaxed)
    }

    pub fn diagnoses_completed(&self) -> u64 {
        self.diagnoses_completed.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.networks_built.store(0, Ordering::Relaxed);
        self.inference_queries.store(0, Ordering::Relaxed);
        self.lookup_misses.store(0, Ordering::Relaxed);
        self.diagnoses_completed.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment_independently() {
        let m = Metrics::new();
        m.inc_networks_built();
        m.inc_inference_queries();
        m.inc_inference_queries();
        m.inc_lookup_misses();
        assert_eq!(m.networks_built(), 1);
        assert_eq!(m.inference_queries(), 2);
        assert_eq!(m.lookup_misses(), 1);
        assert_eq!(m.diagnoses_completed(), 0);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_networks_built();
        m.inc_diagnoses_completed();
        m.reset();
        assert_eq!(m.networks_built(), 0);
        assert_eq!(m.diagnoses_completed(), 0);
    }
}

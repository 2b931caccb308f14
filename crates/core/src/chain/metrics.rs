use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::{error::DeriveError, filters::Outcome};

pub struct StageMetrics {
    pub enriched_total: AtomicU64,
    pub unchanged_total: AtomicU64,
    pub failed_total: AtomicU64,
}

impl StageMetrics {
    pub fn new() -> Self {
        Self {
            enriched_total: AtomicU64::new(0),
            unchanged_total: AtomicU64::new(0),
            failed_total: AtomicU64::new(0),
        }
    }

    pub fn record(&self, outcome: &Outcome) {
        let counter = if outcome.is_enriched() {
            &self.enriched_total
        } else if outcome.error().is_some_and(DeriveError::is_failure) {
            &self.failed_total
        } else {
            &self.unchanged_total
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, stage: &'static str) -> StageStats {
        StageStats {
            stage,
            enriched: self.enriched_total.load(Ordering::Relaxed),
            unchanged: self.unchanged_total.load(Ordering::Relaxed),
            failed: self.failed_total.load(Ordering::Relaxed),
        }
    }
}

impl Default for StageMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageStats {
    pub stage: &'static str,
    pub enriched: u64,
    pub unchanged: u64,
    pub failed: u64,
}

impl StageStats {
    pub fn total(&self) -> u64 {
        self.enriched + self.unchanged + self.failed
    }
}

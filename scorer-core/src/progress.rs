//! Per-scorer progress derived from the measurement log

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::catalog::CatalogSnapshot;
use crate::error::Result;
use crate::store::ScoreStore;

/// How far one scorer has worked through the catalog
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProgressReport {
    pub total: usize,
    pub scored: usize,
    pub remaining: usize,
}

/// Derives completion state from the append-only log. There is no
/// separate status flag anywhere; scoring an image means a row for it
/// exists in the scorer's log.
pub struct ProgressTracker {
    store: Arc<dyn ScoreStore>,
}

impl ProgressTracker {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self { store }
    }

    /// Distinct image codes the scorer has recorded measurements for
    pub fn completed(&self, scorer_id: &str) -> Result<BTreeSet<String>> {
        self.store.completed(scorer_id)
    }

    /// Progress against one catalog read. `remaining` saturates at zero
    /// in case the log mentions codes a regenerated catalog no longer
    /// contains.
    pub fn report(&self, scorer_id: &str, catalog: &CatalogSnapshot) -> Result<ProgressReport> {
        let scored = self.completed(scorer_id)?.len();
        let total = catalog.len();
        Ok(ProgressReport {
            total,
            scored,
            remaining: total.saturating_sub(scored),
        })
    }
}

//! Scoring workflow facade
//!
//! Single entry point the transport layer talks to. Every operation takes
//! the scorer identity explicitly; nothing about the current scorer is
//! held as ambient state. Assignment and submission for one scorer run
//! under a per-scorer lock so a read-then-append pair cannot interleave
//! with another request from the same scorer.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::assignment::{self, NextAssignment};
use crate::calibration::Calibration;
use crate::catalog::ImageCatalog;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::progress::{ProgressReport, ProgressTracker};
use crate::report::{AdminStatus, AggregationReporter};
use crate::store::{CsvScoreStore, MeasurementPair, ScoreStore};

/// Acknowledgement of a recorded submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReceipt {
    pub image_code: String,
    pub recorded: usize,
}

pub struct ScoringService {
    catalog: ImageCatalog,
    store: Arc<dyn ScoreStore>,
    progress: ProgressTracker,
    reporter: AggregationReporter,
    scorer_locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl ScoringService {
    pub fn new(catalog: ImageCatalog, store: Arc<dyn ScoreStore>) -> Self {
        Self {
            catalog,
            progress: ProgressTracker::new(store.clone()),
            reporter: AggregationReporter::new(store.clone()),
            store,
            scorer_locks: RwLock::new(HashMap::new()),
        }
    }

    /// Standard wiring: CSV logs under the configured data root, default
    /// calibration for the alignment pipeline's output dimensions.
    pub fn from_config(config: &Config) -> Self {
        let store = Arc::new(CsvScoreStore::new(
            config.scorer_data_dir(),
            Calibration::default(),
        ));
        Self::new(ImageCatalog::new(config.manifest_path()), store)
    }

    /// Next unscored image for this scorer, or `Done` when the catalog is
    /// exhausted. The catalog is re-read on every call.
    pub async fn next_assignment(&self, scorer_id: &str) -> Result<NextAssignment> {
        let scorer_id = require_identity(scorer_id)?;
        let lock = self.scorer_lock(scorer_id).await;
        let _guard = lock.lock().await;

        let catalog = self.catalog.load()?;
        let completed = self.progress.completed(scorer_id)?;
        let next = assignment::next_image(&catalog, &completed);
        debug!(scorer_id = %scorer_id, ?next, "Resolved next assignment");
        Ok(next)
    }

    /// Record a batch of measurements for one image
    pub async fn submit(
        &self,
        scorer_id: &str,
        image_code: &str,
        pairs: &[MeasurementPair],
    ) -> Result<SubmitReceipt> {
        let scorer_id = require_identity(scorer_id)?;
        let lock = self.scorer_lock(scorer_id).await;
        let _guard = lock.lock().await;

        let recorded = self.store.append(scorer_id, image_code, pairs)?;
        Ok(SubmitReceipt {
            image_code: image_code.to_string(),
            recorded,
        })
    }

    /// This scorer's progress through the current catalog
    pub async fn progress(&self, scorer_id: &str) -> Result<ProgressReport> {
        let scorer_id = require_identity(scorer_id)?;
        let lock = self.scorer_lock(scorer_id).await;
        let _guard = lock.lock().await;

        let catalog = self.catalog.load()?;
        self.progress.report(scorer_id, &catalog)
    }

    /// Completion statistics across every scorer found in storage
    pub fn admin_status(&self) -> Result<AdminStatus> {
        let catalog = self.catalog.load()?;
        self.reporter.status(&catalog)
    }

    /// Archive of every scorer's log plus the manifest
    pub fn export_archive(&self) -> Result<Vec<u8>> {
        let manifest = self.catalog.raw_manifest()?;
        self.reporter.export_archive(&manifest)
    }

    /// One lock per scorer identity, created on first use
    async fn scorer_lock(&self, scorer_id: &str) -> Arc<Mutex<()>> {
        {
            let locks = self.scorer_locks.read().await;
            if let Some(lock) = locks.get(scorer_id) {
                return lock.clone();
            }
        }
        let mut locks = self.scorer_locks.write().await;
        locks
            .entry(scorer_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Reject blank identities before they reach storage
fn require_identity(scorer_id: &str) -> Result<&str> {
    let trimmed = scorer_id.trim();
    if trimmed.is_empty() {
        return Err(Error::MissingIdentity);
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Point;

    fn service(dir: &tempfile::TempDir) -> ScoringService {
        let config = Config::new(dir.path());
        std::fs::create_dir_all(config.aligned_dir()).unwrap();
        ScoringService::from_config(&config)
    }

    fn write_manifest(dir: &tempfile::TempDir, json: &str) {
        let config = Config::new(dir.path());
        std::fs::write(config.manifest_path(), json).unwrap();
    }

    fn pair(id: &str, p1: (f64, f64), p2: (f64, f64)) -> MeasurementPair {
        MeasurementPair {
            measurement_id: id.to_string(),
            point1: Point::new(p1.0, p1.1),
            point2: Point::new(p2.0, p2.1),
        }
    }

    #[tokio::test]
    async fn test_blank_identity_rejected_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        for id in ["", "   ", "\t"] {
            assert!(matches!(
                svc.next_assignment(id).await,
                Err(Error::MissingIdentity)
            ));
            assert!(matches!(
                svc.submit(id, "A001", &[pair("m1", (0.0, 0.0), (1.0, 1.0))]).await,
                Err(Error::MissingIdentity)
            ));
            assert!(matches!(svc.progress(id).await, Err(Error::MissingIdentity)));
        }
    }

    #[tokio::test]
    async fn test_identity_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        write_manifest(&dir, r#"{"A001": {"system": "Screen"}}"#);

        svc.submit("  alice ", "A001", &[pair("m1", (0.0, 0.0), (1.0, 1.0))])
            .await
            .unwrap();
        let progress = svc.progress("alice").await.unwrap();
        assert_eq!(progress.scored, 1);
    }

    #[tokio::test]
    async fn test_workflow_assign_submit_advance() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        write_manifest(
            &dir,
            r#"{"A001": {"system": "2D/AR"}, "A002": {"system": "Screen"}}"#,
        );

        match svc.next_assignment("s1").await.unwrap() {
            NextAssignment::Image { image_code, .. } => assert_eq!(image_code, "A001"),
            other => panic!("expected an image, got {:?}", other),
        }

        let receipt = svc
            .submit("s1", "A001", &[pair("m1", (0.0, 0.0), (3.0, 4.0))])
            .await
            .unwrap();
        assert_eq!(receipt.recorded, 1);

        match svc.next_assignment("s1").await.unwrap() {
            NextAssignment::Image { image_code, progress_done, .. } => {
                assert_eq!(image_code, "A002");
                assert_eq!(progress_done, 1);
            }
            other => panic!("expected an image, got {:?}", other),
        }

        svc.submit("s1", "A002", &[pair("m1", (100.0, 100.0), (103.0, 104.0))])
            .await
            .unwrap();
        assert_eq!(
            svc.next_assignment("s1").await.unwrap(),
            NextAssignment::Done { total: 2 }
        );

        let progress = svc.progress("s1").await.unwrap();
        assert_eq!(progress.scored, 2);
        assert_eq!(progress.remaining, 0);
    }

    #[tokio::test]
    async fn test_out_of_order_completion_backfills() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        write_manifest(
            &dir,
            r#"{"A001": {"system": "2D/AR"}, "A002": {"system": "Screen"}}"#,
        );

        // Scoring the later image first leaves the earlier one assigned
        svc.submit("s1", "A002", &[pair("m1", (100.0, 100.0), (103.0, 104.0))])
            .await
            .unwrap();
        match svc.next_assignment("s1").await.unwrap() {
            NextAssignment::Image { image_code, .. } => assert_eq!(image_code, "A001"),
            other => panic!("expected an image, got {:?}", other),
        }

        svc.submit("s1", "A001", &[pair("m1", (0.0, 0.0), (1.0, 1.0))])
            .await
            .unwrap();
        assert_eq!(
            svc.next_assignment("s1").await.unwrap(),
            NextAssignment::Done { total: 2 }
        );
    }

    #[tokio::test]
    async fn test_scorers_progress_independently() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        write_manifest(
            &dir,
            r#"{"A001": {"system": "Screen"}, "A002": {"system": "Screen"}}"#,
        );

        svc.submit("s1", "A001", &[pair("m1", (0.0, 0.0), (1.0, 1.0))])
            .await
            .unwrap();

        match svc.next_assignment("s2").await.unwrap() {
            NextAssignment::Image { image_code, .. } => assert_eq!(image_code, "A001"),
            other => panic!("expected an image, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_concurrent_submissions_serialize_per_scorer() {
        let dir = tempfile::tempdir().unwrap();
        let svc = Arc::new(service(&dir));
        write_manifest(
            &dir,
            r#"{"A001": {"system": "Screen"}, "A002": {"system": "Screen"}}"#,
        );

        let a = {
            let svc = svc.clone();
            tokio::spawn(async move {
                svc.submit("s1", "A001", &[pair("m1", (0.0, 0.0), (1.0, 1.0))])
                    .await
            })
        };
        let b = {
            let svc = svc.clone();
            tokio::spawn(async move {
                svc.submit("s1", "A002", &[pair("m1", (0.0, 0.0), (1.0, 1.0))])
                    .await
            })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let log = std::fs::read_to_string(
            Config::new(dir.path())
                .scorer_data_dir()
                .join("s1")
                .join(crate::store::LOG_FILE_NAME),
        )
        .unwrap();
        assert_eq!(log.matches(crate::store::LOG_HEADER).count(), 1);
        assert_eq!(log.lines().count(), 3);
        assert_eq!(svc.progress("s1").await.unwrap().scored, 2);
    }

    #[tokio::test]
    async fn test_admin_views_span_all_scorers() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        write_manifest(
            &dir,
            r#"{"A001": {"system": "Screen"}, "A002": {"system": "Screen"}}"#,
        );

        assert!(matches!(svc.export_archive(), Err(Error::NoData)));

        svc.submit("s1", "A001", &[pair("m1", (0.0, 0.0), (1.0, 1.0))])
            .await
            .unwrap();

        let status = svc.admin_status().unwrap();
        assert_eq!(status.total_images, 2);
        assert_eq!(status.scorers.len(), 1);
        assert_eq!(status.scorers[0].percent, 50);

        let archive = svc.export_archive().unwrap();
        assert!(!archive.is_empty());
    }
}

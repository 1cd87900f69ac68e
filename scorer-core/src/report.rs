//! Cross-scorer aggregation and bulk export
//!
//! Read-only over the measurement store. Status enumerates every scorer
//! namespace on disk; export bundles all logs plus the catalog manifest
//! so downstream analysis can re-identify which image each row refers to.

use std::io::Write;
use std::sync::Arc;

use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use tracing::info;

use crate::catalog::CatalogSnapshot;
use crate::error::{Error, Result};
use crate::store::{ScoreStore, LOG_FILE_NAME};

/// Manifest file name inside the export archive
pub const MANIFEST_ARCHIVE_NAME: &str = "manifest.json";

/// Completion statistics for one scorer
#[derive(Debug, Clone, Serialize)]
pub struct ScorerStatus {
    pub scorer_id: String,
    pub scored: usize,
    pub total: usize,
    pub percent: u32,
}

/// Study-wide view across all scorers
#[derive(Debug, Clone, Serialize)]
pub struct AdminStatus {
    pub total_images: usize,
    pub scorers: Vec<ScorerStatus>,
}

pub struct AggregationReporter {
    store: Arc<dyn ScoreStore>,
}

impl AggregationReporter {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self { store }
    }

    /// Per-scorer completion against one catalog read
    pub fn status(&self, catalog: &CatalogSnapshot) -> Result<AdminStatus> {
        let total = catalog.len();
        let mut scorers = Vec::new();
        for scorer_id in self.store.scorer_ids()? {
            let scored = self.store.completed(&scorer_id)?.len();
            scorers.push(ScorerStatus {
                scorer_id,
                scored,
                total,
                percent: percent_complete(scored, total),
            });
        }
        Ok(AdminStatus {
            total_images: total,
            scorers,
        })
    }

    /// Bundle every scorer's log plus the manifest into a gzipped tar
    /// archive. Fails with `NoData` when no scorer has recorded anything.
    pub fn export_archive(&self, manifest: &[u8]) -> Result<Vec<u8>> {
        let scorer_ids = self.store.scorer_ids()?;
        if scorer_ids.is_empty() {
            return Err(Error::NoData);
        }

        let mtime = Utc::now().timestamp().max(0) as u64;
        let mut builder = tar::Builder::new(Vec::new());
        for scorer_id in &scorer_ids {
            if let Some(log) = self.store.raw_log(scorer_id)? {
                let path = format!("{}/{}", scorer_id, LOG_FILE_NAME);
                append_archive_file(&mut builder, &path, &log, mtime)?;
            }
        }
        append_archive_file(&mut builder, MANIFEST_ARCHIVE_NAME, manifest, mtime)?;
        let tar_bytes = builder.into_inner()?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&tar_bytes)?;
        let archive = encoder.finish()?;

        info!(
            scorers = scorer_ids.len(),
            bytes = archive.len(),
            "Exported score archive"
        );
        Ok(archive)
    }
}

fn percent_complete(scored: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((scored as f64 / total as f64) * 100.0).round() as u32
}

fn append_archive_file(
    builder: &mut tar::Builder<Vec<u8>>,
    path: &str,
    bytes: &[u8],
    mtime: u64,
) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(mtime);
    header.set_cksum();
    builder.append_data(&mut header, path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Calibration;
    use crate::catalog::ImageCatalog;
    use crate::distance::Point;
    use crate::store::{CsvScoreStore, MeasurementPair};
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn pair(id: &str) -> MeasurementPair {
        MeasurementPair {
            measurement_id: id.to_string(),
            point1: Point::new(0.0, 0.0),
            point2: Point::new(3.0, 4.0),
        }
    }

    fn snapshot(json: &str) -> CatalogSnapshot {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, json).unwrap();
        ImageCatalog::new(path).load().unwrap()
    }

    #[test]
    fn test_percent_rounds_to_nearest() {
        assert_eq!(percent_complete(1, 3), 33);
        assert_eq!(percent_complete(2, 3), 67);
        assert_eq!(percent_complete(1, 2), 50);
        assert_eq!(percent_complete(3, 3), 100);
    }

    #[test]
    fn test_percent_zero_when_catalog_empty() {
        assert_eq!(percent_complete(0, 0), 0);
        assert_eq!(percent_complete(5, 0), 0);
    }

    #[test]
    fn test_status_enumerates_scorers_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CsvScoreStore::new(dir.path(), Calibration::default()));
        store.append("carol", "A001", &[pair("m1")]).unwrap();
        store.append("alice", "A001", &[pair("m1")]).unwrap();
        store.append("alice", "A002", &[pair("m1")]).unwrap();

        let reporter = AggregationReporter::new(store);
        let status = reporter
            .status(&snapshot(
                r#"{"A001": {"system": "Screen"}, "A002": {"system": "Screen"}}"#,
            ))
            .unwrap();

        assert_eq!(status.total_images, 2);
        assert_eq!(status.scorers.len(), 2);
        assert_eq!(status.scorers[0].scorer_id, "alice");
        assert_eq!(status.scorers[0].scored, 2);
        assert_eq!(status.scorers[0].percent, 100);
        assert_eq!(status.scorers[1].scorer_id, "carol");
        assert_eq!(status.scorers[1].scored, 1);
        assert_eq!(status.scorers[1].percent, 50);
    }

    #[test]
    fn test_status_with_no_scorers_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CsvScoreStore::new(dir.path(), Calibration::default()));
        let status = AggregationReporter::new(store)
            .status(&snapshot("{}"))
            .unwrap();
        assert_eq!(status.total_images, 0);
        assert!(status.scorers.is_empty());
    }

    #[test]
    fn test_export_requires_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CsvScoreStore::new(dir.path(), Calibration::default()));
        let result = AggregationReporter::new(store).export_archive(b"{}");
        assert!(matches!(result, Err(Error::NoData)));
    }

    #[test]
    fn test_export_bundles_logs_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CsvScoreStore::new(dir.path(), Calibration::default()));
        store.append("alice", "A001", &[pair("m1")]).unwrap();
        store.append("bob", "A002", &[pair("m1")]).unwrap();
        let alice_log = store.raw_log("alice").unwrap().unwrap();

        let manifest = br#"{"A001": {"system": "Screen"}}"#;
        let archive = AggregationReporter::new(store)
            .export_archive(manifest)
            .unwrap();

        let mut tar_bytes = Vec::new();
        GzDecoder::new(archive.as_slice())
            .read_to_end(&mut tar_bytes)
            .unwrap();

        let mut entries = std::collections::HashMap::new();
        let mut tar = tar::Archive::new(tar_bytes.as_slice());
        for entry in tar.entries().unwrap() {
            let mut entry = entry.unwrap();
            let path = entry.path().unwrap().to_string_lossy().to_string();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            entries.insert(path, content);
        }

        assert_eq!(entries.len(), 3);
        assert_eq!(entries["alice/scores.csv"], alice_log);
        assert!(entries.contains_key("bob/scores.csv"));
        assert_eq!(entries["manifest.json"], manifest);
    }
}

//! Durable append-only measurement logs, one per scorer
//!
//! Each scorer owns a directory under the store root containing a single
//! growing CSV log. The log is the source of truth for that scorer's
//! progress: an image counts as completed when its code appears in at
//! least one row. Rows are never updated or deleted.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use tracing::info;

use crate::calibration::Calibration;
use crate::distance::{self, Point};
use crate::error::{Error, Result};

/// Log file name inside each scorer's directory
pub const LOG_FILE_NAME: &str = "scores.csv";

/// Fixed header, written exactly once when a log is created
pub const LOG_HEADER: &str =
    "image_code,measurement_id,point1_x,point1_y,point2_x,point2_y,distance_px,distance_mm,timestamp";

/// One submitted point pair: the participant's mark and the reference
/// target it should have landed on, in aligned-image pixel coordinates.
#[derive(Debug, Clone, Deserialize)]
pub struct MeasurementPair {
    pub measurement_id: String,
    pub point1: Point,
    pub point2: Point,
}

/// Append-only measurement storage keyed by scorer identity.
///
/// Implementations must guarantee that `append` either writes the whole
/// batch durably or writes nothing.
pub trait ScoreStore: Send + Sync {
    /// Record a batch of measurements for one image. Returns the number
    /// of rows written.
    fn append(&self, scorer_id: &str, image_code: &str, pairs: &[MeasurementPair])
        -> Result<usize>;

    /// Distinct image codes appearing in the scorer's log. No log means
    /// an empty set.
    fn completed(&self, scorer_id: &str) -> Result<BTreeSet<String>>;

    /// Scorers that have written at least one log, sorted by identity
    fn scorer_ids(&self) -> Result<Vec<String>>;

    /// Raw log bytes for one scorer, or `None` if nothing was recorded
    fn raw_log(&self, scorer_id: &str) -> Result<Option<Vec<u8>>>;
}

/// Flat-file store: `<root>/<scorer_id>/scores.csv`
pub struct CsvScoreStore {
    root: PathBuf,
    calibration: Calibration,
}

impl CsvScoreStore {
    pub fn new(root: impl Into<PathBuf>, calibration: Calibration) -> Self {
        Self {
            root: root.into(),
            calibration,
        }
    }

    /// Validate the identity and resolve the scorer's directory. The
    /// identity becomes a path component, so anything that could escape
    /// the store root is rejected.
    fn scorer_dir(&self, scorer_id: &str) -> Result<PathBuf> {
        if scorer_id.is_empty() {
            return Err(Error::MissingIdentity);
        }
        if scorer_id == "." || scorer_id == ".." || scorer_id.contains(['/', '\\']) {
            return Err(Error::InvalidInput(format!(
                "invalid scorer identity: {}",
                scorer_id
            )));
        }
        Ok(self.root.join(scorer_id))
    }

    fn log_path(&self, scorer_id: &str) -> Result<PathBuf> {
        Ok(self.scorer_dir(scorer_id)?.join(LOG_FILE_NAME))
    }
}

/// CSV fields are read back by splitting on commas, so the delimiter and
/// line breaks must not appear inside a field.
fn validate_field(name: &str, value: &str) -> Result<()> {
    if value.contains([',', '"', '\n', '\r']) {
        return Err(Error::InvalidInput(format!(
            "{} contains a reserved character: {}",
            name, value
        )));
    }
    Ok(())
}

impl ScoreStore for CsvScoreStore {
    fn append(&self, scorer_id: &str, image_code: &str, pairs: &[MeasurementPair]) -> Result<usize> {
        let path = self.log_path(scorer_id)?;

        if image_code.is_empty() {
            return Err(Error::InvalidInput("missing image code".to_string()));
        }
        if pairs.is_empty() {
            return Err(Error::InvalidInput("no measurements supplied".to_string()));
        }

        // Validate the whole batch before touching the log so a bad row
        // cannot leave a partial write behind.
        validate_field("image code", image_code)?;
        for pair in pairs {
            validate_field("measurement id", &pair.measurement_id)?;
        }

        let is_new = !path.exists();
        let mut buffer = String::new();
        if is_new {
            buffer.push_str(LOG_HEADER);
            buffer.push('\n');
        }

        for pair in pairs {
            let d = distance::measure(pair.point1, pair.point2, &self.calibration);
            let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
            buffer.push_str(&format!(
                "{},{},{},{},{},{},{:.2},{:.2},{}\n",
                image_code,
                pair.measurement_id,
                pair.point1.x,
                pair.point1.y,
                pair.point2.x,
                pair.point2.y,
                d.px,
                d.mm,
                timestamp
            ));
        }

        if is_new {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        file.write_all(buffer.as_bytes())?;
        file.sync_all()?;

        info!(
            scorer_id = %scorer_id,
            image_code = %image_code,
            rows = pairs.len(),
            "Recorded measurements"
        );
        Ok(pairs.len())
    }

    fn completed(&self, scorer_id: &str) -> Result<BTreeSet<String>> {
        let path = self.log_path(scorer_id)?;
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeSet::new());
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let mut codes = BTreeSet::new();
        for line in content.lines().skip(1) {
            if line.is_empty() {
                continue;
            }
            if let Some(code) = line.split(',').next() {
                codes.insert(code.to_string());
            }
        }
        Ok(codes)
    }

    fn scorer_ids(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Io(e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.path().join(LOG_FILE_NAME).is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                ids.push(name.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn raw_log(&self, scorer_id: &str) -> Result<Option<Vec<u8>>> {
        let path = self.log_path(scorer_id)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

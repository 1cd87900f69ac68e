//! Image catalog backed by the alignment pipeline's manifest
//!
//! The manifest is a JSON object mapping image codes to per-image metadata.
//! It is re-read on every load so a pipeline re-run is picked up without
//! restarting the service.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Capture systems whose composites are scored against the AR reference
/// image. Everything else uses the screen-capture reference.
pub const AR_SYSTEMS: [&str; 2] = ["2D/AR", "AR-VIU"];

/// Per-image metadata from the manifest. Unknown manifest fields are
/// ignored; `system` defaults to empty when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(default)]
    pub system: String,
}

/// Which reference image a composite is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Ar,
    Screen,
}

impl ReferenceKind {
    /// Select the reference for a capture system name
    pub fn for_system(system: &str) -> Self {
        if AR_SYSTEMS.contains(&system) {
            Self::Ar
        } else {
            Self::Screen
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ar => "ar",
            Self::Screen => "screen",
        }
    }

    /// Parse a route segment back into a kind
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ar" => Some(Self::Ar),
            "screen" => Some(Self::Screen),
            _ => None,
        }
    }
}

/// Loader for the image catalog
#[derive(Debug, Clone)]
pub struct ImageCatalog {
    manifest_path: PathBuf,
}

impl ImageCatalog {
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
        }
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Read and parse the manifest. A missing manifest yields an empty
    /// catalog; a manifest that exists but does not parse is an error.
    pub fn load(&self) -> Result<CatalogSnapshot> {
        let content = match std::fs::read_to_string(&self.manifest_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CatalogSnapshot::default());
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let images: HashMap<String, ImageRecord> = serde_json::from_str(&content)
            .map_err(|e| Error::Manifest(format!("{}: {}", self.manifest_path.display(), e)))?;

        Ok(CatalogSnapshot { images })
    }

    /// Raw manifest bytes for inclusion in an export archive. Missing
    /// manifests export as an empty JSON object.
    pub fn raw_manifest(&self) -> Result<Vec<u8>> {
        match std::fs::read(&self.manifest_path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(b"{}".to_vec()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// One parsed manifest read
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    images: HashMap<String, ImageRecord>,
}

impl CatalogSnapshot {
    /// All image codes in ascending lexicographic order
    pub fn image_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.images.keys().cloned().collect();
        codes.sort();
        codes
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&ImageRecord> {
        self.images.get(code)
    }

    /// Reference kind for one image, if it is in the catalog
    pub fn reference_for(&self, code: &str) -> Option<ReferenceKind> {
        self.get(code).map(|r| ReferenceKind::for_system(&r.system))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_manifest(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("manifest.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_manifest_is_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ImageCatalog::new(dir.path().join("manifest.json"));
        let snapshot = catalog.load().unwrap();
        assert!(snapshot.is_empty());
        assert!(snapshot.image_codes().is_empty());
    }

    #[test]
    fn test_codes_sorted_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            r#"{"B002": {"system": "2D/AR"}, "A010": {"system": "Screen"}, "A002": {"system": "AR-VIU"}}"#,
        );
        let snapshot = ImageCatalog::new(path).load().unwrap();
        assert_eq!(snapshot.image_codes(), vec!["A002", "A010", "B002"]);
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_malformed_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), "{not valid json");
        let result = ImageCatalog::new(path).load();
        assert!(matches!(result, Err(Error::Manifest(_))));
    }

    #[test]
    fn test_unknown_fields_and_missing_system_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            r#"{"A001": {"system": "2D/AR", "source": "run-14"}, "A002": {}}"#,
        );
        let snapshot = ImageCatalog::new(path).load().unwrap();
        assert_eq!(snapshot.get("A001").unwrap().system, "2D/AR");
        assert_eq!(snapshot.get("A002").unwrap().system, "");
    }

    #[test]
    fn test_reference_kind_by_system() {
        assert_eq!(ReferenceKind::for_system("2D/AR"), ReferenceKind::Ar);
        assert_eq!(ReferenceKind::for_system("AR-VIU"), ReferenceKind::Ar);
        assert_eq!(ReferenceKind::for_system("Screen"), ReferenceKind::Screen);
        assert_eq!(ReferenceKind::for_system(""), ReferenceKind::Screen);
    }

    #[test]
    fn test_reference_kind_route_round_trip() {
        assert_eq!(ReferenceKind::parse("ar"), Some(ReferenceKind::Ar));
        assert_eq!(ReferenceKind::parse("screen"), Some(ReferenceKind::Screen));
        assert_eq!(ReferenceKind::parse("other"), None);
        assert_eq!(ReferenceKind::parse(ReferenceKind::Ar.as_str()), Some(ReferenceKind::Ar));
    }

    #[test]
    fn test_raw_manifest_defaults_to_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ImageCatalog::new(dir.path().join("manifest.json"));
        assert_eq!(catalog.raw_manifest().unwrap(), b"{}");
    }
}

//! Configuration and data-root resolution
//!
//! The data root is the directory holding the alignment pipeline's output
//! (`aligned_output/` with `manifest.json` and one PNG per image, plus the
//! two reference PNGs) and the `scorer_data/` tree this service writes.

use std::path::{Path, PathBuf};

use crate::catalog::ReferenceKind;
use crate::Result;

/// Environment variable overriding the data root
pub const DATA_ROOT_ENV: &str = "SCORER_DATA_ROOT";

/// Optional TOML config file consulted when CLI and environment are silent
pub const CONFIG_FILE: &str = "scorer.toml";

/// Resolved filesystem layout for the scoring service
#[derive(Debug, Clone)]
pub struct Config {
    pub data_root: PathBuf,
}

impl Config {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    /// Resolve the data root following the priority order:
    /// 1. Command-line argument (highest priority)
    /// 2. Environment variable
    /// 3. `scorer.toml` in the working directory (`data_root` key)
    /// 4. The working directory itself (fallback)
    pub fn resolve(cli_arg: Option<&Path>) -> Self {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return Self::new(path);
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(DATA_ROOT_ENV) {
            return Self::new(path);
        }

        // Priority 3: TOML config file
        if let Ok(content) = std::fs::read_to_string(CONFIG_FILE) {
            if let Ok(config) = toml::from_str::<toml::Value>(&content) {
                if let Some(root) = config.get("data_root").and_then(|v| v.as_str()) {
                    return Self::new(root);
                }
            }
        }

        // Priority 4: Working-directory default
        Self::new(".")
    }

    /// Directory of aligned composite images
    pub fn aligned_dir(&self) -> PathBuf {
        self.data_root.join("aligned_output")
    }

    /// Catalog manifest produced by the alignment pipeline
    pub fn manifest_path(&self) -> PathBuf {
        self.aligned_dir().join("manifest.json")
    }

    /// Root of the per-scorer measurement logs
    pub fn scorer_data_dir(&self) -> PathBuf {
        self.data_root.join("scorer_data")
    }

    /// Composite image for one catalog code
    pub fn image_path(&self, code: &str) -> PathBuf {
        self.aligned_dir().join(format!("{}.png", code))
    }

    /// Reference image for a capture-system family
    pub fn reference_path(&self, kind: ReferenceKind) -> PathBuf {
        match kind {
            ReferenceKind::Ar => self.data_root.join("reference_png.png"),
            ReferenceKind::Screen => self.data_root.join("reference_screen.png"),
        }
    }

    /// Create the scorer-data directory if missing. Called once at startup so
    /// later appends only ever create per-scorer subdirectories.
    pub fn ensure_data_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(self.scorer_data_dir())?;
        Ok(())
    }
}

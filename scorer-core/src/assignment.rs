//! Deterministic selection of the next image for a scorer
//!
//! Every scorer walks the catalog in the same lexicographic order. Two
//! calls with no intervening submission return the same image, which keeps
//! assignment reproducible and easy to audit.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::catalog::{CatalogSnapshot, ReferenceKind};

/// Outcome of an assignment request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NextAssignment {
    /// An unscored image, with the reference it is compared against
    Image {
        image_code: String,
        reference_kind: ReferenceKind,
        progress_done: usize,
        progress_total: usize,
    },
    /// Nothing left in the catalog for this scorer
    Done { total: usize },
}

/// First catalog code, in sorted order, that the scorer has not completed
pub fn next_image(catalog: &CatalogSnapshot, completed: &BTreeSet<String>) -> NextAssignment {
    for code in catalog.image_codes() {
        if completed.contains(&code) {
            continue;
        }
        let reference_kind = catalog
            .reference_for(&code)
            .unwrap_or(ReferenceKind::Screen);
        return NextAssignment::Image {
            image_code: code,
            reference_kind,
            progress_done: completed.len(),
            progress_total: catalog.len(),
        };
    }
    NextAssignment::Done {
        total: catalog.len(),
    }
}

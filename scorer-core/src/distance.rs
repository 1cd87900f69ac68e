//! Distance measurement between annotated point pairs

use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;

/// A point in aligned-image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A measured separation in both pixel and physical units
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Distances {
    pub px: f64,
    pub mm: f64,
}

/// Euclidean distance between two points, in pixels and millimeters
pub fn measure(p1: Point, p2: Point, calibration: &Calibration) -> Distances {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let px = dx.hypot(dy);
    Distances {
        px,
        mm: calibration.to_mm(px),
    }
}

//! Pixel-to-physical calibration
//!
//! Every composite image is produced by the alignment pipeline at a fixed
//! output size from a scoring box of known physical dimensions, so a single
//! scale factor converts pixel distances to millimeters for the whole study.
//! The factor averages the horizontal and vertical pixels-per-inch ratios to
//! absorb the slight anisotropy of the alignment output.

use serde::Serialize;

/// Physical width of the scoring box in inches
pub const BOX_WIDTH_IN: f64 = 5.84;
/// Physical height of the scoring box in inches
pub const BOX_HEIGHT_IN: f64 = 6.31;
/// Aligned image width in pixels
pub const IMAGE_WIDTH_PX: f64 = 1110.0;
/// Aligned image height in pixels
pub const IMAGE_HEIGHT_PX: f64 = 1215.0;

const MM_PER_INCH: f64 = 25.4;

/// Conversion factor between pixel and millimeter distances
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Calibration {
    /// Millimeters represented by one pixel of the aligned image
    pub mm_per_px: f64,
}

impl Calibration {
    /// Derive the scale factor from image and box dimensions.
    ///
    /// Uses the mean of the horizontal and vertical pixels-per-inch ratios.
    pub fn from_dimensions(
        image_width_px: f64,
        image_height_px: f64,
        box_width_in: f64,
        box_height_in: f64,
    ) -> Self {
        let px_per_inch_x = image_width_px / box_width_in;
        let px_per_inch_y = image_height_px / box_height_in;
        let px_per_inch = (px_per_inch_x + px_per_inch_y) / 2.0;
        Self {
            mm_per_px: MM_PER_INCH / px_per_inch,
        }
    }

    /// Convert a pixel distance to millimeters
    pub fn to_mm(&self, distance_px: f64) -> f64 {
        distance_px * self.mm_per_px
    }
}

impl Default for Calibration {
    /// Calibration for the standard alignment pipeline output
    fn default() -> Self {
        Self::from_dimensions(IMAGE_WIDTH_PX, IMAGE_HEIGHT_PX, BOX_WIDTH_IN, BOX_HEIGHT_IN)
    }
}

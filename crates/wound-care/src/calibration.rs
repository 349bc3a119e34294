//! Pixel-to-length calibration.

use crate::types::{WoundError, WoundResult};

/// Physical length of the reference marker used to calibrate the camera setup.
pub const REFERENCE_LENGTH_CM: f64 = 2.5;

/// Length of the reference marker in pixels at the model's working resolution.
pub const REFERENCE_LENGTH_PX: f64 = 100.0;

/// Centimetres per pixel edge. Fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationRatio(f64);

impl CalibrationRatio {
    pub fn new(cm_per_pixel: f64) -> WoundResult<Self> {
        if !cm_per_pixel.is_finite() || cm_per_pixel <= 0.0 {
            return Err(WoundError::InvalidInput(format!(
                "Calibration ratio must be a positive number, got {cm_per_pixel}"
            )));
        }
        Ok(Self(cm_per_pixel))
    }

    /// Derive the ratio from a reference object of known size.
    pub fn from_reference(length_cm: f64, length_px: f64) -> WoundResult<Self> {
        if !length_px.is_finite() || length_px <= 0.0 {
            return Err(WoundError::InvalidInput(format!(
                "Reference length in pixels must be positive, got {length_px}"
            )));
        }
        Self::new(length_cm / length_px)
    }

    pub fn cm_per_pixel(&self) -> f64 {
        self.0
    }

    /// Square centimetres covered by one pixel.
    pub fn squared(&self) -> f64 {
        self.0 * self.0
    }
}

impl Default for CalibrationRatio {
    fn default() -> Self {
        Self(REFERENCE_LENGTH_CM / REFERENCE_LENGTH_PX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ratio() {
        let ratio = CalibrationRatio::default();
        assert!((ratio.cm_per_pixel() - 0.025).abs() < 1e-12);
        assert!((ratio.squared() - 0.000625).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(CalibrationRatio::new(0.0).is_err());
        assert!(CalibrationRatio::new(-0.1).is_err());
        assert!(CalibrationRatio::new(f64::NAN).is_err());
        assert!(CalibrationRatio::from_reference(2.5, 0.0).is_err());
    }

    #[test]
    fn test_from_reference() {
        let ratio = CalibrationRatio::from_reference(8.56, 428.0).unwrap();
        assert!((ratio.cm_per_pixel() - 0.02).abs() < 1e-12);
    }
}

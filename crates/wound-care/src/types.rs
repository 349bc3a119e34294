//! Core data types for segmentation results, diagnoses, and errors.

use std::path::PathBuf;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Binary membership grid for one detected instance. Cells are 0 or 1.
pub type InstanceMask = Array2<u8>;

/// Axis-aligned box in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        if ix1 >= ix2 || iy1 >= iy2 {
            return 0.0;
        }

        let intersection = (ix2 - ix1) * (iy2 - iy1);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// A single instance predicted by the segmentation model.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Binary mask on the model's input grid, independent of the upload size.
    pub mask: InstanceMask,
    /// Box in source-image pixel coordinates.
    pub bbox: BoundingBox,
    pub confidence: f32,
}

/// Everything the segmentation model returned for one image.
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub width: u32,
    pub height: u32,
    pub detections: Vec<Detection>,
}

impl Segmentation {
    /// An empty result for an image of the given size.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            detections: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Take the per-instance masks, in detection order.
    pub fn into_masks(self) -> Vec<InstanceMask> {
        self.detections.into_iter().map(|d| d.mask).collect()
    }
}

/// Outcome of an infection screening.
///
/// Service failures are carried as [`Diagnosis::Failed`] rather than returned
/// as errors, so callers always get a value to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnosis {
    Infected,
    NotInfected,
    Undetermined,
    Failed { reason: String },
}

impl Diagnosis {
    pub fn is_failure(&self) -> bool {
        matches!(self, Diagnosis::Failed { .. })
    }
}

impl std::fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnosis::Infected => write!(f, "infected"),
            Diagnosis::NotInfected => write!(f, "not_infected"),
            Diagnosis::Undetermined => write!(f, "undetermined"),
            Diagnosis::Failed { reason } => write!(f, "Error: {reason}"),
        }
    }
}

impl Serialize for Diagnosis {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Free-text wound description, or the reason it could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description {
    Text(String),
    Failed { reason: String },
}

impl std::fmt::Display for Description {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Description::Text(text) => write!(f, "{text}"),
            Description::Failed { reason } => write!(f, "Error: {reason}"),
        }
    }
}

impl Serialize for Description {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Errors that can occur in the wound analysis library.
#[derive(thiserror::Error, Debug)]
pub enum WoundError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Segmentation error: {0}")]
    Segmentation(String),

    #[error("Diagnostic service error: {0}")]
    Diagnostic(String),

    #[error("Knowledge base not found: {}", .0.display())]
    KnowledgeBaseNotFound(PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Convenience result type.
pub type WoundResult<T> = Result<T, WoundError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnosis_wire_strings() {
        assert_eq!(Diagnosis::Infected.to_string(), "infected");
        assert_eq!(Diagnosis::NotInfected.to_string(), "not_infected");
        assert_eq!(Diagnosis::Undetermined.to_string(), "undetermined");
        let failed = Diagnosis::Failed {
            reason: "quota exceeded".to_string(),
        };
        assert_eq!(failed.to_string(), "Error: quota exceeded");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!("Error: quota exceeded")
        );
    }

    #[test]
    fn test_iou() {
        let a = BoundingBox { x1: 0.0, y1: 0.0, x2: 10.0, y2: 10.0 };
        let b = BoundingBox { x1: 5.0, y1: 0.0, x2: 15.0, y2: 10.0 };
        let c = BoundingBox { x1: 20.0, y1: 20.0, x2: 30.0, y2: 30.0 };
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
        assert!((a.iou(&b) - 50.0 / 150.0).abs() < 1e-6);
        assert_eq!(a.iou(&c), 0.0);
    }
}

//! Segmentation orchestration: model, area, annotation, and fallback diagnosis.

use std::path::Path;
use std::sync::{Arc, Mutex};

use image::RgbImage;
use serde::Serialize;

use crate::area::{compute_area, round_area};
use crate::calibration::CalibrationRatio;
use crate::capture::{image_to_base64, load_image};
use crate::diagnosis::{DiagnosticAdapter, VisionLanguageModel};
use crate::segmentation::{validate_threshold, Segmenter};
use crate::types::{Description, Diagnosis, Segmentation, WoundError, WoundResult};

/// Default minimum detection confidence.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.1;

/// Message attached to reports where the model found nothing.
pub const NO_DETECTION_MESSAGE: &str = "No wound detected.";

/// Result payload of one segmentation request.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentationReport {
    pub area_cm2: f64,
    pub annotated_image_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<Diagnosis>,
}

/// Runs the segmentation pipeline for single images.
pub struct WoundAnalyzer {
    segmenter: Mutex<Box<dyn Segmenter>>,
    diagnostics: DiagnosticAdapter,
    calibration: CalibrationRatio,
}

impl WoundAnalyzer {
    pub fn new(
        segmenter: Box<dyn Segmenter>,
        model: Arc<dyn VisionLanguageModel>,
        calibration: CalibrationRatio,
    ) -> Self {
        Self {
            segmenter: Mutex::new(segmenter),
            diagnostics: DiagnosticAdapter::new(model),
            calibration,
        }
    }

    pub fn calibration(&self) -> CalibrationRatio {
        self.calibration
    }

    /// Segment the wound in an image and measure it.
    ///
    /// With no detection the image is sent for diagnosis and the report
    /// carries area 0 and no annotated image. With detections the report
    /// carries the rounded area and the overlay, and no diagnosis is made.
    pub async fn segment(
        &self,
        image_path: &Path,
        confidence_threshold: f32,
    ) -> WoundResult<SegmentationReport> {
        validate_threshold(confidence_threshold)?;
        let image = load_image(image_path)?;
        let rgb = image.to_rgb8();

        let (segmentation, annotated) = self.run_model(&rgb, confidence_threshold)?;

        if segmentation.is_empty() {
            tracing::info!("No wound detected in {}", image_path.display());
            let diagnosis = self.diagnostics.diagnose(&image).await;
            return Ok(SegmentationReport {
                area_cm2: 0.0,
                annotated_image_base64: None,
                message: Some(NO_DETECTION_MESSAGE.to_string()),
                diagnosis: Some(diagnosis),
            });
        }

        let instances = segmentation.detections.len();
        let area = compute_area(&segmentation.into_masks(), self.calibration);
        tracing::info!(
            "Detected {instances} instance(s) in {}, area {area:.4} cm²",
            image_path.display()
        );

        let annotated = annotated.ok_or_else(|| {
            WoundError::Segmentation("Missing overlay for detected instances".to_string())
        })?;

        Ok(SegmentationReport {
            area_cm2: round_area(area),
            annotated_image_base64: Some(image_to_base64(&annotated)?),
            message: None,
            diagnosis: None,
        })
    }

    /// Screen an image for infection.
    pub async fn diagnose(&self, image_path: &Path) -> WoundResult<Diagnosis> {
        let image = load_image(image_path)?;
        Ok(self.diagnostics.diagnose(&image).await)
    }

    /// Describe the wound in an image.
    pub async fn describe(&self, image_path: &Path) -> WoundResult<Description> {
        let image = load_image(image_path)?;
        Ok(self.diagnostics.describe(&image).await)
    }

    /// Inference and overlay under the model lock. Never held across an await.
    fn run_model(
        &self,
        image: &RgbImage,
        confidence_threshold: f32,
    ) -> WoundResult<(Segmentation, Option<RgbImage>)> {
        let mut segmenter = self
            .segmenter
            .lock()
            .map_err(|_| WoundError::Segmentation("Segmentation model lock poisoned".to_string()))?;

        let segmentation = segmenter.segment(image, confidence_threshold)?;
        let annotated = if segmentation.is_empty() {
            None
        } else {
            Some(segmenter.annotate(image, &segmentation))
        };
        Ok((segmentation, annotated))
    }
}

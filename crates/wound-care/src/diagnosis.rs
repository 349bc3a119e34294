//! Infection screening and wound description through a vision-language model.

use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;

use crate::capture::to_png_bytes;
use crate::types::{Description, Diagnosis, WoundResult};

/// Instruction used to elicit a single-word infection classification.
pub const DIAGNOSIS_PROMPT: &str = "Based on this wound image, is it infected or not infected? \
     Respond with only one word: 'infected' or 'not infected'.";

/// Instruction used to elicit a short free-text description.
pub const DESCRIPTION_PROMPT: &str = "Describe this wound, including anything you can see, color, \
     surrounding skin condition, and any visible signs of infection. Make it short and precise.";

/// A generative model that answers a prompt about an image.
#[async_trait]
pub trait VisionLanguageModel: Send + Sync {
    async fn generate(&self, image_png: &[u8], prompt: &str) -> WoundResult<String>;
}

/// Map a model reply onto the closed set of outcomes.
///
/// `not` is checked after the positive match, so "not infected" and any other
/// reply mentioning "not" classify as not infected.
pub fn classify_response(text: &str) -> Diagnosis {
    let text = text.trim().to_lowercase();
    if text.contains("infected") && !text.contains("not") {
        Diagnosis::Infected
    } else if text.contains("not") {
        Diagnosis::NotInfected
    } else {
        Diagnosis::Undetermined
    }
}

/// Wraps a [`VisionLanguageModel`] and turns every failure into data.
#[derive(Clone)]
pub struct DiagnosticAdapter {
    model: Arc<dyn VisionLanguageModel>,
}

impl DiagnosticAdapter {
    pub fn new(model: Arc<dyn VisionLanguageModel>) -> Self {
        Self { model }
    }

    /// Ask whether the wound looks infected.
    pub async fn diagnose(&self, image: &DynamicImage) -> Diagnosis {
        match self.ask(image, DIAGNOSIS_PROMPT).await {
            Ok(text) => {
                let diagnosis = classify_response(&text);
                tracing::debug!("Diagnosis reply {:?} classified as {diagnosis}", text.trim());
                diagnosis
            }
            Err(e) => {
                tracing::error!("Wound diagnosis failed: {e}");
                Diagnosis::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Ask for a short description of the wound.
    pub async fn describe(&self, image: &DynamicImage) -> Description {
        match self.ask(image, DESCRIPTION_PROMPT).await {
            Ok(text) => Description::Text(text.trim().to_string()),
            Err(e) => {
                tracing::error!("Wound description failed: {e}");
                Description::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn ask(&self, image: &DynamicImage, prompt: &str) -> WoundResult<String> {
        let png = to_png_bytes(image)?;
        self.model.generate(&png, prompt).await
    }
}

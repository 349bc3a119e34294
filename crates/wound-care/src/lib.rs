//! Wound care — instance segmentation, calibrated wound area, infection screening,
//! and treatment plans.

pub mod analysis;
pub mod annotate;
pub mod area;
pub mod calibration;
pub mod capture;
pub mod diagnosis;
pub mod gemini;
pub mod segmentation;
pub mod treatment;
pub mod types;

pub use analysis::{SegmentationReport, WoundAnalyzer, DEFAULT_CONFIDENCE_THRESHOLD};
pub use area::{compute_area, round_area};
pub use calibration::CalibrationRatio;
pub use diagnosis::{classify_response, DiagnosticAdapter, VisionLanguageModel};
pub use gemini::{GeminiClient, GeminiConfig};
pub use segmentation::{SegmentationEngine, Segmenter};
pub use treatment::{
    load_knowledge_base, render_treatment_plan, treatment_plan, wound_types, KnowledgeBase,
    TreatmentPlan,
};
pub use types::*;

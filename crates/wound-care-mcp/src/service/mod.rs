//! Shared state behind every tool call: the analyzer and the knowledge base path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use wound_care::{GeminiClient, SegmentationEngine, WoundAnalyzer};

use crate::config::ServerConfig;
use crate::types::McpResult;

/// Everything a tool invocation needs. Read-only after construction.
pub struct WoundService {
    analyzer: WoundAnalyzer,
    knowledge_base: PathBuf,
    confidence_threshold: f32,
}

impl WoundService {
    /// Load the segmentation model and connect the diagnostic client.
    pub fn open(config: &ServerConfig) -> McpResult<Self> {
        let engine = SegmentationEngine::new(&config.model_path)?;
        let gemini = GeminiClient::new(config.gemini.clone())?;

        tracing::info!(
            "Calibration: {} cm/px. Diagnostic model: {}. Knowledge base: {}",
            config.calibration.cm_per_pixel(),
            config.gemini.model,
            config.knowledge_base.display()
        );

        let analyzer = WoundAnalyzer::new(Box::new(engine), Arc::new(gemini), config.calibration);
        Ok(Self::new(
            analyzer,
            config.knowledge_base.clone(),
            config.confidence_threshold,
        ))
    }

    /// Assemble a service from prebuilt parts.
    pub fn new(analyzer: WoundAnalyzer, knowledge_base: PathBuf, confidence_threshold: f32) -> Self {
        Self {
            analyzer,
            knowledge_base,
            confidence_threshold,
        }
    }

    pub fn analyzer(&self) -> &WoundAnalyzer {
        &self.analyzer
    }

    pub fn knowledge_base(&self) -> &Path {
        &self.knowledge_base
    }

    /// Threshold used when a call does not pass one.
    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }
}

//! Configuration loading and resolution.

use std::path::PathBuf;

use wound_care::gemini::{DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL};
use wound_care::{CalibrationRatio, GeminiConfig, DEFAULT_CONFIDENCE_THRESHOLD};

use crate::types::{McpError, McpResult};

const MODEL_ENV: &str = "WOUND_MODEL";
const KNOWLEDGE_BASE_ENV: &str = "WOUND_KB";
const PIXEL_SPACING_ENV: &str = "WOUND_PIXEL_SPACING_CM";
const API_KEY_ENV: &str = "GEMINI_API_KEY";
const ENDPOINT_ENV: &str = "GEMINI_ENDPOINT";

const MODEL_FILENAME: &str = "models/wound-seg.onnx";
const KNOWLEDGE_BASE_FILENAME: &str = "treatment_plans.json";

/// Process-wide settings, built once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub model_path: PathBuf,
    pub knowledge_base: PathBuf,
    pub gemini: GeminiConfig,
    pub calibration: CalibrationRatio,
    pub confidence_threshold: f32,
}

/// Values supplied on the command line. Anything left `None` falls back to
/// the environment and then to defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub knowledge_base: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub gemini_endpoint: Option<String>,
    pub pixel_spacing_cm: Option<f64>,
    pub confidence_threshold: Option<f32>,
}

impl ServerConfig {
    /// Resolve the full configuration. A missing API key or an invalid
    /// calibration is a startup failure.
    pub fn resolve(overrides: ConfigOverrides) -> McpResult<Self> {
        let api_key = overrides
            .gemini_api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                McpError::Configuration(format!("{API_KEY_ENV} environment variable is not set."))
            })?;

        let mut gemini = GeminiConfig::new(api_key);
        gemini.model = overrides
            .gemini_model
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        gemini.endpoint = overrides
            .gemini_endpoint
            .or_else(|| std::env::var(ENDPOINT_ENV).ok())
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_ENDPOINT.to_string());

        let calibration = match resolve_pixel_spacing(overrides.pixel_spacing_cm)? {
            Some(cm) => CalibrationRatio::new(cm)?,
            None => CalibrationRatio::default(),
        };

        let confidence_threshold = overrides
            .confidence_threshold
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(McpError::Configuration(format!(
                "Confidence threshold must be within [0, 1], got {confidence_threshold}"
            )));
        }

        Ok(Self {
            model_path: PathBuf::from(resolve_model_path(overrides.model.as_deref())),
            knowledge_base: PathBuf::from(resolve_knowledge_base_path(
                overrides.knowledge_base.as_deref(),
            )),
            gemini,
            calibration,
            confidence_threshold,
        })
    }
}

/// Resolve the segmentation model path.
pub fn resolve_model_path(explicit: Option<&str>) -> String {
    resolve_path(explicit, MODEL_ENV, MODEL_FILENAME)
}

/// Resolve the treatment plan knowledge base path.
pub fn resolve_knowledge_base_path(explicit: Option<&str>) -> String {
    resolve_path(explicit, KNOWLEDGE_BASE_ENV, KNOWLEDGE_BASE_FILENAME)
}

fn resolve_pixel_spacing(explicit: Option<f64>) -> McpResult<Option<f64>> {
    if explicit.is_some() {
        return Ok(explicit);
    }
    match std::env::var(PIXEL_SPACING_ENV) {
        Ok(raw) => raw.trim().parse::<f64>().map(Some).map_err(|e| {
            McpError::Configuration(format!("{PIXEL_SPACING_ENV} is not a number ({raw}): {e}"))
        }),
        Err(_) => Ok(None),
    }
}

fn resolve_path(explicit: Option<&str>, env_var: &str, filename: &str) -> String {
    if let Some(path) = explicit {
        return path.to_string();
    }

    if let Ok(env_path) = std::env::var(env_var) {
        return env_path;
    }

    let cwd_path = PathBuf::from(filename);
    if cwd_path.exists() {
        return cwd_path.display().to_string();
    }

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    format!("{home}/.wound-care/{filename}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_paths_win() {
        assert_eq!(resolve_model_path(Some("/opt/seg.onnx")), "/opt/seg.onnx");
        assert_eq!(
            resolve_knowledge_base_path(Some("./kb.json")),
            "./kb.json"
        );
    }

    #[test]
    fn test_explicit_overrides() {
        let config = ServerConfig::resolve(ConfigOverrides {
            model: Some("/opt/seg.onnx".to_string()),
            knowledge_base: Some("/opt/kb.json".to_string()),
            gemini_api_key: Some("key".to_string()),
            pixel_spacing_cm: Some(0.05),
            confidence_threshold: Some(0.3),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.model_path, PathBuf::from("/opt/seg.onnx"));
        assert_eq!(config.knowledge_base, PathBuf::from("/opt/kb.json"));
        assert_eq!(config.gemini.api_key, "key");
        assert_eq!(config.gemini.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.calibration.cm_per_pixel(), 0.05);
        assert_eq!(config.confidence_threshold, 0.3);
    }

    #[test]
    fn test_explicit_gemini_endpoint() {
        let config = ServerConfig::resolve(ConfigOverrides {
            gemini_api_key: Some("key".to_string()),
            gemini_endpoint: Some("http://127.0.0.1:9000".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.gemini.endpoint, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_calibration_rejected() {
        let result = ServerConfig::resolve(ConfigOverrides {
            gemini_api_key: Some("key".to_string()),
            pixel_spacing_cm: Some(-1.0),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let result = ServerConfig::resolve(ConfigOverrides {
            gemini_api_key: Some("key".to_string()),
            pixel_spacing_cm: Some(0.02),
            confidence_threshold: Some(2.0),
            ..Default::default()
        });
        assert!(matches!(result, Err(McpError::Configuration(_))));
    }
}

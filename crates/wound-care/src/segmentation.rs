//! Instance segmentation via ONNX Runtime.
//!
//! The engine expects a YOLOv8-seg style export: a detection head of shape
//! `[1, 4 + classes + 32, anchors]` followed by mask prototypes of shape
//! `[1, 32, H/4, W/4]`.

use std::path::Path;

use image::RgbImage;
use ndarray::{Array2, Array4};
use ort::session::Session;
use ort::value::Tensor;

use crate::annotate::draw_overlay;
use crate::types::{BoundingBox, Detection, Segmentation, WoundError, WoundResult};

/// Square input resolution of the model.
pub const MODEL_INPUT_SIZE: u32 = 640;

/// Number of mask prototype coefficients per candidate.
const MASK_COEFFICIENTS: usize = 32;

const NMS_IOU_THRESHOLD: f32 = 0.45;
const MAX_DETECTIONS: usize = 100;
const MASK_THRESHOLD: f32 = 0.5;

/// The segmentation model boundary used by the analyzer.
pub trait Segmenter: Send {
    /// Predict instance masks for an image, keeping detections at or above
    /// `confidence_threshold`.
    fn segment(&mut self, image: &RgbImage, confidence_threshold: f32)
        -> WoundResult<Segmentation>;

    /// Render detected instances over the source image.
    fn annotate(&self, image: &RgbImage, segmentation: &Segmentation) -> RgbImage {
        draw_overlay(image, segmentation)
    }
}

/// Reject thresholds outside the probability range.
pub fn validate_threshold(confidence_threshold: f32) -> WoundResult<()> {
    if !(0.0..=1.0).contains(&confidence_threshold) {
        return Err(WoundError::InvalidInput(format!(
            "Confidence threshold must be within [0, 1], got {confidence_threshold}"
        )));
    }
    Ok(())
}

/// Segmentation engine backed by an ONNX model file.
pub struct SegmentationEngine {
    session: Session,
}

impl SegmentationEngine {
    /// Load the model weights. A missing file is a configuration failure.
    pub fn new(model_path: &Path) -> WoundResult<Self> {
        if !model_path.exists() {
            return Err(WoundError::ModelNotAvailable(format!(
                "Segmentation model not found at {}",
                model_path.display()
            )));
        }

        tracing::info!("Loading segmentation model from {}", model_path.display());

        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(1))
            .and_then(|b| b.commit_from_file(model_path))
            .map_err(|e| WoundError::Segmentation(format!("Failed to load ONNX model: {e}")))?;

        tracing::info!("Segmentation model loaded successfully");
        Ok(Self { session })
    }
}

impl Segmenter for SegmentationEngine {
    fn segment(
        &mut self,
        image: &RgbImage,
        confidence_threshold: f32,
    ) -> WoundResult<Segmentation> {
        validate_threshold(confidence_threshold)?;
        let (width, height) = image.dimensions();

        let input = preprocess(image);
        let input_tensor = Tensor::from_array(input)
            .map_err(|e| WoundError::Segmentation(format!("Failed to create input tensor: {e}")))?;

        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .map_err(|e| WoundError::Segmentation(format!("ONNX inference failed: {e}")))?;

        if outputs.len() < 2 {
            return Err(WoundError::Segmentation(format!(
                "Expected detection and prototype outputs, model produced {}",
                outputs.len()
            )));
        }

        let (det_shape, det_data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| WoundError::Segmentation(format!("Failed to extract detections: {e}")))?;
        let (proto_shape, proto_data) = outputs[1]
            .try_extract_tensor::<f32>()
            .map_err(|e| WoundError::Segmentation(format!("Failed to extract prototypes: {e}")))?;

        let det_dims: Vec<usize> = det_shape.iter().map(|&d| d as usize).collect();
        let proto_dims: Vec<usize> = proto_shape.iter().map(|&d| d as usize).collect();
        check_output_shapes(&det_dims, &proto_dims)?;

        let candidates = decode_candidates(det_data, det_dims[1], det_dims[2], confidence_threshold)?;
        let kept = non_max_suppression(candidates, NMS_IOU_THRESHOLD, MAX_DETECTIONS);

        let (proto_h, proto_w) = (proto_dims[2], proto_dims[3]);
        let detections = kept
            .iter()
            .map(|c| to_detection(c, proto_data, proto_h, proto_w, width, height))
            .collect::<Vec<_>>();

        tracing::debug!(
            "Segmentation kept {} instance(s) at threshold {confidence_threshold}",
            detections.len()
        );

        Ok(Segmentation {
            width,
            height,
            detections,
        })
    }
}

/// Resize to the model resolution and lay out as a normalized NCHW tensor.
fn preprocess(image: &RgbImage) -> Array4<f32> {
    let resized = image::imageops::resize(
        image,
        MODEL_INPUT_SIZE,
        MODEL_INPUT_SIZE,
        image::imageops::FilterType::Triangle,
    );

    let size = MODEL_INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3usize {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }
    tensor
}

/// A detection candidate in model input coordinates.
#[derive(Debug, Clone)]
struct Candidate {
    bbox: BoundingBox,
    confidence: f32,
    coefficients: Vec<f32>,
}

/// Read candidates from a `[features, anchors]` detection head.
fn decode_candidates(
    data: &[f32],
    num_features: usize,
    num_anchors: usize,
    confidence_threshold: f32,
) -> WoundResult<Vec<Candidate>> {
    if num_features <= 4 + MASK_COEFFICIENTS {
        return Err(WoundError::Segmentation(format!(
            "Detection head has {num_features} features, too few for boxes, classes and mask coefficients"
        )));
    }
    if data.len() < num_features * num_anchors {
        return Err(WoundError::Segmentation(
            "Detection output shorter than its declared shape".to_string(),
        ));
    }

    let num_classes = num_features - 4 - MASK_COEFFICIENTS;
    let at = |feature: usize, anchor: usize| data[feature * num_anchors + anchor];

    let mut candidates = Vec::new();
    for anchor in 0..num_anchors {
        let confidence = (0..num_classes)
            .map(|class| at(4 + class, anchor))
            .fold(f32::MIN, f32::max);
        if confidence < confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (at(0, anchor), at(1, anchor), at(2, anchor), at(3, anchor));
        let coefficients = (0..MASK_COEFFICIENTS)
            .map(|k| at(4 + num_classes + k, anchor))
            .collect();

        candidates.push(Candidate {
            bbox: BoundingBox {
                x1: cx - w / 2.0,
                y1: cy - h / 2.0,
                x2: cx + w / 2.0,
                y2: cy + h / 2.0,
            },
            confidence,
            coefficients,
        });
    }
    Ok(candidates)
}

/// Greedy NMS, highest confidence first.
fn non_max_suppression(
    mut candidates: Vec<Candidate>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        if kept
            .iter()
            .all(|k| k.bbox.iou(&candidate.bbox) < iou_threshold)
        {
            kept.push(candidate);
        }
    }
    kept
}

/// Combine prototypes with one candidate's coefficients into a probability map.
fn prototype_mask(coefficients: &[f32], protos: &[f32], proto_h: usize, proto_w: usize) -> Array2<f32> {
    let plane = proto_h * proto_w;
    Array2::from_shape_fn((proto_h, proto_w), |(y, x)| {
        let logit: f32 = coefficients
            .iter()
            .enumerate()
            .map(|(k, c)| c * protos[k * plane + y * proto_w + x])
            .sum();
        1.0 / (1.0 + (-logit).exp())
    })
}

/// Both heads must be present and the prototype plane non-empty.
fn check_output_shapes(det_dims: &[usize], proto_dims: &[usize]) -> WoundResult<()> {
    let valid = det_dims.len() == 3
        && proto_dims.len() == 4
        && proto_dims[1] == MASK_COEFFICIENTS
        && proto_dims[2] > 0
        && proto_dims[3] > 0;
    if !valid {
        return Err(WoundError::Segmentation(format!(
            "Unexpected output shapes {det_dims:?} and {proto_dims:?}"
        )));
    }
    Ok(())
}

/// Turn a kept candidate into a detection. The mask stays on the model's
/// input grid, which is the resolution the calibration ratio is defined at;
/// only the box is mapped to source-image coordinates.
fn to_detection(
    candidate: &Candidate,
    protos: &[f32],
    proto_h: usize,
    proto_w: usize,
    width: u32,
    height: u32,
) -> Detection {
    let size = MODEL_INPUT_SIZE as f32;
    let model_box = BoundingBox {
        x1: candidate.bbox.x1.clamp(0.0, size),
        y1: candidate.bbox.y1.clamp(0.0, size),
        x2: candidate.bbox.x2.clamp(0.0, size),
        y2: candidate.bbox.y2.clamp(0.0, size),
    };
    let low_res = prototype_mask(&candidate.coefficients, protos, proto_h, proto_w);

    let scale_x = width as f32 / size;
    let scale_y = height as f32 / size;
    Detection {
        mask: rasterize_mask(&low_res, &model_box, MODEL_INPUT_SIZE),
        bbox: BoundingBox {
            x1: model_box.x1 * scale_x,
            y1: model_box.y1 * scale_y,
            x2: model_box.x2 * scale_x,
            y2: model_box.y2 * scale_y,
        },
        confidence: candidate.confidence,
    }
}

/// Upsample a prototype map to a `size`×`size` grid, crop it to the box,
/// and binarize it.
fn rasterize_mask(low_res: &Array2<f32>, bbox: &BoundingBox, size: u32) -> Array2<u8> {
    let (proto_h, proto_w) = low_res.dim();
    let side = size as usize;
    Array2::from_shape_fn((side, side), |(y, x)| {
        let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
        if fx < bbox.x1 || fx > bbox.x2 || fy < bbox.y1 || fy > bbox.y2 {
            return 0;
        }
        let my = ((fy * proto_h as f32 / size as f32) as usize).min(proto_h - 1);
        let mx = ((fx * proto_w as f32 / size as f32) as usize).min(proto_w - 1);
        u8::from(low_res[[my, mx]] > MASK_THRESHOLD)
    })
}

//! Box and mask overlay for segmentation results.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::types::{BoundingBox, Detection, Segmentation};

/// Opacity of the mask fill.
const MASK_ALPHA: f32 = 0.4;

/// Box outline thickness in pixels.
const BOX_THICKNESS: i32 = 2;

const PALETTE: [[u8; 3]; 6] = [
    [255, 56, 56],
    [50, 205, 50],
    [0, 149, 255],
    [255, 178, 29],
    [207, 210, 49],
    [146, 204, 23],
];

/// Draw every detection's mask and bounding box on a copy of the image.
pub fn draw_overlay(image: &RgbImage, segmentation: &Segmentation) -> RgbImage {
    let mut canvas = image.clone();

    for (i, detection) in segmentation.detections.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];

        tint_mask(&mut canvas, detection, color);

        draw_box(&mut canvas, &detection.bbox, Rgb(color));
    }

    canvas
}

/// Tint the source pixels inside the box whose nearest mask cell is set.
/// Masks may sit on a different grid than the image, so each pixel is
/// mapped onto the mask by its centre.
fn tint_mask(canvas: &mut RgbImage, detection: &Detection, color: [u8; 3]) {
    let (mask_h, mask_w) = detection.mask.dim();
    let (w, h) = canvas.dimensions();
    if mask_h == 0 || mask_w == 0 || w == 0 || h == 0 {
        return;
    }

    let bbox = &detection.bbox;
    let x_start = bbox.x1.max(0.0).floor() as u32;
    let y_start = bbox.y1.max(0.0).floor() as u32;
    let x_end = (bbox.x2.max(0.0).ceil() as u32).min(w);
    let y_end = (bbox.y2.max(0.0).ceil() as u32).min(h);

    for y in y_start..y_end {
        let my = (((y as f32 + 0.5) * mask_h as f32 / h as f32) as usize).min(mask_h - 1);
        for x in x_start..x_end {
            let mx = (((x as f32 + 0.5) * mask_w as f32 / w as f32) as usize).min(mask_w - 1);
            if detection.mask[[my, mx]] == 0 {
                continue;
            }
            let pixel = canvas.get_pixel_mut(x, y);
            *pixel = blend(*pixel, color, MASK_ALPHA);
        }
    }
}

fn blend(base: Rgb<u8>, color: [u8; 3], alpha: f32) -> Rgb<u8> {
    let mix = |b: u8, c: u8| (b as f32 * (1.0 - alpha) + c as f32 * alpha).round() as u8;
    Rgb([
        mix(base[0], color[0]),
        mix(base[1], color[1]),
        mix(base[2], color[2]),
    ])
}

fn draw_box(canvas: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>) {
    let x = bbox.x1.floor() as i32;
    let y = bbox.y1.floor() as i32;
    let width = bbox.width().ceil() as i32;
    let height = bbox.height().ceil() as i32;

    for t in 0..BOX_THICKNESS {
        let (bw, bh) = (width - 2 * t, height - 2 * t);
        if bw <= 0 || bh <= 0 {
            break;
        }
        draw_hollow_rect_mut(
            canvas,
            Rect::at(x + t, y + t).of_size(bw as u32, bh as u32),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_empty_segmentation_is_unchanged() {
        let img = RgbImage::from_pixel(10, 10, Rgb([10, 20, 30]));
        let out = draw_overlay(&img, &Segmentation::empty(10, 10));
        assert_eq!(out, img);
    }

    #[test]
    fn test_mask_pixels_are_tinted() {
        let img = RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]));
        let mut mask = Array2::<u8>::zeros((20, 20));
        mask[[10, 10]] = 1;
        let segmentation = Segmentation {
            width: 20,
            height: 20,
            detections: vec![Detection {
                mask,
                bbox: BoundingBox { x1: 5.0, y1: 5.0, x2: 15.0, y2: 15.0 },
                confidence: 0.9,
            }],
        };

        let out = draw_overlay(&img, &segmentation);
        assert_eq!(out.dimensions(), (20, 20));
        assert_ne!(*out.get_pixel(10, 10), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(5, 5), Rgb(PALETTE[0]));
        assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_model_grid_mask_is_scaled_onto_image() {
        // A 4x4 mask with its top-left quadrant set, drawn on a 40x40 image.
        let img = RgbImage::from_pixel(40, 40, Rgb([0, 0, 0]));
        let mut mask = Array2::<u8>::zeros((4, 4));
        mask[[0, 0]] = 1;
        mask[[0, 1]] = 1;
        mask[[1, 0]] = 1;
        mask[[1, 1]] = 1;
        let segmentation = Segmentation {
            width: 40,
            height: 40,
            detections: vec![Detection {
                mask,
                bbox: BoundingBox { x1: 0.0, y1: 0.0, x2: 40.0, y2: 40.0 },
                confidence: 0.9,
            }],
        };

        let out = draw_overlay(&img, &segmentation);
        assert_ne!(*out.get_pixel(10, 10), Rgb([0, 0, 0]));
        assert_ne!(*out.get_pixel(19, 19), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(25, 25), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(10, 30), Rgb([0, 0, 0]));
    }
}

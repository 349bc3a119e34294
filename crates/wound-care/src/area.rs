//! Conversion of instance masks into a calibrated surface area.

use crate::calibration::CalibrationRatio;
use crate::types::InstanceMask;

/// Number of foreground pixels in a mask.
pub fn pixel_count(mask: &InstanceMask) -> u64 {
    mask.iter().map(|&v| u64::from(v)).sum()
}

/// Total area in cm² covered by a set of instance masks.
///
/// Instances are counted independently: pixels shared by overlapping
/// instances contribute once per instance.
pub fn compute_area(masks: &[InstanceMask], ratio: CalibrationRatio) -> f64 {
    let total_pixels: u64 = masks.iter().map(pixel_count).sum();
    total_pixels as f64 * ratio.squared()
}

/// Round an area to two decimals for presentation.
pub fn round_area(area: f64) -> f64 {
    (area * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn ratio() -> CalibrationRatio {
        CalibrationRatio::new(0.5).unwrap()
    }

    #[test]
    fn test_empty_mask_set() {
        assert_eq!(compute_area(&[], ratio()), 0.0);
    }

    #[test]
    fn test_all_zero_masks() {
        let masks = vec![Array2::<u8>::zeros((4, 4)), Array2::<u8>::zeros((4, 4))];
        assert_eq!(compute_area(&masks, ratio()), 0.0);
    }

    #[test]
    fn test_area_is_pixels_times_ratio_squared() {
        let mut a = Array2::<u8>::zeros((10, 10));
        a.slice_mut(ndarray::s![0..3, 0..4]).fill(1);
        let mut b = Array2::<u8>::zeros((10, 10));
        b.slice_mut(ndarray::s![5..10, 5..6]).fill(1);

        assert_eq!(pixel_count(&a), 12);
        assert_eq!(pixel_count(&b), 5);
        assert_eq!(compute_area(&[a, b], ratio()), 17.0 * 0.25);
    }

    #[test]
    fn test_overlapping_instances_are_summed() {
        let full = Array2::<u8>::ones((3, 3));
        let area = compute_area(&[full.clone(), full], ratio());
        assert_eq!(area, 18.0 * 0.25);
    }

    #[test]
    fn test_monotonic_in_foreground_pixels() {
        let mut mask = Array2::<u8>::zeros((5, 5));
        let mut previous = compute_area(std::slice::from_ref(&mask), ratio());
        for i in 0..5 {
            for j in 0..5 {
                mask[[i, j]] = 1;
                let current = compute_area(std::slice::from_ref(&mask), ratio());
                assert!(current >= previous);
                previous = current;
            }
        }
        assert_eq!(previous, 25.0 * 0.25);
    }

    #[test]
    fn test_round_area() {
        assert_eq!(round_area(1.23456), 1.23);
        assert_eq!(round_area(0.005), 0.01);
        assert_eq!(round_area(0.0), 0.0);
    }
}

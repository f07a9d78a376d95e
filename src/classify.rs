//! Brightness/uniformity heuristic for flagging watermark-like pixels.
//!
//! A pixel counts as watermark-like when it is **light** (mean channel value
//! above a threshold) and **grayish** (every pairwise channel difference
//! within a tolerance). That matches the light, desaturated overlays typical
//! of stamped watermarks, and will also match any light desaturated content
//! such as white paper background. The heuristic is intentionally blind to
//! shape and position.

use image::Rgb;

/// Caller-tunable classification parameters.
///
/// Both values live in the 0-255 channel range and are passed explicitly
/// into every classification call; there is no hidden global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyParams {
    /// Minimum mean channel brightness for a pixel to count as light.
    pub threshold: u8,
    /// Maximum pairwise channel difference for a pixel to count as grayish.
    pub tolerance: u8,
}

/// Whether a single pixel color looks like light-gray watermark overlay.
///
/// Brightness is the integer mean of the three channels. The pixel is
/// watermark-like iff `brightness > threshold` and all three pairwise
/// channel differences are strictly below `tolerance`.
///
/// Pure function: no side effects, no failure modes.
#[must_use]
pub fn is_watermark_like(pixel: Rgb<u8>, params: ClassifyParams) -> bool {
    let [r, g, b] = pixel.0;

    let brightness = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
    let is_light = brightness > u16::from(params.threshold);

    let is_grayish = r.abs_diff(g) < params.tolerance
        && r.abs_diff(b) < params.tolerance
        && g.abs_diff(b) < params.tolerance;

    is_light && is_grayish
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: ClassifyParams = ClassifyParams {
        threshold: 200,
        tolerance: 20,
    };

    #[test]
    fn light_gray_is_watermark_like() {
        assert!(is_watermark_like(Rgb([230, 230, 230]), PARAMS));
        assert!(is_watermark_like(Rgb([255, 255, 255]), PARAMS));
    }

    #[test]
    fn saturated_color_is_not_watermark_like() {
        // Bright but not grayish
        assert!(!is_watermark_like(Rgb([230, 100, 50]), PARAMS));
    }

    #[test]
    fn dark_gray_is_not_watermark_like() {
        // Grayish but not light
        assert!(!is_watermark_like(Rgb([120, 120, 120]), PARAMS));
    }

    #[test]
    fn brightness_at_threshold_is_not_light() {
        // brightness == threshold must not pass the strict comparison
        assert!(!is_watermark_like(Rgb([200, 200, 200]), PARAMS));
        assert!(is_watermark_like(Rgb([201, 201, 201]), PARAMS));
    }

    #[test]
    fn channel_difference_at_tolerance_is_not_grayish() {
        // max pairwise diff == tolerance must fail the strict comparison
        assert!(!is_watermark_like(Rgb([240, 220, 240]), PARAMS));
        assert!(is_watermark_like(Rgb([240, 221, 240]), PARAMS));
    }

    #[test]
    fn brightness_uses_integer_mean() {
        // (255 + 255 + 0) / 3 = 170, not light at threshold 200 despite two
        // saturated channels
        let params = ClassifyParams {
            threshold: 200,
            tolerance: 255,
        };
        assert!(!is_watermark_like(Rgb([255, 255, 0]), params));
    }

    #[test]
    fn classification_is_idempotent() {
        let px = Rgb([230, 230, 230]);
        let first = is_watermark_like(px, PARAMS);
        let second = is_watermark_like(px, PARAMS);
        assert_eq!(first, second);
    }

    #[test]
    fn zero_tolerance_rejects_everything_light() {
        let params = ClassifyParams {
            threshold: 100,
            tolerance: 0,
        };
        // diff < 0 is unsatisfiable even for exact grays
        assert!(!is_watermark_like(Rgb([255, 255, 255]), params));
    }
}

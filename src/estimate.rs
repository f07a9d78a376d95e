//! Local-neighborhood background estimation for flagged pixels.
//!
//! A flagged pixel gets replaced by the per-channel mean of its square
//! neighborhood, excluding neighbors that themselves look like watermark.
//! Neighbor vetting uses fixed sampling parameters, deliberately decoupled
//! from whatever the caller passed for the primary classification pass.

use image::{Rgb, RgbImage};

use crate::classify::{is_watermark_like, ClassifyParams};

/// Half-width of the square sampling window: an 11x11 neighborhood minus
/// the center pixel.
pub const SAMPLE_RADIUS: u32 = 5;

/// Fixed classification threshold used when vetting neighborhood samples.
pub const SAMPLE_THRESHOLD: u8 = 200;

/// Fixed classification tolerance used when vetting neighborhood samples.
pub const SAMPLE_TOLERANCE: u8 = 30;

/// Estimates a plausible background color for a pixel from its unflagged
/// local neighbors.
///
/// The window radius and the sampling parameters are injected at
/// construction; [`BackgroundEstimator::default`] uses [`SAMPLE_RADIUS`],
/// [`SAMPLE_THRESHOLD`] and [`SAMPLE_TOLERANCE`].
#[derive(Debug, Clone)]
pub struct BackgroundEstimator {
    radius: u32,
    sample_params: ClassifyParams,
}

impl Default for BackgroundEstimator {
    fn default() -> Self {
        Self::new(
            SAMPLE_RADIUS,
            ClassifyParams {
                threshold: SAMPLE_THRESHOLD,
                tolerance: SAMPLE_TOLERANCE,
            },
        )
    }
}

impl BackgroundEstimator {
    /// Create an estimator with an explicit window radius and sampling
    /// parameters.
    #[must_use]
    pub fn new(radius: u32, sample_params: ClassifyParams) -> Self {
        Self {
            radius,
            sample_params,
        }
    }

    /// Estimate the background color at `(x, y)`.
    ///
    /// Iterates the window centered on `(x, y)`, skipping the center pixel
    /// and anything out of bounds, and averages the channels of neighbors
    /// that are not watermark-like under the sampling parameters (integer
    /// truncation). Edge and corner pixels simply see a clipped window.
    ///
    /// If no neighbor qualifies, the original center pixel is returned
    /// unchanged: the degenerate case leaves the watermark in place rather
    /// than guessing.
    ///
    /// `(x, y)` must be within the image bounds.
    #[must_use]
    pub fn estimate(&self, image: &RgbImage, x: u32, y: u32) -> Rgb<u8> {
        let (width, height) = image.dimensions();
        let radius = i64::from(self.radius);

        let mut sums = [0u64; 3];
        let mut samples = 0u64;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let sx = i64::from(x) + dx;
                let sy = i64::from(y) + dy;
                if sx < 0 || sy < 0 || sx >= i64::from(width) || sy >= i64::from(height) {
                    continue;
                }

                // Bounds checked above, so the casts cannot wrap.
                #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                let sample = *image.get_pixel(sx as u32, sy as u32);

                if is_watermark_like(sample, self.sample_params) {
                    continue;
                }

                for (sum, channel) in sums.iter_mut().zip(sample.0) {
                    *sum += u64::from(channel);
                }
                samples += 1;
            }
        }

        if samples == 0 {
            return *image.get_pixel(x, y);
        }

        #[allow(clippy::cast_possible_truncation)]
        let mean = sums.map(|sum| (sum / samples) as u8);
        Rgb(mean)
    }
}

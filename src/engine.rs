//! Core watermark removal engine for raster images.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbImage};
use tracing::warn;

use crate::classify::{is_watermark_like, ClassifyParams};
use crate::error::{Error, Result};
use crate::estimate::BackgroundEstimator;

/// JPEG quality used when re-encoding processed output.
pub const JPEG_QUALITY: u8 = 90;

/// Options controlling file-level processing behavior.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Brightness threshold for the primary classification pass (0-255).
    pub threshold: u8,
    /// Channel-difference tolerance for the primary classification pass (0-255).
    pub tolerance: u8,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            threshold: 200,
            tolerance: 30,
            verbose: false,
            quiet: false,
        }
    }
}

impl ProcessOptions {
    /// The primary classification parameters carried by these options.
    #[must_use]
    pub fn params(&self) -> ClassifyParams {
        ClassifyParams {
            threshold: self.threshold,
            tolerance: self.tolerance,
        }
    }
}

/// Outcome of best-effort processing at image or document granularity.
///
/// Processing never propagates internal failures as hard errors: when
/// anything goes wrong after the input decoded successfully, the caller
/// receives the original bytes unchanged instead of no output at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Processing completed; bytes are the re-encoded artifact.
    Cleaned(Vec<u8>),
    /// Processing hit an internal failure; bytes are the input, unchanged.
    Original(Vec<u8>),
}

impl ProcessOutcome {
    /// The output bytes, whichever variant they came from.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Cleaned(b) | Self::Original(b) => b,
        }
    }

    /// Consume the outcome, returning the output bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Cleaned(b) | Self::Original(b) => b,
        }
    }

    /// Whether the fallback path was taken.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Original(_))
    }
}

/// Result of processing a single input file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether an output file was written.
    pub success: bool,
    /// Whether the output is the original input, copied through unchanged.
    pub fell_back: bool,
    /// Human-readable status message.
    pub message: String,
}

/// The watermark removal engine.
///
/// Holds the background estimator; create once and reuse for any number of
/// images or documents.
#[derive(Debug, Clone, Default)]
pub struct WatermarkEngine {
    estimator: BackgroundEstimator,
}

impl WatermarkEngine {
    /// Create an engine with the default background estimator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with an explicit background estimator.
    #[must_use]
    pub fn with_estimator(estimator: BackgroundEstimator) -> Self {
        Self { estimator }
    }

    /// Remove watermark-like pixels from an image, returning a new image of
    /// identical dimensions.
    ///
    /// Every pixel is classified with the caller's parameters; flagged
    /// pixels are replaced by the background estimate, sampled from the
    /// original image (never the partially-written output, so the result is
    /// independent of scan order). The source image is never mutated.
    #[must_use]
    pub fn clean_image(&self, image: &RgbImage, params: ClassifyParams) -> RgbImage {
        let (width, height) = image.dimensions();
        let mut output = RgbImage::new(width, height);

        for (x, y, pixel) in image.enumerate_pixels() {
            let cleaned = if is_watermark_like(*pixel, params) {
                self.estimator.estimate(image, x, y)
            } else {
                *pixel
            };
            output.put_pixel(x, y, cleaned);
        }

        output
    }

    /// Remove watermark-like pixels from encoded image bytes.
    ///
    /// The output is re-encoded with the given format tag (see
    /// [`format_tag`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the bytes cannot be decoded.
    /// Failures after a successful decode are not propagated: the outcome
    /// carries the original bytes instead.
    pub fn clean_image_bytes(
        &self,
        bytes: &[u8],
        format_tag: &str,
        params: ClassifyParams,
    ) -> Result<ProcessOutcome> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| Error::InvalidInput(e.to_string()))?;

        let cleaned = self.clean_image(&decoded.to_rgb8(), params);

        match encode_image(&cleaned, format_tag) {
            Ok(out) => Ok(ProcessOutcome::Cleaned(out)),
            Err(e) => {
                warn!(format = format_tag, error = %e, "re-encode failed, returning original bytes");
                Ok(ProcessOutcome::Original(bytes.to_vec()))
            }
        }
    }

    /// Process a single image file: read, clean, write.
    ///
    /// An output file is written even on internal failure (the original
    /// bytes, copied through). Returns a [`ProcessResult`] describing what
    /// happened.
    #[must_use]
    pub fn process_file(
        &self,
        input: &Path,
        output: &Path,
        opts: &ProcessOptions,
    ) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            success: false,
            fell_back: false,
            message: String::new(),
        };

        let bytes = match std::fs::read(input) {
            Ok(b) => b,
            Err(e) => {
                result.message = format!("Failed to read: {e}");
                return result;
            }
        };

        let outcome = match self.clean_image_bytes(&bytes, &format_tag(input), opts.params()) {
            Ok(o) => o,
            Err(e) => {
                result.message = format!("Failed to process: {e}");
                return result;
            }
        };

        if let Some(parent) = output.parent() {
            if !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    result.message = format!("Failed to create output directory: {e}");
                    return result;
                }
            }
        }

        result.fell_back = outcome.is_fallback();
        match std::fs::write(output, outcome.bytes()) {
            Ok(()) => {
                result.success = true;
                result.message = if result.fell_back {
                    "Internal failure, original copied through".to_string()
                } else {
                    "Watermark removed".to_string()
                };
            }
            Err(e) => {
                result.message = format!("Failed to write: {e}");
            }
        }

        result
    }

    /// Process all supported images in a directory.
    ///
    /// Uses parallel iteration when the `cli` feature is enabled (via
    /// rayon). Returns a [`ProcessResult`] for each image found.
    ///
    /// # Panics
    ///
    /// Panics if any directory entry has no filename (should not happen for
    /// regular files).
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        opts: &ProcessOptions,
    ) -> Vec<ProcessResult> {
        let entries: Vec<_> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .filter(|e| is_supported_image(e.path().as_path()))
                .collect(),
            Err(e) => {
                return vec![ProcessResult {
                    path: input_dir.to_path_buf(),
                    success: false,
                    fell_back: false,
                    message: format!("Failed to read directory: {e}"),
                }];
            }
        };

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![ProcessResult {
                    path: output_dir.to_path_buf(),
                    success: false,
                    fell_back: false,
                    message: format!("Failed to create output directory: {e}"),
                }];
            }
        }

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            entries
                .par_iter()
                .map(|entry| {
                    let input_path = entry.path();
                    let filename = input_path.file_name().unwrap();
                    let output_path = output_dir.join(filename);
                    self.process_file(&input_path, &output_path, opts)
                })
                .collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            entries
                .iter()
                .map(|entry| {
                    let input_path = entry.path();
                    let filename = input_path.file_name().unwrap();
                    let output_path = output_dir.join(filename);
                    self.process_file(&input_path, &output_path, opts)
                })
                .collect()
        }
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg" | "png" | "bmp"),
        None => false,
    }
}

/// Derive the encoding format tag from a path's extension.
///
/// Lowercased extension; `"jpg"` when the path has none or it is not a
/// supported encoding target.
#[must_use]
pub fn format_tag(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let tag = ext.to_lowercase();
            if matches!(tag.as_str(), "jpg" | "jpeg" | "png" | "bmp") {
                tag
            } else {
                "jpg".to_string()
            }
        }
        None => "jpg".to_string(),
    }
}

/// Encode an RGB image to bytes with format-specific settings.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] for tags outside the supported set,
/// or an encoding error from the codec.
pub fn encode_image(img: &RgbImage, format_tag: &str) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());

    match format_tag {
        "jpg" | "jpeg" => {
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            let dyn_img = DynamicImage::ImageRgb8(img.clone());
            encoder.encode_image(&dyn_img)?;
        }
        "png" => img.write_to(&mut buf, ImageFormat::Png)?,
        "bmp" => img.write_to(&mut buf, ImageFormat::Bmp)?,
        other => {
            return Err(Error::UnsupportedFormat(other.to_string()));
        }
    }

    Ok(buf.into_inner())
}

/// Generate a default output path from an input path.
///
/// Keeps the input's extension, lowercased (`"jpg"` when there is none).
/// Example: `"photo.jpg"` becomes `"photo_nowatermark.jpg"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map_or_else(|| "jpg".to_string(), str::to_lowercase);
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_nowatermark.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_path_appends_nowatermark_suffix() {
        let p = default_output_path(Path::new("/tmp/photo.jpg"));
        assert_eq!(p, PathBuf::from("/tmp/photo_nowatermark.jpg"));

        let p = default_output_path(Path::new("scan.png"));
        assert_eq!(
            p.file_name().unwrap().to_str().unwrap(),
            "scan_nowatermark.png"
        );
    }

    #[test]
    fn format_tag_lowercases_known_extensions() {
        assert_eq!(format_tag(Path::new("a.JPEG")), "jpeg");
        assert_eq!(format_tag(Path::new("a.Png")), "png");
        assert_eq!(format_tag(Path::new("a.bmp")), "bmp");
    }

    #[test]
    fn format_tag_defaults_to_jpg() {
        assert_eq!(format_tag(Path::new("noext")), "jpg");
        assert_eq!(format_tag(Path::new("odd.tiff")), "jpg");
    }

    #[test]
    fn is_supported_image_accepts_common_formats() {
        assert!(is_supported_image(Path::new("photo.jpg")));
        assert!(is_supported_image(Path::new("photo.JPEG")));
        assert!(is_supported_image(Path::new("photo.png")));
        assert!(is_supported_image(Path::new("photo.bmp")));
    }

    #[test]
    fn is_supported_image_rejects_unsupported_formats() {
        assert!(!is_supported_image(Path::new("photo.gif")));
        assert!(!is_supported_image(Path::new("photo.txt")));
        assert!(!is_supported_image(Path::new("photo")));
    }

    #[test]
    fn encode_image_rejects_unknown_tag() {
        let img = RgbImage::new(2, 2);
        assert!(matches!(
            encode_image(&img, "tiff"),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn encode_image_produces_decodable_png() {
        let img = RgbImage::from_pixel(4, 3, image::Rgb([10, 20, 30]));
        let bytes = encode_image(&img, "png").unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(*decoded.get_pixel(0, 0), image::Rgb([10, 20, 30]));
    }

    #[test]
    fn outcome_accessors() {
        let cleaned = ProcessOutcome::Cleaned(vec![1, 2, 3]);
        assert!(!cleaned.is_fallback());
        assert_eq!(cleaned.bytes(), &[1, 2, 3]);

        let original = ProcessOutcome::Original(vec![4, 5]);
        assert!(original.is_fallback());
        assert_eq!(original.into_bytes(), vec![4, 5]);
    }

    #[test]
    fn options_expose_classification_params() {
        let opts = ProcessOptions {
            threshold: 180,
            tolerance: 25,
            ..ProcessOptions::default()
        };
        let params = opts.params();
        assert_eq!(params.threshold, 180);
        assert_eq!(params.tolerance, 25);
    }
}

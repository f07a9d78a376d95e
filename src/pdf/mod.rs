//! Per-page watermark removal for PDF documents.
//!
//! Each page is rasterized at a fixed resolution, cleaned with the image
//! engine, JPEG-encoded, and embedded as the sole content of a new page
//! whose media box matches the original page exactly. The output document
//! has the same page count and order as the input.

mod render;
mod writer;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::classify::ClassifyParams;
use crate::engine::{encode_image, ProcessOptions, ProcessOutcome, ProcessResult, WatermarkEngine};
use crate::error::{Error, Result};

use self::writer::PageWriter;

/// Rasterization resolution for page processing, in dots per inch.
pub const RASTER_DPI: f32 = 300.0;

/// Removes watermark-like content from every page of a PDF document.
///
/// Composes [`WatermarkEngine`] for the pixel work; this type only carries
/// the per-page rasterization and re-embedding bookkeeping.
#[derive(Debug, Clone)]
pub struct PdfCleaner {
    dpi: f32,
}

impl Default for PdfCleaner {
    fn default() -> Self {
        Self { dpi: RASTER_DPI }
    }
}

impl PdfCleaner {
    /// Create a cleaner rasterizing at [`RASTER_DPI`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cleaner with an explicit rasterization resolution.
    #[must_use]
    pub fn with_dpi(dpi: f32) -> Self {
        Self { dpi }
    }

    /// Remove watermark-like content from a PDF, page by page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the bytes cannot be decoded as a
    /// PDF. Any failure after that (rasterization, re-encoding, document
    /// assembly) is not propagated: the outcome carries the original bytes
    /// unchanged, so the caller always gets a usable document.
    pub fn clean_pdf_bytes(
        &self,
        engine: &WatermarkEngine,
        bytes: &[u8],
        params: ClassifyParams,
    ) -> Result<ProcessOutcome> {
        match self.clean_document(engine, bytes, params) {
            Ok(out) => Ok(ProcessOutcome::Cleaned(out)),
            Err(e @ Error::InvalidInput(_)) => Err(e),
            Err(e) => {
                warn!(error = %e, "pdf processing failed, returning original bytes");
                Ok(ProcessOutcome::Original(bytes.to_vec()))
            }
        }
    }

    fn clean_document(
        &self,
        engine: &WatermarkEngine,
        bytes: &[u8],
        params: ClassifyParams,
    ) -> Result<Vec<u8>> {
        let pdfium = render::init_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| Error::InvalidInput(format!("failed to decode pdf: {e}")))?;

        let mut writer = PageWriter::new();
        for (index, page) in document.pages().iter().enumerate() {
            // Media box dimensions in points, preserved in the output page.
            let media_width = page.width().value;
            let media_height = page.height().value;

            let raster = render::rasterize_page(&page, self.dpi)?;
            let cleaned = engine.clean_image(&raster, params);
            let jpeg = encode_image(&cleaned, "jpg")?;

            writer.add_image_page(
                &jpeg,
                cleaned.width(),
                cleaned.height(),
                media_width,
                media_height,
            );
            debug!(page = index, "page cleaned and re-embedded");
        }

        debug!(pages = writer.page_count(), "document assembled");
        writer.finish()
    }

    /// Process a single PDF file: read, clean, write.
    ///
    /// An output file is written even on internal failure (the original
    /// bytes, copied through). Returns a [`ProcessResult`] describing what
    /// happened.
    #[must_use]
    pub fn process_file(
        &self,
        engine: &WatermarkEngine,
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

        let outcome = match self.clean_pdf_bytes(engine, &bytes, opts.params()) {
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
}

/// Default output path for a processed PDF: `{stem}_nowatermark.pdf`.
#[must_use]
pub fn default_pdf_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_nowatermark.pdf"))
}

//! Best-effort removal of light-gray watermarks from raster images and
//! PDF pages.
//!
//! Watermark-like pixels are flagged by a brightness/channel-uniformity
//! heuristic and replaced by a background color averaged from their
//! unflagged neighbors. PDFs are handled page by page: each page is
//! rasterized at 300 DPI, cleaned, and re-embedded at its original media
//! box size. Internal failures never cost the caller an output file: the
//! pipeline falls back to passing the original bytes through unchanged.
//!
//! # Quick Start
//!
//! ```no_run
//! use doc_watermark_removal::{ClassifyParams, WatermarkEngine};
//!
//! let engine = WatermarkEngine::new();
//! let img = image::open("scan.png").unwrap().to_rgb8();
//! let params = ClassifyParams { threshold: 200, tolerance: 30 };
//! let cleaned = engine.clean_image(&img, params);
//! cleaned.save("scan_nowatermark.png").unwrap();
//! ```
//!
//! # PDF documents
//!
//! With the `pdf` feature (default), whole documents go through the same
//! pipeline:
//!
//! ```no_run
//! use doc_watermark_removal::{ClassifyParams, PdfCleaner, WatermarkEngine};
//!
//! let engine = WatermarkEngine::new();
//! let cleaner = PdfCleaner::new();
//! let bytes = std::fs::read("report.pdf").unwrap();
//! let params = ClassifyParams { threshold: 200, tolerance: 30 };
//! let outcome = cleaner.clean_pdf_bytes(&engine, &bytes, params).unwrap();
//! std::fs::write("report_nowatermark.pdf", outcome.bytes()).unwrap();
//! ```

#![deny(missing_docs)]

pub mod classify;
pub mod engine;
pub mod error;
pub mod estimate;
#[cfg(feature = "pdf")]
pub mod pdf;

pub use classify::{is_watermark_like, ClassifyParams};
pub use engine::{
    default_output_path, encode_image, format_tag, is_supported_image, ProcessOptions,
    ProcessOutcome, ProcessResult, WatermarkEngine,
};
pub use error::{Error, Result};
pub use estimate::BackgroundEstimator;
#[cfg(feature = "pdf")]
pub use pdf::{default_pdf_output_path, PdfCleaner};

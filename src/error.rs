//! Error types for the doc-watermark-removal crate.

/// Errors that can occur during watermark removal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input bytes could not be decoded as an image or document.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The image format is not supported for encoding.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred during image processing (decode, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// A PDF page could not be rasterized.
    #[cfg(feature = "pdf")]
    #[error("pdf render error: {0}")]
    Render(String),

    /// The output PDF document could not be assembled or serialized.
    #[cfg(feature = "pdf")]
    #[error("pdf write error: {0}")]
    PdfWrite(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

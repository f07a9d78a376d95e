//! pdfium-render wrapper: page -> raster image, in memory only.

use image::RgbImage;
use pdfium_render::prelude::*;

use crate::error::{Error, Result};

/// Bind to the pdfium shared library.
///
/// Search order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` environment variable (directory holding the
///    platform library)
/// 2. the system loader path
pub(crate) fn init_pdfium() -> Result<Pdfium> {
    let bindings = match std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        Ok(dir) => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
        }
        Err(_) => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| Error::Render(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}

/// Rasterize one page at the given DPI and return it as an RGB image.
///
/// PDF user space puts 1 point at 1/72 inch, so each point maps to
/// `dpi / 72` pixels. Target dimensions are clamped to at least one pixel.
pub(crate) fn rasterize_page(page: &PdfPage<'_>, dpi: f32) -> Result<RgbImage> {
    let width_px = (page.width().value * dpi / 72.0).round().max(1.0);
    let height_px = (page.height().value * dpi / 72.0).round().max(1.0);

    #[allow(clippy::cast_possible_truncation)]
    let config = PdfRenderConfig::new()
        .set_target_width(width_px as i32)
        .set_target_height(height_px as i32);

    let bitmap = page
        .render_with_config(&config)
        .map_err(|e| Error::Render(e.to_string()))?;

    Ok(bitmap.as_image().to_rgb8())
}

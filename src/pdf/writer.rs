//! Output document assembly: one full-page JPEG XObject per processed page.

use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use crate::error::{Error, Result};

/// Builds the output PDF, page by page.
///
/// Each page carries a single image XObject stretched over the whole media
/// box, so the raster's pixel dimensions (derived from the rasterization
/// DPI) are decoupled from the page's point dimensions.
pub(crate) struct PageWriter {
    doc: Document,
    pages_id: lopdf::ObjectId,
    kids: Vec<Object>,
}

/// Content stream drawing the named image over a `width x height` page area.
fn image_content_stream(name: &str, width: f32, height: f32) -> Vec<u8> {
    format!("q {width} 0 0 {height} 0 0 cm /{name} Do Q").into_bytes()
}

impl PageWriter {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Append a page holding the given JPEG, with a media box of
    /// `media_width x media_height` points.
    pub fn add_image_page(
        &mut self,
        jpeg_data: &[u8],
        pixel_width: u32,
        pixel_height: u32,
        media_width: f32,
        media_height: f32,
    ) {
        let image_id = self.doc.add_object(Object::Stream(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(pixel_width),
                "Height" => i64::from(pixel_height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg_data.to_vec(),
        )));

        let mut xobjects = Dictionary::new();
        xobjects.set("Im0", Object::Reference(image_id));
        let resources_id = self.doc.add_object(dictionary! {
            "XObject" => Object::Dictionary(xobjects),
        });

        let content = image_content_stream("Im0", media_width, media_height);
        let content_id = self
            .doc
            .add_object(Object::Stream(Stream::new(dictionary! {}, content)));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(media_width),
                Object::Real(media_height),
            ],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        self.kids.push(page_id.into());
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Assemble the page tree and catalog, then serialize the document.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        #[allow(clippy::cast_possible_wrap)]
        let count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => count,
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| Error::PdfWrite(e.to_string()))?;
        Ok(buf)
    }
}

//! Single-page A4 PDF emission.
//!
//! The exported document is one A4 page with one embedded raster image
//! and no text layer. The raster's placement comes from
//! [`pagefit::fit_to_page`](super::pagefit::fit_to_page); this module only
//! translates it into PDF coordinates (origin bottom-left) and streams the
//! result into a byte buffer.

use std::io::BufWriter;

use image::RgbImage;
use printpdf::{ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px};

use super::pagefit::{Placement, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use crate::error::FolioError;

/// Write a raster onto a fresh single-page A4 PDF and return the bytes.
pub fn write_pdf(raster: &RgbImage, placement: &Placement, title: &str) -> Result<Vec<u8>, FolioError> {
    let (doc, page, layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let layer_ref = doc.get_page(page).get_layer(layer);

    let (width_px, height_px) = raster.dimensions();
    let image = Image::from(ImageXObject {
        width: Px(width_px as usize),
        height: Px(height_px as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: raster.as_raw().clone(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    // DPI chosen so the image's intrinsic size equals the placed size.
    // The aspect ratio is preserved by the fit, so one axis suffices.
    let dpi = width_px as f32 * 25.4 / placement.width_mm;

    // PDF origin is bottom-left; the placement anchors to the page top.
    let translate_y = PAGE_HEIGHT_MM - placement.y_mm - placement.height_mm;

    image.add_to_layer(
        layer_ref,
        ImageTransform {
            translate_x: Some(Mm(placement.x_mm)),
            translate_y: Some(Mm(translate_y)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );

    let mut bytes: Vec<u8> = Vec::new();
    {
        let mut writer = BufWriter::new(&mut bytes);
        doc.save(&mut writer)
            .map_err(|e| FolioError::Export(format!("failed to write PDF: {e}")))?;
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::pagefit;

    #[test]
    fn test_pdf_header_and_size() {
        let raster = RgbImage::from_pixel(100, 140, image::Rgb([255, 255, 255]));
        let placement = pagefit::fit_to_page(raster.width(), raster.height());
        let bytes = write_pdf(&raster, &placement, "Test Document").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 100);
    }

    #[test]
    fn test_full_page_raster_exports() {
        let raster = RgbImage::from_pixel(
            pagefit::page_width_px(),
            pagefit::min_page_height_px(),
            image::Rgb([250, 250, 250]),
        );
        let placement = pagefit::fit_to_page(raster.width(), raster.height());
        let bytes = write_pdf(&raster, &placement, "Full Page").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}

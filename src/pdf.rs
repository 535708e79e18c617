//! PDF assembler – embeds the captured bitmap losslessly as a single image
//! page using `printpdf` (v0.8 ops-based API).

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, XObjectTransform,
};

use crate::error::ExportError;
use crate::pagination::{PageGeometry, Placement, MM_TO_PT};

/// Lossless PNG encoding of the capture.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Build a one-page PDF with `png` drawn at `placement`.
///
/// Content streams are compressed; the embedded image is not re-encoded.
pub fn assemble_pdf(
    png: &[u8],
    placement: &Placement,
    page: &PageGeometry,
    title: &str,
) -> Result<Vec<u8>, ExportError> {
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let raw = RawImage::decode_from_bytes(png, &mut warnings)
        .map_err(|e| ExportError::Assemble(format!("cannot embed capture: {e}")))?;
    let (px_w, px_h) = (raw.width as f32, raw.height as f32);
    if px_w <= 0.0 || px_h <= 0.0 {
        return Err(ExportError::Assemble("capture is empty".to_string()));
    }

    let mut doc = PdfDocument::new(title);
    let xobj_id = doc.add_image(&raw);

    // PDF origin is bottom-left; placement is measured from the top.
    let width_pt = placement.width_mm * MM_TO_PT;
    let height_pt = placement.height_mm * MM_TO_PT;
    let x_pt = placement.x_mm * MM_TO_PT;
    let bottom_pt = page.height_pt() - placement.y_mm * MM_TO_PT - height_pt;

    // At dpi=72 printpdf maps 1 px to 1 pt, so scale = desired_pt / px.
    let ops = vec![Op::UseXobject {
        id: xobj_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(x_pt)),
            translate_y: Some(Pt(bottom_pt)),
            dpi: Some(72.0),
            scale_x: Some(width_pt / px_w),
            scale_y: Some(height_pt / px_h),
            rotate: None,
        },
    }];

    doc.with_pages(vec![PdfPage::new(
        Mm(page.width_mm),
        Mm(page.height_mm),
        ops,
    )]);

    let options = PdfSaveOptions {
        optimize: true,
        image_optimization: None,
        ..Default::default()
    };
    let bytes = doc.save(&options, &mut warnings);
    for w in &warnings {
        log::debug!("printpdf: {w:?}");
    }
    log::info!("Assembled PDF '{title}' ({} bytes)", bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::compute_placement;

    #[test]
    fn png_roundtrips_pixels() {
        let img = RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 255]));
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let back = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(back, img);
    }

    #[test]
    fn single_page_pdf() {
        let img = RgbaImage::from_pixel(40, 60, image::Rgba([255, 255, 255, 255]));
        let png = encode_png(&img).unwrap();
        let page = PageGeometry::a4_portrait();
        let placement = compute_placement(40, 60, &page);
        let bytes = assemble_pdf(&png, &placement, &page, "Resume").unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
        assert!(bytes.len() > 200);
    }

    #[test]
    fn garbage_png_is_an_assembly_error() {
        let page = PageGeometry::a4_portrait();
        let placement = compute_placement(10, 10, &page);
        let err = assemble_pdf(b"not a png", &placement, &page, "x").unwrap_err();
        assert!(matches!(err, ExportError::Assemble(_)));
    }
}

//! Pagination – fits a captured bitmap onto a fixed-size page.
//!
//! The whole capture goes onto a single page: it is scaled uniformly until it
//! fits both page dimensions and then centered. Content taller than one page
//! is shrunk rather than tiled across pages.

use serde::{Deserialize, Serialize};

/// Millimetres per CSS pixel at 96 DPI.
pub const PX_TO_MM: f32 = 0.264583;

/// Points per millimetre.
pub const MM_TO_PT: f32 = 72.0 / 25.4;

/// Physical page size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageGeometry {
    pub const fn a4_portrait() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
        }
    }

    pub fn width_pt(&self) -> f32 {
        self.width_mm * MM_TO_PT
    }

    pub fn height_pt(&self) -> f32 {
        self.height_mm * MM_TO_PT
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4_portrait()
    }
}

/// Where the image lands on the page, in mm from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f32,
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Uniform scale-to-fit and centering of a `width_px` × `height_px` image.
/// Pure: identical input always yields the identical placement.
pub fn compute_placement(width_px: u32, height_px: u32, page: &PageGeometry) -> Placement {
    let img_w_mm = width_px as f32 * PX_TO_MM;
    let img_h_mm = height_px as f32 * PX_TO_MM;

    if img_w_mm <= 0.0 || img_h_mm <= 0.0 {
        return Placement {
            scale: 0.0,
            x_mm: page.width_mm / 2.0,
            y_mm: page.height_mm / 2.0,
            width_mm: 0.0,
            height_mm: 0.0,
        };
    }

    let scale = (page.width_mm / img_w_mm).min(page.height_mm / img_h_mm);
    let width_mm = img_w_mm * scale;
    let height_mm = img_h_mm * scale;

    Placement {
        scale,
        x_mm: (page.width_mm - width_mm) / 2.0,
        y_mm: (page.height_mm - height_mm) / 2.0,
        width_mm,
        height_mm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn tall_image_fits_height_and_centers_horizontally() {
        let p = compute_placement(2000, 3000, &PageGeometry::a4_portrait());
        assert!(close(p.scale, 0.374_17), "scale = {}", p.scale);
        assert!(close(p.height_mm, 297.0));
        assert!(close(p.width_mm, 198.0), "width = {}", p.width_mm);
        assert!(close(p.x_mm, 6.0), "x = {}", p.x_mm);
        assert!(close(p.y_mm, 0.0));
    }

    #[test]
    fn wide_image_fits_width_and_centers_vertically() {
        let p = compute_placement(3000, 1000, &PageGeometry::a4_portrait());
        assert!(close(p.width_mm, 210.0));
        assert!(close(p.x_mm, 0.0));
        assert!(close(p.y_mm, (297.0 - p.height_mm) / 2.0));
        assert!(p.y_mm > 0.0);
    }

    #[test]
    fn placement_is_deterministic() {
        let page = PageGeometry::a4_portrait();
        let first = compute_placement(2000, 3000, &page);
        for _ in 0..10 {
            assert_eq!(compute_placement(2000, 3000, &page), first);
        }
    }

    #[test]
    fn small_images_are_scaled_up() {
        let p = compute_placement(100, 100, &PageGeometry::a4_portrait());
        assert!(p.scale > 1.0);
        assert!(close(p.width_mm, 210.0));
    }

    #[test]
    fn a4_in_points() {
        let page = PageGeometry::a4_portrait();
        assert!((page.width_pt() - 595.28).abs() < 0.1);
        assert!((page.height_pt() - 841.89).abs() < 0.1);
    }
}

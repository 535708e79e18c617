//! Painting of a laid-out box tree onto a `tiny-skia` canvas.

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use image::{DynamicImage, RgbaImage};
use tiny_skia::{
    FillRule, GradientStop, IntSize, LinearGradient, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Point, Rect, SpreadMode, Stroke, Transform,
};

use crate::error::ExportError;
use crate::fonts::FontManager;
use crate::layout::{font_key, BoxContent, Layout, PositionedBox};
use crate::style::{Color, ComputedStyle, Display, GradientDirection, TextAlign};

/// Decode a `data:<mime>;base64,<payload>` image. Anything else yields `None`.
pub fn decode_data_uri(src: &str) -> Option<DynamicImage> {
    let payload = src.strip_prefix("data:")?;
    let (_, b64) = payload.split_once(";base64,")?;
    let bytes = BASE64_STD.decode(b64.trim()).ok()?;
    image::load_from_memory(&bytes).ok()
}

pub(super) fn paint(
    layout: &Layout,
    fonts: &FontManager,
    scale: f32,
    width: u32,
    height: u32,
) -> Result<RgbaImage, ExportError> {
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| ExportError::Capture(format!("cannot allocate {width}x{height} canvas")))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let mut painter = Painter {
        pixmap: &mut pixmap,
        fonts,
        ts: Transform::from_scale(scale, scale),
    };
    for b in &layout.boxes {
        painter.paint_box(b);
    }

    // The canvas starts opaque, so demultiplying is exact.
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| ExportError::Capture("canvas size mismatch".to_string()))
}

struct Painter<'a> {
    pixmap: &'a mut Pixmap,
    fonts: &'a FontManager,
    ts: Transform,
}

impl Painter<'_> {
    fn paint_box(&mut self, b: &PositionedBox) {
        if b.style.display == Display::None {
            return;
        }

        self.paint_background(b);
        self.paint_border(b);

        match &b.content {
            BoxContent::Text { lines } => self.paint_text(b, lines),
            BoxContent::Icon { kind, .. } => self.paint_icon(b, kind),
            BoxContent::Image { src } => self.paint_image(b, src),
            BoxContent::None => {}
        }

        for child in &b.children {
            self.paint_box(child);
        }
    }

    fn paint_background(&mut self, b: &PositionedBox) {
        let s = &b.style;
        let mut paint = Paint {
            anti_alias: true,
            ..Paint::default()
        };

        if let Some(g) = s.gradient.filter(|g| !(g.from.is_transparent() && g.to.is_transparent())) {
            let end = match g.direction {
                GradientDirection::ToRight => Point::from_xy(b.x + b.width, b.y),
                GradientDirection::ToBottom => Point::from_xy(b.x, b.y + b.height),
            };
            let Some(shader) = LinearGradient::new(
                Point::from_xy(b.x, b.y),
                end,
                vec![
                    GradientStop::new(0.0, skia_color(g.from)),
                    GradientStop::new(1.0, skia_color(g.to)),
                ],
                SpreadMode::Pad,
                Transform::identity(),
            ) else {
                return;
            };
            paint.shader = shader;
        } else if !s.background_color.is_transparent() {
            paint.set_color(skia_color(s.background_color));
        } else {
            return;
        }

        if let Some(path) = rounded_rect(b.x, b.y, b.width, b.height, s.border_radius) {
            self.pixmap
                .fill_path(&path, &paint, FillRule::Winding, self.ts, None);
        }
    }

    fn paint_border(&mut self, b: &PositionedBox) {
        let s = &b.style;
        if s.border.is_zero() || s.border_color.is_transparent() {
            return;
        }
        let mut paint = Paint::default();
        paint.set_color(skia_color(s.border_color));
        paint.anti_alias = true;

        let e = s.border;
        let uniform = e.top == e.right && e.top == e.bottom && e.top == e.left;
        if uniform && s.border_radius > 0.0 {
            let half = e.top / 2.0;
            if let Some(path) = rounded_rect(
                b.x + half,
                b.y + half,
                b.width - e.top,
                b.height - e.top,
                s.border_radius - half,
            ) {
                let stroke = Stroke {
                    width: e.top,
                    ..Stroke::default()
                };
                self.pixmap.stroke_path(&path, &paint, &stroke, self.ts, None);
            }
            return;
        }

        let sides = [
            (b.x, b.y, b.width, e.top),
            (b.x, b.y + b.height - e.bottom, b.width, e.bottom),
            (b.x, b.y, e.left, b.height),
            (b.x + b.width - e.right, b.y, e.right, b.height),
        ];
        for (x, y, w, h) in sides {
            if let Some(rect) = Rect::from_xywh(x, y, w, h) {
                self.pixmap.fill_rect(rect, &paint, self.ts, None);
            }
        }
    }

    fn paint_text(&mut self, b: &PositionedBox, lines: &[String]) {
        let s = &b.style;
        let key = font_key(s);
        let face_data = self.fonts.get(&key);
        let face = if face_data.has_outlines() {
            ttf_parser::Face::parse(&face_data.bytes, 0).ok()
        } else {
            None
        };

        let (cx, cy, cw) = b.content_origin();
        let line_h = self.fonts.line_height_px(s.font_size, s.line_height);
        let ascender = self.fonts.ascender_px(s.font_size, &key);

        let mut paint = Paint::default();
        paint.set_color(skia_color(s.color));
        paint.anti_alias = true;

        for (i, line) in lines.iter().enumerate() {
            let line_w = self.fonts.measure_text_width(line, s.font_size, &key);
            let x = cx + align_offset(s, cw, line_w);
            let baseline = cy + i as f32 * line_h + (line_h - s.font_size) / 2.0 + ascender;

            let path = match &face {
                Some(face) => outline_line(face, line, x, baseline, s.font_size),
                None => greek_line(self.fonts, s, line, x, baseline),
            };
            if let Some(path) = path {
                self.pixmap
                    .fill_path(&path, &paint, FillRule::Winding, self.ts, None);
            }
        }
    }

    fn paint_icon(&mut self, b: &PositionedBox, kind: &str) {
        let (cx, cy) = (b.x + b.width / 2.0, b.y + b.height / 2.0);
        let r = b.width.min(b.height) / 2.0;
        let path = match kind {
            "star" => star_path(cx, cy, r * 0.95, r * 0.4),
            "dot" => PathBuilder::from_circle(cx, cy, r),
            // Contact and link glyphs are drawn as small markers.
            _ => PathBuilder::from_circle(cx, cy, r * 0.35),
        };
        if let Some(path) = path {
            let mut paint = Paint::default();
            paint.set_color(skia_color(b.style.color));
            paint.anti_alias = true;
            self.pixmap
                .fill_path(&path, &paint, FillRule::Winding, self.ts, None);
        }
    }

    fn paint_image(&mut self, b: &PositionedBox, src: &str) {
        let Some(img) = decode_data_uri(src) else {
            log::warn!(
                "Image '{}' is not an embedded data URI or failed to decode; leaving it blank",
                truncate(src, 48)
            );
            return;
        };
        let Some(image_pixmap) = to_pixmap(&img.to_rgba8()) else {
            log::warn!("Image could not be converted for painting; leaving it blank");
            return;
        };
        let (cx, cy, cw) = b.content_origin();
        let ch = (b.height - b.style.border.vertical() - b.style.padding.vertical()).max(0.0);
        if cw <= 0.0 || ch <= 0.0 {
            return;
        }
        let placement = Transform::from_row(
            cw / image_pixmap.width() as f32,
            0.0,
            0.0,
            ch / image_pixmap.height() as f32,
            cx,
            cy,
        );
        self.pixmap.draw_pixmap(
            0,
            0,
            image_pixmap.as_ref(),
            &PixmapPaint {
                quality: tiny_skia::FilterQuality::Bicubic,
                ..PixmapPaint::default()
            },
            placement.post_concat(self.ts),
            None,
        );
    }
}

fn skia_color(c: Color) -> tiny_skia::Color {
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    tiny_skia::Color::from_rgba8(to_u8(c.r), to_u8(c.g), to_u8(c.b), to_u8(c.a))
}

fn align_offset(s: &ComputedStyle, available: f32, line_w: f32) -> f32 {
    match s.text_align {
        TextAlign::Left => 0.0,
        TextAlign::Center => ((available - line_w) / 2.0).max(0.0),
        TextAlign::Right => (available - line_w).max(0.0),
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((i, _)) => format!("{}…", &s[..i]),
        None => s.to_string(),
    }
}

/// Straight RGBA to a premultiplied pixmap.
fn to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(img.width(), img.height())?;
    let mut data = img.as_raw().clone();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, size)
}

fn rounded_rect(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Option<Path> {
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let r = radius.max(0.0).min(w / 2.0).min(h / 2.0);
    if r <= 0.0 {
        return Rect::from_xywh(x, y, w, h).map(PathBuilder::from_rect);
    }
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

fn star_path(cx: f32, cy: f32, outer: f32, inner: f32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for i in 0..10 {
        let r = if i % 2 == 0 { outer } else { inner };
        let angle = -std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
        let (px, py) = (cx + r * angle.cos(), cy + r * angle.sin());
        if i == 0 {
            pb.move_to(px, py);
        } else {
            pb.line_to(px, py);
        }
    }
    pb.close();
    pb.finish()
}

/// Word bars at x-height; stands in for glyphs when no font face is loaded.
fn greek_line(
    fonts: &FontManager,
    s: &ComputedStyle,
    line: &str,
    x: f32,
    baseline: f32,
) -> Option<Path> {
    let key = font_key(s);
    let space = fonts.measure_text_width(" ", s.font_size, &key);
    let mut pb = PathBuilder::new();
    let mut cursor = x;
    for word in line.split(' ') {
        let w = fonts.measure_text_width(word, s.font_size, &key);
        if w > 0.0 {
            if let Some(rect) =
                Rect::from_xywh(cursor, baseline - s.font_size * 0.5, w, s.font_size * 0.45)
            {
                pb.push_rect(rect);
            }
        }
        cursor += w + space;
    }
    pb.finish()
}

struct GlyphSink<'a> {
    pb: &'a mut PathBuilder,
    x: f32,
    y: f32,
    k: f32,
}

impl ttf_parser::OutlineBuilder for GlyphSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.pb.move_to(self.x + x * self.k, self.y - y * self.k);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.pb.line_to(self.x + x * self.k, self.y - y * self.k);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.pb.quad_to(
            self.x + x1 * self.k,
            self.y - y1 * self.k,
            self.x + x * self.k,
            self.y - y * self.k,
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.pb.cubic_to(
            self.x + x1 * self.k,
            self.y - y1 * self.k,
            self.x + x2 * self.k,
            self.y - y2 * self.k,
            self.x + x * self.k,
            self.y - y * self.k,
        );
    }

    fn close(&mut self) {
        self.pb.close();
    }
}

fn outline_line(
    face: &ttf_parser::Face<'_>,
    line: &str,
    x: f32,
    baseline: f32,
    font_size: f32,
) -> Option<Path> {
    let k = font_size / face.units_per_em() as f32;
    let mut pb = PathBuilder::new();
    let mut cursor = x;
    for ch in line.chars() {
        match face.glyph_index(ch) {
            Some(gid) => {
                let mut sink = GlyphSink {
                    pb: &mut pb,
                    x: cursor,
                    y: baseline,
                    k,
                };
                let _ = face.outline_glyph(gid, &mut sink);
                cursor += face.glyph_hor_advance(gid).unwrap_or(0) as f32 * k;
            }
            None => cursor += font_size * 0.5,
        }
    }
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_data_uri(w: u32, h: u32) -> String {
        let img = RgbaImage::from_pixel(w, h, image::Rgba([200, 0, 0, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        format!("data:image/png;base64,{}", BASE64_STD.encode(bytes.into_inner()))
    }

    #[test]
    fn decodes_only_data_uris() {
        assert!(decode_data_uri("https://example.com/a.png").is_none());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_none());
        let img = decode_data_uri(&png_data_uri(3, 2)).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
    }

    #[test]
    fn premultiplies_translucent_pixels() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 128]));
        let pixmap = to_pixmap(&img).unwrap();
        let px = pixmap.pixels()[0];
        assert_eq!((px.red(), px.alpha()), (128, 128));
    }

    #[test]
    fn star_has_ten_points() {
        let path = star_path(10.0, 10.0, 8.0, 3.0).unwrap();
        let bounds = path.bounds();
        assert!(bounds.top() >= 1.9 && bounds.top() <= 2.1);
        assert!(bounds.width() > 10.0);
    }

    #[test]
    fn rounded_rect_degenerates_to_rect() {
        assert!(rounded_rect(0.0, 0.0, 0.0, 10.0, 4.0).is_none());
        let path = rounded_rect(0.0, 0.0, 20.0, 10.0, f32::INFINITY).unwrap();
        assert_eq!(path.bounds().height(), 10.0);
    }

    #[test]
    fn truncates_long_sources() {
        assert_eq!(truncate("abcdef", 3), "abc…");
        assert_eq!(truncate("ab", 3), "ab");
    }
}

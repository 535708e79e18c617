//! Font loading and text measurement using `ttf-parser`.
//!
//! Without any loaded face the manager falls back to Helvetica-like synthetic
//! metrics. Those are deterministic, so captures stay reproducible on machines
//! without the template fonts installed.

use std::collections::HashMap;
use std::path::Path;

use crate::error::FontError;
use crate::style::{SANS, SERIF};

/// A loaded font face with metrics.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes; empty for synthetic faces.
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
}

impl FontData {
    fn synthetic() -> Self {
        Self {
            bytes: Vec::new(),
            units_per_em: 1000.0,
            ascender: 750.0,
            descender: -250.0,
        }
    }

    pub fn has_outlines(&self) -> bool {
        !self.bytes.is_empty()
    }
}

impl std::fmt::Debug for FontData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontData")
            .field("bytes", &self.bytes.len())
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub fn new(family: &str, bold: bool, italic: bool) -> Self {
        Self {
            family: family.to_string(),
            bold,
            italic,
        }
    }
}

/// Manages loaded fonts.
#[derive(Debug)]
pub struct FontManager {
    fonts: HashMap<FontKey, FontData>,
    fallback: FontData,
}

impl FontManager {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
            fallback: FontData::synthetic(),
        }
    }

    /// Load a TTF/OTF font from bytes.
    pub fn load_font(
        &mut self,
        family: &str,
        bold: bool,
        italic: bool,
        bytes: Vec<u8>,
    ) -> Result<(), FontError> {
        let face = ttf_parser::Face::parse(&bytes, 0)?;
        let data = FontData {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
            bytes,
        };
        log::debug!("Loaded font {family} (bold={bold}, italic={italic})");
        self.fonts.insert(FontKey::new(family, bold, italic), data);
        Ok(())
    }

    pub fn load_font_file(
        &mut self,
        family: &str,
        bold: bool,
        italic: bool,
        path: &Path,
    ) -> Result<(), FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Read {
            path: path.display().to_string(),
            source,
        })?;
        self.load_font(family, bold, italic, bytes)
    }

    /// Register synthetic faces for both template families so that lookups
    /// never miss.
    pub fn ensure_default(&mut self) {
        for family in [SANS, SERIF] {
            for bold in [false, true] {
                for italic in [false, true] {
                    self.fonts
                        .entry(FontKey::new(family, bold, italic))
                        .or_insert_with(FontData::synthetic);
                }
            }
        }
    }

    /// Get font data for a key. Falls back to the regular face of the same
    /// family, then to synthetic metrics.
    pub fn get(&self, key: &FontKey) -> &FontData {
        self.fonts
            .get(key)
            .or_else(|| self.fonts.get(&FontKey::new(&key.family, key.bold, false)))
            .or_else(|| self.fonts.get(&FontKey::new(&key.family, false, false)))
            .unwrap_or(&self.fallback)
    }

    /// Measure the width of a string at a given font size (in px).
    /// Real faces sum glyph advances; synthetic faces use 0.5 × font_size per
    /// char (0.55 for bold).
    pub fn measure_text_width(&self, text: &str, font_size: f32, key: &FontKey) -> f32 {
        let data = self.get(key);

        if !data.has_outlines() {
            let avg = if key.bold { 0.55 } else { 0.5 };
            return text.chars().count() as f32 * font_size * avg;
        }

        match ttf_parser::Face::parse(&data.bytes, 0) {
            Ok(face) => {
                let scale = font_size / data.units_per_em;
                text.chars()
                    .map(|ch| match face.glyph_index(ch) {
                        Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                        None => font_size * 0.5,
                    })
                    .sum()
            }
            Err(_) => text.chars().count() as f32 * font_size * 0.5,
        }
    }

    pub fn line_height_px(&self, font_size: f32, line_height_factor: f32) -> f32 {
        font_size * line_height_factor
    }

    /// Ascender in px for the given face.
    pub fn ascender_px(&self, font_size: f32, key: &FontKey) -> f32 {
        let data = self.get(key);
        data.ascender * font_size / data.units_per_em
    }

    pub fn has_real_fonts(&self) -> bool {
        self.fonts.values().any(FontData::has_outlines)
    }
}

impl Default for FontManager {
    fn default() -> Self {
        let mut mgr = Self::new();
        mgr.ensure_default();
        mgr
    }
}

/// Word-wrap text to fit within `max_width` pixels. Returns a vec of lines.
pub fn wrap_text(
    text: &str,
    font_size: f32,
    key: &FontKey,
    max_width: f32,
    fonts: &FontManager,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in words {
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{current_line} {word}")
            };
            let w = fonts.measure_text_width(&candidate, font_size, key);
            if w > max_width && !current_line.is_empty() {
                lines.push(std::mem::replace(&mut current_line, word.to_string()));
            } else {
                current_line = candidate;
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sans() -> FontKey {
        FontKey::new(SANS, false, false)
    }

    #[test]
    fn heuristic_text_width() {
        let mgr = FontManager::default();
        let w = mgr.measure_text_width("Hello", 16.0, &sans());
        // 5 chars × 16 × 0.5 = 40
        assert!((w - 40.0).abs() < 0.1);
        let bold = mgr.measure_text_width("Hello", 16.0, &FontKey::new(SANS, true, false));
        assert!(bold > w);
    }

    #[test]
    fn word_wrap_basic() {
        let mgr = FontManager::default();
        let lines = wrap_text("Hello world foo bar", 16.0, &sans(), 60.0, &mgr);
        assert!(lines.len() >= 2, "Expected wrapping, got {lines:?}");
        assert_eq!(lines.join(" "), "Hello world foo bar");
    }

    #[test]
    fn preserves_explicit_newlines() {
        let mgr = FontManager::default();
        let lines = wrap_text("one\ntwo", 14.0, &sans(), 500.0, &mgr);
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn unknown_family_falls_back() {
        let mgr = FontManager::default();
        let data = mgr.get(&FontKey::new("Comic", true, true));
        assert_eq!(data.units_per_em, 1000.0);
        assert!(!mgr.has_real_fonts());
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        let mut mgr = FontManager::default();
        assert!(mgr.load_font(SANS, false, false, vec![0, 1, 2, 3]).is_err());
    }
}

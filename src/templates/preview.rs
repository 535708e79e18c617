//! Preview container: the fixed-width A4 render target that wraps a template
//! and is the element export captures.

use crate::dom::{div, Document, ElementNode, Theme};
use crate::model::ResumeData;

/// Element id of the render target.
pub const PREVIEW_ID: &str = "resume-preview";

/// A4 width at 96 DPI.
pub const PREVIEW_WIDTH_PX: f32 = 794.0;

/// A4 height at 96 DPI.
pub const PREVIEW_MIN_HEIGHT_PX: f32 = 1123.0;

/// Panel height once the 0.75 display scale is applied.
const PANEL_HEIGHT_PX: f32 = 842.0;

/// How the preview is shown on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewMode {
    /// Full size, as on the dedicated preview page.
    #[default]
    FullPage,
    /// Scaled-down, clipped side panel next to the editor.
    Panel,
}

/// Wrap template output in the render target.
///
/// The container pins its own width, fonts, and white background so the
/// capture does not depend on the surrounding theme. Panel mode adds the
/// display-only scaling and clipping that export strips again.
pub fn preview_container(content: ElementNode, mode: PreviewMode) -> ElementNode {
    let mut style = format!(
        "width: {PREVIEW_WIDTH_PX}px; min-height: {PREVIEW_MIN_HEIGHT_PX}px; \
         font-family: system-ui, sans-serif; font-size: 14px; line-height: 1.4; \
         color: #000000; background-color: #ffffff"
    );
    let mut container = div("bg-white").id(PREVIEW_ID);
    if mode == PreviewMode::Panel {
        style.push_str(&format!(
            "; transform: scale(0.75); transform-origin: top; height: {PANEL_HEIGHT_PX}px; overflow: hidden"
        ));
        container = container.class("transform scale-75 origin-top overflow-hidden");
    }
    container.style(&style).child(content)
}

/// A live document showing `data` in its chosen template.
pub fn preview_document(data: &ResumeData, mode: PreviewMode, theme: Theme) -> Document {
    let mut document = Document::new(theme);
    let page = preview_container(super::render(data, data.template), mode);
    document.attach(div("p-4 flex justify-center").child(page));
    document
}

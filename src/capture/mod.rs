//! Capture – turns the live render target into a bitmap of its full content
//! extent.
//!
//! The target is looked up by id, cloned, stripped of on-screen preview
//! constraints, styled in isolation from the surrounding page theme, laid out
//! with unbounded height and painted onto an opaque white canvas at
//! [`CaptureOptions::scale`].

mod raster;

use std::time::Duration;

use image::RgbaImage;
use tokio::sync::watch;

use crate::dom::{Document, DomNode, ElementNode};
use crate::error::ExportError;
use crate::fonts::FontManager;
use crate::layout::compute_layout;
use crate::style::{build_styled_tree, declarations, Dimension, StyledNode};

pub use raster::decode_data_uri;

/// Smallest accepted upscale factor.
pub const MIN_SCALE: f32 = 2.0;

/// Width used when the target does not declare one (A4 at 96 DPI).
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 794.0;

#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Output pixels per layout pixel; must be at least [`MIN_SCALE`].
    pub scale: f32,
    /// Fallback wait when the document carries no readiness signal.
    pub settle_delay: Duration,
    /// Optional upper bound for either side of the output bitmap. Unbounded
    /// by default: a long resume is captured whole and shrunk at placement.
    pub max_dimension: Option<u32>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: MIN_SCALE,
            settle_delay: Duration::from_millis(500),
            max_dimension: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Readiness
// ---------------------------------------------------------------------------

/// Receiving half of the "styles and fonts applied" signal.
#[derive(Debug, Clone)]
pub struct ReadinessSignal {
    rx: watch::Receiver<bool>,
}

/// Sending half; whoever applies pending styles/fonts calls
/// [`ReadyNotifier::notify_ready`] once done.
#[derive(Debug)]
pub struct ReadyNotifier {
    tx: watch::Sender<bool>,
}

pub fn readiness_channel() -> (ReadyNotifier, ReadinessSignal) {
    let (tx, rx) = watch::channel(false);
    (ReadyNotifier { tx }, ReadinessSignal { rx })
}

impl ReadyNotifier {
    pub fn notify_ready(&self) {
        self.tx.send_replace(true);
    }
}

impl ReadinessSignal {
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until ready. Returns false if the notifier went away first.
    pub async fn wait(&mut self) -> bool {
        self.rx.wait_for(|ready| *ready).await.is_ok()
    }
}

/// Wait for pending style work to settle. Prefers the readiness signal and
/// falls back to the fixed delay, which is only a guess.
async fn settle(signal: Option<&ReadinessSignal>, delay: Duration) {
    if let Some(signal) = signal {
        if signal.is_ready() || signal.clone().wait().await {
            log::debug!("Render target reported ready");
            return;
        }
        log::warn!("Readiness notifier dropped before signalling; using settle delay");
    }
    tokio::time::sleep(delay).await;
}

// ---------------------------------------------------------------------------
// Preview constraints
// ---------------------------------------------------------------------------

const STRIPPED_CLASS_PREFIXES: &[&str] = &["scale-", "origin-", "h-", "max-h-", "overflow-"];
const STRIPPED_PROPERTIES: &[&str] = &[
    "transform",
    "transform-origin",
    "height",
    "max-height",
    "overflow",
];

/// Remove the scale/transform/height/overflow constraints the on-screen
/// preview puts on the target so the capture sees its natural size. Width
/// and min-height stay.
pub fn strip_preview_constraints(target: &mut ElementNode) {
    if let Some(classes) = target.attributes.get("class") {
        let kept = classes
            .split_whitespace()
            .filter(|c| {
                *c != "transform" && !STRIPPED_CLASS_PREFIXES.iter().any(|p| c.starts_with(p))
            })
            .collect::<Vec<_>>()
            .join(" ");
        target.attributes.insert("class".to_string(), kept);
    }

    if let Some(style) = target.inline_style() {
        let kept = declarations(style)
            .filter(|(prop, _)| !STRIPPED_PROPERTIES.contains(prop))
            .map(|(prop, val)| format!("{prop}: {val}"))
            .collect::<Vec<_>>()
            .join("; ");
        target.attributes.insert("style".to_string(), kept);
    }
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

/// Capture the element `#target_id` of `document` as an RGBA bitmap covering
/// its full content extent.
pub async fn capture(
    document: &Document,
    target_id: &str,
    fonts: &FontManager,
    options: &CaptureOptions,
) -> Result<RgbaImage, ExportError> {
    if !options.scale.is_finite() || options.scale < MIN_SCALE {
        return Err(ExportError::Capture(format!(
            "scale {} is below the minimum of {MIN_SCALE}",
            options.scale
        )));
    }

    let target = document
        .find_by_id(target_id)
        .ok_or_else(|| ExportError::RenderTargetMissing(target_id.to_string()))?;

    settle(document.readiness(), options.settle_delay).await;

    let mut target = target.clone();
    strip_preview_constraints(&mut target);

    // Styled without a parent so the page theme cannot leak in.
    let styled = build_styled_tree(&[DomNode::Element(target)], None);
    let viewport = match styled.first() {
        Some(StyledNode::Element { style, .. }) => match style.width {
            Dimension::Px(w) if w > 0.0 => w,
            _ => DEFAULT_VIEWPORT_WIDTH,
        },
        _ => DEFAULT_VIEWPORT_WIDTH,
    };

    let layout = compute_layout(&styled, viewport, fonts)
        .map_err(|e| ExportError::Capture(format!("layout failed: {e}")))?;

    let width = (layout.width * options.scale).ceil() as u32;
    let height = (layout.height * options.scale).ceil() as u32;
    if width == 0 || height == 0 {
        return Err(ExportError::Capture("render target has no size".to_string()));
    }
    if let Some(limit) = options.max_dimension {
        if width > limit || height > limit {
            return Err(ExportError::Capture(format!(
                "capture of {width}x{height} px exceeds the {limit} px limit"
            )));
        }
    }

    log::info!(
        "Capturing #{target_id}: {:.0}x{:.0} px at {}x -> {width}x{height}",
        layout.width,
        layout.height,
        options.scale
    );
    raster::paint(&layout, fonts, options.scale, width, height)
}

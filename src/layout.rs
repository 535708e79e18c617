//! Layout engine – uses Taffy to compute flexbox layout from a styled DOM
//! tree, then converts the result into a tree of positioned boxes covering the
//! full content extent.

use std::collections::{BTreeMap, HashMap};

use taffy::prelude::*;
use taffy::TaffyResult;

use crate::dom::Tag;
use crate::fonts::{wrap_text, FontKey, FontManager};
use crate::style::{self as css, ComputedStyle, FontStyle as CssFontStyle, FontWeight, StyledNode};

/// A positioned box in document pixels.
#[derive(Debug, Clone)]
pub struct PositionedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub style: ComputedStyle,
    pub content: BoxContent,
    pub children: Vec<PositionedBox>,
}

impl PositionedBox {
    /// Origin and width of the area inside border and padding.
    pub fn content_origin(&self) -> (f32, f32, f32) {
        let s = &self.style;
        (
            self.x + s.border.left + s.padding.left,
            self.y + s.border.top + s.padding.top,
            (self.width - s.border.horizontal() - s.padding.horizontal()).max(0.0),
        )
    }

    /// Depth-first walk over this box and its descendants.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a PositionedBox)) {
        f(self);
        for c in &self.children {
            c.walk(f);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoxContent {
    None,
    Text { lines: Vec<String> },
    Image { src: String },
    Icon { kind: String, filled: bool },
}

/// Laid-out tree plus its full extent in px.
#[derive(Debug, Clone)]
pub struct Layout {
    pub boxes: Vec<PositionedBox>,
    pub width: f32,
    pub height: f32,
}

pub fn font_key(style: &ComputedStyle) -> FontKey {
    FontKey::new(
        &style.font_family,
        style.font_weight == FontWeight::Bold,
        style.font_style == CssFontStyle::Italic,
    )
}

// ---------------------------------------------------------------------------
// Build Taffy tree from styled nodes
// ---------------------------------------------------------------------------

struct LayoutBuilder<'a> {
    taffy: TaffyTree<()>,
    fonts: &'a FontManager,
    node_styles: HashMap<NodeId, ComputedStyle>,
    node_content: HashMap<NodeId, BoxContent>,
}

impl<'a> LayoutBuilder<'a> {
    fn new(fonts: &'a FontManager) -> Self {
        Self {
            taffy: TaffyTree::new(),
            fonts,
            node_styles: HashMap::new(),
            node_content: HashMap::new(),
        }
    }

    fn collect_inline_text(node: &StyledNode) -> String {
        match node {
            StyledNode::Text { text, .. } => text.clone(),
            StyledNode::Element { children, .. } => {
                children.iter().map(Self::collect_inline_text).collect()
            }
        }
    }

    /// True when every child is text or an inline element holding only text.
    fn all_inline(children: &[StyledNode]) -> bool {
        children.iter().all(|c| match c {
            StyledNode::Text { .. } => true,
            StyledNode::Element {
                tag,
                style,
                children: gc,
                ..
            } => {
                style.display == css::Display::Inline
                    && !matches!(tag, Tag::I | Tag::Img)
                    && Self::all_inline(gc)
            }
        })
    }

    fn build_node(&mut self, styled: &StyledNode, parent_width: f32) -> TaffyResult<NodeId> {
        match styled {
            StyledNode::Text { text, style } => self.build_text_leaf(text, style, parent_width),
            StyledNode::Element {
                tag,
                style,
                children,
                attrs,
            } => self.build_element_node(tag, style, children, attrs, parent_width),
        }
    }

    /// A pre-wrapped text leaf. `style` may carry box properties when the
    /// leaf stands in for a whole paragraph.
    fn build_text_leaf(
        &mut self,
        text: &str,
        style: &ComputedStyle,
        parent_width: f32,
    ) -> TaffyResult<NodeId> {
        let key = font_key(style);
        let chrome_w = style.padding.horizontal() + style.border.horizontal();
        let chrome_h = style.padding.vertical() + style.border.vertical();
        let own_width = style.width.resolve(parent_width).unwrap_or(parent_width);
        let max_w = (own_width - chrome_w - style.margin.horizontal()).max(1.0);

        let text = style.text_transform.apply(text.trim());
        let lines = wrap_text(&text, style.font_size, &key, max_w, self.fonts);

        let text_width = lines
            .iter()
            .map(|l| self.fonts.measure_text_width(l, style.font_size, &key))
            .fold(0.0f32, f32::max);
        let line_h = self.fonts.line_height_px(style.font_size, style.line_height);
        let text_height = lines.len() as f32 * line_h;

        let mut ts = box_style(style);
        ts.display = taffy::Display::Block;
        ts.size = Size {
            width: dim_to_taffy(style.width),
            height: taffy::Dimension::Length(text_height + chrome_h),
        };
        ts.min_size = Size {
            width: taffy::Dimension::Length(text_width.ceil() + chrome_w),
            height: taffy::Dimension::Auto,
        };
        ts.flex_shrink = 0.0;

        let node = self.taffy.new_leaf(ts)?;
        self.node_styles.insert(node, style.clone());
        self.node_content.insert(node, BoxContent::Text { lines });
        Ok(node)
    }

    fn build_element_node(
        &mut self,
        tag: &Tag,
        style: &ComputedStyle,
        children: &[StyledNode],
        attrs: &BTreeMap<String, String>,
        parent_width: f32,
    ) -> TaffyResult<NodeId> {
        // Paragraph-like blocks with inline-only content become one wrapped run.
        if tag.is_paragraph() && !children.is_empty() && Self::all_inline(children) {
            let raw: String = children.iter().map(Self::collect_inline_text).collect();
            let combined = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            if !combined.is_empty() {
                return self.build_text_leaf(&combined, style, parent_width);
            }
        }

        match tag {
            Tag::I => return self.build_icon(style, attrs),
            Tag::Img => return self.build_image(style, attrs, parent_width),
            _ => {}
        }

        let my_width = style.width.resolve(parent_width).unwrap_or(parent_width)
            - style.margin.horizontal();
        let inner_width =
            (my_width - style.padding.horizontal() - style.border.horizontal()).max(1.0);

        let is_row = matches!(style.display, css::Display::Flex | css::Display::Inline)
            && style.flex_direction == css::FlexDirection::Row;
        let widths = if is_row {
            row_child_widths(style, children, inner_width)
        } else {
            vec![inner_width; children.len()]
        };

        let mut child_nodes = Vec::with_capacity(children.len());
        for (child, w) in children.iter().zip(widths) {
            child_nodes.push(self.build_node(child, w)?);
        }

        let node = self
            .taffy
            .new_with_children(container_style(style), &child_nodes)?;
        self.node_styles.insert(node, style.clone());
        Ok(node)
    }

    fn build_icon(
        &mut self,
        style: &ComputedStyle,
        attrs: &BTreeMap<String, String>,
    ) -> TaffyResult<NodeId> {
        let mut ts = box_style(style);
        let side = taffy::Dimension::Length(style.font_size);
        ts.size = Size {
            width: match style.width {
                css::Dimension::Auto => side,
                other => dim_to_taffy(other),
            },
            height: match style.height {
                css::Dimension::Auto => side,
                other => dim_to_taffy(other),
            },
        };
        ts.flex_shrink = 0.0;
        let node = self.taffy.new_leaf(ts)?;
        let classes = attrs.get("class").map(String::as_str).unwrap_or("");
        self.node_styles.insert(node, style.clone());
        self.node_content.insert(
            node,
            BoxContent::Icon {
                kind: attrs.get("data-icon").cloned().unwrap_or_default(),
                filled: !classes.split_whitespace().any(|c| c == "star-empty"),
            },
        );
        Ok(node)
    }

    fn build_image(
        &mut self,
        style: &ComputedStyle,
        attrs: &BTreeMap<String, String>,
        parent_width: f32,
    ) -> TaffyResult<NodeId> {
        let src = attrs.get("src").cloned().unwrap_or_default();
        let resolved = resolve_img_auto_dimensions(&src, style, parent_width);
        let effective = resolved.as_ref().unwrap_or(style);
        let mut ts = box_style(effective);
        ts.size = Size {
            width: dim_to_taffy(effective.width),
            height: dim_to_taffy(effective.height),
        };
        ts.flex_shrink = 0.0;
        let node = self.taffy.new_leaf(ts)?;
        self.node_styles.insert(node, effective.clone());
        self.node_content.insert(node, BoxContent::Image { src });
        Ok(node)
    }

    fn extract(&self, node: NodeId, offset_x: f32, offset_y: f32) -> TaffyResult<PositionedBox> {
        let layout = self.taffy.layout(node)?;
        let style = self.node_styles.get(&node).cloned().unwrap_or_default();
        let content = self
            .node_content
            .get(&node)
            .cloned()
            .unwrap_or(BoxContent::None);

        let x = offset_x + layout.location.x;
        let y = offset_y + layout.location.y;

        let children = self
            .taffy
            .children(node)?
            .into_iter()
            .map(|child| self.extract(child, x, y))
            .collect::<TaffyResult<Vec<_>>>()?;

        Ok(PositionedBox {
            x,
            y,
            width: layout.size.width,
            height: layout.size.height,
            style,
            content,
            children,
        })
    }
}

/// Estimate each flex-row child's width so text wraps at roughly the column
/// width it will get. Growing children share the remainder by weight.
fn row_child_widths(style: &ComputedStyle, children: &[StyledNode], inner: f32) -> Vec<f32> {
    let child_style = |c: &StyledNode| match c {
        StyledNode::Element { style, .. } => Some(style.clone()),
        StyledNode::Text { .. } => None,
    };
    let elements = children
        .iter()
        .filter(|c| matches!(c, StyledNode::Element { .. }))
        .count();
    let gaps = style.gap * elements.saturating_sub(1) as f32;
    let available = (inner - gaps).max(1.0);

    let total_grow: f32 = children
        .iter()
        .filter_map(child_style)
        .map(|s| s.flex_grow)
        .sum();

    if total_grow <= 0.0 {
        let share = (available / elements.max(1) as f32).max(1.0);
        return children
            .iter()
            .map(|c| match child_style(c) {
                Some(s) => s.width.resolve(inner).unwrap_or(share),
                None => available,
            })
            .collect();
    }

    let fixed: f32 = children
        .iter()
        .filter_map(child_style)
        .filter(|s| s.flex_grow <= 0.0)
        .filter_map(|s| s.width.resolve(inner))
        .sum();
    let remainder = (available - fixed).max(1.0);
    children
        .iter()
        .map(|c| match child_style(c) {
            Some(s) if s.flex_grow > 0.0 => (remainder * s.flex_grow / total_grow).max(1.0),
            Some(s) => s.width.resolve(inner).unwrap_or(remainder),
            None => remainder,
        })
        .collect()
}

/// Margin, padding, border and flex item properties shared by every node.
fn box_style(s: &ComputedStyle) -> Style {
    Style {
        margin: Rect {
            top: LengthPercentageAuto::Length(s.margin.top),
            right: LengthPercentageAuto::Length(s.margin.right),
            bottom: LengthPercentageAuto::Length(s.margin.bottom),
            left: LengthPercentageAuto::Length(s.margin.left),
        },
        padding: Rect {
            top: LengthPercentage::Length(s.padding.top),
            right: LengthPercentage::Length(s.padding.right),
            bottom: LengthPercentage::Length(s.padding.bottom),
            left: LengthPercentage::Length(s.padding.left),
        },
        border: Rect {
            top: LengthPercentage::Length(s.border.top),
            right: LengthPercentage::Length(s.border.right),
            bottom: LengthPercentage::Length(s.border.bottom),
            left: LengthPercentage::Length(s.border.left),
        },
        flex_grow: s.flex_grow,
        flex_shrink: s.flex_shrink,
        flex_basis: dim_to_taffy(s.flex_basis),
        ..Default::default()
    }
}

fn container_style(s: &ComputedStyle) -> Style {
    let mut ts = box_style(s);

    match s.display {
        css::Display::Flex => {
            ts.display = taffy::Display::Flex;
            ts.flex_direction = match s.flex_direction {
                css::FlexDirection::Row => taffy::FlexDirection::Row,
                css::FlexDirection::Column => taffy::FlexDirection::Column,
            };
            ts.flex_wrap = match s.flex_wrap {
                css::FlexWrap::NoWrap => taffy::FlexWrap::NoWrap,
                css::FlexWrap::Wrap => taffy::FlexWrap::Wrap,
            };
            ts.justify_content = Some(match s.justify_content {
                css::JustifyContent::Start => taffy::JustifyContent::Start,
                css::JustifyContent::End => taffy::JustifyContent::End,
                css::JustifyContent::Center => taffy::JustifyContent::Center,
                css::JustifyContent::SpaceBetween => taffy::JustifyContent::SpaceBetween,
            });
            ts.align_items = Some(match s.align_items {
                css::AlignItems::Start => taffy::AlignItems::Start,
                css::AlignItems::End => taffy::AlignItems::End,
                css::AlignItems::Center => taffy::AlignItems::Center,
                css::AlignItems::Stretch => taffy::AlignItems::Stretch,
            });
        }
        css::Display::Block => {
            // Blocks stack vertically; text alignment also centers block children.
            ts.display = taffy::Display::Flex;
            ts.flex_direction = taffy::FlexDirection::Column;
            if s.text_align == css::TextAlign::Center {
                ts.align_items = Some(taffy::AlignItems::Center);
            }
        }
        css::Display::Inline => {
            ts.display = taffy::Display::Flex;
            ts.flex_direction = taffy::FlexDirection::Row;
            ts.flex_wrap = taffy::FlexWrap::Wrap;
            ts.align_items = Some(taffy::AlignItems::Center);
        }
        css::Display::None => ts.display = taffy::Display::None,
    }

    ts.size = Size {
        width: dim_to_taffy(s.width),
        height: dim_to_taffy(s.height),
    };
    ts.min_size = Size {
        width: if s.flex_shrink > 0.0 || s.flex_grow > 0.0 {
            taffy::Dimension::Length(0.0)
        } else {
            dim_to_taffy(s.min_width)
        },
        height: dim_to_taffy(s.min_height),
    };
    ts.gap = Size {
        width: LengthPercentage::Length(s.gap),
        height: LengthPercentage::Length(s.gap),
    };
    ts
}

fn dim_to_taffy(d: css::Dimension) -> taffy::Dimension {
    match d {
        css::Dimension::Auto => taffy::Dimension::Auto,
        css::Dimension::Px(v) => taffy::Dimension::Length(v),
        css::Dimension::Percent(v) => taffy::Dimension::Percent(v / 100.0),
    }
}

/// Replace `Auto` width/height of a data-URI image with sizes derived from its
/// intrinsic dimensions. `None` when nothing needs resolving or the source is
/// not a decodable data URI.
fn resolve_img_auto_dimensions(
    src: &str,
    style: &ComputedStyle,
    parent_width: f32,
) -> Option<ComputedStyle> {
    let known_w = style.width.resolve(parent_width);
    let known_h = match style.height {
        css::Dimension::Px(v) => Some(v),
        _ => None,
    };
    if known_w.is_some() && known_h.is_some() {
        return None;
    }

    let img = crate::capture::decode_data_uri(src)?;
    let (px_w, px_h) = (img.width() as f32, img.height() as f32);
    if px_w == 0.0 || px_h == 0.0 {
        return None;
    }
    let aspect = px_w / px_h;

    let mut s = style.clone();
    match (known_w, known_h) {
        (Some(w), None) => s.height = css::Dimension::Px((w / aspect).max(1.0)),
        (None, Some(h)) => s.width = css::Dimension::Px((h * aspect).max(1.0)),
        _ => {
            s.width = css::Dimension::Px(px_w);
            s.height = css::Dimension::Px(px_h);
        }
    }
    Some(s)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Lay out `styled_nodes` inside a column of `viewport_width` px with
/// unbounded height, returning boxes in document coordinates and the full
/// content extent.
pub fn compute_layout(
    styled_nodes: &[StyledNode],
    viewport_width: f32,
    fonts: &FontManager,
) -> TaffyResult<Layout> {
    let mut builder = LayoutBuilder::new(fonts);

    let child_ids = styled_nodes
        .iter()
        .map(|node| builder.build_node(node, viewport_width))
        .collect::<TaffyResult<Vec<_>>>()?;

    let root_style = Style {
        display: taffy::Display::Flex,
        flex_direction: taffy::FlexDirection::Column,
        align_items: Some(taffy::AlignItems::Start),
        size: Size {
            width: taffy::Dimension::Length(viewport_width),
            height: taffy::Dimension::Auto,
        },
        ..Default::default()
    };
    let root = builder.taffy.new_with_children(root_style, &child_ids)?;

    builder.taffy.compute_layout(
        root,
        Size {
            width: AvailableSpace::Definite(viewport_width),
            height: AvailableSpace::MaxContent,
        },
    )?;

    let root_box = builder.extract(root, 0.0, 0.0)?;
    let mut width = root_box.width;
    let mut height = root_box.height;
    root_box.walk(&mut |b| {
        width = width.max(b.x + b.width);
        height = height.max(b.y + b.height);
    });

    Ok(Layout {
        boxes: root_box.children,
        width,
        height,
    })
}

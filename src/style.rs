//! Style resolver – maps Tailwind-like utility classes and a subset of inline
//! CSS to a flat [`ComputedStyle`] consumed by the layout engine and the
//! rasterizer.

use crate::dom::{DomNode, ElementNode, Tag};

/// Fully resolved style for a single element.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    // Display / layout
    pub display: Display,
    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Dimension,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub gap: f32,

    // Sizing
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub min_height: Dimension,

    // Box model (px)
    pub margin: Edges,
    pub padding: Edges,
    pub border: Edges,
    pub border_color: Color,
    pub border_radius: f32,

    // Typography
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_family: String,
    pub font_style: FontStyle,
    pub color: Color,
    pub text_align: TextAlign,
    pub text_transform: TextTransform,
    pub line_height: f32,

    // Background
    pub background_color: Color,
    pub gradient: Option<Gradient>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::NoWrap,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Dimension::Auto,
            justify_content: JustifyContent::Start,
            align_items: AlignItems::Stretch,
            gap: 0.0,
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            min_height: Dimension::Auto,
            margin: Edges::default(),
            padding: Edges::default(),
            border: Edges::default(),
            border_color: Color::from_hex("#e5e7eb").unwrap_or(Color::BLACK),
            border_radius: 0.0,
            font_size: 16.0,
            font_weight: FontWeight::Normal,
            font_family: SANS.to_string(),
            font_style: FontStyle::Normal,
            color: Color::BLACK,
            text_align: TextAlign::Left,
            text_transform: TextTransform::None,
            line_height: 1.4,
            background_color: Color::TRANSPARENT,
            gradient: None,
        }
    }
}

/// Family names understood by the font manager.
pub const SANS: &str = "Helvetica";
pub const SERIF: &str = "Times";

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Flex,
    Inline,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexWrap {
    NoWrap,
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustifyContent {
    Start,
    End,
    Center,
    SpaceBetween,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignItems {
    Start,
    End,
    Center,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTransform {
    None,
    Uppercase,
    Capitalize,
}

impl TextTransform {
    pub fn apply(self, text: &str) -> String {
        match self {
            TextTransform::None => text.to_string(),
            TextTransform::Uppercase => text.to_uppercase(),
            TextTransform::Capitalize => text
                .split(' ')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Auto,
    Px(f32),
    Percent(f32),
}

impl Dimension {
    /// Resolve against the containing block width.
    pub fn resolve(self, parent: f32) -> Option<f32> {
        match self {
            Dimension::Auto => None,
            Dimension::Px(v) => Some(v),
            Dimension::Percent(p) => Some(parent * p / 100.0),
        }
    }
}

/// Per-side lengths in px.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub fn uniform(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }

    /// Set one side selected by a Tailwind side letter (`t`, `r`, `b`, `l`,
    /// `x`, `y`) or all sides for an empty selector.
    fn set(&mut self, side: &str, v: f32) {
        match side {
            "" => *self = Edges::uniform(v),
            "t" => self.top = v,
            "r" => self.right = v,
            "b" => self.bottom = v,
            "l" => self.left = v,
            "x" => {
                self.left = v;
                self.right = v;
            }
            "y" => {
                self.top = v;
                self.bottom = v;
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientDirection {
    ToRight,
    ToBottom,
}

/// Two-stop linear gradient (`bg-gradient-to-r from-X to-Y`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    pub direction: GradientDirection,
    pub from: Color,
    pub to: Color,
}

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn is_transparent(&self) -> bool {
        self.a < 0.001
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
        match hex.len() {
            6 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: 1.0,
            }),
            3 => Some(Self {
                r: channel(&hex[0..1].repeat(2))?,
                g: channel(&hex[1..2].repeat(2))?,
                b: channel(&hex[2..3].repeat(2))?,
                a: 1.0,
            }),
            _ => None,
        }
    }

    /// Parse a CSS colour value: hex or one of the palette names.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('#') {
            return Self::from_hex(value);
        }
        match value {
            "white" => Some(Self::WHITE),
            "black" => Some(Self::BLACK),
            "transparent" => Some(Self::TRANSPARENT),
            _ => None,
        }
    }
}

/// Tailwind palette subset used by the resume templates.
pub fn palette(name: &str) -> Option<Color> {
    let hex = match name {
        "white" => return Some(Color::WHITE),
        "black" => return Some(Color::BLACK),
        "gray-50" => "#f9fafb",
        "gray-100" => "#f3f4f6",
        "gray-200" => "#e5e7eb",
        "gray-300" => "#d1d5db",
        "gray-500" => "#6b7280",
        "gray-600" => "#4b5563",
        "gray-700" => "#374151",
        "gray-800" => "#1f2937",
        "gray-900" => "#111827",
        "blue-100" => "#dbeafe",
        "blue-500" => "#3b82f6",
        "blue-600" => "#2563eb",
        "blue-700" => "#1d4ed8",
        "blue-800" => "#1e40af",
        "purple-50" => "#faf5ff",
        "purple-100" => "#f3e8ff",
        "purple-200" => "#e9d5ff",
        "purple-300" => "#d8b4fe",
        "purple-400" => "#c084fc",
        "purple-600" => "#9333ea",
        "purple-800" => "#6b21a8",
        "pink-50" => "#fdf2f8",
        "yellow-300" => "#fde047",
        _ => return None,
    };
    Color::from_hex(hex)
}

// ---------------------------------------------------------------------------
// Style resolution
// ---------------------------------------------------------------------------

/// Resolve the style for an element, inheriting text properties from its parent.
pub fn resolve_style(element: &ElementNode, parent: Option<&ComputedStyle>) -> ComputedStyle {
    let mut style = base_style_for_tag(&element.tag);

    if let Some(p) = parent {
        style.font_size = p.font_size;
        style.font_weight = p.font_weight;
        style.font_family = p.font_family.clone();
        style.font_style = p.font_style;
        style.color = p.color;
        style.text_align = p.text_align;
        style.text_transform = p.text_transform;
        style.line_height = p.line_height;
        // Headings and <strong> keep their own weight.
        if element.tag.is_heading() || element.tag == Tag::Strong {
            style.font_weight = FontWeight::Bold;
        }
    }

    for class in element.classes() {
        apply_utility_class(&mut style, class);
    }

    if let Some(inline) = element.inline_style() {
        apply_inline_style(&mut style, inline);
    }

    style
}

fn base_style_for_tag(tag: &Tag) -> ComputedStyle {
    let mut s = ComputedStyle::default();
    match tag {
        Tag::H1 => {
            s.font_size = 32.0;
            s.font_weight = FontWeight::Bold;
        }
        Tag::H2 => {
            s.font_size = 24.0;
            s.font_weight = FontWeight::Bold;
        }
        Tag::H3 => {
            s.font_size = 18.0;
            s.font_weight = FontWeight::Bold;
        }
        Tag::Strong => {
            s.display = Display::Inline;
            s.font_weight = FontWeight::Bold;
        }
        Tag::Span | Tag::I | Tag::Img => s.display = Display::Inline,
        Tag::Div | Tag::Section | Tag::P | Tag::Body => {}
    }
    s
}

/// Apply a single utility class.
fn apply_utility_class(s: &mut ComputedStyle, class: &str) {
    match class {
        "flex" => s.display = Display::Flex,
        "block" => s.display = Display::Block,
        "inline" | "inline-block" => s.display = Display::Inline,
        "hidden" => s.display = Display::None,

        "flex-row" => s.flex_direction = FlexDirection::Row,
        "flex-col" => s.flex_direction = FlexDirection::Column,
        "flex-wrap" => s.flex_wrap = FlexWrap::Wrap,
        "flex-shrink-0" | "shrink-0" => s.flex_shrink = 0.0,

        "justify-start" => s.justify_content = JustifyContent::Start,
        "justify-end" => s.justify_content = JustifyContent::End,
        "justify-center" => s.justify_content = JustifyContent::Center,
        "justify-between" => s.justify_content = JustifyContent::SpaceBetween,

        "items-start" => s.align_items = AlignItems::Start,
        "items-end" => s.align_items = AlignItems::End,
        "items-center" => s.align_items = AlignItems::Center,
        "items-stretch" => s.align_items = AlignItems::Stretch,

        "font-bold" | "font-semibold" => s.font_weight = FontWeight::Bold,
        "font-normal" | "font-medium" => s.font_weight = FontWeight::Normal,
        "font-sans" => s.font_family = SANS.to_string(),
        "font-serif" => s.font_family = SERIF.to_string(),
        "italic" => s.font_style = FontStyle::Italic,

        "text-left" => s.text_align = TextAlign::Left,
        "text-center" => s.text_align = TextAlign::Center,
        "text-right" => s.text_align = TextAlign::Right,
        "uppercase" => s.text_transform = TextTransform::Uppercase,
        "capitalize" => s.text_transform = TextTransform::Capitalize,
        "normal-case" => s.text_transform = TextTransform::None,

        "text-xs" => s.font_size = 12.0,
        "text-sm" => s.font_size = 14.0,
        "text-base" => s.font_size = 16.0,
        "text-lg" => s.font_size = 18.0,
        "text-xl" => s.font_size = 20.0,
        "text-2xl" => s.font_size = 24.0,
        "text-3xl" => s.font_size = 30.0,
        "text-4xl" => s.font_size = 36.0,

        "leading-tight" => s.line_height = 1.25,
        "leading-normal" => s.line_height = 1.5,
        "leading-relaxed" => s.line_height = 1.625,

        "w-full" => s.width = Dimension::Percent(100.0),
        "w-auto" => s.width = Dimension::Auto,
        "h-full" => s.height = Dimension::Percent(100.0),

        "border" => s.border = Edges::uniform(1.0),
        "rounded-none" => s.border_radius = 0.0,
        "rounded" => s.border_radius = 4.0,
        "rounded-md" => s.border_radius = 6.0,
        "rounded-lg" => s.border_radius = 8.0,
        "rounded-full" => s.border_radius = f32::INFINITY,

        "bg-gradient-to-r" => set_gradient_direction(s, GradientDirection::ToRight),
        "bg-gradient-to-b" => set_gradient_direction(s, GradientDirection::ToBottom),

        _ => {
            // Dynamic patterns; each returns true once it has consumed the class.
            let _ = try_spacing_class(s, class)
                || try_border_class(s, class)
                || try_color_class(s, class)
                || try_size_class(s, class)
                || try_flex_class(s, class)
                || try_opacity_class(s, class);
        }
    }
}

fn set_gradient_direction(s: &mut ComputedStyle, direction: GradientDirection) {
    let g = s.gradient.get_or_insert(Gradient {
        direction,
        from: Color::TRANSPARENT,
        to: Color::TRANSPARENT,
    });
    g.direction = direction;
}

/// `p-4`, `px-2`, `mt-1`, `gap-6` … (1 unit = 4px)
fn try_spacing_class(s: &mut ComputedStyle, class: &str) -> bool {
    let Some((prefix, value)) = class.rsplit_once('-') else {
        return false;
    };
    let Ok(units) = value.parse::<f32>() else {
        return false;
    };
    let px = units * 4.0;
    if prefix.is_empty() || !prefix.is_char_boundary(1) {
        return false;
    }
    if prefix == "gap" {
        s.gap = px;
        return true;
    }
    let (target, side) = match prefix.split_at(1) {
        ("p", side) => (&mut s.padding, side),
        ("m", side) => (&mut s.margin, side),
        _ => return false,
    };
    if !matches!(side, "" | "t" | "r" | "b" | "l" | "x" | "y") {
        return false;
    }
    target.set(side, px);
    true
}

/// `border-b`, `border-b-2`, `border-l-4`, `border-2`.
fn try_border_class(s: &mut ComputedStyle, class: &str) -> bool {
    let Some(rest) = class.strip_prefix("border-") else {
        return false;
    };
    let (side, width) = match rest.split_once('-') {
        Some((side, w)) if side.len() == 1 => match w.parse::<f32>() {
            Ok(w) => (side, w),
            Err(_) => return false,
        },
        _ if rest.len() == 1 => (rest, 1.0),
        _ => match rest.parse::<f32>() {
            Ok(w) => ("", w),
            Err(_) => return false,
        },
    };
    if !matches!(side, "" | "t" | "r" | "b" | "l" | "x" | "y") {
        return false;
    }
    s.border.set(side, width);
    true
}

/// `text-{color}`, `bg-{color}`, `border-{color}`, `from-{color}`, `to-{color}`.
fn try_color_class(s: &mut ComputedStyle, class: &str) -> bool {
    let Some((prefix, name)) = class.split_once('-') else {
        return false;
    };
    let Some(color) = palette(name) else {
        return false;
    };
    match prefix {
        "text" => s.color = color,
        "bg" => s.background_color = color,
        "border" => s.border_color = color,
        "from" | "to" => {
            let g = s.gradient.get_or_insert(Gradient {
                direction: GradientDirection::ToRight,
                from: color,
                to: color,
            });
            if prefix == "from" {
                g.from = color;
            } else {
                g.to = color;
            }
        }
        _ => return false,
    }
    true
}

/// `w-32`, `h-96`, `min-h-0`, `w-1/2`, `w-2/3`.
fn try_size_class(s: &mut ComputedStyle, class: &str) -> bool {
    let (target, value) = if let Some(v) = class.strip_prefix("min-h-") {
        (&mut s.min_height, v)
    } else if let Some(v) = class.strip_prefix("w-") {
        (&mut s.width, v)
    } else if let Some(v) = class.strip_prefix("h-") {
        (&mut s.height, v)
    } else {
        return false;
    };
    if let Some((num, den)) = value.split_once('/') {
        match (num.parse::<f32>(), den.parse::<f32>()) {
            (Ok(n), Ok(d)) if d > 0.0 => *target = Dimension::Percent(n / d * 100.0),
            _ => return false,
        }
    } else {
        match value.parse::<f32>() {
            Ok(v) => *target = Dimension::Px(v * 4.0),
            Err(_) => return false,
        }
    }
    true
}

/// `flex-1`, `flex-2`: grow by weight from a zero basis.
fn try_flex_class(s: &mut ComputedStyle, class: &str) -> bool {
    let Some(weight) = class
        .strip_prefix("flex-")
        .and_then(|w| w.parse::<f32>().ok())
    else {
        return false;
    };
    s.flex_grow = weight;
    s.flex_shrink = 1.0;
    s.flex_basis = Dimension::Px(0.0);
    true
}

/// `bg-opacity-20`
fn try_opacity_class(s: &mut ComputedStyle, class: &str) -> bool {
    let Some(pct) = class
        .strip_prefix("bg-opacity-")
        .and_then(|v| v.parse::<f32>().ok())
    else {
        return false;
    };
    s.background_color = s.background_color.with_alpha(pct / 100.0);
    true
}

// ---------------------------------------------------------------------------
// Inline style parsing (limited subset)
// ---------------------------------------------------------------------------

/// Split `prop: value; …` into trimmed pairs.
pub fn declarations(style_str: &str) -> impl Iterator<Item = (&str, &str)> {
    style_str.split(';').filter_map(|decl| {
        let (prop, val) = decl.split_once(':')?;
        let prop = prop.trim();
        (!prop.is_empty()).then(|| (prop, val.trim()))
    })
}

fn apply_inline_style(s: &mut ComputedStyle, style_str: &str) {
    for (prop, val) in declarations(style_str) {
        apply_css_property(s, prop, val);
    }
}

fn apply_css_property(s: &mut ComputedStyle, prop: &str, val: &str) {
    match prop {
        "display" => {
            s.display = match val {
                "flex" => Display::Flex,
                "block" => Display::Block,
                "inline" | "inline-block" => Display::Inline,
                "none" => Display::None,
                _ => s.display,
            }
        }
        "flex-direction" => {
            s.flex_direction = match val {
                "column" => FlexDirection::Column,
                _ => FlexDirection::Row,
            }
        }
        "font-size" => {
            if let Some(px) = parse_px(val) {
                s.font_size = px;
            }
        }
        "font-weight" => {
            s.font_weight = match val {
                "bold" | "600" | "700" | "800" | "900" => FontWeight::Bold,
                _ => FontWeight::Normal,
            }
        }
        "font-family" => {
            let lower = val.to_ascii_lowercase();
            s.font_family = if lower.contains("serif") && !lower.contains("sans") {
                SERIF.to_string()
            } else {
                SANS.to_string()
            };
        }
        "color" => {
            if let Some(c) = Color::parse(val) {
                s.color = c;
            }
        }
        "background-color" | "background" => {
            if let Some(c) = Color::parse(val) {
                s.background_color = c;
            }
        }
        "text-align" => {
            s.text_align = match val {
                "center" => TextAlign::Center,
                "right" => TextAlign::Right,
                _ => TextAlign::Left,
            }
        }
        "width" => s.width = parse_dimension(val),
        "height" => s.height = parse_dimension(val),
        "min-height" => s.min_height = parse_dimension(val),
        "margin" => apply_shorthand(val, &mut s.margin),
        "padding" => apply_shorthand(val, &mut s.padding),
        "line-height" => {
            if let Ok(v) = val.parse::<f32>() {
                s.line_height = v;
            } else if let Some(px) = parse_px(val) {
                s.line_height = px / s.font_size;
            }
        }
        "gap" => {
            if let Some(px) = parse_px(val) {
                s.gap = px;
            }
        }
        _ => {}
    }
}

fn parse_px(s: &str) -> Option<f32> {
    s.trim().trim_end_matches("px").parse().ok()
}

fn parse_dimension(s: &str) -> Dimension {
    let s = s.trim();
    if let Some(pct) = s.strip_suffix('%') {
        pct.parse().map(Dimension::Percent).unwrap_or(Dimension::Auto)
    } else if let Some(mm) = s.strip_suffix("mm") {
        // 96 DPI: 1mm = 3.7795px
        mm.parse::<f32>()
            .map(|v| Dimension::Px(v * 96.0 / 25.4))
            .unwrap_or(Dimension::Auto)
    } else {
        parse_px(s).map(Dimension::Px).unwrap_or(Dimension::Auto)
    }
}

fn apply_shorthand(val: &str, edges: &mut Edges) {
    let parts: Vec<f32> = val.split_whitespace().filter_map(parse_px).collect();
    match parts[..] {
        [all] => *edges = Edges::uniform(all),
        [v, h] => {
            *edges = Edges {
                top: v,
                right: h,
                bottom: v,
                left: h,
            }
        }
        [top, right, bottom, left] => {
            *edges = Edges {
                top,
                right,
                bottom,
                left,
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Styled DOM tree
// ---------------------------------------------------------------------------

/// A DOM node annotated with its computed style.
#[derive(Debug, Clone)]
pub enum StyledNode {
    Element {
        tag: Tag,
        style: ComputedStyle,
        children: Vec<StyledNode>,
        /// Original attributes (image src, icon kind, …)
        attrs: std::collections::BTreeMap<String, String>,
    },
    Text {
        text: String,
        style: ComputedStyle,
    },
}

/// Build a styled tree from a DOM tree, resolving styles top-down.
pub fn build_styled_tree(
    nodes: &[DomNode],
    parent_style: Option<&ComputedStyle>,
) -> Vec<StyledNode> {
    let mut result = Vec::new();
    for node in nodes {
        match node {
            DomNode::Element(e) => {
                let style = resolve_style(e, parent_style);
                let children = build_styled_tree(&e.children, Some(&style));
                result.push(StyledNode::Element {
                    tag: e.tag.clone(),
                    style,
                    children,
                    attrs: e.attributes.clone(),
                });
            }
            DomNode::Text(text) if !text.trim().is_empty() => {
                let inherited = parent_style.cloned().unwrap_or_default();
                // Text runs inherit typography only; box properties stay on
                // the element that declared them.
                let style = ComputedStyle {
                    font_size: inherited.font_size,
                    font_weight: inherited.font_weight,
                    font_family: inherited.font_family,
                    font_style: inherited.font_style,
                    color: inherited.color,
                    text_align: inherited.text_align,
                    text_transform: inherited.text_transform,
                    line_height: inherited.line_height,
                    display: Display::Inline,
                    ..ComputedStyle::default()
                };
                result.push(StyledNode::Text {
                    text: text.clone(),
                    style,
                });
            }
            DomNode::Text(_) => {}
        }
    }
    result
}

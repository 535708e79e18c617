//! Visual document tree – the output of the template renderer and the input
//! of the rasterizer.
//!
//! We support a controlled subset of elements:
//! - Structural: div, section, p, h1-h3, img
//! - Inline: span, strong
//! - Icons: `<i data-icon="star">` glyphs drawn by the rasterizer
//! - Styling via `class` and `style` attributes

use std::collections::BTreeMap;

use crate::capture::ReadinessSignal;

// ---------------------------------------------------------------------------
// DOM types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Div,
    Section,
    P,
    H1,
    H2,
    H3,
    Span,
    Strong,
    I,
    Img,
    Body,
}

impl Tag {
    pub fn name(&self) -> &'static str {
        match self {
            Tag::Div => "div",
            Tag::Section => "section",
            Tag::P => "p",
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::Span => "span",
            Tag::Strong => "strong",
            Tag::I => "i",
            Tag::Img => "img",
            Tag::Body => "body",
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, Tag::H1 | Tag::H2 | Tag::H3)
    }

    /// Block whose inline content is merged into one wrapped text run.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Tag::P | Tag::H1 | Tag::H2 | Tag::H3)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Img | Tag::I)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomNode {
    Element(ElementNode),
    Text(String),
}

/// An element node carrying tag, attributes, and children.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub tag: Tag,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<DomNode>,
}

impl ElementNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    // -- builder ------------------------------------------------------------

    /// Append utility classes (space separated).
    pub fn class(mut self, classes: &str) -> Self {
        let merged = match self.attributes.get("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {classes}"),
            _ => classes.to_string(),
        };
        self.attributes.insert("class".to_string(), merged);
        self
    }

    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn style(self, declarations: &str) -> Self {
        self.attr("style", declarations)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(DomNode::Text(text.into()));
        self
    }

    pub fn child(mut self, child: ElementNode) -> Self {
        self.children.push(DomNode::Element(child));
        self
    }

    /// Append a child only when present; used for optional sections.
    pub fn child_opt(self, child: Option<ElementNode>) -> Self {
        match child {
            Some(c) => self.child(c),
            None => self,
        }
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ElementNode>) -> Self {
        self.children
            .extend(children.into_iter().map(DomNode::Element));
        self
    }

    pub fn push(&mut self, child: ElementNode) {
        self.children.push(DomNode::Element(child));
    }

    // -- queries ------------------------------------------------------------

    pub fn classes(&self) -> Vec<&str> {
        self.attributes
            .get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().contains(&class)
    }

    pub fn inline_style(&self) -> Option<&str> {
        self.attributes.get("style").map(|s| s.as_str())
    }

    pub fn src(&self) -> Option<&str> {
        self.attributes.get("src").map(|s| s.as_str())
    }

    pub fn element_id(&self) -> Option<&str> {
        self.attributes.get("id").map(|s| s.as_str())
    }

    /// Depth-first search for the element carrying `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&ElementNode> {
        if self.element_id() == Some(id) {
            return Some(self);
        }
        self.child_elements().find_map(|c| c.find_by_id(id))
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(|c| match c {
            DomNode::Element(e) => Some(e),
            DomNode::Text(_) => None,
        })
    }

    /// All descendant elements (including `self`) matching `pred`, in
    /// document order.
    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&ElementNode) -> bool) -> Vec<&'a ElementNode> {
        let mut out = Vec::new();
        self.collect_matching(pred, &mut out);
        out
    }

    fn collect_matching<'a>(
        &'a self,
        pred: &dyn Fn(&ElementNode) -> bool,
        out: &mut Vec<&'a ElementNode>,
    ) {
        if pred(self) {
            out.push(self);
        }
        for c in self.child_elements() {
            c.collect_matching(pred, out);
        }
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self) -> String {
        let mut s = String::new();
        for c in &self.children {
            match c {
                DomNode::Text(t) => s.push_str(t),
                DomNode::Element(e) => s.push_str(&e.text_content()),
            }
        }
        s
    }
}

// ---------------------------------------------------------------------------
// Builder shorthands
// ---------------------------------------------------------------------------

pub fn div(classes: &str) -> ElementNode {
    ElementNode::new(Tag::Div).class(classes)
}

pub fn section(classes: &str) -> ElementNode {
    ElementNode::new(Tag::Section).class(classes)
}

pub fn span(classes: &str, text: impl Into<String>) -> ElementNode {
    ElementNode::new(Tag::Span).class(classes).text(text)
}

/// Text element of any tag.
pub fn text_el(tag: Tag, classes: &str, text: impl Into<String>) -> ElementNode {
    ElementNode::new(tag).class(classes).text(text)
}

/// Icon glyph drawn by the rasterizer (`star`, `dot`).
pub fn icon(kind: &str, classes: &str) -> ElementNode {
    ElementNode::new(Tag::I).attr("data-icon", kind).class(classes)
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Visual theme of the surrounding UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// The live page that render targets are attached to.
#[derive(Debug, Clone)]
pub struct Document {
    pub theme: Theme,
    pub body: ElementNode,
    readiness: Option<ReadinessSignal>,
}

impl Document {
    pub fn new(theme: Theme) -> Self {
        let body = match theme {
            Theme::Light => ElementNode::new(Tag::Body).class("bg-gray-50 text-gray-900"),
            Theme::Dark => ElementNode::new(Tag::Body).class("bg-gray-900 text-white"),
        };
        Self {
            theme,
            body,
            readiness: None,
        }
    }

    pub fn attach(&mut self, element: ElementNode) {
        self.body.push(element);
    }

    pub fn find_by_id(&self, id: &str) -> Option<&ElementNode> {
        self.body.find_by_id(id)
    }

    /// Signal that fires once pending style/font work has settled.
    pub fn set_readiness(&mut self, signal: ReadinessSignal) {
        self.readiness = Some(signal);
    }

    pub fn readiness(&self) -> Option<&ReadinessSignal> {
        self.readiness.as_ref()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n<html>\n");
        write_element(&self.body, &mut out);
        out.push_str("\n</html>\n");
        out
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Serialize an element subtree to HTML.
pub fn to_html(element: &ElementNode) -> String {
    let mut out = String::new();
    write_element(element, &mut out);
    out
}

fn write_element(e: &ElementNode, out: &mut String) {
    out.push('<');
    out.push_str(e.tag.name());
    for (k, v) in &e.attributes {
        out.push(' ');
        out.push_str(k);
        out.push_str("=\"");
        out.push_str(&escape(v));
        out.push('"');
    }
    if e.tag == Tag::Img {
        out.push_str(" />");
        return;
    }
    out.push('>');
    for c in &e.children {
        match c {
            DomNode::Text(t) => out.push_str(&escape(t)),
            DomNode::Element(child) => write_element(child, out),
        }
    }
    out.push_str("</");
    out.push_str(e.tag.name());
    out.push('>');
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_merges_classes() {
        let e = div("flex p-4").class("gap-2");
        assert_eq!(e.classes(), vec!["flex", "p-4", "gap-2"]);
        assert!(e.has_class("gap-2"));
    }

    #[test]
    fn find_by_id_searches_descendants() {
        let mut doc = Document::new(Theme::Light);
        doc.attach(div("p-4").child(div("").id("target").text("hi")));
        let found = doc.find_by_id("target").unwrap();
        assert_eq!(found.text_content(), "hi");
        assert!(doc.find_by_id("missing").is_none());
    }

    #[test]
    fn html_is_escaped() {
        let e = text_el(Tag::P, "text-sm", "R&D <lead>");
        assert_eq!(to_html(&e), r#"<p class="text-sm">R&amp;D &lt;lead&gt;</p>"#);
    }

    #[test]
    fn img_is_self_closing() {
        let e = ElementNode::new(Tag::Img).attr("src", "a.png");
        assert_eq!(to_html(&e), r#"<img src="a.png" />"#);
    }

    #[test]
    fn find_all_is_document_order() {
        let tree = div("").child(text_el(Tag::H2, "", "A")).child(div("").child(text_el(Tag::H2, "", "B")));
        let heads: Vec<_> = tree
            .find_all(&|e| e.tag == Tag::H2)
            .into_iter()
            .map(|e| e.text_content())
            .collect();
        assert_eq!(heads, vec!["A", "B"]);
    }
}

//! In-memory SVG document implementing [`RenderSurface`].
//!
//! Holds the country shapes of the artwork, the marker and highlight-ring
//! templates, and every element the widget appends. `to_svg()` serializes
//! the current state to a standalone document, so a headless run produces
//! the same picture a browser binding would.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use glam::DVec2;

use crate::surface::{
    Frame, RenderSurface, Selector, Template, ATTR_CODE, ATTR_INDEX, CLASS_OUTER_RING,
};

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

const OCEAN: &str = "#0c1a2e";
const LAND: &str = "#1d3461";
const LAND_STROKE: &str = "#2d4a7a";
const LAND_SELECTED: &str = "#3b6fb6";
const MARKER: &str = "#fde047";
const RING: &str = "#c084fc";

const R_MARKER: f64 = 5.0;

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Country,
    Circle,
}

#[derive(Debug, Clone)]
struct Node {
    kind: Kind,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    attached: bool,
}

impl Node {
    fn circle(r: f64, classes: &[&str]) -> Self {
        let mut attrs = BTreeMap::new();
        attrs.insert("r".to_owned(), r.to_string());
        Self {
            kind: Kind::Circle,
            attrs,
            classes: classes.iter().map(|c| (*c).to_owned()).collect(),
            attached: false,
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn is_marker(&self) -> bool {
        self.kind == Kind::Circle && !self.has_class(CLASS_OUTER_RING)
    }

    fn is_ring(&self) -> bool {
        self.kind == Kind::Circle && self.has_class(CLASS_OUTER_RING)
    }
}

#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    frames: HashMap<Frame, DVec2>,
    templates: HashMap<Template, Node>,
    nodes: Vec<Option<Node>>,
    // Slots emptied by `remove`, reused by the next clone.
    free: Vec<usize>,
    // Append order of circles; countries render in insertion order.
    layer: Vec<ElementId>,
}

impl SvgSurface {
    /// Empty document for artwork of the given native size, with both
    /// templates present and no frames measured yet.
    pub fn new(width: f64, height: f64) -> Self {
        let mut templates = HashMap::new();
        templates.insert(Template::Marker, Node::circle(R_MARKER, &["world-map-marker"]));
        templates.insert(
            Template::OuterRing,
            Node::circle(0.0, &["world-map-marker", CLASS_OUTER_RING]),
        );
        Self {
            width,
            height,
            frames: HashMap::new(),
            templates,
            nodes: Vec::new(),
            free: Vec::new(),
            layer: Vec::new(),
        }
    }

    /// Adds a country shape with SVG path data.
    pub fn with_country(mut self, code: &str, path: &str) -> Self {
        let mut attrs = BTreeMap::new();
        attrs.insert(ATTR_CODE.to_owned(), code.to_owned());
        attrs.insert("d".to_owned(), path.to_owned());
        self.nodes.push(Some(Node { kind: Kind::Country, attrs, classes: Vec::new(), attached: true }));
        self
    }

    /// Adds placeholder shapes for every code, for hosts without geometry.
    pub fn with_countries<'a>(self, codes: impl IntoIterator<Item = &'a str>) -> Self {
        codes.into_iter().fold(self, |s, code| s.with_country(code, ""))
    }

    pub fn without_template(mut self, template: Template) -> Self {
        self.templates.remove(&template);
        self
    }

    /// Sets the measured size of a frame; `None` models an unmounted node.
    pub fn set_frame_size(&mut self, frame: Frame, size: Option<DVec2>) {
        match size {
            Some(size) => self.frames.insert(frame, size),
            None => self.frames.remove(&frame),
        };
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn attached(&self) -> impl Iterator<Item = (ElementId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().filter(|n| n.attached).map(|n| (ElementId(i), n)))
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    pub fn to_svg(&self) -> String {
        let (w, h) = (self.width, self.height);
        let mut s = String::with_capacity(4096);

        let _ = write!(
            s,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
  <style>
    .world-map-country.selected {{ fill: {LAND_SELECTED}; }}
  </style>
  <rect width='{w}' height='{h}' fill='{OCEAN}'/>
"#
        );

        s.push_str(&format!("  <g fill='{LAND}' stroke='{LAND_STROKE}' stroke-width='0.5'>\n"));
        for (_, node) in self.attached().filter(|(_, n)| n.kind == Kind::Country) {
            s.push_str("    <path");
            push_class(&mut s, "world-map-country", &node.classes);
            push_attrs(&mut s, &node.attrs);
            s.push_str("/>\n");
        }
        s.push_str("  </g>\n");

        s.push_str("  <g class='marker-wrap' stroke='#0c1a2e' stroke-width='0.6'>\n");
        for &id in &self.layer {
            let Some(node) = self.node(id).filter(|n| n.attached) else { continue };
            s.push_str("    <circle");
            push_class(&mut s, "", &node.classes);
            push_attrs(&mut s, &node.attrs);
            if node.is_ring() {
                s.push_str(&format!(" fill='{RING}' fill-opacity='0.35'/>\n"));
            } else {
                s.push_str(&format!(" fill='{MARKER}'/>\n"));
            }
        }
        s.push_str("  </g>\n");

        s.push_str("</svg>\n");
        s
    }
}

fn push_class(s: &mut String, base: &str, classes: &[String]) {
    let mut all: Vec<&str> = Vec::with_capacity(classes.len() + 1);
    if !base.is_empty() {
        all.push(base);
    }
    all.extend(classes.iter().map(String::as_str));
    if !all.is_empty() {
        let _ = write!(s, " class='{}'", escape(&all.join(" ")));
    }
}

fn push_attrs(s: &mut String, attrs: &BTreeMap<String, String>) {
    for (k, v) in attrs {
        let _ = write!(s, " {k}='{}'", escape(v));
    }
}

fn escape(v: &str) -> String {
    let mut out = String::with_capacity(v.len());
    for c in v.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// RenderSurface
// ---------------------------------------------------------------------------

impl RenderSurface for SvgSurface {
    type Element = ElementId;

    fn query(&self, selector: Selector<'_>) -> Vec<ElementId> {
        let key = |n: &Node| n.attr(ATTR_INDEX).and_then(|v| v.parse::<u32>().ok());
        self.attached()
            .filter(|&(_, n)| match selector {
                Selector::Marker(k) => n.is_marker() && key(n) == Some(k),
                Selector::Markers => n.is_marker(),
                Selector::OuterRings => n.is_ring(),
                Selector::Country(code) => n.kind == Kind::Country && n.attr(ATTR_CODE) == Some(code),
                Selector::Countries => n.kind == Kind::Country,
            })
            .map(|(id, _)| id)
            .collect()
    }

    fn clone_template(&mut self, template: Template) -> Option<ElementId> {
        let node = self.templates.get(&template)?.clone();
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                Some(ElementId(slot))
            }
            None => {
                self.nodes.push(Some(node));
                Some(ElementId(self.nodes.len() - 1))
            }
        }
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: String) {
        if let Some(n) = self.node_mut(element) {
            n.attrs.insert(name.to_owned(), value);
        }
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.node(element)?.attr(name).map(str::to_owned)
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if let Some(n) = self.node_mut(element) {
            if !n.has_class(class) {
                n.classes.push(class.to_owned());
            }
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(n) = self.node_mut(element) {
            n.classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.node(element).is_some_and(|n| n.has_class(class))
    }

    fn append(&mut self, element: ElementId) {
        if let Some(n) = self.node_mut(element) {
            if !n.attached {
                n.attached = true;
                self.layer.push(element);
            }
        }
    }

    fn remove(&mut self, element: ElementId) {
        if let Some(slot) = self.nodes.get_mut(element.0) {
            if slot.take().is_some() {
                self.free.push(element.0);
            }
        }
        self.layer.retain(|&id| id != element);
    }

    fn frame_size(&self, frame: Frame) -> Option<DVec2> {
        self.frames.get(&frame).copied()
    }

    fn resize_frame(&mut self, frame: Frame, size: DVec2) {
        self.frames.insert(frame, size);
    }
}

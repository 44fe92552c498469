//! The render surface the widget draws into.
//!
//! The widget never touches a concrete document. Everything it needs (find
//! elements, clone templates, set attributes, toggle classes, measure and
//! size frames) goes through [`RenderSurface`], so the map logic can run
//! headless against [`crate::SvgSurface`] or any host document binding.

use glam::DVec2;

/// Attribute carrying a marker's or ring's region key.
pub const ATTR_INDEX: &str = "data-index";
/// Attribute carrying a country shape's ISO code.
pub const ATTR_CODE: &str = "data-code";
pub const ATTR_PERCENTAGE: &str = "data-percentage";
pub const ATTR_CX: &str = "cx";
pub const ATTR_CY: &str = "cy";
pub const ATTR_R: &str = "r";

/// Class marking selected markers and country shapes.
pub const CLASS_SELECTED: &str = "selected";
/// Class distinguishing the outer highlight ring from plain markers.
pub const CLASS_OUTER_RING: &str = "selected-outer-circle";

/// Element lookups the widget performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    /// The plain marker with this region key.
    Marker(u32),
    /// Every plain marker.
    Markers,
    /// Every outer highlight ring.
    OuterRings,
    /// Country shapes with this code.
    Country(&'a str),
    /// Every country shape.
    Countries,
}

/// Template nodes the widget clones new elements from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    Marker,
    OuterRing,
}

/// Measurable boxes on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frame {
    /// The vector graph the viewport is fitted into.
    Container,
    /// The rendered map; its height drives the highlight radius.
    Canvas,
}

pub trait RenderSurface {
    /// Opaque handle to an element owned by the surface.
    type Element: Copy + Eq + std::fmt::Debug;

    fn query(&self, selector: Selector<'_>) -> Vec<Self::Element>;

    /// Clones a template into a new, detached element.
    fn clone_template(&mut self, template: Template) -> Option<Self::Element>;

    fn set_attribute(&mut self, element: Self::Element, name: &str, value: String);

    fn attribute(&self, element: Self::Element, name: &str) -> Option<String>;

    fn add_class(&mut self, element: Self::Element, class: &str);

    fn remove_class(&mut self, element: Self::Element, class: &str);

    fn has_class(&self, element: Self::Element, class: &str) -> bool;

    /// Attaches a detached element to the marker layer.
    fn append(&mut self, element: Self::Element);

    /// Detaches and drops an element.
    fn remove(&mut self, element: Self::Element);

    /// Current on-screen size, or `None` if the frame does not exist.
    fn frame_size(&self, frame: Frame) -> Option<DVec2>;

    /// Gives a frame an explicit size, as a stylesheet height would.
    fn resize_frame(&mut self, frame: Frame, size: DVec2);

    fn query_one(&self, selector: Selector<'_>) -> Option<Self::Element> {
        self.query(selector).into_iter().next()
    }

    /// Reads `cx`/`cy` back as a point.
    fn position(&self, element: Self::Element) -> Option<DVec2> {
        let x = self.attribute(element, ATTR_CX)?.parse().ok()?;
        let y = self.attribute(element, ATTR_CY)?.parse().ok()?;
        Some(DVec2::new(x, y))
    }

    fn set_position(&mut self, element: Self::Element, point: DVec2) {
        self.set_attribute(element, ATTR_CX, point.x.to_string());
        self.set_attribute(element, ATTR_CY, point.y.to_string());
    }
}

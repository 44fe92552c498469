//! End-to-end behaviour of the widget against the in-memory SVG surface.

use std::time::{Duration, Instant};

use continent_map::surface::{ATTR_CODE, ATTR_INDEX, ATTR_R, CLASS_SELECTED};
use continent_map::{
    radius_for_percentage, Frame, LayoutState, MapConfig, RegionSet, RenderSurface, Selector,
    SvgSurface, WidgetOptions, WorldMap,
};
use glam::DVec2;

const REGIONS: &str = r#"[
    {"key": 1, "name": "North America", "latLng": [50, -100],
     "countries": ["US", "CA"], "default": true, "percentage": 33.5},
    {"key": 2, "name": "Europe", "latLng": [50, 30],
     "countries": ["DE", "FR"], "default": false, "percentage": 25},
    {"key": 3, "name": "Nowhere", "latLng": [-85, 0],
     "countries": ["AQ"], "default": false, "percentage": "abc"}
]"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn widget() -> anyhow::Result<WorldMap<SvgSurface>> {
    init_tracing();
    let map = MapConfig::builtin()?;
    let regions = RegionSet::from_json(REGIONS)?;
    let mut surface = SvgSurface::new(map.width, map.height).with_countries(["US", "CA", "DE", "FR", "AQ"]);
    surface.set_frame_size(Frame::Container, Some(DVec2::new(900.0, 900.0)));
    Ok(WorldMap::new(map, regions.into_regions(), surface, WidgetOptions::default()))
}

fn selected_countries(s: &SvgSurface) -> Vec<String> {
    s.query(Selector::Countries)
        .into_iter()
        .filter(|&c| s.has_class(c, CLASS_SELECTED))
        .filter_map(|c| s.attribute(c, ATTR_CODE))
        .collect()
}

fn selected_markers(s: &SvgSurface) -> Vec<u32> {
    s.query(Selector::Markers)
        .into_iter()
        .filter(|&m| s.has_class(m, CLASS_SELECTED))
        .filter_map(|m| s.attribute(m, ATTR_INDEX)?.parse().ok())
        .collect()
}

fn ring(s: &SvgSurface) -> (u32, f64) {
    let rings = s.query(Selector::OuterRings);
    assert_eq!(rings.len(), 1, "exactly one highlight ring");
    let key = s.attribute(rings[0], ATTR_INDEX).unwrap().parse().unwrap();
    let r = s.attribute(rings[0], ATTR_R).unwrap().parse().unwrap();
    (key, r)
}

#[test]
fn default_then_click_moves_selection() -> anyhow::Result<()> {
    let mut w = widget()?;
    w.start(Instant::now());

    assert_eq!(w.selected(), Some(1));
    assert_eq!(selected_markers(w.surface()), vec![1]);
    assert_eq!(selected_countries(w.surface()), ["US", "CA"]);
    // 900px container less the 30px gutter: an 870px tall canvas.
    assert_eq!(w.surface().frame_size(Frame::Canvas), Some(DVec2::new(870.0, 870.0)));
    let (key, r) = ring(w.surface());
    assert_eq!(key, 1);
    assert!((r - 97.15).abs() < 1e-9);

    w.on_click(2);
    assert_eq!(w.selected(), Some(2));
    assert_eq!(selected_markers(w.surface()), vec![2]);
    assert_eq!(selected_countries(w.surface()), ["DE", "FR"]);
    let (key, r) = ring(w.surface());
    assert_eq!(key, 2);
    assert!((r - 72.5).abs() < 1e-9);
    Ok(())
}

#[test]
fn unrenderable_region_has_no_marker_and_ignores_clicks() -> anyhow::Result<()> {
    let mut w = widget()?;
    w.start(Instant::now());
    assert!(w.surface().query_one(Selector::Marker(3)).is_none());
    assert_eq!(w.surface().query(Selector::Markers).len(), 2);

    w.on_click(3);
    w.on_click(42);
    assert_eq!(w.selected(), Some(1));
    assert_eq!(selected_countries(w.surface()), ["US", "CA"]);
    Ok(())
}

#[test]
fn resize_is_debounced_and_repositions() -> anyhow::Result<()> {
    let mut w = widget()?;
    let t0 = Instant::now();
    w.start(t0);
    let marker = w.surface().query_one(Selector::Marker(1)).unwrap();
    let before = w.surface().position(marker).unwrap();

    w.surface_mut().set_frame_size(Frame::Container, Some(DVec2::new(1800.0, 900.0)));
    w.on_resize(t0);
    w.on_resize(t0 + Duration::from_millis(10));
    w.on_resize(t0 + Duration::from_millis(15));

    w.tick(t0 + Duration::from_millis(25));
    assert_eq!(w.viewport().container, DVec2::new(900.0, 900.0));

    w.tick(t0 + Duration::from_millis(35));
    assert_eq!(w.viewport().container, DVec2::new(1800.0, 900.0));
    assert_eq!(w.next_deadline(), None);

    // Same element, moved right by the centring offset.
    assert_eq!(w.surface().query_one(Selector::Marker(1)), Some(marker));
    let after = w.surface().position(marker).unwrap();
    assert!((after.x - before.x - 450.0).abs() < 1e-6);

    // Ring follows its marker and grows with the canvas.
    let rings = w.surface().query(Selector::OuterRings);
    assert_eq!(w.surface().position(rings[0]), Some(after));
    assert_eq!(w.surface().frame_size(Frame::Canvas), Some(DVec2::new(1770.0, 1770.0)));
    assert!((ring(w.surface()).1 - radius_for_percentage(33.5, 1770.0)).abs() < 1e-9);
    assert_eq!(selected_markers(w.surface()), vec![1]);
    Ok(())
}

#[test]
fn zoom_and_pan_survive_a_resize_round_trip() -> anyhow::Result<()> {
    let mut w = widget()?;
    let t0 = Instant::now();
    w.start(t0);
    w.zoom_to(2.0);
    w.pan_by(DVec2::new(-300.0, -120.0));
    let before = w.viewport();
    let marker = w.surface().query_one(Selector::Marker(1)).unwrap();
    let at = w.surface().position(marker).unwrap();

    w.surface_mut().set_frame_size(Frame::Container, Some(DVec2::new(450.0, 450.0)));
    w.on_resize(t0);
    w.tick(t0 + Duration::from_millis(20));
    let half = w.viewport();
    assert!((half.scale - before.scale * 0.5).abs() < 1e-9);
    assert!((half.translate - before.translate * 0.5).length() < 1e-9);

    w.surface_mut().set_frame_size(Frame::Container, Some(DVec2::new(900.0, 900.0)));
    w.on_resize(t0 + Duration::from_millis(40));
    w.tick(t0 + Duration::from_millis(60));
    let after = w.viewport();
    assert!((after.scale - before.scale).abs() < 1e-9);
    assert!((after.translate - before.translate).length() < 1e-6);

    let back = w.surface().position(marker).unwrap();
    assert!((back - at).length() < 1e-6, "{back} vs {at}");
    let rings = w.surface().query(Selector::OuterRings);
    assert_eq!(w.surface().position(rings[0]), Some(back));
    Ok(())
}

#[test]
fn replacing_regions_without_a_drawable_default_clears_selection() -> anyhow::Result<()> {
    let mut w = widget()?;
    w.start(Instant::now());
    w.on_click(2);

    let only_nowhere = w.regions().iter().filter(|r| r.key == 3).cloned().collect();
    w.set_regions(only_nowhere);

    assert_eq!(w.selected(), None);
    assert!(selected_markers(w.surface()).is_empty());
    assert!(selected_countries(w.surface()).is_empty());
    assert!(w.surface().query(Selector::OuterRings).is_empty());
    assert!(w.surface().query(Selector::Markers).is_empty());

    // The next update with a drawable default brings the highlight back.
    w.set_regions(RegionSet::from_json(REGIONS)?.into_regions());
    assert_eq!(w.selected(), Some(1));
    assert_eq!(ring(w.surface()).0, 1);
    Ok(())
}

#[test]
fn late_layout_is_picked_up_by_retry() -> anyhow::Result<()> {
    let mut w = widget()?;
    w.surface_mut().set_frame_size(Frame::Container, Some(DVec2::ZERO));
    let t0 = Instant::now();
    w.start(t0);
    assert_eq!(w.state(), LayoutState::NotReady { attempts: 1 });
    assert!(w.surface().query(Selector::Markers).is_empty());
    assert_eq!(w.selected(), None);

    w.surface_mut().set_frame_size(Frame::Container, Some(DVec2::new(450.0, 450.0)));
    let due = w.next_deadline().unwrap();
    w.tick(due);
    assert_eq!(w.state(), LayoutState::Ready);
    assert_eq!(w.selected(), Some(1));
    assert!((w.viewport().scale - 0.5).abs() < 1e-12);
    Ok(())
}

#[test]
fn svg_output_reflects_selection() -> anyhow::Result<()> {
    let mut w = widget()?;
    w.start(Instant::now());
    w.on_click(2);
    let svg = w.into_surface().to_svg();
    assert!(svg.contains("class='world-map-country selected' d='' data-code='DE'"));
    assert!(svg.contains("class='world-map-country' d='' data-code='US'"));
    assert_eq!(svg.matches("selected-outer-circle").count(), 1);
    Ok(())
}

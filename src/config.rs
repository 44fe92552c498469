//! Static map configuration: artwork geometry, projection parameters and the
//! list of selectable regions.
//!
//! Both documents are JSON. The built-in versions live in `assets/` and are
//! compiled into the crate.

use std::collections::{BTreeSet, HashSet};

use glam::DVec2;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ConfigError;
use crate::selection::parse_percentage;

const BUILTIN_MAP: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/map.json"));
const BUILTIN_CONTINENTS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/continents.json"));

// ---------------------------------------------------------------------------
// Map artwork
// ---------------------------------------------------------------------------

/// Projection named by the config. Only `mill` is drawable; any other
/// name is kept so validation can report it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ProjectionKind {
    Miller,
    Unsupported(String),
}

impl From<String> for ProjectionKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "mill" => Self::Miller,
            _ => Self::Unsupported(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionConfig {
    #[serde(rename = "type")]
    pub kind:             ProjectionKind,
    pub central_meridian: f64,
}

/// Point as written in the config (`{"x": .., "y": ..}`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PlanePoint {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned box on the projection plane.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[PlanePoint; 2]")]
pub struct BoundingBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl From<[PlanePoint; 2]> for BoundingBox {
    fn from([min, max]: [PlanePoint; 2]) -> Self {
        Self {
            min: DVec2::new(min.x, min.y),
            max: DVec2::new(max.x, max.y),
        }
    }
}

impl BoundingBox {
    /// Strict containment; points on an edge are outside.
    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }
}

/// A panel of the artwork with its own pixel placement.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Inset {
    pub width:  f64,
    pub height: f64,
    pub top:    f64,
    pub left:   f64,
    pub bbox:   BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapConfig {
    pub insets:     Vec<Inset>,
    pub width:      f64,
    pub height:     f64,
    pub projection: ProjectionConfig,
}

impl MapConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The 900x900 single-inset world artwork.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(BUILTIN_MAP)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let projection = &self.projection;
        if let ProjectionKind::Unsupported(kind) = &projection.kind {
            return Err(ConfigError::UnsupportedProjection { kind: kind.clone() });
        }
        if !projection.central_meridian.is_finite() {
            return Err(ConfigError::CentralMeridian(projection.central_meridian));
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ConfigError::ArtworkSize { width: self.width, height: self.height });
        }
        if self.insets.is_empty() {
            return Err(ConfigError::NoInsets);
        }
        for (index, inset) in self.insets.iter().enumerate() {
            let size = inset.bbox.size();
            if !(size.x > 0.0 && size.y > 0.0) {
                return Err(ConfigError::InvalidInset { index });
            }
        }
        Ok(())
    }

    pub fn native_size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// A selectable grouping of countries with a representative coordinate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Region {
    pub key:        u32,
    pub name:       String,
    #[serde(rename = "latLng")]
    pub lat_lng:    [f64; 2],
    pub countries:  BTreeSet<String>,
    #[serde(rename = "default", default)]
    pub is_default: bool,
    /// Share in percent; NaN when the source value was not numeric.
    #[serde(deserialize_with = "lenient_percentage", default = "not_a_number")]
    pub percentage: f64,
}

impl Region {
    pub fn lat(&self) -> f64 {
        self.lat_lng[0]
    }

    pub fn lng(&self) -> f64 {
        self.lat_lng[1]
    }

    pub fn contains_country(&self, code: &str) -> bool {
        self.countries.contains(code)
    }
}

fn not_a_number() -> f64 {
    f64::NAN
}

fn lenient_percentage<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_percentage(&s),
        _ => f64::NAN,
    })
}

/// Validated region list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    /// Parses and validates: unique keys, exactly one default.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let regions: Vec<Region> = serde_json::from_str(json)?;
        Self::new(regions)
    }

    pub fn new(regions: Vec<Region>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for r in &regions {
            if !seen.insert(r.key) {
                return Err(ConfigError::DuplicateKey { key: r.key });
            }
        }
        let count = regions.iter().filter(|r| r.is_default).count();
        if count != 1 {
            return Err(ConfigError::DefaultRegion { count });
        }
        Ok(Self { regions })
    }

    /// North America, Latin America, Europe and Asia Pacific.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(BUILTIN_CONTINENTS)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn into_regions(self) -> Vec<Region> {
        self.regions
    }
}

/// Loads both built-in documents.
pub fn load_builtin() -> anyhow::Result<(MapConfig, RegionSet)> {
    use anyhow::Context;

    let map     = MapConfig::builtin().context("loading built-in map artwork config")?;
    let regions = RegionSet::builtin().context("loading built-in continent list")?;
    Ok((map, regions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_map_loads() {
        let map = MapConfig::builtin().unwrap();
        assert_eq!(map.width, 900.0);
        assert_eq!(map.height, 900.0);
        assert_eq!(map.projection.kind, ProjectionKind::Miller);
        assert_eq!(map.projection.central_meridian, 11.5);
        assert_eq!(map.insets.len(), 1);
        assert!(map.insets[0].bbox.min.x < map.insets[0].bbox.max.x);
    }

    #[test]
    fn builtin_continents_load() {
        let set = RegionSet::builtin().unwrap();
        let names: Vec<_> = set.regions().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["North America", "Latin America", "Europe", "Asia Pacific"]);
        let na = &set.regions()[0];
        assert!(na.is_default);
        assert_eq!(na.percentage, 33.5);
        assert!(na.contains_country("US"));
        assert!(!na.contains_country("DE"));
    }

    #[test]
    fn load_builtin_pairs_both() {
        let (map, regions) = load_builtin().unwrap();
        assert_eq!(map.insets.len(), 1);
        assert_eq!(regions.regions().len(), 4);
    }

    #[test]
    fn unknown_projection_is_rejected() {
        let json = r#"{"insets":[],"width":1,"height":1,
            "projection":{"type":"merc","centralMeridian":0}}"#;
        match MapConfig::from_json(json) {
            Err(ConfigError::UnsupportedProjection { kind }) => assert_eq!(kind, "merc"),
            other => panic!("expected UnsupportedProjection, got {other:?}"),
        }
    }

    #[test]
    fn inverted_inset_is_rejected() {
        let json = r#"{"insets":[{"width":1,"height":1,"top":0,"left":0,
            "bbox":[{"x":5,"y":0},{"x":1,"y":1}]}],
            "width":1,"height":1,"projection":{"type":"mill","centralMeridian":0}}"#;
        assert!(matches!(
            MapConfig::from_json(json),
            Err(ConfigError::InvalidInset { index: 0 })
        ));
    }

    #[test]
    fn percentage_is_lenient() {
        let json = r#"[
            {"key":1,"name":"A","latLng":[0,0],"countries":[],"default":true,"percentage":"12.5"},
            {"key":2,"name":"B","latLng":[0,0],"countries":[],"percentage":"abc"},
            {"key":3,"name":"C","latLng":[0,0],"countries":[]}
        ]"#;
        let set = RegionSet::from_json(json).unwrap();
        let r = set.regions();
        assert_eq!(r[0].percentage, 12.5);
        assert!(r[1].percentage.is_nan());
        assert!(r[2].percentage.is_nan());
        assert!(!r[1].is_default);
    }

    #[test]
    fn default_flag_count_is_validated() {
        let none = r#"[{"key":1,"name":"A","latLng":[0,0],"countries":[],"percentage":1}]"#;
        assert!(matches!(
            RegionSet::from_json(none),
            Err(ConfigError::DefaultRegion { count: 0 })
        ));
        let two = r#"[
            {"key":1,"name":"A","latLng":[0,0],"countries":[],"default":true,"percentage":1},
            {"key":2,"name":"B","latLng":[0,0],"countries":[],"default":true,"percentage":1}
        ]"#;
        assert!(matches!(
            RegionSet::from_json(two),
            Err(ConfigError::DefaultRegion { count: 2 })
        ));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let json = r#"[
            {"key":7,"name":"A","latLng":[0,0],"countries":[],"default":true,"percentage":1},
            {"key":7,"name":"B","latLng":[0,0],"countries":[],"percentage":1}
        ]"#;
        assert!(matches!(
            RegionSet::from_json(json),
            Err(ConfigError::DuplicateKey { key: 7 })
        ));
    }
}

//! Error types for configuration loading and widget steps.
//!
//! Configuration errors are surfaced to whoever loads the map data. Widget
//! errors never escape the public event handlers of [`crate::WorldMap`]:
//! they are logged and absorbed with a safe default or a skipped operation.

use thiserror::Error;

use crate::surface::Template;

/// Problems found while loading or validating static map configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("malformed configuration JSON")]
    Json(#[from] serde_json::Error),

    #[error("unsupported projection {kind:?}, only \"mill\" is drawable")]
    UnsupportedProjection { kind: String },

    #[error("central meridian must be finite, got {0}")]
    CentralMeridian(f64),

    #[error("artwork size must be positive, got {width}x{height}")]
    ArtworkSize { width: f64, height: f64 },

    #[error("map configuration has no insets")]
    NoInsets,

    #[error("inset {index} has an empty or inverted bounding box")]
    InvalidInset { index: usize },

    #[error("region key {key} appears more than once")]
    DuplicateKey { key: u32 },

    #[error("expected exactly one default region, found {count}")]
    DefaultRegion { count: usize },
}

/// Recoverable failures inside a widget operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    /// The container has no layout yet (zero or unknown size).
    #[error("container is not laid out yet")]
    NotLaidOut,

    /// The region's coordinate falls outside every configured inset.
    #[error("region {key} does not project into any inset")]
    UnrenderablePoint { key: u32 },

    /// A template node the operation clones from is absent.
    #[error("render surface has no {0:?} template")]
    MissingTemplate(Template),

    #[error("no region with key {0}")]
    UnknownRegion(u32),

    #[error("container still not laid out after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

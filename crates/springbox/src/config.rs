use crate::coords::{DEFAULT_SCALE, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use crate::error::{Error, Result};
use crate::overlap::OverlapOptions;
use crate::spring::SpringOptions;
use serde::{Deserialize, Serialize};
use springbox_graph::geom::{self, Size};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn size(&self) -> Size {
        geom::size(self.width, self.height)
    }
}

/// Engine settings, loadable from JSON.
///
/// Every key is optional:
///
/// ```json
/// {
///   "seed": 7,
///   "scale": 1.5,
///   "viewport": { "width": 1024, "height": 768 },
///   "spring": { "idealEdgeLength": 200, "maxIterations": 300 },
///   "overlap": { "margin": 8 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Seed for the engine's random generator (initial placement, jitter, id suffixes).
    pub seed: u64,
    pub scale: f64,
    pub viewport: Viewport,
    pub spring: SpringOptions,
    pub overlap: OverlapOptions,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: DEFAULT_SCALE,
            viewport: Viewport::default(),
            spring: SpringOptions::default(),
            overlap: OverlapOptions::default(),
        }
    }
}

impl LayoutConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(Error::InvalidScale { scale: self.scale });
        }
        let Viewport { width, height } = self.viewport;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(Error::InvalidViewport { width, height });
        }
        self.spring
            .validate()
            .and_then(|()| self.overlap.validate())
            .map_err(|message| Error::InvalidConfig { message })
    }
}

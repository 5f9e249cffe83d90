//! Mapping between layout space and world space.
//!
//! The spring simulation works in a dimensionless layout space. The renderer works in world
//! space (pixels at the current zoom). The mapping is a pure scale about the origin:
//! `world = layout * scale`. Only positions are mapped; box sizes are always world units.

use crate::error::{Error, Result};
use springbox_graph::Graph;
use springbox_graph::geom::{self, Size};

pub const DEFAULT_SCALE: f64 = 1.0;
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 800.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    scale: f64,
    viewport: Size,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            viewport: geom::size(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
        }
    }
}

impl CoordinateMapper {
    pub fn new(viewport: Size, scale: f64) -> Result<Self> {
        check_viewport(viewport)?;
        check_scale(scale)?;
        Ok(Self { scale, viewport })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// The viewport expressed in layout units.
    pub fn layout_extent(&self) -> Size {
        self.viewport / self.scale
    }

    /// Updates whichever of `viewport` / `scale` is supplied.
    ///
    /// Both values are validated before anything is written, so an error leaves the mapper as it
    /// was. Nodes are not moved; call [`CoordinateMapper::to_world_coords`] to re-project.
    pub fn recalibrate(&mut self, viewport: Option<Size>, scale: Option<f64>) -> Result<()> {
        if let Some(viewport) = viewport {
            check_viewport(viewport)?;
        }
        if let Some(scale) = scale {
            check_scale(scale)?;
        }
        if let Some(viewport) = viewport {
            self.viewport = viewport;
        }
        if let Some(scale) = scale {
            self.scale = scale;
        }
        tracing::trace!(
            scale = self.scale,
            width = self.viewport.width,
            height = self.viewport.height,
            "recalibrated"
        );
        Ok(())
    }

    /// Adds `delta` to the scale and returns the new value.
    pub fn change_scale(&mut self, delta: f64) -> Result<f64> {
        let scale = self.scale + delta;
        check_scale(scale)?;
        self.scale = scale;
        Ok(scale)
    }

    pub fn to_layout_coords(&self, graph: &mut Graph) {
        for node in graph.nodes_mut() {
            node.layout_x = node.left / self.scale;
            node.layout_y = node.top / self.scale;
        }
    }

    /// Projects every layout position into world space.
    ///
    /// Fails without moving anything when a projected position is not finite.
    pub fn to_world_coords(&self, graph: &mut Graph) -> Result<()> {
        let world: Vec<(f64, f64)> = graph
            .nodes()
            .map(|n| (n.layout_x * self.scale, n.layout_y * self.scale))
            .collect();
        if let Some((node, (left, top))) = graph
            .nodes()
            .zip(&world)
            .find(|(_, (left, top))| !(left.is_finite() && top.is_finite()))
        {
            return Err(springbox_graph::Error::Validation {
                id: node.id().to_string(),
                message: format!("world position must be finite, got ({left}, {top})"),
            }
            .into());
        }
        for (node, (left, top)) in graph.nodes_mut().zip(world) {
            node.set_position(left, top)?;
        }
        Ok(())
    }
}

fn check_scale(scale: f64) -> Result<()> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidScale { scale })
    }
}

fn check_viewport(viewport: Size) -> Result<()> {
    let ok = |v: f64| v.is_finite() && v > 0.0;
    if ok(viewport.width) && ok(viewport.height) {
        Ok(())
    } else {
        Err(Error::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        })
    }
}

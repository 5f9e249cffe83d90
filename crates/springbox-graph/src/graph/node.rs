//! Node storage for [`Graph`](super::Graph).

use crate::error::{Error, Result};
use crate::geom::{self, Point, Rect, Size};

/// Width used when a node is created without an explicit size.
pub const DEFAULT_NODE_WIDTH: f64 = 60.0;
/// Height used when a node is created without an explicit size.
pub const DEFAULT_NODE_HEIGHT: f64 = 60.0;

/// A rectangular node.
///
/// `left`/`top` are the world-space position of the box. Layout code moves boxes through
/// [`GraphNode::set_position`], which rejects non-finite positions; direct writes skip that check.
/// The size is only changed through [`GraphNode::resize`] so it always stays positive.
/// `layout_x`/`layout_y` hold the layout-space position used by the spring simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    id: String,
    pub left: f64,
    pub top: f64,
    width: f64,
    height: f64,
    pub layout_x: f64,
    pub layout_y: f64,
}

impl GraphNode {
    pub fn new(
        id: impl Into<String>,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::Validation {
                id,
                message: "node id must not be empty".to_string(),
            });
        }
        check_position(&id, left, top)?;
        check_size(&id, width, height)?;
        Ok(Self {
            id,
            left,
            top,
            width,
            height,
            layout_x: 0.0,
            layout_y: 0.0,
        })
    }

    pub fn with_default_size(id: impl Into<String>, left: f64, top: f64) -> Result<Self> {
        Self::new(id, left, top, DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> Point {
        geom::point(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        geom::size(self.width, self.height)
    }

    pub fn rect(&self) -> Rect {
        geom::rect(self.left, self.top, self.width, self.height)
    }

    pub fn layout_pos(&self) -> Point {
        geom::point(self.layout_x, self.layout_y)
    }

    /// Moves the box so its top-left corner sits at `(left, top)`.
    pub fn set_position(&mut self, left: f64, top: f64) -> Result<()> {
        check_position(&self.id, left, top)?;
        self.left = left;
        self.top = top;
        Ok(())
    }

    pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
        check_size(&self.id, width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }
}

fn check_position(id: &str, left: f64, top: f64) -> Result<()> {
    if left.is_finite() && top.is_finite() {
        return Ok(());
    }
    Err(Error::Validation {
        id: id.to_string(),
        message: format!("position must be finite, got ({left}, {top})"),
    })
}

fn check_size(id: &str, width: f64, height: f64) -> Result<()> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        return Ok(());
    }
    Err(Error::Validation {
        id: id.to_string(),
        message: format!("width and height must be positive, got {width}x{height}"),
    })
}

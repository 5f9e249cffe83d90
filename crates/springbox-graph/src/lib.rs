#![forbid(unsafe_code)]

//! Box-and-edge graph model used by `springbox`.
//!
//! A [`Graph`] is an insertion-ordered set of rectangular [`GraphNode`]s plus an
//! insertion-ordered set of [`Edge`]s. Insertion order matters: the layout algorithms iterate
//! nodes in this order, and the overlap resolver uses it to decide which node of a pair stays put.
//!
//! Nodes carry two positions: the world-space box (`left`, `top`, `width`, `height`) that a
//! renderer draws, and a layout-space point (`layout_x`, `layout_y`) that only the spring
//! simulation reads and writes. Nodes never reference any rendering object; a renderer keeps its
//! own lookup keyed by node id.

pub mod error;
pub mod geom;
pub mod graph;
pub mod text;

pub use error::{Error, Result};
pub use graph::{DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH, Edge, Graph, GraphNode};

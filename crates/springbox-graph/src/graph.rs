//! Graph container.
//!
//! Nodes live in an [`IndexMap`] keyed by id so lookups are O(1) while iteration follows
//! insertion order. Edges live in an [`IndexSet`]: adding the same `(source, target)` pair twice
//! is a no-op and iteration follows insertion order as well.

mod edge;
mod node;

pub use edge::Edge;
pub use node::{DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH, GraphNode};

use crate::error::{Error, Result};
use crate::geom::Rect;
use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: IndexMap<String, GraphNode>,
    edges: IndexSet<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Appends `node`. Ids are never renamed: a collision is reported as
    /// [`Error::DuplicateId`] and the graph is left unchanged.
    pub fn add_node(&mut self, node: GraphNode) -> Result<&mut GraphNode> {
        match self.nodes.entry(node.id().to_string()) {
            Entry::Occupied(e) => Err(Error::DuplicateId { id: e.key().clone() }),
            Entry::Vacant(e) => Ok(e.insert(node)),
        }
    }

    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<()> {
        for id in [source, target] {
            if !self.nodes.contains_key(id) {
                return Err(Error::UnknownNode { id: id.to_string() });
            }
        }
        self.edges.insert(Edge::new(source, target));
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.get_mut(id)
    }

    /// Position of `id` in insertion order.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    pub fn node_at(&self, index: usize) -> Option<&GraphNode> {
        self.nodes.get_index(index).map(|(_, n)| n)
    }

    pub fn node_at_mut(&mut self, index: usize) -> Option<&mut GraphNode> {
        self.nodes.get_index_mut(index).map(|(_, n)| n)
    }

    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &GraphNode> + '_ {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl ExactSizeIterator<Item = &mut GraphNode> + '_ {
        self.nodes.values_mut()
    }

    pub fn node_ids(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.nodes.keys().map(String::as_str)
    }

    pub fn edges(&self) -> impl ExactSizeIterator<Item = &Edge> + '_ {
        self.edges.iter()
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges.contains(&Edge::new(source, target))
    }

    /// Edges incident to `id`, in edge insertion order.
    pub fn node_edges(&self, id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.touches(id)).collect()
    }

    /// Edge endpoints resolved to node indices, in edge insertion order.
    pub fn edge_index_pairs(&self) -> Vec<(usize, usize)> {
        self.edges
            .iter()
            .filter_map(|e| {
                let a = self.nodes.get_index_of(&e.source)?;
                let b = self.nodes.get_index_of(&e.target)?;
                Some((a, b))
            })
            .collect()
    }

    /// Removes `id` and every edge touching it. Absent ids are a no-op.
    ///
    /// The relative order of the remaining nodes is preserved.
    pub fn delete_node(&mut self, id: &str) -> Option<GraphNode> {
        let removed = self.nodes.shift_remove(id)?;
        self.edges.retain(|e| !e.touches(id));
        Some(removed)
    }

    pub fn delete_edge(&mut self, source: &str, target: &str) -> bool {
        self.edges.shift_remove(&Edge::new(source, target))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Moves a node's box, e.g. at the end of a drag in an editor.
    pub fn move_node(&mut self, id: &str, left: f64, top: f64) -> Result<()> {
        self.node_mut(id)
            .ok_or_else(|| Error::UnknownNode { id: id.to_string() })?
            .set_position(left, top)
    }

    /// Resizes a node's box, e.g. at the end of a resize handle drag in an editor.
    pub fn resize_node(&mut self, id: &str, width: f64, height: f64) -> Result<()> {
        self.node_mut(id)
            .ok_or_else(|| Error::UnknownNode { id: id.to_string() })?
            .resize(width, height)
    }

    /// Union of all node boxes in world space.
    pub fn bounds(&self) -> Option<Rect> {
        let mut it = self.nodes.values().map(GraphNode::rect);
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(&r)))
    }
}

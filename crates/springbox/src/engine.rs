//! The layout engine used by an editor: one graph, one coordinate mapper, the two algorithms and
//! a seeded random generator, plus the editor's composite actions.

use crate::config::LayoutConfig;
use crate::coords::CoordinateMapper;
use crate::error::Result;
use crate::overlap::{OverlapPass, OverlapRemoval, RemovalOutcome};
use crate::spring::{SpringLayout, SpringStats, SpringStep};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use springbox_graph::geom::Size;
use springbox_graph::{Graph, GraphNode};

/// Reported to the progress callback after every spring step and every overlap pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    SpringStep(SpringStep),
    OverlapPass(OverlapPass),
}

pub type ProgressFn = Box<dyn FnMut(&Graph, Progress)>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelayoutReport {
    pub spring: SpringStats,
    pub overlaps: RemovalOutcome,
}

/// Largest random suffix tried by [`LayoutEngine::insert_node_with_unique_id`].
const ID_SUFFIX_RANGE: u32 = 10_000;
const ID_SUFFIX_ATTEMPTS: usize = 64;

pub struct LayoutEngine {
    graph: Graph,
    mapper: CoordinateMapper,
    spring: SpringLayout,
    overlap: OverlapRemoval,
    rng: StdRng,
    progress: Option<ProgressFn>,
}

impl std::fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("graph", &self.graph)
            .field("mapper", &self.mapper)
            .field("spring", &self.spring)
            .field("overlap", &self.overlap)
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        Self::with_graph(config, Graph::new())
    }

    pub fn with_graph(config: LayoutConfig, graph: Graph) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            graph,
            mapper: CoordinateMapper::new(config.viewport.size(), config.scale)?,
            spring: SpringLayout::new(config.spring),
            overlap: OverlapRemoval::new(config.overlap),
            rng: StdRng::seed_from_u64(config.seed),
            progress: None,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn overlap_removal(&self) -> &OverlapRemoval {
        &self.overlap
    }

    pub fn set_progress(&mut self, progress: impl FnMut(&Graph, Progress) + 'static) {
        self.progress = Some(Box::new(progress));
    }

    pub fn clear_progress(&mut self) {
        self.progress = None;
    }

    pub fn load_from_text(&mut self, text: &str) -> Result<()> {
        Ok(self.graph.load_from_text(text)?)
    }

    pub fn to_text(&self) -> String {
        self.graph.to_text()
    }

    pub fn add_node(&mut self, node: GraphNode) -> Result<()> {
        self.graph.add_node(node)?;
        Ok(())
    }

    pub fn delete_node(&mut self, id: &str) -> Option<GraphNode> {
        self.graph.delete_node(id)
    }

    pub fn to_layout_coords(&mut self) {
        self.mapper.to_layout_coords(&mut self.graph);
    }

    pub fn to_world_coords(&mut self) -> Result<()> {
        self.mapper.to_world_coords(&mut self.graph)
    }

    pub fn recalibrate(&mut self, viewport: Option<Size>, scale: Option<f64>) -> Result<()> {
        self.mapper.recalibrate(viewport, scale)
    }

    /// Runs the spring layout in layout space. Callers normally convert with
    /// [`LayoutEngine::to_layout_coords`] first and [`LayoutEngine::to_world_coords`] after;
    /// [`LayoutEngine::relayout`] does both.
    pub fn layout(&mut self, keep_current_positions: bool) -> SpringStats {
        let extent = self.mapper.layout_extent();
        let progress = &mut self.progress;
        self.spring.layout_with_progress(
            &mut self.graph,
            extent,
            keep_current_positions,
            &mut self.rng,
            |g, step| {
                if let Some(cb) = progress.as_mut() {
                    cb(g, Progress::SpringStep(*step));
                }
            },
        )
    }

    pub fn remove_overlaps(&mut self) -> RemovalOutcome {
        let progress = &mut self.progress;
        self.overlap
            .remove_overlaps_with_progress(&mut self.graph, |g, pass| {
                if let Some(cb) = progress.as_mut() {
                    cb(g, Progress::OverlapPass(*pass));
                }
            })
    }

    pub fn count_overlaps(&self) -> usize {
        self.overlap.count_overlaps(&self.graph)
    }

    /// Spring layout followed by overlap removal, converting coordinates on the way.
    pub fn relayout(&mut self, keep_current_positions: bool) -> Result<RelayoutReport> {
        self.to_layout_coords();
        let spring = self.layout(keep_current_positions);
        self.to_world_coords()?;
        let overlaps = self.remove_overlaps();
        Ok(RelayoutReport { spring, overlaps })
    }

    /// Zooms by `delta`, re-projects the layout into world space and removes the overlaps that
    /// the new scale introduced.
    ///
    /// Layout positions are taken from the current world positions first, so manual moves made
    /// since the last layout are kept. On error the scale and world positions are unchanged.
    pub fn change_scale(&mut self, delta: f64) -> Result<RemovalOutcome> {
        self.to_layout_coords();
        let mut mapper = self.mapper;
        let scale = mapper.change_scale(delta)?;
        mapper.to_world_coords(&mut self.graph)?;
        self.mapper = mapper;
        tracing::debug!(scale, "scale changed");
        Ok(self.remove_overlaps())
    }

    /// Adds a node under `base`, or under `base` plus a random numeric suffix when `base` is
    /// taken. Returns the id that was used.
    pub fn insert_node_with_unique_id(
        &mut self,
        base: &str,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Result<String> {
        let id = self.unique_id(base);
        self.graph
            .add_node(GraphNode::new(id.clone(), left, top, width, height)?)?;
        Ok(id)
    }

    fn unique_id(&mut self, base: &str) -> String {
        if !self.graph.contains(base) {
            return base.to_string();
        }
        for _ in 0..ID_SUFFIX_ATTEMPTS {
            let candidate = format!("{base}{}", self.rng.random_range(0..ID_SUFFIX_RANGE));
            if !self.graph.contains(&candidate) {
                return candidate;
            }
        }
        let mut k = self.graph.len();
        loop {
            let candidate = format!("{base}_{k}");
            if !self.graph.contains(&candidate) {
                return candidate;
            }
            k += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn unique_ids_get_a_numeric_suffix() {
        let mut engine = LayoutEngine::new(LayoutConfig::default()).unwrap();
        let first = engine
            .insert_node_with_unique_id("D", 0.0, 0.0, 60.0, 60.0)
            .unwrap();
        let second = engine
            .insert_node_with_unique_id("D", 100.0, 0.0, 60.0, 60.0)
            .unwrap();
        assert_eq!(first, "D");
        assert_ne!(second, "D");
        assert!(second.starts_with('D'));
        assert!(second[1..].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(engine.graph().len(), 2);

        // The graph itself never renames.
        assert!(engine
            .add_node(GraphNode::with_default_size("D", 0.0, 0.0).unwrap())
            .is_err());
    }

    #[test]
    fn progress_sees_every_step_and_pass() {
        let mut engine = LayoutEngine::new(LayoutConfig::default()).unwrap();
        engine
            .load_from_text(
                "{'type':'node', 'id':'a', 'x':0, 'y':0, 'width':60, 'height':60}\n\
                 {'type':'node', 'id':'b', 'x':10, 'y':0, 'width':60, 'height':60}\n\
                 {'type':'edge', 'source':'a', 'target':'b'}\n",
            )
            .unwrap();

        let seen: Rc<RefCell<(usize, usize)>> = Rc::default();
        let sink = Rc::clone(&seen);
        engine.set_progress(move |_, p| {
            let mut s = sink.borrow_mut();
            match p {
                Progress::SpringStep(_) => s.0 += 1,
                Progress::OverlapPass(_) => s.1 += 1,
            }
        });

        let report = engine.relayout(false).unwrap();
        assert_eq!(seen.borrow().0, report.spring.iterations);
        assert_eq!(seen.borrow().1, report.overlaps.passes);
        assert!(report.overlaps.converged);
        assert_eq!(engine.count_overlaps(), 0);
    }

    #[test]
    fn failed_zoom_keeps_scale_and_positions() {
        let mut engine = LayoutEngine::new(LayoutConfig::default()).unwrap();
        engine
            .add_node(GraphNode::with_default_size("a", 40.0, 20.0).unwrap())
            .unwrap();
        assert!(engine.change_scale(-1.0).is_err());
        assert_eq!(engine.mapper().scale(), 1.0);
        let a = engine.graph().node("a").unwrap();
        assert_eq!((a.left, a.top), (40.0, 20.0));

        engine.change_scale(1.0).unwrap();
        let a = engine.graph().node("a").unwrap();
        assert_eq!((a.left, a.top), (80.0, 40.0));

        let err = engine.change_scale(f64::MAX).unwrap_err();
        assert!(matches!(err, crate::Error::Graph(_)), "{err}");
        assert_eq!(engine.mapper().scale(), 2.0);
        let a = engine.graph().node("a").unwrap();
        assert_eq!((a.left, a.top), (80.0, 40.0));
    }
}

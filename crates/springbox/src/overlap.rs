//! Overlap removal for world-space boxes.
//!
//! Pairs `(i, j)` with `i < j` are visited in node insertion order. When two boxes overlap
//! (including the margin), the later node `j` is moved just clear of the earlier one. The four
//! positions that clear the earlier box (either side, either axis) are tried cheapest first, and
//! the first one that also clears every node before `j` wins. Equal moves go horizontal, and on the
//! side the mover's center is on. When every position lands on an earlier node the cheapest one is
//! used anyway and a later pass sorts it out. Positions are read fresh for every pair, so a move
//! made earlier in a pass is visible to the pairs after it.
//!
//! Passes repeat until one of them fixes nothing, or until `max_passes` passes have run.

use serde::{Deserialize, Serialize};
use springbox_graph::geom::{self, Rect};
use springbox_graph::{Graph, GraphNode};

/// Absorbs float noise when a box was placed exactly `margin` away from another.
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlapOptions {
    /// Minimum gap between two boxes.
    pub margin: f64,
    /// Upper bound on resolver passes; `0` is treated as `1`.
    pub max_passes: usize,
}

impl Default for OverlapOptions {
    fn default() -> Self {
        Self {
            margin: 5.0,
            max_passes: 100,
        }
    }
}

impl OverlapOptions {
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(format!(
                "overlap.margin must be a non-negative finite number, got {}",
                self.margin
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemovalOutcome {
    /// `true` when the last pass found nothing to fix.
    pub converged: bool,
    /// Total number of node moves across all passes.
    pub fixed: usize,
    pub passes: usize,
}

/// Outcome of one resolver pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapPass {
    /// 1-based pass number.
    pub pass: usize,
    pub fixed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct OverlapRemoval {
    options: OverlapOptions,
}

impl OverlapRemoval {
    pub fn new(options: OverlapOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &OverlapOptions {
        &self.options
    }

    pub fn margin(&self) -> f64 {
        self.options.margin
    }

    /// Number of overlapping pairs.
    pub fn count_overlaps(&self, graph: &Graph) -> usize {
        let nodes: Vec<&GraphNode> = graph.nodes().collect();
        let mut count = 0;
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                if overlaps(nodes[i], nodes[j], self.options.margin) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Runs a single pass over all pairs and returns how many moves it made.
    pub fn resolve_pass(&self, graph: &mut Graph) -> usize {
        let margin = self.options.margin;
        let n = graph.len();
        let mut fixed = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                let (Some(anchor), Some(mover)) = (graph.node_at(i), graph.node_at(j)) else {
                    continue;
                };
                if !overlaps(anchor, mover, margin) {
                    continue;
                }
                let Some((left, top)) = placement(graph, j, anchor, mover, margin) else {
                    tracing::warn!(id = mover.id(), "no finite position clears the overlap");
                    continue;
                };
                let Some(mover) = graph.node_at_mut(j) else {
                    continue;
                };
                tracing::trace!(
                    id = mover.id(),
                    from_left = mover.left,
                    from_top = mover.top,
                    left,
                    top,
                    "moved node clear of overlap"
                );
                if mover.set_position(left, top).is_ok() {
                    fixed += 1;
                }
            }
        }
        fixed
    }

    pub fn remove_overlaps(&self, graph: &mut Graph) -> RemovalOutcome {
        self.remove_overlaps_with_progress(graph, |_, _| {})
    }

    /// Like [`OverlapRemoval::remove_overlaps`], calling `on_pass` after every pass.
    pub fn remove_overlaps_with_progress<F>(
        &self,
        graph: &mut Graph,
        mut on_pass: F,
    ) -> RemovalOutcome
    where
        F: FnMut(&Graph, &OverlapPass),
    {
        let max_passes = self.options.max_passes.max(1);
        let mut outcome = RemovalOutcome::default();
        while outcome.passes < max_passes {
            let fixed = self.resolve_pass(graph);
            outcome.passes += 1;
            outcome.fixed += fixed;
            on_pass(
                graph,
                &OverlapPass {
                    pass: outcome.passes,
                    fixed,
                },
            );
            tracing::trace!(pass = outcome.passes, fixed, "overlap pass");
            if fixed == 0 {
                outcome.converged = true;
                break;
            }
        }

        if !outcome.converged {
            tracing::warn!(
                passes = outcome.passes,
                fixed = outcome.fixed,
                "overlap removal stopped at its pass limit"
            );
        }
        tracing::debug!(
            nodes = graph.len(),
            passes = outcome.passes,
            fixed = outcome.fixed,
            converged = outcome.converged,
            "overlap removal finished"
        );
        outcome
    }
}

/// `true` when the boxes, grown by `margin`, intersect with positive penetration.
pub fn overlaps(a: &GraphNode, b: &GraphNode, margin: f64) -> bool {
    rects_overlap(&a.rect(), &b.rect(), margin)
}

fn rects_overlap(a: &Rect, b: &Rect, margin: f64) -> bool {
    a.min_x() < b.max_x() + margin - EPSILON
        && b.min_x() < a.max_x() + margin - EPSILON
        && a.min_y() < b.max_y() + margin - EPSILON
        && b.min_y() < a.max_y() + margin - EPSILON
}

/// Where the node at `index` goes to clear `anchor`. `None` only when no candidate is finite.
fn placement(
    graph: &Graph,
    index: usize,
    anchor: &GraphNode,
    mover: &GraphNode,
    margin: f64,
) -> Option<(f64, f64)> {
    let finite: Vec<(f64, f64)> = candidates(anchor, mover, margin)
        .into_iter()
        .filter(|(left, top)| left.is_finite() && top.is_finite())
        .collect();
    let clears_earlier = |&(left, top): &(f64, f64)| {
        let moved = geom::rect(left, top, mover.width(), mover.height());
        graph
            .nodes()
            .take(index)
            .all(|other| !rects_overlap(&other.rect(), &moved, margin))
    };
    finite
        .iter()
        .copied()
        .find(clears_earlier)
        .or_else(|| finite.first().copied())
}

/// The `(left, top)` positions that clear `anchor` by `margin`, cheapest move first.
///
/// Before sorting they are listed horizontal before vertical, near side before far side, and the
/// sort is stable, so that order settles ties.
fn candidates(anchor: &GraphNode, mover: &GraphNode, margin: f64) -> [(f64, f64); 4] {
    let (ac, mc) = (anchor.center(), mover.center());
    let right = (anchor.right() + margin, mover.top);
    let left = (anchor.left - margin - mover.width(), mover.top);
    let below = (mover.left, anchor.bottom() + margin);
    let above = (mover.left, anchor.top - margin - mover.height());

    let (near_x, far_x) = if mc.x >= ac.x { (right, left) } else { (left, right) };
    let (near_y, far_y) = if mc.y >= ac.y { (below, above) } else { (above, below) };

    let cost = |(left, top): (f64, f64)| (left - mover.left).abs() + (top - mover.top).abs();
    let mut out = [near_x, far_x, near_y, far_y];
    out.sort_by(|a, b| cost(*a).total_cmp(&cost(*b)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(id: &str, left: f64, top: f64, width: f64, height: f64) -> GraphNode {
        GraphNode::new(id, left, top, width, height).unwrap()
    }

    #[test]
    fn boxes_exactly_margin_apart_do_not_overlap() {
        let a = boxed("a", 0.0, 0.0, 10.0, 10.0);
        assert!(!overlaps(&a, &boxed("b", 15.0, 0.0, 10.0, 10.0), 5.0));
        assert!(overlaps(&a, &boxed("b", 14.9, 0.0, 10.0, 10.0), 5.0));
        assert!(!overlaps(&a, &boxed("b", 0.0, 15.0, 10.0, 10.0), 5.0));
        assert!(!overlaps(&a, &boxed("b", 10.0, 10.0, 10.0, 10.0), 0.0));
        assert!(overlaps(&a, &boxed("b", -3.0, 2.0, 4.0, 4.0), 0.0));
    }

    #[test]
    fn cheapest_candidate_is_on_the_center_side() {
        let anchor = boxed("a", 0.0, 0.0, 100.0, 100.0);

        // Mostly to the right: pushed right.
        let m = boxed("m", 80.0, 10.0, 40.0, 40.0);
        assert_eq!(candidates(&anchor, &m, 5.0)[0], (105.0, 10.0));

        // Mostly above: pushed up.
        let m = boxed("m", 30.0, -20.0, 40.0, 40.0);
        assert_eq!(candidates(&anchor, &m, 5.0)[0], (30.0, -45.0));

        // Left of center: pushed left of the anchor.
        let m = boxed("m", -10.0, 30.0, 40.0, 40.0);
        assert_eq!(candidates(&anchor, &m, 5.0)[0], (-45.0, 30.0));
    }

    #[test]
    fn equal_moves_prefer_horizontal() {
        let anchor = boxed("a", 0.0, 0.0, 100.0, 100.0);
        let m = boxed("m", 90.0, 90.0, 20.0, 20.0);
        assert_eq!(
            candidates(&anchor, &m, 0.0),
            [(100.0, 90.0), (90.0, 100.0), (90.0, -20.0), (-20.0, 90.0)]
        );
    }

    #[test]
    fn placement_skips_positions_taken_by_earlier_nodes() {
        let mut g = Graph::new();
        g.add_node(boxed("hub", 0.0, 0.0, 250.0, 250.0)).unwrap();
        g.add_node(boxed("west", -65.0, 0.0, 60.0, 60.0)).unwrap();
        g.add_node(boxed("m", 0.0, 0.0, 60.0, 60.0)).unwrap();

        let (hub, m) = (g.node("hub").unwrap(), g.node("m").unwrap());
        assert_eq!(candidates(hub, m, 5.0)[0], (-65.0, 0.0));
        assert_eq!(placement(&g, 2, hub, m, 5.0), Some((0.0, -65.0)));
    }

    #[test]
    fn placement_falls_back_to_the_cheapest_move_when_boxed_in() {
        let mut g = Graph::new();
        g.add_node(boxed("a", 0.0, 0.0, 100.0, 100.0)).unwrap();
        for (id, left, top) in [
            ("e", 105.0, 0.0),
            ("w", -105.0, 0.0),
            ("s", 0.0, 105.0),
            ("n", 0.0, -105.0),
        ] {
            g.add_node(boxed(id, left, top, 100.0, 100.0)).unwrap();
        }
        g.add_node(boxed("m", 0.0, 0.0, 100.0, 100.0)).unwrap();

        let (a, m) = (g.node("a").unwrap(), g.node("m").unwrap());
        assert_eq!(placement(&g, 5, a, m, 5.0), Some((105.0, 0.0)));
    }

    #[test]
    fn huge_boxes_keep_finite_positions() {
        let mut g = Graph::new();
        g.add_node(boxed("a", 0.0, 0.0, f64::MAX, 10.0)).unwrap();
        g.add_node(boxed("b", f64::MAX / 2.0, 0.0, f64::MAX, 10.0))
            .unwrap();

        let (a, b) = (g.node("a").unwrap(), g.node("b").unwrap());
        assert_eq!(placement(&g, 1, a, b, 5.0), Some((f64::MAX / 2.0, 15.0)));
        let removal = OverlapRemoval::default();
        assert_eq!(removal.resolve_pass(&mut g), 1);
        assert!(g.nodes().all(|n| n.left.is_finite() && n.top.is_finite()));
    }

    #[test]
    fn zero_max_passes_still_runs_once() {
        let mut g = Graph::new();
        g.add_node(boxed("a", 0.0, 0.0, 50.0, 50.0)).unwrap();
        g.add_node(boxed("b", 10.0, 0.0, 50.0, 50.0)).unwrap();
        let removal = OverlapRemoval::new(OverlapOptions {
            margin: 5.0,
            max_passes: 0,
        });
        let outcome = removal.remove_overlaps(&mut g);
        assert_eq!(
            outcome,
            RemovalOutcome {
                converged: false,
                fixed: 1,
                passes: 1
            }
        );
        assert_eq!(removal.count_overlaps(&g), 0);
    }
}

//! Spring embedder over layout-space node positions.
//!
//! Every pair of nodes repels with magnitude `repulsion_strength / d` (within
//! `repulsion_range`), every edge pulls its endpoints towards `ideal_edge_length` with a Hooke
//! spring. Each step moves a node by `damping * force`, clamped per axis to the current
//! temperature; the temperature cools geometrically down to `min_step`. The simulation stops once
//! the total displacement of a step drops below `convergence_threshold` per node, or after
//! `max_iterations` steps.
//!
//! When the run ends the layout is translated so its centroid matches the centroid it started
//! from. Warm-started relayouts therefore stay where the user left them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use springbox_graph::Graph;
use springbox_graph::geom::Size;
use std::f64::consts::TAU;

/// Distances below this are treated as coincident.
const MIN_DISTANCE: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpringOptions {
    pub ideal_edge_length: f64,
    pub repulsion_strength: f64,
    /// Pairs further apart than this do not repel. `<= 0` means unbounded.
    pub repulsion_range: f64,
    pub stiffness: f64,
    pub damping: f64,
    /// Initial per-axis displacement cap.
    pub max_step: f64,
    /// Floor for the per-axis displacement cap.
    pub min_step: f64,
    pub cooling_rate: f64,
    pub max_iterations: usize,
    /// Per-node total displacement below which a step counts as converged.
    pub convergence_threshold: f64,
}

impl Default for SpringOptions {
    fn default() -> Self {
        Self {
            ideal_edge_length: 180.0,
            repulsion_strength: 8100.0,
            repulsion_range: 900.0,
            stiffness: 1.0,
            damping: 0.1,
            max_step: 30.0,
            min_step: 0.5,
            cooling_rate: 0.98,
            max_iterations: 500,
            convergence_threshold: 0.05,
        }
    }
}

impl SpringOptions {
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        let finite = [
            ("idealEdgeLength", self.ideal_edge_length),
            ("repulsionStrength", self.repulsion_strength),
            ("repulsionRange", self.repulsion_range),
            ("stiffness", self.stiffness),
            ("damping", self.damping),
            ("maxStep", self.max_step),
            ("minStep", self.min_step),
            ("coolingRate", self.cooling_rate),
            ("convergenceThreshold", self.convergence_threshold),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(format!("spring.{name} must be finite, got {v}"));
            }
        }
        for (name, v) in [
            ("idealEdgeLength", self.ideal_edge_length),
            ("damping", self.damping),
            ("maxStep", self.max_step),
        ] {
            if v <= 0.0 {
                return Err(format!("spring.{name} must be positive, got {v}"));
            }
        }
        for (name, v) in [
            ("repulsionStrength", self.repulsion_strength),
            ("stiffness", self.stiffness),
            ("minStep", self.min_step),
            ("convergenceThreshold", self.convergence_threshold),
        ] {
            if v < 0.0 {
                return Err(format!("spring.{name} must not be negative, got {v}"));
            }
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate <= 1.0) {
            return Err(format!(
                "spring.coolingRate must be in (0, 1], got {}",
                self.cooling_rate
            ));
        }
        Ok(())
    }
}

/// Outcome of one simulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringStep {
    /// 1-based step number.
    pub iteration: usize,
    /// Sum of `|dx| + |dy|` over all nodes.
    pub displacement: f64,
    /// Per-axis cap that was applied during this step.
    pub temperature: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpringStats {
    pub iterations: usize,
    pub converged: bool,
    pub final_displacement: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SpringLayout {
    options: SpringOptions,
}

impl SpringLayout {
    pub fn new(options: SpringOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SpringOptions {
        &self.options
    }

    /// Prepares a run over `graph`.
    ///
    /// Unless `keep_current_positions` is set, every node first gets a random layout position in
    /// `[0, extent.width) x [0, extent.height)`. Graphs with fewer than two nodes are left
    /// untouched and produce a run that is already finished.
    pub fn start<R: Rng>(
        &self,
        graph: &mut Graph,
        extent: Size,
        keep_current_positions: bool,
        rng: &mut R,
    ) -> SpringRun {
        let node_count = graph.len();
        if node_count < 2 {
            return SpringRun {
                options: self.options.clone(),
                rng: StdRng::seed_from_u64(0),
                edges: Vec::new(),
                node_count,
                origin: (0.0, 0.0),
                temperature: self.options.max_step,
                stats: SpringStats {
                    converged: true,
                    ..SpringStats::default()
                },
                finished: true,
            };
        }

        if !keep_current_positions {
            for node in graph.nodes_mut() {
                node.layout_x = rng.random::<f64>() * extent.width;
                node.layout_y = rng.random::<f64>() * extent.height;
            }
        }

        let edges = graph
            .edge_index_pairs()
            .into_iter()
            .filter(|(a, b)| a != b)
            .collect();

        SpringRun {
            options: self.options.clone(),
            rng: StdRng::seed_from_u64(rng.random::<u64>()),
            edges,
            node_count,
            origin: centroid(graph),
            temperature: self.options.max_step,
            stats: SpringStats::default(),
            finished: false,
        }
    }

    /// Runs the simulation to completion.
    pub fn layout<R: Rng>(
        &self,
        graph: &mut Graph,
        extent: Size,
        keep_current_positions: bool,
        rng: &mut R,
    ) -> SpringStats {
        self.layout_with_progress(graph, extent, keep_current_positions, rng, |_, _| {})
    }

    /// Like [`SpringLayout::layout`], calling `on_step` after every step.
    pub fn layout_with_progress<R, F>(
        &self,
        graph: &mut Graph,
        extent: Size,
        keep_current_positions: bool,
        rng: &mut R,
        mut on_step: F,
    ) -> SpringStats
    where
        R: Rng,
        F: FnMut(&Graph, &SpringStep),
    {
        let mut run = self.start(graph, extent, keep_current_positions, rng);
        while let Some(step) = run.step(graph) {
            on_step(graph, &step);
        }
        let stats = run.stats();
        tracing::debug!(
            nodes = graph.len(),
            iterations = stats.iterations,
            converged = stats.converged,
            displacement = stats.final_displacement,
            "spring layout finished"
        );
        stats
    }
}

/// An in-progress simulation. Drive it with [`SpringRun::step`]; dropping it early simply stops
/// the layout where it is.
#[derive(Debug, Clone)]
pub struct SpringRun {
    options: SpringOptions,
    rng: StdRng,
    edges: Vec<(usize, usize)>,
    node_count: usize,
    origin: (f64, f64),
    temperature: f64,
    stats: SpringStats,
    finished: bool,
}

impl SpringRun {
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn stats(&self) -> SpringStats {
        self.stats
    }

    /// Advances the simulation by one step. Returns `None` once the run has finished.
    ///
    /// The run ends if the graph gains or loses nodes between steps.
    pub fn step(&mut self, graph: &mut Graph) -> Option<SpringStep> {
        if self.finished {
            return None;
        }
        if graph.len() != self.node_count {
            tracing::warn!(
                expected = self.node_count,
                actual = graph.len(),
                "graph changed during spring layout; stopping"
            );
            self.finished = true;
            return None;
        }

        let opts = &self.options;
        let n = self.node_count;
        let pos: Vec<(f64, f64)> = graph
            .nodes()
            .map(|node| (node.layout_x, node.layout_y))
            .collect();
        let mut force = vec![(0.0f64, 0.0f64); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let mut dx = pos[j].0 - pos[i].0;
                let mut dy = pos[j].1 - pos[i].1;
                let mut d = dx.hypot(dy);
                if d < MIN_DISTANCE {
                    let angle = self.rng.random::<f64>() * TAU;
                    dx = angle.cos() * MIN_DISTANCE;
                    dy = angle.sin() * MIN_DISTANCE;
                    d = MIN_DISTANCE;
                }
                if opts.repulsion_range > 0.0 && d >= opts.repulsion_range {
                    continue;
                }
                let f = opts.repulsion_strength / d;
                let (fx, fy) = (f * dx / d, f * dy / d);
                force[i].0 -= fx;
                force[i].1 -= fy;
                force[j].0 += fx;
                force[j].1 += fy;
            }
        }

        for &(a, b) in &self.edges {
            let dx = pos[b].0 - pos[a].0;
            let dy = pos[b].1 - pos[a].1;
            let d = dx.hypot(dy);
            if d < MIN_DISTANCE {
                continue;
            }
            let f = opts.stiffness * (d - opts.ideal_edge_length);
            let (fx, fy) = (f * dx / d, f * dy / d);
            force[a].0 += fx;
            force[a].1 += fy;
            force[b].0 -= fx;
            force[b].1 -= fy;
        }

        let cap = self.temperature;
        let mut displacement = 0.0;
        for (node, (fx, fy)) in graph.nodes_mut().zip(force) {
            let mx = (opts.damping * fx).clamp(-cap, cap);
            let my = (opts.damping * fy).clamp(-cap, cap);
            node.layout_x += mx;
            node.layout_y += my;
            displacement += mx.abs() + my.abs();
        }

        self.stats.iterations += 1;
        self.stats.final_displacement = displacement;
        self.stats.converged = displacement < opts.convergence_threshold * n as f64;
        self.temperature = (self.temperature * opts.cooling_rate).max(opts.min_step);

        let step = SpringStep {
            iteration: self.stats.iterations,
            displacement,
            temperature: cap,
        };
        tracing::trace!(
            iteration = step.iteration,
            displacement,
            temperature = cap,
            "spring step"
        );

        if self.stats.converged || self.stats.iterations >= opts.max_iterations {
            self.finished = true;
            let (cx, cy) = centroid(graph);
            let (dx, dy) = (self.origin.0 - cx, self.origin.1 - cy);
            for node in graph.nodes_mut() {
                node.layout_x += dx;
                node.layout_y += dy;
            }
        }
        Some(step)
    }

    /// Runs the remaining steps and returns the final statistics.
    pub fn finish(mut self, graph: &mut Graph) -> SpringStats {
        while self.step(graph).is_some() {}
        self.stats
    }
}

fn centroid(graph: &Graph) -> (f64, f64) {
    let n = graph.len().max(1) as f64;
    let (sx, sy) = graph
        .nodes()
        .fold((0.0, 0.0), |(sx, sy), node| (sx + node.layout_x, sy + node.layout_y));
    (sx / n, sy / n)
}

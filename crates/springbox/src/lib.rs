#![forbid(unsafe_code)]

//! Headless layout for box-and-edge diagrams.
//!
//! Two algorithms work on a [`Graph`] from `springbox-graph`:
//!
//! - [`SpringLayout`] places nodes with a spring embedder in a dimensionless layout space, so
//!   that connected nodes cluster together;
//! - [`OverlapRemoval`] then nudges world-space boxes apart until no two of them overlap.
//!
//! [`CoordinateMapper`] converts between the two spaces, and [`LayoutEngine`] ties everything
//! together the way an interactive editor drives it. Randomness is always injected: the engine
//! owns a `StdRng` seeded from [`LayoutConfig::seed`], so the same input and seed produce the same
//! layout.

pub mod config;
pub mod coords;
pub mod engine;
pub mod error;
pub mod overlap;
pub mod spring;

pub use config::{LayoutConfig, Viewport};
pub use coords::CoordinateMapper;
pub use engine::{LayoutEngine, Progress, ProgressFn, RelayoutReport};
pub use error::{Error, Result};
pub use overlap::{OverlapOptions, OverlapPass, OverlapRemoval, RemovalOutcome};
pub use spring::{SpringLayout, SpringOptions, SpringRun, SpringStats, SpringStep};
pub use springbox_graph::{Edge, Graph, GraphNode, geom};

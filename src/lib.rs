//! # Graph Balancing Engine
//!
//! A Rust library for the graph balancing problem: orient every edge of a
//! weighted multigraph toward one of its endpoints so that the maximum vertex
//! load (dedicated load plus incoming edge weights) is as small as possible.
//!
//! This crate provides:
//! - A compact indexed graph state with per-vertex incidence lists and
//!   dedicated loads.
//! - The LP relaxation with per-vertex load and big-edge star constraints,
//!   behind a swappable solver backend.
//! - A deterministic rounding procedure (leaf assignments, tree assignments,
//!   and cycle rotations) with a guaranteed approximation factor of 1.75.
//! - Decision and binary-search optimization drivers.
//!
//! ## Quick Start
//!
//! ```
//! use graph_balance::prelude::*;
//!
//! // one edge of weight 0.5 between two unloaded vertices
//! let graph = Graph::new(2, vec![(0, 1)], vec![0.5], vec![0.0, 0.0]).unwrap();
//!
//! let cfg = BalanceConfig::default();
//! let orientation = decide(&graph, 1.0, &cfg, &default_backends())
//!     .expect("solver available")
//!     .expect("instance is feasible");
//! assert!((orientation.makespan(&graph) - 0.5).abs() < 1e-9);
//! ```
//!
//! ## Finding the Best Makespan
//!
//! ```
//! use graph_balance::prelude::*;
//!
//! let graph = Graph::new(3, vec![(0, 1), (1, 2)], vec![1.0, 1.0], vec![0.0; 3]).unwrap();
//! let cfg = BalanceConfig::default();
//! let best = optimize(&graph, &cfg, &default_backends()).unwrap().unwrap();
//! assert!(best.makespan(&graph) <= 1.75 * (1.0 + cfg.binary_search_tol));
//! ```
//!
//! ## Modules
//!
//! - [`graph`]: Graph and orientation state, plus the plain-text instance format.
//! - [`fractional`]: Fractional assignments and their support subgraph.
//! - [`lp`]: The relaxation as plain data and the solver backend abstraction.
//! - [`rotate`]: The cycle-rotation primitive.
//! - [`cycle`]: The big-edge-preferring cycle finder.
//! - [`round`]: The rounding state machine.
//! - [`algorithm`]: Configuration and the decision/optimization drivers.
//! - [`generators`]: Test and benchmark instance generators.
//! - [`validate`]: Deterministic validation of results.
//!
//! ## Determinism
//!
//! Given the same instance and the same LP backend, every driver produces a
//! bit-identical orientation across runs: vertex and edge indices are stable,
//! ties in the cycle walk and the leaf scan go to the smallest index, and
//! tree assignments visit children in ascending vertex order.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::many_single_char_names)] // Mathematical variable names
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod algorithm;
pub mod cycle;
pub mod fractional;
pub mod generators;
pub mod graph;
pub mod lp;
pub mod rotate;
pub mod round;
pub mod validate;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::algorithm::{decide, lp_balance, optimize, BalanceConfig, BalanceError};
    pub use crate::fractional::FractionalAssignment;
    pub use crate::graph::{parse_instance, write_instance, Graph, Orientation};
    pub use crate::lp::{default_backends, LpBackend, LpError};
    pub use crate::round::round;
    pub use crate::validate::validate_orientation;
}

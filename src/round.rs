//! The rounding state machine: leaf assignments, tree assignments, and cycle
//! rotations, applied until the fractional assignment is integral.
//!
//! Each step removes at least one edge from the fractional support, so the
//! procedure halts within `|E|` steps. The thresholds (3/4 for the
//! leaf-vs-tree split, big-edge preference in the cycle walk) are exactly
//! what keeps every intermediate load within the approximation guarantee.

use std::collections::VecDeque;
use std::fmt;

use crate::algorithm::BalanceConfig;
use crate::cycle::find_cycle;
use crate::fractional::FractionalAssignment;
use crate::graph::{Graph, Orientation};
use crate::rotate::{rotate, RotateError};

/// Fatal failures of the rounding procedure. Any of these means the
/// fractional input did not satisfy the relaxation's structural guarantees
/// (or a bug), never that the instance is merely hard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundError {
    /// No leaf exists but the cycle walk dead-ended.
    NoCycle,
    /// A step failed to shrink the fractional support.
    Stalled,
    /// A vertex had support degree 1 but no incident support edge was found.
    MissingLeafEdge {
        /// The inconsistent vertex.
        vertex: usize,
    },
    /// The big-support component scheduled for a tree assignment contains a
    /// cycle.
    BigComponentCycle {
        /// The edge closing the cycle.
        edge: usize,
    },
    /// A rotation was handed a malformed cycle.
    Rotate(RotateError),
}

impl fmt::Display for RoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundError::NoCycle => write!(f, "leafless support contains no directed cycle"),
            RoundError::Stalled => write!(f, "rounding step did not shrink the support"),
            RoundError::MissingLeafEdge { vertex } => {
                write!(f, "vertex {vertex} has support degree 1 but no support edge")
            }
            RoundError::BigComponentCycle { edge } => {
                write!(f, "big-edge component is not a tree (edge {edge} closes a cycle)")
            }
            RoundError::Rotate(e) => write!(f, "rotation failed: {e}"),
        }
    }
}

impl std::error::Error for RoundError {}

impl From<RotateError> for RoundError {
    fn from(e: RotateError) -> Self {
        RoundError::Rotate(e)
    }
}

/// Rounds a fractional assignment into a total orientation.
///
/// Consumes `x` and repeatedly applies, in order of preference:
/// 1. **Leaf assignment** — a support leaf `v` with edge `e = {u, v}` and
///    `x_eu * p_e <= leaf_threshold` takes `e` entirely (ties choose this
///    rule).
/// 2. **Tree assignment** — otherwise the big-support component containing
///    `e` is oriented away from `v`, breadth-first, children in ascending
///    vertex order.
/// 3. **Rotation** — with no leaf anywhere, a directed cycle is located and
///    rotated.
///
/// # Errors
/// Returns a [`RoundError`] when the support's structural invariants do not
/// hold; see the variant docs. These indicate corrupt fractional input, not
/// an infeasible instance.
pub fn round(
    graph: &Graph,
    x: FractionalAssignment,
    cfg: &BalanceConfig,
) -> Result<Orientation, RoundError> {
    run(graph, x, cfg).map(|(orientation, _)| orientation)
}

/// Driver loop; also reports the number of macro-steps taken.
fn run(
    graph: &Graph,
    mut x: FractionalAssignment,
    cfg: &BalanceConfig,
) -> Result<(Orientation, usize), RoundError> {
    let mut steps = 0usize;
    let mut support = x.support_edges();

    while !support.is_empty() {
        let mut degree = vec![0usize; graph.num_vertices()];
        for &e in &support {
            let (u, v) = graph.endpoints(e);
            degree[u] += 1;
            degree[v] += 1;
        }

        match (0..graph.num_vertices()).find(|&v| degree[v] == 1) {
            Some(leaf) => {
                let e = graph
                    .incident_edges(leaf)
                    .iter()
                    .copied()
                    .find(|&e| x.is_fractional(e))
                    .ok_or(RoundError::MissingLeafEdge { vertex: leaf })?;
                let other = graph.other_endpoint(e, leaf);
                let alpha = x.get(graph, e, other) * graph.weight(e);
                if alpha <= cfg.leaf_threshold {
                    x.set(graph, e, leaf, 1.0);
                } else {
                    // alpha > 3/4 forces p_e > 3/4, so e is big and anchors a
                    // big-support component
                    assign_tree(graph, &mut x, leaf, cfg)?;
                }
            }
            None => {
                let cycle = find_cycle(graph, &x, cfg).ok_or(RoundError::NoCycle)?;
                rotate(graph, &mut x, &cycle)?;
            }
        }

        let next = x.support_edges();
        if next.len() >= support.len() {
            return Err(RoundError::Stalled);
        }
        support = next;
        steps += 1;
    }

    Ok((x.induced_orientation(graph), steps))
}

/// Orients the big-support component reachable from `root` away from it.
///
/// Every traversed edge is decided toward the child as it is discovered,
/// which also removes it from the support; an edge closing back into the
/// visited set would mean the component is not a tree.
fn assign_tree(
    graph: &Graph,
    x: &mut FractionalAssignment,
    root: usize,
    cfg: &BalanceConfig,
) -> Result<(), RoundError> {
    let mut visited = vec![false; graph.num_vertices()];
    visited[root] = true;
    let mut queue = VecDeque::new();
    queue.push_back(root);

    while let Some(parent) = queue.pop_front() {
        let mut children: Vec<(usize, usize)> = Vec::new();
        for &f in graph.incident_edges(parent) {
            if !x.is_fractional(f) || !graph.is_big(f, cfg.big_threshold) {
                continue;
            }
            let child = graph.other_endpoint(f, parent);
            if visited[child] {
                return Err(RoundError::BigComponentCycle { edge: f });
            }
            children.push((child, f));
        }
        children.sort_unstable();
        for (child, f) in children {
            if visited[child] {
                // two fresh edges reached the same child from this parent
                return Err(RoundError::BigComponentCycle { edge: f });
            }
            x.set(graph, f, child, 1.0);
            visited[child] = true;
            queue.push_back(child);
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

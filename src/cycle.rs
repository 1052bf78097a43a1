//! Locating a directed cycle in the fractional support.
//!
//! The walk starts at the smallest vertex touching the support and keeps
//! extending, never leaving through the edge it arrived by, preferring big
//! edges (ties broken by smallest edge index). The first time a vertex is
//! revisited, the suffix of the walk from that vertex is the cycle. Tails
//! follow the walk direction, which is the convention [`rotate`] decreases.
//!
//! When the support has no leaf every support vertex has degree at least 2,
//! so the walk can always leave a vertex by a fresh edge and must close a
//! cycle within `|E_x|` steps.
//!
//! [`rotate`]: crate::rotate::rotate

use crate::algorithm::BalanceConfig;
use crate::fractional::FractionalAssignment;
use crate::graph::Graph;
use crate::rotate::CycleStep;

/// Finds a directed cycle in the fractional support of `x`, or `None` when
/// the walk dead-ends (which cannot happen while the support is leafless).
///
/// The result chains head-to-tail, uses only support edges, and is
/// deterministic for a given assignment.
pub fn find_cycle(
    graph: &Graph,
    x: &FractionalAssignment,
    cfg: &BalanceConfig,
) -> Option<Vec<CycleStep>> {
    let support = x.support_edges();
    let start = support
        .iter()
        .map(|&e| {
            let (u, v) = graph.endpoints(e);
            u.min(v)
        })
        .min()?;

    // position of each vertex along the walk, usize::MAX when unvisited
    let mut position = vec![usize::MAX; graph.num_vertices()];
    let mut path: Vec<CycleStep> = Vec::new();
    let mut current = start;
    let mut arrival_edge: Option<usize> = None;

    for _ in 0..=support.len() {
        position[current] = path.len();

        // (small-before-big is inverted so big edges sort first)
        let next = graph
            .incident_edges(current)
            .iter()
            .copied()
            .filter(|&e| x.is_fractional(e) && Some(e) != arrival_edge)
            .min_by_key(|&e| (!graph.is_big(e, cfg.big_threshold), e))?;

        let head = graph.other_endpoint(next, current);
        path.push(CycleStep {
            edge: next,
            tail: current,
            head,
        });
        if position[head] != usize::MAX {
            return Some(path.split_off(position[head]));
        }
        arrival_edge = Some(next);
        current = head;
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

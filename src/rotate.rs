//! The cycle-rotation primitive of the rounding procedure.
//!
//! Rotating a directed cycle shifts fractional mass around it: every tail
//! variable drops by `delta / p_e` and every head variable rises by the same
//! amount, where `delta = min x_{e,tail} * p_e` over the cycle. Because each
//! cycle vertex appears exactly once as a head and once as a tail, its total
//! fractional load is unchanged, while the minimizing edge's tail variable is
//! driven to exactly 0.

use std::fmt;

use crate::fractional::FractionalAssignment;
use crate::graph::Graph;

/// One step of a directed cycle: edge `edge` traversed from `tail` to `head`.
///
/// Steps chain head-to-tail; edges are identified by index because parallel
/// edges are legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleStep {
    /// Edge index.
    pub edge: usize,
    /// The endpoint whose variable is decreased.
    pub tail: usize,
    /// The endpoint whose variable is increased.
    pub head: usize,
}

/// Ways a purported directed cycle can be malformed. All fatal: they indicate
/// corrupt LP output or a bug in the cycle finder, never an instance property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RotateError {
    /// The cycle has no steps.
    EmptyCycle,
    /// A step's head is not the next step's tail.
    BrokenChain {
        /// Position of the offending step.
        position: usize,
    },
    /// A step's tail/head pair does not match its edge's endpoints.
    NotAnEndpoint {
        /// Position of the offending step.
        position: usize,
        /// The step's edge index.
        edge: usize,
    },
    /// A step's edge is not in the fractional support.
    NotFractional {
        /// Position of the offending step.
        position: usize,
        /// The step's edge index.
        edge: usize,
    },
}

impl fmt::Display for RotateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotateError::EmptyCycle => write!(f, "cycle is empty"),
            RotateError::BrokenChain { position } => {
                write!(f, "cycle step {position} does not chain into its successor")
            }
            RotateError::NotAnEndpoint { position, edge } => {
                write!(f, "cycle step {position} does not match the endpoints of edge {edge}")
            }
            RotateError::NotFractional { position, edge } => {
                write!(f, "cycle step {position} uses edge {edge} outside the fractional support")
            }
        }
    }
}

impl std::error::Error for RotateError {}

/// Rotates `x` along the directed cycle, driving at least one tail variable
/// to 0 while preserving every edge constraint and every vertex's fractional
/// load.
///
/// # Errors
/// Returns a [`RotateError`] if the cycle is empty, does not chain, names a
/// non-endpoint, or uses an edge outside the support.
pub fn rotate(
    graph: &Graph,
    x: &mut FractionalAssignment,
    cycle: &[CycleStep],
) -> Result<(), RotateError> {
    if cycle.is_empty() {
        return Err(RotateError::EmptyCycle);
    }
    for (position, step) in cycle.iter().enumerate() {
        let next = &cycle[(position + 1) % cycle.len()];
        if step.head != next.tail {
            return Err(RotateError::BrokenChain { position });
        }
        let (a, b) = graph.endpoints(step.edge);
        let matches_edge =
            (step.tail == a && step.head == b) || (step.tail == b && step.head == a);
        if !matches_edge {
            return Err(RotateError::NotAnEndpoint {
                position,
                edge: step.edge,
            });
        }
        if !x.is_fractional(step.edge) {
            return Err(RotateError::NotFractional {
                position,
                edge: step.edge,
            });
        }
    }

    let delta = cycle
        .iter()
        .map(|step| x.get(graph, step.edge, step.tail) * graph.weight(step.edge))
        .fold(f64::INFINITY, f64::min);
    debug_assert!(delta > 0.0, "support edges have strictly positive tails");

    for step in cycle {
        let tail_value = x.get(graph, step.edge, step.tail) - delta / graph.weight(step.edge);
        // set() snaps values within eps, so the minimizing edge leaves the
        // support even under floating-point noise
        x.set(graph, step.edge, step.tail, tail_value);
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    const EPS: f64 = 1e-9;

    /// 4-cycle 0-1-2-3-0 with mixed weights, everything fractional.
    fn square() -> (Graph, FractionalAssignment) {
        let g = Graph::new(
            4,
            vec![(0, 1), (1, 2), (2, 3), (3, 0)],
            vec![0.6, 0.3, 0.9, 0.6],
            vec![0.05, 0.0, 0.1, 0.0],
        )
        .unwrap();
        let raw = vec![(0.5, 0.5), (0.25, 0.75), (0.4, 0.6), (0.7, 0.3)];
        let x = FractionalAssignment::from_raw(&g, &raw, EPS);
        (g, x)
    }

    fn square_cycle() -> Vec<CycleStep> {
        vec![
            CycleStep { edge: 0, tail: 0, head: 1 },
            CycleStep { edge: 1, tail: 1, head: 2 },
            CycleStep { edge: 2, tail: 2, head: 3 },
            CycleStep { edge: 3, tail: 3, head: 0 },
        ]
    }

    // -------------------------------------------------------------------------
    // Semantics
    // -------------------------------------------------------------------------

    #[test]
    fn rotate_preserves_fractional_loads() {
        let (g, mut x) = square();
        let before: Vec<f64> = (0..4).map(|v| x.fractional_load(&g, v)).collect();
        rotate(&g, &mut x, &square_cycle()).unwrap();
        for v in 0..4 {
            assert!(
                (x.fractional_load(&g, v) - before[v]).abs() < 1e-9,
                "fractional load changed at vertex {v}"
            );
        }
    }

    #[test]
    fn rotate_preserves_edge_constraints_and_bounds() {
        let (g, mut x) = square();
        rotate(&g, &mut x, &square_cycle()).unwrap();
        for e in 0..4 {
            let (u, v) = g.endpoints(e);
            let sum = x.get(&g, e, u) + x.get(&g, e, v);
            assert!((sum - 1.0).abs() < 1e-9);
            assert!(x.get(&g, e, u) >= 0.0 && x.get(&g, e, u) <= 1.0);
        }
    }

    #[test]
    fn rotate_drives_a_minimizing_edge_out_of_the_support() {
        let (g, mut x) = square();
        // delta is attained at edge 1: 0.25 * 0.3
        rotate(&g, &mut x, &square_cycle()).unwrap();
        assert!(x.is_integral(1));
        assert_eq!(x.get(&g, 1, 1), 0.0);
        assert_eq!(x.get(&g, 1, 2), 1.0);
    }

    #[test]
    fn rotate_on_uniform_triangle_integralizes_every_edge() {
        let g = Graph::new(
            3,
            vec![(0, 1), (1, 2), (2, 0)],
            vec![0.6, 0.6, 0.6],
            vec![0.0; 3],
        )
        .unwrap();
        let mut x =
            FractionalAssignment::from_raw(&g, &[(0.5, 0.5), (0.5, 0.5), (0.5, 0.5)], EPS);
        let cycle = vec![
            CycleStep { edge: 0, tail: 0, head: 1 },
            CycleStep { edge: 1, tail: 1, head: 2 },
            CycleStep { edge: 2, tail: 2, head: 0 },
        ];
        rotate(&g, &mut x, &cycle).unwrap();
        assert!(x.support_edges().is_empty());
        // each edge lands on its head
        let o = x.induced_orientation(&g);
        assert_eq!(o.target(0), Some(1));
        assert_eq!(o.target(1), Some(2));
        assert_eq!(o.target(2), Some(0));
    }

    #[test]
    fn rotate_invariants_hold_on_random_cycles() {
        let mut rng = XorShiftRng::seed_from_u64(0x5EED);
        for _ in 0..100 {
            let n = rng.random_range(3..10);
            let edges: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
            let weights: Vec<f64> = (0..n).map(|_| rng.random_range(0.1..=1.0)).collect();
            let g = Graph::new(n, edges, weights, vec![0.0; n]).unwrap();
            let raw: Vec<(f64, f64)> = (0..n)
                .map(|_| {
                    let a = rng.random_range(0.05..0.95);
                    (a, 1.0 - a)
                })
                .collect();
            let mut x = FractionalAssignment::from_raw(&g, &raw, EPS);
            let before: Vec<f64> = (0..n).map(|v| x.fractional_load(&g, v)).collect();

            let cycle: Vec<CycleStep> = (0..n)
                .map(|i| CycleStep { edge: i, tail: i, head: (i + 1) % n })
                .collect();
            rotate(&g, &mut x, &cycle).unwrap();

            assert!((0..n).any(|e| x.is_integral(e)), "no edge became integral");
            for v in 0..n {
                assert!(
                    (x.fractional_load(&g, v) - before[v]).abs() < 1e-9,
                    "fractional load drifted at vertex {v}"
                );
                let e = v; // edge v starts at vertex v
                let (a, b) = g.endpoints(e);
                let sum = x.get(&g, e, a) + x.get(&g, e, b);
                assert!((sum - 1.0).abs() < 1e-9);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    #[test]
    fn rotate_rejects_empty_cycle() {
        let (g, mut x) = square();
        assert_eq!(rotate(&g, &mut x, &[]), Err(RotateError::EmptyCycle));
    }

    #[test]
    fn rotate_rejects_broken_chain() {
        let (g, mut x) = square();
        let mut cycle = square_cycle();
        cycle[1].head = 3; // edge 1 does not reach vertex 3
        let err = rotate(&g, &mut x, &cycle).unwrap_err();
        // reported either as a chain break or an endpoint mismatch, at step 1
        assert!(matches!(
            err,
            RotateError::BrokenChain { position: 1 } | RotateError::NotAnEndpoint { position: 1, .. }
        ));
    }

    #[test]
    fn rotate_rejects_endpoint_mismatch() {
        let (g, mut x) = square();
        let cycle = vec![
            CycleStep { edge: 0, tail: 0, head: 1 },
            // edge 2 joins {2, 3}, not {1, 0}
            CycleStep { edge: 2, tail: 1, head: 0 },
        ];
        let err = rotate(&g, &mut x, &cycle).unwrap_err();
        assert_eq!(err, RotateError::NotAnEndpoint { position: 1, edge: 2 });
    }

    #[test]
    fn rotate_rejects_integral_edge() {
        let (g, mut x) = square();
        x.set(&g, 1, 2, 1.0);
        let err = rotate(&g, &mut x, &square_cycle()).unwrap_err();
        assert_eq!(err, RotateError::NotFractional { position: 1, edge: 1 });
    }

    #[test]
    fn rotate_does_not_touch_edges_outside_the_cycle() {
        let g = Graph::new(
            4,
            vec![(0, 1), (1, 2), (2, 0), (2, 3)],
            vec![0.6, 0.6, 0.6, 0.4],
            vec![0.0; 4],
        )
        .unwrap();
        let mut x = FractionalAssignment::from_raw(
            &g,
            &[(0.5, 0.5), (0.5, 0.5), (0.5, 0.5), (0.3, 0.7)],
            EPS,
        );
        let cycle = vec![
            CycleStep { edge: 0, tail: 0, head: 1 },
            CycleStep { edge: 1, tail: 1, head: 2 },
            CycleStep { edge: 2, tail: 2, head: 0 },
        ];
        rotate(&g, &mut x, &cycle).unwrap();
        assert!((x.get(&g, 3, 2) - 0.3).abs() < 1e-12);
    }
}

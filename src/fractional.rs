//! Fractional edge assignments and the support subgraph they induce.
//!
//! For each edge `e = {u, v}` the assignment carries the pair
//! `(x_eu, x_ev)` with `x_eu + x_ev = 1`; `x_ev` reads as "the fraction of
//! `e` assigned to `v`". Only one value per edge is stored (the one belonging
//! to the numerically smaller endpoint), so the edge constraint holds by
//! construction and clamp-and-renormalize is needed only once, at the LP
//! boundary.

use crate::graph::{Graph, Orientation};

/// A fractional assignment over the edges of a [`Graph`].
#[derive(Clone, Debug)]
pub struct FractionalAssignment {
    /// `values[e]` is `x_{e,lo}` where `lo` is the smaller endpoint id of `e`.
    values: Vec<f64>,
    /// Tolerance under which a value counts as exactly 0 (resp. 1).
    eps: f64,
}

impl FractionalAssignment {
    /// Builds an assignment from raw per-edge value pairs, typically an LP
    /// solution. `raw[e]` is `(x_eu, x_ev)` in the edge's endpoint order.
    ///
    /// Each pair is clamped into `[0, 1]` and rescaled to sum to exactly 1; a
    /// degenerate pair summing to (almost) zero becomes `(1/2, 1/2)`. Values
    /// within `eps` of 0 or 1 are snapped, so the support is well-defined.
    pub fn from_raw(graph: &Graph, raw: &[(f64, f64)], eps: f64) -> Self {
        debug_assert_eq!(raw.len(), graph.num_edges());
        let values = raw
            .iter()
            .enumerate()
            .map(|(e, &(a, b))| {
                let a = a.clamp(0.0, 1.0);
                let b = b.clamp(0.0, 1.0);
                let total = a + b;
                let a = if total > eps { a / total } else { 0.5 };
                let (u, v) = graph.endpoints(e);
                let lo_value = if u < v { a } else { 1.0 - a };
                snap(lo_value, eps)
            })
            .collect();
        Self { values, eps }
    }

    /// Builds the integral assignment induced by an orientation: `x_ev = 1`
    /// exactly for the target of each edge.
    ///
    /// # Panics
    /// Panics in debug builds if the orientation is not total.
    pub fn from_orientation(graph: &Graph, orientation: &Orientation, eps: f64) -> Self {
        let values = (0..graph.num_edges())
            .map(|e| {
                let target = orientation.target(e);
                debug_assert!(target.is_some(), "edge {e} is undecided");
                let (u, v) = graph.endpoints(e);
                let lo = u.min(v);
                if target == Some(lo) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        Self { values, eps }
    }

    /// Returns the number of edges covered by this assignment.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.values.len()
    }

    /// Returns the tolerance used for integrality tests.
    #[inline]
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Returns `x_ev`.
    ///
    /// # Panics
    /// Panics in debug builds if `v` is not an endpoint of `e`.
    #[inline]
    pub fn get(&self, graph: &Graph, e: usize, v: usize) -> f64 {
        let (a, b) = graph.endpoints(e);
        debug_assert!(v == a || v == b, "vertex {v} is not an endpoint of edge {e}");
        if v == a.min(b) {
            self.values[e]
        } else {
            1.0 - self.values[e]
        }
    }

    /// Sets `x_ev := value` and the companion variable to `1 - value`.
    ///
    /// The value is clamped into `[0, 1]` and snapped to an exact 0 or 1 when
    /// within `eps`, so driving a variable to (nearly) zero removes the edge
    /// from the support.
    ///
    /// # Panics
    /// Panics in debug builds if `v` is not an endpoint of `e`.
    #[inline]
    pub fn set(&mut self, graph: &Graph, e: usize, v: usize, value: f64) {
        let (a, b) = graph.endpoints(e);
        debug_assert!(v == a || v == b, "vertex {v} is not an endpoint of edge {e}");
        let value = snap(value.clamp(0.0, 1.0), self.eps);
        self.values[e] = if v == a.min(b) { value } else { 1.0 - value };
    }

    /// Returns whether edge `e` is strictly split between its endpoints.
    #[inline]
    pub fn is_fractional(&self, e: usize) -> bool {
        let x = self.values[e];
        x > self.eps && x < 1.0 - self.eps
    }

    /// Returns whether edge `e` is integrally assigned.
    #[inline]
    pub fn is_integral(&self, e: usize) -> bool {
        !self.is_fractional(e)
    }

    /// Returns the fractional support: all strictly split edges, ascending.
    pub fn support_edges(&self) -> Vec<usize> {
        (0..self.values.len())
            .filter(|&e| self.is_fractional(e))
            .collect()
    }

    /// Returns the big edges of the fractional support, ascending.
    pub fn big_support_edges(&self, graph: &Graph, big_threshold: f64) -> Vec<usize> {
        (0..self.values.len())
            .filter(|&e| self.is_fractional(e) && graph.is_big(e, big_threshold))
            .collect()
    }

    /// Returns the support edges incident to `v`, ascending.
    pub fn incident_fractional(&self, graph: &Graph, v: usize) -> Vec<usize> {
        graph
            .incident_edges(v)
            .iter()
            .copied()
            .filter(|&e| self.is_fractional(e))
            .collect()
    }

    /// Computes the fractional load of `v`: its dedicated load plus
    /// `x_ev * p_e` over all incident edges.
    pub fn fractional_load(&self, graph: &Graph, v: usize) -> f64 {
        graph.dedicated_load(v)
            + graph
                .incident_edges(v)
                .iter()
                .map(|&e| self.get(graph, e, v) * graph.weight(e))
                .sum::<f64>()
    }

    /// Extracts the orientation induced by this assignment: each edge goes to
    /// the endpoint holding the larger fraction. For an integral assignment
    /// this is exactly the assigned endpoint.
    pub fn induced_orientation(&self, graph: &Graph) -> Orientation {
        let targets = (0..self.values.len())
            .map(|e| {
                let (u, v) = graph.endpoints(e);
                let (lo, hi) = if u < v { (u, v) } else { (v, u) };
                Some(if self.values[e] >= 0.5 { lo } else { hi })
            })
            .collect();
        Orientation::from_targets(targets)
    }
}

#[inline]
fn snap(x: f64, eps: f64) -> f64 {
    if x < eps {
        0.0
    } else if x > 1.0 - eps {
        1.0
    } else {
        x
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn path_graph() -> Graph {
        Graph::new(
            3,
            vec![(0, 1), (2, 1)],
            vec![0.6, 0.4],
            vec![0.1, 0.2, 0.1],
        )
        .unwrap()
    }

    // -------------------------------------------------------------------------
    // Boundary normalization
    // -------------------------------------------------------------------------

    #[test]
    fn from_raw_clamps_and_renormalizes() {
        let g = path_graph();
        // noisy pair summing to 1.1 and a pair with a small negative component
        let x = FractionalAssignment::from_raw(&g, &[(0.55, 0.55), (-1e-12, 1.0)], EPS);
        let sum0 = x.get(&g, 0, 0) + x.get(&g, 0, 1);
        assert!((sum0 - 1.0).abs() < 1e-12);
        assert!((x.get(&g, 0, 0) - 0.5).abs() < 1e-9);
        assert_eq!(x.get(&g, 1, 2), 0.0);
        assert_eq!(x.get(&g, 1, 1), 1.0);
    }

    #[test]
    fn from_raw_degenerate_pair_becomes_half_half() {
        let g = path_graph();
        let x = FractionalAssignment::from_raw(&g, &[(0.0, 0.0), (1.0, 0.0)], EPS);
        assert!((x.get(&g, 0, 0) - 0.5).abs() < 1e-12);
        assert!(x.is_fractional(0));
        assert!(x.is_integral(1));
    }

    #[test]
    fn from_raw_snaps_near_integral_values() {
        let g = path_graph();
        let x = FractionalAssignment::from_raw(&g, &[(1.0 - 1e-12, 1e-12), (0.5, 0.5)], EPS);
        assert_eq!(x.get(&g, 0, 0), 1.0);
        assert_eq!(x.get(&g, 0, 1), 0.0);
        assert!(x.is_integral(0));
        assert!(x.is_fractional(1));
    }

    // -------------------------------------------------------------------------
    // Get / set and the edge constraint
    // -------------------------------------------------------------------------

    #[test]
    fn set_updates_companion_exactly() {
        let g = path_graph();
        let mut x = FractionalAssignment::from_raw(&g, &[(0.5, 0.5), (0.5, 0.5)], EPS);
        x.set(&g, 0, 1, 0.3);
        assert!((x.get(&g, 0, 1) - 0.3).abs() < 1e-12);
        assert!((x.get(&g, 0, 0) - 0.7).abs() < 1e-12);
        // edge 1 is stored as (2, 1); exercise the reversed endpoint order
        x.set(&g, 1, 2, 1.0);
        assert_eq!(x.get(&g, 1, 2), 1.0);
        assert_eq!(x.get(&g, 1, 1), 0.0);
        assert!(x.is_integral(1));
    }

    #[test]
    fn set_clamps_out_of_range_values() {
        let g = path_graph();
        let mut x = FractionalAssignment::from_raw(&g, &[(0.5, 0.5), (0.5, 0.5)], EPS);
        x.set(&g, 0, 0, 1.5);
        assert_eq!(x.get(&g, 0, 0), 1.0);
        x.set(&g, 0, 0, -0.5);
        assert_eq!(x.get(&g, 0, 0), 0.0);
        assert_eq!(x.get(&g, 0, 1), 1.0);
    }

    // -------------------------------------------------------------------------
    // Support queries
    // -------------------------------------------------------------------------

    #[test]
    fn support_tracks_fractional_edges() {
        let g = path_graph();
        let mut x = FractionalAssignment::from_raw(&g, &[(0.5, 0.5), (0.5, 0.5)], EPS);
        assert_eq!(x.support_edges(), vec![0, 1]);
        // only edge 0 has weight above 1/2
        assert_eq!(x.big_support_edges(&g, 0.5), vec![0]);
        assert_eq!(x.incident_fractional(&g, 1), vec![0, 1]);

        x.set(&g, 0, 0, 1.0);
        assert_eq!(x.support_edges(), vec![1]);
        assert!(x.big_support_edges(&g, 0.5).is_empty());
        assert_eq!(x.incident_fractional(&g, 1), vec![1]);
    }

    #[test]
    fn fractional_load_sums_incident_shares() {
        let g = path_graph();
        let x = FractionalAssignment::from_raw(&g, &[(0.5, 0.5), (0.25, 0.75)], EPS);
        // q_1 + 0.5 * 0.6 + 0.75 * 0.4
        assert!((x.fractional_load(&g, 1) - (0.2 + 0.3 + 0.3)).abs() < 1e-12);
        // q_2 + 0.25 * 0.4
        assert!((x.fractional_load(&g, 2) - (0.1 + 0.1)).abs() < 1e-12);
    }

    // -------------------------------------------------------------------------
    // Orientation round-trip
    // -------------------------------------------------------------------------

    #[test]
    fn orientation_roundtrip_is_identity() {
        let g = path_graph();
        let mut o = Orientation::new(2);
        o.set(&g, 0, 1).unwrap();
        o.set(&g, 1, 2).unwrap();
        let x = FractionalAssignment::from_orientation(&g, &o, EPS);
        assert!(x.is_integral(0) && x.is_integral(1));
        assert_eq!(x.induced_orientation(&g), o);
    }

    #[test]
    fn induced_orientation_picks_larger_share() {
        let g = path_graph();
        let x = FractionalAssignment::from_raw(&g, &[(0.9, 0.1), (0.2, 0.8)], EPS);
        let o = x.induced_orientation(&g);
        assert_eq!(o.target(0), Some(0));
        assert_eq!(o.target(1), Some(1));
    }
}

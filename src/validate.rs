//! Deterministic validation of orientations and fractional assignments.

use crate::fractional::FractionalAssignment;
use crate::graph::{Graph, Orientation};

/// Validates that `orientation` is a total, endpoint-respecting orientation
/// of `graph` with makespan at most `ratio * target`.
///
/// # Errors
/// Returns a message naming the first violated property.
pub fn validate_orientation(
    graph: &Graph,
    orientation: &Orientation,
    target: f64,
    ratio: f64,
) -> Result<(), String> {
    for e in 0..graph.num_edges() {
        let Some(v) = orientation.target(e) else {
            return Err(format!("edge {e} is not oriented"));
        };
        let (a, b) = graph.endpoints(e);
        if v != a && v != b {
            return Err(format!(
                "edge {e} oriented to {v}, but its endpoints are {a} and {b}"
            ));
        }
    }
    let makespan = orientation.makespan(graph);
    let bound = ratio * target;
    if makespan > bound + 1e-9 * (1.0 + bound.abs()) {
        return Err(format!("makespan {makespan} exceeds {bound}"));
    }
    Ok(())
}

/// Validates the per-edge contract of a fractional assignment: each pair of
/// endpoint shares is within bounds and sums to 1 within `tolerance`.
///
/// # Errors
/// Returns a message naming the first offending edge.
pub fn validate_fractional(
    graph: &Graph,
    x: &FractionalAssignment,
    tolerance: f64,
) -> Result<(), String> {
    for e in 0..graph.num_edges() {
        let (u, v) = graph.endpoints(e);
        let x_u = x.get(graph, e, u);
        let x_v = x.get(graph, e, v);
        if !(0.0..=1.0).contains(&x_u) || !(0.0..=1.0).contains(&x_v) {
            return Err(format!("edge {e} has share outside [0, 1]: ({x_u}, {x_v})"));
        }
        if (x_u + x_v - 1.0).abs() > tolerance {
            return Err(format!(
                "edge {e} shares sum to {} instead of 1",
                x_u + x_v
            ));
        }
    }
    Ok(())
}

/// Validates a fractional assignment against the full relaxation at target 1:
/// the per-edge contract plus every load and star constraint.
///
/// # Errors
/// Returns a message naming the first violated constraint.
pub fn validate_lp3_solution(
    graph: &Graph,
    x: &FractionalAssignment,
    tolerance: f64,
) -> Result<(), String> {
    validate_fractional(graph, x, tolerance)?;
    for v in 0..graph.num_vertices() {
        let load = x.fractional_load(graph, v);
        if load > 1.0 + tolerance {
            return Err(format!("vertex {v} has fractional load {load} above 1"));
        }
        let star: f64 = graph
            .incident_edges(v)
            .iter()
            .filter(|&&e| graph.is_big(e, 0.5))
            .map(|&e| x.get(graph, e, v))
            .sum();
        if star > 1.0 + tolerance {
            return Err(format!("vertex {v} has big-edge share {star} above 1"));
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> Graph {
        Graph::new(
            3,
            vec![(0, 1), (1, 2)],
            vec![0.6, 0.4],
            vec![0.1, 0.2, 0.1],
        )
        .unwrap()
    }

    #[test]
    fn accepts_a_valid_orientation() {
        let g = path_graph();
        let mut o = Orientation::new(2);
        o.set(&g, 0, 0).unwrap();
        o.set(&g, 1, 2).unwrap();
        validate_orientation(&g, &o, 1.0, 1.75).unwrap();
    }

    #[test]
    fn rejects_a_partial_orientation() {
        let g = path_graph();
        let mut o = Orientation::new(2);
        o.set(&g, 0, 0).unwrap();
        let err = validate_orientation(&g, &o, 1.0, 1.75).unwrap_err();
        assert!(err.contains("not oriented"));
    }

    #[test]
    fn rejects_a_makespan_above_the_bound() {
        let g = path_graph();
        let mut o = Orientation::new(2);
        o.set(&g, 0, 1).unwrap();
        o.set(&g, 1, 1).unwrap();
        // vertex 1 carries 0.2 + 0.6 + 0.4 = 1.2
        let err = validate_orientation(&g, &o, 1.0, 1.0).unwrap_err();
        assert!(err.contains("exceeds"));
        validate_orientation(&g, &o, 1.0, 1.75).unwrap();
    }

    #[test]
    fn accepts_a_normalized_fractional_assignment() {
        let g = path_graph();
        let x = FractionalAssignment::from_raw(&g, &[(0.5, 0.5), (0.3, 0.7)], 1e-9);
        validate_fractional(&g, &x, 1e-6).unwrap();
    }

    #[test]
    fn lp3_validator_flags_an_overloaded_vertex() {
        let g = Graph::new(2, vec![(0, 1)], vec![0.9], vec![0.5, 0.0]).unwrap();
        let x = FractionalAssignment::from_raw(&g, &[(1.0, 0.0)], 1e-9);
        // vertex 0 carries 0.5 + 0.9
        let err = validate_lp3_solution(&g, &x, 1e-6).unwrap_err();
        assert!(err.contains("fractional load"));
    }

    #[test]
    fn lp3_validator_flags_a_star_violation() {
        let g = Graph::new(2, vec![(0, 1), (0, 1)], vec![0.6, 0.6], vec![0.0, 0.0]).unwrap();
        let x = FractionalAssignment::from_raw(&g, &[(0.7, 0.3), (0.7, 0.3)], 1e-9);
        let err = validate_lp3_solution(&g, &x, 1e-6).unwrap_err();
        assert!(err.contains("big-edge share"));
    }
}

//! The LP3 relaxation and the solver abstraction it is handed to.
//!
//! The relaxation is expressed as a plain constraint system
//! ([`LpProblem`]) over variables indexed by (edge, endpoint); concrete
//! engines sit behind the [`LpBackend`] trait and nothing else in the crate
//! names one. Backends are tried in priority order: a solver failure falls
//! through to the next backend, while infeasibility is a definitive answer
//! and is returned immediately.

use std::fmt;

use microlp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem};

use crate::algorithm::BalanceConfig;
use crate::fractional::FractionalAssignment;
use crate::graph::Graph;

// ============================================================================
// Constraint system
// ============================================================================

/// Comparison operator of a [`LinearConstraint`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Left-hand side equals the right-hand side.
    Eq,
    /// Left-hand side is at most the right-hand side.
    Le,
}

/// A single linear constraint `sum(coef * var) op rhs`.
#[derive(Clone, Debug)]
pub struct LinearConstraint {
    /// `(variable index, coefficient)` pairs of the left-hand side.
    pub terms: Vec<(usize, f64)>,
    /// Comparison operator.
    pub op: ConstraintOp,
    /// Right-hand side constant.
    pub rhs: f64,
}

/// A feasibility program: box-bounded variables under linear constraints.
///
/// There is no objective; any feasible point is acceptable.
#[derive(Clone, Debug, Default)]
pub struct LpProblem {
    /// Per-variable `(lower, upper)` bounds.
    pub bounds: Vec<(f64, f64)>,
    /// The constraint rows.
    pub constraints: Vec<LinearConstraint>,
}

impl LpProblem {
    /// Returns the number of variables.
    pub fn num_vars(&self) -> usize {
        self.bounds.len()
    }
}

/// Outcome of a failed LP solve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LpError {
    /// The constraints cannot be satisfied. Recoverable: the drivers report
    /// this as "no orientation".
    Infeasible,
    /// The engine failed for numerical or internal reasons. Surfaced
    /// distinctly so callers can retry with a different backend.
    Solver(String),
}

impl fmt::Display for LpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LpError::Infeasible => write!(f, "constraint system is infeasible"),
            LpError::Solver(msg) => write!(f, "LP solver failed: {msg}"),
        }
    }
}

impl std::error::Error for LpError {}

// ============================================================================
// Backends
// ============================================================================

/// A feasibility-LP engine.
pub trait LpBackend {
    /// Short backend name, used in failure reports.
    fn name(&self) -> &'static str;

    /// Finds any point satisfying `problem`, as one value per variable.
    ///
    /// # Errors
    /// [`LpError::Infeasible`] if no such point exists, [`LpError::Solver`]
    /// on engine failure.
    fn solve(&self, problem: &LpProblem) -> Result<Vec<f64>, LpError>;
}

/// Backend over the pure-Rust `microlp` simplex engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct MicrolpBackend;

impl LpBackend for MicrolpBackend {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, problem: &LpProblem) -> Result<Vec<f64>, LpError> {
        let mut lp = Problem::new(OptimizationDirection::Minimize);
        let vars: Vec<_> = problem
            .bounds
            .iter()
            .map(|&(lo, hi)| lp.add_var(0.0, (lo, hi)))
            .collect();
        for constraint in &problem.constraints {
            let mut lhs = LinearExpr::empty();
            for &(var, coef) in &constraint.terms {
                lhs.add(vars[var], coef);
            }
            let op = match constraint.op {
                ConstraintOp::Eq => ComparisonOp::Eq,
                ConstraintOp::Le => ComparisonOp::Le,
            };
            lp.add_constraint(lhs, op, constraint.rhs);
        }
        match lp.solve() {
            Ok(solution) => Ok(vars.iter().map(|&v| solution[v]).collect()),
            Err(microlp::Error::Infeasible) => Err(LpError::Infeasible),
            Err(e) => Err(LpError::Solver(e.to_string())),
        }
    }
}

/// The default backend priority list.
pub fn default_backends() -> Vec<Box<dyn LpBackend>> {
    vec![Box::new(MicrolpBackend)]
}

/// Solves `problem` with the first backend that neither errors nor is empty.
///
/// # Errors
/// [`LpError::Infeasible`] as soon as any backend proves infeasibility;
/// [`LpError::Solver`] listing every backend's failure when none succeeds.
pub fn solve_with_backends(
    problem: &LpProblem,
    backends: &[Box<dyn LpBackend>],
) -> Result<Vec<f64>, LpError> {
    let mut failures: Vec<String> = Vec::new();
    for backend in backends {
        match backend.solve(problem) {
            Ok(values) => return Ok(values),
            Err(LpError::Infeasible) => return Err(LpError::Infeasible),
            Err(LpError::Solver(msg)) => failures.push(format!("{}: {msg}", backend.name())),
        }
    }
    if failures.is_empty() {
        Err(LpError::Solver("no LP backend available".to_string()))
    } else {
        Err(LpError::Solver(failures.join("; ")))
    }
}

// ============================================================================
// LP3
// ============================================================================

/// Variable index of `x_ev` where `slot` is 0 for the edge's first stored
/// endpoint and 1 for the second.
#[inline]
fn var(e: usize, slot: usize) -> usize {
    2 * e + slot
}

#[inline]
fn var_of(graph: &Graph, e: usize, v: usize) -> usize {
    let (a, _) = graph.endpoints(e);
    var(e, usize::from(v != a))
}

/// Builds the LP3 constraint system for `graph` at target makespan 1.
///
/// Variables: `x_ev in [0, 1]` for every edge-endpoint pair. Rows:
/// - edge: `x_eu + x_ev = 1` per edge,
/// - load: `sum x_ev * p_e <= 1 - q_v` per vertex with incident edges,
/// - star: `sum x_ev <= 1` over big incident edges, per vertex with any.
pub fn build_lp3(graph: &Graph, big_threshold: f64) -> LpProblem {
    let m = graph.num_edges();
    let mut problem = LpProblem {
        bounds: vec![(0.0, 1.0); 2 * m],
        constraints: Vec::with_capacity(m + 2 * graph.num_vertices()),
    };

    for e in 0..m {
        problem.constraints.push(LinearConstraint {
            terms: vec![(var(e, 0), 1.0), (var(e, 1), 1.0)],
            op: ConstraintOp::Eq,
            rhs: 1.0,
        });
    }

    for v in 0..graph.num_vertices() {
        let incident = graph.incident_edges(v);
        if incident.is_empty() {
            continue;
        }
        let load_terms: Vec<(usize, f64)> = incident
            .iter()
            .map(|&e| (var_of(graph, e, v), graph.weight(e)))
            .collect();
        problem.constraints.push(LinearConstraint {
            terms: load_terms,
            op: ConstraintOp::Le,
            rhs: 1.0 - graph.dedicated_load(v),
        });

        let star_terms: Vec<(usize, f64)> = incident
            .iter()
            .filter(|&&e| graph.is_big(e, big_threshold))
            .map(|&e| (var_of(graph, e, v), 1.0))
            .collect();
        if !star_terms.is_empty() {
            problem.constraints.push(LinearConstraint {
                terms: star_terms,
                op: ConstraintOp::Le,
                rhs: 1.0,
            });
        }
    }

    problem
}

/// Solves LP3 for `graph` (already scaled to target 1) and normalizes the
/// solution into a [`FractionalAssignment`].
///
/// # Errors
/// [`LpError::Infeasible`] when no fractional assignment satisfies LP3
/// (including the trivial case of a dedicated load above 1);
/// [`LpError::Solver`] when every backend fails.
pub fn solve_lp3(
    graph: &Graph,
    cfg: &BalanceConfig,
    backends: &[Box<dyn LpBackend>],
) -> Result<FractionalAssignment, LpError> {
    for v in 0..graph.num_vertices() {
        if graph.dedicated_load(v) > 1.0 + cfg.eps {
            return Err(LpError::Infeasible);
        }
    }
    if graph.num_edges() == 0 {
        return Ok(FractionalAssignment::from_raw(graph, &[], cfg.eps));
    }

    let problem = build_lp3(graph, cfg.big_threshold);
    let values = solve_with_backends(&problem, backends)?;
    let raw: Vec<(f64, f64)> = (0..graph.num_edges())
        .map(|e| (values[var(e, 0)], values[var(e, 1)]))
        .collect();
    Ok(FractionalAssignment::from_raw(graph, &raw, cfg.eps))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_lp3_solution;

    fn cfg() -> BalanceConfig {
        BalanceConfig::default()
    }

    // -------------------------------------------------------------------------
    // Constraint system shape
    // -------------------------------------------------------------------------

    #[test]
    fn build_lp3_emits_expected_rows() {
        // path 0 - 1 - 2, one big and one small edge
        let g = Graph::new(
            3,
            vec![(0, 1), (1, 2)],
            vec![0.6, 0.4],
            vec![0.1, 0.2, 0.1],
        )
        .unwrap();
        let problem = build_lp3(&g, 0.5);
        assert_eq!(problem.num_vars(), 4);
        // 2 edge rows + 3 load rows + 2 star rows (vertices 0 and 1 touch the
        // big edge)
        assert_eq!(problem.constraints.len(), 7);
        let star_rows = problem
            .constraints
            .iter()
            .filter(|c| c.op == ConstraintOp::Le && c.terms.iter().all(|&(_, a)| a == 1.0))
            .count();
        assert_eq!(star_rows, 2);
    }

    #[test]
    fn build_lp3_skips_isolated_vertices() {
        let g = Graph::new(3, vec![(0, 1)], vec![0.3], vec![0.0, 0.0, 0.9]).unwrap();
        let problem = build_lp3(&g, 0.5);
        // 1 edge row + 2 load rows, no star rows (no big edges)
        assert_eq!(problem.constraints.len(), 3);
    }

    // -------------------------------------------------------------------------
    // Solving
    // -------------------------------------------------------------------------

    #[test]
    fn solve_lp3_feasible_single_edge() {
        let g = Graph::new(2, vec![(0, 1)], vec![0.5], vec![0.0, 0.0]).unwrap();
        let x = solve_lp3(&g, &cfg(), &default_backends()).unwrap();
        validate_lp3_solution(&g, &x, 1e-6).unwrap();
    }

    #[test]
    fn solve_lp3_respects_all_constraint_families() {
        // triangle of big edges plus a pendant small edge
        let g = Graph::new(
            4,
            vec![(0, 1), (1, 2), (2, 0), (0, 3)],
            vec![0.6, 0.6, 0.6, 0.3],
            vec![0.0, 0.0, 0.0, 0.2],
        )
        .unwrap();
        let x = solve_lp3(&g, &cfg(), &default_backends()).unwrap();
        validate_lp3_solution(&g, &x, 1e-6).unwrap();
    }

    #[test]
    fn solve_lp3_detects_infeasible_heavy_edge() {
        // both endpoints already carry 0.6; a 1.5 edge fits nowhere
        let g = Graph::new(2, vec![(0, 1)], vec![1.5], vec![0.6, 0.6]).unwrap();
        let err = solve_lp3(&g, &cfg(), &default_backends()).unwrap_err();
        assert_eq!(err, LpError::Infeasible);
    }

    #[test]
    fn solve_lp3_rejects_overloaded_vertex_without_solving() {
        let g = Graph::new(2, vec![(0, 1)], vec![0.2], vec![1.2, 0.0]).unwrap();
        let err = solve_lp3(&g, &cfg(), &[]).unwrap_err();
        assert_eq!(err, LpError::Infeasible);
    }

    #[test]
    fn solve_lp3_edgeless_graph_is_trivially_feasible() {
        let g = Graph::new(2, vec![], vec![], vec![0.4, 0.9]).unwrap();
        let x = solve_lp3(&g, &cfg(), &default_backends()).unwrap();
        assert_eq!(x.num_edges(), 0);
    }

    #[test]
    fn star_constraint_blocks_two_big_edges_on_one_vertex() {
        // either endpoint taking both parallel big edges violates its load
        // and star rows, so the relaxation must split them one-and-one
        let g = Graph::new(2, vec![(0, 1), (0, 1)], vec![0.8, 0.8], vec![0.0, 0.0]).unwrap();
        let x = solve_lp3(&g, &cfg(), &default_backends()).unwrap();
        validate_lp3_solution(&g, &x, 1e-6).unwrap();
        let star0 = x.get(&g, 0, 0) + x.get(&g, 1, 0);
        let star1 = x.get(&g, 0, 1) + x.get(&g, 1, 1);
        assert!(star0 <= 1.0 + 1e-6);
        assert!(star1 <= 1.0 + 1e-6);
    }

    // -------------------------------------------------------------------------
    // Backend priority
    // -------------------------------------------------------------------------

    struct FailingBackend;

    impl LpBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn solve(&self, _problem: &LpProblem) -> Result<Vec<f64>, LpError> {
            Err(LpError::Solver("synthetic failure".to_string()))
        }
    }

    #[test]
    fn solver_failure_falls_through_to_next_backend() {
        let g = Graph::new(2, vec![(0, 1)], vec![0.5], vec![0.0, 0.0]).unwrap();
        let backends: Vec<Box<dyn LpBackend>> =
            vec![Box::new(FailingBackend), Box::new(MicrolpBackend)];
        let x = solve_lp3(&g, &cfg(), &backends).unwrap();
        validate_lp3_solution(&g, &x, 1e-6).unwrap();
    }

    #[test]
    fn all_backends_failing_surfaces_solver_error() {
        let g = Graph::new(2, vec![(0, 1)], vec![0.5], vec![0.0, 0.0]).unwrap();
        let backends: Vec<Box<dyn LpBackend>> = vec![Box::new(FailingBackend)];
        let err = solve_lp3(&g, &cfg(), &backends).unwrap_err();
        assert!(matches!(err, LpError::Solver(msg) if msg.contains("failing")));
    }

    #[test]
    fn empty_backend_list_is_a_solver_error() {
        let g = Graph::new(2, vec![(0, 1)], vec![0.5], vec![0.0, 0.0]).unwrap();
        let err = solve_lp3(&g, &cfg(), &[]).unwrap_err();
        assert!(matches!(err, LpError::Solver(_)));
    }
}

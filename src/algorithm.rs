//! The LP-balance driver: solve the relaxation, round it, and wrap the
//! fixed-ratio decision procedure into a binary-search optimizer.

use std::fmt;

use crate::graph::{Graph, Orientation};
use crate::lp::{solve_lp3, LpBackend, LpError};
use crate::round::{round, RoundError};

// ============================================================================
// Configuration
// ============================================================================

/// Tunables of the balancing pipeline.
///
/// The defaults are the values the approximation guarantee is proved for;
/// `eps` and `binary_search_tol` are free numerical knobs.
#[derive(Clone, Copy, Debug)]
pub struct BalanceConfig {
    /// Tolerance under which a fractional value counts as exactly 0 or 1.
    pub eps: f64,
    /// Weight above which an edge is "big" and subject to star constraints.
    pub big_threshold: f64,
    /// Cutoff between leaf assignment and tree assignment. A leaf whose far
    /// share is exactly at the cutoff gets a leaf assignment.
    pub leaf_threshold: f64,
    /// Guaranteed approximation factor of the rounding. Fixed by the
    /// algorithm; changing it only changes what [`decide`] verifies.
    pub approx_ratio: f64,
    /// Relative width at which the binary search of [`optimize`] stops.
    pub binary_search_tol: f64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            eps: 1e-9,
            big_threshold: 0.5,
            leaf_threshold: 0.75,
            approx_ratio: 1.75,
            binary_search_tol: 1e-6,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failures of the balancing drivers. Infeasibility is *not* an error: the
/// drivers report it as `Ok(None)`.
#[derive(Clone, Debug, PartialEq)]
pub enum BalanceError {
    /// Every LP backend failed; retrying with other backends may help.
    Solver(String),
    /// The rounding procedure hit a structural invariant violation.
    Invariant(RoundError),
    /// The rounded orientation missed the guaranteed bound. Indicates corrupt
    /// LP output or an implementation bug, never an instance property.
    BoundViolated {
        /// Makespan of the rounded orientation.
        makespan: f64,
        /// The bound it had to satisfy.
        bound: f64,
    },
}

impl fmt::Display for BalanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceError::Solver(msg) => write!(f, "{msg}"),
            BalanceError::Invariant(e) => write!(f, "rounding invariant violated: {e}"),
            BalanceError::BoundViolated { makespan, bound } => {
                write!(f, "rounded makespan {makespan} exceeds guaranteed bound {bound}")
            }
        }
    }
}

impl std::error::Error for BalanceError {}

impl From<RoundError> for BalanceError {
    fn from(e: RoundError) -> Self {
        BalanceError::Invariant(e)
    }
}

// ============================================================================
// Drivers
// ============================================================================

/// Solves LP3 at target 1 on `graph` and rounds the solution.
///
/// Returns `Ok(None)` when the relaxation is infeasible (no orientation with
/// makespan 1 exists, hence none within the guarantee either).
///
/// # Errors
/// [`BalanceError::Solver`] when every LP backend fails;
/// [`BalanceError::Invariant`] when rounding detects corrupt LP output.
pub fn lp_balance(
    graph: &Graph,
    cfg: &BalanceConfig,
    backends: &[Box<dyn LpBackend>],
) -> Result<Option<Orientation>, BalanceError> {
    match solve_lp3(graph, cfg, backends) {
        Ok(x) => Ok(Some(round(graph, x, cfg)?)),
        Err(LpError::Infeasible) => Ok(None),
        Err(LpError::Solver(msg)) => Err(BalanceError::Solver(msg)),
    }
}

/// Decision procedure: orients `graph` with makespan at most
/// `approx_ratio * target` whenever some orientation of makespan `target`
/// exists fractionally.
///
/// The instance is scaled by `1 / target` and balanced at target 1; the
/// returned orientation and the verified bound refer to the original graph.
/// `Ok(None)` means FAIL (no orientation within the guarantee is promised).
/// A non-positive `target` always fails.
///
/// # Errors
/// Propagates [`lp_balance`] errors; additionally
/// [`BalanceError::BoundViolated`] if the rounded orientation misses the
/// guarantee.
pub fn decide(
    graph: &Graph,
    target: f64,
    cfg: &BalanceConfig,
    backends: &[Box<dyn LpBackend>],
) -> Result<Option<Orientation>, BalanceError> {
    if !target.is_finite() || target <= 0.0 {
        return Ok(None);
    }
    let scaled = graph.scaled(1.0 / target);
    let Some(orientation) = lp_balance(&scaled, cfg, backends)? else {
        return Ok(None);
    };
    let makespan = orientation.makespan(graph);
    let bound = cfg.approx_ratio * target;
    if makespan > bound * (1.0 + cfg.eps) + cfg.eps {
        return Err(BalanceError::BoundViolated { makespan, bound });
    }
    Ok(Some(orientation))
}

/// Optimization procedure: binary search over the target makespan, keeping
/// the best orientation found.
///
/// The search runs over `[max(max p_e, max q_v), max_v(q_v + sum of incident
/// p_e)]` and stops when the bracket's relative width drops below
/// `binary_search_tol`; the result is within `approx_ratio * (1 +
/// binary_search_tol)` of the optimum. Returns `Ok(None)` only if even the
/// trivial upper bound fails, which a valid instance never does.
///
/// # Errors
/// Propagates [`decide`] errors.
pub fn optimize(
    graph: &Graph,
    cfg: &BalanceConfig,
    backends: &[Box<dyn LpBackend>],
) -> Result<Option<Orientation>, BalanceError> {
    if graph.num_edges() == 0 {
        // only dedicated loads remain; the empty orientation is optimal
        return Ok(Some(Orientation::new(0)));
    }

    let mut lo = graph.weight_lower_bound();
    let mut hi = graph.trivial_upper_bound();
    debug_assert!(lo > 0.0, "graphs with edges have positive lower bounds");

    let mut best = match decide(graph, hi, cfg, backends)? {
        Some(orientation) => orientation,
        None => return Ok(None),
    };
    while hi - lo > cfg.binary_search_tol * lo {
        let mid = 0.5 * (lo + hi);
        match decide(graph, mid, cfg, backends)? {
            Some(orientation) => {
                best = orientation;
                hi = mid;
            }
            None => lo = mid,
        }
    }
    Ok(Some(best))
}

// ============================================================================
// Tests
// ============================================================================

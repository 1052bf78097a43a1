//! Weighted multigraph state, edge orientations, and the plain-text instance format.

use std::fmt;

// ============================================================================
// Graph
// ============================================================================

/// A weighted undirected multigraph with per-vertex dedicated loads.
///
/// Vertices are `0..num_vertices`. Edges are an indexed list of unordered
/// endpoint pairs; parallel edges are legal and edge identity is by index,
/// never by endpoint pair. Each edge carries a weight `p_e > 0`, each vertex a
/// dedicated load `q_v >= 0`. The structure is immutable after construction
/// and may be freely shared.
#[derive(Clone, Debug)]
pub struct Graph {
    num_vertices: usize,
    edges: Vec<(usize, usize)>,
    weights: Vec<f64>,
    loads: Vec<f64>,
    /// Edge indices incident to each vertex, ascending.
    incidence: Vec<Vec<usize>>,
}

impl Graph {
    /// Creates a graph from an edge list, edge weights, and dedicated loads.
    ///
    /// `weights[e]` is the weight of `edges[e]`; `loads[v]` is the dedicated
    /// load of vertex `v` (one entry per vertex).
    ///
    /// # Errors
    /// Returns an error if an endpoint is out of range, an edge is a
    /// self-loop, a weight is not positive and finite, a load is negative or
    /// not finite, or the weight/load counts do not match.
    pub fn new(
        num_vertices: usize,
        edges: Vec<(usize, usize)>,
        weights: Vec<f64>,
        loads: Vec<f64>,
    ) -> Result<Self, GraphError> {
        if weights.len() != edges.len() {
            return Err(GraphError::WeightCountMismatch {
                edges: edges.len(),
                weights: weights.len(),
            });
        }
        if loads.len() != num_vertices {
            return Err(GraphError::LoadCountMismatch {
                vertices: num_vertices,
                loads: loads.len(),
            });
        }
        for (e, &(u, v)) in edges.iter().enumerate() {
            if u >= num_vertices {
                return Err(GraphError::EndpointOutOfRange { edge: e, vertex: u });
            }
            if v >= num_vertices {
                return Err(GraphError::EndpointOutOfRange { edge: e, vertex: v });
            }
            if u == v {
                return Err(GraphError::SelfLoop { edge: e });
            }
        }
        for (e, &w) in weights.iter().enumerate() {
            if !w.is_finite() || w <= 0.0 {
                return Err(GraphError::InvalidWeight { edge: e, weight: w });
            }
        }
        for (v, &q) in loads.iter().enumerate() {
            if !q.is_finite() || q < 0.0 {
                return Err(GraphError::InvalidLoad { vertex: v, load: q });
            }
        }

        let mut incidence = vec![Vec::new(); num_vertices];
        for (e, &(u, v)) in edges.iter().enumerate() {
            incidence[u].push(e);
            incidence[v].push(e);
        }

        Ok(Self {
            num_vertices,
            edges,
            weights,
            loads,
            incidence,
        })
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Returns the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Returns the endpoint pair of edge `e` in construction order.
    #[inline]
    pub fn endpoints(&self, e: usize) -> (usize, usize) {
        self.edges[e]
    }

    /// Returns the endpoint of `e` opposite to `v`.
    ///
    /// # Panics
    /// Panics in debug builds if `v` is not an endpoint of `e`.
    #[inline]
    pub fn other_endpoint(&self, e: usize, v: usize) -> usize {
        let (a, b) = self.edges[e];
        debug_assert!(v == a || v == b, "vertex {v} is not an endpoint of edge {e}");
        if v == a {
            b
        } else {
            a
        }
    }

    /// Returns the weight `p_e`.
    #[inline]
    pub fn weight(&self, e: usize) -> f64 {
        self.weights[e]
    }

    /// Returns the dedicated load `q_v`.
    #[inline]
    pub fn dedicated_load(&self, v: usize) -> f64 {
        self.loads[v]
    }

    /// Returns the edge indices incident to `v`, ascending.
    #[inline]
    pub fn incident_edges(&self, v: usize) -> &[usize] {
        &self.incidence[v]
    }

    /// Returns whether `e` is a big edge, i.e. `p_e > threshold`.
    #[inline]
    pub fn is_big(&self, e: usize, threshold: f64) -> bool {
        self.weights[e] > threshold
    }

    /// Returns a copy of this graph with all weights and dedicated loads
    /// multiplied by `factor`.
    ///
    /// # Panics
    /// Panics in debug builds if `factor` is not positive and finite.
    pub fn scaled(&self, factor: f64) -> Self {
        debug_assert!(factor.is_finite() && factor > 0.0);
        Self {
            num_vertices: self.num_vertices,
            edges: self.edges.clone(),
            weights: self.weights.iter().map(|&w| w * factor).collect(),
            loads: self.loads.iter().map(|&q| q * factor).collect(),
            incidence: self.incidence.clone(),
        }
    }

    /// A lower bound on the optimal makespan: the largest single edge weight
    /// or dedicated load (every edge must land somewhere whole).
    pub fn weight_lower_bound(&self) -> f64 {
        let max_weight = self.weights.iter().copied().fold(0.0_f64, f64::max);
        let max_load = self.loads.iter().copied().fold(0.0_f64, f64::max);
        max_weight.max(max_load)
    }

    /// A trivial upper bound on the optimal makespan: the worst vertex under
    /// the orientation that points every edge at it.
    pub fn trivial_upper_bound(&self) -> f64 {
        (0..self.num_vertices)
            .map(|v| {
                self.loads[v]
                    + self.incidence[v]
                        .iter()
                        .map(|&e| self.weights[e])
                        .sum::<f64>()
            })
            .fold(0.0_f64, f64::max)
    }
}

// ============================================================================
// Orientation
// ============================================================================

/// A (possibly partial) orientation of the edges of a [`Graph`].
///
/// `target(e) == Some(v)` means edge `e` is oriented toward `v`, charging
/// `p_e` to `v`'s load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Orientation {
    targets: Vec<Option<usize>>,
}

impl Orientation {
    /// Creates an orientation with every edge undecided.
    pub fn new(num_edges: usize) -> Self {
        Self {
            targets: vec![None; num_edges],
        }
    }

    pub(crate) fn from_targets(targets: Vec<Option<usize>>) -> Self {
        Self { targets }
    }

    /// Orients edge `e` toward `v`.
    ///
    /// # Errors
    /// Returns an error if `e` is out of range or `v` is not an endpoint.
    pub fn set(&mut self, graph: &Graph, e: usize, v: usize) -> Result<(), OrientationError> {
        if e >= self.targets.len() || e >= graph.num_edges() {
            return Err(OrientationError::EdgeOutOfRange { edge: e });
        }
        let (a, b) = graph.endpoints(e);
        if v != a && v != b {
            return Err(OrientationError::NotAnEndpoint { edge: e, vertex: v });
        }
        self.targets[e] = Some(v);
        Ok(())
    }

    /// Returns the vertex edge `e` is oriented toward, if decided.
    #[inline]
    pub fn target(&self, e: usize) -> Option<usize> {
        self.targets[e]
    }

    /// Returns whether every edge is oriented.
    pub fn is_total(&self) -> bool {
        self.targets.iter().all(Option::is_some)
    }

    /// Computes the load of `v`: its dedicated load plus the weights of the
    /// edges oriented toward it. Undecided edges contribute nothing.
    pub fn load(&self, graph: &Graph, v: usize) -> f64 {
        let mut load = graph.dedicated_load(v);
        for (e, target) in self.targets.iter().enumerate() {
            if *target == Some(v) {
                load += graph.weight(e);
            }
        }
        load
    }

    /// Computes the maximum load over all vertices.
    pub fn makespan(&self, graph: &Graph) -> f64 {
        let mut loads: Vec<f64> = (0..graph.num_vertices())
            .map(|v| graph.dedicated_load(v))
            .collect();
        for (e, target) in self.targets.iter().enumerate() {
            if let Some(v) = *target {
                loads[v] += graph.weight(e);
            }
        }
        loads.into_iter().fold(0.0_f64, f64::max)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while constructing a [`Graph`].
#[derive(Clone, Debug, PartialEq)]
pub enum GraphError {
    /// An edge endpoint is not a vertex of the graph.
    EndpointOutOfRange {
        /// Offending edge index.
        edge: usize,
        /// The out-of-range endpoint.
        vertex: usize,
    },
    /// An edge joins a vertex to itself. Self-loops are rejected because the
    /// rounding guarantee does not cover them.
    SelfLoop {
        /// Offending edge index.
        edge: usize,
    },
    /// An edge weight is not positive and finite.
    InvalidWeight {
        /// Offending edge index.
        edge: usize,
        /// The rejected weight.
        weight: f64,
    },
    /// A dedicated load is negative or not finite.
    InvalidLoad {
        /// Offending vertex.
        vertex: usize,
        /// The rejected load.
        load: f64,
    },
    /// The weight list length does not match the edge list length.
    WeightCountMismatch {
        /// Number of edges.
        edges: usize,
        /// Number of weights supplied.
        weights: usize,
    },
    /// The load list length does not match the vertex count.
    LoadCountMismatch {
        /// Number of vertices.
        vertices: usize,
        /// Number of loads supplied.
        loads: usize,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::EndpointOutOfRange { edge, vertex } => {
                write!(f, "edge {edge} has out-of-range endpoint {vertex}")
            }
            GraphError::SelfLoop { edge } => write!(f, "edge {edge} is a self-loop"),
            GraphError::InvalidWeight { edge, weight } => {
                write!(f, "edge {edge} has invalid weight {weight} (must be positive and finite)")
            }
            GraphError::InvalidLoad { vertex, load } => {
                write!(f, "vertex {vertex} has invalid dedicated load {load}")
            }
            GraphError::WeightCountMismatch { edges, weights } => {
                write!(f, "{edges} edges but {weights} weights")
            }
            GraphError::LoadCountMismatch { vertices, loads } => {
                write!(f, "{vertices} vertices but {loads} dedicated loads")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Errors raised when orienting an edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrientationError {
    /// The edge index is out of range.
    EdgeOutOfRange {
        /// Offending edge index.
        edge: usize,
    },
    /// The target vertex is not an endpoint of the edge.
    NotAnEndpoint {
        /// Offending edge index.
        edge: usize,
        /// The rejected target.
        vertex: usize,
    },
}

impl fmt::Display for OrientationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrientationError::EdgeOutOfRange { edge } => {
                write!(f, "edge index {edge} out of range")
            }
            OrientationError::NotAnEndpoint { edge, vertex } => {
                write!(f, "vertex {vertex} is not an endpoint of edge {edge}")
            }
        }
    }
}

impl std::error::Error for OrientationError {}

// ============================================================================
// Instance text format
// ============================================================================

/// Errors encountered while parsing the plain-text instance format.
#[derive(Clone, Debug, PartialEq)]
pub enum InstanceParseError {
    /// No data lines were found.
    Empty,
    /// The `n m` header line is malformed.
    BadHeader {
        /// 1-based line number.
        line: usize,
    },
    /// The dedicated-load line is missing, malformed, or has the wrong count.
    BadLoads {
        /// 1-based line number (0 when the line is missing entirely).
        line: usize,
    },
    /// Fewer edge lines than the header promised.
    MissingEdges {
        /// Edges promised by the header.
        expected: usize,
        /// Edge lines actually present.
        got: usize,
    },
    /// An edge line is malformed.
    BadEdge {
        /// 1-based line number.
        line: usize,
    },
    /// The parsed data was rejected by graph construction.
    Graph(GraphError),
}

impl fmt::Display for InstanceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceParseError::Empty => write!(f, "instance is empty"),
            InstanceParseError::BadHeader { line } => {
                write!(f, "line {line}: expected header `n m`")
            }
            InstanceParseError::BadLoads { line } => {
                write!(f, "line {line}: expected one dedicated load per vertex")
            }
            InstanceParseError::MissingEdges { expected, got } => {
                write!(f, "expected {expected} edge lines, found {got}")
            }
            InstanceParseError::BadEdge { line } => {
                write!(f, "line {line}: expected edge `u v p`")
            }
            InstanceParseError::Graph(e) => write!(f, "invalid instance: {e}"),
        }
    }
}

impl std::error::Error for InstanceParseError {}

impl From<GraphError> for InstanceParseError {
    fn from(e: GraphError) -> Self {
        InstanceParseError::Graph(e)
    }
}

/// Parses an instance from text.
///
/// Format (lines starting with `#` and blank lines are ignored):
/// - header line `n m`,
/// - one line with `n` dedicated loads,
/// - `m` lines `u v p`, one per edge.
///
/// # Errors
/// Returns an error naming the offending line if the text is malformed, or a
/// wrapped [`GraphError`] if the data is structurally invalid.
pub fn parse_instance(text: &str) -> Result<Graph, InstanceParseError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

    let (header_line, header) = lines.next().ok_or(InstanceParseError::Empty)?;
    let mut fields = header.split_whitespace();
    let n: usize = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or(InstanceParseError::BadHeader { line: header_line })?;
    let m: usize = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or(InstanceParseError::BadHeader { line: header_line })?;
    if fields.next().is_some() {
        return Err(InstanceParseError::BadHeader { line: header_line });
    }

    let (loads_line, loads_text) = lines.next().ok_or(InstanceParseError::BadLoads { line: 0 })?;
    let loads: Vec<f64> = loads_text
        .split_whitespace()
        .map(|s| s.parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| InstanceParseError::BadLoads { line: loads_line })?;
    if loads.len() != n {
        return Err(InstanceParseError::BadLoads { line: loads_line });
    }

    let mut edges = Vec::with_capacity(m);
    let mut weights = Vec::with_capacity(m);
    for _ in 0..m {
        let (line, text) = lines.next().ok_or(InstanceParseError::MissingEdges {
            expected: m,
            got: edges.len(),
        })?;
        let mut fields = text.split_whitespace();
        let u: usize = fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or(InstanceParseError::BadEdge { line })?;
        let v: usize = fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or(InstanceParseError::BadEdge { line })?;
        let p: f64 = fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or(InstanceParseError::BadEdge { line })?;
        if fields.next().is_some() {
            return Err(InstanceParseError::BadEdge { line });
        }
        edges.push((u, v));
        weights.push(p);
    }

    Ok(Graph::new(n, edges, weights, loads)?)
}

/// Writes an instance in the format accepted by [`parse_instance`].
pub fn write_instance(graph: &Graph) -> String {
    use fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "{} {}", graph.num_vertices(), graph.num_edges());
    let loads: Vec<String> = (0..graph.num_vertices())
        .map(|v| graph.dedicated_load(v).to_string())
        .collect();
    let _ = writeln!(out, "{}", loads.join(" "));
    for e in 0..graph.num_edges() {
        let (u, v) = graph.endpoints(e);
        let _ = writeln!(out, "{} {} {}", u, v, graph.weight(e));
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

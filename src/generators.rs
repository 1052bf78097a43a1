//! Instance generators: a worked toy example, seeded random instances, and
//! the two structured path families with known integrality gaps.

use rand::Rng;

use crate::graph::Graph;

/// The 3-vertex worked example: a light path with small dedicated loads.
pub fn simple_instance() -> Graph {
    instance(
        3,
        vec![(0, 1), (1, 2)],
        vec![0.6, 0.4],
        vec![0.1, 0.2, 0.1],
    )
}

/// Generates a random multigraph instance.
///
/// Endpoints are drawn uniformly (resampled until distinct), weights
/// uniformly from `weight_range`, dedicated loads uniformly from
/// `load_range`. Parallel edges can and do occur.
///
/// # Panics
/// Panics in debug builds if `num_vertices < 2` (edges need two distinct
/// endpoints), a range is inverted, or `weight_range` reaches 0.
pub fn random_instance<R: Rng>(
    rng: &mut R,
    num_vertices: usize,
    num_edges: usize,
    weight_range: (f64, f64),
    load_range: (f64, f64),
) -> Graph {
    debug_assert!(num_vertices >= 2, "edges need two distinct endpoints");
    debug_assert!(weight_range.0 > 0.0 && weight_range.0 <= weight_range.1);
    debug_assert!(load_range.0 >= 0.0 && load_range.0 <= load_range.1);

    let mut edges = Vec::with_capacity(num_edges);
    let mut weights = Vec::with_capacity(num_edges);
    for _ in 0..num_edges {
        let u = rng.random_range(0..num_vertices);
        let mut v = rng.random_range(0..num_vertices);
        while v == u {
            v = rng.random_range(0..num_vertices);
        }
        edges.push((u, v));
        weights.push(rng.random_range(weight_range.0..=weight_range.1));
    }
    let loads = (0..num_vertices)
        .map(|_| rng.random_range(load_range.0..=load_range.1))
        .collect();

    instance(num_vertices, edges, weights, loads)
}

/// The long-path family: `length` edges of weight `1 - epsilon` in a row,
/// dedicated load 1 on both endpoints of the path.
///
/// Without star constraints the relaxation misjudges this family by a factor
/// approaching 2, which is what motivates them.
pub fn long_path_instance(length: usize, epsilon: f64) -> Graph {
    debug_assert!(length >= 1);
    debug_assert!(epsilon > 0.0 && epsilon < 1.0);

    let edges = (0..length).map(|i| (i, i + 1)).collect();
    let weights = vec![1.0 - epsilon; length];
    let mut loads = vec![0.0; length + 1];
    loads[0] = 1.0;
    loads[length] = 1.0;

    instance(length + 1, edges, weights, loads)
}

/// The three-path family: three vertex-disjoint paths of `length` edges each
/// between two hub vertices, weights alternating `1` and `0.5 - epsilon`
/// along every path, dedicated load `0.25` everywhere.
///
/// The relaxation's ratio on this family approaches the worst case 1.75,
/// making it the natural stress instance for the rounding.
pub fn three_path_instance(length: usize, epsilon: f64) -> Graph {
    debug_assert!(length >= 1);
    debug_assert!(epsilon > 0.0 && epsilon < 0.5);

    let hub_a = 0;
    let hub_b = 1;
    let mut num_vertices = 2;
    let mut edges = Vec::new();
    let mut weights = Vec::new();

    for _ in 0..3 {
        let mut previous = hub_a;
        for i in 0..length {
            let next = if i + 1 == length {
                hub_b
            } else {
                let v = num_vertices;
                num_vertices += 1;
                v
            };
            edges.push((previous, next));
            weights.push(if i % 2 == 0 { 1.0 } else { 0.5 - epsilon });
            previous = next;
        }
    }

    let loads = vec![0.25; num_vertices];
    instance(num_vertices, edges, weights, loads)
}

/// Generated parameters are valid by construction; a failure here is a bug in
/// the generator, not in the caller's input.
fn instance(
    num_vertices: usize,
    edges: Vec<(usize, usize)>,
    weights: Vec<f64>,
    loads: Vec<f64>,
) -> Graph {
    match Graph::new(num_vertices, edges, weights, loads) {
        Ok(graph) => graph,
        Err(e) => unreachable!("generator produced an invalid instance: {e}"),
    }
}

// ============================================================================
// Tests
// ============================================================================

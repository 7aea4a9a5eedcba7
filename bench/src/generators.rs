//! Synthetic planar graphs. All deterministic, seeded per generator, and
//! connected by construction. Vertex 0 and vertex `n - 1` sit far apart so
//! the default route crosses the whole graph.

use std::f32::consts::TAU;

use clap::ValueEnum;
use graph_race_core::{SourceGraph, VertexId};

/// A vertex position; edge weight is the Euclidean distance between two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GeneratorKind {
    /// Jittered street lattice with occasional diagonals
    Grid,
    /// Random points joined within a radius
    Geometric,
    /// Ring lattice with long-range shortcuts
    Ring,
    /// Two clusters joined by a thin bridge
    Barbell,
    /// Every generator in turn
    All,
}

pub type Generator = fn(usize) -> SourceGraph<Point>;

impl GeneratorKind {
    pub fn generators(self) -> Vec<(&'static str, Generator)> {
        match self {
            Self::Grid => vec![("Grid (jittered lattice)", gen_grid)],
            Self::Geometric => vec![("Random geometric", gen_geometric)],
            Self::Ring => vec![("Ring (Watts-Strogatz)", gen_ring)],
            Self::Barbell => vec![("Barbell (cluster-bridge-cluster)", gen_barbell)],
            Self::All => vec![
                ("Grid (jittered lattice)", gen_grid as Generator),
                ("Random geometric", gen_geometric),
                ("Ring (Watts-Strogatz)", gen_ring),
                ("Barbell (cluster-bridge-cluster)", gen_barbell),
            ],
        }
    }
}

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 40) as f32 / (1u64 << 24) as f32
    }
    /// Uniform in `-spread..spread`.
    fn jitter(&mut self, spread: f32) -> f32 {
        (self.next_f32() * 2.0 - 1.0) * spread
    }
}

/// Jittered lattice: `ceil(sqrt(n))` columns, right and down neighbours
/// always joined, 10% of cells also get a diagonal.
pub fn gen_grid(n: usize) -> SourceGraph<Point> {
    let width = (n as f64).sqrt().ceil().max(1.0) as usize;
    let mut graph = SourceGraph::with_capacity(n, n * 2 + n / 10);
    let mut rng = FastRng::new(42);

    for i in 0..n {
        let x = (i % width) as f32 + rng.jitter(0.3);
        let y = (i / width) as f32 + rng.jitter(0.3);
        graph.add_vertex(Point { x, y });
    }

    for i in 0..n {
        let right = i + 1;
        let down = i + width;
        if right < n && right % width != 0 {
            graph.add_edge(i as VertexId, right as VertexId);
        }
        if down < n {
            graph.add_edge(i as VertexId, down as VertexId);
        }
        if down + 1 < n && right % width != 0 && rng.next(10) == 0 {
            graph.add_edge(i as VertexId, (down + 1) as VertexId);
        }
    }

    graph
}

/// Random geometric graph in the unit square, points sorted left to right.
///
/// Pairs closer than a radius giving ~6 expected neighbours are joined;
/// a point with no earlier neighbour in range is joined to its nearest
/// earlier point, which keeps the whole graph connected.
pub fn gen_geometric(n: usize) -> SourceGraph<Point> {
    let mut rng = FastRng::new(12345);
    let mut points: Vec<Point> = (0..n)
        .map(|_| Point {
            x: rng.next_f32(),
            y: rng.next_f32(),
        })
        .collect();
    points.sort_by(|p, q| p.x.total_cmp(&q.x));

    let radius = (6.0 / (std::f32::consts::PI * n.max(1) as f32)).sqrt();
    let mut graph = SourceGraph::with_capacity(n, n * 3);
    for &p in &points {
        graph.add_vertex(p);
    }

    for i in 1..n {
        let mut nearest = (0usize, f32::INFINITY);
        let mut joined = false;
        for j in 0..i {
            let d = points[i].distance(&points[j]);
            if d < radius {
                graph.add_edge(j as VertexId, i as VertexId);
                joined = true;
            }
            if d < nearest.1 {
                nearest = (j, d);
            }
        }
        if !joined {
            graph.add_edge(nearest.0 as VertexId, i as VertexId);
        }
    }

    graph
}

/// Small-world ring: each vertex joined to its `K` next neighbours around
/// a circle, the longer lattice links rewired with probability `P`.
///
/// The `i -> i + 1` link is never rewired, so the ring stays connected.
pub fn gen_ring(n: usize) -> SourceGraph<Point> {
    const K: usize = 3;
    const P: f32 = 0.05;
    let mut graph = SourceGraph::with_capacity(n, n * K);
    let mut rng = FastRng::new(67890);

    for i in 0..n {
        let angle = TAU * i as f32 / n as f32;
        graph.add_vertex(Point {
            x: angle.cos(),
            y: angle.sin(),
        });
    }
    if n < 2 {
        return graph;
    }

    for i in 0..n {
        for j in 1..=K.min(n - 1) {
            let neighbour = (i + j) % n;
            if j > 1 && rng.next_f32() < P {
                let rewired = rng.next(n as u64) as usize;
                if rewired != i {
                    graph.add_edge(i as VertexId, rewired as VertexId);
                    continue;
                }
            }
            graph.add_edge(i as VertexId, neighbour as VertexId);
        }
    }

    graph
}

/// Barbell: cluster A, a chain of bridge vertices, cluster B, in that id
/// order. Each cluster vertex joins a random earlier vertex of its cluster
/// plus a few random extra partners.
pub fn gen_barbell(n: usize) -> SourceGraph<Point> {
    const BRIDGE_LEN: usize = 10;
    const EXTRA_PER_VERTEX: usize = 4;
    let bridge_len = BRIDGE_LEN.min(n);
    let cluster_a = (n - bridge_len) / 2;
    let cluster_b = n - bridge_len - cluster_a;
    let mut graph = SourceGraph::with_capacity(n, n * (EXTRA_PER_VERTEX + 1));
    let mut rng = FastRng::new(99999);

    let mut cluster = |graph: &mut SourceGraph<Point>, size: usize, centre_x: f32| {
        let first = graph.vertices.len();
        for _ in 0..size {
            let x = centre_x + rng.jitter(1.0);
            let y = rng.jitter(1.0);
            graph.add_vertex(Point { x, y });
        }
        for i in 1..size {
            let anchor = rng.next(i as u64) as usize;
            graph.add_edge((first + anchor) as VertexId, (first + i) as VertexId);
            for _ in 0..EXTRA_PER_VERTEX.min(size - 1) {
                let target = rng.next(size as u64) as usize;
                if target != i {
                    graph.add_edge((first + i) as VertexId, (first + target) as VertexId);
                }
            }
        }
    };

    cluster(&mut graph, cluster_a, -3.0);

    for i in 0..bridge_len {
        let x = -2.0 + 4.0 * (i as f32 + 0.5) / bridge_len as f32;
        let id = graph.add_vertex(Point { x, y: 0.0 });
        if i > 0 {
            graph.add_edge(id - 1, id);
        } else if cluster_a > 0 {
            graph.add_edge((cluster_a - 1) as VertexId, id);
        }
    }

    let b_start = graph.vertices.len();
    cluster(&mut graph, cluster_b, 3.0);
    if cluster_b > 0 {
        graph.add_edge((b_start - 1) as VertexId, b_start as VertexId);
    }

    graph
}

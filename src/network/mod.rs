//! Contact network: an undirected simple graph over labelled nodes.
//!
//! Networks are generated from a degree distribution (configuration model),
//! rewired, read from or written to edge lists, and analyzed for components,
//! transitivity and path lengths. All long-running operations take a
//! [`TaskContext`](crate::task::TaskContext) so they can report progress and
//! stop at a cancellation checkpoint.

pub mod analysis;
pub mod degree;
pub mod edgelist;

use std::collections::HashSet;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::task::{TaskContext, TaskResult};

pub use analysis::{ComponentStats, DistanceStats};
pub use degree::{DegreeDistribution, DistKind};

/// Parameter names used in validation errors, matched by the UI to place the
/// message next to the right input.
pub const FIELD_SIZE: &str = "network size";
pub const FIELD_PATH: &str = "edge list path";

#[derive(Debug, Clone, Default)]
pub struct Network {
    graph: UnGraph<String, ()>,
}

impl Network {
    /// Nodes labelled `0..size` and no edges.
    pub fn with_nodes(size: usize) -> Self {
        Self::with_labels((0..size).map(|i| i.to_string()))
    }

    pub fn with_labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut graph = UnGraph::default();
        for label in labels {
            graph.add_node(label);
        }
        Self { graph }
    }

    /// Build a network from index pairs. Self loops and repeated edges are
    /// dropped.
    pub fn from_edges(size: usize, edges: &[(usize, usize)]) -> Self {
        let mut network = Self::with_nodes(size);
        let mut seen = HashSet::new();
        for &(a, b) in edges {
            network.insert_edge(a, b, &mut seen);
        }
        network
    }

    /// Add an edge unless it is a self loop or already present in `seen`.
    /// Returns whether the edge was added.
    pub(crate) fn insert_edge(
        &mut self,
        a: usize,
        b: usize,
        seen: &mut HashSet<(usize, usize)>,
    ) -> bool {
        if a == b || a >= self.node_count() || b >= self.node_count() {
            return false;
        }
        let key = (a.min(b), a.max(b));
        if !seen.insert(key) {
            return false;
        }
        self.graph
            .add_edge(NodeIndex::new(key.0), NodeIndex::new(key.1), ());
        true
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn label(&self, node: usize) -> Option<&str> {
        self.graph.node_weight(NodeIndex::new(node)).map(String::as_str)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.raw_nodes().iter().map(|n| n.weight.as_str())
    }

    pub fn degree(&self, node: usize) -> usize {
        self.graph.neighbors(NodeIndex::new(node)).count()
    }

    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.node_count()];
        for edge in self.graph.edge_references() {
            degrees[edge.source().index()] += 1;
            degrees[edge.target().index()] += 1;
        }
        degrees
    }

    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph.neighbors(NodeIndex::new(node)).map(|n| n.index())
    }

    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
    }

    /// Adjacency lists, one `Vec` per node, for the traversal-heavy analyses.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.node_count()];
        for (a, b) in self.edges() {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        adjacency
    }

    pub fn degree_stats(&self) -> DegreeStats {
        DegreeStats::from_degrees(&self.degrees(), self.edge_count())
    }

    /// Sample a degree sequence and wire it with the configuration model.
    ///
    /// Progress runs over `2 * size` units: one per sampled degree, then the
    /// stub matching scaled onto the second half.
    pub fn generate<R: Rng>(
        size: usize,
        distribution: &DegreeDistribution,
        rng: &mut R,
        ctx: &mut TaskContext,
    ) -> TaskResult<Self> {
        Self::wire(Self::with_nodes(size), distribution, rng, ctx)
    }

    /// Same as [`Network::generate`] but keeps the node labels of `self`.
    /// The receiver is untouched; the rewired network is a new value.
    pub fn connect<R: Rng>(
        &self,
        distribution: &DegreeDistribution,
        rng: &mut R,
        ctx: &mut TaskContext,
    ) -> TaskResult<Self> {
        let empty = Self::with_labels(self.labels().map(str::to_string));
        Self::wire(empty, distribution, rng, ctx)
    }

    fn wire<R: Rng>(
        mut network: Self,
        distribution: &DegreeDistribution,
        rng: &mut R,
        ctx: &mut TaskContext,
    ) -> TaskResult<Self> {
        let size = network.node_count();
        ctx.set_predicted(2.0 * size as f64);

        let degrees = degree::sample_degree_sequence(distribution, size, rng, ctx)?;

        let mut stubs: Vec<usize> = degrees
            .iter()
            .enumerate()
            .flat_map(|(node, &k)| std::iter::repeat(node).take(k))
            .collect();
        stubs.shuffle(rng);

        let pairs = stubs.len() / 2;
        let mut seen = HashSet::with_capacity(pairs);
        for (i, pair) in stubs.chunks_exact(2).enumerate() {
            ctx.checkpoint()?;
            network.insert_edge(pair[0], pair[1], &mut seen);
            ctx.set_progress((size + (i + 1) * size / pairs) as u64);
        }
        ctx.set_progress(2 * size as u64);
        Ok(network)
    }
}

/// Summary of the degree distribution shown next to the network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreeStats {
    pub nodes: usize,
    pub edges: usize,
    pub mean_degree: f64,
    /// Second moment `<k^2>`.
    pub mean_sq_degree: f64,
    /// `histogram[k]` is the number of nodes with degree `k`.
    pub histogram: Vec<usize>,
}

impl DegreeStats {
    pub fn from_degrees(degrees: &[usize], edges: usize) -> Self {
        let nodes = degrees.len();
        let max = degrees.iter().copied().max().unwrap_or(0);
        let mut histogram = vec![0; if nodes == 0 { 0 } else { max + 1 }];
        for &k in degrees {
            histogram[k] += 1;
        }
        let (mean_degree, mean_sq_degree) = if nodes == 0 {
            (0.0, 0.0)
        } else {
            let n = nodes as f64;
            (
                degrees.iter().map(|&k| k as f64).sum::<f64>() / n,
                degrees.iter().map(|&k| (k * k) as f64).sum::<f64>() / n,
            )
        };
        Self {
            nodes,
            edges,
            mean_degree,
            mean_sq_degree,
            histogram,
        }
    }

    /// Degree distribution `p_k` as fractions of all nodes.
    pub fn distribution(&self) -> Vec<f64> {
        if self.nodes == 0 {
            return Vec::new();
        }
        let n = self.nodes as f64;
        self.histogram.iter().map(|&c| c as f64 / n).collect()
    }
}

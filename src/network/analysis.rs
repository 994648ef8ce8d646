//! Structural analysis: components, transitivity and path lengths.

use std::collections::{HashSet, VecDeque};

use petgraph::unionfind::UnionFind;
use serde::Serialize;

use super::Network;
use crate::task::{TaskContext, TaskResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentStats {
    pub count: usize,
    /// Component sizes, largest first.
    pub sizes: Vec<usize>,
    pub giant: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceStats {
    /// Mean shortest-path length over all connected ordered pairs.
    pub mean: f64,
    pub diameter: usize,
    pub reachable_pairs: u64,
}

/// Component label (a representative node) for every node.
fn component_labels(network: &Network, ctx: &mut TaskContext) -> TaskResult<Vec<usize>> {
    let n = network.node_count();
    ctx.set_predicted((network.edge_count() + n) as f64);

    let mut sets = UnionFind::<usize>::new(n);
    for (a, b) in network.edges() {
        ctx.checkpoint()?;
        sets.union(a, b);
        ctx.advance(1);
    }

    let mut labels = Vec::with_capacity(n);
    for node in 0..n {
        ctx.checkpoint()?;
        labels.push(sets.find_mut(node));
        ctx.advance(1);
    }
    Ok(labels)
}

fn sizes_by_label(labels: &[usize]) -> Vec<usize> {
    let mut sizes = vec![0; labels.len()];
    for &root in labels {
        sizes[root] += 1;
    }
    sizes
}

pub fn components(network: &Network, ctx: &mut TaskContext) -> TaskResult<ComponentStats> {
    let labels = component_labels(network, ctx)?;
    let mut sizes: Vec<usize> = sizes_by_label(&labels)
        .into_iter()
        .filter(|&s| s > 0)
        .collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    Ok(ComponentStats {
        count: sizes.len(),
        giant: sizes.first().copied().unwrap_or(0),
        sizes,
    })
}

/// A copy of the network restricted to its largest component.
pub fn remove_minor_components(network: &Network, ctx: &mut TaskContext) -> TaskResult<Network> {
    let labels = component_labels(network, ctx)?;
    let sizes = sizes_by_label(&labels);
    let Some(giant_root) = (0..sizes.len()).max_by_key(|&root| (sizes[root], std::cmp::Reverse(root)))
    else {
        return Ok(Network::default());
    };

    let mut remap = vec![usize::MAX; labels.len()];
    let mut kept = Vec::with_capacity(sizes[giant_root]);
    for (node, &root) in labels.iter().enumerate() {
        if root == giant_root {
            remap[node] = kept.len();
            kept.push(network.label(node).unwrap_or_default().to_string());
        }
    }

    let mut giant = Network::with_labels(kept);
    let mut seen = HashSet::new();
    for (a, b) in network.edges() {
        ctx.checkpoint()?;
        if remap[a] != usize::MAX && remap[b] != usize::MAX {
            giant.insert_edge(remap[a], remap[b], &mut seen);
        }
    }
    Ok(giant)
}

/// Global clustering coefficient: closed connected triples over all
/// connected triples. Zero when the network has no node of degree two.
pub fn transitivity(network: &Network, ctx: &mut TaskContext) -> TaskResult<f64> {
    let adjacency = network.adjacency();
    let neighbor_sets: Vec<HashSet<usize>> = adjacency
        .iter()
        .map(|list| list.iter().copied().collect())
        .collect();
    ctx.set_predicted(adjacency.len() as f64);

    let mut triples: u64 = 0;
    let mut closed: u64 = 0;
    for neighbors in &adjacency {
        ctx.checkpoint()?;
        let k = neighbors.len() as u64;
        if k >= 2 {
            triples += k * (k - 1) / 2;
            for (i, &a) in neighbors.iter().enumerate() {
                for &b in &neighbors[i + 1..] {
                    if neighbor_sets[a].contains(&b) {
                        closed += 1;
                    }
                }
            }
        }
        ctx.advance(1);
    }

    Ok(if triples == 0 {
        0.0
    } else {
        closed as f64 / triples as f64
    })
}

/// Breadth-first search from every node.
pub fn distances(network: &Network, ctx: &mut TaskContext) -> TaskResult<DistanceStats> {
    let adjacency = network.adjacency();
    let n = adjacency.len();
    ctx.set_predicted(n as f64);

    let mut dist = vec![usize::MAX; n];
    let mut queue = VecDeque::new();
    let mut total: u64 = 0;
    let mut pairs: u64 = 0;
    let mut diameter = 0;

    for source in 0..n {
        ctx.checkpoint()?;
        dist.iter_mut().for_each(|d| *d = usize::MAX);
        dist[source] = 0;
        queue.push_back(source);
        while let Some(u) = queue.pop_front() {
            let du = dist[u];
            if du > 0 {
                total += du as u64;
                pairs += 1;
                diameter = diameter.max(du);
            }
            for &v in &adjacency[u] {
                if dist[v] == usize::MAX {
                    dist[v] = du + 1;
                    queue.push_back(v);
                }
            }
        }
        ctx.advance(1);
    }

    Ok(DistanceStats {
        mean: if pairs == 0 {
            0.0
        } else {
            total as f64 / pairs as f64
        },
        diameter,
        reachable_pairs: pairs,
    })
}

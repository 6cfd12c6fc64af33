use std::cmp::Reverse;
use std::collections::HashMap;

use crate::config::FacetPriority;
use crate::ir::Graph;

/// Alternating forward/backward barycenter sweeps. Three is enough at the
/// graph sizes this engine targets; the count is fixed so a given input
/// always yields the same order.
pub const ORDER_SWEEPS: usize = 3;

/// Reorders nodes inside each layer to reduce edge crossings. Layer
/// membership never changes.
///
/// Every layer is first seeded by (facet priority, most connected first, id)
/// and then refined by [`ORDER_SWEEPS`] sweeps: forward sweeps sort a layer
/// by the mean position of its predecessors in the previous layer, backward
/// sweeps by the mean position of its successors in the next layer. A node
/// without neighbours there scores 0. Sorting is stable, so ties keep the
/// current order.
pub fn reorder_layers(
    mut layers: Vec<Vec<String>>,
    graph: &Graph,
    policy: &FacetPriority,
) -> Vec<Vec<String>> {
    seed_layers(&mut layers, graph, policy);
    if layers.len() <= 1 {
        return layers;
    }

    let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &graph.edges {
        outgoing
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        incoming
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.as_str());
    }

    for _ in 0..ORDER_SWEEPS {
        for rank in 1..layers.len() {
            let (before, rest) = layers.split_at_mut(rank);
            sort_by_barycenter(&mut rest[0], &before[rank - 1], &incoming);
        }
        for rank in (0..layers.len() - 1).rev() {
            let (head, after) = layers.split_at_mut(rank + 1);
            sort_by_barycenter(&mut head[rank], &after[0], &outgoing);
        }
    }

    layers
}

fn seed_layers(layers: &mut [Vec<String>], graph: &Graph, policy: &FacetPriority) {
    let degrees = graph.degrees();
    let facet_rank: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), policy.rank(node.module_type.as_deref())))
        .collect();
    let unranked = policy.tiers.len();
    for layer in layers.iter_mut() {
        layer.sort_by(|a, b| {
            let key_a = (
                facet_rank.get(a.as_str()).copied().unwrap_or(unranked),
                Reverse(degrees.get(a.as_str()).copied().unwrap_or(0)),
            );
            let key_b = (
                facet_rank.get(b.as_str()).copied().unwrap_or(unranked),
                Reverse(degrees.get(b.as_str()).copied().unwrap_or(0)),
            );
            key_a.cmp(&key_b).then_with(|| a.cmp(b))
        });
    }
}

fn sort_by_barycenter(
    layer: &mut [String],
    adjacent: &[String],
    neighbors: &HashMap<&str, Vec<&str>>,
) {
    if layer.len() <= 1 {
        return;
    }
    let positions: HashMap<&str, usize> = adjacent
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();
    let scores: HashMap<String, f32> = layer
        .iter()
        .map(|id| (id.clone(), barycenter(id, neighbors, &positions)))
        .collect();
    layer.sort_by(|a, b| scores[a].total_cmp(&scores[b]));
}

/// Mean position of `node_id`'s neighbours that sit in the adjacent layer.
pub(super) fn barycenter(
    node_id: &str,
    neighbors: &HashMap<&str, Vec<&str>>,
    positions: &HashMap<&str, usize>,
) -> f32 {
    let Some(list) = neighbors.get(node_id) else {
        return 0.0;
    };
    let (sum, count) = list
        .iter()
        .filter_map(|neighbor| positions.get(neighbor))
        .fold((0usize, 0usize), |(sum, count), pos| (sum + pos, count + 1));
    if count == 0 {
        return 0.0;
    }
    sum as f32 / count as f32
}

/// Crossings between edges that join two adjacent layers. Edges spanning
/// more than one layer are not counted.
pub fn count_crossings(layers: &[Vec<String>], graph: &Graph) -> usize {
    let mut slot: HashMap<&str, (usize, usize)> = HashMap::new();
    for (rank, layer) in layers.iter().enumerate() {
        for (pos, id) in layer.iter().enumerate() {
            slot.insert(id.as_str(), (rank, pos));
        }
    }

    let mut by_rank: Vec<Vec<(usize, usize)>> = vec![Vec::new(); layers.len()];
    for edge in &graph.edges {
        let (Some(&(from_rank, from_pos)), Some(&(to_rank, to_pos))) =
            (slot.get(edge.source.as_str()), slot.get(edge.target.as_str()))
        else {
            continue;
        };
        if to_rank == from_rank + 1 {
            by_rank[from_rank].push((from_pos, to_pos));
        }
    }

    let mut crossings = 0;
    for segments in &by_rank {
        for (i, a) in segments.iter().enumerate() {
            for b in &segments[i + 1..] {
                if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
                    crossings += 1;
                }
            }
        }
    }
    crossings
}

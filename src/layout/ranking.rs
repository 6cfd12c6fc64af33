use std::collections::{BTreeMap, HashMap};

use crate::ir::Graph;

/// Longest-path layering over a topological `order`.
///
/// Each node sits one layer past its deepest predecessor, or on layer 0 when
/// it has none. Walking `order` guarantees every predecessor is final before
/// its successors are visited, so one pass suffices. Nodes missing from
/// `order` are not assigned.
pub fn assign_layers(graph: &Graph, order: &[String]) -> BTreeMap<String, usize> {
    let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &graph.edges {
        incoming
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.as_str());
    }

    let mut layers: BTreeMap<String, usize> = BTreeMap::new();
    for node in order {
        let layer = incoming
            .get(node.as_str())
            .into_iter()
            .flatten()
            .filter_map(|pred| layers.get(*pred))
            .map(|pred_layer| pred_layer + 1)
            .max()
            .unwrap_or(0);
        layers.insert(node.clone(), layer);
    }
    layers
}

/// Buckets nodes by layer, each bucket in node definition order.
pub fn group_layers(graph: &Graph, layers: &BTreeMap<String, usize>) -> Vec<Vec<String>> {
    let count = layers.values().max().map_or(0, |max| max + 1);
    let mut buckets: Vec<Vec<String>> = vec![Vec::new(); count];
    for node in &graph.nodes {
        if let Some(&layer) = layers.get(&node.id) {
            buckets[layer].push(node.id.clone());
        }
    }
    buckets
}

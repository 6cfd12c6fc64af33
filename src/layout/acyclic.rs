//! Cycle removal by depth-first back-edge detection.
//!
//! Nodes are visited in definition order and each node's outgoing edges in
//! definition order. That order decides which edge of a cycle is dropped, so
//! it is part of the observable contract: the same input always loses the
//! same edges.

use std::collections::BTreeSet;

use crate::ir::{Edge, Graph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    Active,
    Done,
}

/// Index arena: `out[v]` lists `(edge index, target node index)` in edge
/// definition order. Edges with an unknown endpoint are left out.
fn outgoing_arena(graph: &Graph) -> Vec<Vec<(usize, usize)>> {
    let index = graph.node_index();
    let mut out: Vec<Vec<(usize, usize)>> = vec![Vec::new(); graph.nodes.len()];
    for (edge_idx, edge) in graph.edges.iter().enumerate() {
        let (Some(&from), Some(&to)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) else {
            continue;
        };
        out[from].push((edge_idx, to));
    }
    out
}

/// Indices of the back edges found by one deterministic DFS sweep, ascending.
///
/// The traversal only reads the arena; removals are collected and applied by
/// the caller afterwards. An explicit stack replaces recursion so long chains
/// cannot exhaust the call stack.
pub fn back_edges(graph: &Graph) -> Vec<usize> {
    let out = outgoing_arena(graph);
    let mut state = vec![VisitState::Unvisited; graph.nodes.len()];
    let mut removed: BTreeSet<usize> = BTreeSet::new();
    // (node, position of the next outgoing edge to examine)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..graph.nodes.len() {
        if state[root] != VisitState::Unvisited {
            continue;
        }
        state[root] = VisitState::Active;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            let Some(&(edge_idx, next)) = out[node].get(cursor) else {
                state[node] = VisitState::Done;
                stack.pop();
                continue;
            };
            frame.1 += 1;
            match state[next] {
                VisitState::Active => {
                    removed.insert(edge_idx);
                }
                VisitState::Unvisited => {
                    state[next] = VisitState::Active;
                    stack.push((next, 0));
                }
                VisitState::Done => {}
            }
        }
    }

    removed.into_iter().collect()
}

/// Splits the graph into its acyclic part and the removed back edges.
pub fn resolve_cycles(graph: &Graph) -> (Graph, Vec<Edge>) {
    let removed: BTreeSet<usize> = back_edges(graph).into_iter().collect();
    let mut kept = Vec::with_capacity(graph.edges.len());
    let mut dropped = Vec::with_capacity(removed.len());
    for (idx, edge) in graph.edges.iter().enumerate() {
        if removed.contains(&idx) {
            tracing::debug!(
                edge = %edge.id,
                source = %edge.source,
                target = %edge.target,
                self_loop = edge.is_self_loop(),
                "removing back edge"
            );
            dropped.push(edge.clone());
        } else {
            kept.push(edge.clone());
        }
    }
    let acyclic = Graph {
        nodes: graph.nodes.clone(),
        edges: kept,
    };
    (acyclic, dropped)
}

/// Returns a copy of `graph` with every back edge removed. All nodes are
/// kept; never fails.
pub fn ensure_acyclic(graph: &Graph) -> Graph {
    resolve_cycles(graph).0
}

pub fn has_cycle(graph: &Graph) -> bool {
    !back_edges(graph).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_ids(graph: &Graph) -> Vec<&str> {
        graph.edges.iter().map(|edge| edge.id.as_str()).collect()
    }

    #[test]
    fn leaves_acyclic_graphs_untouched() {
        let graph = Graph::from_pairs(
            &["a", "b", "c", "d"],
            &[("a", "b", ""), ("a", "c", ""), ("b", "d", ""), ("c", "d", "")],
        );
        assert!(!has_cycle(&graph));
        assert_eq!(ensure_acyclic(&graph), graph);
    }

    #[test]
    fn removes_the_closing_edge_of_a_triangle() {
        let graph = Graph::from_pairs(
            &["a", "b", "c"],
            &[("a", "b", ""), ("b", "c", ""), ("c", "a", "")],
        );
        assert!(has_cycle(&graph));
        let (acyclic, removed) = resolve_cycles(&graph);
        assert_eq!(edge_ids(&acyclic), vec!["edge-0", "edge-1"]);
        assert_eq!(removed.len(), 1);
        assert_eq!((removed[0].source.as_str(), removed[0].target.as_str()), ("c", "a"));
        assert!(!has_cycle(&acyclic));
    }

    #[test]
    fn removes_self_loops_but_keeps_the_node() {
        let graph = Graph::from_pairs(&["a", "b"], &[("a", "a", ""), ("a", "b", "")]);
        let acyclic = ensure_acyclic(&graph);
        assert_eq!(acyclic.nodes.len(), 2);
        assert_eq!(edge_ids(&acyclic), vec!["edge-1"]);
    }

    #[test]
    fn traversal_order_decides_the_removed_edge() {
        // Same cycle, different node order: the edge closing back onto the
        // first visited node is the one dropped.
        let forward = Graph::from_pairs(&["a", "b"], &[("a", "b", ""), ("b", "a", "")]);
        let reversed = Graph::from_pairs(&["b", "a"], &[("a", "b", ""), ("b", "a", "")]);
        assert_eq!(back_edges(&forward), vec![1]);
        assert_eq!(back_edges(&reversed), vec![0]);
    }

    #[test]
    fn cross_edges_into_finished_nodes_are_kept() {
        let graph = Graph::from_pairs(
            &["a", "b", "c"],
            &[("a", "b", ""), ("c", "b", ""), ("c", "a", "")],
        );
        assert!(back_edges(&graph).is_empty());
    }

    #[test]
    fn handles_long_chains_without_recursion() {
        let ids: Vec<String> = (0..20_000).map(|i| format!("n{i}")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let mut pairs: Vec<(&str, &str, &str)> = id_refs
            .windows(2)
            .map(|pair| (pair[0], pair[1], ""))
            .collect();
        pairs.push((id_refs[id_refs.len() - 1], id_refs[0], ""));
        let graph = Graph::from_pairs(&id_refs, &pairs);
        assert_eq!(back_edges(&graph), vec![pairs.len() - 1]);
    }

    #[test]
    fn multiple_interlocking_cycles_all_break() {
        let graph = Graph::from_pairs(
            &["a", "b", "c", "d"],
            &[
                ("a", "b", ""),
                ("b", "c", ""),
                ("c", "a", ""),
                ("c", "d", ""),
                ("d", "b", ""),
                ("d", "d", ""),
            ],
        );
        let acyclic = ensure_acyclic(&graph);
        assert!(!has_cycle(&acyclic));
        assert_eq!(edge_ids(&acyclic), vec!["edge-0", "edge-1", "edge-3"]);
    }
}

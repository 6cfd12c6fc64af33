use std::collections::VecDeque;

use crate::ir::Graph;

use super::CycleError;

/// Kahn's algorithm. Zero in-degree nodes are seeded in definition order and
/// successors are released in edge definition order, so the result is stable
/// for a fixed input.
///
/// Returns [`CycleError`] instead of a partial order when a cycle remains.
pub fn topological_order(graph: &Graph) -> Result<Vec<String>, CycleError> {
    let index = graph.node_index();
    let mut indeg = vec![0usize; graph.nodes.len()];
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); graph.nodes.len()];
    for edge in &graph.edges {
        let (Some(&from), Some(&to)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) else {
            continue;
        };
        outgoing[from].push(to);
        indeg[to] += 1;
    }

    let mut ready: VecDeque<usize> = (0..graph.nodes.len())
        .filter(|&idx| indeg[idx] == 0)
        .collect();
    let mut order = Vec::with_capacity(graph.nodes.len());
    while let Some(idx) = ready.pop_front() {
        order.push(idx);
        for &next in &outgoing[idx] {
            indeg[next] -= 1;
            if indeg[next] == 0 {
                ready.push_back(next);
            }
        }
    }

    if order.len() < graph.nodes.len() {
        let unsequenced = graph
            .nodes
            .iter()
            .zip(&indeg)
            .filter(|(_, deg)| **deg > 0)
            .map(|(node, _)| node.id.clone())
            .collect();
        return Err(CycleError { unsequenced });
    }

    Ok(order
        .into_iter()
        .map(|idx| graph.nodes[idx].id.clone())
        .collect())
}

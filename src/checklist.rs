//! Dependency checklist: the graph as a flat, do-this-first list.
//!
//! Built straight from the sequencer without cycle removal, so a cyclic graph
//! cannot be ordered. In that case the checklist degrades to definition order
//! and says so instead of failing.

use serde::Serialize;

use crate::ir::Graph;
use crate::layout::{CycleError, topological_order};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
    /// Ids of the nodes feeding this one.
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    /// False when the graph had a cycle and items are in definition order.
    pub ordered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<Vec<String>>,
    pub items: Vec<ChecklistItem>,
}

impl Checklist {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if !self.ordered {
            out.push_str("# unordered: graph contains a cycle\n");
        }
        for (idx, item) in self.items.iter().enumerate() {
            let marker = if self.ordered {
                format!("{}.", idx + 1)
            } else {
                "-".to_string()
            };
            out.push_str(&format!("{marker} [ ] {}", item.label));
            if !item.depends_on.is_empty() {
                out.push_str(&format!(" (after {})", item.depends_on.join(", ")));
            }
            out.push('\n');
        }
        out
    }
}

pub fn build_checklist(graph: &Graph) -> Checklist {
    let (ordered, cycle, ids) = match topological_order(graph) {
        Ok(ids) => (true, None, ids),
        Err(CycleError { unsequenced }) => {
            tracing::debug!(nodes = unsequenced.len(), "checklist falls back to unordered");
            let ids = graph.nodes.iter().map(|node| node.id.clone()).collect();
            (false, Some(unsequenced), ids)
        }
    };

    let items = ids
        .into_iter()
        .filter_map(|id| {
            let node = graph.node(&id)?;
            let mut depends_on: Vec<String> = Vec::new();
            for edge in graph.edges.iter().filter(|edge| edge.target == id) {
                if edge.source != id && !depends_on.contains(&edge.source) {
                    depends_on.push(edge.source.clone());
                }
            }
            Some(ChecklistItem {
                label: node.label.clone(),
                depends_on,
                id,
            })
        })
        .collect();

    Checklist {
        ordered,
        cycle,
        items,
    }
}

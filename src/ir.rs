use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Business classification of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Input,
    #[default]
    Process,
    Decision,
    Output,
    Data,
}

impl NodeKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "input" | "source" | "trigger" => Some(Self::Input),
            "process" | "step" | "task" | "action" => Some(Self::Process),
            "decision" | "gateway" | "branch" => Some(Self::Decision),
            "output" | "sink" | "result" => Some(Self::Output),
            "data" | "artifact" | "store" => Some(Self::Data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub label: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_type: Option<String>,
    pub outputs: Vec<String>,
    /// Derived from incoming edge labels, unique per node.
    pub inputs: Vec<String>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            description: String::new(),
            kind: NodeKind::default(),
            module_type: None,
            outputs: Vec::new(),
            inputs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: label.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Canonical graph. Node and edge order is definition order and is part of
/// the layout contract: cycle removal and tie-breaking both depend on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from bare ids and `(source, target, label)` triples,
    /// mostly for tests and benches. Edge ids are `edge-{i}`.
    pub fn from_pairs(node_ids: &[&str], edges: &[(&str, &str, &str)]) -> Self {
        let nodes = node_ids.iter().map(|id| Node::new(*id)).collect();
        let edges = edges
            .iter()
            .enumerate()
            .map(|(idx, (source, target, label))| {
                Edge::new(format!("edge-{idx}"), *source, *target, *label)
            })
            .collect();
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_index(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id.as_str(), idx))
            .collect()
    }

    /// Number of edges touching each node (self-loops count twice).
    pub fn degrees(&self) -> HashMap<&str, usize> {
        let mut degrees: HashMap<&str, usize> = self
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), 0))
            .collect();
        for edge in &self.edges {
            if let Some(count) = degrees.get_mut(edge.source.as_str()) {
                *count += 1;
            }
            if let Some(count) = degrees.get_mut(edge.target.as_str()) {
                *count += 1;
            }
        }
        degrees
    }
}

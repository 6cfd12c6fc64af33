//! Coercion of loosely-typed node/edge records into the canonical [`Graph`].
//!
//! Records come from uncontrolled producers, so nothing in here fails: unknown
//! shapes fall back to empty values, missing ids get synthetic `node-{i}` /
//! `edge-{i}` ids, and edges whose endpoints do not resolve are dropped.

use crate::ir::{Edge, Graph, Node, NodeKind};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

const NODE_ID_KEYS: &[&str] = &["id", "key"];
const NODE_LABEL_KEYS: &[&str] = &["label", "title", "name"];
const NODE_DESCRIPTION_KEYS: &[&str] = &["description", "desc", "details"];
const NODE_KIND_KEYS: &[&str] = &["type", "kind", "category"];
const NODE_FACET_KEYS: &[&str] = &["moduleType", "module_type", "facet"];
const NODE_OUTPUT_KEYS: &[&str] = &["outputs", "produces"];
const OUTPUT_NAME_KEYS: &[&str] = &["name", "label", "id"];

const EDGE_ID_KEYS: &[&str] = &["id", "key"];
const EDGE_SOURCE_KEYS: &[&str] = &["source", "from", "sourceId"];
const EDGE_TARGET_KEYS: &[&str] = &["target", "to", "targetId"];
const EDGE_LABEL_KEYS: &[&str] = &["label", "artifact", "name", "data"];

/// Wire record produced by the extraction or editing collaborator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphInput {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default, alias = "links", alias = "connections")]
    pub edges: Vec<RawEdge>,
}

impl GraphInput {
    /// Parses strict JSON first and retries as JSON5 so hand-edited graphs
    /// with comments or trailing commas still load.
    pub fn from_json_str(input: &str) -> Result<Self> {
        match serde_json::from_str(input) {
            Ok(parsed) => Ok(parsed),
            Err(json_err) => json5::from_str(input)
                .with_context(|| format!("graph input is neither JSON ({json_err}) nor JSON5")),
        }
    }

    pub fn normalize(&self) -> Graph {
        normalize(&self.nodes, &self.edges)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct RawNode {
    pub id: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub module_type: Option<String>,
    pub outputs: Vec<String>,
}

impl From<Value> for RawNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(obj) => Self {
                id: text_field(&obj, NODE_ID_KEYS),
                label: text_field(&obj, NODE_LABEL_KEYS),
                description: text_field(&obj, NODE_DESCRIPTION_KEYS),
                kind: text_field(&obj, NODE_KIND_KEYS),
                module_type: text_field(&obj, NODE_FACET_KEYS),
                outputs: field(&obj, NODE_OUTPUT_KEYS)
                    .map(output_names)
                    .unwrap_or_default(),
            },
            // A bare scalar is taken as the node id.
            other => Self {
                id: scalar_text(&other),
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct RawEdge {
    pub id: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub label: Option<String>,
}

impl From<Value> for RawEdge {
    fn from(value: Value) -> Self {
        let Value::Object(obj) = value else {
            return Self::default();
        };
        Self {
            id: text_field(&obj, EDGE_ID_KEYS),
            source: text_field(&obj, EDGE_SOURCE_KEYS),
            target: text_field(&obj, EDGE_TARGET_KEYS),
            label: text_field(&obj, EDGE_LABEL_KEYS),
        }
    }
}

/// First present, non-null value among `keys`.
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(obj, keys).and_then(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(num) => Some(num.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn output_names(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(obj) => text_field(obj, OUTPUT_NAME_KEYS),
                other => scalar_text(other),
            })
            .collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

fn unique_id(base: String, taken: &HashSet<String>) -> String {
    if !taken.contains(&base) {
        return base;
    }
    (1usize..)
        .map(|suffix| format!("{base}-{suffix}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(base)
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

/// Builds the canonical graph from raw records.
///
/// Node definition order and edge definition order are preserved. Derived
/// `inputs` collect incoming edge labels once per target; `outputs` hold only
/// the authored, non-blank names. Output ports for edge labels missing from
/// that list are added at layout time, from the edges that survive cycle
/// removal.
pub fn normalize(raw_nodes: &[RawNode], raw_edges: &[RawEdge]) -> Graph {
    // Explicit ids are reserved up front so synthetic ids never steal them.
    let mut taken: HashSet<String> = raw_nodes
        .iter()
        .filter_map(|raw| non_blank(raw.id.as_deref()).map(str::to_string))
        .collect();
    let mut assigned: HashSet<String> = HashSet::new();
    let mut nodes: Vec<Node> = Vec::with_capacity(raw_nodes.len());

    for (idx, raw) in raw_nodes.iter().enumerate() {
        let id = match non_blank(raw.id.as_deref()) {
            Some(id) => id.to_string(),
            None => {
                let id = unique_id(format!("node-{idx}"), &taken);
                taken.insert(id.clone());
                id
            }
        };
        if !assigned.insert(id.clone()) {
            tracing::debug!(node = %id, "dropping node with duplicate id");
            continue;
        }

        let mut outputs = Vec::new();
        for name in raw.outputs.iter().filter_map(|name| non_blank(Some(name.as_str()))) {
            push_unique(&mut outputs, name);
        }

        nodes.push(Node {
            label: non_blank(raw.label.as_deref())
                .map(str::to_string)
                .unwrap_or_else(|| id.clone()),
            description: raw.description.clone().unwrap_or_default(),
            kind: raw
                .kind
                .as_deref()
                .and_then(NodeKind::from_token)
                .unwrap_or_default(),
            module_type: non_blank(raw.module_type.as_deref()).map(str::to_string),
            outputs,
            inputs: Vec::new(),
            id,
        });
    }

    let index: HashMap<String, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.clone(), idx))
        .collect();

    let mut edge_ids: HashSet<String> = HashSet::new();
    let mut edges: Vec<Edge> = Vec::with_capacity(raw_edges.len());
    for (idx, raw) in raw_edges.iter().enumerate() {
        let source = non_blank(raw.source.as_deref());
        let target = non_blank(raw.target.as_deref());
        let (Some(source), Some(target)) = (source, target) else {
            tracing::debug!(edge = idx, "dropping edge without both endpoints");
            continue;
        };
        if !index.contains_key(source) || !index.contains_key(target) {
            tracing::debug!(edge = idx, source, target, "dropping edge with unresolved endpoint");
            continue;
        }

        let id = match non_blank(raw.id.as_deref()) {
            Some(id) if !edge_ids.contains(id) => id.to_string(),
            _ => unique_id(format!("edge-{idx}"), &edge_ids),
        };
        edge_ids.insert(id.clone());
        edges.push(Edge {
            id,
            source: source.to_string(),
            target: target.to_string(),
            label: raw.label.as_deref().map(str::trim).unwrap_or_default().to_string(),
        });
    }

    for edge in &edges {
        push_unique(&mut nodes[index[&edge.target]].inputs, &edge.label);
    }

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        dropped_edges = raw_edges.len() - edges.len(),
        "normalized graph"
    );
    Graph { nodes, edges }
}

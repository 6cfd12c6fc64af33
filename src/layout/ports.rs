use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::LayoutConfig;
use crate::ir::{Graph, PortDirection};

use super::text::{longest_port_label, title_width};
use super::{NodeGeometry, PortLayout};

/// Input and output port labels of one node, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortLabels {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl PortLabels {
    pub fn rows(&self) -> usize {
        self.inputs.len().max(self.outputs.len())
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

/// Port labels per node, taken from the edges of `graph` only, so a caller
/// passing the acyclic graph gets no port for a removed back edge. Inputs
/// follow incoming edge order; outputs list the authored names first, then
/// any outgoing edge label they miss. Isolated nodes get no ports.
pub fn port_labels(graph: &Graph) -> HashMap<&str, PortLabels> {
    let connected: HashSet<&str> = graph
        .edges
        .iter()
        .flat_map(|edge| [edge.source.as_str(), edge.target.as_str()])
        .collect();

    let mut labels: HashMap<&str, PortLabels> = graph
        .nodes
        .iter()
        .map(|node| {
            let ports = if connected.contains(node.id.as_str()) {
                PortLabels {
                    inputs: Vec::new(),
                    outputs: node.outputs.clone(),
                }
            } else {
                PortLabels::default()
            };
            (node.id.as_str(), ports)
        })
        .collect();

    for edge in &graph.edges {
        if let Some(ports) = labels.get_mut(edge.source.as_str()) {
            push_unique(&mut ports.outputs, &edge.label);
        }
        if let Some(ports) = labels.get_mut(edge.target.as_str()) {
            push_unique(&mut ports.inputs, &edge.label);
        }
    }
    labels
}

/// Node height: the header band plus one row per port on the busier side,
/// never below the configured floor.
pub fn node_height(ports: &PortLabels, config: &LayoutConfig) -> f32 {
    let rows = ports.rows();
    if rows == 0 {
        return config.min_node_height;
    }
    let content = config.header_height + rows as f32 * config.port_row_height + config.body_padding;
    content.max(config.min_node_height)
}

/// Node width: wide enough for the title or for the longest input and output
/// labels side by side, clamped to the configured range.
pub fn node_width(label: &str, ports: &PortLabels, config: &LayoutConfig) -> f32 {
    let title = title_width(label, config) + config.label_padding;
    let port_span = longest_port_label(&ports.inputs, config)
        + longest_port_label(&ports.outputs, config)
        + config.port_label_padding;
    title
        .max(port_span)
        .clamp(config.min_node_width, config.max_node_width.max(config.min_node_width))
}

fn place_ports(
    geometry: &mut NodeGeometry,
    labels: &[String],
    direction: PortDirection,
    config: &LayoutConfig,
) {
    if labels.is_empty() {
        return;
    }
    let body_top = geometry.y + config.header_height;
    let body_height = geometry.height - config.header_height;
    let x = match direction {
        PortDirection::Input => geometry.x,
        PortDirection::Output => geometry.x + geometry.width,
    };
    let count = labels.len() as f32;
    for (index, label) in labels.iter().enumerate() {
        geometry.ports.push(PortLayout {
            direction,
            label: label.clone(),
            index,
            x,
            y: body_top + body_height * (index as f32 + 0.5) / count,
        });
    }
}

/// Sizes every node, places it on its layer column, and anchors its ports.
///
/// Columns are `widest node + layer_gap` apart so no node overlaps the next
/// layer; each layer's stack is centered on half the viewport height.
pub fn size_and_place_ports(
    graph: &Graph,
    layers: &[Vec<String>],
    config: &LayoutConfig,
) -> BTreeMap<String, NodeGeometry> {
    let labels = port_labels(graph);
    let empty = PortLabels::default();

    let mut sizes: HashMap<&str, (f32, f32)> = HashMap::new();
    for node in &graph.nodes {
        let ports = labels.get(node.id.as_str()).unwrap_or(&empty);
        sizes.insert(
            node.id.as_str(),
            (node_width(&node.label, ports, config), node_height(ports, config)),
        );
    }

    let widest = sizes
        .values()
        .map(|(width, _)| *width)
        .fold(config.min_node_width, f32::max);
    let column = widest + config.layer_gap;
    let mid_y = config.viewport_height / 2.0;

    let mut placed: BTreeMap<String, NodeGeometry> = BTreeMap::new();
    for (rank, layer) in layers.iter().enumerate() {
        let stack: f32 = layer
            .iter()
            .filter_map(|id| sizes.get(id.as_str()))
            .map(|(_, height)| *height)
            .sum::<f32>()
            + config.node_gap * layer.len().saturating_sub(1) as f32;
        let x = config.margin + rank as f32 * column;
        let mut y = mid_y - stack / 2.0;

        for id in layer {
            let Some(&(width, height)) = sizes.get(id.as_str()) else {
                continue;
            };
            let mut geometry = NodeGeometry {
                x,
                y,
                width,
                height,
                ports: Vec::new(),
            };
            if let Some(ports) = labels.get(id.as_str()) {
                place_ports(&mut geometry, &ports.inputs, PortDirection::Input, config);
                place_ports(&mut geometry, &ports.outputs, PortDirection::Output, config);
            }
            tracing::trace!(node = %id, rank, x, y, width, height, "placed node");
            y += height + config.node_gap;
            placed.insert(id.clone(), geometry);
        }
    }
    placed
}

mod acyclic;
mod error;
mod ordering;
mod ports;
mod ranking;
mod routing;
mod text;
mod topo;
pub(crate) mod types;
pub use acyclic::{back_edges, ensure_acyclic, has_cycle, resolve_cycles};
pub use error::CycleError;
pub use ordering::{ORDER_SWEEPS, count_crossings, reorder_layers};
pub use ports::{PortLabels, node_height, node_width, port_labels, size_and_place_ports};
pub use ranking::{assign_layers, group_layers};
pub use routing::route_edges;
pub use topo::topological_order;
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::Graph;
use std::collections::{HashMap, HashSet};

/// Runs the whole pipeline: cycle removal, sequencing, layering, ordering,
/// sizing and routing. Pure and deterministic; the same graph and config
/// always produce the same model.
pub fn compute_layout(graph: &Graph, config: &LayoutConfig) -> RenderModel {
    let (acyclic, removed_edges) = resolve_cycles(graph);

    let order = topological_order(&acyclic).unwrap_or_else(|err| {
        // Unreachable after cycle removal; keep the stage total regardless.
        tracing::warn!(%err, "sequencing failed after cycle removal, using definition order");
        acyclic.nodes.iter().map(|node| node.id.clone()).collect()
    });
    let layer_of = assign_layers(&acyclic, &order);
    let layers = reorder_layers(
        group_layers(&acyclic, &layer_of),
        &acyclic,
        &config.facet_priority,
    );
    let crossings = count_crossings(&layers, &acyclic);

    let geometry = size_and_place_ports(&acyclic, &layers, config);
    let routes = route_edges(&acyclic.edges, &geometry, config);

    let position: HashMap<&str, (usize, usize)> = layers
        .iter()
        .enumerate()
        .flat_map(|(rank, layer)| {
            layer
                .iter()
                .enumerate()
                .map(move |(pos, id)| (id.as_str(), (rank, pos)))
        })
        .collect();
    let connected: HashSet<&str> = acyclic
        .edges
        .iter()
        .flat_map(|edge| [edge.source.as_str(), edge.target.as_str()])
        .collect();
    let labels = port_labels(&acyclic);

    let mut nodes = Vec::with_capacity(acyclic.nodes.len());
    for node in &acyclic.nodes {
        let (Some(&(layer, order_in_layer)), Some(geo)) =
            (position.get(node.id.as_str()), geometry.get(&node.id))
        else {
            continue;
        };
        let isolated = !connected.contains(node.id.as_str());
        let mut node = node.clone();
        // Inputs always mirror the routed edges; an isolated node keeps its
        // authored outputs.
        let ports = labels.get(node.id.as_str());
        node.inputs = ports.map(|ports| ports.inputs.clone()).unwrap_or_default();
        if let Some(ports) = ports.filter(|_| !isolated) {
            node.outputs = ports.outputs.clone();
        }
        nodes.push(NodeLayout {
            node,
            layer,
            order_in_layer,
            width: geo.width,
            height: geo.height,
            x: geo.x,
            y: geo.y,
            isolated,
            ports: geo.ports.clone(),
        });
    }

    let route_by_id: HashMap<&str, &EdgeRoute> = routes
        .iter()
        .map(|route| (route.edge_id.as_str(), route))
        .collect();
    let edges: Vec<EdgeLayout> = acyclic
        .edges
        .iter()
        .filter_map(|edge| {
            let route = route_by_id.get(edge.id.as_str())?;
            Some(EdgeLayout {
                edge: edge.clone(),
                path_control_points: route.points,
                source_slot: route.source_slot,
                target_slot: route.target_slot,
            })
        })
        .collect();

    let max_x = nodes
        .iter()
        .map(|node| node.x + node.width)
        .fold(0.0, f32::max);
    let max_y = nodes
        .iter()
        .map(|node| node.y + node.height)
        .fold(0.0, f32::max);
    let min_y = nodes
        .iter()
        .map(|node| node.y - config.margin)
        .fold(0.0, f32::min);

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        removed = removed_edges.len(),
        layers = layers.len(),
        crossings,
        "computed layout"
    );

    RenderModel {
        nodes,
        edges,
        removed_edges,
        layer_count: layers.len(),
        layers,
        crossings,
        width: max_x + config.margin,
        height: (max_y + config.margin).max(config.viewport_height),
        min_y,
    }
}

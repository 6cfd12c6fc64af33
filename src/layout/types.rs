use serde::Serialize;

use crate::ir::{Edge, Node, PortDirection};

pub type Point = (f32, f32);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortLayout {
    pub direction: PortDirection,
    pub label: String,
    pub index: usize,
    pub x: f32,
    pub y: f32,
}

/// Size, position and port anchors of one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub ports: Vec<PortLayout>,
}

impl NodeGeometry {
    pub fn port(&self, direction: PortDirection, label: &str) -> Option<Point> {
        self.ports
            .iter()
            .find(|port| port.direction == direction && port.label == label)
            .map(|port| (port.x, port.y))
    }

    pub fn center(&self) -> Point {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Position of an edge inside its sibling group at a shared port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SiblingSlot {
    pub index: usize,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRoute {
    pub edge_id: String,
    /// Start, first control, second control, end of one cubic segment.
    pub points: [Point; 4],
    pub source_slot: SiblingSlot,
    pub target_slot: SiblingSlot,
}

impl EdgeRoute {
    pub fn svg_path(&self) -> String {
        path_data(&self.points)
    }
}

pub fn path_data(points: &[Point; 4]) -> String {
    let [start, c1, c2, end] = points;
    format!(
        "M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
        start.0, start.1, c1.0, c1.1, c2.0, c2.1, end.0, end.1
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeLayout {
    #[serde(flatten)]
    pub node: Node,
    pub layer: usize,
    pub order_in_layer: usize,
    pub width: f32,
    pub height: f32,
    pub x: f32,
    pub y: f32,
    pub isolated: bool,
    pub ports: Vec<PortLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeLayout {
    #[serde(flatten)]
    pub edge: Edge,
    pub path_control_points: [Point; 4],
    pub source_slot: SiblingSlot,
    pub target_slot: SiblingSlot,
}

impl EdgeLayout {
    pub fn svg_path(&self) -> String {
        path_data(&self.path_control_points)
    }
}

/// Everything the rendering collaborator needs, in node and edge
/// definition order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    /// Back edges dropped to make the graph acyclic.
    pub removed_edges: Vec<Edge>,
    pub layers: Vec<Vec<String>>,
    pub layer_count: usize,
    pub crossings: usize,
    pub width: f32,
    pub height: f32,
    /// Top of the drawing. Negative when a layer stack is taller than the
    /// viewport and extends above it.
    pub min_y: f32,
}

impl RenderModel {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| node.node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeLayout> {
        self.edges.iter().find(|edge| edge.edge.id == id)
    }
}

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;
use crate::ir::{Edge, PortDirection};

use super::{EdgeRoute, NodeGeometry, Point, SiblingSlot};

const LONE_SLOT: SiblingSlot = SiblingSlot { index: 0, size: 1 };

/// Where an edge attaches at each end. Falls back to the facing side's
/// midpoint when a port is missing (e.g. a hand-built graph without labels).
fn endpoints(edge: &Edge, nodes: &BTreeMap<String, NodeGeometry>) -> Option<(Point, Point)> {
    let from = nodes.get(&edge.source)?;
    let to = nodes.get(&edge.target)?;
    let start = from
        .port(PortDirection::Output, &edge.label)
        .unwrap_or((from.x + from.width, from.center().1));
    let end = to
        .port(PortDirection::Input, &edge.label)
        .unwrap_or((to.x, to.center().1));
    Some((start, end))
}

fn compare_points(a: Point, b: Point) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| a.0.total_cmp(&b.0))
}

/// Assigns a slot to every edge of each group, ordering siblings by the
/// position of their far endpoint (vertical, then horizontal, then id).
fn sibling_slots(
    groups: BTreeMap<(&str, &str), Vec<(usize, Point)>>,
    edges: &[Edge],
) -> HashMap<usize, SiblingSlot> {
    let mut slots = HashMap::new();
    for (_, mut members) in groups {
        members.sort_by(|(a_idx, a_far), (b_idx, b_far)| {
            compare_points(*a_far, *b_far).then_with(|| edges[*a_idx].id.cmp(&edges[*b_idx].id))
        });
        let size = members.len();
        for (index, (edge_idx, _)) in members.into_iter().enumerate() {
            slots.insert(edge_idx, SiblingSlot { index, size });
        }
    }
    slots
}

/// Symmetric offset around the group midpoint, damped for short spans so
/// nearly vertical edges do not bulge.
pub(super) fn sibling_offset(slot: SiblingSlot, dx: f32, config: &LayoutConfig) -> f32 {
    if slot.size <= 1 {
        return 0.0;
    }
    let centered = slot.index as f32 - (slot.size as f32 - 1.0) / 2.0;
    let damping = if config.spread_full_distance > 0.0 {
        (dx.abs() / config.spread_full_distance).min(1.0)
    } else {
        1.0
    };
    centered * config.sibling_spread * damping
}

/// One cubic curve per edge from its source output port to its target input
/// port. Edges sharing a source port (same source and label) or a target
/// port (same target and label) are spread apart vertically at that end.
/// Edges whose endpoints were not placed are skipped.
pub fn route_edges(
    edges: &[Edge],
    nodes: &BTreeMap<String, NodeGeometry>,
    config: &LayoutConfig,
) -> Vec<EdgeRoute> {
    let anchors: Vec<Option<(Point, Point)>> =
        edges.iter().map(|edge| endpoints(edge, nodes)).collect();

    let mut source_groups: BTreeMap<(&str, &str), Vec<(usize, Point)>> = BTreeMap::new();
    let mut target_groups: BTreeMap<(&str, &str), Vec<(usize, Point)>> = BTreeMap::new();
    for (idx, edge) in edges.iter().enumerate() {
        let Some((start, end)) = anchors[idx] else {
            continue;
        };
        source_groups
            .entry((edge.source.as_str(), edge.label.as_str()))
            .or_default()
            .push((idx, end));
        target_groups
            .entry((edge.target.as_str(), edge.label.as_str()))
            .or_default()
            .push((idx, start));
    }
    let source_slots = sibling_slots(source_groups, edges);
    let target_slots = sibling_slots(target_groups, edges);

    let mut routes = Vec::with_capacity(edges.len());
    for (idx, edge) in edges.iter().enumerate() {
        let Some((start, end)) = anchors[idx] else {
            tracing::debug!(edge = %edge.id, "skipping edge with unplaced endpoint");
            continue;
        };
        let source_slot = source_slots.get(&idx).copied().unwrap_or(LONE_SLOT);
        let target_slot = target_slots.get(&idx).copied().unwrap_or(LONE_SLOT);
        let dx = end.0 - start.0;
        let half = dx / 2.0;
        let c1 = (
            start.0 + half,
            start.1 + sibling_offset(source_slot, dx, config),
        );
        let c2 = (end.0 - half, end.1 + sibling_offset(target_slot, dx, config));
        routes.push(EdgeRoute {
            edge_id: edge.id.clone(),
            points: [start, c1, c2, end],
            source_slot,
            target_slot,
        });
    }
    routes
}

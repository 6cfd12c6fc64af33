use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use flowmap_layout::ir::PortDirection;
use flowmap_layout::layout::{
    assign_layers, group_layers, reorder_layers, resolve_cycles, topological_order,
};
use flowmap_layout::{
    FacetPriority, Graph, GraphInput, LayoutConfig, RenderModel, build_checklist, compute_layout,
    ensure_acyclic, has_cycle, layout_from_str,
};

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).expect("fixture read failed")
}

fn load(name: &str) -> Graph {
    GraphInput::from_json_str(&fixture(name))
        .expect("fixture parse failed")
        .normalize()
}

/// Small deterministic generator so property checks cover many shapes
/// without a randomness dependency.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

fn random_graph(seed: u64, nodes: usize, edges: usize) -> Graph {
    let mut rng = Lcg(seed);
    let ids: Vec<String> = (0..nodes).map(|i| format!("n{i}")).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let labels = ["a", "b", "c", "log"];
    let pairs: Vec<(String, String, &str)> = (0..edges)
        .map(|_| {
            (
                ids[rng.next(nodes)].clone(),
                ids[rng.next(nodes)].clone(),
                labels[rng.next(labels.len())],
            )
        })
        .collect();
    let pair_refs: Vec<(&str, &str, &str)> = pairs
        .iter()
        .map(|(s, t, l)| (s.as_str(), t.as_str(), *l))
        .collect();
    Graph::from_pairs(&refs, &pair_refs)
}

fn layer_of(model: &RenderModel) -> HashMap<&str, usize> {
    model
        .nodes
        .iter()
        .map(|node| (node.node.id.as_str(), node.layer))
        .collect()
}

#[test]
fn layout_all_fixtures() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = ["pipeline.json", "cycles.json", "fanout.json", "loose.json5"];
    for name in candidates {
        assert!(root.join(name).exists(), "missing fixture {name}");
        let model = layout_from_str(&fixture(name), &LayoutConfig::default())
            .unwrap_or_else(|err| panic!("{name}: {err}"));
        assert!(!model.nodes.is_empty(), "{name}: no nodes");
        for edge in &model.edges {
            assert!(edge.svg_path().starts_with("M "), "{name}: bad path");
        }
    }
}

#[test]
fn resolved_graphs_never_have_cycles() {
    for seed in 0..40 {
        let graph = random_graph(seed, 12, 30);
        let acyclic = ensure_acyclic(&graph);
        assert!(!has_cycle(&acyclic), "seed {seed}");
        assert_eq!(acyclic.nodes.len(), graph.nodes.len(), "seed {seed}");
        assert!(acyclic.edges.iter().all(|edge| !edge.is_self_loop()));
    }
}

#[test]
fn topological_order_respects_every_edge() {
    for seed in 0..40 {
        let dag = ensure_acyclic(&random_graph(seed, 15, 35));
        let order = topological_order(&dag).expect("acyclic graph sequences");
        assert_eq!(order.len(), dag.nodes.len());
        let position: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.as_str(), idx))
            .collect();
        for edge in &dag.edges {
            assert!(position[edge.source.as_str()] < position[edge.target.as_str()]);
        }
    }
}

#[test]
fn layers_are_strict_and_longest_path() {
    for seed in 0..40 {
        let graph = random_graph(seed, 15, 35);
        let model = compute_layout(&graph, &LayoutConfig::default());
        let layers = layer_of(&model);
        for edge in &model.edges {
            assert!(
                layers[edge.edge.target.as_str()] > layers[edge.edge.source.as_str()],
                "seed {seed}: {} -> {}",
                edge.edge.source,
                edge.edge.target
            );
        }
        for node in &model.nodes {
            let expected = model
                .edges
                .iter()
                .filter(|edge| edge.edge.target == node.node.id)
                .map(|edge| layers[edge.edge.source.as_str()] + 1)
                .max()
                .unwrap_or(0);
            assert_eq!(node.layer, expected, "seed {seed}: {}", node.node.id);
        }
    }
}

#[test]
fn reordering_keeps_layer_membership() {
    for seed in 0..20 {
        let (dag, _) = resolve_cycles(&random_graph(seed, 20, 40));
        let order = topological_order(&dag).expect("acyclic graph sequences");
        let grouped = group_layers(&dag, &assign_layers(&dag, &order));
        let reordered = reorder_layers(grouped.clone(), &dag, &FacetPriority::default());
        assert_eq!(grouped.len(), reordered.len());
        for (before, after) in grouped.iter().zip(&reordered) {
            let before: BTreeSet<&String> = before.iter().collect();
            let after: BTreeSet<&String> = after.iter().collect();
            assert_eq!(before, after, "seed {seed}");
        }
    }
}

#[test]
fn self_loop_is_removed_but_node_kept() {
    let graph = Graph::from_pairs(&["solo"], &[("solo", "solo", "retry")]);
    let acyclic = ensure_acyclic(&graph);
    assert_eq!(acyclic.nodes.len(), 1);
    assert!(acyclic.edges.is_empty());

    let model = compute_layout(&graph, &LayoutConfig::default());
    assert_eq!(model.removed_edges.len(), 1);
    assert!(model.node("solo").expect("solo").isolated);
}

#[test]
fn three_node_cycle_loses_closing_edge() {
    let graph = Graph::from_pairs(
        &["A", "B", "C"],
        &[("A", "B", ""), ("B", "C", ""), ("C", "A", "")],
    );
    let acyclic = ensure_acyclic(&graph);
    let kept: Vec<(&str, &str)> = acyclic
        .edges
        .iter()
        .map(|edge| (edge.source.as_str(), edge.target.as_str()))
        .collect();
    assert_eq!(kept, vec![("A", "B"), ("B", "C")]);
    assert_eq!(
        topological_order(&acyclic).expect("order"),
        vec!["A", "B", "C"]
    );

    let model = compute_layout(&graph, &LayoutConfig::default());
    let layers = layer_of(&model);
    assert_eq!((layers["A"], layers["B"], layers["C"]), (0, 1, 2));
}

#[test]
fn cyclic_graphs_fail_to_sequence() {
    let graph = load("cycles.json");
    let err = topological_order(&graph).expect_err("cycle");
    assert!(err.unsequenced.contains(&"build".to_string()));
    assert!(err.to_string().contains("cycle"));

    let checklist = build_checklist(&graph);
    assert!(!checklist.ordered);
    assert_eq!(checklist.items.len(), graph.nodes.len());
}

#[test]
fn cycles_fixture_reports_removed_edges() {
    let model = compute_layout(&load("cycles.json"), &LayoutConfig::default());
    let removed: Vec<&str> = model
        .removed_edges
        .iter()
        .map(|edge| edge.id.as_str())
        .collect();
    assert_eq!(removed, vec!["e3", "e5", "e7"]);
    assert_eq!(model.edges.len(), 4);
    assert_eq!(model.layer_count, 5);

    // Ports only exist for routed edges.
    let build = model.node("build").expect("build");
    assert_eq!(build.node.inputs, vec!["design"]);
    let test = model.node("test").expect("test");
    assert_eq!(test.node.outputs, vec!["report"]);
    let ship = model.node("ship").expect("ship");
    assert_eq!(ship.node.inputs, vec!["approval"]);
    assert!(ship.node.outputs.is_empty());
    for node in &model.nodes {
        for port in &node.ports {
            let routed = model.edges.iter().any(|edge| {
                edge.edge.label == port.label
                    && match port.direction {
                        PortDirection::Input => edge.edge.target == node.node.id,
                        PortDirection::Output => edge.edge.source == node.node.id,
                    }
            });
            assert!(routed, "{}: dangling port {}", node.node.id, port.label);
        }
    }
}

#[test]
fn ports_on_a_shared_pair_get_distinct_anchors() {
    let mut graph = Graph::from_pairs(&["A", "B"], &[("A", "B", "x"), ("A", "B", "y")]);
    graph.nodes[0].outputs = vec!["x".to_string(), "y".to_string()];
    let model = compute_layout(&graph, &LayoutConfig::default());
    let a = model.node("A").expect("A");
    let b = model.node("B").expect("B");
    assert_eq!(a.height, b.height);

    let ends: Vec<f32> = model
        .edges
        .iter()
        .map(|edge| edge.path_control_points[3].1)
        .collect();
    assert_ne!(ends[0], ends[1]);
    let starts: Vec<f32> = model
        .edges
        .iter()
        .map(|edge| edge.path_control_points[0].1)
        .collect();
    assert_ne!(starts[0], starts[1]);
    assert!(a.ports.iter().all(|port| port.direction == PortDirection::Output));
}

#[test]
fn fan_out_siblings_never_coincide() {
    let model = compute_layout(&load("fanout.json"), &LayoutConfig::default());
    let source = model.edges[0].path_control_points[0];
    assert!(
        model
            .edges
            .iter()
            .all(|edge| edge.path_control_points[0] == source)
    );

    let offsets: Vec<f32> = model
        .edges
        .iter()
        .map(|edge| edge.path_control_points[1].1 - source.1)
        .collect();
    let mut sorted = offsets.clone();
    sorted.sort_by(f32::total_cmp);
    sorted.dedup();
    assert_eq!(sorted.len(), 3);
    assert!(sorted[0] < 0.0 && sorted[2] > 0.0);
    assert!((sorted[0] + sorted[2]).abs() < 1e-3);
    assert!(sorted[1].abs() < 1e-3);
}

#[test]
fn pipeline_orders_by_facet_and_keeps_isolated_boxes() {
    let model = compute_layout(&load("pipeline.json"), &LayoutConfig::default());
    assert_eq!(
        model.layers,
        vec![
            vec!["ingest", "notes"],
            vec!["parse"],
            vec!["audit", "classify"],
            vec!["dashboard"],
        ]
    );
    assert_eq!(model.crossings, 0);

    let notes = model.node("notes").expect("notes");
    assert!(notes.isolated);
    assert!(notes.ports.is_empty());

    let parse = model.node("parse").expect("parse");
    assert_eq!(parse.node.outputs, vec!["tokens", "log"]);
    let shared: Vec<_> = model
        .edges
        .iter()
        .filter(|edge| edge.edge.source == "parse" && edge.edge.label == "log")
        .collect();
    assert_eq!(shared.len(), 2);
    assert!(shared.iter().all(|edge| edge.source_slot.size == 2));
    assert_ne!(
        shared[0].path_control_points[1],
        shared[1].path_control_points[1]
    );
}

#[test]
fn loose_input_is_normalized() {
    let graph = load("loose.json5");
    let ids: Vec<&str> = graph.nodes.iter().map(|node| node.id.as_str()).collect();
    assert_eq!(ids, vec!["load", "clean", "node-2", "bare"]);
    assert_eq!(graph.node("clean").expect("clean").label, "Clean");
    assert_eq!(graph.node("load").expect("load").outputs, vec!["rows"]);
    assert_eq!(graph.node("clean").expect("clean").inputs, vec!["rows"]);

    let edge_ids: Vec<&str> = graph.edges.iter().map(|edge| edge.id.as_str()).collect();
    assert_eq!(edge_ids, vec!["edge-0", "dup", "edge-3"]);
    assert_eq!(graph.edges[2].label, "");
}

#[test]
fn repeated_runs_serialize_identically() {
    let config = LayoutConfig::default();
    for name in ["pipeline.json", "cycles.json", "fanout.json"] {
        let graph = load(name);
        let first = serde_json::to_string(&compute_layout(&graph, &config)).expect("json");
        let second = serde_json::to_string(&compute_layout(&graph, &config)).expect("json");
        assert_eq!(first, second, "{name}");
    }
}

#[cfg(feature = "cli")]
pub mod cli;
pub mod checklist;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod normalize;

pub use checklist::{Checklist, build_checklist};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{FacetPriority, LayoutConfig, load_config};
pub use ir::{Edge, Graph, Node, NodeKind};
pub use layout::{
    CycleError, RenderModel, compute_layout, ensure_acyclic, has_cycle, topological_order,
};
pub use normalize::{GraphInput, normalize};

/// Parses a graph document and lays it out with the given config.
pub fn layout_from_str(input: &str, config: &LayoutConfig) -> anyhow::Result<RenderModel> {
    let graph = GraphInput::from_json_str(input)?.normalize();
    Ok(compute_layout(&graph, config))
}

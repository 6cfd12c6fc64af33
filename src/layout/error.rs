use thiserror::Error;

/// Raised when a topological order is requested for a graph that still
/// contains a directed cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("graph contains a cycle through {} node(s): {}", .unsequenced.len(), .unsequenced.join(", "))]
pub struct CycleError {
    /// Nodes that never reached in-degree zero, in definition order.
    pub unsequenced: Vec<String>,
}

//! Standard node library
//!
//! Built-in node types: constant sources, arithmetic, string operations,
//! typed output sinks and the If/Merge control-flow pair.

mod constant;
mod control;
mod math;
mod output;
mod text;

pub use constant::{BoolNode, NumberNode, StringNode};
pub use control::{IfNode, MergeNode};
pub use math::{AddNumberNode, ClampNumberNode, MultiplyNode};
pub use output::{OutputBoolNode, OutputNumberNode, OutputStringNode};
pub use text::{format_number, ConcatNode, NumberFormat, ToStringNode};

use dagruntime::NodeRegistry;
use std::sync::Arc;

/// Register all standard nodes with a registry
pub fn register_all(registry: &mut NodeRegistry) {
    registry.register(Arc::new(NumberNode));
    registry.register(Arc::new(StringNode));
    registry.register(Arc::new(BoolNode));
    registry.register(Arc::new(AddNumberNode));
    registry.register(Arc::new(ClampNumberNode));
    registry.register(Arc::new(MultiplyNode));
    registry.register(Arc::new(ToStringNode));
    registry.register(Arc::new(ConcatNode));
    registry.register(Arc::new(OutputNumberNode));
    registry.register(Arc::new(OutputStringNode));
    registry.register(Arc::new(OutputBoolNode));
    registry.register(Arc::new(IfNode));
    registry.register(Arc::new(MergeNode));

    // Older graphs use the legacy name Add
    registry.register_alias("Add", "AddNumber");
}

/// A registry holding every standard node, ready to share
pub fn standard_registry() -> Arc<NodeRegistry> {
    let mut registry = NodeRegistry::new();
    register_all(&mut registry);
    tracing::info!("Standard registry ready: {} node types", registry.list_node_types().len());
    Arc::new(registry)
}

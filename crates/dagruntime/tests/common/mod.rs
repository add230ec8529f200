//! Minimal node types for exercising the runtime without the standard library
#![allow(dead_code)]

use dagcore::{ComputeContext, NodeError, NodeMetadata, NodeType, ParamSpec, Value, ValueType};
use dagruntime::{Graph, GraphRuntime, NodeRegistry, RuntimeConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Number source, param `value`
pub struct Constant;

impl NodeType for Constant {
    fn node_type(&self) -> &str {
        "Constant"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Constant", "number source")
            .with_outputs([ValueType::Number])
            .with_param(ParamSpec::new("value", 0.0, "emitted value"))
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        Ok(vec![Value::Number(ctx.number_param_or("value", 0.0))])
    }
}

/// Bool source, param `value`
pub struct Flag;

impl NodeType for Flag {
    fn node_type(&self) -> &str {
        "Flag"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Flag", "bool source")
            .with_outputs([ValueType::Bool])
            .with_param(ParamSpec::new("value", false, "emitted value"))
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        Ok(vec![Value::Bool(ctx.bool_param_or("value", false))])
    }
}

/// Adds two numbers
pub struct Sum;

impl NodeType for Sum {
    fn node_type(&self) -> &str {
        "Sum"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Sum", "a + b")
            .with_inputs([ValueType::Number, ValueType::Number])
            .with_outputs([ValueType::Number])
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        match ctx.inputs {
            [Value::Number(a), Value::Number(b)] => Ok(vec![Value::Number(a + b)]),
            _ => Err(NodeError::InvalidInput("Sum: invalid inputs".to_string())),
        }
    }
}

/// Bool passthrough with one input, used as a gated sink
pub struct Probe;

impl NodeType for Probe {
    fn node_type(&self) -> &str {
        "Probe"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Probe", "bool passthrough")
            .with_inputs([ValueType::Bool])
            .with_outputs([ValueType::Bool])
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        Ok(vec![ctx.require_input(0)?.clone()])
    }
}

/// Two bool inputs, logical and
pub struct Both;

impl NodeType for Both {
    fn node_type(&self) -> &str {
        "Both"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Both", "a && b")
            .with_inputs([ValueType::Bool, ValueType::Bool])
            .with_outputs([ValueType::Bool])
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        let a = ctx.require_input(0)?.as_bool().unwrap_or(false);
        let b = ctx.require_input(1)?.as_bool().unwrap_or(false);
        Ok(vec![Value::Bool(a && b)])
    }
}

/// Conditional node: outputs (cond, !cond)
pub struct Branch;

impl NodeType for Branch {
    fn node_type(&self) -> &str {
        "Branch"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Branch", "conditional")
            .with_inputs([ValueType::Bool])
            .with_outputs([ValueType::Bool, ValueType::Bool])
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        match ctx.inputs {
            [Value::Bool(c)] => Ok(vec![Value::Bool(*c), Value::Bool(!*c)]),
            _ => Err(NodeError::InvalidInput("Branch: expects Bool".to_string())),
        }
    }

    fn is_conditional(&self) -> bool {
        true
    }
}

/// Number passthrough that always fails with param `reason`
pub struct Fail;

impl NodeType for Fail {
    fn node_type(&self) -> &str {
        "Fail"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Fail", "always fails")
            .with_inputs([ValueType::Number])
            .with_outputs([ValueType::Number])
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        Err(NodeError::ExecutionFailed(
            ctx.string_param_or("reason", "boom").to_string(),
        ))
    }
}

pub struct Panics;

impl NodeType for Panics {
    fn node_type(&self) -> &str {
        "Panics"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Panics", "panics").with_outputs([ValueType::Number])
    }

    fn compute(&self, _ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        panic!("compute exploded");
    }
}

/// Counts compute calls across every instance
pub struct Counted {
    pub calls: Arc<AtomicUsize>,
}

impl NodeType for Counted {
    fn node_type(&self) -> &str {
        "Counted"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Counted", "number passthrough that counts calls")
            .with_inputs([ValueType::Number])
            .with_outputs([ValueType::Number])
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![ctx.require_input(0)?.clone()])
    }
}

/// Waits until `parties` computes are in flight at once, failing after
/// `patience`
pub struct Rendezvous {
    pub parties: usize,
    pub patience: Duration,
    pub arrived: Arc<(Mutex<usize>, Condvar)>,
}

impl NodeType for Rendezvous {
    fn node_type(&self) -> &str {
        "Rendezvous"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Rendezvous", "meets its peers").with_outputs([ValueType::Number])
    }

    fn compute(&self, _ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        let (lock, cvar) = &*self.arrived;
        let mut arrived = lock.lock().unwrap();
        *arrived += 1;
        cvar.notify_all();
        let (arrived, timeout) = cvar
            .wait_timeout_while(arrived, self.patience, |n| *n < self.parties)
            .unwrap();
        if timeout.timed_out() && *arrived < self.parties {
            return Err(NodeError::ExecutionFailed("peers never arrived".to_string()));
        }
        Ok(vec![Value::Number(*arrived as f64)])
    }
}

pub fn test_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register(Arc::new(Constant));
    registry.register(Arc::new(Flag));
    registry.register(Arc::new(Sum));
    registry.register(Arc::new(Probe));
    registry.register(Arc::new(Both));
    registry.register(Arc::new(Branch));
    registry.register(Arc::new(Fail));
    registry.register(Arc::new(Panics));
    registry
}

pub fn runtime() -> GraphRuntime {
    GraphRuntime::new(Arc::new(test_registry()))
}

pub fn runtime_with(registry: NodeRegistry, max_parallel_nodes: usize) -> GraphRuntime {
    GraphRuntime::with_config(
        Arc::new(registry),
        RuntimeConfig {
            max_parallel_nodes,
            ..RuntimeConfig::default()
        },
    )
}

pub fn constant(graph: &mut Graph, id: i32, value: f64) {
    graph.add_node(id, "Constant", format!("c{id}")).unwrap();
    graph.set_param(id, "value", value).unwrap();
}

pub fn flag(graph: &mut Graph, id: i32, value: bool) {
    graph.add_node(id, "Flag", format!("f{id}")).unwrap();
    graph.set_param(id, "value", value).unwrap();
}

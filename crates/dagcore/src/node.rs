use crate::{NodeError, Value, ValueType};
use serde::Serialize;
use std::collections::HashMap;

/// Caller-assigned node identifier, unique within a graph
pub type NodeId = i32;

/// Core trait every node kind implements.
///
/// Node types are stateless: `compute` may read only the context it is given
/// and returns the full replacement output buffer for the node.
pub trait NodeType: Send + Sync {
    /// Registry name (e.g. "AddNumber", "If")
    fn node_type(&self) -> &str;

    /// Signature, parameters and descriptive text
    fn metadata(&self) -> NodeMetadata;

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError>;

    /// Conditional nodes gate their consumers: an edge leaving output 0 runs
    /// its target only when output 0 is true, an edge leaving output 1 only
    /// when output 0 is false.
    fn is_conditional(&self) -> bool {
        false
    }
}

/// Everything a compute call may look at
#[derive(Debug, Clone, Copy)]
pub struct ComputeContext<'a> {
    pub node_id: NodeId,
    pub params: &'a HashMap<String, Value>,
    pub inputs: &'a [Value],
}

impl<'a> ComputeContext<'a> {
    pub fn new(node_id: NodeId, params: &'a HashMap<String, Value>, inputs: &'a [Value]) -> Self {
        Self {
            node_id,
            params,
            inputs,
        }
    }

    /// Get required input or return error
    pub fn require_input(&self, index: usize) -> Result<&'a Value, NodeError> {
        self.inputs.get(index).ok_or(NodeError::MissingInput(index))
    }

    pub fn param(&self, name: &str) -> Option<&'a Value> {
        self.params.get(name)
    }

    /// Number parameter, or `default` when unset or of another kind
    pub fn number_param_or(&self, name: &str, default: f64) -> f64 {
        self.param(name).and_then(Value::as_f64).unwrap_or(default)
    }

    pub fn string_param_or(&self, name: &str, default: &'a str) -> &'a str {
        self.param(name).and_then(Value::as_str).unwrap_or(default)
    }

    pub fn bool_param_or(&self, name: &str, default: bool) -> bool {
        self.param(name).and_then(Value::as_bool).unwrap_or(default)
    }
}

/// Describes a node type for introspection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
    pub category: String,
    pub inputs: Vec<ValueType>,
    pub outputs: Vec<ValueType>,
    pub params: Vec<ParamSpec>,
}

impl NodeMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "1.0.0".to_string(),
            description: description.into(),
            category: "general".to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = ValueType>) -> Self {
        self.inputs = inputs.into_iter().collect();
        self
    }

    pub fn with_outputs(mut self, outputs: impl IntoIterator<Item = ValueType>) -> Self {
        self.outputs = outputs.into_iter().collect();
        self
    }

    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }
}

/// A parameter a node type reads, with its default
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub default: Value,
    pub description: String,
    /// Allowed string values; empty when the parameter is not an enumeration
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, default: impl Into<Value>, description: impl Into<String>) -> Self {
        let default = default.into();
        Self {
            name: name.into(),
            value_type: default.value_type(),
            default,
            description: description.into(),
            options: Vec::new(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// Per-node, per-run execution state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
pub enum ExecutionState {
    #[default]
    Pending = 0,
    Active = 1,
    Skipped = 2,
    Completed = 3,
}

impl ExecutionState {
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ExecutionState::Active,
            2 => ExecutionState::Skipped,
            3 => ExecutionState::Completed,
            _ => ExecutionState::Pending,
        }
    }
}

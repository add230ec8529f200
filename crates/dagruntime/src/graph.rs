use crate::registry::{NodeRegistry, RegisteredType};
use dagcore::{ExecutionState, GraphError, NodeId, OutputError, Value, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A node instance bound to a registry type
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    node_type: Arc<RegisteredType>,
    name: String,
    pub(crate) params: HashMap<String, Value>,
    pub(crate) inputs: Vec<Value>,
    pub(crate) outputs: Vec<Value>,
    pub(crate) state: ExecutionState,
}

impl Node {
    fn new(id: NodeId, node_type: Arc<RegisteredType>, name: String) -> Self {
        let inputs = vec![Value::zero(); node_type.inputs().len()];
        Self {
            id,
            node_type,
            name,
            params: HashMap::new(),
            inputs,
            outputs: Vec::new(),
            state: ExecutionState::Pending,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_type(&self) -> &Arc<RegisteredType> {
        &self.node_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &HashMap<String, Value> {
        &self.params
    }

    /// Input values consumed by the last run
    pub fn inputs(&self) -> &[Value] {
        &self.inputs
    }

    /// Output values produced by the last run; empty if the node never
    /// computed
    pub fn outputs(&self) -> &[Value] {
        &self.outputs
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub(crate) fn reset(&mut self) {
        self.inputs = vec![Value::zero(); self.node_type.inputs().len()];
        self.outputs.clear();
        self.state = ExecutionState::Pending;
    }
}

/// Data edge from a producer output socket to a consumer input socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from_node: NodeId,
    pub from_output: usize,
    pub to_node: NodeId,
    pub to_input: usize,
}

/// A designated readable result slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPin {
    pub node: NodeId,
    pub output: usize,
}

/// Mutable instance graph.
///
/// Every edge and output pin references a node that exists and a socket index
/// valid for that node's type; mutations that would break this are rejected
/// and leave the graph as it was.
#[derive(Debug)]
pub struct Graph {
    registry: Arc<NodeRegistry>,
    pub(crate) nodes: HashMap<NodeId, Node>,
    edges: Vec<Edge>,
    outputs: Vec<OutputPin>,
    last_error: Option<String>,
}

impl Graph {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self {
            registry,
            nodes: HashMap::new(),
            edges: Vec::new(),
            outputs: Vec::new(),
            last_error: None,
        }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn add_node(
        &mut self,
        id: NodeId,
        type_name: &str,
        name: impl Into<String>,
    ) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        let node_type = self
            .registry
            .get(type_name)
            .cloned()
            .ok_or_else(|| GraphError::UnknownNodeType(type_name.to_string()))?;
        self.nodes.insert(id, Node::new(id, node_type, name.into()));
        Ok(())
    }

    /// Create or overwrite a parameter. The value is not checked against the
    /// type's parameter spec; compute functions fall back to their defaults
    /// when a parameter has the wrong kind.
    pub fn set_param(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        node.params.insert(key.into(), value.into());
        Ok(())
    }

    /// Link an output socket to an input socket of exactly the same type.
    /// Several edges may feed one input; the one added last wins.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_output: usize,
        to_node: NodeId,
        to_input: usize,
    ) -> Result<(), GraphError> {
        let source = self.nodes.get(&from_node).ok_or(GraphError::NodeNotFound(from_node))?;
        let target = self.nodes.get(&to_node).ok_or(GraphError::NodeNotFound(to_node))?;

        let from = *source
            .node_type
            .outputs()
            .get(from_output)
            .ok_or(GraphError::SourceIndexOutOfRange {
                node: from_node,
                index: from_output,
            })?;
        let to = *target
            .node_type
            .inputs()
            .get(to_input)
            .ok_or(GraphError::TargetIndexOutOfRange {
                node: to_node,
                index: to_input,
            })?;
        if from != to {
            return Err(GraphError::TypeMismatch { from, to });
        }

        self.edges.push(Edge {
            from_node,
            from_output,
            to_node,
            to_input,
        });
        Ok(())
    }

    pub fn add_output(&mut self, node: NodeId, output: usize) -> Result<(), GraphError> {
        let n = self.nodes.get(&node).ok_or(GraphError::NodeNotFound(node))?;
        if output >= n.node_type.outputs().len() {
            return Err(GraphError::SourceIndexOutOfRange { node, index: output });
        }
        self.outputs.push(OutputPin { node, output });
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Node ids in ascending order
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn outputs(&self) -> &[OutputPin] {
        &self.outputs
    }

    pub fn execution_state(&self, id: NodeId) -> Option<ExecutionState> {
        self.nodes.get(&id).map(|n| n.state)
    }

    /// Message of the most recent failed run
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    /// Clear buffers and execution states ahead of a run
    pub(crate) fn reset(&mut self) {
        for node in self.nodes.values_mut() {
            node.reset();
        }
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Value currently held by output pin `index`
    pub fn output_value(&self, index: usize) -> Result<&Value, OutputError> {
        let pin = self.outputs.get(index).ok_or(OutputError::PinOutOfRange(index))?;
        let node = self.nodes.get(&pin.node).ok_or(OutputError::NodeMissing(pin.node))?;
        node.outputs.get(pin.output).ok_or(OutputError::NoValue {
            node: pin.node,
            index: pin.output,
        })
    }

    pub fn output_type(&self, index: usize) -> Result<ValueType, OutputError> {
        self.output_value(index).map(Value::value_type)
    }

    pub fn output_number(&self, index: usize) -> Result<f64, OutputError> {
        let value = self.output_value(index)?;
        value.as_f64().ok_or(OutputError::WrongType {
            expected: ValueType::Number,
            actual: value.value_type(),
        })
    }

    pub fn output_string(&self, index: usize) -> Result<&str, OutputError> {
        let value = self.output_value(index)?;
        value.as_str().ok_or(OutputError::WrongType {
            expected: ValueType::String,
            actual: value.value_type(),
        })
    }

    pub fn output_bool(&self, index: usize) -> Result<bool, OutputError> {
        let value = self.output_value(index)?;
        value.as_bool().ok_or(OutputError::WrongType {
            expected: ValueType::Bool,
            actual: value.value_type(),
        })
    }
}

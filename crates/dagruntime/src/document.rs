use crate::graph::Graph;
use crate::registry::NodeRegistry;
use dagcore::{GraphError, NodeId, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// JSON description of a graph, as read by the command line tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub connections: Vec<ConnectionDocument>,
    #[serde(default)]
    pub outputs: Vec<OutputDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDocument {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConnectionDocument {
    pub from: NodeId,
    #[serde(default)]
    pub from_output: usize,
    pub to: NodeId,
    #[serde(default)]
    pub to_input: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutputDocument {
    pub node: NodeId,
    #[serde(default)]
    pub output: usize,
}

impl GraphDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_node(&mut self, id: NodeId, node_type: impl Into<String>, name: impl Into<String>) -> &mut NodeDocument {
        self.nodes.push(NodeDocument {
            id,
            node_type: node_type.into(),
            name: name.into(),
            params: BTreeMap::new(),
        });
        let last = self.nodes.len() - 1;
        &mut self.nodes[last]
    }

    pub fn connect(&mut self, from: NodeId, from_output: usize, to: NodeId, to_input: usize) {
        self.connections.push(ConnectionDocument {
            from,
            from_output,
            to,
            to_input,
        });
    }

    pub fn add_output(&mut self, node: NodeId, output: usize) {
        self.outputs.push(OutputDocument { node, output });
    }

    /// Build a graph through the regular mutation operations, so every
    /// construction check applies. Stops at the first rejected mutation.
    pub fn build(&self, registry: Arc<NodeRegistry>) -> Result<Graph, GraphError> {
        let mut graph = Graph::new(registry);
        for node in &self.nodes {
            graph.add_node(node.id, &node.node_type, node.name.clone())?;
            for (key, value) in &node.params {
                graph.set_param(node.id, key.clone(), value.clone())?;
            }
        }
        for c in &self.connections {
            graph.connect(c.from, c.from_output, c.to, c.to_input)?;
        }
        for pin in &self.outputs {
            graph.add_output(pin.node, pin.output)?;
        }
        Ok(graph)
    }
}

impl NodeDocument {
    pub fn with_param(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

use crate::{NodeId, ValueType};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("{0}")]
    Execution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure reported by a node type's compute function
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Missing required input: {0}")]
    MissingInput(usize),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Construction and structural errors. A failing mutation leaves the graph
/// untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    #[error("unknown type '{0}'")]
    UnknownNodeType(String),

    #[error("unknown node id {0}")]
    NodeNotFound(NodeId),

    #[error("output index {index} out of range for node {node}")]
    SourceIndexOutOfRange { node: NodeId, index: usize },

    #[error("input index {index} out of range for node {node}")]
    TargetIndexOutOfRange { node: NodeId, index: usize },

    #[error("socket type mismatch: {from} output into {to} input")]
    TypeMismatch { from: ValueType, to: ValueType },

    #[error("Cycle detected in graph")]
    CyclicDependency,
}

/// Errors reading a designated output pin back after a run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutputError {
    #[error("output pin {0} out of range")]
    PinOutOfRange(usize),

    #[error("output pin references missing node {0}")]
    NodeMissing(NodeId),

    #[error("node {node} produced no value at output {index}")]
    NoValue { node: NodeId, index: usize },

    #[error("output is {actual}, expected {expected}")]
    WrongType { expected: ValueType, actual: ValueType },
}

//! Core abstractions for the dataflow engine
//!
//! This crate provides the value model, the node type contract and the error
//! and event types that every other crate depends on. It has no scheduling
//! logic of its own.

mod error;
pub mod events;
mod node;
mod value;

pub use error::{EngineError, GraphError, NodeError, OutputError};
pub use events::*;
pub use node::{ComputeContext, ExecutionState, NodeId, NodeMetadata, NodeType, ParamSpec};
pub use value::{Value, ValueType};

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

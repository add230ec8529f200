//! Graph execution runtime
//!
//! This crate provides the node type registry, the mutable instance graph,
//! the scheduler that validates and maps it, and the engine that runs it with
//! node-level parallelism and conditional branch skipping.

mod document;
mod executor;
mod graph;
mod registry;
mod runtime;
mod scheduler;

pub use document::{ConnectionDocument, GraphDocument, NodeDocument, OutputDocument};
pub use executor::{GraphExecutor, RunReport};
pub use graph::{Edge, Graph, Node, OutputPin};
pub use registry::{NodeRegistry, RegisteredType};
pub use runtime::{GraphRuntime, RuntimeConfig};
pub use scheduler::{ControlGate, InputSource, Schedule};

use dagcore::{ComputeContext, EngineError, NodeError, NodeMetadata, NodeType, Value, ValueType};
use std::collections::HashMap;
use std::sync::Arc;

/// A node type as stored in the registry: the implementation plus its
/// metadata, resolved once at registration.
pub struct RegisteredType {
    implementation: Arc<dyn NodeType>,
    metadata: NodeMetadata,
}

impl RegisteredType {
    fn new(implementation: Arc<dyn NodeType>) -> Self {
        let metadata = implementation.metadata();
        Self {
            implementation,
            metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn inputs(&self) -> &[ValueType] {
        &self.metadata.inputs
    }

    pub fn outputs(&self) -> &[ValueType] {
        &self.metadata.outputs
    }

    pub fn metadata(&self) -> &NodeMetadata {
        &self.metadata
    }

    pub fn is_conditional(&self) -> bool {
        self.implementation.is_conditional()
    }

    pub fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        self.implementation.compute(ctx)
    }
}

impl std::fmt::Debug for RegisteredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredType")
            .field("name", &self.metadata.name)
            .finish()
    }
}

/// Catalog of available node types.
///
/// Populated with `&mut self` while the process sets up, then shared behind an
/// `Arc`; lookups afterwards are read-only.
#[derive(Debug)]
pub struct NodeRegistry {
    types: HashMap<String, Arc<RegisteredType>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Register a node type under its own name, replacing any previous entry
    pub fn register(&mut self, node_type: Arc<dyn NodeType>) {
        let name = node_type.node_type().to_string();
        tracing::debug!("Registering node type: {}", name);
        self.types.insert(name, Arc::new(RegisteredType::new(node_type)));
    }

    /// Make `target` reachable under a second name. Returns false if `target`
    /// is not registered.
    pub fn register_alias(&mut self, alias: impl Into<String>, target: &str) -> bool {
        match self.types.get(target).cloned() {
            Some(entry) => {
                self.types.insert(alias.into(), entry);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<RegisteredType>> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// All registered names, aliases included, sorted
    pub fn list_node_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get_metadata(&self, name: &str) -> Option<&NodeMetadata> {
        self.types.get(name).map(|t| t.metadata())
    }

    /// JSON array of every registered name
    pub fn list_types_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(&self.list_node_types())?)
    }

    /// JSON description of one type: name, version, description, socket
    /// types and parameter specs
    pub fn type_spec_json(&self, name: &str) -> Result<String, EngineError> {
        let metadata = self
            .get_metadata(name)
            .ok_or_else(|| dagcore::GraphError::UnknownNodeType(name.to_string()))?;
        Ok(serde_json::to_string(metadata)?)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

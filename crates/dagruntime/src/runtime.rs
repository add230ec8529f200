use crate::{executor::RunReport, graph::Graph, registry::NodeRegistry, GraphExecutor};
use dagcore::{EngineError, EventBus, ExecutionEvent};
use std::sync::Arc;

/// Main entry point: a shared registry, an executor and an event bus
pub struct GraphRuntime {
    registry: Arc<NodeRegistry>,
    executor: GraphExecutor,
    event_bus: Arc<EventBus>,
}

impl GraphRuntime {
    /// Create a runtime over a pre-populated registry with default settings
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self::with_config(registry, RuntimeConfig::default())
    }

    pub fn with_config(registry: Arc<NodeRegistry>, config: RuntimeConfig) -> Self {
        Self {
            registry,
            executor: GraphExecutor::new(config.max_parallel_nodes),
            event_bus: Arc::new(EventBus::new(config.event_buffer_size)),
        }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// New empty graph bound to this runtime's registry
    pub fn create_graph(&self) -> Graph {
        Graph::new(Arc::clone(&self.registry))
    }

    /// Run one execution pass. Taking the graph mutably rules out concurrent
    /// runs of the same instance.
    pub async fn run(&self, graph: &mut Graph) -> Result<RunReport, EngineError> {
        self.executor.execute(graph, &self.event_bus).await
    }

    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<ExecutionEvent> {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

/// Configuration for the runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Upper bound on node tasks in flight at once
    pub max_parallel_nodes: usize,
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_parallel_nodes: 10,
            event_buffer_size: 1000,
        }
    }
}

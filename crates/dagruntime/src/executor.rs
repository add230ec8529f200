use crate::graph::Graph;
use crate::registry::RegisteredType;
use crate::scheduler::{ControlGate, InputSource, Schedule};
use chrono::Utc;
use dagcore::{
    ComputeContext, EngineError, EventBus, ExecutionEvent, ExecutionId, ExecutionState, NodeId,
    Value,
};
use futures::stream::{FuturesUnordered, StreamExt};
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

const DANGLING_INPUT: &str = "Dangling edge or output index OOB";

/// Runs graphs as DAGs, one blocking task per node, with node-level
/// parallelism bounded by `max_parallel`.
pub struct GraphExecutor {
    max_parallel: usize,
}

impl GraphExecutor {
    pub fn new(max_parallel: usize) -> Self {
        Self {
            max_parallel: max_parallel.max(1),
        }
    }

    /// Execute one pass over the graph.
    ///
    /// Buffers and execution states are reset first, so a graph can be run
    /// any number of times. On failure the graph keeps the partially
    /// populated buffers for inspection and records the first failure
    /// message as its last error.
    pub async fn execute(
        &self,
        graph: &mut Graph,
        event_bus: &EventBus,
    ) -> Result<RunReport, EngineError> {
        let execution_id = ExecutionId::new_v4();
        let start_time = Instant::now();
        graph.reset();

        event_bus.emit(ExecutionEvent::RunStarted {
            execution_id,
            node_count: graph.node_count(),
            timestamp: Utc::now(),
        });
        tracing::info!("Starting graph run {} ({} nodes)", execution_id, graph.node_count());

        let schedule = match Schedule::build(graph) {
            Ok(schedule) => schedule,
            Err(e) => {
                tracing::error!("Graph validation failed: {}", e);
                graph.set_error(e.to_string());
                Self::finish(event_bus, execution_id, false, start_time);
                return Err(e.into());
            }
        };

        let state = Arc::new(RunState::new(graph, &schedule));
        let tally = self.run_tasks(&schedule, &state, event_bus, execution_id).await;
        state.write_back(graph);

        let duration_ms = Self::finish(event_bus, execution_id, !state.failure.is_set(), start_time);

        if let Some(message) = state.failure.message() {
            tracing::error!("Graph run {} failed: {}", execution_id, message);
            graph.set_error(message.clone());
            return Err(EngineError::Execution(message));
        }

        tracing::info!(
            "Graph run {} completed in {}ms ({} completed, {} skipped)",
            execution_id,
            duration_ms,
            tally.completed,
            tally.skipped
        );

        Ok(RunReport {
            execution_id,
            completed: tally.completed,
            skipped: tally.skipped,
            total: graph.node_count(),
            duration_ms,
        })
    }

    fn finish(event_bus: &EventBus, execution_id: ExecutionId, success: bool, start: Instant) -> u64 {
        let duration_ms = start.elapsed().as_millis() as u64;
        event_bus.emit(ExecutionEvent::RunCompleted {
            execution_id,
            success,
            duration_ms,
            timestamp: Utc::now(),
        });
        duration_ms
    }

    /// Spawn node tasks as their predecessors finish, whatever the outcome,
    /// until every node has had its turn
    async fn run_tasks(
        &self,
        schedule: &Schedule,
        state: &Arc<RunState>,
        event_bus: &EventBus,
        execution_id: ExecutionId,
    ) -> Tally {
        let graph = &schedule.precedence;
        let mut waiting: HashMap<NodeIndex, usize> = graph
            .node_indices()
            .map(|idx| (idx, graph.neighbors_directed(idx, Direction::Incoming).count()))
            .collect();
        let mut ready: VecDeque<NodeIndex> = schedule
            .order
            .iter()
            .filter_map(|id| schedule.index_of.get(id).copied())
            .filter(|idx| waiting.get(idx) == Some(&0))
            .collect();

        let mut running = FuturesUnordered::new();
        let mut tally = Tally::default();

        loop {
            while running.len() < self.max_parallel {
                let Some(idx) = ready.pop_front() else {
                    break;
                };
                let node_id = graph[idx];
                let task_state = Arc::clone(state);
                let handle = tokio::task::spawn_blocking(move || task_state.run_node(node_id));
                running.push(async move { (idx, handle.await) });
            }

            let Some((idx, joined)) = running.next().await else {
                break;
            };
            let node_id = graph[idx];

            let outcome = joined.unwrap_or_else(|e| {
                let message = format!("{} compute panicked: {}", state.type_name(node_id), e);
                state.failure.record(message.clone());
                NodeOutcome::Failed(message)
            });
            tally.observe(&outcome);
            Self::emit_outcome(event_bus, execution_id, node_id, state.type_name(node_id), outcome);

            for next in graph.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(count) = waiting.get_mut(&next) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push_back(next);
                    }
                }
            }
        }

        tally
    }

    fn emit_outcome(
        event_bus: &EventBus,
        execution_id: ExecutionId,
        node_id: NodeId,
        node_type: &str,
        outcome: NodeOutcome,
    ) {
        match outcome {
            NodeOutcome::Completed => {
                tracing::debug!("Executed node {} ({})", node_id, node_type);
                event_bus.emit(ExecutionEvent::NodeCompleted {
                    execution_id,
                    node_id,
                    node_type: node_type.to_string(),
                    timestamp: Utc::now(),
                });
            }
            NodeOutcome::Skipped => {
                tracing::debug!("Skipping node {} (inactive branch)", node_id);
                event_bus.emit(ExecutionEvent::NodeSkipped {
                    execution_id,
                    node_id,
                    node_type: node_type.to_string(),
                    timestamp: Utc::now(),
                });
            }
            NodeOutcome::Failed(error) => {
                tracing::error!("Node {} failed: {}", node_id, error);
                event_bus.emit(ExecutionEvent::NodeFailed {
                    execution_id,
                    node_id,
                    error,
                    timestamp: Utc::now(),
                });
            }
            NodeOutcome::Cancelled => {
                tracing::debug!("Node {} not run, graph run already failed", node_id);
            }
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub execution_id: ExecutionId,
    pub completed: usize,
    pub skipped: usize,
    pub total: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Default)]
struct Tally {
    completed: usize,
    skipped: usize,
}

impl Tally {
    fn observe(&mut self, outcome: &NodeOutcome) {
        match outcome {
            NodeOutcome::Completed => self.completed += 1,
            NodeOutcome::Skipped => self.skipped += 1,
            NodeOutcome::Failed(_) | NodeOutcome::Cancelled => {}
        }
    }
}

#[derive(Debug)]
enum NodeOutcome {
    Cancelled,
    Skipped,
    Completed,
    Failed(String),
}

/// The single piece of state every task may write: first failure wins, and
/// recording it cancels the tasks that have not started yet.
struct FailureCell {
    token: CancellationToken,
    message: Mutex<Option<String>>,
}

impl FailureCell {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            message: Mutex::new(None),
        }
    }

    fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns whether this call was the first writer
    fn record(&self, message: String) -> bool {
        let mut slot = self.message.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return false;
        }
        *slot = Some(message);
        self.token.cancel();
        true
    }

    fn message(&self) -> Option<String> {
        self.message
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Per-node arena entry. Buffers are written once, by the node's own task,
/// and read by successors only after the precedence graph lets them start.
struct NodeSlot {
    node_type: Arc<RegisteredType>,
    params: HashMap<String, Value>,
    defaults: Vec<Value>,
    sources: Vec<Option<InputSource>>,
    gate: Option<ControlGate>,
    state: AtomicU8,
    inputs: OnceLock<Vec<Value>>,
    outputs: OnceLock<Vec<Value>>,
}

impl NodeSlot {
    fn set_state(&self, state: ExecutionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn state(&self) -> ExecutionState {
        ExecutionState::from_u8(self.state.load(Ordering::Acquire))
    }
}

struct RunState {
    slots: HashMap<NodeId, NodeSlot>,
    failure: FailureCell,
}

impl RunState {
    fn new(graph: &Graph, schedule: &Schedule) -> Self {
        let slots = graph
            .nodes()
            .map(|node| {
                let slot = NodeSlot {
                    node_type: Arc::clone(node.node_type()),
                    params: node.params().clone(),
                    defaults: node.inputs().to_vec(),
                    sources: schedule.input_sources(node.id()).to_vec(),
                    gate: schedule.gate(node.id()),
                    state: AtomicU8::new(ExecutionState::Pending as u8),
                    inputs: OnceLock::new(),
                    outputs: OnceLock::new(),
                };
                (node.id(), slot)
            })
            .collect();

        Self {
            slots,
            failure: FailureCell::new(),
        }
    }

    fn type_name(&self, id: NodeId) -> &str {
        self.slots.get(&id).map(|s| s.node_type.name()).unwrap_or("unknown")
    }

    /// Output 0 of a finished conditional node, if it produced one
    fn branch_taken(&self, controller: NodeId) -> Option<bool> {
        self.slots
            .get(&controller)?
            .outputs
            .get()?
            .first()
            .and_then(Value::as_bool)
    }

    fn run_node(&self, id: NodeId) -> NodeOutcome {
        if self.failure.is_set() {
            return NodeOutcome::Cancelled;
        }
        let Some(slot) = self.slots.get(&id) else {
            return NodeOutcome::Cancelled;
        };

        if let Some(gate) = slot.gate {
            match self.branch_taken(gate.controller) {
                Some(taken) if taken == gate.branch => {}
                _ => {
                    slot.set_state(ExecutionState::Skipped);
                    return NodeOutcome::Skipped;
                }
            }
        }

        slot.set_state(ExecutionState::Active);

        let mut inputs = slot.defaults.clone();
        for (index, source) in slot.sources.iter().enumerate() {
            let Some((producer, output)) = *source else {
                continue;
            };
            let value = self
                .slots
                .get(&producer)
                .and_then(|p| p.outputs.get())
                .and_then(|outputs| outputs.get(output));
            let Some(value) = value else {
                let _ = slot.inputs.set(inputs);
                self.failure.record(DANGLING_INPUT.to_string());
                return NodeOutcome::Failed(DANGLING_INPUT.to_string());
            };
            if let Some(slot_value) = inputs.get_mut(index) {
                *slot_value = value.clone();
            }
        }

        let result = slot
            .node_type
            .compute(&ComputeContext::new(id, &slot.params, &inputs));
        let _ = slot.inputs.set(inputs);

        match result {
            Ok(outputs) => {
                let _ = slot.outputs.set(outputs);
                slot.set_state(ExecutionState::Completed);
                NodeOutcome::Completed
            }
            Err(e) => {
                let message = format!("{} compute failed: {}", slot.node_type.name(), e);
                self.failure.record(message.clone());
                NodeOutcome::Failed(message)
            }
        }
    }

    /// Copy buffers and execution states back onto the graph's nodes
    fn write_back(&self, graph: &mut Graph) {
        for (id, slot) in &self.slots {
            if let Some(node) = graph.nodes.get_mut(id) {
                if let Some(inputs) = slot.inputs.get() {
                    node.inputs = inputs.clone();
                }
                node.outputs = slot.outputs.get().cloned().unwrap_or_default();
                node.state = slot.state();
            }
        }
    }
}

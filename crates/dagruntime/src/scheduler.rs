use crate::graph::Graph;
use dagcore::{GraphError, NodeId};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, VecDeque};

/// Where an input slot reads from: producer node and its output index
pub type InputSource = (NodeId, usize);

/// Control relationship between a node and the conditional node gating it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlGate {
    pub controller: NodeId,
    /// Run only when the controller's output 0 equals this
    pub branch: bool,
}

/// Validated execution plan for one run.
///
/// Rebuilt before every run since the graph may change between runs.
#[derive(Debug)]
pub struct Schedule {
    /// Topological order
    pub order: Vec<NodeId>,
    /// Per node, one entry per input slot; `None` when nothing is connected
    pub inputs: HashMap<NodeId, Vec<Option<InputSource>>>,
    pub gates: HashMap<NodeId, ControlGate>,
    /// Precedence constraints, one edge per data edge
    pub precedence: DiGraph<NodeId, ()>,
    pub index_of: HashMap<NodeId, NodeIndex>,
}

impl Schedule {
    /// Map input slots, classify control edges and prove the graph acyclic
    pub fn build(graph: &Graph) -> Result<Self, GraphError> {
        let ids = graph.node_ids();

        let mut in_degree: HashMap<NodeId, usize> = HashMap::with_capacity(ids.len());
        let mut fan_out: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut inputs: HashMap<NodeId, Vec<Option<InputSource>>> = HashMap::with_capacity(ids.len());
        let mut gates: HashMap<NodeId, ControlGate> = HashMap::new();

        let mut precedence = DiGraph::with_capacity(ids.len(), graph.edges().len());
        let mut index_of = HashMap::with_capacity(ids.len());

        for &id in &ids {
            in_degree.insert(id, 0);
            if let Some(node) = graph.node(id) {
                inputs.insert(id, vec![None; node.node_type().inputs().len()]);
            }
            index_of.insert(id, precedence.add_node(id));
        }

        for edge in graph.edges() {
            let (Some(&from_idx), Some(&to_idx)) =
                (index_of.get(&edge.from_node), index_of.get(&edge.to_node))
            else {
                let missing = if index_of.contains_key(&edge.from_node) {
                    edge.to_node
                } else {
                    edge.from_node
                };
                return Err(GraphError::NodeNotFound(missing));
            };

            fan_out.entry(edge.from_node).or_default().push(edge.to_node);
            *in_degree.entry(edge.to_node).or_default() += 1;
            precedence.add_edge(from_idx, to_idx, ());

            // Later edges into the same slot overwrite earlier ones
            if let Some(slot) = inputs
                .get_mut(&edge.to_node)
                .and_then(|slots| slots.get_mut(edge.to_input))
            {
                *slot = Some((edge.from_node, edge.from_output));
            }

            let conditional = graph
                .node(edge.from_node)
                .is_some_and(|n| n.node_type().is_conditional());
            if conditional {
                let gate = ControlGate {
                    controller: edge.from_node,
                    branch: edge.from_output == 0,
                };
                match gates.get(&edge.to_node) {
                    None => {
                        gates.insert(edge.to_node, gate);
                    }
                    Some(existing) if *existing != gate => {
                        tracing::warn!(
                            "Node {} is gated by more than one conditional; keeping node {} ({} branch)",
                            edge.to_node,
                            existing.controller,
                            if existing.branch { "then" } else { "else" },
                        );
                    }
                    Some(_) => {}
                }
            }
        }

        // Kahn's algorithm
        let mut frontier: VecDeque<NodeId> = ids
            .iter()
            .copied()
            .filter(|id| in_degree.get(id) == Some(&0))
            .collect();
        let mut order = Vec::with_capacity(ids.len());

        while let Some(id) = frontier.pop_front() {
            order.push(id);
            if let Some(targets) = fan_out.get(&id) {
                for target in targets {
                    if let Some(degree) = in_degree.get_mut(target) {
                        *degree -= 1;
                        if *degree == 0 {
                            frontier.push_back(*target);
                        }
                    }
                }
            }
        }

        if order.len() != ids.len() {
            let stuck: Vec<NodeId> = ids
                .iter()
                .copied()
                .filter(|id| in_degree.get(id).is_some_and(|d| *d > 0))
                .collect();
            tracing::debug!("Cycle through nodes {:?}", stuck);
            return Err(GraphError::CyclicDependency);
        }

        Ok(Self {
            order,
            inputs,
            gates,
            precedence,
            index_of,
        })
    }

    pub fn gate(&self, id: NodeId) -> Option<ControlGate> {
        self.gates.get(&id).copied()
    }

    pub fn input_sources(&self, id: NodeId) -> &[Option<InputSource>] {
        self.inputs.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

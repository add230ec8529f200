mod common;

use common::{constant, runtime};
use dagcore::{ExecutionState, GraphError, OutputError, Value, ValueType};

#[test]
fn add_node_rejects_duplicates_and_unknown_types() {
    let rt = runtime();
    let mut graph = rt.create_graph();
    graph.add_node(1, "Constant", "a").unwrap();

    assert_eq!(graph.add_node(1, "Sum", "b"), Err(GraphError::DuplicateNode(1)));
    assert_eq!(
        graph.add_node(2, "Nope", "c"),
        Err(GraphError::UnknownNodeType("Nope".to_string()))
    );
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.node(1).unwrap().node_type().name(), "Constant");
}

#[test]
fn new_nodes_start_with_zeroed_inputs() {
    let rt = runtime();
    let mut graph = rt.create_graph();
    graph.add_node(1, "Sum", "sum").unwrap();

    let node = graph.node(1).unwrap();
    assert_eq!(node.inputs(), &[Value::zero(), Value::zero()]);
    assert!(node.outputs().is_empty());
    assert_eq!(node.state(), ExecutionState::Pending);
    assert_eq!(node.name(), "sum");
}

#[test]
fn set_param_overwrites_without_type_checks() {
    let rt = runtime();
    let mut graph = rt.create_graph();
    constant(&mut graph, 1, 3.0);
    graph.set_param(1, "value", "not a number").unwrap();

    assert_eq!(graph.node(1).unwrap().params()["value"], Value::from("not a number"));
    assert_eq!(graph.set_param(9, "value", 1.0), Err(GraphError::NodeNotFound(9)));
}

#[test]
fn connect_validates_nodes_indices_and_types() {
    let rt = runtime();
    let mut graph = rt.create_graph();
    constant(&mut graph, 1, 1.0);
    graph.add_node(2, "Sum", "sum").unwrap();
    graph.add_node(3, "Probe", "probe").unwrap();

    assert_eq!(graph.connect(9, 0, 2, 0), Err(GraphError::NodeNotFound(9)));
    assert_eq!(graph.connect(1, 0, 9, 0), Err(GraphError::NodeNotFound(9)));
    assert_eq!(
        graph.connect(1, 1, 2, 0),
        Err(GraphError::SourceIndexOutOfRange { node: 1, index: 1 })
    );
    assert_eq!(
        graph.connect(1, 0, 2, 2),
        Err(GraphError::TargetIndexOutOfRange { node: 2, index: 2 })
    );
    assert_eq!(
        graph.connect(1, 0, 3, 0),
        Err(GraphError::TypeMismatch {
            from: ValueType::Number,
            to: ValueType::Bool
        })
    );
    assert!(graph.edges().is_empty());

    graph.connect(1, 0, 2, 0).unwrap();
    assert_eq!(graph.edges().len(), 1);
}

#[test]
fn add_output_validates_node_and_index() {
    let rt = runtime();
    let mut graph = rt.create_graph();
    constant(&mut graph, 1, 1.0);

    assert_eq!(graph.add_output(2, 0), Err(GraphError::NodeNotFound(2)));
    assert_eq!(
        graph.add_output(1, 1),
        Err(GraphError::SourceIndexOutOfRange { node: 1, index: 1 })
    );
    graph.add_output(1, 0).unwrap();
    assert_eq!(graph.output_count(), 1);
}

#[test]
fn outputs_before_any_run_have_no_value() {
    let rt = runtime();
    let mut graph = rt.create_graph();
    constant(&mut graph, 1, 1.0);
    graph.add_output(1, 0).unwrap();

    assert_eq!(graph.output_number(0), Err(OutputError::NoValue { node: 1, index: 0 }));
    assert_eq!(graph.output_number(1), Err(OutputError::PinOutOfRange(1)));
}

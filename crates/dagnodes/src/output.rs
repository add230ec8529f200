//! Typed sinks. Each copies its input through unchanged; they exist to mark
//! a socket as a readable result of a given type.

use dagcore::{ComputeContext, NodeError, NodeMetadata, NodeType, Value, ValueType};

fn pass_through(
    ctx: &ComputeContext<'_>,
    expected: ValueType,
    message: &str,
) -> Result<Vec<Value>, NodeError> {
    match ctx.inputs {
        [value] if value.value_type() == expected => Ok(vec![value.clone()]),
        _ => Err(NodeError::InvalidInput(message.to_string())),
    }
}

fn sink_metadata(name: &str, description: &str, value_type: ValueType) -> NodeMetadata {
    NodeMetadata::new(name, description)
        .with_category("output")
        .with_inputs([value_type])
        .with_outputs([value_type])
}

pub struct OutputNumberNode;

impl NodeType for OutputNumberNode {
    fn node_type(&self) -> &str {
        "OutputNumber"
    }

    fn metadata(&self) -> NodeMetadata {
        sink_metadata("OutputNumber", "Outputs a number value", ValueType::Number)
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        pass_through(ctx, ValueType::Number, "OutputNumber expects Number")
    }
}

pub struct OutputStringNode;

impl NodeType for OutputStringNode {
    fn node_type(&self) -> &str {
        "OutputString"
    }

    fn metadata(&self) -> NodeMetadata {
        sink_metadata("OutputString", "Outputs a string value", ValueType::String)
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        pass_through(ctx, ValueType::String, "OutputString expects String")
    }
}

pub struct OutputBoolNode;

impl NodeType for OutputBoolNode {
    fn node_type(&self) -> &str {
        "OutputBool"
    }

    fn metadata(&self) -> NodeMetadata {
        sink_metadata("OutputBool", "Outputs a boolean value", ValueType::Bool)
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        pass_through(ctx, ValueType::Bool, "OutputBool expects Bool")
    }
}

use dagcore::{ComputeContext, NodeError, NodeMetadata, NodeType, ParamSpec, Value, ValueType};

/// Constant number source, parameter `value`
pub struct NumberNode;

impl NodeType for NumberNode {
    fn node_type(&self) -> &str {
        "Number"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Number", "A constant number node")
            .with_category("constant")
            .with_outputs([ValueType::Number])
            .with_param(ParamSpec::new("value", 0.0, "The numeric value"))
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        Ok(vec![Value::Number(ctx.number_param_or("value", 0.0))])
    }
}

/// Constant string source, parameter `text`
pub struct StringNode;

impl NodeType for StringNode {
    fn node_type(&self) -> &str {
        "String"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("String", "A constant string node")
            .with_category("constant")
            .with_outputs([ValueType::String])
            .with_param(ParamSpec::new("text", "", "The string value"))
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        Ok(vec![Value::from(ctx.string_param_or("text", ""))])
    }
}

/// Constant boolean source, parameter `value`
pub struct BoolNode;

impl NodeType for BoolNode {
    fn node_type(&self) -> &str {
        "Bool"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Bool", "A constant boolean node")
            .with_category("constant")
            .with_outputs([ValueType::Bool])
            .with_param(ParamSpec::new("value", false, "The boolean value"))
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        Ok(vec![Value::Bool(ctx.bool_param_or("value", false))])
    }
}

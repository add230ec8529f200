use dagcore::{ComputeContext, NodeError, NodeMetadata, NodeType, Value, ValueType};

pub struct AddNumberNode;

impl NodeType for AddNumberNode {
    fn node_type(&self) -> &str {
        "AddNumber"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("AddNumber", "Adds two numbers together")
            .with_category("math")
            .with_inputs([ValueType::Number, ValueType::Number])
            .with_outputs([ValueType::Number])
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        match ctx.inputs {
            [Value::Number(a), Value::Number(b)] => Ok(vec![Value::Number(a + b)]),
            _ => Err(NodeError::InvalidInput("AddNumber: invalid inputs".to_string())),
        }
    }
}

pub struct MultiplyNode;

impl NodeType for MultiplyNode {
    fn node_type(&self) -> &str {
        "Multiply"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Multiply", "Multiplies two numbers together")
            .with_category("math")
            .with_inputs([ValueType::Number, ValueType::Number])
            .with_outputs([ValueType::Number])
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        match ctx.inputs {
            [Value::Number(a), Value::Number(b)] => Ok(vec![Value::Number(a * b)]),
            _ => Err(NodeError::InvalidInput("Multiply: invalid inputs".to_string())),
        }
    }
}

/// Clamps inputs (value, min, max)
pub struct ClampNumberNode;

impl NodeType for ClampNumberNode {
    fn node_type(&self) -> &str {
        "ClampNumber"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("ClampNumber", "Clamps a value between min and max bounds")
            .with_category("math")
            .with_inputs([ValueType::Number, ValueType::Number, ValueType::Number])
            .with_outputs([ValueType::Number])
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        match ctx.inputs {
            [Value::Number(value), Value::Number(min), Value::Number(max)] => {
                Ok(vec![Value::Number(clamp(*value, *min, *max))])
            }
            _ => Err(NodeError::InvalidInput(
                "ClampNumber: invalid inputs (expects value, min, max)".to_string(),
            )),
        }
    }
}

/// `v < lo ? lo : hi < v ? hi : v`. An inverted range is not corrected:
/// values below `lo` come out as `lo`, anything else above `hi` as `hi`.
/// Unlike `f64::clamp` this never panics.
fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    if v < lo {
        lo
    } else if hi < v {
        hi
    } else {
        v
    }
}

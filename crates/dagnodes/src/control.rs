use dagcore::{ComputeContext, NodeError, NodeMetadata, NodeType, Value, ValueType};

/// Conditional branch.
///
/// Output 0 ("then") carries the condition, output 1 ("else") its negation.
/// Nodes fed from output 0 run only when the condition holds, nodes fed from
/// output 1 only when it does not; the others are skipped.
pub struct IfNode;

impl NodeType for IfNode {
    fn node_type(&self) -> &str {
        "If"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(
            "If",
            "Conditional branching node - routes execution based on boolean condition",
        )
        .with_category("control")
        .with_inputs([ValueType::Bool])
        .with_outputs([ValueType::Bool, ValueType::Bool])
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        let [Value::Bool(condition)] = ctx.inputs else {
            return Err(NodeError::InvalidInput(
                "If node expects Bool condition input".to_string(),
            ));
        };
        tracing::debug!("If node {}: condition={}", ctx.node_id, condition);
        Ok(vec![Value::Bool(*condition), Value::Bool(!*condition)])
    }

    fn is_conditional(&self) -> bool {
        true
    }
}

/// Joins two number branches (then, else).
///
/// Picks the then-value when it is non-zero and the else-value otherwise.
/// This looks at values, not at which branch ran: a then-branch that yields
/// 0 is indistinguishable from one that did not run. Inputs that are not
/// numbers count as 0.
pub struct MergeNode;

impl NodeType for MergeNode {
    fn node_type(&self) -> &str {
        "Merge"
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(
            "Merge",
            "Merges data from conditional branches - passes through the active input",
        )
        .with_category("control")
        .with_inputs([ValueType::Number, ValueType::Number])
        .with_outputs([ValueType::Number])
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Result<Vec<Value>, NodeError> {
        let [then_value, else_value] = ctx.inputs else {
            return Err(NodeError::InvalidInput(
                "Merge node expects 2 inputs (then_input, else_input)".to_string(),
            ));
        };
        let then_value = then_value.as_f64().unwrap_or(0.0);
        let else_value = else_value.as_f64().unwrap_or(0.0);
        let merged = if then_value != 0.0 { then_value } else { else_value };
        Ok(vec![Value::Number(merged)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn run(node: &dyn NodeType, inputs: &[Value]) -> Result<Vec<Value>, NodeError> {
        let params = HashMap::new();
        node.compute(&ComputeContext::new(1, &params, inputs))
    }

    #[test]
    fn if_emits_condition_and_negation() {
        assert_eq!(
            run(&IfNode, &[Value::Bool(true)]).unwrap(),
            vec![Value::Bool(true), Value::Bool(false)]
        );
        assert_eq!(
            run(&IfNode, &[Value::Bool(false)]).unwrap(),
            vec![Value::Bool(false), Value::Bool(true)]
        );
        assert!(IfNode.is_conditional());
    }

    #[test]
    fn if_rejects_non_bool_condition() {
        let err = run(&IfNode, &[Value::Number(1.0)]).unwrap_err();
        assert_eq!(err.to_string(), "If node expects Bool condition input");
        assert!(run(&IfNode, &[]).is_err());
    }

    #[test]
    fn merge_prefers_non_zero_then_value() {
        let merge = |a: f64, b: f64| run(&MergeNode, &[Value::Number(a), Value::Number(b)]).unwrap();
        assert_eq!(merge(4.0, 9.0), vec![Value::Number(4.0)]);
        assert_eq!(merge(0.0, 9.0), vec![Value::Number(9.0)]);
        assert_eq!(
            run(&MergeNode, &[Value::from("x"), Value::Number(2.0)]).unwrap(),
            vec![Value::Number(2.0)]
        );
        assert!(run(&MergeNode, &[Value::Number(1.0)]).is_err());
    }
}

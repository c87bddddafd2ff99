//! Recursive evaluation of expression trees against a set of variable bindings.

use super::{EvalError, ExprNode};
use crate::tree::{NodeId, Tree};
use std::collections::HashMap;

/// Variable bindings supplied by the caller: identifier to value.
pub type Bindings = HashMap<String, f64>;

impl Tree<ExprNode> {
    /// Evaluates the subtree under `id`, resolving variables through `bindings`.
    ///
    /// A variable with no binding is an error, never silently substituted. Division by zero
    /// evaluates to NaN.
    pub fn evaluate(&self, id: NodeId, bindings: &Bindings) -> Result<f64, EvalError> {
        match self.data(id) {
            ExprNode::Constant(value) => Ok(*value),
            ExprNode::Variable(identifier) => {
                bindings.get(identifier).copied().ok_or_else(|| EvalError::UnboundVariable {
                    identifier: identifier.clone(),
                })
            }
            ExprNode::Negate => {
                let child = self.require_left(id)?;
                Ok(-self.evaluate(child, bindings)?)
            }
            ExprNode::Function(function) => {
                let child = self.require_left(id)?;
                Ok(function.apply(self.evaluate(child, bindings)?))
            }
            kind => {
                let left = self.require_left(id)?;
                let right = self.require_right(id)?;
                let one = self.evaluate(left, bindings)?;
                let two = self.evaluate(right, bindings)?;
                kind.operate(one, two)
                    .ok_or(EvalError::Unsupported { kind: kind.kind_name() })
            }
        }
    }
}

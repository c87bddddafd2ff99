//! Constant folding: a binary operation over two constants collapses to its result.

use crate::rule::{swap_node, Change, Rule, RuleError};
use steps_ast::{ExprNode, ExprTree, NodeId};

/// Folds a binary node whose children are both constants into a single constant, using the
/// node's own operation. `2 + 3` becomes `5`; equality is excluded, having no operation.
#[derive(Debug, Clone, Default)]
pub struct ConstantsSimplify;

fn constant_operands(tree: &ExprTree, node: NodeId) -> Option<(f64, f64)> {
    if tree.data(node).operate(0.0, 0.0).is_none() {
        return None;
    }
    let left = tree.left(node)?;
    let right = tree.right(node)?;
    match (tree.data(left), tree.data(right)) {
        (ExprNode::Constant(one), ExprNode::Constant(two)) => Some((*one, *two)),
        _ => None,
    }
}

impl Rule for ConstantsSimplify {
    fn name(&self) -> &'static str {
        "Constant Arithmetic"
    }

    fn code(&self) -> &'static str {
        "CA"
    }

    fn can_apply_to(&self, tree: &ExprTree, node: NodeId) -> bool {
        constant_operands(tree, node).is_some()
    }

    fn apply_to(&self, tree: &ExprTree, node: NodeId) -> Result<Change, RuleError> {
        if !self.can_apply_to(tree, node) {
            return Err(RuleError::InapplicableRule { rule: self.name() });
        }
        let (mut tree, node) = tree.clone_from_root(node);

        let Some((one, two)) = constant_operands(&tree, node) else {
            return Err(RuleError::InapplicableRule { rule: self.name() });
        };
        let Some(value) = tree.data(node).operate(one, two) else {
            return Err(RuleError::InapplicableRule { rule: self.name() });
        };
        let replacement = tree.constant(value);
        swap_node(&mut tree, node, replacement);

        let root = tree.get_root(replacement);
        Ok(Change { tree, before: node, after: replacement, root, rule_name: self.name() })
    }
}

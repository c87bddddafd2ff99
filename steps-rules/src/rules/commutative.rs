//! The commutative property: `a + b = b + a`, `a * b = b * a`.

use crate::rule::{Change, Rule, RuleError};
use steps_ast::{ExprNode, ExprTree, NodeId};

/// Swaps the operands of a commutative operator.
///
/// Addition always commutes. Multiplication commutes too, but when `preferred` is false, a
/// multiplication already in preferred term order stays put: `4x` will not commute to `x * 4`
/// and `8y^4` will not commute to `y^4 * 8`. Search loops use that mode to keep canonical terms
/// from oscillating with their mirror images.
#[derive(Debug, Clone)]
pub struct CommutativeSwap {
    /// When false, terms already in preferred order do not commute.
    pub preferred: bool,
}

impl Default for CommutativeSwap {
    fn default() -> Self {
        Self { preferred: true }
    }
}

impl Rule for CommutativeSwap {
    fn name(&self) -> &'static str {
        "Commutative Swap"
    }

    fn code(&self) -> &'static str {
        "CS"
    }

    fn can_apply_to(&self, tree: &ExprTree, node: NodeId) -> bool {
        match tree.data(node) {
            ExprNode::Add => true,
            ExprNode::Multiply => {
                if self.preferred {
                    return true;
                }
                let (Some(left), Some(right)) = (tree.left(node), tree.right(node)) else {
                    return true;
                };
                // `4x` stays put
                if matches!(tree.data(left), ExprNode::Constant(_))
                    && matches!(tree.data(right), ExprNode::Variable(_))
                {
                    return false;
                }
                // `8y^4` stays put
                if matches!(tree.data(right), ExprNode::Power) {
                    let base_is_var = tree
                        .left(right)
                        .is_some_and(|base| matches!(tree.data(base), ExprNode::Variable(_)));
                    let exp_is_const = tree
                        .right(right)
                        .is_some_and(|exp| matches!(tree.data(exp), ExprNode::Constant(_)));
                    if base_is_var && exp_is_const {
                        return false;
                    }
                }
                true
            }
            _ => false,
        }
    }

    fn apply_to(&self, tree: &ExprTree, node: NodeId) -> Result<Change, RuleError> {
        if !self.can_apply_to(tree, node) {
            return Err(RuleError::InapplicableRule { rule: self.name() });
        }
        let (mut tree, node) = tree.clone_from_root(node);

        let left = tree.left(node);
        let right = tree.right(node);
        tree.set_right(node, None);
        tree.set_left(node, right);
        tree.set_right(node, left);

        let root = tree.get_root(node);
        Ok(Change { tree, before: node, after: node, root, rule_name: self.name() })
    }
}

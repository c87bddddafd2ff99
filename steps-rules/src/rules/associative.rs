//! The associative property: `a + (b + c) = (a + b) + c` and the multiplicative analogue.

use crate::rule::{Change, Rule, RuleError};
use steps_ast::{ExprNode, ExprTree, NodeId};

/// Regroups a nested associative operation by rotating the node up into its parent's position.
///
/// Applies to an `Add` directly under an `Add`, or a `Multiply` directly under a `Multiply`.
/// Which way the grouping moves depends on which side the node hangs from: a right child
/// rotates `a + (b + c)` into `(a + b) + c`, a left child rotates back.
#[derive(Debug, Clone, Default)]
pub struct AssociativeSwap;

impl Rule for AssociativeSwap {
    fn name(&self) -> &'static str {
        "Associative Swap"
    }

    fn code(&self) -> &'static str {
        "AS"
    }

    fn can_apply_to(&self, tree: &ExprTree, node: NodeId) -> bool {
        let Some(parent) = tree.parent(node) else {
            return false;
        };
        matches!(
            (tree.data(parent), tree.data(node)),
            (ExprNode::Add, ExprNode::Add) | (ExprNode::Multiply, ExprNode::Multiply)
        )
    }

    fn apply_to(&self, tree: &ExprTree, node: NodeId) -> Result<Change, RuleError> {
        if !self.can_apply_to(tree, node) {
            return Err(RuleError::InapplicableRule { rule: self.name() });
        }
        let (mut tree, node) = tree.clone_from_root(node);

        tree.rotate(node);

        let root = tree.get_root(node);
        Ok(Change { tree, before: node, after: node, root, rule_name: self.name() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use steps_ast::Bindings;
    use steps_parser::parse;

    #[test]
    fn regroups_a_right_nested_sum() {
        let (tree, root) = parse("a + (b + c)").unwrap();
        let inner = tree.right(root).unwrap();
        let rule = AssociativeSwap;
        assert!(rule.can_apply_to(&tree, inner));

        let change = rule.apply_to(&tree, inner).unwrap();
        assert_eq!(change.tree.to_text(change.root).unwrap(), "a + b + c");
        assert_eq!(change.root, change.after);
        assert_eq!(tree.to_text(root).unwrap(), "a + (b + c)");
    }

    #[test]
    fn regroups_a_nested_product_without_changing_value() {
        let (tree, root) = parse("2 * (3 * 4)").unwrap();
        let inner = tree.right(root).unwrap();
        let change = AssociativeSwap.apply_to(&tree, inner).unwrap();

        let bindings = Bindings::new();
        assert_eq!(tree.evaluate(root, &bindings).unwrap(), 24.0);
        assert_eq!(change.tree.evaluate(change.root, &bindings).unwrap(), 24.0);
        assert_eq!(change.tree.to_text(change.root).unwrap(), "2 * 3 * 4");
    }

    #[test]
    fn regroups_a_left_nested_sum_the_other_way() {
        // a + b + c parses left-grouped; rotating the left child regroups it rightward
        let (tree, root) = parse("a + b + c").unwrap();
        let inner = tree.left(root).unwrap();
        let change = AssociativeSwap.apply_to(&tree, inner).unwrap();
        assert_eq!(change.tree.to_text(change.root).unwrap(), "a + (b + c)");

        let bindings: Bindings = [("a", 1.0), ("b", 10.0), ("c", 100.0)]
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        assert_eq!(tree.evaluate(root, &bindings).unwrap(), 111.0);
        assert_eq!(change.tree.evaluate(change.root, &bindings).unwrap(), 111.0);
    }

    #[test]
    fn needs_matching_parent_and_child_kinds() {
        let (tree, root) = parse("a + (b * c)").unwrap();
        let inner = tree.right(root).unwrap();
        assert!(!AssociativeSwap.can_apply_to(&tree, inner));

        // the root has no parent to regroup under
        assert!(!AssociativeSwap.can_apply_to(&tree, root));
    }
}

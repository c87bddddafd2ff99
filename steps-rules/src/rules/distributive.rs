//! The distributive property, in both directions: factoring a common term out of a sum, and
//! expanding a factor across a sum.

use crate::rule::{swap_node, Change, Rule, RuleError};
use steps_ast::term::{factor_like_terms, get_term_parts, make_term, TermParts};
use steps_ast::{ExprNode, ExprTree, NodeId};

/// Factors the best common term out of a sum of two like terms.
///
/// `4x + 3x` becomes `x * (4 + 3)`: with a shared variable, the *smallest* common coefficient
/// factor is pulled so the variable comes out whole. `4 + 6` becomes `2 * (2 + 3)`: with
/// constants only, the *largest* common factor is pulled, and a sum whose coefficients share no
/// factor above 1 is left alone.
#[derive(Debug, Clone, Default)]
pub struct DistributiveFactorOut;

/// Reads both operands of a sum as naturally ordered like terms, or [`None`] when they are not
/// a factorable pair.
fn like_parts(tree: &ExprTree, node: NodeId) -> Option<(TermParts, TermParts)> {
    if !matches!(tree.data(node), ExprNode::Add) {
        return None;
    }
    let left = get_term_parts(tree, tree.left(node)?)?;
    let right = get_term_parts(tree, tree.right(node)?)?;

    // like terms: identical variable and identical exponent
    if left.variable != right.variable || left.exponent != right.exponent {
        return None;
    }
    if left.variable.is_none() {
        // constant-only sums need an actual factor to pull out
        let factors = factor_like_terms(&left, &right)?;
        if factors.best <= 1.0 {
            return None;
        }
    }
    Some((left, right))
}

impl Rule for DistributiveFactorOut {
    fn name(&self) -> &'static str {
        "Distributive Factoring"
    }

    fn code(&self) -> &'static str {
        "DF"
    }

    fn can_apply_to(&self, tree: &ExprTree, node: NodeId) -> bool {
        like_parts(tree, node).is_some()
    }

    fn apply_to(&self, tree: &ExprTree, node: NodeId) -> Result<Change, RuleError> {
        if !self.can_apply_to(tree, node) {
            return Err(RuleError::InapplicableRule { rule: self.name() });
        }
        let (mut tree, node) = tree.clone_from_root(node);

        let Some((left, right)) = like_parts(&tree, node) else {
            return Err(RuleError::InapplicableRule { rule: self.name() });
        };
        let Some(factors) = factor_like_terms(&left, &right) else {
            return Err(RuleError::InapplicableRule { rule: self.name() });
        };

        let common = make_term(&mut tree, factors.best, factors.variable.as_deref(), factors.exponent);
        let left_rest = make_term(
            &mut tree,
            factors.left,
            factors.left_variable.as_deref(),
            factors.left_exponent,
        );
        let right_rest = make_term(
            &mut tree,
            factors.right,
            factors.right_variable.as_deref(),
            factors.right_exponent,
        );
        let sum = tree.binary(ExprNode::Add, left_rest, right_rest);
        let replacement = tree.binary(ExprNode::Multiply, common, sum);
        swap_node(&mut tree, node, replacement);

        let root = tree.get_root(replacement);
        Ok(Change { tree, before: node, after: replacement, root, rule_name: self.name() })
    }
}

/// Expands a factor across a sum: `a * (b + c) = a*b + a*c`.
///
/// Both operand orders are handled; `(b + c) * a` expands to `b*a + c*a`.
#[derive(Debug, Clone, Default)]
pub struct DistributiveMultiply;

impl Rule for DistributiveMultiply {
    fn name(&self) -> &'static str {
        "Distributive Multiply"
    }

    fn code(&self) -> &'static str {
        "DM"
    }

    fn can_apply_to(&self, tree: &ExprTree, node: NodeId) -> bool {
        if !matches!(tree.data(node), ExprNode::Multiply) {
            return false;
        }
        let left_sum = tree.left(node).is_some_and(|l| matches!(tree.data(l), ExprNode::Add));
        let right_sum = tree.right(node).is_some_and(|r| matches!(tree.data(r), ExprNode::Add));
        left_sum || right_sum
    }

    fn apply_to(&self, tree: &ExprTree, node: NodeId) -> Result<Change, RuleError> {
        if !self.can_apply_to(tree, node) {
            return Err(RuleError::InapplicableRule { rule: self.name() });
        }
        let (mut tree, node) = tree.clone_from_root(node);

        let (Some(left), Some(right)) = (tree.left(node), tree.right(node)) else {
            return Err(RuleError::InapplicableRule { rule: self.name() });
        };
        let (factor, sum, sum_on_right) = if matches!(tree.data(right), ExprNode::Add) {
            (left, right, true)
        } else {
            (right, left, false)
        };
        let (Some(a), Some(b)) = (tree.left(sum), tree.right(sum)) else {
            return Err(RuleError::InapplicableRule { rule: self.name() });
        };

        // The factor appears twice in the result; the second use is a fresh copy.
        let factor_copy = tree.copy_subtree(factor);
        let (first, second) = if sum_on_right {
            (
                tree.binary(ExprNode::Multiply, factor, a),
                tree.binary(ExprNode::Multiply, factor_copy, b),
            )
        } else {
            (
                tree.binary(ExprNode::Multiply, a, factor),
                tree.binary(ExprNode::Multiply, b, factor_copy),
            )
        };
        let replacement = tree.binary(ExprNode::Add, first, second);
        swap_node(&mut tree, node, replacement);

        let root = tree.get_root(replacement);
        Ok(Change { tree, before: node, after: replacement, root, rule_name: self.name() })
    }
}

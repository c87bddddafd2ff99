//! Structural symbolic differentiation.
//!
//! The supported cases are the sum, difference, product, and quotient rules plus the leaf base
//! cases `d(x)/dx = 1` and `d(c)/dx = 0`, with negation passing through. Differentiating a power
//! or a function application returns [`DeriveError::Unsupported`]; no chain-rule behavior is
//! defined for them.

use super::{DeriveError, ExprNode, ExprTree};
use crate::tree::{NodeId, Tree};

impl Tree<ExprNode> {
    /// Differentiates the subtree under `id` with respect to `variable`, producing a fresh tree.
    ///
    /// The output shares no nodes with the input: wherever a rule reuses one of the original
    /// operands (product and quotient rules), the operand subtree is copied into the output.
    pub fn differentiate(
        &self,
        id: NodeId,
        variable: &str,
    ) -> Result<(ExprTree, NodeId), DeriveError> {
        let mut out = ExprTree::new();
        let root = self.derive_node(id, variable, &mut out)?;
        Ok((out, root))
    }

    fn derive_node(
        &self,
        id: NodeId,
        variable: &str,
        out: &mut ExprTree,
    ) -> Result<NodeId, DeriveError> {
        match self.data(id) {
            ExprNode::Constant(_) => Ok(out.constant(0.0)),
            ExprNode::Variable(identifier) => {
                Ok(out.constant(if identifier == variable { 1.0 } else { 0.0 }))
            }
            // d(-g) = -(dg)
            ExprNode::Negate => {
                let child = self.require_left(id)?;
                let inner = self.derive_node(child, variable, out)?;
                Ok(out.negate(inner))
            }
            // d(g + h) = dg + dh
            ExprNode::Add => {
                let (left, right) = self.derive_operands(id, variable, out)?;
                Ok(out.binary(ExprNode::Add, left, right))
            }
            // d(g - h) = dg - dh
            ExprNode::Subtract => {
                let (left, right) = self.derive_operands(id, variable, out)?;
                Ok(out.binary(ExprNode::Subtract, left, right))
            }
            // d(g * h) = g * dh + dg * h
            ExprNode::Multiply => {
                let g = self.require_left(id)?;
                let h = self.require_right(id)?;
                let dg = self.derive_node(g, variable, out)?;
                let dh = self.derive_node(h, variable, out)?;
                let g = self.clone_into(g, out);
                let h = self.clone_into(h, out);
                let g_dh = out.binary(ExprNode::Multiply, g, dh);
                let dg_h = out.binary(ExprNode::Multiply, dg, h);
                Ok(out.binary(ExprNode::Add, g_dh, dg_h))
            }
            // d(g / h) = (dg * h - g * dh) / h^2
            ExprNode::Divide => {
                let g = self.require_left(id)?;
                let h = self.require_right(id)?;
                let dg = self.derive_node(g, variable, out)?;
                let dh = self.derive_node(h, variable, out)?;
                let g = self.clone_into(g, out);
                let h1 = self.clone_into(h, out);
                let h2 = self.clone_into(h, out);
                let dg_h = out.binary(ExprNode::Multiply, dg, h1);
                let g_dh = out.binary(ExprNode::Multiply, g, dh);
                let numerator = out.binary(ExprNode::Subtract, dg_h, g_dh);
                let two = out.constant(2.0);
                let denominator = out.binary(ExprNode::Power, h2, two);
                Ok(out.binary(ExprNode::Divide, numerator, denominator))
            }
            ExprNode::Power => Err(DeriveError::Unsupported { kind: "Power" }),
            ExprNode::Function(function) => {
                Err(DeriveError::Unsupported { kind: function.name() })
            }
            ExprNode::Equal => Err(DeriveError::Unsupported { kind: "Equal" }),
        }
    }

    fn derive_operands(
        &self,
        id: NodeId,
        variable: &str,
        out: &mut ExprTree,
    ) -> Result<(NodeId, NodeId), DeriveError> {
        let left = self.require_left(id)?;
        let right = self.require_right(id)?;
        let left = self.derive_node(left, variable, out)?;
        let right = self.derive_node(right, variable, out)?;
        Ok((left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::super::{eval::Bindings, DeriveError, ExprNode, ExprTree, FunctionKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn leaf_base_cases() {
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let (out, root) = tree.differentiate(x, "x").unwrap();
        assert_eq!(out.to_text(root).unwrap(), "1");

        let (out, root) = tree.differentiate(x, "y").unwrap();
        assert_eq!(out.to_text(root).unwrap(), "0");

        let mut tree = ExprTree::new();
        let seven = tree.constant(7.0);
        let (out, root) = tree.differentiate(seven, "x").unwrap();
        assert_eq!(out.to_text(root).unwrap(), "0");
    }

    #[test]
    fn sum_and_difference_rules() {
        // d(x + 3)/dx = 1 + 0
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let three = tree.constant(3.0);
        let sum = tree.binary(ExprNode::Add, x, three);
        let (out, root) = tree.differentiate(sum, "x").unwrap();
        assert_eq!(out.to_text(root).unwrap(), "1 + 0");

        // d(x - y)/dx = 1 - 0
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let y = tree.variable("y");
        let diff = tree.binary(ExprNode::Subtract, x, y);
        let (out, root) = tree.differentiate(diff, "x").unwrap();
        assert_eq!(out.to_text(root).unwrap(), "1 - 0");
    }

    #[test]
    fn product_rule() {
        // d(4x)/dx = 4 * 1 + 0 * x, which evaluates to 4 everywhere
        let mut tree = ExprTree::new();
        let four = tree.constant(4.0);
        let x = tree.variable("x");
        let product = tree.binary(ExprNode::Multiply, four, x);
        let (out, root) = tree.differentiate(product, "x").unwrap();

        let mut bindings = Bindings::new();
        bindings.insert("x".to_string(), 17.0);
        assert_eq!(out.evaluate(root, &bindings).unwrap(), 4.0);
    }

    #[test]
    fn quotient_rule() {
        // d(x / 2)/dx = (1*2 - x*0) / 2^2 = 1/2 everywhere
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let two = tree.constant(2.0);
        let quotient = tree.binary(ExprNode::Divide, x, two);
        let (out, root) = tree.differentiate(quotient, "x").unwrap();

        let mut bindings = Bindings::new();
        bindings.insert("x".to_string(), 9.0);
        assert_eq!(out.evaluate(root, &bindings).unwrap(), 0.5);
    }

    #[test]
    fn negation_passes_through() {
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let neg = tree.negate(x);
        let (out, root) = tree.differentiate(neg, "x").unwrap();
        assert_eq!(out.to_text(root).unwrap(), "-1");
    }

    #[test]
    fn derivative_output_is_independent_of_the_input() {
        let mut tree = ExprTree::new();
        let four = tree.constant(4.0);
        let x = tree.variable("x");
        let product = tree.binary(ExprNode::Multiply, four, x);
        let (mut out, root) = tree.differentiate(product, "x").unwrap();

        // Mutating the derivative tree leaves the source expression untouched.
        let zero = out.constant(0.0);
        out.set_left(root, Some(zero));
        assert_eq!(tree.to_text(product).unwrap(), "4x");
    }

    #[test]
    fn power_and_functions_are_unsupported() {
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let two = tree.constant(2.0);
        let pow = tree.binary(ExprNode::Power, x, two);
        assert_eq!(
            tree.differentiate(pow, "x").map(|_| ()),
            Err(DeriveError::Unsupported { kind: "Power" })
        );

        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let abs = tree.function(FunctionKind::Abs, x);
        assert_eq!(
            tree.differentiate(abs, "x").map(|_| ()),
            Err(DeriveError::Unsupported { kind: "abs" })
        );
    }
}

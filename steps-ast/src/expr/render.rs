//! Rendering of expression trees back to text and to MathML-style markup.
//!
//! Both renderers share one set of parenthesization decisions:
//!
//! - a left child is wrapped when it is a binary node of lower rank than its parent;
//! - a right child is wrapped when its rank is lower *or equal*, which keeps left-associative
//!   rendering faithful (`1 - (2 - 3)` survives a round trip, `1 - 2 - 3` would not);
//! - exponentiation flips the two comparisons, since it associates to the right;
//! - a node rendered as the root of a call wraps *itself* when it hangs below a higher-ranked
//!   parent, so sub-results extracted from a larger tree keep their grouping.
//!
//! Multiplication has a compact form: a constant directly multiplying a variable or a power
//! renders as concatenation (`4x`, `4x^2`) with no operator.
//!
//! The subtree changed by a rewrite can be highlighted: the highlight is an explicit argument
//! threaded through the walk, and marks operator and leaf fragments with an ANSI color.

use super::{ExprNode, StructuralError};
use crate::tree::{NodeId, Tree};
use ariadne::Fmt;
use steps_error::CHANGED;

/// Formats a numeric payload, printing whole numbers without a fractional part.
pub(crate) fn fmt_number(value: f64) -> String {
    if value.is_finite() && value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn ml_tag(tag: &str, content: &str) -> String {
    format!("<{tag}>{content}</{tag}>")
}

fn ml_parens(content: &str) -> String {
    format!("<mo>(</mo>{content}<mo>)</mo>")
}

fn paint(text: &str, active: bool) -> String {
    if active {
        format!("{}", text.fg(CHANGED))
    } else {
        text.to_owned()
    }
}

impl Tree<ExprNode> {
    fn priority_of(&self, id: NodeId) -> Option<super::Priority> {
        self.data(id).priority()
    }

    /// True when `id`, rendered as the root of a call, must wrap itself in parentheses because
    /// it hangs below a higher-ranked binary parent.
    fn self_parens(&self, id: NodeId) -> bool {
        if !self.data(id).is_binary() {
            return false;
        }
        match self.parent(id) {
            Some(parent) => {
                self.data(parent).is_binary() && self.priority_of(parent) > self.priority_of(id)
            }
            None => false,
        }
    }

    fn left_needs_parens(&self, id: NodeId) -> bool {
        let Some(left) = self.left(id) else {
            return false;
        };
        if !self.data(left).is_binary() {
            return false;
        }
        let (child, this) = (self.priority_of(left), self.priority_of(id));
        if matches!(self.data(id), ExprNode::Power) {
            child <= this
        } else {
            child < this
        }
    }

    fn right_needs_parens(&self, id: NodeId) -> bool {
        let Some(right) = self.right(id) else {
            return false;
        };
        if !self.data(right).is_binary() {
            return false;
        }
        let (child, this) = (self.priority_of(right), self.priority_of(id));
        if matches!(self.data(id), ExprNode::Power) {
            child < this
        } else {
            child <= this
        }
    }

    /// True when `id` wraps a binary child that binds looser than unary minus.
    fn unary_child_needs_parens(&self, child: NodeId) -> bool {
        self.data(child).is_binary() && self.priority_of(child) < Some(super::Priority::MulDiv)
    }

    /// `Constant * Variable` and `Constant * Power` render as concatenation (`4x`, `4x^2`).
    /// The power's base must itself be a variable: gluing a constant base on (`4 * 2^3`) would
    /// read back as one number.
    fn compact_multiply(&self, id: NodeId) -> bool {
        if !matches!(self.data(id), ExprNode::Multiply) {
            return false;
        }
        let (Some(left), Some(right)) = (self.left(id), self.right(id)) else {
            return false;
        };
        if !matches!(self.data(left), ExprNode::Constant(_)) {
            return false;
        }
        match self.data(right) {
            ExprNode::Variable(_) => true,
            ExprNode::Power => self
                .left(right)
                .is_some_and(|base| matches!(self.data(base), ExprNode::Variable(_))),
            _ => false,
        }
    }

    /// Renders the subtree under `id` as text.
    pub fn to_text(&self, id: NodeId) -> Result<String, StructuralError> {
        let body = self.text_at(id, None, false)?;
        Ok(if self.self_parens(id) { format!("({body})") } else { body })
    }

    /// Renders the subtree under `id` as text, coloring the fragments inside the `changed`
    /// subtree.
    pub fn to_text_colored(&self, id: NodeId, changed: NodeId) -> Result<String, StructuralError> {
        let body = self.text_at(id, Some(changed), false)?;
        Ok(if self.self_parens(id) { format!("({body})") } else { body })
    }

    fn text_at(
        &self,
        id: NodeId,
        changed: Option<NodeId>,
        active: bool,
    ) -> Result<String, StructuralError> {
        let active = active || changed == Some(id);
        match self.data(id) {
            ExprNode::Constant(value) => Ok(paint(&fmt_number(*value), active)),
            ExprNode::Variable(identifier) => Ok(paint(identifier, active)),
            ExprNode::Negate => {
                let child = self.require_left(id)?;
                let inner = self.text_at(child, changed, active)?;
                let inner = if self.unary_child_needs_parens(child) {
                    format!("({inner})")
                } else {
                    inner
                };
                Ok(format!("{}{inner}", paint("-", active)))
            }
            ExprNode::Function(function) => {
                let child = self.require_left(id)?;
                let inner = self.text_at(child, changed, active)?;
                Ok(format!("{}({inner})", paint(function.name(), active)))
            }
            kind => {
                let left = self.require_left(id)?;
                let right = self.require_right(id)?;
                let left_text = self.text_at(left, changed, active)?;
                let right_text = self.text_at(right, changed, active)?;

                if self.compact_multiply(id) {
                    return Ok(format!("{left_text}{right_text}"));
                }

                let left_text = if self.left_needs_parens(id) {
                    format!("({left_text})")
                } else {
                    left_text
                };
                let right_text = if self.right_needs_parens(id) {
                    format!("({right_text})")
                } else {
                    right_text
                };

                // `operator` is always present here: only binary kinds reach this arm.
                let op = kind.operator().unwrap_or("");
                Ok(match kind {
                    ExprNode::Power => format!("{left_text}{}{right_text}", paint(op, active)),
                    _ => format!("{left_text} {} {right_text}", paint(op, active)),
                })
            }
        }
    }

    /// Renders the subtree under `id` as MathML-style markup, mirroring the text renderer's
    /// parenthesization decisions.
    pub fn to_markup(&self, id: NodeId) -> Result<String, StructuralError> {
        let body = self.markup_at(id)?;
        Ok(if self.self_parens(id) {
            ml_tag("mrow", &ml_parens(&body))
        } else {
            body
        })
    }

    /// Renders the subtree under `id` as a standalone MathML document.
    pub fn to_markup_document(&self, id: NodeId) -> Result<String, StructuralError> {
        Ok([
            "<math xmlns='http://www.w3.org/1998/Math/MathML'>".to_owned(),
            self.to_markup(id)?,
            "</math>".to_owned(),
        ]
        .join("\n"))
    }

    fn markup_at(&self, id: NodeId) -> Result<String, StructuralError> {
        match self.data(id) {
            ExprNode::Constant(value) => Ok(ml_tag("mn", &fmt_number(*value))),
            ExprNode::Variable(identifier) => Ok(ml_tag("mi", identifier)),
            ExprNode::Negate => {
                let child = self.require_left(id)?;
                let inner = self.markup_at(child)?;
                let inner = if self.unary_child_needs_parens(child) {
                    ml_parens(&inner)
                } else {
                    inner
                };
                Ok(ml_tag("mrow", &format!("{}{inner}", ml_tag("mo", "-"))))
            }
            ExprNode::Function(function) => {
                let child = self.require_left(id)?;
                let inner = self.markup_at(child)?;
                Ok(ml_tag(
                    "mrow",
                    &format!("{}{}", ml_tag("mi", function.name()), ml_parens(&inner)),
                ))
            }
            ExprNode::Power => {
                let left = self.require_left(id)?;
                let right = self.require_right(id)?;
                let base = self.markup_at(left)?;
                let base = if self.left_needs_parens(id) {
                    ml_tag("mrow", &ml_parens(&base))
                } else {
                    base
                };
                // The superscript position already groups the exponent.
                let exponent = self.markup_at(right)?;
                let exponent = if self.data(right).is_binary() {
                    ml_tag("mrow", &exponent)
                } else {
                    exponent
                };
                Ok(ml_tag("msup", &format!("{base}{exponent}")))
            }
            kind => {
                let left = self.require_left(id)?;
                let right = self.require_right(id)?;
                let left_ml = self.markup_at(left)?;
                let right_ml = self.markup_at(right)?;

                if self.compact_multiply(id) {
                    return Ok(format!("{left_ml}{right_ml}"));
                }

                let left_ml = if self.left_needs_parens(id) {
                    ml_parens(&left_ml)
                } else {
                    left_ml
                };
                let right_ml = if self.right_needs_parens(id) {
                    ml_parens(&right_ml)
                } else {
                    right_ml
                };

                let op = match kind {
                    ExprNode::Multiply => "&#183;",
                    ExprNode::Divide => "&#247;",
                    // only binary kinds reach this arm
                    _ => kind.operator().unwrap_or(""),
                };
                Ok(ml_tag(
                    "mrow",
                    &format!("{left_ml}{}{right_ml}", ml_tag("mo", op)),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ExprNode, ExprTree, FunctionKind, StructuralError};
    use crate::tree::Side;
    use pretty_assertions::assert_eq;

    #[test]
    fn compact_multiply_forms() {
        let mut tree = ExprTree::new();
        let four = tree.constant(4.0);
        let x = tree.variable("x");
        let mul = tree.binary(ExprNode::Multiply, four, x);
        assert_eq!(tree.to_text(mul).unwrap(), "4x");

        let mut tree = ExprTree::new();
        let four = tree.constant(4.0);
        let x = tree.variable("x");
        let two = tree.constant(2.0);
        let pow = tree.binary(ExprNode::Power, x, two);
        let mul = tree.binary(ExprNode::Multiply, four, pow);
        assert_eq!(tree.to_text(mul).unwrap(), "4x^2");
    }

    #[test]
    fn ordinary_multiply_keeps_the_operator() {
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let four = tree.constant(4.0);
        let mul = tree.binary(ExprNode::Multiply, x, four);
        assert_eq!(tree.to_text(mul).unwrap(), "x * 4");

        // a constant-based power never glues onto its coefficient
        let mut tree = ExprTree::new();
        let four = tree.constant(4.0);
        let two = tree.constant(2.0);
        let three = tree.constant(3.0);
        let pow = tree.binary(ExprNode::Power, two, three);
        let mul = tree.binary(ExprNode::Multiply, four, pow);
        assert_eq!(tree.to_text(mul).unwrap(), "4 * 2^3");
    }

    #[test]
    fn lower_ranked_children_are_parenthesized() {
        let mut tree = ExprTree::new();
        let one = tree.constant(1.0);
        let two = tree.constant(2.0);
        let add = tree.binary(ExprNode::Add, one, two);
        let three = tree.constant(3.0);
        let mul = tree.binary(ExprNode::Multiply, add, three);
        assert_eq!(tree.to_text(mul).unwrap(), "(1 + 2) * 3");

        // Rendering the grouped child on its own keeps its parentheses.
        assert_eq!(tree.to_text(add).unwrap(), "(1 + 2)");
    }

    #[test]
    fn right_association_needs_parens_on_the_right() {
        let mut tree = ExprTree::new();
        let one = tree.constant(1.0);
        let two = tree.constant(2.0);
        let three = tree.constant(3.0);
        let inner = tree.binary(ExprNode::Subtract, two, three);
        let outer = tree.binary(ExprNode::Subtract, one, inner);
        assert_eq!(tree.to_text(outer).unwrap(), "1 - (2 - 3)");

        let mut tree = ExprTree::new();
        let one = tree.constant(1.0);
        let two = tree.constant(2.0);
        let three = tree.constant(3.0);
        let inner = tree.binary(ExprNode::Subtract, one, two);
        let outer = tree.binary(ExprNode::Subtract, inner, three);
        assert_eq!(tree.to_text(outer).unwrap(), "1 - 2 - 3");
    }

    #[test]
    fn power_renders_without_spaces_and_groups_its_base() {
        let mut tree = ExprTree::new();
        let one = tree.constant(1.0);
        let two = tree.constant(2.0);
        let add = tree.binary(ExprNode::Add, one, two);
        let three = tree.constant(3.0);
        let pow = tree.binary(ExprNode::Power, add, three);
        assert_eq!(tree.to_text(pow).unwrap(), "(1 + 2)^3");

        // A power base keeps its grouping even at equal rank; a power exponent does not need
        // one, since parsing associates to the right.
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let three = tree.constant(3.0);
        let inner = tree.binary(ExprNode::Power, x, three);
        let two = tree.constant(2.0);
        let outer = tree.binary(ExprNode::Power, inner, two);
        assert_eq!(tree.to_text(outer).unwrap(), "(x^3)^2");
    }

    #[test]
    fn negation_groups_loose_children() {
        let mut tree = ExprTree::new();
        let one = tree.constant(1.0);
        let two = tree.constant(2.0);
        let add = tree.binary(ExprNode::Add, one, two);
        let neg = tree.negate(add);
        assert_eq!(tree.to_text(neg).unwrap(), "-(1 + 2)");

        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let two = tree.constant(2.0);
        let pow = tree.binary(ExprNode::Power, x, two);
        let neg = tree.negate(pow);
        assert_eq!(tree.to_text(neg).unwrap(), "-x^2");
    }

    #[test]
    fn equality_renders_unparenthesized() {
        let mut tree = ExprTree::new();
        let four = tree.constant(4.0);
        let x = tree.variable("x");
        let lhs = tree.binary(ExprNode::Multiply, four, x);
        let eight = tree.constant(8.0);
        let eq = tree.binary(ExprNode::Equal, lhs, eight);
        assert_eq!(tree.to_text(eq).unwrap(), "4x = 8");
    }

    #[test]
    fn function_application() {
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let abs = tree.function(FunctionKind::Abs, x);
        assert_eq!(tree.to_text(abs).unwrap(), "abs(x)");
    }

    #[test]
    fn missing_child_is_a_structural_error() {
        let mut tree = ExprTree::new();
        let one = tree.constant(1.0);
        let add = tree.add_node(ExprNode::Add);
        tree.set_left(add, Some(one));
        assert_eq!(
            tree.to_text(add),
            Err(StructuralError::MissingChild { kind: "Add", side: Side::Right })
        );
    }

    #[test]
    fn markup_mirrors_text_decisions() {
        let mut tree = ExprTree::new();
        let four = tree.constant(4.0);
        let x = tree.variable("x");
        let mul = tree.binary(ExprNode::Multiply, four, x);
        assert_eq!(tree.to_markup(mul).unwrap(), "<mn>4</mn><mi>x</mi>");

        let mut tree = ExprTree::new();
        let one = tree.constant(1.0);
        let x = tree.variable("x");
        let add = tree.binary(ExprNode::Add, one, x);
        assert_eq!(
            tree.to_markup(add).unwrap(),
            "<mrow><mn>1</mn><mo>+</mo><mi>x</mi></mrow>"
        );

        let mut tree = ExprTree::new();
        let one = tree.constant(1.0);
        let two = tree.constant(2.0);
        let add = tree.binary(ExprNode::Add, one, two);
        let three = tree.constant(3.0);
        let mul = tree.binary(ExprNode::Multiply, add, three);
        assert_eq!(
            tree.to_markup(mul).unwrap(),
            "<mrow><mo>(</mo><mrow><mn>1</mn><mo>+</mo><mn>2</mn></mrow><mo>)</mo>\
             <mo>&#183;</mo><mn>3</mn></mrow>"
        );
    }

    #[test]
    fn markup_power_uses_msup() {
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let two = tree.constant(2.0);
        let pow = tree.binary(ExprNode::Power, x, two);
        assert_eq!(tree.to_markup(pow).unwrap(), "<msup><mi>x</mi><mn>2</mn></msup>");
    }

    #[test]
    fn markup_document_wraps_the_root() {
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let doc = tree.to_markup_document(x).unwrap();
        assert!(doc.starts_with("<math"));
        assert!(doc.contains("<mi>x</mi>"));
        assert!(doc.ends_with("</math>"));
    }

    #[test]
    fn colored_rendering_keeps_every_fragment() {
        let mut tree = ExprTree::new();
        let one = tree.constant(1.0);
        let two = tree.constant(2.0);
        let add = tree.binary(ExprNode::Add, one, two);
        let colored = tree.to_text_colored(add, two).unwrap();
        assert!(colored.contains('1'));
        assert!(colored.contains('+'));
        assert!(colored.contains('2'));
    }
}

//! The expression node kinds layered on the generic [`Tree`].
//!
//! An [`ExprTree`] stores one [`ExprNode`] per tree node. The kind set is closed: rendering,
//! evaluation, and differentiation all match exhaustively over it, so adding a kind is a
//! compile-time visible change at every site that must handle it.
//!
//! Binary kinds require both children to be present before any rendering, evaluation, or
//! differentiation call; a missing child surfaces a [`StructuralError`] naming the node kind and
//! the empty side rather than panicking.

pub mod derivative;
pub mod eval;
pub mod render;
pub mod types;

use crate::tree::{NodeId, Side, Tree, TreeData};
use std::fmt;

/// An expression tree: the generic arena tree with expression payloads.
pub type ExprTree = Tree<ExprNode>;

/// The unary functions the engine knows how to parse, render, and evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FunctionKind {
    Abs,
    Sgn,
}

impl FunctionKind {
    /// The name used for this function in source text.
    pub fn name(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Sgn => "sgn",
        }
    }

    /// Looks up a function by its source-text name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "abs" => Some(Self::Abs),
            "sgn" => Some(Self::Sgn),
            _ => None,
        }
    }

    /// Applies the function to a value.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Abs => value.abs(),
            Self::Sgn => {
                if value < 0.0 {
                    -1.0
                } else if value > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// The payload of one expression node.
///
/// Leaves are [`Constant`](Self::Constant) and [`Variable`](Self::Variable); unary kinds keep
/// their operand in the left child slot; binary kinds use both slots.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprNode {
    Constant(f64),
    Variable(String),
    Negate,
    Function(FunctionKind),
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Equal,
}

/// The order-of-operations rank shared by the renderer and the parser.
///
/// Only the first three ranks belong to binary operators; [`Parens`](Self::Parens) and
/// [`Function`](Self::Function) exist so grouped and applied forms outrank everything during
/// comparisons. `Equal` carries no rank at all (it never needs inner parentheses), which is why
/// rank comparisons happen on `Option<Priority>`: `None` sorts below every rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    AddSub,
    MulDiv,
    Exponent,
    Parens,
    Function,
}

impl ExprNode {
    /// A short, stable name for this node's kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Constant(_) => "Constant",
            Self::Variable(_) => "Variable",
            Self::Negate => "Negate",
            Self::Function(_) => "Function",
            Self::Add => "Add",
            Self::Subtract => "Subtract",
            Self::Multiply => "Multiply",
            Self::Divide => "Divide",
            Self::Power => "Power",
            Self::Equal => "Equal",
        }
    }

    /// Returns true for kinds that take two operands.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Power | Self::Equal
        )
    }

    /// Returns true for the unary kinds, which keep their operand in the left child slot.
    pub fn is_unary(&self) -> bool {
        matches!(self, Self::Negate | Self::Function(_))
    }

    /// The operator-priority rank of this kind, or [`None`] for leaves, unary kinds, and
    /// `Equal`.
    pub fn priority(&self) -> Option<Priority> {
        match self {
            Self::Add | Self::Subtract => Some(Priority::AddSub),
            Self::Multiply | Self::Divide => Some(Priority::MulDiv),
            Self::Power => Some(Priority::Exponent),
            _ => None,
        }
    }

    /// The operator symbol of a binary kind.
    pub fn operator(&self) -> Option<&'static str> {
        match self {
            Self::Add => Some("+"),
            Self::Subtract => Some("-"),
            Self::Multiply => Some("*"),
            Self::Divide => Some("/"),
            Self::Power => Some("^"),
            Self::Equal => Some("="),
            _ => None,
        }
    }

    /// Applies the binary operation this kind stands for. Division by zero yields NaN rather
    /// than failing; `Equal` and non-binary kinds have no operation and return [`None`].
    pub fn operate(&self, one: f64, two: f64) -> Option<f64> {
        match self {
            Self::Add => Some(one + two),
            Self::Subtract => Some(one - two),
            Self::Multiply => Some(one * two),
            Self::Divide => Some(if two == 0.0 { f64::NAN } else { one / two }),
            Self::Power => Some(one.powf(two)),
            _ => None,
        }
    }
}

impl TreeData for ExprNode {
    fn kind_name(&self) -> &'static str {
        self.kind_name()
    }
}

/// A structural violation: an operator node was asked to do something that needs a child it does
/// not have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    MissingChild {
        kind: &'static str,
        side: Side,
    },
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingChild { kind, side } => {
                let side = match side {
                    Side::Left => "left",
                    Side::Right => "right",
                };
                write!(f, "{kind} node is missing its {side} child")
            }
        }
    }
}

impl std::error::Error for StructuralError {}

/// An evaluation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A variable had no value in the caller's bindings.
    UnboundVariable { identifier: String },

    /// The node kind has no operation to perform (equality).
    Unsupported { kind: &'static str },

    Structural(StructuralError),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundVariable { identifier } => {
                write!(f, "cannot evaluate with unbound variable: {identifier}")
            }
            Self::Unsupported { kind } => {
                write!(f, "{kind} node has no operation to perform")
            }
            Self::Structural(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<StructuralError> for EvalError {
    fn from(err: StructuralError) -> Self {
        Self::Structural(err)
    }
}

/// A differentiation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum DeriveError {
    /// Differentiation is not defined for this node kind.
    Unsupported { kind: &'static str },

    Structural(StructuralError),
}

impl fmt::Display for DeriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported { kind } => {
                write!(f, "differentiation is not implemented for {kind} nodes")
            }
            Self::Structural(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for DeriveError {}

impl From<StructuralError> for DeriveError {
    fn from(err: StructuralError) -> Self {
        Self::Structural(err)
    }
}

impl Tree<ExprNode> {
    /// Allocates an unlinked constant leaf.
    pub fn constant(&mut self, value: f64) -> NodeId {
        self.add_node(ExprNode::Constant(value))
    }

    /// Allocates an unlinked variable leaf.
    pub fn variable(&mut self, identifier: impl Into<String>) -> NodeId {
        self.add_node(ExprNode::Variable(identifier.into()))
    }

    /// Allocates a negation wrapping `child`.
    pub fn negate(&mut self, child: NodeId) -> NodeId {
        let id = self.add_node(ExprNode::Negate);
        self.set_left(id, Some(child));
        id
    }

    /// Allocates a function application wrapping `child`.
    pub fn function(&mut self, kind: FunctionKind, child: NodeId) -> NodeId {
        let id = self.add_node(ExprNode::Function(kind));
        self.set_left(id, Some(child));
        id
    }

    /// Allocates a binary node and links both children.
    pub fn binary(&mut self, op: ExprNode, left: NodeId, right: NodeId) -> NodeId {
        debug_assert!(op.is_binary(), "binary() takes a binary kind, got {}", op.kind_name());
        let id = self.add_node(op);
        self.set_left(id, Some(left));
        self.set_right(id, Some(right));
        id
    }

    /// The operand of a unary node; unary kinds keep it in the left slot.
    pub fn unary_child(&self, id: NodeId) -> Option<NodeId> {
        self.left(id)
    }

    pub(crate) fn require_left(&self, id: NodeId) -> Result<NodeId, StructuralError> {
        self.left(id).ok_or(StructuralError::MissingChild {
            kind: self.data(id).kind_name(),
            side: Side::Left,
        })
    }

    pub(crate) fn require_right(&self, id: NodeId) -> Result<NodeId, StructuralError> {
        self.right(id).ok_or(StructuralError::MissingChild {
            kind: self.data(id).kind_name(),
            side: Side::Right,
        })
    }
}

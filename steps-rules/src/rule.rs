//! The rewrite-rule protocol.
//!
//! A rule is a pair of capabilities: [`Rule::can_apply_to`] is a pure predicate, and
//! [`Rule::apply_to`] performs the rewrite. Applying never touches the caller's tree: the rule
//! clones the owning root, relocates the target inside the clone through the tracked-clone
//! protocol, and rewrites the clone. Search layers exploring many hypothetical rewrites from the
//! same tree therefore never observe cross-contamination between branches.
//!
//! Calling [`Rule::apply_to`] on a node the rule does not apply to is a caller bug, reported as
//! [`RuleError::InapplicableRule`] and never retried.

use std::fmt;
use steps_ast::{ExprTree, NodeId};

/// The record of one rewrite step.
///
/// All three node ids reference [`Change::tree`], the freshly cloned tree the rewrite was
/// performed on, never the tree the rule was applied to. The pre-rewrite subtree stays
/// allocated (detached) inside the clone, so `before` remains renderable for audit output.
#[derive(Debug)]
pub struct Change {
    /// The rewritten tree, owned by this record.
    pub tree: ExprTree,

    /// The rewrite target as it was before the rewrite.
    pub before: NodeId,

    /// The subtree standing in the target's position after the rewrite.
    pub after: NodeId,

    /// The root of [`Change::tree`] after the rewrite, which may differ from the root the
    /// target had before it.
    pub root: NodeId,

    /// Display name of the rule that produced this change.
    pub rule_name: &'static str,
}

/// A rule-application failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// `apply_to` was called on a node where `can_apply_to` is false.
    InapplicableRule { rule: &'static str },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InapplicableRule { rule } => {
                write!(f, "rule `{rule}` is not applicable to this node")
            }
        }
    }
}

impl std::error::Error for RuleError {}

/// A value-preserving rewrite of one expression node.
pub trait Rule {
    /// Human-readable rule name.
    fn name(&self) -> &'static str;

    /// Short mnemonic for action lists.
    fn code(&self) -> &'static str;

    /// Returns true if this rule can rewrite the given node. Never mutates.
    fn can_apply_to(&self, tree: &ExprTree, node: NodeId) -> bool;

    /// Rewrites the given node, returning a [`Change`] over a fresh clone of the node's tree.
    fn apply_to(&self, tree: &ExprTree, node: NodeId) -> Result<Change, RuleError>;
}

/// Puts `new` where `old` sits in its parent; when `old` is the root, `new` simply becomes the
/// root of its own detached subtree.
pub(crate) fn swap_node(tree: &mut ExprTree, old: NodeId, new: NodeId) {
    if let Some(parent) = tree.parent(old) {
        if let Some(side) = tree.get_side(parent, old) {
            tree.set_side(parent, Some(new), side);
        }
    }
}

//! Expression trees for step-by-step algebra.
//!
//! This crate holds the data model the rest of the engine is built on: a generic arena
//! [`tree`] with parent links, ordered traversal, and tracked cloning; the closed set of
//! [`expr`] node kinds with rendering, evaluation, and differentiation; and the pure [`term`]
//! analysis functions that rewrite rules and search layers use to judge an expression.
//!
//! Trees are plain owned values. Every mutating operation the engine performs works on a tree it
//! exclusively owns (cloning before rewriting is the engine-wide convention), so trees can be
//! freely handed across worker threads.

pub mod expr;
pub mod term;
pub mod tree;

pub use expr::{
    eval::Bindings,
    types::TYPE_ID_MAX,
    DeriveError, EvalError, ExprNode, ExprTree, FunctionKind, Priority, StructuralError,
};
pub use tree::{NodeId, NodeUid, Side, Tree, TreeData, Visit};

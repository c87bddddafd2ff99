//! The public face of the steps algebra engine.
//!
//! This crate re-exports the surface outside layers consume: [`parse`] from text to an
//! [`ExprTree`], rendering back out via [`ExprTree::to_text`] and [`ExprTree::to_markup`],
//! evaluation and differentiation, the [`Rule`] catalog with its [`Change`] records, and the
//! stable [`TYPE_ID_MAX`] bound on node type ids.
//!
//! A typical rewrite step flows one way: text is parsed into a tree, a rule is chosen against a
//! focus node and applied, and the changed tree is rendered back to text or markup. The engine
//! holds no state between steps; every call works on trees the caller owns.

pub use steps_ast::{
    term, Bindings, DeriveError, EvalError, ExprNode, ExprTree, FunctionKind, NodeId, NodeUid,
    Priority, Side, StructuralError, Tree, TreeData, Visit, TYPE_ID_MAX,
};
pub use steps_error::{Error, ErrorKind};
pub use steps_parser::parse;
pub use steps_rules::{
    catalog, AssociativeSwap, Change, CommutativeSwap, ConstantsSimplify, DistributiveFactorOut,
    DistributiveMultiply, Rule, RuleError,
};

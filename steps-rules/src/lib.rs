//! Value-preserving rewrite rules over expression trees.
//!
//! The [`rule`] module defines the protocol (a pure applicability predicate plus a
//! clone-then-rewrite application that returns a [`Change`] record) and [`rules`] holds the
//! catalog: commutative and associative swaps, both directions of the distributive property,
//! and constant folding.

pub mod rule;
pub mod rules;

pub use rule::{Change, Rule, RuleError};
pub use rules::{
    catalog, AssociativeSwap, CommutativeSwap, ConstantsSimplify, DistributiveFactorOut,
    DistributiveMultiply,
};

//! Parsing of algebra text into expression trees.
//!
//! The [`tokenizer`] turns source text into a flat token stream, and the [`parser`] climbs the
//! operator precedence table to build an [`steps_ast::ExprTree`]. Every failure carries the
//! offending character offset and renders as a labeled report.

pub mod error;
pub mod parser;
pub mod tokenizer;

pub use parser::{parse, Parser};

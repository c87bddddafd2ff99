//! The stable integer encoding of node kinds consumed by feature-encoding layers.
//!
//! Every kind maps to a small integer through a static name table: values 0 through 15 belong to
//! operators and structure (8 through 15 are reserved for unary function kinds), 16 through 25
//! encode constants by their value mod 10, and 26 through 52 encode variables: one generic slot
//! plus one per letter of the alphabet. The table is read-only after construction and safe to
//! consult from any number of threads.

use super::ExprNode;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The largest value [`ExprNode::type_id`] can produce.
pub const TYPE_ID_MAX: u8 = 52;

static TYPE_KEYS: Lazy<HashMap<String, u8>> = Lazy::new(|| {
    let mut keys = HashMap::new();
    for (name, id) in [
        ("empty", 0),
        ("negate", 1),
        ("equal", 2),
        ("add", 3),
        ("subtract", 4),
        ("multiply", 5),
        ("divide", 6),
        ("power", 7),
        // 8-15: unary function kinds, with room to grow
        ("abs", 8),
        ("sgn", 9),
    ] {
        keys.insert(name.to_string(), id);
    }
    for digit in 0..10u8 {
        keys.insert(format!("constant_{digit}"), 16 + digit);
    }
    keys.insert("variable".to_string(), 26);
    for (offset, letter) in ('a'..='z').enumerate() {
        keys.insert(format!("variable_{letter}"), 27 + offset as u8);
    }
    keys
});

impl ExprNode {
    /// Maps this node to its slot in the static type table, in `0..=TYPE_ID_MAX`.
    ///
    /// Constants are keyed by their value mod 10 and variables by their first letter, so the
    /// encoding distinguishes leaves without growing with the expression alphabet.
    pub fn type_id(&self) -> u8 {
        let key = match self {
            Self::Constant(value) if value.is_finite() => {
                format!("constant_{}", value.rem_euclid(10.0).trunc() as u8)
            }
            Self::Constant(_) => "empty".to_string(),
            Self::Variable(identifier) => {
                match identifier.chars().next().map(|c| c.to_ascii_lowercase()) {
                    Some(letter) if letter.is_ascii_lowercase() => format!("variable_{letter}"),
                    _ => "variable".to_string(),
                }
            }
            Self::Negate => "negate".to_string(),
            Self::Function(function) => function.name().to_string(),
            Self::Add => "add".to_string(),
            Self::Subtract => "subtract".to_string(),
            Self::Multiply => "multiply".to_string(),
            Self::Divide => "divide".to_string(),
            Self::Power => "power".to_string(),
            Self::Equal => "equal".to_string(),
        };
        TYPE_KEYS.get(&key).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ExprNode, FunctionKind};
    use super::TYPE_ID_MAX;
    use pretty_assertions::assert_eq;

    #[test]
    fn operator_slots_are_stable() {
        assert_eq!(ExprNode::Negate.type_id(), 1);
        assert_eq!(ExprNode::Equal.type_id(), 2);
        assert_eq!(ExprNode::Add.type_id(), 3);
        assert_eq!(ExprNode::Subtract.type_id(), 4);
        assert_eq!(ExprNode::Multiply.type_id(), 5);
        assert_eq!(ExprNode::Divide.type_id(), 6);
        assert_eq!(ExprNode::Power.type_id(), 7);
        assert_eq!(ExprNode::Function(FunctionKind::Abs).type_id(), 8);
        assert_eq!(ExprNode::Function(FunctionKind::Sgn).type_id(), 9);
    }

    #[test]
    fn constants_encode_by_value_mod_ten() {
        assert_eq!(ExprNode::Constant(0.0).type_id(), 16);
        assert_eq!(ExprNode::Constant(4.0).type_id(), 20);
        assert_eq!(ExprNode::Constant(14.0).type_id(), 20);
        assert_eq!(ExprNode::Constant(9.0).type_id(), 25);
        // Negative values wrap the way a modulus should.
        assert_eq!(ExprNode::Constant(-3.0).type_id(), 23);
    }

    #[test]
    fn variables_encode_by_first_letter() {
        assert_eq!(ExprNode::Variable("a".to_string()).type_id(), 27);
        assert_eq!(ExprNode::Variable("x".to_string()).type_id(), 50);
        assert_eq!(ExprNode::Variable("z".to_string()).type_id(), 52);
        assert_eq!(ExprNode::Variable("X".to_string()).type_id(), 50);
    }

    #[test]
    fn every_id_fits_the_published_bound() {
        let nodes = [
            ExprNode::Constant(7.5),
            ExprNode::Constant(f64::NAN),
            ExprNode::Variable("q".to_string()),
            ExprNode::Negate,
            ExprNode::Function(FunctionKind::Sgn),
            ExprNode::Power,
        ];
        for node in nodes {
            assert!(node.type_id() <= TYPE_ID_MAX);
        }
    }
}

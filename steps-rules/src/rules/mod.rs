//! The concrete rule catalog.
//!
//! Each module holds one rule family. Every rule is independently constructible; [`catalog`]
//! builds the full set in the order a search layer would enumerate them.

pub mod associative;
pub mod commutative;
pub mod constants;
pub mod distributive;

pub use associative::AssociativeSwap;
pub use commutative::CommutativeSwap;
pub use constants::ConstantsSimplify;
pub use distributive::{DistributiveFactorOut, DistributiveMultiply};

use crate::rule::Rule;

/// Every rule in the catalog.
pub fn catalog() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ConstantsSimplify),
        Box::new(CommutativeSwap::default()),
        Box::new(AssociativeSwap),
        Box::new(DistributiveFactorOut),
        Box::new(DistributiveMultiply),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::collections::HashSet;
    use steps_ast::{Bindings, ExprNode, Visit};
    use steps_parser::parse;

    #[test]
    fn catalog_codes_are_unique() {
        let rules = catalog();
        let codes: HashSet<_> = rules.iter().map(|rule| rule.code()).collect();
        assert_eq!(codes.len(), rules.len());
    }

    /// Every rule application preserves the expression's value under randomized bindings.
    #[test]
    fn every_applicable_rewrite_preserves_value() {
        let sources = [
            "4x + 3x",
            "2x^2 + 3x^2",
            "4 + 6",
            "a + b",
            "x * 4",
            "a + (b + c)",
            "2 * (3 * 4)",
            "4(x + 2)",
            "(x + 2) * y",
            "2 + 3 * 5",
            "7x - 2x + 12",
        ];
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut applied = 0;

        for source in sources {
            let (tree, root) = parse(source).unwrap();

            // every variable in the expression gets a random binding
            let mut bindings = Bindings::new();
            let _ = tree.visit_inorder(root, &mut |id, _| {
                if let ExprNode::Variable(name) = tree.data(id) {
                    bindings.insert(name.clone(), rng.gen_range(1..100) as f64);
                }
                Visit::Continue
            });
            let expected = tree.evaluate(root, &bindings).unwrap();

            // apply every rule at every node it accepts
            let nodes = tree.to_list(root);
            for rule in catalog() {
                for &node in &nodes {
                    if !rule.can_apply_to(&tree, node) {
                        continue;
                    }
                    let change = rule
                        .apply_to(&tree, node)
                        .unwrap_or_else(|err| panic!("{source}: {err}"));
                    let actual = change.tree.evaluate(change.root, &bindings).unwrap();
                    assert_eq!(
                        actual, expected,
                        "{} broke the value of {source} at {:?}",
                        rule.name(),
                        tree.to_text(node)
                    );
                    applied += 1;

                    // and the original tree is untouched
                    assert_eq!(tree.evaluate(root, &bindings).unwrap(), expected);
                }
            }
        }
        assert!(applied > 10, "expected the catalog to fire many times, got {applied}");
    }
}

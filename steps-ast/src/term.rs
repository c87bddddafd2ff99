//! Term analysis: pure functions that classify, extract, and factor the terms of an expression.
//!
//! A *term* is a maximal multiplicative grouping of a coefficient, variables, and at most one
//! exponent, with no addition or subtraction at its own level. Nothing in this module stores
//! state on the tree; every function derives its answer on demand, so rewrite rules and outside
//! callers can consult them against any snapshot of an expression.

use crate::expr::{ExprNode, ExprTree};
use crate::tree::{NodeId, Side, Visit};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A derived view of one term: its numeric factors, its variables, and its exponent, along with
/// the nodes they were read from. The view borrows nothing and owns nothing on the tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TermSummary {
    pub coefficients: Vec<f64>,
    pub variables: Vec<String>,
    pub exponent: Option<f64>,
    pub coefficient_nodes: Vec<NodeId>,
    pub variable_nodes: Vec<NodeId>,
    pub exponent_node: Option<NodeId>,
}

/// The three components of a naturally ordered term (`4x^2` reads as coefficient 4, variable x,
/// exponent 2). Unlike [`get_term`], extraction only looks at a node and its direct children.
#[derive(Debug, Clone, PartialEq)]
pub struct TermParts {
    pub coefficient: Option<f64>,
    pub variable: Option<String>,
    pub exponent: Option<f64>,
}

/// One (coefficient, variable, exponent) node triple found by [`get_sub_terms`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubTerm {
    pub coefficient: Option<NodeId>,
    pub variable: Option<NodeId>,
    pub exponent: Option<NodeId>,
}

/// The outcome of factoring two like terms: the factor pulled out, what remains of each term,
/// and the shared variable/exponent if there is one.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorResult {
    pub best: f64,
    pub left: f64,
    pub right: f64,
    pub variable: Option<String>,
    pub exponent: Option<f64>,
    pub left_variable: Option<String>,
    pub right_variable: Option<String>,
    pub left_exponent: Option<f64>,
    pub right_exponent: Option<f64>,
}

/// Returns true for addition and subtraction kinds.
pub fn is_add_or_sub(node: &ExprNode) -> bool {
    matches!(node, ExprNode::Add | ExprNode::Subtract)
}

/// Returns true if the subtree under `id` represents a constant, allowing nested negation.
pub fn is_const(tree: &ExprTree, id: NodeId) -> bool {
    match tree.data(id) {
        ExprNode::Constant(_) => true,
        ExprNode::Negate => tree.unary_child(id).is_some_and(|child| is_const(tree, child)),
        _ => false,
    }
}

fn collect(tree: &ExprTree, root: NodeId, pred: impl Fn(&ExprNode) -> bool) -> Vec<NodeId> {
    let mut out = Vec::new();
    let _ = tree.visit_inorder(root, &mut |id, _| {
        if pred(tree.data(id)) {
            out.push(id);
        }
        Visit::Continue
    });
    out
}

/// Builds the verbose factor table of a value, with every factor pair present in both orders so
/// any factor is addressable by key: `factor(12.0)` maps 1↦12, 2↦6, 3↦4, 4↦3, 6↦2, 12↦1.
///
/// Values that are zero, negative, non-finite, or non-integral have no factors.
pub fn factor(value: f64) -> BTreeMap<i64, i64> {
    let mut factors = BTreeMap::new();
    if value <= 0.0 || !value.is_finite() || value.fract() != 0.0 {
        return factors;
    }
    let value = value as i64;
    factors.insert(1, value);
    factors.insert(value, 1);
    let mut i = 2;
    while i * i <= value {
        if value % i == 0 {
            factors.insert(i, value / i);
            factors.insert(value / i, i);
        }
        i += 1;
    }
    factors
}

/// Collects the term nodes of the whole expression that `id` belongs to.
///
/// Walks from the root: every non-add/sub child hanging off the add/sub spine is a term. A root
/// that is itself a product counts as a single term, and an expression with no sums at all is
/// one term: itself.
pub fn get_terms(tree: &ExprTree, id: NodeId) -> Vec<NodeId> {
    let mut results = Vec::new();
    let root = tree.get_root(id);
    if matches!(tree.data(root), ExprNode::Multiply) {
        results.push(root);
    }
    let _ = tree.visit_inorder(root, &mut |node, _| {
        if is_add_or_sub(tree.data(node)) {
            if let Some(left) = tree.left(node) {
                if !is_add_or_sub(tree.data(left)) {
                    results.push(left);
                }
            }
            if let Some(right) = tree.right(node) {
                if !is_add_or_sub(tree.data(right)) {
                    results.push(right);
                }
            }
        }
        Visit::Continue
    });
    if results.is_empty() {
        vec![id]
    } else {
        results
    }
}

/// Extracts term information from the subtree under `node`, or [`None`] if the subtree does not
/// form a single term.
pub fn get_term(tree: &ExprTree, node: NodeId) -> Option<TermSummary> {
    let mut result = TermSummary::default();

    // A constant or variable hanging directly off the add/sub spine (or standing alone) is a
    // complete term by itself.
    let spine_parent = tree.parent(node).is_none()
        || tree.parent(node).is_some_and(|p| is_add_or_sub(tree.data(p)));
    match tree.data(node) {
        ExprNode::Constant(value) if spine_parent => {
            result.coefficients = vec![*value];
            result.coefficient_nodes = vec![node];
            return Some(result);
        }
        ExprNode::Variable(identifier) if spine_parent => {
            result.variables = vec![identifier.clone()];
            result.variable_nodes = vec![node];
            return Some(result);
        }
        _ => {}
    }

    // A term must not contain addition or subtraction below itself.
    if !is_add_or_sub(tree.data(node)) && !collect(tree, node, is_add_or_sub).is_empty() {
        return None;
    }

    // A sum on the left can only be tolerated when the right side is a bare leaf; a sum on the
    // right never can.
    if let Some(left) = tree.left(node) {
        if !collect(tree, left, |n| matches!(n, ExprNode::Add)).is_empty() {
            if let Some(right) = tree.right(node) {
                if !tree.is_leaf(right) {
                    return None;
                }
            }
        }
    }
    if let Some(right) = tree.right(node) {
        if !collect(tree, right, |n| matches!(n, ExprNode::Add)).is_empty() {
            return None;
        }
    }

    let exponents = collect(tree, node, |n| matches!(n, ExprNode::Power));
    if !exponents.is_empty() {
        // only single exponents are supported in terms
        if exponents.len() != 1 {
            return None;
        }
        let power = exponents[0];
        match tree.right(power).map(|r| tree.data(r)) {
            Some(ExprNode::Constant(value)) => {
                result.exponent = Some(*value);
                result.exponent_node = Some(power);
            }
            _ => return None,
        }
    }

    let variables = collect(tree, node, |n| matches!(n, ExprNode::Variable(_)));
    if !variables.is_empty() {
        result.variables = variables
            .iter()
            .filter_map(|&id| match tree.data(id) {
                ExprNode::Variable(identifier) => Some(identifier.clone()),
                _ => None,
            })
            .collect();
        result.variables.sort();
        result.variable_nodes = variables;
    }

    let keep_coefficient = |id: NodeId| -> bool {
        match tree.parent(id) {
            None => true,
            Some(parent) if tree.parent(node) == Some(parent) => true,
            Some(parent) => {
                let data = tree.data(parent);
                !(data.is_binary() && !matches!(data, ExprNode::Multiply))
            }
        }
    };
    let coefficients: Vec<NodeId> = collect(tree, node, |n| matches!(n, ExprNode::Constant(_)))
        .into_iter()
        .filter(|&id| keep_coefficient(id))
        .collect();
    if !coefficients.is_empty() {
        result.coefficients = coefficients
            .iter()
            .map(|&id| {
                let value = match tree.data(id) {
                    ExprNode::Constant(value) => *value,
                    _ => 0.0,
                };
                match tree.parent(id).map(|p| tree.data(p)) {
                    Some(ExprNode::Negate) => -value,
                    _ => value,
                }
            })
            .collect();
        result.coefficient_nodes = coefficients;
    }

    let empty = result.variables.is_empty()
        && result.coefficients.is_empty()
        && result.exponent.is_none();
    if empty {
        return None;
    }
    Some(result)
}

/// Extracts the components of a naturally ordered term, looking only at `node` and its direct
/// children. Returns [`None`] for any other shape.
pub fn get_term_parts(tree: &ExprTree, node: NodeId) -> Option<TermParts> {
    let under_power = tree
        .parent(node)
        .is_some_and(|p| matches!(tree.data(p), ExprNode::Power));

    match tree.data(node) {
        // "4", unless this constant is an exponent, which belongs to its power node
        ExprNode::Constant(value) if !under_power => Some(TermParts {
            coefficient: Some(*value),
            variable: None,
            exponent: None,
        }),
        // "x"
        ExprNode::Variable(identifier) if !under_power => Some(TermParts {
            coefficient: None,
            variable: Some(identifier.clone()),
            exponent: None,
        }),
        // "4 * ???"
        ExprNode::Multiply => {
            let left = tree.left(node)?;
            let right = tree.right(node)?;
            let ExprNode::Constant(coefficient) = tree.data(left) else {
                return None;
            };
            match tree.data(right) {
                // "4x"
                ExprNode::Variable(identifier) => Some(TermParts {
                    coefficient: Some(*coefficient),
                    variable: Some(identifier.clone()),
                    exponent: None,
                }),
                // "4x^2"
                ExprNode::Power => power_parts(tree, right).map(|(variable, exponent)| TermParts {
                    coefficient: Some(*coefficient),
                    variable: Some(variable),
                    exponent: Some(exponent),
                }),
                _ => None,
            }
        }
        // "x^2"
        ExprNode::Power => power_parts(tree, node).map(|(variable, exponent)| TermParts {
            coefficient: None,
            variable: Some(variable),
            exponent: Some(exponent),
        }),
        // constants and variables that serve as exponents fall through to here
        _ => None,
    }
}

fn power_parts(tree: &ExprTree, power: NodeId) -> Option<(String, f64)> {
    let base = tree.left(power)?;
    let exponent = tree.right(power)?;
    match (tree.data(base), tree.data(exponent)) {
        (ExprNode::Variable(identifier), ExprNode::Constant(value)) => {
            Some((identifier.clone(), *value))
        }
        _ => None,
    }
}

/// Factors two naturally ordered terms against each other.
///
/// The factor pulled out is the *largest* common coefficient factor when neither term carries a
/// variable, and the *smallest* when one does, since extracting the shared variable matters
/// more than the arithmetic there. Returns [`None`] when the coefficients share no factor at all.
pub fn factor_like_terms(left: &TermParts, right: &TermParts) -> Option<FactorResult> {
    let l_factors = factor(left.coefficient.unwrap_or(1.0));
    let r_factors = factor(right.coefficient.unwrap_or(1.0));
    let common: Vec<i64> = l_factors
        .keys()
        .filter(|key| r_factors.contains_key(key))
        .copied()
        .collect();
    if common.is_empty() {
        return None;
    }

    let has_left = left.variable.is_some();
    let has_right = right.variable.is_some();
    let best = if has_left || has_right {
        *common.first()?
    } else {
        *common.last()?
    };

    let mut result = FactorResult {
        best: best as f64,
        left: l_factors[&best] as f64,
        right: r_factors[&best] as f64,
        variable: None,
        exponent: None,
        left_variable: None,
        right_variable: None,
        left_exponent: None,
        right_exponent: None,
    };

    let exponents_match = match (left.exponent, right.exponent) {
        (None, None) => true,
        (Some(l), Some(r)) => l == r,
        _ => false,
    };
    if has_left && has_right && left.variable == right.variable && exponents_match {
        result.variable = left.variable.clone();
        result.exponent = left.exponent;
    }
    if left.exponent.is_some() && left.exponent != result.exponent {
        result.left_exponent = left.exponent;
    }
    if right.exponent.is_some() && right.exponent != result.exponent {
        result.right_exponent = right.exponent;
    }
    if has_left && left.variable != result.variable {
        result.left_variable = left.variable.clone();
    }
    if has_right && right.variable != result.variable {
        result.right_variable = right.variable.clone();
    }
    Some(result)
}

/// Builds a term node hierarchy from the given components, eliding implicit coefficients of 1.
/// The shape is always `coefficient * (variable ^ exponent)` with the redundant pieces dropped.
pub fn make_term(
    tree: &mut ExprTree,
    coefficient: f64,
    variable: Option<&str>,
    exponent: Option<f64>,
) -> NodeId {
    let Some(variable) = variable else {
        return tree.constant(coefficient);
    };
    let var = tree.variable(variable);
    let group = match exponent {
        None => var,
        Some(exponent) => {
            let exp = tree.constant(exponent);
            tree.binary(ExprNode::Power, var, exp)
        }
    };
    if coefficient == 1.0 {
        group
    } else {
        let coeff = tree.constant(coefficient);
        tree.binary(ExprNode::Multiply, coeff, group)
    }
}

/// Walks the inorder token stream of the subtree under `node` and splits it into
/// (coefficient, variable, exponent) triples. Returns [`None`] as soon as the stream stops
/// looking like a product of simple terms (any addition, or an operator out of place).
pub fn get_sub_terms(tree: &ExprTree, node: NodeId) -> Option<Vec<SubTerm>> {
    let list = tree.to_list(node);
    let mut index = 0;
    let next = move |index: &mut usize| -> Option<NodeId> {
        let id = list.get(*index).copied();
        *index += 1;
        id
    };

    let is_power =
        |id: Option<NodeId>| id.is_some_and(|id| matches!(tree.data(id), ExprNode::Power));
    let is_product_op = |id: NodeId| {
        matches!(
            tree.data(id),
            ExprNode::Multiply | ExprNode::Divide | ExprNode::Power
        )
    };

    let mut terms = Vec::new();
    let mut current = next(&mut index);
    while current.is_some() {
        let mut term_const = None;
        let mut term_var = None;
        let mut term_exp = None;

        // a leading coefficient
        if let Some(id) = current {
            if matches!(tree.data(id), ExprNode::Constant(_)) {
                term_const = Some(id);
                current = next(&mut index);
                if let Some(op) = current {
                    if is_add_or_sub(tree.data(op)) || !is_product_op(op) {
                        return None;
                    }
                }
                if !is_power(current) {
                    current = next(&mut index);
                }
            }
        }

        // the variable
        if let Some(id) = current {
            if matches!(tree.data(id), ExprNode::Variable(_)) {
                term_var = Some(id);
                current = next(&mut index);
                if let Some(op) = current {
                    if is_add_or_sub(tree.data(op)) || !is_product_op(op) {
                        return None;
                    }
                }
                if !is_power(current) {
                    current = next(&mut index);
                }
            }
        }

        // the exponent
        if is_power(current) {
            current = next(&mut index);
            term_exp = current;
            current = next(&mut index);
        }

        if term_const.is_none() && term_var.is_none() && term_exp.is_none() {
            // A continuation multiply shows up between parenthesized groups, e.g. the outer
            // multiply of "4 * (x^2 * z^6)"; skip it and keep scanning.
            if current.is_some_and(|id| matches!(tree.data(id), ExprNode::Multiply)) {
                current = next(&mut index);
                continue;
            }
            return None;
        }
        terms.push(SubTerm {
            coefficient: term_const,
            variable: term_var,
            exponent: term_exp,
        });
    }
    Some(terms)
}

/// Returns true if the term under `node` carries at most one coefficient and one of each
/// variable/exponent pairing: `2x^2 * 2y` is not simple, `4x^2 * y` is.
pub fn is_simple_term(tree: &ExprTree, node: NodeId) -> bool {
    let Some(sub_terms) = get_sub_terms(tree, node) else {
        return false;
    };
    let mut seen = HashSet::new();
    for term in &sub_terms {
        if term.coefficient.is_some() && !seen.insert("coefficient".to_string()) {
            return false;
        }
        if term.variable.is_some() || term.exponent.is_some() {
            let variable = term
                .variable
                .and_then(|id| tree.to_text(id).ok())
                .unwrap_or_else(|| "None".to_string());
            let exponent = term
                .exponent
                .and_then(|id| tree.to_text(id).ok())
                .unwrap_or_else(|| "None".to_string());
            if !seen.insert(format!("{variable}{exponent}")) {
                return false;
            }
        }
    }
    true
}

/// Returns true if the term under `node` is simple *and* in preferred order: the coefficient on
/// the left of its variable group, and no variable repeated.
pub fn is_preferred_term_form(tree: &ExprTree, node: NodeId) -> bool {
    if !is_simple_term(tree, node) {
        return false;
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for var in collect(tree, node, |n| matches!(n, ExprNode::Variable(_))) {
        if let ExprNode::Variable(identifier) = tree.data(var) {
            *seen.entry(identifier.clone()).or_insert(0) += 1;
        }
        // The variable's group is the power node when it has one.
        let mut group = var;
        if let Some(parent) = tree.parent(var) {
            if matches!(tree.data(parent), ExprNode::Power) {
                group = parent;
            }
        }
        // A constant to the group's right means "x * 4" ordering.
        if let Some(parent) = tree.parent(group) {
            if tree.get_side(parent, group) == Some(Side::Left) {
                if let Some(right) = tree.right(parent) {
                    if matches!(tree.data(right), ExprNode::Constant(_)) {
                        return false;
                    }
                }
            }
        }
    }

    seen.values().all(|&count| count <= 1)
}

/// Returns true if the expression containing `node` has more than one term with the same
/// variable/exponent signature, or more than one free constant term.
pub fn has_like_terms(tree: &ExprTree, node: NodeId) -> bool {
    let mut seen: HashSet<String> = HashSet::new();
    for term_node in get_terms(tree, node) {
        let Some(term) = get_term(tree, term_node) else {
            continue;
        };
        let key = format!("{}|{:?}", term.variables.join(""), term.exponent);
        if !seen.insert(key) {
            return true;
        }
    }

    for constant in collect(tree, node, |n| matches!(n, ExprNode::Constant(_))) {
        if let Some(parent) = tree.parent(constant) {
            if is_add_or_sub(tree.data(parent)) && !seen.insert("const_term".to_string()) {
                return true;
            }
        }
    }
    false
}

/// Returns true if two term summaries are like terms: identical variable sets and identical
/// exponent. Two constant-only terms are always like.
pub fn terms_are_like(one: &TermSummary, two: &TermSummary) -> bool {
    if one.variables.is_empty() && two.variables.is_empty() {
        return true;
    }
    if one.variables.len() != two.variables.len() {
        return false;
    }
    if one.variables.iter().any(|v| !two.variables.contains(v)) {
        return false;
    }
    one.exponent == two.exponent
}

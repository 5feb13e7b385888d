//! Relational algebra operators as pure functions.
//!
//! Each operator takes relations by reference and returns a new relation;
//! inputs are never modified. Because every result is again a relation,
//! calls nest: `select(&natural_join(&r, &s)?, &p)?`.
//!
//! Operators run through the same validation and executors as textual
//! queries, with the default engine configuration.

use crate::config::EngineConfig;
use crate::executor::SetOperator;
use crate::expression::{ColumnRef, Expression};
use crate::planner::{evaluate, LogicalPlan};
use crate::relation::Relation;
use anyhow::Result;
use std::sync::Arc;

fn input(relation: &Relation) -> LogicalPlan {
    LogicalPlan::scan("input", Arc::new(relation.clone()))
}

fn run(plan: LogicalPlan) -> Result<Relation> {
    evaluate(plan, &EngineConfig::default())
}

/// σ: the tuples of `relation` satisfying `predicate`
pub fn select(relation: &Relation, predicate: &Expression) -> Result<Relation> {
    run(LogicalPlan::select(input(relation), predicate.clone())?)
}

/// π: the distinct restrictions of `relation` to `attributes`, in order.
/// Attributes are written `name` or `qualifier.name`.
pub fn project(relation: &Relation, attributes: &[&str]) -> Result<Relation> {
    let attributes: Vec<ColumnRef> = attributes.iter().map(|a| ColumnRef::parse(a)).collect();
    run(LogicalPlan::project(input(relation), &attributes)?)
}

/// ∪ of two union-compatible relations; attribute names come from `left`
pub fn union(left: &Relation, right: &Relation) -> Result<Relation> {
    set_operation(SetOperator::Union, left, right)
}

/// ∩ of two union-compatible relations
pub fn intersection(left: &Relation, right: &Relation) -> Result<Relation> {
    set_operation(SetOperator::Intersect, left, right)
}

/// − : tuples of `left` that are not in `right`
pub fn difference(left: &Relation, right: &Relation) -> Result<Relation> {
    set_operation(SetOperator::Difference, left, right)
}

fn set_operation(operator: SetOperator, left: &Relation, right: &Relation) -> Result<Relation> {
    run(LogicalPlan::set_operation(
        operator,
        input(left),
        input(right),
    )?)
}

/// ×: every pairing of a `left` tuple with a `right` tuple
pub fn cross_product(left: &Relation, right: &Relation) -> Result<Relation> {
    run(LogicalPlan::product(input(left), input(right)))
}

/// ⋈: equality on every attribute name the two relations share, keeping one
/// copy of each shared attribute
pub fn natural_join(left: &Relation, right: &Relation) -> Result<Relation> {
    run(LogicalPlan::natural_join(input(left), input(right))?)
}

/// ⋈θ: pairs satisfying `condition` over the concatenated schema
pub fn theta_join(left: &Relation, right: &Relation, condition: &Expression) -> Result<Relation> {
    run(LogicalPlan::theta_join(
        input(left),
        input(right),
        condition.clone(),
    )?)
}

/// Equi-join on explicit `(left attribute, right attribute)` pairs. Both
/// copies of each compared attribute are kept.
pub fn equi_join(left: &Relation, right: &Relation, pairs: &[(&str, &str)]) -> Result<Relation> {
    let mut conjuncts = Vec::with_capacity(pairs.len());
    for (l, r) in pairs {
        let l = left.schema().resolve_str(l)?;
        let r = right.schema().resolve_str(r)?;
        conjuncts.push(Expression::eq(
            qualified_ref(left, l),
            qualified_ref(right, r),
        ));
    }
    let condition = crate::expression::rewrite::conjoin(conjuncts)
        .unwrap_or_else(|| Expression::literal(true));
    theta_join(left, right, &condition)
}

fn qualified_ref(relation: &Relation, index: usize) -> Expression {
    let attribute = &relation.schema().attributes()[index];
    Expression::ColumnRef(match &attribute.qualifier {
        Some(qualifier) => ColumnRef::qualified(qualifier.clone(), attribute.name.clone()),
        None => ColumnRef::new(attribute.name.clone()),
    })
}

/// ρ: requalify every attribute of `relation` with `name`
pub fn rename(relation: &Relation, name: &str) -> Result<Relation> {
    run(LogicalPlan::rename_relation(input(relation), name))
}

/// ρ: rename individual attributes, `(old, new)`
pub fn rename_attributes(relation: &Relation, renames: &[(&str, &str)]) -> Result<Relation> {
    let renames: Vec<(ColumnRef, String)> = renames
        .iter()
        .map(|(old, new)| (ColumnRef::parse(old), new.to_string()))
        .collect();
    run(LogicalPlan::rename_attributes(input(relation), &renames)?)
}

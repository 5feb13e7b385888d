//! Rule-based rewrites on logical plans.
//!
//! Every rule preserves the result relation, and the error a plan raises:
//! - selects are put in negation normal form and split into conjuncts
//! - conjuncts that cannot fail are pushed as close to the scans as the
//!   attributes they reference allow
//! - a conjunct that can fail (checked arithmetic) stays where it was, after
//!   every conjunct that preceded it, together with everything that follows
//! - a conjunct spanning both sides of a product turns it into a theta join
//! - conjuncts that end up stacked on the same node are merged into one
//!   select, inner predicate first

use crate::executor::SetOperator;
use crate::expression::rewrite::{conjoin, negation_normal_form, split_conjunction};
use crate::expression::Expression;
use crate::planner::logical::{JoinCondition, LogicalPlan};
use log::debug;

/// Rewrite a validated plan into an equivalent, cheaper one
pub fn optimize(plan: LogicalPlan) -> LogicalPlan {
    match plan {
        LogicalPlan::Scan { .. } => plan,
        LogicalPlan::Select { input, predicate } => {
            let input = optimize(*input);
            push_down(input, conjuncts(&predicate))
        }
        LogicalPlan::Project { input, columns } => LogicalPlan::Project {
            input: Box::new(optimize(*input)),
            columns,
        },
        LogicalPlan::Rename { input, schema } => LogicalPlan::Rename {
            input: Box::new(optimize(*input)),
            schema,
        },
        LogicalPlan::SetOperation {
            operator,
            left,
            right,
        } => LogicalPlan::SetOperation {
            operator,
            left: Box::new(optimize(*left)),
            right: Box::new(optimize(*right)),
        },
        LogicalPlan::Product { left, right } => LogicalPlan::Product {
            left: Box::new(optimize(*left)),
            right: Box::new(optimize(*right)),
        },
        LogicalPlan::Join {
            left,
            right,
            condition: JoinCondition::Theta(condition),
        } => {
            // Let the join's own conjuncts sink into its inputs too
            let left = optimize(*left);
            let right = optimize(*right);
            push_down(
                LogicalPlan::Product {
                    left: Box::new(left),
                    right: Box::new(right),
                },
                conjuncts(&condition),
            )
        }
        LogicalPlan::Join {
            left,
            right,
            condition: JoinCondition::Natural,
        } => LogicalPlan::Join {
            left: Box::new(optimize(*left)),
            right: Box::new(optimize(*right)),
            condition: JoinCondition::Natural,
        },
    }
}

/// Conjuncts of a predicate in evaluation order, negations pushed to the
/// leaves first so `NOT (p OR q)` yields two conjuncts
fn conjuncts(predicate: &Expression) -> Vec<Expression> {
    split_conjunction(&negation_normal_form(predicate))
}

/// Place `conjuncts` on top of `plan`, each as deep as it can go.
///
/// `conjuncts` are in evaluation order. Only the prefix before the first
/// conjunct that can fail is free to move; the rest keeps its order above
/// the node so it is evaluated on exactly the tuples it would have seen.
fn push_down(plan: LogicalPlan, conjuncts: Vec<Expression>) -> LogicalPlan {
    if conjuncts.is_empty() {
        return plan;
    }

    match plan {
        LogicalPlan::Select { input, predicate } => {
            debug!("merging select on {} into the conjuncts above it", predicate);
            let mut merged = split_conjunction(&predicate);
            merged.extend(conjuncts);
            push_down(*input, merged)
        }

        LogicalPlan::Project { input, columns } => {
            let (movable, pinned) = split_at_fallible(conjuncts);
            let input_schema = input.schema();
            let (below, mut above) = partition(movable, |c| c.binds_to(&input_schema));
            above.extend(pinned);
            if !below.is_empty() {
                debug!("pushing {} conjunct(s) below projection", below.len());
            }
            let project = LogicalPlan::Project {
                input: Box::new(push_down(*input, below)),
                columns,
            };
            wrap(project, above)
        }

        LogicalPlan::Product { left, right } => {
            let (movable, pinned) = split_at_fallible(conjuncts);
            let (to_left, to_right, mut spanning) = split_sides(movable, &left, &right);
            spanning.extend(pinned);
            let left = Box::new(push_down(*left, to_left));
            let right = Box::new(push_down(*right, to_right));
            match conjoin(spanning) {
                Some(condition) => {
                    debug!("turning product with predicate {} into a theta join", condition);
                    LogicalPlan::Join {
                        left,
                        right,
                        condition: JoinCondition::Theta(condition),
                    }
                }
                None => LogicalPlan::Product { left, right },
            }
        }

        LogicalPlan::Join {
            left,
            right,
            condition: JoinCondition::Theta(condition),
        } => {
            let mut merged = split_conjunction(&condition);
            merged.extend(conjuncts);
            push_down(LogicalPlan::Product { left, right }, merged)
        }

        LogicalPlan::Join {
            left,
            right,
            condition: JoinCondition::Natural,
        } => {
            let (movable, pinned) = split_at_fallible(conjuncts);
            let (to_left, to_right, mut spanning) = split_sides(movable, &left, &right);
            spanning.extend(pinned);
            let join = LogicalPlan::Join {
                left: Box::new(push_down(*left, to_left)),
                right: Box::new(push_down(*right, to_right)),
                condition: JoinCondition::Natural,
            };
            wrap(join, spanning)
        }

        LogicalPlan::SetOperation {
            operator,
            left,
            right,
        } => {
            let same_names = left.schema() == right.schema();
            match operator {
                // Each union input sees exactly the values the union holds
                SetOperator::Union if same_names => {
                    debug!("pushing select into both union inputs");
                    LogicalPlan::SetOperation {
                        operator,
                        left: Box::new(push_down(*left, conjuncts.clone())),
                        right: Box::new(push_down(*right, conjuncts)),
                    }
                }
                SetOperator::Intersect if same_names => {
                    let (movable, pinned) = split_at_fallible(conjuncts);
                    let intersect = LogicalPlan::SetOperation {
                        operator,
                        left: Box::new(push_down(*left, movable.clone())),
                        right: Box::new(push_down(*right, movable)),
                    };
                    wrap(intersect, pinned)
                }
                // Filtering the left input of a difference or intersection is
                // enough; the output carries the left input's names
                SetOperator::Intersect | SetOperator::Difference => {
                    let (movable, pinned) = split_at_fallible(conjuncts);
                    let operation = LogicalPlan::SetOperation {
                        operator,
                        left: Box::new(push_down(*left, movable)),
                        right,
                    };
                    wrap(operation, pinned)
                }
                SetOperator::Union => wrap(
                    LogicalPlan::SetOperation {
                        operator,
                        left,
                        right,
                    },
                    conjuncts,
                ),
            }
        }

        other => wrap(other, conjuncts),
    }
}

/// Cut `conjuncts` at the first one that can fail
fn split_at_fallible(mut conjuncts: Vec<Expression>) -> (Vec<Expression>, Vec<Expression>) {
    let cut = conjuncts
        .iter()
        .position(Expression::can_fail)
        .unwrap_or(conjuncts.len());
    let pinned = conjuncts.split_off(cut);
    (conjuncts, pinned)
}

/// Split conjuncts into those over the left input only, the right input
/// only, and both
fn split_sides(
    conjuncts: Vec<Expression>,
    left: &LogicalPlan,
    right: &LogicalPlan,
) -> (Vec<Expression>, Vec<Expression>, Vec<Expression>) {
    let left_schema = left.schema();
    let right_schema = right.schema();
    let (to_left, rest) = partition(conjuncts, |c| c.binds_to(&left_schema));
    let (to_right, spanning) = partition(rest, |c| c.binds_to(&right_schema));
    (to_left, to_right, spanning)
}

fn partition(
    conjuncts: Vec<Expression>,
    predicate: impl Fn(&Expression) -> bool,
) -> (Vec<Expression>, Vec<Expression>) {
    conjuncts.into_iter().partition(|c| predicate(c))
}

fn wrap(plan: LogicalPlan, conjuncts: Vec<Expression>) -> LogicalPlan {
    match conjoin(conjuncts) {
        Some(predicate) => LogicalPlan::Select {
            input: Box::new(plan),
            predicate,
        },
        None => plan,
    }
}

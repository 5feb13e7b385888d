//! Query planner for turning algebra expressions into executable plans.
//!
//! The planner performs the following transformations:
//! 1. AST -> Logical Plan: names resolved against the catalog, schemas
//!    inferred, predicates type checked
//! 2. Logical Plan -> Logical Plan: rule-based rewrites (see [`optimizer`])
//! 3. Logical Plan -> Physical Plan: join algorithms chosen
//! 4. Physical Plan -> executor tree, drained into a relation

pub mod logical;
pub mod optimizer;
pub mod physical;

use crate::algebra::{RelationExpression, Renaming};
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::executor::collect;
use crate::relation::Relation;
use anyhow::{Context, Result};
use log::debug;

pub use logical::{JoinCondition, LogicalPlan};
pub use optimizer::optimize;
pub use physical::PhysicalPlan;

/// Query planner that converts algebra expressions to executable plans
pub struct Planner<'a> {
    catalog: &'a Catalog,
    config: &'a EngineConfig,
}

impl<'a> Planner<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a EngineConfig) -> Self {
        Self { catalog, config }
    }

    /// Convert an expression to a validated logical plan. Relations are
    /// snapshotted here, so the plan is unaffected by later changes to the
    /// catalog.
    pub fn plan(&self, expression: &RelationExpression) -> Result<LogicalPlan> {
        match expression {
            RelationExpression::Relation(name) => {
                let relation = self.catalog.relation(name)?;
                Ok(LogicalPlan::scan(name.clone(), relation))
            }
            RelationExpression::Select { predicate, input } => {
                LogicalPlan::select(self.plan(input)?, predicate.clone())
                    .with_context(|| format!("in select[{}]", predicate))
            }
            RelationExpression::Project { attributes, input } => {
                LogicalPlan::project(self.plan(input)?, attributes).context("in project")
            }
            RelationExpression::Rename { renaming, input } => {
                let input = self.plan(input)?;
                match renaming {
                    Renaming::Relation(name) => Ok(LogicalPlan::rename_relation(input, name)),
                    Renaming::Attributes(renames) => {
                        LogicalPlan::rename_attributes(input, renames).context("in rename")
                    }
                }
            }
            RelationExpression::SetOperation {
                operator,
                left,
                right,
            } => LogicalPlan::set_operation(*operator, self.plan(left)?, self.plan(right)?)
                .with_context(|| format!("in {}", operator)),
            RelationExpression::Product { left, right } => {
                Ok(LogicalPlan::product(self.plan(left)?, self.plan(right)?))
            }
            RelationExpression::Join {
                condition,
                left,
                right,
            } => {
                let left = self.plan(left)?;
                let right = self.plan(right)?;
                match condition {
                    None => LogicalPlan::natural_join(left, right).context("in natural join"),
                    Some(condition) => LogicalPlan::theta_join(left, right, condition.clone())
                        .with_context(|| format!("in join[{}]", condition)),
                }
            }
        }
    }

    /// Rewrite (when enabled) and choose physical operators
    pub fn physical(&self, plan: LogicalPlan) -> Result<PhysicalPlan> {
        physical_plan(plan, self.config)
    }

    /// Plan and evaluate an expression
    pub fn execute(&self, expression: &RelationExpression) -> Result<Relation> {
        let plan = self.plan(expression)?;
        evaluate(plan, self.config)
    }
}

fn physical_plan(plan: LogicalPlan, config: &EngineConfig) -> Result<PhysicalPlan> {
    let plan = if config.optimize {
        let optimized = optimize(plan);
        debug!("optimized plan:\n{}", optimized);
        optimized
    } else {
        plan
    };
    let physical = PhysicalPlan::from_logical(&plan, config.join_strategy)?;
    debug!("physical plan:\n{}", physical);
    Ok(physical)
}

/// Evaluate a validated logical plan to a relation
pub fn evaluate(plan: LogicalPlan, config: &EngineConfig) -> Result<Relation> {
    collect(physical_plan(plan, config)?.into_executor()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::DataType;
    use crate::algebra::parse_query;
    use crate::catalog::{CatalogError, RelationDefinition};
    use crate::config::JoinStrategy;
    use crate::tuple;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .create_relation(RelationDefinition {
                name: "Employee".to_string(),
                attributes: vec![
                    ("id".to_string(), DataType::Int32),
                    ("name".to_string(), DataType::Varchar),
                    ("manager".to_string(), DataType::Int32),
                ],
                primary_key: Some(vec!["id".to_string()]),
                foreign_keys: vec![],
            })
            .unwrap();
        catalog
            .insert(
                "Employee",
                vec![
                    tuple![1, "Ada", 1],
                    tuple![2, "Brian", 1],
                    tuple![3, "Cleo", 2],
                ],
            )
            .unwrap();
        catalog
    }

    fn run(text: &str, config: &EngineConfig) -> Result<Relation> {
        let catalog = catalog();
        Planner::new(&catalog, config).execute(&parse_query(text)?)
    }

    #[test]
    fn test_self_join_with_rename() -> Result<()> {
        let query = "project[E.name, M.name](rename[E](Employee) join[E.manager = M.id] rename[M](Employee))";
        for strategy in [
            JoinStrategy::Auto,
            JoinStrategy::NestedLoop,
            JoinStrategy::Hash,
            JoinStrategy::SortMerge,
        ] {
            for optimize in [true, false] {
                let config = EngineConfig::default()
                    .with_join_strategy(strategy)
                    .with_optimize(optimize);
                let result = run(query, &config)?;
                assert_eq!(result.len(), 3);
                assert!(result.contains(&tuple!["Cleo", "Brian"]));
                assert!(result.contains(&tuple!["Ada", "Ada"]));
            }
        }
        Ok(())
    }

    #[test]
    fn test_unknown_relation() {
        let err = run("Nope", &EngineConfig::default()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CatalogError>(),
            Some(&CatalogError::UnknownRelation("Nope".to_string()))
        );
    }

    #[test]
    fn test_plan_snapshots_relations() -> Result<()> {
        let mut catalog = catalog();
        let config = EngineConfig::default();
        let plan = Planner::new(&catalog, &config).plan(&parse_query("Employee")?)?;
        catalog.insert("Employee", vec![tuple![4, "Dev", 1]])?;

        let result = evaluate(plan, &config)?;
        assert_eq!(result.len(), 3);
        assert_eq!(catalog.relation("Employee")?.len(), 4);
        Ok(())
    }

    #[test]
    fn test_physical_respects_optimize_flag() -> Result<()> {
        let catalog = catalog();
        let expression = parse_query("select[E.id = M.manager](rename[E](Employee) times rename[M](Employee))")?;

        let config = EngineConfig::default();
        let planner = Planner::new(&catalog, &config);
        let physical = planner.physical(planner.plan(&expression)?)?;
        assert!(matches!(physical, PhysicalPlan::HashJoin { .. }));

        let config = EngineConfig::default().with_optimize(false);
        let planner = Planner::new(&catalog, &config);
        let physical = planner.physical(planner.plan(&expression)?)?;
        assert!(matches!(physical, PhysicalPlan::Filter { .. }));

        let result = planner.execute(&expression)?;
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|t| t.get(0) == t.get(5)));
        Ok(())
    }
}

use crate::access::{Tuple, Value};
use crate::algebra::{Parser, RelationExpression, Statement};
use crate::catalog::{Catalog, Schema};
use crate::config::EngineConfig;
use crate::expression::{
    evaluate_expression, evaluate_predicate, validate_filter_predicate, Expression, TypeChecker,
};
use crate::planner::{evaluate, Planner};
use crate::relation::Relation;
use crate::snapshot;
use anyhow::{bail, Context, Result};
use log::debug;
use parking_lot::RwLock;
use std::fmt;
use std::path::Path;

/// High-level interface: a relation store plus the engine that evaluates
/// scripts against it
pub struct Database {
    catalog: RwLock<Catalog>,
    config: EngineConfig,
}

/// What a statement did
#[derive(Debug, Clone, PartialEq)]
pub enum StatementOutcome {
    Created(String),
    Dropped(String),
    Inserted { relation: String, count: usize },
    Deleted { relation: String, count: usize },
    Updated { relation: String, count: usize },
    Defined { name: String, tuples: usize },
    Plan(String),
    Relation {
        relation: Relation,
        plan: Option<String>,
    },
}

impl fmt::Display for StatementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementOutcome::Created(name) => write!(f, "CREATE RELATION {}", name),
            StatementOutcome::Dropped(name) => write!(f, "DROP RELATION {}", name),
            StatementOutcome::Inserted { relation, count } => {
                write!(f, "INSERT {} INTO {}", count, relation)
            }
            StatementOutcome::Deleted { relation, count } => {
                write!(f, "DELETE {} FROM {}", count, relation)
            }
            StatementOutcome::Updated { relation, count } => {
                write!(f, "UPDATE {} IN {}", count, relation)
            }
            StatementOutcome::Defined { name, tuples } => {
                write!(f, "LET {} ({} tuples)", name, tuples)
            }
            StatementOutcome::Plan(plan) => write!(f, "{}", plan),
            StatementOutcome::Relation { relation, plan } => {
                if let Some(plan) = plan {
                    writeln!(f, "{}", plan)?;
                }
                write!(f, "{}", relation)
            }
        }
    }
}

impl Database {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_catalog(Catalog::new(), config)
    }

    pub fn with_catalog(catalog: Catalog, config: EngineConfig) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            config,
        }
    }

    /// Open a store saved with [`Database::save_snapshot`]
    pub fn open(path: &Path, config: EngineConfig) -> Result<Self> {
        Ok(Self::with_catalog(snapshot::load(path)?, config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse a script with this database's grouping rules
    pub fn parse(&self, script: &str) -> Result<Vec<Statement>> {
        let statements = Parser::new(script)?
            .with_strict_grouping(self.config.strict_grouping)
            .parse_script()?;
        Ok(statements)
    }

    /// Run a script. The whole script is parsed before anything runs;
    /// statements then run in order and the first failure stops the script.
    /// Statements before the failure stay applied.
    pub fn execute(&self, script: &str) -> Result<Vec<StatementOutcome>> {
        let statements = self.parse(script)?;
        let mut outcomes = Vec::with_capacity(statements.len());
        for (i, statement) in statements.iter().enumerate() {
            let outcome = self
                .execute_statement(statement)
                .with_context(|| format!("statement {} failed", i + 1))?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Evaluate a single algebra expression
    pub fn query(&self, text: &str) -> Result<Relation> {
        let expression = Parser::new(text)?
            .with_strict_grouping(self.config.strict_grouping)
            .parse_query()?;
        self.evaluate(&expression)
    }

    /// Physical plan of a single algebra expression
    pub fn explain(&self, text: &str) -> Result<String> {
        let expression = Parser::new(text)?
            .with_strict_grouping(self.config.strict_grouping)
            .parse_query()?;
        self.plan_text(&expression)
    }

    /// Current contents of a stored relation
    pub fn relation(&self, name: &str) -> Result<Relation> {
        Ok((*self.catalog.read().relation(name)?).clone())
    }

    pub fn relation_names(&self) -> Vec<String> {
        self.catalog.read().relation_names()
    }

    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        snapshot::save(&self.catalog.read(), path)
    }

    /// Replace the whole store with a saved one
    pub fn load_snapshot(&self, path: &Path) -> Result<()> {
        let catalog = snapshot::load(path)?;
        *self.catalog.write() = catalog;
        Ok(())
    }

    pub fn execute_statement(&self, statement: &Statement) -> Result<StatementOutcome> {
        match statement {
            Statement::CreateRelation(definition) => {
                let name = definition.name.clone();
                self.catalog.write().create_relation(definition.clone())?;
                Ok(StatementOutcome::Created(name))
            }
            Statement::DropRelation(name) => {
                self.catalog.write().drop_relation(name)?;
                Ok(StatementOutcome::Dropped(name.clone()))
            }
            Statement::Insert { relation, rows } => {
                let tuples = rows
                    .iter()
                    .map(|row| constant_tuple(row))
                    .collect::<Result<Vec<_>>>()
                    .with_context(|| format!("in INSERT INTO {}", relation))?;
                let count = self.catalog.write().insert(relation, tuples)?;
                Ok(StatementOutcome::Inserted {
                    relation: relation.clone(),
                    count,
                })
            }
            Statement::Delete {
                relation,
                predicate,
            } => {
                let mut catalog = self.catalog.write();
                let schema = catalog.relation(relation)?.schema().clone();
                let predicate = bind_predicate(predicate.as_ref(), &schema)?;
                let count = catalog.delete_where(relation, |tuple| {
                    Ok(evaluate_predicate(&predicate, tuple.values())?)
                })?;
                Ok(StatementOutcome::Deleted {
                    relation: relation.clone(),
                    count,
                })
            }
            Statement::Update {
                relation,
                assignments,
                predicate,
            } => {
                let mut catalog = self.catalog.write();
                let schema = catalog.relation(relation)?.schema().clone();
                let predicate = bind_predicate(predicate.as_ref(), &schema)?;
                let assignments = bind_assignments(assignments, &schema)?;
                let count = catalog.update_where(relation, |tuple| {
                    if !evaluate_predicate(&predicate, tuple.values())? {
                        return Ok(None);
                    }
                    let mut values = tuple.values().to_vec();
                    for (index, expression) in &assignments {
                        values[*index] = evaluate_expression(expression, tuple.values())?;
                    }
                    Ok(Some(Tuple::new(values)))
                })?;
                Ok(StatementOutcome::Updated {
                    relation: relation.clone(),
                    count,
                })
            }
            Statement::Let { name, expression } => {
                let relation = self.evaluate(expression)?;
                let tuples = relation.len();
                self.catalog.write().define_derived(name, relation)?;
                Ok(StatementOutcome::Defined {
                    name: name.clone(),
                    tuples,
                })
            }
            Statement::Explain(expression) => {
                Ok(StatementOutcome::Plan(self.plan_text(expression)?))
            }
            Statement::Query(expression) => {
                let plan = if self.config.explain {
                    Some(self.plan_text(expression)?)
                } else {
                    None
                };
                Ok(StatementOutcome::Relation {
                    relation: self.evaluate(expression)?,
                    plan,
                })
            }
        }
    }

    /// Plan under the read lock, then evaluate the snapshot without it
    fn evaluate(&self, expression: &RelationExpression) -> Result<Relation> {
        let plan = {
            let catalog = self.catalog.read();
            Planner::new(&catalog, &self.config).plan(expression)?
        };
        evaluate(plan, &self.config)
    }

    fn plan_text(&self, expression: &RelationExpression) -> Result<String> {
        let catalog = self.catalog.read();
        let planner = Planner::new(&catalog, &self.config);
        let physical = planner.physical(planner.plan(expression)?)?;
        Ok(physical.explain())
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn constant_tuple(row: &[Expression]) -> Result<Tuple> {
    let mut values: Vec<Value> = Vec::with_capacity(row.len());
    for expression in row {
        if !expression.is_constant() {
            bail!("INSERT values must be constants, got {}", expression);
        }
        values.push(evaluate_expression(expression, &[])?);
    }
    Ok(Tuple::new(values))
}

/// Bind and type check a WHERE clause; none means every tuple
fn bind_predicate(predicate: Option<&Expression>, schema: &Schema) -> Result<Expression> {
    let Some(predicate) = predicate else {
        return Ok(Expression::literal(true));
    };
    let bound = predicate.bind(schema)?;
    validate_filter_predicate(&bound, &schema.data_types())
        .with_context(|| format!("in WHERE {}", predicate))?;
    Ok(bound)
}

fn bind_assignments(
    assignments: &[(String, Expression)],
    schema: &Schema,
) -> Result<Vec<(usize, Expression)>> {
    let data_types = schema.data_types();
    let checker = TypeChecker::new(&data_types);
    let mut bound = Vec::with_capacity(assignments.len());
    for (attribute, expression) in assignments {
        let index = schema.resolve(None, attribute)?;
        if bound.iter().any(|(i, _)| *i == index) {
            bail!("Attribute {} assigned more than once", attribute);
        }
        let expression = expression.bind(schema)?;
        checker.check_assignment(
            &expression,
            data_types[index],
            &format!("assignment to {}", attribute),
        )?;
        debug!("SET {} = {}", attribute, expression);
        bound.push((index, expression));
    }
    Ok(bound)
}

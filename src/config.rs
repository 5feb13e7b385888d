//! Engine configuration.

use clap::ValueEnum;
use std::fmt;

/// Algorithm used for joins with equality keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum JoinStrategy {
    /// Hash join when equality keys exist, nested loop otherwise
    #[default]
    Auto,
    NestedLoop,
    Hash,
    SortMerge,
}

impl fmt::Display for JoinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JoinStrategy::Auto => "auto",
            JoinStrategy::NestedLoop => "nested-loop",
            JoinStrategy::Hash => "hash",
            JoinStrategy::SortMerge => "sort-merge",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub join_strategy: JoinStrategy,
    /// Apply algebraic rewrites before execution
    pub optimize: bool,
    /// Reject `AND`/`OR` mixed at one level without parentheses
    pub strict_grouping: bool,
    /// Attach the physical plan to every query result
    pub explain: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            join_strategy: JoinStrategy::Auto,
            optimize: true,
            strict_grouping: false,
            explain: false,
        }
    }
}

impl EngineConfig {
    pub fn with_join_strategy(mut self, join_strategy: JoinStrategy) -> Self {
        self.join_strategy = join_strategy;
        self
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_strict_grouping(mut self, strict_grouping: bool) -> Self {
        self.strict_grouping = strict_grouping;
        self
    }

    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }
}

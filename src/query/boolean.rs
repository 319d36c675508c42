//! Boolean query implementation for combining multiple queries.

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::index::IndexGeneration;
use crate::query::matcher::{self, MatchList};
use crate::query::query::Query;

/// How the children of a boolean query combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    /// Every child must match.
    And,
    /// At least one child must match.
    Or,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And => write!(f, "AND"),
            Operator::Or => write!(f, "OR"),
        }
    }
}

/// A query combining child queries with one operator.
///
/// A document's score is the sum of the scores of the children it matches.
/// A boolean query without children matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanQuery {
    operator: Operator,
    children: Vec<Query>,
}

impl BooleanQuery {
    /// Create a new boolean query.
    pub fn new(operator: Operator, children: Vec<Query>) -> Self {
        BooleanQuery { operator, children }
    }

    /// A query matching nothing.
    pub fn empty() -> Self {
        BooleanQuery::new(Operator::Or, Vec::new())
    }

    /// Conjunction of the given queries.
    pub fn and(children: Vec<Query>) -> Self {
        BooleanQuery::new(Operator::And, children)
    }

    /// Disjunction of the given queries.
    pub fn or(children: Vec<Query>) -> Self {
        BooleanQuery::new(Operator::Or, children)
    }

    /// Add a child.
    pub fn push(&mut self, child: Query) {
        self.children.push(child);
    }

    /// Get the operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Get the children.
    pub fn children(&self) -> &[Query] {
        &self.children
    }

    /// Whether there are no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Evaluate the children and combine their matches.
    pub fn execute(&self, generation: &IndexGeneration) -> Result<MatchList> {
        let mut lists = Vec::with_capacity(self.children.len());
        for child in &self.children {
            let list = child.execute(generation)?;
            if list.is_empty() && self.operator == Operator::And {
                return Ok(Vec::new());
            }
            lists.push(list);
        }

        Ok(match self.operator {
            Operator::And => matcher::intersect(lists),
            Operator::Or => matcher::union(lists),
        })
    }
}

impl fmt::Display for BooleanQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = format!(" {} ", self.operator);
        let parts: Vec<String> = self.children.iter().map(ToString::to_string).collect();
        write!(f, "({})", parts.join(&separator))
    }
}

//! Scoped mapping from query sources to the SQL expressions standing for them.

use std::collections::HashMap;

use crate::query_model::QuerySourceRef;
use crate::sql_statement::SqlExpr;

/// One scope of source mappings with an optional read-only parent.
///
/// A nested query gets a child context: it sees every source of the enclosing levels,
/// while its own mappings stay invisible to them. The parent is borrowed immutably,
/// so it cannot change while a child exists.
#[derive(Debug, Default)]
pub struct SqlPreparationContext<'a> {
    parent: Option<&'a SqlPreparationContext<'a>>,
    mappings: HashMap<QuerySourceRef, SqlExpr>,
}

impl<'a> SqlPreparationContext<'a> {
    pub fn new(parent: Option<&'a SqlPreparationContext<'a>>) -> Self {
        SqlPreparationContext {
            parent,
            mappings: HashMap::new(),
        }
    }

    pub fn root() -> Self {
        Self::new(None)
    }

    pub fn child(parent: &'a SqlPreparationContext<'a>) -> Self {
        Self::new(Some(parent))
    }

    pub fn add_mapping(&mut self, source: QuerySourceRef, expression: SqlExpr) {
        self.mappings.insert(source, expression);
    }

    pub fn get_mapping(&self, source: &QuerySourceRef) -> Option<&SqlExpr> {
        self.mappings
            .get(source)
            .or_else(|| self.parent.and_then(|parent| parent.get_mapping(source)))
    }

    pub fn is_outermost(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of enclosing contexts.
    pub fn depth(&self) -> usize {
        self.parent.map_or(0, |parent| parent.depth() + 1)
    }
}

use std::collections::HashMap;

use crate::sql_statement::sql_table::find_join_container;
use crate::sql_statement::{JoinedTables, SqlEntity, SqlExpr, SqlTable, TableKey};

/// State shared by all levels of one resolution run.
///
/// Each statement being resolved owns a scope holding its already-resolved tables, so
/// that navigations found in nested statements can add their joins to the table the
/// navigation starts from, at whatever level it lives.
#[derive(Debug, Default)]
pub struct MappingResolutionContext {
    scopes: Vec<Vec<SqlTable>>,
    table_expressions: HashMap<TableKey, SqlExpr>,
    join_entities: HashMap<TableKey, SqlEntity>,
    join_conditions: HashMap<TableKey, SqlExpr>,
}

impl MappingResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Vec::new());
    }

    pub fn pop_scope(&mut self) -> Vec<SqlTable> {
        self.scopes.pop().unwrap_or_default()
    }

    /// Adds a table to the innermost scope.
    pub fn add_table(&mut self, table: SqlTable) {
        match self.scopes.last_mut() {
            Some(scope) => scope.push(table),
            None => self.scopes.push(vec![table]),
        }
    }

    pub fn add_table_expression(&mut self, key: TableKey, expression: SqlExpr) {
        self.table_expressions.insert(key, expression);
    }

    pub fn get_table_expression(&self, key: TableKey) -> Option<&SqlExpr> {
        self.table_expressions.get(&key)
    }

    pub fn add_join_entity(&mut self, key: TableKey, entity: SqlEntity) {
        self.join_entities.insert(key, entity);
    }

    pub fn get_join_entity(&self, key: TableKey) -> Option<&SqlEntity> {
        self.join_entities.get(&key)
    }

    pub fn add_join_condition(&mut self, key: TableKey, condition: SqlExpr) {
        self.join_conditions.insert(key, condition);
    }

    pub fn get_join_condition(&self, key: TableKey) -> Option<&SqlExpr> {
        self.join_conditions.get(&key)
    }

    /// Join map of the table aliased `alias`, searching the innermost scope first.
    pub fn find_join_container(&mut self, alias: &str) -> Option<&mut JoinedTables> {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(container) = find_join_container(scope, alias) {
                return Some(container);
            }
        }
        None
    }

    pub fn find_table_mut(&mut self, key: TableKey) -> Option<&mut SqlTable> {
        self.scopes
            .iter_mut()
            .rev()
            .flat_map(|scope| scope.iter_mut())
            .find(|table| table.key == key)
    }
}

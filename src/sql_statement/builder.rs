use crate::query_model::{BinaryOperator, StreamedDataInfo};

use super::errors::StatementBuildError;
use super::sql_expr::{SqlExpr, SqlOrdering};
use super::sql_table::SqlTable;
use super::{SetOperationCombinedStatement, SqlStatement};

/// Mutable form of a [`SqlStatement`], owned by whoever is shaping one query level.
#[derive(Debug, Clone, Default)]
pub struct SqlStatementBuilder {
    pub data_info: Option<StreamedDataInfo>,
    pub select_projection: Option<SqlExpr>,
    pub tables: Vec<SqlTable>,
    pub where_condition: Option<SqlExpr>,
    pub group_by: Option<SqlExpr>,
    pub orderings: Vec<SqlOrdering>,
    pub top: Option<SqlExpr>,
    pub is_distinct: bool,
    pub set_operation_combined: Vec<SetOperationCombinedStatement>,
    /// Row-number column and offset left behind by a Skip, consumed by a following Take.
    pub row_number_selector: Option<SqlExpr>,
    pub current_row_number_offset: Option<SqlExpr>,
}

impl SqlStatementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_statement(statement: SqlStatement) -> Self {
        SqlStatementBuilder {
            data_info: Some(statement.data_info),
            select_projection: Some(statement.select_projection),
            tables: statement.tables,
            where_condition: statement.where_condition,
            group_by: statement.group_by,
            orderings: statement.orderings,
            top: statement.top,
            is_distinct: statement.is_distinct,
            set_operation_combined: statement.set_operation_combined,
            row_number_selector: None,
            current_row_number_offset: None,
        }
    }

    /// AND-combines `condition` with the existing where condition, left-associatively.
    pub fn add_where_condition(&mut self, condition: SqlExpr) {
        self.where_condition = Some(match self.where_condition.take() {
            Some(existing) => SqlExpr::binary(BinaryOperator::AndAlso, existing, condition),
            None => condition,
        });
    }

    pub fn has_set_operations(&self) -> bool {
        !self.set_operation_combined.is_empty()
    }

    pub fn build(self) -> Result<SqlStatement, StatementBuildError> {
        let select_projection = self
            .select_projection
            .ok_or(StatementBuildError::MissingSelectProjection)?;
        let data_info = self.data_info.ok_or(StatementBuildError::MissingDataInfo)?;
        Ok(SqlStatement {
            data_info,
            select_projection,
            tables: self.tables,
            where_condition: self.where_condition,
            group_by: self.group_by,
            orderings: self.orderings,
            top: self.top,
            is_distinct: self.is_distinct,
            set_operation_combined: self.set_operation_combined,
        })
    }

    /// Freezes the current statement and leaves an empty builder behind.
    pub fn get_statement_and_reset_builder(&mut self) -> Result<SqlStatement, StatementBuildError> {
        std::mem::take(self).build()
    }
}

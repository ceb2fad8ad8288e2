//! The SQL statement model shared by all three compiler stages.
//!
//! A [`SqlStatement`] is one relational query level. It is immutable; stages that
//! need to change one go through [`SqlStatementBuilder`] and freeze the result again.

pub mod builder;
pub mod entity;
pub mod errors;
pub mod sql_expr;
pub mod sql_table;
pub mod visitors;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query_model::StreamedDataInfo;

pub use builder::SqlStatementBuilder;
pub use entity::{EntityKind, IdentitySelector, SqlEntity};
pub use errors::StatementBuildError;
pub use sql_expr::{
    AggregationKind, CaseWhen, ColumnKind, SqlColumn, SqlEntityConstant, SqlEntityRefMember,
    SqlExpr, SqlGroupingSelect, SqlLiteral, SqlOrdering, SqlTableReference, DEFAULT_VALUE_NAME,
};
pub use sql_table::{
    Cardinality, JoinInfo, JoinSemantics, JoinedTables, ResolvedJoinInfo,
    ResolvedSimpleTableInfo, ResolvedSubStatementTableInfo, SqlJoinedTable, SqlTable, TableInfo,
    TableKey, UnresolvedCollectionJoinInfo, UnresolvedJoinInfo,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetOperation {
    Union,
    UnionAll,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetOperationCombinedStatement {
    pub statement: SqlStatement,
    pub operation: SetOperation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    data_info: StreamedDataInfo,
    select_projection: SqlExpr,
    tables: Vec<SqlTable>,
    where_condition: Option<SqlExpr>,
    group_by: Option<SqlExpr>,
    orderings: Vec<SqlOrdering>,
    top: Option<SqlExpr>,
    is_distinct: bool,
    set_operation_combined: Vec<SetOperationCombinedStatement>,
}

impl SqlStatement {
    pub fn data_info(&self) -> &StreamedDataInfo {
        &self.data_info
    }

    pub fn select_projection(&self) -> &SqlExpr {
        &self.select_projection
    }

    pub fn tables(&self) -> &[SqlTable] {
        &self.tables
    }

    pub fn where_condition(&self) -> Option<&SqlExpr> {
        self.where_condition.as_ref()
    }

    pub fn group_by(&self) -> Option<&SqlExpr> {
        self.group_by.as_ref()
    }

    pub fn orderings(&self) -> &[SqlOrdering] {
        &self.orderings
    }

    pub fn top(&self) -> Option<&SqlExpr> {
        self.top.as_ref()
    }

    pub fn is_distinct(&self) -> bool {
        self.is_distinct
    }

    pub fn set_operation_combined(&self) -> &[SetOperationCombinedStatement] {
        &self.set_operation_combined
    }

    /// Projection, where, group by, ordering and top expressions of this level only.
    pub fn direct_expressions(&self) -> Vec<&SqlExpr> {
        let mut expressions = vec![&self.select_projection];
        expressions.extend(self.where_condition.as_ref());
        expressions.extend(self.group_by.as_ref());
        expressions.extend(self.orderings.iter().map(|ordering| &ordering.expression));
        expressions.extend(self.top.as_ref());
        expressions
    }
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if self.is_distinct {
            write!(f, "DISTINCT ")?;
        }
        if let Some(top) = &self.top {
            write!(f, "TOP ({}) ", top)?;
        }
        write!(f, "{}", self.select_projection)?;
        if !self.tables.is_empty() {
            write!(f, " FROM ")?;
            for (i, table) in self.tables.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                match table.table_alias() {
                    Some(alias) => write!(f, "[{}]", alias)?,
                    None => write!(f, "{}", table.key)?,
                }
            }
        }
        if let Some(condition) = &self.where_condition {
            write!(f, " WHERE {}", condition)?;
        }
        if let Some(group_by) = &self.group_by {
            write!(f, " GROUP BY {}", group_by)?;
        }
        if !self.orderings.is_empty() {
            write!(f, " ORDER BY ")?;
            for (i, ordering) in self.orderings.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{} {:?}", ordering.expression, ordering.direction)?;
            }
        }
        Ok(())
    }
}

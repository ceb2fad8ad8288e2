//! Tables of a statement's FROM clause and the join trees hanging off them.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::query_model::{DataType, MemberInfo};

use super::entity::SqlEntity;
use super::sql_expr::SqlExpr;
use super::SqlStatement;

/// Identity of a table within one compilation; table references point at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableKey(pub usize);

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinSemantics {
    Inner,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSimpleTableInfo {
    pub item_type: DataType,
    pub table_name: String,
    pub table_alias: String,
}

impl ResolvedSimpleTableInfo {
    pub fn new(
        item_type: DataType,
        table_name: impl Into<String>,
        table_alias: impl Into<String>,
    ) -> Self {
        ResolvedSimpleTableInfo {
            item_type,
            table_name: table_name.into(),
            table_alias: table_alias.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSubStatementTableInfo {
    pub table_alias: String,
    pub statement: Box<SqlStatement>,
}

/// A from clause over a collection-valued member, e.g. `from a in c.Assistants`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedCollectionJoinInfo {
    pub source: Box<SqlExpr>,
    pub member: MemberInfo,
}

impl UnresolvedCollectionJoinInfo {
    pub fn item_type(&self) -> DataType {
        self.member
            .ty
            .element_type()
            .cloned()
            .unwrap_or(DataType::Object)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableInfo {
    Unresolved {
        item_type: DataType,
    },
    UnresolvedCollectionJoin(UnresolvedCollectionJoinInfo),
    /// `from x in g` where `g` is a group produced by a grouped sub-statement table.
    UnresolvedGroupReference {
        referenced_table: TableKey,
        item_type: DataType,
    },
    ResolvedSimple(ResolvedSimpleTableInfo),
    ResolvedSubStatement(ResolvedSubStatementTableInfo),
}

impl TableInfo {
    pub fn item_type(&self) -> DataType {
        match self {
            TableInfo::Unresolved { item_type } => item_type.clone(),
            TableInfo::UnresolvedCollectionJoin(info) => info.item_type(),
            TableInfo::UnresolvedGroupReference { item_type, .. } => item_type.clone(),
            TableInfo::ResolvedSimple(info) => info.item_type.clone(),
            TableInfo::ResolvedSubStatement(info) => info.statement.data_info().item_type().clone(),
        }
    }

    pub fn table_alias(&self) -> Option<&str> {
        match self {
            TableInfo::ResolvedSimple(info) => Some(&info.table_alias),
            TableInfo::ResolvedSubStatement(info) => Some(&info.table_alias),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    One,
    Many,
}

/// Navigation from an entity over one of its members.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedJoinInfo {
    pub origin: SqlEntity,
    pub member: MemberInfo,
    pub cardinality: Cardinality,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedJoinInfo {
    pub foreign_table: ResolvedSimpleTableInfo,
    pub join_condition: SqlExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinInfo {
    UnresolvedMember(UnresolvedJoinInfo),
    UnresolvedCollection(UnresolvedCollectionJoinInfo),
    Resolved(ResolvedJoinInfo),
}

pub type JoinedTables = IndexMap<String, SqlJoinedTable>;

#[derive(Debug, Clone, PartialEq)]
pub struct SqlJoinedTable {
    pub key: TableKey,
    pub join_semantics: JoinSemantics,
    pub join_info: JoinInfo,
    pub joined_tables: JoinedTables,
}

impl SqlJoinedTable {
    pub fn new(key: TableKey, join_semantics: JoinSemantics, join_info: JoinInfo) -> Self {
        SqlJoinedTable {
            key,
            join_semantics,
            join_info,
            joined_tables: IndexMap::new(),
        }
    }

    pub fn table_alias(&self) -> Option<&str> {
        match &self.join_info {
            JoinInfo::Resolved(info) => Some(&info.foreign_table.table_alias),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlTable {
    pub key: TableKey,
    pub join_semantics: JoinSemantics,
    pub table_info: TableInfo,
    /// Joins keyed by the navigated member, in creation order.
    pub joined_tables: JoinedTables,
}

impl SqlTable {
    pub fn new(key: TableKey, table_info: TableInfo, join_semantics: JoinSemantics) -> Self {
        SqlTable {
            key,
            join_semantics,
            table_info,
            joined_tables: IndexMap::new(),
        }
    }

    pub fn item_type(&self) -> DataType {
        self.table_info.item_type()
    }

    pub fn table_alias(&self) -> Option<&str> {
        self.table_info.table_alias()
    }

    /// Returns the joined table for `member_key`, creating it with `create` on first use.
    /// Navigating the same member twice therefore yields one join.
    pub fn get_or_add_left_join(
        &mut self,
        member_key: &str,
        create: impl FnOnce() -> SqlJoinedTable,
    ) -> &mut SqlJoinedTable {
        self.joined_tables
            .entry(member_key.to_string())
            .or_insert_with(create)
    }
}

fn find_in_joins<'a>(joins: &'a mut JoinedTables, alias: &str) -> Option<&'a mut JoinedTables> {
    for joined in joins.values_mut() {
        if joined.table_alias() == Some(alias) {
            return Some(&mut joined.joined_tables);
        }
        if let Some(found) = find_in_joins(&mut joined.joined_tables, alias) {
            return Some(found);
        }
    }
    None
}

/// Finds the join map of the table (or joined table) with the given alias.
pub fn find_join_container<'a>(
    tables: &'a mut [SqlTable],
    alias: &str,
) -> Option<&'a mut JoinedTables> {
    for table in tables.iter_mut() {
        if table.table_alias() == Some(alias) {
            return Some(&mut table.joined_tables);
        }
        if let Some(found) = find_in_joins(&mut table.joined_tables, alias) {
            return Some(found);
        }
    }
    None
}

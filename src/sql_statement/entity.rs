//! Entity expressions: a whole mapped row, represented as its columns plus an identity.

use std::fmt;
use std::sync::Arc;

use crate::query_model::DataType;

use super::sql_expr::{SqlColumn, SqlExpr};

/// Computes the identity of an entity (usually its primary key column).
#[derive(Clone)]
pub struct IdentitySelector(Arc<dyn Fn(&SqlEntity) -> SqlExpr + Send + Sync>);

impl IdentitySelector {
    pub fn new(selector: impl Fn(&SqlEntity) -> SqlExpr + Send + Sync + 'static) -> Self {
        IdentitySelector(Arc::new(selector))
    }

    /// Identity made of the primary-key columns: a single column, or a composite record
    /// when the key spans several columns.
    pub fn primary_key() -> Self {
        IdentitySelector::new(|entity| {
            let key_columns: Vec<&SqlColumn> = entity
                .columns
                .iter()
                .filter(|column| column.is_primary_key)
                .collect();
            let key_columns = if key_columns.is_empty() {
                entity.columns.iter().collect()
            } else {
                key_columns
            };
            match key_columns.as_slice() {
                [single] => SqlExpr::Column((*single).clone()),
                columns => SqlExpr::New {
                    ty: DataType::record(
                        "CompositeKey",
                        columns
                            .iter()
                            .map(|column| (column.column_name.clone(), column.ty.clone()))
                            .collect(),
                    ),
                    members: columns
                        .iter()
                        .map(|column| column.column_name.clone())
                        .collect(),
                    arguments: columns
                        .iter()
                        .map(|column| SqlExpr::Column((*column).clone()))
                        .collect(),
                },
            }
        })
    }

    pub fn select(&self, entity: &SqlEntity) -> SqlExpr {
        (self.0)(entity)
    }
}

impl fmt::Debug for IdentitySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentitySelector({:p})", Arc::as_ptr(&self.0))
    }
}

impl PartialEq for IdentitySelector {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Definition,
    /// An entity selected by a sub-statement, read back through the derived table.
    Reference { referenced_name: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlEntity {
    pub ty: DataType,
    pub table_alias: String,
    pub name: Option<String>,
    /// Primary-key columns first, then the rest in mapping order.
    pub columns: Vec<SqlColumn>,
    pub identity: IdentitySelector,
    pub kind: EntityKind,
}

impl SqlEntity {
    pub fn definition(
        ty: DataType,
        table_alias: impl Into<String>,
        name: Option<String>,
        identity: IdentitySelector,
        mut columns: Vec<SqlColumn>,
    ) -> Self {
        columns.sort_by_key(|column| !column.is_primary_key);
        SqlEntity {
            ty,
            table_alias: table_alias.into(),
            name,
            columns,
            identity,
            kind: EntityKind::Definition,
        }
    }

    /// The entity `referenced` as seen from outside the derived table `table_alias`.
    pub fn reference(table_alias: &str, name: Option<String>, referenced: &SqlEntity) -> Self {
        let columns = referenced
            .columns
            .iter()
            .map(|column| {
                SqlColumn::reference(
                    column.ty.clone(),
                    table_alias,
                    column.column_name.clone(),
                    column.is_primary_key,
                    referenced.name.clone(),
                )
            })
            .collect();
        SqlEntity {
            ty: referenced.ty.clone(),
            table_alias: table_alias.to_string(),
            name,
            columns,
            identity: referenced.identity.clone(),
            kind: EntityKind::Reference {
                referenced_name: referenced.name.clone(),
            },
        }
    }

    /// A column of this entity's table, shaped like the entity's own columns.
    pub fn get_column(&self, ty: DataType, column_name: &str, is_primary_key: bool) -> SqlColumn {
        match &self.kind {
            EntityKind::Definition => {
                SqlColumn::definition(ty, self.table_alias.clone(), column_name, is_primary_key)
            }
            EntityKind::Reference { referenced_name } => SqlColumn::reference(
                ty,
                self.table_alias.clone(),
                column_name,
                is_primary_key,
                referenced_name.clone(),
            ),
        }
    }

    pub fn identity_expression(&self) -> SqlExpr {
        self.identity.select(self)
    }

    pub fn with_name(&self, name: Option<String>) -> SqlEntity {
        SqlEntity {
            name,
            ..self.clone()
        }
    }

    pub fn with_type(&self, ty: DataType) -> SqlEntity {
        SqlEntity { ty, ..self.clone() }
    }

    /// Name under which `column` appears in a select list emitting this entity.
    pub fn output_column_name(&self, column: &SqlColumn) -> String {
        match &self.name {
            Some(name) => format!("{}_{}", name, column.column_name),
            None => column.column_name.clone(),
        }
    }
}

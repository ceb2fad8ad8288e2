//! In-memory projection rebuilding the query's result values from a result row.

use std::collections::HashMap;

use serde::Serialize;

use crate::query_model::{DataType, Value};

use super::errors::ProjectionError;

/// A column of the outermost select list, addressed by output name and position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnId {
    /// Output name, or empty for an unaliased column.
    pub name: String,
    pub position: usize,
}

impl ColumnId {
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        ColumnId {
            name: name.into(),
            position,
        }
    }
}

/// One result row as returned by the database.
pub trait Row {
    fn get_value(&self, column: &ColumnId) -> Result<Value, ProjectionError>;

    /// The entity of type `ty` stored in `columns`.
    fn get_entity(&self, ty: &DataType, columns: &[ColumnId]) -> Result<Value, ProjectionError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ProjectionExpr {
    Value { column: ColumnId, ty: DataType },
    /// A column holding 0/1 presented as a boolean.
    IntToBool(Box<ProjectionExpr>),
    Entity { ty: DataType, columns: Vec<ColumnId> },
    New {
        ty: DataType,
        members: Vec<String>,
        arguments: Vec<ProjectionExpr>,
    },
    /// A value known at compile time, never sent to the database.
    Constant(Value),
}

impl ProjectionExpr {
    pub fn evaluate(&self, row: &dyn Row) -> Result<Value, ProjectionError> {
        match self {
            ProjectionExpr::Value { column, .. } => row.get_value(column),
            ProjectionExpr::IntToBool(inner) => match inner.evaluate(row)? {
                Value::Int32(i) => Ok(Value::Boolean(i != 0)),
                Value::Int64(i) => Ok(Value::Boolean(i != 0)),
                value @ (Value::Boolean(_) | Value::Null) => Ok(value),
                other => Err(ProjectionError::InvalidValue {
                    column: inner.describe(),
                    value: other.to_string(),
                    expected: DataType::Boolean.to_string(),
                }),
            },
            ProjectionExpr::Entity { ty, columns } => row.get_entity(ty, columns),
            ProjectionExpr::New {
                members, arguments, ..
            } => Ok(Value::Record(
                members
                    .iter()
                    .cloned()
                    .zip(arguments)
                    .map(|(member, argument)| Ok((member, argument.evaluate(row)?)))
                    .collect::<Result<_, ProjectionError>>()?,
            )),
            ProjectionExpr::Constant(value) => Ok(value.clone()),
        }
    }

    /// Every column the projection reads, in select-list order.
    pub fn columns(&self) -> Vec<&ColumnId> {
        match self {
            ProjectionExpr::Value { column, .. } => vec![column],
            ProjectionExpr::IntToBool(inner) => inner.columns(),
            ProjectionExpr::Entity { columns, .. } => columns.iter().collect(),
            ProjectionExpr::New { arguments, .. } => {
                arguments.iter().flat_map(|argument| argument.columns()).collect()
            }
            ProjectionExpr::Constant(_) => Vec::new(),
        }
    }

    fn describe(&self) -> String {
        match self.columns().first() {
            Some(column) if !column.name.is_empty() => column.name.clone(),
            Some(column) => format!("#{}", column.position),
            None => "constant".to_string(),
        }
    }
}

/// A row held in memory, keyed by column position; entities come back as
/// [`Value::Entity`] with one field per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryRow {
    values: Vec<Value>,
    names: HashMap<usize, String>,
}

impl InMemoryRow {
    pub fn new(values: Vec<Value>) -> Self {
        InMemoryRow {
            values,
            names: HashMap::new(),
        }
    }

    /// Field names used for entity columns, by position.
    pub fn with_field_names(mut self, names: Vec<(usize, String)>) -> Self {
        self.names.extend(names);
        self
    }
}

impl Row for InMemoryRow {
    fn get_value(&self, column: &ColumnId) -> Result<Value, ProjectionError> {
        self.values
            .get(column.position)
            .cloned()
            .ok_or_else(|| ProjectionError::MissingColumn {
                name: column.name.clone(),
                position: column.position,
            })
    }

    fn get_entity(&self, ty: &DataType, columns: &[ColumnId]) -> Result<Value, ProjectionError> {
        let fields = columns
            .iter()
            .map(|column| {
                let name = self
                    .names
                    .get(&column.position)
                    .cloned()
                    .unwrap_or_else(|| column.name.clone());
                Ok((name, self.get_value(column)?))
            })
            .collect::<Result<Vec<_>, ProjectionError>>()?;
        if fields.iter().all(|(_, value)| value.is_null()) {
            return Ok(Value::Null);
        }
        Ok(Value::Entity {
            type_name: ty.to_string(),
            fields,
        })
    }
}

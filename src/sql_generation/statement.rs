//! Emission of whole statements: select list, FROM and join trees, and the clauses.

use crate::sql_statement::visitors::is_correlated;
use crate::sql_statement::{
    JoinInfo, JoinSemantics, JoinedTables, SetOperation, SqlColumn, SqlEntity, SqlExpr,
    SqlStatement, SqlTable, TableInfo, DEFAULT_VALUE_NAME,
};

use super::command::SqlCommandBuilder;
use super::errors::SqlGenerationError;
use super::expression::{append_column, append_expression, append_orderings, SqlContext};
use super::projection::{ColumnId, ProjectionExpr};

const EMPTY_SELECT_LIST: &str = "NULL AS [Empty]";
const EMPTY_ROW: &str = "(SELECT NULL AS [Empty]) AS [Empty] OUTER APPLY ";

enum SelectItem<'a> {
    Expression {
        expression: &'a SqlExpr,
        alias: Option<String>,
    },
    Column {
        column: &'a SqlColumn,
        alias: Option<String>,
    },
}

fn append_select_items(
    command: &mut SqlCommandBuilder,
    items: &[SelectItem<'_>],
) -> Result<(), SqlGenerationError> {
    if items.is_empty() {
        command.append(EMPTY_SELECT_LIST);
        return Ok(());
    }
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            command.append(",");
        }
        let alias = match item {
            SelectItem::Expression { expression, alias } => {
                append_expression(command, expression, SqlContext::Value)?;
                alias
            }
            SelectItem::Column { column, alias } => {
                append_column(command, column);
                alias
            }
        };
        if let Some(alias) = alias {
            command.append(" AS ").append_identifier(alias);
        }
    }
    Ok(())
}

fn entity_column_alias(entity: &SqlEntity, column: &SqlColumn) -> Option<String> {
    let output_name = entity.output_column_name(column);
    (output_name != column.rendered_name()).then_some(output_name)
}

/// Select items of a nested statement; names were assigned during resolution.
fn collect_inner_select_items<'a>(expression: &'a SqlExpr, items: &mut Vec<SelectItem<'a>>) {
    match expression {
        SqlExpr::Named { name, expression } => match expression.as_ref() {
            nested @ (SqlExpr::Entity(_) | SqlExpr::New { .. } | SqlExpr::GroupingSelect(_)) => {
                collect_inner_select_items(nested, items)
            }
            inner => items.push(SelectItem::Expression {
                expression: inner,
                alias: Some(name.clone().unwrap_or_else(|| DEFAULT_VALUE_NAME.to_string())),
            }),
        },
        SqlExpr::Entity(entity) => {
            for column in &entity.columns {
                items.push(SelectItem::Column {
                    column,
                    alias: entity_column_alias(entity, column),
                });
            }
        }
        SqlExpr::New { arguments, .. } => {
            for argument in arguments {
                collect_inner_select_items(argument, items);
            }
        }
        // The element of a group is only read through aggregates.
        SqlExpr::GroupingSelect(grouping) => {
            collect_inner_select_items(&grouping.key, items);
            for aggregation in &grouping.aggregations {
                collect_inner_select_items(aggregation, items);
            }
        }
        other => items.push(SelectItem::Expression {
            expression: other,
            alias: None,
        }),
    }
}

fn combine_names(outer: Option<&str>, inner: &str) -> String {
    match outer {
        Some(outer) => format!("{}_{}", outer, inner),
        None => inner.to_string(),
    }
}

/// Builds the select items of the outermost statement together with the projection
/// reading them back.
struct OuterSelect<'a> {
    items: Vec<SelectItem<'a>>,
    inline_constants: bool,
}

impl<'a> OuterSelect<'a> {
    fn project(
        &mut self,
        expression: &'a SqlExpr,
        name: Option<String>,
    ) -> Result<ProjectionExpr, SqlGenerationError> {
        match expression {
            SqlExpr::Named {
                name: inner_name,
                expression,
            } => self.project(expression, inner_name.clone().or(name)),
            SqlExpr::GroupingSelect(_) => Err(SqlGenerationError::not_supported(
                expression,
                "groupings cannot be selected by the outermost query",
            )),
            SqlExpr::MemberAccess { member, .. } if member.ty.is_sequence() => {
                Err(SqlGenerationError::not_supported(
                    expression,
                    "Queries selecting collections are not supported",
                ))
            }
            SqlExpr::Entity(entity) => {
                let mut columns = Vec::with_capacity(entity.columns.len());
                for column in &entity.columns {
                    let alias = match &name {
                        Some(name) => Some(combine_names(Some(name), &column.column_name)),
                        None => entity_column_alias(entity, column),
                    };
                    let id = ColumnId::new(
                        alias.clone().unwrap_or_else(|| column.rendered_name()),
                        self.items.len(),
                    );
                    self.items.push(SelectItem::Column { column, alias });
                    columns.push(id);
                }
                Ok(ProjectionExpr::Entity {
                    ty: entity.ty.clone(),
                    columns,
                })
            }
            SqlExpr::New {
                ty,
                members,
                arguments,
            } => {
                let mut projected = Vec::with_capacity(arguments.len());
                for (i, argument) in arguments.iter().enumerate() {
                    let member = members
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| format!("Item{}", i + 1));
                    projected.push(
                        self.project(argument, Some(combine_names(name.as_deref(), &member)))?,
                    );
                }
                Ok(ProjectionExpr::New {
                    ty: ty.clone(),
                    members: members.clone(),
                    arguments: projected,
                })
            }
            SqlExpr::Constant(constant)
                if self.inline_constants && constant.data_type().is_scalar() =>
            {
                Ok(ProjectionExpr::Constant(constant.value().clone()))
            }
            SqlExpr::Literal(literal) if self.inline_constants => {
                Ok(ProjectionExpr::Constant(literal.value.clone()))
            }
            other => {
                let column = ColumnId::new(name.clone().unwrap_or_default(), self.items.len());
                self.items.push(SelectItem::Expression {
                    expression: other,
                    alias: name,
                });
                let ty = other.data_type();
                let value = ProjectionExpr::Value {
                    column,
                    ty: ty.clone(),
                };
                // Booleans come back as bits from columns and as 0/1 from anything else.
                if ty.is_boolean() && !matches!(other, SqlExpr::Column(_)) {
                    Ok(ProjectionExpr::IntToBool(Box::new(value)))
                } else {
                    Ok(value)
                }
            }
        }
    }
}

/// Emits a nested statement.
pub fn append_statement(
    command: &mut SqlCommandBuilder,
    statement: &SqlStatement,
) -> Result<(), SqlGenerationError> {
    append_statement_with(command, statement, |command, statement| {
        let mut items = Vec::new();
        collect_inner_select_items(statement.select_projection(), &mut items);
        append_select_items(command, &items)
    })
}

/// Emits the outermost statement and returns the projection reading its rows.
pub fn append_outermost_statement(
    command: &mut SqlCommandBuilder,
    statement: &SqlStatement,
) -> Result<ProjectionExpr, SqlGenerationError> {
    append_statement_with(command, statement, |command, statement| {
        let mut select = OuterSelect {
            items: Vec::new(),
            // Each branch of a set operation may select a different constant.
            inline_constants: statement.set_operation_combined().is_empty(),
        };
        let projection = select.project(statement.select_projection(), None)?;
        append_select_items(command, &select.items)?;
        Ok(projection)
    })
}

fn append_statement_with<T>(
    command: &mut SqlCommandBuilder,
    statement: &SqlStatement,
    append_select_list: impl FnOnce(
        &mut SqlCommandBuilder,
        &SqlStatement,
    ) -> Result<T, SqlGenerationError>,
) -> Result<T, SqlGenerationError> {
    command.append("SELECT ");
    if statement.is_distinct() {
        command.append("DISTINCT ");
    }
    append_top(command, statement)?;
    let result = append_select_list(command, statement)?;
    append_from(command, statement)?;
    append_where(command, statement)?;
    append_group_by(command, statement)?;
    append_set_operations(command, statement)?;
    append_order_by(command, statement)?;
    Ok(result)
}

pub fn append_top(
    command: &mut SqlCommandBuilder,
    statement: &SqlStatement,
) -> Result<(), SqlGenerationError> {
    if let Some(top) = statement.top() {
        command.append("TOP (");
        append_expression(command, top, SqlContext::Value)?;
        command.append(") ");
    }
    Ok(())
}

pub fn append_from(
    command: &mut SqlCommandBuilder,
    statement: &SqlStatement,
) -> Result<(), SqlGenerationError> {
    if statement.tables().is_empty() {
        return Ok(());
    }
    command.append(" FROM ");
    for (i, table) in statement.tables().iter().enumerate() {
        if i == 0 {
            if table.join_semantics == JoinSemantics::Left {
                command.append(EMPTY_ROW);
            }
        } else {
            command.append(match table.join_semantics {
                JoinSemantics::Left => " OUTER APPLY ",
                JoinSemantics::Inner if is_correlated_sub_statement(table) => " CROSS APPLY ",
                JoinSemantics::Inner => " CROSS JOIN ",
            });
        }
        append_table_source(command, table)?;
        append_joins(command, &table.joined_tables)?;
    }
    Ok(())
}

fn is_correlated_sub_statement(table: &SqlTable) -> bool {
    match &table.table_info {
        TableInfo::ResolvedSubStatement(info) => is_correlated(&info.statement),
        _ => false,
    }
}

fn append_table_source(
    command: &mut SqlCommandBuilder,
    table: &SqlTable,
) -> Result<(), SqlGenerationError> {
    match &table.table_info {
        TableInfo::ResolvedSimple(info) => {
            command
                .append_identifier(&info.table_name)
                .append(" AS ")
                .append_identifier(&info.table_alias);
        }
        TableInfo::ResolvedSubStatement(info) => {
            command.append("(");
            append_statement(command, &info.statement)?;
            command.append(") AS ").append_identifier(&info.table_alias);
        }
        other => {
            return Err(SqlGenerationError::InvalidTableInfo(format!(
                "{:?} of {}",
                other.item_type(),
                table.key
            )))
        }
    }
    Ok(())
}

fn append_joins(
    command: &mut SqlCommandBuilder,
    joins: &JoinedTables,
) -> Result<(), SqlGenerationError> {
    for (member, joined) in joins {
        let info = match &joined.join_info {
            JoinInfo::Resolved(info) => info,
            _ => return Err(SqlGenerationError::InvalidJoinInfo(member.clone())),
        };
        command.append(match joined.join_semantics {
            JoinSemantics::Left => " LEFT OUTER JOIN ",
            JoinSemantics::Inner => " INNER JOIN ",
        });
        command
            .append_identifier(&info.foreign_table.table_name)
            .append(" AS ")
            .append_identifier(&info.foreign_table.table_alias)
            .append(" ON ");
        append_expression(command, &info.join_condition, SqlContext::Predicate)?;
        append_joins(command, &joined.joined_tables)?;
    }
    Ok(())
}

pub fn append_where(
    command: &mut SqlCommandBuilder,
    statement: &SqlStatement,
) -> Result<(), SqlGenerationError> {
    if let Some(condition) = statement.where_condition() {
        command.append(" WHERE ");
        append_expression(command, condition, SqlContext::Predicate)?;
    }
    Ok(())
}

fn flatten_group_key<'a>(expression: &'a SqlExpr, keys: &mut Vec<&'a SqlExpr>) {
    match expression.unwrap_named() {
        SqlExpr::New { arguments, .. } => {
            for argument in arguments {
                flatten_group_key(argument, keys);
            }
        }
        other => keys.push(other),
    }
}

pub fn append_group_by(
    command: &mut SqlCommandBuilder,
    statement: &SqlStatement,
) -> Result<(), SqlGenerationError> {
    let Some(group_by) = statement.group_by() else {
        return Ok(());
    };
    let mut keys = Vec::new();
    flatten_group_key(group_by, &mut keys);

    command.append(" GROUP BY ");
    let mut first = true;
    for key in keys {
        let columns: Vec<&SqlColumn> = match key {
            SqlExpr::Entity(entity) => entity.columns.iter().collect(),
            _ => Vec::new(),
        };
        if columns.is_empty() {
            if !first {
                command.append(", ");
            }
            append_expression(command, key, SqlContext::Value)?;
            first = false;
        }
        for column in columns {
            if !first {
                command.append(", ");
            }
            append_column(command, column);
            first = false;
        }
    }
    Ok(())
}

fn append_set_operations(
    command: &mut SqlCommandBuilder,
    statement: &SqlStatement,
) -> Result<(), SqlGenerationError> {
    for combined in statement.set_operation_combined() {
        command.append(match combined.operation {
            SetOperation::Union => " UNION (",
            SetOperation::UnionAll => " UNION ALL (",
        });
        append_statement(command, &combined.statement)?;
        command.append(")");
    }
    Ok(())
}

pub fn append_order_by(
    command: &mut SqlCommandBuilder,
    statement: &SqlStatement,
) -> Result<(), SqlGenerationError> {
    if statement.orderings().is_empty() {
        return Ok(());
    }
    command.append(" ORDER BY ");
    append_orderings(command, statement.orderings())
}


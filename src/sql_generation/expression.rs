//! Emission of single SQL expressions.
//!
//! SQL distinguishes predicates (usable in WHERE, ON, CASE WHEN) from values (usable in
//! select lists and comparisons); booleans exist only as predicates or as 0/1 integers.
//! Every expression is therefore emitted for a [`SqlContext`], converting between the
//! two forms where the node does not fit.

use crate::query_model::{BinaryOperator, DataType, OrderingDirection, UnaryOperator, Value};
use crate::sql_statement::{SqlColumn, SqlExpr, SqlOrdering};

use super::command::SqlCommandBuilder;
use super::errors::SqlGenerationError;
use super::statement::append_statement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlContext {
    Value,
    Predicate,
}

/// Whether SQL treats the expression as a predicate rather than a value.
pub fn is_predicate(expression: &SqlExpr) -> bool {
    match expression {
        SqlExpr::Named { expression, .. } => is_predicate(expression),
        SqlExpr::Unary {
            operator: UnaryOperator::Convert(_),
            operand,
            ..
        } => is_predicate(operand),
        SqlExpr::Unary {
            operator: UnaryOperator::Not,
            operand,
            ..
        } => operand.data_type().is_boolean(),
        SqlExpr::Binary { operator, ty, .. } => match operator {
            BinaryOperator::AndAlso | BinaryOperator::OrElse => true,
            BinaryOperator::And | BinaryOperator::Or | BinaryOperator::ExclusiveOr => {
                ty.is_boolean()
            }
            operator => operator.is_comparison(),
        },
        SqlExpr::IsNull(_)
        | SqlExpr::IsNotNull(_)
        | SqlExpr::Like { .. }
        | SqlExpr::In { .. }
        | SqlExpr::Exists(_) => true,
        _ => false,
    }
}

pub fn append_expression(
    command: &mut SqlCommandBuilder,
    expression: &SqlExpr,
    context: SqlContext,
) -> Result<(), SqlGenerationError> {
    match expression {
        SqlExpr::Named { expression, .. } => append_expression(command, expression, context),
        SqlExpr::Unary {
            operator: UnaryOperator::Convert(_),
            operand,
            ..
        } => append_expression(command, operand, context),
        _ => match (context, is_predicate(expression)) {
            (SqlContext::Value, true) => {
                command.append("CASE WHEN ");
                append_native(command, expression)?;
                command.append(" THEN 1 ELSE 0 END");
                Ok(())
            }
            (SqlContext::Predicate, false) if expression.data_type().is_boolean() => {
                append_boolean_value_as_predicate(command, expression)
            }
            _ => append_native(command, expression),
        },
    }
}

fn append_boolean_value_as_predicate(
    command: &mut SqlCommandBuilder,
    expression: &SqlExpr,
) -> Result<(), SqlGenerationError> {
    if let SqlExpr::Literal(literal) = expression {
        if let Value::Boolean(value) = literal.value {
            command.append(if value { "(1 = 1)" } else { "(1 = 0)" });
            return Ok(());
        }
    }
    command.append("(");
    append_native(command, expression)?;
    command.append(" = 1)");
    Ok(())
}

fn append_value(command: &mut SqlCommandBuilder, expression: &SqlExpr) -> Result<(), SqlGenerationError> {
    append_expression(command, expression, SqlContext::Value)
}

fn append_predicate(
    command: &mut SqlCommandBuilder,
    expression: &SqlExpr,
) -> Result<(), SqlGenerationError> {
    append_expression(command, expression, SqlContext::Predicate)
}

fn append_values(
    command: &mut SqlCommandBuilder,
    expressions: &[SqlExpr],
) -> Result<(), SqlGenerationError> {
    let mut result = Ok(());
    command.append_separated(", ", expressions, |command, expression| {
        if result.is_ok() {
            result = append_value(command, expression);
        }
    });
    result
}

pub fn append_column(command: &mut SqlCommandBuilder, column: &SqlColumn) {
    command
        .append_identifier(&column.owning_table_alias)
        .append(".")
        .append_identifier(&column.rendered_name());
}

/// Emits `expression` in the form its node naturally has.
fn append_native(
    command: &mut SqlCommandBuilder,
    expression: &SqlExpr,
) -> Result<(), SqlGenerationError> {
    match expression {
        SqlExpr::Constant(constant) => {
            if matches!(constant.value(), Value::List(_)) {
                return Err(SqlGenerationError::not_supported(
                    expression,
                    "list constants can only be used on the right side of IN",
                ));
            }
            let name = command.get_or_add_parameter(constant);
            command.append(&name);
        }
        SqlExpr::Literal(literal) => append_literal(command, &literal.value)?,
        SqlExpr::CustomText { text, .. } => {
            command.append(text);
        }
        SqlExpr::Binary {
            operator,
            left,
            right,
            ty,
        } => append_binary(command, *operator, left, right, ty)?,
        SqlExpr::Unary {
            operator, operand, ..
        } => match operator {
            UnaryOperator::Not if operand.data_type().is_boolean() => {
                command.append("NOT ");
                append_predicate(command, operand)?;
            }
            UnaryOperator::Not => {
                command.append("~");
                append_value(command, operand)?;
            }
            UnaryOperator::Negate => {
                command.append("-");
                append_value(command, operand)?;
            }
            UnaryOperator::UnaryPlus => {
                command.append("+");
                append_value(command, operand)?;
            }
            UnaryOperator::Convert(_) => append_value(command, operand)?,
        },
        SqlExpr::Case {
            whens, else_value, ..
        } => {
            command.append("CASE");
            for case in whens {
                command.append(" WHEN ");
                append_predicate(command, &case.when)?;
                command.append(" THEN ");
                append_value(command, &case.then)?;
            }
            if let Some(value) = else_value {
                command.append(" ELSE ");
                append_value(command, value)?;
            }
            command.append(" END");
        }
        SqlExpr::MemberAccess { member, .. } if member.ty.is_sequence() => {
            return Err(SqlGenerationError::not_supported(
                expression,
                "Queries selecting collections are not supported",
            ))
        }
        SqlExpr::MemberAccess { .. }
        | SqlExpr::TypeIs { .. }
        | SqlExpr::TableReference(_)
        | SqlExpr::EntityRefMember(_)
        | SqlExpr::JoinCondition(_) => {
            return Err(SqlGenerationError::UnresolvedExpression(
                expression.to_string(),
            ))
        }
        SqlExpr::New { .. } | SqlExpr::NewArray { .. } | SqlExpr::GroupingSelect(_) => {
            return Err(SqlGenerationError::not_supported(
                expression,
                "object construction is only supported in the select list",
            ))
        }
        SqlExpr::Entity(_) => {
            return Err(SqlGenerationError::not_supported(
                expression,
                "entities can only be selected, grouped or ordered by",
            ))
        }
        SqlExpr::Column(column) => append_column(command, column),
        SqlExpr::EntityConstant(constant) => append_value(command, &constant.identity)?,
        SqlExpr::Named { expression, .. } => append_native(command, expression)?,
        SqlExpr::SubStatement(statement) => {
            command.append("(");
            append_statement(command, statement)?;
            command.append(")");
        }
        SqlExpr::IsNull(operand) => {
            command.append("(");
            append_value(command, operand)?;
            command.append(" IS NULL)");
        }
        SqlExpr::IsNotNull(operand) => {
            command.append("(");
            append_value(command, operand)?;
            command.append(" IS NOT NULL)");
        }
        SqlExpr::ConvertedBoolean(operand) => append_value(command, operand)?,
        SqlExpr::Function {
            name, arguments, ..
        } => {
            command.append(name).append("(");
            append_values(command, arguments)?;
            command.append(")");
        }
        SqlExpr::Aggregation {
            kind, expression, ..
        } => {
            command.append(kind.sql_name()).append("(");
            match expression {
                Some(operand) => append_value(command, operand)?,
                None => {
                    command.append("*");
                }
            }
            command.append(")");
        }
        SqlExpr::Like {
            expression,
            pattern,
        } => {
            append_value(command, expression)?;
            command.append(" LIKE ");
            append_value(command, pattern)?;
        }
        SqlExpr::In { left, right } => {
            append_value(command, left)?;
            command.append(" IN ");
            append_in_list(command, right)?;
        }
        SqlExpr::Exists(operand) => {
            command.append("EXISTS(");
            match operand.unwrap_named() {
                SqlExpr::SubStatement(statement) => append_statement(command, statement)?,
                other => append_value(command, other)?,
            }
            command.append(")");
        }
        SqlExpr::RowNumber { orderings } => {
            command.append("ROW_NUMBER() OVER (ORDER BY ");
            append_orderings(command, orderings)?;
            command.append(")");
        }
        SqlExpr::SqlConvert { source, ty } => {
            command
                .append("CONVERT(")
                .append(sql_type_name(ty).ok_or_else(|| {
                    SqlGenerationError::not_supported(
                        expression,
                        format!("there is no SQL type for '{}'", ty),
                    )
                })?)
                .append(", ");
            append_value(command, source)?;
            command.append(")");
        }
    }
    Ok(())
}

fn is_null_value(expression: &SqlExpr) -> bool {
    match expression.unwrap_named() {
        SqlExpr::Constant(constant) => constant.value().is_null(),
        SqlExpr::Literal(literal) => literal.value.is_null(),
        _ => false,
    }
}

fn append_binary(
    command: &mut SqlCommandBuilder,
    operator: BinaryOperator,
    left: &SqlExpr,
    right: &SqlExpr,
    ty: &DataType,
) -> Result<(), SqlGenerationError> {
    let function = match operator {
        BinaryOperator::Coalesce => Some("COALESCE"),
        BinaryOperator::Power => Some("POWER"),
        _ => None,
    };
    if let Some(function) = function {
        command.append(function).append("(");
        append_value(command, left)?;
        command.append(", ");
        append_value(command, right)?;
        command.append(")");
        return Ok(());
    }

    if matches!(operator, BinaryOperator::Equal | BinaryOperator::NotEqual) {
        let tested = if is_null_value(right) {
            Some(left)
        } else if is_null_value(left) {
            Some(right)
        } else {
            None
        };
        if let Some(tested) = tested {
            command.append("(");
            append_value(command, tested)?;
            command.append(match operator {
                BinaryOperator::Equal => " IS NULL)",
                _ => " IS NOT NULL)",
            });
            return Ok(());
        }
    }

    let logical = ty.is_boolean()
        && matches!(
            operator,
            BinaryOperator::AndAlso
                | BinaryOperator::OrElse
                | BinaryOperator::And
                | BinaryOperator::Or
                | BinaryOperator::ExclusiveOr
        );
    if logical && operator == BinaryOperator::ExclusiveOr {
        command.append("((");
        append_predicate(command, left)?;
        command.append(" AND NOT ");
        append_predicate(command, right)?;
        command.append(") OR (NOT ");
        append_predicate(command, left)?;
        command.append(" AND ");
        append_predicate(command, right)?;
        command.append("))");
        return Ok(());
    }

    command.append("(");
    if logical {
        append_predicate(command, left)?;
        command.append(match operator {
            BinaryOperator::AndAlso | BinaryOperator::And => " AND ",
            _ => " OR ",
        });
        append_predicate(command, right)?;
    } else {
        append_value(command, left)?;
        command
            .append(" ")
            .append(sql_operator(operator))
            .append(" ");
        append_value(command, right)?;
    }
    command.append(")");
    Ok(())
}

fn sql_operator(operator: BinaryOperator) -> &'static str {
    match operator {
        BinaryOperator::Equal => "=",
        BinaryOperator::NotEqual => "<>",
        BinaryOperator::AndAlso => "AND",
        BinaryOperator::OrElse => "OR",
        other => other.symbol(),
    }
}

fn sql_type_name(ty: &DataType) -> Option<&'static str> {
    match ty.non_nullable() {
        DataType::Boolean => Some("BIT"),
        DataType::Int32 => Some("INT"),
        DataType::Int64 => Some("BIGINT"),
        DataType::Double => Some("FLOAT"),
        DataType::String => Some("NVARCHAR(MAX)"),
        DataType::Char => Some("NCHAR(1)"),
        DataType::DateTime => Some("DATETIME"),
        _ => None,
    }
}

fn append_literal(command: &mut SqlCommandBuilder, value: &Value) -> Result<(), SqlGenerationError> {
    match value {
        Value::Null => {
            command.append("NULL");
        }
        Value::Boolean(value) => {
            command.append(if *value { "1" } else { "0" });
        }
        Value::Int32(value) => {
            command.append(&value.to_string());
        }
        Value::Int64(value) => {
            command.append(&value.to_string());
        }
        Value::Double(value) => {
            command.append(&value.to_string());
        }
        Value::String(text) => {
            command.append("'").append(&text.replace('\'', "''")).append("'");
        }
        Value::Char(c) => {
            let text = c.to_string();
            command.append("'").append(&text.replace('\'', "''")).append("'");
        }
        Value::DateTime(value) => {
            command
                .append("'")
                .append(&value.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
                .append("'");
        }
        Value::List(_) | Value::Record(_) | Value::Entity { .. } => {
            return Err(SqlGenerationError::not_supported(
                value,
                "only scalar values can be inlined into SQL",
            ))
        }
    }
    Ok(())
}

fn append_in_list(command: &mut SqlCommandBuilder, list: &SqlExpr) -> Result<(), SqlGenerationError> {
    match list.unwrap_named() {
        SqlExpr::SubStatement(statement) => {
            command.append("(");
            append_statement(command, statement)?;
            command.append(")");
        }
        SqlExpr::Constant(constant) => match constant.value() {
            Value::List(items) if items.is_empty() => {
                command.append("(NULL)");
            }
            Value::List(items) => {
                let names: Vec<String> = items
                    .iter()
                    .map(|item| command.add_list_item_parameter(constant, item.clone()))
                    .collect();
                command.append("(").append(&names.join(", ")).append(")");
            }
            _ => {
                command.append("(");
                append_value(command, list)?;
                command.append(")");
            }
        },
        SqlExpr::NewArray { items, .. } if items.is_empty() => {
            command.append("(NULL)");
        }
        SqlExpr::NewArray { items, .. } => {
            command.append("(");
            append_values(command, items)?;
            command.append(")");
        }
        SqlExpr::Literal(literal) => match &literal.value {
            Value::List(items) if items.is_empty() => {
                command.append("(NULL)");
            }
            Value::List(items) => {
                command.append("(");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        command.append(", ");
                    }
                    append_literal(command, item)?;
                }
                command.append(")");
            }
            value => {
                command.append("(");
                append_literal(command, value)?;
                command.append(")");
            }
        },
        other => {
            return Err(SqlGenerationError::not_supported(
                other,
                "IN requires a sub-query or a list",
            ))
        }
    }
    Ok(())
}

/// Emits `x ASC, y DESC`; entities order by all their columns, constants through a
/// sub-select since SQL rejects constant ordering keys.
pub fn append_orderings(
    command: &mut SqlCommandBuilder,
    orderings: &[SqlOrdering],
) -> Result<(), SqlGenerationError> {
    let direction = |ordering: &SqlOrdering| match ordering.direction {
        OrderingDirection::Asc => " ASC",
        OrderingDirection::Desc => " DESC",
    };
    let mut first = true;
    let mut separate = |command: &mut SqlCommandBuilder| {
        if !first {
            command.append(", ");
        }
        first = false;
    };

    for ordering in orderings {
        match ordering.expression.unwrap_named() {
            SqlExpr::Entity(entity) => {
                for column in &entity.columns {
                    separate(command);
                    append_column(command, column);
                    command.append(direction(ordering));
                }
            }
            constant @ (SqlExpr::Constant(_) | SqlExpr::Literal(_)) => {
                separate(command);
                command.append("(SELECT ");
                append_value(command, constant)?;
                command.append(")").append(direction(ordering));
            }
            expression => {
                separate(command);
                append_value(command, expression)?;
                command.append(direction(ordering));
            }
        }
    }
    Ok(())
}

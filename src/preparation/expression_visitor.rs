use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::query_model::{BinaryOperator, Expression, MethodInfo};
use crate::registries::SqlMethodCall;
use crate::sql_statement::{CaseWhen, SqlExpr};

use super::errors::PreparationError;
use super::SqlPreparationStage;

pub(super) fn prepare_expression(
    stage: &SqlPreparationStage<'_>,
    expression: &Expression,
    context: &SqlPreparationContext<'_>,
    generator: &mut AliasGenerator,
) -> Result<SqlExpr, PreparationError> {
    let prepare = |inner: &Expression, generator: &mut AliasGenerator| {
        prepare_expression(stage, inner, context, generator)
    };

    match expression {
        Expression::Constant(constant) => Ok(SqlExpr::Constant(constant.clone())),
        Expression::Table(_) => Err(PreparationError::unsupported_expression(
            expression,
            "a table can only be used as a query source",
        )),
        Expression::QuerySourceReference(source) => context
            .get_mapping(source)
            .cloned()
            .ok_or_else(|| PreparationError::UnknownQuerySource(source.item_name.clone())),
        Expression::Member {
            expression: inner,
            member,
        } => {
            let object = prepare(inner, generator)?;
            if object.data_type().is_scalar() {
                // Properties of scalar values are getter calls, e.g. String.get_Length.
                let getter = MethodInfo::property_getter(member);
                transform_method_call(stage, getter, Some(object), Vec::new(), expression)
            } else {
                Ok(SqlExpr::member_access(object, member.clone()))
            }
        }
        Expression::MethodCall {
            object,
            method,
            arguments,
        } => {
            let object = object
                .as_deref()
                .map(|object| prepare(object, generator))
                .transpose()?;
            let arguments = arguments
                .iter()
                .map(|argument| prepare(argument, generator))
                .collect::<Result<Vec<_>, _>>()?;
            transform_method_call(stage, method.clone(), object, arguments, expression)
        }
        Expression::Binary {
            operator,
            left,
            right,
        } => {
            if matches!(operator, BinaryOperator::Equal | BinaryOperator::NotEqual) {
                let compared = if right.is_null_constant() {
                    Some(left)
                } else if left.is_null_constant() {
                    Some(right)
                } else {
                    None
                };
                if let Some(compared) = compared {
                    let compared = prepare(compared, generator)?;
                    return Ok(match operator {
                        BinaryOperator::Equal => SqlExpr::is_null(compared),
                        _ => SqlExpr::is_not_null(compared),
                    });
                }
            }
            let left = prepare(left, generator)?;
            let right = prepare(right, generator)?;
            Ok(SqlExpr::binary(*operator, left, right))
        }
        Expression::Unary { operator, operand } => {
            Ok(SqlExpr::unary(operator.clone(), prepare(operand, generator)?))
        }
        Expression::Conditional {
            test,
            if_true,
            if_false,
        } => Ok(SqlExpr::Case {
            whens: vec![CaseWhen {
                when: prepare(test, generator)?,
                then: prepare(if_true, generator)?,
            }],
            else_value: Some(Box::new(prepare(if_false, generator)?)),
            ty: expression.data_type(),
        }),
        Expression::New {
            ty,
            members,
            arguments,
        } => {
            let arguments = arguments
                .iter()
                .enumerate()
                .map(|(i, argument)| {
                    let prepared = prepare(argument, generator)?;
                    Ok(match members.get(i) {
                        Some(member) => SqlExpr::named(member.clone(), prepared),
                        None => SqlExpr::unnamed(prepared),
                    })
                })
                .collect::<Result<Vec<_>, PreparationError>>()?;
            Ok(SqlExpr::New {
                ty: ty.clone(),
                members: members.clone(),
                arguments,
            })
        }
        Expression::NewArray {
            element_type,
            items,
        } => Ok(SqlExpr::NewArray {
            element_type: element_type.clone(),
            items: items
                .iter()
                .map(|item| prepare(item, generator))
                .collect::<Result<Vec<_>, _>>()?,
        }),
        Expression::TypeIs {
            expression: inner,
            ty,
        } => Ok(SqlExpr::TypeIs {
            expression: Box::new(prepare(inner, generator)?),
            ty: ty.clone(),
        }),
        Expression::SubQuery(model) => {
            let statement = stage.prepare_sql_statement(model, Some(context), generator)?;
            Ok(SqlExpr::sub_statement(statement))
        }
    }
}

fn transform_method_call(
    stage: &SqlPreparationStage<'_>,
    method: MethodInfo,
    object: Option<SqlExpr>,
    arguments: Vec<SqlExpr>,
    original: &Expression,
) -> Result<SqlExpr, PreparationError> {
    let transformer = stage
        .method_call_transformers()
        .get_transformer(&method)?
        .ok_or_else(|| PreparationError::UnsupportedMethod {
            method: method.to_string(),
            expression: original.to_string(),
        })?;

    log::trace!("Transforming method call {}", method);
    transformer.transform(SqlMethodCall {
        method,
        object,
        arguments,
        original: original.to_string(),
    })
}

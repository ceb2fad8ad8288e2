use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::query_model::{
    BodyClause, Expression, Ordering, QueryModel, QuerySourceKind, QuerySourceRef,
    StreamedDataInfo,
};
use crate::sql_statement::{SqlExpr, SqlOrdering, SqlStatement, SqlStatementBuilder};

use super::errors::PreparationError;
use super::SqlPreparationStage;

pub(super) fn transform_query_model(
    stage: &SqlPreparationStage<'_>,
    model: &QueryModel,
    parent: Option<&SqlPreparationContext<'_>>,
    generator: &mut AliasGenerator,
) -> Result<SqlStatement, PreparationError> {
    log::trace!("Preparing query model: {}", model);

    let mut context = SqlPreparationContext::new(parent);
    let mut builder = SqlStatementBuilder::new();

    let main_from = model.main_from.from_expression().ok_or_else(|| {
        PreparationError::InvalidState(format!(
            "main from clause '{}' has no from expression",
            model.main_from.item_name
        ))
    })?;
    add_from_source(
        stage,
        &model.main_from,
        main_from,
        &mut builder,
        &mut context,
        generator,
    )?;

    for clause in &model.body_clauses {
        visit_body_clause(stage, clause, &mut builder, &mut context, generator)?;
    }

    builder.select_projection = Some(stage.prepare_expression(&model.select, &context, generator)?);
    builder.data_info = Some(StreamedDataInfo::sequence(model.select.data_type()));

    for operator in &model.result_operators {
        let handler = stage
            .result_operator_handlers()
            .get_item(operator.kind())
            .ok_or_else(|| PreparationError::UnsupportedResultOperator(operator.to_string()))?;
        let input = builder.data_info.clone().ok_or_else(|| {
            PreparationError::InvalidState(format!("no data info before '{}'", operator))
        })?;

        log::trace!("Applying result operator {}", operator);
        handler.handle_result_operator(operator, &mut builder, generator, stage, &context)?;
        builder.data_info = Some(operator.output_data_info(&input));
    }

    Ok(builder.build()?)
}

fn visit_body_clause(
    stage: &SqlPreparationStage<'_>,
    clause: &BodyClause,
    builder: &mut SqlStatementBuilder,
    context: &mut SqlPreparationContext<'_>,
    generator: &mut AliasGenerator,
) -> Result<(), PreparationError> {
    match clause {
        BodyClause::AdditionalFrom(source) => {
            let from_expression = source.from_expression().ok_or_else(|| {
                PreparationError::InvalidState(format!(
                    "additional from clause '{}' has no from expression",
                    source.item_name
                ))
            })?;
            add_from_source(stage, source, from_expression, builder, context, generator)
        }
        BodyClause::Join(source) => add_join(stage, source, builder, context, generator),
        BodyClause::GroupJoin(source) => {
            // Group joins only produce tables where their items are enumerated.
            log::trace!("Group join '{}' deferred to its first use", source.item_name);
            Ok(())
        }
        BodyClause::Where(predicate) => {
            let condition = stage.prepare_expression(predicate, context, generator)?;
            builder.add_where_condition(condition);
            Ok(())
        }
        BodyClause::OrderBy(orderings) => {
            let mut prepared = prepare_orderings(stage, orderings, context, generator)?;
            // A later orderby clause takes priority over the earlier ones.
            prepared.append(&mut builder.orderings);
            builder.orderings = prepared;
            Ok(())
        }
    }
}

fn add_from_source(
    stage: &SqlPreparationStage<'_>,
    source: &QuerySourceRef,
    from_expression: &Expression,
    builder: &mut SqlStatementBuilder,
    context: &mut SqlPreparationContext<'_>,
    generator: &mut AliasGenerator,
) -> Result<(), PreparationError> {
    let info = stage.prepare_from_expression(from_expression, context, generator)?;
    if let Some(table) = info.table {
        builder.tables.push(table);
    }
    if let Some(condition) = info.where_condition {
        builder.add_where_condition(condition);
    }
    context.add_mapping(source.clone(), info.item_selector);
    Ok(())
}

fn add_join(
    stage: &SqlPreparationStage<'_>,
    source: &QuerySourceRef,
    builder: &mut SqlStatementBuilder,
    context: &mut SqlPreparationContext<'_>,
    generator: &mut AliasGenerator,
) -> Result<(), PreparationError> {
    let QuerySourceKind::Join(join) = &source.kind else {
        return Err(PreparationError::InvalidState(format!(
            "join clause '{}' is not a join source",
            source.item_name
        )));
    };

    let info = stage.prepare_from_expression(&join.inner_sequence, context, generator)?;
    if let Some(table) = info.table {
        builder.tables.push(table);
    }
    if let Some(condition) = info.where_condition {
        builder.add_where_condition(condition);
    }

    let outer_key = stage.prepare_expression(&join.outer_key, context, generator)?;
    let inner_key = stage.prepare_item_lambda(
        &join.inner_key,
        info.item_selector.clone(),
        context,
        generator,
    )?;
    builder.add_where_condition(SqlExpr::equal(outer_key, inner_key));

    context.add_mapping(source.clone(), info.item_selector);
    Ok(())
}

fn prepare_orderings(
    stage: &SqlPreparationStage<'_>,
    orderings: &[Ordering],
    context: &SqlPreparationContext<'_>,
    generator: &mut AliasGenerator,
) -> Result<Vec<SqlOrdering>, PreparationError> {
    orderings
        .iter()
        .map(|ordering| {
            Ok(SqlOrdering::new(
                stage.prepare_expression(&ordering.expression, context, generator)?,
                ordering.direction,
            ))
        })
        .collect()
}

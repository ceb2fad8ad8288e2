use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::preparation::errors::PreparationError;
use crate::preparation::SqlPreparationStage;
use crate::query_model::{
    BinaryOperator, DataType, MemberInfo, OrderingDirection, ResultOperator, StreamedDataInfo,
};
use crate::registries::ResultOperatorHandler;
use crate::sql_statement::{JoinSemantics, SqlExpr, SqlOrdering, SqlStatementBuilder};

use super::{
    current_projection, ensure_no_distinct_query, ensure_no_set_operations,
    ensure_no_top_expression, move_current_statement_to_sql_table, unexpected_operator,
};

const KEY: &str = "Key";
const VALUE: &str = "Value";

/// `Skip(n)`: numbers the rows with `ROW_NUMBER()` over the current orderings inside a
/// sub-statement and keeps those above `n`, ordered by that number.
///
/// The row-number column and `n` stay on the builder so a following `Take` can bound
/// the same wrapper from above.
#[derive(Debug, Default)]
pub struct SkipResultOperatorHandler;

impl ResultOperatorHandler for SkipResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        stage: &SqlPreparationStage<'_>,
        context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        let ResultOperator::Skip(count) = operator else {
            return Err(unexpected_operator("SkipResultOperatorHandler", operator));
        };
        let skip_count = stage.prepare_expression(count, context, generator)?;

        ensure_no_set_operations(builder, generator)?;
        ensure_no_top_expression(builder, generator)?;
        ensure_no_distinct_query(builder, generator)?;

        let original_data_info = builder.data_info.clone();
        let projection = current_projection(builder)?;
        let key_type = projection.data_type();

        let mut orderings = std::mem::take(&mut builder.orderings);
        if orderings.is_empty() {
            // ROW_NUMBER needs an ORDER BY; this one keeps the rows in scan order.
            orderings.push(SqlOrdering::new(
                SqlExpr::custom_text("(SELECT 1)", DataType::Int32),
                OrderingDirection::Asc,
            ));
        }

        let pair_type = DataType::key_value_pair(key_type.clone(), DataType::Int32);
        builder.select_projection = Some(SqlExpr::New {
            ty: pair_type.clone(),
            members: vec![KEY.to_string(), VALUE.to_string()],
            arguments: vec![
                SqlExpr::named(KEY, projection),
                SqlExpr::named(VALUE, SqlExpr::RowNumber { orderings }),
            ],
        });
        builder.data_info = Some(StreamedDataInfo::sequence(pair_type.clone()));

        move_current_statement_to_sql_table(builder, generator, JoinSemantics::Inner)?;
        let pair = current_projection(builder)?;

        let type_name = pair_type.to_string();
        let row_number =
            SqlExpr::member_access(pair.clone(), MemberInfo::new(&type_name, VALUE, DataType::Int32));
        builder.select_projection = Some(SqlExpr::member_access(
            pair,
            MemberInfo::new(&type_name, KEY, key_type),
        ));
        builder.add_where_condition(SqlExpr::binary(
            BinaryOperator::GreaterThan,
            row_number.clone(),
            skip_count.clone(),
        ));
        builder.orderings = vec![SqlOrdering::new(row_number.clone(), OrderingDirection::Asc)];
        builder.row_number_selector = Some(row_number);
        builder.current_row_number_offset = Some(skip_count);
        builder.data_info = original_data_info;
        Ok(())
    }
}

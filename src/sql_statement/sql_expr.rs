//! The closed expression algebra of the SQL statement model.
//!
//! Preparation produces unresolved nodes (`TableReference`, `MemberAccess`, `TypeIs`,
//! `JoinCondition`); mapping resolution replaces them with columns, entities and
//! predicates; generation only ever sees resolved nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query_model::{
    BinaryOperator, ConstantRef, DataType, MemberInfo, OrderingDirection, UnaryOperator, Value,
};

use super::entity::SqlEntity;
use super::sql_table::TableKey;
use super::SqlStatement;

/// A value inlined into the SQL text instead of being passed as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlLiteral {
    pub value: Value,
    pub ty: DataType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    Definition,
    /// A column read through a derived table; `referenced_entity_name` is the name the
    /// column's entity had inside the sub-statement.
    Reference {
        referenced_entity_name: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlColumn {
    pub ty: DataType,
    pub owning_table_alias: String,
    pub column_name: String,
    pub is_primary_key: bool,
    pub kind: ColumnKind,
}

impl SqlColumn {
    pub fn definition(
        ty: DataType,
        owning_table_alias: impl Into<String>,
        column_name: impl Into<String>,
        is_primary_key: bool,
    ) -> Self {
        SqlColumn {
            ty,
            owning_table_alias: owning_table_alias.into(),
            column_name: column_name.into(),
            is_primary_key,
            kind: ColumnKind::Definition,
        }
    }

    pub fn reference(
        ty: DataType,
        owning_table_alias: impl Into<String>,
        column_name: impl Into<String>,
        is_primary_key: bool,
        referenced_entity_name: Option<String>,
    ) -> Self {
        SqlColumn {
            ty,
            owning_table_alias: owning_table_alias.into(),
            column_name: column_name.into(),
            is_primary_key,
            kind: ColumnKind::Reference {
                referenced_entity_name,
            },
        }
    }

    /// Name of the column as the owning table exposes it.
    pub fn rendered_name(&self) -> String {
        match &self.kind {
            ColumnKind::Reference {
                referenced_entity_name: Some(entity_name),
            } => format!("{}_{}", entity_name, self.column_name),
            _ => self.column_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlOrdering {
    pub expression: SqlExpr,
    pub direction: OrderingDirection,
}

impl SqlOrdering {
    pub fn new(expression: SqlExpr, direction: OrderingDirection) -> Self {
        SqlOrdering {
            expression,
            direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseWhen {
    pub when: SqlExpr,
    pub then: SqlExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlTableReference {
    pub table: TableKey,
    pub ty: DataType,
}

/// Member access on an entity that navigates to another entity; resolved to a join
/// (or an optimized column) only when something actually needs the target.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlEntityRefMember {
    pub origin: SqlEntity,
    pub member: MemberInfo,
}

/// A mapped object used as a constant, reduced to its identity value.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlEntityConstant {
    pub ty: DataType,
    pub value: Value,
    pub identity: Box<SqlExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlGroupingSelect {
    pub key: Box<SqlExpr>,
    pub element: Box<SqlExpr>,
    /// Aggregates over the group folded in from nested queries, named `a0`, `a1`, ...
    pub aggregations: Vec<SqlExpr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationKind {
    Count,
    CountBig,
    Min,
    Max,
    Sum,
    Average,
}

impl AggregationKind {
    pub fn sql_name(self) -> &'static str {
        match self {
            AggregationKind::Count => "COUNT",
            AggregationKind::CountBig => "COUNT_BIG",
            AggregationKind::Min => "MIN",
            AggregationKind::Max => "MAX",
            AggregationKind::Sum => "SUM",
            AggregationKind::Average => "AVG",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    Constant(ConstantRef),
    Literal(SqlLiteral),
    CustomText {
        text: String,
        ty: DataType,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<SqlExpr>,
        right: Box<SqlExpr>,
        ty: DataType,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<SqlExpr>,
        ty: DataType,
    },
    Case {
        whens: Vec<CaseWhen>,
        else_value: Option<Box<SqlExpr>>,
        ty: DataType,
    },
    New {
        ty: DataType,
        members: Vec<String>,
        arguments: Vec<SqlExpr>,
    },
    NewArray {
        element_type: DataType,
        items: Vec<SqlExpr>,
    },
    MemberAccess {
        expression: Box<SqlExpr>,
        member: MemberInfo,
    },
    TypeIs {
        expression: Box<SqlExpr>,
        ty: DataType,
    },
    TableReference(SqlTableReference),
    Column(SqlColumn),
    Entity(SqlEntity),
    EntityRefMember(SqlEntityRefMember),
    EntityConstant(SqlEntityConstant),
    Named {
        name: Option<String>,
        expression: Box<SqlExpr>,
    },
    SubStatement(Box<SqlStatement>),
    GroupingSelect(SqlGroupingSelect),
    IsNull(Box<SqlExpr>),
    IsNotNull(Box<SqlExpr>),
    /// An integer-valued expression presented to the host as a boolean.
    ConvertedBoolean(Box<SqlExpr>),
    Function {
        name: String,
        arguments: Vec<SqlExpr>,
        ty: DataType,
    },
    Aggregation {
        kind: AggregationKind,
        expression: Option<Box<SqlExpr>>,
        ty: DataType,
    },
    Like {
        expression: Box<SqlExpr>,
        pattern: Box<SqlExpr>,
    },
    In {
        left: Box<SqlExpr>,
        right: Box<SqlExpr>,
    },
    Exists(Box<SqlExpr>),
    RowNumber {
        orderings: Vec<SqlOrdering>,
    },
    SqlConvert {
        source: Box<SqlExpr>,
        ty: DataType,
    },
    /// Placeholder for the join condition of the collection join behind the given table.
    JoinCondition(TableKey),
}

/// Name given to unnamed values selected from a sub-statement.
pub const DEFAULT_VALUE_NAME: &str = "value";

impl SqlExpr {
    pub fn literal(value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = value.data_type();
        SqlExpr::Literal(SqlLiteral { value, ty })
    }

    pub fn int_literal(value: i32) -> Self {
        SqlExpr::literal(value)
    }

    pub fn string_literal(value: &str) -> Self {
        SqlExpr::literal(value)
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        SqlExpr::Constant(ConstantRef::of(value))
    }

    pub fn custom_text(text: impl Into<String>, ty: DataType) -> Self {
        SqlExpr::CustomText {
            text: text.into(),
            ty,
        }
    }

    pub fn binary(operator: BinaryOperator, left: SqlExpr, right: SqlExpr) -> Self {
        let ty = operator.result_type(&left.data_type(), &right.data_type());
        SqlExpr::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            ty,
        }
    }

    pub fn equal(left: SqlExpr, right: SqlExpr) -> Self {
        SqlExpr::binary(BinaryOperator::Equal, left, right)
    }

    pub fn and_also(left: SqlExpr, right: SqlExpr) -> Self {
        SqlExpr::binary(BinaryOperator::AndAlso, left, right)
    }

    pub fn or_else(left: SqlExpr, right: SqlExpr) -> Self {
        SqlExpr::binary(BinaryOperator::OrElse, left, right)
    }

    pub fn add(left: SqlExpr, right: SqlExpr) -> Self {
        SqlExpr::binary(BinaryOperator::Add, left, right)
    }

    pub fn subtract(left: SqlExpr, right: SqlExpr) -> Self {
        SqlExpr::binary(BinaryOperator::Subtract, left, right)
    }

    pub fn unary(operator: UnaryOperator, operand: SqlExpr) -> Self {
        let ty = match &operator {
            UnaryOperator::Convert(ty) => ty.clone(),
            _ => operand.data_type(),
        };
        SqlExpr::Unary {
            operator,
            operand: Box::new(operand),
            ty,
        }
    }

    pub fn not(operand: SqlExpr) -> Self {
        SqlExpr::unary(UnaryOperator::Not, operand)
    }

    pub fn named(name: impl Into<String>, expression: SqlExpr) -> Self {
        SqlExpr::Named {
            name: Some(name.into()),
            expression: Box::new(expression),
        }
    }

    pub fn unnamed(expression: SqlExpr) -> Self {
        SqlExpr::Named {
            name: None,
            expression: Box::new(expression),
        }
    }

    pub fn table_reference(table: TableKey, ty: DataType) -> Self {
        SqlExpr::TableReference(SqlTableReference { table, ty })
    }

    pub fn member_access(expression: SqlExpr, member: MemberInfo) -> Self {
        SqlExpr::MemberAccess {
            expression: Box::new(expression),
            member,
        }
    }

    pub fn function(name: impl Into<String>, arguments: Vec<SqlExpr>, ty: DataType) -> Self {
        SqlExpr::Function {
            name: name.into(),
            arguments,
            ty,
        }
    }

    pub fn aggregation(kind: AggregationKind, expression: Option<SqlExpr>, ty: DataType) -> Self {
        SqlExpr::Aggregation {
            kind,
            expression: expression.map(Box::new),
            ty,
        }
    }

    pub fn case_when(when: SqlExpr, then: SqlExpr, else_value: SqlExpr) -> Self {
        let ty = then.data_type();
        SqlExpr::Case {
            whens: vec![CaseWhen { when, then }],
            else_value: Some(Box::new(else_value)),
            ty,
        }
    }

    pub fn like(expression: SqlExpr, pattern: SqlExpr) -> Self {
        SqlExpr::Like {
            expression: Box::new(expression),
            pattern: Box::new(pattern),
        }
    }

    pub fn sub_statement(statement: SqlStatement) -> Self {
        SqlExpr::SubStatement(Box::new(statement))
    }

    pub fn is_null(expression: SqlExpr) -> Self {
        SqlExpr::IsNull(Box::new(expression))
    }

    pub fn is_not_null(expression: SqlExpr) -> Self {
        SqlExpr::IsNotNull(Box::new(expression))
    }

    /// Strips any `Named` wrappers.
    pub fn unwrap_named(&self) -> &SqlExpr {
        match self {
            SqlExpr::Named { expression, .. } => expression.unwrap_named(),
            other => other,
        }
    }

    pub fn into_unnamed(self) -> SqlExpr {
        match self {
            SqlExpr::Named { expression, .. } => expression.into_unnamed(),
            other => other,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            SqlExpr::Constant(constant) => constant.data_type().clone(),
            SqlExpr::Literal(literal) => literal.ty.clone(),
            SqlExpr::CustomText { ty, .. }
            | SqlExpr::Binary { ty, .. }
            | SqlExpr::Unary { ty, .. }
            | SqlExpr::Case { ty, .. }
            | SqlExpr::New { ty, .. }
            | SqlExpr::Function { ty, .. }
            | SqlExpr::Aggregation { ty, .. }
            | SqlExpr::SqlConvert { ty, .. } => ty.clone(),
            SqlExpr::NewArray { element_type, .. } => DataType::sequence_of(element_type.clone()),
            SqlExpr::MemberAccess { member, .. } => member.ty.clone(),
            SqlExpr::TypeIs { .. }
            | SqlExpr::IsNull(_)
            | SqlExpr::IsNotNull(_)
            | SqlExpr::ConvertedBoolean(_)
            | SqlExpr::Like { .. }
            | SqlExpr::In { .. }
            | SqlExpr::Exists(_)
            | SqlExpr::JoinCondition(_) => DataType::Boolean,
            SqlExpr::TableReference(reference) => reference.ty.clone(),
            SqlExpr::Column(column) => column.ty.clone(),
            SqlExpr::Entity(entity) => entity.ty.clone(),
            SqlExpr::EntityRefMember(reference) => reference.member.ty.clone(),
            SqlExpr::EntityConstant(constant) => constant.ty.clone(),
            SqlExpr::Named { expression, .. } => expression.data_type(),
            SqlExpr::SubStatement(statement) => statement.data_info().data_type(),
            SqlExpr::GroupingSelect(grouping) => DataType::Grouping {
                key: Box::new(grouping.key.data_type()),
                element: Box::new(grouping.element.data_type()),
            },
            SqlExpr::RowNumber { .. } => DataType::Int32,
        }
    }

    /// Rebuilds the node with every direct child passed through `f`.
    ///
    /// Nested statements are left alone; stages that care about them handle
    /// `SubStatement` explicitly.
    pub fn try_map_children<E>(
        self,
        f: &mut dyn FnMut(SqlExpr) -> Result<SqlExpr, E>,
    ) -> Result<SqlExpr, E> {
        fn boxed<E>(
            expr: Box<SqlExpr>,
            f: &mut dyn FnMut(SqlExpr) -> Result<SqlExpr, E>,
        ) -> Result<Box<SqlExpr>, E> {
            Ok(Box::new(f(*expr)?))
        }

        fn all<E>(
            exprs: Vec<SqlExpr>,
            f: &mut dyn FnMut(SqlExpr) -> Result<SqlExpr, E>,
        ) -> Result<Vec<SqlExpr>, E> {
            exprs.into_iter().map(|expr| f(expr)).collect()
        }

        Ok(match self {
            SqlExpr::Binary {
                operator,
                left,
                right,
                ty,
            } => SqlExpr::Binary {
                operator,
                left: boxed(left, f)?,
                right: boxed(right, f)?,
                ty,
            },
            SqlExpr::Unary {
                operator,
                operand,
                ty,
            } => SqlExpr::Unary {
                operator,
                operand: boxed(operand, f)?,
                ty,
            },
            SqlExpr::Case {
                whens,
                else_value,
                ty,
            } => SqlExpr::Case {
                whens: whens
                    .into_iter()
                    .map(|case| {
                        Ok(CaseWhen {
                            when: f(case.when)?,
                            then: f(case.then)?,
                        })
                    })
                    .collect::<Result<_, E>>()?,
                else_value: else_value.map(|value| boxed(value, f)).transpose()?,
                ty,
            },
            SqlExpr::New {
                ty,
                members,
                arguments,
            } => SqlExpr::New {
                ty,
                members,
                arguments: all(arguments, f)?,
            },
            SqlExpr::NewArray {
                element_type,
                items,
            } => SqlExpr::NewArray {
                element_type,
                items: all(items, f)?,
            },
            SqlExpr::MemberAccess { expression, member } => SqlExpr::MemberAccess {
                expression: boxed(expression, f)?,
                member,
            },
            SqlExpr::TypeIs { expression, ty } => SqlExpr::TypeIs {
                expression: boxed(expression, f)?,
                ty,
            },
            SqlExpr::Named { name, expression } => SqlExpr::Named {
                name,
                expression: boxed(expression, f)?,
            },
            SqlExpr::GroupingSelect(grouping) => SqlExpr::GroupingSelect(SqlGroupingSelect {
                key: boxed(grouping.key, f)?,
                element: boxed(grouping.element, f)?,
                aggregations: all(grouping.aggregations, f)?,
            }),
            SqlExpr::IsNull(operand) => SqlExpr::IsNull(boxed(operand, f)?),
            SqlExpr::IsNotNull(operand) => SqlExpr::IsNotNull(boxed(operand, f)?),
            SqlExpr::ConvertedBoolean(operand) => SqlExpr::ConvertedBoolean(boxed(operand, f)?),
            SqlExpr::Function {
                name,
                arguments,
                ty,
            } => SqlExpr::Function {
                name,
                arguments: all(arguments, f)?,
                ty,
            },
            SqlExpr::Aggregation {
                kind,
                expression,
                ty,
            } => SqlExpr::Aggregation {
                kind,
                expression: expression.map(|operand| boxed(operand, f)).transpose()?,
                ty,
            },
            SqlExpr::Like {
                expression,
                pattern,
            } => SqlExpr::Like {
                expression: boxed(expression, f)?,
                pattern: boxed(pattern, f)?,
            },
            SqlExpr::In { left, right } => SqlExpr::In {
                left: boxed(left, f)?,
                right: boxed(right, f)?,
            },
            SqlExpr::Exists(operand) => SqlExpr::Exists(boxed(operand, f)?),
            SqlExpr::RowNumber { orderings } => SqlExpr::RowNumber {
                orderings: orderings
                    .into_iter()
                    .map(|ordering| {
                        Ok(SqlOrdering::new(f(ordering.expression)?, ordering.direction))
                    })
                    .collect::<Result<_, E>>()?,
            },
            SqlExpr::SqlConvert { source, ty } => SqlExpr::SqlConvert {
                source: boxed(source, f)?,
                ty,
            },
            leaf @ (SqlExpr::Constant(_)
            | SqlExpr::Literal(_)
            | SqlExpr::CustomText { .. }
            | SqlExpr::TableReference(_)
            | SqlExpr::Column(_)
            | SqlExpr::Entity(_)
            | SqlExpr::EntityRefMember(_)
            | SqlExpr::EntityConstant(_)
            | SqlExpr::SubStatement(_)
            | SqlExpr::JoinCondition(_)) => leaf,
        })
    }

    /// Visits every direct child; nested statements are not entered.
    pub fn for_each_child(&self, f: &mut dyn FnMut(&SqlExpr)) {
        match self {
            SqlExpr::Binary { left, right, .. }
            | SqlExpr::In { left, right }
            | SqlExpr::Like {
                expression: left,
                pattern: right,
            } => {
                f(left);
                f(right);
            }
            SqlExpr::Unary { operand, .. }
            | SqlExpr::MemberAccess {
                expression: operand,
                ..
            }
            | SqlExpr::TypeIs {
                expression: operand,
                ..
            }
            | SqlExpr::Named {
                expression: operand,
                ..
            }
            | SqlExpr::IsNull(operand)
            | SqlExpr::IsNotNull(operand)
            | SqlExpr::ConvertedBoolean(operand)
            | SqlExpr::Exists(operand)
            | SqlExpr::SqlConvert {
                source: operand, ..
            } => f(operand),
            SqlExpr::Case {
                whens, else_value, ..
            } => {
                for case in whens {
                    f(&case.when);
                    f(&case.then);
                }
                if let Some(value) = else_value {
                    f(value);
                }
            }
            SqlExpr::New { arguments, .. } | SqlExpr::Function { arguments, .. } => {
                arguments.iter().for_each(|argument| f(argument))
            }
            SqlExpr::NewArray { items, .. } => items.iter().for_each(|item| f(item)),
            SqlExpr::GroupingSelect(grouping) => {
                f(&grouping.key);
                f(&grouping.element);
                grouping.aggregations.iter().for_each(|aggregation| f(aggregation));
            }
            SqlExpr::Aggregation { expression, .. } => {
                if let Some(operand) = expression {
                    f(operand);
                }
            }
            SqlExpr::RowNumber { orderings } => {
                orderings.iter().for_each(|ordering| f(&ordering.expression))
            }
            SqlExpr::EntityConstant(constant) => f(&constant.identity),
            SqlExpr::Constant(_)
            | SqlExpr::Literal(_)
            | SqlExpr::CustomText { .. }
            | SqlExpr::TableReference(_)
            | SqlExpr::Column(_)
            | SqlExpr::Entity(_)
            | SqlExpr::EntityRefMember(_)
            | SqlExpr::SubStatement(_)
            | SqlExpr::JoinCondition(_) => {}
        }
    }
}

fn write_separated(f: &mut fmt::Formatter<'_>, items: &[SqlExpr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for SqlExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlExpr::Constant(constant) => write!(f, "{}", constant.value()),
            SqlExpr::Literal(literal) => write!(f, "{}", literal.value),
            SqlExpr::CustomText { text, .. } => write!(f, "{}", text),
            SqlExpr::Binary {
                operator,
                left,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator.symbol(), right),
            SqlExpr::Unary {
                operator, operand, ..
            } => match operator {
                UnaryOperator::Not => write!(f, "NOT {}", operand),
                UnaryOperator::Negate => write!(f, "-{}", operand),
                UnaryOperator::UnaryPlus => write!(f, "+{}", operand),
                UnaryOperator::Convert(ty) => write!(f, "Convert({}, {})", operand, ty),
            },
            SqlExpr::Case {
                whens, else_value, ..
            } => {
                write!(f, "CASE")?;
                for case in whens {
                    write!(f, " WHEN {} THEN {}", case.when, case.then)?;
                }
                if let Some(value) = else_value {
                    write!(f, " ELSE {}", value)?;
                }
                write!(f, " END")
            }
            SqlExpr::New { ty, arguments, .. } => {
                write!(f, "new {}(", ty)?;
                write_separated(f, arguments)?;
                write!(f, ")")
            }
            SqlExpr::NewArray { items, .. } => {
                write!(f, "new [] {{")?;
                write_separated(f, items)?;
                write!(f, "}}")
            }
            SqlExpr::MemberAccess { expression, member } => {
                write!(f, "{}.{}", expression, member.name)
            }
            SqlExpr::TypeIs { expression, ty } => write!(f, "({} is {})", expression, ty),
            SqlExpr::TableReference(reference) => {
                write!(f, "TABLE-REF({}, {})", reference.table, reference.ty)
            }
            SqlExpr::Column(column) => {
                write!(f, "[{}].[{}]", column.owning_table_alias, column.rendered_name())
            }
            SqlExpr::Entity(entity) => match &entity.name {
                Some(name) => write!(f, "[{}] AS [{}]", entity.table_alias, name),
                None => write!(f, "[{}]", entity.table_alias),
            },
            SqlExpr::EntityRefMember(reference) => write!(
                f,
                "[{}].[{}] (ENTITY-REF)",
                reference.origin.table_alias, reference.member.name
            ),
            SqlExpr::EntityConstant(constant) => write!(f, "ENTITY({})", constant.identity),
            SqlExpr::Named { name, expression } => write!(
                f,
                "{} AS {}",
                expression,
                name.as_deref().unwrap_or(DEFAULT_VALUE_NAME)
            ),
            SqlExpr::SubStatement(statement) => write!(f, "({})", statement),
            SqlExpr::GroupingSelect(grouping) => {
                write!(
                    f,
                    "GROUPING (KEY: {}, ELEMENT: {}, AGGREGATIONS: (",
                    grouping.key, grouping.element
                )?;
                write_separated(f, &grouping.aggregations)?;
                write!(f, "))")
            }
            SqlExpr::IsNull(operand) => write!(f, "{} IS NULL", operand),
            SqlExpr::IsNotNull(operand) => write!(f, "{} IS NOT NULL", operand),
            SqlExpr::ConvertedBoolean(operand) => write!(f, "CONVERTEDBOOL({})", operand),
            SqlExpr::Function {
                name, arguments, ..
            } => {
                write!(f, "{}(", name)?;
                write_separated(f, arguments)?;
                write!(f, ")")
            }
            SqlExpr::Aggregation {
                kind, expression, ..
            } => match expression {
                Some(operand) => write!(f, "{}({})", kind.sql_name(), operand),
                None => write!(f, "{}(*)", kind.sql_name()),
            },
            SqlExpr::Like {
                expression,
                pattern,
            } => write!(f, "{} LIKE {}", expression, pattern),
            SqlExpr::In { left, right } => write!(f, "{} IN {}", left, right),
            SqlExpr::Exists(operand) => write!(f, "EXISTS({})", operand),
            SqlExpr::RowNumber { orderings } => {
                write!(f, "ROW_NUMBER() OVER (ORDER BY ")?;
                for (i, ordering) in orderings.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {:?}", ordering.expression, ordering.direction)?;
                }
                write!(f, ")")
            }
            SqlExpr::SqlConvert { source, ty } => write!(f, "CONVERT({}, {})", ty, source),
            SqlExpr::JoinCondition(table) => write!(f, "JOIN-CONDITION({})", table),
        }
    }
}

//! The already-parsed relational query handed to the compiler by a front end.
//!
//! A [`QueryModel`] is a main from clause, an ordered list of body clauses (additional
//! froms, joins, group joins, where and orderby clauses), a select projection and an
//! ordered list of result operators. Query sources are shared by reference: every
//! expression that mentions a source holds a clone of the same [`QuerySourceRef`], and
//! equality between sources is pointer identity.

pub mod expression;
pub mod known_methods;
pub mod method_info;
pub mod types;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use expression::{
    BinaryOperator, Constant, ConstantRef, Expression, ItemLambda, UnaryOperator,
};
pub use method_info::{MethodInfo, MethodKey};
pub use types::{DataType, EntityType, MemberInfo, Value};

/// Key selectors of a join or group join.
///
/// The inner key is a lambda because it refers to the joined item itself, which only
/// exists once the inner sequence has been prepared.
#[derive(Debug, Clone)]
pub struct JoinClause {
    pub inner_sequence: Expression,
    pub outer_key: Expression,
    pub inner_key: ItemLambda,
}

#[derive(Debug, Clone)]
pub enum QuerySourceKind {
    MainFrom(Expression),
    AdditionalFrom(Expression),
    Join(JoinClause),
    GroupJoin(JoinClause),
    /// Lambda parameter standing for the current item of a sequence.
    ItemParameter,
}

#[derive(Debug)]
pub struct QuerySource {
    pub item_name: String,
    pub item_type: DataType,
    pub kind: QuerySourceKind,
}

#[derive(Debug, Clone)]
pub struct QuerySourceRef(Arc<QuerySource>);

impl QuerySourceRef {
    fn create(item_name: &str, item_type: DataType, kind: QuerySourceKind) -> Self {
        QuerySourceRef(Arc::new(QuerySource {
            item_name: item_name.to_string(),
            item_type,
            kind,
        }))
    }

    pub fn main_from(item_name: &str, item_type: DataType, from_expression: Expression) -> Self {
        Self::create(item_name, item_type, QuerySourceKind::MainFrom(from_expression))
    }

    pub fn additional_from(
        item_name: &str,
        item_type: DataType,
        from_expression: Expression,
    ) -> Self {
        Self::create(
            item_name,
            item_type,
            QuerySourceKind::AdditionalFrom(from_expression),
        )
    }

    pub fn join(item_name: &str, item_type: DataType, join: JoinClause) -> Self {
        Self::create(item_name, item_type, QuerySourceKind::Join(join))
    }

    /// A group join source; its items are sequences of the inner item type.
    pub fn group_join(item_name: &str, inner_item_type: DataType, join: JoinClause) -> Self {
        Self::create(
            item_name,
            DataType::sequence_of(inner_item_type),
            QuerySourceKind::GroupJoin(join),
        )
    }

    pub fn parameter(item_name: &str, item_type: DataType) -> Self {
        Self::create(item_name, item_type, QuerySourceKind::ItemParameter)
    }

    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// The expression the source draws its items from, for main and additional froms.
    pub fn from_expression(&self) -> Option<&Expression> {
        match &self.kind {
            QuerySourceKind::MainFrom(expression) | QuerySourceKind::AdditionalFrom(expression) => {
                Some(expression)
            }
            _ => None,
        }
    }
}

impl Deref for QuerySourceRef {
    type Target = QuerySource;

    fn deref(&self) -> &QuerySource {
        &self.0
    }
}

impl PartialEq for QuerySourceRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for QuerySourceRef {}

impl Hash for QuerySourceRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderingDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub struct Ordering {
    pub expression: Expression,
    pub direction: OrderingDirection,
}

impl Ordering {
    pub fn asc(expression: Expression) -> Self {
        Ordering {
            expression,
            direction: OrderingDirection::Asc,
        }
    }

    pub fn desc(expression: Expression) -> Self {
        Ordering {
            expression,
            direction: OrderingDirection::Desc,
        }
    }
}

#[derive(Debug, Clone)]
pub enum BodyClause {
    AdditionalFrom(QuerySourceRef),
    Join(QuerySourceRef),
    GroupJoin(QuerySourceRef),
    Where(Expression),
    OrderBy(Vec<Ordering>),
}

/// Shape of the data a query (or query level) produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StreamedDataInfo {
    Sequence {
        item_type: DataType,
    },
    ScalarValue {
        ty: DataType,
    },
    SingleValue {
        ty: DataType,
        return_default_when_empty: bool,
    },
}

impl StreamedDataInfo {
    pub fn sequence(item_type: DataType) -> Self {
        StreamedDataInfo::Sequence { item_type }
    }

    pub fn scalar(ty: DataType) -> Self {
        StreamedDataInfo::ScalarValue { ty }
    }

    /// Item type of a sequence, or the value type of a scalar/single value.
    pub fn item_type(&self) -> &DataType {
        match self {
            StreamedDataInfo::Sequence { item_type } => item_type,
            StreamedDataInfo::ScalarValue { ty } | StreamedDataInfo::SingleValue { ty, .. } => ty,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            StreamedDataInfo::Sequence { item_type } => DataType::sequence_of(item_type.clone()),
            StreamedDataInfo::ScalarValue { ty } | StreamedDataInfo::SingleValue { ty, .. } => {
                ty.clone()
            }
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, StreamedDataInfo::Sequence { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultOperatorKind {
    Take,
    Skip,
    Distinct,
    Count,
    LongCount,
    First,
    Single,
    Contains,
    Cast,
    OfType,
    Any,
    All,
    GroupBy,
    DefaultIfEmpty,
    Aggregate,
    Min,
    Max,
    Sum,
    Average,
    Union,
    Concat,
}

impl ResultOperatorKind {
    /// The kind whose handler applies when none is registered for `self`.
    pub fn base_kind(self) -> Option<ResultOperatorKind> {
        match self {
            ResultOperatorKind::LongCount => Some(ResultOperatorKind::Count),
            ResultOperatorKind::Min
            | ResultOperatorKind::Max
            | ResultOperatorKind::Sum
            | ResultOperatorKind::Average => Some(ResultOperatorKind::Aggregate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ResultOperator {
    Take(Expression),
    Skip(Expression),
    Distinct,
    Count,
    LongCount,
    First { or_default: bool },
    Single { or_default: bool },
    Contains(Expression),
    Cast(DataType),
    OfType(DataType),
    Any(Option<ItemLambda>),
    All(ItemLambda),
    GroupBy {
        key_selector: ItemLambda,
        element_selector: ItemLambda,
    },
    DefaultIfEmpty,
    Min,
    Max,
    Sum,
    Average,
    Union(Expression),
    Concat(Expression),
}

impl ResultOperator {
    pub fn kind(&self) -> ResultOperatorKind {
        match self {
            ResultOperator::Take(_) => ResultOperatorKind::Take,
            ResultOperator::Skip(_) => ResultOperatorKind::Skip,
            ResultOperator::Distinct => ResultOperatorKind::Distinct,
            ResultOperator::Count => ResultOperatorKind::Count,
            ResultOperator::LongCount => ResultOperatorKind::LongCount,
            ResultOperator::First { .. } => ResultOperatorKind::First,
            ResultOperator::Single { .. } => ResultOperatorKind::Single,
            ResultOperator::Contains(_) => ResultOperatorKind::Contains,
            ResultOperator::Cast(_) => ResultOperatorKind::Cast,
            ResultOperator::OfType(_) => ResultOperatorKind::OfType,
            ResultOperator::Any(_) => ResultOperatorKind::Any,
            ResultOperator::All(_) => ResultOperatorKind::All,
            ResultOperator::GroupBy { .. } => ResultOperatorKind::GroupBy,
            ResultOperator::DefaultIfEmpty => ResultOperatorKind::DefaultIfEmpty,
            ResultOperator::Min => ResultOperatorKind::Min,
            ResultOperator::Max => ResultOperatorKind::Max,
            ResultOperator::Sum => ResultOperatorKind::Sum,
            ResultOperator::Average => ResultOperatorKind::Average,
            ResultOperator::Union(_) => ResultOperatorKind::Union,
            ResultOperator::Concat(_) => ResultOperatorKind::Concat,
        }
    }

    pub fn output_data_info(&self, input: &StreamedDataInfo) -> StreamedDataInfo {
        let item_type = input.item_type().clone();
        match self {
            ResultOperator::Take(_)
            | ResultOperator::Skip(_)
            | ResultOperator::Distinct
            | ResultOperator::DefaultIfEmpty
            | ResultOperator::Union(_)
            | ResultOperator::Concat(_) => StreamedDataInfo::sequence(item_type),
            ResultOperator::Cast(ty) | ResultOperator::OfType(ty) => {
                StreamedDataInfo::sequence(ty.clone())
            }
            ResultOperator::Count => StreamedDataInfo::scalar(DataType::Int32),
            ResultOperator::LongCount => StreamedDataInfo::scalar(DataType::Int64),
            ResultOperator::Contains(_) | ResultOperator::Any(_) | ResultOperator::All(_) => {
                StreamedDataInfo::scalar(DataType::Boolean)
            }
            ResultOperator::First { or_default } | ResultOperator::Single { or_default } => {
                StreamedDataInfo::SingleValue {
                    ty: item_type,
                    return_default_when_empty: *or_default,
                }
            }
            ResultOperator::Min | ResultOperator::Max | ResultOperator::Sum => {
                StreamedDataInfo::scalar(item_type)
            }
            ResultOperator::Average => StreamedDataInfo::scalar(DataType::Double),
            ResultOperator::GroupBy {
                key_selector,
                element_selector,
            } => StreamedDataInfo::sequence(DataType::Grouping {
                key: Box::new(key_selector.body.data_type()),
                element: Box::new(element_selector.body.data_type()),
            }),
        }
    }
}

impl fmt::Display for ResultOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultOperator::Take(count) => write!(f, "Take({})", count),
            ResultOperator::Skip(count) => write!(f, "Skip({})", count),
            ResultOperator::Contains(item) => write!(f, "Contains({})", item),
            ResultOperator::Cast(ty) => write!(f, "Cast<{}>()", ty),
            ResultOperator::OfType(ty) => write!(f, "OfType<{}>()", ty),
            ResultOperator::Any(Some(lambda)) => write!(f, "Any({})", lambda.body),
            ResultOperator::All(lambda) => write!(f, "All({})", lambda.body),
            ResultOperator::GroupBy {
                key_selector,
                element_selector,
            } => write!(
                f,
                "GroupBy({}, {})",
                key_selector.body, element_selector.body
            ),
            ResultOperator::Union(source) => write!(f, "Union({})", source),
            ResultOperator::Concat(source) => write!(f, "Concat({})", source),
            ResultOperator::First { or_default: true } => write!(f, "FirstOrDefault()"),
            ResultOperator::Single { or_default: true } => write!(f, "SingleOrDefault()"),
            other => write!(f, "{:?}()", other.kind()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryModel {
    pub main_from: QuerySourceRef,
    pub body_clauses: Vec<BodyClause>,
    pub select: Expression,
    pub result_operators: Vec<ResultOperator>,
}

impl QueryModel {
    pub fn new(main_from: QuerySourceRef, select: Expression) -> Self {
        QueryModel {
            main_from,
            body_clauses: Vec::new(),
            select,
            result_operators: Vec::new(),
        }
    }

    pub fn with_body_clause(mut self, clause: BodyClause) -> Self {
        self.body_clauses.push(clause);
        self
    }

    pub fn with_where(self, predicate: Expression) -> Self {
        self.with_body_clause(BodyClause::Where(predicate))
    }

    pub fn with_order_by(self, orderings: Vec<Ordering>) -> Self {
        self.with_body_clause(BodyClause::OrderBy(orderings))
    }

    pub fn with_additional_from(self, source: QuerySourceRef) -> Self {
        self.with_body_clause(BodyClause::AdditionalFrom(source))
    }

    pub fn with_result_operator(mut self, operator: ResultOperator) -> Self {
        self.result_operators.push(operator);
        self
    }

    /// Data shape after the select clause and every result operator.
    pub fn output_data_info(&self) -> StreamedDataInfo {
        self.result_operators.iter().fold(
            StreamedDataInfo::sequence(self.select.data_type()),
            |info, operator| operator.output_data_info(&info),
        )
    }
}

impl fmt::Display for QueryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "from {} {}", self.main_from.item_type, self.main_from.item_name)?;
        if let Some(expression) = self.main_from.from_expression() {
            write!(f, " in {}", expression)?;
        }
        for clause in &self.body_clauses {
            match clause {
                BodyClause::AdditionalFrom(source) => {
                    write!(f, " from {} {}", source.item_type, source.item_name)?
                }
                BodyClause::Join(source) => write!(f, " join {}", source.item_name)?,
                BodyClause::GroupJoin(source) => write!(f, " join into {}", source.item_name)?,
                BodyClause::Where(predicate) => write!(f, " where {}", predicate)?,
                BodyClause::OrderBy(orderings) => {
                    write!(f, " orderby")?;
                    for ordering in orderings {
                        write!(f, " {} {:?}", ordering.expression, ordering.direction)?;
                    }
                }
            }
        }
        write!(f, " select {}", self.select)?;
        for operator in &self.result_operators {
            write!(f, " => {}", operator)?;
        }
        Ok(())
    }
}

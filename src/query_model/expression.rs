//! Input expression language consumed by the preparation stage.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::method_info::MethodInfo;
use super::types::{DataType, MemberInfo, Value};
use super::{QueryModel, QuerySourceRef};

#[derive(Debug)]
pub struct Constant {
    pub value: Value,
    pub ty: DataType,
}

/// A constant node. Two `ConstantRef`s are equal only if they point at the same constant,
/// which is what makes "same constant, same parameter" decidable in the generator.
#[derive(Debug, Clone)]
pub struct ConstantRef(Arc<Constant>);

impl ConstantRef {
    pub fn new(value: Value, ty: DataType) -> Self {
        ConstantRef(Arc::new(Constant { value, ty }))
    }

    pub fn of(value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = value.data_type();
        ConstantRef::new(value, ty)
    }

    pub fn value(&self) -> &Value {
        &self.0.value
    }

    pub fn data_type(&self) -> &DataType {
        &self.0.ty
    }

    /// A distinct constant carrying an equal value.
    pub fn fresh_copy(&self) -> Self {
        ConstantRef::new(self.0.value.clone(), self.0.ty.clone())
    }

    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for ConstantRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ConstantRef {}

impl Hash for ConstantRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    AndAlso,
    OrElse,
    And,
    Or,
    ExclusiveOr,
    Coalesce,
}

impl BinaryOperator {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessThanOrEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterThanOrEqual
        )
    }

    /// Result type of `left <op> right`.
    pub fn result_type(self, left: &DataType, right: &DataType) -> DataType {
        match self {
            op if op.is_comparison() => DataType::Boolean,
            BinaryOperator::AndAlso | BinaryOperator::OrElse => DataType::Boolean,
            BinaryOperator::Coalesce => right.clone(),
            _ => left.clone(),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Power => "^^",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::AndAlso => "&&",
            BinaryOperator::OrElse => "||",
            BinaryOperator::And => "&",
            BinaryOperator::Or => "|",
            BinaryOperator::ExclusiveOr => "^",
            BinaryOperator::Coalesce => "??",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Not,
    Negate,
    UnaryPlus,
    Convert(DataType),
}

/// A lambda over a single query item, e.g. the predicate of `All` or a GroupBy key selector.
#[derive(Debug, Clone)]
pub struct ItemLambda {
    pub parameter: QuerySourceRef,
    pub body: Expression,
}

impl ItemLambda {
    pub fn new(parameter: QuerySourceRef, body: Expression) -> Self {
        ItemLambda { parameter, body }
    }
}

#[derive(Debug, Clone)]
pub enum Expression {
    Constant(ConstantRef),
    /// The queryable table holding all mapped items of the given type.
    Table(DataType),
    QuerySourceReference(QuerySourceRef),
    Member {
        expression: Box<Expression>,
        member: MemberInfo,
    },
    MethodCall {
        object: Option<Box<Expression>>,
        method: MethodInfo,
        arguments: Vec<Expression>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
    },
    Conditional {
        test: Box<Expression>,
        if_true: Box<Expression>,
        if_false: Box<Expression>,
    },
    New {
        ty: DataType,
        members: Vec<String>,
        arguments: Vec<Expression>,
    },
    NewArray {
        element_type: DataType,
        items: Vec<Expression>,
    },
    TypeIs {
        expression: Box<Expression>,
        ty: DataType,
    },
    SubQuery(Box<QueryModel>),
}

impl Expression {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expression::Constant(ConstantRef::of(value))
    }

    pub fn typed_constant(value: Value, ty: DataType) -> Self {
        Expression::Constant(ConstantRef::new(value, ty))
    }

    pub fn null(ty: DataType) -> Self {
        Expression::Constant(ConstantRef::new(Value::Null, ty))
    }

    pub fn table(item_type: DataType) -> Self {
        Expression::Table(item_type)
    }

    pub fn source(source: &QuerySourceRef) -> Self {
        Expression::QuerySourceReference(source.clone())
    }

    pub fn member(self, member: MemberInfo) -> Self {
        Expression::Member {
            expression: Box::new(self),
            member,
        }
    }

    pub fn call(self, method: MethodInfo, arguments: Vec<Expression>) -> Self {
        Expression::MethodCall {
            object: Some(Box::new(self)),
            method,
            arguments,
        }
    }

    pub fn static_call(method: MethodInfo, arguments: Vec<Expression>) -> Self {
        Expression::MethodCall {
            object: None,
            method,
            arguments,
        }
    }

    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn equal(left: Expression, right: Expression) -> Self {
        Expression::binary(BinaryOperator::Equal, left, right)
    }

    pub fn not_equal(left: Expression, right: Expression) -> Self {
        Expression::binary(BinaryOperator::NotEqual, left, right)
    }

    pub fn and_also(left: Expression, right: Expression) -> Self {
        Expression::binary(BinaryOperator::AndAlso, left, right)
    }

    pub fn not(operand: Expression) -> Self {
        Expression::Unary {
            operator: UnaryOperator::Not,
            operand: Box::new(operand),
        }
    }

    pub fn convert(operand: Expression, ty: DataType) -> Self {
        Expression::Unary {
            operator: UnaryOperator::Convert(ty),
            operand: Box::new(operand),
        }
    }

    pub fn conditional(test: Expression, if_true: Expression, if_false: Expression) -> Self {
        Expression::Conditional {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        }
    }

    /// Anonymous object construction; the record type is derived from the arguments.
    pub fn new_anonymous(members: Vec<(&str, Expression)>) -> Self {
        let ty = DataType::record(
            "AnonymousType",
            members
                .iter()
                .map(|(name, argument)| (name.to_string(), argument.data_type()))
                .collect(),
        );
        let (members, arguments) = members
            .into_iter()
            .map(|(name, argument)| (name.to_string(), argument))
            .unzip();
        Expression::New {
            ty,
            members,
            arguments,
        }
    }

    pub fn type_is(expression: Expression, ty: DataType) -> Self {
        Expression::TypeIs {
            expression: Box::new(expression),
            ty,
        }
    }

    pub fn sub_query(model: QueryModel) -> Self {
        Expression::SubQuery(Box::new(model))
    }

    pub fn is_null_constant(&self) -> bool {
        matches!(self, Expression::Constant(constant) if constant.value().is_null())
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Expression::Constant(constant) => constant.data_type().clone(),
            Expression::Table(item) => DataType::sequence_of(item.clone()),
            Expression::QuerySourceReference(source) => source.item_type.clone(),
            Expression::Member { member, .. } => member.ty.clone(),
            Expression::MethodCall { method, .. } => method.return_type.clone(),
            Expression::Binary {
                operator,
                left,
                right,
            } => operator.result_type(&left.data_type(), &right.data_type()),
            Expression::Unary { operator, operand } => match operator {
                UnaryOperator::Convert(ty) => ty.clone(),
                _ => operand.data_type(),
            },
            Expression::Conditional { if_true, .. } => if_true.data_type(),
            Expression::New { ty, .. } => ty.clone(),
            Expression::NewArray { element_type, .. } => DataType::sequence_of(element_type.clone()),
            Expression::TypeIs { .. } => DataType::Boolean,
            Expression::SubQuery(model) => model.output_data_info().data_type(),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expression]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(constant) => write!(f, "{}", constant.value()),
            Expression::Table(item) => write!(f, "TABLE({})", item),
            Expression::QuerySourceReference(source) => write!(f, "[{}]", source.item_name),
            Expression::Member { expression, member } => {
                write!(f, "{}.{}", expression, member.name)
            }
            Expression::MethodCall {
                object,
                method,
                arguments,
            } => {
                match object {
                    Some(object) => write!(f, "{}.{}(", object, method.name)?,
                    None => write!(f, "{}.{}(", method.declaring_type, method.name)?,
                }
                write_list(f, arguments)?;
                write!(f, ")")
            }
            Expression::Binary {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator.symbol(), right),
            Expression::Unary { operator, operand } => match operator {
                UnaryOperator::Not => write!(f, "Not({})", operand),
                UnaryOperator::Negate => write!(f, "-{}", operand),
                UnaryOperator::UnaryPlus => write!(f, "+{}", operand),
                UnaryOperator::Convert(ty) => write!(f, "Convert({}, {})", operand, ty),
            },
            Expression::Conditional {
                test,
                if_true,
                if_false,
            } => write!(f, "IIF({}, {}, {})", test, if_true, if_false),
            Expression::New {
                ty,
                members,
                arguments,
            } => {
                write!(f, "new {}(", ty)?;
                for (i, (member, argument)) in members.iter().zip(arguments).enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", member, argument)?;
                }
                write!(f, ")")
            }
            Expression::NewArray { items, .. } => {
                write!(f, "new [] {{")?;
                write_list(f, items)?;
                write!(f, "}}")
            }
            Expression::TypeIs { expression, ty } => write!(f, "({} Is {})", expression, ty),
            Expression::SubQuery(model) => write!(f, "{{{}}}", model),
        }
    }
}

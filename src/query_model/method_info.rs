use std::fmt;

use crate::registries::method_call::TransformerAttribute;

use super::types::{DataType, MemberInfo};

/// Signature of a method called inside a query expression.
///
/// `generic_definition` points at the open generic form of a closed generic method
/// (`Enumerable.Contains<Int32>` -> `Enumerable.Contains<T>`), `base_definition` at the
/// method it overrides or implements. Both are consulted by the method-info registry
/// when no transformer is registered for the exact signature.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub declaring_type: String,
    pub name: String,
    pub parameter_types: Vec<DataType>,
    pub return_type: DataType,
    pub is_static: bool,
    pub generic_definition: Option<Box<MethodInfo>>,
    pub base_definition: Option<Box<MethodInfo>>,
    pub transformer_attributes: Vec<TransformerAttribute>,
}

/// Registry key of a method: declaring type, name and parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub declaring_type: String,
    pub name: String,
    pub parameter_types: Vec<DataType>,
}

impl MethodInfo {
    pub fn instance(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        parameter_types: Vec<DataType>,
        return_type: DataType,
    ) -> Self {
        MethodInfo {
            declaring_type: declaring_type.into(),
            name: name.into(),
            parameter_types,
            return_type,
            is_static: false,
            generic_definition: None,
            base_definition: None,
            transformer_attributes: Vec::new(),
        }
    }

    pub fn static_method(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        parameter_types: Vec<DataType>,
        return_type: DataType,
    ) -> Self {
        MethodInfo {
            is_static: true,
            ..MethodInfo::instance(declaring_type, name, parameter_types, return_type)
        }
    }

    /// The getter method behind a property, e.g. `String.get_Length`.
    pub fn property_getter(member: &MemberInfo) -> Self {
        MethodInfo::instance(
            member.declaring_type.clone(),
            format!("get_{}", member.name),
            Vec::new(),
            member.ty.clone(),
        )
    }

    pub fn with_generic_definition(mut self, definition: MethodInfo) -> Self {
        self.generic_definition = Some(Box::new(definition));
        self
    }

    pub fn with_base_definition(mut self, definition: MethodInfo) -> Self {
        self.base_definition = Some(Box::new(definition));
        self
    }

    pub fn with_transformer_attribute(mut self, attribute: TransformerAttribute) -> Self {
        self.transformer_attributes.push(attribute);
        self
    }

    pub fn key(&self) -> MethodKey {
        MethodKey {
            declaring_type: self.declaring_type.clone(),
            name: self.name.clone(),
            parameter_types: self.parameter_types.clone(),
        }
    }
}

impl fmt::Display for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.declaring_type, self.name)?;
        for (i, parameter) in self.parameter_types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", parameter)?;
        }
        write!(f, ")")
    }
}

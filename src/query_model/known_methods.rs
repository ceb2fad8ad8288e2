//! Signatures of the well-known methods the default transformers are registered for.
//!
//! Front ends building query models should use these so that registry keys match.

use lazy_static::lazy_static;

use super::method_info::MethodInfo;
use super::types::DataType;

const STRING: &str = "String";
const MATH: &str = "Math";

fn string_method(name: &str, parameters: Vec<DataType>, return_type: DataType) -> MethodInfo {
    MethodInfo::instance(STRING, name, parameters, return_type)
}

fn math_method(name: &str, parameters: Vec<DataType>, return_type: DataType) -> MethodInfo {
    MethodInfo::static_method(MATH, name, parameters, return_type)
}

lazy_static! {
    pub static ref STRING_CONTAINS: MethodInfo =
        string_method("Contains", vec![DataType::String], DataType::Boolean);
    pub static ref STRING_STARTS_WITH: MethodInfo =
        string_method("StartsWith", vec![DataType::String], DataType::Boolean);
    pub static ref STRING_ENDS_WITH: MethodInfo =
        string_method("EndsWith", vec![DataType::String], DataType::Boolean);
    pub static ref SQL_METHODS_LIKE: MethodInfo = MethodInfo::static_method(
        "SqlMethods",
        "Like",
        vec![DataType::String, DataType::String],
        DataType::Boolean
    );
    pub static ref STRING_INDEX_OF: MethodInfo =
        string_method("IndexOf", vec![DataType::String], DataType::Int32);
    pub static ref STRING_INDEX_OF_FROM: MethodInfo = string_method(
        "IndexOf",
        vec![DataType::String, DataType::Int32],
        DataType::Int32
    );
    pub static ref STRING_SUBSTRING: MethodInfo =
        string_method("Substring", vec![DataType::Int32], DataType::String);
    pub static ref STRING_SUBSTRING_LENGTH: MethodInfo = string_method(
        "Substring",
        vec![DataType::Int32, DataType::Int32],
        DataType::String
    );
    pub static ref STRING_REMOVE: MethodInfo =
        string_method("Remove", vec![DataType::Int32], DataType::String);
    pub static ref STRING_REMOVE_COUNT: MethodInfo = string_method(
        "Remove",
        vec![DataType::Int32, DataType::Int32],
        DataType::String
    );
    pub static ref STRING_INSERT: MethodInfo = string_method(
        "Insert",
        vec![DataType::Int32, DataType::String],
        DataType::String
    );
    pub static ref STRING_REPLACE: MethodInfo = string_method(
        "Replace",
        vec![DataType::String, DataType::String],
        DataType::String
    );
    pub static ref STRING_TO_UPPER: MethodInfo =
        string_method("ToUpper", Vec::new(), DataType::String);
    pub static ref STRING_TO_LOWER: MethodInfo =
        string_method("ToLower", Vec::new(), DataType::String);
    pub static ref STRING_TRIM: MethodInfo = string_method("Trim", Vec::new(), DataType::String);
    pub static ref STRING_TRIM_START: MethodInfo =
        string_method("TrimStart", Vec::new(), DataType::String);
    pub static ref STRING_TRIM_END: MethodInfo =
        string_method("TrimEnd", Vec::new(), DataType::String);
    pub static ref STRING_GET_LENGTH: MethodInfo =
        string_method("get_Length", Vec::new(), DataType::Int32);
    pub static ref STRING_IS_NULL_OR_EMPTY: MethodInfo = MethodInfo::static_method(
        STRING,
        "IsNullOrEmpty",
        vec![DataType::String],
        DataType::Boolean
    );
    pub static ref STRING_CONCAT: MethodInfo = MethodInfo::static_method(
        STRING,
        "Concat",
        vec![DataType::String, DataType::String],
        DataType::String
    );
    pub static ref MATH_ABS_INT32: MethodInfo =
        math_method("Abs", vec![DataType::Int32], DataType::Int32);
    pub static ref MATH_ABS_DOUBLE: MethodInfo =
        math_method("Abs", vec![DataType::Double], DataType::Double);
    pub static ref MATH_CEILING: MethodInfo =
        math_method("Ceiling", vec![DataType::Double], DataType::Double);
    pub static ref MATH_FLOOR: MethodInfo =
        math_method("Floor", vec![DataType::Double], DataType::Double);
    pub static ref MATH_ROUND: MethodInfo =
        math_method("Round", vec![DataType::Double], DataType::Double);
    pub static ref MATH_SQRT: MethodInfo =
        math_method("Sqrt", vec![DataType::Double], DataType::Double);
    pub static ref MATH_POW: MethodInfo = math_method(
        "Pow",
        vec![DataType::Double, DataType::Double],
        DataType::Double
    );
    pub static ref MATH_EXP: MethodInfo =
        math_method("Exp", vec![DataType::Double], DataType::Double);
    pub static ref MATH_LOG: MethodInfo =
        math_method("Log", vec![DataType::Double], DataType::Double);
    pub static ref MATH_SIGN: MethodInfo =
        math_method("Sign", vec![DataType::Double], DataType::Int32);
    /// Open generic `Enumerable.Contains<T>(IEnumerable<T>, T)`.
    pub static ref ENUMERABLE_CONTAINS_DEFINITION: MethodInfo = MethodInfo::static_method(
        "Enumerable",
        "Contains<T>",
        vec![DataType::sequence_of(DataType::Object), DataType::Object],
        DataType::Boolean
    );
}

/// Closed `Enumerable.Contains<T>` for a concrete item type.
pub fn enumerable_contains(item_type: DataType) -> MethodInfo {
    MethodInfo::static_method(
        "Enumerable",
        format!("Contains<{}>", item_type),
        vec![DataType::sequence_of(item_type.clone()), item_type],
        DataType::Boolean,
    )
    .with_generic_definition(ENUMERABLE_CONTAINS_DEFINITION.clone())
}

/// `ToString()` declared on `declaring_type`; transformed by name, whatever the type.
pub fn to_string_method(declaring_type: &DataType) -> MethodInfo {
    MethodInfo::instance(
        declaring_type.to_string(),
        "ToString",
        Vec::new(),
        DataType::String,
    )
}

/// `Equals(Object)` declared on `declaring_type`.
pub fn equals_method(declaring_type: &DataType) -> MethodInfo {
    MethodInfo::instance(
        declaring_type.to_string(),
        "Equals",
        vec![DataType::Object],
        DataType::Boolean,
    )
}

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::preparation::errors::PreparationError;
use crate::preparation::method_call_transformers as transformers;
use crate::query_model::known_methods::*;
use crate::query_model::{MethodInfo, MethodKey};
use crate::sql_statement::SqlExpr;

use super::errors::RegistryError;

/// A method call whose object and arguments have already been prepared.
#[derive(Debug, Clone)]
pub struct SqlMethodCall {
    pub method: MethodInfo,
    pub object: Option<SqlExpr>,
    pub arguments: Vec<SqlExpr>,
    /// Text of the input expression, for error messages.
    pub original: String,
}

impl SqlMethodCall {
    pub fn argument(&self, index: usize) -> Result<&SqlExpr, PreparationError> {
        self.arguments.get(index).ok_or_else(|| {
            PreparationError::unsupported_expression(
                &self.original,
                format!("'{}' expects at least {} argument(s)", self.method, index + 1),
            )
        })
    }

    pub fn object(&self) -> Result<&SqlExpr, PreparationError> {
        self.object.as_ref().ok_or_else(|| {
            PreparationError::unsupported_expression(
                &self.original,
                format!("'{}' must be called on an instance", self.method),
            )
        })
    }

    /// The object of an instance call, or the first argument of a static one.
    pub fn subject(&self) -> Result<&SqlExpr, PreparationError> {
        match &self.object {
            Some(object) => Ok(object),
            None => self.argument(0),
        }
    }
}

pub trait MethodCallTransformer: Send + Sync {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError>;
}

/// A transformer attached directly to a method declaration.
#[derive(Clone)]
pub struct TransformerAttribute(Arc<dyn MethodCallTransformer>);

impl TransformerAttribute {
    pub fn new(transformer: impl MethodCallTransformer + 'static) -> Self {
        TransformerAttribute(Arc::new(transformer))
    }

    pub fn transformer(&self) -> Arc<dyn MethodCallTransformer> {
        Arc::clone(&self.0)
    }
}

impl fmt::Debug for TransformerAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransformerAttribute({:p})", Arc::as_ptr(&self.0))
    }
}

pub trait MethodCallTransformerProvider: Send + Sync {
    fn get_transformer(
        &self,
        method: &MethodInfo,
    ) -> Result<Option<Arc<dyn MethodCallTransformer>>, RegistryError>;
}

/// Transformers keyed by exact method signature.
///
/// Lookup falls back to the method's generic definition, then to its base definition.
#[derive(Default)]
pub struct MethodInfoBasedMethodCallTransformerRegistry {
    transformers: HashMap<MethodKey, Arc<dyn MethodCallTransformer>>,
}

impl MethodInfoBasedMethodCallTransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_default() -> Self {
        let mut registry = Self::new();

        registry.register(&STRING_CONTAINS, transformers::like::ContainsTransformer);
        registry.register(&STRING_STARTS_WITH, transformers::like::StartsWithTransformer);
        registry.register(&STRING_ENDS_WITH, transformers::like::EndsWithTransformer);
        registry.register(&SQL_METHODS_LIKE, transformers::like::LikeTransformer);

        registry.register_all(
            [&*STRING_INDEX_OF, &*STRING_INDEX_OF_FROM],
            transformers::string::IndexOfTransformer,
        );
        registry.register_all(
            [&*STRING_SUBSTRING, &*STRING_SUBSTRING_LENGTH],
            transformers::string::SubstringTransformer,
        );
        registry.register_all(
            [&*STRING_REMOVE, &*STRING_REMOVE_COUNT],
            transformers::string::RemoveTransformer,
        );
        registry.register(&STRING_INSERT, transformers::string::InsertTransformer);
        registry.register(&STRING_REPLACE, transformers::string::ReplaceTransformer);
        registry.register(&STRING_TO_UPPER, transformers::string::ToUpperTransformer);
        registry.register(&STRING_TO_LOWER, transformers::string::ToLowerTransformer);
        registry.register_all(
            [&*STRING_TRIM, &*STRING_TRIM_START, &*STRING_TRIM_END],
            transformers::string::TrimTransformer,
        );
        registry.register(&STRING_GET_LENGTH, transformers::string::LengthTransformer);
        registry.register(
            &STRING_IS_NULL_OR_EMPTY,
            transformers::string::IsNullOrEmptyTransformer,
        );
        registry.register(&STRING_CONCAT, transformers::string::ConcatTransformer);

        registry.register_all(
            [
                &*MATH_ABS_INT32,
                &*MATH_ABS_DOUBLE,
                &*MATH_CEILING,
                &*MATH_FLOOR,
                &*MATH_ROUND,
                &*MATH_SQRT,
                &*MATH_POW,
                &*MATH_EXP,
                &*MATH_LOG,
                &*MATH_SIGN,
            ],
            transformers::math::MathFunctionTransformer,
        );

        registry.register(
            &ENUMERABLE_CONTAINS_DEFINITION,
            transformers::contains::EnumerableContainsTransformer,
        );

        registry
    }

    pub fn register(
        &mut self,
        method: &MethodInfo,
        transformer: impl MethodCallTransformer + 'static,
    ) {
        self.register_shared(method, Arc::new(transformer));
    }

    pub fn register_shared(&mut self, method: &MethodInfo, transformer: Arc<dyn MethodCallTransformer>) {
        self.transformers.insert(method.key(), transformer);
    }

    pub fn register_all<'m>(
        &mut self,
        methods: impl IntoIterator<Item = &'m MethodInfo>,
        transformer: impl MethodCallTransformer + 'static,
    ) {
        let transformer: Arc<dyn MethodCallTransformer> = Arc::new(transformer);
        for method in methods {
            self.register_shared(method, Arc::clone(&transformer));
        }
    }

    pub fn get_item_exact(&self, method: &MethodInfo) -> Option<Arc<dyn MethodCallTransformer>> {
        self.transformers.get(&method.key()).cloned()
    }

    fn lookup(&self, method: &MethodInfo) -> Option<Arc<dyn MethodCallTransformer>> {
        self.get_item_exact(method)
            .or_else(|| {
                method
                    .generic_definition
                    .as_deref()
                    .and_then(|definition| self.lookup(definition))
            })
            .or_else(|| {
                method
                    .base_definition
                    .as_deref()
                    .and_then(|definition| self.lookup(definition))
            })
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }
}

impl MethodCallTransformerProvider for MethodInfoBasedMethodCallTransformerRegistry {
    fn get_transformer(
        &self,
        method: &MethodInfo,
    ) -> Result<Option<Arc<dyn MethodCallTransformer>>, RegistryError> {
        Ok(self.lookup(method))
    }
}

/// Transformers keyed by method name alone, whatever the declaring type.
#[derive(Default)]
pub struct NameBasedMethodCallTransformerRegistry {
    transformers: HashMap<String, Arc<dyn MethodCallTransformer>>,
}

impl NameBasedMethodCallTransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_default() -> Self {
        let mut registry = Self::new();
        registry.register("ToString", transformers::conversion::ToStringTransformer);
        registry.register("Equals", transformers::conversion::EqualsTransformer);
        registry
    }

    pub fn register(&mut self, name: &str, transformer: impl MethodCallTransformer + 'static) {
        self.transformers
            .insert(name.to_string(), Arc::new(transformer));
    }
}

impl MethodCallTransformerProvider for NameBasedMethodCallTransformerRegistry {
    fn get_transformer(
        &self,
        method: &MethodInfo,
    ) -> Result<Option<Arc<dyn MethodCallTransformer>>, RegistryError> {
        Ok(self.transformers.get(&method.name).cloned())
    }
}

/// Uses the transformer attribute declared on the method itself, if any.
#[derive(Debug, Default)]
pub struct AttributeEvaluatingMethodCallTransformerProvider;

impl MethodCallTransformerProvider for AttributeEvaluatingMethodCallTransformerProvider {
    fn get_transformer(
        &self,
        method: &MethodInfo,
    ) -> Result<Option<Arc<dyn MethodCallTransformer>>, RegistryError> {
        match method.transformer_attributes.as_slice() {
            [] => Ok(None),
            [attribute] => Ok(Some(attribute.transformer())),
            attributes => {
                log::warn!(
                    "Method {} carries {} transformer attributes",
                    method,
                    attributes.len()
                );
                Err(RegistryError::AmbiguousTransformerAttributes {
                    method: method.to_string(),
                    count: attributes.len(),
                })
            }
        }
    }
}

/// Asks each provider in order and returns the first transformer found.
pub struct CompoundMethodCallTransformerProvider {
    providers: Vec<Box<dyn MethodCallTransformerProvider>>,
}

impl CompoundMethodCallTransformerProvider {
    pub fn new(providers: Vec<Box<dyn MethodCallTransformerProvider>>) -> Self {
        CompoundMethodCallTransformerProvider { providers }
    }

    /// Attributes first, then exact signatures, then names.
    pub fn create_default() -> Self {
        Self::new(vec![
            Box::new(AttributeEvaluatingMethodCallTransformerProvider),
            Box::new(MethodInfoBasedMethodCallTransformerRegistry::create_default()),
            Box::new(NameBasedMethodCallTransformerRegistry::create_default()),
        ])
    }

    pub fn providers(&self) -> &[Box<dyn MethodCallTransformerProvider>] {
        &self.providers
    }
}

impl MethodCallTransformerProvider for CompoundMethodCallTransformerProvider {
    fn get_transformer(
        &self,
        method: &MethodInfo,
    ) -> Result<Option<Arc<dyn MethodCallTransformer>>, RegistryError> {
        for provider in &self.providers {
            if let Some(transformer) = provider.get_transformer(method)? {
                return Ok(Some(transformer));
            }
        }
        Ok(None)
    }
}

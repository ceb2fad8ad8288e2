//! Strategy tables consulted by the preparation stage.
//!
//! Method calls found in query expressions are lowered by a [`MethodCallTransformer`]
//! looked up through a [`MethodCallTransformerProvider`]; result operators are applied
//! by a [`ResultOperatorHandler`] looked up by operator kind.

pub mod errors;
pub mod method_call;
pub mod result_operator;

pub use errors::RegistryError;
pub use method_call::{
    AttributeEvaluatingMethodCallTransformerProvider, CompoundMethodCallTransformerProvider,
    MethodCallTransformer, MethodCallTransformerProvider,
    MethodInfoBasedMethodCallTransformerRegistry, NameBasedMethodCallTransformerRegistry,
    SqlMethodCall, TransformerAttribute,
};
pub use result_operator::{ResultOperatorHandler, ResultOperatorHandlerRegistry};

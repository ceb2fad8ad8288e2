//! Integration tests - whole query models compiled against the fixture schema
//!
//! Every test goes through `QueryCompiler::compile` and checks the generated command
//! text, parameters and projection.

mod compiler_tests;
mod error_tests;
mod fixtures;
mod joins_tests;
mod method_call_tests;
mod mock_resolver_tests;
mod result_operator_tests;
mod select_tests;
mod sub_query_tests;

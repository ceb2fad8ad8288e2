//! linqsql - compiles structured query models into parameterized SQL.
//!
//! A query model (a main from clause, body clauses, a select expression and result
//! operators) passes through three stages:
//! - preparation turns it into an unresolved SQL statement model
//! - mapping resolution binds tables, columns and navigations through a [`MappingResolver`]
//! - SQL generation renders command text, positional parameters and an in-memory projection
//!
//! [`QueryCompiler`] chains the stages.

pub mod alias_generator;
pub mod compiler;
pub mod config;
pub mod context;
pub mod errors;
pub mod mapping_resolution;
pub mod preparation;
pub mod query_model;
pub mod registries;
pub mod sql_generation;
pub mod sql_statement;
pub mod testing;

pub use alias_generator::AliasGenerator;
pub use compiler::{compile_query, QueryCompiler};
pub use config::{CompilerConfig, ConfigError};
pub use errors::{ErrorKind, QueryCompilerError};
pub use mapping_resolution::MappingResolver;
pub use query_model::QueryModel;
pub use sql_generation::{CommandParameter, SqlCommandData};

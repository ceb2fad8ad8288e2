//! Mapping resolution: replaces the unresolved parts of a prepared statement with
//! tables, columns and predicates supplied by a [`MappingResolver`].
//!
//! Tables are resolved first, in order, so that expressions can read them through
//! their table keys. Nested statements are resolved recursively, each in its own scope
//! of tables; navigations become left joins on the table they start from, deduplicated
//! per member.

mod context;
pub mod errors;
mod expression;
mod naming;
pub mod resolver;
mod statement;

use crate::alias_generator::AliasGenerator;
use crate::sql_statement::SqlStatement;

pub use context::MappingResolutionContext;
pub use errors::MappingResolutionError;
pub use resolver::MappingResolver;

pub struct MappingResolutionStage<'a> {
    resolver: &'a dyn MappingResolver,
    optimize_member_access: bool,
}

impl<'a> MappingResolutionStage<'a> {
    pub fn new(resolver: &'a dyn MappingResolver) -> Self {
        MappingResolutionStage {
            resolver,
            optimize_member_access: true,
        }
    }

    /// With `false`, every navigation is answered by a join, even where the origin
    /// holds a foreign key to the target.
    pub fn with_optimize_member_access(mut self, optimize_member_access: bool) -> Self {
        self.optimize_member_access = optimize_member_access;
        self
    }

    pub fn resolver(&self) -> &dyn MappingResolver {
        self.resolver
    }

    pub fn optimize_member_access(&self) -> bool {
        self.optimize_member_access
    }

    pub fn resolve_sql_statement(
        &self,
        statement: SqlStatement,
        generator: &mut AliasGenerator,
    ) -> Result<SqlStatement, MappingResolutionError> {
        let mut context = MappingResolutionContext::new();
        let resolved = statement::resolve_statement(self, statement, &mut context, generator)?;
        log::debug!("Resolved statement: {}", resolved);
        Ok(resolved)
    }
}

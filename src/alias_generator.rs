//! Unique table aliases and table keys for one compilation.

use std::collections::HashMap;

use crate::config::CompilerConfig;
use crate::sql_statement::TableKey;

/// Hands out `t0, t1, ...` for physical tables and `q0, q1, ...` for derived tables,
/// in creation order. One generator serves one top-level query.
#[derive(Debug, Clone)]
pub struct AliasGenerator {
    table_prefix: String,
    sub_statement_prefix: String,
    counters: HashMap<String, usize>,
    next_table_key: usize,
}

impl Default for AliasGenerator {
    fn default() -> Self {
        AliasGenerator::with_prefixes("t", "q")
    }
}

impl AliasGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefixes(table_prefix: &str, sub_statement_prefix: &str) -> Self {
        AliasGenerator {
            table_prefix: table_prefix.to_string(),
            sub_statement_prefix: sub_statement_prefix.to_string(),
            counters: HashMap::new(),
            next_table_key: 0,
        }
    }

    pub fn from_config(config: &CompilerConfig) -> Self {
        AliasGenerator::with_prefixes(&config.table_alias_prefix, &config.sub_statement_alias_prefix)
    }

    pub fn get_unique_identifier(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        let identifier = format!("{}{}", prefix, counter);
        *counter += 1;
        identifier
    }

    pub fn table_alias(&mut self) -> String {
        let prefix = self.table_prefix.clone();
        self.get_unique_identifier(&prefix)
    }

    pub fn sub_statement_alias(&mut self) -> String {
        let prefix = self.sub_statement_prefix.clone();
        self.get_unique_identifier(&prefix)
    }

    pub fn next_table_key(&mut self) -> TableKey {
        let key = TableKey(self.next_table_key);
        self.next_table_key += 1;
        key
    }
}

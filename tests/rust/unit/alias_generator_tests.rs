//! Unit tests for alias and table key generation

#[cfg(test)]
mod alias_generator_tests {
    use linqsql::{AliasGenerator, CompilerConfig};

    #[test]
    fn test_table_and_sub_statement_counters_are_independent() {
        let mut generator = AliasGenerator::new();

        assert_eq!(generator.table_alias(), "t0");
        assert_eq!(generator.sub_statement_alias(), "q0");
        assert_eq!(generator.table_alias(), "t1");
        assert_eq!(generator.sub_statement_alias(), "q1");
    }

    #[test]
    fn test_prefixes_from_config() {
        let config = CompilerConfig {
            table_alias_prefix: "tab".to_string(),
            sub_statement_alias_prefix: "sub".to_string(),
            ..Default::default()
        };
        let mut generator = AliasGenerator::from_config(&config);

        assert_eq!(generator.table_alias(), "tab0");
        assert_eq!(generator.sub_statement_alias(), "sub0");
    }

    #[test]
    fn test_custom_prefix_has_own_counter() {
        let mut generator = AliasGenerator::new();
        generator.table_alias();

        assert_eq!(generator.get_unique_identifier("a"), "a0");
        assert_eq!(generator.get_unique_identifier("a"), "a1");
        assert_eq!(generator.table_alias(), "t1");
    }

    #[test]
    fn test_table_keys_are_unique() {
        let mut generator = AliasGenerator::new();
        let first = generator.next_table_key();
        let second = generator.next_table_key();
        assert_ne!(first, second);
    }
}

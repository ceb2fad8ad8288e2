//! Unit tests for loading `CompilerConfig` from YAML files and the environment

#[cfg(test)]
mod config_tests {
    use std::env;
    use std::io::Write;

    use linqsql::{CompilerConfig, ConfigError};
    use serial_test::serial;
    use tempfile::NamedTempFile;
    use test_case::test_case;

    fn yaml_file(content: &str) -> anyhow::Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(content.as_bytes())?;
        Ok(file)
    }

    #[test]
    fn test_load_yaml_file() -> anyhow::Result<()> {
        let file = yaml_file(
            "parameter_prefix: \":p\"\n\
             table_alias_prefix: \"tab\"\n\
             sub_statement_alias_prefix: \"sub\"\n\
             max_statement_depth: 8\n\
             optimize_member_access: false\n",
        )?;

        let config = CompilerConfig::from_yaml_file(file.path())?;

        assert_eq!(config.parameter_prefix, ":p");
        assert_eq!(config.table_alias_prefix, "tab");
        assert_eq!(config.sub_statement_alias_prefix, "sub");
        assert_eq!(config.max_statement_depth, 8);
        assert!(!config.optimize_member_access);
        Ok(())
    }

    #[test]
    fn test_empty_yaml_document_uses_defaults() -> anyhow::Result<()> {
        let file = yaml_file("{}\n")?;
        let config = CompilerConfig::from_yaml_file(file.path())?;
        assert_eq!(config, CompilerConfig::default());
        Ok(())
    }

    #[test]
    fn test_missing_yaml_file() {
        let result = CompilerConfig::from_yaml_file("/nonexistent/linqsql.yaml");
        match result {
            Err(ConfigError::Parse { field, .. }) => assert_eq!(field, "yaml_file"),
            other => panic!("expected a file read error, got {:?}", other),
        }
    }

    #[test_case("max_statement_depth: 0\n" ; "depth below range")]
    #[test_case("max_statement_depth: 2048\n" ; "depth above range")]
    #[test_case("parameter_prefix: \"\"\n" ; "empty parameter prefix")]
    #[test_case("table_alias_prefix: \"q\"\n" ; "table prefix equals sub-statement prefix")]
    #[test_case("sub_statement_alias_prefix: \"tx\"\n" ; "sub-statement prefix extends table prefix")]
    fn test_invalid_yaml_is_rejected(content: &str) {
        let result = CompilerConfig::from_yaml_str(content);
        assert!(
            matches!(result, Err(ConfigError::Validation(_))),
            "accepted {:?}",
            content
        );
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        for key in [
            "LINQSQL_PARAMETER_PREFIX",
            "LINQSQL_TABLE_ALIAS_PREFIX",
            "LINQSQL_SUB_STATEMENT_ALIAS_PREFIX",
            "LINQSQL_MAX_STATEMENT_DEPTH",
            "LINQSQL_OPTIMIZE_MEMBER_ACCESS",
        ] {
            env::remove_var(key);
        }

        let config = CompilerConfig::from_env().unwrap();

        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_validates() {
        env::set_var("LINQSQL_TABLE_ALIAS_PREFIX", "q");
        let result = CompilerConfig::from_env();
        env::remove_var("LINQSQL_TABLE_ALIAS_PREFIX");

        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    #[serial]
    fn test_from_env_alias_prefixes() {
        env::set_var("LINQSQL_TABLE_ALIAS_PREFIX", "tbl");
        env::set_var("LINQSQL_SUB_STATEMENT_ALIAS_PREFIX", "sq");
        let result = CompilerConfig::from_env();
        env::remove_var("LINQSQL_TABLE_ALIAS_PREFIX");
        env::remove_var("LINQSQL_SUB_STATEMENT_ALIAS_PREFIX");

        let config = result.unwrap();
        assert_eq!(config.table_alias_prefix, "tbl");
        assert_eq!(config.sub_statement_alias_prefix, "sq");
    }
}

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Compiler configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize, PartialEq)]
#[validate(schema(function = "validate_alias_prefixes"))]
#[serde(default)]
pub struct CompilerConfig {
    /// Prefix of positional parameter names (`@1`, `@2`, ...)
    #[validate(length(min = 1, message = "Parameter prefix cannot be empty"))]
    pub parameter_prefix: String,

    /// Prefix of physical table aliases (`t0`, `t1`, ...)
    #[validate(length(
        min = 1,
        max = 8,
        message = "Table alias prefix must be 1 to 8 characters"
    ))]
    pub table_alias_prefix: String,

    /// Prefix of derived table aliases (`q0`, `q1`, ...)
    #[validate(length(
        min = 1,
        max = 8,
        message = "Sub-statement alias prefix must be 1 to 8 characters"
    ))]
    pub sub_statement_alias_prefix: String,

    /// Maximum nesting of query models inside one query
    #[validate(range(
        min = 1,
        max = 1024,
        message = "Max statement depth must be between 1 and 1024"
    ))]
    pub max_statement_depth: u32,

    /// Whether navigations may be answered from foreign-key columns instead of joins
    pub optimize_member_access: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            parameter_prefix: "@".to_string(),
            table_alias_prefix: "t".to_string(),
            sub_statement_alias_prefix: "q".to_string(),
            max_statement_depth: 64,
            optimize_member_access: true,
        }
    }
}

/// Aliases are prefix + counter, so one prefix must not extend the other
/// (`t` + `10` and `t1` + `0` would both yield `t10`).
fn validate_alias_prefixes(config: &CompilerConfig) -> Result<(), ValidationError> {
    let table = &config.table_alias_prefix;
    let sub_statement = &config.sub_statement_alias_prefix;
    if table.starts_with(sub_statement.as_str()) || sub_statement.starts_with(table.as_str()) {
        return Err(ValidationError::new("alias_prefixes_overlap"));
    }
    Ok(())
}

impl CompilerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            parameter_prefix: env::var("LINQSQL_PARAMETER_PREFIX")
                .unwrap_or(defaults.parameter_prefix),
            table_alias_prefix: env::var("LINQSQL_TABLE_ALIAS_PREFIX")
                .unwrap_or(defaults.table_alias_prefix),
            sub_statement_alias_prefix: env::var("LINQSQL_SUB_STATEMENT_ALIAS_PREFIX")
                .unwrap_or(defaults.sub_statement_alias_prefix),
            max_statement_depth: parse_env_var("LINQSQL_MAX_STATEMENT_DEPTH", "64")?,
            optimize_member_access: parse_env_var("LINQSQL_OPTIMIZE_MEMBER_ACCESS", "true")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load a `.env` file (if present) before reading the environment
    pub fn from_dotenv() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env file loaded: {}", e);
        }
        Self::from_env()
    }

    /// Create configuration from a YAML document; missing fields take their defaults
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content.to_string(),
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        Self::from_yaml_str(&content)
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}

//! Runtime configuration loaded from TOML.
//!
//! ```toml
//! [sort]
//! mode = "strict"
//!
//! [sql]
//! dialect = "postgres"
//! ```
//!
//! Every table and key is optional; missing values fall back to the
//! permissive sort parser and the ANSI dialect.
use crate::{error::ErrorOrigin, query::parse::SortParseMode};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use tracing::debug;

#[cfg(feature = "sql")]
use crate::provider::sql::SqlDialect;

///
/// QueryConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    pub sort: SortConfig,

    #[cfg(feature = "sql")]
    pub sql: SqlConfig,
}

impl QueryConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|err| ConfigError::Toml {
            message: err.to_string(),
        })?;
        debug!(sort_mode = ?config.sort.mode, "loaded query config");

        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|err| ConfigError::Toml {
            message: err.to_string(),
        })
    }
}

///
/// SortConfig
/// How textual sort specifications are parsed.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SortConfig {
    pub mode: SortParseMode,
}

///
/// SqlConfig
///

#[cfg(feature = "sql")]
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SqlConfig {
    pub dialect: SqlDialect,
}

///
/// ConfigError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("invalid query config: {message}")]
    Toml { message: String },
}

impl ConfigError {
    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        ErrorOrigin::Config
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = QueryConfig::from_toml_str("").expect("empty config");

        assert_eq!(config, QueryConfig::default());
        assert_eq!(config.sort.mode, SortParseMode::Permissive);
    }

    #[test]
    fn reads_sort_mode() {
        let config = QueryConfig::from_toml_str("[sort]\nmode = \"strict\"\n").expect("config");

        assert_eq!(config.sort.mode, SortParseMode::Strict);
    }

    #[cfg(feature = "sql")]
    #[test]
    fn reads_sql_dialect() {
        let config = QueryConfig::from_toml_str("[sql]\ndialect = \"sqlite\"\n").expect("config");

        assert_eq!(config.sql.dialect, SqlDialect::Sqlite);
        assert_eq!(config.sort.mode, SortParseMode::Permissive);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = QueryConfig::from_toml_str("[sort]\norder = \"strict\"\n").unwrap_err();

        assert!(matches!(err, ConfigError::Toml { .. }));
        assert_eq!(err.origin(), ErrorOrigin::Config);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(QueryConfig::from_toml_str("[sort]\nmode = \"loose\"\n").is_err());
    }

    #[test]
    fn serializes_back_to_toml() {
        let config = QueryConfig {
            sort: SortConfig {
                mode: SortParseMode::Strict,
            },
            ..QueryConfig::default()
        };
        let text = config.to_toml_string().expect("serialize");

        assert_eq!(QueryConfig::from_toml_str(&text).expect("reparse"), config);
    }
}

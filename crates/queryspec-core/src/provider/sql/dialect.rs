use serde::{Deserialize, Serialize};
use std::fmt;

///
/// SqlDialect
///
/// Rendering differences between supported targets: placeholders, paging,
/// pattern matching and bitwise support.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlDialect {
    #[default]
    Ansi,
    Postgres,
    Sqlite,
}

impl SqlDialect {
    /// Placeholder for the `index`-th parameter (1-based).
    #[must_use]
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Self::Ansi | Self::Sqlite => "?".to_string(),
            Self::Postgres => format!("${index}"),
        }
    }

    #[must_use]
    pub const fn supports_bitwise(self) -> bool {
        !matches!(self, Self::Ansi)
    }

    /// Double-quoted identifier with embedded quotes doubled.
    #[must_use]
    pub fn quote(self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Paging suffix; empty when neither bound is set.
    #[must_use]
    pub fn paging(self, offset: u64, limit: Option<u64>) -> String {
        let mut parts = Vec::new();

        match self {
            Self::Ansi => {
                if offset > 0 {
                    parts.push(format!("OFFSET {offset} ROWS"));
                }
                if let Some(limit) = limit {
                    parts.push(format!("FETCH FIRST {limit} ROWS ONLY"));
                }
            }
            Self::Postgres => {
                if let Some(limit) = limit {
                    parts.push(format!("LIMIT {limit}"));
                }
                if offset > 0 {
                    parts.push(format!("OFFSET {offset}"));
                }
            }
            Self::Sqlite => {
                // sqlite only accepts OFFSET after a LIMIT
                match (limit, offset) {
                    (Some(limit), _) => parts.push(format!("LIMIT {limit}")),
                    (None, o) if o > 0 => parts.push("LIMIT -1".to_string()),
                    (None, _) => {}
                }
                if offset > 0 {
                    parts.push(format!("OFFSET {offset}"));
                }
            }
        }

        parts.join(" ")
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ansi => "ansi",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        })
    }
}

/// Rewrite a `%` / `_` pattern as a case-sensitive sqlite `GLOB` pattern.
pub(crate) fn like_to_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '%' => glob.push('*'),
            '_' => glob.push('?'),
            '*' => glob.push_str("[*]"),
            '?' => glob.push_str("[?]"),
            '[' => glob.push_str("[[]"),
            other => glob.push(other),
        }
    }

    glob
}

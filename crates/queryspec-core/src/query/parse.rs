//! Textual sort grammar.
//!
//! ```text
//! sortSpec  := term (',' term)*
//! term      := path direction?
//! direction := 'asc' | 'ascending' | 'desc' | 'descending' | otherToken
//! ```
//!
//! Keywords are case-insensitive and surrounding whitespace is ignored.
use crate::{
    error::ParseError,
    query::{
        path::FieldPath,
        sort::{Direction, SortKey},
    },
};
use serde::{Deserialize, Serialize};
use tracing::trace;

///
/// SortParseMode
///
/// `Permissive` treats any direction token that is not an ascending keyword
/// as descending. `Strict` rejects tokens other than the four keywords.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortParseMode {
    #[default]
    Permissive,
    Strict,
}

/// Parse a sort specification into ordered keys with named paths.
pub fn parse_sort(text: &str, mode: SortParseMode) -> Result<Vec<SortKey>, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let keys = text
        .split(',')
        .enumerate()
        .map(|(position, term)| parse_term(term, position, mode))
        .collect::<Result<Vec<_>, _>>()?;

    trace!(input = text, terms = keys.len(), "parsed sort spec");

    Ok(keys)
}

fn parse_term(term: &str, position: usize, mode: SortParseMode) -> Result<SortKey, ParseError> {
    let mut tokens = term.split_whitespace();

    let Some(path) = tokens.next() else {
        return Err(ParseError::EmptyTerm { position });
    };
    let path = FieldPath::parse(path)?;

    let direction = match tokens.next() {
        Some(token) => parse_direction(token, mode)?,
        None => Direction::Asc,
    };

    if let Some(extra) = tokens.next() {
        return Err(ParseError::UnexpectedToken {
            token: extra.to_string(),
            term: term.trim().to_string(),
        });
    }

    Ok(SortKey { path, direction })
}

fn parse_direction(token: &str, mode: SortParseMode) -> Result<Direction, ParseError> {
    let lower = token.to_ascii_lowercase();

    match (lower.as_str(), mode) {
        ("asc" | "ascending", _) => Ok(Direction::Asc),
        ("desc" | "descending", _) | (_, SortParseMode::Permissive) => Ok(Direction::Desc),
        (_, SortParseMode::Strict) => Err(ParseError::UnknownDirection {
            token: token.to_string(),
        }),
    }
}

///
/// TESTS
///

use crate::query::path::FieldPath;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Direction
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn is_desc(self) -> bool {
        matches!(self, Self::Desc)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

///
/// SortKey
/// One ordering term. Nulls sort first ascending and last descending.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SortKey {
    pub path: FieldPath,
    pub direction: Direction,
}

impl SortKey {
    #[must_use]
    pub fn new(path: impl Into<FieldPath>, direction: Direction) -> Self {
        Self {
            path: path.into(),
            direction,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.direction)
    }
}

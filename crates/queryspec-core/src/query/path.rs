use crate::error::ParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

///
/// PathBinding
///
/// How a path was created. `Static` paths come from code and are checked
/// against a typed spec's shape at the builder call; `Named` paths come from
/// text and are only resolved when the spec is executed or translated.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PathBinding {
    Named,
    Static,
}

///
/// FieldPath
///
/// Dotted member path. Equality and hashing consider segments only, so a
/// static and a named path to the same field are interchangeable.
///

#[derive(Clone, Debug)]
pub struct FieldPath {
    segments: Vec<String>,
    binding: PathBinding,
}

impl FieldPath {
    /// Statically bound path written in code (`"address.city"`).
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            segments: path.split('.').map(str::to_string).collect(),
            binding: PathBinding::Static,
        }
    }

    /// Parse a string-addressed path; binding is deferred to execution.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseError::InvalidPath {
                path: text.to_string(),
            });
        }

        let segments = text
            .split('.')
            .map(|segment| {
                if is_valid_segment(segment) {
                    Ok(segment.to_string())
                } else {
                    Err(ParseError::InvalidPath {
                        path: text.to_string(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            segments,
            binding: PathBinding::Named,
        })
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub const fn binding(&self) -> PathBinding {
        self.binding
    }

    #[must_use]
    pub const fn is_static(&self) -> bool {
        matches!(self.binding, PathBinding::Static)
    }

    /// Dotted form used as the lookup key in shapes and rows.
    #[must_use]
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// Same segments, rebound as a named path.
    #[must_use]
    pub fn into_named(self) -> Self {
        Self {
            binding: PathBinding::Named,
            ..self
        }
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

impl PartialEq for FieldPath {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for FieldPath {}

impl Hash for FieldPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments.hash(state);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<&String> for FieldPath {
    fn from(path: &String) -> Self {
        Self::new(path)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.dotted())
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

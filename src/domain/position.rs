//! Position descriptors and their resolution to child-list indices.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::domain::error::{NestError, NestResult};

/// End of the descendant list a node is added to or removed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Position {
    /// Head of the list.
    First,
    /// Tail of the list.
    #[default]
    Last,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::First => "first",
            Position::Last => "last",
        }
    }

    /// Index at which a new child is inserted into a list of `len` children.
    #[must_use]
    pub fn insert_index(self, len: usize) -> usize {
        match self {
            Position::First => 0,
            Position::Last => len,
        }
    }

    /// Index of the child removed from a list of `len` children.
    ///
    /// Returns `None` for an empty list.
    #[must_use]
    pub fn remove_index(self, len: usize) -> Option<usize> {
        match (self, len) {
            (_, 0) => None,
            (Position::First, _) => Some(0),
            (Position::Last, n) => Some(n - 1),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = NestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(Position::First),
            "last" => Ok(Position::Last),
            other => Err(NestError::InvalidPosition(other.to_string())),
        }
    }
}

/// Loosely-typed position: a resolved [`Position`], an unparsed token, or a
/// signed offset into the descendant list.
///
/// Tokens are validated when the descriptor is resolved, so a descriptor read
/// from configuration only fails once it is actually used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "toml::Value")]
pub enum Descriptor {
    At(Position),
    Token(String),
    Offset(i64),
}

impl Default for Descriptor {
    fn default() -> Self {
        Descriptor::At(Position::Last)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::At(p) => p.fmt(f),
            Descriptor::Token(t) => write!(f, "{:?}", t),
            Descriptor::Offset(o) => write!(f, "offset {}", o),
        }
    }
}

impl From<Position> for Descriptor {
    fn from(p: Position) -> Self {
        Descriptor::At(p)
    }
}

impl From<&str> for Descriptor {
    fn from(s: &str) -> Self {
        Descriptor::Token(s.to_string())
    }
}

impl From<String> for Descriptor {
    fn from(s: String) -> Self {
        Descriptor::Token(s)
    }
}

impl From<i64> for Descriptor {
    fn from(o: i64) -> Self {
        Descriptor::Offset(o)
    }
}

impl From<i32> for Descriptor {
    fn from(o: i32) -> Self {
        Descriptor::Offset(i64::from(o))
    }
}

impl TryFrom<toml::Value> for Descriptor {
    type Error = NestError;

    fn try_from(value: toml::Value) -> Result<Self, Self::Error> {
        match value {
            toml::Value::String(s) => Ok(Descriptor::Token(s)),
            toml::Value::Integer(i) => Ok(Descriptor::Offset(i)),
            other => Err(NestError::InvalidArgumentKind(other.type_str().to_string())),
        }
    }
}

impl TryFrom<&toml::Value> for Descriptor {
    type Error = NestError;

    fn try_from(value: &toml::Value) -> Result<Self, Self::Error> {
        Descriptor::try_from(value.clone())
    }
}

/// Resolves a descriptor to the index a new child is inserted at.
///
/// Offsets past either end are clamped: `>= len` acts as `last`,
/// `<= -len` acts as `first`.
pub fn resolve_insert(descriptor: &Descriptor, len: usize) -> NestResult<usize> {
    match descriptor {
        Descriptor::At(p) => Ok(p.insert_index(len)),
        Descriptor::Token(t) => Ok(t.parse::<Position>()?.insert_index(len)),
        Descriptor::Offset(offset) => {
            let magnitude = usize::try_from(offset.unsigned_abs()).unwrap_or(usize::MAX);
            if *offset >= 0 {
                Ok(magnitude.min(len))
            } else {
                Ok(len - magnitude.min(len))
            }
        }
    }
}

/// Resolves a descriptor to the index of an existing child.
///
/// # Errors
///
/// [`NestError::NotFound`] when no child occupies the slot.
pub fn resolve_remove(descriptor: &Descriptor, len: usize) -> NestResult<usize> {
    let not_found = || NestError::NotFound(descriptor.to_string());
    let index = match descriptor {
        Descriptor::At(p) => p.remove_index(len),
        Descriptor::Token(t) => t.parse::<Position>()?.remove_index(len),
        Descriptor::Offset(offset) => {
            let magnitude = usize::try_from(offset.unsigned_abs()).map_err(|_| not_found())?;
            if *offset >= 0 {
                Some(magnitude).filter(|&i| i < len)
            } else {
                len.checked_sub(magnitude)
            }
        }
    };
    index.ok_or_else(not_found)
}

/// Ordering of an ancestor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// From the root down to the immediate ancestor.
    #[default]
    Asc,
    /// From the immediate ancestor up to the root.
    Desc,
}

impl FromStr for SortOrder {
    type Err = NestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(NestError::InvalidSortOrder(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("first", Position::First)]
    #[case("FIRST", Position::First)]
    #[case("Last", Position::Last)]
    fn position_tokens_are_case_insensitive(#[case] token: &str, #[case] expected: Position) {
        assert_eq!(token.parse::<Position>().unwrap(), expected);
    }

    #[test]
    fn unknown_token_is_invalid_position() {
        let err = "middle".parse::<Position>().unwrap_err();
        assert_eq!(err, NestError::InvalidPosition("middle".into()));
    }

    #[rstest]
    #[case(Descriptor::from("first"), 3, 0)]
    #[case(Descriptor::from("last"), 3, 3)]
    #[case(Descriptor::from(1), 3, 1)]
    #[case(Descriptor::from(3), 3, 3)]
    #[case(Descriptor::from(99), 3, 3)]
    #[case(Descriptor::from(-1), 3, 2)]
    #[case(Descriptor::from(-3), 3, 0)]
    #[case(Descriptor::from(-99), 3, 0)]
    #[case(Descriptor::from(5), 0, 0)]
    #[case(Descriptor::from(-5), 0, 0)]
    #[case(Descriptor::from(i64::MIN), 2, 0)]
    fn insert_offsets_are_clamped(
        #[case] descriptor: Descriptor,
        #[case] len: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(resolve_insert(&descriptor, len).unwrap(), expected);
    }

    #[rstest]
    #[case(Descriptor::from("first"), 3, Some(0))]
    #[case(Descriptor::from("last"), 3, Some(2))]
    #[case(Descriptor::from(0), 3, Some(0))]
    #[case(Descriptor::from(2), 3, Some(2))]
    #[case(Descriptor::from(3), 3, None)]
    #[case(Descriptor::from(-1), 3, Some(2))]
    #[case(Descriptor::from(-3), 3, Some(0))]
    #[case(Descriptor::from(-4), 3, None)]
    #[case(Descriptor::from("last"), 0, None)]
    fn remove_slots(
        #[case] descriptor: Descriptor,
        #[case] len: usize,
        #[case] expected: Option<usize>,
    ) {
        match expected {
            Some(index) => assert_eq!(resolve_remove(&descriptor, len).unwrap(), index),
            None => assert!(matches!(
                resolve_remove(&descriptor, len),
                Err(NestError::NotFound(_))
            )),
        }
    }

    #[test]
    fn bad_token_fails_on_resolution() {
        let d = Descriptor::from("middle");
        assert_eq!(
            resolve_insert(&d, 2).unwrap_err(),
            NestError::InvalidPosition("middle".into())
        );
    }

    #[rstest]
    #[case(toml::Value::Boolean(true), "boolean")]
    #[case(toml::Value::Float(1.5), "float")]
    #[case(toml::Value::Array(vec![]), "array")]
    fn non_string_non_integer_values_are_rejected(#[case] value: toml::Value, #[case] kind: &str) {
        assert_eq!(
            Descriptor::try_from(value).unwrap_err(),
            NestError::InvalidArgumentKind(kind.into())
        );
    }

    #[test]
    fn sort_order_parses() {
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!(matches!(
            "sideways".parse::<SortOrder>(),
            Err(NestError::InvalidSortOrder(_))
        ));
    }
}

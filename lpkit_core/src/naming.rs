//! Parsing of structured entity names
//!
//! Variables are assumed to be named `setName[index1,index2,...,indexN]` and constraints
//! `setName(index1,index2,...,indexN)`. Everything before the opening bracket is the
//! name of the set the entity belongs to, the comma separated tokens inside the brackets
//! are its index values.
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub const VAR_BRACKET_L: char = '[';
pub const VAR_BRACKET_R: char = ']';
pub const CON_BRACKET_L: char = '(';
pub const CON_BRACKET_R: char = ')';

/// The kind of entity a name belongs to, which determines its index delimiters
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Variables, indexed as `x[1,2]`
    Variable,
    /// Constraints, indexed as `c(1,2)`
    Constraint,
}

impl EntityKind {
    /// Opening index delimiter
    pub fn open(&self) -> char {
        match self {
            EntityKind::Variable => VAR_BRACKET_L,
            EntityKind::Constraint => CON_BRACKET_L,
        }
    }

    /// Closing index delimiter
    pub fn close(&self) -> char {
        match self {
            EntityKind::Variable => VAR_BRACKET_R,
            EntityKind::Constraint => CON_BRACKET_R,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Variable => write!(f, "variable"),
            EntityKind::Constraint => write!(f, "constraint"),
        }
    }
}

/// A single index value taken from an entity name
///
/// Tokens which parse as integers become [`IndexValue::Int`], everything else is kept
/// as a string. Integers order before strings.
///
/// Build values with [`IndexValue::parse`] or the `From` impls, which never put an
/// integer token into [`IndexValue::Str`]. Deserialized strings are normalized the
/// same way.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum IndexValue {
    Int(i64),
    Str(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIndexValue {
    Int(i64),
    Str(String),
}

impl From<RawIndexValue> for IndexValue {
    fn from(value: RawIndexValue) -> Self {
        match value {
            RawIndexValue::Int(value) => IndexValue::Int(value),
            RawIndexValue::Str(value) => IndexValue::parse(&value),
        }
    }
}

impl<'de> Deserialize<'de> for IndexValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawIndexValue::deserialize(deserializer).map(IndexValue::from)
    }
}

impl IndexValue {
    /// Convert a raw index token into an index value
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        match token.parse::<i64>() {
            Ok(value) => IndexValue::Int(value),
            Err(_) => IndexValue::Str(token.to_string()),
        }
    }

    /// Can the value be written into a name of `kind` and parsed back unchanged
    fn is_composable(&self, kind: EntityKind) -> bool {
        match self {
            IndexValue::Int(_) => true,
            IndexValue::Str(token) => {
                !token.is_empty()
                    && token.trim() == token
                    && token.parse::<i64>().is_err()
                    && !token.contains([',', kind.open(), kind.close()])
            }
        }
    }
}

impl Ord for IndexValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IndexValue::Int(a), IndexValue::Int(b)) => a.cmp(b),
            (IndexValue::Str(a), IndexValue::Str(b)) => a.cmp(b),
            (IndexValue::Int(_), IndexValue::Str(_)) => Ordering::Less,
            (IndexValue::Str(_), IndexValue::Int(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for IndexValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for IndexValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexValue::Int(v) => write!(f, "{}", v),
            IndexValue::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for IndexValue {
    fn from(value: i64) -> Self {
        IndexValue::Int(value)
    }
}

impl From<i32> for IndexValue {
    fn from(value: i32) -> Self {
        IndexValue::Int(value as i64)
    }
}

impl From<usize> for IndexValue {
    fn from(value: usize) -> Self {
        IndexValue::Int(value as i64)
    }
}

impl From<&str> for IndexValue {
    fn from(value: &str) -> Self {
        IndexValue::parse(value)
    }
}

impl From<String> for IndexValue {
    fn from(value: String) -> Self {
        IndexValue::parse(&value)
    }
}

/// Map of index position to the value required at that position
pub type IndexFilter = IndexMap<usize, IndexValue>;

/// Return the name of the set an entity belongs to
///
/// This is the part of the name before the first opening delimiter, or the whole name
/// if it has no indices.
///
/// # Examples
/// ```rust
/// use lpkit_core::naming::{set_name, EntityKind};
/// assert_eq!(set_name("harv[sw,north,3]", EntityKind::Variable), "harv");
/// assert_eq!(set_name("gub(12)", EntityKind::Constraint), "gub");
/// ```
pub fn set_name(name: &str, kind: EntityKind) -> &str {
    match name.find(kind.open()) {
        Some(pos) => &name[..pos],
        None => name,
    }
}

/// Return the raw (trimmed) index tokens of a name, empty if the name has no indices
pub fn index_tokens(name: &str, kind: EntityKind) -> Vec<&str> {
    let Some(start) = name.find(kind.open()) else {
        return Vec::new();
    };
    let inner = &name[start + 1..];
    let inner = match inner.rfind(kind.close()) {
        Some(end) => &inner[..end],
        None => inner,
    };
    if inner.trim().is_empty() {
        return Vec::new();
    }
    inner.split(',').map(str::trim).collect()
}

/// Return all index values of a name
pub fn index_values(name: &str, kind: EntityKind) -> Vec<IndexValue> {
    index_tokens(name, kind)
        .into_iter()
        .map(IndexValue::parse)
        .collect()
}

/// Return the value at index position `index` of a name, if the name has that many indices
///
/// # Examples
/// ```rust
/// use lpkit_core::naming::{index_value, EntityKind, IndexValue};
/// let name = "harv[sw,north,3]";
/// assert_eq!(index_value(name, EntityKind::Variable, 1), Some(IndexValue::from("north")));
/// assert_eq!(index_value(name, EntityKind::Variable, 2), Some(IndexValue::Int(3)));
/// assert_eq!(index_value(name, EntityKind::Variable, 3), None);
/// ```
pub fn index_value(name: &str, kind: EntityKind, index: usize) -> Option<IndexValue> {
    index_tokens(name, kind)
        .get(index)
        .map(|token| IndexValue::parse(token))
}

/// Build an entity name from a set name and its index values
///
/// # Errors
/// [`NamingError::InvalidSetName`] if the set name contains the opening delimiter, and
/// [`NamingError::InvalidIndexValue`] for string values which would not be read back
/// as the same value: empty, padded, integer-like, or containing a comma or delimiter.
///
/// # Examples
/// ```rust
/// use lpkit_core::naming::{compose_name, EntityKind, IndexValue};
/// let name = compose_name("gub", &[IndexValue::from(4)], EntityKind::Constraint).unwrap();
/// assert_eq!(name, "gub(4)");
/// ```
pub fn compose_name(
    set: &str,
    indices: &[IndexValue],
    kind: EntityKind,
) -> Result<String, NamingError> {
    if set.contains(kind.open()) {
        return Err(NamingError::InvalidSetName {
            name: set.to_string(),
            kind,
        });
    }
    if indices.is_empty() {
        return Ok(set.to_string());
    }
    if let Some(value) = indices.iter().find(|v| !v.is_composable(kind)) {
        return Err(NamingError::InvalidIndexValue {
            value: value.clone(),
            kind,
        });
    }
    let joined = indices
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");
    Ok(format!("{}{}{}{}", set, kind.open(), joined, kind.close()))
}

/// Check whether a name satisfies every entry of an index filter
pub fn matches_filter(name: &str, kind: EntityKind, filter: &IndexFilter) -> bool {
    let values = index_values(name, kind);
    filter
        .iter()
        .all(|(position, expected)| values.get(*position) == Some(expected))
}

#[derive(Error, Debug)]
pub enum NamingError {
    #[error("Set name {name:?} contains the {kind} index delimiter")]
    InvalidSetName { name: String, kind: EntityKind },
    #[error("Index value {value:?} can't be written into a {kind} name")]
    InvalidIndexValue { value: IndexValue, kind: EntityKind },
}

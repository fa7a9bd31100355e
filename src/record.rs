//! Primary keys shared by the search engine and the relational store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary key of a record.
///
/// The engine and the store may disagree on the key's type (the engine often
/// returns `"42"` for a numeric column), so keys are compared through their
/// textual form by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    /// Integer key.
    Int(i64),
    /// String key.
    Str(String),
}

impl PrimaryKey {
    /// Render the key as an SQL literal (strings are single-quoted).
    pub fn sql_literal(&self) -> String {
        match self {
            PrimaryKey::Int(i) => i.to_string(),
            PrimaryKey::Str(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimaryKey::Int(i) => write!(f, "{i}"),
            PrimaryKey::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for PrimaryKey {
    fn from(value: i64) -> Self {
        PrimaryKey::Int(value)
    }
}

impl From<i32> for PrimaryKey {
    fn from(value: i32) -> Self {
        PrimaryKey::Int(value as i64)
    }
}

impl From<&str> for PrimaryKey {
    fn from(value: &str) -> Self {
        PrimaryKey::Str(value.to_string())
    }
}

impl From<String> for PrimaryKey {
    fn from(value: String) -> Self {
        PrimaryKey::Str(value)
    }
}

/// A record that can be identified by its primary key.
pub trait Keyed {
    /// The record's primary key.
    fn primary_key(&self) -> PrimaryKey;
}

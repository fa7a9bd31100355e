//! Relational dialects and their key-ordering clauses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PikeError, Result};
use crate::record::PrimaryKey;

/// Relational dialect of a record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    MariaDb,
    Sqlite,
    Postgres,
    SqlServer,
}

impl Dialect {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::MariaDb => "mariadb",
            Dialect::Sqlite => "sqlite",
            Dialect::Postgres => "pgsql",
            Dialect::SqlServer => "sqlsrv",
        }
    }

    /// Whether the dialect has a native `FIELD()` ordering function.
    pub fn supports_field_function(&self) -> bool {
        matches!(self, Dialect::MySql | Dialect::MariaDb)
    }

    /// The ordering strategy for this dialect.
    pub fn strategy(&self) -> Box<dyn OrderingStrategy> {
        if self.supports_field_function() {
            Box::new(FieldOrdering)
        } else {
            Box::new(CaseOrdering)
        }
    }
}

impl FromStr for Dialect {
    type Err = PikeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySql),
            "mariadb" => Ok(Dialect::MariaDb),
            "sqlite" => Ok(Dialect::Sqlite),
            "pgsql" | "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlsrv" | "mssql" => Ok(Dialect::SqlServer),
            other => Err(PikeError::config(format!(
                "unsupported relational dialect '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders an ORDER BY expression that sorts rows by their position in a key
/// list.
pub trait OrderingStrategy: Send + Sync + fmt::Debug {
    /// Ordering expression for `keys` on `key_column`.
    fn order_by(&self, key_column: &str, keys: &[PrimaryKey]) -> String;

    /// Strategy name, for logging.
    fn name(&self) -> &'static str;
}

/// `CASE WHEN col = k THEN i ... ELSE n END`, portable across dialects.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseOrdering;

impl OrderingStrategy for CaseOrdering {
    fn order_by(&self, key_column: &str, keys: &[PrimaryKey]) -> String {
        let mut sql = String::from("CASE");
        for (position, key) in keys.iter().enumerate() {
            sql.push_str(&format!(
                " WHEN {key_column} = {} THEN {position}",
                key.sql_literal()
            ));
        }
        sql.push_str(&format!(" ELSE {} END", keys.len()));
        sql
    }

    fn name(&self) -> &'static str {
        "case"
    }
}

/// `FIELD(col, k1, k2, ...)`, for MySQL and MariaDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldOrdering;

impl OrderingStrategy for FieldOrdering {
    fn order_by(&self, key_column: &str, keys: &[PrimaryKey]) -> String {
        let literals = keys
            .iter()
            .map(PrimaryKey::sql_literal)
            .collect::<Vec<_>>()
            .join(", ");
        format!("FIELD({key_column}, {literals})")
    }

    fn name(&self) -> &'static str {
        "field"
    }
}

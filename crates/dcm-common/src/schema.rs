//! Relational schema facts.
//!
//! The schema loader is an external collaborator; this module only describes
//! what it hands to the type checker: tables with ordered columns, each with a
//! declared scalar kind and a controllability flag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The declared scalar kind of a schema column.
///
/// Deserialized through [`FromStr`], so a schema may spell a kind either by
/// its SQL type name or by its variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ColumnKind {
    String,
    Bool,
    Long,
    Integer,
    Float,
    ArrayOfObjects,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::String => "String",
            ColumnKind::Bool => "Bool",
            ColumnKind::Long => "Long",
            ColumnKind::Integer => "Integer",
            ColumnKind::Float => "Float",
            ColumnKind::ArrayOfObjects => "ArrayOfObjects",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ColumnKind {
    type Err = SchemaError;

    /// Map a SQL column type name onto its declared kind (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VARCHAR" | "CHAR" | "TEXT" | "STRING" => Ok(ColumnKind::String),
            "BOOLEAN" | "BOOL" => Ok(ColumnKind::Bool),
            "BIGINT" | "LONG" => Ok(ColumnKind::Long),
            "INTEGER" | "INT" | "SMALLINT" | "TINYINT" => Ok(ColumnKind::Integer),
            "FLOAT" | "REAL" | "DOUBLE" => Ok(ColumnKind::Float),
            "ARRAY" | "ARRAYOFOBJECTS" => Ok(ColumnKind::ArrayOfObjects),
            _ => Err(SchemaError::UnknownColumnKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for ColumnKind {
    type Error = SchemaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A single column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    /// Whether the solver assigns this column's value.
    #[serde(default)]
    pub controllable: bool,
}

impl Column {
    /// A column whose value is supplied as input data.
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Column {
            name: name.into(),
            kind,
            controllable: false,
        }
    }

    /// A column whose value is a decision variable.
    pub fn controllable(name: impl Into<String>, kind: ColumnKind) -> Self {
        Column {
            name: name.into(),
            kind,
            controllable: true,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.controllable {
            write!(f, "{} {} (controllable)", self.name, self.kind)
        } else {
            write!(f, "{} {}", self.name, self.kind)
        }
    }
}

/// A base table and its ordered columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Table {
            name: name.into(),
            columns,
        }
    }
}

/// Errors raised while describing schema facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A SQL type name with no declared-kind mapping.
    UnknownColumnKind(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::UnknownColumnKind(name) => {
                write!(f, "unrecognized column kind `{}`", name)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

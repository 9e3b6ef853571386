//! Relations, equality filters and select-column parsing
//!
//! Queries are deliberately small: a relation, a PostgREST column list and a
//! conjunction of equality predicates. That is all the dashboard ever asks
//! of the backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::BackendError;

/// A single row as returned by the backend
pub type Row = serde_json::Map<String, Value>;

/// Named relations exposed by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Profiles,
    Sites,
    NetworkDevices,
    FiberRoutes,
    Tasks,
    Notifications,
}

impl Relation {
    pub const ALL: [Relation; 6] = [
        Relation::Profiles,
        Relation::Sites,
        Relation::NetworkDevices,
        Relation::FiberRoutes,
        Relation::Tasks,
        Relation::Notifications,
    ];

    /// Table name on the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Profiles => "profiles",
            Relation::Sites => "sites",
            Relation::NetworkDevices => "network_devices",
            Relation::FiberRoutes => "fiber_routes",
            Relation::Tasks => "tasks",
            Relation::Notifications => "notifications",
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Relation {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Relation::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| BackendError::Request(format!("Unknown relation: {}", s)))
    }
}

/// Equality predicate `column = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// PostgREST operator form, e.g. `eq.admin`
    pub fn to_postgrest(&self) -> String {
        format!("eq.{}", value_to_param(&self.value))
    }

    /// Whether `row` satisfies this predicate
    pub fn matches(&self, row: &Row) -> bool {
        match row.get(&self.column) {
            Some(actual) => values_equal(actual, &self.value),
            None => self.value.is_null(),
        }
    }
}

fn value_to_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Equality with the string coercion PostgREST applies to query parameters
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::String(a), other) | (other, Value::String(a)) => *a == value_to_param(other),
        (a, b) => a == b,
    }
}

/// A select over one relation
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub relation: Relation,
    pub columns: String,
    pub filters: Vec<Filter>,
}

impl Select {
    pub fn from(relation: Relation) -> Self {
        Self {
            relation,
            columns: "*".to_string(),
            filters: Vec::new(),
        }
    }

    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }
}

/// One entry of a PostgREST column list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    /// `*`
    Star,
    /// A plain column name
    Field(String),
    /// `alias:relation(col, ...)` embedded resource
    Embed {
        alias: String,
        relation: String,
        columns: Vec<Column>,
    },
}

/// Parse a PostgREST column list such as `*,site:sites(name, location)`
pub fn parse_columns(input: &str) -> Result<Vec<Column>, BackendError> {
    let mut columns = Vec::new();
    for part in split_top_level(input)? {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if part == "*" {
            columns.push(Column::Star);
            continue;
        }
        match part.find('(') {
            Some(open) => {
                let inner = part[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(|| malformed(input))?;
                let head = &part[..open];
                let (alias, relation) = match head.split_once(':') {
                    Some((alias, relation)) => (alias.trim(), relation.trim()),
                    None => (head.trim(), head.trim()),
                };
                columns.push(Column::Embed {
                    alias: alias.to_string(),
                    relation: relation.to_string(),
                    columns: parse_columns(inner)?,
                });
            }
            None => columns.push(Column::Field(part.to_string())),
        }
    }
    Ok(columns)
}

fn split_top_level(input: &str) -> Result<Vec<&str>, BackendError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in input.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or_else(|| malformed(input))?,
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(malformed(input));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn malformed(input: &str) -> BackendError {
    BackendError::Request(format!("Malformed column list: {}", input))
}

/// Exactly zero or one row; more than one is an error
pub fn maybe_single(relation: Relation, rows: Vec<Row>) -> Result<Option<Row>, BackendError> {
    match rows.len() {
        0 | 1 => Ok(rows.into_iter().next()),
        count => Err(BackendError::Cardinality { relation, count }),
    }
}

/// Exactly one row
pub fn single(relation: Relation, rows: Vec<Row>) -> Result<Row, BackendError> {
    match rows.len() {
        1 => rows
            .into_iter()
            .next()
            .ok_or(BackendError::Cardinality { relation, count: 0 }),
        count => Err(BackendError::Cardinality { relation, count }),
    }
}

/// Decode rows into typed records at the boundary
pub fn decode_rows<T: serde::de::DeserializeOwned>(
    relation: Relation,
    rows: Vec<Row>,
) -> Result<Vec<T>, BackendError> {
    rows.into_iter()
        .map(|row| decode_row(relation, row))
        .collect()
}

pub fn decode_row<T: serde::de::DeserializeOwned>(
    relation: Relation,
    row: Row,
) -> Result<T, BackendError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| {
        tracing::warn!(error = %e, relation = %relation, "Malformed row from backend");
        BackendError::Decode(format!("{}: {}", relation, e))
    })
}

/// Build a row from a JSON object literal
pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

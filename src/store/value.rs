use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use uuid::Uuid;

use super::schema::{Column, ColumnType};
use crate::error::{Error, Result};

/// A single cell value as the mapping layer sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Uuid(Uuid),
    Text(String),
    Int(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Map(BTreeMap<String, String>),
}

impl Value {
    fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Uuid(_) => "uuid",
            Value::Text(_) => "text",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Timestamp(_) => "timestamp",
            Value::Map(_) => "map",
        }
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<BTreeMap<String, String>> for Value {
    fn from(v: BTreeMap<String, String>) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let out = match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Uuid(id) => ToSqlOutput::Owned(SqlValue::Text(id.to_string())),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Int(n) => ToSqlOutput::Owned(SqlValue::Integer(*n)),
            Value::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Value::Timestamp(dt) => ToSqlOutput::Owned(SqlValue::Text(format_timestamp(dt))),
            Value::Map(m) => {
                let json = serde_json::to_string(m)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                ToSqlOutput::Owned(SqlValue::Text(json))
            }
        };
        Ok(out)
    }
}

/// Timestamps carry millisecond precision, like the wide-column `timestamp` type.
#[must_use]
pub fn truncate_timestamp(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(3)
}

/// Fixed-width RFC 3339 so that text comparison orders chronologically.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn decode(column: &Column, raw: ValueRef<'_>) -> Result<Value> {
    if let ValueRef::Null = raw {
        return Ok(Value::Null);
    }
    let name = column.name;
    let value = match column.kind {
        ColumnType::Int => Value::Int(raw.as_i64().map_err(|e| Error::decode(name, e))?),
        ColumnType::Bool => Value::Bool(raw.as_i64().map_err(|e| Error::decode(name, e))? != 0),
        ColumnType::Text => Value::Text(
            raw.as_str()
                .map_err(|e| Error::decode(name, e))?
                .to_string(),
        ),
        ColumnType::Uuid => {
            let text = raw.as_str().map_err(|e| Error::decode(name, e))?;
            Value::Uuid(Uuid::parse_str(text).map_err(|e| Error::decode(name, e))?)
        }
        ColumnType::Timestamp => {
            let text = raw.as_str().map_err(|e| Error::decode(name, e))?;
            Value::Timestamp(parse_timestamp(text).map_err(|e| Error::decode(name, e))?)
        }
        ColumnType::Map => {
            let text = raw.as_str().map_err(|e| Error::decode(name, e))?;
            Value::Map(serde_json::from_str(text).map_err(|e| Error::decode(name, e))?)
        }
    };
    Ok(value)
}

/// A row keyed by column name. Models build rows to write and consume rows
/// read back from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: BTreeMap<&'static str, Value>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &'static str, value: impl Into<Value>) {
        self.values.insert(column, value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    fn take(&mut self, column: &str) -> Value {
        self.values.remove(column).unwrap_or(Value::Null)
    }

    fn mismatch(column: &str, expected: &str, found: &Value) -> Error {
        Error::decode(
            column,
            format!("expected {expected}, found {}", found.kind_name()),
        )
    }

    pub fn uuid(&mut self, column: &str) -> Result<Uuid> {
        match self.take(column) {
            Value::Uuid(v) => Ok(v),
            other => Err(Self::mismatch(column, "uuid", &other)),
        }
    }

    pub fn text(&mut self, column: &str) -> Result<String> {
        match self.take(column) {
            Value::Text(v) => Ok(v),
            other => Err(Self::mismatch(column, "text", &other)),
        }
    }

    pub fn opt_text(&mut self, column: &str) -> Result<Option<String>> {
        match self.take(column) {
            Value::Null => Ok(None),
            Value::Text(v) => Ok(Some(v)),
            other => Err(Self::mismatch(column, "text", &other)),
        }
    }

    pub fn int(&mut self, column: &str) -> Result<i32> {
        self.opt_int(column)?
            .ok_or_else(|| Self::mismatch(column, "int", &Value::Null))
    }

    pub fn opt_int(&mut self, column: &str) -> Result<Option<i32>> {
        match self.take(column) {
            Value::Null => Ok(None),
            Value::Int(v) => i32::try_from(v)
                .map(Some)
                .map_err(|e| Error::decode(column, e)),
            other => Err(Self::mismatch(column, "int", &other)),
        }
    }

    pub fn bool(&mut self, column: &str) -> Result<bool> {
        match self.take(column) {
            Value::Bool(v) => Ok(v),
            other => Err(Self::mismatch(column, "bool", &other)),
        }
    }

    pub fn timestamp(&mut self, column: &str) -> Result<DateTime<Utc>> {
        self.opt_timestamp(column)?
            .ok_or_else(|| Self::mismatch(column, "timestamp", &Value::Null))
    }

    pub fn opt_timestamp(&mut self, column: &str) -> Result<Option<DateTime<Utc>>> {
        match self.take(column) {
            Value::Null => Ok(None),
            Value::Timestamp(v) => Ok(Some(v)),
            other => Err(Self::mismatch(column, "timestamp", &other)),
        }
    }

    /// A null map reads back as empty, as wide-column collections do.
    pub fn map(&mut self, column: &str) -> Result<BTreeMap<String, String>> {
        match self.take(column) {
            Value::Null => Ok(BTreeMap::new()),
            Value::Map(v) => Ok(v),
            other => Err(Self::mismatch(column, "map", &other)),
        }
    }
}

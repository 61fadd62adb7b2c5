use super::schema::TableSchema;
use super::value::Value;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gte,
}

impl Op {
    fn sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Gte => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: &'static str,
    pub op: Op,
    pub value: Value,
}

/// A read against one table: conjunctive filters, an optional row limit, and
/// the full-scan opt-in.
#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<Filter>,
    limit: Option<u32>,
    allow_filtering: bool,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, column: &'static str, op: Op, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column,
            op,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn eq(self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filter(column, Op::Eq, value)
    }

    #[must_use]
    pub fn gte(self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filter(column, Op::Gte, value)
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Accept a scan of every partition when no key or index serves the filters.
    #[must_use]
    pub fn allow_filtering(mut self) -> Self {
        self.allow_filtering = true;
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn max_rows(&self) -> Option<u32> {
        self.limit
    }

    pub fn filtering_allowed(&self) -> bool {
        self.allow_filtering
    }

    /// Rejects queries the table cannot serve without a full scan unless the
    /// caller opted in.
    pub(crate) fn check(&self, table: &TableSchema) -> Result<()> {
        for f in &self.filters {
            if table.column(f.column).is_none() {
                return Err(Error::InvalidQuery(format!(
                    "table {} has no column {}",
                    table.name, f.column
                )));
            }
            if f.value == Value::Null {
                return Err(Error::InvalidQuery(format!(
                    "cannot restrict column {} by null",
                    f.column
                )));
            }
        }

        if self.allow_filtering
            || self.filters.is_empty()
            || self.is_partition_lookup(table)
            || self.is_index_lookup(table)
        {
            return Ok(());
        }

        let columns: Vec<&str> = self.filters.iter().map(|f| f.column).collect();
        Err(Error::FilteringRequired {
            table: table.name,
            reason: format!("restriction on [{}]", columns.join(", ")),
        })
    }

    fn is_index_lookup(&self, table: &TableSchema) -> bool {
        matches!(
            self.filters.as_slice(),
            [f] if f.op == Op::Eq && table.indexed.contains(&f.column)
        )
    }

    /// Equality on the whole partition key, then an in-order prefix of the
    /// clustering key where only the last restricted column may be a range.
    fn is_partition_lookup(&self, table: &TableSchema) -> bool {
        let mut remaining: Vec<&Filter> = self.filters.iter().collect();

        for column in table.partition_key {
            let Some(pos) = remaining
                .iter()
                .position(|f| f.column == *column && f.op == Op::Eq)
            else {
                return false;
            };
            remaining.swap_remove(pos);
        }

        let mut ranged = false;
        for column in table.clustering_key {
            let (on_column, rest): (Vec<&Filter>, Vec<&Filter>) =
                remaining.into_iter().partition(|f| f.column == *column);
            remaining = rest;
            if on_column.is_empty() {
                break;
            }
            if ranged {
                return false;
            }
            ranged = on_column.iter().any(|f| f.op != Op::Eq);
        }

        remaining.is_empty()
    }

    /// Renders `WHERE ...` with positional parameters, or an empty string.
    pub(crate) fn where_clause(&self) -> (String, Vec<&Value>) {
        if self.filters.is_empty() {
            return (String::new(), Vec::new());
        }
        let conditions: Vec<String> = self
            .filters
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{} {} ?{}", f.column, f.op.sql(), i + 1))
            .collect();
        let params = self.filters.iter().map(|f| &f.value).collect();
        (format!(" WHERE {}", conditions.join(" AND ")), params)
    }
}

//! Query builder module
//!
//! A [`QueryBuilder`] models exactly one SQL operation. It is filled through
//! by-value fluent calls, compiled once into a [`CompiledQuery`] (SQL text
//! plus the ordered values for its `?` placeholders) and then discarded.
//! Compilation borrows the builder immutably, so compiling twice yields the
//! same text and the same values.

pub mod common;
pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

use crate::{Connector, Error, IntoOperator, Operator, Result, Value};
use std::fmt::{self, Display};

pub use common::{IntoColumns, JoinType, Limit, SortDirection, WhereCondition};

/// The four operation kinds a builder can compile to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            QueryKind::Select => "SELECT",
            QueryKind::Insert => "INSERT",
            QueryKind::Update => "UPDATE",
            QueryKind::Delete => "DELETE",
        };
        f.write_str(keyword)
    }
}

/// SQL text plus the values for its placeholders, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    sql: String,
    params: Vec<Value>,
}

impl CompiledQuery {
    /// Wrap hand-written SQL and its parameters
    pub fn raw(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    /// Number of `?` placeholders in the SQL text
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }
}

/// Mutable model of a single SQL operation
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    kind: Option<QueryKind>,
    table: Option<String>,
    columns: Vec<String>,
    field_set: Vec<(String, Value)>,
    conditions: Vec<WhereCondition>,
    joins: Vec<String>,
    group_by: Vec<String>,
    having: Vec<String>,
    order_by: Vec<String>,
    limit: Option<Limit>,
}

impl QueryBuilder {
    /// Create an empty builder with no kind and no table
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the operation kind
    pub fn set_kind(mut self, kind: QueryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the target table
    pub fn set_table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    /// Same as [`QueryBuilder::set_table`]
    pub fn from(self, table: &str) -> Self {
        self.set_table(table)
    }

    /// Switch to SELECT and replace the selected columns
    ///
    /// # Examples
    /// ```
    /// use quarry_core::QueryBuilder;
    ///
    /// let query = QueryBuilder::new().select(("id", "name")).from("users");
    /// assert_eq!(query.to_sql().unwrap(), "SELECT id, name FROM users");
    /// ```
    pub fn select<T>(self, columns: T) -> Self
    where
        T: IntoColumns,
    {
        self.set_kind(QueryKind::Select).select_columns(columns)
    }

    /// Switch to INSERT
    pub fn insert(self) -> Self {
        self.set_kind(QueryKind::Insert)
    }

    /// Switch to UPDATE
    pub fn update(self) -> Self {
        self.set_kind(QueryKind::Update)
    }

    /// Switch to DELETE
    pub fn delete(self) -> Self {
        self.set_kind(QueryKind::Delete)
    }

    /// Append one selected column
    pub fn add_column(mut self, column: &str) -> Self {
        self.columns.push(column.to_string());
        self
    }

    /// Replace the selected columns
    pub fn select_columns<T>(mut self, columns: T) -> Self
    where
        T: IntoColumns,
    {
        self.columns = columns.into_columns();
        self
    }

    /// Set one column of the INSERT/UPDATE field set.
    ///
    /// A column that is already present keeps its position and takes the
    /// new value.
    pub fn add_field(mut self, column: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.field_set.iter_mut().find(|(name, _)| name == column) {
            Some(entry) => entry.1 = value,
            None => self.field_set.push((column.to_string(), value)),
        }
        self
    }

    /// Replace the whole field set, keeping the iteration order
    pub fn set_fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.field_set.clear();
        fields
            .into_iter()
            .fold(self, |builder, (column, value)| builder.add_field(column.as_ref(), value))
    }

    /// Add a WHERE condition joined with AND
    ///
    /// # Examples
    /// ```
    /// use quarry_core::{select, op};
    ///
    /// let query = select("users")
    ///     .add_column("*")
    ///     .add_condition("age", op::GT, 18)
    ///     .add_condition("name", "=", "John");
    /// assert_eq!(
    ///     query.to_sql().unwrap(),
    ///     "SELECT * FROM users WHERE age > ? AND name = ?"
    /// );
    /// ```
    pub fn add_condition<O, V>(self, column: &str, operator: O, value: V) -> Self
    where
        O: IntoOperator,
        V: Into<Value>,
    {
        self.add_condition_with(column, operator, value, Connector::And)
    }

    /// Add a WHERE condition joined with OR
    pub fn or_condition<O, V>(self, column: &str, operator: O, value: V) -> Self
    where
        O: IntoOperator,
        V: Into<Value>,
    {
        self.add_condition_with(column, operator, value, Connector::Or)
    }

    /// Add a WHERE condition with an explicit connector.
    ///
    /// The connector of the first condition is never emitted.
    pub fn add_condition_with<O, V>(
        mut self,
        column: &str,
        operator: O,
        value: V,
        connector: Connector,
    ) -> Self
    where
        O: IntoOperator,
        V: Into<Value>,
    {
        self.conditions.push(WhereCondition {
            column: column.to_string(),
            operator: operator.into_operator(),
            value: value.into(),
            connector,
        });
        self
    }

    /// Add one equality condition per `(column, value)` pair
    pub fn where_all<I, K, V>(self, conditions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        conditions.into_iter().fold(self, |builder, (column, value)| {
            builder.add_condition(column.as_ref(), Operator::EQ, value)
        })
    }

    /// Add an INNER JOIN fragment
    pub fn add_join(self, table: &str, on: &str) -> Self {
        self.add_join_with(JoinType::Inner, table, on)
    }

    /// Add a JOIN fragment of the given type
    pub fn add_join_with(mut self, join_type: JoinType, table: &str, on: &str) -> Self {
        self.joins.push(format!("{} JOIN {} ON {}", join_type, table, on));
        self
    }

    /// Append GROUP BY columns
    pub fn add_group_by<T>(mut self, columns: T) -> Self
    where
        T: IntoColumns,
    {
        self.group_by.extend(columns.into_columns());
        self
    }

    /// Add a pre-formatted HAVING clause; clauses are joined with AND
    pub fn add_having(mut self, clause: &str) -> Self {
        self.having.push(clause.to_string());
        self
    }

    /// Order by a column, ascending
    pub fn add_order_by(self, column: &str) -> Self {
        self.add_order_by_with(column, SortDirection::Asc)
    }

    /// Order by a column in the given direction
    pub fn add_order_by_with(mut self, column: &str, direction: SortDirection) -> Self {
        self.order_by.push(format!("{} {}", column, direction));
        self
    }

    /// Set LIMIT with an offset of 0
    pub fn set_limit(self, limit: u64) -> Self {
        self.set_limit_offset(limit, 0)
    }

    /// Set LIMIT and OFFSET
    pub fn set_limit_offset(mut self, limit: u64, offset: u64) -> Self {
        self.limit = Some(Limit {
            count: limit,
            offset,
        });
        self
    }

    pub fn kind(&self) -> Option<QueryKind> {
        self.kind
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn field_set(&self) -> &[(String, Value)] {
        &self.field_set
    }

    /// Compile into SQL text and ordered placeholder values
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidQuery`] when the kind or table is missing, a
    ///   required part is empty, an operator is invalid, or a clause is set
    ///   that the kind cannot carry
    /// - [`Error::DangerousUnconditionedMutation`] for UPDATE or DELETE
    ///   without conditions
    pub fn compile(&self) -> Result<CompiledQuery> {
        let kind = self
            .kind
            .ok_or_else(|| Error::invalid_query("query kind not set"))?;

        let table = match self.table.as_deref() {
            Some(table) if !table.trim().is_empty() => table,
            _ => return Err(Error::invalid_query(format!("{} requires a table", kind))),
        };

        for condition in &self.conditions {
            condition.operator.validate()?;
        }

        match kind {
            QueryKind::Select => select::compile(self, table),
            QueryKind::Insert => insert::compile(self, table),
            QueryKind::Update => update::compile(self, table),
            QueryKind::Delete => delete::compile(self, table),
        }
    }

    /// Compile and return only the SQL text
    pub fn to_sql(&self) -> Result<String> {
        self.compile().map(|compiled| compiled.sql)
    }
}

/// Start a SELECT on the given table
pub fn select(table: &str) -> QueryBuilder {
    QueryBuilder::new().set_kind(QueryKind::Select).set_table(table)
}

/// Start an INSERT into the given table
pub fn insert_into(table: &str) -> QueryBuilder {
    QueryBuilder::new().set_kind(QueryKind::Insert).set_table(table)
}

/// Start an UPDATE of the given table
pub fn update(table: &str) -> QueryBuilder {
    QueryBuilder::new().set_kind(QueryKind::Update).set_table(table)
}

/// Start a DELETE from the given table
pub fn delete_from(table: &str) -> QueryBuilder {
    QueryBuilder::new().set_kind(QueryKind::Delete).set_table(table)
}

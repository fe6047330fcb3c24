//! Statement execution and the connection handle interface
//!
//! The executor is a thin, synchronous adapter: it resolves every bound
//! value through [`crate::bind`], obtains a prepared statement from a
//! [`Connection`], binds the values positionally, runs the statement and
//! either reports the affected-row count or maps rows onto the requested
//! type. Failures are returned as-is; nothing here retries.

use crate::bind::{bind_all, BindValue};
use crate::builder::{CompiledQuery, QueryBuilder};
use crate::{Result, Row, Value};
use serde::de::DeserializeOwned;

/// A database connection able to prepare parameterized statements.
///
/// The handle is supplied and owned by the application; the core never
/// opens, pools or closes it.
pub trait Connection {
    /// Statement type, borrowing the connection while it is alive
    type Statement<'c>: PreparedStatement
    where
        Self: 'c;

    /// Prepare `sql` for execution
    fn prepare<'c>(&'c mut self, sql: &str) -> Result<Self::Statement<'c>>;

    /// Identity generated by the most recent successful INSERT, if any
    fn last_insert_id(&mut self) -> Result<Option<i64>>;
}

/// A prepared statement with positional `?` parameters
pub trait PreparedStatement {
    /// Bind a value to the 1-based placeholder `position`
    fn bind(&mut self, position: usize, value: BindValue) -> Result<()>;

    /// Run a statement that returns no rows; returns the affected-row count
    fn execute(&mut self) -> Result<u64>;

    /// Run a statement and collect its rows
    fn fetch_rows(&mut self) -> Result<Vec<Row>>;
}

fn prepare_bound<'c, C>(conn: &'c mut C, sql: &str, params: &[Value]) -> Result<C::Statement<'c>>
where
    C: Connection,
{
    // Resolve before touching the connection so a bad value never reaches it
    let bound = bind_all(params)?;

    tracing::debug!(
        sql = %sql,
        params = bound.len(),
        kinds = %param_kinds(&bound),
        "executing statement"
    );

    let mut statement = conn.prepare(sql)?;
    for (index, value) in bound.into_iter().enumerate() {
        statement.bind(index + 1, value)?;
    }
    Ok(statement)
}

/// Comma-separated parameter kinds, e.g. `STRING, INT`
fn param_kinds(bound: &[BindValue]) -> String {
    bound
        .iter()
        .map(|value| value.param_type().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Execute an INSERT, UPDATE or DELETE and return the affected-row count
pub fn execute<C>(conn: &mut C, sql: &str, params: &[Value]) -> Result<u64>
where
    C: Connection,
{
    let affected = prepare_bound(conn, sql, params)?.execute()?;
    tracing::trace!(affected, "statement finished");
    Ok(affected)
}

/// Execute a query and return its raw rows
pub fn fetch_rows<C>(conn: &mut C, sql: &str, params: &[Value]) -> Result<Vec<Row>>
where
    C: Connection,
{
    let rows = prepare_bound(conn, sql, params)?.fetch_rows()?;
    tracing::trace!(rows = rows.len(), "query returned");
    Ok(rows)
}

/// Execute a query and hydrate every row into `T`
pub fn fetch_all<C, T>(conn: &mut C, sql: &str, params: &[Value]) -> Result<Vec<T>>
where
    C: Connection,
    T: DeserializeOwned,
{
    fetch_rows(conn, sql, params)?
        .iter()
        .map(Row::hydrate)
        .collect()
}

/// Execute a query and hydrate the first row, if there is one
pub fn fetch_optional<C, T>(conn: &mut C, sql: &str, params: &[Value]) -> Result<Option<T>>
where
    C: Connection,
    T: DeserializeOwned,
{
    fetch_rows(conn, sql, params)?
        .first()
        .map(Row::hydrate)
        .transpose()
}

/// Extension trait running compiled queries on a connection
pub trait ExecutableQuery {
    /// Compile (if needed) into SQL and parameters
    fn to_compiled(&self) -> Result<CompiledQuery>;

    /// Execute and return the affected-row count
    fn execute<C: Connection>(&self, conn: &mut C) -> Result<u64> {
        let compiled = self.to_compiled()?;
        execute(conn, compiled.sql(), compiled.params())
    }

    /// Execute and return the raw rows
    fn fetch_rows<C: Connection>(&self, conn: &mut C) -> Result<Vec<Row>> {
        let compiled = self.to_compiled()?;
        fetch_rows(conn, compiled.sql(), compiled.params())
    }

    /// Execute and hydrate every row
    fn fetch_all<C: Connection, T: DeserializeOwned>(&self, conn: &mut C) -> Result<Vec<T>> {
        let compiled = self.to_compiled()?;
        fetch_all(conn, compiled.sql(), compiled.params())
    }

    /// Execute and hydrate the first row
    fn fetch_optional<C, T>(&self, conn: &mut C) -> Result<Option<T>>
    where
        C: Connection,
        T: DeserializeOwned,
    {
        let compiled = self.to_compiled()?;
        fetch_optional(conn, compiled.sql(), compiled.params())
    }
}

impl ExecutableQuery for QueryBuilder {
    fn to_compiled(&self) -> Result<CompiledQuery> {
        self.compile()
    }
}

impl ExecutableQuery for CompiledQuery {
    fn to_compiled(&self) -> Result<CompiledQuery> {
        Ok(self.clone())
    }
}

//! Blocking SQLite connection backed by sqlx
//!
//! [`SqliteConnection`] owns a current-thread tokio runtime and drives every
//! sqlx future to completion before returning, so it can be handed to the
//! synchronous executor and entity operations like any other [`Connection`].

use crate::bind::BindValue;
use crate::executor::{Connection, PreparedStatement};
use crate::{ConnectionConfig, Error, Result, Row, Value};
use futures::TryStreamExt;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteColumn, SqliteConnectOptions, SqliteRow};
use sqlx::{Column, ConnectOptions, Row as _, TypeInfo, ValueRef};
use std::str::FromStr;
use tokio::runtime::Runtime;

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// A single SQLite connection usable from synchronous code
pub struct SqliteConnection {
    runtime: Runtime,
    inner: sqlx::SqliteConnection,
    last_insert_id: Option<i64>,
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("last_insert_id", &self.last_insert_id)
            .finish_non_exhaustive()
    }
}

impl SqliteConnection {
    /// Open a connection as described by `config`
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| Error::config(format!("invalid database url '{}': {}", config.url, e)))?
            .foreign_keys(config.foreign_keys)
            .create_if_missing(config.create_if_missing)
            .busy_timeout(config.busy_timeout_duration())
            .statement_cache_capacity(config.statement_cache_capacity)
            .disable_statement_logging();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::execution)?;

        let inner = runtime.block_on(options.connect())?;
        tracing::debug!(url = %config.url, "opened sqlite connection");

        Ok(Self {
            runtime,
            inner,
            last_insert_id: None,
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&ConnectionConfig::in_memory())
    }

    /// Run one or more `;`-separated statements without parameters,
    /// typically schema setup
    pub fn execute_batch(&mut self, sql: &str) -> Result<()> {
        let inner = &mut self.inner;
        self.runtime.block_on(sqlx::Executor::execute(inner, sql))?;
        Ok(())
    }

    fn run_execute(&mut self, sql: &str, bindings: &[BindValue]) -> Result<u64> {
        let query = bound_query(sql, bindings);
        let inner = &mut self.inner;
        let result = self.runtime.block_on(query.execute(inner))?;

        self.last_insert_id = Some(result.last_insert_rowid()).filter(|id| *id > 0);
        Ok(result.rows_affected())
    }

    fn run_fetch(&mut self, sql: &str, bindings: &[BindValue]) -> Result<Vec<Row>> {
        let query = bound_query(sql, bindings);
        let inner = &mut self.inner;
        self.runtime.block_on(async move {
            let mut stream = query.fetch(inner);
            let mut rows = Vec::new();
            while let Some(row) = stream.try_next().await? {
                rows.push(convert_row(&row)?);
            }
            Ok::<_, Error>(rows)
        })
    }
}

/// Statement prepared on a [`SqliteConnection`]
pub struct SqliteStatement<'c> {
    conn: &'c mut SqliteConnection,
    sql: String,
    bindings: Vec<Option<BindValue>>,
}

impl Connection for SqliteConnection {
    type Statement<'c> = SqliteStatement<'c> where Self: 'c;

    fn prepare<'c>(&'c mut self, sql: &str) -> Result<Self::Statement<'c>> {
        // Surface syntax errors and unknown tables before anything is bound
        let inner = &mut self.inner;
        self.runtime.block_on(sqlx::Executor::prepare(inner, sql))?;

        Ok(SqliteStatement {
            conn: self,
            sql: sql.to_string(),
            bindings: Vec::new(),
        })
    }

    fn last_insert_id(&mut self) -> Result<Option<i64>> {
        Ok(self.last_insert_id)
    }
}

impl PreparedStatement for SqliteStatement<'_> {
    fn bind(&mut self, position: usize, value: BindValue) -> Result<()> {
        if position == 0 {
            return Err(Error::invalid_query("placeholder positions start at 1"));
        }
        if self.bindings.len() < position {
            self.bindings.resize(position, None);
        }
        self.bindings[position - 1] = Some(value);
        Ok(())
    }

    fn execute(&mut self) -> Result<u64> {
        let bindings = self.contiguous_bindings()?;
        self.conn.run_execute(&self.sql, &bindings)
    }

    fn fetch_rows(&mut self) -> Result<Vec<Row>> {
        let bindings = self.contiguous_bindings()?;
        self.conn.run_fetch(&self.sql, &bindings)
    }
}

impl SqliteStatement<'_> {
    /// Bound values in position order; a skipped position is an error
    fn contiguous_bindings(&self) -> Result<Vec<BindValue>> {
        self.bindings
            .iter()
            .enumerate()
            .map(|(index, value)| {
                value.clone().ok_or_else(|| {
                    Error::invalid_query(format!("placeholder {} was never bound", index + 1))
                })
            })
            .collect()
    }
}

fn bound_query<'q>(sql: &'q str, bindings: &[BindValue]) -> SqliteQuery<'q> {
    let mut query = sqlx::query(sql);
    for value in bindings {
        query = match value {
            BindValue::Bool(b) => query.bind(*b),
            BindValue::Int(i) => query.bind(*i),
            BindValue::Str(s) => query.bind(s.clone()),
            BindValue::Null => query.bind(None::<String>),
        };
    }
    query
}

/// Convert by the stored value's storage class. Integers in a column
/// declared BOOLEAN come back as [`Value::Bool`].
fn convert_row(row: &SqliteRow) -> Result<Row> {
    let mut converted = Row::new();
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;

        let value = if raw.is_null() {
            Value::Null
        } else {
            let storage = raw.type_info().name().to_ascii_uppercase();
            match storage.as_str() {
                "INTEGER" | "BOOLEAN" | "INT4" | "INT8" => {
                    let int: i64 = row.try_get_unchecked(index)?;
                    if declared_boolean(column) {
                        Value::Bool(int != 0)
                    } else {
                        Value::I64(int)
                    }
                }
                "REAL" | "NUMERIC" => Value::F64(row.try_get_unchecked(index)?),
                "BLOB" => Value::Bytes(row.try_get_unchecked(index)?),
                _ => Value::String(row.try_get_unchecked(index)?),
            }
        };
        converted.push(column.name(), value);
    }
    Ok(converted)
}

/// Declared column type, as opposed to the runtime storage class of a value
fn declared_boolean(column: &SqliteColumn) -> bool {
    matches!(
        column.type_info().name().to_ascii_uppercase().as_str(),
        "BOOLEAN" | "BOOL"
    )
}

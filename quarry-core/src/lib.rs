//! Quarry Core - query builder and entity persistence for relational stores
//!
//! This crate composes parameterized SQL from a fluent [`QueryBuilder`],
//! binds values by their resolved parameter kind, runs statements through a
//! caller-supplied [`Connection`] and maps result rows onto typed records.
//! Records implementing [`Entity`] get fetch, save and delete operations
//! through [`Persist`].
//!
//! Everything is synchronous and blocking.

pub mod bind;
pub mod builder;
pub mod config;
pub mod entity;
pub mod error;
pub mod executor;
pub mod operator;
pub mod row;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod value;

#[cfg(test)]
mod testing;

// Re-export main types
pub use bind::{resolve, BindValue, ParamType};
pub use builder::{
    delete_from, insert_into, select, update, CompiledQuery, IntoColumns, JoinType, Limit,
    QueryBuilder, QueryKind, SortDirection, WhereCondition,
};
pub use config::ConnectionConfig;
pub use entity::{Entity, Field, Persist};
pub use error::{DriverError, Error, Result};
pub use executor::{Connection, ExecutableQuery, PreparedStatement};
pub use operator::{op, Connector, IntoOperator, Operator};
pub use row::Row;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;
pub use value::Value;

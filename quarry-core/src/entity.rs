//! Entity persistence: fetch, save, delete and custom queries for record types
//!
//! A record type opts in by implementing [`Entity`]: it names its table,
//! exposes its identity and declares a static list of [`Field`] descriptors.
//! Every `Entity` automatically gets the [`Persist`] operations, which are
//! built on [`QueryBuilder`] and run through the executor.
//!
//! # Examples
//! ```
//! use quarry_core::{Entity, Field, Value};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct Post {
//!     id: Option<i64>,
//!     title: Option<String>,
//! }
//!
//! impl Entity for Post {
//!     const TABLE_NAME: &'static str = "posts";
//!     const FIELDS: &'static [Field<Self>] = &[
//!         Field::new("title", |post: &Post| post.title.clone().map(Value::from)),
//!     ];
//!
//!     fn id(&self) -> Option<i64> {
//!         self.id
//!     }
//!
//!     fn set_id(&mut self, id: i64) {
//!         self.id = Some(id);
//!     }
//! }
//! ```

use crate::builder::{delete_from, insert_into, select, update, QueryBuilder};
use crate::executor::{self, Connection, ExecutableQuery};
use crate::{op, Error, Result, Row, Value};
use serde::de::DeserializeOwned;

/// A declared, persisted field: column name plus accessor.
///
/// The accessor returns `None` when the field is not set on the instance;
/// such fields are left out of INSERT and UPDATE statements.
pub struct Field<E> {
    name: &'static str,
    read: fn(&E) -> Option<Value>,
}

impl<E> Field<E> {
    pub const fn new(name: &'static str, read: fn(&E) -> Option<Value>) -> Self {
        Self { name, read }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn read(&self, entity: &E) -> Option<Value> {
        (self.read)(entity)
    }
}

/// A typed record mapped to one table row by its numeric identity.
///
/// Rows are hydrated through `Deserialize`, matching columns to fields by
/// name.
pub trait Entity: DeserializeOwned + Sized + 'static {
    const TABLE_NAME: &'static str;

    const ID_COLUMN: &'static str = "id";

    /// Persisted fields, identity excluded
    const FIELDS: &'static [Field<Self>];

    /// `None` until the record has been saved
    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);
}

/// Persistence operations available on every [`Entity`]
pub trait Persist: Entity {
    /// SELECT * over the entity's table, ready for more conditions
    fn query() -> QueryBuilder {
        select(Self::TABLE_NAME).add_column("*")
    }

    /// Fetch the row with the given identity; `Ok(None)` when it does not exist
    fn fetch_by_id<C: Connection>(conn: &mut C, id: i64) -> Result<Option<Self>> {
        Self::query()
            .add_condition(Self::ID_COLUMN, op::EQ, id)
            .set_limit(1)
            .fetch_optional(conn)
    }

    /// Fetch every row of the table
    fn fetch_all<C: Connection>(conn: &mut C) -> Result<Vec<Self>> {
        ExecutableQuery::fetch_all(&Self::query(), conn)
    }

    /// Run a caller-built query and hydrate the results as this entity
    fn fetch_where<C: Connection>(conn: &mut C, query: &QueryBuilder) -> Result<Vec<Self>> {
        ExecutableQuery::fetch_all(query, conn)
    }

    /// Columns and values written by [`Persist::save`]: every declared field
    /// that is set and not null, in declaration order
    fn field_set(&self) -> Vec<(&'static str, Value)> {
        Self::FIELDS
            .iter()
            .filter(|field| field.name() != Self::ID_COLUMN)
            .filter_map(|field| match field.read(self) {
                Some(value) if !value.is_null() => Some((field.name(), value)),
                _ => None,
            })
            .collect()
    }

    /// Insert the record when it has no identity, update it otherwise.
    ///
    /// After an insert the generated identity is assigned to `self`.
    fn save<C: Connection>(&mut self, conn: &mut C) -> Result<()> {
        let fields = self.field_set();

        match self.id() {
            None => {
                tracing::debug!(
                    table = Self::TABLE_NAME,
                    fields = fields.len(),
                    "inserting entity"
                );
                insert_into(Self::TABLE_NAME).set_fields(fields).execute(conn)?;

                let id = conn.last_insert_id()?.ok_or(Error::MissingGeneratedId {
                    table: Self::TABLE_NAME,
                })?;
                self.set_id(id);
            }
            Some(id) => {
                tracing::debug!(
                    table = Self::TABLE_NAME,
                    id,
                    fields = fields.len(),
                    "updating entity"
                );
                update(Self::TABLE_NAME)
                    .set_fields(fields)
                    .add_condition(Self::ID_COLUMN, op::EQ, id)
                    .execute(conn)?;
            }
        }
        Ok(())
    }

    /// Delete the backing row. The in-memory record is left untouched.
    fn delete<C: Connection>(&self, conn: &mut C) -> Result<u64> {
        let id = self.id().ok_or(Error::CannotDeleteUnsavedEntity {
            table: Self::TABLE_NAME,
        })?;

        tracing::debug!(table = Self::TABLE_NAME, id, "deleting entity");
        delete_from(Self::TABLE_NAME)
            .add_condition(Self::ID_COLUMN, op::EQ, id)
            .execute(conn)
    }

    /// Re-read the record from its row; `Ok(None)` for unsaved or deleted records
    fn reload<C: Connection>(&self, conn: &mut C) -> Result<Option<Self>> {
        match self.id() {
            Some(id) => Self::fetch_by_id(conn, id),
            None => Ok(None),
        }
    }

    /// Run hand-written SQL and hydrate the first row
    fn custom_query<C: Connection>(
        conn: &mut C,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<Self>> {
        executor::fetch_optional(conn, sql, params)
    }

    /// Run hand-written SQL and hydrate every row
    fn custom_query_fetch_all<C: Connection>(
        conn: &mut C,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<Self>> {
        executor::fetch_all(conn, sql, params)
    }

    /// Run hand-written SQL whose rows do not map onto this entity
    fn custom_query_rows<C: Connection>(
        conn: &mut C,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<Row>> {
        executor::fetch_rows(conn, sql, params)
    }
}

impl<E: Entity> Persist for E {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::BindValue;
    use crate::testing::MockConnection;
    use serde::Deserialize;

    #[derive(Debug, Default, Clone, PartialEq, Deserialize)]
    struct Widget {
        id: Option<i64>,
        name: Option<String>,
        count: Option<i64>,
        note: Option<Option<String>>,
    }

    impl Entity for Widget {
        const TABLE_NAME: &'static str = "widgets";
        const FIELDS: &'static [Field<Self>] = &[
            Field::new("name", |w: &Widget| w.name.clone().map(Value::from)),
            Field::new("count", |w: &Widget| w.count.map(Value::from)),
            Field::new("note", |w: &Widget| w.note.clone().map(Value::from)),
        ];

        fn id(&self) -> Option<i64> {
            self.id
        }

        fn set_id(&mut self, id: i64) {
            self.id = Some(id);
        }
    }

    fn widget(name: &str, count: i64) -> Widget {
        Widget {
            name: Some(name.to_string()),
            count: Some(count),
            ..Widget::default()
        }
    }

    #[test]
    fn test_save_new_entity_inserts_and_assigns_id() {
        let mut conn = MockConnection::new().with_next_insert_id(42);
        let mut w = widget("a", 3);

        w.save(&mut conn).unwrap();

        assert_eq!(w.id, Some(42));
        let call = conn.only_call();
        assert_eq!(call.sql, "INSERT INTO widgets (name, count) VALUES (?, ?)");
        assert_eq!(
            call.bindings,
            vec![(1, BindValue::Str("a".to_string())), (2, BindValue::Int(3))]
        );
    }

    #[test]
    fn test_save_existing_entity_updates_by_id() {
        let mut conn = MockConnection::new();
        let mut w = Widget {
            id: Some(7),
            ..widget("b", 5)
        };

        w.save(&mut conn).unwrap();

        let call = conn.only_call();
        assert_eq!(call.sql, "UPDATE widgets SET name = ?, count = ? WHERE id = ?");
        assert_eq!(call.bindings.last(), Some(&(3, BindValue::Int(7))));
        assert_eq!(w.id, Some(7));
    }

    #[test]
    fn test_unset_and_null_fields_are_omitted() {
        let w = Widget {
            id: Some(1),
            name: None,
            count: Some(2),
            note: Some(None),
        };
        assert_eq!(w.field_set(), vec![("count", Value::I64(2))]);
    }

    /// Declares its identity among the persisted fields
    #[derive(Debug, Default, Deserialize)]
    struct Tag {
        id: Option<i64>,
        label: Option<String>,
    }

    impl Entity for Tag {
        const TABLE_NAME: &'static str = "tags";
        const FIELDS: &'static [Field<Self>] = &[
            Field::new("id", |t: &Tag| t.id.map(Value::from)),
            Field::new("label", |t: &Tag| t.label.clone().map(Value::from)),
        ];

        fn id(&self) -> Option<i64> {
            self.id
        }

        fn set_id(&mut self, id: i64) {
            self.id = Some(id);
        }
    }

    #[test]
    fn test_id_column_never_written() {
        let mut tag = Tag {
            id: Some(5),
            label: Some("rust".to_string()),
        };
        assert_eq!(tag.field_set(), vec![("label", Value::from("rust"))]);

        let mut conn = MockConnection::new();
        tag.save(&mut conn).unwrap();
        let call = conn.only_call();
        assert_eq!(call.sql, "UPDATE tags SET label = ? WHERE id = ?");
        assert_eq!(
            call.bindings,
            vec![(1, BindValue::Str("rust".to_string())), (2, BindValue::Int(5))]
        );
    }

    #[test]
    fn test_save_without_fields_is_an_error() {
        let mut conn = MockConnection::new();
        let mut w = Widget::default();
        let err = w.save(&mut conn).unwrap_err();
        assert!(matches!(err, Error::InvalidQuery { .. }));
        assert!(conn.calls().is_empty());
    }

    #[test]
    fn test_missing_generated_id() {
        let mut conn = MockConnection::new().without_insert_ids();
        let mut w = widget("a", 1);
        let err = w.save(&mut conn).unwrap_err();
        assert!(matches!(err, Error::MissingGeneratedId { table: "widgets" }));
        assert_eq!(w.id, None);
    }

    #[test]
    fn test_delete_unsaved_entity_fails_without_call() {
        let mut conn = MockConnection::new();
        let err = widget("a", 1).delete(&mut conn).unwrap_err();
        assert!(matches!(err, Error::CannotDeleteUnsavedEntity { table: "widgets" }));
        assert!(conn.calls().is_empty());
    }

    #[test]
    fn test_delete_by_id() {
        let mut conn = MockConnection::new();
        let w = Widget {
            id: Some(9),
            ..widget("a", 1)
        };
        assert_eq!(w.delete(&mut conn).unwrap(), 1);
        let call = conn.only_call();
        assert_eq!(call.sql, "DELETE FROM widgets WHERE id = ?");
        assert_eq!(call.bindings, vec![(1, BindValue::Int(9))]);
        assert_eq!(w.id, Some(9));
    }

    #[test]
    fn test_fetch_by_id() {
        let mut conn = MockConnection::new().with_rows(vec![Row::new()
            .with("id", 4i64)
            .with("name", "bolt")
            .with("count", 2i64)
            .with("note", Value::Null)]);

        let found = Widget::fetch_by_id(&mut conn, 4).unwrap().unwrap();
        assert_eq!(found.id, Some(4));
        assert_eq!(found.name.as_deref(), Some("bolt"));

        let call = conn.only_call();
        assert_eq!(call.sql, "SELECT * FROM widgets WHERE id = ? LIMIT 1 OFFSET 0");
        assert_eq!(call.bindings, vec![(1, BindValue::Int(4))]);
    }

    #[test]
    fn test_fetch_by_id_not_found() {
        let mut conn = MockConnection::new();
        assert_eq!(Widget::fetch_by_id(&mut conn, 99).unwrap(), None);
    }

    #[test]
    fn test_fetch_all_empty_table() {
        let mut conn = MockConnection::new();
        let all = Widget::fetch_all(&mut conn).unwrap();
        assert!(all.is_empty());
        assert_eq!(conn.only_call().sql, "SELECT * FROM widgets");
    }

    #[test]
    fn test_fetch_where() {
        let mut conn = MockConnection::new().with_rows(vec![Row::new().with("id", 1i64)]);
        let query = Widget::query()
            .add_condition("count", op::GT, 10)
            .add_order_by("name");
        let found = Widget::fetch_where(&mut conn, &query).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(
            conn.only_call().sql,
            "SELECT * FROM widgets WHERE count > ? ORDER BY name ASC"
        );
    }

    #[test]
    fn test_custom_queries_bind_params() {
        let mut conn = MockConnection::new()
            .with_rows(vec![Row::new().with("total", 3i64)])
            .with_rows(vec![Row::new().with("id", 1i64).with("name", "x")]);

        let rows = Widget::custom_query_rows(
            &mut conn,
            "SELECT COUNT(*) AS total FROM widgets WHERE count > ?",
            &[Value::I32(0)],
        )
        .unwrap();
        assert_eq!(rows[0].get("total"), Some(&Value::I64(3)));

        let sql = "SELECT * FROM widgets WHERE name = ?";
        let first = Widget::custom_query(&mut conn, sql, &[Value::from("x")])
            .unwrap()
            .unwrap();
        assert_eq!(first.id, Some(1));

        assert_eq!(conn.calls()[1].bindings, vec![(1, BindValue::Str("x".to_string()))]);
    }

    #[test]
    fn test_reload_unsaved_is_none() {
        let mut conn = MockConnection::new();
        assert!(widget("a", 1).reload(&mut conn).unwrap().is_none());
        assert!(conn.calls().is_empty());
    }
}

//! UPDATE compilation

use super::common::{push_limit, push_where, reject_clauses, Clause};
use super::{CompiledQuery, QueryBuilder, QueryKind};
use crate::{Error, Result};

/// Values are the SET values in field order followed by the WHERE values
/// in condition order.
pub(super) fn compile(builder: &QueryBuilder, table: &str) -> Result<CompiledQuery> {
    if builder.field_set.is_empty() {
        return Err(Error::invalid_query("UPDATE requires at least one field"));
    }
    if builder.conditions.is_empty() {
        return Err(Error::DangerousUnconditionedMutation {
            kind: QueryKind::Update,
        });
    }
    reject_clauses(
        builder,
        QueryKind::Update,
        &[
            Clause::Columns,
            Clause::Joins,
            Clause::GroupBy,
            Clause::Having,
            Clause::OrderBy,
        ],
    )?;

    let mut params = Vec::with_capacity(builder.field_set.len() + builder.conditions.len());

    let set_parts: Vec<String> = builder
        .field_set
        .iter()
        .map(|(column, value)| {
            params.push(value.clone());
            format!("{} = ?", column)
        })
        .collect();

    let mut sql = format!("UPDATE {} SET {}", table, set_parts.join(", "));
    push_where(&mut sql, &builder.conditions, &mut params);
    push_limit(&mut sql, builder.limit);

    Ok(CompiledQuery { sql, params })
}

#[cfg(test)]
mod tests {
    use crate::builder::{update, QueryKind};
    use crate::{op, Error, Value};

    #[test]
    fn test_update_set_then_where_values() {
        let compiled = update("users")
            .add_field("name", "Jane")
            .add_field("age", 25)
            .add_condition("id", op::EQ, 1)
            .compile()
            .unwrap();
        assert_eq!(compiled.sql(), "UPDATE users SET name = ?, age = ? WHERE id = ?");
        assert_eq!(
            compiled.params(),
            &[Value::from("Jane"), Value::I32(25), Value::I32(1)]
        );
    }

    #[test]
    fn test_update_with_limit() {
        let sql = update("users")
            .add_field("status", "inactive")
            .add_condition("last_login", op::LT, "2020-01-01")
            .set_limit(100)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE users SET status = ? WHERE last_login < ? LIMIT 100 OFFSET 0"
        );
    }

    #[test]
    fn test_update_without_conditions_is_rejected() {
        let err = update("users").add_field("name", "Jane").compile().unwrap_err();
        assert!(matches!(
            err,
            Error::DangerousUnconditionedMutation {
                kind: QueryKind::Update
            }
        ));
    }

    #[test]
    fn test_update_without_fields_fails() {
        let err = update("users").add_condition("id", op::EQ, 1).compile().unwrap_err();
        assert!(matches!(err, Error::InvalidQuery { .. }));
    }
}

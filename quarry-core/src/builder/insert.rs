//! INSERT compilation

use super::common::{reject_clauses, Clause};
use super::{CompiledQuery, QueryBuilder, QueryKind};
use crate::{Error, Result};

pub(super) fn compile(builder: &QueryBuilder, table: &str) -> Result<CompiledQuery> {
    if builder.field_set.is_empty() {
        return Err(Error::invalid_query("INSERT requires at least one field"));
    }
    reject_clauses(
        builder,
        QueryKind::Insert,
        &[
            Clause::Columns,
            Clause::Conditions,
            Clause::Joins,
            Clause::GroupBy,
            Clause::Having,
            Clause::OrderBy,
            Clause::Limit,
        ],
    )?;

    let columns: Vec<&str> = builder
        .field_set
        .iter()
        .map(|(column, _)| column.as_str())
        .collect();
    let placeholders = vec!["?"; columns.len()];

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    );
    let params = builder.field_set.iter().map(|(_, value)| value.clone()).collect();

    Ok(CompiledQuery { sql, params })
}

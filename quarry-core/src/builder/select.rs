//! SELECT compilation

use super::common::{push_limit, push_where, reject_clauses, Clause};
use super::{CompiledQuery, QueryBuilder, QueryKind};
use crate::{Error, Result};

pub(super) fn compile(builder: &QueryBuilder, table: &str) -> Result<CompiledQuery> {
    if builder.columns.is_empty() {
        return Err(Error::invalid_query(
            "SELECT requires at least one column (use \"*\" for all)",
        ));
    }
    reject_clauses(builder, QueryKind::Select, &[Clause::Fields])?;

    let mut sql = String::new();
    let mut params = Vec::with_capacity(builder.conditions.len());

    // SELECT ... FROM
    sql.push_str("SELECT ");
    sql.push_str(&builder.columns.join(", "));
    sql.push_str(" FROM ");
    sql.push_str(table);

    // JOIN fragments
    if !builder.joins.is_empty() {
        sql.push(' ');
        sql.push_str(&builder.joins.join(" "));
    }

    push_where(&mut sql, &builder.conditions, &mut params);

    if !builder.group_by.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&builder.group_by.join(", "));
    }

    if !builder.having.is_empty() {
        sql.push_str(" HAVING ");
        sql.push_str(&builder.having.join(" AND "));
    }

    if !builder.order_by.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&builder.order_by.join(", "));
    }

    push_limit(&mut sql, builder.limit);

    Ok(CompiledQuery { sql, params })
}

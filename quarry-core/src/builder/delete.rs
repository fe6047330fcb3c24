//! DELETE compilation

use super::common::{push_limit, push_where, reject_clauses, Clause};
use super::{CompiledQuery, QueryBuilder, QueryKind};
use crate::{Error, Result};

pub(super) fn compile(builder: &QueryBuilder, table: &str) -> Result<CompiledQuery> {
    if builder.conditions.is_empty() {
        return Err(Error::DangerousUnconditionedMutation {
            kind: QueryKind::Delete,
        });
    }
    reject_clauses(
        builder,
        QueryKind::Delete,
        &[
            Clause::Columns,
            Clause::Fields,
            Clause::Joins,
            Clause::GroupBy,
            Clause::Having,
            Clause::OrderBy,
        ],
    )?;

    let mut sql = format!("DELETE FROM {}", table);
    let mut params = Vec::with_capacity(builder.conditions.len());
    push_where(&mut sql, &builder.conditions, &mut params);
    push_limit(&mut sql, builder.limit);

    Ok(CompiledQuery { sql, params })
}

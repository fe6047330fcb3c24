//! Common types and clause emitters shared across all query kinds

use super::{QueryBuilder, QueryKind};
use crate::{Connector, Error, Operator, Result, Value};
use std::fmt::{self, Display};

/// A WHERE condition
#[derive(Debug, Clone, PartialEq)]
pub struct WhereCondition {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
    pub connector: Connector,
}

/// JOIN types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER"),
            JoinType::Left => write!(f, "LEFT"),
            JoinType::Right => write!(f, "RIGHT"),
            JoinType::Full => write!(f, "FULL OUTER"),
        }
    }
}

/// Sort direction for ORDER BY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// LIMIT / OFFSET pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub count: u64,
    pub offset: u64,
}

/// Anything usable as a column list: one name, a vector, an array or a
/// small tuple of names
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<String> {
        self
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl<const N: usize> IntoColumns for [&str; N] {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

macro_rules! impl_into_columns_for_tuple {
    ($($name:ident),+) => {
        impl<$($name),+> IntoColumns for ($($name,)+)
        where
            $($name: AsRef<str>,)+
        {
            #[allow(non_snake_case)]
            fn into_columns(self) -> Vec<String> {
                let ($($name,)+) = self;
                vec![$($name.as_ref().to_string()),+]
            }
        }
    };
}

impl_into_columns_for_tuple!(A, B);
impl_into_columns_for_tuple!(A, B, C);
impl_into_columns_for_tuple!(A, B, C, D);

/// Emit ` WHERE c1 op ? AND c2 op ? ...` and push the condition values in
/// the same order
pub(super) fn push_where(sql: &mut String, conditions: &[WhereCondition], params: &mut Vec<Value>) {
    if conditions.is_empty() {
        return;
    }

    sql.push_str(" WHERE ");
    for (i, condition) in conditions.iter().enumerate() {
        if i > 0 {
            sql.push(' ');
            sql.push_str(condition.connector.as_str());
            sql.push(' ');
        }

        sql.push_str(&condition.column);
        sql.push(' ');
        sql.push_str(condition.operator.as_str());
        sql.push_str(" ?");
        params.push(condition.value.clone());
    }
}

/// Emit ` LIMIT n OFFSET m`
pub(super) fn push_limit(sql: &mut String, limit: Option<Limit>) {
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {} OFFSET {}", limit.count, limit.offset));
    }
}

/// Reject clauses the given kind cannot carry, instead of silently
/// dropping them from the compiled SQL.
pub(super) fn reject_clauses(
    builder: &QueryBuilder,
    kind: QueryKind,
    clauses: &[Clause],
) -> Result<()> {
    for clause in clauses {
        let present = match clause {
            Clause::Columns => !builder.columns.is_empty(),
            Clause::Fields => !builder.field_set.is_empty(),
            Clause::Conditions => !builder.conditions.is_empty(),
            Clause::Joins => !builder.joins.is_empty(),
            Clause::GroupBy => !builder.group_by.is_empty(),
            Clause::Having => !builder.having.is_empty(),
            Clause::OrderBy => !builder.order_by.is_empty(),
            Clause::Limit => builder.limit.is_some(),
        };
        if present {
            return Err(Error::invalid_query(format!(
                "{} does not support {}",
                kind, clause
            )));
        }
    }
    Ok(())
}

/// Builder parts that only some kinds accept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Clause {
    Columns,
    Fields,
    Conditions,
    Joins,
    GroupBy,
    Having,
    OrderBy,
    Limit,
}

impl Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Clause::Columns => "selected columns",
            Clause::Fields => "a field set",
            Clause::Conditions => "WHERE conditions",
            Clause::Joins => "JOIN",
            Clause::GroupBy => "GROUP BY",
            Clause::Having => "HAVING",
            Clause::OrderBy => "ORDER BY",
            Clause::Limit => "LIMIT",
        };
        f.write_str(name)
    }
}

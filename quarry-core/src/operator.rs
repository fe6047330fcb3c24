//! SQL operator types and conversions

use crate::{Error, Result};
use std::borrow::Cow;
use std::fmt::{self, Display};

/// Comparison operator emitted between a column and its placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator(Cow<'static, str>);

impl Operator {
    pub const EQ: Self = Operator(Cow::Borrowed("="));
    pub const NEQ: Self = Operator(Cow::Borrowed("!="));
    pub const GT: Self = Operator(Cow::Borrowed(">"));
    pub const GTE: Self = Operator(Cow::Borrowed(">="));
    pub const LT: Self = Operator(Cow::Borrowed("<"));
    pub const LTE: Self = Operator(Cow::Borrowed("<="));
    pub const LIKE: Self = Operator(Cow::Borrowed("LIKE"));
    pub const NOT_LIKE: Self = Operator(Cow::Borrowed("NOT LIKE"));

    /// Create a custom operator for database-specific comparisons
    ///
    /// # Examples
    /// ```
    /// use quarry_core::Operator;
    ///
    /// let glob = Operator::custom("GLOB");
    /// assert_eq!(glob.as_str(), "GLOB");
    /// ```
    pub fn custom(op: impl Into<Cow<'static, str>>) -> Self {
        Operator(op.into())
    }

    /// Get the string representation of the operator
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reject operators that could smuggle arbitrary SQL into the statement.
    ///
    /// Symbolic operators (`=`, `<>`, `@>`, ...) and plain keyword operators
    /// (`LIKE`, `NOT LIKE`, `GLOB`) are accepted.
    pub fn validate(&self) -> Result<()> {
        let op = self.0.trim();
        if op.is_empty() {
            return Err(Error::invalid_query("empty comparison operator"));
        }

        let symbolic = op.chars().all(|c| "=!<>~@&|^#%+-*/".contains(c));
        let keyword = op
            .split(' ')
            .all(|word| !word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic()));

        if symbolic || keyword {
            Ok(())
        } else {
            Err(Error::invalid_query(format!(
                "invalid comparison operator '{}'",
                op
            )))
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for types that can be converted to SQL operators
pub trait IntoOperator {
    fn into_operator(self) -> Operator;
}

impl IntoOperator for Operator {
    fn into_operator(self) -> Operator {
        self
    }
}

/// Common spellings map onto the constants; anything else becomes a custom
/// operator and is checked by [`Operator::validate`] when the query compiles.
impl IntoOperator for &str {
    fn into_operator(self) -> Operator {
        match self {
            "=" => Operator::EQ,
            "!=" => Operator::NEQ,
            ">" => Operator::GT,
            ">=" => Operator::GTE,
            "<" => Operator::LT,
            "<=" => Operator::LTE,
            "LIKE" | "like" => Operator::LIKE,
            "NOT LIKE" | "not like" => Operator::NOT_LIKE,
            other => Operator::custom(other.to_string()),
        }
    }
}

/// How WHERE conditions are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

impl Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convenience module for operator constants
pub mod op {
    use super::Operator;

    pub const EQ: Operator = Operator::EQ;
    pub const NEQ: Operator = Operator::NEQ;
    pub const GT: Operator = Operator::GT;
    pub const GTE: Operator = Operator::GTE;
    pub const LT: Operator = Operator::LT;
    pub const LTE: Operator = Operator::LTE;
    pub const LIKE: Operator = Operator::LIKE;
    pub const NOT_LIKE: Operator = Operator::NOT_LIKE;
}

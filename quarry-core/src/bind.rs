//! Bind-type resolution: maps runtime values onto statement parameter kinds

use crate::{Error, Result, Value};
use std::fmt::{self, Display};

/// Parameter kind a prepared statement binds a value as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    Int,
    Str,
    Null,
}

impl Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::Bool => "BOOL",
            ParamType::Int => "INT",
            ParamType::Str => "STRING",
            ParamType::Null => "NULL",
        };
        f.write_str(name)
    }
}

/// Resolve the parameter kind for a value.
///
/// Floating-point values resolve to [`ParamType::Int`] and are bound as
/// integers; avoid depending on fractional precision. Structured values
/// (JSON documents and arrays) resolve to [`ParamType::Str`] and are bound
/// as their serialized JSON text.
///
/// # Errors
///
/// [`Error::UnsupportedBindType`] for values with no parameter kind
/// (currently raw bytes).
pub fn resolve(value: &Value) -> Result<ParamType> {
    match value {
        Value::Bool(_) => Ok(ParamType::Bool),
        Value::I32(_) | Value::I64(_) | Value::F32(_) | Value::F64(_) => Ok(ParamType::Int),
        Value::String(_) | Value::Json(_) | Value::Array(_) => Ok(ParamType::Str),
        Value::Null => Ok(ParamType::Null),
        Value::Bytes(_) => Err(Error::UnsupportedBindType {
            type_name: value.type_name(),
        }),
    }
}

/// A value coerced to its resolved parameter kind, ready for a driver to bind
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Null,
}

impl BindValue {
    /// Resolve and coerce a value. Floats truncate toward zero.
    pub fn from_value(value: &Value) -> Result<Self> {
        let bound = match (resolve(value)?, value) {
            (ParamType::Bool, Value::Bool(b)) => BindValue::Bool(*b),
            (ParamType::Int, Value::I32(i)) => BindValue::Int(i64::from(*i)),
            (ParamType::Int, Value::I64(i)) => BindValue::Int(*i),
            (ParamType::Int, Value::F32(f)) => BindValue::Int(*f as i64),
            (ParamType::Int, Value::F64(f)) => BindValue::Int(*f as i64),
            (ParamType::Str, Value::String(s)) => BindValue::Str(s.clone()),
            (ParamType::Str, Value::Json(_) | Value::Array(_)) => {
                BindValue::Str(serde_json::to_string(&value.to_json())?)
            }
            (ParamType::Null, _) => BindValue::Null,
            _ => {
                return Err(Error::UnsupportedBindType {
                    type_name: value.type_name(),
                })
            }
        };
        Ok(bound)
    }

    pub fn param_type(&self) -> ParamType {
        match self {
            BindValue::Bool(_) => ParamType::Bool,
            BindValue::Int(_) => ParamType::Int,
            BindValue::Str(_) => ParamType::Str,
            BindValue::Null => ParamType::Null,
        }
    }
}

/// Resolve a whole parameter list, failing on the first unsupported value
pub fn bind_all(params: &[Value]) -> Result<Vec<BindValue>> {
    params.iter().map(BindValue::from_value).collect()
}

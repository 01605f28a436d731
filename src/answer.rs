//! The answer value a resolver commits to.
//!
//! Resolvers produce heterogeneous values — an integer column sum, a JSON
//! structure lifted straight off the page, a bare string. The closed enum
//! keeps the submission serializer exhaustive instead of passing raw
//! `serde_json::Value`s around.

use serde::Serialize;
use serde_json::Value;

/// Final answer text when every resolver declined.
///
/// This is a legitimate answer, not an error: it is submitted as-is when a
/// submit target exists.
pub const UNSOLVED_SENTINEL: &str = "could-not-solve-automatically";

/// A candidate answer produced by one of the resolvers.
///
/// Serialized untagged, so the submission payload carries the plain value
/// (`42`, `true`, `"blue"`, `{...}`) rather than an enum wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Structured(Value),
}

impl Answer {
    /// Lift a JSON value into the closed answer type.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or(0.0)),
            },
            Value::String(s) => Self::Text(s),
            other => Self::Structured(other),
        }
    }

    /// The answer as a plain JSON value, as it appears in the submission.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

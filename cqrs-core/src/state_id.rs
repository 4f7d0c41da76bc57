use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Primary key of an aggregate: a 64-bit signed integer, a string, or a
/// 128-bit UUID. Kept concrete rather than generic over an opaque type
/// parameter so gateway trait signatures stay testable without an extra
/// type parameter on every trait.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StateId {
    Int(i64),
    Str(String),
    Uuid(Uuid),
}

impl From<i64> for StateId {
    fn from(v: i64) -> Self {
        StateId::Int(v)
    }
}

impl From<String> for StateId {
    fn from(v: String) -> Self {
        StateId::Str(v)
    }
}

impl From<&str> for StateId {
    fn from(v: &str) -> Self {
        StateId::Str(v.to_owned())
    }
}

impl From<Uuid> for StateId {
    fn from(v: Uuid) -> Self {
        StateId::Uuid(v)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateId::Int(v) => write!(f, "{v}"),
            StateId::Str(v) => write!(f, "{v}"),
            StateId::Uuid(v) => write!(f, "{v}"),
        }
    }
}

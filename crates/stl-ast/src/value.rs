//! The dynamic reference value model (§9 design notes).
//!
//! Every STL expression — a literal, a `$read` or `&write` reference, a list,
//! a map, or a qualifier call — is represented as a [`Value`] until the
//! resolver turns it into a bound, typed primitive or a field thunk.

use std::sync::Arc;

pub type Name = Arc<str>;

/// A primitive type a const or message field can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Bool,
    Int,
    String,
}

/// An unresolved STL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    Null,
    /// `$a.b.c` — a read reference. The path is non-empty; a single-element
    /// path is a bare name (param, local, const, or role), a longer path is
    /// `role.field`.
    Get(Vec<Name>),
    /// `&a.b.c` — a write reference, same path shape as `Get`.
    Set(Vec<Name>),
    List(Vec<Value>),
    /// `{ a: 1, b: 2 }` — an untyped struct literal, e.g. a nested field
    /// default. Not checked against any declared message shape.
    Map(Vec<(Name, Value)>),
    /// `Name { a: 1, b: 2 }` — a message literal naming its declared message
    /// type, e.g. an event-call argument. Checked against that message's
    /// resolved shape at resolve time (§4.E field-type rules).
    Message { name: Name, fields: Vec<(Name, Value)> },
    /// `Qualifier(args...)` — an inline qualifier invocation used as a field
    /// value or reference argument.
    QualifierCall { name: Name, args: Vec<Value> },
}

impl Value {
    pub fn get(path: impl IntoIterator<Item = impl Into<Name>>) -> Value {
        Value::Get(path.into_iter().map(Into::into).collect())
    }

    pub fn set(path: impl IntoIterator<Item = impl Into<Name>>) -> Value {
        Value::Set(path.into_iter().map(Into::into).collect())
    }
}

/// A reference to a declared state value as it appears inside a transition's
/// `pre_states` / `post_states` / `error_states` lists, before resolution
/// checks the parameter arity and value membership.
#[derive(Debug, Clone, PartialEq)]
pub struct StateValueRef {
    pub state: Name,
    pub params: Vec<Value>,
    pub value: Name,
}

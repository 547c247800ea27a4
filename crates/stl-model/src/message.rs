//! Resolved message shapes and populated message values (§3).

use crate::value::RuntimeValue;
use stl_ast::{FieldRule, FieldType, Name};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldResolved {
    pub name: Name,
    pub ty: FieldType,
    pub rule: FieldRule,
    pub encoding_props: Vec<(Name, RuntimeValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageBodyResolved {
    Declared { fields: Vec<FieldResolved>, nested: Vec<MessageResolved> },
    External { descriptor: Name },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageResolved {
    pub name: Name,
    pub encode: Option<Name>,
    pub is_array: bool,
    pub body: MessageBodyResolved,
}

/// A [`MessageResolved`] paired with a populated field map, or an array of
/// such maps when `is_array` is set. Encoding (§6) turns this into bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageValue {
    Single(std::collections::HashMap<Name, RuntimeValue>),
    Array(Vec<std::collections::HashMap<Name, RuntimeValue>>),
}

//! Fully-concrete runtime values and the resolved reference forms a
//! [`stl_ast::Value`] is turned into once the resolver has bound it to a
//! specific slot (§4.E, §9 dynamic references).

use stl_ast::Name;
use std::collections::HashMap;

/// A value with no remaining unresolved references: either bound directly
/// at resolution time (literals) or produced at runtime by evaluating a
/// [`ResolvedExpr`] (field reads, qualifier generation).
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Null,
    List(Vec<RuntimeValue>),
    Map(HashMap<Name, RuntimeValue>),
}

/// Where a `$get` / `&set` reference ultimately points, once the resolver
/// has disambiguated `role.field` vs. bare param/local/const lookup (§4.E).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A role's declared field, read or written through the role's current
    /// value map.
    RoleField { role: Name, field: Name },
    /// A transition-local variable, addressed by its declaration index
    /// rather than by name (arena-plus-index ownership, §9).
    Local { index: usize },
    /// A bare reference to a role itself, rather than one of its fields —
    /// produced when a param bound to a role name is passed as an event
    /// argument, so the event's `source`/`target` can name a role (§4.E).
    Role { role: Name },
}

/// An expression with every name resolved: literals are inlined, every
/// reference names a concrete [`Slot`], and qualifier calls name a
/// qualifier definition directly instead of a bare identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedExpr {
    Literal(RuntimeValue),
    Get(Slot),
    Set(Slot),
    List(Vec<ResolvedExpr>),
    Map(Vec<(Name, ResolvedExpr)>),
    QualifierCall { qualifier: Name, args: Vec<ResolvedExpr> },
}

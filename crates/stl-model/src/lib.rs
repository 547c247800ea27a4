//! Fully-resolved semantic model for the State Transition Language (§3, §4.D).
//!
//! `stl-ast` values are parameterized and reference-laden; `stl-resolver`
//! clones them into the types here, which carry no unbound names. The
//! graph builder, planner, and executor all operate purely on this crate.

mod message;
mod role;
mod state;
mod transition;
mod value;

pub use message::{FieldResolved, MessageBodyResolved, MessageResolved, MessageValue};
pub use role::{RoleFieldError, RoleState};
pub use state::{StateResolved, StateValue};
pub use transition::{EventCallResolved, TestSide, TransitionResolved};
pub use value::{ResolvedExpr, RuntimeValue, Slot};

use stl_ast::{ConstDef, Name, QualifierDef, RoleDef, StateDef};

/// A fully resolved module: every reference bound, every transition
/// expansion inlined. Consts, declared role shapes, and state declarations
/// need no resolution beyond const-value binding, so they are carried
/// through from the AST largely unchanged.
#[derive(Debug, Clone, Default)]
pub struct ResolvedModule {
    pub name: String,
    pub consts: Vec<ConstDef>,
    pub roles: Vec<RoleDef>,
    pub states: Vec<StateDef>,
    pub messages: Vec<MessageResolved>,
    pub qualifiers: Vec<QualifierDef>,
    pub transitions: Vec<TransitionResolved>,
}

impl ResolvedModule {
    pub fn state_def(&self, name: &str) -> Option<&StateDef> {
        self.states.iter().find(|s| &*s.name == name)
    }

    pub fn role_def(&self, name: &str) -> Option<&RoleDef> {
        self.roles.iter().find(|r| &*r.name == name)
    }

    pub fn const_value(&self, name: &str) -> Option<&ConstDef> {
        self.consts.iter().find(|c| &*c.name == name)
    }
}

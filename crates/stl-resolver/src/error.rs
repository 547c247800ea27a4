//! Link, type, and model errors (§7) the resolver can raise. All of them
//! abort the run with a formatted diagnostic; none are recoverable the way
//! a transition failure is.

use stl_ast::Name;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("unresolved reference {name}{}", suffix(suggestion))]
    UnresolvedReference { name: String, suggestion: Option<String> },

    #[error("unknown state {name}{}", suffix(suggestion))]
    UnknownState { name: String, suggestion: Option<String> },

    #[error("state {state} takes {expected} parameter(s), got {actual}")]
    StateArityMismatch { state: Name, expected: usize, actual: usize },

    #[error("state {state} has no value {value}{}", suffix(suggestion))]
    UnknownStateValue { state: Name, value: String, suggestion: Option<String> },

    #[error("transition {name} expects {expected} argument(s), got {actual}")]
    TransitionArityMismatch { name: Name, expected: usize, actual: usize },

    #[error("unknown transition {name}{}", suffix(suggestion))]
    UnknownTransition { name: String, suggestion: Option<String> },

    #[error("unknown qualifier {name}{}", suffix(suggestion))]
    UnknownQualifier { name: String, suggestion: Option<String> },

    #[error("unknown event {name}{}", suffix(suggestion))]
    UnknownEvent { name: String, suggestion: Option<String> },

    #[error("unknown message {name}{}", suffix(suggestion))]
    UnknownMessage { name: String, suggestion: Option<String> },

    #[error("field {field} on message {message} is required but missing")]
    MissingRequiredField { message: Name, field: Name },

    #[error("field {field} on message {message} has the wrong type")]
    FieldTypeMismatch { message: Name, field: Name },

    #[error("const {name} has no value bound and none supplied by the manifest")]
    UnboundConstant { name: Name },

    #[error("transition {name} names both {role_a} and {role_b} as roles under test")]
    BothRolesUnderTest { name: Name, role_a: Name, role_b: Name },

    #[error("event {name} has neither source nor target role resolvable")]
    UnresolvableEventContext { name: Name },

    #[error("state {state} parameter is not a constant expression")]
    NonConstantStateParameter { state: Name },

    #[error("event {name} expects {expected} argument(s), got {actual}")]
    EventArityMismatch { name: Name, expected: usize, actual: usize },
}

fn suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean {s}?)"),
        None => String::new(),
    }
}

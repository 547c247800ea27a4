//! Runtime failure modes distinct from an ordinary transition failure (§7).

use stl_ast::Name;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("constant {0} has no bound value at execution time")]
    UnboundConstant(Name),

    #[error("event {0} is not registered with the executor")]
    UnknownEvent(Name),

    #[error("qualifier external {0} is not registered with the executor")]
    UnknownQualifier(Name),

    #[error("role {0} is not declared in the module")]
    UnknownRole(Name),

    #[error("event {event} yielded a runtime error: {source}")]
    EventRaised { event: Name, #[source] source: stl_externals::ExternalError },

    #[error("a `Set` thunk cannot be evaluated as an input value: {0:?}")]
    UnsupportedSetInValuePosition(stl_model::Slot),

    #[error("transition {transition} failed and no error vertex could be reached: {reason}")]
    ExhaustedRecovery { transition: Name, reason: String },
}

use stl_ast::Name;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("state {0} is referenced by a transition but has no declaration in the resolved module")]
    UndeclaredState(Name),

    #[error("graph is not strongly connected from the initial vertex; unreached vertices: {0}")]
    NotStronglyConnected(usize),
}

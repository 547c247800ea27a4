use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PlannerError {
    #[error("graph is not strongly connected; {0} vertex(es) unreachable from the initial vertex")]
    NotStronglyConnected(usize),

    #[error("traversal planning produced a graph that is not Eulerian after augmentation")]
    NotEulerian,
}

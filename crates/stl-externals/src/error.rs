//! Failure modes the executor treats as runtime errors (§7) rather than as
//! ordinary transition failures.

use stl_ast::Name;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("encoding {encoding} cannot serialize message {message}: {reason}")]
    Encode { encoding: String, message: Name, reason: String },
    #[error("encoding {encoding} cannot parse message {message}: {reason}")]
    Decode { encoding: String, message: Name, reason: String },
    #[error("event raised an error instead of returning a boolean: {0}")]
    EventRaised(String),
}

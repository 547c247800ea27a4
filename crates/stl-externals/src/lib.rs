//! Trait boundary for STL's pluggable externals (§6): encodings, events,
//! and qualifiers. The core never calls user code directly — it only ever
//! calls through these three traits, plus the built-in implementations
//! trivial STL programs can use without writing any Rust.

mod encoding;
mod error;
mod event;
mod qualifier;

pub use encoding::{Encoding, Json, KeyValue, Protobuf, ProtobufBase64};
pub use error::ExternalError;
pub use event::{EventContext, EventExternal, ExpectedValue, Noop};
pub use qualifier::{DifferentFrom, Qualifier, UniqueInt};

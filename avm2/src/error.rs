//! The runtime error taxonomy (spec §7).
//!
//! Decode/link failures (1–2) are raised once, at `load()` or the first
//! offending instruction, and are not catchable by AVM2 exception handlers.
//! The rest (3–6) are ordinary AVM2-level throws: they unwind through the
//! method body's exception table like any `throw`, via [`Error::Action`].

use crate::value::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("decode error: {0}")]
    Decode(#[from] abc::DecodeError),

    #[error("link error: {0}")]
    Link(String),

    #[error("ReferenceError: {0}")]
    Reference(String),

    #[error("TypeError: {0}")]
    Type(String),

    #[error("RangeError: {0}")]
    Range(String),

    #[error("host error: {0}")]
    Host(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A value thrown by `throw` or raised internally as one of the AVM2
    /// error kinds above, en route to being caught by an exception-table
    /// entry or propagated to the caller. This is the only variant the
    /// interpreter's unwinder inspects; the others short-circuit decode or
    /// linking before any bytecode runs.
    #[error("uncaught AVM2 exception")]
    Action(Value),
}

impl Error {
    pub fn reference(message: impl Into<String>) -> Self {
        Error::Reference(message.into())
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Error::Type(message.into())
    }

    pub fn range(message: impl Into<String>) -> Self {
        Error::Range(message.into())
    }

    /// Wraps this error as the AVM2-level thrown value the exception table
    /// machinery understands, so `TypeError`/`ReferenceError`/`RangeError`
    /// become catchable exactly like a user `throw`.
    pub fn into_thrown_value(self) -> Value {
        match self {
            Error::Action(value) => value,
            other => Value::String(other.to_string().into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

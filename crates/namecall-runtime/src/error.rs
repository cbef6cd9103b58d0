//! Error types for lookup, invocation, and handle resolution

use crate::value::ConversionError;
use thiserror::Error;

/// Errors surfaced by [`Registry::call`](crate::Registry::call) and callables
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    /// No callable is registered under the name
    #[error("Function '{name}' not found")]
    NotFound { name: String },

    /// Fewer tokens than the callable's minimum arity
    #[error(
        "Not enough arguments passed to function {name}({descriptor}): expected {expected}, got {got}"
    )]
    ArgumentCount {
        name: String,
        descriptor: String,
        expected: usize,
        got: usize,
    },

    /// A token could not be converted to the parameter's type
    #[error("Argument {position} of '{name}': {source}")]
    Conversion {
        name: String,
        position: usize,
        #[source]
        source: ConversionError,
    },

    /// A handle argument does not name a live object of the expected type
    #[error(transparent)]
    Handle(#[from] HandleError),

    /// The wrapped function reported a failure
    #[error("{0}")]
    Failed(String),
}

impl CallError {
    /// Failure raised by a wrapped function
    pub fn failed(msg: impl Into<String>) -> Self {
        CallError::Failed(msg.into())
    }
}

impl From<String> for CallError {
    fn from(msg: String) -> Self {
        CallError::Failed(msg)
    }
}

impl From<&str> for CallError {
    fn from(msg: &str) -> Self {
        CallError::Failed(msg.to_string())
    }
}

/// Errors resolving a handle against the handle table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    /// The null handle (the sentinel) never names an object
    #[error("Null handle")]
    Null,

    /// Unknown slot, or the object was released
    #[error("Stale or unknown handle: 0x{0:x}")]
    Stale(u64),

    /// The object is live but of another type
    #[error("Handle type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors about the process-wide registry
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// `global()` was called before `install()`
    #[error("Registry is not installed yet")]
    NotReady,

    /// `install()` was called twice
    #[error("Registry is already installed")]
    AlreadyInstalled,
}

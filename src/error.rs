//! Error types for the playground compiler.
//!
//! Nothing in here ever crosses the public compile boundary as an `Err`:
//! the orchestrator folds every variant into a [`crate::CompileResult`].

use std::any::Any;
use thiserror::Error;

/// Script text that could not be split into fragments.
///
/// Never fatal. Surfaced to the caller as a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// `methods: {` was found but its object literal never closes.
    #[error("method table starting at offset {offset} has no matching closing brace")]
    UnbalancedMethodTable { offset: usize },

    /// Non-empty script without a `setup()`, `data()` or `methods:` block.
    #[error("no setup(), data() or methods: block found; script ignored")]
    NoRecognizedShape,
}

/// Failure while turning fragments into host-executable procedures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// The synthesized function text does not parse as JavaScript.
    #[error("{procedure} could not be constructed: {message}")]
    Rejected { procedure: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("{0}")]
    Template(String),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("Invalid compiler options: {0}")]
    Options(String),
}

impl From<serde_json::Error> for CompileError {
    fn from(err: serde_json::Error) -> Self {
        CompileError::Options(err.to_string())
    }
}

/// Best-effort text for a payload captured by `catch_unwind`.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown error".to_string()
    }
}

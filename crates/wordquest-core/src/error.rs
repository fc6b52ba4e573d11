//! Engine and store error types.
//!
//! Session errors are always caller bugs; store errors may be transient.
//! Both live here so the aggregator can classify failures without string
//! matching.

use thiserror::Error;
use uuid::Uuid;

use crate::matching::CardId;
use crate::model::WordId;
use crate::traits::Collection;

/// Errors raised by the word bank and the session state machines.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An operation was invoked outside its legal state.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// The catalog has no entry with this id.
    #[error("word not found: {0}")]
    NotFound(WordId),

    /// The match grid has no card with this id.
    #[error("unknown card: {0}")]
    UnknownCard(CardId),

    /// Two catalog entries share an id.
    #[error("duplicate word id: {0}")]
    DuplicateWordId(WordId),

    /// The catalog cannot supply even a minimal session.
    #[error("not enough words to {0}")]
    EmptyPool(String),
}

impl EngineError {
    pub(crate) fn invalid_state(operation: &'static str, state: impl ToString) -> Self {
        EngineError::InvalidState {
            operation,
            state: state.to_string(),
        }
    }

    /// Returns `true` if the error means the caller drove the state machine
    /// incorrectly. Such errors must never be retried.
    pub fn is_caller_bug(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidState { .. } | EngineError::UnknownCard(_)
        )
    }
}

/// Errors returned by a [`DocumentStore`](crate::traits::DocumentStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with this id exists in the collection.
    #[error("{collection} record not found: {id}")]
    NotFound { collection: Collection, id: Uuid },

    /// A record with this id already exists in the collection.
    #[error("{collection} record already exists: {id}")]
    AlreadyExists { collection: Collection, id: Uuid },

    /// Reading or writing the backing storage failed.
    #[error("storage I/O failed: {0}")]
    Io(String),

    /// A record could not be converted to or from its stored form.
    #[error("record serialization failed: {0}")]
    Serialization(String),

    /// The store is temporarily unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns `true` if repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Io(_) | StoreError::Unavailable(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

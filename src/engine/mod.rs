//! League rules: booking lifecycle, result confirmation, standings and seasons.
//!
//! Everything in here is synchronous and storage-free. Handlers load the
//! documents a rule needs, call into these functions and persist whatever
//! comes back inside one transaction.

pub mod booking;
pub mod result;
pub mod season;
pub mod slots;
pub mod standings;

use crate::validation::ValidationError;
use thiserror::Error;

/// Reporter and reviewer id used for records the league creates on its own
pub const SYSTEM_USER: &str = "system";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation is not valid for the document's current status
    #[error("{0}")]
    State(String),

    #[error("{0}")]
    Permission(String),

    /// A claim or fixture collides with existing bookings
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),
}

impl EngineError {
    pub(crate) fn state(message: impl Into<String>) -> Self {
        EngineError::State(message.into())
    }

    pub(crate) fn permission(message: impl Into<String>) -> Self {
        EngineError::Permission(message.into())
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        EngineError::Conflict(message.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

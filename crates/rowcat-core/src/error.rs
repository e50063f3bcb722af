#![forbid(unsafe_code)]

//! Error taxonomy for the adapter core.
//!
//! Two of these are programming errors surfaced as values so hosts can decide
//! whether to abort or log-and-continue: [`AdapterError::ConcurrencyViolation`]
//! (section mutation off the owner thread) and
//! [`AdapterError::OutOfRangeLookup`] (position resolution outside the
//! flattened range). Bind and view-creation failures are recoverable through
//! an [`crate::AdapterErrorHandler`]; without one installed they propagate.
//! Diffing itself is total and has no error states.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdapterError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// Section mutation was attempted off the owner thread.
    #[error("sections may only be modified on the owner thread")]
    ConcurrencyViolation,

    /// A flat position outside `[0, len)` was resolved.
    #[error("position {position} out of range for {len} items")]
    OutOfRangeLookup { position: usize, len: usize },

    /// An item-specific bind failed during render.
    #[error("bind failed at position {position}: {message}")]
    BindFailure { position: usize, message: String },

    /// A view could not be created for the given view type.
    #[error("view creation failed for view type {view_type_id}: {message}")]
    ViewCreationFailure { view_type_id: u32, message: String },

    /// An item's type tag is not in the closed view-type table.
    #[error("view type not registered: {kind}")]
    UnknownViewType { kind: String },
}

impl AdapterError {
    #[must_use]
    pub fn bind_failure(position: usize, message: impl Into<String>) -> Self {
        Self::BindFailure {
            position,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn view_creation_failure(view_type_id: u32, message: impl Into<String>) -> Self {
        Self::ViewCreationFailure {
            view_type_id,
            message: message.into(),
        }
    }

    /// True for the programming-error variants a debug host should treat as
    /// fatal.
    #[must_use]
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::ConcurrencyViolation | Self::OutOfRangeLookup { .. } | Self::UnknownViewType { .. }
        )
    }
}

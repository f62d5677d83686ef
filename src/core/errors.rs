//! Core error types

use thiserror::Error;

use crate::core::output::OutputId;
use crate::core::SurfaceId;

/// Core layer shell errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(&'static str),

    #[error("Invalid layer value: {0}")]
    InvalidLayer(u32),

    #[error("Output {0} does not exist or is disabled")]
    UnknownOutput(OutputId),

    #[error("No output available")]
    NoOutputAvailable,

    #[error("Unknown layer surface: {0}")]
    UnknownSurface(SurfaceId),

    #[error("Layer surface {0} is destroyed")]
    ControllerDestroyed(SurfaceId),

    #[error("Layer surface {0} has not completed its initial commit")]
    NotInitialized(SurfaceId),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Invalid size: {0}")]
    InvalidSize(&'static str),

    #[error("Scene node {0} not found")]
    MissingSceneNode(u32),
}

impl CoreError {
    pub fn protocol_violation(msg: impl Into<String>) -> Self {
        Self::ProtocolViolation(msg.into())
    }

    /// Errors caused by a client breaking the protocol, as opposed to
    /// resource shortage or compositor-side bookkeeping.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidLayer(_)
                | Self::NotInitialized(_)
                | Self::ProtocolViolation(_)
                | Self::InvalidSize(_)
        )
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Reports a broken internal invariant.
///
/// Fatal in debug builds; logged and otherwise ignored in release builds so
/// one misbehaving surface cannot take the compositor down.
#[macro_export]
macro_rules! contract_violation {
    ($($arg:tt)*) => {{
        tracing::error!($($arg)*);
        debug_assert!(false, $($arg)*);
    }};
}

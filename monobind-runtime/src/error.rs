// Error types for the monobind runtime bridge.

use thiserror::Error;

use monobind_abi::BindStatus;

/// Failures a thunk can report under [`ErrorPolicy::Status`].
///
/// Under [`ErrorPolicy::Silent`] only [`BridgeError::ArgumentMismatch`] and
/// [`BridgeError::InvalidReceiver`] ever reach the caller; everything else
/// degrades to the return type's default value.
///
/// [`ErrorPolicy::Status`]: monobind_abi::ErrorPolicy::Status
/// [`ErrorPolicy::Silent`]: monobind_abi::ErrorPolicy::Silent
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("class not resolved: {0}")]
    ClassNotResolved(String),
    #[error("method not found: {0}")]
    MethodNotFound(String),
    #[error("managed exception raised by {0}")]
    ManagedException(String),
    #[error("argument mismatch: {0}")]
    ArgumentMismatch(String),
    #[error("instance method {0} called without a receiver")]
    InvalidReceiver(String),
}

/// Convenience alias used throughout the bridge.
pub type BridgeResult<T> = Result<T, BridgeError>;

impl From<&BridgeError> for BindStatus {
    fn from(err: &BridgeError) -> Self {
        match err {
            BridgeError::ClassNotResolved(_) => BindStatus::ClassNotFound,
            BridgeError::MethodNotFound(_) => BindStatus::MethodNotFound,
            BridgeError::ManagedException(_) => BindStatus::Exception,
            // Caller contract violations have no C counterpart: the generated
            // signatures make them unrepresentable.
            BridgeError::ArgumentMismatch(_) | BridgeError::InvalidReceiver(_) => {
                BindStatus::Exception
            }
        }
    }
}

//! Cancellation error and the crate `Result`
use thiserror::Error;

/// Result type: `std::result::Result<T, CancelledError>`
pub type Result<T> = std::result::Result<T, CancelledError>;

/// The only failure a queue or condition operation can produce:
/// the caller supplied [`Cancellation`] fired before the operation could complete.
///
/// No state is changed by an operation that returns this error.
///
/// [`Cancellation`]: ../sync/cancel/struct.Cancellation.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CancelledError {
    /// `Cancellation::cancel` was called
    #[error("operation cancelled")]
    Cancelled,

    /// The deadline of the cancellation passed
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl CancelledError {
    /// True if the cancellation fired because its deadline passed
    pub fn is_timeout(&self) -> bool {
        *self == CancelledError::DeadlineExceeded
    }
}

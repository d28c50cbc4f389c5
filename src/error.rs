//! Error types shared by the store layer and the facade.

/// Errors returned by [`crate::domain::store::KeyValueStore`] implementations
/// and by [`crate::application::services::KvService`].
///
/// A missing key is never an error: reads report absence through `Option`,
/// `false` or `0` inside `Ok`, so a caller can always tell "nothing there"
/// apart from "the store did not answer".
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or the connection dropped mid-call.
    #[error("store connection error: {0}")]
    Connection(String),

    /// The key holds a value of another type than the operation expects.
    #[error("wrong type: {0}")]
    WrongType(String),

    /// The store rejected or failed the command.
    #[error("store operation error: {0}")]
    Operation(String),

    /// A precondition on the arguments was violated; the store was not called.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl StoreError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation(message.into())
    }
}

/// Result type for store and facade operations.
pub type StoreResult<T> = Result<T, StoreError>;

use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic, ReadExecutor};

/// Error kinds for docmap operations.
///
/// Each kind describes a specific category of failure in the mapping layer,
/// enabling precise error handling by callers.
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::errors::{DocmapError, ErrorKind, DocmapResult};
///
/// fn example() -> DocmapResult<()> {
///     Err(DocmapError::new("no identity present", ErrorKind::MissingIdentity))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Lifecycle errors - raised by load/save/upsert/delete
    /// No usable filter could be formed for a load or upsert
    MissingCriteria,
    /// Delete was attempted without a known identity
    MissingIdentity,
    /// Insert was attempted with no changed fields
    EmptyInsert,
    /// The store reported an error for a safe insert
    InsertFailed,
    /// The store reported an error for a safe update
    UpdateFailed,
    /// The store reported an error for an upsert
    UpsertFailed,
    /// The store reported an error for a remove
    DeleteFailed,

    // Reference errors
    /// A reference field was assigned a non-document value
    TypeMismatch,

    // Identity errors
    /// The provided identity value is invalid
    InvalidId,

    // Registry errors
    /// No model is registered under the requested name
    ModelNotFound,

    // Validation errors - raised by document/value plumbing
    /// The operation is not valid in the current state
    InvalidOperation,
    /// Generic validation error
    ValidationError,
    /// Error encoding or decoding data
    EncodingError,

    // Generic/internal errors - used as fallback
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::MissingCriteria => write!(f, "Missing criteria"),
            ErrorKind::MissingIdentity => write!(f, "Missing identity"),
            ErrorKind::EmptyInsert => write!(f, "Empty insert"),
            ErrorKind::InsertFailed => write!(f, "Insert failed"),
            ErrorKind::UpdateFailed => write!(f, "Update failed"),
            ErrorKind::UpsertFailed => write!(f, "Upsert failed"),
            ErrorKind::DeleteFailed => write!(f, "Delete failed"),
            ErrorKind::TypeMismatch => write!(f, "Type mismatch"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::ModelNotFound => write!(f, "Model not found"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom docmap error type.
///
/// `DocmapError` encapsulates the error message, kind, and optional cause.
/// It supports error chaining and backtraces for debugging.
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::errors::{DocmapError, ErrorKind};
///
/// // Create a simple error
/// let err = DocmapError::new("no identity present", ErrorKind::MissingIdentity);
///
/// // Create an error with a cause
/// let cause = DocmapError::new("connection reset", ErrorKind::UpdateFailed);
/// let err = DocmapError::new_with_cause("save failed", ErrorKind::UpdateFailed, cause);
/// ```
///
/// # Type alias
///
/// The `DocmapResult<T>` type alias is equivalent to `Result<T, DocmapError>`
/// and is used throughout the crate for operations that can fail.
#[derive(Clone)]
pub struct DocmapError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<DocmapError>>,
    backtrace: Atomic<Backtrace>,
}

impl DocmapError {
    /// Creates a new `DocmapError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        DocmapError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `DocmapError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for
    /// debugging.
    pub fn new_with_cause(message: &str, error_type: ErrorKind, cause: DocmapError) -> Self {
        DocmapError {
            message: message.to_string(),
            error_kind: error_type,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&Box<DocmapError>> {
        self.cause.as_ref()
    }
}

impl Display for DocmapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for DocmapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => self.backtrace.read_with(|bt| write!(f, "{}\n{:?}", self.message, bt)),
        }
    }
}

impl Error for DocmapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for docmap operations.
///
/// `DocmapResult<T>` is shorthand for `Result<T, DocmapError>`.
/// All fallible docmap operations return this type.
pub type DocmapResult<T> = Result<T, DocmapError>;

// From trait implementations for automatic error conversion
impl From<serde_json::Error> for DocmapError {
    fn from(err: serde_json::Error) -> Self {
        DocmapError::new(
            &format!("JSON parsing error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<std::num::ParseIntError> for DocmapError {
    fn from(err: std::num::ParseIntError) -> Self {
        DocmapError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::ValidationError,
        )
    }
}

impl From<String> for DocmapError {
    fn from(msg: String) -> Self {
        DocmapError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for DocmapError {
    fn from(msg: &str) -> Self {
        DocmapError::new(msg, ErrorKind::InternalError)
    }
}

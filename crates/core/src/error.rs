use std::borrow::Cow;
use std::fmt::{self, Display};

use career_chat_model::{BackendError, ErrorKind as BackendErrorKind};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend could not be reached, or answered with a failure.
    TransportFailure,
    /// The requested resource does not exist.
    NotFound,
    /// The operation was refused on the client side, and never reached the
    /// network.
    ValidationRejected,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::TransportFailure => write!(f, "Transport failure"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::ValidationRejected => write!(f, "Validation rejected"),
        }
    }
}

impl From<BackendErrorKind> for ErrorKind {
    #[inline]
    fn from(kind: BackendErrorKind) -> Self {
        match kind {
            BackendErrorKind::TransportFailure => ErrorKind::TransportFailure,
            BackendErrorKind::NotFound => ErrorKind::NotFound,
        }
    }
}

/// Describes a failed operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Error {
    kind: ErrorKind,
    reason: Option<String>,
}

impl Error {
    /// Creates a new error with the `TransportFailure` kind.
    #[inline]
    pub fn transport_failure() -> Self {
        Self {
            kind: ErrorKind::TransportFailure,
            reason: None,
        }
    }

    /// Creates a new error with the `NotFound` kind.
    #[inline]
    pub fn not_found() -> Self {
        Self {
            kind: ErrorKind::NotFound,
            reason: None,
        }
    }

    /// Creates a new error with the `ValidationRejected` kind.
    #[inline]
    pub fn validation_rejected() -> Self {
        Self {
            kind: ErrorKind::ValidationRejected,
            reason: None,
        }
    }

    /// Attaches a reason to the error.
    #[inline]
    pub fn with_reason<S: Into<String>>(self, reason: S) -> Self {
        Self {
            kind: self.kind,
            reason: Some(reason.into()),
        }
    }

    /// Returns the kind of the error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the reason for the error.
    #[inline]
    pub fn reason(&self) -> Cow<'_, str> {
        match self.reason.as_deref() {
            Some(reason) => Cow::Borrowed(reason),
            None => Cow::Owned(format!("{}", self.kind)),
        }
    }

    pub(crate) fn from_backend<E: BackendError>(err: &E) -> Self {
        Self {
            kind: err.kind().into(),
            reason: Some(err.to_string()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason())
    }
}

impl std::error::Error for Error {}

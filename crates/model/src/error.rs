use std::fmt::{self, Display};

/// The kind of error that a backend may report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The network call failed, or the backend answered with a non-success
    /// status.
    TransportFailure,
    /// The requested resource does not exist.
    NotFound,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::TransportFailure => write!(f, "Transport failure"),
            ErrorKind::NotFound => write!(f, "Not found"),
        }
    }
}

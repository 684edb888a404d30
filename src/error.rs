//! Error handling for pandora-radio.
//!
//! Provides a single error type for the whole crate, categorized by
//! [`ErrorKind`] so that callers can decide how to react without matching on
//! the underlying error.
//!
//! # Error Categories
//!
//! * Authentication: login or re-authentication failed
//! * Token expiry: the remote service rejected the session token
//! * Remote: any other failure reported by the remote service
//! * Transport: connectivity failures, timeouts and cancellation
//! * Lookup misses and local precondition failures
//!
//! Only token expiry is recovered locally, by [`Client`](crate::client::Client).
//! Everything else propagates to the caller unchanged.
//!
//! # Example
//!
//! ```rust
//! use pandora_radio::error::{Error, ErrorKind, Result};
//!
//! fn find(uri: &str) -> Result<()> {
//!     Err(Error::not_found(format!("{uri} was never browsed")))
//! }
//!
//! assert_eq!(find("x").unwrap_err().kind, ErrorKind::NotFound);
//! ```

#![allow(clippy::enum_glob_use)]

use std::fmt;
use thiserror::Error;

use crate::protocol::Fault;

/// Main error type combining error kind and details.
#[derive(Debug)]
pub struct Error {
    /// Classification of the error
    pub kind: ErrorKind,

    /// Details of the underlying error
    pub error: Box<dyn std::error::Error + Send + Sync>,
}

impl Error {
    /// Attempts to downcast the underlying error to a concrete type.
    ///
    /// # Example
    /// ```
    /// use pandora_radio::{error::Error, protocol::Fault};
    ///
    /// let error = Error::from(Fault::new(1006, "Station does not exist"));
    /// assert_eq!(error.downcast::<Fault>().map(|f| f.code), Some(1006));
    /// ```
    #[must_use]
    pub fn downcast<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        self.error.downcast_ref::<E>()
    }

    /// The remote fault behind this error, if the remote service reported one.
    #[must_use]
    pub fn fault(&self) -> Option<&Fault> {
        self.downcast::<Fault>()
    }

    /// Whether this error signals an expired session token.
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        self.kind == ErrorKind::TokenExpired
    }

    /// Whether this error is a connectivity, timeout or cancellation failure.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.kind.is_transport()
    }
}

/// Standard result type for pandora-radio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories.
///
/// The transport kinds ([`Unavailable`](Self::Unavailable),
/// [`DeadlineExceeded`](Self::DeadlineExceeded) and
/// [`Cancelled`](Self::Cancelled)) are never treated as token expiry.
#[expect(clippy::module_name_repetitions)]
#[derive(Clone, Copy, Debug, Eq, Error, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorKind {
    /// Login or re-authentication failed.
    #[error("no valid authentication credentials")]
    Unauthenticated,

    /// The remote service rejected the session token.
    #[error("authorization token expired")]
    TokenExpired,

    /// The remote service reported a failure.
    #[error("remote service failure")]
    Remote,

    /// The remote service could not be reached.
    #[error("service unavailable")]
    Unavailable,

    /// The call did not complete in time.
    #[error("operation timed out")]
    DeadlineExceeded,

    /// The call was cancelled by the host.
    #[error("operation was cancelled")]
    Cancelled,

    /// A lookup did not find anything.
    #[error("not found")]
    NotFound,

    #[error("invalid argument specified")]
    InvalidArgument,

    #[error("invalid state")]
    FailedPrecondition,

    /// A response arrived but could not be read completely.
    #[error("unrecoverable data loss or corruption")]
    DataLoss,

    #[error("internal error")]
    Internal,
}

impl ErrorKind {
    /// Whether this kind is a connectivity, timeout or cancellation failure.
    #[must_use]
    pub fn is_transport(self) -> bool {
        matches!(
            self,
            Self::Unavailable | Self::DeadlineExceeded | Self::Cancelled
        )
    }
}

impl Error {
    /// Creates a new error with specified kind and details.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pandora_radio::error::{Error, ErrorKind};
    ///
    /// let err = Error::new(ErrorKind::NotFound, "station not found");
    /// assert_eq!(err.kind, ErrorKind::NotFound);
    /// ```
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self {
            kind,
            error: error.into(),
        }
    }

    /// Creates an error for failed logins.
    ///
    /// Use when:
    /// * Credentials are rejected
    /// * The login handshake cannot be completed
    /// * Re-authentication is requested before any login succeeded
    pub fn unauthenticated<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Unauthenticated, error)
    }

    /// Creates an error for a session token the remote service no longer
    /// accepts.
    pub fn token_expired<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::TokenExpired, error)
    }

    /// Creates an error for failures reported by the remote service.
    pub fn remote<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Remote, error)
    }

    /// Creates an error for unreachable services.
    ///
    /// Use for refused connections, DNS failures and the like.
    pub fn unavailable<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Unavailable, error)
    }

    /// Creates an error for operations that exceeded their deadline.
    pub fn deadline_exceeded<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::DeadlineExceeded, error)
    }

    /// Creates an error for cancelled operations.
    pub fn cancelled<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Cancelled, error)
    }

    /// Creates an error for lookup misses.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pandora_radio::error::{Error, ErrorKind};
    ///
    /// let err = Error::not_found("track was never browsed");
    /// assert_eq!(err.kind, ErrorKind::NotFound);
    /// ```
    pub fn not_found<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::NotFound, error)
    }

    pub fn invalid_argument<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::InvalidArgument, error)
    }

    /// Creates an error for operations that cannot proceed in the current
    /// state.
    pub fn failed_precondition<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::FailedPrecondition, error)
    }

    pub fn data_loss<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::DataLoss, error)
    }

    pub fn internal<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Internal, error)
    }
}

/// Returns the underlying error source.
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.source()
    }
}

/// Formats the error for display, showing both kind and details.
///
/// Format: "{kind}: {details}"
impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}: ", self.kind)?;
        self.error.fmt(fmt)
    }
}

/// Converts remote faults, singling out the expired-token signal.
impl From<Fault> for Error {
    fn from(fault: Fault) -> Self {
        if fault.is_invalid_auth_token() {
            Self::token_expired(fault)
        } else {
            Self::remote(fault)
        }
    }
}

/// Converts IO errors into appropriate error kinds.
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind::*;
        match err.kind() {
            NotFound => Self::not_found(err),
            AddrNotAvailable | ConnectionRefused | NotConnected | ConnectionReset
            | ConnectionAborted | BrokenPipe => Self::unavailable(err),
            Interrupted => Self::cancelled(err),
            TimedOut => Self::deadline_exceeded(err),
            UnexpectedEof => Self::data_loss(err),
            InvalidInput | InvalidData => Self::invalid_argument(err),
            _ => Self::internal(err),
        }
    }
}

/// Converts HTTP client errors into appropriate error kinds.
///
/// Maps HTTP errors based on their nature:
/// * Timeout errors -> `DeadlineExceeded`
/// * Connect and request errors -> `Unavailable`
/// * Body and decode errors -> `DataLoss`
/// * Builder errors -> `Internal`
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::deadline_exceeded(err);
        }

        if err.is_connect() || err.is_request() || err.is_redirect() {
            return Self::unavailable(err);
        }

        if err.is_body() || err.is_decode() {
            return Self::data_loss(err);
        }

        if err.is_builder() {
            return Self::internal(err);
        }

        if err.is_status() {
            return Self::remote(err);
        }

        Self::unavailable(err)
    }
}

/// Malformed response bodies are data loss.
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::data_loss(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::invalid_argument(e)
    }
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Self::data_loss(e)
    }
}

/// Converts header size errors to `Internal`.
impl From<http::header::MaxSizeReached> for Error {
    fn from(e: http::header::MaxSizeReached) -> Self {
        Self::internal(e.to_string())
    }
}

/// Converts invalid header errors to `Internal`.
impl From<http::header::InvalidHeaderValue> for Error {
    fn from(e: http::header::InvalidHeaderValue) -> Self {
        Self::internal(e.to_string())
    }
}

/// Converts URL parsing errors to `InvalidArgument`.
impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::invalid_argument(e.to_string())
    }
}

/// Converts integer parsing errors to `DataLoss`.
impl From<std::num::ParseIntError> for Error {
    fn from(e: std::num::ParseIntError) -> Self {
        Self::data_loss(e.to_string())
    }
}

/// Converts timeout errors to `DeadlineExceeded`.
impl From<tokio::time::error::Elapsed> for Error {
    fn from(e: tokio::time::error::Elapsed) -> Self {
        Self::deadline_exceeded(e.to_string())
    }
}

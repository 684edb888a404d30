//! Wire types for the Pandora JSON API.
//!
//! # Submodules
//!
//! * [`auth`] - Partner and user login handshake
//! * [`station`] - Station list, genre directory and station creation
//! * [`playlist`] - Playlist batches for a station
//!
//! # Envelope
//!
//! Every response is wrapped in an envelope that is either a success:
//!
//! ```json
//! { "stat": "ok", "result": { ... } }
//! ```
//!
//! or a failure:
//!
//! ```json
//! { "stat": "fail", "message": "An unexpected error occurred", "code": 1001 }
//! ```
//!
//! Failures are turned into a [`Fault`]. Known codes carry their canonical
//! message, so that code `1001` always reads `"Invalid Auth Token"` whatever
//! the server sent along.

pub mod auth;
pub mod playlist;
pub mod station;

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;

/// Defines a remote API method.
///
/// Implemented by request bodies. The method name is sent as a query
/// parameter, the body as (possibly encrypted) JSON.
pub trait Method: Serialize {
    /// The API method name in dot-notation, e.g. `"user.getStationList"`.
    const METHOD: &'static str;

    /// Whether the request body must be encrypted with the partner key.
    ///
    /// Only the partner login goes out in plain text.
    const ENCRYPTED: bool = true;

    /// The type of the `result` member of a successful response.
    type Response: for<'de> Deserialize<'de> + Debug;
}

/// Response envelope of the remote API.
#[derive(Clone, PartialEq, Eq, Deserialize, Debug)]
#[serde(tag = "stat", rename_all = "lowercase")]
pub enum Response<T> {
    /// Successful call
    Ok {
        /// Method-specific result
        result: T,
    },

    /// Failed call
    Fail {
        /// Server-provided description
        #[serde(default)]
        message: String,
        /// Numeric fault code
        code: i64,
    },
}

impl<T> Response<T> {
    /// Unwraps the envelope, converting failures into errors.
    ///
    /// # Errors
    ///
    /// Returns the [`Fault`] of a failed call, classified by
    /// [`Error::from`](crate::error::Error).
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Ok { result } => Ok(result),
            Self::Fail { message, code } => Err(Fault::new(code, message).into()),
        }
    }
}

/// A failure reported by the remote service.
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
#[error("{message} (code {code})")]
pub struct Fault {
    /// Numeric fault code
    pub code: i64,

    /// Canonical message for known codes, otherwise the server message
    pub message: String,
}

impl Fault {
    /// Message that identifies an expired or otherwise invalid session token.
    ///
    /// Matching is on this exact text. The service has no typed error
    /// taxonomy beyond the numeric codes, which [`Fault::new`] maps onto
    /// these messages.
    pub const INVALID_AUTH_TOKEN: &'static str = "Invalid Auth Token";

    /// Creates a fault, replacing the message of known codes by its canonical
    /// text.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        let message = match Self::describe(code) {
            Some(canonical) => canonical.to_owned(),
            None => message.into(),
        };

        Self { code, message }
    }

    /// Whether this fault signals an invalid or expired session token.
    #[must_use]
    pub fn is_invalid_auth_token(&self) -> bool {
        self.message == Self::INVALID_AUTH_TOKEN
    }

    /// Canonical messages of the documented fault codes.
    #[must_use]
    pub fn describe(code: i64) -> Option<&'static str> {
        let message = match code {
            0 => "Internal Error",
            1 => "Maintenance Mode",
            2 => "Missing Method",
            3 => "Missing Auth Token",
            4 => "Missing Partner ID",
            5 => "Missing User ID",
            6 => "Secure Protocol Required",
            7 => "Certificate Required",
            8 => "Parameter Type Mismatch",
            9 => "Parameter Missing",
            10 => "Parameter Value Invalid",
            11 => "API Version Not Supported",
            12 => "Pandora not available in this country",
            13 => "Insufficient Connectivity",
            14 => "Unknown method name",
            15 => "Wrong protocol",
            1000 => "Read Only Mode",
            1001 => Self::INVALID_AUTH_TOKEN,
            1002 => "Invalid Login",
            1003 => "Listener Not Authorized",
            1004 => "User Not Authorized",
            1005 => "Max Stations Reached",
            1006 => "Station Does Not Exist",
            1007 => "Complimentary Period Already In Use",
            1008 => "Call Not Allowed",
            1009 => "Device Not Found",
            1010 => "Partner Not Authorized",
            1011 => "Invalid Username",
            1012 => "Invalid Password",
            1013 => "Username Already Exists",
            1014 => "Device Already Associated to Account",
            1015 => "Upgrade, Device Model is Invalid",
            1018 => "Explicit PIN Incorrect",
            1020 => "Explicit PIN Malformed",
            1023 => "Device Model Invalid",
            1024 => "ZIP Code Invalid",
            1025 => "Birth Year Invalid",
            1026 => "Birth Year Too Young",
            1027 => "Invalid Country Code",
            1028 => "Invalid Gender",
            1034 => "Device Disabled",
            1035 => "Daily Trial Limit Reached",
            1036 => "Invalid Sponsor",
            1037 => "User Already Used Trial",
            1039 => "Playlist Exceeded",
            _ => return None,
        };

        Some(message)
    }
}

/// Parses and logs JSON responses from the remote API.
///
/// # Errors
///
/// Returns error if:
/// * Response body is not valid JSON
/// * JSON structure doesn't match type `T`
///
/// # Logging
///
/// * Success: Logs parsed structure at TRACE level
/// * Parse Error: Logs raw JSON at TRACE level if valid JSON
/// * Invalid JSON: Logs error and raw text at ERROR level
pub fn json<T>(body: &str, origin: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Debug,
{
    match serde_json::from_str(body) {
        Ok(result) => {
            trace!("{origin}: {result:#?}");
            Ok(result)
        }
        Err(e) => {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
                trace!("{origin}: {json:#?}");
            } else {
                error!("{origin}: failed parsing response ({e:?})");
                trace!("{body}");
            }
            Err(e.into())
        }
    }
}

//! Login handshake types.
//!
//! Logging in is a two-step affair:
//!
//! 1. `auth.partnerLogin` authenticates the client application (the
//!    "partner") in plain text and returns a partner token and the
//!    encrypted server time.
//! 2. `auth.userLogin` authenticates the listener, encrypted, using the
//!    partner token and the synchronized server time.
//!
//! # Wire Format
//!
//! Partner login response:
//! ```json
//! {
//!     "partnerId": "42",
//!     "partnerAuthToken": "VAzrFQTtsy3BQ3K+3iqFi0WF5HA63B1nFA",
//!     "syncTime": "9f2f0a4c6f7d1c34..."
//! }
//! ```
//!
//! User login response:
//! ```json
//! {
//!     "userId": "123456789",
//!     "userAuthToken": "XXeuJWc1ppvaQBJ1nVkRXmu0nDU+4bDMu/tb6R4cQXZx8DoeA8pwNuQA"
//! }
//! ```

use serde::{Deserialize, Serialize};
use veil::Redact;

use super::Method;

/// Partner login request.
#[derive(Clone, Eq, PartialEq, Serialize, Redact)]
#[serde(rename_all = "camelCase")]
pub struct PartnerLogin {
    pub username: String,
    #[redact]
    pub password: String,
    pub device_model: String,
    pub version: String,
    pub include_urls: bool,
}

impl PartnerLogin {
    /// API version spoken by this crate.
    pub const VERSION: &'static str = "5";
}

impl Method for PartnerLogin {
    const METHOD: &'static str = "auth.partnerLogin";
    const ENCRYPTED: bool = false;
    type Response = PartnerAuth;
}

/// Partner login result.
#[derive(Clone, Eq, PartialEq, Deserialize, Redact)]
#[serde(rename_all = "camelCase")]
pub struct PartnerAuth {
    pub partner_id: String,

    #[redact]
    pub partner_auth_token: String,

    /// Server time, Blowfish-encrypted with the partner decryption key and
    /// hex encoded.
    pub sync_time: String,
}

/// User login request.
#[derive(Clone, Eq, PartialEq, Serialize, Redact)]
#[serde(rename_all = "camelCase")]
pub struct UserLogin {
    pub login_type: String,
    pub username: String,
    #[redact]
    pub password: String,
    #[redact]
    pub partner_auth_token: String,
    pub sync_time: u64,
}

impl UserLogin {
    pub const LOGIN_TYPE: &'static str = "user";
}

impl Method for UserLogin {
    const METHOD: &'static str = "auth.userLogin";
    type Response = UserAuth;
}

/// User login result.
#[derive(Clone, Eq, PartialEq, Deserialize, Redact)]
#[serde(rename_all = "camelCase")]
pub struct UserAuth {
    pub user_id: String,

    #[redact]
    pub user_auth_token: String,
}

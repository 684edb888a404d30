//! Account and partner credentials.
//!
//! User credentials are read from a small TOML secrets file:
//!
//! ```toml
//! username = "john@example.com"
//! password = "smith"
//!
//! # Optional; defaults to the public Android partner.
//! [partner]
//! username = "android"
//! password = "..."
//! device = "android-generic"
//! encryption_key = "..."
//! decryption_key = "..."
//! ```
//!
//! Keep the secrets file private: it grants access to the account.

use std::{fs, path::Path, str::FromStr};

use serde::Deserialize;
use veil::Redact;

use crate::error::{Error, Result};

/// Listener account credentials.
#[derive(Clone, Eq, PartialEq, Hash, Deserialize, Redact)]
pub struct Credentials {
    pub username: String,

    #[redact]
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Client application ("partner") credentials and its Blowfish keys.
#[derive(Clone, Eq, PartialEq, Hash, Deserialize, Redact)]
pub struct PartnerCredentials {
    pub username: String,

    #[redact]
    pub password: String,

    pub device: String,

    /// Key that request bodies are encrypted with.
    #[redact]
    pub encryption_key: String,

    /// Key that the server time is decrypted with.
    #[redact]
    pub decryption_key: String,
}

/// The publicly documented Android partner.
impl Default for PartnerCredentials {
    fn default() -> Self {
        Self {
            username: "android".to_owned(),
            password: "AC7IBG09A3DTSYM4R41UJWL07VLN8JI7".to_owned(),
            device: "android-generic".to_owned(),
            encryption_key: "6#26FRL$ZWD".to_owned(),
            decryption_key: "R=U!LH$O2B#".to_owned(),
        }
    }
}

/// Contents of the secrets file.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct Secrets {
    #[serde(flatten)]
    pub credentials: Credentials,

    #[serde(default)]
    pub partner: PartnerCredentials,
}

impl Secrets {
    /// Secrets files are expected to be tiny.
    pub const MAX_FILE_SIZE: u64 = 1024;

    /// Loads secrets from a TOML file.
    ///
    /// # Errors
    ///
    /// Will return `Err` if:
    /// - the file cannot be read
    /// - the file is larger than [`Self::MAX_FILE_SIZE`]
    /// - the contents are not valid secrets
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Prevent out-of-memory condition: the secrets file should be small.
        let file_size = fs::metadata(path)?.len();
        if file_size > Self::MAX_FILE_SIZE {
            return Err(Error::invalid_argument(format!(
                "{} is too large ({file_size} bytes)",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        contents.parse()
    }
}

impl FromStr for Secrets {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let secrets: Self = toml::from_str(s)?;
        if secrets.credentials.username.is_empty() || secrets.credentials.password.is_empty() {
            return Err(Error::invalid_argument(
                "username and password must not be empty",
            ));
        }

        Ok(secrets)
    }
}

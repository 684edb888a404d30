use std::{num::NonZeroUsize, time::Duration};

use url::Url;

use crate::{credentials::PartnerCredentials, station::SortOrder, track::AudioQuality};

/// Settings supplied by the host at construction time.
///
/// There is no global client configuration: every component that needs a
/// setting takes a `&Config` when it is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub app_name: String,
    pub app_version: String,

    pub user_agent: String,

    /// Endpoint of the JSON API.
    pub api_url: Url,

    pub partner: PartnerCredentials,

    /// Preferred encoding when picking an audio URL.
    pub audio_quality: AudioQuality,

    /// Order in which the station list is presented.
    pub sort_order: SortOrder,

    /// Refetch cached station and genre lists older than this. `None` keeps
    /// them until explicitly invalidated.
    pub cache_ttl: Option<Duration>,

    /// Bound for the track lookup buffer. `None` is unbounded.
    pub lookup_capacity: Option<NonZeroUsize>,

    /// Abort remote calls that take longer than this.
    pub timeout: Option<Duration>,
}

impl Config {
    /// Default endpoint of the JSON API.
    pub const API_URL: &'static str = "https://tuner.pandora.com/services/json/";

    /// Creates a configuration with default settings and the public Android
    /// partner.
    ///
    /// # Panics
    ///
    /// Panics if [`Self::API_URL`] is not a valid URL.
    #[must_use]
    pub fn new() -> Self {
        let app_name = env!("CARGO_PKG_NAME").to_owned();
        let app_version = env!("CARGO_PKG_VERSION").to_owned();

        let os_name = match std::env::consts::OS {
            "macos" => "osx",
            other => other,
        };
        let os_version = sysinfo::System::os_version().unwrap_or_else(|| String::from("0"));

        // `/` and `;` would break up the product tokens.
        let sanitize = |s: &str| s.replace(['/', ';'], "-");
        let user_agent = format!(
            "{app_name}/{app_version} (Rust; {}/{})",
            sanitize(os_name),
            sanitize(&os_version)
        );
        trace!("user agent: {user_agent}");

        Self {
            app_name,
            app_version,
            user_agent,
            api_url: Url::parse(Self::API_URL).expect("invalid api url"),
            partner: PartnerCredentials::default(),
            audio_quality: AudioQuality::default(),
            sort_order: SortOrder::default(),
            cache_ttl: None,
            lookup_capacity: None,
            timeout: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

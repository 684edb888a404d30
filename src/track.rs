//! Playable items of a station playlist.
//!
//! A playlist interleaves regular songs with advertisements. The two are
//! told apart when the wire item is converted, so that consumers match on
//! [`Track`] instead of probing for missing fields.
//!
//! # Identity
//!
//! A track is identified by its station and its per-item token, rendered as
//! a [`TrackUri`]:
//!
//! ```text
//! pandora:track:{station_id}:{track_token}
//! pandora:ad:{station_id}:none:{ad_token}
//! ```
//!
//! Ad tokens are not stable across playlist fetches, which the `none`
//! marker makes explicit.

use std::{collections::BTreeMap, fmt, str::FromStr, time::Duration};

use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use url::Url;

use crate::error::{Error, Result};

/// Audio quality levels offered per track.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize)]
pub enum AudioQuality {
    #[serde(rename = "lowQuality")]
    Low,

    #[serde(rename = "mediumQuality")]
    Medium,

    #[default]
    #[serde(rename = "highQuality")]
    High,
}

impl FromStr for AudioQuality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" | "lowquality" => Ok(Self::Low),
            "medium" | "mediumquality" => Ok(Self::Medium),
            "high" | "highquality" => Ok(Self::High),
            other => Err(Error::invalid_argument(format!(
                "unknown audio quality \"{other}\""
            ))),
        }
    }
}

impl fmt::Display for AudioQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "lowQuality"),
            Self::Medium => write!(f, "mediumQuality"),
            Self::High => write!(f, "highQuality"),
        }
    }
}

/// One encoding of a track.
#[serde_as]
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioUrl {
    /// Bitrate in kbps. Sent as a string.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub bitrate: u32,

    #[serde(default)]
    pub encoding: String,

    #[serde(rename = "audioUrl")]
    pub url: Url,

    #[serde(default)]
    pub protocol: String,
}

/// Encodings of a track by quality.
pub type AudioUrls = BTreeMap<AudioQuality, AudioUrl>;

/// A regular music track.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Song {
    pub token: String,
    pub station_id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub album_art_url: Option<Url>,
    pub album_detail_url: Option<Url>,
    pub audio: AudioUrls,
    pub duration: Duration,
    /// `1` when the listener gave this song a thumbs up.
    pub rating: i64,
}

/// An advertisement interleaved into a playlist.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Advertisement {
    pub token: String,
    pub station_id: String,
    pub audio: AudioUrls,
    pub duration: Duration,
}

/// An item of a station playlist.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Track {
    Song(Song),
    Advertisement(Advertisement),
}

impl Track {
    /// Name shown for advertisements, which carry no song name.
    pub const AD_NAME: &'static str = "Advertisement";

    #[must_use]
    pub fn uri(&self) -> TrackUri {
        match self {
            Self::Song(song) => TrackUri(format!(
                "{}:track:{}:{}",
                TrackUri::SCHEME,
                song.station_id,
                song.token
            )),
            Self::Advertisement(ad) => TrackUri(format!(
                "{}:ad:{}:none:{}",
                TrackUri::SCHEME,
                ad.station_id,
                ad.token
            )),
        }
    }

    /// Song name, or [`Self::AD_NAME`] for advertisements.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Song(song) => &song.name,
            Self::Advertisement(_) => Self::AD_NAME,
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        match self {
            Self::Song(song) => &song.token,
            Self::Advertisement(ad) => &ad.token,
        }
    }

    #[must_use]
    pub fn station_id(&self) -> &str {
        match self {
            Self::Song(song) => &song.station_id,
            Self::Advertisement(ad) => &ad.station_id,
        }
    }

    #[must_use]
    pub fn is_ad(&self) -> bool {
        matches!(self, Self::Advertisement(_))
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        match self {
            Self::Song(song) => song.duration,
            Self::Advertisement(ad) => ad.duration,
        }
    }

    #[must_use]
    pub fn audio_urls(&self) -> &AudioUrls {
        match self {
            Self::Song(song) => &song.audio,
            Self::Advertisement(ad) => &ad.audio,
        }
    }

    /// The encoding closest to `quality`.
    ///
    /// Falls back to the best lower quality, then to the lowest higher one.
    #[must_use]
    pub fn audio(&self, quality: AudioQuality) -> Option<&AudioUrl> {
        let urls = self.audio_urls();
        urls.range(..=quality)
            .next_back()
            .or_else(|| urls.iter().next())
            .map(|(_, audio)| audio)
    }

    #[must_use]
    pub fn audio_url(&self, quality: AudioQuality) -> Option<&Url> {
        self.audio(quality).map(|audio| &audio.url)
    }

    #[must_use]
    pub fn bitrate(&self, quality: AudioQuality) -> Option<u32> {
        self.audio(quality).map(|audio| audio.bitrate)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Song(song) => write!(f, "{} - {}", song.artist, song.name),
            Self::Advertisement(_) => write!(f, "{}", Self::AD_NAME),
        }
    }
}

/// Identifier under which a browsed track can be looked up again.
///
/// Opaque to this crate: it is only ever produced by [`Track::uri`] and
/// compared for equality.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TrackUri(String);

impl TrackUri {
    pub const SCHEME: &'static str = "pandora";

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TrackUri {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

impl From<&str> for TrackUri {
    fn from(uri: &str) -> Self {
        Self(uri.to_owned())
    }
}

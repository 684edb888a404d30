//! Playlist batches.
//!
//! # Wire Format
//!
//! A playlist holds a handful of items. Songs:
//! ```json
//! {
//!     "trackToken": "...",
//!     "artistName": "Mock Artist Name",
//!     "albumName": "Mock Album Name",
//!     "albumArtUrl": "http://...",
//!     "audioUrlMap": {
//!         "highQuality": {
//!             "bitrate": "64",
//!             "encoding": "aacplus",
//!             "audioUrl": "http://...",
//!             "protocol": "http"
//!         }
//!     },
//!     "trackLength": 240,
//!     "songName": "Mock Track",
//!     "stationId": "0000000000000000001",
//!     "songRating": 0,
//!     "adToken": null
//! }
//! ```
//!
//! Advertisements have every music field set to `null` and carry an
//! `adToken` instead.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{formats::Flexible, serde_as, DefaultOnNull, DurationSeconds};
use url::Url;

use super::Method;
use crate::{
    error::{Error, Result},
    track::{Advertisement, AudioUrls, Song, Track},
};

/// Requests the next playlist batch of a station.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPlaylist {
    pub station_token: String,
    pub include_track_length: bool,
}

impl Method for GetPlaylist {
    const METHOD: &'static str = "station.getPlaylist";
    type Response = Playlist;
}

/// A playlist batch. A missing item list reads as empty.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Playlist {
    #[serde(default)]
    pub items: Vec<Item>,
}

/// A playlist item as sent over the wire.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default)]
    pub track_token: Option<String>,
    #[serde(default)]
    pub ad_token: Option<String>,
    #[serde(default)]
    pub station_id: Option<String>,
    #[serde(default)]
    pub song_name: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub album_art_url: Option<Url>,
    #[serde(default)]
    pub album_detail_url: Option<Url>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    pub audio_url_map: AudioUrls,
    #[serde(default)]
    #[serde_as(as = "Option<DurationSeconds<u64, Flexible>>")]
    pub track_length: Option<Duration>,
    #[serde(default)]
    pub song_rating: Option<i64>,
}

impl Item {
    /// Converts the wire item into a [`Track`] of the station with
    /// `station_id`.
    ///
    /// An item with an ad token is an [`Advertisement`]; ads carry no station
    /// id of their own. Anything else must have a track token.
    ///
    /// # Errors
    ///
    /// Returns `DataLoss` if the item has neither token.
    pub fn into_track(self, station_id: &str) -> Result<Track> {
        let duration = self.track_length.unwrap_or_default();

        if let Some(token) = self.ad_token {
            return Ok(Track::Advertisement(Advertisement {
                token,
                station_id: station_id.to_owned(),
                audio: self.audio_url_map,
                duration,
            }));
        }

        let token = self
            .track_token
            .ok_or_else(|| Error::data_loss("playlist item has neither track nor ad token"))?;

        Ok(Track::Song(Song {
            token,
            station_id: self.station_id.unwrap_or_else(|| station_id.to_owned()),
            name: self.song_name.unwrap_or_default(),
            artist: self.artist_name.unwrap_or_default(),
            album: self.album_name.unwrap_or_default(),
            album_art_url: self.album_art_url,
            album_detail_url: self.album_detail_url,
            audio: self.audio_url_map,
            duration,
            rating: self.song_rating.unwrap_or_default(),
        }))
    }
}

//! Stations and the genre directory.
//!
//! A station is identified by its `id`. Its `token` is the opaque handle
//! that playlist requests are made with.
//!
//! # Wire Format
//!
//! ```json
//! {
//!     "stationId": "0000000000000000001",
//!     "stationToken": "0000000000000000010",
//!     "stationName": "Mock Station",
//!     "isQuickMix": false,
//!     "stationDetailUrl": "https://...",
//!     "artUrl": "https://..."
//! }
//! ```

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};

/// A station from the user's station list or the genre directory.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Stable station identifier.
    ///
    /// Genre stations may come without one.
    #[serde(default)]
    #[serde(rename = "stationId")]
    pub id: String,

    /// Opaque handle used to request playlists or to seed a new station.
    #[serde(rename = "stationToken")]
    pub token: String,

    /// Display name.
    #[serde(rename = "stationName")]
    pub name: String,

    /// Whether the remote service flags this as the mix of all stations.
    #[serde(default)]
    #[serde(rename = "isQuickMix")]
    pub is_quick_mix: bool,

    #[serde(default)]
    #[serde(rename = "stationDetailUrl")]
    pub detail_url: Option<Url>,

    #[serde(default)]
    pub art_url: Option<Url>,
}

impl Station {
    /// Name the remote service gives to the mix of all stations.
    pub const SHUFFLE_STATION_NAME: &'static str = "QuickMix";

    /// Name the shuffle station is displayed with.
    pub const SHUFFLE_DISPLAY_NAME: &'static str = "Shuffle";

    /// Creates a station with just its identity and name.
    #[must_use]
    pub fn new(id: impl Into<String>, token: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token: token.into(),
            name: name.into(),
            is_quick_mix: false,
            detail_url: None,
            art_url: None,
        }
    }

    /// Whether this is the synthetic shuffle station.
    #[must_use]
    pub fn is_shuffle(&self) -> bool {
        self.is_quick_mix || self.name == Self::SHUFFLE_STATION_NAME
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// The user's stations in remote order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct StationList {
    #[serde(default)]
    pub stations: Vec<Station>,

    /// Changes whenever the station list changes.
    #[serde(default)]
    pub checksum: Option<String>,
}

/// Genre category name to its seed stations.
///
/// Categories iterate in alphabetical order.
pub type GenreDirectory = BTreeMap<String, Vec<Station>>;

/// Order in which the station list is presented.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum SortOrder {
    /// Remote order, which is by creation date.
    #[default]
    Date,

    /// Alphabetical by display name.
    Alphabetical,
}

impl SortOrder {
    /// Sorts `stations` in place. Sorting is stable.
    pub fn sort(self, stations: &mut [Station]) {
        if self == Self::Alphabetical {
            stations.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "a-z" => Ok(Self::Alphabetical),
            other => Err(Error::invalid_argument(format!(
                "unknown sort order \"{other}\", expected \"date\" or \"a-z\""
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::Alphabetical => write!(f, "a-z"),
        }
    }
}

/// Moves the first shuffle station to the front and gives it its display
/// name. The order of the other stations is kept.
#[must_use]
pub fn shuffle_first(mut stations: Vec<Station>) -> Vec<Station> {
    if let Some(position) = stations.iter().position(Station::is_shuffle) {
        let mut shuffle = stations.remove(position);
        shuffle.name = Station::SHUFFLE_DISPLAY_NAME.to_owned();
        stations.insert(0, shuffle);
    }

    stations
}

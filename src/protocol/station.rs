//! Station requests.
//!
//! # Wire Format
//!
//! Genre directory response:
//! ```json
//! {
//!     "categories": [{
//!         "categoryName": "Jazz",
//!         "stations": [{
//!             "stationId": "...",
//!             "stationToken": "G123",
//!             "stationName": "Smooth Jazz"
//!         }]
//!     }]
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::Method;
use crate::station::{GenreDirectory, Station, StationList};

/// Requests the user's station list.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStationList {
    pub include_station_art_url: bool,
}

impl Method for GetStationList {
    const METHOD: &'static str = "user.getStationList";
    type Response = StationList;
}

/// Requests the genre directory.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct GetGenreStations {}

impl Method for GetGenreStations {
    const METHOD: &'static str = "station.getGenreStations";
    type Response = GenreCategories;
}

/// Genre directory as sent over the wire.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct GenreCategories {
    #[serde(default)]
    pub categories: Vec<GenreCategory>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreCategory {
    pub category_name: String,
    #[serde(default)]
    pub stations: Vec<Station>,
}

impl From<GenreCategories> for GenreDirectory {
    fn from(wire: GenreCategories) -> Self {
        let mut directory = GenreDirectory::new();
        for category in wire.categories {
            directory
                .entry(category.category_name)
                .or_default()
                .extend(category.stations);
        }

        directory
    }
}

/// Creates a user station from a seed, such as a genre station token.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStation {
    pub music_token: String,
}

impl Method for CreateStation {
    const METHOD: &'static str = "station.createStation";
    type Response = Station;
}

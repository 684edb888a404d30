//! Logical remote operations.
//!
//! [`Remote`] is the seam between the session and data-access layer and
//! whatever speaks to the service. [`Gateway`](crate::gateway::Gateway) is
//! the HTTP implementation; tests substitute their own.
//!
//! Every operation but [`Remote::login`] and [`Remote::probe`] takes the
//! current [`Session`] as read-only context. Implementations report an
//! expired session token as an error of kind
//! [`TokenExpired`](crate::error::ErrorKind::TokenExpired) and must not
//! retry on their own.

use async_trait::async_trait;
use http::StatusCode;
use url::Url;

use crate::{
    credentials::{Credentials, PartnerCredentials},
    error::Result,
    session::Session,
    station::{GenreDirectory, Station, StationList},
    track::Track,
};

#[async_trait]
pub trait Remote: Send + Sync {
    /// Performs the login handshake and returns a complete session.
    async fn login(&self, partner: &PartnerCredentials, user: &Credentials) -> Result<Session>;

    async fn station_list(&self, session: &Session) -> Result<StationList>;

    async fn genre_stations(&self, session: &Session) -> Result<GenreDirectory>;

    /// Creates a user station from a seed token, such as a genre station's.
    async fn create_station(&self, session: &Session, search_token: &str) -> Result<Station>;

    /// Fetches the next playlist batch of `station`.
    ///
    /// An empty batch means the station has nothing more to play.
    async fn playlist(&self, session: &Session, station: &Station) -> Result<Vec<Track>>;

    /// Requests only the headers of `url` and returns the status.
    async fn probe(&self, url: &Url) -> Result<StatusCode>;
}

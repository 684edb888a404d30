//! Endless track sequence of a station.
//!
//! The remote service hands out a station's playlist in small batches.
//! [`StationTracks`] refills from it whenever its queue runs dry, so that
//! the station plays on for as long as the service keeps sending tracks.
//! Tracks come out in the order they were fetched; advertisements are
//! yielded like any other track.
//!
//! An empty batch ends the station for good. A failed refill does not: it
//! is reported, and the next call fetches again.

use std::{collections::VecDeque, sync::Arc};

use futures_util::stream::{self, Stream};

use crate::{
    client::Client,
    error::Result,
    remote::Remote,
    station::Station,
    track::Track,
};

/// Cursor over the tracks of one station.
///
/// Bound to a single station for its whole life. To play another station,
/// drop it and create a new one.
pub struct StationTracks<R> {
    client: Arc<Client<R>>,
    station: Station,
    queue: VecDeque<Track>,
    exhausted: bool,
}

impl<R: Remote> StationTracks<R> {
    #[must_use]
    pub fn new(client: Arc<Client<R>>, station: Station) -> Self {
        Self {
            client,
            station,
            queue: VecDeque::new(),
            exhausted: false,
        }
    }

    #[must_use]
    pub fn station(&self) -> &Station {
        &self.station
    }

    /// Whether the station ran out of tracks. Queued tracks may remain.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// The next track, or `None` once the station has no more to play.
    ///
    /// # Errors
    ///
    /// Returns the failure of a refill. The cursor stays usable: the next
    /// call tries to refill again.
    pub async fn next(&mut self) -> Result<Option<Track>> {
        if let Some(track) = self.queue.pop_front() {
            return Ok(Some(track));
        }

        if self.exhausted {
            return Ok(None);
        }

        let batch = self.client.playlist(&self.station).await?;
        if batch.is_empty() {
            info!("{}: end of station", self.station);
            self.exhausted = true;
            return Ok(None);
        }

        debug!("{}: refilled with {} tracks", self.station, batch.len());
        self.queue.extend(batch);
        Ok(self.queue.pop_front())
    }

    /// Turns the cursor into a stream that ends with the station.
    ///
    /// Refill failures are yielded as errors; polling on retries the refill.
    pub fn into_stream(self) -> impl Stream<Item = Result<Track>> {
        stream::unfold(self, |mut tracks| async move {
            match tracks.next().await {
                Ok(Some(track)) => Some((Ok(track), tracks)),
                Ok(None) => None,
                Err(e) => Some((Err(e), tracks)),
            }
        })
    }
}

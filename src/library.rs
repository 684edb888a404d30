//! Browse and lookup entry point for the host.
//!
//! A [`Library`] ties the pieces together: stations come from the
//! [`Directory`], tracks from a [`StationTracks`] cursor bound to the station
//! being browsed, and every track handed out is recorded in the
//! [`LookupBuffer`] so that it can be resolved by URI later on.

use std::sync::Arc;

use crate::{
    buffer::LookupBuffer,
    client::Client,
    config::Config,
    credentials::Credentials,
    directory::Directory,
    error::Result,
    playlist::StationTracks,
    remote::Remote,
    station::{SortOrder, Station},
    track::{Track, TrackUri},
};

pub struct Library<R> {
    client: Arc<Client<R>>,
    directory: Arc<Directory<R>>,
    buffer: LookupBuffer,
    sort_order: SortOrder,

    /// Cursor of the station browsed last.
    tracks: tokio::sync::Mutex<Option<StationTracks<R>>>,
}

impl<R: Remote + 'static> Library<R> {
    #[must_use]
    pub fn new(config: &Config, remote: Arc<R>) -> Self {
        let client = Arc::new(Client::new(config, remote));
        let directory = Arc::new(Directory::new(config, Arc::clone(&client)));
        let buffer = match config.lookup_capacity {
            Some(capacity) => LookupBuffer::with_capacity(capacity),
            None => LookupBuffer::new(),
        };

        Self {
            client,
            directory,
            buffer,
            sort_order: config.sort_order,
            tracks: tokio::sync::Mutex::new(None),
        }
    }

    #[must_use]
    pub fn client(&self) -> &Arc<Client<R>> {
        &self.client
    }

    #[must_use]
    pub fn directory(&self) -> &Arc<Directory<R>> {
        &self.directory
    }

    /// # Errors
    ///
    /// As [`Client::login`].
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.client.login(credentials).await.map(|_| ())
    }

    /// Stations in the configured order, shuffle station first.
    ///
    /// Warms the genre cache in the background on the way.
    ///
    /// # Errors
    ///
    /// As [`Directory::list_stations`].
    pub async fn stations(&self) -> Result<Vec<Station>> {
        drop(self.directory.prefetch_genres());
        self.directory.list_stations(self.sort_order).await
    }

    /// # Errors
    ///
    /// As [`Directory::genre_categories`].
    pub async fn genre_categories(&self) -> Result<Vec<String>> {
        self.directory.genre_categories().await
    }

    /// # Errors
    ///
    /// As [`Directory::genre_stations`].
    pub async fn genre_stations(&self, category: &str) -> Result<Vec<Station>> {
        self.directory.genre_stations(category).await
    }

    /// The next track of the station with `station_id`.
    ///
    /// Continues the current cursor if it is bound to that station and
    /// starts a new one otherwise. Returns `None` at the end of the station.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown station, or the remote failure.
    pub async fn next_track(&self, station_id: &str) -> Result<Option<Track>> {
        let mut tracks = self.tracks.lock().await;

        let bound = tracks
            .as_ref()
            .is_some_and(|cursor| cursor.station().id == station_id);
        if !bound {
            let station = self.directory.station(station_id).await?;
            info!("switching to station {station}");
            *tracks = Some(StationTracks::new(Arc::clone(&self.client), station));
        }

        match tracks.as_mut() {
            Some(cursor) => self.advance(cursor).await,
            None => Ok(None),
        }
    }

    /// Creates a station from a genre seed and starts playing it.
    ///
    /// # Errors
    ///
    /// Returns the remote failure.
    pub async fn next_track_for_genre(&self, genre_token: &str) -> Result<Option<Track>> {
        let mut tracks = self.tracks.lock().await;

        let station = self.directory.create_station(genre_token).await?;
        info!("switching to station {station}");

        let cursor = tracks.insert(StationTracks::new(Arc::clone(&self.client), station));
        self.advance(cursor).await
    }

    /// A track handed out before, by its URI.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such track was handed out, or it has been
    /// evicted since.
    pub fn lookup(&self, uri: &TrackUri) -> Result<Track> {
        self.buffer.lookup(uri)
    }

    #[must_use]
    pub fn buffer(&self) -> &LookupBuffer {
        &self.buffer
    }

    async fn advance(&self, cursor: &mut StationTracks<R>) -> Result<Option<Track>> {
        let track = cursor.next().await?;
        if let Some(ref track) = track {
            let uri = self.buffer.record(track.clone());
            debug!("next track: {uri}");
        }
        Ok(track)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::atomic::Ordering, time::Duration};

    use super::*;
    use crate::{error::ErrorKind, testing::FakeRemote};

    async fn library(remote: &Arc<FakeRemote>) -> Library<FakeRemote> {
        let library = Library::new(&Config::default(), Arc::clone(remote));
        library.login(&FakeRemote::credentials()).await.unwrap();
        library
    }

    #[tokio::test]
    async fn browsed_tracks_can_be_looked_up() {
        let remote = Arc::new(FakeRemote::with_batches([vec![
            FakeRemote::song("1", "a"),
            FakeRemote::ad("1", "b"),
        ]]));
        let library = library(&remote).await;

        let song = library.next_track("1").await.unwrap().unwrap();
        let ad = library.next_track("1").await.unwrap().unwrap();

        assert_eq!(library.lookup(&song.uri()).unwrap(), song);
        assert_eq!(library.lookup(&ad.uri()).unwrap(), ad);
        assert_eq!(remote.playlists.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn switching_station_discards_cursor() {
        let remote = Arc::new(FakeRemote::with_batches([
            vec![FakeRemote::song("1", "a"), FakeRemote::song("1", "b")],
            vec![FakeRemote::song("2", "c")],
        ]));
        let library = library(&remote).await;

        assert_eq!(library.next_track("1").await.unwrap().unwrap().token(), "a");
        assert_eq!(library.next_track("2").await.unwrap().unwrap().token(), "c");
        assert_eq!(remote.playlists.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_station_is_not_found() {
        let remote = Arc::new(FakeRemote::default());
        let library = library(&remote).await;

        let error = library.next_track("404").await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::NotFound);

        let error = library
            .lookup(&TrackUri::from("pandora:track:404:x"))
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn genre_seed_creates_station_and_plays_it() {
        let remote = Arc::new(FakeRemote::with_batches([vec![FakeRemote::song(
            "created-3",
            "a",
        )]]));
        let library = library(&remote).await;
        library.stations().await.unwrap();

        let track = library.next_track_for_genre("G100").await.unwrap().unwrap();
        assert_eq!(track.token(), "a");

        let stations = library.stations().await.unwrap();
        assert!(stations.iter().any(|station| station.id == "created-3"));
        assert_eq!(remote.creates.load(Ordering::SeqCst), 1);
        assert_eq!(remote.station_lists.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_session_is_renewed_mid_station() {
        let remote = Arc::new(FakeRemote::with_batches([
            vec![FakeRemote::song("1", "a")],
            vec![FakeRemote::song("1", "b")],
        ]));
        let library = library(&remote).await;

        library.next_track("1").await.unwrap();
        remote.expired.store(1, Ordering::SeqCst);
        let track = library.next_track("1").await.unwrap().unwrap();

        assert_eq!(track.token(), "b");
        assert_eq!(remote.logins.load(Ordering::SeqCst), 2);
        assert_eq!(remote.playlists.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn station_list_does_not_wait_for_genre_prefetch() {
        let remote = Arc::new(FakeRemote::default());
        *remote.genre_delay.lock().unwrap() = Some(Duration::from_secs(5));
        let library = library(&remote).await;

        let stations = tokio::time::timeout(Duration::from_secs(1), library.stations())
            .await
            .expect("station list waited for the genre directory")
            .unwrap();
        assert_eq!(stations.len(), 2);

        // The prefetch is under way in the background.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(remote.genre_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(remote.station_lists.load(Ordering::SeqCst), 1);
    }
}

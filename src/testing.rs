//! In-memory [`Remote`] for unit tests.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use http::StatusCode;
use url::Url;

use crate::{
    credentials::{Credentials, PartnerCredentials},
    error::{Error, Result},
    protocol::Fault,
    remote::Remote,
    session::Session,
    station::{GenreDirectory, Station, StationList},
    track::{Advertisement, AudioQuality, AudioUrl, AudioUrls, Song, Track},
};

/// Scripted remote service that counts every call.
pub struct FakeRemote {
    pub logins: AtomicUsize,
    pub station_lists: AtomicUsize,
    pub genre_fetches: AtomicUsize,
    pub creates: AtomicUsize,
    pub playlists: AtomicUsize,
    pub probes: AtomicUsize,

    /// Number of upcoming logins to reject.
    pub fail_logins: AtomicUsize,

    /// Number of upcoming session calls to reject as token expired.
    pub expired: AtomicUsize,

    /// Fail every call as unreachable.
    pub unreachable: AtomicBool,

    /// Stall every session call for this long.
    pub delay: Mutex<Option<Duration>>,

    /// Stall only genre directory fetches for this long.
    pub genre_delay: Mutex<Option<Duration>>,

    pub stations: Mutex<Vec<Station>>,
    pub genres: Mutex<GenreDirectory>,

    /// Playlist batches handed out in order; empty once drained.
    pub batches: Mutex<VecDeque<Vec<Track>>>,

    pub probe_status: Mutex<StatusCode>,
    pub probed: Mutex<Vec<Url>>,

    /// User tokens of the sessions playlist calls were made with.
    pub tokens_seen: Mutex<Vec<String>>,
}

impl Default for FakeRemote {
    fn default() -> Self {
        let mut genres = GenreDirectory::new();
        genres.insert(
            "Jazz".to_owned(),
            vec![Station::new("", "G100", "Bebop"), Station::new("", "G101", "Swing")],
        );
        genres.insert("Rock".to_owned(), vec![Station::new("", "G200", "Classic Rock")]);

        Self {
            logins: AtomicUsize::new(0),
            station_lists: AtomicUsize::new(0),
            genre_fetches: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            playlists: AtomicUsize::new(0),
            probes: AtomicUsize::new(0),
            fail_logins: AtomicUsize::new(0),
            expired: AtomicUsize::new(0),
            unreachable: AtomicBool::new(false),
            delay: Mutex::new(None),
            genre_delay: Mutex::new(None),
            stations: Mutex::new(vec![
                Self::station("1", "Jazz"),
                Self::station("2", "Blues"),
            ]),
            genres: Mutex::new(genres),
            batches: Mutex::new(VecDeque::new()),
            probe_status: Mutex::new(StatusCode::OK),
            probed: Mutex::new(Vec::new()),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }
}

impl FakeRemote {
    pub fn with_batches<I>(batches: I) -> Self
    where
        I: IntoIterator<Item = Vec<Track>>,
    {
        let remote = Self::default();
        remote.batches.lock().unwrap().extend(batches);
        remote
    }

    pub fn credentials() -> Credentials {
        Credentials::new("john", "smith")
    }

    pub fn station(id: &str, name: &str) -> Station {
        Station::new(id, format!("token-{id}"), name)
    }

    pub fn song(station_id: &str, token: &str) -> Track {
        Track::Song(Song {
            token: token.to_owned(),
            station_id: station_id.to_owned(),
            name: format!("Song {token}"),
            artist: "Artist".to_owned(),
            album: "Album".to_owned(),
            album_art_url: None,
            album_detail_url: None,
            audio: Self::audio(token),
            duration: Duration::from_secs(180),
            rating: 0,
        })
    }

    pub fn ad(station_id: &str, token: &str) -> Track {
        Track::Advertisement(Advertisement {
            token: token.to_owned(),
            station_id: station_id.to_owned(),
            audio: Self::audio(token),
            duration: Duration::from_secs(30),
        })
    }

    fn audio(token: &str) -> AudioUrls {
        let mut audio = AudioUrls::new();
        for (quality, bitrate) in [(AudioQuality::Low, 32), (AudioQuality::High, 64)] {
            let url = Url::parse(&format!("http://audio.test/{token}/{bitrate}.mp4")).unwrap();
            audio.insert(
                quality,
                AudioUrl {
                    bitrate,
                    encoding: "aacplus".to_owned(),
                    url,
                    protocol: "http".to_owned(),
                },
            );
        }
        audio
    }

    /// Counts a session call and applies the scripted failures.
    async fn session_call(&self, counter: &AtomicUsize) -> Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::unavailable("connection refused"));
        }

        if take(&self.expired) {
            return Err(Fault::new(1001, "Invalid Auth Token").into());
        }

        Ok(())
    }
}

/// Decrements `counter` unless it is zero; returns whether it did.
fn take(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl Remote for FakeRemote {
    async fn login(&self, _partner: &PartnerCredentials, user: &Credentials) -> Result<Session> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::unavailable("connection refused"));
        }

        if take(&self.fail_logins) {
            return Err(Fault::new(1002, "Wrong user credentials").into());
        }

        let n = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Session {
            partner_id: "42".to_owned(),
            partner_token: format!("partner-token-{n}"),
            user_id: user.username.clone(),
            user_token: format!("user-token-{n}"),
            sync_offset: 0,
            start_time: SystemTime::now(),
        })
    }

    async fn station_list(&self, _session: &Session) -> Result<StationList> {
        self.session_call(&self.station_lists).await?;
        Ok(StationList {
            stations: self.stations.lock().unwrap().clone(),
            checksum: None,
        })
    }

    async fn genre_stations(&self, _session: &Session) -> Result<GenreDirectory> {
        self.session_call(&self.genre_fetches).await?;

        let delay = *self.genre_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(self.genres.lock().unwrap().clone())
    }

    async fn create_station(&self, _session: &Session, search_token: &str) -> Result<Station> {
        self.session_call(&self.creates).await?;

        let mut stations = self.stations.lock().unwrap();
        let id = format!("created-{}", stations.len() + 1);
        let station = Station::new(id, format!("token-{search_token}"), search_token);
        stations.push(station.clone());
        Ok(station)
    }

    async fn playlist(&self, session: &Session, _station: &Station) -> Result<Vec<Track>> {
        self.tokens_seen
            .lock()
            .unwrap()
            .push(session.user_token.clone());
        self.session_call(&self.playlists).await?;
        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn probe(&self, url: &Url) -> Result<StatusCode> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.probed.lock().unwrap().push(url.clone());
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::unavailable("connection refused"));
        }
        Ok(*self.probe_status.lock().unwrap())
    }
}

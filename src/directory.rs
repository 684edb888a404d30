//! Cached station list and genre directory.
//!
//! Both lists are fetched on first use and reused until invalidated or, if a
//! cache lifetime is configured, until they grow older than it. The two
//! caches are independent: creating a station drops the station list only.
//!
//! A failed fetch leaves the cache as it was. A fetch that raced with an
//! invalidation is returned to its caller but not stored.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use tokio::task::JoinHandle;

use crate::{
    client::Client,
    config::Config,
    error::{Error, Result},
    remote::Remote,
    station::{self, GenreDirectory, SortOrder, Station, StationList},
};

struct Cached<T> {
    value: T,
    fetched_at: Instant,
}

/// A cache slot. `generation` is bumped on every invalidation.
struct Slot<T> {
    cached: Option<Cached<T>>,
    generation: u64,
}

impl<T: Clone> Slot<T> {
    const fn new() -> Self {
        Self {
            cached: None,
            generation: 0,
        }
    }

    fn get(&self, ttl: Option<Duration>) -> Option<T> {
        let cached = self.cached.as_ref()?;
        match ttl {
            Some(ttl) if cached.fetched_at.elapsed() >= ttl => None,
            _ => Some(cached.value.clone()),
        }
    }

    fn store(&mut self, generation: u64, value: T) {
        if generation == self.generation {
            self.cached = Some(Cached {
                value,
                fetched_at: Instant::now(),
            });
        }
    }

    fn invalidate(&mut self) {
        self.cached = None;
        self.generation = self.generation.wrapping_add(1);
    }
}

pub struct Directory<R> {
    client: Arc<Client<R>>,
    ttl: Option<Duration>,
    stations: Mutex<Slot<StationList>>,
    genres: Mutex<Slot<GenreDirectory>>,
}

impl<R: Remote> Directory<R> {
    #[must_use]
    pub fn new(config: &Config, client: Arc<Client<R>>) -> Self {
        Self {
            client,
            ttl: config.cache_ttl,
            stations: Mutex::new(Slot::new()),
            genres: Mutex::new(Slot::new()),
        }
    }

    /// The user's station list in remote order.
    ///
    /// # Errors
    ///
    /// Returns the remote failure if the list is not cached and cannot be
    /// fetched.
    pub async fn station_list(&self) -> Result<StationList> {
        let (cached, generation) = self.lookup(&self.stations);
        if let Some(list) = cached {
            debug!("station list: cached ({} stations)", list.stations.len());
            return Ok(list);
        }

        debug!("station list: fetching");
        let list = self.client.station_list().await?;
        lock(&self.stations).store(generation, list.clone());

        Ok(list)
    }

    /// Stations in `order`, with the shuffle station moved to the front and
    /// renamed for display.
    ///
    /// # Errors
    ///
    /// As [`station_list`](Self::station_list).
    pub async fn list_stations(&self, order: SortOrder) -> Result<Vec<Station>> {
        let mut stations = self.station_list().await?.stations;
        order.sort(&mut stations);
        Ok(station::shuffle_first(stations))
    }

    /// A station of the user's list by id, under its remote name.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no such station, or the remote
    /// failure if the list cannot be fetched.
    pub async fn station(&self, id: &str) -> Result<Station> {
        self.station_list()
            .await?
            .stations
            .into_iter()
            .find(|station| station.id == id)
            .ok_or_else(|| Error::not_found(format!("station {id} not found")))
    }

    /// # Errors
    ///
    /// Returns the remote failure if the directory is not cached and cannot
    /// be fetched.
    pub async fn genre_directory(&self) -> Result<GenreDirectory> {
        let (cached, generation) = self.lookup(&self.genres);
        if let Some(genres) = cached {
            debug!("genre directory: cached ({} categories)", genres.len());
            return Ok(genres);
        }

        debug!("genre directory: fetching");
        let genres = self.client.genre_stations().await?;
        lock(&self.genres).store(generation, genres.clone());

        Ok(genres)
    }

    /// Genre category names in alphabetical order.
    ///
    /// # Errors
    ///
    /// As [`genre_directory`](Self::genre_directory).
    pub async fn genre_categories(&self) -> Result<Vec<String>> {
        Ok(self.genre_directory().await?.into_keys().collect())
    }

    /// Seed stations of a genre category.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown category, otherwise as
    /// [`genre_directory`](Self::genre_directory).
    pub async fn genre_stations(&self, category: &str) -> Result<Vec<Station>> {
        self.genre_directory()
            .await?
            .remove(category)
            .ok_or_else(|| Error::not_found(format!("genre category {category} not found")))
    }

    /// A seed station of `category` by its token.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category or the station does not exist.
    pub async fn genre_station(&self, category: &str, token: &str) -> Result<Station> {
        self.genre_stations(category)
            .await?
            .into_iter()
            .find(|station| station.token == token)
            .ok_or_else(|| Error::not_found(format!("genre station {token} not found")))
    }

    /// Creates a user station from a genre seed and drops the cached station
    /// list so that the next read includes it.
    ///
    /// # Errors
    ///
    /// Returns the remote failure; the caches are left as they were.
    pub async fn create_station(&self, genre_token: &str) -> Result<Station> {
        let station = self.client.create_station(genre_token).await?;
        info!("created station {station}");

        self.invalidate_stations();
        Ok(station)
    }

    pub fn invalidate_stations(&self) {
        debug!("station list: invalidated");
        lock(&self.stations).invalidate();
    }

    fn lookup<T: Clone>(&self, slot: &Mutex<Slot<T>>) -> (Option<T>, u64) {
        let slot = lock(slot);
        (slot.get(self.ttl), slot.generation)
    }
}

impl<R: Remote + 'static> Directory<R> {
    /// Warms the genre cache in the background.
    ///
    /// Nobody waits on the result: a reader that arrives before it finishes
    /// fetches on its own, and a failure is only logged.
    pub fn prefetch_genres(self: &Arc<Self>) -> JoinHandle<()> {
        let directory = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = directory.genre_directory().await {
                warn!("prefetching genre directory failed: {e}");
            }
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

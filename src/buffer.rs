//! Metadata of browsed tracks, by URI.
//!
//! Tracks are recorded as they are handed out so that a later lookup by URI
//! can resolve them without another remote call. Recording a URI again
//! replaces the track but keeps its original position. The buffer is not an
//! LRU: lookups do not reorder anything.

use std::{
    num::NonZeroUsize,
    sync::{Mutex, MutexGuard, PoisonError},
};

use indexmap::IndexMap;

use crate::{
    error::{Error, Result},
    track::{Track, TrackUri},
};

#[derive(Debug, Default)]
pub struct LookupBuffer {
    entries: Mutex<IndexMap<TrackUri, Track>>,

    /// Evict the oldest entry beyond this many. Unbounded if `None`.
    capacity: Option<NonZeroUsize>,
}

impl LookupBuffer {
    /// Creates an unbounded buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer that holds at most `capacity` tracks.
    #[must_use]
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(IndexMap::with_capacity(capacity.get())),
            capacity: Some(capacity),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    /// Records `track` under its URI and returns the URI.
    pub fn record(&self, track: Track) -> TrackUri {
        let uri = track.uri();
        let mut entries = self.entries();

        entries.insert(uri.clone(), track);
        if let Some(capacity) = self.capacity {
            while entries.len() > capacity.get() {
                if let Some((evicted, _)) = entries.shift_remove_index(0) {
                    trace!("evicted {evicted}");
                }
            }
        }

        uri
    }

    /// The track last recorded under `uri`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no track was recorded under `uri`, or it was
    /// evicted since.
    pub fn lookup(&self, uri: &TrackUri) -> Result<Track> {
        self.entries()
            .get(uri)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{uri} not found")))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    fn entries(&self) -> MutexGuard<'_, IndexMap<TrackUri, Track>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

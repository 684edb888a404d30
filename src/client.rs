//! Remote calls that survive an expired session.
//!
//! [`Client`] wraps every [`Remote`] operation. When the remote service
//! rejects the session token, the client re-authenticates once and retries
//! the operation once. Every other failure, including a second token
//! rejection, is returned to the caller as it is.
//!
//! ```text
//! Calling ─┬─ ok ──────────────────────────────────────── Success
//!          ├─ token expired ─ Reauthenticating ─ Retrying ─┬─ Success
//!          │                                               └─ Failure
//!          └─ other failure ───────────────────────────── Failure
//! ```
//!
//! A re-authentication that failed on connectivity leaves no session behind.
//! The next call then logs in again with the stored credentials, which counts
//! as its one re-authentication.
//!
//! Every attempt is bounded by the configured timeout and aborted when the
//! client's [`CancellationToken`] fires. Both surface as transport failures
//! and are never retried here.

use std::{future::Future, sync::Arc, time::Duration};

use http::StatusCode;
use tokio_util::sync::CancellationToken;

use crate::{
    auth::Authenticator,
    config::Config,
    credentials::Credentials,
    error::{Error, Result},
    remote::Remote,
    session::Session,
    station::{GenreDirectory, Station, StationList},
    track::{AudioQuality, Track},
};

pub struct Client<R> {
    remote: Arc<R>,
    auth: Authenticator<R>,
    timeout: Option<Duration>,
    cancel: CancellationToken,

    /// Audio quality that playability checks probe.
    quality: AudioQuality,
}

impl<R: Remote> Client<R> {
    #[must_use]
    pub fn new(config: &Config, remote: Arc<R>) -> Self {
        Self {
            auth: Authenticator::new(Arc::clone(&remote), config.partner.clone()),
            remote,
            timeout: config.timeout,
            cancel: CancellationToken::new(),
            quality: config.audio_quality,
        }
    }

    #[must_use]
    pub fn authenticator(&self) -> &Authenticator<R> {
        &self.auth
    }

    /// Token that aborts all calls in flight and all later calls once
    /// cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Logs in, bounded by the timeout and cancellation like any call.
    ///
    /// # Errors
    ///
    /// As [`Authenticator::login`], or a transport failure on timeout or
    /// cancellation.
    pub async fn login(&self, credentials: &Credentials) -> Result<Arc<Session>> {
        self.attempt("login", self.auth.login(credentials)).await
    }

    /// Calls a remote operation with the current session, re-authenticating
    /// and retrying once if the session token was rejected.
    ///
    /// `operation` names the call in log messages.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` if never logged in or if re-authentication
    /// is rejected. Connectivity failures while re-authenticating are
    /// returned as they are and the next call tries again. Any other failure
    /// of the operation is returned unchanged; a token rejection of the retry
    /// comes back as `TokenExpired`.
    pub async fn call<T, F, Fut>(&self, operation: &str, f: F) -> Result<T>
    where
        F: Fn(Arc<R>, Arc<Session>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let (session, renewed) = match self.auth.current() {
            Some(session) => (session, false),
            None => self.attempt(operation, self.auth.resume()).await?,
        };

        match self
            .attempt(operation, f(Arc::clone(&self.remote), Arc::clone(&session)))
            .await
        {
            Err(e) if e.is_token_expired() && !renewed => {
                warn!("{operation}: {e}");
                let session = self.attempt(operation, self.auth.refresh(&session)).await?;

                debug!("{operation}: retrying with renewed session");
                self.attempt(operation, f(Arc::clone(&self.remote), session))
                    .await
            }
            result => result,
        }
    }

    /// # Errors
    ///
    /// As [`call`](Self::call).
    pub async fn station_list(&self) -> Result<StationList> {
        self.call("getStationList", |remote, session| async move {
            remote.station_list(&session).await
        })
        .await
    }

    /// # Errors
    ///
    /// As [`call`](Self::call).
    pub async fn genre_stations(&self) -> Result<GenreDirectory> {
        self.call("getGenreStations", |remote, session| async move {
            remote.genre_stations(&session).await
        })
        .await
    }

    /// # Errors
    ///
    /// As [`call`](Self::call).
    pub async fn create_station(&self, search_token: &str) -> Result<Station> {
        self.call("createStation", |remote, session| async move {
            remote.create_station(&session, search_token).await
        })
        .await
    }

    /// # Errors
    ///
    /// As [`call`](Self::call).
    pub async fn playlist(&self, station: &Station) -> Result<Vec<Track>> {
        self.call("getPlaylist", |remote, session| async move {
            remote.playlist(&session, station).await
        })
        .await
    }

    /// Whether the audio of `track` at the configured quality (or the
    /// closest available) answers with `200 OK`.
    ///
    /// Advisory only: any other status and any failure read as not playable.
    pub async fn check_playable(&self, track: &Track) -> bool {
        let Some(url) = track.audio_url(self.quality) else {
            debug!("{track}: no audio url");
            return false;
        };

        match self.attempt("probe", self.remote.probe(url)).await {
            Ok(StatusCode::OK) => true,
            Ok(status) => {
                debug!("{track}: audio url answered {status}");
                false
            }
            Err(e) => {
                debug!("{track}: audio url unreachable: {e}");
                false
            }
        }
    }

    /// Runs a single attempt under the timeout and cancellation token.
    async fn attempt<T>(
        &self,
        operation: &str,
        future: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let bounded = async {
            match self.timeout {
                Some(timeout) => tokio::time::timeout(timeout, future)
                    .await
                    .unwrap_or_else(|elapsed| Err(Error::from(elapsed))),
                None => future.await,
            }
        };

        tokio::select! {
            biased;

            () = self.cancel.cancelled() => {
                Err(Error::cancelled(format!("{operation} cancelled")))
            }

            result = bounded => result,
        }
    }
}

//! Login and re-authentication.
//!
//! The [`Authenticator`] owns the [`Session`]. Other components only ever
//! get a shared snapshot of it, so they observe either a complete session or
//! none at all.
//!
//! # Re-authentication
//!
//! Session tokens expire while a long-running process is idle. The
//! authenticator keeps the credentials of the last successful login and can
//! log in again with them:
//!
//! 1. Clear the whole session, including its clock synchronization
//! 2. Log in with the stored credentials
//! 3. Publish the new session
//!
//! If step 2 fails the session stays cleared, but the credentials are kept:
//! [`Authenticator::resume`] logs in with them on the next use.
//!
//! Logins are serialized. A caller that needs a session while a login is in
//! progress waits for it to finish.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::{
    credentials::{Credentials, PartnerCredentials},
    error::{Error, Result},
    remote::Remote,
    session::Session,
};

pub struct Authenticator<R> {
    remote: Arc<R>,
    partner: PartnerCredentials,

    /// Credentials of the last successful login.
    credentials: Mutex<Option<Credentials>>,

    /// Never mutated in place: replaced or cleared as a whole.
    session: RwLock<Option<Arc<Session>>>,

    /// Held for the duration of every login.
    login_lock: tokio::sync::Mutex<()>,
}

impl<R: Remote> Authenticator<R> {
    #[must_use]
    pub fn new(remote: Arc<R>, partner: PartnerCredentials) -> Self {
        Self {
            remote,
            partner,
            credentials: Mutex::new(None),
            session: RwLock::new(None),
            login_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Logs in and stores `credentials` for later re-authentication.
    ///
    /// On failure the current session is left as it was.
    ///
    /// # Errors
    ///
    /// Connectivity failures are returned as they are, so that the caller can
    /// back off and try again. Any other failure is returned as
    /// `Unauthenticated`.
    pub async fn login(&self, credentials: &Credentials) -> Result<Arc<Session>> {
        let _guard = self.login_lock.lock().await;
        self.login_locked(credentials).await
    }

    /// Discards the current session and logs in again with the credentials
    /// of the last successful login.
    ///
    /// # Errors
    ///
    /// Returns `FailedPrecondition` if no login ever succeeded, otherwise as
    /// [`login`](Self::login).
    pub async fn reauthenticate(&self) -> Result<Arc<Session>> {
        let _guard = self.login_lock.lock().await;
        self.reauthenticate_locked().await
    }

    /// Re-authenticates because `stale` was rejected, unless another caller
    /// already replaced it.
    ///
    /// Concurrent calls that all hit the same expired session end up with a
    /// single new login between them.
    ///
    /// # Errors
    ///
    /// As [`reauthenticate`](Self::reauthenticate).
    pub async fn refresh(&self, stale: &Arc<Session>) -> Result<Arc<Session>> {
        let _guard = self.login_lock.lock().await;

        if let Some(current) = self.current() {
            if !Arc::ptr_eq(&current, stale) {
                debug!("session already renewed");
                return Ok(current);
            }
        }

        self.reauthenticate_locked().await
    }

    /// The current session.
    ///
    /// Waits for a login in progress rather than reporting a missing session.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` if not logged in.
    pub async fn session(&self) -> Result<Arc<Session>> {
        if let Some(session) = self.current() {
            return Ok(session);
        }

        let _guard = self.login_lock.lock().await;
        self.current()
            .ok_or_else(|| Error::unauthenticated("not logged in"))
    }

    /// The current session, or a new one logged in with the stored
    /// credentials when an earlier re-authentication failed and left none.
    ///
    /// Also returns whether a login was needed.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` if no login ever succeeded, otherwise as
    /// [`login`](Self::login).
    pub async fn resume(&self) -> Result<(Arc<Session>, bool)> {
        let _guard = self.login_lock.lock().await;

        if let Some(session) = self.current() {
            return Ok((session, false));
        }

        let credentials = self
            .stored_credentials()
            .ok_or_else(|| Error::unauthenticated("not logged in"))?;

        info!("resuming session as {}", credentials.username);
        let session = self.login_locked(&credentials).await?;
        Ok((session, true))
    }

    /// The current session without waiting for a login in progress.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Session>> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.current().is_some()
    }

    async fn reauthenticate_locked(&self) -> Result<Arc<Session>> {
        let credentials = self.stored_credentials().ok_or_else(|| {
            Error::failed_precondition("cannot re-authenticate before a successful login")
        })?;

        // Tokens and clock synchronization belong to the expired session.
        self.clear();

        info!("re-authenticating as {}", credentials.username);
        self.login_locked(&credentials).await
    }

    async fn login_locked(&self, credentials: &Credentials) -> Result<Arc<Session>> {
        match self.remote.login(&self.partner, credentials).await {
            Ok(session) => {
                let session = Arc::new(session);
                debug!("user id: {}", session.user_id);
                debug!("clock offset: {}s", session.sync_offset);

                *self
                    .credentials
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(credentials.clone());
                *self.session.write().unwrap_or_else(PoisonError::into_inner) =
                    Some(Arc::clone(&session));

                info!("logged in as {}", credentials.username);
                Ok(session)
            }
            Err(e) if e.is_transport() => Err(e),
            Err(e) => Err(Error::unauthenticated(e)),
        }
    }

    fn stored_credentials(&self) -> Option<Credentials> {
        self.credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear(&self) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

//! Authenticated session state.
//!
//! A [`Session`] only exists in complete form: either all tokens and the
//! clock synchronization are known, or there is no session at all. The
//! [`Authenticator`](crate::auth::Authenticator) swaps whole sessions in and
//! out and never mutates one in place.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use veil::Redact;

/// Authorization tokens and clock synchronization of one login.
#[derive(Clone, Eq, PartialEq, Hash, Redact)]
pub struct Session {
    pub partner_id: String,

    #[redact]
    pub partner_token: String,

    pub user_id: String,

    #[redact]
    pub user_token: String,

    /// Server time minus local time, in seconds.
    pub sync_offset: i64,

    /// When the session was established.
    pub start_time: SystemTime,
}

impl Session {
    /// Server time to send along with authenticated requests.
    #[must_use]
    pub fn sync_time(&self) -> u64 {
        synchronize(now_from_epoch(), self.sync_offset)
    }

    /// How long ago the session was established.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.start_time.elapsed().unwrap_or(Duration::ZERO)
    }
}

/// Local time in seconds since the epoch, or zero if the clock is set
/// before it.
#[must_use]
pub fn now_from_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

/// Applies a clock offset to a local epoch timestamp.
#[must_use]
pub fn synchronize(local: u64, offset: i64) -> u64 {
    local.saturating_add_signed(offset)
}

/// Clock offset between a server timestamp and a local one.
#[must_use]
pub fn offset(server: u64, local: u64) -> i64 {
    i64::try_from(server)
        .unwrap_or(i64::MAX)
        .saturating_sub(i64::try_from(local).unwrap_or(i64::MAX))
}

//! Session state: the authenticated identity and its lifetime.
//!
//! The [`SessionHolder`] owns the current [`Session`] (absent when logged
//! out) together with a monotonically increasing **epoch**. Every establish
//! and every clear bumps the epoch. Async operations snapshot the epoch
//! when they start and check it before applying their result, so a store
//! response that arrives after a logout (or after a different user signed
//! in) is discarded instead of leaking into the new session's state.
//!
//! Sessions live only in memory and are never persisted.

use parking_lot::Mutex;

use taskdeck_proto::identity::Profile;
use taskdeck_proto::task::UserKey;

/// An authenticated user: resolved profile plus the access credential.
#[derive(Debug, Clone)]
pub struct Session {
    /// The identity resolved by the credential exchange.
    pub profile: Profile,
    /// The provider credential the session was established with.
    pub credential: String,
}

#[derive(Debug, Default)]
struct Inner {
    session: Option<Session>,
    epoch: u64,
}

/// Thread-safe owner of the current session.
#[derive(Debug, Default)]
pub struct SessionHolder {
    inner: Mutex<Inner>,
}

impl SessionHolder {
    /// Creates a holder with no session (logged out, epoch 0).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a session, replacing any previous one, and returns the new
    /// epoch.
    pub fn establish(&self, session: Session) -> u64 {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        inner.session = Some(session);
        inner.epoch
    }

    /// Drops the current session. Always bumps the epoch, even when already
    /// logged out, so any still-running operation sees its snapshot go
    /// stale.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        inner.session = None;
    }

    /// Returns a clone of the current session, if any.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.inner.lock().session.clone()
    }

    /// Returns the current user key together with the epoch it was read
    /// under, or `None` when logged out.
    #[must_use]
    pub fn current_key(&self) -> Option<(UserKey, u64)> {
        let inner = self.inner.lock();
        inner
            .session
            .as_ref()
            .map(|s| (s.profile.user_key.clone(), inner.epoch))
    }

    /// Whether the given epoch snapshot is still current.
    #[must_use]
    pub fn is_current(&self, epoch: u64) -> bool {
        self.inner.lock().epoch == epoch
    }
}

//! Memoizing cache around the current-user fetch
//!
//! Provides a `SessionCache` that remembers the result of the last user fetch
//! for a time-to-live window, coalesces concurrent callers onto one in-flight
//! request, and persists the result to a session store so a freshly
//! constructed cache can serve the previous value without a network call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::{AuthError, User};
use crate::store::SessionStore;

/// Default time-to-live for a cached user entry
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Store key holding the serialized user record
const USER_KEY: &str = "session_user";

/// Store key holding the timestamp of the last successful fetch
const FETCHED_AT_KEY: &str = "session_fetched_at";

/// A resolved user entry held by the cache
///
/// `value` is either a well-formed user record or `None`, the explicit
/// absence marker meaning the user is known to be signed out. The absence of
/// a `CachedUser` altogether means the question has never been answered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedUser {
    /// The user record, or `None` if the session is known to be signed out
    pub value: Option<User>,
    /// When the entry was last resolved
    pub fetched_at: DateTime<Utc>,
}

/// Caller-visible outcome of a cache lookup
///
/// Callers that only care about "user or not" can use [`UserState::user`];
/// callers rendering UI can distinguish a live session from a cached one
/// served because the auth service was unreachable.
#[derive(Debug, Clone, PartialEq)]
pub enum UserState {
    /// A user record that is within its time-to-live window
    Fresh(User),
    /// A previously cached record served because a refresh attempt failed
    Stale(User),
    /// No signed-in user
    NoUser,
}

impl UserState {
    /// Returns the user record, if any, regardless of freshness
    pub fn user(&self) -> Option<&User> {
        match self {
            UserState::Fresh(user) | UserState::Stale(user) => Some(user),
            UserState::NoUser => None,
        }
    }
}

/// Errors surfaced by the session cache
///
/// Only reachable when a fetch fails with a non-authentication error and
/// there is no previous value to fall back on.
#[derive(Debug, Clone, Error)]
pub enum SessionCacheError {
    /// The user fetch failed and no cached value was available
    #[error("User fetch failed: {0}")]
    Fetch(#[source] Arc<AuthError>),
}

/// Result type shared between coalesced callers
type SharedFetch = Shared<BoxFuture<'static, Result<UserState, SessionCacheError>>>;

/// Mutable cache state, guarded by the mutex in [`SessionCache`]
struct Inner {
    /// Last resolved entry, if any
    cached: Option<CachedUser>,
    /// Fetch currently in flight, if any; late callers attach to this
    in_flight: Option<SharedFetch>,
    /// Bumped by `clear` so a fetch finishing afterwards cannot resurrect
    /// the cleared entry
    epoch: u64,
}

/// Process-wide cache for the authenticated user
///
/// Cheap to clone; clones share the same state. Construct one at application
/// startup and hand clones to callers. Tests can construct as many isolated
/// instances as they need.
#[derive(Clone)]
pub struct SessionCache {
    inner: Arc<tokio::sync::Mutex<Inner>>,
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionCache {
    /// Creates a new SessionCache with the default 60-second time-to-live
    ///
    /// Any entry previously persisted to `store` is loaded, so a cache built
    /// after a restart serves the prior session within the TTL window.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self::with_ttl(store, DEFAULT_TTL)
    }

    /// Creates a new SessionCache with a custom time-to-live
    pub fn with_ttl(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        let cached = load_persisted(store.as_ref());
        Self {
            inner: Arc::new(tokio::sync::Mutex::new(Inner {
                cached,
                in_flight: None,
                epoch: 0,
            })),
            store,
            ttl,
        }
    }

    /// Returns the current user, fetching through `fetcher` only when needed
    ///
    /// # Behavior
    /// - A cached entry younger than the TTL is returned without invoking
    ///   `fetcher`.
    /// - If a fetch is already in flight, the call attaches to it instead of
    ///   starting a second one.
    /// - Otherwise `fetcher` is invoked. On success the result is cached and
    ///   persisted. On an unauthenticated failure the cache is normalized to
    ///   the explicit signed-out state. Any other failure falls back to the
    ///   previous entry if one exists, and propagates only when the cache is
    ///   empty.
    /// - With no `fetcher`, an expired entry is served as [`UserState::Stale`]
    ///   and an empty cache yields [`UserState::NoUser`]; no network call is
    ///   made.
    pub async fn fetch_user<F, Fut>(
        &self,
        fetcher: Option<F>,
    ) -> Result<UserState, SessionCacheError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<User, AuthError>> + Send + 'static,
    {
        // Resolve against the current state while holding the lock, but never
        // hold it across an await: the shared future is awaited after the
        // guard is dropped.
        let shared = {
            let mut inner = self.inner.lock().await;

            if let Some(entry) = &inner.cached {
                if self.is_fresh(entry) {
                    return Ok(entry_state(entry));
                }
            }

            if let Some(pending) = &inner.in_flight {
                pending.clone()
            } else {
                let Some(fetcher) = fetcher else {
                    return Ok(match &inner.cached {
                        Some(CachedUser {
                            value: Some(user), ..
                        }) => UserState::Stale(user.clone()),
                        _ => UserState::NoUser,
                    });
                };
                let fetch = self.start_fetch(fetcher, inner.epoch);
                inner.in_flight = Some(fetch.clone());
                fetch
            }
        };

        shared.await
    }

    /// Returns the current user from the cache alone
    ///
    /// Equivalent to [`SessionCache::fetch_user`] with no fetcher: attaches
    /// to an in-flight fetch if one exists, otherwise answers from cached
    /// state without touching the network.
    pub async fn cached_user(&self) -> Result<UserState, SessionCacheError> {
        self.fetch_user(None::<fn() -> std::future::Ready<Result<User, AuthError>>>)
            .await
    }

    /// Clears the cached session, in memory and in the persisted store
    ///
    /// Idempotent. A fetch still in flight when `clear` is called will
    /// resolve for its callers but will not repopulate the cache.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.cached = None;
        inner.in_flight = None;
        inner.epoch += 1;
        self.store.remove(USER_KEY);
        self.store.remove(FETCHED_AT_KEY);
    }

    /// Returns true if the entry is still within the time-to-live window
    fn is_fresh(&self, entry: &CachedUser) -> bool {
        let age = Utc::now().signed_duration_since(entry.fetched_at);
        age.num_milliseconds() < self.ttl.as_millis() as i64
    }

    /// Builds the shared future that performs one real fetch and settles the
    /// cache state on completion
    fn start_fetch<F, Fut>(&self, fetcher: F, epoch: u64) -> SharedFetch
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<User, AuthError>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let store = Arc::clone(&self.store);

        async move {
            let result = fetcher().await;

            // State must settle atomically: the in-flight handle is released
            // and the cache updated under one lock acquisition.
            let mut guard = inner.lock().await;
            let current = guard.epoch == epoch;
            if current {
                guard.in_flight = None;
            }

            match result {
                Ok(user) => {
                    if current {
                        let entry = CachedUser {
                            value: Some(user.clone()),
                            fetched_at: next_timestamp(guard.cached.as_ref()),
                        };
                        persist(store.as_ref(), &entry);
                        guard.cached = Some(entry);
                    }
                    Ok(UserState::Fresh(user))
                }
                Err(err) if err.is_unauthenticated() => {
                    // A 401 is a definitive answer, not an outage: normalize
                    // to the explicit signed-out state even if a stale user
                    // record exists.
                    debug!("auth service reports no signed-in user");
                    if current {
                        let entry = CachedUser {
                            value: None,
                            fetched_at: next_timestamp(guard.cached.as_ref()),
                        };
                        persist(store.as_ref(), &entry);
                        guard.cached = Some(entry);
                    }
                    Ok(UserState::NoUser)
                }
                Err(err) => {
                    warn!(error = %err, "user fetch failed");
                    // Previous entry is preserved untouched; serve it stale.
                    match &guard.cached {
                        Some(CachedUser {
                            value: Some(user), ..
                        }) => Ok(UserState::Stale(user.clone())),
                        Some(CachedUser { value: None, .. }) => Ok(UserState::NoUser),
                        None => Err(SessionCacheError::Fetch(Arc::new(err))),
                    }
                }
            }
        }
        .boxed()
        .shared()
    }
}

/// Maps a fresh cache entry to its caller-visible state
fn entry_state(entry: &CachedUser) -> UserState {
    match &entry.value {
        Some(user) => UserState::Fresh(user.clone()),
        None => UserState::NoUser,
    }
}

/// Returns the timestamp for a newly resolved entry
///
/// Clamped so `fetched_at` never moves backwards across successive fetches,
/// even if the system clock does.
fn next_timestamp(prev: Option<&CachedUser>) -> DateTime<Utc> {
    let now = Utc::now();
    match prev {
        Some(entry) if entry.fetched_at > now => entry.fetched_at,
        _ => now,
    }
}

/// Writes an entry to the persisted store; failures are logged and swallowed
fn persist(store: &dyn SessionStore, entry: &CachedUser) {
    match serde_json::to_string(&entry.value) {
        Ok(json) => {
            store.set(USER_KEY, &json);
            store.set(FETCHED_AT_KEY, &entry.fetched_at.to_rfc3339());
        }
        Err(err) => warn!(error = %err, "failed to serialize session entry"),
    }
}

/// Loads a previously persisted entry, if both keys are present and parse
fn load_persisted(store: &dyn SessionStore) -> Option<CachedUser> {
    let raw_value = store.get(USER_KEY)?;
    let raw_stamp = store.get(FETCHED_AT_KEY)?;

    let value: Option<User> = match serde_json::from_str(&raw_value) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "ignoring malformed persisted session entry");
            return None;
        }
    };
    let fetched_at = match DateTime::parse_from_rfc3339(&raw_stamp) {
        Ok(stamp) => stamp.with_timezone(&Utc),
        Err(err) => {
            debug!(error = %err, "ignoring malformed persisted session timestamp");
            return None;
        }
    };

    Some(CachedUser { value, fetched_at })
}

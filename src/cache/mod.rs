//! Session cache for the authenticated user
//!
//! This module memoizes the "fetch current user" call so UI code can ask for
//! the signed-in user as often as it likes without hammering the auth
//! service. Cached values are served within a time-to-live window, concurrent
//! callers share a single in-flight fetch, and a failed refresh falls back to
//! the previously cached value.

mod session;

pub use session::{CachedUser, SessionCache, SessionCacheError, UserState, DEFAULT_TTL};

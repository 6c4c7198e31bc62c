//! Session lifecycle events and the cache-invalidation listener.

// self
use crate::{_prelude::*, cache::TokenCache};

/// Storage key carried by session-change events when the signed-in user changes.
pub const SESSION_USER_ID_KEY: &str = "Session.UserId";

/// Host-delivered notification that session state changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionChangeEvent {
	key: String,
}
impl SessionChangeEvent {
	/// Builds an event for an arbitrary storage key.
	pub fn new(key: impl Into<String>) -> Self {
		Self { key: key.into() }
	}

	/// Builds the event hosts emit when the signed-in user changes.
	pub fn user_changed() -> Self {
		Self::new(SESSION_USER_ID_KEY)
	}

	/// Storage key the event refers to.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Returns `true` if the event signals a change of the signed-in user.
	pub fn is_user_change(&self) -> bool {
		self.key == SESSION_USER_ID_KEY
	}
}

/// Cloneable handle hosts wire into their session-event source.
///
/// Every notified user change drops the courier's scope-keyed token cache, so the next
/// acquisition fetches on behalf of the new user. Events for other keys are ignored. The
/// persisted XSRF token survives user changes; it protects the origin, not the session.
#[derive(Clone)]
pub struct SessionListener {
	cache: Arc<TokenCache>,
}
impl SessionListener {
	/// Wraps the cache a courier hands out through its listener accessor.
	pub(crate) fn new(cache: Arc<TokenCache>) -> Self {
		Self { cache }
	}

	/// Applies one session-change notification.
	pub fn notify(&self, event: &SessionChangeEvent) {
		if event.is_user_change() {
			self.cache.clear_access_tokens();
		}
	}
}
impl Debug for SessionListener {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionListener").field("cache", &self.cache).finish()
	}
}

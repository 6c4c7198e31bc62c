//! Two-tier access token cache plus the vault-backed XSRF tier.

// self
use crate::{
	_prelude::*,
	auth::{AccessTokenRecord, Scope},
	store::{SessionTokenStore, StoreError, TokenVault, XSRF_TOKEN_KEY},
};

/// Token cache shared by the courier and both token providers.
///
/// Access tokens live in a scope-keyed in-memory map backed by an optional read-only session
/// tier; the XSRF token lives in the injected vault under [`XSRF_TOKEN_KEY`]. Access token writes
/// always land in the in-memory tier only, so the session tier feeds the cache but never absorbs
/// courier state.
pub struct TokenCache {
	scoped: RwLock<HashMap<Scope, AccessTokenRecord>>,
	vault: Arc<dyn TokenVault>,
	session: Option<Arc<dyn SessionTokenStore>>,
}
impl TokenCache {
	/// Creates a cache backed by the provided vault, with no session tier.
	pub fn new(vault: Arc<dyn TokenVault>) -> Self {
		Self { scoped: RwLock::new(HashMap::new()), vault, session: None }
	}

	/// Attaches a read-only session tier consulted on in-memory misses.
	pub fn with_session_store(mut self, session: Arc<dyn SessionTokenStore>) -> Self {
		self.session = Some(session);

		self
	}

	/// Reads the persisted XSRF token, if any.
	pub async fn read_xsrf(&self) -> Result<Option<String>, StoreError> {
		self.vault.get(XSRF_TOKEN_KEY).await
	}

	/// Persists a fresh XSRF token, replacing any previous value.
	pub async fn write_xsrf(&self, value: &str) -> Result<(), StoreError> {
		self.vault.set(XSRF_TOKEN_KEY, value).await
	}

	/// Drops the persisted XSRF token.
	pub async fn clear_xsrf(&self) -> Result<(), StoreError> {
		self.vault.remove(XSRF_TOKEN_KEY).await
	}

	/// Looks up the record cached for `scope`, consulting the session tier on a miss.
	///
	/// A session payload that parses is adopted into the in-memory tier before being returned; a
	/// payload that does not parse counts as a miss. Expiry is not checked here, callers decide
	/// whether a returned record is still usable.
	pub async fn read_access_token(
		&self,
		scope: &Scope,
	) -> Result<Option<AccessTokenRecord>, StoreError> {
		if let Some(record) = self.scoped.read().get(scope).cloned() {
			return Ok(Some(record));
		}

		let Some(session) = &self.session else {
			return Ok(None);
		};
		let Some(raw) = session.fetch(scope).await? else {
			return Ok(None);
		};
		let Ok(record) = serde_json::from_str::<AccessTokenRecord>(&raw) else {
			return Ok(None);
		};

		self.scoped.write().insert(scope.clone(), record.clone());

		Ok(Some(record))
	}

	/// Caches a record for `scope` in the in-memory tier.
	pub fn write_access_token(&self, scope: Scope, record: AccessTokenRecord) {
		self.scoped.write().insert(scope, record);
	}

	/// Evicts the record cached for `scope`, if any.
	pub fn clear_access_token(&self, scope: &Scope) {
		self.scoped.write().remove(scope);
	}

	/// Evicts every cached access token while leaving the XSRF tier untouched.
	pub fn clear_access_tokens(&self) {
		self.scoped.write().clear();
	}

	/// Number of scopes currently held by the in-memory tier.
	pub fn cached_scopes(&self) -> usize {
		self.scoped.read().len()
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("scoped", &self.cached_scopes())
			.field("vault", &"<dyn TokenVault>")
			.field("session", &self.session.as_ref().map(|_| "<dyn SessionTokenStore>"))
			.finish()
	}
}

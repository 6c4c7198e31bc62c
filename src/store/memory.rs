//! Thread-safe in-memory backends for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{AccessTokenRecord, Scope},
	store::{SessionTokenStore, StoreError, StoreFuture, TokenVault},
};

type ValueMap = Arc<RwLock<HashMap<String, String>>>;

/// Web-storage-shaped vault keeping values in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryVault(ValueMap);
impl MemoryVault {
	fn get_now(map: ValueMap, key: String) -> Option<String> {
		map.read().get(&key).cloned()
	}

	fn set_now(map: ValueMap, key: String, value: String) {
		map.write().insert(key, value);
	}

	fn remove_now(map: ValueMap, key: String) {
		map.write().remove(&key);
	}
}
impl TokenVault for MemoryVault {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::get_now(map, key)) })
	}

	fn set<'a>(&'a self, key: &'a str, value: &'a str) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let key = key.to_owned();
		let value = value.to_owned();

		Box::pin(async move { Ok(Self::set_now(map, key, value)) })
	}

	fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::remove_now(map, key)) })
	}
}

/// Seedable read-only session tier for tests and embedded hosts.
///
/// Bodies are handed out verbatim; seeding a record serializes it into the exact JSON shape the
/// token endpoint produces.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore(ValueMap);
impl MemorySessionStore {
	/// Seeds the raw JSON body handed out for `scope`.
	pub fn seed(&self, scope: impl Into<Scope>, body: impl Into<String>) {
		self.0.write().insert(scope.into().as_str().to_owned(), body.into());
	}

	/// Seeds the serialized form of an [`AccessTokenRecord`] for `scope`.
	pub fn seed_record(
		&self,
		scope: impl Into<Scope>,
		record: &AccessTokenRecord,
	) -> Result<(), StoreError> {
		let body = serde_json::to_string(record).map_err(|e| StoreError::Serialization {
			message: format!("Failed to serialize session record: {e}"),
		})?;

		self.seed(scope, body);

		Ok(())
	}
}
impl SessionTokenStore for MemorySessionStore {
	fn fetch<'a>(&'a self, scope: &'a Scope) -> StoreFuture<'a, Option<String>> {
		let map = self.0.clone();
		let scope = scope.to_owned();

		Box::pin(async move { Ok(map.read().get(scope.as_str()).cloned()) })
	}
}

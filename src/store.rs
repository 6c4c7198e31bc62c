//! Storage contracts and built-in backends for courier token material.

pub mod file;
pub mod memory;

pub use file::FileVault;
pub use memory::{MemorySessionStore, MemoryVault};

// self
use crate::{_prelude::*, auth::Scope};

/// Boxed future returned by storage contracts.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Vault key under which the XSRF token is persisted.
pub const XSRF_TOKEN_KEY: &str = "XSRF.Token";

/// Durable key-value contract shaped like web storage: string keys to string values.
///
/// A vault backs the XSRF tier and outlives courier instances, so separate couriers sharing one
/// vault also share the persisted XSRF token. The scope-keyed access token cache never touches a
/// vault.
pub trait TokenVault
where
	Self: Send + Sync,
{
	/// Fetches the value stored under `key`, if present.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

	/// Stores `value` under `key`, replacing any previous value.
	fn set<'a>(&'a self, key: &'a str, value: &'a str) -> StoreFuture<'a, ()>;

	/// Removes the value stored under `key`, if present.
	fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;
}

/// Read-only session tier handing out raw access token bodies keyed by scope.
///
/// The courier only ever reads this tier. A fetched body is expected to be the JSON form of
/// [`AccessTokenRecord`](crate::auth::AccessTokenRecord); anything else counts as a miss.
pub trait SessionTokenStore
where
	Self: Send + Sync,
{
	/// Fetches the raw JSON body cached for `scope`, if present.
	fn fetch<'a>(&'a self, scope: &'a Scope) -> StoreFuture<'a, Option<String>>;
}

/// Error type produced by storage implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

// self
use auth_courier::{
	_preludet::*,
	auth::{AccessTokenRecord, Scope},
	cache::TokenCache,
	store::{MemorySessionStore, MemoryVault, SessionTokenStore},
};

fn build_cache(session: &MemorySessionStore) -> TokenCache {
	TokenCache::new(Arc::new(MemoryVault::default())).with_session_store(Arc::new(session.clone()))
}

#[tokio::test]
async fn session_payloads_are_adopted_into_memory() {
	let session = MemorySessionStore::default();
	let cache = build_cache(&session);
	let scope = Scope::from("users:profile:read");
	let seeded = AccessTokenRecord::expiring_in("session-token", Duration::hours(1));

	session.seed_record(scope.clone(), &seeded).expect("Seeding the session store should succeed.");

	let first = cache
		.read_access_token(&scope)
		.await
		.expect("Read through the session tier should succeed.")
		.expect("Seeded scope should resolve to a record.");

	assert_eq!(first.access_token.expose(), "session-token");

	// Later reads come from memory even after the session tier moves on.
	session
		.seed_record(scope.clone(), &AccessTokenRecord::expiring_in("replaced", Duration::hours(1)))
		.expect("Replacing the session body should succeed.");

	let second = cache
		.read_access_token(&scope)
		.await
		.expect("Repeated read should succeed.")
		.expect("Adopted record should stay cached.");

	assert_eq!(second.access_token.expose(), "session-token");
}

#[tokio::test]
async fn unparseable_session_bodies_count_as_misses() {
	let session = MemorySessionStore::default();
	let cache = build_cache(&session);
	let scope = Scope::from("users:profile:read");

	session.seed(scope.clone(), "{\"access_token\":");

	let record =
		cache.read_access_token(&scope).await.expect("Read should not error on bad payloads.");

	assert!(record.is_none());
	assert_eq!(cache.cached_scopes(), 0);
}

#[tokio::test]
async fn writes_never_reach_the_session_tier() {
	let session = MemorySessionStore::default();
	let cache = build_cache(&session);
	let scope = Scope::from("grades:gradebook:write");

	cache.write_access_token(
		scope.clone(),
		AccessTokenRecord::expiring_in("memory-token", Duration::hours(1)),
	);

	let stored = session.fetch(&scope).await.expect("Direct session fetch should succeed.");

	assert!(stored.is_none());
	assert_eq!(cache.cached_scopes(), 1);
}

#[tokio::test]
async fn scopes_clear_independently() {
	let cache = TokenCache::new(Arc::new(MemoryVault::default()));
	let read_scope = Scope::from("users:profile:read");
	let write_scope = Scope::from("users:profile:write");

	cache.write_access_token(
		read_scope.clone(),
		AccessTokenRecord::expiring_in("read-token", Duration::hours(1)),
	);
	cache.write_access_token(
		write_scope.clone(),
		AccessTokenRecord::expiring_in("write-token", Duration::hours(1)),
	);
	cache.clear_access_token(&read_scope);

	assert!(
		cache.read_access_token(&read_scope).await.expect("Read should succeed.").is_none(),
		"Cleared scope should miss."
	);

	let survivor = cache
		.read_access_token(&write_scope)
		.await
		.expect("Read should succeed.")
		.expect("Untouched scope should stay cached.");

	assert_eq!(survivor.access_token.expose(), "write-token");
}

#[tokio::test]
async fn full_clears_spare_the_xsrf_tier() {
	let cache = TokenCache::new(Arc::new(MemoryVault::default()));

	cache.write_xsrf("xsrf-value").await.expect("XSRF write should succeed.");
	cache.write_access_token(
		Scope::default(),
		AccessTokenRecord::expiring_in("wildcard-token", Duration::hours(1)),
	);
	cache.clear_access_tokens();

	assert_eq!(cache.cached_scopes(), 0);

	let xsrf = cache.read_xsrf().await.expect("XSRF read should succeed.");

	assert_eq!(xsrf.as_deref(), Some("xsrf-value"));
}

#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use auth_courier::{
	_preludet::*,
	auth::{AccessTokenRecord, Scope},
	session::SessionChangeEvent,
	store::MemorySessionStore,
};

async fn mock_xsrf_endpoint<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
	let body = format!("{{\"referrerToken\":\"{token}\"}}");

	server
		.mock_async(move |when, then| {
			when.method(GET).path("/d2l/lp/auth/xsrf-tokens");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

async fn mock_token_endpoint<'a>(server: &'a MockServer, access_token: &str) -> httpmock::Mock<'a> {
	let expiry = (OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp();
	let body = format!("{{\"access_token\":\"{access_token}\",\"expires_at\":{expiry}}}");

	server
		.mock_async(move |when, then| {
			when.method(POST).path("/d2l/lp/auth/oauth2/token");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

#[tokio::test]
async fn token_exchanges_send_the_xsrf_header_and_wildcard_scope() {
	let server = MockServer::start_async().await;
	let courier = build_reqwest_test_courier(server.address().to_string());
	let xsrf_mock = mock_xsrf_endpoint(&server, "xsrf-123").await;
	let expiry = (OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp();
	let token_mock = server
		.mock_async(move |when, then| {
			when.method(POST)
				.path("/d2l/lp/auth/oauth2/token")
				.header("x-csrf-token", "xsrf-123")
				.header("content-type", "application/x-www-form-urlencoded")
				.body("scope=*:*:*");
			then.status(200)
				.header("content-type", "application/json")
				.body(format!("{{\"access_token\":\"tok-1\",\"expires_at\":{expiry}}}"));
		})
		.await;
	let token = courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Token exchange should succeed.");

	assert_eq!(token, "tok-1");

	xsrf_mock.assert_async().await;
	token_mock.assert_async().await;
}

#[tokio::test]
async fn cached_tokens_skip_the_network() {
	let server = MockServer::start_async().await;
	let courier = build_reqwest_test_courier(server.address().to_string());
	let _xsrf_mock = mock_xsrf_endpoint(&server, "xsrf-cache").await;
	let token_mock = mock_token_endpoint(&server, "cached-token").await;
	let first = courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Initial token exchange should succeed.");
	let second = courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Cached acquisition should succeed.");

	assert_eq!(first, "cached-token");
	assert_eq!(second, "cached-token");

	token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn expired_tokens_are_refetched() {
	let server = MockServer::start_async().await;
	let courier = build_reqwest_test_courier(server.address().to_string());
	let _xsrf_mock = mock_xsrf_endpoint(&server, "xsrf-expired").await;
	let token_mock = mock_token_endpoint(&server, "fresh-token").await;
	let stale =
		AccessTokenRecord::new("stale-token", OffsetDateTime::now_utc() - Duration::hours(1));

	courier.cache().write_access_token(Scope::default(), stale);

	let token = courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Acquisition over an expired record should succeed.");

	assert_eq!(token, "fresh-token");

	token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn user_changes_invalidate_cached_tokens() {
	let server = MockServer::start_async().await;
	let courier = build_reqwest_test_courier(server.address().to_string());
	let _xsrf_mock = mock_xsrf_endpoint(&server, "xsrf-session").await;
	let token_mock = mock_token_endpoint(&server, "per-user-token").await;

	courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Initial token exchange should succeed.");
	courier.session_listener().notify(&SessionChangeEvent::user_changed());
	courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Acquisition after a user change should succeed.");

	token_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn unrelated_session_keys_leave_tokens_cached() {
	let server = MockServer::start_async().await;
	let courier = build_reqwest_test_courier(server.address().to_string());
	let _xsrf_mock = mock_xsrf_endpoint(&server, "xsrf-locale").await;
	let token_mock = mock_token_endpoint(&server, "sticky-token").await;

	courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Initial token exchange should succeed.");
	courier.session_listener().notify(&SessionChangeEvent::new("Session.Locale"));
	courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Acquisition after an unrelated change should succeed.");

	token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn session_changes_reach_the_provider_directly() {
	let server = MockServer::start_async().await;
	let courier = build_reqwest_test_courier(server.address().to_string());
	let xsrf_mock = mock_xsrf_endpoint(&server, "xsrf-direct").await;
	let token_mock = mock_token_endpoint(&server, "direct-token").await;

	courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Initial token exchange should succeed.");
	courier.token_provider().handle_session_change(&SessionChangeEvent::user_changed());
	courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Acquisition after a user change should succeed.");

	token_mock.assert_calls_async(2).await;
	xsrf_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn cache_resets_force_full_reacquisition() {
	let server = MockServer::start_async().await;
	let courier = build_reqwest_test_courier(server.address().to_string());
	let xsrf_mock = mock_xsrf_endpoint(&server, "xsrf-reset").await;
	let token_mock = mock_token_endpoint(&server, "reset-token").await;

	courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Initial token exchange should succeed.");
	courier
		.token_provider()
		.reset_caches()
		.await
		.expect("Dropping both cache tiers should succeed.");
	courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Acquisition after a reset should succeed.");

	xsrf_mock.assert_calls_async(2).await;
	token_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn rotated_xsrf_tokens_replace_the_persisted_value() {
	let server = MockServer::start_async().await;
	let courier = build_reqwest_test_courier(server.address().to_string());
	let _xsrf_mock = mock_xsrf_endpoint(&server, "xsrf-initial").await;
	let expiry = (OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp();
	let _token_mock = server
		.mock_async(move |when, then| {
			when.method(POST).path("/d2l/lp/auth/oauth2/token");
			then.status(200)
				.header("content-type", "application/json")
				.header("x-csrf-token", "xsrf-rotated")
				.body(format!("{{\"access_token\":\"tok-rotated\",\"expires_at\":{expiry}}}"));
		})
		.await;

	courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Token exchange should succeed.");

	let persisted = courier
		.cache()
		.read_xsrf()
		.await
		.expect("Vault read should succeed.")
		.expect("Rotated token should be persisted.");

	assert_eq!(persisted, "xsrf-rotated");
}

#[tokio::test]
async fn endpoint_failures_surface_with_their_status() {
	let server = MockServer::start_async().await;
	let courier = build_reqwest_test_courier(server.address().to_string());
	let _xsrf_mock = mock_xsrf_endpoint(&server, "xsrf-fail").await;
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/d2l/lp/auth/oauth2/token");
			then.status(500);
		})
		.await;
	let err = courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect_err("A 500 from the endpoint should fail the exchange.");

	assert!(matches!(err, Error::AuthTokenFetch { .. }));
	assert_eq!(err.status(), Some(500));
	assert_eq!(err.stage(), "auth_token_fetch");
}

#[tokio::test]
async fn session_store_records_serve_without_network() {
	let server = MockServer::start_async().await;
	let session = Arc::new(MemorySessionStore::default());

	session
		.seed_record(
			Scope::default(),
			&AccessTokenRecord::expiring_in("session-token", Duration::hours(1)),
		)
		.expect("Seeding the session store should succeed.");

	let courier =
		reqwest_test_courier_builder(server.address().to_string()).session_store(session).build();
	let xsrf_mock = mock_xsrf_endpoint(&server, "xsrf-unused").await;
	let token_mock = mock_token_endpoint(&server, "network-token").await;
	let token = courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Acquisition from the session tier should succeed.");

	assert_eq!(token, "session-token");

	xsrf_mock.assert_calls_async(0).await;
	token_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn unparseable_session_bodies_fall_back_to_the_endpoint() {
	let server = MockServer::start_async().await;
	let session = Arc::new(MemorySessionStore::default());

	session.seed(Scope::default(), "definitely not json");

	let courier =
		reqwest_test_courier_builder(server.address().to_string()).session_store(session).build();
	let _xsrf_mock = mock_xsrf_endpoint(&server, "xsrf-fallback").await;
	let token_mock = mock_token_endpoint(&server, "endpoint-token").await;
	let token = courier
		.token_provider()
		.acquire(&Scope::default())
		.await
		.expect("Fallback acquisition should succeed.");

	assert_eq!(token, "endpoint-token");

	token_mock.assert_calls_async(1).await;
}

#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use auth_courier::{_preludet::*, error::FetchError};

#[tokio::test]
async fn fetched_tokens_are_persisted_and_reused() {
	let server = MockServer::start_async().await;
	let courier = build_reqwest_test_courier(server.address().to_string());
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/d2l/lp/auth/xsrf-tokens");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"referrerToken\":\"xsrf-abc\"}");
		})
		.await;
	let first =
		courier.xsrf_provider().acquire().await.expect("Initial XSRF acquisition should succeed.");
	let second =
		courier.xsrf_provider().acquire().await.expect("Repeated XSRF acquisition should succeed.");

	assert_eq!(first, "xsrf-abc");
	assert_eq!(second, "xsrf-abc");

	mock.assert_calls_async(1).await;

	let persisted = courier
		.cache()
		.read_xsrf()
		.await
		.expect("Vault read should succeed.")
		.expect("Fetched token should be persisted in the vault.");

	assert_eq!(persisted, "xsrf-abc");
}

#[tokio::test]
async fn persisted_tokens_short_circuit_the_endpoint() {
	let server = MockServer::start_async().await;
	let courier = build_reqwest_test_courier(server.address().to_string());

	courier.cache().write_xsrf("seeded-token").await.expect("Seeding the vault should succeed.");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/d2l/lp/auth/xsrf-tokens");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"referrerToken\":\"fresh-token\"}");
		})
		.await;
	let token = courier
		.xsrf_provider()
		.acquire()
		.await
		.expect("Acquisition from a seeded vault should succeed.");

	assert_eq!(token, "seeded-token");

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn unexpected_statuses_surface_as_fetch_errors() {
	let server = MockServer::start_async().await;
	let courier = build_reqwest_test_courier(server.address().to_string());
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/d2l/lp/auth/xsrf-tokens");
			then.status(404);
		})
		.await;
	let err = courier
		.xsrf_provider()
		.acquire()
		.await
		.expect_err("A 404 from the endpoint should fail the acquisition.");

	assert!(matches!(err, Error::XsrfFetch { .. }));
	assert_eq!(err.status(), Some(404));
	assert_eq!(err.stage(), "xsrf_fetch");

	mock.assert_async().await;
}

#[tokio::test]
async fn malformed_bodies_are_rejected() {
	let server = MockServer::start_async().await;
	let courier = build_reqwest_test_courier(server.address().to_string());
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/d2l/lp/auth/xsrf-tokens");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"unexpected\":true}");
		})
		.await;
	let err = courier
		.xsrf_provider()
		.acquire()
		.await
		.expect_err("A body without the referrer token should fail the acquisition.");

	assert!(matches!(err, Error::XsrfFetch { source: FetchError::MalformedBody { .. } }));
}

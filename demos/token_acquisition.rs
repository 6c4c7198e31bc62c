//! Demonstrates acquiring and caching a scoped bearer token, then watching a session change
//! invalidate the cached copy.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use auth_courier::{
	auth::Scope,
	courier::Courier,
	origin::PageLocation,
	session::SessionChangeEvent,
	store::MemoryVault,
	transport::ReqwestTransport,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let xsrf_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/d2l/lp/auth/xsrf-tokens");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"referrerToken\":\"demo-xsrf\"}");
		})
		.await;
	let expiry = (OffsetDateTime::now_utc() + Duration::minutes(30)).unix_timestamp();
	let token_mock = server
		.mock_async(move |when, then| {
			when.method(POST).path("/d2l/lp/auth/oauth2/token").body("scope=*:*:*");
			then.status(200)
				.header("content-type", "application/json")
				.body(format!("{{\"access_token\":\"demo-bearer\",\"expires_at\":{expiry}}}"));
		})
		.await;
	let location = PageLocation::new("http", server.address().to_string());
	let courier = Courier::builder(ReqwestTransport::default(), location)
		.vault(Arc::new(MemoryVault::default()))
		.build();
	let provider = courier.token_provider();
	let first = provider.acquire(&Scope::default()).await?;
	let second = provider.acquire(&Scope::default()).await?;

	println!("Acquired bearer token {first}; cached copy matches: {}.", first == second);

	token_mock.assert_calls_async(1).await;

	courier.session_listener().notify(&SessionChangeEvent::user_changed());
	provider.acquire(&Scope::default()).await?;

	println!("A user change invalidated the cache; the endpoint was called again.");

	token_mock.assert_calls_async(2).await;
	xsrf_mock.assert_async().await;

	Ok(())
}

//! Demonstrates dispatching a same-origin API call through the courier with the default reqwest
//! transport, letting it fetch and attach the anti-forgery token on its own.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use auth_courier::{
	courier::{Courier, PendingRequest},
	origin::PageLocation,
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
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/d2l/api/lp/1.0/users/me").header("x-csrf-token", "demo-xsrf");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"displayName\":\"Demo User\"}");
		})
		.await;
	let location = PageLocation::new("http", server.address().to_string());
	let courier = Courier::builder(ReqwestTransport::default(), location).build();
	let response = courier.send_request(PendingRequest::new("/d2l/api/lp/1.0/users/me")).await?;

	println!("Fetched {} bytes with status {}.", response.body.len(), response.status);

	xsrf_mock.assert_async().await;
	api_mock.assert_async().await;

	Ok(())
}

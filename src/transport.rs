//! Transport primitives for token fetches and augmented dispatch.
//!
//! The module exposes [`HttpTransport`] alongside [`WireRequest`] and [`WireResponse`] so
//! downstream crates can integrate custom HTTP clients. The trait is the courier's only
//! dependency on an HTTP stack; everything above it speaks plain `http` types.

// std
use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	error::{FetchError, TransportError},
};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<WireResponse, TransportError>> + 'a + Send>>;

/// A fully resolved request ready for the wire.
#[derive(Clone, Debug)]
pub struct WireRequest {
	/// Request method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Headers exactly as they should appear on the wire.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl WireRequest {
	/// Builds a bodiless request with empty headers.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: None }
	}
}

/// Raw response captured from the transport.
#[derive(Clone, Debug)]
pub struct WireResponse {
	/// Response status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl WireResponse {
	/// Builds a response carrying only a status; headers and body start empty.
	pub fn new(status: StatusCode) -> Self {
		Self { status, headers: HeaderMap::new(), body: Vec::new() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Returns the named header as a string, if present and valid UTF-8.
	pub fn header(&self, name: &HeaderName) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	/// Deserializes the body as JSON, reporting the failing path on malformed payloads.
	pub fn json<T>(&self) -> Result<T, FetchError>
	where
		T: serde::de::DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
			FetchError::MalformedBody { source: e, status: Some(self.status.as_u16()) }
		})
	}
}

/// Abstraction over HTTP stacks capable of dispatching courier requests.
///
/// The trait acts as the courier's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so they can be shared across courier instances behind `Arc<T>`
/// without additional wrappers, and the futures they return must be `Send` so courier
/// operations can hop executors.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Dispatches a request and resolves with the raw response.
	///
	/// Non-success statuses are not errors at this layer; callers decide how to interpret them.
	fn execute(&self, request: WireRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: WireRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let WireRequest { method, url, headers, body } = request;
			let mut builder = client.request(method, url).headers(headers);

			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(WireResponse { status, headers, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Body {
		token: String,
	}

	#[test]
	fn json_parses_well_formed_bodies() {
		let mut response = WireResponse::new(StatusCode::OK);

		response.body = br#"{"token":"abc"}"#.to_vec();

		let body = response.json::<Body>().expect("Well-formed body should parse.");

		assert_eq!(body.token, "abc");
	}

	#[test]
	fn json_errors_carry_the_status() {
		let mut response = WireResponse::new(StatusCode::BAD_GATEWAY);

		response.body = br#"{"token":42}"#.to_vec();

		let error = response.json::<Body>().expect_err("Mismatched body should fail to parse.");

		assert!(matches!(error, FetchError::MalformedBody { status: Some(502), .. }));
	}

	#[test]
	fn header_lookup_requires_utf8() {
		let mut response = WireResponse::new(StatusCode::OK);

		response.headers.insert(
			HeaderName::from_static("x-csrf-token"),
			HeaderValue::from_static("rotated"),
		);

		assert_eq!(response.header(&HeaderName::from_static("x-csrf-token")), Some("rotated"));
		assert_eq!(response.header(&HeaderName::from_static("x-missing")), None);
	}
}

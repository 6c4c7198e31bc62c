//! XSRF token acquisition with vault-backed reuse.

// self
use crate::{
	_prelude::*,
	cache::TokenCache,
	endpoints::TokenEndpoints,
	error::FetchError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	origin::OriginClassifier,
	transport::{HttpTransport, WireRequest},
};

/// Anti-forgery header attached to same-origin requests and token exchanges.
pub const XSRF_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-csrf-token");

#[derive(Debug, Deserialize)]
struct XsrfTokenBody {
	#[serde(rename = "referrerToken")]
	referrer_token: String,
}

/// Fetch-or-reuse provider for the anti-forgery token.
///
/// Obtained through [`Courier::xsrf_provider`](crate::courier::Courier::xsrf_provider). The
/// provider reads the vault first and calls the XSRF endpoint only on a miss; a fetched value is
/// persisted before it is handed out, so later couriers sharing the vault reuse it without
/// another fetch.
pub struct XsrfProvider<T>
where
	T: HttpTransport + ?Sized,
{
	transport: Arc<T>,
	cache: Arc<TokenCache>,
	classifier: OriginClassifier,
	endpoints: TokenEndpoints,
}
impl<T> XsrfProvider<T>
where
	T: HttpTransport + ?Sized,
{
	/// Wires a provider from the courier's shared parts.
	pub(crate) fn new(
		transport: Arc<T>,
		cache: Arc<TokenCache>,
		classifier: OriginClassifier,
		endpoints: TokenEndpoints,
	) -> Self {
		Self { transport, cache, classifier, endpoints }
	}

	/// Returns the current XSRF token, fetching and persisting a fresh one on a vault miss.
	pub async fn acquire(&self) -> Result<String> {
		const KIND: FlowKind = FlowKind::XsrfFetch;

		let span = FlowSpan::new(KIND, "acquire");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if let Some(token) = self.cache.read_xsrf().await? {
					return Ok(token);
				}

				let url = self.classifier.resolve(self.endpoints.xsrf_path())?;
				let request = WireRequest::new(Method::GET, url);
				let response = self.transport.execute(request).await.map_err(Error::xsrf_fetch)?;

				if !response.is_success() {
					return Err(Error::xsrf_fetch(FetchError::UnexpectedStatus {
						status: response.status.as_u16(),
					}));
				}

				let body = response.json::<XsrfTokenBody>().map_err(Error::xsrf_fetch)?;

				self.cache.write_xsrf(&body.referrer_token).await?;

				Ok(body.referrer_token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
impl<T> Debug for XsrfProvider<T>
where
	T: HttpTransport + ?Sized,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("XsrfProvider")
			.field("transport", &"<dyn HttpTransport>")
			.field("cache", &self.cache)
			.field("classifier", &self.classifier)
			.field("endpoints", &self.endpoints)
			.finish()
	}
}

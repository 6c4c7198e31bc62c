//! OAuth access token acquisition keyed by scope.

// crates.io
use http::header::CONTENT_TYPE;
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenRecord, Scope},
	cache::TokenCache,
	endpoints::TokenEndpoints,
	error::{ConfigError, FetchError},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	origin::OriginClassifier,
	session::SessionChangeEvent,
	store::StoreError,
	transport::{HttpTransport, WireRequest},
	xsrf::{XSRF_TOKEN_HEADER, XsrfProvider},
};

/// Fetch-or-reuse provider for scope-keyed bearer tokens.
///
/// Obtained through [`Courier::token_provider`](crate::courier::Courier::token_provider). An
/// acquisition first consults the cache tiers and only calls the token endpoint when no
/// unexpired record exists for the scope. The endpoint call itself is XSRF-protected, so a cold
/// start costs two round trips.
pub struct AccessTokenProvider<T>
where
	T: HttpTransport + ?Sized,
{
	transport: Arc<T>,
	cache: Arc<TokenCache>,
	xsrf: XsrfProvider<T>,
	classifier: OriginClassifier,
	endpoints: TokenEndpoints,
}
impl<T> AccessTokenProvider<T>
where
	T: HttpTransport + ?Sized,
{
	/// Wires a provider (and its inner XSRF provider) from the courier's shared parts.
	pub(crate) fn new(
		transport: Arc<T>,
		cache: Arc<TokenCache>,
		classifier: OriginClassifier,
		endpoints: TokenEndpoints,
	) -> Self {
		let xsrf = XsrfProvider::new(
			transport.clone(),
			cache.clone(),
			classifier.clone(),
			endpoints.clone(),
		);

		Self { transport, cache, xsrf, classifier, endpoints }
	}

	/// The XSRF provider protection tokens are fetched through.
	pub fn xsrf(&self) -> &XsrfProvider<T> {
		&self.xsrf
	}

	/// Returns a usable bearer token for `scope`, fetching and caching a fresh record when the
	/// cache tiers hold none or only an expired one.
	///
	/// Concurrent acquisitions for the same scope are not coalesced; each caller runs the full
	/// check-then-fetch sequence and the last write wins.
	pub async fn acquire(&self, scope: &Scope) -> Result<String> {
		const KIND: FlowKind = FlowKind::TokenFetch;

		let span = FlowSpan::new(KIND, "acquire");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let now = OffsetDateTime::now_utc();

				if let Some(record) = self
					.cache
					.read_access_token(scope)
					.await?
					.filter(|record| record.is_usable_at(now))
				{
					return Ok(record.access_token.expose().to_owned());
				}

				let record = self.fetch_record(scope).await?;

				self.cache.write_access_token(scope.clone(), record.clone());

				Ok(record.access_token.expose().to_owned())
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Drops every cached access token and the persisted XSRF token.
	pub async fn reset_caches(&self) -> Result<(), StoreError> {
		self.cache.clear_access_tokens();
		self.cache.clear_xsrf().await
	}

	/// Applies a host session-change notification, dropping the scope caches on a user change.
	pub fn handle_session_change(&self, event: &SessionChangeEvent) {
		if event.is_user_change() {
			self.cache.clear_access_tokens();
		}
	}

	async fn fetch_record(&self, scope: &Scope) -> Result<AccessTokenRecord> {
		let xsrf_token = self.xsrf.acquire().await?;
		let url = self.classifier.resolve(self.endpoints.token_path())?;
		let mut request = WireRequest::new(Method::POST, url);
		let xsrf_value =
			HeaderValue::from_str(&xsrf_token).map_err(|e| ConfigError::InvalidHeader(e.into()))?;

		request.headers.insert(XSRF_TOKEN_HEADER, xsrf_value);
		request
			.headers
			.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-www-form-urlencoded"));

		// The endpoint expects the scope raw; percent-escaping would change its meaning.
		request.body = Some(format!("scope={}", scope.as_str()).into_bytes());

		let response = self.transport.execute(request).await.map_err(Error::auth_token_fetch)?;

		if !response.is_success() {
			return Err(Error::auth_token_fetch(FetchError::UnexpectedStatus {
				status: response.status.as_u16(),
			}));
		}

		let record = response.json::<AccessTokenRecord>().map_err(Error::auth_token_fetch)?;

		// Some deployments rotate the anti-forgery token on every exchange.
		if let Some(rotated) = response.header(&XSRF_TOKEN_HEADER) {
			self.cache.write_xsrf(rotated).await?;
		}

		Ok(record)
	}
}
impl<T> Debug for AccessTokenProvider<T>
where
	T: HttpTransport + ?Sized,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessTokenProvider")
			.field("transport", &"<dyn HttpTransport>")
			.field("cache", &self.cache)
			.field("xsrf", &self.xsrf)
			.field("classifier", &self.classifier)
			.field("endpoints", &self.endpoints)
			.finish()
	}
}

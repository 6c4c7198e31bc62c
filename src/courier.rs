//! Request augmentation and dispatch orchestration.

// crates.io
use http::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::Scope,
	cache::TokenCache,
	endpoints::TokenEndpoints,
	error::{ConfigError, FailureReport, FetchError},
	oauth::AccessTokenProvider,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	origin::{LocationSource, OriginClassifier},
	session::SessionListener,
	store::{MemoryVault, SessionTokenStore, TokenVault},
	transport::{HttpTransport, WireRequest, WireResponse},
	xsrf::{XSRF_TOKEN_HEADER, XsrfProvider},
};
#[cfg(feature = "reqwest")]
use crate::transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Courier specialized for the crate's default reqwest transport stack.
pub type ReqwestCourier = Courier<ReqwestTransport>;

/// Transient description of one outbound call before augmentation.
#[derive(Clone, Debug)]
pub struct PendingRequest {
	/// Target URL, absolute or path-only.
	pub url: String,
	/// Request method.
	pub method: Method,
	/// Caller-supplied headers; these always win over courier-added ones.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl PendingRequest {
	/// Builds a GET request for the given URL.
	pub fn new(url: impl Into<String>) -> Self {
		Self { url: url.into(), method: Method::GET, headers: HeaderMap::new(), body: None }
	}

	/// Replaces the request method.
	pub fn with_method(mut self, method: Method) -> Self {
		self.method = method;

		self
	}

	/// Adds a caller header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Attaches a request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}
}

/// Completion hooks mirroring a response/error event pair.
///
/// Observers run synchronously on the dispatching task right after the outcome is recorded;
/// keep them cheap.
pub trait RequestObserver
where
	Self: Send + Sync,
{
	/// Called after a dispatch resolves with a success status.
	fn on_response(&self, response: &WireResponse) {
		let _ = response;
	}

	/// Called when token acquisition or the dispatch itself fails.
	fn on_error(&self, error: &Error) {
		let _ = error;
	}
}

/// Builder assembling a [`Courier`] and its token plumbing.
pub struct CourierBuilder<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	location: Arc<dyn LocationSource>,
	vault: Option<Arc<dyn TokenVault>>,
	session_store: Option<Arc<dyn SessionTokenStore>>,
	endpoints: TokenEndpoints,
	scope: Scope,
	url: Option<String>,
	method: Method,
	headers: HeaderMap,
	body: Option<Vec<u8>>,
	default_headers: HeaderMap,
	auto: bool,
	observer: Option<Arc<dyn RequestObserver>>,
}
impl<T> CourierBuilder<T>
where
	T: ?Sized + HttpTransport,
{
	fn new(transport: Arc<T>, location: Arc<dyn LocationSource>) -> Self {
		Self {
			transport,
			location,
			vault: None,
			session_store: None,
			endpoints: TokenEndpoints::default(),
			scope: Scope::default(),
			url: None,
			method: Method::GET,
			headers: HeaderMap::new(),
			body: None,
			default_headers: HeaderMap::new(),
			auto: false,
			observer: None,
		}
	}

	/// Sets the configured request URL dispatched by `send` and `ready`.
	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.url = Some(url.into());

		self
	}

	/// Replaces the configured request method (GET by default).
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;

		self
	}

	/// Adds a caller header to the configured request.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Attaches a body to the configured request.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Adds a header merged into every dispatch whose caller headers leave it unset.
	pub fn default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.default_headers.insert(name, value);

		self
	}

	/// Sets the scope requested for bearer tokens (`*:*:*` by default).
	pub fn scope(mut self, scope: impl Into<Scope>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Enables auto-dispatch: the first `ready` call sends the configured request.
	pub fn auto(mut self, auto: bool) -> Self {
		self.auto = auto;

		self
	}

	/// Replaces the default in-memory vault backing the XSRF tier.
	pub fn vault(mut self, vault: Arc<dyn TokenVault>) -> Self {
		self.vault = Some(vault);

		self
	}

	/// Attaches a read-only session tier consulted on access token cache misses.
	pub fn session_store(mut self, store: Arc<dyn SessionTokenStore>) -> Self {
		self.session_store = Some(store);

		self
	}

	/// Replaces the default token endpoint paths.
	pub fn endpoints(mut self, endpoints: TokenEndpoints) -> Self {
		self.endpoints = endpoints;

		self
	}

	/// Registers completion hooks for dispatch outcomes.
	pub fn observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
		self.observer = Some(observer);

		self
	}

	/// Assembles the courier.
	pub fn build(self) -> Courier<T> {
		let vault = self.vault.unwrap_or_else(|| Arc::new(MemoryVault::default()));
		let mut cache = TokenCache::new(vault);

		if let Some(session) = self.session_store {
			cache = cache.with_session_store(session);
		}

		let cache = Arc::new(cache);
		let classifier = OriginClassifier::new(self.location);
		let tokens = AccessTokenProvider::new(
			self.transport.clone(),
			cache.clone(),
			classifier.clone(),
			self.endpoints,
		);

		Courier {
			transport: self.transport,
			classifier,
			cache,
			tokens,
			scope: self.scope,
			url: self.url,
			method: self.method,
			headers: self.headers,
			body: self.body,
			default_headers: self.default_headers,
			auto: self.auto,
			auto_dispatched: Mutex::new(false),
			observer: self.observer,
			last_response: RwLock::new(None),
			last_error: RwLock::new(None),
		}
	}
}

/// Same-origin-aware request courier.
///
/// A courier owns the token plumbing for one configured request shape: it classifies target URLs
/// against the current location, attaches the matching security header, merges configured default
/// headers, and dispatches over the injected transport. One-off requests go through
/// [`send_request`](Self::send_request); the configured request goes through [`send`](Self::send)
/// or, when `auto` is set, the first [`ready`](Self::ready) call.
pub struct Courier<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	classifier: OriginClassifier,
	cache: Arc<TokenCache>,
	tokens: AccessTokenProvider<T>,
	scope: Scope,
	url: Option<String>,
	method: Method,
	headers: HeaderMap,
	body: Option<Vec<u8>>,
	default_headers: HeaderMap,
	auto: bool,
	auto_dispatched: Mutex<bool>,
	observer: Option<Arc<dyn RequestObserver>>,
	last_response: RwLock<Option<WireResponse>>,
	last_error: RwLock<Option<FailureReport>>,
}
impl<T> Courier<T>
where
	T: ?Sized + HttpTransport,
{
	/// Starts a builder from a transport and a location source.
	pub fn builder(
		transport: impl Into<Arc<T>>,
		location: impl 'static + LocationSource,
	) -> CourierBuilder<T> {
		CourierBuilder::new(transport.into(), Arc::new(location))
	}

	/// The cache tiers shared by the courier and its providers.
	pub fn cache(&self) -> &TokenCache {
		&self.cache
	}

	/// Same-origin classifier backing the courier's header policy.
	pub fn classifier(&self) -> &OriginClassifier {
		&self.classifier
	}

	/// Provider for scope-keyed bearer tokens.
	pub fn token_provider(&self) -> &AccessTokenProvider<T> {
		&self.tokens
	}

	/// Provider for the anti-forgery token.
	pub fn xsrf_provider(&self) -> &XsrfProvider<T> {
		self.tokens.xsrf()
	}

	/// Scope requested for bearer tokens.
	pub fn scope(&self) -> &Scope {
		&self.scope
	}

	/// Cloneable handle for wiring the courier into a host's session-event source.
	pub fn session_listener(&self) -> SessionListener {
		SessionListener::new(self.cache.clone())
	}

	/// Most recent successful response, if any.
	pub fn last_response(&self) -> Option<WireResponse> {
		self.last_response.read().clone()
	}

	/// Snapshot of the most recent failure, if any. Cleared by the next successful dispatch.
	pub fn last_error(&self) -> Option<FailureReport> {
		self.last_error.read().clone()
	}

	/// Computes the full header set `request` would be dispatched with, fetching whichever
	/// security token the URL's origin calls for.
	///
	/// Relative URLs get the XSRF header; absolute URLs get a bearer `authorization` header for
	/// the courier's scope. A caller-supplied security header suppresses the corresponding token
	/// acquisition entirely. Configured default headers fill the remaining gaps.
	pub async fn headers_for(&self, request: &PendingRequest) -> Result<HeaderMap> {
		let mut headers = request.headers.clone();

		if self.classifier.is_relative_url(&request.url) {
			if !headers.contains_key(&XSRF_TOKEN_HEADER) {
				let token = self.xsrf_provider().acquire().await?;
				let value = HeaderValue::from_str(&token)
					.map_err(|e| ConfigError::InvalidHeader(e.into()))?;

				headers.insert(XSRF_TOKEN_HEADER, value);
			}
		} else if !headers.contains_key(AUTHORIZATION) {
			let token = self.tokens.acquire(&self.scope).await?;
			let value = HeaderValue::from_str(&format!("Bearer {token}"))
				.map_err(|e| ConfigError::InvalidHeader(e.into()))?;

			headers.insert(AUTHORIZATION, value);
		}

		for (name, value) in self.default_headers.iter() {
			if !headers.contains_key(name) {
				headers.insert(name.clone(), value.clone());
			}
		}

		Ok(headers)
	}

	/// Dispatches the configured request.
	pub async fn send(&self) -> Result<WireResponse> {
		let request = match self.configured_request() {
			Ok(request) => request,
			Err(e) => return Err(self.record_failure(e.into())),
		};

		self.send_request(request).await
	}

	/// Augments and dispatches a one-off request, recording the outcome.
	pub async fn send_request(&self, request: PendingRequest) -> Result<WireResponse> {
		const KIND: FlowKind = FlowKind::Dispatch;

		let span = FlowSpan::new(KIND, "send_request");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.dispatch(request)).await;

		match result {
			Ok(response) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);

				Ok(self.record_success(response))
			},
			Err(e) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);

				Err(self.record_failure(e))
			},
		}
	}

	/// Runs the auto-dispatch hook: sends the configured request once, when `auto` is enabled
	/// and a URL is configured.
	///
	/// Returns `Ok(None)` when nothing was dispatched. Later calls are no-ops even if the first
	/// dispatch failed; auto-dispatch fires at most once per courier.
	pub async fn ready(&self) -> Result<Option<WireResponse>> {
		if !self.auto || self.url.is_none() {
			return Ok(None);
		}

		{
			let mut dispatched = self.auto_dispatched.lock();

			if *dispatched {
				return Ok(None);
			}

			*dispatched = true;
		}

		self.send().await.map(Some)
	}

	fn configured_request(&self) -> Result<PendingRequest, ConfigError> {
		let url = self.url.clone().ok_or(ConfigError::MissingUrl)?;

		Ok(PendingRequest {
			url,
			method: self.method.clone(),
			headers: self.headers.clone(),
			body: self.body.clone(),
		})
	}

	async fn dispatch(&self, request: PendingRequest) -> Result<WireResponse> {
		let headers = self.headers_for(&request).await?;
		let url = self.classifier.resolve(&request.url)?;
		let mut wire = WireRequest::new(request.method, url);

		wire.headers = headers;
		wire.body = request.body;

		let response = self.transport.execute(wire).await.map_err(Error::request)?;

		if !response.is_success() {
			return Err(Error::request(FetchError::UnexpectedStatus {
				status: response.status.as_u16(),
			}));
		}

		Ok(response)
	}

	fn record_success(&self, response: WireResponse) -> WireResponse {
		*self.last_response.write() = Some(response.clone());
		*self.last_error.write() = None;

		if let Some(observer) = &self.observer {
			observer.on_response(&response);
		}

		response
	}

	fn record_failure(&self, error: Error) -> Error {
		*self.last_error.write() = Some(error.report());

		if let Some(observer) = &self.observer {
			observer.on_error(&error);
		}

		error
	}
}
#[cfg(feature = "reqwest")]
impl ReqwestCourier {
	/// Starts a builder backed by a fresh reqwest transport so callers do not need to pass an
	/// HTTP handle explicitly.
	pub fn reqwest_builder(
		location: impl 'static + LocationSource,
	) -> CourierBuilder<ReqwestTransport> {
		Self::builder(ReqwestTransport::default(), location)
	}
}
impl<T> Debug for Courier<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Courier")
			.field("location", &self.classifier.current_location())
			.field("scope", &self.scope)
			.field("url", &self.url)
			.field("auto", &self.auto)
			.finish()
	}
}

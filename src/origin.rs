//! Location modeling and the same-origin classifier driving header policy.

// self
use crate::{_prelude::*, error::ConfigError};

/// Scheme + host pair describing where the courier is running.
///
/// Mirrors the `protocol`/`host` split of a browser location: `scheme` accepts an optional
/// trailing colon and `host` may carry a port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLocation {
	scheme: String,
	host: String,
}
impl PageLocation {
	/// Builds a location from a scheme (with or without the trailing colon) and a host.
	pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
		let scheme = scheme.into().trim_end_matches(':').to_owned();

		Self { scheme, host: host.into() }
	}

	/// Scheme component, colon-free.
	pub fn scheme(&self) -> &str {
		&self.scheme
	}

	/// Host component, possibly carrying a port.
	pub fn host(&self) -> &str {
		&self.host
	}

	/// Renders the location as a base URL suitable for resolving references against.
	pub fn base_url(&self) -> Result<Url, ConfigError> {
		let rendered = format!("{}://{}/", self.scheme, self.host);

		Url::parse(&rendered)
			.map_err(|e| ConfigError::InvalidLocation { location: self.to_string(), source: e })
	}
}
impl Display for PageLocation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}://{}", self.scheme, self.host)
	}
}

/// Strategy yielding the current location on demand.
///
/// Hosts with a fixed origin implement this for free via [`PageLocation`]; hosts whose location
/// can move hand in a closure through [`location_fn`].
pub trait LocationSource
where
	Self: Send + Sync,
{
	/// Returns the location the courier should consider current.
	fn current_location(&self) -> PageLocation;
}
impl LocationSource for PageLocation {
	fn current_location(&self) -> PageLocation {
		self.clone()
	}
}
impl<L> LocationSource for Arc<L>
where
	L: ?Sized + LocationSource,
{
	fn current_location(&self) -> PageLocation {
		(**self).current_location()
	}
}

/// Adapts a closure into a [`LocationSource`].
pub fn location_fn<F>(f: F) -> impl LocationSource
where
	F: 'static + Fn() -> PageLocation + Send + Sync,
{
	FnSource(f)
}

struct FnSource<F>(F);
impl<F> LocationSource for FnSource<F>
where
	F: Fn() -> PageLocation + Send + Sync,
{
	fn current_location(&self) -> PageLocation {
		(self.0)()
	}
}

/// Decides whether a request URL targets the courier's own origin.
///
/// Path-only references always count as same-origin. Absolute URLs count when the hostname
/// matches case-insensitively and the ports agree: same-scheme pairs compare effective ports,
/// while http/https pairs stay same-origin as long as neither side carries a non-default port.
#[derive(Clone)]
pub struct OriginClassifier {
	location: Arc<dyn LocationSource>,
}
impl OriginClassifier {
	/// Creates a classifier reading the current location from the provided source.
	pub fn new(location: Arc<dyn LocationSource>) -> Self {
		Self { location }
	}

	/// Snapshot of the location the classifier currently considers its own.
	pub fn current_location(&self) -> PageLocation {
		self.location.current_location()
	}

	/// Base URL of the current location.
	pub fn base_url(&self) -> Result<Url, ConfigError> {
		self.current_location().base_url()
	}

	/// Resolves a request URL (absolute or path-only) against the current location.
	pub fn resolve(&self, url: &str) -> Result<Url, ConfigError> {
		let base = self.base_url()?;

		base.join(url).map_err(|e| ConfigError::InvalidUrl { url: url.to_owned(), source: e })
	}

	/// Returns `true` if `url` targets the courier's own origin.
	///
	/// A location that cannot form a base URL classifies nothing as same-origin; dispatching
	/// against such a location fails with a configuration error either way.
	pub fn is_relative_url(&self, url: &str) -> bool {
		let Ok(base) = self.base_url() else {
			return false;
		};
		let Ok(resolved) = base.join(url) else {
			return false;
		};

		same_origin(&resolved, &base)
	}
}
impl Debug for OriginClassifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OriginClassifier").field("location", &self.current_location()).finish()
	}
}

fn same_origin(target: &Url, base: &Url) -> bool {
	let (Some(target_host), Some(base_host)) = (target.host_str(), base.host_str()) else {
		return false;
	};

	if !target_host.eq_ignore_ascii_case(base_host) {
		return false;
	}
	if target.scheme() == base.scheme() {
		return target.port_or_known_default() == base.port_or_known_default();
	}

	// Cross-scheme pairs count as same-origin only in the http/https default pairing, where
	// neither side carries an explicit non-default port.
	matches!(target.scheme(), "http" | "https")
		&& matches!(base.scheme(), "http" | "https")
		&& target.port().is_none()
		&& base.port().is_none()
}

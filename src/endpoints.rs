//! Endpoint paths for the two token-issuing calls.

/// Paths of the XSRF and OAuth token endpoints, resolved against the current location at call
/// time.
///
/// Both endpoints live on the courier's own origin, so only paths are configurable here; the
/// scheme and host always come from the location source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenEndpoints {
	xsrf_path: String,
	token_path: String,
}
impl TokenEndpoints {
	/// Default path answering OAuth token fetches.
	pub const DEFAULT_TOKEN_PATH: &'static str = "/d2l/lp/auth/oauth2/token";
	/// Default path answering XSRF token fetches.
	pub const DEFAULT_XSRF_PATH: &'static str = "/d2l/lp/auth/xsrf-tokens";

	/// Builds an endpoint set from explicit paths.
	pub fn new(xsrf_path: impl Into<String>, token_path: impl Into<String>) -> Self {
		Self { xsrf_path: xsrf_path.into(), token_path: token_path.into() }
	}

	/// Path answering XSRF token fetches.
	pub fn xsrf_path(&self) -> &str {
		&self.xsrf_path
	}

	/// Path answering OAuth token fetches.
	pub fn token_path(&self) -> &str {
		&self.token_path
	}
}
impl Default for TokenEndpoints {
	fn default() -> Self {
		Self::new(Self::DEFAULT_XSRF_PATH, Self::DEFAULT_TOKEN_PATH)
	}
}

//! Courier-level error types shared across providers, stores, and dispatch.

// self
use crate::_prelude::*;

/// Courier-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical courier error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// XSRF token endpoint call did not produce a usable token.
	#[error("XSRF token fetch failed.")]
	XsrfFetch {
		/// Underlying fetch failure.
		#[source]
		source: FetchError,
	},
	/// OAuth token endpoint call did not produce a usable token.
	#[error("Auth token fetch failed.")]
	AuthTokenFetch {
		/// Underlying fetch failure.
		#[source]
		source: FetchError,
	},
	/// Augmented request itself failed after token acquisition succeeded.
	#[error("Request failed.")]
	Request {
		/// Underlying fetch failure.
		#[source]
		source: FetchError,
	},
}
impl Error {
	/// Wraps a fetch failure raised while calling the XSRF token endpoint.
	pub fn xsrf_fetch(source: impl Into<FetchError>) -> Self {
		Self::XsrfFetch { source: source.into() }
	}

	/// Wraps a fetch failure raised while calling the OAuth token endpoint.
	pub fn auth_token_fetch(source: impl Into<FetchError>) -> Self {
		Self::AuthTokenFetch { source: source.into() }
	}

	/// Wraps a fetch failure raised while dispatching the augmented request.
	pub fn request(source: impl Into<FetchError>) -> Self {
		Self::Request { source: source.into() }
	}

	/// Stage label identifying which courier operation failed.
	pub fn stage(&self) -> &'static str {
		match self {
			Self::Storage(_) => "storage",
			Self::Config(_) => "config",
			Self::XsrfFetch { .. } => "xsrf_fetch",
			Self::AuthTokenFetch { .. } => "auth_token_fetch",
			Self::Request { .. } => "request",
		}
	}

	/// HTTP status carried by the failure, when the endpoint answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::XsrfFetch { source }
			| Self::AuthTokenFetch { source }
			| Self::Request { source } => source.status(),
			_ => None,
		}
	}

	/// Captures an owned, cloneable snapshot of this error for later inspection.
	pub fn report(&self) -> FailureReport {
		FailureReport { stage: self.stage(), status: self.status(), message: message_chain(self) }
	}
}

/// Owned snapshot of a courier failure, retained after the originating error has been returned to
/// the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureReport {
	/// Stage label matching [`Error::stage`].
	pub stage: &'static str,
	/// HTTP status of the failed call, when the endpoint answered at all.
	pub status: Option<u16>,
	/// Rendered source chain of the originating error.
	pub message: String,
}
impl Display for FailureReport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}", self.message)?;

		if let Some(status) = self.status {
			write!(f, " (HTTP {status})")?;
		}

		Ok(())
	}
}

/// Configuration and validation failures raised by the courier.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Header name or value cannot be represented on the wire.
	#[error("Header name or value is invalid.")]
	InvalidHeader(#[from] http::Error),
	/// Current location does not form a valid base URL.
	#[error("Location `{location}` does not form a valid base URL.")]
	InvalidLocation {
		/// Rendered `scheme://host` pair that failed to parse.
		location: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request URL cannot be resolved against the current location.
	#[error("URL `{url}` cannot be resolved against the current location.")]
	InvalidUrl {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},

	/// Dispatch was requested but no request URL is configured.
	#[error("No request URL is configured.")]
	MissingUrl,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while calling a token endpoint or dispatching the augmented request.
#[derive(Debug, ThisError)]
pub enum FetchError {
	/// Endpoint answered with a non-success status.
	#[error("Endpoint returned HTTP {status}.")]
	UnexpectedStatus {
		/// HTTP status code of the response.
		status: u16,
	},
	/// Endpoint answered with a body that could not be parsed.
	#[error("Endpoint returned a malformed body.")]
	MalformedBody {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Underlying transport failed before a response was produced.
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl FetchError {
	/// HTTP status carried by the failure, when the endpoint answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::UnexpectedStatus { status } => Some(*status),
			Self::MalformedBody { status, .. } => *status,
			Self::Transport(_) => None,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while dispatching the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while dispatching the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

fn message_chain(error: &dyn StdError) -> String {
	let mut message = error.to_string();
	let mut source = error.source();

	while let Some(cause) = source {
		message.push_str(": ");
		message.push_str(&cause.to_string());

		source = cause.source();
	}

	message
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn report_captures_stage_status_and_chain() {
		let error = Error::auth_token_fetch(FetchError::UnexpectedStatus { status: 401 });
		let report = error.report();

		assert_eq!(report.stage, "auth_token_fetch");
		assert_eq!(report.status, Some(401));
		assert_eq!(report.message, "Auth token fetch failed.: Endpoint returned HTTP 401.");
		assert_eq!(
			report.to_string(),
			"Auth token fetch failed.: Endpoint returned HTTP 401. (HTTP 401)",
		);
	}

	#[test]
	fn transport_failures_carry_no_status() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let error = Error::request(TransportError::from(io));

		assert_eq!(error.stage(), "request");
		assert_eq!(error.status(), None);
	}
}

//! Access token records and the redacting secret wrapper.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Record describing one issued access token, exactly as the token endpoint reports it.
///
/// The serialized form matches the endpoint's JSON body: a raw `access_token` string plus an
/// epoch-second `expires_at` instant. The same shape is reused for cached copies, so a session
/// store can hand back endpoint bodies unmodified.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenRecord {
	/// Bearer secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Absolute expiry instant, serialized as epoch seconds.
	#[serde(with = "time::serde::timestamp")]
	pub expires_at: OffsetDateTime,
}
impl AccessTokenRecord {
	/// Builds a record from a raw token value and an absolute expiry instant.
	pub fn new(access_token: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { access_token: TokenSecret::new(access_token), expires_at }
	}

	/// Builds a record expiring `ttl` from now; handy for seeding caches.
	pub fn expiring_in(access_token: impl Into<String>, ttl: Duration) -> Self {
		Self::new(access_token, OffsetDateTime::now_utc() + ttl)
	}

	/// Returns `true` if the record has expired at the provided instant.
	///
	/// Expiry is a strict comparison against `expires_at`; no refresh window or jitter is applied.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` if the record is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the record can still satisfy a request at the provided instant.
	pub fn is_usable_at(&self, instant: OffsetDateTime) -> bool {
		!self.is_expired_at(instant)
	}

	/// Returns `true` if the record can still satisfy a request right now.
	pub fn is_usable(&self) -> bool {
		self.is_usable_at(OffsetDateTime::now_utc())
	}
}
impl Debug for AccessTokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessTokenRecord")
			.field("access_token", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn expiry_is_a_strict_boundary() {
		let record = AccessTokenRecord::new("access", macros::datetime!(2025-01-01 01:00 UTC));

		assert!(record.is_usable_at(macros::datetime!(2025-01-01 00:59 UTC)));
		assert!(record.is_expired_at(macros::datetime!(2025-01-01 01:00 UTC)));
		assert!(record.is_expired_at(macros::datetime!(2025-01-01 01:01 UTC)));
	}

	#[test]
	fn wire_form_uses_epoch_seconds() {
		let record =
			AccessTokenRecord::new("such access wow", macros::datetime!(2025-01-01 01:00 UTC));
		let json = serde_json::to_string(&record).expect("Record should serialize to JSON.");

		assert_eq!(json, r#"{"access_token":"such access wow","expires_at":1735693200}"#);

		let parsed: AccessTokenRecord =
			serde_json::from_str(&json).expect("Record JSON should parse back.");

		assert_eq!(parsed, record);
	}

	#[test]
	fn debug_redacts_the_secret_value() {
		let record = AccessTokenRecord::expiring_in("super-secret", Duration::hours(1));
		let rendered = format!("{record:?}");

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("super-secret"));
	}
}

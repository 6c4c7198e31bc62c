//! Scope modeling for the token provider's per-scope cache.

// std
use std::{borrow::Borrow, convert::Infallible};
// self
use crate::_prelude::*;

/// Opaque authorization scope forwarded verbatim to the token endpoint.
///
/// A scope is a cache key and wire payload at once: no normalization, splitting, or escaping is
/// applied, so the exact string handed in is the exact string sent and cached. Two scopes compare
/// equal only when their strings match byte for byte.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Scope(String);
impl Scope {
	/// Wildcard scope requested when a courier is built without an explicit one.
	pub const DEFAULT: &'static str = "*:*:*";

	/// Wraps a scope string without altering it.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the scope exactly as it will appear on the wire.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Default for Scope {
	fn default() -> Self {
		Self(Self::DEFAULT.into())
	}
}
impl Borrow<str> for Scope {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<&str> for Scope {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for Scope {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl FromStr for Scope {
	type Err = Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::new(s))
	}
}
impl Display for Scope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

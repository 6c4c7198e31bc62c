//! Rust's same-origin-savvy request courier - fetch, cache, and stitch XSRF plus OAuth bearer
//! headers onto outbound HTTP in one crate built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod courier;
pub mod endpoints;
pub mod error;
pub mod oauth;
pub mod obs;
pub mod origin;
pub mod session;
pub mod store;
pub mod transport;
pub mod xsrf;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		courier::{Courier, CourierBuilder},
		origin::PageLocation,
		transport::ReqwestTransport,
	};

	/// Courier type alias used by reqwest-backed integration tests.
	pub type ReqwestTestCourier = Courier<ReqwestTransport>;

	/// Builds a plain-HTTP page location pointing at a mock server's `host:port` address.
	pub fn test_location(host: impl Into<String>) -> PageLocation {
		PageLocation::new("http", host)
	}

	/// Starts a courier builder anchored at the mock server's origin, backed by the reqwest
	/// transport used across integration tests.
	pub fn reqwest_test_courier_builder(
		host: impl Into<String>,
	) -> CourierBuilder<ReqwestTransport> {
		Courier::builder(ReqwestTransport::default(), test_location(host))
	}

	/// Constructs a [`Courier`] with in-memory stores and default endpoints, anchored at the mock
	/// server's origin.
	pub fn build_reqwest_test_courier(host: impl Into<String>) -> ReqwestTestCourier {
		reqwest_test_courier_builder(host).build()
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};

//! Three-legged OAuth 1.0a login for Rust servers.
//!
//! Requests are signed with HMAC-SHA1, pending request tokens wait in a bounded LRU cache, and
//! OAuth 2.0 providers sit behind the same [`OAuthServiceProvider`](flows::OAuthServiceProvider)
//! trait. [`ProviderLoader`](config::ProviderLoader) builds a provider map from a JSON or TOML
//! document.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod provider;
pub mod signature;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		flows::{OAuth1Provider, OAuth2Provider},
		http::ReqwestHttpClient,
		provider::{OAuth1Config, OAuth2Config},
		store::TokenCache,
	};

	/// OAuth 1.0a provider type alias used by reqwest-backed integration tests.
	pub type ReqwestTestOAuth1Provider = OAuth1Provider<ReqwestHttpClient>;
	/// OAuth 2.0 provider type alias used by reqwest-backed integration tests.
	pub type ReqwestTestOAuth2Provider = OAuth2Provider<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`OAuth1Provider`] backed by a fresh token cache and the reqwest transport
	/// used across integration tests.
	pub fn build_reqwest_test_oauth1(
		config: OAuth1Config,
		capacity: usize,
		min_retention: Duration,
	) -> (ReqwestTestOAuth1Provider, Arc<TokenCache>) {
		let cache = Arc::new(TokenCache::new(capacity, min_retention));
		let provider =
			OAuth1Provider::with_transport(config, cache.clone(), test_reqwest_http_client());

		(provider, cache)
	}

	/// Constructs an [`OAuth2Provider`] backed by the reqwest transport used across
	/// integration tests.
	pub fn build_reqwest_test_oauth2(config: OAuth2Config) -> ReqwestTestOAuth2Provider {
		OAuth2Provider::with_transport(config, test_reqwest_http_client())
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

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};

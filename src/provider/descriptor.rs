//! Provider configuration consumed by the flows.
//!
//! Configs are validated once by their builders and never mutated afterwards; a flow owns
//! exactly one.

/// Builder API for assembling provider configs.
pub mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	auth::ProviderName,
	http::{HttpVerb, TransmissionMode},
};

/// Endpoint set of an OAuth 1.0a provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth1Endpoints {
	/// Page the browser is sent to with `?oauth_token=...`.
	pub authorization: Url,
	/// Request-token endpoint (first leg).
	pub request_token: Url,
	/// Access-token endpoint (verifier exchange).
	pub access_token: Url,
	/// User-info endpoint (last leg).
	pub user_info: Url,
}

/// Immutable OAuth 1.0a provider configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuth1Config {
	/// Upper-cased provider name.
	pub name: ProviderName,
	/// Consumer key sent as `oauth_consumer_key`.
	pub client_id: String,
	/// Consumer secret; only ever used as signing-key material.
	pub client_secret: String,
	/// Provider endpoints.
	pub endpoints: OAuth1Endpoints,
	/// Callback URL sent as `oauth_callback`.
	pub redirect: Url,
	/// Verb for the request-token and access-token legs.
	pub request_token_verb: HttpVerb,
	/// Verb for the user-info leg.
	pub user_info_verb: HttpVerb,
	/// Where signed parameters travel.
	pub transmission: TransmissionMode,
}
impl OAuth1Config {
	/// Creates a new builder for the provided provider name.
	pub fn builder(name: ProviderName) -> OAuth1ConfigBuilder {
		OAuth1ConfigBuilder::new(name)
	}
}
impl Debug for OAuth1Config {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth1Config")
			.field("name", &self.name)
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("endpoints", &self.endpoints)
			.field("redirect", &self.redirect.as_str())
			.field("request_token_verb", &self.request_token_verb)
			.field("user_info_verb", &self.user_info_verb)
			.field("transmission", &self.transmission)
			.finish()
	}
}

/// Endpoint set of an OAuth 2.0 provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Endpoints {
	/// Authorization endpoint.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// User-info endpoint called with the bearer token.
	pub user_info: Url,
}

/// Immutable OAuth 2.0 provider configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuth2Config {
	/// Upper-cased provider name.
	pub name: ProviderName,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: String,
	/// Provider endpoints.
	pub endpoints: OAuth2Endpoints,
	/// Redirect URI registered with the provider.
	pub redirect: Url,
	/// Scopes requested on the authorization URL.
	pub scopes: Vec<String>,
}
impl OAuth2Config {
	/// Creates a new builder for the provided provider name.
	pub fn builder(name: ProviderName) -> OAuth2ConfigBuilder {
		OAuth2ConfigBuilder::new(name)
	}
}
impl Debug for OAuth2Config {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Config")
			.field("name", &self.name)
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("endpoints", &self.endpoints)
			.field("redirect", &self.redirect.as_str())
			.field("scopes", &self.scopes)
			.finish()
	}
}

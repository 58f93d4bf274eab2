// self
use crate::{
	_prelude::*,
	auth::ProviderName,
	http::{HttpVerb, TransmissionMode},
	provider::{OAuth1Config, OAuth1Endpoints, OAuth2Config, OAuth2Endpoints},
};

/// Errors raised while constructing or validating provider configs.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderConfigError {
	/// The client identifier is empty or was never set.
	#[error("Missing client ID.")]
	MissingClientId,
	/// The client secret is empty or was never set.
	#[error("Missing client secret.")]
	MissingClientSecret,
	/// A required endpoint was never set.
	#[error("Missing {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint is missing.
		endpoint: &'static str,
	},
	/// The redirect URL was never set.
	#[error("Missing redirect URL.")]
	MissingRedirect,
	/// Endpoints must be HTTP(S) URLs.
	#[error("The {endpoint} endpoint must use http or https: {url}.")]
	UnsupportedScheme {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Builder for [`OAuth1Config`] values.
#[derive(Debug)]
pub struct OAuth1ConfigBuilder {
	/// Provider name for the config being constructed.
	pub name: ProviderName,
	/// Consumer key.
	pub client_id: Option<String>,
	/// Consumer secret.
	pub client_secret: Option<String>,
	/// Authorization page.
	pub authorization_endpoint: Option<Url>,
	/// Request-token endpoint.
	pub request_token_endpoint: Option<Url>,
	/// Access-token endpoint.
	pub access_token_endpoint: Option<Url>,
	/// User-info endpoint.
	pub user_info_endpoint: Option<Url>,
	/// Callback URL.
	pub redirect: Option<Url>,
	/// Verb for the token legs.
	pub request_token_verb: HttpVerb,
	/// Verb for the user-info leg.
	pub user_info_verb: HttpVerb,
	/// Parameter transmission mode.
	pub transmission: TransmissionMode,
}
impl OAuth1ConfigBuilder {
	/// Creates a new builder seeded with the provided name and protocol defaults
	/// (`POST` token legs, `GET` user info, header transmission).
	pub fn new(name: ProviderName) -> Self {
		Self {
			name,
			client_id: None,
			client_secret: None,
			authorization_endpoint: None,
			request_token_endpoint: None,
			access_token_endpoint: None,
			user_info_endpoint: None,
			redirect: None,
			request_token_verb: HttpVerb::Post,
			user_info_verb: HttpVerb::Get,
			transmission: TransmissionMode::Header,
		}
	}

	/// Sets the consumer key and secret.
	pub fn client(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
		self.client_id = Some(id.into());
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets the authorization page.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the request-token endpoint.
	pub fn request_token_endpoint(mut self, url: Url) -> Self {
		self.request_token_endpoint = Some(url);

		self
	}

	/// Sets the access-token endpoint.
	pub fn access_token_endpoint(mut self, url: Url) -> Self {
		self.access_token_endpoint = Some(url);

		self
	}

	/// Sets the user-info endpoint.
	pub fn user_info_endpoint(mut self, url: Url) -> Self {
		self.user_info_endpoint = Some(url);

		self
	}

	/// Sets the callback URL.
	pub fn redirect_url(mut self, url: Url) -> Self {
		self.redirect = Some(url);

		self
	}

	/// Overrides the verb used for the request-token and access-token legs.
	pub fn request_token_verb(mut self, verb: HttpVerb) -> Self {
		self.request_token_verb = verb;

		self
	}

	/// Overrides the verb used for the user-info leg.
	pub fn user_info_verb(mut self, verb: HttpVerb) -> Self {
		self.user_info_verb = verb;

		self
	}

	/// Overrides the parameter transmission mode.
	pub fn transmission(mut self, mode: TransmissionMode) -> Self {
		self.transmission = mode;

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<OAuth1Config, ProviderConfigError> {
		let (client_id, client_secret) = client_credentials(self.client_id, self.client_secret)?;
		let endpoints = OAuth1Endpoints {
			authorization: required("authorization", self.authorization_endpoint)?,
			request_token: required("request_token", self.request_token_endpoint)?,
			access_token: required("access_token", self.access_token_endpoint)?,
			user_info: required("user_info", self.user_info_endpoint)?,
		};
		let redirect = self.redirect.ok_or(ProviderConfigError::MissingRedirect)?;

		validate_endpoint("redirect", &redirect)?;

		Ok(OAuth1Config {
			name: self.name,
			client_id,
			client_secret,
			endpoints,
			redirect,
			request_token_verb: self.request_token_verb,
			user_info_verb: self.user_info_verb,
			transmission: self.transmission,
		})
	}
}

/// Builder for [`OAuth2Config`] values.
#[derive(Debug)]
pub struct OAuth2ConfigBuilder {
	/// Provider name for the config being constructed.
	pub name: ProviderName,
	/// Client identifier.
	pub client_id: Option<String>,
	/// Client secret.
	pub client_secret: Option<String>,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint.
	pub token_endpoint: Option<Url>,
	/// User-info endpoint.
	pub user_info_endpoint: Option<Url>,
	/// Redirect URI.
	pub redirect: Option<Url>,
	/// Requested scopes.
	pub scopes: Vec<String>,
}
impl OAuth2ConfigBuilder {
	/// Creates a new builder seeded with the provided name.
	pub fn new(name: ProviderName) -> Self {
		Self {
			name,
			client_id: None,
			client_secret: None,
			authorization_endpoint: None,
			token_endpoint: None,
			user_info_endpoint: None,
			redirect: None,
			scopes: Vec::new(),
		}
	}

	/// Sets the client identifier and secret.
	pub fn client(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
		self.client_id = Some(id.into());
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the user-info endpoint.
	pub fn user_info_endpoint(mut self, url: Url) -> Self {
		self.user_info_endpoint = Some(url);

		self
	}

	/// Sets the redirect URI.
	pub fn redirect_url(mut self, url: Url) -> Self {
		self.redirect = Some(url);

		self
	}

	/// Appends requested scopes.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.extend(scopes.into_iter().map(Into::into));

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<OAuth2Config, ProviderConfigError> {
		let (client_id, client_secret) = client_credentials(self.client_id, self.client_secret)?;
		let endpoints = OAuth2Endpoints {
			authorization: required("authorization", self.authorization_endpoint)?,
			token: required("token", self.token_endpoint)?,
			user_info: required("user_info", self.user_info_endpoint)?,
		};
		let redirect = self.redirect.ok_or(ProviderConfigError::MissingRedirect)?;

		validate_endpoint("redirect", &redirect)?;

		Ok(OAuth2Config {
			name: self.name,
			client_id,
			client_secret,
			endpoints,
			redirect,
			scopes: self.scopes,
		})
	}
}

fn client_credentials(
	id: Option<String>,
	secret: Option<String>,
) -> Result<(String, String), ProviderConfigError> {
	let id = id.filter(|v| !v.is_empty()).ok_or(ProviderConfigError::MissingClientId)?;
	let secret = secret.filter(|v| !v.is_empty()).ok_or(ProviderConfigError::MissingClientSecret)?;

	Ok((id, secret))
}

fn required(endpoint: &'static str, url: Option<Url>) -> Result<Url, ProviderConfigError> {
	let url = url.ok_or(ProviderConfigError::MissingEndpoint { endpoint })?;

	validate_endpoint(endpoint, &url)?;

	Ok(url)
}

fn validate_endpoint(endpoint: &'static str, url: &Url) -> Result<(), ProviderConfigError> {
	match url.scheme() {
		"http" | "https" => Ok(()),
		_ => Err(ProviderConfigError::UnsupportedScheme { endpoint, url: url.to_string() }),
	}
}

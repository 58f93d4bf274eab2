//! OAuth 2.0 authorization-code delegate.
//!
//! The redirect carries a self-validating [`state`] flag instead of server-side session
//! data; the callback verifies it, exchanges the code through the `oauth2` crate over the
//! provider's [`HttpTransport`], and fetches the user-info document with the bearer token.

pub mod state;

pub use state::*;

// crates.io
use oauth2::{
	AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{OAuthVersion, ProviderName, UserData},
	error::{ConfigError, ProtocolError, TransportError},
	flows::{
		FlowFuture, OAuthServiceProvider,
		common::{self, CallbackParams},
	},
	http::{self, HttpTransport, TransportClient},
	obs::{FlowKind, FlowSpan},
	provider::{DefaultUserInfoStrategy, OAuth2Config, UserInfoStrategy},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

const CODE_PARAM: &str = "code";
const STATE_PARAM: &str = "state";

#[cfg(feature = "reqwest")]
/// OAuth 2.0 provider specialized for the crate's default reqwest transport.
pub type ReqwestOAuth2Provider = OAuth2Provider<ReqwestHttpClient>;

/// OAuth 2.0 authorization-code provider.
pub struct OAuth2Provider<T>
where
	T: ?Sized + HttpTransport,
{
	config: OAuth2Config,
	oauth_client: ConfiguredBasicClient,
	http_client: TransportClient<T>,
	transport: Arc<T>,
	strategy: Arc<dyn UserInfoStrategy>,
	state_max_age: Duration,
}
impl<T> OAuth2Provider<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a provider that sends the code exchange and user-info call through the
	/// caller-provided transport.
	pub fn with_transport(config: OAuth2Config, transport: impl Into<Arc<T>>) -> Self {
		let transport = transport.into();
		let oauth_client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.clone()))
			.set_auth_uri(AuthUrl::from_url(config.endpoints.authorization.clone()))
			.set_token_uri(TokenUrl::from_url(config.endpoints.token.clone()))
			.set_redirect_uri(RedirectUrl::from_url(config.redirect.clone()));

		Self {
			config,
			oauth_client,
			http_client: TransportClient::new(transport.clone()),
			transport,
			strategy: Arc::new(DefaultUserInfoStrategy),
			state_max_age: STATE_MAX_AGE,
		}
	}

	/// Replaces the user-info normalizer.
	pub fn with_strategy(mut self, strategy: Arc<dyn UserInfoStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Overrides how old a `state` flag may be (defaults to five minutes).
	pub fn with_state_max_age(mut self, max_age: Duration) -> Self {
		self.state_max_age = max_age;

		self
	}

	/// Provider configuration.
	pub fn config(&self) -> &OAuth2Config {
		&self.config
	}

	/// Builds the authorization URL with scopes and a `state` flag stamped with `now`.
	pub fn authorization_url_at(&self, now: OffsetDateTime) -> Url {
		let flag = encode_state(&self.config.name, now);
		let (url, _) = self
			.oauth_client
			.authorize_url(|| CsrfToken::new(flag))
			.add_scopes(self.config.scopes.iter().cloned().map(Scope::new))
			.url();

		url
	}

	/// Exchanges an authorization code for a token response.
	pub async fn exchange_code(&self, code: &str) -> Result<BasicTokenResponse> {
		let span = FlowSpan::new(FlowKind::OAuth2, "exchange_code", &self.config.name);

		span.instrument(
			self.oauth_client
				.exchange_code(AuthorizationCode::new(code.to_owned()))
				.request_async(&self.http_client),
		)
		.await
		.map_err(map_request_error)
	}

	/// Fetches and normalizes the user-info document for a bearer token.
	pub async fn fetch_user(&self, token: &BasicTokenResponse) -> Result<UserData> {
		let access_token = token.access_token().secret();
		let token_type: &str = token.token_type().as_ref();
		let request = http::bearer_request(&self.config.endpoints.user_info, access_token)?;
		let response = FlowSpan::new(FlowKind::OAuth2, "user_info", &self.config.name)
			.instrument(self.transport.execute(request))
			.await?;
		let data = common::parse_user_info(&http::success_body(response)?)?;

		Ok(self.strategy.to_user_data(&data).stamped(
			&self.config.name,
			OAuthVersion::V2,
			access_token.as_str(),
			token_type,
		))
	}

	/// Completes a login from the callback parameters, judging the flag's age against `now`.
	///
	/// Missing codes and invalid flags fail before any network call.
	pub async fn complete_at(
		&self,
		params: &CallbackParams,
		now: OffsetDateTime,
	) -> Result<UserData> {
		let code = params.require(CODE_PARAM)?;

		validate_state(
			params.get(STATE_PARAM).unwrap_or_default(),
			&self.config.name,
			now,
			self.state_max_age,
		)?;

		let token = self.exchange_code(code).await?;

		self.fetch_user(&token).await
	}
}
#[cfg(feature = "reqwest")]
impl OAuth2Provider<ReqwestHttpClient> {
	/// Creates a provider backed by a default reqwest client.
	pub fn new(config: OAuth2Config) -> Self {
		Self::with_transport(config, ReqwestHttpClient::default())
	}
}
impl<T> OAuthServiceProvider for OAuth2Provider<T>
where
	T: ?Sized + HttpTransport,
{
	fn provider_name(&self) -> &ProviderName {
		&self.config.name
	}

	fn oauth_version(&self) -> OAuthVersion {
		OAuthVersion::V2
	}

	fn redirect_url(&self) -> FlowFuture<'_, Url> {
		Box::pin(common::observe(FlowKind::OAuth2, "redirect_url", &self.config.name, async {
			Ok(self.authorization_url_at(OffsetDateTime::now_utc()))
		}))
	}

	fn process_response<'a>(&'a self, params: &'a CallbackParams) -> FlowFuture<'a, UserData> {
		Box::pin(common::observe(
			FlowKind::OAuth2,
			"process_response",
			&self.config.name,
			self.complete_at(params, OffsetDateTime::now_utc()),
		))
	}
}
impl<T> Debug for OAuth2Provider<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Provider")
			.field("config", &self.config)
			.field("state_max_age", &self.state_max_age)
			.finish()
	}
}

fn map_request_error(err: BasicRequestTokenError<HttpClientError<TransportError>>) -> Error {
	match err {
		RequestTokenError::ServerResponse(response) => {
			let reason = response
				.error_description()
				.cloned()
				.unwrap_or_else(|| response.error().as_ref().to_string());

			ProtocolError::ProviderRejected { reason }.into()
		},
		RequestTokenError::Request(HttpClientError::Reqwest(inner)) => Error::Transport(*inner),
		RequestTokenError::Request(HttpClientError::Http(inner)) => ConfigError::from(inner).into(),
		RequestTokenError::Request(HttpClientError::Io(inner)) => TransportError::Io(inner).into(),
		RequestTokenError::Request(HttpClientError::Other(message)) =>
			TransportError::Network { source: message.into() }.into(),
		RequestTokenError::Request(_) =>
			TransportError::Network { source: "unknown HTTP client failure".into() }.into(),
		RequestTokenError::Parse(source, _body) => ProtocolError::TokenResponseParse { source }.into(),
		RequestTokenError::Other(reason) => ProtocolError::ProviderRejected { reason }.into(),
	}
}

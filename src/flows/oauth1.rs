//! Three-legged OAuth 1.0a flow.
//!
//! 1. [`redirect_url`](OAuthServiceProvider::redirect_url) signs a request-token call with the
//!    consumer secret alone, caches the returned pair in the shared [`TokenCache`], and
//!    returns `<authorization URL>?oauth_token=<token>`.
//! 2. [`process_response`](OAuthServiceProvider::process_response) reads `oauth_token` and
//!    `oauth_verifier` from the callback, recovers the request-token secret from the cache,
//!    exchanges the verifier for an access token, and fetches the user-info document signed
//!    with the access-token secret.
//!
//! Each leg signs and transmits its own parameter set in its own order; see [`Leg`].

// self
use crate::{
	_prelude::*,
	auth::{ACCESS_TOKEN_TYPE, OAuthVersion, ProviderName, Token, UserData},
	flows::{
		FlowFuture, OAuthServiceProvider,
		common::{self, CallbackParams},
	},
	http::{self, HttpTransport, HttpVerb},
	obs::{FlowKind, FlowSpan},
	provider::{DefaultUserInfoStrategy, OAuth1Config, UserInfoStrategy},
	signature::{
		self, OAUTH_CALLBACK, OAUTH_CONSUMER_KEY, OAUTH_NONCE, OAUTH_SIGNATURE,
		OAUTH_SIGNATURE_METHOD, OAUTH_TIMESTAMP, OAUTH_TOKEN, OAUTH_VERIFIER, OAUTH_VERSION,
		OAuthParams,
	},
	store::TokenCache,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// OAuth 1.0a provider specialized for the crate's default reqwest transport.
pub type ReqwestOAuth1Provider = OAuth1Provider<ReqwestHttpClient>;

/// Signed parameter layout of one protocol leg.
///
/// `signed` is the order parameters enter the signature base string; `sent` is the order
/// they are transmitted in (header or query), `oauth_signature` included. Both modes send
/// the same set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Leg {
	/// Stage label used in spans.
	pub stage: &'static str,
	/// Base-string order.
	pub signed: &'static [&'static str],
	/// Transmission order.
	pub sent: &'static [&'static str],
}

/// Request-token leg: signed with `consumer_secret&`.
pub const REQUEST_TOKEN_LEG: Leg = Leg {
	stage: "request_token",
	signed: &[
		OAUTH_CALLBACK,
		OAUTH_CONSUMER_KEY,
		OAUTH_NONCE,
		OAUTH_SIGNATURE_METHOD,
		OAUTH_TIMESTAMP,
		OAUTH_VERSION,
	],
	sent: &[
		OAUTH_NONCE,
		OAUTH_SIGNATURE,
		OAUTH_CALLBACK,
		OAUTH_CONSUMER_KEY,
		OAUTH_TIMESTAMP,
		OAUTH_SIGNATURE_METHOD,
		OAUTH_VERSION,
	],
};
/// Access-token leg: signed with `consumer_secret&request_token_secret`.
pub const ACCESS_TOKEN_LEG: Leg = Leg {
	stage: "access_token",
	signed: &[
		OAUTH_CONSUMER_KEY,
		OAUTH_NONCE,
		OAUTH_SIGNATURE_METHOD,
		OAUTH_TIMESTAMP,
		OAUTH_TOKEN,
		OAUTH_VERIFIER,
		OAUTH_VERSION,
	],
	sent: &[
		OAUTH_VERIFIER,
		OAUTH_NONCE,
		OAUTH_SIGNATURE,
		OAUTH_TOKEN,
		OAUTH_CONSUMER_KEY,
		OAUTH_TIMESTAMP,
		OAUTH_SIGNATURE_METHOD,
		OAUTH_VERSION,
	],
};
/// User-info leg: signed with `consumer_secret&access_token_secret`.
pub const USER_INFO_LEG: Leg = Leg {
	stage: "user_info",
	signed: &[
		OAUTH_CONSUMER_KEY,
		OAUTH_NONCE,
		OAUTH_SIGNATURE_METHOD,
		OAUTH_TIMESTAMP,
		OAUTH_TOKEN,
		OAUTH_VERSION,
	],
	sent: &[
		OAUTH_CONSUMER_KEY,
		OAUTH_NONCE,
		OAUTH_SIGNATURE,
		OAUTH_SIGNATURE_METHOD,
		OAUTH_TIMESTAMP,
		OAUTH_TOKEN,
		OAUTH_VERSION,
	],
};

/// OAuth 1.0a flow controller for one provider.
///
/// The controller owns its immutable [`OAuth1Config`] and shares the pending-token cache
/// with every other OAuth 1.0a provider of the same server. It holds no per-login state of
/// its own, so one instance serves concurrent logins.
pub struct OAuth1Provider<T>
where
	T: ?Sized + HttpTransport,
{
	config: OAuth1Config,
	cache: Arc<TokenCache>,
	transport: Arc<T>,
	strategy: Arc<dyn UserInfoStrategy>,
}
impl<T> OAuth1Provider<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a controller that sends every leg through the caller-provided transport.
	pub fn with_transport(
		config: OAuth1Config,
		cache: Arc<TokenCache>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			config,
			cache,
			transport: transport.into(),
			strategy: Arc::new(DefaultUserInfoStrategy),
		}
	}

	/// Replaces the user-info normalizer.
	pub fn with_strategy(mut self, strategy: Arc<dyn UserInfoStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Provider configuration.
	pub fn config(&self) -> &OAuth1Config {
		&self.config
	}

	/// Shared pending-token cache.
	pub fn cache(&self) -> &Arc<TokenCache> {
		&self.cache
	}

	/// Runs the request-token leg and returns the unconfirmed pair.
	pub async fn request_token(&self) -> Result<Token> {
		let params = OAuthParams::new(&self.config.client_id)
			.with(OAUTH_CALLBACK, self.config.redirect.as_str());
		let body = self
			.signed_call(
				&REQUEST_TOKEN_LEG,
				self.config.request_token_verb,
				&self.config.endpoints.request_token,
				params,
				None,
			)
			.await?;

		Ok(common::parse_token_response(&body)?)
	}

	/// Obtains a request token, caches it, and builds the authorization redirect.
	pub async fn authorization_url(&self) -> Result<Url> {
		let token = self.request_token().await?;
		let mut url = self.config.endpoints.authorization.clone();

		url.query_pairs_mut().append_pair(OAUTH_TOKEN, &token.token);
		self.cache.put(token)?;

		Ok(url)
	}

	/// Exchanges a confirmed request token and its verifier for an access token.
	///
	/// The access-token leg reuses the request-token verb.
	pub async fn exchange_verifier(&self, request_token: &Token, verifier: &str) -> Result<Token> {
		let params = OAuthParams::new(&self.config.client_id)
			.with(OAUTH_TOKEN, request_token.token.as_str())
			.with(OAUTH_VERIFIER, verifier);
		let body = self
			.signed_call(
				&ACCESS_TOKEN_LEG,
				self.config.request_token_verb,
				&self.config.endpoints.access_token,
				params,
				Some(request_token.secret.expose()),
			)
			.await?;

		Ok(common::parse_token_response(&body)?)
	}

	/// Fetches the user-info document with an access token and normalizes it.
	pub async fn fetch_user(&self, access_token: &Token) -> Result<UserData> {
		let params =
			OAuthParams::new(&self.config.client_id).with(OAUTH_TOKEN, access_token.token.as_str());
		let body = self
			.signed_call(
				&USER_INFO_LEG,
				self.config.user_info_verb,
				&self.config.endpoints.user_info,
				params,
				Some(access_token.secret.expose()),
			)
			.await?;
		let data = common::parse_user_info(&body)?;

		Ok(self.strategy.to_user_data(&data).stamped(
			&self.config.name,
			OAuthVersion::V1,
			access_token.token.as_str(),
			ACCESS_TOKEN_TYPE,
		))
	}

	/// Completes a login from the callback parameters.
	///
	/// Missing parameters and unknown tokens fail before any network call. The cached entry is
	/// left in place; it ages out through normal eviction.
	pub async fn complete(&self, params: &CallbackParams) -> Result<UserData> {
		let token = params.require(OAUTH_TOKEN)?;
		let verifier = params.require(OAUTH_VERIFIER)?;
		let pending = self.cache.get(token)?.token;
		let access = self.exchange_verifier(&pending, verifier).await?;

		self.fetch_user(&access).await
	}

	async fn signed_call(
		&self,
		leg: &Leg,
		verb: HttpVerb,
		url: &Url,
		params: OAuthParams,
		token_secret: Option<&str>,
	) -> Result<Vec<u8>> {
		let signature = signature::sign_request(
			verb.as_str(),
			url.as_str(),
			&params.ordered(leg.signed),
			&self.config.client_secret,
			token_secret,
		);
		let params = params.with(OAUTH_SIGNATURE, signature);
		let request =
			http::signed_request(verb, url, &params.ordered(leg.sent), self.config.transmission)?;
		let response = FlowSpan::new(FlowKind::OAuth1, leg.stage, &self.config.name)
			.instrument(self.transport.execute(request))
			.await?;

		Ok(http::success_body(response)?)
	}
}
#[cfg(feature = "reqwest")]
impl OAuth1Provider<ReqwestHttpClient> {
	/// Creates a controller backed by a default reqwest client.
	pub fn new(config: OAuth1Config, cache: Arc<TokenCache>) -> Self {
		Self::with_transport(config, cache, ReqwestHttpClient::default())
	}
}
impl<T> OAuthServiceProvider for OAuth1Provider<T>
where
	T: ?Sized + HttpTransport,
{
	fn provider_name(&self) -> &ProviderName {
		&self.config.name
	}

	fn oauth_version(&self) -> OAuthVersion {
		OAuthVersion::V1
	}

	fn redirect_url(&self) -> FlowFuture<'_, Url> {
		Box::pin(common::observe(
			FlowKind::OAuth1,
			"redirect_url",
			&self.config.name,
			self.authorization_url(),
		))
	}

	fn process_response<'a>(&'a self, params: &'a CallbackParams) -> FlowFuture<'a, UserData> {
		Box::pin(common::observe(
			FlowKind::OAuth1,
			"process_response",
			&self.config.name,
			self.complete(params),
		))
	}
}
impl<T> Debug for OAuth1Provider<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth1Provider")
			.field("config", &self.config)
			.field("cache", &self.cache)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::header::AUTHORIZATION;
	use percent_encoding::percent_decode_str;
	// self
	use super::*;
	use crate::{
		error::TransportError,
		http::{
			TransmissionMode,
			testing::{Seen, ScriptedTransport},
		},
		store::CacheError,
	};

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Flow test URL should parse.")
	}

	fn config(mode: TransmissionMode) -> OAuth1Config {
		OAuth1Config::builder(
			ProviderName::new("twitter").expect("Provider name fixture should be valid."),
		)
		.client("consumer-key", "consumer-secret")
		.authorization_endpoint(url("https://api.example.com/oauth/authorize"))
		.request_token_endpoint(url("https://api.example.com/oauth/request_token"))
		.access_token_endpoint(url("https://api.example.com/oauth/access_token"))
		.user_info_endpoint(url("https://api.example.com/1.1/account/verify_credentials.json"))
		.redirect_url(url("https://app.example.com/oauth/twitter/callback"))
		.transmission(mode)
		.build()
		.expect("Flow test config should validate.")
	}

	fn provider(
		mode: TransmissionMode,
		transport: &Arc<ScriptedTransport>,
	) -> OAuth1Provider<ScriptedTransport> {
		let cache = Arc::new(TokenCache::new(16, Duration::minutes(10)));

		OAuth1Provider::with_transport(config(mode), cache, transport.clone())
	}

	fn header_params(request: &Seen) -> Vec<(String, String)> {
		let header = request
			.headers
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.expect("Signed requests should carry an Authorization header.");
		let pairs = header.strip_prefix("OAuth ").expect("Header should use the OAuth scheme.");

		pairs
			.split(", ")
			.map(|pair| {
				let (key, value) = pair.split_once('=').expect("Header pairs should contain `=`.");
				let value = value.trim_matches('"');

				(
					key.to_owned(),
					percent_decode_str(value)
						.decode_utf8()
						.expect("Header values should be UTF-8.")
						.into_owned(),
				)
			})
			.collect()
	}

	fn value<'a>(params: &'a [(String, String)], key: &str) -> &'a str {
		params
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v.as_str())
			.unwrap_or_else(|| panic!("Missing `{key}` parameter."))
	}

	fn keys(params: &[(String, String)]) -> Vec<&str> {
		params.iter().map(|(k, _)| k.as_str()).collect()
	}

	fn expected_signature(
		leg: &Leg,
		verb: &str,
		url: &str,
		params: &[(String, String)],
		token_secret: Option<&str>,
	) -> String {
		let ordered: Vec<(&str, &str)> =
			leg.signed.iter().map(|key| (*key, value(params, key))).collect();

		signature::sign_request(verb, url, &ordered, "consumer-secret", token_secret)
	}

	#[tokio::test]
	async fn redirect_caches_the_request_token() {
		let transport =
			ScriptedTransport::replying(&[(200, "oauth_token=req-1&oauth_token_secret=req-secret")]);
		let provider = provider(TransmissionMode::Header, &transport);
		let redirect =
			provider.redirect_url().await.expect("Request-token leg should produce a redirect.");

		assert_eq!(redirect.as_str(), "https://api.example.com/oauth/authorize?oauth_token=req-1");

		let pending = provider.cache().get("req-1").expect("Request token should be cached.");

		assert_eq!(pending.token.secret.expose(), "req-secret");

		let request = transport.request(0);
		let params = header_params(&request);

		assert_eq!(request.method, "POST");
		assert_eq!(keys(&params), REQUEST_TOKEN_LEG.sent);
		assert_eq!(
			value(&params, OAUTH_SIGNATURE),
			expected_signature(
				&REQUEST_TOKEN_LEG,
				"POST",
				"https://api.example.com/oauth/request_token",
				&params,
				None,
			)
		);
	}

	#[tokio::test]
	async fn callback_signs_each_leg_with_the_right_secret() {
		let transport = ScriptedTransport::replying(&[
			(200, "oauth_token=req-1&oauth_token_secret=req-secret"),
			(200, "oauth_token=acc-1&oauth_token_secret=acc-secret&user_id=42"),
			(200, r#"{"id":42,"name":"Ada Lovelace","screen_name":"ada"}"#),
		]);
		let provider = provider(TransmissionMode::Header, &transport);

		provider.redirect_url().await.expect("Request-token leg should succeed.");

		let callback = CallbackParams::from_query("oauth_token=req-1&oauth_verifier=ver-1");
		let user =
			provider.process_response(&callback).await.expect("Callback should complete the login.");

		assert_eq!(transport.request_count(), 3);
		assert_eq!(user.user_id, "42");
		assert_eq!(user.screen_name, "ada");
		assert_eq!(user.oauth_provider.as_deref(), Some("TWITTER"));
		assert_eq!(user.oauth_version, Some(OAuthVersion::V1));
		assert_eq!(user.oauth_token, "acc-1");
		assert_eq!(user.oauth_token_type, "Access Token");

		let access = header_params(&transport.request(1));

		assert_eq!(keys(&access), ACCESS_TOKEN_LEG.sent);
		assert_eq!(value(&access, OAUTH_TOKEN), "req-1");
		assert_eq!(value(&access, OAUTH_VERIFIER), "ver-1");
		assert_eq!(
			value(&access, OAUTH_SIGNATURE),
			expected_signature(
				&ACCESS_TOKEN_LEG,
				"POST",
				"https://api.example.com/oauth/access_token",
				&access,
				Some("req-secret"),
			)
		);

		let user_info_request = transport.request(2);
		let user_info = header_params(&user_info_request);

		assert_eq!(user_info_request.method, "GET");
		assert_eq!(
			user_info_request.uri,
			"https://api.example.com/1.1/account/verify_credentials.json"
		);
		assert_eq!(keys(&user_info), USER_INFO_LEG.sent);
		assert_eq!(value(&user_info, OAUTH_TOKEN), "acc-1");
		assert_eq!(
			value(&user_info, OAUTH_SIGNATURE),
			expected_signature(
				&USER_INFO_LEG,
				"GET",
				"https://api.example.com/1.1/account/verify_credentials.json",
				&user_info,
				Some("acc-secret"),
			)
		);
	}

	#[tokio::test]
	async fn query_mode_sends_parameters_without_secrets() {
		let transport =
			ScriptedTransport::replying(&[(200, "oauth_token=req-1&oauth_token_secret=req-secret")]);
		let provider = provider(TransmissionMode::Query, &transport);

		provider.redirect_url().await.expect("Request-token leg should succeed.");

		let request = transport.request(0);

		assert!(request.headers.get(AUTHORIZATION).is_none());

		let body = String::from_utf8(request.body).expect("Form body should be UTF-8.");
		let sent: Vec<&str> =
			body.split('&').filter_map(|pair| pair.split_once('=').map(|(k, _)| k)).collect();

		assert_eq!(sent, REQUEST_TOKEN_LEG.sent);
		assert!(!body.contains("consumer-secret"));
	}

	#[tokio::test]
	async fn missing_verifier_fails_without_network_calls() {
		let transport = ScriptedTransport::replying(&[]);
		let provider = provider(TransmissionMode::Header, &transport);
		let err = provider
			.process_response(&CallbackParams::from_query("oauth_token=req-1"))
			.await
			.expect_err("Callbacks without a verifier must fail.");

		assert!(err.to_string().contains("oauth_verifier"));
		assert_eq!(transport.request_count(), 0);
	}

	#[tokio::test]
	async fn unknown_tokens_are_cache_misses() {
		let transport = ScriptedTransport::replying(&[]);
		let provider = provider(TransmissionMode::Header, &transport);
		let err = provider
			.process_response(&CallbackParams::from_query("oauth_token=ghost&oauth_verifier=v"))
			.await
			.expect_err("Unknown tokens must fail.");

		assert!(matches!(err, Error::Cache(CacheError::NotFound { ref token }) if token == "ghost"));
		assert_eq!(transport.request_count(), 0);
	}

	#[tokio::test]
	async fn rejected_request_tokens_surface_the_status_and_body() {
		let transport = ScriptedTransport::replying(&[(401, "Invalid consumer key")]);
		let provider = provider(TransmissionMode::Header, &transport);
		let err = provider.redirect_url().await.expect_err("401 responses must fail.");

		assert!(matches!(
			err,
			Error::Transport(TransportError::Status { status: 401, ref body })
				if body == "Invalid consumer key"
		));
		assert!(provider.cache().is_empty());
	}
}

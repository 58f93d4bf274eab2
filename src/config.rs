//! Declarative provider loading.
//!
//! A provider document maps provider names to entries with PascalCase keys:
//!
//! ```json
//! {
//!   "Twitter": {
//!     "OAuthVersion": 1.0,
//!     "AuthURL": "https://api.twitter.com/oauth/authorize",
//!     "RequestTokenURL": "https://api.twitter.com/oauth/request_token",
//!     "TokenURL": "https://api.twitter.com/oauth/access_token",
//!     "UserInfoURL": "https://api.twitter.com/1.1/account/verify_credentials.json"
//!   }
//! }
//! ```
//!
//! For OAuth 1.0a entries `TokenURL` is the access-token endpoint. Missing `ClientID` and
//! `ClientSecret` values are read from `<PROVIDER>_CLIENT_ID` / `<PROVIDER>_CLIENT_SECRET`
//! through an injectable lookup. Every `{provider}` in the callback template is replaced by
//! the lower-cased provider name.

// std
use std::{fs, io::Read, path::Path};
// self
use crate::{
	_prelude::*,
	auth::{OAuthVersion, ProviderName},
	error::ConfigError,
	flows::{OAuth1Provider, OAuth2Provider, OAuthServiceProvider},
	http::{HttpTransport, HttpVerb, TransmissionMode},
	provider::{OAuth1Config, OAuth2Config},
	store::TokenCache,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Placeholder replaced by the lower-cased provider name in callback templates.
pub const PROVIDER_PLACEHOLDER: &str = "{provider}";

/// Providers keyed by lower-cased name.
pub type ProviderMap = BTreeMap<String, Arc<dyn OAuthServiceProvider>>;

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Parsed provider document.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ProviderDocument(pub BTreeMap<String, ProviderEntry>);

/// One provider entry as written in a document.
#[derive(Clone, Default, PartialEq, Deserialize)]
pub struct ProviderEntry {
	/// `1.0` or `2.0`.
	#[serde(rename = "OAuthVersion")]
	pub oauth_version: Option<VersionSetting>,
	/// Client identifier; falls back to `<PROVIDER>_CLIENT_ID`.
	#[serde(rename = "ClientID")]
	pub client_id: Option<String>,
	/// Client secret; falls back to `<PROVIDER>_CLIENT_SECRET`.
	#[serde(rename = "ClientSecret")]
	pub client_secret: Option<String>,
	/// Authorization page.
	#[serde(rename = "AuthURL")]
	pub auth_url: Option<String>,
	/// OAuth 2.0 token endpoint, or the OAuth 1.0a access-token endpoint.
	#[serde(rename = "TokenURL")]
	pub token_url: Option<String>,
	/// User-info endpoint.
	#[serde(rename = "UserInfoURL")]
	pub user_info_url: Option<String>,
	/// OAuth 1.0a request-token endpoint.
	#[serde(rename = "RequestTokenURL")]
	pub request_token_url: Option<String>,
	/// OAuth 1.0a token-leg verb (`GET`/`POST`, default `POST`).
	#[serde(rename = "RequestTokenVerb")]
	pub request_token_verb: Option<String>,
	/// OAuth 1.0a user-info verb (`GET`/`POST`, default `GET`).
	#[serde(rename = "UserInfoVerb")]
	pub user_info_verb: Option<String>,
	/// OAuth 1.0a transmission: `1`/`"header"` or `2`/`"query"`.
	#[serde(rename = "AuthTransmissionType")]
	pub transmission: Option<TransmissionSetting>,
	/// OAuth 2.0 scopes.
	#[serde(rename = "Scopes", default)]
	pub scopes: Vec<String>,
}
impl Debug for ProviderEntry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderEntry")
			.field("oauth_version", &self.oauth_version)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("auth_url", &self.auth_url)
			.field("token_url", &self.token_url)
			.field("user_info_url", &self.user_info_url)
			.field("request_token_url", &self.request_token_url)
			.finish_non_exhaustive()
	}
}

/// `OAuthVersion` as a number (`2.0`) or a string (`"2.0"`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VersionSetting {
	/// Numeric form.
	Number(f64),
	/// String form.
	Text(String),
}
impl VersionSetting {
	/// Renders the version with one decimal (`2` → `2.0`).
	pub fn label(&self) -> String {
		match self {
			VersionSetting::Number(n) => format!("{n:.1}"),
			VersionSetting::Text(s) => s
				.trim()
				.parse::<f64>()
				.map(|n| format!("{n:.1}"))
				.unwrap_or_else(|_| s.trim().to_owned()),
		}
	}
}

/// `AuthTransmissionType` as a numeric code or a name.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TransmissionSetting {
	/// `1` header, `2` query.
	Code(i64),
	/// `header` or `query`, case-insensitive.
	Name(String),
}
impl TransmissionSetting {
	fn resolve(&self) -> Option<TransmissionMode> {
		match self {
			TransmissionSetting::Code(1) => Some(TransmissionMode::Header),
			TransmissionSetting::Code(2) => Some(TransmissionMode::Query),
			TransmissionSetting::Code(_) => None,
			TransmissionSetting::Name(name) if name.eq_ignore_ascii_case("header") =>
				Some(TransmissionMode::Header),
			TransmissionSetting::Name(name) if name.eq_ignore_ascii_case("query") =>
				Some(TransmissionMode::Query),
			TransmissionSetting::Name(_) => None,
		}
	}

	fn render(&self) -> String {
		match self {
			TransmissionSetting::Code(code) => code.to_string(),
			TransmissionSetting::Name(name) => name.clone(),
		}
	}
}

/// A validated config ready to be turned into a flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedProvider {
	/// OAuth 1.0a provider.
	OAuth1(OAuth1Config),
	/// OAuth 2.0 provider.
	OAuth2(OAuth2Config),
}
impl ResolvedProvider {
	/// Provider name.
	pub fn name(&self) -> &ProviderName {
		match self {
			ResolvedProvider::OAuth1(config) => &config.name,
			ResolvedProvider::OAuth2(config) => &config.name,
		}
	}

	/// Protocol generation.
	pub fn oauth_version(&self) -> OAuthVersion {
		match self {
			ResolvedProvider::OAuth1(_) => OAuthVersion::V1,
			ResolvedProvider::OAuth2(_) => OAuthVersion::V2,
		}
	}
}

/// Builds providers from documents.
///
/// Every OAuth 1.0a provider produced by one loader shares its [`TokenCache`], and every
/// provider shares its transport.
pub struct ProviderLoader<T>
where
	T: ?Sized + HttpTransport,
{
	callback_template: String,
	cache: Arc<TokenCache>,
	transport: Arc<T>,
	env: EnvLookup,
}
impl<T> ProviderLoader<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a loader reading fallback credentials from the process environment.
	pub fn new(
		callback_template: impl Into<String>,
		cache: Arc<TokenCache>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			callback_template: callback_template.into(),
			cache,
			transport: transport.into(),
			env: Box::new(|key| std::env::var(key).ok()),
		}
	}

	/// Replaces the environment lookup used for missing client credentials.
	pub fn with_env<F>(mut self, lookup: F) -> Self
	where
		F: 'static + Fn(&str) -> Option<String> + Send + Sync,
	{
		self.env = Box::new(lookup);

		self
	}

	/// Loads providers from a JSON document.
	pub fn from_json(&self, reader: impl Read) -> Result<ProviderMap> {
		let mut deserializer = serde_json::Deserializer::from_reader(reader);
		let document: ProviderDocument =
			serde_path_to_error::deserialize(&mut deserializer).map_err(ConfigError::from)?;

		self.load(document)
	}

	/// Loads providers from a TOML document.
	pub fn from_toml(&self, document: &str) -> Result<ProviderMap> {
		let document: ProviderDocument = toml::from_str(document).map_err(ConfigError::from)?;

		self.load(document)
	}

	/// Loads providers from a YAML document.
	pub fn from_yaml(&self, reader: impl Read) -> Result<ProviderMap> {
		let document: ProviderDocument =
			serde_path_to_error::deserialize(serde_yaml::Deserializer::from_reader(reader))
				.map_err(ConfigError::from)?;

		self.load(document)
	}

	/// Loads providers from a file, picking the format from its extension.
	///
	/// `.yaml`/`.yml` and `.toml` files use those formats; anything else is read as JSON.
	pub fn from_path(&self, path: impl AsRef<Path>) -> Result<ProviderMap> {
		let path = path.as_ref();
		let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);

		match extension.as_deref() {
			Some("yaml" | "yml") => self.from_yaml(fs::File::open(path).map_err(ConfigError::from)?),
			Some("toml") => self.from_toml(&fs::read_to_string(path).map_err(ConfigError::from)?),
			_ => self.from_json(fs::File::open(path).map_err(ConfigError::from)?),
		}
	}

	/// Resolves and instantiates every entry of a parsed document.
	///
	/// The first invalid entry aborts the load.
	pub fn load(&self, document: ProviderDocument) -> Result<ProviderMap> {
		let mut providers = ProviderMap::new();

		for (key, entry) in document.0 {
			let resolved = self.resolve(&key, entry)?;

			providers.insert(resolved.name().to_lowercase(), self.instantiate(resolved));
		}

		Ok(providers)
	}

	/// Validates one entry without instantiating a flow.
	pub fn resolve(&self, key: &str, mut entry: ProviderEntry) -> Result<ResolvedProvider> {
		let name = ProviderName::new(key).map_err(|e| ConfigError::InvalidValue {
			provider: key.to_owned(),
			field: "provider name",
			value: e.to_string(),
		})?;
		let client_id = self
			.credential(entry.client_id.take(), &format!("{}_CLIENT_ID", name.as_ref()))
			.ok_or_else(|| ConfigError::MissingClientId { provider: key.to_owned() })?;
		let client_secret = self
			.credential(entry.client_secret.take(), &format!("{}_CLIENT_SECRET", name.as_ref()))
			.ok_or_else(|| ConfigError::MissingClientSecret { provider: key.to_owned() })?;
		let version = entry
			.oauth_version
			.as_ref()
			.ok_or_else(|| ConfigError::MissingOAuthVersion { provider: key.to_owned() })?
			.label();
		let redirect = Url::parse(
			&self.callback_template.replace(PROVIDER_PLACEHOLDER, &name.to_lowercase()),
		)
		.map_err(|source| ConfigError::InvalidCallback { provider: key.to_owned(), source })?;

		match version.as_str() {
			"1.0" => {
				let mut builder = OAuth1Config::builder(name)
					.client(client_id, client_secret)
					.redirect_url(redirect);

				builder.authorization_endpoint = parse_url(key, "AuthURL", entry.auth_url)?;
				builder.request_token_endpoint =
					parse_url(key, "RequestTokenURL", entry.request_token_url)?;
				builder.access_token_endpoint = parse_url(key, "TokenURL", entry.token_url)?;
				builder.user_info_endpoint = parse_url(key, "UserInfoURL", entry.user_info_url)?;

				if let Some(verb) = entry.request_token_verb {
					builder = builder.request_token_verb(parse_verb(key, "RequestTokenVerb", verb)?);
				}
				if let Some(verb) = entry.user_info_verb {
					builder = builder.user_info_verb(parse_verb(key, "UserInfoVerb", verb)?);
				}
				if let Some(setting) = entry.transmission {
					let mode = setting.resolve().ok_or_else(|| ConfigError::InvalidValue {
						provider: key.to_owned(),
						field: "AuthTransmissionType",
						value: setting.render(),
					})?;

					builder = builder.transmission(mode);
				}

				Ok(ResolvedProvider::OAuth1(builder.build().map_err(ConfigError::from)?))
			},
			"2.0" => {
				let mut builder = OAuth2Config::builder(name)
					.client(client_id, client_secret)
					.redirect_url(redirect)
					.scopes(entry.scopes);

				builder.authorization_endpoint = parse_url(key, "AuthURL", entry.auth_url)?;
				builder.token_endpoint = parse_url(key, "TokenURL", entry.token_url)?;
				builder.user_info_endpoint = parse_url(key, "UserInfoURL", entry.user_info_url)?;

				Ok(ResolvedProvider::OAuth2(builder.build().map_err(ConfigError::from)?))
			},
			_ => Err(ConfigError::UnsupportedOAuthVersion { provider: key.to_owned(), version }
				.into()),
		}
	}

	/// Turns a resolved config into a flow sharing this loader's cache and transport.
	pub fn instantiate(&self, resolved: ResolvedProvider) -> Arc<dyn OAuthServiceProvider> {
		match resolved {
			ResolvedProvider::OAuth1(config) => Arc::new(OAuth1Provider::<T>::with_transport(
				config,
				self.cache.clone(),
				self.transport.clone(),
			)),
			ResolvedProvider::OAuth2(config) =>
				Arc::new(OAuth2Provider::<T>::with_transport(config, self.transport.clone())),
		}
	}

	fn credential(&self, value: Option<String>, env_key: &str) -> Option<String> {
		value.filter(|v| !v.is_empty()).or_else(|| (self.env)(env_key)).filter(|v| !v.is_empty())
	}
}
#[cfg(feature = "reqwest")]
impl ProviderLoader<ReqwestHttpClient> {
	/// Creates a loader backed by a default reqwest client.
	pub fn with_default_transport(
		callback_template: impl Into<String>,
		cache: Arc<TokenCache>,
	) -> Self {
		Self::new(callback_template, cache, ReqwestHttpClient::default())
	}
}
impl<T> Debug for ProviderLoader<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderLoader")
			.field("callback_template", &self.callback_template)
			.field("cache", &self.cache)
			.finish_non_exhaustive()
	}
}

fn parse_url(provider: &str, field: &'static str, value: Option<String>) -> Result<Option<Url>> {
	value
		.map(|raw| {
			Url::parse(&raw).map_err(|source| {
				ConfigError::InvalidUrl { provider: provider.to_owned(), field, source }.into()
			})
		})
		.transpose()
}

fn parse_verb(provider: &str, field: &'static str, value: String) -> Result<HttpVerb> {
	value.parse::<HttpVerb>().map_err(|value| {
		ConfigError::InvalidValue { provider: provider.to_owned(), field, value }.into()
	})
}

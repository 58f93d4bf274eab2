//! Crate-level error types shared across flows, providers, the cache, and the loader.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Pending-token cache failure (miss or no room).
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::store::CacheError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Provider or browser sent something the protocol does not allow.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	/// Transport failure (DNS, TCP, TLS) or a non-2xx provider response.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Configuration and validation failures raised while assembling providers.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider configuration failed validation.
	#[error(transparent)]
	Provider(#[from] crate::provider::ProviderConfigError),
	/// A configured URL cannot be parsed.
	#[error("Provider `{provider}` has an invalid {field}.")]
	InvalidUrl {
		/// Provider key from the document.
		provider: String,
		/// Document field holding the URL.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// No client identifier in the document or the environment.
	#[error("No client ID could be found for the provider `{provider}`.")]
	MissingClientId {
		/// Provider key from the document.
		provider: String,
	},
	/// No client secret in the document or the environment.
	#[error("No client secret could be found for the provider `{provider}`.")]
	MissingClientSecret {
		/// Provider key from the document.
		provider: String,
	},
	/// The document entry omits `OAuthVersion`.
	#[error("No OAuth version found for provider `{provider}`.")]
	MissingOAuthVersion {
		/// Provider key from the document.
		provider: String,
	},
	/// The document entry names a version other than 1.0 or 2.0.
	#[error("Invalid OAuth version {version} for provider `{provider}`.")]
	UnsupportedOAuthVersion {
		/// Provider key from the document.
		provider: String,
		/// Version as written in the document, formatted with one decimal.
		version: String,
	},
	/// The document entry names an unknown verb or transmission mode.
	#[error("Provider `{provider}` has an invalid {field}: {value}.")]
	InvalidValue {
		/// Provider key from the document.
		provider: String,
		/// Document field holding the value.
		field: &'static str,
		/// Offending value.
		value: String,
	},
	/// The callback template is not a valid URL once the provider name is substituted.
	#[error("Callback template produced an invalid redirect URL for `{provider}`.")]
	InvalidCallback {
		/// Provider key from the document.
		provider: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The JSON provider document could not be parsed.
	#[error("Provider document is not valid JSON.")]
	JsonDocument(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// The YAML provider document could not be parsed.
	#[error("Provider document is not valid YAML.")]
	YamlDocument(#[from] serde_path_to_error::Error<serde_yaml::Error>),
	/// The TOML provider document could not be parsed.
	#[error("Provider document is not valid TOML.")]
	TomlDocument(#[from] toml::de::Error),
	/// The provider document could not be read.
	#[error("Provider document could not be read.")]
	Io(#[from] std::io::Error),
}

/// Protocol-level failures: a flow step received something it cannot continue from.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
	/// The browser callback lacks a required parameter.
	#[error("Invalid request: missing {name} parameter.")]
	MissingCallbackParameter {
		/// Parameter name (`oauth_token`, `oauth_verifier`, `code`).
		name: &'static str,
	},
	/// A token endpoint response omitted a field or left it empty.
	#[error("Token endpoint response is missing {field}.")]
	MissingTokenField {
		/// Missing field name.
		field: &'static str,
	},
	/// A token endpoint response body is not UTF-8 form data.
	#[error("Token endpoint returned a malformed response.")]
	MalformedTokenResponse {
		/// Underlying decoding failure.
		#[source]
		source: std::str::Utf8Error,
	},
	/// The OAuth 2.0 `state` flag failed validation.
	#[error("Could not validate state flag: {reason}.")]
	InvalidState {
		/// Why the flag was rejected.
		reason: String,
	},
	/// The OAuth 2.0 token endpoint answered with an OAuth error payload.
	#[error("Provider rejected the grant: {reason}.")]
	ProviderRejected {
		/// Provider-supplied error code or description.
		reason: String,
	},
	/// The OAuth 2.0 token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The user-info endpoint returned something other than a JSON object.
	#[error("User info endpoint returned malformed JSON.")]
	UserInfoParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Transport-level failures (network, IO, non-2xx status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// The provider answered with a non-2xx status; the body is kept verbatim.
	#[error("Provider responded with HTTP {status}: {body}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Raw response body (lossy UTF-8).
		body: String,
	},
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

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::CacheError;

	#[test]
	fn cache_error_converts_with_source() {
		let cache_error = CacheError::NotFound { token: "abc".into() };
		let error: Error = cache_error.clone().into();

		assert!(matches!(error, Error::Cache(CacheError::NotFound { .. })));
		assert!(error.to_string().contains("abc"));

		let source = StdError::source(&error).expect("Cache errors should expose their source.");

		assert_eq!(source.to_string(), cache_error.to_string());
	}

	#[test]
	fn document_failures_are_config_errors() {
		let error: Error =
			ConfigError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).into();

		assert!(matches!(error, Error::Config(ConfigError::Io(_))));
		assert_eq!(error.to_string(), "Provider document could not be read.");
	}

	#[test]
	fn status_errors_keep_the_provider_body() {
		let error: Error =
			TransportError::Status { status: 401, body: "Invalid signature".into() }.into();

		assert!(error.to_string().contains("401"));
		assert!(error.to_string().contains("Invalid signature"));
	}
}

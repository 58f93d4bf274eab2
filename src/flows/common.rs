//! Shared helpers for flow implementations (callback parsing, response decoding, spans).

// crates.io
use serde_json::{Map, Value};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::Token,
	error::ProtocolError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	signature::{OAUTH_TOKEN, OAUTH_TOKEN_SECRET},
};

/// Query or form parameters the browser sent to the callback URL.
///
/// When a key repeats, the first value wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams(BTreeMap<String, String>);
impl CallbackParams {
	/// Parses an `application/x-www-form-urlencoded` string (a query without the leading `?`).
	pub fn from_query(query: &str) -> Self {
		form_urlencoded::parse(query.as_bytes()).into_owned().collect()
	}

	/// Parses the query component of a callback URL.
	pub fn from_url(url: &Url) -> Self {
		Self::from_query(url.query().unwrap_or_default())
	}

	/// Returns a parameter value.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Adds a parameter unless it is already present.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.0.entry(key.into()).or_insert_with(|| value.into());
	}

	/// Returns a non-empty parameter or the matching missing-parameter error.
	pub fn require(&self, name: &'static str) -> Result<&str, ProtocolError> {
		self.get(name)
			.filter(|value| !value.is_empty())
			.ok_or(ProtocolError::MissingCallbackParameter { name })
	}
}
impl<K, V> FromIterator<(K, V)> for CallbackParams
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		let mut params = Self::default();

		for (key, value) in iter {
			params.insert(key, value);
		}

		params
	}
}

/// Decodes an OAuth 1.0a token endpoint body (`oauth_token=...&oauth_token_secret=...`).
///
/// Both fields must be present and non-empty.
pub fn parse_token_response(body: &[u8]) -> Result<Token, ProtocolError> {
	let text =
		std::str::from_utf8(body).map_err(|source| ProtocolError::MalformedTokenResponse { source })?;
	let fields = CallbackParams::from_query(text.trim());
	let field = |name: &'static str| {
		fields
			.get(name)
			.filter(|value| !value.is_empty())
			.map(str::to_owned)
			.ok_or(ProtocolError::MissingTokenField { field: name })
	};

	Ok(Token::new(field(OAUTH_TOKEN)?, field(OAUTH_TOKEN_SECRET)?))
}

/// Decodes a user-info body into a JSON object, keeping the failing path on error.
pub fn parse_user_info(body: &[u8]) -> Result<Map<String, Value>, ProtocolError> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ProtocolError::UserInfoParse { source })
}

/// Runs one provider call inside a flow span and records its attempt and outcome.
pub(crate) async fn observe<T, Fut>(
	kind: FlowKind,
	stage: &'static str,
	provider: &str,
	fut: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage, provider);

	obs::record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
		Err(_) => obs::record_flow_outcome(kind, FlowOutcome::Failure),
	}

	result
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn callback_params_keep_the_first_value() {
		let params = CallbackParams::from_query("oauth_token=a%20b&oauth_verifier=v&oauth_token=c");

		assert_eq!(params.get("oauth_token"), Some("a b"));
		assert!(matches!(params.require("oauth_verifier"), Ok("v")));

		let empty = CallbackParams::from_query("oauth_verifier=");

		assert!(matches!(
			empty.require("oauth_verifier"),
			Err(ProtocolError::MissingCallbackParameter { name: "oauth_verifier" })
		));
	}

	#[test]
	fn callback_params_read_url_queries() {
		let url = Url::parse("https://app.example.com/cb?code=xyz&state=abc")
			.expect("Callback fixture URL should parse.");
		let params = CallbackParams::from_url(&url);

		assert_eq!(params.get("code"), Some("xyz"));
		assert_eq!(params.get("state"), Some("abc"));
		assert!(CallbackParams::from_query("").get("code").is_none());
	}

	#[test]
	fn token_responses_require_both_fields() {
		let token = parse_token_response(
			b"oauth_token=req-1&oauth_token_secret=s%2B1&oauth_callback_confirmed=true\n",
		)
		.expect("Complete token response should parse.");

		assert_eq!(token.token, "req-1");
		assert_eq!(token.secret.expose(), "s+1");
		assert!(matches!(
			parse_token_response(b"oauth_token=req-1"),
			Err(ProtocolError::MissingTokenField { field: "oauth_token_secret" })
		));
		assert!(matches!(
			parse_token_response(b"oauth_token=&oauth_token_secret=s"),
			Err(ProtocolError::MissingTokenField { field: "oauth_token" })
		));
		assert!(matches!(
			parse_token_response(&[0xff, 0xfe]),
			Err(ProtocolError::MalformedTokenResponse { .. })
		));
	}

	#[test]
	fn user_info_must_be_an_object() {
		let map = parse_user_info(br#"{"id":1,"name":"Ada"}"#).expect("Object bodies should parse.");

		assert_eq!(map.get("name").and_then(Value::as_str), Some("Ada"));
		assert!(matches!(
			parse_user_info(b"[1,2]"),
			Err(ProtocolError::UserInfoParse { .. })
		));
	}
}

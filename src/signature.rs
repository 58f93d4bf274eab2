//! OAuth 1.0a signature engine (RFC 5849 §3.4, HMAC-SHA1).
//!
//! Everything here is pure: the same verb, URL, ordered parameters, and secrets always
//! produce the same signature. Parameter order is a caller contract. Each protocol leg
//! signs a different subset in a fixed order, so the engine never sorts or filters; see
//! [`OAuthParams::ordered`] for the projection the flows use.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::{Rng, distr::Alphanumeric};
use sha1::Sha1;
// self
use crate::_prelude::*;

type HmacSha1 = Hmac<Sha1>;

/// `oauth_callback` parameter name.
pub const OAUTH_CALLBACK: &str = "oauth_callback";
/// `oauth_consumer_key` parameter name.
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
/// `oauth_nonce` parameter name.
pub const OAUTH_NONCE: &str = "oauth_nonce";
/// `oauth_signature` parameter name.
pub const OAUTH_SIGNATURE: &str = "oauth_signature";
/// `oauth_signature_method` parameter name.
pub const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";
/// `oauth_timestamp` parameter name.
pub const OAUTH_TIMESTAMP: &str = "oauth_timestamp";
/// `oauth_token` parameter name.
pub const OAUTH_TOKEN: &str = "oauth_token";
/// `oauth_token_secret` parameter name (token endpoint responses only).
pub const OAUTH_TOKEN_SECRET: &str = "oauth_token_secret";
/// `oauth_verifier` parameter name.
pub const OAUTH_VERIFIER: &str = "oauth_verifier";
/// `oauth_version` parameter name.
pub const OAUTH_VERSION: &str = "oauth_version";

/// The only signature method this engine produces.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
/// Protocol version sent in `oauth_version`.
pub const PROTOCOL_VERSION: &str = "1.0";

// RFC 3986 unreserved characters stay literal; everything else is `%XX`.
const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');
const NONCE_RANDOM_LEN: usize = 16;

/// Percent-encodes `input` with the OAuth unreserved set (uppercase hex, `%20` for spaces).
pub fn percent_encode(input: &str) -> String {
	utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

/// Builds the signature base string `VERB&enc(url)&enc(k1=v1&k2=v2...)`.
///
/// Pairs are encoded individually and joined in the order supplied.
pub fn base_string(verb: &str, url: &str, params: &[(&str, &str)]) -> String {
	let mut joined = String::new();

	for (idx, (key, value)) in params.iter().enumerate() {
		if idx > 0 {
			joined.push('&');
		}

		joined.push_str(&percent_encode(key));
		joined.push('=');
		joined.push_str(&percent_encode(value));
	}

	format!("{}&{}&{}", verb.to_ascii_uppercase(), percent_encode(url), percent_encode(&joined))
}

/// Signs a base string with `enc(client_secret)&enc(token_secret)` and returns the base64
/// HMAC-SHA1 digest.
pub fn sign(base_string: &str, client_secret: &str, token_secret: Option<&str>) -> String {
	let key = signing_key(client_secret, token_secret);
	let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");

	mac.update(base_string.as_bytes());

	STANDARD.encode(mac.finalize().into_bytes())
}

/// Convenience wrapper that builds the base string and signs it in one call.
pub fn sign_request(
	verb: &str,
	url: &str,
	params: &[(&str, &str)],
	client_secret: &str,
	token_secret: Option<&str>,
) -> String {
	sign(&base_string(verb, url, params), client_secret, token_secret)
}

fn signing_key(client_secret: &str, token_secret: Option<&str>) -> String {
	let mut key = percent_encode(client_secret);

	key.push('&');

	if let Some(secret) = token_secret {
		key.push_str(&percent_encode(secret));
	}

	key
}

/// Per-request OAuth protocol parameters.
///
/// [`OAuthParams::new`] fills the standard set (consumer key, nonce, signature method,
/// timestamp, version); flows add the callback, token, verifier, and finally the signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OAuthParams(BTreeMap<&'static str, String>);
impl OAuthParams {
	/// Creates the standard parameter set stamped with the current clock and a fresh nonce.
	pub fn new(consumer_key: impl Into<String>) -> Self {
		let now = OffsetDateTime::now_utc();

		Self::at(consumer_key, now, generate_nonce(now))
	}

	/// Creates the standard parameter set with a caller-supplied instant and nonce.
	pub fn at(consumer_key: impl Into<String>, now: OffsetDateTime, nonce: String) -> Self {
		let mut map = BTreeMap::new();

		map.insert(OAUTH_CONSUMER_KEY, consumer_key.into());
		map.insert(OAUTH_NONCE, nonce);
		map.insert(OAUTH_SIGNATURE_METHOD, SIGNATURE_METHOD.into());
		map.insert(OAUTH_TIMESTAMP, now.unix_timestamp().to_string());
		map.insert(OAUTH_VERSION, PROTOCOL_VERSION.into());

		Self(map)
	}

	/// Adds or replaces a parameter.
	pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
		self.insert(key, value);

		self
	}

	/// Adds or replaces a parameter in place.
	pub fn insert(&mut self, key: &'static str, value: impl Into<String>) {
		self.0.insert(key, value.into());
	}

	/// Returns a parameter value.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Projects the parameters onto `order`, skipping keys that were never set.
	pub fn ordered(&self, order: &[&'static str]) -> Vec<(&'static str, &str)> {
		order.iter().filter_map(|key| self.0.get(key).map(|value| (*key, value.as_str()))).collect()
	}
}

/// Generates a single-use nonce: the Unix timestamp followed by random alphanumerics.
pub fn generate_nonce(now: OffsetDateTime) -> String {
	let random: String =
		rand::rng().sample_iter(Alphanumeric).take(NONCE_RANDOM_LEN).map(char::from).collect();

	format!("{}{random}", now.unix_timestamp())
}

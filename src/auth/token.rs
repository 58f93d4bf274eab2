//! OAuth 1.0a token pairs.

pub mod secret;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Token type stamped on [`UserData::oauth_token_type`](crate::auth::UserData) by OAuth 1.0a
/// logins.
pub const ACCESS_TOKEN_TYPE: &str = "Access Token";

/// Opaque `(token, secret)` pair returned by an OAuth 1.0a token endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Public token identifier; also the pending-token cache key.
	pub token: String,
	/// Secret half of the pair, used only to build signing keys.
	pub secret: TokenSecret,
}
impl Token {
	/// Creates a token pair.
	pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
		Self { token: token.into(), secret: TokenSecret::new(secret) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn debug_output_redacts_the_secret() {
		let token = Token::new("tok", "shh");
		let rendered = format!("{token:?}");

		assert!(rendered.contains("tok"));
		assert!(!rendered.contains("shh"));
	}
}

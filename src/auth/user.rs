//! Normalized user record produced at the end of every successful login.

// self
use crate::{_prelude::*, auth::ProviderName};

/// OAuth protocol generation a provider speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OAuthVersion {
	/// OAuth 1.0a three-legged flow.
	#[serde(rename = "1.0")]
	V1,
	/// OAuth 2.0 authorization-code flow.
	#[serde(rename = "2.0")]
	V2,
}
impl OAuthVersion {
	/// Returns the version label (`1.0` or `2.0`).
	pub const fn as_str(self) -> &'static str {
		match self {
			OAuthVersion::V1 => "1.0",
			OAuthVersion::V2 => "2.0",
		}
	}
}
impl Display for OAuthVersion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Everything the login produced about the user.
///
/// Providers expose different subsets of profile data, so any profile field may be empty.
/// The `oauth_*` fields are always populated by the flow that built the record.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
	/// Provider-scoped user identifier.
	pub user_id: String,
	/// Email address, when the provider shares it.
	pub email: String,
	/// Display name.
	pub full_name: String,
	/// Given (first) name.
	pub given_name: String,
	/// Family (last) name.
	pub family_name: String,
	/// Handle or screen name.
	pub screen_name: String,
	/// Avatar URL.
	pub photo_url: String,
	/// Upper-cased provider that authenticated the user.
	pub oauth_provider: Option<ProviderName>,
	/// Protocol generation used for the login.
	pub oauth_version: Option<OAuthVersion>,
	/// Access token issued by the provider; callers must avoid logging it.
	pub oauth_token: String,
	/// Token kind label (`Access Token` for OAuth 1.0a, the token type for OAuth 2.0).
	pub oauth_token_type: String,
}
impl UserData {
	/// Stamps the protocol fields onto a record built from user-info JSON.
	pub fn stamped(
		mut self,
		provider: &ProviderName,
		version: OAuthVersion,
		token: impl Into<String>,
		token_type: impl Into<String>,
	) -> Self {
		self.oauth_provider = Some(provider.clone());
		self.oauth_version = Some(version);
		self.oauth_token = token.into();
		self.oauth_token_type = token_type.into();

		self
	}
}
impl Debug for UserData {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("UserData")
			.field("user_id", &self.user_id)
			.field("email", &self.email)
			.field("full_name", &self.full_name)
			.field("given_name", &self.given_name)
			.field("family_name", &self.family_name)
			.field("screen_name", &self.screen_name)
			.field("photo_url", &self.photo_url)
			.field("oauth_provider", &self.oauth_provider)
			.field("oauth_version", &self.oauth_version)
			.field("oauth_token", &"<redacted>")
			.field("oauth_token_type", &self.oauth_token_type)
			.finish()
	}
}

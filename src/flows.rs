//! Provider flows behind one object-safe trait.
//!
//! [`OAuth1Provider`] runs the three-legged OAuth 1.0a exchange and [`OAuth2Provider`] the
//! OAuth 2.0 authorization-code grant. Servers pick one per provider at configuration time
//! and keep them as `Arc<dyn OAuthServiceProvider>`, typically in the map returned by
//! [`ProviderLoader`](crate::config::ProviderLoader).

pub mod authorization_code;
pub mod common;
pub mod oauth1;

pub use authorization_code::*;
pub use common::*;
pub use oauth1::*;

// self
use crate::{
	_prelude::*,
	auth::{OAuthVersion, ProviderName, UserData},
};

/// Boxed future returned by [`OAuthServiceProvider`] methods.
pub type FlowFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// A login provider a server can redirect users to and receive callbacks from.
///
/// Both steps are independent calls: [`redirect_url`](Self::redirect_url) runs when the
/// user clicks "log in", [`process_response`](Self::process_response) when the browser
/// comes back. Any state that must survive the gap lives in the provider (the OAuth 1.0a
/// token cache, the OAuth 2.0 state flag).
pub trait OAuthServiceProvider
where
	Self: Send + Sync,
{
	/// Upper-cased provider name.
	fn provider_name(&self) -> &ProviderName;

	/// Protocol generation this provider speaks.
	fn oauth_version(&self) -> OAuthVersion;

	/// Starts a login and returns the URL the browser must be sent to.
	fn redirect_url(&self) -> FlowFuture<'_, Url>;

	/// Completes a login from the browser callback parameters.
	fn process_response<'a>(&'a self, params: &'a CallbackParams) -> FlowFuture<'a, UserData>;
}
impl Debug for dyn OAuthServiceProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthServiceProvider")
			.field("provider_name", self.provider_name())
			.field("oauth_version", &self.oauth_version())
			.finish()
	}
}

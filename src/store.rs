//! Pending request-token storage for the OAuth 1.0a redirect → callback gap.
//!
//! Request tokens only live between [`redirect_url`](crate::flows::OAuthServiceProvider) and the
//! browser callback, so the crate keeps them in memory in a bounded [`TokenCache`] shared by
//! every OAuth 1.0a provider of a server instance.

pub mod lru;

pub use lru::{CacheEntry, TokenCache};

// self
use crate::_prelude::*;

/// Error type produced by [`TokenCache`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CacheError {
	/// No pending entry exists for the token (never issued, or already evicted).
	#[error("Could not validate OAuth token `{token}`: no pending request token.")]
	NotFound {
		/// Token identifier that missed.
		token: String,
	},
	/// Eviction freed no room for a new entry.
	#[error("Token cache is full (capacity {capacity}).")]
	Full {
		/// Configured capacity.
		capacity: usize,
	},
}

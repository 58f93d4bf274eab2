//! Self-validating `state` flag for the authorization-code redirect.
//!
//! The flag is `base64("GOAUTH20|<unix seconds>|<PROVIDER>")`: the callback can be checked
//! for origin and age without any server-side session.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::ProviderName, error::ProtocolError};

/// Prefix identifying flags minted by this crate.
pub const STATE_PREFIX: &str = "GOAUTH20";
/// Oldest flag accepted by [`validate_state`].
pub const STATE_MAX_AGE: Duration = Duration::seconds(300);

/// Mints a flag for `provider` stamped with `now`.
pub fn encode_state(provider: &ProviderName, now: OffsetDateTime) -> String {
	STANDARD.encode(format!("{STATE_PREFIX}|{}|{}", now.unix_timestamp(), provider.as_ref()))
}

/// Checks that a flag decodes, was minted for `provider`, and is at most `max_age` old.
pub fn validate_state(
	flag: &str,
	provider: &ProviderName,
	now: OffsetDateTime,
	max_age: Duration,
) -> Result<(), ProtocolError> {
	let invalid = |reason: &str| ProtocolError::InvalidState { reason: reason.to_owned() };

	if flag.is_empty() {
		return Err(invalid("no flag found in the request"));
	}

	let decoded = STANDARD.decode(flag).map_err(|e| invalid(&e.to_string()))?;
	let decoded = String::from_utf8(decoded).map_err(|_| invalid("flag is not UTF-8"))?;
	let mut fields = decoded.split('|');
	let (Some(prefix), Some(issued), Some(name), None) =
		(fields.next(), fields.next(), fields.next(), fields.next())
	else {
		return Err(invalid("invalid format"));
	};

	if prefix != STATE_PREFIX {
		return Err(invalid("invalid format"));
	}
	if name != provider.as_ref() {
		return Err(invalid("invalid provider"));
	}

	let issued = issued
		.parse::<i64>()
		.ok()
		.and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
		.ok_or_else(|| invalid("invalid timestamp"))?;

	if now - issued > max_age {
		return Err(invalid("timed out"));
	}

	Ok(())
}

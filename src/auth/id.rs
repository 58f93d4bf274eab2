//! Provider names shared by configs, flows, and user records.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const PROVIDER_NAME_MAX_LEN: usize = 64;

/// Error returned when a provider name fails validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ProviderNameError {
	/// The name was empty.
	#[error("Provider name cannot be empty.")]
	Empty,
	/// The name contains whitespace characters.
	#[error("Provider name contains whitespace.")]
	ContainsWhitespace,
	/// The name exceeded the allowed character count.
	#[error("Provider name exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Upper-cased provider name (`TWITTER`, `GOOGLE`).
///
/// Normalization happens once at construction so every [`UserData`](crate::auth::UserData)
/// and state flag sees the same spelling.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderName(String);
impl ProviderName {
	/// Validates and upper-cases the provided name.
	pub fn new(value: impl AsRef<str>) -> Result<Self, ProviderNameError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_uppercase()))
	}

	/// Lower-cased spelling used for map keys and callback paths.
	pub fn to_lowercase(&self) -> String {
		self.0.to_lowercase()
	}
}
impl Deref for ProviderName {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ProviderName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for ProviderName {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<ProviderName> for String {
	fn from(value: ProviderName) -> Self {
		value.0
	}
}
impl TryFrom<String> for ProviderName {
	type Error = ProviderNameError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for ProviderName {
	type Err = ProviderNameError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for ProviderName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Provider({})", self.0)
	}
}
impl Display for ProviderName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_view(view: &str) -> Result<(), ProviderNameError> {
	if view.is_empty() {
		return Err(ProviderNameError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(ProviderNameError::ContainsWhitespace);
	}
	if view.chars().count() > PROVIDER_NAME_MAX_LEN {
		return Err(ProviderNameError::TooLong { max: PROVIDER_NAME_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn names_are_upper_cased_and_validated() {
		let name = ProviderName::new("Twitter").expect("Provider name fixture should be valid.");

		assert_eq!(name.as_ref(), "TWITTER");
		assert_eq!(name.to_lowercase(), "twitter");
		assert_eq!(ProviderName::new(""), Err(ProviderNameError::Empty));
		assert_eq!(ProviderName::new("my provider"), Err(ProviderNameError::ContainsWhitespace));
	}

	#[test]
	fn serde_round_trip_normalizes() {
		let name: ProviderName =
			serde_json::from_str("\"google\"").expect("Provider name should deserialize.");

		assert_eq!(name.as_ref(), "GOOGLE");
		assert!(serde_json::from_str::<ProviderName>("\"\"").is_err());
	}
}

//! User-info normalization hooks.
//!
//! Providers describe the same user with different JSON shapes. A [`UserInfoStrategy`] maps
//! one provider's object onto [`UserData`]; flows stamp the protocol fields afterwards.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, auth::UserData};

/// Strategy hook that turns a user-info JSON object into a [`UserData`].
///
/// Implementors must be `Send + Sync` so one strategy can be shared by concurrent logins.
/// Only profile fields should be filled; `oauth_*` fields are overwritten by the flow.
pub trait UserInfoStrategy: Send + Sync {
	/// Maps the decoded user-info object.
	fn to_user_data(&self, data: &Map<String, Value>) -> UserData;
}

/// Default mapping covering the common provider vocabularies.
///
/// - `id`: strings verbatim, numbers in their shortest decimal form (no trailing `.0`).
/// - `given_name` or `first_name`, `family_name` or `last_name`.
/// - `picture` as a string, or Facebook's `picture.data.url`; otherwise `profile_image_url`.
/// - Full name falls back to `"given family"` when a family name exists; screen name falls
///   back to the full name.
///
/// Values of an unexpected JSON type are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultUserInfoStrategy;
impl Display for DefaultUserInfoStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-user-info-strategy")
	}
}
impl UserInfoStrategy for DefaultUserInfoStrategy {
	fn to_user_data(&self, data: &Map<String, Value>) -> UserData {
		let mut user = UserData {
			user_id: data.get("id").map(id_to_string).unwrap_or_default(),
			full_name: string_field(data, &["name"]),
			screen_name: string_field(data, &["screen_name"]),
			given_name: string_field(data, &["given_name", "first_name"]),
			family_name: string_field(data, &["family_name", "last_name"]),
			email: string_field(data, &["email"]),
			photo_url: photo_url(data),
			..Default::default()
		};

		if user.full_name.is_empty() && !user.family_name.is_empty() {
			user.full_name = format!("{} {}", user.given_name, user.family_name);
		}
		if user.screen_name.is_empty() {
			user.screen_name = user.full_name.clone();
		}

		user
	}
}

fn id_to_string(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
			(Some(i), _, _) => i.to_string(),
			(_, Some(u), _) => u.to_string(),
			// `Display` for `f64` already drops a zero fraction.
			(_, _, Some(f)) => f.to_string(),
			_ => n.to_string(),
		},
		other => other.to_string(),
	}
}

// The first key present wins, even when its value is not a string.
fn string_field(data: &Map<String, Value>, keys: &[&str]) -> String {
	keys.iter()
		.find_map(|key| data.get(*key))
		.and_then(Value::as_str)
		.map(str::to_owned)
		.unwrap_or_default()
}

fn photo_url(data: &Map<String, Value>) -> String {
	match data.get("picture") {
		Some(Value::String(url)) => url.clone(),
		Some(picture) => picture
			.pointer("/data/url")
			.and_then(Value::as_str)
			.map(str::to_owned)
			.unwrap_or_default(),
		None => string_field(data, &["profile_image_url"]),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn normalize(value: Value) -> UserData {
		let Value::Object(map) = value else {
			panic!("Normalizer fixtures must be JSON objects.");
		};

		DefaultUserInfoStrategy.to_user_data(&map)
	}

	#[test]
	fn twitter_shape_maps_screen_name_and_avatar() {
		let user = normalize(json!({
			"id": 12345678,
			"name": "Ada Lovelace",
			"screen_name": "ada",
			"profile_image_url": "https://pbs.example.com/ada.png"
		}));

		assert_eq!(user.user_id, "12345678");
		assert_eq!(user.full_name, "Ada Lovelace");
		assert_eq!(user.screen_name, "ada");
		assert_eq!(user.photo_url, "https://pbs.example.com/ada.png");
		assert!(user.oauth_provider.is_none());
	}

	#[test]
	fn facebook_shape_builds_names_and_nested_picture() {
		let user = normalize(json!({
			"id": "1001",
			"first_name": "Grace",
			"last_name": "Hopper",
			"email": "grace@example.com",
			"picture": { "data": { "url": "https://graph.example.com/p.jpg" } }
		}));

		assert_eq!(user.user_id, "1001");
		assert_eq!(user.given_name, "Grace");
		assert_eq!(user.family_name, "Hopper");
		assert_eq!(user.full_name, "Grace Hopper");
		assert_eq!(user.screen_name, "Grace Hopper");
		assert_eq!(user.email, "grace@example.com");
		assert_eq!(user.photo_url, "https://graph.example.com/p.jpg");
	}

	#[test]
	fn ids_render_without_float_noise() {
		assert_eq!(normalize(json!({ "id": 42.0 })).user_id, "42");
		assert_eq!(normalize(json!({ "id": 4.5 })).user_id, "4.5");
		assert_eq!(normalize(json!({ "id": u64::MAX })).user_id, u64::MAX.to_string());
		assert_eq!(normalize(json!({})).user_id, "");
	}

	#[test]
	fn picture_string_beats_profile_image_url() {
		let user = normalize(json!({
			"picture": "https://lh.example.com/me.jpg",
			"profile_image_url": "https://ignored.example.com/me.jpg",
			"given_name": "Only"
		}));

		assert_eq!(user.photo_url, "https://lh.example.com/me.jpg");
		assert_eq!(user.full_name, "");
		assert_eq!(user.screen_name, "");
	}
}

//! Raw userinfo payload returned by the provider.

// crates.io
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Opaque key-value profile (`sub`, `name`, `given_name`, `family_name`, `email`, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Map<String, Value>);
impl UserProfile {
	/// Returns the value under `key` when it is a JSON string.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.0.get(key).and_then(Value::as_str)
	}

	/// Returns the value under `key` rendered as text.
	///
	/// Strings pass through verbatim; numbers and booleans use their JSON spelling. `null`,
	/// arrays, and objects yield `None`.
	pub fn get_text(&self, key: &str) -> Option<String> {
		match self.0.get(key)? {
			Value::String(s) => Some(s.clone()),
			Value::Number(n) => Some(n.to_string()),
			Value::Bool(b) => Some(b.to_string()),
			_ => None,
		}
	}

	/// Drops every field.
	pub fn clear(&mut self) {
		self.0.clear();
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn text_projection_covers_scalars() {
		let profile: UserProfile =
			serde_json::from_value(json!({ "sub": "u-1", "id": 42, "verified": true, "org": null }))
				.expect("Profile fixture should deserialize.");

		assert_eq!(profile.get_text("sub").as_deref(), Some("u-1"));
		assert_eq!(profile.get_text("id").as_deref(), Some("42"));
		assert_eq!(profile.get_text("verified").as_deref(), Some("true"));
		assert_eq!(profile.get_text("org"), None);
		assert_eq!(profile.get_str("id"), None);
	}
}

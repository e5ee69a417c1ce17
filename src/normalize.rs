//! Projections from the provider's token and profile into provider-agnostic records.
//!
//! Every function here is pure. They are only meaningful once a transaction has resolved
//! successfully, i.e. when both a token and a profile are available.

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, TokenResponse, TokenSecret, UserProfile},
};

/// Normalized authentication record handed back to the host framework.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthResult {
	/// Strategy that produced the record.
	pub provider: ProviderId,
	/// User identifier read from the configured uid field.
	pub uid: Option<String>,
	/// Identity view.
	pub info: Identity,
	/// Credentials view.
	pub credentials: Credentials,
	/// Raw provider payloads.
	pub extra: RawExtra,
}

/// Identity fields copied from the userinfo payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// `name`.
	pub name: Option<String>,
	/// `given_name`.
	pub first_name: Option<String>,
	/// `family_name`.
	pub last_name: Option<String>,
	/// `nickname`.
	pub nickname: Option<String>,
	/// `email`.
	pub email: Option<String>,
}

/// Credential fields copied from the token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
	/// Access token.
	pub token: Option<TokenSecret>,
	/// Refresh token.
	pub refresh_token: Option<TokenSecret>,
	/// Absolute expiry as a unix timestamp.
	#[serde(with = "time::serde::timestamp::option")]
	pub expires_at: Option<OffsetDateTime>,
	/// Token type.
	pub token_type: String,
	/// `true` iff `expires_at` is present.
	pub expires: bool,
	/// Token scope split on `,`.
	pub scopes: Vec<String>,
}

/// Raw payloads kept for consumers that need provider-specific fields.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RawExtra {
	/// Token and userinfo payloads as received.
	pub raw_info: RawInfo,
}

/// Token and profile exactly as the provider returned them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RawInfo {
	/// Token response.
	pub token: TokenResponse,
	/// Userinfo payload.
	pub user: UserProfile,
}

/// Reads the user identifier from `profile`.
///
/// `email` is always read from the profile's `email` field directly, since some deployments
/// leave it out of the generic uid mapping.
pub fn uid(profile: &UserProfile, uid_field: &str) -> Option<String> {
	match uid_field {
		"email" => profile.get_text("email"),
		field => profile.get_text(field),
	}
}

/// Projects the token into [`Credentials`].
///
/// An absent scope splits to `[""]`; consumers rely on that shape.
pub fn credentials(token: &TokenResponse) -> Credentials {
	Credentials {
		token: token.access_token.clone(),
		refresh_token: token.refresh_token.clone(),
		expires_at: token.expires_at,
		token_type: token.token_type.clone(),
		expires: token.expires_at.is_some(),
		scopes: token.scope.split(',').map(ToOwned::to_owned).collect(),
	}
}

/// Projects the profile into [`Identity`].
pub fn info(profile: &UserProfile) -> Identity {
	let field = |key: &str| profile.get_str(key).map(ToOwned::to_owned);

	Identity {
		name: field("name"),
		first_name: field("given_name"),
		last_name: field("family_name"),
		nickname: field("nickname"),
		email: field("email"),
	}
}

/// Bundles the raw token and profile.
pub fn extra(token: &TokenResponse, profile: &UserProfile) -> RawExtra {
	RawExtra { raw_info: RawInfo { token: token.clone(), user: profile.clone() } }
}

/// Assembles every view into an [`AuthResult`].
pub fn auth_result(
	provider: &ProviderId,
	uid_field: &str,
	token: &TokenResponse,
	profile: &UserProfile,
) -> AuthResult {
	AuthResult {
		provider: provider.clone(),
		uid: uid(profile, uid_field),
		info: info(profile),
		credentials: credentials(token),
		extra: extra(token, profile),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use time::macros::datetime;
	// self
	use super::*;

	fn profile() -> UserProfile {
		serde_json::from_value(json!({
			"sub": "u-123",
			"name": "Ada Lovelace",
			"given_name": "Ada",
			"family_name": "Lovelace",
			"email": "ada@example.com",
		}))
		.expect("Profile fixture should deserialize.")
	}

	#[test]
	fn uid_reads_configured_field() {
		let profile = profile();

		assert_eq!(uid(&profile, "sub").as_deref(), Some("u-123"));
		assert_eq!(uid(&profile, "email").as_deref(), Some("ada@example.com"));
		assert_eq!(uid(&profile, "id"), None);
	}

	#[test]
	fn info_maps_profile_fields() {
		let identity = info(&profile());

		assert_eq!(identity.name.as_deref(), Some("Ada Lovelace"));
		assert_eq!(identity.first_name.as_deref(), Some("Ada"));
		assert_eq!(identity.last_name.as_deref(), Some("Lovelace"));
		assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
		assert_eq!(identity.nickname, None);
	}

	#[test]
	fn credentials_split_scopes_in_order() {
		let mut token = TokenResponse::from_bearer("at");

		token.scope = "a,b,c".into();
		token.expires_at = Some(datetime!(2026-01-01 00:00:00 UTC));

		let creds = credentials(&token);

		assert_eq!(creds.scopes, vec!["a", "b", "c"]);
		assert!(creds.expires);
		assert_eq!(creds.token_type, "Bearer");
		assert_eq!(creds.token.as_ref().map(TokenSecret::expose), Some("at"));
	}

	#[test]
	fn absent_scope_splits_to_single_empty_entry() {
		let creds = credentials(&TokenResponse::from_bearer("at"));

		assert_eq!(creds.scopes, vec![String::new()]);
		assert!(!creds.expires);
	}

	#[test]
	fn auth_result_bundles_every_view() {
		let provider = ProviderId::new("directory").expect("Provider fixture should be valid.");
		let token = TokenResponse::from_bearer("at");
		let profile = profile();
		let result = auth_result(&provider, "sub", &token, &profile);

		assert_eq!(result.uid.as_deref(), Some("u-123"));
		assert_eq!(result.extra.raw_info.user, profile);
		assert_eq!(result.extra.raw_info.token, token);
	}
}

//! Token endpoint payloads parsed at the JSON boundary.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, auth::TokenSecret, error::ProviderError};

const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Access token issued by the token endpoint or supplied directly by a bearer callback.
///
/// Fields outside the standard set land in `raw_params`, which is also where provider
/// error codes (`error`, `error_description`) and the comma-delimited `scope` live.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Bearer value, absent when the provider rejected the exchange.
	pub access_token: Option<TokenSecret>,
	/// Refresh token, when issued.
	pub refresh_token: Option<TokenSecret>,
	/// Token type, normalized so `bearer` reads `Bearer`.
	pub token_type: String,
	/// Absolute expiry, derived from `expires_at` or `expires_in`.
	#[serde(with = "time::serde::timestamp::option")]
	pub expires_at: Option<OffsetDateTime>,
	/// Raw scope string (`raw_params["scope"]`), empty when omitted.
	pub scope: String,
	/// Every non-standard field returned by the provider.
	pub raw_params: BTreeMap<String, Value>,
}
impl TokenResponse {
	/// Wraps a caller-supplied bearer string; only `access_token` is populated.
	pub fn from_bearer(token: impl Into<String>) -> Self {
		Self {
			access_token: Some(TokenSecret::new(token)),
			refresh_token: None,
			token_type: DEFAULT_TOKEN_TYPE.into(),
			expires_at: None,
			scope: String::new(),
			raw_params: BTreeMap::new(),
		}
	}

	/// Parses a token endpoint body, resolving relative expiry against `now`.
	pub fn from_json_slice(
		body: &[u8],
		now: OffsetDateTime,
	) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		let mut de = serde_json::Deserializer::from_slice(body);
		let raw: RawTokenBody = serde_path_to_error::deserialize(&mut de)?;

		Ok(raw.into_response(now))
	}

	/// Returns the provider-reported error when no access token was issued.
	pub fn provider_error(&self) -> Option<ProviderError> {
		if self.access_token.is_some() {
			return None;
		}

		let code = self
			.raw_str("error")
			.map(ToOwned::to_owned)
			.unwrap_or_else(|| ProviderError::INVALID_TOKEN_RESPONSE.into());
		let description = self.raw_str("error_description").unwrap_or_default().to_owned();

		Some(ProviderError { code, description })
	}

	/// Splits the token into the issued case and the provider-rejected case.
	pub fn into_issued(self) -> Result<Self, ProviderError> {
		match self.provider_error() {
			Some(err) => Err(err),
			None => Ok(self),
		}
	}

	/// Returns the access token value, if any.
	pub fn bearer(&self) -> Option<&TokenSecret> {
		self.access_token.as_ref()
	}

	/// Overwrites secret material and drops provider parameters.
	pub fn wipe(&mut self) {
		if let Some(secret) = self.access_token.as_mut() {
			secret.wipe();
		}
		if let Some(secret) = self.refresh_token.as_mut() {
			secret.wipe();
		}

		self.access_token = None;
		self.refresh_token = None;
		self.raw_params.clear();
	}

	fn raw_str(&self, key: &str) -> Option<&str> {
		self.raw_params.get(key).and_then(Value::as_str)
	}
}

#[derive(Deserialize)]
struct RawTokenBody {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	expires_in: Option<Value>,
	#[serde(default)]
	expires_at: Option<Value>,
	#[serde(flatten)]
	other: BTreeMap<String, Value>,
}
impl RawTokenBody {
	fn into_response(self, now: OffsetDateTime) -> TokenResponse {
		let expires_at = self
			.expires_at
			.as_ref()
			.and_then(seconds_value)
			.and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
			.or_else(|| {
				self.expires_in
					.as_ref()
					.and_then(seconds_value)
					.and_then(|secs| now.checked_add(Duration::seconds(secs)))
			});
		let scope = self.other.get("scope").and_then(Value::as_str).unwrap_or_default().to_owned();

		TokenResponse {
			access_token: self.access_token.map(TokenSecret::new),
			refresh_token: self.refresh_token.map(TokenSecret::new),
			token_type: normalize_token_type(self.token_type),
			expires_at,
			scope,
			raw_params: self.other,
		}
	}
}

fn seconds_value(value: &Value) -> Option<i64> {
	match value {
		Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_seconds)),
		Value::String(s) => {
			let s = s.trim();

			s.parse().ok().or_else(|| s.parse().ok().and_then(truncate_seconds))
		},
		_ => None,
	}
}

fn truncate_seconds(secs: f64) -> Option<i64> {
	// `i64::MAX as f64` rounds up, so the upper bound is exclusive.
	(secs.is_finite() && secs >= i64::MIN as f64 && secs < i64::MAX as f64)
		.then_some(secs.trunc() as i64)
}

fn normalize_token_type(raw: Option<String>) -> String {
	match raw {
		None => DEFAULT_TOKEN_TYPE.into(),
		Some(value) if value.eq_ignore_ascii_case("bearer") => DEFAULT_TOKEN_TYPE.into(),
		Some(value) => value,
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	const NOW: OffsetDateTime = datetime!(2026-01-01 00:00:00 UTC);

	#[test]
	fn parses_issued_token() {
		let body = br#"{"access_token":"at","refresh_token":"rt","token_type":"bearer","expires_in":3600,"scope":"a,b","id_token":"jwt"}"#;
		let token = TokenResponse::from_json_slice(body, NOW).expect("Token body should parse.");

		assert_eq!(token.bearer().map(TokenSecret::expose), Some("at"));
		assert_eq!(token.refresh_token.as_ref().map(TokenSecret::expose), Some("rt"));
		assert_eq!(token.token_type, "Bearer");
		assert_eq!(token.expires_at, Some(datetime!(2026-01-01 01:00:00 UTC)));
		assert_eq!(token.scope, "a,b");
		assert_eq!(token.raw_params.get("id_token"), Some(&Value::from("jwt")));
		assert!(!token.raw_params.contains_key("access_token"));
		assert!(token.provider_error().is_none());
	}

	#[test]
	fn absolute_expiry_wins_and_strings_are_accepted() {
		let body = br#"{"access_token":"at","expires_at":"1767229200","expires_in":60}"#;
		let token = TokenResponse::from_json_slice(body, NOW).expect("Token body should parse.");

		assert_eq!(token.expires_at, Some(datetime!(2026-01-01 01:00:00 UTC)));
	}

	#[test]
	fn fractional_lifetimes_are_truncated() {
		let body = br#"{"access_token":"at","expires_in":3600.0}"#;
		let token = TokenResponse::from_json_slice(body, NOW).expect("Token body should parse.");

		assert_eq!(token.expires_at, Some(datetime!(2026-01-01 01:00:00 UTC)));

		let body = br#"{"access_token":"at","expires_in":"90.9"}"#;
		let token = TokenResponse::from_json_slice(body, NOW).expect("Token body should parse.");

		assert_eq!(token.expires_at, Some(datetime!(2026-01-01 00:01:30 UTC)));

		let body = br#"{"access_token":"at","expires_in":1e300}"#;
		let token = TokenResponse::from_json_slice(body, NOW).expect("Token body should parse.");

		assert_eq!(token.expires_at, None);
	}

	#[test]
	fn missing_access_token_surfaces_provider_error() {
		let body = br#"{"error":"invalid_grant","error_description":"bad code"}"#;
		let token = TokenResponse::from_json_slice(body, NOW).expect("Error body should parse.");
		let err = token.into_issued().expect_err("Missing access token should be rejected.");

		assert_eq!(err, ProviderError::new("invalid_grant", "bad code"));
	}

	#[test]
	fn missing_error_code_falls_back() {
		let token = TokenResponse::from_json_slice(b"{}", NOW).expect("Empty body should parse.");
		let err = token.provider_error().expect("Empty body should be rejected.");

		assert_eq!(err.code, ProviderError::INVALID_TOKEN_RESPONSE);
		assert_eq!(err.description, "");
	}

	#[test]
	fn non_object_body_reports_parse_error() {
		assert!(TokenResponse::from_json_slice(b"\"nope\"", NOW).is_err());
	}

	#[test]
	fn bearer_tokens_only_carry_the_secret() {
		let mut token = TokenResponse::from_bearer("xyz");

		assert_eq!(token.bearer().map(TokenSecret::expose), Some("xyz"));
		assert_eq!(token.scope, "");
		assert!(token.expires_at.is_none());

		token.wipe();

		assert!(token.bearer().is_none());
	}
}

//! Site host selection and endpoint URL derivation.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	provider::endpoint::{AUTHORIZE_PATH, INTROSPECT_PATH, TOKEN_PATH, USERINFO_PATH},
};

/// Production directory host.
pub const PRODUCTION_SITE: &str = "https://directory.example.com";
/// Staging directory host.
pub const STAGING_SITE: &str = "https://staging.directory.example.com";

/// Base host every endpoint URL derives from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteHost {
	#[default]
	/// Production host (default).
	Production,
	/// Staging host, selected by `use_staging`.
	Staging,
	/// Custom deployment host (self-hosted directory or a mock provider).
	Custom(Url),
}
impl SiteHost {
	/// Picks the staging or production host from the configuration flag.
	pub fn select(use_staging: bool) -> Self {
		if use_staging { Self::Staging } else { Self::Production }
	}

	/// Returns the base URL of the host.
	pub fn base(&self) -> Result<Url, ConfigError> {
		match self {
			Self::Production => parse_site(PRODUCTION_SITE),
			Self::Staging => parse_site(STAGING_SITE),
			Self::Custom(url) => Ok(url.clone()),
		}
	}

	/// Concatenates `path` onto the host, keeping any path prefix the host carries.
	pub fn url_for(&self, path: &str) -> Result<Url, ConfigError> {
		let base = self.base()?;
		let joined = format!(
			"{}/{}",
			base.as_str().trim_end_matches('/'),
			path.trim_start_matches('/')
		);

		Url::parse(&joined).map_err(|source| ConfigError::InvalidUrl { field: "site", source })
	}

	/// Derives the full endpoint set from this host.
	pub fn endpoints(&self) -> Result<ProviderEndpoints, ConfigError> {
		Ok(ProviderEndpoints {
			authorization: self.url_for(AUTHORIZE_PATH)?,
			token: self.url_for(TOKEN_PATH)?,
			introspection: self.url_for(INTROSPECT_PATH)?,
			userinfo: self.url_for(USERINFO_PATH)?,
		})
	}
}

/// Endpoint set derived from a single [`SiteHost`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint used by the request phase.
	pub authorization: Url,
	/// Token endpoint used for code exchanges.
	pub token: Url,
	/// Validation endpoint used by the token flow.
	pub introspection: Url,
	/// Userinfo endpoint used for the profile fetch.
	pub userinfo: Url,
}

fn parse_site(raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field: "site", source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn staging_flag_selects_host() {
		assert_eq!(SiteHost::select(true), SiteHost::Staging);
		assert_eq!(SiteHost::select(false), SiteHost::Production);
	}

	#[test]
	fn endpoints_derive_from_host() {
		let endpoints = SiteHost::Staging.endpoints().expect("Staging endpoints should derive.");

		assert_eq!(
			endpoints.authorization.as_str(),
			"https://staging.directory.example.com/directory/v1/oauth/authorize"
		);
		assert_eq!(
			endpoints.token.as_str(),
			"https://staging.directory.example.com/directory/v1/oauth/token"
		);
		assert_eq!(
			endpoints.introspection.as_str(),
			"https://staging.directory.example.com/directory/v1/oauth/validate"
		);
	}

	#[test]
	fn custom_host_keeps_path_prefix() {
		let host = SiteHost::Custom(
			Url::parse("https://sso.internal.example/tenant-a/")
				.expect("Custom host fixture should parse."),
		);
		let url = host.url_for(USERINFO_PATH).expect("Userinfo URL should derive.");

		assert_eq!(url.as_str(), "https://sso.internal.example/tenant-a/directory/v1/userinfo");
	}
}

//! Process configuration and client construction.
//!
//! Client settings merge in three layers, lowest priority first:
//!
//! 1. compiled defaults: the site host picked by `use_staging` (or `site`) and the endpoint URLs
//!    derived from it,
//! 2. process configuration ([`StrategySettings`]): `client_id`, `client_secret`, and the optional
//!    `redirect_uri` override,
//! 3. call-site overrides ([`ClientOverrides`]).
//!
//! Both credentials must be present in the process layer; [`ProviderConfig::resolve`] fails
//! fast with [`ConfigError::MissingKey`] otherwise.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	provider::{
		AUTHORIZE_PATH, INTROSPECT_PATH, ProviderEndpoints, SiteHost, TOKEN_PATH, USERINFO_PATH,
	},
};

/// Scope requested when the inbound request does not supply one.
pub const DEFAULT_SCOPE: &str = "openid+profile+email";
/// Profile field used as the user identifier by default.
pub const DEFAULT_UID_FIELD: &str = "id";
/// Prefix for environment variables read by [`StrategySettings::from_env`].
pub const ENV_PREFIX: &str = "SSO_";

/// Process-wide configuration surface, read once at startup.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
	/// OAuth client identifier (required).
	pub client_id: Option<String>,
	/// OAuth client secret (required).
	pub client_secret: Option<TokenSecret>,
	/// Selects the staging host instead of production.
	pub use_staging: bool,
	/// Custom host replacing both staging and production.
	pub site: Option<Url>,
	/// Redirect URI that always wins over the framework-computed callback URL.
	pub redirect_uri: Option<Url>,
	/// Scope requested when the inbound request does not carry one.
	pub default_scope: String,
	/// Profile field used as the user identifier.
	pub uid_field: String,
	/// Whether to send `redirect_uri` to the provider at all.
	pub send_redirect_uri: bool,
}
impl StrategySettings {
	/// Reads the configuration surface from `SSO_*` environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
	}

	/// Reads the configuration surface from an arbitrary key lookup.
	///
	/// Keys are the upper-case field names without the `SSO_` prefix (`CLIENT_ID`, ...).
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let defaults = Self::default();
		let use_staging = match lookup("USE_STAGING") {
			Some(raw) => parse_flag("use_staging", raw)?,
			None => defaults.use_staging,
		};
		let send_redirect_uri = match lookup("SEND_REDIRECT_URI") {
			Some(raw) => parse_flag("send_redirect_uri", raw)?,
			None => defaults.send_redirect_uri,
		};
		let site = lookup("SITE").map(|raw| parse_url("site", &raw)).transpose()?;
		let redirect_uri =
			lookup("REDIRECT_URI").map(|raw| parse_url("redirect_uri", &raw)).transpose()?;
		let settings = Self {
			client_id: lookup("CLIENT_ID"),
			client_secret: lookup("CLIENT_SECRET").map(TokenSecret::new),
			use_staging,
			site,
			redirect_uri,
			default_scope: lookup("DEFAULT_SCOPE").unwrap_or(defaults.default_scope),
			uid_field: lookup("UID_FIELD").unwrap_or(defaults.uid_field),
			send_redirect_uri,
		};

		Ok(settings)
	}

	/// Sets the client identifier.
	pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Points every endpoint at a custom host.
	pub fn with_site(mut self, site: Url) -> Self {
		self.site = Some(site);

		self
	}

	/// Returns the host selected by `site` or `use_staging`.
	pub fn site_host(&self) -> SiteHost {
		match &self.site {
			Some(url) => SiteHost::Custom(url.clone()),
			None => SiteHost::select(self.use_staging),
		}
	}

	/// Projects the per-request strategy options.
	pub fn options(&self) -> StrategyOptions {
		StrategyOptions {
			default_scope: self.default_scope.clone(),
			uid_field: self.uid_field.clone(),
			send_redirect_uri: self.send_redirect_uri,
		}
	}
}
impl Default for StrategySettings {
	fn default() -> Self {
		Self {
			client_id: None,
			client_secret: None,
			use_staging: false,
			site: None,
			redirect_uri: None,
			default_scope: DEFAULT_SCOPE.into(),
			uid_field: DEFAULT_UID_FIELD.into(),
			send_redirect_uri: true,
		}
	}
}

/// Strategy options consulted by the request and callback phases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyOptions {
	/// Scope requested when the inbound request does not carry one.
	pub default_scope: String,
	/// Profile field used as the user identifier.
	pub uid_field: String,
	/// Whether to send `redirect_uri` to the provider.
	pub send_redirect_uri: bool,
}
impl Default for StrategyOptions {
	fn default() -> Self {
		StrategySettings::default().options()
	}
}

/// Call-site overrides, the highest-priority configuration layer.
#[derive(Clone, Debug, Default)]
pub struct ClientOverrides {
	/// Replacement client identifier.
	pub client_id: Option<String>,
	/// Replacement client secret.
	pub client_secret: Option<TokenSecret>,
	/// Replacement redirect URI override.
	pub redirect_uri: Option<Url>,
}
impl ClientOverrides {
	/// Overrides the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Overrides the client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Overrides the redirect URI.
	pub fn redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}
}

/// Immutable provider configuration resolved once per process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
	/// OAuth client identifier, also the expected audience of validated tokens.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Selected base host.
	pub site: SiteHost,
	/// Whether the staging host was requested.
	pub use_staging: bool,
	/// Authorization endpoint path.
	pub authorize_path: &'static str,
	/// Token endpoint path.
	pub token_path: &'static str,
	/// Token validation endpoint path.
	pub introspect_path: &'static str,
	/// Userinfo endpoint path.
	pub userinfo_path: &'static str,
	/// Endpoint URLs derived from `site`.
	pub endpoints: ProviderEndpoints,
	/// Redirect URI override.
	pub redirect_uri: Option<Url>,
}
impl ProviderConfig {
	/// Merges defaults, process settings, and overrides into a validated configuration.
	pub fn resolve(
		settings: &StrategySettings,
		overrides: ClientOverrides,
	) -> Result<Self, ConfigError> {
		let site = settings.site_host();
		let endpoints = site.endpoints()?;
		let mut client_id = settings
			.client_id
			.clone()
			.filter(|value| !value.trim().is_empty())
			.ok_or(ConfigError::MissingKey { key: "client_id" })?;
		let mut client_secret = settings
			.client_secret
			.clone()
			.filter(|value| !value.is_empty())
			.ok_or(ConfigError::MissingKey { key: "client_secret" })?;
		let mut redirect_uri = settings.redirect_uri.clone();

		if let Some(value) = overrides.client_id {
			client_id = value;
		}
		if let Some(value) = overrides.client_secret {
			client_secret = value;
		}
		if let Some(value) = overrides.redirect_uri {
			redirect_uri = Some(value);
		}

		Ok(Self {
			client_id,
			client_secret,
			site,
			use_staging: settings.use_staging,
			authorize_path: AUTHORIZE_PATH,
			token_path: TOKEN_PATH,
			introspect_path: INTROSPECT_PATH,
			userinfo_path: USERINFO_PATH,
			endpoints,
			redirect_uri,
		})
	}
}

fn parse_flag(key: &'static str, raw: String) -> Result<bool, ConfigError> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::InvalidValue { key, value: raw }),
	}
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { field, source })
}

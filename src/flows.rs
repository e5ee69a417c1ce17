//! Request and callback phases of the strategy.
//!
//! A [`Strategy`] binds one provider name to an [`OAuthClient`] and the per-request
//! [`StrategyOptions`]. The host framework drives it through two entry points:
//!
//! - [`Strategy::begin_auth`] builds the provider redirect (request phase),
//! - [`Strategy::handle_callback`] resolves the provider's callback into an
//!   [`AuthTransaction`] (callback phase).
//!
//! [`StrategyRegistry`] dispatches both entry points by provider name.

pub mod callback;
pub mod registry;
pub mod request;
pub mod transaction;

pub use callback::*;
pub use registry::*;
pub use request::*;
pub use transaction::*;

// self
use crate::{_prelude::*, auth::ProviderId, config::StrategyOptions, oauth::OAuthClient};
#[cfg(feature = "reqwest")]
use crate::{
	config::{ClientOverrides, StrategySettings},
	error::ConfigError,
	oauth,
};

/// One configured provider strategy.
///
/// Strategies hold no per-transaction state; clones share the same client and every call
/// builds its own context.
#[derive(Clone)]
pub struct Strategy {
	/// Name the strategy is registered under.
	pub provider: ProviderId,
	/// OAuth client for the provider.
	pub client: Arc<dyn OAuthClient>,
	/// Options consulted by both phases.
	pub options: StrategyOptions,
}
impl Strategy {
	/// Creates a strategy around an existing OAuth client.
	pub fn new(provider: ProviderId, client: Arc<dyn OAuthClient>, options: StrategyOptions) -> Self {
		Self { provider, client, options }
	}

	/// Effective redirect URI: the configured override, else the framework's callback URL.
	pub fn redirect_uri(&self, default_callback: impl FnOnce() -> Url) -> Url {
		match &self.client.config().redirect_uri {
			Some(url) => url.clone(),
			None => default_callback(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl Strategy {
	/// Builds a reqwest-backed strategy from process settings.
	///
	/// Fails fast with [`ConfigError::MissingKey`] when a credential is missing, so callers
	/// should invoke this during startup.
	pub fn from_settings(
		provider: ProviderId,
		settings: &StrategySettings,
		overrides: ClientOverrides,
	) -> Result<Self, ConfigError> {
		let client = oauth::build_client(settings, overrides)?;

		Ok(Self::new(provider, Arc::new(client), settings.options()))
	}
}
impl Debug for Strategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Strategy")
			.field("provider", &self.provider)
			.field("client_id", &self.client.config().client_id)
			.field("options", &self.options)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	#[test]
	fn redirect_override_wins_over_framework_callback() {
		let framework = || {
			Url::parse("http://internal:4000/auth/directory/callback")
				.expect("Framework URL should parse.")
		};
		let strategy = test_strategy(ScriptedTransport::default());

		assert_eq!(
			strategy.redirect_uri(framework).as_str(),
			"http://internal:4000/auth/directory/callback"
		);

		let mut config = test_provider_config("client-unit");
		let public =
			Url::parse("https://sso.example.com/auth/directory/callback").expect("URL should parse.");

		config.redirect_uri = Some(public.clone());

		let strategy = test_strategy_with_config(config, ScriptedTransport::default());

		assert_eq!(strategy.redirect_uri(framework), public);
	}
}

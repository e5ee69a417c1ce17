//! Strategies keyed by provider name.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::ConfigError,
	flows::{AuthRedirect, AuthTransaction, CallbackParams, RequestParams, Strategy},
};

/// Dispatches both phases to the strategy registered under a provider name.
///
/// Built once at startup and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct StrategyRegistry {
	strategies: HashMap<ProviderId, Strategy>,
}
impl StrategyRegistry {
	/// Adds a strategy, replacing any previous one registered under the same name.
	pub fn with(mut self, strategy: Strategy) -> Self {
		self.register(strategy);

		self
	}

	/// Adds a strategy and returns the one it replaced.
	pub fn register(&mut self, strategy: Strategy) -> Option<Strategy> {
		self.strategies.insert(strategy.provider.clone(), strategy)
	}

	/// Looks up the strategy registered under `provider`.
	pub fn get(&self, provider: &str) -> Result<&Strategy, ConfigError> {
		self.strategies
			.get(provider)
			.ok_or_else(|| ConfigError::UnknownProvider { provider: provider.to_owned() })
	}

	/// Registered provider names.
	pub fn providers(&self) -> impl Iterator<Item = &ProviderId> {
		self.strategies.keys()
	}

	/// Runs the request phase of `provider`.
	pub fn begin_auth(
		&self,
		provider: &str,
		params: &RequestParams,
		default_callback: impl FnOnce() -> Url,
	) -> Result<AuthRedirect, ConfigError> {
		Ok(self.get(provider)?.begin_auth(params, default_callback))
	}

	/// Runs the callback phase of `provider`.
	pub async fn handle_callback(
		&self,
		provider: &str,
		params: &CallbackParams,
		default_callback: impl FnOnce() -> Url,
	) -> Result<AuthTransaction, ConfigError> {
		let strategy = self.get(provider)?;

		Ok(strategy.handle_callback(params, default_callback).await)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	fn framework_callback() -> Url {
		Url::parse("https://app.example.com/auth/callback").expect("Callback should parse.")
	}

	#[test]
	fn dispatches_by_provider_name() {
		let registry = StrategyRegistry::default().with(test_strategy(ScriptedTransport::default()));
		let redirect = registry
			.begin_auth(TEST_PROVIDER, &RequestParams::default(), framework_callback)
			.expect("Registered provider should resolve.");

		assert_eq!(redirect.location.path(), "/directory/v1/oauth/authorize");
		assert_eq!(registry.providers().count(), 1);
	}

	#[tokio::test]
	async fn unknown_provider_is_a_config_error() {
		let registry = StrategyRegistry::default();
		let err = registry
			.handle_callback("github", &CallbackParams::code("abc"), framework_callback)
			.await
			.expect_err("Unknown provider should be rejected.");

		assert!(matches!(err, ConfigError::UnknownProvider { ref provider } if provider == "github"));
	}

	#[test]
	fn register_replaces_existing_entry() {
		let mut registry = StrategyRegistry::default();

		assert!(registry.register(test_strategy(ScriptedTransport::default())).is_none());
		assert!(registry.register(test_strategy(ScriptedTransport::default())).is_some());
	}
}

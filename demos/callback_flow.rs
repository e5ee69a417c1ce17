//! Resolves a provider callback end to end and prints the normalized result or the failure.
//!
//! Pass the callback query as the first argument, e.g. `code=abc` or `access_token=xyz`.
//! Point `SSO_SITE` at a provider (or a mock) and set `SSO_CLIENT_ID` / `SSO_CLIENT_SECRET`.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth2_sso_strategy::{
	auth::ProviderId,
	config::{ClientOverrides, ProviderConfig, StrategySettings},
	flows::{CallbackParams, Strategy, StrategyRegistry},
	http::ReqwestHttpClient,
	oauth::{DirectoryClient, ReqwestDirectoryClient, ReqwestTransportErrorMapper},
	reqwest,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let settings = StrategySettings::from_env()?;
	let http = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
	let client: ReqwestDirectoryClient = DirectoryClient::with_http_client(
		ProviderConfig::resolve(&settings, ClientOverrides::default())?,
		ReqwestHttpClient::with_client(http),
		ReqwestTransportErrorMapper,
	);
	let registry = StrategyRegistry::default().with(Strategy::new(
		ProviderId::new("directory")?,
		Arc::new(client),
		settings.options(),
	));
	let query = std::env::args().nth(1).unwrap_or_default();
	let params = CallbackParams::from_query(&query);
	let tx = registry
		.handle_callback("directory", &params, || {
			Url::parse("http://localhost:4000/auth/directory/callback")
				.expect("Demo callback URL is valid.")
		})
		.await?;

	println!("Transaction state: {:?}.", tx.state());

	match tx.finish() {
		Ok(result) => {
			println!("Signed in {:?} as {:?}.", result.info.email, result.uid);
			println!("Scopes: {:?}.", result.credentials.scopes);
			println!("{}", serde_json::to_string_pretty(&result.info)?);
		},
		Err(failure) => eprintln!("Sign-in failed: {failure}."),
	}

	Ok(())
}

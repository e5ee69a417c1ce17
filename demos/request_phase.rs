//! Builds the provider redirect for an inbound sign-in request and prints the `302` response a
//! host framework would send.

// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth2_sso_strategy::{
	auth::ProviderId,
	config::{ClientOverrides, StrategySettings},
	flows::{RequestParams, Strategy},
};

fn main() -> Result<()> {
	color_eyre::install()?;

	// `SSO_CLIENT_ID` and `SSO_CLIENT_SECRET` win when set.
	let mut settings = StrategySettings::from_env()?;

	if settings.client_id.is_none() {
		settings = settings.with_client_id("demo-client");
	}
	if settings.client_secret.is_none() {
		settings = settings.with_client_secret("demo-secret");
	}

	let provider = ProviderId::new("directory")?;
	let strategy = Strategy::from_settings(provider, &settings, ClientOverrides::default())?;
	let params = RequestParams::from_query("scope=openid+email&state=demo-state");
	let redirect = strategy.begin_auth(&params, || {
		Url::parse("http://localhost:4000/auth/directory/callback")
			.expect("Demo callback URL is valid.")
	});
	let response = redirect.to_http_response()?;

	println!("HTTP {}", response.status());

	for (name, value) in response.headers() {
		println!("{name}: {}", value.to_str()?);
	}

	println!("Requested scope: {}.", redirect.request.scope);
	println!("Redirect URI: {}.", redirect.request.redirect_uri);

	Ok(())
}

#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use url::Url;
// self
use oauth2_sso_strategy::{
	auth::ProviderId,
	config::{ClientOverrides, StrategySettings},
	flows::{CallbackParams, FailureEntry, Resolution, Strategy, TransactionState},
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";
const PROFILE: &str = r#"{"id":"u-7","sub":"s-7","name":"Grace Hopper","given_name":"Grace","family_name":"Hopper","email":"grace@example.com"}"#;

fn settings(server: &MockServer) -> StrategySettings {
	StrategySettings::default()
		.with_client_id(CLIENT_ID)
		.with_client_secret(CLIENT_SECRET)
		.with_site(Url::parse(&server.base_url()).expect("Mock server URL should parse."))
}

fn strategy(settings: &StrategySettings) -> Strategy {
	let provider = ProviderId::new("directory").expect("Provider name should be valid.");

	Strategy::from_settings(provider, settings, ClientOverrides::default())
		.expect("Strategy should build from complete settings.")
}

fn framework_callback() -> Url {
	Url::parse("https://app.example.com/auth/directory/callback")
		.expect("Framework callback should parse.")
}

#[tokio::test]
async fn code_flow_resolves_to_normalized_result() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/directory/v1/oauth/token")
				.header("accept", "application/json")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				r#"{"access_token":"at-1","refresh_token":"rt-1","token_type":"bearer","expires_in":3600,"scope":"openid,profile,email"}"#,
			);
		})
		.await;
	let userinfo_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/directory/v1/userinfo")
				.header("authorization", "Bearer at-1")
				.query_param("client_secret", CLIENT_SECRET);
			then.status(200).header("content-type", "application/json").body(PROFILE);
		})
		.await;
	let tx = strategy(&settings(&server))
		.handle_callback(&CallbackParams::code("abc"), framework_callback)
		.await;

	token_mock.assert_async().await;
	userinfo_mock.assert_async().await;

	assert_eq!(tx.state(), TransactionState::Resolved(Resolution::Success));

	let result = tx.finish().expect("Code flow should resolve successfully.");

	assert_eq!(&*result.provider, "directory");
	assert_eq!(result.uid.as_deref(), Some("u-7"));
	assert_eq!(result.info.first_name.as_deref(), Some("Grace"));
	assert_eq!(result.info.last_name.as_deref(), Some("Hopper"));
	assert_eq!(result.credentials.scopes, vec!["openid", "profile", "email"]);
	assert_eq!(result.credentials.token_type, "Bearer");
	assert!(result.credentials.expires);
	assert_eq!(
		result.credentials.refresh_token.as_ref().map(|secret| secret.expose()),
		Some("rt-1")
	);
	assert_eq!(result.extra.raw_info.user.get_str("email"), Some("grace@example.com"));
}

#[tokio::test]
async fn invalid_grant_is_reported_verbatim() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/directory/v1/oauth/token");
			then.status(400)
				.header("content-type", "application/json")
				.body(r#"{"error":"invalid_grant","error_description":"bad code"}"#);
		})
		.await;
	let userinfo_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/directory/v1/userinfo");
			then.status(200).body(PROFILE);
		})
		.await;
	let failure = strategy(&settings(&server))
		.handle_callback(&CallbackParams::code("stale"), framework_callback)
		.await
		.finish()
		.expect_err("Rejected code should fail the transaction.");

	token_mock.assert_async().await;

	assert_eq!(userinfo_mock.calls_async().await, 0);
	assert_eq!(failure.errors, vec![FailureEntry::new("invalid_grant", "bad code")]);
}

#[tokio::test]
async fn token_flow_validates_audience_before_profile_fetch() {
	let server = MockServer::start_async().await;
	let validate_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/directory/v1/oauth/validate")
				.header("authorization", "Bearer xyz")
				.query_param("client_secret", CLIENT_SECRET);
			then.status(200)
				.header("content-type", "application/json")
				.body(format!(r#"{{"active":true,"client_id":"{CLIENT_ID}"}}"#));
		})
		.await;
	let userinfo_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/directory/v1/userinfo");
			then.status(200).header("content-type", "application/json").body(PROFILE);
		})
		.await;
	let result = strategy(&settings(&server))
		.handle_callback(&CallbackParams::access_token("xyz"), framework_callback)
		.await
		.finish()
		.expect("Validated bearer should resolve successfully.");

	validate_mock.assert_async().await;
	userinfo_mock.assert_async().await;

	assert_eq!(result.credentials.token.as_ref().map(|secret| secret.expose()), Some("xyz"));
	assert_eq!(result.credentials.scopes, vec![String::new()]);
	assert!(!result.credentials.expires);
}

#[tokio::test]
async fn token_for_another_client_is_rejected() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/directory/v1/oauth/validate");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"active":true,"client_id":"other-client"}"#);
		})
		.await;

	let userinfo_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/directory/v1/userinfo");
			then.status(200).body(PROFILE);
		})
		.await;
	let failure = strategy(&settings(&server))
		.handle_callback(&CallbackParams::access_token("replayed"), framework_callback)
		.await
		.finish()
		.expect_err("Token issued to another client should be rejected.");

	assert_eq!(userinfo_mock.calls_async().await, 0);
	assert_eq!(failure.errors, vec![FailureEntry::new("token", "Token verification failed")]);
}

#[tokio::test]
async fn unauthorized_profile_fetch_fails_both_branches() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/directory/v1/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"at-2"}"#);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/directory/v1/oauth/validate");
			then.status(200)
				.header("content-type", "application/json")
				.body(format!(r#"{{"active":true,"client_id":"{CLIENT_ID}"}}"#));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/directory/v1/userinfo");
			then.status(401);
		})
		.await;

	let strategy = strategy(&settings(&server));

	for params in [CallbackParams::code("abc"), CallbackParams::access_token("xyz")] {
		let failure = strategy
			.handle_callback(&params, framework_callback)
			.await
			.finish()
			.expect_err("Unauthorized profile fetch should fail.");

		assert_eq!(failure.errors, vec![FailureEntry::new("token", "unauthorized")]);
	}
}

#[tokio::test]
async fn missing_credential_fails_without_provider_calls() {
	let server = MockServer::start_async().await;
	let any_mock = server
		.mock_async(|_when, then| {
			then.status(500);
		})
		.await;
	let tx = strategy(&settings(&server))
		.handle_callback(&CallbackParams::from_query("state=only"), framework_callback)
		.await;

	assert_eq!(tx.state(), TransactionState::Resolved(Resolution::Failure));
	assert_eq!(
		tx.failure().and_then(|failure| failure.first()),
		Some(&FailureEntry::new("missing_code", "No code received"))
	);
	assert_eq!(any_mock.calls_async().await, 0);
}

#[tokio::test]
async fn unreachable_provider_is_an_oauth2_failure() {
	let settings = StrategySettings::default()
		.with_client_id(CLIENT_ID)
		.with_client_secret(CLIENT_SECRET)
		.with_site(Url::parse("http://127.0.0.1:9").expect("Unreachable URL should parse."));
	let failure = strategy(&settings)
		.handle_callback(&CallbackParams::code("abc"), framework_callback)
		.await
		.finish()
		.expect_err("Connection failure should fail the transaction.");
	let entry = failure.first().expect("Failure should carry an entry.");

	assert_eq!(entry.kind, "OAuth2");
	assert!(entry.message.contains("token endpoint"));
}

#[tokio::test]
async fn uid_field_email_reads_email() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/directory/v1/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"at-3"}"#);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/directory/v1/userinfo");
			then.status(200).header("content-type", "application/json").body(PROFILE);
		})
		.await;

	let mut settings = settings(&server);

	settings.uid_field = "email".into();

	let result = strategy(&settings)
		.handle_callback(&CallbackParams::code("abc"), framework_callback)
		.await
		.finish()
		.expect("Code flow should resolve successfully.");

	assert_eq!(result.uid.as_deref(), Some("grace@example.com"));
}

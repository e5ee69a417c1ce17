//! Request phase: redirect construction.

// crates.io
use oauth2::{
	HttpResponse,
	http::{Response, StatusCode, header::LOCATION},
};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::Strategy,
	oauth::AuthorizationRequest,
	obs::{self, FlowOutcome, FlowSpan, Phase},
};

/// Inbound request-phase parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestParams {
	/// Requested scope; the configured default applies when absent.
	pub scope: Option<String>,
	/// Opaque state passed through to the callback.
	pub state: Option<String>,
}
impl RequestParams {
	/// Reads `scope` and `state` from a URL-encoded query string. First occurrence wins.
	pub fn from_query(query: &str) -> Self {
		let mut params = Self::default();

		for (key, value) in parse_query(query) {
			match key.as_ref() {
				"scope" if params.scope.is_none() => params.scope = Some(value.into_owned()),
				"state" if params.state.is_none() => params.state = Some(value.into_owned()),
				_ => (),
			}
		}

		params
	}

	/// Sets the requested scope.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Sets the passthrough state.
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}
}

/// Redirect produced by [`Strategy::begin_auth`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthRedirect {
	/// Provider authorize URL the user agent should visit.
	pub location: Url,
	/// Parameters the URL was built from.
	pub request: AuthorizationRequest,
}
impl AuthRedirect {
	/// Renders the redirect as a `302 Found` response with a `Location` header.
	pub fn to_http_response(&self) -> Result<HttpResponse, ConfigError> {
		let response = Response::builder()
			.status(StatusCode::FOUND)
			.header(LOCATION, self.location.as_str())
			.body(Vec::new())?;

		Ok(response)
	}
}

impl Strategy {
	/// Builds the provider redirect for an inbound sign-in request.
	///
	/// `default_callback` computes the framework's own callback URL; it is only called when
	/// no redirect override is configured. Performs no I/O.
	pub fn begin_auth(
		&self,
		params: &RequestParams,
		default_callback: impl FnOnce() -> Url,
	) -> AuthRedirect {
		const PHASE: Phase = Phase::Request;

		let _span = FlowSpan::new(PHASE, "begin_auth").entered();

		obs::record_phase_outcome(PHASE, FlowOutcome::Attempt);

		let request = AuthorizationRequest {
			scope: params.scope.clone().unwrap_or_else(|| self.options.default_scope.clone()),
			state: params.state.clone(),
			redirect_uri: self.redirect_uri(default_callback),
			send_redirect_uri: self.options.send_redirect_uri,
		};
		let location = self.client.authorize_url(&request);

		obs::record_phase_outcome(PHASE, FlowOutcome::Success);

		AuthRedirect { location, request }
	}
}

pub(crate) fn parse_query(query: &str) -> url::form_urlencoded::Parse<'_> {
	url::form_urlencoded::parse(query.strip_prefix('?').unwrap_or(query).as_bytes())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	fn framework_callback() -> Url {
		Url::parse("https://app.example.com/auth/directory/callback")
			.expect("Framework callback should parse.")
	}

	fn query(url: &Url) -> HashMap<String, String> {
		url.query_pairs().into_owned().collect()
	}

	#[test]
	fn query_parsing_keeps_first_occurrence() {
		let params = RequestParams::from_query("?scope=email&state=s1&scope=profile&other=x");

		assert_eq!(params, RequestParams::default().with_scope("email").with_state("s1"));
		assert_eq!(RequestParams::from_query(""), RequestParams::default());
	}

	#[test]
	fn default_scope_applies_when_absent() {
		let strategy = test_strategy(ScriptedTransport::default());
		let redirect = strategy.begin_auth(&RequestParams::default(), framework_callback);
		let pairs = query(&redirect.location);

		assert_eq!(redirect.location.path(), "/directory/v1/oauth/authorize");
		assert_eq!(pairs.get("scope").map(String::as_str), Some("openid+profile+email"));
		assert_eq!(
			pairs.get("redirect_uri").map(String::as_str),
			Some("https://app.example.com/auth/directory/callback")
		);
		assert!(!pairs.contains_key("state"));
	}

	#[test]
	fn request_scope_and_state_pass_through() {
		let strategy = test_strategy(ScriptedTransport::default());
		let params = RequestParams::default().with_scope("email").with_state("csrf-1");
		let redirect = strategy.begin_auth(&params, framework_callback);
		let pairs = query(&redirect.location);

		assert_eq!(pairs.get("scope").map(String::as_str), Some("email"));
		assert_eq!(pairs.get("state").map(String::as_str), Some("csrf-1"));
		assert_eq!(redirect.request.scope, "email");
	}

	#[test]
	fn redirect_uri_can_be_withheld() {
		let mut strategy = test_strategy(ScriptedTransport::default());

		strategy.options.send_redirect_uri = false;

		let redirect = strategy.begin_auth(&RequestParams::default(), framework_callback);

		assert!(!query(&redirect.location).contains_key("redirect_uri"));
	}

	#[test]
	fn redirect_renders_as_found() {
		let strategy = test_strategy(ScriptedTransport::default());
		let redirect = strategy.begin_auth(&RequestParams::default(), framework_callback);
		let response = redirect.to_http_response().expect("Redirect response should build.");

		assert_eq!(response.status(), StatusCode::FOUND);
		assert_eq!(
			response.headers().get(LOCATION).and_then(|value| value.to_str().ok()),
			Some(redirect.location.as_str())
		);
	}
}

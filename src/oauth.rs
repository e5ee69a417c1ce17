//! OAuth client: authorize URLs, code exchange, authenticated requests, token validation.
//!
//! [`OAuthClient`] is the seam between the callback state machine and a concrete provider.
//! [`DirectoryClient`] implements it for the directory provider on top of any
//! [`HttpTransport`]; the reqwest-backed alias [`ReqwestDirectoryClient`] is what
//! [`build_client`] returns.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	auth::{TokenResponse, TokenSecret},
	config::ProviderConfig,
	error::{ConfigError, TransportError},
	http::{HttpTransport, ProviderResponse, ResponseMetadata, ResponseMetadataSlot},
	provider::Endpoint,
};
#[cfg(feature = "reqwest")]
use crate::{
	config::{ClientOverrides, StrategySettings},
	http::ReqwestHttpClient,
};

/// Boxed future returned by fallible [`OAuthClient`] calls.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;
/// Boxed future returned by [`OAuthClient::validate`].
pub type ValidationFuture<'a> = Pin<Box<dyn Future<Output = bool> + 'a + Send>>;

#[cfg(feature = "reqwest")]
/// Directory client specialized for the crate's default reqwest transport stack.
pub type ReqwestDirectoryClient = DirectoryClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Builds the default reqwest-backed directory client.
///
/// Settings merge as described in [`crate::config`]. Fails with
/// [`ConfigError::MissingKey`] when `client_id` or `client_secret` is absent from `settings`.
#[cfg(feature = "reqwest")]
pub fn build_client(
	settings: &StrategySettings,
	overrides: ClientOverrides,
) -> Result<ReqwestDirectoryClient, ConfigError> {
	let config = ProviderConfig::resolve(settings, overrides)?;

	Ok(DirectoryClient::with_http_client(
		config,
		ReqwestHttpClient::default(),
		ReqwestTransportErrorMapper,
	))
}

/// Per-request parameters of the authorization redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationRequest {
	/// Scope sent to the provider.
	pub scope: String,
	/// Opaque state passed through to the callback.
	pub state: Option<String>,
	/// Effective redirect URI.
	pub redirect_uri: Url,
	/// Whether `redirect_uri` is included in the authorize URL.
	pub send_redirect_uri: bool,
}

/// Extra headers and query parameters for [`OAuthClient::authenticated_get`].
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
	/// Additional request headers.
	pub headers: Vec<(String, String)>,
	/// Additional query parameters.
	pub params: Vec<(String, String)>,
}
impl RequestOptions {
	/// Adds a request header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Adds a query parameter.
	pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.push((name.into(), value.into()));

		self
	}
}

/// Provider-facing OAuth operations used by the callback state machine.
///
/// One implementation exists per provider; strategies hold it as `Arc<dyn OAuthClient>` so
/// the registry can mix providers without dynamic module lookup.
pub trait OAuthClient: Send + Sync {
	/// Resolved provider configuration.
	fn config(&self) -> &ProviderConfig;

	/// Builds the provider authorization URL. Pure; performs no I/O.
	fn authorize_url(&self, request: &AuthorizationRequest) -> Url;

	/// Exchanges an authorization code at the token endpoint.
	///
	/// A token without `access_token` is returned as-is; callers inspect
	/// [`TokenResponse::provider_error`].
	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
		redirect_uri: Option<&'a Url>,
	) -> ClientFuture<'a, TokenResponse>;

	/// Issues a bearer-authenticated GET against `path` relative to the site host.
	///
	/// Any HTTP status is returned as a response; only transport failures are errors.
	fn authenticated_get<'a>(
		&'a self,
		token: &'a TokenSecret,
		path: &'a str,
		options: &'a RequestOptions,
	) -> ClientFuture<'a, ProviderResponse>;

	/// Confirms the token is active and was issued to this client.
	///
	/// Returns `false` on transport errors, statuses outside `[200, 399)`, unparseable
	/// bodies, `active != true`, or an audience (`client_id`) mismatch. Never errors.
	fn validate<'a>(&'a self, token: &'a TokenSecret) -> ValidationFuture<'a> {
		Box::pin(async move {
			let config = self.config();
			let options = RequestOptions::default();
			let Ok(response) =
				self.authenticated_get(token, config.introspect_path, &options).await
			else {
				return false;
			};

			if !response.is_accepted() {
				return false;
			}

			match response.json::<Introspection>() {
				Ok(body) =>
					body.active && body.client_id.as_deref() == Some(config.client_id.as_str()),
				Err(_) => false,
			}
		})
	}
}

#[derive(Deserialize)]
struct Introspection {
	#[serde(default)]
	active: bool,
	#[serde(default)]
	client_id: Option<String>,
}

/// Maps HTTP transport failures into strategy [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a strategy error.
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Mapper for arbitrary transports; every transport error becomes a network failure.
#[derive(Clone, Debug, Default)]
pub struct DefaultTransportErrorMapper;
impl<E> TransportErrorMapper<E> for DefaultTransportErrorMapper
where
	E: 'static + Send + Sync + StdError,
{
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		_metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error {
		map_common_transport_error(endpoint, error, |endpoint, inner| {
			TransportError::network(endpoint, *inner).into()
		})
	}
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		map_common_transport_error(endpoint, err, |endpoint, inner| {
			map_reqwest_error(endpoint, meta, *inner)
		})
	}
}

/// OAuth client for the directory provider.
#[derive(Clone)]
pub struct DirectoryClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	config: ProviderConfig,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
}
impl<C, M> DirectoryClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: ProviderConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self { config, http_client: http_client.into(), transport_mapper: mapper.into() }
	}

	async fn send(&self, endpoint: Endpoint, request: HttpRequest) -> Result<ProviderResponse> {
		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(meta.clone());

		match handle.call(request).await {
			Ok(response) => Ok(response.into()),
			Err(err) => Err(self.transport_mapper.map_transport_error(
				endpoint,
				meta.take().as_ref(),
				err,
			)),
		}
	}

	fn token_request(&self, code: &str, redirect_uri: Option<&Url>) -> Result<HttpRequest> {
		let mut form = Serializer::new(String::new());

		form.append_pair("grant_type", "authorization_code");
		form.append_pair("code", code);
		form.append_pair("client_id", &self.config.client_id);
		form.append_pair("client_secret", self.config.client_secret.expose());

		if let Some(redirect_uri) = redirect_uri {
			form.append_pair("redirect_uri", redirect_uri.as_str());
		}

		let request = Request::builder()
			.method(Method::POST)
			.uri(self.config.endpoints.token.as_str())
			.header(ACCEPT, JSON)
			.header(CONTENT_TYPE, FORM)
			.body(form.finish().into_bytes())
			.map_err(ConfigError::from)?;

		Ok(request)
	}

	fn resource_request(
		&self,
		token: &TokenSecret,
		path: &str,
		options: &RequestOptions,
	) -> Result<HttpRequest> {
		let mut url = self.config.site.url_for(path)?;

		{
			let mut pairs = url.query_pairs_mut();

			for (name, value) in &options.params {
				pairs.append_pair(name, value);
			}

			pairs.append_pair("client_secret", self.config.client_secret.expose());
		}

		let mut builder = Request::builder()
			.method(Method::GET)
			.uri(url.as_str())
			.header(AUTHORIZATION, format!("Bearer {}", token.expose()))
			.header(ACCEPT, JSON);

		for (name, value) in &options.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}

		builder.body(Vec::new()).map_err(|err| ConfigError::from(err).into())
	}
}
impl<C, M> OAuthClient for DirectoryClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn config(&self) -> &ProviderConfig {
		&self.config
	}

	fn authorize_url(&self, request: &AuthorizationRequest) -> Url {
		let mut url = self.config.endpoints.authorization.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("client_id", &self.config.client_id);
		pairs.append_pair("response_type", "code");

		if request.send_redirect_uri {
			pairs.append_pair("redirect_uri", request.redirect_uri.as_str());
		}

		pairs.append_pair("scope", &request.scope);

		if let Some(state) = &request.state {
			pairs.append_pair("state", state);
		}

		drop(pairs);

		url
	}

	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
		redirect_uri: Option<&'a Url>,
	) -> ClientFuture<'a, TokenResponse> {
		Box::pin(async move {
			let request = self.token_request(code, redirect_uri)?;
			let response = self.send(Endpoint::Token, request).await?;
			let now = OffsetDateTime::now_utc();

			match TokenResponse::from_json_slice(&response.body, now) {
				Ok(token) => Ok(token),
				Err(source) if response.is_accepted() =>
					Err(TransportError::MalformedBody { endpoint: Endpoint::Token, source }.into()),
				Err(_) => Err(TransportError::UnexpectedStatus {
					endpoint: Endpoint::Token,
					status: response.status,
				}
				.into()),
			}
		})
	}

	fn authenticated_get<'a>(
		&'a self,
		token: &'a TokenSecret,
		path: &'a str,
		options: &'a RequestOptions,
	) -> ClientFuture<'a, ProviderResponse> {
		Box::pin(async move {
			let request = self.resource_request(token, path, options)?;

			self.send(Endpoint::from_path(path), request).await
		})
	}
}
impl<C, M> Debug for DirectoryClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DirectoryClient")
			.field("client_id", &self.config.client_id)
			.field("site", &self.config.site)
			.finish()
	}
}

fn map_common_transport_error<E, F>(endpoint: Endpoint, err: HttpClientError<E>, inner: F) -> Error
where
	E: 'static + Send + Sync + StdError,
	F: FnOnce(Endpoint, Box<E>) -> Error,
{
	match err {
		HttpClientError::Reqwest(source) => inner(endpoint, source),
		HttpClientError::Http(source) => ConfigError::from(source).into(),
		HttpClientError::Io(source) => TransportError::Io { endpoint, source }.into(),
		HttpClientError::Other(message) => TransportError::Other { endpoint, message }.into(),
		_ => TransportError::Other { endpoint, message: "unrecognized transport failure".into() }
			.into(),
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(endpoint: Endpoint, meta: Option<&ResponseMetadata>, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		let status =
			meta.and_then(|value| value.status).or_else(|| err.status().map(|code| code.as_u16()));

		return TransportError::Timeout { endpoint, status }.into();
	}

	TransportError::network(endpoint, err).into()
}

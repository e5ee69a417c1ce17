//! Strategy-level error types shared across configuration, transport, and callback handling.

// self
use crate::{_prelude::*, provider::Endpoint};

/// Strategy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical strategy error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, malformed payloads).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider answered the token request with an OAuth error code.
	#[error(transparent)]
	Provider(#[from] ProviderError),

	/// Token failed validation or was rejected by a protected endpoint.
	#[error("Token rejected: {reason}.")]
	TokenInvalid {
		/// Human-readable rejection reason.
		reason: String,
	},
	/// Callback carried neither `code` nor `access_token`.
	#[error("No code received.")]
	MissingCredential,
}

/// Configuration and validation failures raised while building clients.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Required key is absent from the process configuration.
	#[error("Configuration is missing the required `{key}` key.")]
	MissingKey {
		/// Name of the missing configuration key.
		key: &'static str,
	},
	/// A configured value could not be interpreted.
	#[error("Configuration key `{key}` has an invalid value `{value}`.")]
	InvalidValue {
		/// Name of the offending configuration key.
		key: &'static str,
		/// Raw value that failed to parse.
		value: String,
	},
	/// A configured URL could not be parsed or joined.
	#[error("Configured {field} is not a valid URL.")]
	InvalidUrl {
		/// Configuration field that failed to parse.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Registry lookup failed for the requested provider.
	#[error("No strategy is registered for provider `{provider}`.")]
	UnknownProvider {
		/// Provider name used for the lookup.
		provider: String,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}

/// Transport-level failures surfaced as `OAuth2` failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint: {source}.")]
	Network {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request did not complete before the transport deadline.
	#[error("Request timed out while calling the {endpoint} endpoint.")]
	Timeout {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the {endpoint} endpoint: {source}.")]
	Io {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Provider answered with a status and body this adapter cannot interpret.
	#[error("The {endpoint} endpoint returned HTTP status {status}.")]
	UnexpectedStatus {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// HTTP status code.
		status: u16,
	},
	/// Provider responded with JSON that could not be parsed.
	#[error("The {endpoint} endpoint returned malformed JSON at `{}`.", .source.path())]
	MalformedBody {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Transport reported a failure without further detail.
	#[error("HTTP client error occurred while calling the {endpoint} endpoint: {message}.")]
	Other {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(endpoint: Endpoint, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}

	/// Returns the reason string reported to the host framework.
	pub fn reason(&self) -> String {
		self.to_string()
	}
}

/// OAuth error returned by the provider in place of an access token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
#[error("Provider returned `{code}`: {description}.")]
pub struct ProviderError {
	/// Provider-supplied `error` code.
	pub code: String,
	/// Provider-supplied `error_description`, empty when omitted.
	pub description: String,
}
impl ProviderError {
	/// Code used when a token response carries neither an access token nor an error code.
	pub const INVALID_TOKEN_RESPONSE: &'static str = "invalid_token_response";

	/// Creates a provider error from its code and description.
	pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
		Self { code: code.into(), description: description.into() }
	}
}

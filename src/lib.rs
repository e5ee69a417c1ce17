//! OAuth2 single sign-on strategy for directory-style identity providers: build the authorize
//! redirect, resolve the callback through code exchange or bearer validation, fetch the
//! profile, and hand back a normalized result or a structured failure.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod normalize;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// crates.io
	use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::StatusCode};
	// self
	use crate::{
		auth::ProviderId,
		config::{ClientOverrides, ProviderConfig, StrategyOptions, StrategySettings},
		flows::Strategy,
		http::{HttpTransport, ResponseMetadata, ResponseMetadataSlot},
		oauth::{DefaultTransportErrorMapper, DirectoryClient},
	};

	/// Provider name used by test strategies.
	pub const TEST_PROVIDER: &str = "directory";
	/// Client identifier used by test strategies.
	pub const TEST_CLIENT_ID: &str = "client-unit";
	/// Client secret used by test strategies.
	pub const TEST_CLIENT_SECRET: &str = "secret-unit";
	/// Custom site used by scripted test strategies.
	pub const TEST_SITE: &str = "https://directory.test";

	/// Failure reported by [`ScriptedTransport`].
	#[derive(Debug, ThisError)]
	#[error("{0}")]
	pub struct ScriptedError(pub String);

	/// Request captured by [`ScriptedTransport`].
	#[derive(Clone, Debug)]
	pub struct RecordedRequest {
		/// HTTP method.
		pub method: String,
		/// Full request URI.
		pub uri: String,
		/// Headers with lowercase names.
		pub headers: Vec<(String, String)>,
		/// Raw body.
		pub body: Vec<u8>,
	}
	impl RecordedRequest {
		/// Returns the first value of header `name`.
		pub fn header(&self, name: &str) -> Option<&str> {
			self.headers
				.iter()
				.find(|(key, _)| key.eq_ignore_ascii_case(name))
				.map(|(_, value)| value.as_str())
		}

		/// Returns the URI path.
		pub fn path(&self) -> String {
			Url::parse(&self.uri).map(|url| url.path().to_owned()).unwrap_or_default()
		}
	}
	impl From<&HttpRequest> for RecordedRequest {
		fn from(request: &HttpRequest) -> Self {
			Self {
				method: request.method().to_string(),
				uri: request.uri().to_string(),
				headers: request
					.headers()
					.iter()
					.map(|(name, value)| {
						(name.as_str().to_owned(), value.to_str().unwrap_or_default().to_owned())
					})
					.collect(),
				body: request.body().clone(),
			}
		}
	}

	enum Reply {
		Respond { status: u16, body: String },
		Fail(String),
	}

	#[derive(Default)]
	struct Script {
		replies: Mutex<VecDeque<Reply>>,
		requests: Mutex<Vec<RecordedRequest>>,
	}

	/// In-process transport that replays queued responses in order and records every request.
	#[derive(Clone, Default)]
	pub struct ScriptedTransport(Arc<Script>);
	impl ScriptedTransport {
		/// Queues an HTTP response.
		pub fn respond(self, status: u16, body: &str) -> Self {
			self.0.replies.lock().push_back(Reply::Respond { status, body: body.to_owned() });

			self
		}

		/// Queues a transport failure.
		pub fn fail(self, message: &str) -> Self {
			self.0.replies.lock().push_back(Reply::Fail(message.to_owned()));

			self
		}

		/// Requests seen so far, oldest first.
		pub fn requests(&self) -> Vec<RecordedRequest> {
			self.0.requests.lock().clone()
		}
	}
	impl HttpTransport for ScriptedTransport {
		type Handle = ScriptedHandle;
		type TransportError = ScriptedError;

		fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
			ScriptedHandle { transport: self.clone(), slot }
		}
	}

	/// Handle returned by [`ScriptedTransport`].
	pub struct ScriptedHandle {
		transport: ScriptedTransport,
		slot: ResponseMetadataSlot,
	}
	impl<'c> AsyncHttpClient<'c> for ScriptedHandle {
		type Error = HttpClientError<ScriptedError>;
		type Future =
			Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

		fn call(&'c self, request: HttpRequest) -> Self::Future {
			Box::pin(async move {
				self.slot.take();
				self.transport.0.requests.lock().push(RecordedRequest::from(&request));

				let reply = self.transport.0.replies.lock().pop_front();

				match reply {
					Some(Reply::Respond { status, body }) => {
						let code = StatusCode::from_u16(status)
							.map_err(|err| HttpClientError::Other(err.to_string()))?;
						let mut response = HttpResponse::new(body.into_bytes());

						*response.status_mut() = code;
						self.slot.store(ResponseMetadata { status: Some(status) });

						Ok(response)
					},
					Some(Reply::Fail(message)) =>
						Err(HttpClientError::Reqwest(Box::new(ScriptedError(message)))),
					None => Err(HttpClientError::Other("no scripted response left".into())),
				}
			})
		}
	}

	/// Settings with test credentials pointed at `site`.
	pub fn test_settings(site: &str) -> StrategySettings {
		StrategySettings::default()
			.with_client_id(TEST_CLIENT_ID)
			.with_client_secret(TEST_CLIENT_SECRET)
			.with_site(Url::parse(site).expect("Test site should parse."))
	}

	/// Resolved configuration for [`TEST_SITE`] with the given client identifier.
	pub fn test_provider_config(client_id: &str) -> ProviderConfig {
		let settings = test_settings(TEST_SITE).with_client_id(client_id);

		ProviderConfig::resolve(&settings, ClientOverrides::default())
			.expect("Test provider configuration should resolve.")
	}

	/// Strategy backed by `transport` with default options.
	pub fn test_strategy(transport: ScriptedTransport) -> Strategy {
		test_strategy_with_config(test_provider_config(TEST_CLIENT_ID), transport)
	}

	/// Strategy backed by `transport` using an explicit configuration.
	pub fn test_strategy_with_config(
		config: ProviderConfig,
		transport: ScriptedTransport,
	) -> Strategy {
		let client: DirectoryClient<ScriptedTransport, DefaultTransportErrorMapper> =
			DirectoryClient::with_http_client(config, transport, DefaultTransportErrorMapper);

		Strategy::new(test_provider_id(), Arc::new(client), StrategyOptions::default())
	}

	fn test_provider_id() -> ProviderId {
		ProviderId::new(TEST_PROVIDER).expect("Test provider name should be valid.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

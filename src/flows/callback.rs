//! Callback phase: credential branch selection, token validation, profile fetch.
//!
//! Branches are chosen by which parameter the callback carries, evaluated in order:
//! `code`, then `access_token`, then neither. Both credential branches share the profile
//! fetch. Every failure is recorded on the returned [`AuthTransaction`]; nothing past the
//! transaction boundary is raised.

// self
use crate::{
	_prelude::*,
	auth::{TokenResponse, TokenSecret, UserProfile},
	error::TransportError,
	flows::{AuthTransaction, Strategy, TransactionState, request::parse_query},
	oauth::RequestOptions,
	obs::{self, FlowOutcome, FlowSpan, Phase},
	provider::Endpoint,
};

const TOKEN_VERIFICATION_FAILED: &str = "Token verification failed";
const UNAUTHORIZED: &str = "unauthorized";

/// Inbound callback parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
	/// Authorization code (code flow).
	pub code: Option<String>,
	/// Bearer token (token flow).
	pub access_token: Option<String>,
	/// Passthrough state echoed by the provider.
	pub state: Option<String>,
}
impl CallbackParams {
	/// Reads `code`, `access_token`, and `state` from a URL-encoded query string.
	pub fn from_query(query: &str) -> Self {
		let mut params = Self::default();

		for (key, value) in parse_query(query) {
			let slot = match key.as_ref() {
				"code" => &mut params.code,
				"access_token" => &mut params.access_token,
				"state" => &mut params.state,
				_ => continue,
			};

			if slot.is_none() {
				*slot = Some(value.into_owned());
			}
		}

		params
	}

	/// Callback carrying an authorization code.
	pub fn code(code: impl Into<String>) -> Self {
		Self { code: Some(code.into()), ..Default::default() }
	}

	/// Callback carrying a bearer token.
	pub fn access_token(token: impl Into<String>) -> Self {
		Self { access_token: Some(token.into()), ..Default::default() }
	}
}

impl Strategy {
	/// Resolves a provider callback into a transaction.
	///
	/// The returned transaction is always in [`TransactionState::Resolved`]. Read the outcome
	/// with [`AuthTransaction::result`] or [`AuthTransaction::finish`], then discard it;
	/// credentials are wiped on cleanup or drop.
	pub async fn handle_callback(
		&self,
		params: &CallbackParams,
		default_callback: impl FnOnce() -> Url,
	) -> AuthTransaction {
		const PHASE: Phase = Phase::Callback;

		let span = FlowSpan::new(PHASE, "handle_callback");
		let mut tx = AuthTransaction::new(self.provider.clone(), self.options.uid_field.as_str());

		tx.advance(TransactionState::RequestSent);
		obs::record_phase_outcome(PHASE, FlowOutcome::Attempt);

		let outcome = span.instrument(self.resolve(&mut tx, params, default_callback)).await;

		match outcome {
			Ok(profile) => {
				tx.succeed(profile);
				obs::record_phase_outcome(PHASE, FlowOutcome::Success);
			},
			Err(err) => {
				let entry = tx.fail(&err);

				obs::record_failure(PHASE, &entry.kind);
				obs::record_phase_outcome(PHASE, FlowOutcome::Failure);
			},
		}

		tx
	}

	async fn resolve(
		&self,
		tx: &mut AuthTransaction,
		params: &CallbackParams,
		default_callback: impl FnOnce() -> Url,
	) -> Result<UserProfile> {
		let token = self.acquire_token(tx, params, default_callback).await?;
		let bearer = token.bearer().cloned().ok_or_else(|| Error::TokenInvalid {
			reason: TOKEN_VERIFICATION_FAILED.into(),
		})?;

		tx.store_token(token);

		self.fetch_profile(&bearer).await
	}

	async fn acquire_token(
		&self,
		tx: &mut AuthTransaction,
		params: &CallbackParams,
		default_callback: impl FnOnce() -> Url,
	) -> Result<TokenResponse> {
		if let Some(code) = params.code.as_deref() {
			tx.advance(TransactionState::CodeReceived);

			let redirect_uri =
				self.options.send_redirect_uri.then(|| self.redirect_uri(default_callback));
			let token = self.client.exchange_code(code, redirect_uri.as_ref()).await?;

			return Ok(token.into_issued()?);
		}
		if let Some(access_token) = params.access_token.as_deref() {
			tx.advance(TransactionState::TokenReceived);

			let token = TokenResponse::from_bearer(access_token);
			let valid = match token.bearer() {
				Some(secret) => self.client.validate(secret).await,
				None => false,
			};

			if !valid {
				return Err(Error::TokenInvalid { reason: TOKEN_VERIFICATION_FAILED.into() });
			}

			return Ok(token);
		}

		tx.advance(TransactionState::CredentialMissing);

		Err(Error::MissingCredential)
	}

	async fn fetch_profile(&self, token: &TokenSecret) -> Result<UserProfile> {
		let path = self.client.config().userinfo_path;
		let options = RequestOptions::default();
		let response = self.client.authenticated_get(token, path, &options).await?;

		if response.is_unauthorized() {
			return Err(Error::TokenInvalid { reason: UNAUTHORIZED.into() });
		}
		if !response.is_accepted() {
			return Err(TransportError::UnexpectedStatus {
				endpoint: Endpoint::Userinfo,
				status: response.status,
			}
			.into());
		}

		response.json().map_err(|source| {
			TransportError::MalformedBody { endpoint: Endpoint::Userinfo, source }.into()
		})
	}
}

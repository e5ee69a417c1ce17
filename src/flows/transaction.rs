//! Per-transaction context threaded through the callback phase.

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, TokenResponse, UserProfile},
	normalize::{self, AuthResult},
};

/// Position of a transaction in the sign-in state machine.
///
/// `Idle` and `RequestSent` belong to the request phase; a callback transaction starts in
/// `RequestSent` and always ends in [`TransactionState::Resolved`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransactionState {
	/// Nothing has happened yet.
	#[default]
	Idle,
	/// The user was redirected to the provider.
	RequestSent,
	/// The callback carried an authorization code.
	CodeReceived,
	/// The callback carried a bearer token.
	TokenReceived,
	/// The callback carried neither credential.
	CredentialMissing,
	/// Terminal state.
	Resolved(Resolution),
}
impl TransactionState {
	/// Returns `true` once the transaction reached a terminal state.
	pub fn is_resolved(self) -> bool {
		matches!(self, Self::Resolved(_))
	}
}

/// Terminal outcome of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
	/// Token and profile are available.
	Success,
	/// A failure was recorded.
	Failure,
}

/// One `{kind, message}` failure record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
	/// Failure class (`token`, `missing_code`, `OAuth2`, or a provider error code).
	pub kind: String,
	/// Human-readable detail.
	pub message: String,
}
impl FailureEntry {
	/// Kind used for transport failures.
	pub const TRANSPORT: &'static str = "OAuth2";
	/// Kind used for rejected tokens.
	pub const TOKEN: &'static str = "token";
	/// Kind used when the callback carried no credential.
	pub const MISSING_CODE: &'static str = "missing_code";
	/// Kind used for configuration problems surfaced mid-transaction.
	pub const CONFIG: &'static str = "config";
	/// Message paired with [`FailureEntry::MISSING_CODE`].
	pub const NO_CODE_RECEIVED: &'static str = "No code received";

	/// Creates a failure record.
	pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
		Self { kind: kind.into(), message: message.into() }
	}
}
impl From<&Error> for FailureEntry {
	fn from(err: &Error) -> Self {
		match err {
			Error::Config(e) => Self::new(Self::CONFIG, e.to_string()),
			Error::Transport(e) => Self::new(Self::TRANSPORT, e.reason()),
			Error::Provider(e) => Self::new(e.code.as_str(), e.description.as_str()),
			Error::TokenInvalid { reason } => Self::new(Self::TOKEN, reason.as_str()),
			Error::MissingCredential => Self::new(Self::MISSING_CODE, Self::NO_CODE_RECEIVED),
		}
	}
}

/// Ordered failure records handed to the host framework.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFailure {
	/// Failures in the order they were recorded.
	pub errors: Vec<FailureEntry>,
}
impl AuthFailure {
	/// Creates a failure holding a single record.
	pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
		Self { errors: vec![FailureEntry::new(kind, message)] }
	}

	/// Appends a record.
	pub fn push(&mut self, entry: FailureEntry) {
		self.errors.push(entry);
	}

	/// Returns the first recorded failure.
	pub fn first(&self) -> Option<&FailureEntry> {
		self.errors.first()
	}
}
impl From<&Error> for AuthFailure {
	fn from(err: &Error) -> Self {
		Self { errors: vec![err.into()] }
	}
}
impl Display for AuthFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		for (i, entry) in self.errors.iter().enumerate() {
			if i > 0 {
				f.write_str("; ")?;
			}

			write!(f, "{}: {}", entry.kind, entry.message)?;
		}

		Ok(())
	}
}

/// Context for a single sign-in attempt.
///
/// The token and profile live here and nowhere else. [`AuthTransaction::cleanup`] wipes both;
/// it also runs on drop, so a transaction that is never consumed does not leak credentials.
pub struct AuthTransaction {
	provider: ProviderId,
	uid_field: String,
	state: TransactionState,
	token: Option<TokenResponse>,
	profile: Option<UserProfile>,
	failure: Option<AuthFailure>,
}
impl AuthTransaction {
	/// Starts a transaction in [`TransactionState::Idle`].
	pub fn new(provider: ProviderId, uid_field: impl Into<String>) -> Self {
		Self {
			provider,
			uid_field: uid_field.into(),
			state: TransactionState::Idle,
			token: None,
			profile: None,
			failure: None,
		}
	}

	/// Provider the transaction belongs to.
	pub fn provider(&self) -> &ProviderId {
		&self.provider
	}

	/// Current state.
	pub fn state(&self) -> TransactionState {
		self.state
	}

	/// Token stored by the callback phase.
	pub fn token(&self) -> Option<&TokenResponse> {
		self.token.as_ref()
	}

	/// Profile stored by the callback phase.
	pub fn profile(&self) -> Option<&UserProfile> {
		self.profile.as_ref()
	}

	/// Recorded failure, if the transaction failed.
	pub fn failure(&self) -> Option<&AuthFailure> {
		self.failure.as_ref()
	}

	/// Normalized outcome, or `None` while unresolved or after cleanup.
	pub fn result(&self) -> Option<Result<AuthResult, AuthFailure>> {
		match self.state {
			TransactionState::Resolved(Resolution::Success) => {
				let token = self.token.as_ref()?;
				let profile = self.profile.as_ref()?;

				Some(Ok(normalize::auth_result(&self.provider, &self.uid_field, token, profile)))
			},
			TransactionState::Resolved(Resolution::Failure) => self.failure.clone().map(Err),
			_ => None,
		}
	}

	/// Consumes the transaction, returning its outcome and wiping credentials.
	pub fn finish(mut self) -> Result<AuthResult, AuthFailure> {
		let outcome = self.result().unwrap_or_else(|| {
			Err(AuthFailure::new(FailureEntry::TRANSPORT, "Transaction did not resolve"))
		});

		self.cleanup();

		outcome
	}

	/// Discards the token and profile. Safe to call more than once.
	pub fn cleanup(&mut self) {
		if let Some(token) = self.token.as_mut() {
			token.wipe();
		}
		if let Some(profile) = self.profile.as_mut() {
			profile.clear();
		}

		self.token = None;
		self.profile = None;
	}

	pub(crate) fn advance(&mut self, next: TransactionState) {
		self.state = next;
	}

	pub(crate) fn store_token(&mut self, token: TokenResponse) {
		self.token = Some(token);
	}

	pub(crate) fn succeed(&mut self, profile: UserProfile) {
		self.profile = Some(profile);
		self.state = TransactionState::Resolved(Resolution::Success);
	}

	pub(crate) fn fail(&mut self, err: &Error) -> &FailureEntry {
		self.state = TransactionState::Resolved(Resolution::Failure);

		let failure = self.failure.get_or_insert_with(AuthFailure::default);

		failure.push(err.into());

		&failure.errors[failure.errors.len() - 1]
	}
}
impl Drop for AuthTransaction {
	fn drop(&mut self) {
		self.cleanup();
	}
}
impl Debug for AuthTransaction {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthTransaction")
			.field("provider", &self.provider)
			.field("state", &self.state)
			.field("token_present", &self.token.is_some())
			.field("profile_present", &self.profile.is_some())
			.field("failure", &self.failure)
			.finish()
	}
}

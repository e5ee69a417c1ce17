//! Secure token secret wrapper that redacts and wipes sensitive material.

// crates.io
use zeroize::Zeroize;
// self
use crate::_prelude::*;

/// Redacted secret wrapper keeping tokens and client secrets out of logs.
///
/// The backing buffer is overwritten when the value is dropped or [`wipe`](Self::wipe)d.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner secret. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the secret holds no characters.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Overwrites the secret in place, leaving an empty value.
	pub fn wipe(&mut self) {
		self.0.zeroize();
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
impl Drop for TokenSecret {
	fn drop(&mut self) {
		self.wipe();
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn wipe_clears_the_secret() {
		let mut secret = TokenSecret::new("bearer-value");

		secret.wipe();

		assert!(secret.is_empty());
	}
}

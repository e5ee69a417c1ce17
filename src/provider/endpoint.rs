//! Fixed directory endpoint paths and their labels.

// self
use crate::_prelude::*;

/// Authorization endpoint path appended to the selected site host.
pub const AUTHORIZE_PATH: &str = "/directory/v1/oauth/authorize";
/// Token endpoint path appended to the selected site host.
pub const TOKEN_PATH: &str = "/directory/v1/oauth/token";
/// Token validation (introspection) endpoint path appended to the selected site host.
pub const INTROSPECT_PATH: &str = "/directory/v1/oauth/validate";
/// Userinfo endpoint path appended to the selected site host.
pub const USERINFO_PATH: &str = "/directory/v1/userinfo";

/// Upstream endpoints called during a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// Browser-facing authorization endpoint.
	Authorize,
	/// Back-channel token endpoint.
	Token,
	/// Token validation endpoint.
	Validate,
	/// Userinfo endpoint.
	Userinfo,
	/// Any other path fetched through an authenticated request.
	Resource,
}
impl Endpoint {
	/// Returns a stable label suitable for span fields and error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			Endpoint::Authorize => "authorize",
			Endpoint::Token => "token",
			Endpoint::Validate => "validate",
			Endpoint::Userinfo => "userinfo",
			Endpoint::Resource => "resource",
		}
	}

	/// Classifies a request path relative to the site host.
	pub fn from_path(path: &str) -> Self {
		match path {
			AUTHORIZE_PATH => Endpoint::Authorize,
			TOKEN_PATH => Endpoint::Token,
			INTROSPECT_PATH => Endpoint::Validate,
			USERINFO_PATH => Endpoint::Userinfo,
			_ => Endpoint::Resource,
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn paths_classify_to_endpoints() {
		assert_eq!(Endpoint::from_path(INTROSPECT_PATH), Endpoint::Validate);
		assert_eq!(Endpoint::from_path(USERINFO_PATH), Endpoint::Userinfo);
		assert_eq!(Endpoint::from_path("/directory/v1/groups"), Endpoint::Resource);
	}
}

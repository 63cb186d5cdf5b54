// self
use crate::manager::ValidatedIdentity;

/// View of an incoming request used by [`AuthorizationStage`](super::AuthorizationStage).
///
/// With the `http` feature this is implemented for [`http::Request`], where the identity is
/// stored in [`http::Request::extensions`] keyed by [`ValidatedIdentity`].
pub trait AuthRequest {
	/// Returns true for pre-flight (`OPTIONS`) requests.
	fn is_preflight(&self) -> bool;

	/// Returns the first value of the named header, if it is valid text.
	fn header(&self, name: &str) -> Option<&str>;

	/// Returns the decoded value of the first query parameter with the given name.
	fn query_param(&self, name: &str) -> Option<String>;

	/// Stores the validated identity for downstream handlers.
	fn attach_identity(&mut self, identity: ValidatedIdentity);
}

#[cfg(feature = "http")]
impl<B> AuthRequest for http::Request<B> {
	fn is_preflight(&self) -> bool {
		self.method() == http::Method::OPTIONS
	}

	fn header(&self, name: &str) -> Option<&str> {
		self.headers().get(name)?.to_str().ok()
	}

	fn query_param(&self, name: &str) -> Option<String> {
		let query = self.uri().query()?;

		url::form_urlencoded::parse(query.as_bytes())
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.into_owned())
	}

	fn attach_identity(&mut self, identity: ValidatedIdentity) {
		self.extensions_mut().insert(identity);
	}
}

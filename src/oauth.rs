//! Generator capabilities an external OAuth2 authorization server can plug in.
//!
//! The authorization server owns the flow (client authentication, redirects, consent). It only
//! asks for opaque strings: an authorization code and an access token. [`TokenManager`]
//! produces both as signed tokens, so a resource server can later validate them with the same
//! specification.

pub mod id;
pub mod scope;

pub use id::*;
pub use scope::*;

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{_prelude::*, claims::Claims, manager::TokenManager};

/// Claim naming the client a grant was issued to.
pub const CLIENT_ID_CLAIM: &str = "client_id";
/// Claim naming the resource owner.
pub const SUBJECT_CLAIM: &str = "sub";
/// Claim carrying the space-delimited scope.
pub const SCOPE_CLAIM: &str = "scope";
/// Claim carrying the redirect URI bound to an authorization code.
pub const REDIRECT_URI_CLAIM: &str = "redirect_uri";
/// Claim distinguishing authorization codes from access tokens.
pub const TOKEN_USE_CLAIM: &str = "token_use";
/// Unique token identifier.
pub const TOKEN_ID_CLAIM: &str = "jti";

/// Context an authorization server supplies when asking for a code or token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrantContext {
	/// Client the grant is issued to.
	pub client_id: ClientId,
	/// Resource owner, absent for client-only grants.
	pub subject: Option<SubjectId>,
	/// Granted scope.
	pub scope: ScopeSet,
	/// Redirect URI the authorization code is bound to.
	pub redirect_uri: Option<Url>,
}
impl GrantContext {
	/// Creates a context for a client with no subject, scope, or redirect URI.
	pub fn new(client_id: ClientId) -> Self {
		Self { client_id, subject: None, scope: ScopeSet::default(), redirect_uri: None }
	}

	/// Sets the resource owner.
	pub fn with_subject(mut self, subject: SubjectId) -> Self {
		self.subject = Some(subject);

		self
	}

	/// Sets the granted scope.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Sets the redirect URI.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	fn claims(&self, use_: TokenUse) -> Claims {
		let mut claims = Claims::new()
			.with(CLIENT_ID_CLAIM, self.client_id.as_ref())
			.with(TOKEN_USE_CLAIM, use_.as_str())
			.with(TOKEN_ID_CLAIM, random_token_id());

		if let Some(subject) = &self.subject {
			claims.insert(SUBJECT_CLAIM, subject.as_ref());
		}
		if !self.scope.is_empty() {
			claims.insert(SCOPE_CLAIM, self.scope.normalized());
		}
		if let (TokenUse::AuthorizationCode, Some(redirect_uri)) = (use_, &self.redirect_uri) {
			claims.insert(REDIRECT_URI_CLAIM, redirect_uri.as_str());
		}

		claims
	}
}

/// Values of the `token_use` claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUse {
	/// Short-lived authorization code.
	AuthorizationCode,
	/// Access token presented to resource servers.
	AccessToken,
}
impl TokenUse {
	/// Returns the claim value.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::AuthorizationCode => "authorization_code",
			Self::AccessToken => "access_token",
		}
	}
}
impl Display for TokenUse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Produces authorization codes for an authorization server.
pub trait AuthorizeCodeGenerator
where
	Self: Send + Sync,
{
	/// Generates an authorization code for the grant.
	fn generate_authorization_code(&self, context: &GrantContext) -> Result<String>;
}

/// Produces access tokens for an authorization server.
pub trait AccessTokenGenerator
where
	Self: Send + Sync,
{
	/// Generates an access token for the grant.
	fn generate_access_token(&self, context: &GrantContext) -> Result<String>;
}

impl AuthorizeCodeGenerator for TokenManager {
	fn generate_authorization_code(&self, context: &GrantContext) -> Result<String> {
		self.create(context.claims(TokenUse::AuthorizationCode))
	}
}
impl AccessTokenGenerator for TokenManager {
	fn generate_access_token(&self, context: &GrantContext) -> Result<String> {
		self.create(context.claims(TokenUse::AccessToken))
	}
}

fn random_token_id() -> String {
	let bytes: [u8; 16] = rand::random();

	URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn context() -> GrantContext {
		GrantContext::new(ClientId::new("web-app").expect("Client fixture should be valid."))
			.with_subject(SubjectId::new("user-7").expect("Subject fixture should be valid."))
			.with_scope(ScopeSet::new(["write", "read"]).expect("Scopes should be valid."))
			.with_redirect_uri(
				Url::parse("https://app.example.com/callback").expect("Redirect URI should parse."),
			)
	}

	#[test]
	fn code_claims_bind_the_redirect_uri() {
		let claims = context().claims(TokenUse::AuthorizationCode);

		assert_eq!(claims.get_str(CLIENT_ID_CLAIM), Some("web-app"));
		assert_eq!(claims.get_str(SUBJECT_CLAIM), Some("user-7"));
		assert_eq!(claims.get_str(SCOPE_CLAIM), Some("read write"));
		assert_eq!(claims.get_str(REDIRECT_URI_CLAIM), Some("https://app.example.com/callback"));
		assert_eq!(claims.get_str(TOKEN_USE_CLAIM), Some("authorization_code"));
		assert_eq!(claims.get_str(TOKEN_ID_CLAIM).map(str::len), Some(22));
	}

	#[test]
	fn access_token_claims_omit_optional_fields() {
		let client_only =
			GrantContext::new(ClientId::new("svc").expect("Client should be valid."));
		let claims = client_only.claims(TokenUse::AccessToken);

		assert_eq!(claims.get_str(TOKEN_USE_CLAIM), Some("access_token"));
		assert!(!claims.contains_key(SUBJECT_CLAIM));
		assert!(!claims.contains_key(SCOPE_CLAIM));
		assert!(!claims.contains_key(REDIRECT_URI_CLAIM));
		assert!(!context().claims(TokenUse::AccessToken).contains_key(REDIRECT_URI_CLAIM));
	}

	#[test]
	fn token_ids_differ_between_calls() {
		let context = context();

		assert_ne!(
			context.claims(TokenUse::AuthorizationCode).get_str(TOKEN_ID_CLAIM),
			context.claims(TokenUse::AuthorizationCode).get_str(TOKEN_ID_CLAIM)
		);
	}
}

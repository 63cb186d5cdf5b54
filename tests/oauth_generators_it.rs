mod common;

// crates.io
use jwt_gate::{
	oauth::{
		AccessTokenGenerator, AuthorizeCodeGenerator, ClientId, GrantContext, ScopeSet, SubjectId,
	},
	spec::SigningMethod,
	url::Url,
};
// self
use common::*;

fn context() -> GrantContext {
	GrantContext::new(ClientId::new("web-app").expect("Client should be valid."))
		.with_subject(SubjectId::new("user-7").expect("Subject should be valid."))
		.with_scope("orders:read orders:write".parse::<ScopeSet>().expect("Scope should parse."))
		.with_redirect_uri(
			Url::parse("https://app.example.com/cb").expect("Redirect URI should parse."),
		)
}

fn issue_code(generator: &dyn AuthorizeCodeGenerator, context: &GrantContext) -> String {
	generator.generate_authorization_code(context).expect("Code should be generated.")
}

fn issue_access(generator: &dyn AccessTokenGenerator, context: &GrantContext) -> String {
	generator.generate_access_token(context).expect("Access token should be generated.")
}

#[test]
fn authorization_codes_validate_with_grant_claims() {
	let manager = manager_for(SigningMethod::Es256);
	let code = issue_code(&manager, &context());
	let identity = manager.validate(&code).expect("Code should validate.");

	assert_eq!(identity.claims.get_str("client_id"), Some("web-app"));
	assert_eq!(identity.subject(), Some("user-7"));
	assert_eq!(identity.claims.get_str("scope"), Some("orders:read orders:write"));
	assert_eq!(identity.claims.get_str("redirect_uri"), Some("https://app.example.com/cb"));
	assert_eq!(identity.claims.get_str("token_use"), Some("authorization_code"));
	assert!(identity.claims.get_str("jti").is_some());
}

#[test]
fn access_tokens_are_distinguishable_from_codes() {
	let manager = manager_for(SigningMethod::Hs384);
	let token = issue_access(&manager, &context());
	let identity = manager.validate(&token).expect("Access token should validate.");

	assert_eq!(identity.claims.get_str("token_use"), Some("access_token"));
	assert!(!identity.claims.contains_key("redirect_uri"));
}

#[test]
fn repeated_grants_produce_distinct_codes() {
	let manager = manager_for(SigningMethod::Hs256);
	let context = context();

	assert_ne!(issue_code(&manager, &context), issue_code(&manager, &context));
}

#[test]
fn client_only_grants_omit_subject_and_scope() {
	let manager = manager_for(SigningMethod::Rs256);
	let context = GrantContext::new(ClientId::new("batch-job").expect("Client should be valid."));
	let identity = manager
		.validate(&issue_access(&manager, &context))
		.expect("Access token should validate.");

	assert_eq!(identity.subject(), None);
	assert!(!identity.claims.contains_key("scope"));
	assert_eq!(identity.claims.get_str("client_id"), Some("batch-job"));
}

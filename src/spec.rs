//! Token policy shared by the token manager and the authorization stage.
//!
//! A [`Specification`] is assembled once at startup, either through
//! [`Specification::builder`] or from a [`SpecificationConfig`] document, and is never mutated
//! afterwards. Both consumers hold it behind an [`Arc`].

/// Builder API for assembling specifications.
pub mod builder;
/// Serde-backed configuration documents.
pub mod config;
/// Signing method and family identifiers.
pub mod method;

pub use builder::*;
pub use config::*;
pub use method::*;

// self
use crate::{
	_prelude::*,
	key::{SigningKeyProvider, ValidationKeyProvider},
};

/// Default header carrying the bearer token.
pub const DEFAULT_HEADER_NAME: &str = "Authorization";
/// Default query parameter carrying the token when parameters are allowed.
pub const DEFAULT_PARAM_NAME: &str = "token";

/// Immutable token policy.
#[derive(Clone)]
pub struct Specification {
	/// Accept tokens from the query parameter when the header is absent.
	pub allow_param: bool,
	/// Gate pre-flight (`OPTIONS`) requests too; when false they bypass authorization.
	pub auth_options: bool,
	/// Token lifetime from issuance, in minutes.
	pub ttl_minutes: u32,
	/// Issuer embedded in and required of every token.
	pub issuer: String,
	/// Method used to sign new tokens; validation accepts any method of the same family.
	pub signing_method: SigningMethod,
	/// Clock-skew tolerance applied to `exp`.
	pub leeway: Duration,
	/// Header inspected for `Bearer` tokens.
	pub header_name: String,
	/// Query parameter inspected when [`allow_param`](Self::allow_param) is set.
	pub param_name: String,
	/// Provider of the signing key.
	pub signing_key: Arc<dyn SigningKeyProvider>,
	/// Provider of validation keys.
	pub validation_key: Arc<dyn ValidationKeyProvider>,
}
impl Specification {
	/// Creates a new builder with default policy flags.
	pub fn builder() -> SpecificationBuilder {
		SpecificationBuilder::new()
	}

	/// Token lifetime as a [`Duration`].
	pub fn ttl(&self) -> Duration {
		Duration::minutes(i64::from(self.ttl_minutes))
	}

	/// Returns the signing family every accepted token must belong to.
	pub fn family(&self) -> SigningFamily {
		self.signing_method.family()
	}
}
impl Debug for Specification {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Specification")
			.field("allow_param", &self.allow_param)
			.field("auth_options", &self.auth_options)
			.field("ttl_minutes", &self.ttl_minutes)
			.field("issuer", &self.issuer)
			.field("signing_method", &self.signing_method)
			.field("leeway", &self.leeway)
			.field("header_name", &self.header_name)
			.field("param_name", &self.param_name)
			.finish_non_exhaustive()
	}
}

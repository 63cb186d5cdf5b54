// self
use crate::{_prelude::*, claims::Claims, spec::SigningMethod};

/// Checkpoints a token passes through during validation.
///
/// Validation is strictly ordered; a rejection reports the last checkpoint reached, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValidationState {
	/// Segments decoded and the header algorithm belongs to the configured family.
	Parsed,
	/// Signature verified against the validation key.
	SignatureChecked,
	/// `exp` lies in the future (plus leeway).
	ExpiryChecked,
	/// `iss` equals the configured issuer.
	IssuerChecked,
	/// Token accepted.
	Accepted,
}
impl ValidationState {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Parsed => "parsed",
			Self::SignatureChecked => "signature_checked",
			Self::ExpiryChecked => "expiry_checked",
			Self::IssuerChecked => "issuer_checked",
			Self::Accepted => "accepted",
		}
	}

	pub(crate) fn label(state: Option<Self>) -> &'static str {
		state.map_or("received", Self::as_str)
	}
}

/// Claims recovered from a token that passed every validation check.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedIdentity {
	/// Full claim set, including `iss` and `exp`.
	pub claims: Claims,
	/// Issuer the token was accepted for.
	pub issuer: String,
	/// Instant encoded by the `exp` claim.
	pub expires_at: OffsetDateTime,
	/// Method named by the token header.
	pub method: SigningMethod,
}
impl ValidatedIdentity {
	/// The `sub` claim, when present as a string.
	pub fn subject(&self) -> Option<&str> {
		self.claims.get_str("sub")
	}

	/// Claims supplied by the token creator, without `iss` and `exp`.
	pub fn custom_claims(&self) -> Claims {
		self.claims.without_reserved()
	}
}

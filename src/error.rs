//! Crate-level error types shared by the token manager, key providers, and the authorization
//! stage.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every variant is terminal for the call (or request) in which it occurs; nothing is retried.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// A key provider could not supply usable key material.
	#[error(transparent)]
	KeyUnavailable(#[from] crate::key::KeyError),
	/// The signing primitive rejected the key or failed to sign.
	#[error("Token signing failed: {reason}.")]
	SigningFailure {
		/// Short description of the failure.
		reason: String,
		/// Underlying cryptographic error, when available.
		#[source]
		source: Option<BoxError>,
	},
	/// A claim value is not one of the supported kinds.
	#[error("Claim `{key}` holds an unsupported {kind} value.")]
	UnsupportedClaim {
		/// Dotted path of the offending claim.
		key: String,
		/// Kind of the rejected value (`null`, `array`, ...).
		kind: &'static str,
	},
	/// The request carried no candidate token.
	#[error("No token was supplied with the request.")]
	TokenMissing,
	/// The token could not be parsed.
	#[error("Token is malformed: {reason}.")]
	MalformedToken {
		/// Short description of the structural problem.
		reason: String,
	},
	/// The token's algorithm does not belong to the configured signing family.
	#[error("Token algorithm `{found}` is not accepted; expected the {expected} family.")]
	AlgorithmMismatch {
		/// Algorithm named by the token header.
		found: String,
		/// Configured signing family.
		expected: &'static str,
	},
	/// The signature does not verify against the validation key.
	#[error("Token signature is invalid.")]
	InvalidSignature,
	/// The token's `exp` instant has passed.
	#[error("Token expired at {expired_at}.")]
	TokenExpired {
		/// Expiry instant carried by the token.
		expired_at: OffsetDateTime,
	},
	/// The token's `iss` claim differs from the configured issuer.
	#[error("Token issuer {found:?} does not match the configured issuer.")]
	IssuerMismatch {
		/// Issuer found in the token, if any.
		found: Option<String>,
	},
}
impl Error {
	/// Returns the stable kind of this error for logs and metrics.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Config(_) => ErrorKind::Config,
			Self::KeyUnavailable(_) => ErrorKind::KeyUnavailable,
			Self::SigningFailure { .. } => ErrorKind::SigningFailure,
			Self::UnsupportedClaim { .. } => ErrorKind::UnsupportedClaim,
			Self::TokenMissing => ErrorKind::TokenMissing,
			Self::MalformedToken { .. } => ErrorKind::MalformedToken,
			Self::AlgorithmMismatch { .. } => ErrorKind::AlgorithmMismatch,
			Self::InvalidSignature => ErrorKind::InvalidSignature,
			Self::TokenExpired { .. } => ErrorKind::TokenExpired,
			Self::IssuerMismatch { .. } => ErrorKind::IssuerMismatch,
		}
	}

	pub(crate) fn signing(reason: impl Into<String>) -> Self {
		Self::SigningFailure { reason: reason.into(), source: None }
	}

	pub(crate) fn signing_with(
		reason: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::SigningFailure { reason: reason.into(), source: Some(Box::new(src)) }
	}

	pub(crate) fn malformed(reason: impl Into<String>) -> Self {
		Self::MalformedToken { reason: reason.into() }
	}
}

/// Stable error classification used as a log field and metric label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	/// See [`Error::Config`].
	Config,
	/// See [`Error::KeyUnavailable`].
	KeyUnavailable,
	/// See [`Error::SigningFailure`].
	SigningFailure,
	/// See [`Error::UnsupportedClaim`].
	UnsupportedClaim,
	/// See [`Error::TokenMissing`].
	TokenMissing,
	/// See [`Error::MalformedToken`].
	MalformedToken,
	/// See [`Error::AlgorithmMismatch`].
	AlgorithmMismatch,
	/// See [`Error::InvalidSignature`].
	InvalidSignature,
	/// See [`Error::TokenExpired`].
	TokenExpired,
	/// See [`Error::IssuerMismatch`].
	IssuerMismatch,
}
impl ErrorKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Config => "config",
			Self::KeyUnavailable => "key_unavailable",
			Self::SigningFailure => "signing_failure",
			Self::UnsupportedClaim => "unsupported_claim",
			Self::TokenMissing => "token_missing",
			Self::MalformedToken => "malformed_token",
			Self::AlgorithmMismatch => "algorithm_mismatch",
			Self::InvalidSignature => "invalid_signature",
			Self::TokenExpired => "token_expired",
			Self::IssuerMismatch => "issuer_mismatch",
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration failures raised while assembling a [`Specification`](crate::spec::Specification).
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The specification builder rejected its inputs.
	#[error(transparent)]
	Specification(#[from] crate::spec::SpecificationError),
	/// A configuration document could not be parsed.
	#[error("Configuration is invalid at `{path}`.")]
	Parse {
		/// Field path at which parsing failed.
		path: String,
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ConfigError {
	pub(crate) fn parse(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = err.path().to_string();

		Self::Parse { path, source: err.into_inner() }
	}
}
impl From<crate::spec::SpecificationError> for Error {
	fn from(e: crate::spec::SpecificationError) -> Self {
		Self::Config(e.into())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::key::KeyError;

	#[test]
	fn key_error_converts_into_key_unavailable_with_source() {
		let key_error = KeyError::unavailable("kms unreachable");
		let error: Error = key_error.into();

		assert_eq!(error.kind(), ErrorKind::KeyUnavailable);
		assert!(error.to_string().contains("kms unreachable"));
	}

	#[test]
	fn signing_failure_keeps_source() {
		let io = std::io::Error::other("bad key");
		let error = Error::signing_with("RSA key rejected", io);

		assert_eq!(error.kind(), ErrorKind::SigningFailure);

		let source =
			StdError::source(&error).expect("Signing failure should expose the original error.");

		assert_eq!(source.to_string(), "bad key");
	}

	#[test]
	fn kind_labels_are_stable() {
		assert_eq!(ErrorKind::TokenExpired.as_str(), "token_expired");
		assert_eq!(Error::TokenMissing.kind().to_string(), "token_missing");
		assert_eq!(
			serde_json::to_string(&ErrorKind::AlgorithmMismatch)
				.expect("ErrorKind should serialize to JSON."),
			"\"algorithm_mismatch\""
		);
	}
}

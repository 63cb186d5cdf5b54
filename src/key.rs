//! Key provider contracts and built-in providers.
//!
//! The token manager never stores keys itself. It asks a [`SigningKeyProvider`] for the key
//! used to sign new tokens and a [`ValidationKeyProvider`] for the key that validates a token
//! signed with a given [`SigningMethod`]. Both traits are implemented for plain closures, so a
//! remote KMS lookup is a one-liner:
//!
//! ```
//! use jwt_gate::key::{KeyError, KeyMaterial, SigningKeyProvider};
//!
//! let provider = || -> Result<KeyMaterial, KeyError> { Ok(KeyMaterial::hmac("secret")) };
//!
//! assert!(provider.signing_key().is_ok());
//! ```
//!
//! Providers are invoked synchronously, once per create/validate call. Any caching, locking,
//! retry, or timeout policy belongs to the provider.

pub mod file;
pub mod memory;

pub use file::FileKey;
pub use memory::StaticKey;

// self
use crate::{_prelude::*, spec::SigningMethod};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Supplies the key material used to sign new tokens.
pub trait SigningKeyProvider
where
	Self: Send + Sync,
{
	/// Returns the current signing key.
	fn signing_key(&self) -> Result<KeyMaterial, KeyError>;
}
impl<F> SigningKeyProvider for F
where
	F: Send + Sync + Fn() -> Result<KeyMaterial, KeyError>,
{
	fn signing_key(&self) -> Result<KeyMaterial, KeyError> {
		self()
	}
}

/// Supplies the key material that validates tokens signed with a given method.
pub trait ValidationKeyProvider
where
	Self: Send + Sync,
{
	/// Returns the validation key for tokens whose header names `method`.
	fn validation_key(&self, method: SigningMethod) -> Result<KeyMaterial, KeyError>;
}
impl<F> ValidationKeyProvider for F
where
	F: Send + Sync + Fn(SigningMethod) -> Result<KeyMaterial, KeyError>,
{
	fn validation_key(&self, method: SigningMethod) -> Result<KeyMaterial, KeyError> {
		self(method)
	}
}

/// Raw key material handed to the signing and validation primitives.
///
/// HMAC methods expect [`KeyMaterial::Hmac`]. RSA and ECDSA methods expect an encoded key:
/// a PKCS#8 (or PKCS#1 for RSA) private key when signing, and an SPKI public key when
/// validating.
#[derive(Clone, PartialEq, Eq)]
pub enum KeyMaterial {
	/// Shared secret for the HMAC family.
	Hmac(Vec<u8>),
	/// PEM-encoded asymmetric key.
	Pem(Vec<u8>),
	/// DER-encoded asymmetric key.
	Der(Vec<u8>),
}
impl KeyMaterial {
	/// Wraps a shared HMAC secret.
	pub fn hmac(secret: impl AsRef<[u8]>) -> Self {
		Self::Hmac(secret.as_ref().to_vec())
	}

	/// Wraps a PEM-encoded key.
	pub fn pem(pem: impl AsRef<[u8]>) -> Self {
		Self::Pem(pem.as_ref().to_vec())
	}

	/// Wraps a DER-encoded key.
	pub fn der(der: impl AsRef<[u8]>) -> Self {
		Self::Der(der.as_ref().to_vec())
	}

	/// Returns the encoding label, suitable for logs.
	pub const fn encoding(&self) -> &'static str {
		match self {
			Self::Hmac(_) => "hmac",
			Self::Pem(_) => "pem",
			Self::Der(_) => "der",
		}
	}

	/// Returns the raw bytes. Callers must avoid logging them.
	pub fn expose(&self) -> &[u8] {
		match self {
			Self::Hmac(bytes) | Self::Pem(bytes) | Self::Der(bytes) => bytes,
		}
	}
}
impl Debug for KeyMaterial {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("KeyMaterial").field(&self.encoding()).field(&"<redacted>").finish()
	}
}

/// Error returned by key providers.
#[derive(Debug, ThisError)]
#[error("Key material is unavailable: {reason}.")]
pub struct KeyError {
	/// Provider-supplied reason string.
	pub reason: String,
	/// Underlying failure, when available.
	#[source]
	pub source: Option<BoxError>,
}
impl KeyError {
	/// Creates an error carrying only a reason.
	pub fn unavailable(reason: impl Into<String>) -> Self {
		Self { reason: reason.into(), source: None }
	}

	/// Creates an error wrapping an underlying failure.
	pub fn with_source(
		reason: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self { reason: reason.into(), source: Some(Box::new(src)) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn key_material_debug_redacts() {
		let key = KeyMaterial::hmac("super-secret");

		assert_eq!(format!("{key:?}"), "KeyMaterial(\"hmac\", \"<redacted>\")");
		assert_eq!(key.expose(), b"super-secret");
	}

	#[test]
	fn closures_act_as_providers() {
		let signing = || -> Result<KeyMaterial, KeyError> { Ok(KeyMaterial::hmac("secret")) };
		let validation = |method: SigningMethod| {
			if method == SigningMethod::Hs256 {
				Ok(KeyMaterial::hmac("secret"))
			} else {
				Err(KeyError::unavailable(format!("no key for {method}")))
			}
		};

		assert_eq!(
			SigningKeyProvider::signing_key(&signing).expect("Closure should yield a key."),
			KeyMaterial::hmac("secret")
		);
		assert!(validation.validation_key(SigningMethod::Hs256).is_ok());

		let err = validation
			.validation_key(SigningMethod::Hs512)
			.expect_err("Unknown methods should be rejected by the closure.");

		assert!(err.to_string().contains("HS512"));
	}
}

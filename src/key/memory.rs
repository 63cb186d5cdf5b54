//! Fixed in-memory key provider for inline secrets, local development, and tests.

// self
use crate::{
	_prelude::*,
	key::{KeyError, KeyMaterial, SigningKeyProvider, ValidationKeyProvider},
	spec::SigningMethod,
};

/// Provider that always returns the same key material.
///
/// Serves as a signing provider, a validation provider, or both (HMAC secrets). Cloning shares
/// the underlying bytes.
#[derive(Clone, Debug)]
pub struct StaticKey(Arc<KeyMaterial>);
impl StaticKey {
	/// Wraps the provided key material.
	pub fn new(material: KeyMaterial) -> Self {
		Self(Arc::new(material))
	}

	/// Returns the wrapped material.
	pub fn material(&self) -> &KeyMaterial {
		&self.0
	}
}
impl From<KeyMaterial> for StaticKey {
	fn from(material: KeyMaterial) -> Self {
		Self::new(material)
	}
}
impl SigningKeyProvider for StaticKey {
	fn signing_key(&self) -> Result<KeyMaterial, KeyError> {
		Ok(self.0.as_ref().clone())
	}
}
impl ValidationKeyProvider for StaticKey {
	fn validation_key(&self, _: SigningMethod) -> Result<KeyMaterial, KeyError> {
		Ok(self.0.as_ref().clone())
	}
}

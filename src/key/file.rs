//! File-backed key provider that re-reads the key on every call so rotated files take effect
//! without a restart.

// std
use std::{
	fs,
	path::{Path, PathBuf},
};
// self
use crate::{
	key::{KeyError, KeyMaterial, SigningKeyProvider, ValidationKeyProvider},
	spec::SigningMethod,
};

/// Encoding of the key stored on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyFileFormat {
	/// Raw bytes used as an HMAC secret.
	Hmac,
	/// PEM-encoded asymmetric key.
	Pem,
	/// DER-encoded asymmetric key.
	Der,
}

/// Provider reading key material from a file.
#[derive(Clone, Debug)]
pub struct FileKey {
	path: PathBuf,
	format: KeyFileFormat,
}
impl FileKey {
	/// Creates a provider for the key stored at `path`.
	pub fn new(path: impl Into<PathBuf>, format: KeyFileFormat) -> Self {
		Self { path: path.into(), format }
	}

	/// Shorthand for a PEM-encoded key file.
	pub fn pem(path: impl Into<PathBuf>) -> Self {
		Self::new(path, KeyFileFormat::Pem)
	}

	/// Returns the path read by this provider.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load(&self) -> Result<KeyMaterial, KeyError> {
		let bytes = fs::read(&self.path).map_err(|e| {
			KeyError::with_source(format!("failed to read {}", self.path.display()), e)
		})?;

		if bytes.is_empty() {
			return Err(KeyError::unavailable(format!("{} is empty", self.path.display())));
		}

		Ok(match self.format {
			KeyFileFormat::Hmac => KeyMaterial::Hmac(bytes),
			KeyFileFormat::Pem => KeyMaterial::Pem(bytes),
			KeyFileFormat::Der => KeyMaterial::Der(bytes),
		})
	}
}
impl SigningKeyProvider for FileKey {
	fn signing_key(&self) -> Result<KeyMaterial, KeyError> {
		self.load()
	}
}
impl ValidationKeyProvider for FileKey {
	fn validation_key(&self, _: SigningMethod) -> Result<KeyMaterial, KeyError> {
		self.load()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;

	fn scratch_path(name: &str) -> PathBuf {
		env::temp_dir().join(format!("jwt-gate-{}-{name}", process::id()))
	}

	#[test]
	fn reads_key_on_every_call() {
		let path = scratch_path("rotating.key");

		fs::write(&path, b"first").expect("Writing the first key should succeed.");

		let provider = FileKey::new(&path, KeyFileFormat::Hmac);

		assert_eq!(
			provider.signing_key().expect("First read should succeed."),
			KeyMaterial::hmac("first")
		);

		fs::write(&path, b"second").expect("Writing the rotated key should succeed.");

		assert_eq!(
			provider
				.validation_key(SigningMethod::Hs256)
				.expect("Second read should pick up the rotated key."),
			KeyMaterial::hmac("second")
		);

		let _ = fs::remove_file(&path);
	}

	#[test]
	fn missing_or_empty_files_are_unavailable() {
		let missing = FileKey::pem(scratch_path("missing.pem"));
		let err = missing.signing_key().expect_err("Missing files must be rejected.");

		assert!(err.reason.contains("failed to read"));
		assert!(err.source.is_some());

		let path = scratch_path("empty.pem");

		fs::write(&path, b"").expect("Writing the empty key file should succeed.");

		let err = FileKey::pem(&path).signing_key().expect_err("Empty files must be rejected.");

		assert!(err.reason.contains("is empty"));

		let _ = fs::remove_file(&path);
	}
}

// std
use std::path::PathBuf;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	key::{FileKey, KeyMaterial, StaticKey, file::KeyFileFormat},
	spec::{
		DEFAULT_HEADER_NAME, DEFAULT_PARAM_NAME, SigningMethod, Specification, SpecificationBuilder,
	},
};

/// Location of the key material referenced by a configuration document.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeySource {
	/// Inline HMAC secret.
	Secret {
		/// Secret value.
		value: String,
	},
	/// Inline PEM-encoded key.
	Pem {
		/// PEM document.
		value: String,
	},
	/// PEM-encoded key read from disk on every use.
	PemFile {
		/// Path to the key file.
		path: PathBuf,
	},
	/// DER-encoded key read from disk on every use.
	DerFile {
		/// Path to the key file.
		path: PathBuf,
	},
	/// HMAC secret read from disk on every use.
	SecretFile {
		/// Path to the secret file.
		path: PathBuf,
	},
}
impl KeySource {
	fn apply_signing(self, builder: SpecificationBuilder) -> SpecificationBuilder {
		match self {
			Self::Secret { value } => builder.signing_key(StaticKey::new(KeyMaterial::hmac(value))),
			Self::Pem { value } => builder.signing_key(StaticKey::new(KeyMaterial::pem(value))),
			Self::PemFile { path } => builder.signing_key(FileKey::new(path, KeyFileFormat::Pem)),
			Self::DerFile { path } => builder.signing_key(FileKey::new(path, KeyFileFormat::Der)),
			Self::SecretFile { path } =>
				builder.signing_key(FileKey::new(path, KeyFileFormat::Hmac)),
		}
	}

	fn apply_validation(self, builder: SpecificationBuilder) -> SpecificationBuilder {
		match self {
			Self::Secret { value } =>
				builder.validation_key(StaticKey::new(KeyMaterial::hmac(value))),
			Self::Pem { value } => builder.validation_key(StaticKey::new(KeyMaterial::pem(value))),
			Self::PemFile { path } => builder.validation_key(FileKey::new(path, KeyFileFormat::Pem)),
			Self::DerFile { path } => builder.validation_key(FileKey::new(path, KeyFileFormat::Der)),
			Self::SecretFile { path } =>
				builder.validation_key(FileKey::new(path, KeyFileFormat::Hmac)),
		}
	}
}
impl Debug for KeySource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Secret { .. } => f.debug_struct("KeySource::Secret").finish_non_exhaustive(),
			Self::Pem { .. } => f.debug_struct("KeySource::Pem").finish_non_exhaustive(),
			Self::PemFile { path } =>
				f.debug_struct("KeySource::PemFile").field("path", path).finish(),
			Self::DerFile { path } =>
				f.debug_struct("KeySource::DerFile").field("path", path).finish(),
			Self::SecretFile { path } =>
				f.debug_struct("KeySource::SecretFile").field("path", path).finish(),
		}
	}
}

/// Serializable form of a [`Specification`].
///
/// ```
/// use jwt_gate::spec::SpecificationConfig;
///
/// let config = SpecificationConfig::from_json_str(
/// 	r#"{
/// 		"issuer": "me.com",
/// 		"ttl_minutes": 1440,
/// 		"signing_method": "HS512",
/// 		"signing_key": { "kind": "secret", "value": "change-me" },
/// 		"validation_key": { "kind": "secret", "value": "change-me" }
/// 	}"#,
/// )
/// .expect("Config should parse.");
/// let spec = config.into_specification().expect("Config should build.");
///
/// assert_eq!(spec.ttl_minutes, 1440);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecificationConfig {
	/// See [`Specification::allow_param`].
	#[serde(default)]
	pub allow_param: bool,
	/// See [`Specification::auth_options`].
	#[serde(default)]
	pub auth_options: bool,
	/// See [`Specification::ttl_minutes`].
	pub ttl_minutes: u32,
	/// See [`Specification::issuer`].
	pub issuer: String,
	/// See [`Specification::signing_method`].
	pub signing_method: SigningMethod,
	/// Clock-skew tolerance in whole seconds.
	#[serde(default)]
	pub leeway_seconds: u32,
	/// See [`Specification::header_name`].
	#[serde(default = "default_header_name")]
	pub header_name: String,
	/// See [`Specification::param_name`].
	#[serde(default = "default_param_name")]
	pub param_name: String,
	/// Source of the signing key.
	pub signing_key: KeySource,
	/// Source of the validation key.
	pub validation_key: KeySource,
}
impl SpecificationConfig {
	/// Parses a JSON document, reporting the failing field path on error.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		Self::from_json_slice(json.as_bytes())
	}

	/// Parses a JSON document from raw bytes.
	pub fn from_json_slice(json: &[u8]) -> Result<Self, ConfigError> {
		let mut deserializer = serde_json::Deserializer::from_slice(json);

		serde_path_to_error::deserialize(&mut deserializer).map_err(ConfigError::parse)
	}

	/// Builds the immutable [`Specification`] described by this document.
	pub fn into_specification(self) -> Result<Specification, ConfigError> {
		let builder = Specification::builder()
			.allow_param(self.allow_param)
			.auth_options(self.auth_options)
			.ttl_minutes(self.ttl_minutes)
			.issuer(self.issuer)
			.signing_method(self.signing_method)
			.leeway(Duration::seconds(i64::from(self.leeway_seconds)))
			.header_name(self.header_name)
			.param_name(self.param_name);
		let builder = self.signing_key.apply_signing(builder);
		let builder = self.validation_key.apply_validation(builder);

		Ok(builder.build()?)
	}
}

fn default_header_name() -> String {
	DEFAULT_HEADER_NAME.into()
}

fn default_param_name() -> String {
	DEFAULT_PARAM_NAME.into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::spec::SpecificationError;

	#[test]
	fn parse_errors_carry_the_field_path() {
		let err = SpecificationConfig::from_json_str(
			r#"{
				"issuer": "me.com",
				"ttl_minutes": 10,
				"signing_method": "PS256",
				"signing_key": { "kind": "secret", "value": "s" },
				"validation_key": { "kind": "secret", "value": "s" }
			}"#,
		)
		.expect_err("Unsupported methods must be rejected.");

		match err {
			ConfigError::Parse { path, .. } => assert_eq!(path, "signing_method"),
			other => panic!("Unexpected error: {other:?}."),
		}

		let err = SpecificationConfig::from_json_str(
			r#"{
				"issuer": "me.com",
				"ttl_minutes": 10,
				"signing_method": "HS256",
				"signing_key": { "kind": "vault", "value": "s" },
				"validation_key": { "kind": "secret", "value": "s" }
			}"#,
		)
		.expect_err("Unknown key sources must be rejected.");

		assert!(matches!(err, ConfigError::Parse { ref path, .. } if path.starts_with("signing_key")));
	}

	#[test]
	fn defaults_fill_optional_fields() {
		let config = SpecificationConfig::from_json_str(
			r#"{
				"issuer": "me.com",
				"ttl_minutes": 5,
				"signing_method": "RS256",
				"signing_key": { "kind": "pem_file", "path": "/etc/keys/private.pem" },
				"validation_key": { "kind": "pem_file", "path": "/etc/keys/public.pem" }
			}"#,
		)
		.expect("Minimal config should parse.");

		assert!(!config.allow_param);
		assert!(!config.auth_options);
		assert_eq!(config.leeway_seconds, 0);
		assert_eq!(config.header_name, "Authorization");
		assert_eq!(config.param_name, "token");
		assert_eq!(config.signing_key, KeySource::PemFile { path: "/etc/keys/private.pem".into() });

		let spec = config.into_specification().expect("File-backed keys build lazily.");

		assert_eq!(spec.signing_method, SigningMethod::Rs256);
	}

	#[test]
	fn builder_errors_surface_as_config_errors() {
		let config = SpecificationConfig::from_json_str(
			r#"{
				"issuer": "",
				"ttl_minutes": 5,
				"signing_method": "HS256",
				"signing_key": { "kind": "secret", "value": "s" },
				"validation_key": { "kind": "secret", "value": "s" }
			}"#,
		)
		.expect("Empty issuers are a build-time error, not a parse error.");
		let err = config.into_specification().expect_err("Empty issuers must be rejected.");

		assert!(matches!(err, ConfigError::Specification(SpecificationError::EmptyIssuer)));
	}

	#[test]
	fn key_source_debug_hides_inline_secrets() {
		let source = KeySource::Secret { value: "super-secret".into() };

		assert!(!format!("{source:?}").contains("super-secret"));
	}
}

// self
use crate::{
	_prelude::*,
	key::{SigningKeyProvider, ValidationKeyProvider},
	spec::{DEFAULT_HEADER_NAME, DEFAULT_PARAM_NAME, SigningMethod, Specification},
};

/// Errors raised while constructing or validating specifications.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SpecificationError {
	/// Issuer is mandatory and must not be blank.
	#[error("Issuer must not be empty.")]
	EmptyIssuer,
	/// A signing key provider is mandatory.
	#[error("Missing signing key provider.")]
	MissingSigningKey,
	/// A validation key provider is mandatory.
	#[error("Missing validation key provider.")]
	MissingValidationKey,
	/// Clock-skew leeway cannot be negative.
	#[error("Leeway must not be negative.")]
	NegativeLeeway,
	/// Header and parameter names must be usable lookup keys.
	#[error("The {field} name must be a non-empty token without whitespace.")]
	InvalidName {
		/// Which name failed validation.
		field: &'static str,
	},
}

/// Builder for [`Specification`] values.
pub struct SpecificationBuilder {
	allow_param: bool,
	auth_options: bool,
	ttl_minutes: u32,
	issuer: Option<String>,
	signing_method: SigningMethod,
	leeway: Duration,
	header_name: String,
	param_name: String,
	signing_key: Option<Arc<dyn SigningKeyProvider>>,
	validation_key: Option<Arc<dyn ValidationKeyProvider>>,
}
impl SpecificationBuilder {
	const DEFAULT_TTL_MINUTES: u32 = 60;

	/// Creates a builder with header-only extraction, ungated pre-flight requests, a one hour
	/// TTL, `HS256`, and zero leeway.
	pub fn new() -> Self {
		Self {
			allow_param: false,
			auth_options: false,
			ttl_minutes: Self::DEFAULT_TTL_MINUTES,
			issuer: None,
			signing_method: SigningMethod::Hs256,
			leeway: Duration::ZERO,
			header_name: DEFAULT_HEADER_NAME.into(),
			param_name: DEFAULT_PARAM_NAME.into(),
			signing_key: None,
			validation_key: None,
		}
	}

	/// Accepts tokens from the query parameter when the header is absent.
	pub fn allow_param(mut self, allow: bool) -> Self {
		self.allow_param = allow;

		self
	}

	/// Subjects pre-flight requests to authorization.
	pub fn auth_options(mut self, enabled: bool) -> Self {
		self.auth_options = enabled;

		self
	}

	/// Sets the token lifetime.
	pub fn ttl_minutes(mut self, minutes: u32) -> Self {
		self.ttl_minutes = minutes;

		self
	}

	/// Sets the issuer embedded in and required of every token.
	pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
		self.issuer = Some(issuer.into());

		self
	}

	/// Sets the signing method.
	pub fn signing_method(mut self, method: SigningMethod) -> Self {
		self.signing_method = method;

		self
	}

	/// Sets the clock-skew tolerance applied to `exp`.
	pub fn leeway(mut self, leeway: Duration) -> Self {
		self.leeway = leeway;

		self
	}

	/// Overrides the header inspected for bearer tokens.
	pub fn header_name(mut self, name: impl Into<String>) -> Self {
		self.header_name = name.into();

		self
	}

	/// Overrides the query parameter inspected when parameters are allowed.
	pub fn param_name(mut self, name: impl Into<String>) -> Self {
		self.param_name = name.into();

		self
	}

	/// Sets the signing key provider.
	pub fn signing_key(mut self, provider: impl 'static + SigningKeyProvider) -> Self {
		self.signing_key = Some(Arc::new(provider));

		self
	}

	/// Sets the validation key provider.
	pub fn validation_key(mut self, provider: impl 'static + ValidationKeyProvider) -> Self {
		self.validation_key = Some(Arc::new(provider));

		self
	}

	/// Sets an already shared signing key provider.
	pub fn shared_signing_key(mut self, provider: Arc<dyn SigningKeyProvider>) -> Self {
		self.signing_key = Some(provider);

		self
	}

	/// Sets an already shared validation key provider.
	pub fn shared_validation_key(mut self, provider: Arc<dyn ValidationKeyProvider>) -> Self {
		self.validation_key = Some(provider);

		self
	}

	/// Consumes the builder and validates the resulting specification.
	pub fn build(self) -> Result<Specification, SpecificationError> {
		let issuer = self.issuer.filter(|issuer| !issuer.trim().is_empty());
		let issuer = issuer.ok_or(SpecificationError::EmptyIssuer)?;
		let signing_key = self.signing_key.ok_or(SpecificationError::MissingSigningKey)?;
		let validation_key = self.validation_key.ok_or(SpecificationError::MissingValidationKey)?;

		if self.leeway.is_negative() {
			return Err(SpecificationError::NegativeLeeway);
		}

		validate_name("header", &self.header_name)?;
		validate_name("param", &self.param_name)?;

		Ok(Specification {
			allow_param: self.allow_param,
			auth_options: self.auth_options,
			ttl_minutes: self.ttl_minutes,
			issuer,
			signing_method: self.signing_method,
			leeway: self.leeway,
			header_name: self.header_name,
			param_name: self.param_name,
			signing_key,
			validation_key,
		})
	}
}
impl Default for SpecificationBuilder {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for SpecificationBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SpecificationBuilder")
			.field("issuer", &self.issuer)
			.field("signing_method", &self.signing_method)
			.field("signing_key_set", &self.signing_key.is_some())
			.field("validation_key_set", &self.validation_key.is_some())
			.finish_non_exhaustive()
	}
}

fn validate_name(field: &'static str, name: &str) -> Result<(), SpecificationError> {
	if name.is_empty() || name.chars().any(char::is_whitespace) {
		Err(SpecificationError::InvalidName { field })
	} else {
		Ok(())
	}
}

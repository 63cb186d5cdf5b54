//! Token creation and validation bound to a [`Specification`].
//!
//! A [`TokenManager`] is immutable after construction and cheap to clone, so one instance can be
//! shared by every request handler. Key providers are consulted on each operation.

mod identity;
mod jws;

pub use identity::*;

// self
use crate::{
	_prelude::*,
	claims::{ClaimValue, Claims, EXPIRY_CLAIM, ISSUER_CLAIM},
	obs::{self, OpKind, OpOutcome, OpSpan},
	spec::{SigningMethod, Specification},
};

/// Creates and validates tokens according to a [`Specification`].
#[derive(Clone, Debug)]
pub struct TokenManager {
	spec: Arc<Specification>,
}
impl TokenManager {
	/// Binds a manager to the provided specification.
	pub fn new(spec: Specification) -> Self {
		Self { spec: Arc::new(spec) }
	}

	/// Binds a manager to a specification that is already shared.
	pub fn from_shared(spec: Arc<Specification>) -> Self {
		Self { spec }
	}

	/// Returns the bound specification.
	pub fn specification(&self) -> &Arc<Specification> {
		&self.spec
	}

	/// Issues a token carrying `claims`, expiring one TTL from now.
	pub fn create(&self, claims: Claims) -> Result<String> {
		self.create_at(claims, OffsetDateTime::now_utc())
	}

	/// Issues a token from any serializable value that renders as a JSON object.
	pub fn create_from<T>(&self, claims: &T) -> Result<String>
	where
		T: ?Sized + Serialize,
	{
		self.create(Claims::from_serialize(claims)?)
	}

	/// Issues a token as if the current instant were `now`.
	///
	/// `iss` and `exp` are always overwritten, even when the caller supplied them.
	pub fn create_at(&self, mut claims: Claims, now: OffsetDateTime) -> Result<String> {
		let _span = OpSpan::new(OpKind::Create, "create_at").entered();

		obs::record_op_outcome(OpKind::Create, OpOutcome::Attempt);

		let expires_at = now.unix_timestamp() + self.spec.ttl().whole_seconds();

		claims.insert(ISSUER_CLAIM, self.spec.issuer.as_str());
		claims.insert(EXPIRY_CLAIM, expires_at);

		let result = self
			.spec
			.signing_key
			.signing_key()
			.map_err(Error::from)
			.and_then(|key| jws::sign(self.spec.signing_method, &claims, &key));

		observe(OpKind::Create, &result, "signing");

		result
	}

	/// Validates a token against the current instant.
	pub fn validate(&self, token: &str) -> Result<ValidatedIdentity> {
		self.validate_at(token, OffsetDateTime::now_utc())
	}

	/// Validates a token as if the current instant were `now`.
	///
	/// Checks run in a fixed order (structure, algorithm family, signature, expiry, issuer) and
	/// the first failure is returned.
	pub fn validate_at(&self, token: &str, now: OffsetDateTime) -> Result<ValidatedIdentity> {
		let _span = OpSpan::new(OpKind::Validate, "validate_at").entered();

		obs::record_op_outcome(OpKind::Validate, OpOutcome::Attempt);

		let mut reached = None;
		let result = self.check(token, now, &mut reached);

		observe(OpKind::Validate, &result, ValidationState::label(reached));

		result
	}

	fn check(
		&self,
		token: &str,
		now: OffsetDateTime,
		reached: &mut Option<ValidationState>,
	) -> Result<ValidatedIdentity> {
		let raw = jws::parse(token)?;
		let method = self.accepted_method(&raw.algorithm)?;

		*reached = Some(ValidationState::Parsed);

		let key = self.spec.validation_key.validation_key(method)?;

		jws::verify(token, &raw, method, &key)?;

		*reached = Some(ValidationState::SignatureChecked);

		let claims = decode_claims(&raw.payload)?;
		let expires_at = expiry_of(&claims)?;

		if expires_at.checked_add(self.spec.leeway).is_some_and(|deadline| now >= deadline) {
			return Err(Error::TokenExpired { expired_at: expires_at });
		}

		*reached = Some(ValidationState::ExpiryChecked);

		match claims.issuer() {
			Some(issuer) if issuer == self.spec.issuer => {},
			found => return Err(Error::IssuerMismatch { found: found.map(str::to_owned) }),
		}

		*reached = Some(ValidationState::IssuerChecked);

		let identity =
			ValidatedIdentity { claims, issuer: self.spec.issuer.clone(), expires_at, method };

		*reached = Some(ValidationState::Accepted);

		Ok(identity)
	}

	fn accepted_method(&self, algorithm: &str) -> Result<SigningMethod> {
		let expected = self.spec.family();
		let mismatch =
			|| Error::AlgorithmMismatch { found: algorithm.into(), expected: expected.as_str() };
		let method = algorithm.parse::<SigningMethod>().map_err(|_| mismatch())?;

		if method.family() == expected { Ok(method) } else { Err(mismatch()) }
	}
}

fn decode_claims(payload: &[u8]) -> Result<Claims> {
	let json = serde_json::from_slice::<serde_json::Value>(payload)
		.map_err(|e| Error::malformed(format!("payload is not JSON ({e})")))?;

	Claims::from_json(json).map_err(|e| match e {
		Error::UnsupportedClaim { key, kind } =>
			Error::malformed(format!("claim `{key}` holds an unsupported {kind} value")),
		other => other,
	})
}

fn expiry_of(claims: &Claims) -> Result<OffsetDateTime> {
	let seconds = match claims.get(EXPIRY_CLAIM) {
		Some(ClaimValue::Number(number)) =>
			number.as_i64().or_else(|| number.as_f64().map(|seconds| seconds.floor() as i64)),
		_ => None,
	}
	.ok_or_else(|| Error::malformed("`exp` claim is missing or not a number"))?;

	OffsetDateTime::from_unix_timestamp(seconds)
		.map_err(|_| Error::malformed("`exp` claim is out of range"))
}

fn observe<T>(kind: OpKind, result: &Result<T>, reached: &'static str) {
	match result {
		Ok(_) => obs::record_op_outcome(kind, OpOutcome::Success),
		Err(e) => {
			obs::record_op_outcome(kind, OpOutcome::Failure);
			obs::record_rejection(kind, e.kind());
			obs::log_rejection(kind, e.kind(), reached);
		},
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;
	use crate::key::{KeyMaterial, StaticKey};

	fn manager(method: SigningMethod) -> TokenManager {
		let key = StaticKey::new(KeyMaterial::hmac("unit-secret"));
		let spec = Specification::builder()
			.issuer("me.com")
			.ttl_minutes(10)
			.signing_method(method)
			.signing_key(key.clone())
			.validation_key(key)
			.build()
			.expect("Specification should build.");

		TokenManager::new(spec)
	}

	#[test]
	fn created_tokens_carry_issuer_and_expiry() {
		let manager = manager(SigningMethod::Hs256);
		let now = datetime!(2025-01-01 00:00 UTC);
		let token = manager
			.create_at(Claims::new().with("iss", "evil.com").with("exp", 1), now)
			.expect("Token should be created.");
		let identity = manager
			.validate_at(&token, now + Duration::minutes(5))
			.expect("Fresh token should validate.");

		assert_eq!(identity.claims.issuer(), Some("me.com"));
		assert_eq!(identity.expires_at, now + Duration::minutes(10));
		assert_eq!(identity.method, SigningMethod::Hs256);
		assert!(identity.custom_claims().is_empty());
	}

	#[test]
	fn expiry_is_exclusive_at_the_deadline() {
		let manager = manager(SigningMethod::Hs256);
		let now = datetime!(2025-01-01 00:00 UTC);
		let token = manager.create_at(Claims::new(), now).expect("Token should be created.");

		manager
			.validate_at(&token, now + Duration::minutes(10) - Duration::seconds(1))
			.expect("Token is valid until its deadline.");

		let err = manager
			.validate_at(&token, now + Duration::minutes(10))
			.expect_err("Token must be expired at its deadline.");

		assert!(matches!(
			err,
			Error::TokenExpired { expired_at } if expired_at == now + Duration::minutes(10)
		));
	}

	#[test]
	fn accepted_method_requires_the_configured_family() {
		let manager = manager(SigningMethod::Hs512);

		assert_eq!(manager.accepted_method("HS256").ok(), Some(SigningMethod::Hs256));

		for algorithm in ["RS256", "ES256", "none", "PS256", "EdDSA", ""] {
			let err = manager.accepted_method(algorithm).expect_err("Foreign algorithms must fail.");

			assert!(matches!(
				err,
				Error::AlgorithmMismatch { ref found, expected: "HMAC" } if found == algorithm
			));
		}
	}

	#[test]
	fn expiry_accepts_fractional_seconds() {
		let claims = Claims::from_json(serde_json::json!({ "exp": 1_700_000_000.75 }))
			.expect("Claims should decode.");

		assert_eq!(
			expiry_of(&claims).expect("Fractional expiry should decode."),
			datetime!(2023-11-14 22:13:20 UTC)
		);

		let claims = Claims::new().with("exp", "tomorrow");

		assert!(matches!(expiry_of(&claims), Err(Error::MalformedToken { .. })));
		assert!(matches!(expiry_of(&Claims::new()), Err(Error::MalformedToken { .. })));
	}

	#[test]
	fn unsupported_payload_values_are_malformed() {
		assert!(matches!(decode_claims(br#"{"aud":["a"]}"#), Err(Error::MalformedToken { .. })));
		assert!(matches!(decode_claims(b"not json"), Err(Error::MalformedToken { .. })));
		assert!(matches!(decode_claims(b"[]"), Err(Error::MalformedToken { .. })));
	}
}

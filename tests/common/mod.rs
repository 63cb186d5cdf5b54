//! Shared fixtures for jwt-gate integration tests.

#![allow(dead_code)]

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use base64::{
	Engine,
	engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use jwt_gate::{
	key::{KeyError, KeyMaterial, StaticKey, ValidationKeyProvider},
	manager::TokenManager,
	spec::{SigningFamily, SigningMethod, Specification, SpecificationBuilder},
};

pub const ISSUER: &str = "me.com";
pub const HMAC_SECRET: &str = "integration-secret";

pub const RSA_PRIVATE: &str = include_str!("../fixtures/rsa_private.pem");
pub const RSA_PUBLIC: &str = include_str!("../fixtures/rsa_public.pem");
pub const P256_PRIVATE: &str = include_str!("../fixtures/ec_p256_private.pem");
pub const P256_PUBLIC: &str = include_str!("../fixtures/ec_p256_public.pem");
pub const P384_PRIVATE: &str = include_str!("../fixtures/ec_p384_private.pem");
pub const P384_PUBLIC: &str = include_str!("../fixtures/ec_p384_public.pem");
pub const P521_PRIVATE: &str = include_str!("../fixtures/ec_p521_private.pem");
pub const P521_PUBLIC: &str = include_str!("../fixtures/ec_p521_public.pem");

/// Returns the `(signing, validation)` material matching the method.
pub fn keys_for(method: SigningMethod) -> (KeyMaterial, KeyMaterial) {
	match method {
		SigningMethod::Hs256 | SigningMethod::Hs384 | SigningMethod::Hs512 =>
			(KeyMaterial::hmac(HMAC_SECRET), KeyMaterial::hmac(HMAC_SECRET)),
		SigningMethod::Rs256 | SigningMethod::Rs384 | SigningMethod::Rs512 =>
			(KeyMaterial::pem(RSA_PRIVATE), KeyMaterial::pem(RSA_PUBLIC)),
		SigningMethod::Es256 => (KeyMaterial::pem(P256_PRIVATE), KeyMaterial::pem(P256_PUBLIC)),
		SigningMethod::Es384 => (KeyMaterial::pem(P384_PRIVATE), KeyMaterial::pem(P384_PUBLIC)),
		SigningMethod::Es512 => (KeyMaterial::pem(P521_PRIVATE), KeyMaterial::pem(P521_PUBLIC)),
	}
}

/// Validation provider resolving the key from the token's method, as a multi-key
/// deployment would.
pub fn validation_for_any(method: SigningMethod) -> Result<KeyMaterial, KeyError> {
	Ok(keys_for(method).1)
}

/// Builder pre-populated with the fixture keys for the method.
pub fn spec_builder(method: SigningMethod) -> SpecificationBuilder {
	let (signing, validation) = keys_for(method);

	Specification::builder()
		.issuer(ISSUER)
		.ttl_minutes(60)
		.signing_method(method)
		.signing_key(StaticKey::new(signing))
		.validation_key(StaticKey::new(validation))
}

pub fn manager_for(method: SigningMethod) -> TokenManager {
	TokenManager::new(spec_builder(method).build().expect("Fixture specification should build."))
}

/// Validation provider counting how often it is consulted.
pub fn counting_validation_key(
	method: SigningMethod,
) -> (impl 'static + ValidationKeyProvider, Arc<AtomicUsize>) {
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();
	let key = keys_for(method).1;
	let provider = move |_: SigningMethod| -> Result<KeyMaterial, KeyError> {
		counter.fetch_add(1, Ordering::SeqCst);

		Ok(key.clone())
	};

	(provider, calls)
}

/// Number of bits in the decoded signature.
pub fn signature_bits(token: &str) -> usize {
	let (_, signature) = token.rsplit_once('.').expect("Token should contain a signature segment.");

	URL_SAFE_NO_PAD.decode(signature).expect("Signature should be base64url.").len() * 8
}

/// Flips the given bit of the decoded signature and re-encodes the token.
pub fn flip_signature_bit(token: &str, bit: usize) -> String {
	let (signing_input, signature) =
		token.rsplit_once('.').expect("Token should contain a signature segment.");
	let mut bytes = URL_SAFE_NO_PAD.decode(signature).expect("Signature should be base64url.");

	bytes[bit / 8] ^= 0x80 >> (bit % 8);

	format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(bytes))
}

/// Flips the first bit of the decoded signature.
pub fn tamper_signature(token: &str) -> String {
	flip_signature_bit(token, 0)
}

/// Replaces the payload segment, keeping the original header and signature.
pub fn replace_payload(token: &str, payload: &str) -> String {
	let segments = token.split('.').collect::<Vec<_>>();

	format!("{}.{}.{}", segments[0], URL_SAFE_NO_PAD.encode(payload), segments[2])
}

/// Builds an HS256 token with an arbitrary header and payload signed by `secret`.
pub fn forge_hmac(header: &str, payload: &str, secret: &[u8]) -> String {
	let header = URL_SAFE_NO_PAD.encode(header);
	let payload = URL_SAFE_NO_PAD.encode(payload);
	let signing_input = format!("{header}.{payload}");
	let key = jsonwebtoken::EncodingKey::from_secret(secret);
	let signature = jsonwebtoken::crypto::sign(
		signing_input.as_bytes(),
		&key,
		jsonwebtoken::Algorithm::HS256,
	)
	.expect("HMAC signing should succeed.");

	format!("{signing_input}.{signature}")
}

/// Decodes the DER body of a PEM fixture.
pub fn pem_to_der(pem: &str) -> Vec<u8> {
	let body = pem.lines().filter(|line| !line.starts_with("-----")).collect::<String>();

	STANDARD.decode(body).expect("Fixture PEM body should be base64.")
}

/// Decodes the JSON header of a compact token.
pub fn header_of(token: &str) -> serde_json::Value {
	let header = token.split('.').next().expect("Token should contain a header segment.");
	let bytes = URL_SAFE_NO_PAD.decode(header).expect("Header should be base64url.");

	serde_json::from_slice(&bytes).expect("Header should be JSON.")
}

pub fn family_members(family: SigningFamily) -> impl Iterator<Item = SigningMethod> {
	SigningMethod::ALL.into_iter().filter(move |method| method.family() == family)
}

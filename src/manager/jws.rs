//! Compact JWS encoding and verification.
//!
//! Every method except ES512 is delegated to `jsonwebtoken`; ES512 is signed and verified with
//! the `p521` crate using the same compact serialization.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{
	Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind as JwtErrorKind,
};
use p521::{
	PublicKey, SecretKey,
	ecdsa::{
		Signature, SigningKey, VerifyingKey,
		signature::{Signer, Verifier},
	},
	elliptic_curve::sec1::ToEncodedPoint,
	pkcs8::{DecodePrivateKey, DecodePublicKey},
};
// self
use crate::{
	_prelude::*,
	claims::Claims,
	key::{KeyError, KeyMaterial},
	spec::{SigningFamily, SigningMethod},
};

/// Decoded but unverified compact token.
#[derive(Debug)]
pub(crate) struct RawToken<'a> {
	pub(crate) algorithm: String,
	pub(crate) signing_input: &'a str,
	pub(crate) payload: Vec<u8>,
	pub(crate) signature: Option<Vec<u8>>,
}

#[derive(Deserialize)]
struct JoseHeader {
	alg: String,
}

#[derive(Serialize)]
struct Es512Header {
	typ: &'static str,
	alg: &'static str,
}

/// Splits a compact token into its segments and decodes the header and payload.
///
/// The signature segment is decoded eagerly; an empty or undecodable segment is kept as `None`
/// so the caller can reject it as a bad signature once the algorithm has been vetted.
pub(crate) fn parse(token: &str) -> Result<RawToken<'_>> {
	let mut segments = token.split('.');
	let (Some(header), Some(payload), Some(signature), None) =
		(segments.next(), segments.next(), segments.next(), segments.next())
	else {
		return Err(Error::malformed("expected three dot-separated segments"));
	};
	let signing_input = &token[..header.len() + 1 + payload.len()];

	if header.is_empty() || payload.is_empty() {
		return Err(Error::malformed("header and payload segments must not be empty"));
	}

	let header_bytes = URL_SAFE_NO_PAD
		.decode(header)
		.map_err(|_| Error::malformed("header segment is not base64url"))?;
	let header = serde_json::from_slice::<JoseHeader>(&header_bytes)
		.map_err(|e| Error::malformed(format!("header segment is not a JOSE header ({e})")))?;
	let payload = URL_SAFE_NO_PAD
		.decode(payload)
		.map_err(|_| Error::malformed("payload segment is not base64url"))?;
	let signature = match signature {
		"" => None,
		signature => URL_SAFE_NO_PAD.decode(signature).ok(),
	};

	Ok(RawToken { algorithm: header.alg, signing_input, payload, signature })
}

/// Signs the claim set with the given method and key material.
pub(crate) fn sign(method: SigningMethod, claims: &Claims, key: &KeyMaterial) -> Result<String> {
	let Some(algorithm) = method.algorithm() else {
		return sign_es512(claims, key);
	};
	let encoding_key = encoding_key(method, key)?;

	jsonwebtoken::encode(&Header::new(algorithm), claims, &encoding_key)
		.map_err(|e| Error::signing_with(format!("{method} signing rejected the key"), e))
}

/// Verifies the signature of a parsed token.
pub(crate) fn verify(
	token: &str,
	raw: &RawToken<'_>,
	method: SigningMethod,
	key: &KeyMaterial,
) -> Result<()> {
	let Some(signature) = raw.signature.as_deref() else {
		return Err(Error::InvalidSignature);
	};
	let Some(algorithm) = method.algorithm() else {
		return verify_es512(raw.signing_input, signature, key);
	};
	let decoding_key = decoding_key(method, key)?;

	jsonwebtoken::decode::<serde_json::Value>(token, &decoding_key, &signature_only(algorithm))
		.map(|_| ())
		.map_err(map_jwt_error)
}

fn signature_only(algorithm: Algorithm) -> Validation {
	let mut validation = Validation::new(algorithm);

	validation.leeway = 0;
	validation.validate_exp = false;
	validation.validate_nbf = false;
	validation.validate_aud = false;
	validation.required_spec_claims.clear();

	validation
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> Error {
	match err.kind() {
		JwtErrorKind::InvalidSignature | JwtErrorKind::Base64(_) => Error::InvalidSignature,
		JwtErrorKind::InvalidKeyFormat
		| JwtErrorKind::InvalidRsaKey(_)
		| JwtErrorKind::InvalidEcdsaKey
		| JwtErrorKind::InvalidAlgorithm =>
			KeyError::with_source("validation key rejected", err).into(),
		_ => Error::malformed(err.to_string()),
	}
}

fn encoding_key(method: SigningMethod, key: &KeyMaterial) -> Result<EncodingKey> {
	let rejected = |e: jsonwebtoken::errors::Error| {
		Error::signing_with(format!("{method} signing key is unusable"), e)
	};

	match (method.family(), key) {
		(SigningFamily::Hmac, KeyMaterial::Hmac(secret)) => Ok(EncodingKey::from_secret(secret)),
		(SigningFamily::Rsa, KeyMaterial::Pem(pem)) =>
			EncodingKey::from_rsa_pem(pem).map_err(rejected),
		(SigningFamily::Rsa, KeyMaterial::Der(der)) => Ok(EncodingKey::from_rsa_der(der)),
		(SigningFamily::Ecdsa, KeyMaterial::Pem(pem)) =>
			EncodingKey::from_ec_pem(pem).map_err(rejected),
		(SigningFamily::Ecdsa, KeyMaterial::Der(der)) => Ok(EncodingKey::from_ec_der(der)),
		(family, key) => Err(Error::signing(format!(
			"{} key material cannot sign {family} tokens",
			key.encoding()
		))),
	}
}

fn decoding_key(method: SigningMethod, key: &KeyMaterial) -> Result<DecodingKey> {
	let rejected = |e: jsonwebtoken::errors::Error| {
		Error::from(KeyError::with_source(format!("{method} validation key is unusable"), e))
	};

	match (method.family(), key) {
		(SigningFamily::Hmac, KeyMaterial::Hmac(secret)) => Ok(DecodingKey::from_secret(secret)),
		(SigningFamily::Rsa, KeyMaterial::Pem(pem)) =>
			DecodingKey::from_rsa_pem(pem).map_err(rejected),
		(SigningFamily::Rsa, KeyMaterial::Der(der)) => Ok(DecodingKey::from_rsa_der(der)),
		(SigningFamily::Ecdsa, KeyMaterial::Pem(pem)) =>
			DecodingKey::from_ec_pem(pem).map_err(rejected),
		(SigningFamily::Ecdsa, KeyMaterial::Der(der)) => Ok(DecodingKey::from_ec_der(der)),
		(family, key) => Err(KeyError::unavailable(format!(
			"{} key material cannot verify {family} tokens",
			key.encoding()
		))
		.into()),
	}
}

fn sign_es512(claims: &Claims, key: &KeyMaterial) -> Result<String> {
	let secret = match key {
		KeyMaterial::Pem(pem) => {
			let pem = std::str::from_utf8(pem).map_err(unusable_signing_key)?;

			SecretKey::from_pkcs8_pem(pem).map_err(unusable_signing_key)?
		},
		KeyMaterial::Der(der) => SecretKey::from_pkcs8_der(der).map_err(unusable_signing_key)?,
		KeyMaterial::Hmac(_) =>
			return Err(Error::signing("hmac key material cannot sign ECDSA tokens")),
	};
	let signing_key =
		SigningKey::from_bytes(&secret.to_bytes()).map_err(unusable_signing_key)?;
	let header = Es512Header { typ: "JWT", alg: SigningMethod::Es512.as_str() };
	let header = serde_json::to_vec(&header)
		.map_err(|e| Error::signing_with("ES512 header could not be serialized", e))?;
	let payload = serde_json::to_vec(claims)
		.map_err(|e| Error::signing_with("claims could not be serialized", e))?;
	let signing_input =
		format!("{}.{}", URL_SAFE_NO_PAD.encode(header), URL_SAFE_NO_PAD.encode(payload));
	let signature: Signature = signing_key
		.try_sign(signing_input.as_bytes())
		.map_err(|e| Error::signing(format!("ES512 signing failed ({e})")))?;

	Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature.to_bytes())))
}

fn verify_es512(signing_input: &str, signature: &[u8], key: &KeyMaterial) -> Result<()> {
	let public = match key {
		KeyMaterial::Pem(pem) => {
			let pem = std::str::from_utf8(pem).map_err(unusable_validation_key)?;

			PublicKey::from_public_key_pem(pem).map_err(unusable_validation_key)?
		},
		KeyMaterial::Der(der) =>
			PublicKey::from_public_key_der(der).map_err(unusable_validation_key)?,
		KeyMaterial::Hmac(_) =>
			return Err(KeyError::unavailable("hmac key material cannot verify ECDSA tokens").into()),
	};
	let verifying_key = VerifyingKey::from_sec1_bytes(public.to_encoded_point(false).as_bytes())
		.map_err(unusable_validation_key)?;
	let signature = Signature::from_slice(signature).map_err(|_| Error::InvalidSignature)?;

	verifying_key.verify(signing_input.as_bytes(), &signature).map_err(|_| Error::InvalidSignature)
}

fn unusable_signing_key(e: impl Display) -> Error {
	Error::signing(format!("ES512 signing key is unusable ({e})"))
}

fn unusable_validation_key(e: impl Display) -> Error {
	KeyError::unavailable(format!("ES512 validation key is unusable ({e})")).into()
}

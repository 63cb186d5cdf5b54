// crates.io
use jsonwebtoken::Algorithm;
// self
use crate::_prelude::*;

/// Algorithm family a [`SigningMethod`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningFamily {
	/// Symmetric HMAC with SHA-2.
	Hmac,
	/// RSASSA-PKCS1-v1_5 with SHA-2.
	Rsa,
	/// ECDSA over the NIST P-curves.
	Ecdsa,
}
impl SigningFamily {
	/// Returns a stable label suitable for logs and error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Hmac => "HMAC",
			Self::Rsa => "RSA",
			Self::Ecdsa => "ECDSA",
		}
	}
}
impl Display for SigningFamily {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Error returned when a JWT `alg` value names no supported signing method.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unsupported signing method `{0}`.")]
pub struct UnknownSigningMethod(pub String);

/// JWS signing methods accepted for issuing and validating tokens.
///
/// Serialized with the JWT `alg` names (`HS256`, `ES512`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningMethod {
	/// HMAC using SHA-256.
	#[serde(rename = "HS256")]
	Hs256,
	/// HMAC using SHA-384.
	#[serde(rename = "HS384")]
	Hs384,
	/// HMAC using SHA-512.
	#[serde(rename = "HS512")]
	Hs512,
	/// RSASSA-PKCS1-v1_5 using SHA-256.
	#[serde(rename = "RS256")]
	Rs256,
	/// RSASSA-PKCS1-v1_5 using SHA-384.
	#[serde(rename = "RS384")]
	Rs384,
	/// RSASSA-PKCS1-v1_5 using SHA-512.
	#[serde(rename = "RS512")]
	Rs512,
	/// ECDSA using P-256 and SHA-256.
	#[serde(rename = "ES256")]
	Es256,
	/// ECDSA using P-384 and SHA-384.
	#[serde(rename = "ES384")]
	Es384,
	/// ECDSA using P-521 and SHA-512.
	#[serde(rename = "ES512")]
	Es512,
}
impl SigningMethod {
	/// Every supported method, in declaration order.
	pub const ALL: [Self; 9] = [
		Self::Hs256,
		Self::Hs384,
		Self::Hs512,
		Self::Rs256,
		Self::Rs384,
		Self::Rs512,
		Self::Es256,
		Self::Es384,
		Self::Es512,
	];

	/// Returns the JWT `alg` identifier.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Hs256 => "HS256",
			Self::Hs384 => "HS384",
			Self::Hs512 => "HS512",
			Self::Rs256 => "RS256",
			Self::Rs384 => "RS384",
			Self::Rs512 => "RS512",
			Self::Es256 => "ES256",
			Self::Es384 => "ES384",
			Self::Es512 => "ES512",
		}
	}

	/// Returns the algorithm family.
	pub const fn family(self) -> SigningFamily {
		match self {
			Self::Hs256 | Self::Hs384 | Self::Hs512 => SigningFamily::Hmac,
			Self::Rs256 | Self::Rs384 | Self::Rs512 => SigningFamily::Rsa,
			Self::Es256 | Self::Es384 | Self::Es512 => SigningFamily::Ecdsa,
		}
	}

	/// Maps the method onto a `jsonwebtoken` algorithm.
	///
	/// `ES512` has no `jsonwebtoken` counterpart and returns `None`.
	pub const fn algorithm(self) -> Option<Algorithm> {
		match self {
			Self::Hs256 => Some(Algorithm::HS256),
			Self::Hs384 => Some(Algorithm::HS384),
			Self::Hs512 => Some(Algorithm::HS512),
			Self::Rs256 => Some(Algorithm::RS256),
			Self::Rs384 => Some(Algorithm::RS384),
			Self::Rs512 => Some(Algorithm::RS512),
			Self::Es256 => Some(Algorithm::ES256),
			Self::Es384 => Some(Algorithm::ES384),
			Self::Es512 => None,
		}
	}
}
impl Display for SigningMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for SigningMethod {
	type Err = UnknownSigningMethod;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|method| method.as_str() == s)
			.ok_or_else(|| UnknownSigningMethod(s.to_owned()))
	}
}

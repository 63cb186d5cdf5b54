//! Strongly typed claim sets carried by tokens.
//!
//! Claims are a mapping from string keys to a closed set of value kinds: strings, numbers,
//! booleans, and nested mappings. Anything else (`null`, arrays) is rejected with
//! [`Error::UnsupportedClaim`] when a claim set is built from arbitrary JSON, so an unusable
//! claim never reaches the signing step.

// std
use std::collections::btree_map::{self, Entry};
// crates.io
use serde::{Deserializer, de::Error as DeError};
use serde_json::{Map, Number, Value};
// self
use crate::_prelude::*;

/// Claim owned by the token manager: the issuer.
pub const ISSUER_CLAIM: &str = "iss";
/// Claim owned by the token manager: the expiry instant in Unix seconds.
pub const EXPIRY_CLAIM: &str = "exp";
/// Keys overwritten by the token manager on every creation.
pub const RESERVED_CLAIMS: [&str; 2] = [ISSUER_CLAIM, EXPIRY_CLAIM];

/// Single claim value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClaimValue {
	/// UTF-8 string.
	String(String),
	/// Finite JSON number.
	Number(Number),
	/// Boolean flag.
	Bool(bool),
	/// Nested mapping.
	Map(BTreeMap<String, ClaimValue>),
}
impl ClaimValue {
	/// Builds a number claim from a float, returning `None` for NaN or infinities.
	pub fn float(value: f64) -> Option<Self> {
		Number::from_f64(value).map(Self::Number)
	}

	/// Returns the string payload, if any.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	/// Returns the value as an `i64` when it is an integral number in range.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Number(value) => value.as_i64(),
			_ => None,
		}
	}

	/// Returns the boolean payload, if any.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(value) => Some(*value),
			_ => None,
		}
	}

	/// Returns the nested mapping, if any.
	pub fn as_map(&self) -> Option<&BTreeMap<String, ClaimValue>> {
		match self {
			Self::Map(value) => Some(value),
			_ => None,
		}
	}

	fn from_json_at(path: &str, value: Value) -> Result<Self> {
		match value {
			Value::String(value) => Ok(Self::String(value)),
			Value::Number(value) => Ok(Self::Number(value)),
			Value::Bool(value) => Ok(Self::Bool(value)),
			Value::Object(map) => Ok(Self::Map(map_from_json(Some(path), map)?)),
			Value::Null => Err(Error::UnsupportedClaim { key: path.to_owned(), kind: "null" }),
			Value::Array(_) => Err(Error::UnsupportedClaim { key: path.to_owned(), kind: "array" }),
		}
	}
}
impl From<&str> for ClaimValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}
impl From<String> for ClaimValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}
impl From<bool> for ClaimValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<i64> for ClaimValue {
	fn from(value: i64) -> Self {
		Self::Number(value.into())
	}
}
impl From<i32> for ClaimValue {
	fn from(value: i32) -> Self {
		Self::Number(value.into())
	}
}
impl From<u64> for ClaimValue {
	fn from(value: u64) -> Self {
		Self::Number(value.into())
	}
}
impl From<u32> for ClaimValue {
	fn from(value: u32) -> Self {
		Self::Number(value.into())
	}
}
impl From<BTreeMap<String, ClaimValue>> for ClaimValue {
	fn from(value: BTreeMap<String, ClaimValue>) -> Self {
		Self::Map(value)
	}
}
impl From<Claims> for ClaimValue {
	fn from(value: Claims) -> Self {
		Self::Map(value.0)
	}
}
impl<'de> Deserialize<'de> for ClaimValue {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = Value::deserialize(deserializer)?;

		Self::from_json_at("$", value).map_err(DeError::custom)
	}
}

/// Claim mapping carried by a token.
///
/// Keys are kept sorted, so serialization is canonical regardless of insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Claims(BTreeMap<String, ClaimValue>);
impl Claims {
	/// Creates an empty claim set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a claim set from a JSON object, rejecting unsupported value kinds.
	pub fn from_json(value: Value) -> Result<Self> {
		match value {
			Value::Object(map) => Ok(Self(map_from_json(None, map)?)),
			Value::Null => Err(Error::UnsupportedClaim { key: "$".into(), kind: "null" }),
			Value::Array(_) => Err(Error::UnsupportedClaim { key: "$".into(), kind: "array" }),
			Value::String(_) => Err(Error::UnsupportedClaim { key: "$".into(), kind: "string" }),
			Value::Number(_) => Err(Error::UnsupportedClaim { key: "$".into(), kind: "number" }),
			Value::Bool(_) => Err(Error::UnsupportedClaim { key: "$".into(), kind: "boolean" }),
		}
	}

	/// Builds a claim set from any serializable value that renders as a JSON object.
	pub fn from_serialize<T>(value: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let json = serde_json::to_value(value).map_err(|e| Error::UnsupportedClaim {
			key: format!("$ ({e})"),
			kind: "unserializable",
		})?;

		Self::from_json(json)
	}

	/// Adds a claim and returns the set, for chained construction.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
		self.insert(key, value);

		self
	}

	/// Inserts or replaces a claim, returning the previous value.
	pub fn insert(
		&mut self,
		key: impl Into<String>,
		value: impl Into<ClaimValue>,
	) -> Option<ClaimValue> {
		self.0.insert(key.into(), value.into())
	}

	/// Inserts a claim only when the key is unused.
	pub fn insert_if_absent(&mut self, key: impl Into<String>, value: impl Into<ClaimValue>) {
		if let Entry::Vacant(entry) = self.0.entry(key.into()) {
			entry.insert(value.into());
		}
	}

	/// Removes a claim.
	pub fn remove(&mut self, key: &str) -> Option<ClaimValue> {
		self.0.remove(key)
	}

	/// Looks up a claim.
	pub fn get(&self, key: &str) -> Option<&ClaimValue> {
		self.0.get(key)
	}

	/// Looks up a string claim.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(ClaimValue::as_str)
	}

	/// Looks up an integral number claim.
	pub fn get_i64(&self, key: &str) -> Option<i64> {
		self.get(key).and_then(ClaimValue::as_i64)
	}

	/// Returns true if the key is present.
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Number of claims.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no claims are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterator over claims in key order.
	pub fn iter(&self) -> btree_map::Iter<'_, String, ClaimValue> {
		self.0.iter()
	}

	/// The `iss` claim, when present as a string.
	pub fn issuer(&self) -> Option<&str> {
		self.get_str(ISSUER_CLAIM)
	}

	/// The `exp` claim, when present as an integral number.
	pub fn expiry(&self) -> Option<i64> {
		self.get_i64(EXPIRY_CLAIM)
	}

	/// Converts the claim set into a JSON object.
	pub fn to_json(&self) -> Value {
		fn convert(value: &ClaimValue) -> Value {
			match value {
				ClaimValue::String(value) => Value::String(value.clone()),
				ClaimValue::Number(value) => Value::Number(value.clone()),
				ClaimValue::Bool(value) => Value::Bool(*value),
				ClaimValue::Map(map) =>
					Value::Object(map.iter().map(|(k, v)| (k.clone(), convert(v))).collect()),
			}
		}

		Value::Object(self.0.iter().map(|(k, v)| (k.clone(), convert(v))).collect())
	}

	/// Copies the claims without the manager-owned reserved keys.
	pub fn without_reserved(&self) -> Self {
		let mut copy = self.clone();

		for key in RESERVED_CLAIMS {
			copy.remove(key);
		}

		copy
	}
}
impl<'a> IntoIterator for &'a Claims {
	type IntoIter = btree_map::Iter<'a, String, ClaimValue>;
	type Item = (&'a String, &'a ClaimValue);

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}
impl<K, V> FromIterator<(K, V)> for Claims
where
	K: Into<String>,
	V: Into<ClaimValue>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}
impl TryFrom<Value> for Claims {
	type Error = Error;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		Self::from_json(value)
	}
}
impl<'de> Deserialize<'de> for Claims {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = Value::deserialize(deserializer)?;

		Self::from_json(value).map_err(DeError::custom)
	}
}

fn map_from_json(
	parent: Option<&str>,
	map: Map<String, Value>,
) -> Result<BTreeMap<String, ClaimValue>> {
	map.into_iter()
		.map(|(key, value)| {
			let path = match parent {
				Some(parent) => format!("{parent}.{key}"),
				None => key.clone(),
			};

			ClaimValue::from_json_at(&path, value).map(|value| (key, value))
		})
		.collect()
}

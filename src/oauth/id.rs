//! Strongly typed identifiers carried by grant contexts.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 255;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (client, subject).
		kind: &'static str,
	},
	/// The identifier contains control characters.
	#[error("{kind} identifier contains control characters.")]
	ContainsControl {
		/// Kind of identifier (client, subject).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed byte length.
	#[error("{kind} identifier exceeds {max} bytes.")]
	TooLong {
		/// Kind of identifier (client, subject).
		kind: &'static str,
		/// Maximum permitted byte length.
		max: usize,
	},
}

def_id! { ClientId, "OAuth client identifier the grant was issued to.", "Client" }
def_id! { SubjectId, "Resource owner (end user) a grant acts on behalf of.", "Subject" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	// RFC 6749 client identifiers are VSCHAR strings; spaces are allowed but controls are not.
	if view.chars().any(char::is_control) {
		return Err(IdentifierError::ContainsControl { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	#[test]
	fn identifiers_validate() {
		let client = ClientId::new("web-app").expect("Client fixture should be valid.");

		assert_eq!(client.as_ref(), "web-app");
		assert_eq!(format!("{client:?}"), "Client(web-app)");
		assert!(ClientId::new("").is_err());
		assert!(SubjectId::new("line\nbreak").is_err());
		SubjectId::new("Jane Doe").expect("Printable spaces are permitted.");
	}

	#[test]
	fn serde_enforces_validation() {
		let subject: SubjectId =
			serde_json::from_str("\"user-42\"").expect("Subject should deserialize.");

		assert_eq!(&*subject, "user-42");
		assert!(serde_json::from_str::<SubjectId>("\"\"").is_err());
	}

	#[test]
	fn length_limits_apply() {
		ClientId::new("a".repeat(IDENTIFIER_MAX_LEN)).expect("Exact length should succeed.");

		let err = ClientId::new("a".repeat(IDENTIFIER_MAX_LEN + 1))
			.expect_err("Overlong identifiers must be rejected.");

		assert_eq!(err, IdentifierError::TooLong { kind: "Client", max: IDENTIFIER_MAX_LEN });
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<ClientId, u8> = HashMap::from_iter([(
			ClientId::new("web-app").expect("Client used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("web-app"), Some(&7));
	}
}

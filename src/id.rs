//! Strongly typed identifiers exchanged with the subscriptions API.

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
			/// Creates a new identifier after trimming surrounding whitespace and validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref().trim();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}

			/// Returns the identifier as a string slice.
			pub fn as_str(&self) -> &str {
				&self.0
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
				Self::new(value)
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

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty or whitespace.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (merchant, profile).
		kind: &'static str,
	},
	/// The identifier contains interior whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (merchant, profile).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (merchant, profile).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { MerchantId, "Merchant account identifier issued by Payfast.", "Merchant" }
def_id! { ProfileId, "Remote identifier of a recurring-billing arrangement.", "Profile" }

impl ProfileId {
	/// Prefix applied to synthetic profile identifiers assigned at signup.
	pub const SIGNUP_PREFIX: &'static str = "payfast-";

	/// Assigns the synthetic profile identifier for a purchase (`payfast-{purchase_key}`).
	///
	/// Uniqueness follows from the host's purchase key; nothing is enforced here.
	pub fn for_purchase(purchase_key: &str) -> Result<Self, IdentifierError> {
		let key = purchase_key.trim();

		validate_view("Purchase key", key)?;

		Self::new(format!("{}{key}", Self::SIGNUP_PREFIX))
	}
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.chars().count() > IDENTIFIER_MAX_LEN {
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
	fn identifiers_trim_and_validate() {
		let merchant =
			MerchantId::new(" 10000100\n").expect("Surrounding whitespace should be trimmed.");

		assert_eq!(merchant.as_str(), "10000100");
		assert!(MerchantId::new("   ").is_err());
		assert!(ProfileId::new("with space").is_err());
		assert_eq!(format!("{merchant:?}"), "Merchant(10000100)");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let profile: ProfileId = serde_json::from_str("\"2afa4575-5628-051a-d0ed-4e071b56a7b0\"")
			.expect("Profile should deserialize successfully.");

		assert_eq!(profile.as_ref(), "2afa4575-5628-051a-d0ed-4e071b56a7b0");
		assert!(serde_json::from_str::<ProfileId>("\"\"").is_err());
		assert!(serde_json::from_str::<MerchantId>("\"a b\"").is_err());
	}

	#[test]
	fn signup_profiles_use_the_gateway_prefix() {
		let profile = ProfileId::for_purchase("3f1c0b7e9a2d")
			.expect("Purchase key fixture should produce a valid profile.");

		assert_eq!(profile.as_str(), "payfast-3f1c0b7e9a2d");
		assert_eq!(
			ProfileId::for_purchase(""),
			Err(IdentifierError::Empty { kind: "Purchase key" })
		);
	}

	#[test]
	fn length_limit_counts_characters() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		ProfileId::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert!(ProfileId::new(&too_long).is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<ProfileId, u8> = HashMap::from_iter([(
			ProfileId::new("profile-123").expect("Profile used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("profile-123"), Some(&7));
	}
}
